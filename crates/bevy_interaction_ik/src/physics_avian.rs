use avian3d::prelude::{
    ActiveCollisionHooks, Collider, ColliderDisabled, CollisionHooks, RigidBody, Sensor,
};
use bevy::{
    ecs::{entity::EntityHashSet, prelude::*, system::SystemParam},
    log::prelude::*,
    platform::collections::HashMap,
};
use bevy_interaction_ik_core::notice::NoticeKind;

use crate::{
    components::{InteractionObject, InteractionSystem},
    messages::InteractionMessage,
};

/// Colliders that the collider on this entity does not collide with. Enforced by
/// [`InteractionCollisionHooks`].
#[derive(Component, Debug, Clone, Default)]
pub struct IgnoredCollisions(pub EntityHashSet);

/// Collision hooks that filter out the pairs listed in [`IgnoredCollisions`]. Register them with
/// `PhysicsPlugins::default().with_collision_hooks::<InteractionCollisionHooks>()`.
#[derive(SystemParam)]
pub struct InteractionCollisionHooks<'w, 's> {
    ignored: Query<'w, 's, &'static IgnoredCollisions>,
}

impl InteractionCollisionHooks<'_, '_> {
    fn ignores(&self, collider: Entity, other: Entity) -> bool {
        self.ignored
            .get(collider)
            .is_ok_and(|ignored| ignored.0.contains(&other))
    }
}

impl CollisionHooks for InteractionCollisionHooks<'_, '_> {
    fn filter_pairs(
        &self,
        collider1: Entity,
        collider2: Entity,
        _commands: &mut Commands,
    ) -> bool {
        !(self.ignores(collider1, collider2) || self.ignores(collider2, collider1))
    }
}

/// Makes picked up rigid bodies kinematic and, when the carrying character's root has a
/// collider, stops them from colliding with it.
#[allow(clippy::too_many_arguments)]
pub fn handle_picked_up_objects(
    mut commands: Commands,
    mut notices: MessageReader<InteractionMessage>,
    systems: Query<&InteractionSystem>,
    objects: Query<&InteractionObject>,
    children: Query<&Children>,
    colliders: Query<(), (With<Collider>, Without<Sensor>, Without<ColliderDisabled>)>,
    root_colliders: Query<(), With<Collider>>,
    bodies: Query<&RigidBody>,
    mut ignored: Query<&mut IgnoredCollisions>,
) {
    let mut new_ignores: HashMap<Entity, EntityHashSet> = HashMap::default();

    for message in notices.read() {
        if message.notice.kind != NoticeKind::PickedUp {
            continue;
        }
        let object = message.notice.object;
        let Ok(system) = systems.get(message.character) else {
            continue;
        };
        let character_root = system.root_or(message.character);
        let targets_root = objects
            .get(object)
            .ok()
            .and_then(|o| o.targets_root)
            .unwrap_or(object);

        let Ok(body) = bodies.get(targets_root) else {
            continue;
        };
        if body.is_dynamic() {
            commands.entity(targets_root).insert(RigidBody::Kinematic);
        }
        if !root_colliders.contains(character_root) {
            continue;
        }

        let carried: Vec<Entity> = std::iter::once(targets_root)
            .chain(children.iter_descendants(targets_root))
            .filter(|entity| colliders.contains(*entity))
            .collect();
        debug!(
            "{:?} picked up {:?}, ignoring collisions with {} colliders",
            message.character,
            object,
            carried.len()
        );

        match ignored.get_mut(character_root) {
            Ok(mut existing) => existing.0.extend(carried),
            Err(_) => new_ignores
                .entry(character_root)
                .or_default()
                .extend(carried),
        }
    }

    for (entity, colliders) in new_ignores {
        commands.entity(entity).insert((
            IgnoredCollisions(colliders),
            ActiveCollisionHooks::FILTER_PAIRS,
        ));
    }
}
