use bevy::{
    asset::Assets,
    ecs::{prelude::*, system::SystemParam},
    math::Quat,
    transform::{helper::TransformHelper, prelude::*},
};
use bevy_interaction_ik_core::{
    definition::InteractionDefinition, limb::FullBodyEffector, rig::BonePose,
    scene::SceneAccess, target::InteractionTarget,
};

use crate::components::InteractionObject;

/// [`SceneAccess`] over the ECS world.
///
/// World poses are computed from the [`Transform`] hierarchy, so they are up to date while
/// running before transform propagation.
#[derive(SystemParam)]
pub struct InteractionScene<'w, 's> {
    objects: Query<'w, 's, &'static InteractionObject>,
    targets: Query<'w, 's, &'static InteractionTarget>,
    children: Query<'w, 's, &'static Children>,
    parents: Query<'w, 's, &'static ChildOf>,
    locals: Query<'w, 's, &'static Transform>,
    definitions: Res<'w, Assets<InteractionDefinition>>,
    transform_helper: TransformHelper<'w, 's>,
}

impl InteractionScene<'_, '_> {
    pub fn global_transform(&self, entity: Entity) -> Option<GlobalTransform> {
        self.transform_helper.compute_global_transform(entity).ok()
    }

    /// World pose of a bone, along with its local rotation and its parent's world rotation.
    pub fn bone_pose(&self, bone: Entity) -> Option<BonePose> {
        let global = self.global_transform(bone)?.compute_transform();
        let local = self.locals.get(bone).ok()?;
        let parent_rotation = self
            .parents
            .get(bone)
            .ok()
            .and_then(|child_of| self.global_transform(child_of.parent()))
            .map_or(Quat::IDENTITY, |parent| parent.compute_transform().rotation);

        Some(BonePose {
            position: global.translation,
            rotation: global.rotation,
            local_rotation: local.rotation,
            parent_rotation,
        })
    }
}

impl SceneAccess for InteractionScene<'_, '_> {
    fn definition(&self, object: Entity) -> Option<&InteractionDefinition> {
        let object = self.objects.get(object).ok()?;
        self.definitions.get(&object.definition)
    }

    fn target(&self, entity: Entity) -> Option<&InteractionTarget> {
        self.targets.get(entity).ok()
    }

    fn world_transform(&self, entity: Entity) -> Option<Transform> {
        self.global_transform(entity)
            .map(|global| global.compute_transform())
    }

    fn targets_root(&self, object: Entity) -> Entity {
        self.objects
            .get(object)
            .ok()
            .and_then(|o| o.targets_root)
            .unwrap_or(object)
    }

    fn find_target(
        &self,
        object: Entity,
        effector: FullBodyEffector,
        tag: &str,
    ) -> Option<Entity> {
        let root = self.targets_root(object);
        std::iter::once(root)
            .chain(self.children.iter_descendants(root))
            .find(|entity| {
                self.targets
                    .get(*entity)
                    .is_ok_and(|target| target.matches(effector, tag))
            })
    }
}
