use bevy::{ecs::entity::Entity, transform::components::Transform};

use crate::{
    definition::InteractionDefinition,
    limb::FullBodyEffector,
    notice::InteractionNotice,
    rig::{EffectorRig, PoserHandle},
    target::InteractionTarget,
};

/// Read access to the interaction objects and targets of the scene.
pub trait SceneAccess {
    /// `None` once the object is gone or its definition is not loaded.
    fn definition(&self, object: Entity) -> Option<&InteractionDefinition>;
    fn target(&self, entity: Entity) -> Option<&InteractionTarget>;
    /// World space pose of an entity.
    fn world_transform(&self, entity: Entity) -> Option<Transform>;
    /// The entity under which an object's targets live, and which is carried when picked up.
    fn targets_root(&self, object: Entity) -> Entity;
    /// First target of `object` matching the effector and tag.
    fn find_target(&self, object: Entity, effector: FullBodyEffector, tag: &str)
    -> Option<Entity>;
}

/// Everything an effector needs for one operation.
pub struct EffectorContext<'a> {
    pub rig: &'a mut dyn EffectorRig,
    pub poser: Option<&'a mut dyn PoserHandle>,
    pub scene: &'a dyn SceneAccess,
    /// World pose of the interaction system (the character).
    pub system_transform: Transform,
    /// Blend speed handed to posers when their pose root changes.
    pub switch_interaction_speed: f32,
    pub notices: &'a mut Vec<InteractionNotice>,
}
