use bevy::{
    ecs::entity::Entity,
    math::Quat,
    platform::collections::HashMap,
    transform::components::Transform,
};

use crate::{
    definition::InteractionDefinition,
    limb::FullBodyEffector,
    rig::{BonePose, ChainParams, EffectorPose, EffectorRig, PoserHandle},
    scene::SceneAccess,
    target::InteractionTarget,
};

#[derive(Debug, Clone, Default)]
pub struct MockRig {
    pub pose: EffectorPose,
    pub chain: ChainParams,
    pub bone: BonePose,
    pub end_effector: bool,
}

impl MockRig {
    pub fn end_effector() -> Self {
        Self {
            end_effector: true,
            ..Default::default()
        }
    }
}

impl EffectorRig for MockRig {
    fn effector(&self) -> EffectorPose {
        self.pose
    }

    fn set_effector(&mut self, pose: EffectorPose) {
        self.pose = pose;
    }

    fn chain(&self) -> ChainParams {
        self.chain
    }

    fn set_chain(&mut self, chain: ChainParams) {
        self.chain = chain;
    }

    fn bone(&self) -> BonePose {
        self.bone
    }

    fn set_bone_local_rotation(&mut self, rotation: Quat) {
        self.bone.local_rotation = rotation;
        self.bone.rotation = self.bone.parent_rotation * rotation;
    }

    fn is_end_effector(&self) -> bool {
        self.end_effector
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockPoser {
    pub weight: f32,
    pub pose_root: Option<Entity>,
    pub blend_speed: f32,
}

impl PoserHandle for MockPoser {
    fn weight(&self) -> f32 {
        self.weight
    }

    fn set_weight(&mut self, weight: f32) {
        self.weight = weight;
    }

    fn has_pose_root(&self) -> bool {
        self.pose_root.is_some()
    }

    fn set_pose_root(&mut self, root: Option<Entity>, blend_speed: f32) {
        self.pose_root = root;
        self.blend_speed = blend_speed;
    }
}

/// Scene made of plain maps. Objects are their own targets root unless set otherwise.
#[derive(Debug, Default)]
pub struct MockScene {
    pub definitions: HashMap<Entity, InteractionDefinition>,
    pub targets: HashMap<Entity, InteractionTarget>,
    pub transforms: HashMap<Entity, Transform>,
    /// Targets of each object, in lookup order.
    pub object_targets: HashMap<Entity, Vec<Entity>>,
    pub roots: HashMap<Entity, Entity>,
}

impl MockScene {
    pub fn add_object(
        &mut self,
        object: Entity,
        definition: InteractionDefinition,
        transform: Transform,
    ) {
        self.definitions.insert(object, definition);
        self.transforms.insert(object, transform);
    }

    pub fn add_target(
        &mut self,
        object: Entity,
        entity: Entity,
        target: InteractionTarget,
        transform: Transform,
    ) {
        self.targets.insert(entity, target);
        self.transforms.insert(entity, transform);
        self.object_targets.entry(object).or_default().push(entity);
    }
}

impl SceneAccess for MockScene {
    fn definition(&self, object: Entity) -> Option<&InteractionDefinition> {
        self.definitions.get(&object)
    }

    fn target(&self, entity: Entity) -> Option<&InteractionTarget> {
        self.targets.get(&entity)
    }

    fn world_transform(&self, entity: Entity) -> Option<Transform> {
        self.transforms.get(&entity).copied()
    }

    fn targets_root(&self, object: Entity) -> Entity {
        self.roots.get(&object).copied().unwrap_or(object)
    }

    fn find_target(
        &self,
        object: Entity,
        effector: FullBodyEffector,
        tag: &str,
    ) -> Option<Entity> {
        self.object_targets.get(&object)?.iter().copied().find(|e| {
            self.targets
                .get(e)
                .is_some_and(|t| t.matches(effector, tag))
        })
    }
}
