//! Solver-facing state. The IK solver itself is not part of this crate: it runs in
//! [`InteractionSet::Solve`](crate::plugin::InteractionSet::Solve), reads the effector targets
//! and chain parameters from [`FullBodyIk`] and writes the solved pose onto the bones.

use bevy::{ecs::prelude::*, math::Quat, platform::collections::HashMap, reflect::prelude::*};
use bevy_interaction_ik_core::{
    limb::FullBodyEffector,
    rig::{BonePose, ChainParams, EffectorPose, EffectorRig, PoserHandle},
};

/// Effector and chain of one limb of a full-body IK solver.
#[derive(Reflect, Debug, Clone, PartialEq)]
pub struct IkLimb {
    /// Bone the effector is attached to.
    pub bone: Entity,
    pub effector: EffectorPose,
    pub chain: ChainParams,
}

impl IkLimb {
    pub fn new(bone: Entity) -> Self {
        Self {
            bone,
            effector: EffectorPose::default(),
            chain: ChainParams::default(),
        }
    }
}

#[derive(Component, Reflect, Debug, Clone, Default)]
#[reflect(Component, Default)]
pub struct FullBodyIk {
    pub limbs: HashMap<FullBodyEffector, IkLimb>,
}

impl FullBodyIk {
    pub fn with_limb(mut self, effector: FullBodyEffector, bone: Entity) -> Self {
        self.limbs.insert(effector, IkLimb::new(bone));
        self
    }

    pub fn limb(&self, effector: FullBodyEffector) -> Option<&IkLimb> {
        self.limbs.get(&effector)
    }
}

/// Poser on a hand or foot bone, blending the fingers (or toes) towards a pose root.
#[derive(Component, Reflect, Debug, Clone, Default)]
#[reflect(Component, Default)]
pub struct HandPoser {
    pub weight: f32,
    pub pose_root: Option<Entity>,
    /// Speed at which the poser blends into a new pose root.
    pub blend_speed: f32,
}

impl PoserHandle for HandPoser {
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

/// [`EffectorRig`] over one limb, with the bone pose read from the scene. Bone rotations are
/// recorded in `rotated` and written back by the caller.
pub(crate) struct LimbRig<'a> {
    limb: &'a mut IkLimb,
    end_effector: bool,
    bone: BonePose,
    pub rotated: Option<Quat>,
}

impl<'a> LimbRig<'a> {
    pub fn new(limb: &'a mut IkLimb, effector: FullBodyEffector, bone: BonePose) -> Self {
        Self {
            limb,
            end_effector: effector.is_end_effector(),
            bone,
            rotated: None,
        }
    }
}

impl EffectorRig for LimbRig<'_> {
    fn effector(&self) -> EffectorPose {
        self.limb.effector
    }

    fn set_effector(&mut self, pose: EffectorPose) {
        self.limb.effector = pose;
    }

    fn chain(&self) -> ChainParams {
        self.limb.chain
    }

    fn set_chain(&mut self, chain: ChainParams) {
        self.limb.chain = chain;
    }

    fn bone(&self) -> BonePose {
        self.bone
    }

    fn set_bone_local_rotation(&mut self, rotation: Quat) {
        self.bone.local_rotation = rotation;
        self.bone.rotation = self.bone.parent_rotation * rotation;
        self.rotated = Some(rotation);
    }

    fn is_end_effector(&self) -> bool {
        self.end_effector
    }
}
