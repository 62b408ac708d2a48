use bevy::{
    ecs::entity::Entity,
    math::{Quat, Vec3},
    reflect::Reflect,
};

use crate::{channel::WeightChannel, interpolation::lerp};

/// Target and weights of a single IK effector.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct EffectorPose {
    pub position: Vec3,
    pub rotation: Quat,
    pub position_weight: f32,
    pub rotation_weight: f32,
}

impl Default for EffectorPose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            position_weight: 0.,
            rotation_weight: 0.,
        }
    }
}

/// Parameters of the kinematic chain that ends in an effector.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct ChainParams {
    pub pull: f32,
    pub reach: f32,
    pub push: f32,
    pub push_parent: f32,
    pub bend_goal_weight: f32,
}

impl Default for ChainParams {
    fn default() -> Self {
        Self {
            pull: 1.,
            reach: 0.1,
            push: 0.,
            push_parent: 0.,
            bend_goal_weight: 0.,
        }
    }
}

impl ChainParams {
    pub fn get(&self, channel: WeightChannel) -> Option<f32> {
        match channel {
            WeightChannel::Pull => Some(self.pull),
            WeightChannel::Reach => Some(self.reach),
            WeightChannel::Push => Some(self.push),
            WeightChannel::PushParent => Some(self.push_parent),
            WeightChannel::BendGoalWeight => Some(self.bend_goal_weight),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, channel: WeightChannel) -> Option<&mut f32> {
        match channel {
            WeightChannel::Pull => Some(&mut self.pull),
            WeightChannel::Reach => Some(&mut self.reach),
            WeightChannel::Push => Some(&mut self.push),
            WeightChannel::PushParent => Some(&mut self.push_parent),
            WeightChannel::BendGoalWeight => Some(&mut self.bend_goal_weight),
            _ => None,
        }
    }

    /// Blends the channel in place: `lerp(current, value, weight)`. Non-chain channels are
    /// ignored.
    pub fn blend(&mut self, channel: WeightChannel, value: f32, weight: f32) {
        if let Some(current) = self.get_mut(channel) {
            *current = lerp(*current, value, weight);
        }
    }
}

pub const CHAIN_CHANNELS: [WeightChannel; 5] = [
    WeightChannel::Pull,
    WeightChannel::Reach,
    WeightChannel::Push,
    WeightChannel::PushParent,
    WeightChannel::BendGoalWeight,
];

/// World pose of the bone driven by an effector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BonePose {
    pub position: Vec3,
    pub rotation: Quat,
    pub local_rotation: Quat,
    /// World rotation of the bone's parent, identity for root bones.
    pub parent_rotation: Quat,
}

impl Default for BonePose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            local_rotation: Quat::IDENTITY,
            parent_rotation: Quat::IDENTITY,
        }
    }
}

/// Access to the solver state of one effector: its target, its chain and its bone.
///
/// The interaction state machine never owns this data. It reads and writes it through this trait
/// in the pre-solve phase, the solver consumes it, and the post-solve phase corrects the bone.
pub trait EffectorRig {
    fn effector(&self) -> EffectorPose;
    fn set_effector(&mut self, pose: EffectorPose);
    fn chain(&self) -> ChainParams;
    fn set_chain(&mut self, chain: ChainParams);
    fn bone(&self) -> BonePose;
    fn set_bone_local_rotation(&mut self, rotation: Quat);
    fn is_end_effector(&self) -> bool;
}

/// A hand or foot poser attached to an effector's bone.
pub trait PoserHandle {
    fn weight(&self) -> f32;
    fn set_weight(&mut self, weight: f32);
    fn has_pose_root(&self) -> bool;
    /// `None` releases the pose root.
    fn set_pose_root(&mut self, root: Option<Entity>, blend_speed: f32);
}
