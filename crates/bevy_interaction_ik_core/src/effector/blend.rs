use crate::{
    channel::{ChannelMask, WeightChannel},
    interpolation::{lerp, lerp_vec3, move_towards, slerp},
    rig::{CHAIN_CHANNELS, ChainParams, EffectorPose, EffectorRig},
};

/// Effector weights and chain parameters at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChannelSnapshot {
    pub pose: EffectorPose,
    pub chain: ChainParams,
}

impl ChannelSnapshot {
    pub fn capture(rig: &dyn EffectorRig) -> Self {
        Self {
            pose: rig.effector(),
            chain: rig.chain(),
        }
    }
}

/// Blend that is running on an effector, if any. Switching only happens during an interaction,
/// resetting only outside of one.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum BlendState {
    #[default]
    Idle,
    /// Crossfading from an interrupted interaction into the current one.
    Switching(SwitchBlend),
    /// Crossfading back to the defaults after an interaction ended.
    Resetting(ResetBlend),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchBlend {
    pub from: ChannelSnapshot,
    pub mask: ChannelMask,
    /// Goes from 0 to 1.
    pub timer: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResetBlend {
    pub mask: ChannelMask,
    /// Goes from 1 to 0.
    pub timer: f32,
}

fn blend_chain(chain: &mut ChainParams, from: &ChainParams, mask: ChannelMask, f: f32) {
    for channel in CHAIN_CHANNELS {
        if !mask.has(channel) {
            continue;
        }
        if let (Some(from), Some(current)) = (from.get(channel), chain.get_mut(channel)) {
            *current = lerp(from, *current, f);
        }
    }
}

impl SwitchBlend {
    pub fn new(from: ChannelSnapshot, mask: ChannelMask) -> Self {
        Self {
            from,
            mask,
            timer: 0.,
        }
    }

    /// Returns `true` once the blend is complete.
    pub fn advance(&mut self, rig: &mut dyn EffectorRig, speed: f32, delta: f32) -> bool {
        self.timer = move_towards(self.timer, 1., delta * speed);

        if rig.is_end_effector() {
            let mut chain = rig.chain();
            blend_chain(&mut chain, &self.from.chain, self.mask, self.timer);
            rig.set_chain(chain);
        }

        let mut pose = rig.effector();
        if self.mask.has(WeightChannel::PositionWeight) {
            pose.position_weight =
                lerp(self.from.pose.position_weight, pose.position_weight, self.timer);
            pose.position = lerp_vec3(self.from.pose.position, pose.position, self.timer);
        }
        if self.mask.has(WeightChannel::RotationWeight) {
            pose.rotation_weight =
                lerp(self.from.pose.rotation_weight, pose.rotation_weight, self.timer);
            pose.rotation = slerp(self.from.pose.rotation, pose.rotation, self.timer);
        }
        rig.set_effector(pose);

        self.timer >= 1.
    }
}

impl ResetBlend {
    pub fn new(mask: ChannelMask) -> Self {
        Self { mask, timer: 1. }
    }

    /// Returns `true` once the defaults are reached.
    pub fn advance(
        &mut self,
        rig: &mut dyn EffectorRig,
        defaults: &ChannelSnapshot,
        speed: f32,
        delta: f32,
    ) -> bool {
        self.timer = move_towards(self.timer, 0., delta * speed);

        if rig.is_end_effector() {
            let mut chain = rig.chain();
            blend_chain(&mut chain, &defaults.chain, self.mask, self.timer);
            rig.set_chain(chain);
        }

        let mut pose = rig.effector();
        if self.mask.has(WeightChannel::PositionWeight) {
            pose.position_weight =
                lerp(defaults.pose.position_weight, pose.position_weight, self.timer);
        }
        if self.mask.has(WeightChannel::RotationWeight) {
            pose.rotation_weight =
                lerp(defaults.pose.rotation_weight, pose.rotation_weight, self.timer);
        }
        rig.set_effector(pose);

        self.timer <= 0.
    }
}
