use bevy::{
    asset::Asset,
    math::{Quat, Vec3},
    reflect::Reflect,
};
use serde::{Deserialize, Serialize};

use crate::{
    channel::{ChannelMask, WeightChannel},
    curve::KeyframeCurve,
    interpolation::lerp,
    rig::EffectorRig,
    target::InteractionTarget,
};

#[derive(Reflect, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightCurve {
    pub channel: WeightChannel,
    pub curve: KeyframeCurve,
}

/// Drives the `result` channel with another channel's curve, scaled.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Multiplier {
    pub curve: WeightChannel,
    pub multiplier: f32,
    pub result: WeightChannel,
}

impl Multiplier {
    pub fn is_self_referencing(&self) -> bool {
        self.curve == self.result
    }
}

/// Something that happens at a fixed time of an interaction.
#[derive(Reflect, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InteractionEvent {
    pub time: f32,
    /// The effector picks up the interaction object at this time.
    #[serde(default)]
    pub pick_up: bool,
    /// The interaction holds at this time until it is resumed.
    #[serde(default)]
    pub pause: bool,
    /// Forwarded as-is with the event notification.
    #[serde(default)]
    pub messages: Vec<String>,
}

/// Curves, multipliers and events that make up a scripted interaction. Loaded from
/// `*.interaction.ron` files.
#[derive(Asset, Reflect, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InteractionDefinition {
    #[serde(default)]
    pub weight_curves: Vec<WeightCurve>,
    #[serde(default)]
    pub multipliers: Vec<Multiplier>,
    #[serde(default)]
    pub events: Vec<InteractionEvent>,
}

impl InteractionDefinition {
    pub fn with_curve(mut self, channel: WeightChannel, curve: KeyframeCurve) -> Self {
        self.weight_curves.push(WeightCurve { channel, curve });
        self
    }

    pub fn with_multiplier(
        mut self,
        curve: WeightChannel,
        multiplier: f32,
        result: WeightChannel,
    ) -> Self {
        self.multipliers.push(Multiplier {
            curve,
            multiplier,
            result,
        });
        self
    }

    pub fn with_event(mut self, event: InteractionEvent) -> Self {
        self.events.push(event);
        self
    }

    /// Duration of the interaction: the end of its longest weight curve.
    pub fn length(&self) -> f32 {
        self.weight_curves
            .iter()
            .map(|c| c.curve.end_time())
            .fold(0., f32::max)
    }

    fn weight_curve(&self, channel: WeightChannel) -> Option<&WeightCurve> {
        self.weight_curves.iter().find(|c| c.channel == channel)
    }

    pub fn curve_used(&self, channel: WeightChannel) -> bool {
        self.weight_curve(channel).is_some() || self.multipliers.iter().any(|m| m.result == channel)
    }

    /// Channels touched by this interaction. The poser channel only counts when there is a poser
    /// to drive.
    pub fn used_channels(&self, poser_present: bool) -> ChannelMask {
        let mut mask = ChannelMask::empty();
        for curve in &self.weight_curves {
            mask |= ChannelMask::from(curve.channel);
        }
        for multiplier in &self.multipliers {
            mask |= ChannelMask::from(multiplier.result);
        }
        if !poser_present {
            mask.remove(ChannelMask::POSER_WEIGHT);
        }
        mask
    }

    /// Value of `channel` at `timer`, scaled by the target multiplier. Falls back to the first
    /// multiplier producing the channel, and to 0 when the channel is not driven at all.
    pub fn value(
        &self,
        channel: WeightChannel,
        target: Option<&InteractionTarget>,
        timer: f32,
    ) -> f32 {
        let mlp = target.map_or(1., |t| t.multiplier(channel));
        if let Some(curve) = self.weight_curve(channel) {
            return curve.curve.sample(timer) * mlp;
        }
        self.multipliers
            .iter()
            .filter(|m| m.result == channel)
            .find_map(|m| self.weight_curve(m.curve).map(|c| (m, c)))
            .map_or(0., |(m, c)| c.curve.sample(timer) * m.multiplier * mlp)
    }

    /// Writes the interaction's state at `timer` onto the rig, each channel blended by `weight`.
    ///
    /// Position offsets are expressed in `root_rotation` space and are skipped while `paused`,
    /// the paused pose being pinned to the target every frame.
    pub fn apply(
        &self,
        rig: &mut dyn EffectorRig,
        target: Option<&InteractionTarget>,
        timer: f32,
        weight: f32,
        paused: bool,
        root_rotation: Quat,
    ) {
        let mut pose = rig.effector();
        let mut chain = rig.chain();

        let mut apply_channel = |channel: WeightChannel, value: f32| {
            let w = weight * target.map_or(1., |t| t.multiplier(channel));
            match channel {
                WeightChannel::PositionWeight => {
                    pose.position_weight = lerp(pose.position_weight, value, w);
                }
                WeightChannel::RotationWeight => {
                    pose.rotation_weight = lerp(pose.rotation_weight, value, w);
                }
                WeightChannel::PositionOffsetX if !paused => {
                    pose.position += root_rotation * Vec3::X * value * w;
                }
                WeightChannel::PositionOffsetY if !paused => {
                    pose.position += root_rotation * Vec3::Y * value * w;
                }
                WeightChannel::PositionOffsetZ if !paused => {
                    pose.position += root_rotation * Vec3::Z * value * w;
                }
                WeightChannel::Pull
                | WeightChannel::Reach
                | WeightChannel::Push
                | WeightChannel::PushParent
                | WeightChannel::BendGoalWeight => chain.blend(channel, value, w),
                _ => {}
            }
        };

        for curve in &self.weight_curves {
            apply_channel(curve.channel, curve.curve.sample(timer));
        }
        for multiplier in self.multipliers.iter().filter(|m| !m.is_self_referencing()) {
            if let Some(curve) = self.weight_curve(multiplier.curve) {
                apply_channel(
                    multiplier.result,
                    curve.curve.sample(timer) * multiplier.multiplier,
                );
            }
        }

        rig.set_effector(pose);
        rig.set_chain(chain);
    }
}
