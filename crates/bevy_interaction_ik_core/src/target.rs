use bevy::{ecs::component::Component, reflect::Reflect};
use serde::{Deserialize, Serialize};

use crate::{channel::WeightChannel, limb::FullBodyEffector};

#[derive(Reflect, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetMultiplier {
    pub channel: WeightChannel,
    pub value: f32,
}

/// Marks an entity under an interaction object's targets root as the place a given effector
/// should reach for.
#[derive(Component, Reflect, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionTarget {
    pub effector: FullBodyEffector,
    /// Lets an object expose several targets for the same effector (e.g. "grab" and "push").
    #[serde(default)]
    pub tag: String,
    /// Per-channel scale applied on top of the interaction's curves.
    #[serde(default)]
    pub multipliers: Vec<TargetMultiplier>,
    /// Scales the interaction timer while this target is used.
    #[serde(default = "default_speed_mlp")]
    pub interaction_speed_mlp: f32,
    /// Whether the effector's poser should pose itself relative to this target.
    #[serde(default = "default_use_poser")]
    pub use_poser: bool,
}

fn default_speed_mlp() -> f32 {
    1.
}

fn default_use_poser() -> bool {
    true
}

impl InteractionTarget {
    pub fn new(effector: FullBodyEffector) -> Self {
        Self {
            effector,
            tag: String::new(),
            multipliers: Vec::new(),
            interaction_speed_mlp: 1.,
            use_poser: true,
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn with_multiplier(mut self, channel: WeightChannel, value: f32) -> Self {
        self.multipliers.push(TargetMultiplier { channel, value });
        self
    }

    /// An empty `tag` matches any target of the effector.
    pub fn matches(&self, effector: FullBodyEffector, tag: &str) -> bool {
        self.effector == effector && (tag.is_empty() || self.tag == tag)
    }

    /// Multiplier for `channel`, 1 if the target does not override it.
    pub fn multiplier(&self, channel: WeightChannel) -> f32 {
        self.multipliers
            .iter()
            .find(|m| m.channel == channel)
            .map_or(1., |m| m.value)
    }
}
