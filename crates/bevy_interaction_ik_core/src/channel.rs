use bevy::reflect::Reflect;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// A named scalar that an interaction can drive over time.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeightChannel {
    PositionWeight,
    RotationWeight,
    PositionOffsetX,
    PositionOffsetY,
    PositionOffsetZ,
    Pull,
    Reach,
    RotateBoneWeight,
    Push,
    PushParent,
    PoserWeight,
    BendGoalWeight,
}

bitflags! {
    /// Set of [`WeightChannel`]s, used to track which channels an interaction touches.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ChannelMask: u16 {
        const POSITION_WEIGHT = 1 << 0;
        const ROTATION_WEIGHT = 1 << 1;
        const POSITION_OFFSET_X = 1 << 2;
        const POSITION_OFFSET_Y = 1 << 3;
        const POSITION_OFFSET_Z = 1 << 4;
        const PULL = 1 << 5;
        const REACH = 1 << 6;
        const ROTATE_BONE_WEIGHT = 1 << 7;
        const PUSH = 1 << 8;
        const PUSH_PARENT = 1 << 9;
        const POSER_WEIGHT = 1 << 10;
        const BEND_GOAL_WEIGHT = 1 << 11;
    }
}

impl From<WeightChannel> for ChannelMask {
    fn from(channel: WeightChannel) -> Self {
        match channel {
            WeightChannel::PositionWeight => ChannelMask::POSITION_WEIGHT,
            WeightChannel::RotationWeight => ChannelMask::ROTATION_WEIGHT,
            WeightChannel::PositionOffsetX => ChannelMask::POSITION_OFFSET_X,
            WeightChannel::PositionOffsetY => ChannelMask::POSITION_OFFSET_Y,
            WeightChannel::PositionOffsetZ => ChannelMask::POSITION_OFFSET_Z,
            WeightChannel::Pull => ChannelMask::PULL,
            WeightChannel::Reach => ChannelMask::REACH,
            WeightChannel::RotateBoneWeight => ChannelMask::ROTATE_BONE_WEIGHT,
            WeightChannel::Push => ChannelMask::PUSH,
            WeightChannel::PushParent => ChannelMask::PUSH_PARENT,
            WeightChannel::PoserWeight => ChannelMask::POSER_WEIGHT,
            WeightChannel::BendGoalWeight => ChannelMask::BEND_GOAL_WEIGHT,
        }
    }
}

impl ChannelMask {
    pub fn has(self, channel: WeightChannel) -> bool {
        self.contains(channel.into())
    }
}
