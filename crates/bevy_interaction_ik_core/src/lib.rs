//! Engine-facing state machine behind full-body IK interactions.
//!
//! An [`InteractionEffector`](effector::InteractionEffector) plays back an
//! [`InteractionDefinition`](definition::InteractionDefinition) on one effector of a full-body IK
//! rig: it fades the effector onto an interaction target, drives the effector weights and limb
//! chain parameters from keyframed curves, fires timed events (pick up, pause) and blends back to
//! the rig's defaults once done. The rig, poser and scene are reached through the traits in
//! [`rig`] and [`scene`], so this crate has no knowledge of ECS queries.

pub mod channel;
pub mod curve;
pub mod definition;
pub mod effector;
pub mod errors;
pub mod interpolation;
pub mod limb;
pub mod notice;
pub mod rig;
pub mod scene;
pub mod target;

#[cfg(test)]
mod testing;

pub mod prelude {
    pub use super::channel::{ChannelMask, WeightChannel};
    pub use super::curve::{CurveKey, KeyframeCurve};
    pub use super::definition::{InteractionDefinition, InteractionEvent, Multiplier, WeightCurve};
    pub use super::effector::{BlendState, InteractionEffector, ReparentRequest};
    pub use super::errors::InteractionError;
    pub use super::limb::FullBodyEffector;
    pub use super::notice::{InteractionNotice, NoticeKind};
    pub use super::rig::{BonePose, ChainParams, EffectorPose, EffectorRig, PoserHandle};
    pub use super::scene::{EffectorContext, SceneAccess};
    pub use super::target::{InteractionTarget, TargetMultiplier};
}
