//! # Bevy Interaction IK
//!
//! Scripted interactions for characters driven by a full-body IK solver: reaching for a button,
//! picking up a box, holding on to a ledge. Plus a head raycast check that detects a character
//! falling off its support.
//!
//! ## Setup
//!
//! Add [`InteractionIkPlugin`](plugin::InteractionIkPlugin), then give the character an
//! [`InteractionSystem`](components::InteractionSystem) and the
//! [`FullBodyIk`](solver::FullBodyIk) state your solver reads. Run the solver in
//! [`InteractionSet::Solve`](plugin::InteractionSet::Solve).
//!
//! Interactable entities get an [`InteractionObject`](components::InteractionObject) pointing
//! to an `*.interaction.ron` asset, with [`InteractionTarget`]s below it for the limbs that
//! should reach for them:
//!
//! ```ron
//! (
//!     weight_curves: [
//!         (channel: PositionWeight, curve: [(time: 0.0, value: 0.0), (time: 0.5, value: 1.0), (time: 1.5, value: 0.0)]),
//!         (channel: Pull, curve: [(time: 0.0, value: 0.5)]),
//!     ],
//!     multipliers: [
//!         (curve: PositionWeight, multiplier: 1.0, result: RotationWeight),
//!     ],
//!     events: [
//!         (time: 0.5, pick_up: true, messages: ["Grabbed"]),
//!     ],
//! )
//! ```
//!
//! Interactions are started, stopped, paused and resumed with
//! [`InteractionRequest`](messages::InteractionRequest) messages, and report what happens to them
//! with [`InteractionMessage`](messages::InteractionMessage)s.
//!
//! With the `physics_avian` feature (enabled by default), picked up objects become kinematic and
//! stop colliding with the character carrying them. Register
//! `InteractionCollisionHooks` with avian's `PhysicsPlugins` for that part to take effect.
//!
//! [`InteractionTarget`]: bevy_interaction_ik_core::target::InteractionTarget

pub mod components;
pub mod errors;
pub mod fall_check;
pub mod loader;
pub mod messages;
#[cfg(feature = "physics_avian")]
pub mod physics_avian;
pub mod plugin;
pub mod scene;
pub mod solver;
pub mod systems;


pub mod prelude {
    pub use super::components::{InteractionEffectors, InteractionObject, InteractionSystem};
    pub use super::fall_check::{HeadRaycastChecker, HeadSupport, PlayerFell, Tag};
    pub use super::messages::{InteractionMessage, InteractionRequest, InteractionRequestKind};
    #[cfg(feature = "physics_avian")]
    pub use super::physics_avian::{IgnoredCollisions, InteractionCollisionHooks};
    pub use super::plugin::{InteractionIkPlugin, InteractionSet};
    pub use super::solver::{FullBodyIk, HandPoser, IkLimb};
    pub use bevy_interaction_ik_core::prelude::*;
}
