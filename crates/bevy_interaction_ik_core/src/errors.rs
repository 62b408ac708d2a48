use bevy::ecs::entity::Entity;
use thiserror::Error;

use crate::limb::FullBodyEffector;

/// Reasons an interaction request can be turned down.
#[non_exhaustive]
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InteractionError {
    #[error("{0:?} is already interacting and the request does not interrupt")]
    AlreadyInInteraction(FullBodyEffector),
    #[error("{0:?} is not interacting")]
    NotInInteraction(FullBodyEffector),
    #[error("interaction object {0:?} has no loaded definition")]
    MissingDefinition(Entity),
    #[error("interaction target {0:?} has no world pose")]
    MissingTarget(Entity),
}
