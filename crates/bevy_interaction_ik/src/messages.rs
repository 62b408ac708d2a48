use bevy::ecs::prelude::*;
use bevy_interaction_ik_core::{limb::FullBodyEffector, notice::InteractionNotice};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionRequestKind {
    Start { object: Entity, interrupt: bool },
    Stop,
    Pause,
    Resume,
}

/// Asks a character's [`InteractionSystem`](crate::components::InteractionSystem) to start,
/// stop, pause or resume interactions.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct InteractionRequest {
    pub character: Entity,
    /// `None` addresses every limb of the character.
    pub effector: Option<FullBodyEffector>,
    pub kind: InteractionRequestKind,
}

impl InteractionRequest {
    pub fn start(character: Entity, effector: FullBodyEffector, object: Entity) -> Self {
        Self {
            character,
            effector: Some(effector),
            kind: InteractionRequestKind::Start {
                object,
                interrupt: false,
            },
        }
    }

    /// Starts even if the limb is already interacting, crossfading from the current interaction.
    pub fn interrupt(character: Entity, effector: FullBodyEffector, object: Entity) -> Self {
        Self {
            character,
            effector: Some(effector),
            kind: InteractionRequestKind::Start {
                object,
                interrupt: true,
            },
        }
    }

    pub fn stop_all(character: Entity) -> Self {
        Self {
            character,
            effector: None,
            kind: InteractionRequestKind::Stop,
        }
    }

    pub fn pause_all(character: Entity) -> Self {
        Self {
            character,
            effector: None,
            kind: InteractionRequestKind::Pause,
        }
    }

    pub fn resume_all(character: Entity) -> Self {
        Self {
            character,
            effector: None,
            kind: InteractionRequestKind::Resume,
        }
    }
}

/// Emitted for everything that happens to a character's interactions.
#[derive(Message, Debug, Clone, PartialEq)]
pub struct InteractionMessage {
    pub character: Entity,
    pub notice: InteractionNotice,
}
