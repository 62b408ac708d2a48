use bevy::{ecs::entity::Entity, reflect::Reflect};

use crate::limb::FullBodyEffector;

#[derive(Reflect, Debug, Clone, PartialEq)]
pub enum NoticeKind {
    Started,
    Stopped,
    Paused,
    Resumed,
    PickedUp,
    Event {
        index: usize,
        time: f32,
        messages: Vec<String>,
    },
}

/// Something that happened to an effector's interaction.
#[derive(Reflect, Debug, Clone, PartialEq)]
pub struct InteractionNotice {
    pub effector: FullBodyEffector,
    pub object: Entity,
    pub kind: NoticeKind,
}
