use bevy::{asset::Handle, ecs::prelude::*, reflect::prelude::*};
use bevy_interaction_ik_core::{
    definition::InteractionDefinition, effector::InteractionEffector, limb::FullBodyEffector,
};

/// Drives the interactions of a character. Put it next to the character's [`FullBodyIk`].
///
/// [`FullBodyIk`]: crate::solver::FullBodyIk
#[derive(Component, Reflect, Debug, Clone)]
#[reflect(Component, Default)]
pub struct InteractionSystem {
    /// Scales the playback of every interaction.
    pub speed: f32,
    /// Default fade in time of started interactions, in seconds.
    pub fade_in_time: f32,
    pub reset_to_defaults_speed: f32,
    /// Crossfade speed when an interaction interrupts another, and blend speed of posers.
    pub switch_interaction_speed: f32,
    /// Only targets with this tag are used. Empty matches every target.
    pub target_tag: String,
    /// Entity whose space position offsets and carried objects are expressed in. Defaults to this
    /// entity.
    pub root: Option<Entity>,
}

impl Default for InteractionSystem {
    fn default() -> Self {
        Self {
            speed: 1.,
            fade_in_time: 0.3,
            reset_to_defaults_speed: 1.,
            switch_interaction_speed: 1.,
            target_tag: String::new(),
            root: None,
        }
    }
}

impl InteractionSystem {
    pub fn root_or(&self, character: Entity) -> Entity {
        self.root.unwrap_or(character)
    }
}

/// Runtime state of every limb of a character, one [`InteractionEffector`] per limb of its
/// [`FullBodyIk`](crate::solver::FullBodyIk). Added automatically.
#[derive(Component, Debug, Clone, Default)]
pub struct InteractionEffectors {
    pub(crate) effectors: Vec<InteractionEffector>,
}

impl InteractionEffectors {
    pub fn get(&self, effector: FullBodyEffector) -> Option<&InteractionEffector> {
        self.effectors
            .iter()
            .find(|e| e.effector_type() == effector)
    }

    pub fn iter(&self) -> impl Iterator<Item = &InteractionEffector> {
        self.effectors.iter()
    }

    /// Whether any limb is in an interaction.
    pub fn in_interaction(&self) -> bool {
        self.effectors.iter().any(InteractionEffector::in_interaction)
    }

    pub fn is_paused(&self) -> bool {
        self.effectors.iter().any(InteractionEffector::is_paused)
    }
}

/// Something a character can interact with.
#[derive(Component, Reflect, Debug, Clone, Default)]
#[reflect(Component, Default)]
pub struct InteractionObject {
    pub definition: Handle<InteractionDefinition>,
    /// Parent of the object's [`InteractionTarget`]s, and what gets carried on pick up. Defaults
    /// to the object itself.
    ///
    /// [`InteractionTarget`]: bevy_interaction_ik_core::target::InteractionTarget
    pub targets_root: Option<Entity>,
}

impl InteractionObject {
    pub fn new(definition: Handle<InteractionDefinition>) -> Self {
        Self {
            definition,
            targets_root: None,
        }
    }

    pub fn with_targets_root(mut self, targets_root: Entity) -> Self {
        self.targets_root = Some(targets_root);
        self
    }
}
