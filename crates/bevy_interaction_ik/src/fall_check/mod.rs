//! Fall detection for characters standing on tagged support surfaces (pillars, platforms...).
//!
//! Each frame a ray is cast down from the character's head. Once no collider carrying the
//! support tag is found below it, the character has fallen: a [`PlayerFell`] message is written
//! and every entity carrying the support tag is despawned. This happens at most once per checker.

use bevy::{ecs::prelude::*, log::prelude::*, reflect::prelude::*};

#[cfg(feature = "physics_avian")]
mod probe;

#[cfg(feature = "physics_avian")]
pub use probe::probe_head_support;

/// Gameplay tag of an entity, matched against [`HeadRaycastChecker::support_tag`].
#[derive(Component, Reflect, Debug, Clone, PartialEq, Eq, Hash)]
#[reflect(Component)]
pub struct Tag(pub String);

impl Tag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }
}

/// Outcome of the last downward probe.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeadSupport {
    /// Not probed yet.
    #[default]
    Unknown,
    Supported,
    Unsupported,
}

#[derive(Component, Reflect, Debug, Clone)]
#[reflect(Component, Default)]
pub struct HeadRaycastChecker {
    /// Entity the ray is cast from.
    pub head: Option<Entity>,
    pub support_tag: String,
    /// Collision layers the ray goes through.
    pub ignored_layers: u32,
    pub check_distance: f32,
    support: HeadSupport,
    has_fallen: bool,
    #[reflect(ignore)]
    missing_head_reported: bool,
}

impl Default for HeadRaycastChecker {
    fn default() -> Self {
        Self {
            head: None,
            support_tag: "Pillar".into(),
            ignored_layers: 0,
            check_distance: 2.,
            support: HeadSupport::Unknown,
            has_fallen: false,
            missing_head_reported: false,
        }
    }
}

impl HeadRaycastChecker {
    pub fn new(head: Entity) -> Self {
        Self {
            head: Some(head),
            ..Default::default()
        }
    }

    pub fn with_support_tag(mut self, tag: impl Into<String>) -> Self {
        self.support_tag = tag.into();
        self
    }

    pub fn with_ignored_layers(mut self, layers: u32) -> Self {
        self.ignored_layers = layers;
        self
    }

    pub fn with_check_distance(mut self, distance: f32) -> Self {
        self.check_distance = distance;
        self
    }

    pub fn has_fallen(&self) -> bool {
        self.has_fallen
    }

    pub fn support(&self) -> HeadSupport {
        self.support
    }

    /// Records the result of a probe. Without the `physics_avian` feature, call this from your own
    /// probing system.
    pub fn record_support(&mut self, supported: bool) {
        self.support = if supported {
            HeadSupport::Supported
        } else {
            HeadSupport::Unsupported
        };
    }

    /// A checker without a head never falls.
    pub(crate) fn report_missing_head(&mut self, checker: Entity) {
        if !self.missing_head_reported {
            error!(
                "HeadRaycastChecker on {:?} has no valid head entity, assuming it stands on support",
                checker
            );
            self.missing_head_reported = true;
        }
        self.record_support(true);
    }
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerFell {
    /// Entity carrying the [`HeadRaycastChecker`].
    pub checker: Entity,
}

pub fn detect_fall(
    mut commands: Commands,
    mut checkers: Query<(Entity, &mut HeadRaycastChecker)>,
    tagged: Query<(Entity, &Tag)>,
    mut fell: MessageWriter<PlayerFell>,
) {
    for (entity, mut checker) in &mut checkers {
        if checker.has_fallen || checker.support != HeadSupport::Unsupported {
            continue;
        }
        checker.has_fallen = true;

        info!(
            "{:?} fell: no {:?} below its head",
            entity, checker.support_tag
        );
        fell.write(PlayerFell { checker: entity });

        let mut despawned = 0;
        for (tagged_entity, tag) in &tagged {
            if tag.0 != checker.support_tag {
                continue;
            }
            info!("Despawning {:?} ({})", tagged_entity, tag.0);
            commands.entity(tagged_entity).despawn();
            despawned += 1;
        }
        info!(
            "Despawned {} entities tagged {:?}",
            despawned, checker.support_tag
        );
    }
}
