use bevy::{
    app::{App, Plugin, PostUpdate},
    asset::AssetApp,
    ecs::{
        intern::Interned,
        schedule::{IntoScheduleConfigs, ScheduleLabel, SystemSet},
    },
    transform::TransformSystems,
};
use bevy_interaction_ik_core::{
    channel::WeightChannel,
    curve::{CurveKey, KeyframeCurve},
    definition::{InteractionDefinition, InteractionEvent, Multiplier, WeightCurve},
    limb::FullBodyEffector,
    rig::{ChainParams, EffectorPose},
    target::{InteractionTarget, TargetMultiplier},
};

use crate::{
    components::{InteractionObject, InteractionSystem},
    fall_check::{HeadRaycastChecker, HeadSupport, PlayerFell, Tag, detect_fall},
    loader::InteractionDefinitionLoader,
    messages::{InteractionMessage, InteractionRequest},
    solver::{FullBodyIk, HandPoser, IkLimb},
    systems::{
        initiate_interaction_effectors, post_solve_interaction_effectors,
        process_interaction_requests, update_interaction_effectors,
    },
};

/// Adds interaction playback and fall checks to an app
pub struct InteractionIkPlugin {
    /// Schedule the interaction sets run in. Needs to run before transform propagation.
    pub schedule: Interned<dyn ScheduleLabel>,
}

impl Default for InteractionIkPlugin {
    fn default() -> Self {
        Self {
            schedule: PostUpdate.intern(),
        }
    }
}

#[derive(Clone, Debug, Copy, PartialEq, Eq, Hash, SystemSet)]
pub enum InteractionSet {
    /// Requests are handled, interactions advanced and effector targets written.
    PreSolve,
    /// The full-body IK solver runs here, reading [`FullBodyIk`].
    Solve,
    /// Bone corrections on top of the solved pose, reparenting of picked up objects.
    PostSolve,
}

impl Plugin for InteractionIkPlugin {
    fn build(&self, app: &mut App) {
        self.register_assets(app);
        self.register_types(app);

        app.add_message::<InteractionRequest>()
            .add_message::<InteractionMessage>()
            .add_message::<PlayerFell>();

        app.configure_sets(
            self.schedule,
            (
                InteractionSet::PreSolve,
                InteractionSet::Solve,
                InteractionSet::PostSolve,
            )
                .chain()
                .before(TransformSystems::Propagate),
        );

        app.add_systems(
            self.schedule,
            (
                initiate_interaction_effectors,
                process_interaction_requests,
                update_interaction_effectors,
                #[cfg(feature = "physics_avian")]
                crate::physics_avian::handle_picked_up_objects,
            )
                .chain()
                .in_set(InteractionSet::PreSolve),
        );

        app.add_systems(
            self.schedule,
            post_solve_interaction_effectors.in_set(InteractionSet::PostSolve),
        );

        app.add_systems(
            self.schedule,
            (
                #[cfg(feature = "physics_avian")]
                crate::fall_check::probe_head_support,
                detect_fall,
            )
                .chain()
                .before(TransformSystems::Propagate),
        );
    }
}

impl InteractionIkPlugin {
    /// Registers asset types and their loaders
    fn register_assets(&self, app: &mut App) {
        app.init_asset::<InteractionDefinition>()
            .init_asset_loader::<InteractionDefinitionLoader>()
            .register_asset_reflect::<InteractionDefinition>();
    }

    fn register_types(&self, app: &mut App) {
        app //
            .register_type::<InteractionSystem>()
            .register_type::<InteractionObject>()
            .register_type::<InteractionTarget>()
            .register_type::<TargetMultiplier>()
            .register_type::<FullBodyIk>()
            .register_type::<IkLimb>()
            .register_type::<HandPoser>()
            .register_type::<FullBodyEffector>()
            .register_type::<WeightChannel>()
            .register_type::<EffectorPose>()
            .register_type::<ChainParams>()
            .register_type::<CurveKey>()
            .register_type::<KeyframeCurve>()
            .register_type::<WeightCurve>()
            .register_type::<Multiplier>()
            .register_type::<InteractionEvent>()
            .register_type::<HeadRaycastChecker>()
            .register_type::<HeadSupport>()
            .register_type::<Tag>();
    }
}
