//! Interaction state machine for a single full-body IK effector.
//!
//! Each frame runs in two phases around the external solver:
//!
//! 1. Pre-solve: [`InteractionEffector::update`], then [`InteractionEffector::switch`] and
//!    [`InteractionEffector::reset_to_defaults`]. These advance the interaction, fire its events
//!    and write effector targets, weights and chain parameters onto the rig.
//! 2. Post-solve: [`InteractionEffector::post_solve`] rotates the solved bone and hands back the
//!    deferred re-parenting of a picked up object.

mod blend;
mod session;
#[cfg(test)]
mod tests;

pub use blend::{BlendState, ChannelSnapshot, ResetBlend, SwitchBlend};

use bevy::{
    ecs::entity::Entity,
    log::{debug, warn},
    math::{Quat, Vec3},
    transform::components::Transform,
};

use crate::{
    channel::{ChannelMask, WeightChannel},
    errors::InteractionError,
    interpolation::{lerp, lerp_vec3, slerp},
    limb::FullBodyEffector,
    notice::{InteractionNotice, NoticeKind},
    rig::EffectorRig,
    scene::EffectorContext,
};
use session::Session;

/// Object re-parenting requested by the post-solve phase after a pick up: `object_root` is to
/// become a child of the effector's bone, as if the bone stood at `bone_position`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReparentRequest {
    pub object_root: Entity,
    pub bone_position: Vec3,
}

/// Last rotate-bone values outside of a switch, blended from while switching.
#[derive(Debug, Clone, Copy, PartialEq)]
struct RotateBoneMemo {
    weight: f32,
    local_rotation: Quat,
}

impl Default for RotateBoneMemo {
    fn default() -> Self {
        Self {
            weight: 0.,
            local_rotation: Quat::IDENTITY,
        }
    }
}

#[derive(Debug, Clone)]
pub struct InteractionEffector {
    effector_type: FullBodyEffector,
    session: Option<Session>,
    defaults: ChannelSnapshot,
    /// The reset blend has completed since the last interaction.
    at_defaults: bool,
    /// Channels driven by the current (or last) interaction.
    used: ChannelMask,
    blend: BlendState,
    rotate_bone: RotateBoneMemo,
}

impl InteractionEffector {
    pub fn new(effector_type: FullBodyEffector) -> Self {
        Self {
            effector_type,
            session: None,
            defaults: ChannelSnapshot::default(),
            at_defaults: true,
            used: ChannelMask::empty(),
            blend: BlendState::Idle,
            rotate_bone: RotateBoneMemo::default(),
        }
    }

    /// Captures the rig's current values as the defaults to return to after interactions.
    pub fn initiate(&mut self, rig: &dyn EffectorRig) {
        self.store_defaults(rig);
        self.at_defaults = true;
    }

    pub fn store_defaults(&mut self, rig: &dyn EffectorRig) {
        self.defaults = ChannelSnapshot::capture(rig);
    }

    pub fn effector_type(&self) -> FullBodyEffector {
        self.effector_type
    }

    pub fn in_interaction(&self) -> bool {
        self.session.is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.paused.is_some())
    }

    pub fn is_picked_up(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.carry.is_some())
    }

    /// The object being interacted with.
    pub fn object(&self) -> Option<Entity> {
        self.session.as_ref().map(|s| s.object)
    }

    /// Normalized progress of the interaction, 0 when idle.
    pub fn progress(&self) -> f32 {
        self.session.as_ref().map_or(0., Session::progress)
    }

    pub fn timer(&self) -> f32 {
        self.session.as_ref().map_or(0., |s| s.timer)
    }

    pub fn weight(&self) -> f32 {
        self.session.as_ref().map_or(0., |s| s.weight)
    }

    pub fn blend(&self) -> &BlendState {
        &self.blend
    }

    pub fn defaults(&self) -> &ChannelSnapshot {
        &self.defaults
    }

    pub fn at_defaults(&self) -> bool {
        self.at_defaults
    }

    fn notice(&self, object: Entity, kind: NoticeKind) -> InteractionNotice {
        InteractionNotice {
            effector: self.effector_type,
            object,
            kind,
        }
    }

    /// Starts interacting with `object`, reaching for its first target matching this effector
    /// and `tag`, or for the object itself when there is none.
    pub fn start(
        &mut self,
        ctx: &mut EffectorContext<'_>,
        object: Entity,
        tag: &str,
        fade_in_time: f32,
        interrupt: bool,
    ) -> Result<(), InteractionError> {
        if self.in_interaction() && !interrupt {
            return Err(InteractionError::AlreadyInInteraction(self.effector_type));
        }
        let interaction_target = ctx.scene.find_target(object, self.effector_type, tag);
        self.start_with_target(ctx, object, interaction_target, fade_in_time, interrupt)
    }

    pub fn start_with_target(
        &mut self,
        ctx: &mut EffectorContext<'_>,
        object: Entity,
        interaction_target: Option<Entity>,
        fade_in_time: f32,
        interrupt: bool,
    ) -> Result<(), InteractionError> {
        if self.in_interaction() && !interrupt {
            return Err(InteractionError::AlreadyInInteraction(self.effector_type));
        }

        let scene = ctx.scene;
        let definition = scene
            .definition(object)
            .ok_or(InteractionError::MissingDefinition(object))?;
        let target = interaction_target.unwrap_or(object);
        if scene.world_transform(target).is_none() {
            return Err(InteractionError::MissingTarget(target));
        }

        let used = definition.used_channels(ctx.poser.is_some());

        if self.in_interaction() {
            self.at_defaults = false;
            self.blend = BlendState::Switching(SwitchBlend::new(
                ChannelSnapshot::capture(&*ctx.rig),
                used,
            ));
        } else {
            // Fade in from where the bone actually is, not from a stale solver target
            let bone = ctx.rig.bone();
            let mut pose = ctx.rig.effector();
            pose.position = bone.position;
            pose.rotation = bone.rotation;
            ctx.rig.set_effector(pose);
            self.blend = BlendState::Idle;
        }

        ctx.notices.push(self.notice(object, NoticeKind::Started));

        if let Some(poser) = ctx.poser.as_deref_mut()
            && used.has(WeightChannel::PoserWeight)
        {
            if !poser.has_pose_root() {
                poser.set_weight(0.);
            }
            match interaction_target.and_then(|e| scene.target(e).map(|t| (e, t))) {
                Some((entity, target)) => {
                    if target.use_poser {
                        poser.set_pose_root(Some(entity), ctx.switch_interaction_speed);
                    }
                }
                None => poser.set_pose_root(None, ctx.switch_interaction_speed),
            }
        }

        if self.at_defaults {
            self.store_defaults(&*ctx.rig);
        }

        self.used = used;
        self.session = Some(Session::new(
            object,
            target,
            interaction_target,
            definition,
            fade_in_time,
        ));

        Ok(())
    }

    /// Holds the interaction, pinning the effector relative to its target.
    pub fn pause(&mut self, ctx: &mut EffectorContext<'_>) -> Result<(), InteractionError> {
        let Some(session) = self.session.as_mut() else {
            return Err(InteractionError::NotInInteraction(self.effector_type));
        };
        let target = ctx
            .scene
            .world_transform(session.target)
            .ok_or(InteractionError::MissingTarget(session.target))?;
        session.pause(self.effector_type, &target, ctx);
        Ok(())
    }

    pub fn resume(&mut self, ctx: &mut EffectorContext<'_>) -> Result<(), InteractionError> {
        let Some(session) = self.session.as_mut() else {
            return Err(InteractionError::NotInInteraction(self.effector_type));
        };
        session.resume(self.effector_type, ctx);
        Ok(())
    }

    /// Ends the interaction. Events that have not fired yet fire now, and the effector starts
    /// blending back to its defaults.
    pub fn stop(&mut self, ctx: &mut EffectorContext<'_>) -> Result<(), InteractionError> {
        let Some(session) = self.session.take() else {
            return Err(InteractionError::NotInInteraction(self.effector_type));
        };
        self.finish(session, ctx);
        Ok(())
    }

    fn finish(&mut self, mut session: Session, ctx: &mut EffectorContext<'_>) {
        let scene = ctx.scene;
        if let Some(definition) = scene.definition(session.object) {
            session.trigger_untriggered_events(definition, false, self.effector_type, ctx.notices);
        }
        ctx.notices.push(self.notice(session.object, NoticeKind::Stopped));

        self.at_defaults = false;
        self.blend = BlendState::Resetting(ResetBlend::new(self.used));
    }

    /// Drops an interaction whose object went away without being stopped.
    fn abandon_session(&mut self) {
        self.session = None;
        self.at_defaults = false;
        self.blend = BlendState::Resetting(ResetBlend::new(self.used));
    }

    /// Pre-solve step: advances the interaction and writes it onto the rig.
    pub fn update(
        &mut self,
        ctx: &mut EffectorContext<'_>,
        root: &Transform,
        speed: f32,
        delta: f32,
    ) {
        let effector_type = self.effector_type;
        let Some(session) = self.session.as_mut() else {
            return;
        };

        let scene = ctx.scene;
        let (Some(definition), Some(target_transform)) = (
            scene.definition(session.object),
            scene.world_transform(session.target),
        ) else {
            debug!(
                "Interaction object {:?} of {:?} is gone, resetting to defaults",
                session.object, effector_type
            );
            self.abandon_session();
            return;
        };
        let interaction_target = session.interaction_target.and_then(|e| scene.target(e));

        if let Some(anchor) = session.paused {
            if session.carry.is_none() {
                let mut pose = ctx.rig.effector();
                pose.position = target_transform.transform_point(anchor.position);
                pose.rotation = target_transform.rotation * anchor.rotation;
                ctx.rig.set_effector(pose);
            }
            definition.apply(
                &mut *ctx.rig,
                interaction_target,
                session.timer,
                session.weight,
                true,
                root.rotation,
            );
            return;
        }

        let speed_mlp = interaction_target.map_or(1., |t| t.interaction_speed_mlp);
        session.timer += delta * speed * speed_mlp;
        session.weight = (session.weight + delta * session.fade_in_speed * speed).clamp(0., 1.);

        let outcome =
            session.trigger_untriggered_events(definition, true, effector_type, ctx.notices);

        let (target_position, target_rotation) = match session.carry {
            Some(carry) => (
                ctx.system_transform.transform_point(carry.position),
                ctx.system_transform.rotation * carry.rotation,
            ),
            None => (target_transform.translation, target_transform.rotation),
        };

        let bone = ctx.rig.bone();
        let mut pose = ctx.rig.effector();
        pose.position = lerp_vec3(bone.position, target_position, session.weight);
        pose.rotation = slerp(bone.rotation, target_rotation, session.weight);
        ctx.rig.set_effector(pose);

        definition.apply(
            &mut *ctx.rig,
            interaction_target,
            session.timer,
            session.weight,
            false,
            root.rotation,
        );

        if outcome.pick_up {
            session.pick_up(effector_type, root, ctx);
        }
        if outcome.pause {
            session.pause(effector_type, &target_transform, ctx);
        }

        let poser_weight =
            definition.value(WeightChannel::PoserWeight, interaction_target, session.timer);
        match ctx.poser.as_deref_mut() {
            Some(poser) if self.used.has(WeightChannel::PoserWeight) => {
                poser.set_weight(lerp(poser.weight(), poser_weight, session.weight));
            }
            _ => {
                if poser_weight > 0. && !session.poser_warned {
                    warn!(
                        "Interaction object {:?} drives the poser weight, but the bone of {:?} has no poser attached",
                        session.object, effector_type
                    );
                    session.poser_warned = true;
                }
            }
        }

        if session.timer >= session.length
            && let Some(session) = self.session.take()
        {
            self.finish(session, ctx);
        }
    }

    /// Post-solve step: rotates the solved bone by the rotate-bone curve and returns the pending
    /// re-parent of a freshly picked up object.
    pub fn post_solve(&mut self, ctx: &mut EffectorContext<'_>) -> Option<ReparentRequest> {
        let session = self.session.as_mut()?;
        let scene = ctx.scene;
        let definition = scene.definition(session.object)?;
        let interaction_target = session.interaction_target.and_then(|e| scene.target(e));

        let switch_timer = match &self.blend {
            BlendState::Switching(blend) => Some(blend.timer),
            _ => None,
        };

        let mut rotate_bone_weight = definition.value(
            WeightChannel::RotateBoneWeight,
            interaction_target,
            session.timer,
        ) * session.weight;
        match switch_timer {
            Some(t) => rotate_bone_weight = lerp(self.rotate_bone.weight, rotate_bone_weight, t),
            None => self.rotate_bone.weight = rotate_bone_weight,
        }

        let carried_rotation = session
            .carry
            .map(|carry| ctx.system_transform.rotation * carry.rotation);

        if rotate_bone_weight > 0. {
            let bone = ctx.rig.bone();
            let towards = carried_rotation.unwrap_or_else(|| ctx.rig.effector().rotation);
            let rotation = slerp(
                bone.rotation,
                towards,
                rotate_bone_weight * rotate_bone_weight,
            );
            ctx.rig
                .set_bone_local_rotation(bone.parent_rotation.inverse() * rotation);
        }

        match switch_timer {
            Some(t) => {
                let local = ctx.rig.bone().local_rotation;
                ctx.rig
                    .set_bone_local_rotation(slerp(self.rotate_bone.local_rotation, local, t));
            }
            None => self.rotate_bone.local_rotation = ctx.rig.bone().local_rotation,
        }

        if !session.reparent_pending {
            return None;
        }
        session.reparent_pending = false;
        let carry = session.carry?;
        Some(ReparentRequest {
            object_root: scene.targets_root(session.object),
            bone_position: ctx.system_transform.transform_point(carry.position),
        })
    }

    /// Crossfades from an interrupted interaction into the current one. Returns `false` when no
    /// switch is running.
    pub fn switch(&mut self, rig: &mut dyn EffectorRig, speed: f32, delta: f32) -> bool {
        let BlendState::Switching(blend) = &mut self.blend else {
            return false;
        };
        if blend.advance(rig, speed, delta) {
            self.blend = BlendState::Idle;
        }
        true
    }

    /// Crossfades back to the defaults once idle. Returns `false` when there is nothing to reset.
    pub fn reset_to_defaults(&mut self, rig: &mut dyn EffectorRig, speed: f32, delta: f32) -> bool {
        if self.session.is_some() || self.at_defaults {
            return false;
        }
        let BlendState::Resetting(blend) = &mut self.blend else {
            return false;
        };
        if blend.advance(rig, &self.defaults, speed, delta) {
            self.blend = BlendState::Idle;
            self.at_defaults = true;
        }
        true
    }
}
