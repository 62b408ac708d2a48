use bevy::{
    ecs::entity::Entity,
    math::{Quat, Vec3},
    transform::components::Transform,
};

use crate::{
    definition::InteractionDefinition,
    interpolation::inverse_transform_point,
    limb::FullBodyEffector,
    notice::{InteractionNotice, NoticeKind},
    scene::EffectorContext,
};

/// Effector pose relative to the target, held while paused.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct PauseAnchor {
    pub position: Vec3,
    pub rotation: Quat,
}

/// Where a picked up object is carried. The position is relative to the character root and the
/// rotation relative to the interaction system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct CarryFrame {
    pub position: Vec3,
    pub rotation: Quat,
}

#[derive(Debug, Default, Clone, Copy)]
pub(super) struct EventOutcome {
    pub pick_up: bool,
    pub pause: bool,
}

#[derive(Debug, Clone)]
pub(super) struct Session {
    pub object: Entity,
    pub target: Entity,
    pub interaction_target: Option<Entity>,
    pub timer: f32,
    pub weight: f32,
    pub length: f32,
    pub fade_in_speed: f32,
    pub paused: Option<PauseAnchor>,
    pub carry: Option<CarryFrame>,
    /// Set on pick up, consumed by the next post-solve pass.
    pub reparent_pending: bool,
    pub triggered: Vec<bool>,
    pub poser_warned: bool,
}

impl Session {
    pub fn new(
        object: Entity,
        target: Entity,
        interaction_target: Option<Entity>,
        definition: &InteractionDefinition,
        fade_in_time: f32,
    ) -> Self {
        Self {
            object,
            target,
            interaction_target,
            timer: 0.,
            weight: 0.,
            length: definition.length(),
            fade_in_speed: if fade_in_time > 0. {
                1. / fade_in_time
            } else {
                1000.
            },
            paused: None,
            carry: None,
            reparent_pending: false,
            triggered: vec![false; definition.events.len()],
            poser_warned: false,
        }
    }

    fn notice(&self, effector: FullBodyEffector, kind: NoticeKind) -> InteractionNotice {
        InteractionNotice {
            effector,
            object: self.object,
            kind,
        }
    }

    /// Fires every event that has not fired yet in this session and whose time has passed, or
    /// all of them when `check_time` is false. Pick-up and pause events pull the timer back to
    /// their exact time.
    pub fn trigger_untriggered_events(
        &mut self,
        definition: &InteractionDefinition,
        check_time: bool,
        effector: FullBodyEffector,
        notices: &mut Vec<InteractionNotice>,
    ) -> EventOutcome {
        let mut outcome = EventOutcome::default();

        for (index, event) in definition.events.iter().enumerate() {
            let Some(triggered) = self.triggered.get(index).copied() else {
                break;
            };
            if triggered || (check_time && event.time >= self.timer) {
                continue;
            }

            if event.pick_up {
                self.timer = self.timer.min(event.time);
                outcome.pick_up = true;
            }
            if event.pause {
                self.timer = self.timer.min(event.time);
                outcome.pause = true;
            }

            notices.push(self.notice(
                effector,
                NoticeKind::Event {
                    index,
                    time: event.time,
                    messages: event.messages.clone(),
                },
            ));
            self.triggered[index] = true;
        }

        outcome
    }

    pub fn pause(
        &mut self,
        effector: FullBodyEffector,
        target: &Transform,
        ctx: &mut EffectorContext<'_>,
    ) {
        let pose = ctx.rig.effector();
        self.paused = Some(PauseAnchor {
            position: inverse_transform_point(target, pose.position),
            rotation: target.rotation.inverse() * pose.rotation,
        });
        ctx.notices.push(self.notice(effector, NoticeKind::Paused));
    }

    pub fn pick_up(
        &mut self,
        effector: FullBodyEffector,
        root: &Transform,
        ctx: &mut EffectorContext<'_>,
    ) {
        let pose = ctx.rig.effector();
        self.carry = Some(CarryFrame {
            position: inverse_transform_point(root, pose.position),
            rotation: ctx.system_transform.rotation.inverse() * pose.rotation,
        });
        self.reparent_pending = true;
        ctx.notices.push(self.notice(effector, NoticeKind::PickedUp));
    }

    pub fn resume(&mut self, effector: FullBodyEffector, ctx: &mut EffectorContext<'_>) {
        self.paused = None;
        ctx.notices.push(self.notice(effector, NoticeKind::Resumed));
    }

    pub fn progress(&self) -> f32 {
        if self.length == 0. {
            0.
        } else {
            self.timer / self.length
        }
    }
}
