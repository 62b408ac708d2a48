use bevy::{
    ecs::{entity::Entity, world::World},
    math::{Quat, Vec3},
    transform::components::Transform,
};

use super::*;
use crate::{
    curve::KeyframeCurve,
    definition::{InteractionDefinition, InteractionEvent},
    rig::{BonePose, PoserHandle},
    target::InteractionTarget,
    testing::{MockPoser, MockRig, MockScene},
};

struct Fixture {
    world: World,
    rig: MockRig,
    poser: Option<MockPoser>,
    scene: MockScene,
    notices: Vec<InteractionNotice>,
    system: Transform,
    effector: InteractionEffector,
}

impl Fixture {
    fn new() -> Self {
        let rig = MockRig::end_effector();
        let mut effector = InteractionEffector::new(FullBodyEffector::LeftHand);
        effector.initiate(&rig);
        Self {
            world: World::new(),
            rig,
            poser: None,
            scene: MockScene::default(),
            notices: Vec::new(),
            system: Transform::IDENTITY,
            effector,
        }
    }

    fn entity(&mut self) -> Entity {
        self.world.spawn_empty().id()
    }

    fn object(&mut self, definition: InteractionDefinition, position: Vec3) -> Entity {
        let object = self.entity();
        self.scene
            .add_object(object, definition, Transform::from_translation(position));
        object
    }

    fn with_ctx<R>(
        &mut self,
        f: impl FnOnce(&mut InteractionEffector, &mut EffectorContext<'_>) -> R,
    ) -> R {
        let mut ctx = EffectorContext {
            rig: &mut self.rig,
            poser: self.poser.as_mut().map(|p| p as &mut dyn PoserHandle),
            scene: &self.scene,
            system_transform: self.system,
            switch_interaction_speed: 1.,
            notices: &mut self.notices,
        };
        f(&mut self.effector, &mut ctx)
    }

    fn start(
        &mut self,
        object: Entity,
        fade_in_time: f32,
        interrupt: bool,
    ) -> Result<(), InteractionError> {
        self.with_ctx(|e, ctx| e.start(ctx, object, "", fade_in_time, interrupt))
    }

    fn step(&mut self, delta: f32) -> Option<ReparentRequest> {
        let root = self.system;
        self.with_ctx(|e, ctx| {
            e.update(ctx, &root, 1., delta);
            e.switch(&mut *ctx.rig, 1., delta);
            e.reset_to_defaults(&mut *ctx.rig, 1., delta);
            e.post_solve(ctx)
        })
    }

    fn steps(&mut self, count: usize, delta: f32) {
        for _ in 0..count {
            self.step(delta);
        }
    }

    fn count(&self, predicate: impl Fn(&NoticeKind) -> bool) -> usize {
        self.notices.iter().filter(|n| predicate(&n.kind)).count()
    }
}

/// `channel` held at `value` for `length` seconds.
fn hold(channel: WeightChannel, value: f32, length: f32) -> InteractionDefinition {
    InteractionDefinition::default()
        .with_curve(channel, KeyframeCurve::linear(&[(0., value), (length, value)]))
}

fn event(time: f32) -> InteractionEvent {
    InteractionEvent {
        time,
        ..Default::default()
    }
}

#[test]
fn fades_in_and_stops_at_the_end() {
    let mut fx = Fixture::new();
    let object = fx.object(hold(WeightChannel::PositionWeight, 1., 2.), Vec3::X);

    assert!(!fx.effector.in_interaction());
    fx.start(object, 0.5, false).unwrap();
    assert!(fx.effector.in_interaction());
    assert_eq!(fx.effector.object(), Some(object));

    fx.steps(5, 0.1);
    assert!((fx.effector.weight() - 1.).abs() < 1e-5);

    fx.steps(14, 0.1);
    assert!(fx.effector.in_interaction());
    assert!(fx.effector.weight() <= 1.);
    assert!(fx.effector.timer() < 2.);

    fx.step(0.1);
    assert!(!fx.effector.in_interaction());
    assert_eq!(fx.notices.first().map(|n| &n.kind), Some(&NoticeKind::Started));
    assert_eq!(fx.notices.last().map(|n| &n.kind), Some(&NoticeKind::Stopped));
    assert!(matches!(fx.effector.blend(), BlendState::Resetting(_)));
}

#[test]
fn zero_fade_in_time_is_instant() {
    let mut fx = Fixture::new();
    let object = fx.object(hold(WeightChannel::PositionWeight, 1., 2.), Vec3::X);

    fx.start(object, 0., false).unwrap();
    fx.step(0.016);
    assert_eq!(fx.effector.weight(), 1.);
}

#[test]
fn effector_starts_from_the_bone() {
    let mut fx = Fixture::new();
    fx.rig.bone.position = Vec3::new(0., 1., 0.);
    fx.rig.pose.position = Vec3::splat(5.);
    let object = fx.object(hold(WeightChannel::PositionWeight, 1., 2.), Vec3::X);

    fx.start(object, 0.3, false).unwrap();
    assert_eq!(fx.rig.pose.position, Vec3::new(0., 1., 0.));
}

#[test]
fn events_fire_once_and_the_rest_fire_on_stop() {
    let mut fx = Fixture::new();
    let definition = hold(WeightChannel::PositionWeight, 1., 2.)
        .with_event(InteractionEvent {
            messages: vec!["first".into()],
            ..event(0.5)
        })
        .with_event(event(1.5));
    let object = fx.object(definition, Vec3::X);

    fx.start(object, 0.3, false).unwrap();
    fx.steps(10, 0.1);

    let fired = |fx: &Fixture, i: usize| {
        fx.count(|k| matches!(k, NoticeKind::Event { index, .. } if *index == i))
    };
    assert_eq!(fired(&fx, 0), 1);
    assert_eq!(fired(&fx, 1), 0);
    assert!(fx.notices.iter().any(|n| matches!(
        &n.kind,
        NoticeKind::Event { messages, .. } if messages == &vec!["first".to_string()]
    )));

    fx.with_ctx(|e, ctx| e.stop(ctx)).unwrap();
    assert_eq!(fired(&fx, 0), 1);
    assert_eq!(fired(&fx, 1), 1);
    assert_eq!(fx.notices.last().map(|n| &n.kind), Some(&NoticeKind::Stopped));
}

#[test]
fn pause_event_holds_the_timer_and_follows_the_target() {
    let mut fx = Fixture::new();
    let definition = hold(WeightChannel::PositionWeight, 1., 3.).with_event(InteractionEvent {
        pause: true,
        ..event(1.)
    });
    let object = fx.object(definition, Vec3::X);

    fx.start(object, 0., false).unwrap();
    fx.steps(4, 0.3);
    assert!(fx.effector.is_paused());
    assert_eq!(fx.effector.timer(), 1.);
    assert_eq!(fx.count(|k| *k == NoticeKind::Paused), 1);

    fx.steps(3, 0.3);
    assert_eq!(fx.effector.timer(), 1.);

    fx.scene
        .transforms
        .insert(object, Transform::from_xyz(1., 2., 0.));
    fx.step(0.3);
    assert!(fx.rig.pose.position.abs_diff_eq(Vec3::new(1., 2., 0.), 1e-5));

    fx.with_ctx(|e, ctx| e.resume(ctx)).unwrap();
    assert!(!fx.effector.is_paused());
    fx.step(0.3);
    assert!(fx.effector.timer() > 1.);
    assert_eq!(fx.count(|k| *k == NoticeKind::Resumed), 1);
}

#[test]
fn pick_up_carries_the_object_and_requests_reparenting_once() {
    let mut fx = Fixture::new();
    let definition = hold(WeightChannel::PositionWeight, 1., 3.).with_event(InteractionEvent {
        pick_up: true,
        ..event(1.)
    });
    let object = fx.object(definition, Vec3::X);

    fx.start(object, 0., false).unwrap();
    for _ in 0..3 {
        assert_eq!(fx.step(0.3), None);
    }
    let request = fx.step(0.3).expect("reparent request on pick up");
    assert_eq!(fx.effector.timer(), 1.);
    assert!(fx.effector.is_picked_up());
    assert_eq!(request.object_root, object);
    assert!(request.bone_position.abs_diff_eq(Vec3::X, 1e-5));
    assert_eq!(fx.count(|k| *k == NoticeKind::PickedUp), 1);

    fx.system = Transform::from_xyz(0., 0., 2.);
    assert_eq!(fx.step(0.3), None);
    assert!(fx.rig.pose.position.abs_diff_eq(Vec3::new(1., 0., 2.), 1e-5));
}

#[test]
fn interrupting_crossfades_into_the_new_interaction() {
    let mut fx = Fixture::new();
    let first = fx.object(hold(WeightChannel::PositionWeight, 1., 3.), Vec3::X);
    let second = fx.object(hold(WeightChannel::PositionWeight, 1., 3.), Vec3::new(0., 0., 5.));

    fx.start(first, 0., false).unwrap();
    fx.steps(3, 0.1);
    assert!(fx.rig.pose.position.abs_diff_eq(Vec3::X, 1e-5));

    fx.start(second, 0., true).unwrap();
    assert!(matches!(fx.effector.blend(), BlendState::Switching(_)));
    assert_eq!(fx.effector.object(), Some(second));

    fx.step(0.1);
    assert!(fx.rig.pose.position.abs_diff_eq(Vec3::new(0.9, 0., 0.5), 1e-4));

    fx.steps(11, 0.1);
    assert_eq!(fx.effector.blend(), &BlendState::Idle);
    assert!(fx.rig.pose.position.abs_diff_eq(Vec3::new(0., 0., 5.), 1e-4));
}

#[test]
fn stopping_cancels_a_running_switch() {
    let mut fx = Fixture::new();
    let first = fx.object(hold(WeightChannel::PositionWeight, 1., 3.), Vec3::X);
    let second = fx.object(hold(WeightChannel::PositionWeight, 1., 3.), Vec3::Z);

    fx.start(first, 0., false).unwrap();
    fx.step(0.1);
    fx.start(second, 0., true).unwrap();
    fx.step(0.1);
    fx.with_ctx(|e, ctx| e.stop(ctx)).unwrap();

    assert!(matches!(fx.effector.blend(), BlendState::Resetting(_)));
}

#[test]
fn requests_are_rejected_in_the_wrong_state() {
    let mut fx = Fixture::new();
    let object = fx.object(hold(WeightChannel::PositionWeight, 1., 2.), Vec3::X);
    let unknown = fx.entity();
    let hand = FullBodyEffector::LeftHand;

    assert_eq!(
        fx.with_ctx(|e, ctx| e.pause(ctx)),
        Err(InteractionError::NotInInteraction(hand))
    );
    assert_eq!(
        fx.with_ctx(|e, ctx| e.resume(ctx)),
        Err(InteractionError::NotInInteraction(hand))
    );
    assert_eq!(
        fx.with_ctx(|e, ctx| e.stop(ctx)),
        Err(InteractionError::NotInInteraction(hand))
    );
    assert_eq!(
        fx.start(unknown, 0.3, false),
        Err(InteractionError::MissingDefinition(unknown))
    );

    fx.start(object, 0.3, false).unwrap();
    assert_eq!(
        fx.start(object, 0.3, false),
        Err(InteractionError::AlreadyInInteraction(hand))
    );
    assert_eq!(fx.count(|k| *k == NoticeKind::Started), 1);
}

#[test]
fn vanished_object_ends_the_interaction_silently() {
    let mut fx = Fixture::new();
    let object = fx.object(hold(WeightChannel::PositionWeight, 1., 2.), Vec3::X);

    fx.start(object, 0.3, false).unwrap();
    fx.steps(2, 0.1);
    fx.scene.definitions.remove(&object);
    fx.step(0.1);

    assert!(!fx.effector.in_interaction());
    assert!(matches!(fx.effector.blend(), BlendState::Resetting(_)));
    assert_eq!(fx.count(|k| *k == NoticeKind::Stopped), 0);
}

#[test]
fn resets_to_defaults_after_stopping() {
    let mut fx = Fixture::new();
    let definition = hold(WeightChannel::PositionWeight, 1., 1.)
        .with_curve(WeightChannel::Pull, KeyframeCurve::linear(&[(0., 0.2), (1., 0.2)]));
    let object = fx.object(definition, Vec3::X);

    fx.start(object, 0., false).unwrap();
    fx.steps(5, 0.1);
    assert!((fx.rig.pose.position_weight - 1.).abs() < 1e-5);
    assert!((fx.rig.chain.pull - 0.2).abs() < 1e-5);

    fx.steps(30, 0.1);
    assert!(!fx.effector.in_interaction());
    assert!(fx.effector.at_defaults());
    assert_eq!(fx.effector.blend(), &BlendState::Idle);
    assert_eq!(fx.rig.pose.position_weight, 0.);
    assert_eq!(fx.rig.chain.pull, 1.);
}

#[test]
fn drives_the_poser_towards_the_target() {
    let mut fx = Fixture::new();
    fx.poser = Some(MockPoser {
        weight: 0.7,
        ..Default::default()
    });
    let definition = hold(WeightChannel::PoserWeight, 1., 2.);
    let object = fx.object(definition, Vec3::X);
    let target = fx.entity();
    fx.scene.add_target(
        object,
        target,
        InteractionTarget::new(FullBodyEffector::LeftHand),
        Transform::from_xyz(0., 1., 0.),
    );

    fx.start(object, 0., false).unwrap();
    let poser = fx.poser.as_ref().unwrap();
    assert_eq!(poser.weight, 0.);
    assert_eq!(poser.pose_root, Some(target));

    fx.step(0.1);
    assert!((fx.poser.as_ref().unwrap().weight - 1.).abs() < 1e-5);
    assert!(fx.rig.pose.position.abs_diff_eq(Vec3::new(0., 1., 0.), 1e-5));
}

#[test]
fn tagged_targets_are_matched() {
    let mut fx = Fixture::new();
    let object = fx.object(hold(WeightChannel::PositionWeight, 1., 2.), Vec3::X);
    let grab = fx.entity();
    let push = fx.entity();
    fx.scene.add_target(
        object,
        grab,
        InteractionTarget::new(FullBodyEffector::LeftHand).with_tag("grab"),
        Transform::from_xyz(0., 1., 0.),
    );
    fx.scene.add_target(
        object,
        push,
        InteractionTarget::new(FullBodyEffector::LeftHand).with_tag("push"),
        Transform::from_xyz(0., 2., 0.),
    );

    fx.with_ctx(|e, ctx| e.start(ctx, object, "push", 0., false)).unwrap();
    fx.step(0.1);
    assert!(fx.rig.pose.position.abs_diff_eq(Vec3::new(0., 2., 0.), 1e-5));
}

#[test]
fn rotate_bone_weight_is_applied_squared() {
    let mut fx = Fixture::new();
    let definition = hold(WeightChannel::RotateBoneWeight, 0.5, 2.);
    let object = fx.entity();
    fx.scene.add_object(
        object,
        definition,
        Transform::from_rotation(Quat::from_rotation_y(1.)),
    );

    fx.start(object, 0., false).unwrap();
    fx.step(0.1);

    let expected = Quat::from_rotation_y(0.25);
    assert!(fx.rig.bone.local_rotation.angle_between(expected) < 1e-4);
}

#[test]
fn progress_is_normalized() {
    let mut fx = Fixture::new();
    let object = fx.object(hold(WeightChannel::PositionWeight, 1., 2.), Vec3::X);

    assert_eq!(fx.effector.progress(), 0.);
    fx.start(object, 0.3, false).unwrap();
    fx.steps(10, 0.1);
    assert!((fx.effector.progress() - 0.5).abs() < 1e-4);
}

#[test]
fn reaching_the_end_fires_the_remaining_events() {
    let mut fx = Fixture::new();
    let definition = hold(WeightChannel::PositionWeight, 1., 1.).with_event(event(5.));
    let object = fx.object(definition, Vec3::X);

    fx.start(object, 0., false).unwrap();
    fx.steps(11, 0.1);

    assert!(!fx.effector.in_interaction());
    assert_eq!(fx.count(|k| matches!(k, NoticeKind::Event { .. })), 1);
    assert_eq!(fx.count(|k| *k == NoticeKind::Stopped), 1);
    assert_eq!(fx.notices.last().map(|n| &n.kind), Some(&NoticeKind::Stopped));
    assert!(matches!(fx.effector.blend(), BlendState::Resetting(_)));
}

#[test]
fn bone_rotation_crossfades_when_interrupted() {
    let mut fx = Fixture::new();
    let first = fx.entity();
    fx.scene.add_object(
        first,
        hold(WeightChannel::RotateBoneWeight, 0.5, 3.),
        Transform::from_rotation(Quat::from_rotation_y(1.)),
    );
    let second = fx.entity();
    fx.scene.add_object(
        second,
        hold(WeightChannel::RotateBoneWeight, 1., 3.),
        Transform::from_rotation(Quat::from_rotation_y(-1.)),
    );
    // The animation overwrites the bone every frame before the effector runs
    let step = |fx: &mut Fixture| {
        fx.rig.bone = BonePose::default();
        fx.step(0.1);
    };
    let angle = |fx: &Fixture| {
        let (axis, angle) = fx.rig.bone.local_rotation.to_axis_angle();
        angle * axis.y.signum()
    };

    fx.start(first, 0., false).unwrap();
    step(&mut fx);
    assert!((angle(&fx) - 0.25).abs() < 1e-4);

    fx.start(second, 0., true).unwrap();
    step(&mut fx);
    // Weight lerp(0.5, 1, 0.1) applied squared towards -1, then a tenth of the way from 0.25
    let weight: f32 = 0.55;
    let expected = 0.25 + 0.1 * (-(weight * weight) - 0.25);
    assert!((angle(&fx) - expected).abs() < 1e-4);

    for _ in 0..10 {
        step(&mut fx);
    }
    assert_eq!(fx.effector.blend(), &BlendState::Idle);
    assert!((angle(&fx) + 1.).abs() < 1e-4);
}
