use bevy::{ecs::prelude::*, log::prelude::*, math::Quat, time::prelude::*, transform::prelude::*};
use bevy_interaction_ik_core::{
    effector::{InteractionEffector, ReparentRequest},
    limb::FullBodyEffector,
    notice::InteractionNotice,
    rig::PoserHandle,
    scene::{EffectorContext, SceneAccess},
};

use crate::{
    components::{InteractionEffectors, InteractionSystem},
    messages::{InteractionMessage, InteractionRequest, InteractionRequestKind},
    scene::InteractionScene,
    solver::{FullBodyIk, HandPoser, LimbRig},
};

/// Runs `f` with an effector context over one limb of `ik`. Returns `None` when the character
/// has no such limb or its bone cannot be resolved, and otherwise the bone rotation written by
/// `f`, if any.
#[allow(clippy::too_many_arguments)]
fn with_limb<R>(
    scene: &InteractionScene,
    posers: &mut Query<&mut HandPoser>,
    ik: &mut FullBodyIk,
    effector: FullBodyEffector,
    system_transform: Transform,
    switch_interaction_speed: f32,
    notices: &mut Vec<InteractionNotice>,
    f: impl FnOnce(&mut EffectorContext<'_>) -> R,
) -> Option<(R, Option<Quat>)> {
    let limb = ik.limbs.get_mut(&effector)?;
    let bone = limb.bone;
    let bone_pose = scene.bone_pose(bone)?;
    let mut poser = posers.get_mut(bone).ok();
    let mut rig = LimbRig::new(limb, effector, bone_pose);

    let result = {
        let mut ctx = EffectorContext {
            rig: &mut rig,
            poser: poser.as_deref_mut().map(|p| p as &mut dyn PoserHandle),
            scene,
            system_transform,
            switch_interaction_speed,
            notices,
        };
        f(&mut ctx)
    };

    Some((result, rig.rotated))
}

/// Creates the runtime state of characters with an interaction system, capturing the current
/// solver values as their defaults.
pub fn initiate_interaction_effectors(
    mut commands: Commands,
    mut characters: Query<
        (Entity, &mut FullBodyIk),
        (With<InteractionSystem>, Without<InteractionEffectors>),
    >,
    scene: InteractionScene,
) {
    for (character, mut ik) in &mut characters {
        let effectors = FullBodyEffector::ALL
            .into_iter()
            .filter_map(|effector_type| {
                let limb = ik.limbs.get_mut(&effector_type)?;
                let bone = scene.bone_pose(limb.bone).unwrap_or_default();
                let mut effector = InteractionEffector::new(effector_type);
                effector.initiate(&LimbRig::new(limb, effector_type, bone));
                Some(effector)
            })
            .collect();

        commands
            .entity(character)
            .insert(InteractionEffectors { effectors });
    }
}

pub fn process_interaction_requests(
    mut requests: MessageReader<InteractionRequest>,
    mut characters: Query<(
        &InteractionSystem,
        &mut InteractionEffectors,
        &mut FullBodyIk,
    )>,
    mut posers: Query<&mut HandPoser>,
    scene: InteractionScene,
    mut messages: MessageWriter<InteractionMessage>,
) {
    let mut notices = Vec::new();

    for request in requests.read() {
        let Ok((config, mut effectors, mut ik)) = characters.get_mut(request.character) else {
            debug!(
                "Ignoring interaction request for {:?}, which has no initiated interaction system",
                request.character
            );
            continue;
        };
        let system_transform = scene
            .world_transform(request.character)
            .unwrap_or_default();

        let limbs: Vec<FullBodyEffector> = match request.effector {
            Some(effector) => vec![effector],
            None => effectors
                .iter()
                .map(InteractionEffector::effector_type)
                .collect(),
        };

        for limb in limbs {
            let Some(effector) = effectors
                .effectors
                .iter_mut()
                .find(|e| e.effector_type() == limb)
            else {
                warn!(
                    "{:?} has no {:?} limb in its FullBodyIk, interaction request ignored",
                    request.character, limb
                );
                continue;
            };

            let result = with_limb(
                &scene,
                &mut posers,
                &mut ik,
                limb,
                system_transform,
                config.switch_interaction_speed,
                &mut notices,
                |ctx| match request.kind {
                    InteractionRequestKind::Start { object, interrupt } => effector.start(
                        ctx,
                        object,
                        &config.target_tag,
                        config.fade_in_time,
                        interrupt,
                    ),
                    InteractionRequestKind::Stop => effector.stop(ctx),
                    InteractionRequestKind::Pause => effector.pause(ctx),
                    InteractionRequestKind::Resume => effector.resume(ctx),
                },
            );

            match result {
                Some((Err(error), _)) => {
                    debug!("Rejected {:?} for {:?}: {}", request.kind, limb, error);
                }
                None => debug!(
                    "Rejected {:?} for {:?}: bone not found",
                    request.kind, limb
                ),
                Some((Ok(()), _)) => {}
            }
        }

        for notice in notices.drain(..) {
            messages.write(InteractionMessage {
                character: request.character,
                notice,
            });
        }
    }
}

/// Pre-solve pass: advances every interaction, then runs the switch and reset blends.
pub fn update_interaction_effectors(
    time: Res<Time>,
    mut characters: Query<(
        Entity,
        &InteractionSystem,
        &mut InteractionEffectors,
        &mut FullBodyIk,
    )>,
    mut posers: Query<&mut HandPoser>,
    scene: InteractionScene,
    mut messages: MessageWriter<InteractionMessage>,
) {
    let delta = time.delta_secs();
    let mut notices = Vec::new();

    for (character, config, mut effectors, mut ik) in &mut characters {
        let system_transform = scene.world_transform(character).unwrap_or_default();
        let root = scene
            .world_transform(config.root_or(character))
            .unwrap_or(system_transform);
        let switch_speed = config.switch_interaction_speed * config.speed;
        let reset_speed = config.reset_to_defaults_speed * config.speed;

        for effector in &mut effectors.effectors {
            let limb = effector.effector_type();
            with_limb(
                &scene,
                &mut posers,
                &mut ik,
                limb,
                system_transform,
                config.switch_interaction_speed,
                &mut notices,
                |ctx| effector.update(ctx, &root, config.speed, delta),
            );
        }

        for effector in &mut effectors.effectors {
            let limb = effector.effector_type();
            with_limb(
                &scene,
                &mut posers,
                &mut ik,
                limb,
                system_transform,
                config.switch_interaction_speed,
                &mut notices,
                |ctx| effector.switch(&mut *ctx.rig, switch_speed, delta),
            );
        }

        for effector in &mut effectors.effectors {
            let limb = effector.effector_type();
            with_limb(
                &scene,
                &mut posers,
                &mut ik,
                limb,
                system_transform,
                config.switch_interaction_speed,
                &mut notices,
                |ctx| effector.reset_to_defaults(&mut *ctx.rig, reset_speed, delta),
            );
        }

        for notice in notices.drain(..) {
            messages.write(InteractionMessage { character, notice });
        }
    }
}

/// Post-solve pass: applies the rotate-bone correction on top of the solved pose and parents
/// freshly picked up objects to their bone.
pub fn post_solve_interaction_effectors(
    mut commands: Commands,
    mut characters: Query<(
        Entity,
        &InteractionSystem,
        &mut InteractionEffectors,
        &mut FullBodyIk,
    )>,
    mut posers: Query<&mut HandPoser>,
    mut transforms: ParamSet<(InteractionScene, Query<&mut Transform>)>,
) {
    let mut notices = Vec::new();

    for (character, config, mut effectors, mut ik) in &mut characters {
        let mut rotations = Vec::new();
        let mut reparents = Vec::new();

        {
            let scene = transforms.p0();
            let system_transform = scene.world_transform(character).unwrap_or_default();

            for effector in &mut effectors.effectors {
                let limb = effector.effector_type();
                let Some(bone) = ik.limb(limb).map(|l| l.bone) else {
                    continue;
                };
                let Some((request, rotated)) = with_limb(
                    &scene,
                    &mut posers,
                    &mut ik,
                    limb,
                    system_transform,
                    config.switch_interaction_speed,
                    &mut notices,
                    |ctx| effector.post_solve(ctx),
                ) else {
                    continue;
                };

                if let Some(rotation) = rotated {
                    rotations.push((bone, rotation));
                }
                if let Some(request) = request {
                    reparents.push((bone, request));
                }
            }
        }

        let mut locals = transforms.p1();
        for (bone, rotation) in rotations {
            if let Ok(mut transform) = locals.get_mut(bone) {
                transform.rotation = rotation;
            }
        }

        let scene = transforms.p0();
        for (bone, request) in reparents {
            reparent_to_bone(&mut commands, &scene, bone, request);
        }
    }
}

/// Makes the picked up object a child of `bone`, keeping its world pose relative to the bone
/// placed at the carry position.
fn reparent_to_bone(
    commands: &mut Commands,
    scene: &InteractionScene,
    bone: Entity,
    request: ReparentRequest,
) {
    let (Some(object), Some(bone_global)) = (
        scene.global_transform(request.object_root),
        scene.global_transform(bone),
    ) else {
        warn!(
            "Could not parent picked up object {:?} to bone {:?}",
            request.object_root, bone
        );
        return;
    };

    let mut carrier = bone_global.compute_transform();
    carrier.translation = request.bone_position;
    let local = object.reparented_to(&GlobalTransform::from(carrier));

    commands
        .entity(request.object_root)
        .insert((ChildOf(bone), local));
}
