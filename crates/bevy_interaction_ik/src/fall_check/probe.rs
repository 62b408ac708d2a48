use avian3d::prelude::{ColliderOf, LayerMask, SpatialQuery, SpatialQueryFilter};
use bevy::{
    ecs::{entity::EntityHashSet, prelude::*},
    math::Dir3,
    transform::helper::TransformHelper,
};

use super::{HeadRaycastChecker, Tag};

/// Casts each checker's ray and records whether a support surface was hit.
///
/// Colliders of the head and of its ancestors (the character's own body) are skipped, so the ray
/// starting inside them does not count as a hit.
pub fn probe_head_support(
    spatial_query: SpatialQuery,
    mut checkers: Query<(Entity, &mut HeadRaycastChecker)>,
    tags: Query<&Tag>,
    parents: Query<&ChildOf>,
    collider_bodies: Query<&ColliderOf>,
    transform_helper: TransformHelper,
) {
    for (entity, mut checker) in &mut checkers {
        if checker.has_fallen() {
            continue;
        }
        let Some((head, origin)) = checker.head.and_then(|head| {
            transform_helper
                .compute_global_transform(head)
                .ok()
                .map(|global| (head, global.translation()))
        }) else {
            checker.report_missing_head(entity);
            continue;
        };

        let own: EntityHashSet = std::iter::once(head)
            .chain(parents.iter_ancestors(head))
            .collect();
        let is_own = |collider: Entity| {
            own.contains(&collider)
                || collider_bodies
                    .get(collider)
                    .is_ok_and(|collider_of| own.contains(&collider_of.body))
        };

        let filter = SpatialQueryFilter::default().with_mask(LayerMask(!checker.ignored_layers));
        let supported = spatial_query
            .cast_ray_predicate(
                origin,
                Dir3::NEG_Y,
                checker.check_distance,
                true,
                &filter,
                &|collider| !is_own(collider),
            )
            .is_some_and(|hit| {
                tags.get(hit.entity)
                    .is_ok_and(|tag| tag.0 == checker.support_tag)
            });

        checker.record_support(supported);
    }
}
