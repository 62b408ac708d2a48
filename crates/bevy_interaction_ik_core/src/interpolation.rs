use bevy::{
    math::{Quat, Vec3},
    transform::components::Transform,
};

/// Linear interpolation with the factor clamped to `[0, 1]`.
pub fn lerp(from: f32, to: f32, f: f32) -> f32 {
    from + (to - from) * f.clamp(0., 1.)
}

/// Moves `current` towards `target` by at most `max_delta`, without overshooting.
pub fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    if (target - current).abs() <= max_delta {
        target
    } else {
        current + (target - current).signum() * max_delta
    }
}

pub fn lerp_vec3(from: Vec3, to: Vec3, f: f32) -> Vec3 {
    from.lerp(to, f.clamp(0., 1.))
}

pub fn slerp(from: Quat, to: Quat, f: f32) -> Quat {
    from.slerp(to, f.clamp(0., 1.))
}

/// World space point into the local space of `frame`.
pub fn inverse_transform_point(frame: &Transform, point: Vec3) -> Vec3 {
    frame.compute_affine().inverse().transform_point3(point)
}
