// ==============================================================================
// kinematics.rs — WHEEL BASIS + VELOCITY DECOMPOSITION (WORLD SPACE)
// ------------------------------------------------------------------------------
// wheel_basis(body_pose, mount):
// - Resolves a body-local wheel mount (position + orientation) into world space
// - forward = mount rotation * +Z, right = mount rotation * -X (forward × up)
//
// slip_components(v, forward, right):
//     v_f = dot(v, forward)
//     v_s = dot(v, right)
//
// steer_rotation(max_turn_deg, steer):
// - Rotation about local +Y by -(max_turn * steer). Positive steer turns the
//   wheel forward toward its right.
// ==============================================================================

use crate::kart_core::types::{Point, Pose, Rotation, Vec3};

/// World-space basis of one wheel mount.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WheelBasis {
    pub position: Point,
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
}

/// Resolve a body-local mount pose into a world-space wheel basis.
#[inline]
pub fn wheel_basis(body_pose: &Pose, mount: &Pose) -> WheelBasis {
    let world = body_pose.transform(mount);
    WheelBasis {
        position: world.position,
        forward: world.forward(),
        right: world.right(),
        up: world.up(),
    }
}

/// Compute (v_forward, v_side) given point velocity and wheel basis.
#[inline]
pub fn slip_components(point_vel: &Vec3, forward: &Vec3, right: &Vec3) -> (f32, f32) {
    (point_vel.dot(forward), point_vel.dot(right))
}

/// Yaw rotation for a steering input in [-1, 1].
#[inline]
pub fn steer_rotation(max_turn_deg: f32, steer: f32) -> Rotation {
    Rotation::from_axis_angle(&Vec3::y_axis(), -(max_turn_deg * steer).to_radians())
}
