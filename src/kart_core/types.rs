//! Core shared types for `kart_core` (engine-agnostic).
// kart_core/types.rs
use std::fmt;

use nalgebra::{Point3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

pub type Vec3 = Vector3<f32>;
pub type Point = Point3<f32>;
pub type Rotation = UnitQuaternion<f32>;

/// Smallest value used in place of a zero divisor on the hot path.
pub const EPSILON: f32 = 1e-4;

/// Standard gravity (m/s²).
pub const GRAVITY: f32 = 9.81;

// ----- tiny scalar helpers -----
#[inline]
pub fn clamp01(v: f32) -> f32 {
    v.clamp(0.0, 1.0)
}

/// Move a value toward a target by at most `max_delta`.
#[inline]
pub fn move_toward(current: f32, target: f32, max_delta: f32) -> f32 {
    if (target - current).abs() <= max_delta {
        target
    } else {
        current + (target - current).signum() * max_delta
    }
}

// ============================================
// Wheel identification
// ============================================

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum WheelId { FL, FR, RL, RR }

impl WheelId {
    /// Fixed per-tick processing order.
    pub const ALL: [WheelId; 4] = [WheelId::FL, WheelId::FR, WheelId::RL, WheelId::RR];

    pub fn index(self) -> usize {
        match self {
            WheelId::FL => 0,
            WheelId::FR => 1,
            WheelId::RL => 2,
            WheelId::RR => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WheelId::FL => "FL",
            WheelId::FR => "FR",
            WheelId::RL => "RL",
            WheelId::RR => "RR",
        }
    }

    pub fn is_front(&self) -> bool {
        matches!(self, WheelId::FL | WheelId::FR)
    }

    pub fn is_rear(&self) -> bool {
        matches!(self, WheelId::RL | WheelId::RR)
    }

    pub fn axle(&self) -> Axle {
        if self.is_front() { Axle::Front } else { Axle::Rear }
    }
}

impl fmt::Display for WheelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Axle { Front, Rear }

impl Axle {
    pub const ALL: [Axle; 2] = [Axle::Front, Axle::Rear];

    pub fn left(self) -> WheelId {
        match self {
            Axle::Front => WheelId::FL,
            Axle::Rear => WheelId::RL,
        }
    }

    pub fn right(self) -> WheelId {
        match self {
            Axle::Front => WheelId::FR,
            Axle::Rear => WheelId::RR,
        }
    }
}

// ============================================
// ----- poses --------------------------------
// ============================================

/// Position + orientation. Local axes: +Y up, +Z forward, +X left.
/// The frame is right-handed, so the driver's right is `forward × up = -X`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Point,
    pub rotation: Rotation,
}

impl Pose {
    pub fn new(position: Point, rotation: Rotation) -> Self {
        Self { position, rotation }
    }

    pub fn identity() -> Self {
        Self::new(Point::origin(), Rotation::identity())
    }

    #[inline] pub fn forward(&self) -> Vec3 { self.rotation * Vec3::z() }
    #[inline] pub fn right(&self) -> Vec3 { self.rotation * -Vec3::x() }
    #[inline] pub fn up(&self) -> Vec3 { self.rotation * Vec3::y() }

    /// Compose a child pose given in this pose's local space.
    pub fn transform(&self, local: &Pose) -> Pose {
        Pose {
            position: self.position + self.rotation * local.position.coords,
            rotation: self.rotation * local.rotation,
        }
    }

    /// Map a local point into this pose's parent space.
    pub fn transform_point(&self, local: &Point) -> Point {
        self.position + self.rotation * local.coords
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

// ============================================
// ----- inputs + contact ---------------------
// ============================================

/// Normalized driver input, sampled once per tick before physics runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DriverInput {
    pub steer: f32,     // -1..1 (positive = right)
    pub throttle: f32,  // -1..1 (negative = reverse)
    pub handbrake: bool,
}

impl DriverInput {
    pub fn new(steer: f32, throttle: f32, handbrake: bool) -> Self {
        Self { steer, throttle, handbrake }
    }

    /// Clamp axes silently to [-1, 1]. NaN axes collapse to zero.
    pub fn clamped(self) -> Self {
        let axis = |v: f32| if v.is_nan() { 0.0 } else { v.clamp(-1.0, 1.0) };
        Self {
            steer: axis(self.steer),
            throttle: axis(self.throttle),
            handbrake: self.handbrake,
        }
    }
}

/// Result of a downward ground query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundHit {
    pub distance: f32, // m along the query direction
    pub normal: Vec3,  // ground normal (world)
}

impl GroundHit {
    pub fn new(distance: f32, normal: Vec3) -> Self {
        Self { distance, normal }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn move_toward_is_rate_limited() {
        assert_relative_eq!(move_toward(0.0, 1.0, 0.1), 0.1);
        assert_relative_eq!(move_toward(0.95, 1.0, 0.1), 1.0);
        assert_relative_eq!(move_toward(1.0, 0.0, 0.25), 0.75);
    }

    #[test]
    fn driver_input_clamps_out_of_range_axes() {
        let input = DriverInput::new(-3.0, 7.5, true).clamped();
        assert_eq!(input.steer, -1.0);
        assert_eq!(input.throttle, 1.0);
        assert!(input.handbrake);

        let nan = DriverInput::new(f32::NAN, 0.5, false).clamped();
        assert_eq!(nan.steer, 0.0);
    }

    #[test]
    fn pose_axes_follow_rotation() {
        let yaw = Rotation::from_axis_angle(&Vec3::y_axis(), std::f32::consts::FRAC_PI_2);
        let pose = Pose::new(Point::new(1.0, 2.0, 3.0), yaw);
        // +Z forward rotated 90° about +Y points along +X.
        assert_relative_eq!(pose.forward(), Vec3::x(), epsilon = 1e-6);
        assert_relative_eq!(pose.up(), Vec3::y(), epsilon = 1e-6);

        assert_relative_eq!(pose.right(), pose.forward().cross(&pose.up()), epsilon = 1e-6);

        let child = pose.transform(&Pose::new(Point::new(0.0, 0.0, 1.0), Rotation::identity()));
        assert_relative_eq!(child.position, Point::new(2.0, 2.0, 3.0), epsilon = 1e-6);
    }

    #[test]
    fn axle_pairs_left_and_right() {
        assert_eq!(Axle::Front.left(), WheelId::FL);
        assert_eq!(Axle::Rear.right(), WheelId::RR);
        assert_eq!(WheelId::RL.axle(), Axle::Rear);
        assert_eq!(WheelId::ALL.map(WheelId::index), [0, 1, 2, 3]);
    }
}
