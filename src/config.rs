// ==============================================================================
// config.rs — KART CONFIGURATION (ALL TUNABLES)
// ------------------------------------------------------------------------------
// KartConfig is the one place every tunable lives. Every section derives serde
// with #[serde(default)], so a JSON file only needs the keys it overrides.
//
// Defaults reproduce the reference kart (REFERENCE_KART).
// ==============================================================================

use serde::{Deserialize, Serialize};

use crate::kart_core::aero::AeroConfig;
use crate::kart_core::engine::EngineConfig;
use crate::kart_core::suspension::SuspensionConfig;
use crate::kart_core::tire::{DrivetrainConfig, TireConfig};
use crate::kart_core::types::{Point, Pose, Rotation, Vec3, GRAVITY};

/// One wheel attachment in body space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WheelMount {
    pub position: Point, // body-local
    #[serde(default)]
    pub yaw_deg: f32,    // initial toe about local +Y
}

impl WheelMount {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { position: Point::new(x, y, z), yaw_deg: 0.0 }
    }

    /// Body-local pose with the initial orientation.
    pub fn pose(&self) -> Pose {
        Pose::new(
            self.position,
            Rotation::from_axis_angle(&Vec3::y_axis(), self.yaw_deg.to_radians()),
        )
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChassisLayout {
    pub front_weight_ratio: f32,   // 0..1
    pub mounts: [WheelMount; 4],   // FL, FR, RL, RR
}

impl Default for ChassisLayout {
    fn default() -> Self {
        Self {
            front_weight_ratio: 0.5,
            mounts: [
                // +X is the driver's left
                WheelMount::new(0.5, 0.0, 0.6),   // FL
                WheelMount::new(-0.5, 0.0, 0.6),  // FR
                WheelMount::new(0.5, 0.0, -0.6),  // RL
                WheelMount::new(-0.5, 0.0, -0.6), // RR
            ],
        }
    }
}

/// Direct rear-axle push, independent of the engine model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotorConfig {
    pub motor_torque: f32,   // Nm
    pub velocity_limit: f32, // m/s, forward thrust cut above this
}

impl Default for MotorConfig {
    fn default() -> Self {
        Self { motor_torque: 400.0, velocity_limit: 20.0 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringConfig {
    pub max_turn_angle_deg: f32,
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self { max_turn_angle_deg: 60.0 }
    }
}

/// Rigid body the rapier adapter builds for the chassis. The body origin is the
/// box center and the ground-effect reference point, so the default mass is
/// light enough for four springs to carry weight plus ground effect inside
/// their travel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChassisBodyConfig {
    pub mass: f32,                // kg
    pub half_extents: [f32; 3],   // [hx, hy, hz] meters
    pub spawn_height: f32,        // m
    pub linear_damping: f32,
    pub angular_damping: f32,
}

impl Default for ChassisBodyConfig {
    fn default() -> Self {
        Self {
            mass: 50.0,
            half_extents: [0.6, 0.15, 1.0],
            spawn_height: 1.0,
            linear_damping: 0.0,
            angular_damping: 0.5,
        }
    }
}

impl ChassisBodyConfig {
    pub fn volume(&self) -> f32 {
        let [hx, hy, hz] = self.half_extents;
        8.0 * hx * hy * hz
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KartConfig {
    pub gravity: Gravity,
    pub layout: ChassisLayout,
    pub motor: MotorConfig,
    pub steering: SteeringConfig,
    pub engine: EngineConfig,
    pub drivetrain: DrivetrainConfig,
    pub tire: TireConfig,
    pub suspension: SuspensionConfig,
    pub aero: AeroConfig,
    pub body: ChassisBodyConfig,
}

/// Gravity magnitude (m/s²), pointing along -Y.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Gravity(pub f32);

impl Default for Gravity {
    fn default() -> Self {
        Self(GRAVITY)
    }
}

impl Gravity {
    pub fn vector(&self) -> Vec3 {
        Vec3::new(0.0, -self.0.abs(), 0.0)
    }
}

impl KartConfig {
    /// Parse a (possibly partial) JSON document.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
