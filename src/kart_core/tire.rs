// ==============================================================================
// tire.rs — FRICTION-CIRCLE WHEEL FORCE MODEL
// ------------------------------------------------------------------------------
// Per wheel, in the wheel basis (forward / right of the mount):
//
//   driven:      long  = engine_torque * gear * efficiency / driven_count / r
//                (driven set = DriveLayout: rear axle, front axle, or all four)
//                long += handbrake_strength * dir   (handbrake held)
//   steered only:long  = -rolling_drag * v_f
//   all:         lat   = -side_stiffness * v_s
//
// Friction circle, max = grip * static_load:
//   AdditiveLegacy (default): if |(long, lat)| > max, reduction = max / |(long, lat)|
//                             is ADDED to both components
//   Scaled:                   both components are multiplied by the reduction
//
// World force = forward * long + right * lat, applied at the mount position.
//
// The engine is not stepped here. The orchestrator steps it once per tick and
// hands each driven wheel its DriveShare.
// ==============================================================================

use serde::{Deserialize, Serialize};

use crate::kart_core::body::KartBody;
use crate::kart_core::kinematics::{slip_components, WheelBasis};
use crate::kart_core::types::WheelId;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrictionCircleMode {
    /// Reduction ratio added to both components once the circle is exceeded.
    #[default]
    AdditiveLegacy,
    /// Components scaled onto the circle.
    Scaled,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TireConfig {
    pub tire_radius: f32,     // m
    pub grip: f32,            // friction coefficient
    pub side_stiffness: f32,  // N per m/s of lateral slip
    pub rolling_drag: f32,    // N per m/s (steered, non-driven wheels)
    pub friction_circle: FrictionCircleMode,
}

impl Default for TireConfig {
    fn default() -> Self {
        Self {
            tire_radius: 0.3,
            grip: 1.0,
            side_stiffness: 80.0,
            rolling_drag: 0.07,
            friction_circle: FrictionCircleMode::AdditiveLegacy,
        }
    }
}

/// Which wheels receive engine torque.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriveLayout {
    #[default]
    Rear,
    Front,
    All,
}

impl DriveLayout {
    pub fn drives(self, id: WheelId) -> bool {
        match self {
            DriveLayout::Rear => id.is_rear(),
            DriveLayout::Front => id.is_front(),
            DriveLayout::All => true,
        }
    }

    pub fn driven_count(self) -> u8 {
        match self {
            DriveLayout::Rear | DriveLayout::Front => 2,
            DriveLayout::All => 4,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrivetrainConfig {
    pub gear_ratio: f32,
    pub efficiency: f32,          // 0..1
    pub handbrake_strength: f32,  // N per driven wheel
    pub layout: DriveLayout,
}

impl Default for DrivetrainConfig {
    fn default() -> Self {
        Self {
            gear_ratio: 8.0,
            efficiency: 0.9,
            handbrake_strength: 600.0,
            layout: DriveLayout::Rear,
        }
    }
}

/// Engine torque already split for one driven wheel (Nm at the axle).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DriveShare {
    pub wheel_torque: f32,
    pub handbrake: bool,
}

impl DriveShare {
    /// Split one engine step over the driven wheels.
    pub fn from_engine(drivetrain: &DrivetrainConfig, engine_torque: f32, handbrake: bool) -> Self {
        let total = engine_torque * drivetrain.gear_ratio * drivetrain.efficiency;
        Self {
            wheel_torque: total / f32::from(drivetrain.layout.driven_count()),
            handbrake,
        }
    }
}

/// Per-wheel inputs, rebuilt every tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TireForceInputs {
    pub forward_velocity: f32, // m/s along the wheel forward
    pub side_velocity: f32,    // m/s along the wheel right
    pub normal_load: f32,      // N (static)
    pub driven: bool,
    pub steered: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WheelForce {
    pub longitudinal: f32, // N along wheel forward
    pub lateral: f32,      // N along wheel right
}

/// -1 when rolling forward or at rest, +1 when rolling backward.
#[inline]
pub fn handbrake_direction(forward_velocity: f32) -> f32 {
    if forward_velocity < 0.0 { 1.0 } else { -1.0 }
}

pub fn apply_friction_circle(mode: FrictionCircleMode, max_friction: f32, force: WheelForce) -> WheelForce {
    let total = force.longitudinal.hypot(force.lateral);
    if total <= max_friction {
        return force;
    }
    let reduction = max_friction / total;
    match mode {
        FrictionCircleMode::AdditiveLegacy => WheelForce {
            longitudinal: force.longitudinal + reduction,
            lateral: force.lateral + reduction,
        },
        FrictionCircleMode::Scaled => WheelForce {
            longitudinal: force.longitudinal * reduction,
            lateral: force.lateral * reduction,
        },
    }
}

/// Force in the wheel basis for one wheel. Pure.
pub fn compute_wheel_force(
    tire: &TireConfig,
    drivetrain: &DrivetrainConfig,
    inputs: &TireForceInputs,
    drive: &DriveShare,
) -> WheelForce {
    let mut longitudinal = 0.0;

    if inputs.driven {
        longitudinal += drive.wheel_torque / tire.tire_radius;
        if drive.handbrake {
            longitudinal += handbrake_direction(inputs.forward_velocity) * drivetrain.handbrake_strength;
        }
    } else if inputs.steered {
        longitudinal += -tire.rolling_drag * inputs.forward_velocity;
    }

    let lateral = -tire.side_stiffness * inputs.side_velocity;

    apply_friction_circle(
        tire.friction_circle,
        tire.grip * inputs.normal_load,
        WheelForce { longitudinal, lateral },
    )
}

/// Read the mount velocity, evaluate and push the force at the mount.
#[allow(clippy::too_many_arguments)]
pub fn solve_wheel<B: KartBody + ?Sized>(
    tire: &TireConfig,
    drivetrain: &DrivetrainConfig,
    body: &mut B,
    basis: &WheelBasis,
    normal_load: f32,
    driven: bool,
    steered: bool,
    drive: &DriveShare,
) -> WheelForce {
    let v = body.point_velocity(&basis.position);
    let (forward_velocity, side_velocity) = slip_components(&v, &basis.forward, &basis.right);

    let inputs = TireForceInputs {
        forward_velocity,
        side_velocity,
        normal_load,
        driven,
        steered,
    };
    let force = compute_wheel_force(tire, drivetrain, &inputs, drive);

    let world = basis.forward * force.longitudinal + basis.right * force.lateral;
    body.apply_force_at_point(world, basis.position);
    force
}
