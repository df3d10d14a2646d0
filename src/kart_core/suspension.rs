// ==============================================================================
// suspension.rs — RAYCAST SPRING-DAMPER CORNERS
// ------------------------------------------------------------------------------
// Per corner, every tick:
//
//   ray:         mount.position along -mount.up, max = neutral + range + tire_radius
//   no hit:      zero force, compression kept from the last grounded tick
//   effective  = clamp(hit.distance - tire_radius, neutral - range, neutral + range)
//   compression= neutral - effective                    (positive = compressed)
//   spring     = compression * spring_hardness
//   damping    = (compression - previous) / max(dt, EPSILON) * damping_coefficient
//   force      = (spring + damping) * mount.up          (applied at the mount)
//
// Anti-roll coupling lives in anti_roll.rs and reads the CornerState records
// produced here.
// ==============================================================================

use serde::{Deserialize, Serialize};

use crate::kart_core::body::{GroundProbe, KartBody};
use crate::kart_core::kinematics::WheelBasis;
use crate::kart_core::types::{GroundHit, Vec3, EPSILON};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuspensionConfig {
    pub neutral_length: f32,     // m, rest length mount → wheel center
    pub range: f32,              // m, travel either side of neutral
    pub spring_hardness: f32,    // N/m
    pub damping_coefficient: f32, // N·s/m
    pub tire_radius: f32,        // m
    pub front_stabilizer: f32,   // N/m
    pub rear_stabilizer: f32,    // N/m
}

impl Default for SuspensionConfig {
    fn default() -> Self {
        Self {
            neutral_length: 0.4,
            range: 0.2,
            spring_hardness: 2000.0,
            damping_coefficient: 350.0,
            tire_radius: 0.3,
            front_stabilizer: 800.0,
            rear_stabilizer: 600.0,
        }
    }
}

impl SuspensionConfig {
    #[inline]
    pub fn ray_length(&self) -> f32 {
        self.neutral_length + self.range + self.tire_radius
    }
}

/// Persistent per-corner record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CornerState {
    pub compression: f32, // m, signed, within ±range
    pub grounded: bool,   // ray hit this tick
    pub force: f32,       // N along mount.up this tick (0 when airborne)
}

/// Result of one corner evaluation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CornerUpdate {
    pub compression: f32,
    pub grounded: bool,
    pub magnitude: f32, // spring + damping (N)
    pub force: Vec3,    // world force to apply at the mount
}

/// Cast the suspension ray for one corner.
#[inline]
pub fn probe_corner<P: GroundProbe + ?Sized>(
    config: &SuspensionConfig,
    probe: &P,
    mount: &WheelBasis,
) -> Option<GroundHit> {
    probe.raycast_down(&mount.position, &(-mount.up), config.ray_length())
}

/// Spring-damper evaluation for one corner. Pure.
pub fn update_corner(
    config: &SuspensionConfig,
    mount: &WheelBasis,
    previous_compression: f32,
    contact: Option<&GroundHit>,
    dt: f32,
) -> CornerUpdate {
    let Some(hit) = contact else {
        return CornerUpdate {
            compression: previous_compression,
            grounded: false,
            magnitude: 0.0,
            force: Vec3::zeros(),
        };
    };

    let min_len = config.neutral_length - config.range;
    let max_len = config.neutral_length + config.range;
    let effective = (hit.distance - config.tire_radius).clamp(min_len, max_len);
    let compression = config.neutral_length - effective;

    let spring = compression * config.spring_hardness;
    let speed = (compression - previous_compression) / dt.max(EPSILON);
    let damping = speed * config.damping_coefficient;
    let magnitude = spring + damping;

    CornerUpdate {
        compression,
        grounded: true,
        magnitude,
        force: mount.up * magnitude,
    }
}

/// Probe, evaluate, store into `corner` and push the force onto the body.
pub fn solve_corner<B, P>(
    config: &SuspensionConfig,
    body: &mut B,
    probe: &P,
    mount: &WheelBasis,
    corner: &mut CornerState,
    dt: f32,
) -> CornerUpdate
where
    B: KartBody + ?Sized,
    P: GroundProbe + ?Sized,
{
    let hit = probe_corner(config, probe, mount);
    let update = update_corner(config, mount, corner.compression, hit.as_ref(), dt);

    corner.compression = update.compression;
    corner.grounded = update.grounded;
    corner.force = update.magnitude;

    if update.grounded {
        body.apply_force_at_point(update.force, mount.position);
    }
    update
}
