// ==============================================================================
// aero.rs — DRAG + REAR WING + GROUND EFFECT
// ------------------------------------------------------------------------------
//   drag          = -0.5 ρ Cd A |v|² v̂                       (at COM)
//   wing downforce=  0.5 ρ (Cl · attack_rad) S |v|²  along -body_up (at wing)
//   ground effect =  ground_effect / max(h, min_height) along -body_up (at COM)
//
// Drag and wing are skipped below `min_speed`. The wing is skipped when no
// mount is configured. Ground effect needs a hit within ground_check_distance.
// ==============================================================================

use serde::{Deserialize, Serialize};

use crate::kart_core::body::{GroundProbe, KartBody};
use crate::kart_core::types::{Point, Pose, Vec3};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AeroConfig {
    pub air_density: f32,           // kg/m³
    pub drag_coefficient: f32,
    pub cross_section: f32,         // m²
    pub wing_mount: Option<Point>,  // body-local; None = no wing
    pub wing_area: f32,             // m²
    pub lift_coefficient: f32,      // per radian of attack
    pub attack_angle_deg: f32,
    pub ground_effect: f32,         // N·m
    pub ground_check_distance: f32, // m
    pub min_speed: f32,             // m/s
    pub min_height: f32,            // m
}

impl Default for AeroConfig {
    fn default() -> Self {
        Self {
            air_density: 1.225,
            drag_coefficient: 0.9,
            cross_section: 0.6,
            wing_mount: Some(Point::new(0.0, 0.4, -0.8)),
            wing_area: 0.4,
            lift_coefficient: 0.05,
            attack_angle_deg: 10.0,
            ground_effect: 300.0,
            ground_check_distance: 1.0,
            min_speed: 0.01,
            min_height: 0.01,
        }
    }
}

/// What the aero pass pushed this tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AeroForces {
    pub drag: Vec3,
    pub downforce: f32,     // N (wing)
    pub ground_effect: f32, // N
}

pub fn drag_force(config: &AeroConfig, velocity: &Vec3) -> Vec3 {
    let speed = velocity.norm();
    if speed < config.min_speed {
        return Vec3::zeros();
    }
    let drag = 0.5 * config.air_density * config.drag_coefficient * config.cross_section * speed * speed;
    -(velocity / speed) * drag
}

/// Wing downforce magnitude (N). Zero below min speed or without a wing.
pub fn wing_downforce(config: &AeroConfig, speed: f32) -> f32 {
    if config.wing_mount.is_none() || speed < config.min_speed {
        return 0.0;
    }
    let cl = config.lift_coefficient * config.attack_angle_deg.to_radians();
    0.5 * config.air_density * cl * config.wing_area * speed * speed
}

/// Ground effect magnitude (N) for a measured ride height.
#[inline]
pub fn ground_effect_magnitude(config: &AeroConfig, height: f32) -> f32 {
    config.ground_effect / height.max(config.min_height)
}

/// Ground effect magnitude from a ray along -body_up. Zero without a hit.
pub fn ground_effect<P: GroundProbe + ?Sized>(config: &AeroConfig, probe: &P, pose: &Pose) -> f32 {
    probe
        .raycast_down(&pose.position, &(-pose.up()), config.ground_check_distance)
        .map(|hit| ground_effect_magnitude(config, hit.distance))
        .unwrap_or(0.0)
}

/// Drag, wing, ground effect, in that order.
pub fn apply_aero<B, P>(config: &AeroConfig, body: &mut B, probe: &P) -> AeroForces
where
    B: KartBody + ?Sized,
    P: GroundProbe + ?Sized,
{
    let pose = body.pose();
    let up = pose.up();
    let velocity = body.linear_velocity();

    let drag = drag_force(config, &velocity);
    if drag != Vec3::zeros() {
        body.apply_force(drag);
    }

    let downforce = wing_downforce(config, velocity.norm());
    if let (Some(mount), true) = (config.wing_mount, downforce > 0.0) {
        body.apply_force_at_point(-up * downforce, pose.transform_point(&mount));
    }

    let ground = ground_effect(config, probe, &pose);
    if ground > 0.0 {
        body.apply_force(-up * ground);
    }

    AeroForces { drag, downforce, ground_effect: ground }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kart_core::body::{FlatGround, ForceRecorder, NoGround};
    use crate::kart_core::types::Rotation;
    use approx::assert_relative_eq;

    #[test]
    fn drag_opposes_velocity_and_scales_with_square() {
        let cfg = AeroConfig::default();
        let v = Vec3::new(3.0, 0.0, 4.0);
        let d = drag_force(&cfg, &v);
        assert!(d.dot(&v) < 0.0);
        assert_relative_eq!(d.normalize(), -v.normalize(), epsilon = 1e-6);
        assert_relative_eq!(d.norm(), 0.5 * 1.225 * 0.9 * 0.6 * 25.0, epsilon = 1e-4);

        assert_eq!(drag_force(&cfg, &Vec3::new(0.005, 0.0, 0.0)), Vec3::zeros());
    }

    #[test]
    fn wing_needs_mount_and_speed() {
        let cfg = AeroConfig::default();
        assert!(wing_downforce(&cfg, 10.0) > 0.0);
        assert_eq!(wing_downforce(&cfg, 0.001), 0.0);
        let wingless = AeroConfig { wing_mount: None, ..AeroConfig::default() };
        assert_eq!(wing_downforce(&wingless, 10.0), 0.0);
    }

    #[test]
    fn ground_effect_decreases_with_height() {
        let cfg = AeroConfig::default();
        let mut last = f32::INFINITY;
        for h in [0.05, 0.1, 0.2, 0.4, 0.8, 1.0] {
            let f = ground_effect_magnitude(&cfg, h);
            assert!(f < last);
            last = f;
        }
        assert_relative_eq!(ground_effect_magnitude(&cfg, 0.0), 300.0 / 0.01, epsilon = 1e-1);
    }

    #[test]
    fn no_ground_no_ground_effect() {
        let cfg = AeroConfig::default();
        let mut body = ForceRecorder::new(Pose::identity(), 150.0);
        let out = apply_aero(&cfg, &mut body, &NoGround);
        assert_eq!(out.ground_effect, 0.0);
        assert!(body.forces.is_empty());

        let far = FlatGround::new(-5.0);
        assert_eq!(ground_effect(&cfg, &far, &Pose::identity()), 0.0);
    }

    #[test]
    fn ground_effect_pushes_along_minus_up() {
        let cfg = AeroConfig::default();
        let pose = Pose::new(Point::new(0.0, 0.5, 0.0), Rotation::identity());
        let mut body = ForceRecorder::new(pose, 150.0);
        let out = apply_aero(&cfg, &mut body, &FlatGround::new(0.0));
        assert_relative_eq!(out.ground_effect, 600.0, epsilon = 1e-3);
        assert_relative_eq!(body.net_force(), Vec3::new(0.0, -600.0, 0.0), epsilon = 1e-3);
    }
}
