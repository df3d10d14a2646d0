// ==============================================================================
// body.rs — COLLABORATOR SEAMS (RIGID BODY + GROUND QUERY)
// ------------------------------------------------------------------------------
// The kart core never integrates anything itself. It reads the chassis state and
// pushes forces through `KartBody`, and asks `GroundProbe` for ground distance.
//
// ForceRecorder:
// - A KartBody built from a state snapshot (pose, velocities, COM, mass)
// - Buffers every applied force; the owner flushes them to the real body later
// - Used by the rapier adapter (physics.rs) and by tests
// ==============================================================================

use crate::kart_core::types::{GroundHit, Point, Pose, Vec3};

/// Rigid-body accessor. Forces are force-mode: accumulated and integrated by the
/// external body on its next fixed step.
pub trait KartBody {
    /// World pose of the body reference frame.
    fn pose(&self) -> Pose;
    fn linear_velocity(&self) -> Vec3;
    /// World velocity of a point rigidly attached to the body.
    fn point_velocity(&self, world_point: &Point) -> Vec3;
    fn mass(&self) -> f32;
    fn apply_force_at_point(&mut self, force: Vec3, world_point: Point);
    /// Force through the center of mass (no torque).
    fn apply_force(&mut self, force: Vec3);
}

/// Downward ground query. `None` means nothing within `max_distance`, which is a
/// normal outcome.
pub trait GroundProbe {
    fn raycast_down(&self, origin: &Point, down: &Vec3, max_distance: f32) -> Option<GroundHit>;
}

/// A force pushed during a tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AppliedForce {
    pub force: Vec3,
    /// World application point. None => center of mass.
    pub at_point: Option<Point>,
}

/// Buffered body: reads come from a snapshot, writes are recorded.
#[derive(Clone, Debug)]
pub struct ForceRecorder {
    pub pose: Pose,
    pub linvel: Vec3,
    pub angvel: Vec3,
    pub center_of_mass: Point, // world
    pub mass: f32,
    pub forces: Vec<AppliedForce>,
}

impl ForceRecorder {
    pub fn new(pose: Pose, mass: f32) -> Self {
        Self {
            pose,
            linvel: Vec3::zeros(),
            angvel: Vec3::zeros(),
            center_of_mass: pose.position,
            mass,
            forces: Vec::new(),
        }
    }

    pub fn with_velocity(mut self, linvel: Vec3, angvel: Vec3) -> Self {
        self.linvel = linvel;
        self.angvel = angvel;
        self
    }

    pub fn with_center_of_mass(mut self, com: Point) -> Self {
        self.center_of_mass = com;
        self
    }

    /// Sum of every recorded force.
    pub fn net_force(&self) -> Vec3 {
        self.forces.iter().fold(Vec3::zeros(), |acc, f| acc + f.force)
    }

    /// Net torque about the center of mass.
    pub fn net_torque(&self) -> Vec3 {
        self.forces.iter().fold(Vec3::zeros(), |acc, f| match f.at_point {
            Some(p) => acc + (p - self.center_of_mass).cross(&f.force),
            None => acc,
        })
    }

    pub fn drain(&mut self) -> Vec<AppliedForce> {
        std::mem::take(&mut self.forces)
    }
}

impl KartBody for ForceRecorder {
    fn pose(&self) -> Pose {
        self.pose
    }

    fn linear_velocity(&self) -> Vec3 {
        self.linvel
    }

    // v(p) = v_com + ω × (p - com)
    fn point_velocity(&self, world_point: &Point) -> Vec3 {
        self.linvel + self.angvel.cross(&(world_point - self.center_of_mass))
    }

    fn mass(&self) -> f32 {
        self.mass
    }

    fn apply_force_at_point(&mut self, force: Vec3, world_point: Point) {
        self.forces.push(AppliedForce { force, at_point: Some(world_point) });
    }

    fn apply_force(&mut self, force: Vec3) {
        self.forces.push(AppliedForce { force, at_point: None });
    }
}

/// Infinite horizontal plane at `height`. Useful for headless runs and tests.
#[derive(Clone, Copy, Debug)]
pub struct FlatGround {
    pub height: f32,
}

impl FlatGround {
    pub fn new(height: f32) -> Self {
        Self { height }
    }
}

impl GroundProbe for FlatGround {
    fn raycast_down(&self, origin: &Point, down: &Vec3, max_distance: f32) -> Option<GroundHit> {
        // only rays that actually head toward the plane can hit it
        if down.y >= -1e-6 {
            return None;
        }
        let distance = (origin.y - self.height) / -down.y;
        if (0.0..=max_distance).contains(&distance) {
            Some(GroundHit::new(distance, Vec3::y()))
        } else {
            None
        }
    }
}

/// Ground that never answers: every query misses.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoGround;

impl GroundProbe for NoGround {
    fn raycast_down(&self, _origin: &Point, _down: &Vec3, _max_distance: f32) -> Option<GroundHit> {
        None
    }
}
