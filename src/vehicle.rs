// ==============================================================================
// vehicle.rs — KART ORCHESTRATOR (ONE FIXED TICK)
// ------------------------------------------------------------------------------
// Kart owns everything that persists between ticks:
// - EngineState
// - [CornerState; 4] (compression history for the dampers)
// - current body-local wheel mount poses (front ones steered)
// - static per-corner loads (derived once from mass + weight split)
//
// tick() order is fixed:
//   1) direct motor force at the rear mounts (cut above velocity_limit)
//   2) suspension FL, FR, RL, RR, then anti-roll front, rear
//   3) engine stepped ONCE, torque split over the driven wheels, tire forces
//      FL, FR, RL, RR (static loads)
//   4) aerodynamics
//   5) steering written to the front mounts (read by next tick's step 3)
// ==============================================================================

use tracing::{debug, trace};

use crate::config::KartConfig;
use crate::kart_core::aero::apply_aero;
use crate::kart_core::anti_roll::apply_anti_roll;
use crate::kart_core::body::{GroundProbe, KartBody};
use crate::kart_core::engine::{self, EngineState};
use crate::kart_core::kinematics::{steer_rotation, wheel_basis};
use crate::kart_core::suspension::{solve_corner, CornerState};
use crate::kart_core::tire::{solve_wheel, DriveShare};
use crate::kart_core::types::{clamp01, Axle, DriverInput, Pose, WheelId};
use crate::telemetry::{KartTelemetry, WheelTelemetry};

/// Static normal load per corner (FL, FR, RL, RR).
pub fn static_loads(mass: f32, gravity: f32, front_weight_ratio: f32) -> [f32; 4] {
    let weight = mass * gravity.abs();
    let front = weight * clamp01(front_weight_ratio);
    let rear = weight - front;
    [front * 0.5, front * 0.5, rear * 0.5, rear * 0.5]
}

pub struct Kart {
    config: KartConfig,
    static_loads: [f32; 4],
    initial_mounts: [Pose; 4],
    mounts: [Pose; 4],
    corners: [CornerState; 4],
    engine: EngineState,
    telemetry: KartTelemetry,
}

impl Kart {
    /// `mass` is the chassis mass as reported by the body.
    pub fn new(config: KartConfig, mass: f32) -> Self {
        let initial_mounts = config.layout.mounts.map(|m| m.pose());
        let static_loads = static_loads(mass, config.gravity.0, config.layout.front_weight_ratio);
        let engine = EngineState::new(&config.engine);

        debug!(mass, ?static_loads, "kart created");

        Self {
            config,
            static_loads,
            initial_mounts,
            mounts: initial_mounts,
            corners: [CornerState::default(); 4],
            engine,
            telemetry: KartTelemetry::default(),
        }
    }

    /// Static loads come from the mass the body reports at attach time.
    pub fn for_body<B: KartBody + ?Sized>(config: KartConfig, body: &B) -> Self {
        Self::new(config, body.mass())
    }

    pub fn static_loads(&self) -> [f32; 4] {
        self.static_loads
    }

    pub fn engine(&self) -> &EngineState {
        &self.engine
    }

    pub fn corner(&self, id: WheelId) -> &CornerState {
        &self.corners[id.index()]
    }

    pub fn corners(&self) -> &[CornerState; 4] {
        &self.corners
    }

    /// Current body-local mount pose (front mounts include steering).
    pub fn mount(&self, id: WheelId) -> &Pose {
        &self.mounts[id.index()]
    }

    pub fn telemetry(&self) -> &KartTelemetry {
        &self.telemetry
    }

    /// Back to the spawn state: idle engine, relaxed corners, wheels straight.
    pub fn respawn(&mut self) {
        self.engine.reset(&self.config.engine);
        self.corners = [CornerState::default(); 4];
        self.mounts = self.initial_mounts;
        self.telemetry = KartTelemetry::default();
        debug!("kart respawned");
    }

    /// One fixed step. All forces go through `body`; nothing is integrated here.
    pub fn tick<B, P>(&mut self, body: &mut B, probe: &P, input: DriverInput, dt: f32) -> KartTelemetry
    where
        B: KartBody + ?Sized,
        P: GroundProbe + ?Sized,
    {
        let input = input.clamped();
        let pose = body.pose();
        let velocity = body.linear_velocity();
        let forward_speed = velocity.dot(&pose.forward());

        let mut out = KartTelemetry {
            forward_speed,
            speed: velocity.norm(),
            handbrake: input.handbrake,
            ..KartTelemetry::default()
        };

        // 1) direct motor force
        out.motor_cut = !self.apply_motor_force(body, &pose, input.throttle, forward_speed);

        // 2) suspension + anti-roll
        for id in WheelId::ALL {
            let i = id.index();
            let basis = wheel_basis(&pose, &self.mounts[i]);
            solve_corner(&self.config.suspension, body, probe, &basis, &mut self.corners[i], dt);
        }
        for axle in Axle::ALL {
            let (l, r) = (axle.left().index(), axle.right().index());
            let stiffness = match axle {
                Axle::Front => self.config.suspension.front_stabilizer,
                Axle::Rear => self.config.suspension.rear_stabilizer,
            };
            let bar = apply_anti_roll(
                body,
                stiffness,
                &pose.up(),
                (&self.corners[l], pose.transform_point(&self.mounts[l].position)),
                (&self.corners[r], pose.transform_point(&self.mounts[r].position)),
            );
            match axle {
                Axle::Front => out.front_stabilizer = bar.raw,
                Axle::Rear => out.rear_stabilizer = bar.raw,
            }
        }

        // 3) engine once, then tires
        let torque = engine::simulate(
            &self.config.engine,
            &mut self.engine,
            input.throttle,
            forward_speed,
            dt,
        );
        let share = DriveShare::from_engine(&self.config.drivetrain, torque, input.handbrake);
        for id in WheelId::ALL {
            let i = id.index();
            let basis = wheel_basis(&pose, &self.mounts[i]);
            let force = solve_wheel(
                &self.config.tire,
                &self.config.drivetrain,
                body,
                &basis,
                self.static_loads[i],
                self.config.drivetrain.layout.drives(id),
                id.is_front(),
                &share,
            );
            let corner = &self.corners[i];
            out.wheels[i] = WheelTelemetry {
                id,
                compression: corner.compression,
                suspension_force: corner.force,
                grounded: corner.grounded,
                longitudinal: force.longitudinal,
                lateral: force.lateral,
            };
        }

        // 4) aero
        let aero = apply_aero(&self.config.aero, body, probe);
        out.downforce = aero.downforce;
        out.ground_effect = aero.ground_effect;

        // 5) steering for the next tick
        self.apply_steering(input.steer);

        out.rpm = self.engine.current_rpm;
        out.torque = self.engine.current_torque;
        out.filtered_throttle = self.engine.filtered_throttle;
        out.limiter_effect = self.engine.limiter_effect;

        trace!(
            rpm = out.rpm,
            torque = out.torque,
            speed = out.forward_speed,
            "kart tick"
        );

        self.telemetry = out;
        out
    }

    /// Rear-axle push from the motor. Returns false when the top-speed cut
    /// skipped it.
    fn apply_motor_force<B: KartBody + ?Sized>(
        &self,
        body: &mut B,
        pose: &Pose,
        throttle: f32,
        forward_speed: f32,
    ) -> bool {
        if throttle > 0.0 && forward_speed > self.config.motor.velocity_limit {
            return false;
        }

        let torque = self.config.motor.motor_torque * throttle;
        let per_wheel = torque / self.config.tire.tire_radius / 2.0;
        let force = pose.forward() * per_wheel;

        for id in [WheelId::RL, WheelId::RR] {
            let point = pose.transform_point(&self.mounts[id.index()].position);
            body.apply_force_at_point(force, point);
        }
        true
    }

    fn apply_steering(&mut self, steer: f32) {
        let rotation = steer_rotation(self.config.steering.max_turn_angle_deg, steer);
        for id in [WheelId::FL, WheelId::FR] {
            let i = id.index();
            self.mounts[i].rotation = self.initial_mounts[i].rotation * rotation;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn static_loads_split_by_ratio() {
        let loads = static_loads(100.0, 10.0, 0.4);
        assert_relative_eq!(loads[0], 200.0);
        assert_relative_eq!(loads[1], 200.0);
        assert_relative_eq!(loads[2], 300.0);
        assert_relative_eq!(loads[3], 300.0);
    }

    #[test]
    fn steering_only_rotates_front_mounts() {
        let mut kart = Kart::new(KartConfig::default(), 100.0);
        kart.apply_steering(0.5);
        let fl = kart.mount(WheelId::FL).forward();
        assert_relative_eq!(fl.dot(&Pose::identity().right()), 30f32.to_radians().sin(), epsilon = 1e-6);
        assert_eq!(kart.mount(WheelId::RL).forward(), kart.initial_mounts[2].forward());

        kart.respawn();
        assert_relative_eq!(kart.mount(WheelId::FL).forward().x, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn for_body_reads_mass_from_the_body() {
        use crate::kart_core::body::ForceRecorder;

        let body = ForceRecorder::new(Pose::identity(), 80.0);
        let kart = Kart::for_body(KartConfig::default(), &body);
        assert_eq!(kart.static_loads(), static_loads(80.0, crate::kart_core::types::GRAVITY, 0.5));
    }
}
