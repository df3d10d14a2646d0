//! Whole-tick scenarios against a buffered body and an analytic ground plane.

use approx::assert_relative_eq;

use kart_physics::kart_core::body::{FlatGround, ForceRecorder, NoGround};
use kart_physics::kart_core::engine::{self, EngineState};
use kart_physics::kart_core::tire::DriveLayout;
use kart_physics::kart_core::types::{Point, Pose, Rotation, Vec3, GRAVITY};
use kart_physics::{DriverInput, Kart, KartConfig, WheelId};

const DT: f32 = 0.02;
const MASS: f32 = 100.0;

fn body_at(height: f32) -> ForceRecorder {
    ForceRecorder::new(Pose::new(Point::new(0.0, height, 0.0), Rotation::identity()), MASS)
}

fn moving_body(height: f32, forward_speed: f32) -> ForceRecorder {
    body_at(height).with_velocity(Vec3::new(0.0, 0.0, forward_speed), Vec3::zeros())
}

fn full_throttle() -> DriverInput {
    DriverInput::new(0.0, 1.0, false)
}

#[test]
fn static_loads_sum_to_weight() {
    let kart = Kart::new(KartConfig::default(), MASS);
    let total: f32 = kart.static_loads().iter().sum();
    assert_relative_eq!(total, MASS * GRAVITY, epsilon = 1e-3);

    let config = KartConfig {
        layout: kart_physics::config::ChassisLayout {
            front_weight_ratio: 0.3,
            ..Default::default()
        },
        ..KartConfig::default()
    };
    let kart = Kart::new(config, MASS);
    let loads = kart.static_loads();
    assert_relative_eq!(loads[0] + loads[1], MASS * GRAVITY * 0.3, epsilon = 1e-3);
    assert_relative_eq!(loads[2], loads[3]);
}

#[test]
fn full_throttle_from_rest_revs_up_smoothly() {
    let config = KartConfig::default();
    let limiter = config.engine.limiter_rpm;
    let mut kart = Kart::new(config, MASS);
    let ground = FlatGround::new(0.0);

    let mut body = body_at(0.6);
    let first = kart.tick(&mut body, &ground, full_throttle(), DT);
    assert_relative_eq!(first.filtered_throttle, 0.1, epsilon = 1e-6);
    assert!(first.rpm > 500.0);

    let mut previous = first.rpm;
    for _ in 0..400 {
        if previous >= limiter {
            break;
        }
        let mut body = body_at(0.6);
        let t = kart.tick(&mut body, &ground, full_throttle(), DT);
        assert!(t.rpm > previous, "rpm dropped from {previous} to {}", t.rpm);
        previous = t.rpm;
    }
    assert!(previous >= limiter, "never reached the limiter");
}

#[test]
fn engine_is_stepped_once_per_tick() {
    let config = KartConfig::default();
    let mut expected = EngineState::new(&config.engine);
    let mut kart = Kart::new(config.clone(), MASS);
    let ground = FlatGround::new(0.0);

    for _ in 0..5 {
        let mut body = moving_body(0.6, 3.0);
        kart.tick(&mut body, &ground, full_throttle(), DT);
        engine::simulate(&config.engine, &mut expected, 1.0, 3.0, DT);
        assert_eq!(*kart.engine(), expected);
    }
}

#[test]
fn driven_wheels_share_one_engine_step() {
    let mut kart = Kart::new(KartConfig::default(), MASS);
    let mut body = body_at(0.6);
    let t = kart.tick(&mut body, &FlatGround::new(0.0), full_throttle(), DT);

    let rl = t.wheel(WheelId::RL);
    let rr = t.wheel(WheelId::RR);
    assert_relative_eq!(rl.longitudinal, rr.longitudinal);
    assert!(rl.longitudinal > 0.0);
    // front wheels are not driven; at rest their rolling drag is zero
    assert_eq!(t.wheel(WheelId::FL).longitudinal, 0.0);
}

#[test]
fn drive_layout_decides_which_wheels_pull() {
    let total_pull = |layout: DriveLayout| {
        let mut config = KartConfig::default();
        config.drivetrain.layout = layout;
        let mut kart = Kart::new(config, MASS);
        let mut body = body_at(0.6);
        let t = kart.tick(&mut body, &FlatGround::new(0.0), full_throttle(), DT);
        (t.wheels.iter().map(|w| w.longitudinal).sum::<f32>(), t)
    };

    let (rear_total, rear) = total_pull(DriveLayout::Rear);
    let (all_total, all) = total_pull(DriveLayout::All);
    let (front_total, front) = total_pull(DriveLayout::Front);

    // one engine step, split over however many wheels are driven
    assert_relative_eq!(all_total, rear_total, epsilon = 1e-2);
    assert_relative_eq!(front_total, rear_total, epsilon = 1e-2);
    assert_eq!(rear.wheel(WheelId::FL).longitudinal, 0.0);
    assert!(all.wheel(WheelId::FL).longitudinal > 0.0);
    assert_relative_eq!(all.wheel(WheelId::FL).longitudinal, all.wheel(WheelId::RR).longitudinal);
    assert!(front.wheel(WheelId::FR).longitudinal > 0.0);
    assert_eq!(front.wheel(WheelId::RL).longitudinal, 0.0);
}

#[test]
fn airborne_tick_pushes_no_vertical_force_and_keeps_compression() {
    let mut kart = Kart::new(KartConfig::default(), MASS);
    let ground = FlatGround::new(0.0);

    // settle a few ticks on the ground with a slight roll so the bar is loaded
    for _ in 0..3 {
        let roll = Rotation::from_axis_angle(&Vec3::z_axis(), 0.05);
        let mut body = ForceRecorder::new(Pose::new(Point::new(0.0, 0.6, 0.0), roll), MASS);
        kart.tick(&mut body, &ground, DriverInput::default(), DT);
    }
    let before = *kart.corners();
    assert!(before.iter().all(|c| c.grounded));
    assert!(before.iter().any(|c| c.compression != 0.0));

    let mut body = body_at(5.0);
    let t = kart.tick(&mut body, &NoGround, DriverInput::new(0.3, 1.0, false), DT);

    for id in WheelId::ALL {
        let corner = kart.corner(id);
        assert!(!corner.grounded);
        assert_eq!(corner.force, 0.0);
        assert_eq!(corner.compression, before[id.index()].compression);
        assert_eq!(t.wheel(id).suspension_force, 0.0);
    }
    // identity pose: suspension, bars and ground effect are the only vertical forces
    for applied in &body.forces {
        assert_eq!(applied.force.y, 0.0, "unexpected vertical force {:?}", applied);
    }
    assert_eq!(t.ground_effect, 0.0);
}

#[test]
fn top_speed_cut_blocks_only_forward_thrust() {
    let config = KartConfig::default();
    let limit = config.motor.velocity_limit;
    let mut kart = Kart::new(config, MASS);
    let ground = FlatGround::new(0.0);

    let mut body = moving_body(0.6, limit + 5.0);
    assert!(kart.tick(&mut body, &ground, full_throttle(), DT).motor_cut);

    let mut body = moving_body(0.6, limit + 5.0);
    assert!(!kart.tick(&mut body, &ground, DriverInput::new(0.0, -1.0, false), DT).motor_cut);

    let mut body = moving_body(0.6, limit - 5.0);
    assert!(!kart.tick(&mut body, &ground, full_throttle(), DT).motor_cut);
}

#[test]
fn steering_reaches_force_axes_one_tick_late() {
    let mut kart = Kart::new(KartConfig::default(), MASS);
    let ground = FlatGround::new(0.0);
    let hard_right = DriverInput::new(1.0, 0.0, false);

    // straight ahead: the first steered tick still uses unsteered axes
    let mut body = moving_body(0.6, 5.0);
    let first = kart.tick(&mut body, &ground, hard_right, DT);
    assert_eq!(first.wheel(WheelId::FL).lateral, 0.0);
    assert_eq!(first.wheel(WheelId::FR).lateral, 0.0);

    let mut body = moving_body(0.6, 5.0);
    let second = kart.tick(&mut body, &ground, hard_right, DT);
    assert!(second.wheel(WheelId::FL).lateral.abs() > 1.0);
    assert!(second.wheel(WheelId::FR).lateral.abs() > 1.0);
    // rear axle never steers
    assert_eq!(second.wheel(WheelId::RL).lateral, 0.0);
}

#[test]
fn handbrake_opposes_rear_rolling_direction() {
    let mut kart = Kart::new(KartConfig::default(), MASS);
    let ground = FlatGround::new(0.0);
    let braking = DriverInput::new(0.0, 0.0, true);

    let mut body = moving_body(0.6, 4.0);
    let t = kart.tick(&mut body, &ground, braking, DT);
    assert!(t.handbrake);
    assert!(t.wheel(WheelId::RL).longitudinal < 0.0);

    kart.respawn();
    let mut body = moving_body(0.6, -4.0);
    let t = kart.tick(&mut body, &ground, braking, DT);
    assert!(t.wheel(WheelId::RR).longitudinal > 0.0);
}

#[test]
fn out_of_range_input_is_clamped() {
    let mut a = Kart::new(KartConfig::default(), MASS);
    let mut b = Kart::new(KartConfig::default(), MASS);
    let ground = FlatGround::new(0.0);

    let mut body_a = body_at(0.6);
    let mut body_b = body_at(0.6);
    let ta = a.tick(&mut body_a, &ground, DriverInput::new(9.0, 4.0, false), DT);
    let tb = b.tick(&mut body_b, &ground, DriverInput::new(1.0, 1.0, false), DT);
    assert_eq!(ta, tb);
    assert_eq!(a.mount(WheelId::FL), b.mount(WheelId::FL));
}

#[test]
fn respawn_resets_engine_and_corners() {
    let config = KartConfig::default();
    let idle = EngineState::new(&config.engine);
    let mut kart = Kart::new(config, MASS);
    let ground = FlatGround::new(0.0);

    for _ in 0..10 {
        let mut body = body_at(0.6);
        kart.tick(&mut body, &ground, DriverInput::new(0.5, 1.0, false), DT);
    }
    assert!(kart.engine().current_rpm > idle.current_rpm);

    kart.respawn();
    assert_eq!(*kart.engine(), idle);
    assert!(kart.corners().iter().all(|c| c.compression == 0.0 && !c.grounded));
}
