use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::info;

use kart_physics::kart_core::types::Point;
use kart_physics::{DriverInput, KartConfig, PhysicsWorld, Snapshot};

#[derive(Parser, Debug)]
#[command(about = "Headless fixed-step kart simulation, prints JSON telemetry lines")]
struct Args {
    /// Kart configuration (JSON). Missing keys keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Simulated seconds to run.
    #[arg(long, default_value_t = 10.0)]
    seconds: f32,

    /// Fixed physics step in seconds.
    #[arg(long, default_value_t = 0.02)]
    dt: f32,

    /// Constant throttle input (-1..1).
    #[arg(long, default_value_t = 1.0, allow_hyphen_values = true)]
    throttle: f32,

    /// Constant steering input (-1..1, positive = right).
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    steer: f32,

    /// Hold the handbrake for the whole run.
    #[arg(long)]
    handbrake: bool,

    /// Emit a snapshot every N ticks (0 = never).
    #[arg(long, default_value_t = 10)]
    emit_every: u64,

    /// Run as fast as possible instead of in real time.
    #[arg(long)]
    fast: bool,

    /// More log output (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<KartConfig> {
    let Some(path) = path else {
        return Ok(KartConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading kart config {}", path.display()))?;
    KartConfig::from_json(&text).with_context(|| format!("parsing kart config {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    anyhow::ensure!(args.dt > 0.0 && args.dt.is_finite(), "--dt must be positive, got {}", args.dt);
    anyhow::ensure!(args.seconds >= 0.0, "--seconds must not be negative");

    let config = load_config(args.config.as_ref())?;
    info!("🚀 Starting kart simulation");

    let mut world = PhysicsWorld::new(config.gravity.vector());
    let spawn = Point::new(0.0, config.body.spawn_height, 0.0);
    let kart = world.spawn_kart(config, spawn);
    world.set_input(kart, DriverInput::new(args.steer, args.throttle, args.handbrake));

    let ticks = (args.seconds / args.dt).round() as u64;
    let mut ticker = interval(Duration::from_secs_f32(args.dt));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut top_speed_kmh = 0.0_f32;
    for tick in 1..=ticks {
        if !args.fast {
            ticker.tick().await;
        }

        world.step(args.dt);

        let telemetry = world.telemetry(kart).context("kart vanished from the world")?;
        top_speed_kmh = top_speed_kmh.max(telemetry.speed_kmh());

        if args.emit_every > 0 && tick % args.emit_every == 0 {
            let position = world
                .chassis_pose(kart)
                .map(|p| p.position)
                .unwrap_or(spawn);
            let snapshot = Snapshot::new(tick, tick as f32 * args.dt, position, telemetry);
            println!("{}", snapshot.to_json_line()?);
        }
    }

    let last = world.telemetry(kart).unwrap_or_default();
    info!(
        ticks,
        top_speed_kmh,
        final_rpm = last.rpm,
        "simulation finished"
    );
    Ok(())
}
