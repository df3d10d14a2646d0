//! Arcade kart vehicle dynamics.
//!
//! `kart_core` holds the engine-agnostic solver pieces (engine, tires,
//! suspension, aero) behind the `KartBody` / `GroundProbe` seams. `vehicle::Kart`
//! orders them into one fixed tick. `physics` hosts karts in a rapier3d world.

pub mod config;
pub mod kart_core;
pub mod physics;
pub mod telemetry;
pub mod vehicle;

pub use config::KartConfig;
pub use kart_core::{DriverInput, GroundProbe, KartBody, WheelId};
pub use physics::PhysicsWorld;
pub use telemetry::{KartTelemetry, Snapshot};
pub use vehicle::Kart;
