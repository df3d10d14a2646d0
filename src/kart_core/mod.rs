//! kart_core - engine-agnostic kart helpers (pure types + solver)

pub mod types;
pub mod body;
pub mod kinematics;
pub mod engine;
pub mod tire;
pub mod suspension;
pub mod anti_roll;
pub mod aero;

pub use types::*;
pub use body::{FlatGround, ForceRecorder, GroundProbe, KartBody, NoGround};
pub use engine::{EngineConfig, EngineState, TorqueCurve};
pub use tire::{DriveLayout, DriveShare, DrivetrainConfig, FrictionCircleMode, TireConfig, WheelForce};
pub use suspension::{CornerState, SuspensionConfig};
pub use aero::AeroConfig;
