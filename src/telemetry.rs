// ==============================================================================
// telemetry.rs — PER-TICK KART READOUT
// ------------------------------------------------------------------------------
// KartTelemetry is returned by every Kart::tick. Snapshot wraps it with the tick
// index and chassis position, and is emitted as one JSON line by kart-sim.
// ==============================================================================

use serde::Serialize;

use crate::kart_core::types::{Point, WheelId};

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct WheelTelemetry {
    pub id: WheelId,
    pub compression: f32,      // m
    pub suspension_force: f32, // N along mount up
    pub grounded: bool,
    pub longitudinal: f32,     // N
    pub lateral: f32,          // N
}

impl WheelTelemetry {
    pub fn idle(id: WheelId) -> Self {
        Self {
            id,
            compression: 0.0,
            suspension_force: 0.0,
            grounded: false,
            longitudinal: 0.0,
            lateral: 0.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct KartTelemetry {
    pub forward_speed: f32,     // m/s along body forward
    pub speed: f32,             // m/s, |v|
    pub rpm: f32,
    pub torque: f32,            // Nm, gross engine drive
    pub filtered_throttle: f32,
    pub limiter_effect: f32,
    pub handbrake: bool,
    pub motor_cut: bool,        // direct motor force skipped (top speed)
    pub front_stabilizer: f32,  // N
    pub rear_stabilizer: f32,   // N
    pub downforce: f32,         // N (wing)
    pub ground_effect: f32,     // N
    pub wheels: [WheelTelemetry; 4],
}

impl Default for KartTelemetry {
    fn default() -> Self {
        Self {
            forward_speed: 0.0,
            speed: 0.0,
            rpm: 0.0,
            torque: 0.0,
            filtered_throttle: 0.0,
            limiter_effect: 1.0,
            handbrake: false,
            motor_cut: false,
            front_stabilizer: 0.0,
            rear_stabilizer: 0.0,
            downforce: 0.0,
            ground_effect: 0.0,
            wheels: WheelId::ALL.map(WheelTelemetry::idle),
        }
    }
}

impl KartTelemetry {
    pub fn wheel(&self, id: WheelId) -> &WheelTelemetry {
        &self.wheels[id.index()]
    }

    pub fn speed_kmh(&self) -> f32 {
        self.forward_speed * 3.6
    }
}

/// One emitted line.
#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub time: f32,          // s of simulated time
    pub position: [f32; 3], // chassis
    #[serde(flatten)]
    pub kart: KartTelemetry,
}

impl Snapshot {
    pub fn new(tick: u64, time: f32, position: Point, kart: KartTelemetry) -> Self {
        Self {
            tick,
            time,
            position: [position.x, position.y, position.z],
            kart,
        }
    }

    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_serializes_flat() {
        let snap = Snapshot::new(7, 0.14, Point::new(1.0, 0.5, -2.0), KartTelemetry::default());
        let line = snap.to_json_line().expect("serializes");
        let value: serde_json::Value = serde_json::from_str(&line).expect("valid json");
        assert_eq!(value["tick"], 7);
        assert_eq!(value["wheels"][2]["id"], "RL");
        assert!(value.get("rpm").is_some());
        assert!(!line.contains('\n'));
    }
}
