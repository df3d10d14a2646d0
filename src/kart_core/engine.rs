// ==============================================================================
// engine.rs — ENGINE RPM DYNAMICS + REV LIMITER
// ------------------------------------------------------------------------------
// One call per physics tick:
//
//   filtered_throttle  ← move_toward(filtered, clamp01(throttle), sensitivity * dt)
//   limiter_effect     ← f(rpm at the START of the step)
//   drive              = curve(rpm) * filtered_throttle * limiter_effect
//   net                = drive - friction_factor * rpm - load_factor * |speed|
//   rpm               += net * inertia_factor * dt      (clamped to [min, max])
//
// inertia_factor = 60 / (2π · max(inertia, EPSILON)) converts rad/s² to rpm/s.
//
// The returned torque is the gross drive torque; friction and load only shape
// the RPM evolution.
// ==============================================================================

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::kart_core::types::{clamp01, move_toward, EPSILON};

// ============================================
// Torque curve
// ============================================

/// Piecewise-linear RPM → torque (Nm) lookup.
/// Keys are kept sorted by rpm; lookups outside the sampled domain clamp to the
/// end keys.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<(f32, f32)>", into = "Vec<(f32, f32)>")]
pub struct TorqueCurve {
    keys: Vec<(f32, f32)>, // (rpm, Nm)
}

impl From<Vec<(f32, f32)>> for TorqueCurve {
    fn from(keys: Vec<(f32, f32)>) -> Self {
        Self::new(keys)
    }
}

impl From<TorqueCurve> for Vec<(f32, f32)> {
    fn from(curve: TorqueCurve) -> Self {
        curve.keys
    }
}

impl TorqueCurve {
    /// Build from (rpm, torque) samples. Samples are sorted by rpm; non-finite
    /// samples are dropped.
    pub fn new(mut keys: Vec<(f32, f32)>) -> Self {
        keys.retain(|(rpm, nm)| rpm.is_finite() && nm.is_finite());
        keys.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self { keys }
    }

    pub fn empty() -> Self {
        Self { keys: Vec::new() }
    }

    pub fn keys(&self) -> &[(f32, f32)] {
        &self.keys
    }

    /// Torque at `rpm`, clamped to the end keys. NaN reads as the lowest key.
    pub fn evaluate(&self, rpm: f32) -> f32 {
        let (Some(first), Some(last)) = (self.keys.first(), self.keys.last()) else {
            return 0.0;
        };
        if rpm.is_nan() || rpm <= first.0 {
            return first.1;
        }
        if rpm >= last.0 {
            return last.1;
        }

        // first key whose rpm is strictly above the query
        let upper = self.keys.partition_point(|(k, _)| *k <= rpm);
        let (r0, t0) = self.keys[upper - 1];
        let (r1, t1) = self.keys[upper];
        let span = r1 - r0;
        if span <= EPSILON {
            return t1;
        }
        t0 + (t1 - t0) * ((rpm - r0) / span)
    }
}

impl Default for TorqueCurve {
    /// Reference kart curve: rises to a 3500 rpm peak and falls off toward redline.
    fn default() -> Self {
        Self::new(vec![
            (500.0, 140.0),
            (2000.0, 180.0),
            (3500.0, 200.0),
            (5000.0, 185.0),
            (6000.0, 150.0),
        ])
    }
}

// ============================================
// Config + state
// ============================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub min_rpm: f32,              // idle floor
    pub max_rpm: f32,              // hard ceiling
    pub limiter_rpm: f32,          // limiter starts fading torque here
    pub inertia: f32,              // kg·m²
    pub throttle_sensitivity: f32, // filtered throttle units per second
    pub friction_factor: f32,      // Nm per rpm
    pub load_factor: f32,          // Nm per m/s
    pub torque_curve: TorqueCurve,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_rpm: 500.0,
            max_rpm: 6000.0,
            limiter_rpm: 5000.0,
            inertia: 0.2,
            throttle_sensitivity: 5.0,
            friction_factor: 0.02,
            load_factor: 5.0,
            torque_curve: TorqueCurve::default(),
        }
    }
}

impl EngineConfig {
    /// rad/s² → rpm/s, with the inertia floored at EPSILON.
    #[inline]
    pub fn inertia_factor(&self) -> f32 {
        60.0 / (2.0 * std::f32::consts::PI * self.inertia.max(EPSILON))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngineState {
    pub current_rpm: f32,
    pub current_torque: f32,     // gross drive torque of the last step
    pub filtered_throttle: f32,  // 0..1
    pub limiter_effect: f32,     // 0..1
}

impl EngineState {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            current_rpm: config.min_rpm,
            current_torque: 0.0,
            filtered_throttle: 0.0,
            limiter_effect: 1.0,
        }
    }

    /// Back to idle. Only used on respawn.
    pub fn reset(&mut self, config: &EngineConfig) {
        *self = Self::new(config);
    }
}

// ============================================
// Solver
// ============================================

/// Rev limiter multiplier for a given rpm. Full torque at or below the limiter,
/// none at or above max, linear fade in between.
pub fn limiter_effect(config: &EngineConfig, rpm: f32) -> f32 {
    if rpm <= config.limiter_rpm {
        return 1.0;
    }
    if rpm >= config.max_rpm {
        return 0.0;
    }
    let band = config.max_rpm - config.limiter_rpm;
    if band <= EPSILON {
        return 0.0;
    }
    1.0 - (rpm - config.limiter_rpm) / band
}

/// Advance the engine one step. Returns the gross drive torque (Nm).
pub fn simulate(
    config: &EngineConfig,
    state: &mut EngineState,
    throttle_input: f32,
    forward_speed: f32,
    dt: f32,
) -> f32 {
    let target = clamp01(throttle_input);
    state.filtered_throttle = move_toward(
        state.filtered_throttle,
        target,
        config.throttle_sensitivity * dt,
    );

    let previous_limiter = state.limiter_effect;
    state.limiter_effect = limiter_effect(config, state.current_rpm);
    if previous_limiter >= 1.0 && state.limiter_effect < 1.0 {
        debug!(rpm = state.current_rpm, "rev limiter engaged");
    } else if previous_limiter < 1.0 && state.limiter_effect >= 1.0 {
        debug!(rpm = state.current_rpm, "rev limiter released");
    }

    let max_torque = config.torque_curve.evaluate(state.current_rpm);
    let drive = max_torque * state.filtered_throttle * state.limiter_effect;
    let friction = config.friction_factor * state.current_rpm;
    let load = config.load_factor * forward_speed.abs();
    let net = drive - friction - load;

    let rpm = state.current_rpm + net * config.inertia_factor() * dt;
    // min first so a misconfigured min > max still lands on max
    state.current_rpm = rpm.max(config.min_rpm).min(config.max_rpm);

    state.current_torque = drive;
    drive
}
