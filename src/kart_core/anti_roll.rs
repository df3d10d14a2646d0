// ==============================================================================
// anti_roll.rs — ANTI-ROLL BAR (PER AXLE)
// ------------------------------------------------------------------------------
// Couples left/right compression on one axle:
//
//   F = (c_left - c_right) * stabilizer
//   left mount:  -body_up * F
//   right mount: +body_up * F
//
// A side transmits only when its compression is non-negative (> -EPSILON) and
// that corner had ground contact this tick. An airborne corner pushes nothing.
// ==============================================================================

use crate::kart_core::body::KartBody;
use crate::kart_core::suspension::CornerState;
use crate::kart_core::types::{Point, Vec3, EPSILON};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AntiRollForce {
    pub raw: f32,   // N, (c_left - c_right) * stiffness
    pub left: f32,  // N along body up actually applied on the left (0 if gated)
    pub right: f32, // N along body up actually applied on the right
}

#[inline]
fn transmits(corner: &CornerState) -> bool {
    corner.grounded && corner.compression > -EPSILON
}

/// Bar force for one axle. Pure.
pub fn anti_roll_forces(stiffness: f32, left: &CornerState, right: &CornerState) -> AntiRollForce {
    let raw = (left.compression - right.compression) * stiffness;
    AntiRollForce {
        raw,
        left: if transmits(left) { -raw } else { 0.0 },
        right: if transmits(right) { raw } else { 0.0 },
    }
}

/// Evaluate and push one axle's bar forces onto the body.
pub fn apply_anti_roll<B: KartBody + ?Sized>(
    body: &mut B,
    stiffness: f32,
    body_up: &Vec3,
    left: (&CornerState, Point),
    right: (&CornerState, Point),
) -> AntiRollForce {
    let bar = anti_roll_forces(stiffness, left.0, right.0);
    if transmits(left.0) {
        body.apply_force_at_point(body_up * bar.left, left.1);
    }
    if transmits(right.0) {
        body.apply_force_at_point(body_up * bar.right, right.1);
    }
    bar
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn corner(compression: f32, grounded: bool) -> CornerState {
        CornerState { compression, grounded, force: 0.0 }
    }

    #[test]
    fn bar_pushes_compressed_side_down_and_other_up() {
        let bar = anti_roll_forces(800.0, &corner(0.1, true), &corner(0.0, true));
        assert_relative_eq!(bar.raw, 80.0, epsilon = 1e-4);
        assert_relative_eq!(bar.left, -80.0, epsilon = 1e-4);
        assert_relative_eq!(bar.right, 80.0, epsilon = 1e-4);
    }

    #[test]
    fn extended_or_airborne_side_is_gated() {
        let bar = anti_roll_forces(800.0, &corner(0.1, true), &corner(-0.05, true));
        assert!(bar.left != 0.0);
        assert_eq!(bar.right, 0.0);

        let bar = anti_roll_forces(800.0, &corner(0.1, false), &corner(0.0, false));
        assert_eq!(bar.left, 0.0);
        assert_eq!(bar.right, 0.0);
    }

    #[test]
    fn equal_compression_gives_no_force() {
        let bar = anti_roll_forces(600.0, &corner(0.07, true), &corner(0.07, true));
        assert_eq!(bar.raw, 0.0);
    }
}
