//! Angle helpers. All angles are radians; normalized angles lie in (-π, π].

use euclid::Angle;

pub const PI: f64 = std::f64::consts::PI;

/// Maps any finite angle into (-π, π].
pub fn normalize(angle: f64) -> f64 {
    let signed = Angle::radians(angle).signed().radians;
    // Rounding just above π can land on −π.
    if signed <= -PI {
        PI
    } else {
        signed
    }
}

/// Signed rotation that takes `from` onto `to`, normalized.
pub fn between(from: f64, to: f64) -> f64 {
    normalize(to - from)
}

pub fn degrees(degrees: f64) -> f64 {
    Angle::degrees(degrees).radians
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn normalize_keeps_pi_and_folds_minus_pi() {
        assert!(close(normalize(PI), PI));
        assert!(close(normalize(-PI), PI));
        assert!(close(normalize(3.0 * PI), PI));
    }

    #[test]
    fn normalize_never_returns_minus_pi() {
        let just_above = f64::from_bits(PI.to_bits() + 1);
        assert_eq!(normalize(just_above), PI);
        assert_eq!(normalize(-PI), PI);
    }

    #[test]
    fn normalize_wraps_multiple_turns() {
        assert!(close(normalize(degrees(370.0)), degrees(10.0)));
        assert!(close(normalize(degrees(-190.0)), degrees(170.0)));
        assert!(close(normalize(0.0), 0.0));
    }

    #[test]
    fn between_takes_the_short_way_round() {
        assert!(close(between(degrees(170.0), degrees(-170.0)), degrees(20.0)));
        assert!(close(between(degrees(-170.0), degrees(170.0)), degrees(-20.0)));
    }
}
