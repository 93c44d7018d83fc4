//! Numeric helpers shared by the solver.

const SQRT_MAX_ITERATIONS: usize = 1000;
const SQRT_RELATIVE_ERROR: f64 = 1e-15;

/// Square root by Newton's method.
///
/// Defined for non-negative finite inputs, subnormals included; anything else
/// yields NaN. Each step at least halves the distance to the root, so even
/// `f64::MAX` settles well inside the iteration cap; the cap alone bounds the
/// loop for every input.
pub fn sqrt(value: f64) -> f64 {
    if value.is_nan() || value.is_infinite() || value < 0.0 {
        return f64::NAN;
    }
    if value == 0.0 {
        return 0.0;
    }

    let mut guess = if value < 1.0 { 1.0 } else { value };
    for _ in 0..SQRT_MAX_ITERATIONS {
        let next = 0.5 * (guess + value / guess);
        if (guess - next).abs() <= SQRT_RELATIVE_ERROR * next {
            return next;
        }
        guess = next;
    }
    guess
}

/// Collapses `-0.0` to `0.0` so reported values never print a signed zero.
pub fn normalize_zero(value: f64) -> f64 {
    if value == 0.0 { 0.0 } else { value }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        if expected == 0.0 {
            assert_eq!(actual, 0.0);
            return;
        }
        let relative = ((actual - expected) / expected).abs();
        assert!(
            relative <= 4.0 * f64::EPSILON,
            "sqrt mismatch: got {actual}, want {expected}"
        );
    }

    #[test]
    fn agrees_with_std_sqrt_on_integers() {
        for n in 0..=10_000u32 {
            let value = f64::from(n);
            assert_close(sqrt(value), value.sqrt());
        }
    }

    #[test]
    fn agrees_with_std_sqrt_on_fractions_and_extremes() {
        for value in [
            0.1,
            0.01,
            0.001,
            0.25,
            2.0,
            164.8,
            f64::from(i32::MAX),
            f64::MIN_POSITIVE,
            5e-324,
            1e-307,
            1e307,
            f64::MAX,
        ] {
            assert_close(sqrt(value), value.sqrt());
        }
    }

    #[test]
    fn perfect_squares_are_exact() {
        assert_eq!(sqrt(0.0), 0.0);
        assert_eq!(sqrt(1.0), 1.0);
        assert_eq!(sqrt(4.0), 2.0);
        assert_eq!(sqrt(16.0), 4.0);
        assert_eq!(sqrt(49.0), 7.0);
        assert_eq!(sqrt(144.0), 12.0);
        assert_eq!(sqrt(0.25), 0.5);
    }

    #[test]
    fn invalid_inputs_yield_nan() {
        assert!(sqrt(-1.0).is_nan());
        assert!(sqrt(-0.0001).is_nan());
        assert!(sqrt(-f64::MIN_POSITIVE).is_nan());
        assert!(sqrt(f64::MIN).is_nan());
        assert!(sqrt(f64::NAN).is_nan());
        assert!(sqrt(f64::INFINITY).is_nan());
    }

    #[test]
    fn normalize_zero_strips_the_sign() {
        assert_eq!(normalize_zero(-0.0).to_string(), "0");
        assert_eq!(normalize_zero(0.0).to_string(), "0");
        assert_eq!(normalize_zero(-2.5), -2.5);
        assert_eq!(normalize_zero(2.5), 2.5);
    }
}
