//! Real roots of `a t^2 + b t + c = 0` in double precision.

const EPSILON: f64 = 1e-12;

/// The two distinct real roots in ascending order.
///
/// A vanishing leading coefficient or a non-positive discriminant yields
/// `None`: a ray that only grazes a surface does not enter it.
pub fn solve_quadratic(a: f64, b: f64, c: f64) -> Option<(f64, f64)> {
    if a.abs() < EPSILON {
        return None;
    }

    let discriminant = b * b - 4.0 * a * c;
    if discriminant <= 0.0 || !discriminant.is_finite() {
        return None;
    }

    // Avoid cancellation between -b and the root of the discriminant
    let sign = if b < 0.0 { -1.0 } else { 1.0 };
    let q = -0.5 * (b + sign * discriminant.sqrt());
    let r1 = q / a;
    let r2 = c / q;

    Some((r1.min(r2), r1.max(r2)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_roots_sorted() {
        // (t - 4)(t - 6)
        let (t0, t1) = solve_quadratic(1.0, -10.0, 24.0).unwrap();
        assert!((t0 - 4.0).abs() < 1e-12);
        assert!((t1 - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_negative_leading_coefficient() {
        // -(t + 1)(t - 3)
        let (t0, t1) = solve_quadratic(-1.0, 2.0, 3.0).unwrap();
        assert!((t0 + 1.0).abs() < 1e-12);
        assert!((t1 - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_cases() {
        assert_eq!(solve_quadratic(1.0, 2.0, 1.0), None); // double root
        assert_eq!(solve_quadratic(1.0, 0.0, 1.0), None); // complex
        assert_eq!(solve_quadratic(0.0, 2.0, 1.0), None); // linear
    }
}
