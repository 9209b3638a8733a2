//! Quadratic equation primitives used by the quadric intersections
//!
//! Every geometric step of the resolver bottoms out in one of these two
//! functions. Degenerate coefficients are reported as `None`, never as a
//! panic: the caller treats them as "no solution for this branch".

/// Solve `a·x² + b·x + c = 0` with the standard formula.
///
/// Returns both roots, smaller first. `None` when `a == 0` (not a quadratic)
/// or when the discriminant is negative (no real roots).
pub fn solve_quadratic(a: f64, b: f64, c: f64) -> Option<(f64, f64)> {
    if a == 0.0 {
        return None;
    }

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }

    let sqrt_d = discriminant.sqrt();
    let root0 = (-b - sqrt_d) / (2.0 * a);
    let root1 = (-b + sqrt_d) / (2.0 * a);

    if root0 <= root1 {
        Some((root0, root1))
    } else {
        Some((root1, root0))
    }
}

/// X intercepts of a bistatic-range ellipse with a monostatic-range circle.
///
/// `a` is the ellipse center offset along the axis (half the receiver
/// baseline), `b` the squared bistatic semi-parameter `(t·v/2)²`, and `c`
/// the squared circle radius. Expanding the intersection condition yields a
/// single quadratic in `x`:
///
/// `a²·x² − 2a(a² − b)·x + ((a² − b)² − bc) = 0`
///
/// whose discriminant reduces to `4a²bc`. A zero baseline (`a == 0`) or a
/// zero-time reading (`b == 0`) makes the constraint degenerate.
pub fn circle_ellipse_x_intercepts(a: f64, b: f64, c: f64) -> Option<(f64, f64)> {
    if a == 0.0 || b == 0.0 {
        return None;
    }

    let shift = a * a - b;
    solve_quadratic(a * a, -2.0 * a * shift, shift * shift - b * c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_distinct_real_roots() {
        // x² - 5x + 6 = (x - 2)(x - 3)
        let (r0, r1) = solve_quadratic(1.0, -5.0, 6.0).unwrap();
        assert_relative_eq!(r0, 2.0);
        assert_relative_eq!(r1, 3.0);
    }

    #[test]
    fn test_repeated_root() {
        let (r0, r1) = solve_quadratic(1.0, -4.0, 4.0).unwrap();
        assert_relative_eq!(r0, 2.0);
        assert_relative_eq!(r1, 2.0);
    }

    #[test]
    fn test_degenerate_leading_coefficient() {
        assert_eq!(solve_quadratic(0.0, 2.0, 1.0), None);
    }

    #[test]
    fn test_negative_discriminant() {
        assert_eq!(solve_quadratic(1.0, 0.0, 1.0), None);
    }

    #[test]
    fn test_intercepts_match_direct_formula() {
        // Values in the range the resolver produces: a = half baseline,
        // b = (t·v/2)², c = r².
        let a = -0.075;
        let b = 26.0_f64;
        let c = 25.0_f64;

        let (x0, x1) = circle_ellipse_x_intercepts(a, b, c).unwrap();

        // Direct form of the same intercepts: (a³ ∓ |a|√(bc) − ab) / a²
        let d = (a * a * b * c).sqrt();
        let e0 = (a.powi(3) - d - a * b) / (a * a);
        let e1 = (a.powi(3) + d - a * b) / (a * a);
        let (e0, e1) = if e0 <= e1 { (e0, e1) } else { (e1, e0) };

        assert_relative_eq!(x0, e0, max_relative = 1e-12);
        assert_relative_eq!(x1, e1, max_relative = 1e-12);
    }

    #[test]
    fn test_zero_baseline_is_degenerate() {
        // Receiver coincident with the emitter: no crash, no roots.
        assert_eq!(circle_ellipse_x_intercepts(0.0, 26.0, 25.0), None);
    }

    #[test]
    fn test_zero_time_reading_is_degenerate() {
        assert_eq!(circle_ellipse_x_intercepts(-0.075, 0.0, 25.0), None);
    }
}
