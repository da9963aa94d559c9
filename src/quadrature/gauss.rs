//! Gaussian quadrature methods.
//!
//! Gauss-Legendre quadrature is optimal for integrating polynomials.
//! An n-point rule exactly integrates polynomials of degree 2n-1.

use crate::callback::Evaluation;
use crate::error::{IntegrateError, IntegrateResult};

/// Tabulated rules store `(node, weight)` for the non-negative nodes only;
/// the negative half is the mirror image.
const TABLES: [&[(f64, f64)]; 10] = [
    &[(0.0, 2.0)],
    &[(0.5773502691896257, 1.0)],
    &[(0.0, 0.8888888888888888), (0.7745966692414834, 0.5555555555555556)],
    &[
        (0.3399810435848563, 0.6521451548625461),
        (0.8611363115940526, 0.3478548451374538),
    ],
    &[
        (0.0, 0.5688888888888889),
        (0.5384693101056831, 0.4786286704993665),
        (0.9061798459386640, 0.2369268850561891),
    ],
    &[
        (0.2386191860831969, 0.4679139345726910),
        (0.6612093864662645, 0.3607615730481386),
        (0.9324695142031521, 0.1713244923791704),
    ],
    &[
        (0.0, 0.4179591836734694),
        (0.4058451513773972, 0.3818300505051189),
        (0.7415311855993945, 0.2797053914892766),
        (0.9491079123427585, 0.1294849661688697),
    ],
    &[
        (0.1834346424956498, 0.3626837833783620),
        (0.5255324099163290, 0.3137066458778873),
        (0.7966664774136267, 0.2223810344533745),
        (0.9602898564975363, 0.1012285362903763),
    ],
    &[
        (0.0, 0.3302393550012598),
        (0.3242534234038089, 0.3123470770400029),
        (0.6133714327005904, 0.2606106964029354),
        (0.8360311073266358, 0.1806481606948574),
        (0.9681602395076261, 0.0812743883615744),
    ],
    &[
        (0.1488743389816312, 0.2955242247147529),
        (0.4333953941292472, 0.2692667193099963),
        (0.6794095682990244, 0.2190863625159820),
        (0.8650633666889845, 0.1494513491505806),
        (0.9739065285171717, 0.0666713443086881),
    ],
];

/// Gauss-Legendre quadrature rule.
///
/// Stores nodes (abscissae) and weights for Gauss-Legendre quadrature.
/// The nodes are roots of Legendre polynomials on [-1, 1], sorted ascending.
#[derive(Debug, Clone)]
pub struct GaussLegendreQuadrature {
    /// Quadrature nodes on [-1, 1]
    pub nodes: Vec<f64>,
    /// Quadrature weights
    pub weights: Vec<f64>,
}

impl GaussLegendreQuadrature {
    /// Create a new Gauss-Legendre quadrature rule with `n` points.
    ///
    /// Uses tabulated values for n <= 10 and Newton iteration on the
    /// Legendre polynomial for larger n.
    ///
    /// # Example
    ///
    /// ```
    /// use numint::GaussLegendreQuadrature;
    ///
    /// let rule = GaussLegendreQuadrature::new(5).unwrap();
    /// assert_eq!(rule.nodes.len(), 5);
    /// assert_eq!(rule.weights.len(), 5);
    /// ```
    pub fn new(n: usize) -> IntegrateResult<Self> {
        if n == 0 {
            return Err(IntegrateError::invalid_parameter(
                "n",
                "need at least 1 quadrature point",
            ));
        }

        let half = match TABLES.get(n - 1) {
            Some(table) => table.to_vec(),
            None => compute_half_rule(n),
        };

        Ok(Self::from_half(n, &half))
    }

    /// Expand a non-negative half rule into the full, ascending rule.
    fn from_half(n: usize, half: &[(f64, f64)]) -> Self {
        let mut nodes = Vec::with_capacity(n);
        let mut weights = Vec::with_capacity(n);

        for &(x, w) in half.iter().rev() {
            if x != 0.0 {
                nodes.push(-x);
                weights.push(w);
            }
        }
        for &(x, w) in half {
            nodes.push(x);
            weights.push(w);
        }

        Self { nodes, weights }
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the rule has no points (never true for a constructed rule).
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Integrate a function over [a, b].
    ///
    /// # Example
    ///
    /// ```
    /// use numint::GaussLegendreQuadrature;
    ///
    /// let rule = GaussLegendreQuadrature::new(5).unwrap();
    /// let result = rule.integrate(|x: f64| x * x, 0.0, 1.0).unwrap();
    /// assert!((result - 1.0 / 3.0).abs() < 1e-14);
    /// ```
    pub fn integrate<F, R>(&self, f: F, a: f64, b: f64) -> IntegrateResult<f64>
    where
        F: Fn(f64) -> R,
        R: Evaluation<f64>,
    {
        // Transform from [-1, 1] to [a, b]
        let mid = 0.5 * (a + b);
        let half_width = 0.5 * (b - a);

        let mut result = 0.0;
        for (&node, &weight) in self.nodes.iter().zip(&self.weights) {
            result += weight * f(mid + half_width * node).into_value()?;
        }

        Ok(result * half_width)
    }
}

/// Compute the non-negative half of an n-point rule by Newton iteration.
///
/// Initial guesses are the Chebyshev-like approximations
/// `cos(pi (4i + 3) / (4n + 2))`.
fn compute_half_rule(n: usize) -> Vec<(f64, f64)> {
    let m = n.div_ceil(2);
    let mut half = Vec::with_capacity(m);

    for i in 0..m {
        let mut x = ((4 * i + 3) as f64 / (4 * n + 2) as f64 * std::f64::consts::PI).cos();

        for _ in 0..100 {
            let (p, dp) = legendre_eval(n, x);
            let dx = p / dp;
            x -= dx;
            if dx.abs() < 1e-15 {
                break;
            }
        }

        let (_, dp) = legendre_eval(n, x);
        let w = 2.0 / ((1.0 - x * x) * dp * dp);

        // The middle root of an odd-order polynomial is exactly zero
        if n % 2 == 1 && i == m - 1 {
            half.push((0.0, w));
        } else {
            half.push((x, w));
        }
    }

    half.reverse();
    half
}

/// Evaluate Legendre polynomial P_n(x) and its derivative P_n'(x).
///
/// Uses the three-term recurrence
/// `(k+1) P_{k+1} = (2k+1) x P_k - k P_{k-1}`.
fn legendre_eval(n: usize, x: f64) -> (f64, f64) {
    if n == 0 {
        return (1.0, 0.0);
    }

    let mut p_prev = 1.0;
    let mut p_curr = x;
    let mut dp_prev = 0.0;
    let mut dp_curr = 1.0;

    for k in 1..n {
        let kf = k as f64;
        let p_next = ((2.0 * kf + 1.0) * x * p_curr - kf * p_prev) / (kf + 1.0);
        let dp_next = ((2.0 * kf + 1.0) * (p_curr + x * dp_curr) - kf * dp_prev) / (kf + 1.0);

        p_prev = p_curr;
        p_curr = p_next;
        dp_prev = dp_curr;
        dp_curr = dp_next;
    }

    (p_curr, dp_curr)
}

/// Fixed-order Gaussian quadrature.
///
/// Integrates a function using Gauss-Legendre quadrature with exactly `n`
/// points; no adaptivity and no error estimate. An n-point rule is exact for
/// polynomials of degree 2n-1. `a > b` gives the negated integral.
///
/// # Example
///
/// ```
/// use numint::fixed_quad;
///
/// // Integrate x^4 from 0 to 1 (exact = 0.2)
/// let result = fixed_quad(|x: f64| x.powi(4), 0.0, 1.0, 5).unwrap();
/// assert!((result - 0.2).abs() < 1e-14);
/// ```
pub fn fixed_quad<F, R>(f: F, a: f64, b: f64, n: usize) -> IntegrateResult<f64>
where
    F: Fn(f64) -> R,
    R: Evaluation<f64>,
{
    if !a.is_finite() || !b.is_finite() {
        return Err(IntegrateError::InvalidInterval {
            a,
            b,
            context: "fixed_quad (bounds must be finite)".to_string(),
        });
    }

    let rule = GaussLegendreQuadrature::new(n)?;
    rule.integrate(f, a, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    /// Exact integral of x^k over [a, b].
    fn monomial_integral(k: i32, a: f64, b: f64) -> f64 {
        (b.powi(k + 1) - a.powi(k + 1)) / (k + 1) as f64
    }

    #[test]
    fn test_polynomial_exactness() {
        // n-point rule is exact for degree 2n-1
        for n in 1..=12 {
            let rule = GaussLegendreQuadrature::new(n).unwrap();
            for k in 0..(2 * n as i32) {
                let result = rule.integrate(|x: f64| x.powi(k), -0.5, 2.0).unwrap();
                let exact = monomial_integral(k, -0.5, 2.0);
                assert!(
                    (result - exact).abs() <= 1e-12 * exact.abs().max(1.0),
                    "n = {}, degree = {}: {} vs {}",
                    n,
                    k,
                    result,
                    exact
                );
            }
        }
    }

    #[test]
    fn test_gauss_legendre_integration() {
        let rule = GaussLegendreQuadrature::new(10).unwrap();

        let result = rule.integrate(|x: f64| x.sin(), 0.0, PI).unwrap();
        assert!((result - 2.0).abs() < 1e-10);

        let result = rule.integrate(|x: f64| x.exp(), 0.0, 1.0).unwrap();
        assert!((result - (std::f64::consts::E - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_fixed_quad() {
        let result = fixed_quad(|x: f64| x.cos(), 0.0, PI / 2.0, 10).unwrap();
        assert!((result - 1.0).abs() < 1e-12);

        let reversed = fixed_quad(|x: f64| x.cos(), PI / 2.0, 0.0, 10).unwrap();
        assert!((reversed + 1.0).abs() < 1e-12);

        assert_eq!(fixed_quad(|x: f64| x, 3.0, 3.0, 4).unwrap(), 0.0);
    }

    #[test]
    fn test_gauss_legendre_arbitrary_n() {
        let rule = GaussLegendreQuadrature::new(15).unwrap();
        assert_eq!(rule.len(), 15);
        assert_eq!(rule.nodes[7], 0.0);

        let weight_sum: f64 = rule.weights.iter().sum();
        assert!((weight_sum - 2.0).abs() < 1e-12);

        for i in 0..7 {
            assert!((rule.nodes[i] + rule.nodes[14 - i]).abs() < 1e-12);
            assert!((rule.weights[i] - rule.weights[14 - i]).abs() < 1e-12);
            assert!(rule.nodes[i] < rule.nodes[i + 1]);
        }
    }

    #[test]
    fn test_computed_matches_table() {
        for n in 1..=10 {
            let table = GaussLegendreQuadrature::new(n).unwrap();
            let computed = GaussLegendreQuadrature::from_half(n, &compute_half_rule(n));
            for i in 0..n {
                assert!((table.nodes[i] - computed.nodes[i]).abs() < 1e-13);
                assert!((table.weights[i] - computed.weights[i]).abs() < 1e-13);
            }
        }
    }

    #[test]
    fn test_fixed_quad_errors() {
        assert!(fixed_quad(|x: f64| x, 0.0, 1.0, 0).is_err());
        assert!(fixed_quad(|x: f64| x, f64::NEG_INFINITY, 1.0, 3).is_err());
    }
}
