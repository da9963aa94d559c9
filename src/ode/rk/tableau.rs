//! Butcher tableaux for the explicit Runge-Kutta methods.
//!
//! Every step evaluates the derivative at the new point as well. For the
//! embedded pairs that value enters the error estimate (the last entry of
//! `e`); for all methods it becomes the first stage of the next step and the
//! end-point slope of the Hermite interpolant.

use crate::error::IntegrateResult;

/// Coefficients of an explicit Runge-Kutta method.
#[derive(Debug)]
pub(crate) struct Tableau {
    /// Stage nodes.
    pub c: &'static [f64],
    /// Lower-triangular stage matrix; row `i` has `i` entries.
    pub a: &'static [&'static [f64]],
    /// Weights of the propagated solution.
    pub b: &'static [f64],
    /// Error weights over the stages followed by the new-point derivative.
    pub e: Option<&'static [f64]>,
    /// Order used by the step-size controller and initial step heuristic.
    pub error_order: usize,
}

/// Bogacki-Shampine 3(2).
pub(crate) const RK23: Tableau = Tableau {
    c: &[0.0, 1.0 / 2.0, 3.0 / 4.0],
    a: &[&[], &[1.0 / 2.0], &[0.0, 3.0 / 4.0]],
    b: &[2.0 / 9.0, 1.0 / 3.0, 4.0 / 9.0],
    e: Some(&[5.0 / 72.0, -1.0 / 12.0, -1.0 / 9.0, 1.0 / 8.0]),
    error_order: 2,
};

/// Dormand-Prince 5(4).
pub(crate) const RK45: Tableau = Tableau {
    c: &[0.0, 1.0 / 5.0, 3.0 / 10.0, 4.0 / 5.0, 8.0 / 9.0, 1.0],
    a: &[
        &[],
        &[1.0 / 5.0],
        &[3.0 / 40.0, 9.0 / 40.0],
        &[44.0 / 45.0, -56.0 / 15.0, 32.0 / 9.0],
        &[19372.0 / 6561.0, -25360.0 / 2187.0, 64448.0 / 6561.0, -212.0 / 729.0],
        &[
            9017.0 / 3168.0,
            -355.0 / 33.0,
            46732.0 / 5247.0,
            49.0 / 176.0,
            -5103.0 / 18656.0,
        ],
    ],
    b: &[
        35.0 / 384.0,
        0.0,
        500.0 / 1113.0,
        125.0 / 192.0,
        -2187.0 / 6784.0,
        11.0 / 84.0,
    ],
    // 5th - 4th order weights
    e: Some(&[
        71.0 / 57600.0,
        0.0,
        -71.0 / 16695.0,
        71.0 / 1920.0,
        -17253.0 / 339200.0,
        22.0 / 525.0,
        -1.0 / 40.0,
    ]),
    error_order: 4,
};

/// Classic fourth-order Runge-Kutta, no error estimate.
pub(crate) const RK4: Tableau = Tableau {
    c: &[0.0, 1.0 / 2.0, 1.0 / 2.0, 1.0],
    a: &[&[], &[1.0 / 2.0], &[0.0, 1.0 / 2.0], &[0.0, 0.0, 1.0]],
    b: &[1.0 / 6.0, 1.0 / 3.0, 1.0 / 3.0, 1.0 / 6.0],
    e: None,
    error_order: 4,
};

/// Outcome of one trial step.
#[derive(Debug)]
pub(crate) struct TrialStep {
    pub y_new: Vec<f64>,
    pub f_new: Vec<f64>,
    /// Local error estimate, `None` for methods without an embedded pair.
    pub error: Option<Vec<f64>>,
}

impl Tableau {
    /// Advance `y` by `h` from `t`, given `f0 = f(t, y)`.
    ///
    /// Calls `rhs` once per stage after the first, plus once at the new point.
    pub fn step<F>(
        &self,
        mut rhs: F,
        t: f64,
        y: &[f64],
        f0: &[f64],
        h: f64,
    ) -> IntegrateResult<TrialStep>
    where
        F: FnMut(f64, &[f64]) -> IntegrateResult<Vec<f64>>,
    {
        let n = y.len();
        let stages = self.b.len();

        let mut k: Vec<Vec<f64>> = Vec::with_capacity(stages + 1);
        k.push(f0.to_vec());

        for (row, &c) in self.a.iter().zip(self.c).skip(1) {
            let y_stage = combine(y, h, row, &k, n);
            k.push(rhs(t + c * h, &y_stage)?);
        }

        let y_new = combine(y, h, self.b, &k, n);
        let f_new = rhs(t + h, &y_new)?;

        let error = self.e.map(|e| {
            (0..n)
                .map(|j| {
                    let sum: f64 = e
                        .iter()
                        .zip(k.iter().chain(std::iter::once(&f_new)))
                        .map(|(w, kk)| w * kk[j])
                        .sum();
                    h * sum
                })
                .collect()
        });

        Ok(TrialStep {
            y_new,
            f_new,
            error,
        })
    }
}

/// `y + h * Σ w_i k_i`, skipping zero weights.
fn combine(y: &[f64], h: f64, weights: &[f64], k: &[Vec<f64>], n: usize) -> Vec<f64> {
    let mut out = y.to_vec();
    for (&w, kk) in weights.iter().zip(k) {
        if w == 0.0 {
            continue;
        }
        for j in 0..n {
            out[j] += h * w * kk[j];
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn consistent(tableau: &Tableau) {
        // Row sums of A equal c, weights sum to 1, error weights sum to 0
        for (row, &c) in tableau.a.iter().zip(tableau.c) {
            let sum: f64 = row.iter().sum();
            assert!((sum - c).abs() < 1e-14);
        }
        let b_sum: f64 = tableau.b.iter().sum();
        assert!((b_sum - 1.0).abs() < 1e-14);
        if let Some(e) = tableau.e {
            assert_eq!(e.len(), tableau.b.len() + 1);
            let e_sum: f64 = e.iter().sum();
            assert!(e_sum.abs() < 1e-14);
        }
    }

    #[test]
    fn test_tableaux_consistent() {
        consistent(&RK23);
        consistent(&RK45);
        consistent(&RK4);
    }

    #[test]
    fn test_step_exact_for_polynomial_rhs() {
        // y' = 4t^3 is integrated exactly by 4th and 5th order methods
        let f = |t: f64, _y: &[f64]| -> IntegrateResult<Vec<f64>> { Ok(vec![4.0 * t.powi(3)]) };
        for tableau in [&RK45, &RK4] {
            let step = tableau.step(f, 1.0, &[1.0], &[4.0], 0.5).unwrap();
            assert!((step.y_new[0] - 1.5f64.powi(4)).abs() < 1e-12);
            assert!((step.f_new[0] - 4.0 * 1.5f64.powi(3)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_rk23_error_estimate() {
        // y' = y: the embedded error is small and of the expected sign
        let f = |_t: f64, y: &[f64]| -> IntegrateResult<Vec<f64>> { Ok(vec![y[0]]) };
        let step = RK23.step(f, 0.0, &[1.0], &[1.0], 0.1).unwrap();
        assert!((step.y_new[0] - 0.1f64.exp()).abs() < 1e-5);
        let err = step.error.unwrap()[0];
        assert!(err != 0.0 && err.abs() < 1e-4);

        assert!(RK4.step(f, 0.0, &[1.0], &[1.0], 0.1).unwrap().error.is_none());
    }
}
