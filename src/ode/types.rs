//! Types for ODE solvers.

use super::dense_output::DenseSolution;

/// ODE solver method.
///
/// # Available Methods
///
/// | Method | Order | Stages | Use Case |
/// |--------|-------|--------|----------|
/// | RK23   | 3(2)  | 3 + 1  | Fast, lower accuracy |
/// | RK45   | 5(4)  | 6 + 1  | General purpose (recommended) |
/// | RK4    | 4     | 4      | Fixed step, no error control |
///
/// # Choosing a Method
///
/// - **RK23**: Use when speed is more important than accuracy, or for getting
///   a rough initial estimate.
/// - **RK45**: The default choice. Works well for most non-stiff problems.
/// - **RK4**: Use when a reproducible, uniform step grid matters more than
///   error control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ODEMethod {
    /// Bogacki-Shampine 3(2) - low accuracy, fast.
    ///
    /// 3 stages per step plus the derivative at the new point, which is
    /// reused as the first stage of the next step (FSAL).
    RK23,

    /// Dormand-Prince 5(4) - general purpose (default).
    ///
    /// 6 stages per step plus the FSAL derivative. The 5th order solution is
    /// propagated and the embedded 4th order solution drives step control.
    #[default]
    RK45,

    /// Classic 4th order Runge-Kutta with a fixed step.
    ///
    /// The step is `ODEOptions::h0` when given, otherwise `|tf - t0| / 100`,
    /// capped by `max_step`. Steps are never rejected.
    RK4,
}

impl ODEMethod {
    /// Get the order of the method.
    pub fn order(&self) -> usize {
        match self {
            Self::RK23 => 3,
            Self::RK45 => 5,
            Self::RK4 => 4,
        }
    }

    /// Get the error estimator order, or `None` for fixed-step methods.
    pub fn error_order(&self) -> Option<usize> {
        match self {
            Self::RK23 => Some(2),
            Self::RK45 => Some(4),
            Self::RK4 => None,
        }
    }

    /// Whether the method adapts its step size.
    pub fn is_adaptive(&self) -> bool {
        self.error_order().is_some()
    }
}

/// Options for ODE solvers.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ODEOptions {
    /// Solver method (default: RK45)
    pub method: ODEMethod,

    /// Relative tolerance (default: 1e-3)
    pub rtol: f64,

    /// Absolute tolerance (default: 1e-6)
    pub atol: f64,

    /// Initial step size magnitude (default: auto-computed)
    pub h0: Option<f64>,

    /// Maximum step size (default: unbounded)
    pub max_step: Option<f64>,

    /// Minimum step size (default: 10 ulp of the current time)
    pub min_step: Option<f64>,

    /// Maximum number of steps, accepted and rejected (default: 10000)
    pub max_steps: usize,

    /// Times at which to report the solution (default: every accepted step)
    pub t_eval: Option<Vec<f64>>,

    /// Dense output - evaluate solution at any point (default: false)
    pub dense_output: bool,
}

impl Default for ODEOptions {
    fn default() -> Self {
        Self {
            method: ODEMethod::default(),
            rtol: 1e-3,
            atol: 1e-6,
            h0: None,
            max_step: None,
            min_step: None,
            max_steps: 10000,
            t_eval: None,
            dense_output: false,
        }
    }
}

impl ODEOptions {
    /// Create options with specified tolerances.
    pub fn with_tolerances(rtol: f64, atol: f64) -> Self {
        Self {
            rtol,
            atol,
            ..Default::default()
        }
    }

    /// Create options with specified method.
    pub fn with_method(method: ODEMethod) -> Self {
        Self {
            method,
            ..Default::default()
        }
    }

    /// Set the method.
    pub fn method(mut self, method: ODEMethod) -> Self {
        self.method = method;
        self
    }

    /// Set the tolerances.
    pub fn tolerances(mut self, rtol: f64, atol: f64) -> Self {
        self.rtol = rtol;
        self.atol = atol;
        self
    }

    /// Set the initial step size.
    pub fn initial_step(mut self, h0: f64) -> Self {
        self.h0 = Some(h0);
        self
    }

    /// Set step size bounds.
    pub fn step_bounds(mut self, min: f64, max: f64) -> Self {
        self.min_step = Some(min);
        self.max_step = Some(max);
        self
    }

    /// Set the maximum step size only.
    pub fn max_step(mut self, max: f64) -> Self {
        self.max_step = Some(max);
        self
    }

    /// Set maximum number of steps.
    pub fn max_steps(mut self, n: usize) -> Self {
        self.max_steps = n;
        self
    }

    /// Report the solution at these times instead of at every step.
    pub fn t_eval(mut self, times: Vec<f64>) -> Self {
        self.t_eval = Some(times);
        self
    }

    /// Enable or disable the continuous solution.
    pub fn dense_output(mut self, enabled: bool) -> Self {
        self.dense_output = enabled;
        self
    }
}

/// Result of [`solve_ivp`](crate::solve_ivp).
///
/// `t` and `y` always have the same length. Without `t_eval`, `t[0] == t0`
/// and `y[0] == y0`. On failure the trajectory accumulated so far is kept and
/// `success` is false.
#[derive(Debug, Clone)]
pub struct ODEResult {
    /// Output times, monotonic in the direction of integration.
    pub t: Vec<f64>,

    /// State at each output time.
    pub y: Vec<Vec<f64>>,

    /// Whether the solver reached the end of the interval.
    pub success: bool,

    /// Termination diagnostic; always set when `success` is false.
    pub message: Option<String>,

    /// Number of derivative evaluations.
    pub nfev: usize,

    /// Number of accepted steps.
    pub naccept: usize,

    /// Number of rejected steps.
    pub nreject: usize,

    /// Method used.
    pub method: ODEMethod,

    /// Continuous solution, present when `dense_output` was requested.
    pub sol: Option<DenseSolution>,
}

impl ODEResult {
    /// State at the last output time.
    pub fn y_final(&self) -> Option<&[f64]> {
        self.y.last().map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ode_method() {
        assert_eq!(ODEMethod::RK23.order(), 3);
        assert_eq!(ODEMethod::RK23.error_order(), Some(2));
        assert_eq!(ODEMethod::RK45.order(), 5);
        assert_eq!(ODEMethod::RK45.error_order(), Some(4));
        assert_eq!(ODEMethod::RK4.order(), 4);
        assert!(!ODEMethod::RK4.is_adaptive());
    }

    #[test]
    fn test_ode_options() {
        let opts = ODEOptions::default();
        assert_eq!(opts.method, ODEMethod::RK45);
        assert_eq!(opts.rtol, 1e-3);
        assert_eq!(opts.atol, 1e-6);
        assert_eq!(opts.max_steps, 10000);
        assert!(opts.t_eval.is_none());

        let opts = ODEOptions::with_tolerances(1e-6, 1e-9)
            .method(ODEMethod::RK23)
            .t_eval(vec![0.0, 1.0])
            .dense_output(true);
        assert_eq!(opts.rtol, 1e-6);
        assert_eq!(opts.atol, 1e-9);
        assert_eq!(opts.method, ODEMethod::RK23);
        assert_eq!(opts.t_eval.as_deref(), Some(&[0.0, 1.0][..]));
        assert!(opts.dense_output);
    }
}
