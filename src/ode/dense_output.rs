//! Dense output for ODE solvers using Hermite interpolation.
//!
//! Provides the ability to evaluate the solution at any point within
//! a completed step. Used for `t_eval` output and for the continuous
//! solution returned with `dense_output`.
//!
//! # Mathematical Background
//!
//! For a completed step from (t_old, y_old) to (t_new, y_new), with
//! derivatives f_old = f(t_old, y_old) and f_new = f(t_new, y_new),
//! cubic Hermite interpolation gives, with θ = (t - t_old) / h:
//!
//! ```text
//! y(θ) = y_old + θ·h·f_old + θ²·a + θ³·b
//! a = 3·(y_new - y_old) - h·(2·f_old + f_new)
//! b = -2·(y_new - y_old) + h·(f_old + f_new)
//! ```

use crate::error::{IntegrateError, IntegrateResult};

/// Information needed for dense output within a step.
///
/// Stores the endpoints and derivatives for Hermite interpolation. `h` is
/// negative when integrating backwards.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DenseOutputStep {
    /// Start time of the step.
    pub t_old: f64,

    /// End time of the step.
    pub t_new: f64,

    /// State at start of step.
    pub y_old: Vec<f64>,

    /// State at end of step.
    pub y_new: Vec<f64>,

    /// Derivative at start of step: f(t_old, y_old).
    pub f_old: Vec<f64>,

    /// Derivative at end of step: f(t_new, y_new).
    pub f_new: Vec<f64>,
}

impl DenseOutputStep {
    /// Get the step size.
    pub fn h(&self) -> f64 {
        self.t_new - self.t_old
    }

    /// Check if a time is within this step, in either direction.
    pub fn contains(&self, t: f64) -> bool {
        let (lo, hi) = if self.t_old <= self.t_new {
            (self.t_old, self.t_new)
        } else {
            (self.t_new, self.t_old)
        };
        t >= lo && t <= hi
    }

    /// Compute the normalized time parameter θ ∈ [0, 1].
    pub fn theta(&self, t: f64) -> f64 {
        let h = self.h();
        if h == 0.0 { 0.0 } else { (t - self.t_old) / h }
    }

    /// Evaluate the interpolated state at `t`.
    ///
    /// Values of θ outside [0, 1] are clamped to the step endpoints.
    pub fn eval(&self, t: f64) -> Vec<f64> {
        let theta = self.theta(t);
        if theta <= 0.0 {
            return self.y_old.clone();
        }
        if theta >= 1.0 {
            return self.y_new.clone();
        }

        let h = self.h();
        let theta_sq = theta * theta;
        let theta_cu = theta_sq * theta;

        (0..self.y_old.len())
            .map(|i| {
                let dy = self.y_new[i] - self.y_old[i];
                let a = 3.0 * dy - h * (2.0 * self.f_old[i] + self.f_new[i]);
                let b = -2.0 * dy + h * (self.f_old[i] + self.f_new[i]);
                self.y_old[i] + theta * h * self.f_old[i] + theta_sq * a + theta_cu * b
            })
            .collect()
    }

    /// Evaluate the derivative of the interpolant at `t`.
    ///
    /// ```text
    /// y'(θ) = (1/h) · (h·f_old + 2·θ·a + 3·θ²·b)
    /// ```
    pub fn eval_derivative(&self, t: f64) -> Vec<f64> {
        let theta = self.theta(t);
        if theta <= 0.0 {
            return self.f_old.clone();
        }
        if theta >= 1.0 {
            return self.f_new.clone();
        }

        let h = self.h();
        (0..self.y_old.len())
            .map(|i| {
                let dy = self.y_new[i] - self.y_old[i];
                let a = 3.0 * dy - h * (2.0 * self.f_old[i] + self.f_new[i]);
                let b = -2.0 * dy + h * (self.f_old[i] + self.f_new[i]);
                (h * self.f_old[i] + 2.0 * theta * a + 3.0 * theta * theta * b) / h
            })
            .collect()
    }
}

/// Continuous solution assembled from accepted steps.
///
/// Steps are stored in the order they were taken, so their time intervals
/// are contiguous and monotonic in the direction of integration.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DenseSolution {
    /// Accepted steps.
    pub steps: Vec<DenseOutputStep>,
}

impl DenseSolution {
    pub(crate) fn push(&mut self, step: DenseOutputStep) {
        self.steps.push(step);
    }

    /// Number of stored steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether no step has been stored.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Time span `(t_first, t_last)` covered, in the direction of integration.
    pub fn span(&self) -> Option<(f64, f64)> {
        match (self.steps.first(), self.steps.last()) {
            (Some(first), Some(last)) => Some((first.t_old, last.t_new)),
            _ => None,
        }
    }

    /// Evaluate the solution at `t`.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrateError::InvalidInput`] when `t` lies outside the
    /// covered span.
    pub fn eval(&self, t: f64) -> IntegrateResult<Vec<f64>> {
        Ok(self.step_at(t)?.eval(t))
    }

    /// Evaluate the derivative of the solution at `t`.
    pub fn eval_derivative(&self, t: f64) -> IntegrateResult<Vec<f64>> {
        Ok(self.step_at(t)?.eval_derivative(t))
    }

    /// The step covering `t`; at a step boundary the earlier step.
    pub fn step_at(&self, t: f64) -> IntegrateResult<&DenseOutputStep> {
        let (first, last) = self
            .span()
            .ok_or_else(|| IntegrateError::invalid_input("dense output has no steps"))?;
        let direction = if last >= first { 1.0 } else { -1.0 };

        let inside = direction * (t - first) >= 0.0 && direction * (last - t) >= 0.0;
        if !inside {
            return Err(IntegrateError::invalid_input(format!(
                "t = {} outside dense output span [{}, {}]",
                t, first, last
            )));
        }

        // First step whose end has not been passed
        let idx = self
            .steps
            .partition_point(|step| direction * (step.t_new - t) < 0.0)
            .min(self.steps.len() - 1);
        Ok(&self.steps[idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Step of y = t^3; cubic Hermite reproduces cubics exactly.
    fn cubic_step(t_old: f64, t_new: f64) -> DenseOutputStep {
        DenseOutputStep {
            t_old,
            t_new,
            y_old: vec![t_old.powi(3)],
            y_new: vec![t_new.powi(3)],
            f_old: vec![3.0 * t_old * t_old],
            f_new: vec![3.0 * t_new * t_new],
        }
    }

    #[test]
    fn test_hermite_reproduces_cubic() {
        let step = cubic_step(1.0, 2.0);
        for &t in &[1.0, 1.25, 1.5, 1.9, 2.0] {
            let y = step.eval(t)[0];
            assert!((y - t * t * t).abs() < 1e-12, "t = {}: {}", t, y);
            let dy = step.eval_derivative(t)[0];
            assert!((dy - 3.0 * t * t).abs() < 1e-12);
        }
    }

    #[test]
    fn test_backward_step() {
        let step = cubic_step(2.0, 1.0);
        assert!(step.h() < 0.0);
        assert!(step.contains(1.5));
        assert!(!step.contains(2.5));
        assert!((step.eval(1.5)[0] - 3.375).abs() < 1e-12);
    }

    #[test]
    fn test_dense_solution_lookup() {
        let mut sol = DenseSolution::default();
        sol.push(cubic_step(0.0, 0.5));
        sol.push(cubic_step(0.5, 1.5));
        sol.push(cubic_step(1.5, 2.0));

        assert_eq!(sol.len(), 3);
        assert_eq!(sol.span(), Some((0.0, 2.0)));
        for &t in &[0.0, 0.3, 0.5, 1.0, 1.7, 2.0] {
            assert!((sol.eval(t).unwrap()[0] - t * t * t).abs() < 1e-12);
        }
        assert!(sol.eval(2.1).is_err());
        assert!(sol.eval(f64::NAN).is_err());
        assert!(DenseSolution::default().eval(0.0).is_err());
    }

    #[test]
    fn test_dense_solution_backward() {
        let mut sol = DenseSolution::default();
        sol.push(cubic_step(3.0, 2.0));
        sol.push(cubic_step(2.0, 0.5));

        assert!((sol.eval(2.5).unwrap()[0] - 15.625).abs() < 1e-12);
        assert!((sol.eval(1.0).unwrap()[0] - 1.0).abs() < 1e-12);
        assert!(sol.eval(3.5).is_err());
    }
}
