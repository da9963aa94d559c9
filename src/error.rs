//! Error types for numerical integration operations.

use thiserror::Error;

/// Result type for integration operations.
pub type IntegrateResult<T> = Result<T, IntegrateError>;

/// Boxed error raised by a user-supplied integrand or derivative.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur during numerical integration.
///
/// Non-convergence of an adaptive quadrature is not an error: the result is
/// returned with `converged == false` and its error estimate. Likewise
/// [`solve_ivp`](crate::solve_ivp) reports step failures through
/// `ODEResult::success`.
#[derive(Debug, Error)]
pub enum IntegrateError {
    /// Invalid interval provided (NaN bound, infinite bound where the method
    /// needs a finite one, empty time span).
    #[error("invalid interval [{a}, {b}] in {context}")]
    InvalidInterval { a: f64, b: f64, context: String },

    /// Invalid parameter value.
    #[error("invalid parameter '{parameter}': {message}")]
    InvalidParameter { parameter: String, message: String },

    /// Invalid input array size, ordering or content.
    #[error("invalid input: {context}")]
    InvalidInput { context: String },

    /// Numerical computation failed (non-finite derivative, overflow).
    #[error("numerical error: {message}")]
    NumericalError { message: String },

    /// Step size became too small during adaptive integration.
    #[error("{context}: step size too small ({step:.2e}) at t = {t:.6}")]
    StepSizeTooSmall { step: f64, t: f64, context: String },

    /// Maximum number of steps exceeded.
    #[error("{context}: exceeded maximum {steps} steps at t = {t:.6}")]
    MaxStepsExceeded {
        steps: usize,
        t: f64,
        context: String,
    },

    /// The integrand changed its return shape after the first evaluation.
    #[error("{context}: integrand returned a complex value after committing to a real integral")]
    InconsistentIntegrand { context: String },

    /// The user callback failed. The whole integration is abandoned.
    #[error("callback failed: {0}")]
    Callback(#[source] CallbackError),
}

impl IntegrateError {
    /// Wrap an error raised inside an integrand or derivative.
    ///
    /// ```
    /// use numint::{IntegrateError, quad, QuadOptions};
    ///
    /// let result = quad(
    ///     |x: f64| "oops".parse::<f64>().map(|v| v * x).map_err(IntegrateError::callback),
    ///     0.0,
    ///     1.0,
    ///     &QuadOptions::default(),
    /// );
    /// assert!(matches!(result, Err(IntegrateError::Callback(_))));
    /// ```
    pub fn callback<E>(err: E) -> Self
    where
        E: Into<CallbackError>,
    {
        Self::Callback(err.into())
    }

    pub(crate) fn invalid_input(context: impl Into<String>) -> Self {
        Self::InvalidInput {
            context: context.into(),
        }
    }

    pub(crate) fn invalid_parameter(parameter: &str, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter: parameter.to_string(),
            message: message.into(),
        }
    }
}

/// Reject negative or NaN tolerances.
pub(crate) fn check_tolerances(rtol: f64, atol: f64) -> IntegrateResult<()> {
    if rtol.is_nan() || rtol < 0.0 {
        return Err(IntegrateError::invalid_parameter(
            "rtol",
            format!("must be non-negative (got {})", rtol),
        ));
    }
    if atol.is_nan() || atol < 0.0 {
        return Err(IntegrateError::invalid_parameter(
            "atol",
            format!("must be non-negative (got {})", atol),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IntegrateError::InvalidInterval {
            a: f64::NAN,
            b: 3.0,
            context: "quad".to_string(),
        };
        assert!(err.to_string().contains("invalid interval"));
        assert!(err.to_string().contains("quad"));

        let err = IntegrateError::StepSizeTooSmall {
            step: 1e-15,
            t: 0.5,
            context: "odeint".to_string(),
        };
        assert!(err.to_string().contains("too small"));

        let err = IntegrateError::MaxStepsExceeded {
            steps: 100,
            t: 1.0,
            context: "odeint".to_string(),
        };
        assert!(err.to_string().contains("100"));
    }

    #[test]
    fn test_callback_source() {
        use std::error::Error as _;

        let err = IntegrateError::callback("integrand exploded");
        assert!(err.to_string().contains("integrand exploded"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_check_tolerances() {
        assert!(check_tolerances(1e-6, 0.0).is_ok());
        assert!(check_tolerances(-1.0, 1e-6).is_err());
        assert!(check_tolerances(1e-6, f64::NAN).is_err());
    }
}
