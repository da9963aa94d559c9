//! Conversion of callback return values.
//!
//! Integrands and derivatives may return a plain value or a `Result` whose
//! error converts into [`IntegrateError`]. The [`Evaluation`] trait
//! normalizes both forms so the algorithms can propagate callback failures
//! with `?` through every level of subdivision or stepping.

use num_complex::Complex64;

use crate::error::{IntegrateError, IntegrateResult};

/// A value produced by a user callback, convertible into `T`.
pub trait Evaluation<T> {
    /// Convert the callback output, surfacing callback errors.
    fn into_value(self) -> IntegrateResult<T>;
}

/// Value of a scalar integrand whose shape is only known at runtime.
///
/// Used by [`quad_scalar`](crate::quad_scalar): the first evaluation decides
/// whether the integral is real or complex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    /// Real value.
    Real(f64),
    /// Complex value.
    Complex(Complex64),
}

impl Scalar {
    /// Real part.
    pub fn re(&self) -> f64 {
        match self {
            Self::Real(v) => *v,
            Self::Complex(z) => z.re,
        }
    }

    /// Imaginary part (zero for real values).
    pub fn im(&self) -> f64 {
        match self {
            Self::Real(_) => 0.0,
            Self::Complex(z) => z.im,
        }
    }

    /// Whether this value is complex.
    pub fn is_complex(&self) -> bool {
        matches!(self, Self::Complex(_))
    }

    /// Promote to a complex number.
    pub fn to_complex(&self) -> Complex64 {
        match self {
            Self::Real(v) => Complex64::new(*v, 0.0),
            Self::Complex(z) => *z,
        }
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Self::Real(v)
    }
}

impl From<Complex64> for Scalar {
    fn from(z: Complex64) -> Self {
        Self::Complex(z)
    }
}

impl Evaluation<f64> for f64 {
    fn into_value(self) -> IntegrateResult<f64> {
        Ok(self)
    }
}

impl<E: Into<IntegrateError>> Evaluation<f64> for Result<f64, E> {
    fn into_value(self) -> IntegrateResult<f64> {
        self.map_err(Into::into)
    }
}

impl Evaluation<Complex64> for Complex64 {
    fn into_value(self) -> IntegrateResult<Complex64> {
        Ok(self)
    }
}

impl<E: Into<IntegrateError>> Evaluation<Complex64> for Result<Complex64, E> {
    fn into_value(self) -> IntegrateResult<Complex64> {
        self.map_err(Into::into)
    }
}

impl Evaluation<Scalar> for Scalar {
    fn into_value(self) -> IntegrateResult<Scalar> {
        Ok(self)
    }
}

impl Evaluation<Scalar> for f64 {
    fn into_value(self) -> IntegrateResult<Scalar> {
        Ok(Scalar::Real(self))
    }
}

impl Evaluation<Scalar> for Complex64 {
    fn into_value(self) -> IntegrateResult<Scalar> {
        Ok(Scalar::Complex(self))
    }
}

impl<E: Into<IntegrateError>> Evaluation<Scalar> for Result<Scalar, E> {
    fn into_value(self) -> IntegrateResult<Scalar> {
        self.map_err(Into::into)
    }
}

impl Evaluation<Vec<f64>> for Vec<f64> {
    fn into_value(self) -> IntegrateResult<Vec<f64>> {
        Ok(self)
    }
}

impl<E: Into<IntegrateError>> Evaluation<Vec<f64>> for Result<Vec<f64>, E> {
    fn into_value(self) -> IntegrateResult<Vec<f64>> {
        self.map_err(Into::into)
    }
}
