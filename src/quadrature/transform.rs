//! Variable substitutions mapping infinite integration ranges onto finite ones.
//!
//! | Range | Substitution | Reference interval | dx/dt |
//! |-------|--------------|--------------------|-------|
//! | `[a, b]` | `x = t` | `[a, b]` | `1` |
//! | `[a, ∞)` | `x = a + t/(1-t)` | `[0, 1)` | `1/(1-t)²` |
//! | `(-∞, b]` | `x = b - t/(1-t)` | `[0, 1)` | `1/(1-t)²` |
//! | `(-∞, ∞)` | `x = t/(1-t²)` | `(-1, 1)` | `(1+t²)/(1-t²)²` |
//!
//! The open ends of the reference intervals are never sampled by the
//! Gauss-Kronrod rule, so the transformed integrand is always evaluated at
//! finite `x`.

use crate::error::{IntegrateError, IntegrateResult};

/// Integration domain after normalizing the bounds to `lo < hi`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Domain {
    Finite { a: f64, b: f64 },
    UpperInfinite { a: f64 },
    LowerInfinite { b: f64 },
    Whole,
}

/// Normalized bounds: the domain plus the orientation sign.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Bounds {
    pub domain: Domain,
    /// `-1.0` when the caller passed `a > b`.
    pub sign: f64,
}

impl Bounds {
    /// Classify the bounds. Returns `Ok(None)` for a zero-measure interval.
    pub fn new(a: f64, b: f64, context: &str) -> IntegrateResult<Option<Self>> {
        if a.is_nan() || b.is_nan() {
            return Err(IntegrateError::InvalidInterval {
                a,
                b,
                context: context.to_string(),
            });
        }
        if a == b {
            return Ok(None);
        }

        let (lo, hi, sign) = if a < b { (a, b, 1.0) } else { (b, a, -1.0) };
        let domain = match (lo.is_finite(), hi.is_finite()) {
            (true, true) => Domain::Finite { a: lo, b: hi },
            (true, false) => Domain::UpperInfinite { a: lo },
            (false, true) => Domain::LowerInfinite { b: hi },
            (false, false) => Domain::Whole,
        };

        Ok(Some(Self { domain, sign }))
    }
}

impl Domain {
    /// Finite interval over which the transformed integrand is integrated.
    pub fn reference(&self) -> (f64, f64) {
        match *self {
            Self::Finite { a, b } => (a, b),
            Self::UpperInfinite { .. } | Self::LowerInfinite { .. } => (0.0, 1.0),
            Self::Whole => (-1.0, 1.0),
        }
    }

    /// Map a reference coordinate to `(x, dx/dt)`.
    pub fn map(&self, t: f64) -> (f64, f64) {
        match *self {
            Self::Finite { .. } => (t, 1.0),
            Self::UpperInfinite { a } => {
                let s = 1.0 - t;
                (a + t / s, 1.0 / (s * s))
            }
            Self::LowerInfinite { b } => {
                let s = 1.0 - t;
                (b - t / s, 1.0 / (s * s))
            }
            Self::Whole => {
                let s = 1.0 - t * t;
                (t / s, (1.0 + t * t) / (s * s))
            }
        }
    }

    /// A point strictly inside the domain, used to probe the integrand shape.
    pub fn probe_point(&self) -> f64 {
        let (lo, hi) = self.reference();
        self.map(0.5 * (lo + hi)).0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_classification() {
        let b = Bounds::new(0.0, f64::INFINITY, "test").unwrap().unwrap();
        assert_eq!(b.domain, Domain::UpperInfinite { a: 0.0 });
        assert_eq!(b.sign, 1.0);

        let b = Bounds::new(f64::INFINITY, 2.0, "test").unwrap().unwrap();
        assert_eq!(b.domain, Domain::UpperInfinite { a: 2.0 });
        assert_eq!(b.sign, -1.0);

        let b = Bounds::new(f64::NEG_INFINITY, f64::INFINITY, "test")
            .unwrap()
            .unwrap();
        assert_eq!(b.domain, Domain::Whole);

        assert!(Bounds::new(1.0, 1.0, "test").unwrap().is_none());
        assert!(Bounds::new(f64::NAN, 1.0, "test").is_err());
    }

    #[test]
    fn test_maps_are_monotone() {
        let domains = [
            Domain::UpperInfinite { a: -2.0 },
            Domain::LowerInfinite { b: 3.0 },
            Domain::Whole,
        ];
        for domain in domains {
            let (lo, hi) = domain.reference();
            let n = 50;
            let mut prev = None;
            for i in 1..n {
                let t = lo + (hi - lo) * i as f64 / n as f64;
                let (x, jac) = domain.map(t);
                assert!(x.is_finite());
                assert!(jac > 0.0);
                if let Some(p) = prev {
                    // LowerInfinite runs right-to-left in x.
                    if matches!(domain, Domain::LowerInfinite { .. }) {
                        assert!(x < p);
                    } else {
                        assert!(x > p);
                    }
                }
                prev = Some(x);
            }
        }
    }

    #[test]
    fn test_probe_point_inside() {
        assert_eq!(Domain::Finite { a: 1.0, b: 3.0 }.probe_point(), 2.0);
        assert_eq!(Domain::UpperInfinite { a: 5.0 }.probe_point(), 6.0);
        assert_eq!(Domain::LowerInfinite { b: 5.0 }.probe_point(), 4.0);
        assert_eq!(Domain::Whole.probe_point(), 0.0);
    }
}
