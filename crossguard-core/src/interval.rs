//! Interval Values and the Disagreement Metric
//!
//! ## Overview
//!
//! Every itom value is a closed interval `[lo, hi]`. A plain measurement is the
//! degenerate interval `[v, v]`; a measurement with known accuracy carries its
//! uncertainty as width. Relations compute with interval arithmetic, so the
//! uncertainty of every input propagates into the common domain.
//!
//! ## Comparing Estimates
//!
//! Two estimates of the same quantity agree when their intervals intersect:
//!
//! ```text
//! error(v, w)   = max(0, max(lo(v), lo(w)) - min(hi(v), hi(w)))
//! overlap(v, w) = |v ∩ w|          (0 when disjoint)
//!
//!   v: [=====]
//!   w:           [=====]     error = gap, overlap = 0
//!
//!   v: [=======]
//!   w:      [=======]        error = 0, overlap = shared width
//! ```
//!
//! For intervals of positive width exactly one of both is positive, unless they
//! merely touch.
//!
//! ## Arithmetic
//!
//! ```text
//! [a, b] + [c, d] = [a + c, b + d]
//! [a, b] - [c, d] = [a - d, b - c]
//! [a, b] * [c, d] = [min(ac, ad, bc, bd), max(ac, ad, bc, bd)]
//! [a, b] / [c, d] = [a, b] * [1/d, 1/c]      (entire line if 0 ∈ [c, d])
//! ```

use core::fmt;
use core::ops::{Add, Div, Mul, Neg, Sub};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Closed interval of reals
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Interval {
    lo: f64,
    hi: f64,
}

impl Interval {
    /// The whole real line
    pub const ENTIRE: Self = Self {
        lo: f64::NEG_INFINITY,
        hi: f64::INFINITY,
    };

    /// Create an interval from two endpoints in any order
    pub fn new(a: f64, b: f64) -> Self {
        if a <= b {
            Self { lo: a, hi: b }
        } else {
            Self { lo: b, hi: a }
        }
    }

    /// Degenerate interval `[value, value]`
    pub const fn point(value: f64) -> Self {
        Self { lo: value, hi: value }
    }

    /// Interval of `center ± radius`
    pub fn around(center: f64, radius: f64) -> Self {
        let radius = libm::fabs(radius);
        Self::new(center - radius, center + radius)
    }

    /// Lower bound
    pub fn lo(&self) -> f64 {
        self.lo
    }

    /// Upper bound
    pub fn hi(&self) -> f64 {
        self.hi
    }

    /// `hi - lo`
    pub fn width(&self) -> f64 {
        self.hi - self.lo
    }

    /// Half the width: the measurement uncertainty of a centered value
    pub fn half_width(&self) -> f64 {
        self.width() / 2.0
    }

    /// Center of the interval
    pub fn midpoint(&self) -> f64 {
        self.lo + self.half_width()
    }

    /// True for scalar values
    pub fn is_degenerate(&self) -> bool {
        self.lo == self.hi
    }

    /// Check whether a value lies inside
    pub fn contains(&self, value: f64) -> bool {
        self.lo <= value && value <= self.hi
    }

    /// Common part of both intervals, if any
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let lo = self.lo.max(other.lo);
        let hi = self.hi.min(other.hi);
        if lo <= hi {
            Some(Self { lo, hi })
        } else {
            None
        }
    }

    /// Whether both intervals share at least one point
    pub fn intersects(&self, other: &Self) -> bool {
        self.intersection(other).is_some()
    }

    /// Smallest interval covering both
    pub fn hull(&self, other: &Self) -> Self {
        Self {
            lo: self.lo.min(other.lo),
            hi: self.hi.max(other.hi),
        }
    }

    /// Gap between the intervals (0 if they intersect)
    pub fn error(&self, other: &Self) -> f64 {
        (self.lo.max(other.lo) - self.hi.min(other.hi)).max(0.0)
    }

    /// Width of the intersection (0 if disjoint)
    pub fn overlap(&self, other: &Self) -> f64 {
        self.intersection(other).map_or(0.0, |common| common.width())
    }
}

impl Default for Interval {
    fn default() -> Self {
        Self::point(0.0)
    }
}

impl From<f64> for Interval {
    fn from(value: f64) -> Self {
        Self::point(value)
    }
}

impl From<f32> for Interval {
    fn from(value: f32) -> Self {
        Self::point(value as f64)
    }
}

impl From<i32> for Interval {
    fn from(value: i32) -> Self {
        Self::point(value as f64)
    }
}

impl From<(f64, f64)> for Interval {
    fn from((a, b): (f64, f64)) -> Self {
        Self::new(a, b)
    }
}

impl From<[f64; 2]> for Interval {
    fn from([a, b]: [f64; 2]) -> Self {
        Self::new(a, b)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_degenerate() {
            write!(f, "{}", self.lo)
        } else {
            write!(f, "[{}, {}]", self.lo, self.hi)
        }
    }
}

impl Add for Interval {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            lo: self.lo + other.lo,
            hi: self.hi + other.hi,
        }
    }
}

impl Sub for Interval {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            lo: self.lo - other.hi,
            hi: self.hi - other.lo,
        }
    }
}

impl Mul for Interval {
    type Output = Self;

    fn mul(self, other: Self) -> Self {
        let products = [
            self.lo * other.lo,
            self.lo * other.hi,
            self.hi * other.lo,
            self.hi * other.hi,
        ];
        let lo = products.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = products.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Self { lo, hi }
    }
}

impl Div for Interval {
    type Output = Self;

    fn div(self, other: Self) -> Self {
        if other.contains(0.0) {
            return Self::ENTIRE;
        }
        self * Self::new(1.0 / other.hi, 1.0 / other.lo)
    }
}

impl Neg for Interval {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            lo: -self.hi,
            hi: -self.lo,
        }
    }
}

// Mixed scalar operands on either side
macro_rules! scalar_ops {
    ($($op:ident :: $method:ident),*) => {
        $(
            impl $op<f64> for Interval {
                type Output = Interval;

                fn $method(self, other: f64) -> Interval {
                    self.$method(Interval::point(other))
                }
            }

            impl $op<Interval> for f64 {
                type Output = Interval;

                fn $method(self, other: Interval) -> Interval {
                    Interval::point(self).$method(other)
                }
            }
        )*
    };
}

scalar_ops!(Add::add, Sub::sub, Mul::mul, Div::div);
