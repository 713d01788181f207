//! Core numeric and matrix-access traits for sparsetool.

use num_complex::Complex;
use num_traits::{Float, NumAssign};
use std::fmt::{Debug, Display};
use std::ops::Neg;

/// Scalar type accepted by the solvers: real or complex.
///
/// `Real` is the type of moduli, scaling factors and pivot thresholds.
pub trait Scalar: NumAssign + Neg<Output = Self> + Copy + Debug + Send + Sync + 'static {
    /// Associated real type (`f64` for both `f64` and `Complex<f64>`).
    type Real: Float + NumAssign + Debug + Display + Send + Sync + 'static;

    /// Modulus |z|.
    fn modulus(self) -> Self::Real;

    /// Embed a real value.
    fn from_real(r: Self::Real) -> Self;

    /// Multiply by a real factor.
    fn scale(self, r: Self::Real) -> Self {
        self * Self::from_real(r)
    }

    fn real_from_f64(v: f64) -> Self::Real;

    fn real_to_f64(r: Self::Real) -> f64;
}

macro_rules! impl_real_scalar {
    ($t:ty) => {
        impl Scalar for $t {
            type Real = $t;

            fn modulus(self) -> $t {
                self.abs()
            }
            fn from_real(r: $t) -> Self {
                r
            }
            fn scale(self, r: $t) -> Self {
                self * r
            }
            fn real_from_f64(v: f64) -> $t {
                v as $t
            }
            fn real_to_f64(r: $t) -> f64 {
                r as f64
            }
        }
    };
}

macro_rules! impl_complex_scalar {
    ($t:ty) => {
        impl Scalar for Complex<$t> {
            type Real = $t;

            fn modulus(self) -> $t {
                self.norm()
            }
            fn from_real(r: $t) -> Self {
                Complex::new(r, 0.0)
            }
            fn scale(self, r: $t) -> Self {
                Complex::new(self.re * r, self.im * r)
            }
            fn real_from_f64(v: f64) -> $t {
                v as $t
            }
            fn real_to_f64(r: $t) -> f64 {
                r as f64
            }
        }
    };
}

impl_real_scalar!(f32);
impl_real_scalar!(f64);
impl_complex_scalar!(f32);
impl_complex_scalar!(f64);

/// Sparse matrix iteration protocol: dimensions, entry count, and a
/// restartable traversal over `(row, col, value)` triplets in unspecified
/// order. Indices are 0-based.
pub trait TripletSource<T> {
    /// Number of rows.
    fn nrows(&self) -> usize;
    /// Number of columns.
    fn ncols(&self) -> usize;
    /// Number of stored entries (duplicates counted).
    fn nnz(&self) -> usize;
    /// Walk all stored entries.
    fn triplets(&self) -> impl Iterator<Item = (usize, usize, T)> + '_;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn real_and_complex_modulus() {
        assert_eq!((-3.0f64).modulus(), 3.0);
        assert_eq!(Complex::new(3.0f64, 4.0).modulus(), 5.0);
        assert_eq!(Complex::new(1.0f32, -2.0).scale(2.0), Complex::new(2.0, -4.0));
        assert_eq!(<f32 as Scalar>::real_from_f64(0.5), 0.5f32);
    }
}
