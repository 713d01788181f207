//! Direct solver adapters.

use crate::core::{Scalar, TripletSource};
use crate::error::KError;

/// Common contract of the direct adapters: load a square matrix once, then
/// solve repeatedly against the cached factorization.
pub trait DirectSolver<T: Scalar> {
    /// Replace the current matrix and factorize it.
    fn load<M: TripletSource<T> + ?Sized>(&mut self, matrix: &M) -> Result<(), KError>;

    /// Copy `b` into `x` and overwrite `x` with op(A)⁻¹ b, where op is the
    /// plain transpose when `transpose` is set.
    fn solve(&mut self, b: &[T], x: &mut [T], transpose: bool) -> Result<(), KError>;
}

pub mod dense_lu;
pub use dense_lu::DenseLu;

pub mod sparse_lu;
pub use sparse_lu::{Phase, SparseLu};
