//! Dense reference adapter using Faer's partial-pivoting LU.
//!
//! Accepts the same triplet sources as [`SparseLu`](super::SparseLu) but
//! assembles them into a dense `faer::Mat`. Intended for small systems and
//! as a cross-check of the sparse kernel.
//!
//! # References
//! - Faer documentation: https://github.com/sarah-ek/faer-rs
//! - Golub & Van Loan, Matrix Computations

use crate::core::{Scalar, TripletSource};
use crate::error::KError;
use crate::solver::DirectSolver;
use faer::linalg::solvers::{PartialPivLu, SolveCore};
use faer::traits::ComplexField;
use faer::{Conj, Mat, MatMut};

/// LU solver using row pivoting from Faer.
///
/// Stores the LU factorization for reuse.
pub struct DenseLu<T: ComplexField> {
    factor: Option<PartialPivLu<T>>,
    n: usize,
}

impl<T: Scalar + ComplexField> DenseLu<T> {
    /// Create a new LU solver (no factorization yet).
    pub fn new() -> Self {
        DenseLu { factor: None, n: 0 }
    }

    /// Factor a dense matrix directly.
    pub fn factor(&mut self, a: &Mat<T>) -> Result<(), KError> {
        if a.nrows() != a.ncols() {
            return Err(KError::DimensionMismatch {
                expected: a.nrows(),
                got: a.ncols(),
            });
        }
        self.n = a.nrows();
        self.factor = Some(PartialPivLu::new(a.as_ref()));
        Ok(())
    }

    pub fn dimension(&self) -> usize {
        self.n
    }

    pub fn is_factorized(&self) -> bool {
        self.factor.is_some()
    }

    /// Overwrite `rhs` with op(A)⁻¹ rhs using the cached factorization.
    pub fn solve_in_place(&self, rhs: &mut [T], transpose: bool) -> Result<(), KError> {
        let factor = self.factor.as_ref().ok_or(KError::InvalidJobSequence {
            requested: "solve",
            missing: "factorization",
        })?;
        if rhs.len() != self.n {
            return Err(KError::DimensionMismatch {
                expected: self.n,
                got: rhs.len(),
            });
        }
        let n = rhs.len();
        let x_mat = MatMut::from_column_major_slice_mut(rhs, n, 1);
        if transpose {
            factor.solve_transpose_in_place_with_conj(Conj::No, x_mat);
        } else {
            factor.solve_in_place_with_conj(Conj::No, x_mat);
        }
        // the factorization does not fail on a zero pivot; the solve yields inf/nan
        if rhs
            .iter()
            .any(|&v| !<T as Scalar>::real_to_f64(Scalar::modulus(v)).is_finite())
        {
            return Err(KError::FactorError(
                "dense LU produced a non-finite solution (singular matrix?)".into(),
            ));
        }
        Ok(())
    }
}

impl<T: Scalar + ComplexField> DirectSolver<T> for DenseLu<T> {
    fn load<M: TripletSource<T> + ?Sized>(&mut self, matrix: &M) -> Result<(), KError> {
        let (m, n) = (matrix.nrows(), matrix.ncols());
        if m != n {
            return Err(KError::DimensionMismatch { expected: m, got: n });
        }
        let mut a = Mat::<T>::zeros(n, n);
        for (i, j, v) in matrix.triplets() {
            if i >= n || j >= n {
                return Err(KError::IndexOutOfRange { row: i, col: j, n });
            }
            a[(i, j)] += v;
        }
        self.factor(&a)
    }

    fn solve(&mut self, b: &[T], x: &mut [T], transpose: bool) -> Result<(), KError> {
        if b.len() != x.len() {
            return Err(KError::DimensionMismatch {
                expected: b.len(),
                got: x.len(),
            });
        }
        x.copy_from_slice(b);
        self.solve_in_place(x, transpose)
    }
}

impl<T: Scalar + ComplexField> Default for DenseLu<T> {
    fn default() -> Self {
        Self::new()
    }
}
