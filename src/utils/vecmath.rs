//! Small vector norms used by drivers and tests.

use crate::core::Scalar;
use crate::matrix::SparseMatrix;
use num_traits::{Float, Zero};

/// max_i |x_i|
pub fn norm_inf<T: Scalar>(x: &[T]) -> T::Real {
    x.iter().fold(T::Real::zero(), |m, v| m.max(v.modulus()))
}

/// Euclidean distance ‖x - y‖₂.
pub fn dist2<T: Scalar>(x: &[T], y: &[T]) -> T::Real {
    assert_eq!(x.len(), y.len());
    x.iter()
        .zip(y)
        .map(|(&a, &b)| {
            let d = (a - b).modulus();
            d * d
        })
        .fold(T::Real::zero(), |s, v| s + v)
        .sqrt()
}

/// ‖b - op(A) x‖∞
pub fn residual_inf<T, M>(a: &M, x: &[T], b: &[T], transpose: bool) -> T::Real
where
    T: Scalar,
    M: SparseMatrix<T> + ?Sized,
{
    let mut ax = vec![T::zero(); b.len()];
    if transpose {
        a.spmv_transpose(x, &mut ax);
    } else {
        a.spmv(x, &mut ax);
    }
    ax.iter()
        .zip(b)
        .fold(T::Real::zero(), |m, (&v, &bi)| m.max((bi - v).modulus()))
}
