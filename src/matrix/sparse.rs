// SparseMatrix trait shared by the coordinate and compressed column types

/// A read‐only sparse matrix supporting y = A * x and y = Aᵀ * x.
pub trait SparseMatrix<T> {
    /// Number of rows.
    fn nrows(&self) -> usize;
    /// Number of columns.
    fn ncols(&self) -> usize;
    /// Compute y = A * x.  `x.len() == ncols()`, `y.len() == nrows()`.
    fn spmv(&self, x: &[T], y: &mut [T]);
    /// Compute y = Aᵀ * x.  `x.len() == nrows()`, `y.len() == ncols()`.
    fn spmv_transpose(&self, x: &[T], y: &mut [T]);
}

/// Accumulate `y += op(A) x` over an entry list.
///
/// Shared by every container that can walk its entries as triplets.
pub(crate) fn accumulate_triplets<T, I>(entries: I, x: &[T], y: &mut [T], transpose: bool)
where
    T: crate::core::Scalar,
    I: Iterator<Item = (usize, usize, T)>,
{
    for (i, j, v) in entries {
        if transpose {
            y[j] += v * x[i];
        } else {
            y[i] += v * x[j];
        }
    }
}
