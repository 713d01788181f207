//! Dense matrices as triplet sources.
//!
//! Lets a `faer::Mat<T>` be loaded into any adapter. Only nonzero entries
//! are yielded, in column-major order.

use crate::core::{Scalar, TripletSource};
use faer::Mat;

impl<T: Scalar> TripletSource<T> for Mat<T> {
    fn nrows(&self) -> usize {
        Mat::nrows(self)
    }
    fn ncols(&self) -> usize {
        Mat::ncols(self)
    }
    fn nnz(&self) -> usize {
        self.triplets().count()
    }
    fn triplets(&self) -> impl Iterator<Item = (usize, usize, T)> + '_ {
        let m = Mat::nrows(self);
        (0..Mat::ncols(self)).flat_map(move |j| {
            (0..m).filter_map(move |i| {
                let v = self[(i, j)];
                if v == T::zero() { None } else { Some((i, j, v)) }
            })
        })
    }
}
