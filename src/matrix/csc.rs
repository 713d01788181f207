//! Compressed sparse column matrix.
//!
//! Row indices are sorted within each column and duplicates are summed on
//! construction.

use crate::core::{Scalar, TripletSource};
use crate::matrix::sparse::{SparseMatrix, accumulate_triplets};
use num_traits::{Float, Zero};

#[derive(Debug, Clone, PartialEq)]
pub struct CscMatrix<T> {
    pub m: usize,
    pub n: usize,
    pub colptr: Vec<usize>,
    pub rowval: Vec<usize>,
    pub nzval: Vec<T>,
}

impl<T: Scalar> CscMatrix<T> {
    /// Compress any triplet source, summing duplicate entries.
    pub fn from_triplets<S: TripletSource<T> + ?Sized>(src: &S) -> Self {
        let (m, n) = (src.nrows(), src.ncols());
        let mut colptr = vec![0usize; n + 1];
        for (_, j, _) in src.triplets() {
            colptr[j + 1] += 1;
        }
        for j in 0..n {
            colptr[j + 1] += colptr[j];
        }
        let nnz = colptr[n];
        let mut next = colptr.clone();
        let mut rowval = vec![0usize; nnz];
        let mut nzval = vec![T::zero(); nnz];
        for (i, j, v) in src.triplets() {
            let p = next[j];
            rowval[p] = i;
            nzval[p] = v;
            next[j] += 1;
        }

        // sort each column by row, then fold equal rows together
        let mut out_ptr = vec![0usize; n + 1];
        let mut out_row = Vec::with_capacity(nnz);
        let mut out_val = Vec::with_capacity(nnz);
        let mut col: Vec<(usize, T)> = Vec::new();
        for j in 0..n {
            col.clear();
            col.extend((colptr[j]..colptr[j + 1]).map(|p| (rowval[p], nzval[p])));
            col.sort_unstable_by_key(|&(i, _)| i);
            for &(i, v) in col.iter() {
                match out_row.last() {
                    Some(&last) if last == i && out_row.len() > out_ptr[j] => {
                        if let Some(acc) = out_val.last_mut() {
                            *acc += v;
                        }
                    }
                    _ => {
                        out_row.push(i);
                        out_val.push(v);
                    }
                }
            }
            out_ptr[j + 1] = out_row.len();
        }

        Self {
            m,
            n,
            colptr: out_ptr,
            rowval: out_row,
            nzval: out_val,
        }
    }

    pub fn identity(n: usize) -> Self {
        Self {
            m: n,
            n,
            colptr: (0..=n).collect(),
            rowval: (0..n).collect(),
            nzval: vec![T::one(); n],
        }
    }

    /// Infinity norm (maximum absolute row sum).
    pub fn norm_inf(&self) -> T::Real {
        let mut sums = vec![T::Real::zero(); self.m];
        for (i, _, v) in self.triplets() {
            sums[i] += v.modulus();
        }
        sums.into_iter().fold(T::Real::zero(), |a, s| a.max(s))
    }
}

impl<T: Scalar> TripletSource<T> for CscMatrix<T> {
    fn nrows(&self) -> usize {
        self.m
    }
    fn ncols(&self) -> usize {
        self.n
    }
    fn nnz(&self) -> usize {
        self.nzval.len()
    }
    fn triplets(&self) -> impl Iterator<Item = (usize, usize, T)> + '_ {
        (0..self.n).flat_map(move |j| {
            (self.colptr[j]..self.colptr[j + 1]).map(move |p| (self.rowval[p], j, self.nzval[p]))
        })
    }
}

impl<T: Scalar> SparseMatrix<T> for CscMatrix<T> {
    fn nrows(&self) -> usize {
        self.m
    }
    fn ncols(&self) -> usize {
        self.n
    }
    fn spmv(&self, x: &[T], y: &mut [T]) {
        assert_eq!(x.len(), self.n);
        assert_eq!(y.len(), self.m);
        y.fill(T::zero());
        accumulate_triplets(self.triplets(), x, y, false);
    }
    fn spmv_transpose(&self, x: &[T], y: &mut [T]) {
        assert_eq!(x.len(), self.m);
        assert_eq!(y.len(), self.n);
        y.fill(T::zero());
        accumulate_triplets(self.triplets(), x, y, true);
    }
}
