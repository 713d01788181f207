//! Coordinate (triplet) sparse matrix.
//!
//! Entries are stored in insertion order. Duplicates are kept as separate
//! entries and act additively in products and conversions.

use crate::core::{Scalar, TripletSource};
use crate::error::KError;
use crate::matrix::sparse::{SparseMatrix, accumulate_triplets};

#[derive(Debug, Clone, PartialEq)]
pub struct CooMatrix<T> {
    nrows: usize,
    ncols: usize,
    rows: Vec<usize>,
    cols: Vec<usize>,
    vals: Vec<T>,
}

impl<T: Scalar> CooMatrix<T> {
    /// Empty `nrows x ncols` matrix.
    pub fn new(nrows: usize, ncols: usize) -> Self {
        Self {
            nrows,
            ncols,
            rows: Vec::new(),
            cols: Vec::new(),
            vals: Vec::new(),
        }
    }

    pub fn with_capacity(nrows: usize, ncols: usize, nnz: usize) -> Self {
        Self {
            nrows,
            ncols,
            rows: Vec::with_capacity(nnz),
            cols: Vec::with_capacity(nnz),
            vals: Vec::with_capacity(nnz),
        }
    }

    /// Build from parallel triplet arrays, checking every index.
    pub fn from_triplets(
        nrows: usize,
        ncols: usize,
        rows: Vec<usize>,
        cols: Vec<usize>,
        vals: Vec<T>,
    ) -> Result<Self, KError> {
        if rows.len() != vals.len() {
            return Err(KError::DimensionMismatch {
                expected: vals.len(),
                got: rows.len(),
            });
        }
        if cols.len() != vals.len() {
            return Err(KError::DimensionMismatch {
                expected: vals.len(),
                got: cols.len(),
            });
        }
        if let Some((&row, &col)) = rows
            .iter()
            .zip(cols.iter())
            .find(|&(&r, &c)| r >= nrows || c >= ncols)
        {
            return Err(KError::IndexOutOfRange {
                row,
                col,
                n: nrows.max(ncols),
            });
        }
        Ok(Self {
            nrows,
            ncols,
            rows,
            cols,
            vals,
        })
    }

    /// `n x n` identity.
    pub fn identity(n: usize) -> Self {
        let mut m = Self::with_capacity(n, n, n);
        for i in 0..n {
            m.push(i, i, T::one());
        }
        m
    }

    /// Append one entry.
    ///
    /// # Panics
    /// Panics if `(row, col)` is outside the matrix.
    pub fn push(&mut self, row: usize, col: usize, val: T) {
        assert!(
            row < self.nrows && col < self.ncols,
            "CooMatrix::push({row}, {col}) outside a {}x{} matrix",
            self.nrows,
            self.ncols
        );
        self.rows.push(row);
        self.cols.push(col);
        self.vals.push(val);
    }

    pub fn clear(&mut self) {
        self.rows.clear();
        self.cols.clear();
        self.vals.clear();
    }

    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    pub fn cols(&self) -> &[usize] {
        &self.cols
    }

    pub fn values(&self) -> &[T] {
        &self.vals
    }
}

impl<T: Scalar> TripletSource<T> for CooMatrix<T> {
    fn nrows(&self) -> usize {
        self.nrows
    }
    fn ncols(&self) -> usize {
        self.ncols
    }
    fn nnz(&self) -> usize {
        self.vals.len()
    }
    fn triplets(&self) -> impl Iterator<Item = (usize, usize, T)> + '_ {
        self.rows
            .iter()
            .zip(self.cols.iter())
            .zip(self.vals.iter())
            .map(|((&i, &j), &v)| (i, j, v))
    }
}

impl<T: Scalar> SparseMatrix<T> for CooMatrix<T> {
    fn nrows(&self) -> usize {
        self.nrows
    }
    fn ncols(&self) -> usize {
        self.ncols
    }
    fn spmv(&self, x: &[T], y: &mut [T]) {
        assert_eq!(x.len(), self.ncols);
        assert_eq!(y.len(), self.nrows);
        y.fill(T::zero());
        accumulate_triplets(self.triplets(), x, y, false);
    }
    fn spmv_transpose(&self, x: &[T], y: &mut [T]) {
        assert_eq!(x.len(), self.nrows);
        assert_eq!(y.len(), self.ncols);
        y.fill(T::zero());
        accumulate_triplets(self.triplets(), x, y, true);
    }
}
