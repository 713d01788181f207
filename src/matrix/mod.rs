//! Matrix module: coordinate, compressed column and dense sources.

pub mod coo;
pub mod csc;
pub mod dense;
pub mod sparse;

pub use coo::CooMatrix;
pub use csc::CscMatrix;
pub use sparse::SparseMatrix;
