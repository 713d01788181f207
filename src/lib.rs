//! sparsetool: three-phase sparse direct solver adapters over Faer
//!
//! This crate puts a uniform analyze -> factorize -> solve call surface in
//! front of direct solvers for real and complex systems. The sparse adapter
//! drives a native-style kernel (1-based triplets, caller-owned workspaces,
//! typed control and info blocks); the dense adapter wraps Faer's LU.

pub mod backend;
pub mod config;
pub mod core;
pub mod error;
pub mod io;
pub mod matrix;
pub mod solver;
pub mod utils;

// Re-exports for convenience
pub use crate::core::{Scalar, TripletSource};
pub use backend::{Info, Job, RealInfo};
pub use config::{Control, Ordering, Scaling};
pub use error::{KError, Status, Workspace};
pub use io::{ConfigurablePrintTarget, PrintTarget};
pub use matrix::{CooMatrix, CscMatrix, SparseMatrix};
pub use solver::{DenseLu, DirectSolver, Phase, SparseLu};
pub use utils::TicToc;
