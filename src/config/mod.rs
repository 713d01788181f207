//! Solver configuration.

pub mod options;
pub use options::{Control, Ordering, Scaling};
