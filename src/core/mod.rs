//! Core traits shared by matrices, kernel and adapters.

pub mod traits;
pub use traits::{Scalar, TripletSource};
