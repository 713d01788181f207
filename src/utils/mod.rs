//! Timing and vector helpers.

pub mod tictoc;
pub mod vecmath;

pub use tictoc::{TicToc, sleep_for_milliseconds, sleep_for_seconds};
pub use vecmath::{dist2, norm_inf, residual_inf};
