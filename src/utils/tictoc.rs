//! Wall-clock stopwatch for timing solver phases.

use std::time::{Duration, Instant};

/// Monotonic stopwatch. Starts on construction; `toc` records the time
/// since the last `tic`.
#[derive(Debug, Clone, Copy)]
pub struct TicToc {
    start: Instant,
    elapsed: Duration,
}

impl Default for TicToc {
    fn default() -> Self {
        Self::new()
    }
}

impl TicToc {
    pub fn new() -> Self {
        TicToc {
            start: Instant::now(),
            elapsed: Duration::ZERO,
        }
    }

    /// Restart the stopwatch.
    pub fn tic(&mut self) {
        self.start = Instant::now();
    }

    /// Record the time since the last `tic`, truncated to microseconds.
    pub fn toc(&mut self) {
        let us = self.start.elapsed().as_micros();
        self.elapsed = Duration::from_micros(us.min(u64::MAX as u128) as u64);
    }

    /// Last recorded interval in seconds.
    pub fn elapsed_s(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    /// Last recorded interval in milliseconds.
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1e3
    }
}

pub fn sleep_for_seconds(s: u64) {
    std::thread::sleep(Duration::from_secs(s));
}

pub fn sleep_for_milliseconds(ms: u64) {
    std::thread::sleep(Duration::from_millis(ms));
}
