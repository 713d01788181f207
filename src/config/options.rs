//! Control parameters for the sparse direct kernel.
//!
//! `Control` replaces the fixed-size real and integer control arrays of a
//! native solver with named fields. Defaults come from
//! [`crate::backend::initialize`]; individual fields are overridden with the
//! `with_*` setters.

/// Column ordering applied before numeric factorization.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Ordering {
    /// Identity ordering.
    Natural,
    /// Approximate minimum degree on the pattern of A + Aᵀ.
    #[default]
    Amd,
    /// Caller-supplied permutation; `perm[k]` is the column eliminated k-th.
    Given(Vec<usize>),
}

/// Equilibration applied to the matrix before factorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scaling {
    None,
    /// Row then column infinity-norm scaling.
    #[default]
    RowColumn,
}

/// Kernel control block.
#[derive(Debug, Clone, PartialEq)]
pub struct Control {
    /// Threshold partial pivoting parameter in [0, 1]. The diagonal entry is
    /// kept as pivot when `|a_kk| >= pivot_threshold * max_i |a_ik|`.
    pub pivot_threshold: f64,

    /// Column ordering strategy
    pub ordering: Ordering,

    /// Scaling strategy
    pub scaling: Scaling,

    /// Compute matrix/solution norms and the scaled residual after each solve
    pub compute_error_stats: bool,

    /// Multiplier applied to the minimum workspace reported by analysis
    pub workspace_multiplier: usize,

    /// Ceiling for the projected workspace footprint, in bytes
    pub memory_limit_bytes: u64,
}

impl Default for Control {
    fn default() -> Self {
        Self {
            pivot_threshold: 0.01,
            ordering: Ordering::Amd,
            scaling: Scaling::RowColumn,
            compute_error_stats: false,
            workspace_multiplier: 10,
            memory_limit_bytes: 4_000_000_000,
        }
    }
}

impl Control {
    pub fn with_pivot_threshold(mut self, threshold: f64) -> Self {
        self.pivot_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    pub fn with_ordering(mut self, ordering: Ordering) -> Self {
        self.ordering = ordering;
        self
    }

    pub fn with_scaling(mut self, scaling: Scaling) -> Self {
        self.scaling = scaling;
        self
    }

    pub fn with_error_stats(mut self, on: bool) -> Self {
        self.compute_error_stats = on;
        self
    }

    pub fn with_workspace_multiplier(mut self, multiplier: usize) -> Self {
        self.workspace_multiplier = multiplier.max(1);
        self
    }

    pub fn with_memory_limit(mut self, bytes: u64) -> Self {
        self.memory_limit_bytes = bytes;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setters_clamp_their_inputs() {
        let c = Control::default()
            .with_pivot_threshold(3.0)
            .with_workspace_multiplier(0)
            .with_ordering(Ordering::Natural);
        assert_eq!(c.pivot_threshold, 1.0);
        assert_eq!(c.workspace_multiplier, 1);
        assert_eq!(c.ordering, Ordering::Natural);
        assert_eq!(c.scaling, Scaling::RowColumn);
    }
}
