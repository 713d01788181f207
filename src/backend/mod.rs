//! Sparse direct kernel with a native-style call surface.
//!
//! The kernel is driven through a single entry point, [`call`], parameterised
//! by a [`Job`]: analysis, numeric factorization, solve, or a combination.
//! All persistent state lives in caller-owned buffers:
//!
//! - `is`, the integer workspace: column ordering, compressed copy of the
//!   matrix pattern, row permutation, factor indices and DFS scratch;
//! - `s`, the real workspace: solve scratch, compressed matrix values and
//!   factor values;
//! - `rowsca` / `colsca`, the equilibration factors;
//! - [`Keep`], a small block of bookkeeping that must be passed back
//!   unchanged between calls.
//!
//! Matrix entries arrive as 1-based coordinate triplets. The analysis phase
//! reports the minimum workspace sizes in [`Info`]; the factorization phase
//! reports how much it actually used and fails with a "needs more workspace"
//! status when the buffers are too small.
//!
//! # Algorithm
//! Analysis orders the columns (AMD on the pattern of A + Aᵀ by default) and
//! estimates the factor sizes from the column counts of the symmetrised
//! pattern. Factorization is a left-looking LU with threshold partial
//! pivoting (Gilbert-Peierls): each column is computed by a sparse triangular
//! solve whose nonzero pattern comes from a depth-first search over L.
//!
//! # References
//! - Davis, T. A. (2006). Direct Methods for Sparse Linear Systems. SIAM.
//! - Gilbert, J. R. & Peierls, T. (1988). Sparse partial pivoting in time
//!   proportional to arithmetic operations.

mod analysis;
mod factor;
mod solve;

pub(crate) use solve::Factors;

use crate::config::Control;
use crate::core::Scalar;
use crate::error::KError;
use bitflags::bitflags;

/// Sentinel for "no index".
pub(crate) const NONE: usize = usize::MAX;

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct Job: u32 {
        const ANALYSIS      = 0b0001;
        const FACTORIZATION = 0b0010;
        const SOLVE         = 0b0100;
        /// Modifier for SOLVE: use Aᵀ instead of A.
        const TRANSPOSE     = 0b1000;
        const ANALYSIS_AND_FACTORIZATION = Self::ANALYSIS.bits() | Self::FACTORIZATION.bits();
        const FACTORIZATION_AND_SOLVE    = Self::FACTORIZATION.bits() | Self::SOLVE.bits();
        const ALL = Self::ANALYSIS.bits() | Self::FACTORIZATION.bits() | Self::SOLVE.bits();
    }
}

impl Job {
    /// Map a native phase code (1..=6) to a job.
    pub fn from_code(code: i32) -> Option<Job> {
        match code {
            1 => Some(Job::ANALYSIS),
            2 => Some(Job::FACTORIZATION),
            3 => Some(Job::SOLVE),
            4 => Some(Job::ANALYSIS_AND_FACTORIZATION),
            5 => Some(Job::FACTORIZATION_AND_SOLVE),
            6 => Some(Job::ALL),
            _ => None,
        }
    }

    /// Native phase code, ignoring the transpose modifier.
    pub fn code(&self) -> Option<i32> {
        let phases = self.difference(Job::TRANSPOSE);
        (1..=6).find(|&c| Job::from_code(c) == Some(phases))
    }
}

/// Coordinate matrix in the kernel's calling convention (1-based indices).
#[derive(Debug, Clone, Copy)]
pub struct Triplets<'a, T> {
    pub n: usize,
    pub irn: &'a [usize],
    pub jcn: &'a [usize],
    pub a: &'a [T],
}

impl<'a, T: Copy> Triplets<'a, T> {
    pub fn ne(&self) -> usize {
        self.a.len()
    }

    /// In-range entries converted to 0-based indices.
    pub(crate) fn entries(&self) -> impl Iterator<Item = (usize, usize, T)> + 'a {
        let (n, irn, jcn, a) = (self.n, self.irn, self.jcn, self.a);
        irn.iter()
            .zip(jcn.iter())
            .zip(a.iter())
            .filter(move |&((&i, &j), _)| i >= 1 && i <= n && j >= 1 && j <= n)
            .map(|((&i, &j), &v)| (i - 1, j - 1, v))
    }
}

/// Integer and real information reported by the kernel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Info {
    /// Status of the last call: 0 on success, the negative error code otherwise.
    pub status: i32,
    /// Real space needed for the factors (estimate after analysis, exact after factorization).
    pub real_factor_space: usize,
    /// Integer space needed for the factors.
    pub int_factor_space: usize,
    /// Largest column count in the symmetrised factor pattern.
    pub max_front_size: usize,
    /// Nodes of the assembly tree (fundamental supernodes).
    pub tree_nodes: usize,
    /// Minimum integer workspace for factorization.
    pub min_int_workspace: usize,
    /// Minimum real workspace for factorization.
    pub min_real_workspace: usize,
    /// Real workspace used by the last factorization.
    pub real_space_used: usize,
    /// Integer workspace used by the last factorization.
    pub int_space_used: usize,
    /// Entries skipped because their indices were out of range.
    pub ignored_entries: usize,
    /// Pivots chosen off the diagonal.
    pub off_diagonal_pivots: usize,
}

/// Floating point information reported by the kernel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RealInfo {
    /// Flops predicted by analysis.
    pub estimated_flops: f64,
    /// Flops for the whole numeric factorization.
    pub flops_factorization: f64,
    /// Flops for assembling the columns.
    pub flops_assembly: f64,
    /// Flops for the elimination updates.
    pub flops_elimination: f64,
    /// ‖A‖∞ (only with `compute_error_stats`)
    pub matrix_inf_norm: f64,
    /// ‖x‖∞ (only with `compute_error_stats`)
    pub solution_inf_norm: f64,
    /// ‖b - Ax‖∞ / (‖A‖∞ ‖x‖∞) (only with `compute_error_stats`)
    pub scaled_residual: f64,
}

/// Bookkeeping carried between kernel calls. Treat as opaque.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Keep {
    pub(crate) n: usize,
    pub(crate) ne: usize,
    pub(crate) analyzed: bool,
    pub(crate) factorized: bool,
    pub(crate) est_lnz: usize,
    pub(crate) est_unz: usize,
    pub(crate) lnz: usize,
    pub(crate) unz: usize,
    pub(crate) cap: usize,
    pub(crate) anorm_inf: f64,
    pub(crate) anorm_one: f64,
}

impl Keep {
    pub fn is_analyzed(&self) -> bool {
        self.analyzed
    }

    pub fn is_factorized(&self) -> bool {
        self.factorized
    }
}

/// Fixed parts of the workspace layouts.
pub(crate) struct Layout;

impl Layout {
    /// q, compressed pattern, lp, up, pinv and four DFS arrays.
    pub(crate) fn int_header(n: usize, ne: usize) -> usize {
        9 * n + 3 + ne
    }

    /// Two solve scratch vectors and the compressed values.
    pub(crate) fn real_header(n: usize, ne: usize) -> usize {
        2 * n + ne
    }

    /// Scratch needed by analysis: q, pattern of A + Aᵀ plus diagonal, five
    /// work arrays.
    pub(crate) fn analysis_int(n: usize, ne: usize) -> usize {
        2 * ne + 8 * n + 1
    }
}

/// Default control block.
pub fn initialize() -> Control {
    Control::default()
}

/// Single entry point of the kernel.
///
/// `rhs` is required when `job` contains [`Job::SOLVE`] and is overwritten
/// with the solution. The status is also recorded in `info.status`.
#[allow(clippy::too_many_arguments)]
pub fn call<T: Scalar>(
    job: Job,
    mat: &Triplets<'_, T>,
    rhs: Option<&mut [T]>,
    colsca: &mut [T::Real],
    rowsca: &mut [T::Real],
    keep: &mut Keep,
    is: &mut [usize],
    s: &mut [T],
    control: &Control,
    info: &mut Info,
    rinfo: &mut RealInfo,
) -> Result<(), KError> {
    let result = dispatch(job, mat, rhs, colsca, rowsca, keep, is, s, control, info, rinfo);
    info.status = match &result {
        Ok(()) => 0,
        Err(e) => e.code(),
    };
    result
}

#[allow(clippy::too_many_arguments)]
fn dispatch<T: Scalar>(
    job: Job,
    mat: &Triplets<'_, T>,
    rhs: Option<&mut [T]>,
    colsca: &mut [T::Real],
    rowsca: &mut [T::Real],
    keep: &mut Keep,
    is: &mut [usize],
    s: &mut [T],
    control: &Control,
    info: &mut Info,
    rinfo: &mut RealInfo,
) -> Result<(), KError> {
    if job.contains(Job::ANALYSIS) {
        analysis::analyze(mat, keep, is, control, info, rinfo)?;
    }
    if job.contains(Job::FACTORIZATION) {
        factor::factorize(mat, colsca, rowsca, keep, is, s, control, info, rinfo)?;
    }
    if job.contains(Job::SOLVE) {
        let rhs = rhs.ok_or(KError::DimensionMismatch {
            expected: mat.n,
            got: 0,
        })?;
        let transpose = job.contains(Job::TRANSPOSE);
        solve::solve(rhs, transpose, colsca, rowsca, keep, is, s, control, rinfo)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_codes_round_trip_the_native_table() {
        assert_eq!(Job::from_code(4), Some(Job::ANALYSIS | Job::FACTORIZATION));
        assert_eq!(Job::from_code(7), None);
        assert_eq!((Job::SOLVE | Job::TRANSPOSE).code(), Some(3));
        assert_eq!(Job::ALL.code(), Some(6));
    }

    #[test]
    fn entries_drop_out_of_range_and_shift_to_zero_based() {
        let irn = [1, 3, 2];
        let jcn = [1, 1, 0];
        let a = [1.0, 2.0, 3.0];
        let t = Triplets { n: 2, irn: &irn, jcn: &jcn, a: &a };
        let e: Vec<_> = t.entries().collect();
        assert_eq!(e, vec![(0, 0, 1.0)]);
    }
}
