//! Three-phase sparse direct adapter (analyze, factorize, solve).
//!
//! `SparseLu` owns the coordinate buffers, both kernel workspaces and the
//! control/info blocks, and walks the kernel through its call sequence.
//! Indices are 0-based here and shifted to the kernel's 1-based convention
//! when inserted.
//!
//! # Usage
//! ```no_run
//! use sparsetool::{CooMatrix, DirectSolver, SparseLu};
//!
//! let mut a = CooMatrix::<f64>::new(2, 2);
//! a.push(0, 0, 2.0);
//! a.push(1, 1, 3.0);
//! let mut lu = SparseLu::new();
//! lu.load(&a).unwrap();
//! let mut x = [0.0; 2];
//! lu.solve(&[4.0, 9.0], &mut x, false).unwrap();
//! ```

use crate::backend::{self, Factors, Info, Job, Keep, RealInfo, Triplets};
use crate::config::Control;
use crate::core::{Scalar, TripletSource};
use crate::error::{KError, Workspace};
use crate::io::{ConfigurablePrintTarget, PrintTarget};
use crate::solver::DirectSolver;
use num_traits::One;
use std::io::Write;
use std::mem::size_of;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Lifecycle of an adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Loaded,
    Analyzed,
    Factorized,
}

pub struct SparseLu<T: Scalar> {
    n: usize,
    irn: Vec<usize>,
    jcn: Vec<usize>,
    vals: Vec<T>,
    is: Vec<usize>,
    s: Vec<T>,
    rowsca: Vec<T::Real>,
    colsca: Vec<T::Real>,
    keep: Keep,
    control: Control,
    info: Info,
    rinfo: RealInfo,
    phase: Phase,
    verbose: bool,
    stream: PrintTarget,
}

impl<T: Scalar> Default for SparseLu<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Scalar> SparseLu<T> {
    pub fn new() -> Self {
        Self::with_control(backend::initialize())
    }

    /// Adapter with caller overrides of the kernel defaults.
    pub fn with_control(control: Control) -> Self {
        SparseLu {
            n: 0,
            irn: Vec::new(),
            jcn: Vec::new(),
            vals: Vec::new(),
            is: Vec::new(),
            s: Vec::new(),
            rowsca: Vec::new(),
            colsca: Vec::new(),
            keep: Keep::default(),
            control,
            info: Info::default(),
            rinfo: RealInfo::default(),
            phase: Phase::Uninitialized,
            verbose: false,
            stream: PrintTarget::default(),
        }
    }

    /// Replace the control block. Takes effect from the next phase that runs.
    pub fn set_control(&mut self, control: Control) {
        self.control = control;
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// Drop pending triplets and start an `n x n` matrix.
    pub fn init(&mut self, n: usize) {
        self.n = n;
        self.irn.clear();
        self.jcn.clear();
        self.vals.clear();
        self.keep = Keep::default();
        self.phase = Phase::Loaded;
    }

    /// Append one entry.
    ///
    /// # Panics
    /// Panics if `row` or `col` is not below the current dimension.
    pub fn insert(&mut self, row: usize, col: usize, value: T) {
        assert!(
            row < self.n && col < self.n,
            "SparseLu::insert({row}, {col}) outside a {n}x{n} matrix",
            n = self.n
        );
        self.push(row, col, value);
    }

    /// Like [`insert`](Self::insert) but reports a bad index as an error.
    pub fn try_insert(&mut self, row: usize, col: usize, value: T) -> Result<(), KError> {
        if row >= self.n || col >= self.n {
            return Err(KError::IndexOutOfRange { row, col, n: self.n });
        }
        self.push(row, col, value);
        Ok(())
    }

    fn push(&mut self, row: usize, col: usize, value: T) {
        self.irn.push(row + 1);
        self.jcn.push(col + 1);
        self.vals.push(value);
        if self.phase != Phase::Loaded {
            self.keep = Keep::default();
            self.phase = Phase::Loaded;
        }
    }

    /// Replace the pending matrix with the entries of `matrix`, then
    /// [`setup`](Self::setup).
    pub fn load_matrix<M: TripletSource<T> + ?Sized>(&mut self, matrix: &M) -> Result<(), KError> {
        let n = matrix.nrows();
        if matrix.ncols() != n {
            return Err(KError::DimensionMismatch {
                expected: n,
                got: matrix.ncols(),
            });
        }
        self.init(n);
        let nnz = matrix.nnz();
        self.irn.reserve(nnz);
        self.jcn.reserve(nnz);
        self.vals.reserve(nnz);
        for (i, j, v) in matrix.triplets() {
            self.try_insert(i, j, v)?;
        }
        self.setup(n, self.verbose)
    }

    /// Size the workspaces, analyze and factorize the pending matrix.
    pub fn setup(&mut self, n: usize, verbose: bool) -> Result<(), KError> {
        self.n = n;
        self.verbose = verbose;
        if self.phase == Phase::Uninitialized {
            self.phase = Phase::Loaded;
        }
        self.analyze()?;
        self.factorize()
    }

    fn size_workspaces(&mut self) {
        let (n, nnz) = (self.n, self.vals.len());
        let one = T::Real::one();
        self.rowsca.clear();
        self.rowsca.resize(n, one);
        self.colsca.clear();
        self.colsca.resize(n, one);
        let heuristic = 2 * nnz + 11 * n + 1;
        self.is.clear();
        self.is.resize(heuristic, 0);
        self.s.clear();
        self.s.resize(heuristic, T::zero());
    }

    /// Symbolic phase: ordering, size estimates and workspace allocation.
    pub fn analyze(&mut self) -> Result<(), KError> {
        if self.phase == Phase::Uninitialized {
            return self.fail(KError::InvalidJobSequence {
                requested: "analysis",
                missing: "matrix load",
            });
        }
        self.phase = Phase::Loaded;
        self.size_workspaces();

        let (n, nnz) = (self.n, self.vals.len());
        let mut work = vec![0usize; 2 * nnz + 12 * n + 1];
        let mat = Triplets {
            n,
            irn: &self.irn,
            jcn: &self.jcn,
            a: &self.vals,
        };
        let result = backend::call(
            Job::ANALYSIS,
            &mat,
            None,
            &mut self.colsca,
            &mut self.rowsca,
            &mut self.keep,
            &mut work,
            &mut self.s,
            &self.control,
            &mut self.info,
            &mut self.rinfo,
        );
        self.checked(result)?;

        let mult = self.control.workspace_multiplier;
        let min_is = self.info.min_int_workspace;
        let min_s = self.info.min_real_workspace;
        let required_bytes = (mult.saturating_mul(min_is).saturating_mul(size_of::<usize>()) as u64)
            .saturating_add(mult.saturating_mul(min_s).saturating_mul(size_of::<T>()) as u64);
        if required_bytes > self.control.memory_limit_bytes {
            let limit_bytes = self.control.memory_limit_bytes;
            self.keep = Keep::default();
            return self.fail(KError::WorkspaceLimitExceeded {
                required_bytes,
                limit_bytes,
            });
        }
        let is_len = (mult * min_is).max(self.is.len());
        let s_len = (mult * min_s).max(self.s.len());
        self.is.resize(is_len, 0);
        self.s.resize(s_len, T::zero());
        let m = work.len().min(self.is.len());
        self.is[..m].copy_from_slice(&work[..m]);

        self.phase = Phase::Analyzed;
        if self.verbose {
            // best effort, see report_analysis
            let _ = report_analysis(&mut self.stream, n, nnz, &self.info, &self.rinfo, (is_len, s_len));
        }
        Ok(())
    }

    /// Numeric phase. Needs a prior [`analyze`](Self::analyze).
    ///
    /// On [`Status::NeedsMoreWorkspace`](crate::Status::NeedsMoreWorkspace)
    /// call [`reserve_workspace`](Self::reserve_workspace) and retry.
    pub fn factorize(&mut self) -> Result<(), KError> {
        if self.phase == Phase::Uninitialized || self.phase == Phase::Loaded {
            return self.fail(KError::InvalidJobSequence {
                requested: "factorization",
                missing: "analysis",
            });
        }
        self.phase = Phase::Analyzed;
        let result = self.call_kernel(Job::FACTORIZATION, None);
        self.checked(result)?;
        self.phase = Phase::Factorized;
        if self.verbose {
            // best effort, see report_analysis
            let _ = report_factorization(&mut self.stream, &self.info, &self.rinfo);
        }
        Ok(())
    }

    /// Grow one workspace to at least `required` entries. Never shrinks.
    pub fn reserve_workspace(&mut self, workspace: Workspace, required: usize) -> Result<(), KError> {
        let (is_len, s_len) = match workspace {
            Workspace::Integer => (self.is.len().max(required), self.s.len()),
            Workspace::Real => (self.is.len(), self.s.len().max(required)),
        };
        let required_bytes =
            (is_len * size_of::<usize>()) as u64 + (s_len * size_of::<T>()) as u64;
        if required_bytes > self.control.memory_limit_bytes {
            return Err(KError::WorkspaceLimitExceeded {
                required_bytes,
                limit_bytes: self.control.memory_limit_bytes,
            });
        }
        self.is.resize(is_len, 0);
        self.s.resize(s_len, T::zero());
        Ok(())
    }

    /// Overwrite `rhs` with the solution of `A x = rhs`.
    pub fn solve_in_place(&mut self, rhs: &mut [T]) -> Result<(), KError> {
        self.solve_job(rhs, false)
    }

    /// Overwrite `rhs` with the solution of `Aᵀ x = rhs` (no conjugation).
    pub fn solve_transpose_in_place(&mut self, rhs: &mut [T]) -> Result<(), KError> {
        self.solve_job(rhs, true)
    }

    fn solve_job(&mut self, rhs: &mut [T], transpose: bool) -> Result<(), KError> {
        if self.phase != Phase::Factorized {
            return self.fail(KError::InvalidJobSequence {
                requested: "solve",
                missing: "factorization",
            });
        }
        let job = if transpose { Job::SOLVE | Job::TRANSPOSE } else { Job::SOLVE };
        let result = self.call_kernel(job, Some(rhs));
        self.checked(result)?;
        if self.verbose && self.control.compute_error_stats {
            // best effort, see report_analysis
            let _ = report_error_stats(&mut self.stream, &self.rinfo);
        }
        Ok(())
    }

    /// Solve for several right-hand sides against the current factors.
    ///
    /// Runs in parallel with the `rayon` feature. Error statistics are not
    /// computed on this path.
    pub fn solve_multiple(&self, rhs: &mut [Vec<T>], transpose: bool) -> Result<(), KError> {
        if self.phase != Phase::Factorized {
            return Err(KError::InvalidJobSequence {
                requested: "solve",
                missing: "factorization",
            });
        }
        let n = self.n;
        if let Some(b) = rhs.iter().find(|b| b.len() != n) {
            return Err(KError::DimensionMismatch {
                expected: n,
                got: b.len(),
            });
        }
        let f = Factors::view(&self.keep, &self.is, &self.s[2 * n..]);
        let (rowsca, colsca) = (&self.rowsca[..], &self.colsca[..]);

        #[cfg(feature = "rayon")]
        rhs.par_iter_mut().for_each_init(
            || vec![T::zero(); n],
            |x, b| f.solve_with(b, x, transpose, rowsca, colsca),
        );

        #[cfg(not(feature = "rayon"))]
        {
            let mut x = vec![T::zero(); n];
            for b in rhs.iter_mut() {
                f.solve_with(b, &mut x, transpose, rowsca, colsca);
            }
        }
        Ok(())
    }

    fn call_kernel(&mut self, job: Job, rhs: Option<&mut [T]>) -> Result<(), KError> {
        let mat = Triplets {
            n: self.n,
            irn: &self.irn,
            jcn: &self.jcn,
            a: &self.vals,
        };
        backend::call(
            job,
            &mat,
            rhs,
            &mut self.colsca,
            &mut self.rowsca,
            &mut self.keep,
            &mut self.is,
            &mut self.s,
            &self.control,
            &mut self.info,
            &mut self.rinfo,
        )
    }

    fn checked(&mut self, result: Result<(), KError>) -> Result<(), KError> {
        match result {
            Ok(()) => Ok(()),
            Err(e) => self.fail(e),
        }
    }

    fn fail(&mut self, e: KError) -> Result<(), KError> {
        self.info.status = e.code();
        if self.verbose {
            // best effort, see report_analysis
            let _ = writeln!(self.stream, "sparse lu error {}: {e}", e.code());
        }
        Err(e)
    }

    /// Stored entries, duplicates counted.
    pub fn nnz(&self) -> usize {
        self.vals.len()
    }

    pub fn dimension(&self) -> usize {
        self.n
    }

    pub fn info(&self) -> &Info {
        &self.info
    }

    pub fn rinfo(&self) -> &RealInfo {
        &self.rinfo
    }

    pub fn control(&self) -> &Control {
        &self.control
    }

    pub fn state(&self) -> Phase {
        self.phase
    }

    /// Current (integer, real) workspace lengths.
    pub fn workspace_sizes(&self) -> (usize, usize) {
        (self.is.len(), self.s.len())
    }

    /// Row and column equilibration factors of the last factorization.
    pub fn scaling(&self) -> (&[T::Real], &[T::Real]) {
        (&self.rowsca, &self.colsca)
    }
}

impl<T: Scalar> DirectSolver<T> for SparseLu<T> {
    fn load<M: TripletSource<T> + ?Sized>(&mut self, matrix: &M) -> Result<(), KError> {
        self.load_matrix(matrix)
    }

    fn solve(&mut self, b: &[T], x: &mut [T], transpose: bool) -> Result<(), KError> {
        if b.len() != x.len() {
            return Err(KError::DimensionMismatch {
                expected: b.len(),
                got: x.len(),
            });
        }
        x.copy_from_slice(b);
        self.solve_job(x, transpose)
    }
}

impl<T: Scalar> ConfigurablePrintTarget for SparseLu<T> {
    fn print_to_stdout(&mut self) {
        self.stream.print_to_stdout()
    }
    fn print_to_stream(&mut self, stream: Box<dyn Write + Send + Sync>) {
        self.stream.print_to_stream(stream)
    }
    fn print_to_buffer(&mut self) {
        self.stream.print_to_buffer()
    }
    fn print_to_sink(&mut self) {
        self.stream.print_to_sink()
    }
    fn get_print_buffer(&mut self) -> std::io::Result<String> {
        self.stream.get_print_buffer()
    }
}

// Verbose reports are best effort: callers drop the io::Result, so a
// failing print target never fails a solver phase.
fn report_analysis(
    out: &mut PrintTarget,
    n: usize,
    nnz: usize,
    info: &Info,
    rinfo: &RealInfo,
    sizes: (usize, usize),
) -> std::io::Result<()> {
    writeln!(out, "analysis: n = {n}, nnz = {nnz}")?;
    if info.ignored_entries > 0 {
        writeln!(out, "  ignored entries      = {}", info.ignored_entries)?;
    }
    writeln!(out, "  max front size       = {}", info.max_front_size)?;
    writeln!(out, "  tree nodes           = {}", info.tree_nodes)?;
    writeln!(out, "  min int workspace    = {}", info.min_int_workspace)?;
    writeln!(out, "  min real workspace   = {}", info.min_real_workspace)?;
    writeln!(out, "  estimated flops      = {:.3e}", rinfo.estimated_flops)?;
    writeln!(out, "  workspace (int/real) = {} / {}", sizes.0, sizes.1)
}

fn report_factorization(out: &mut PrintTarget, info: &Info, rinfo: &RealInfo) -> std::io::Result<()> {
    writeln!(out, "factorization:")?;
    writeln!(out, "  factor entries       = {}", info.real_factor_space)?;
    writeln!(out, "  off-diagonal pivots  = {}", info.off_diagonal_pivots)?;
    writeln!(out, "  assembly flops       = {:.3e}", rinfo.flops_assembly)?;
    writeln!(out, "  elimination flops    = {:.3e}", rinfo.flops_elimination)?;
    writeln!(out, "  total flops          = {:.3e}", rinfo.flops_factorization)
}

fn report_error_stats(out: &mut PrintTarget, rinfo: &RealInfo) -> std::io::Result<()> {
    writeln!(out, "solve:")?;
    writeln!(out, "  ‖A‖∞                 = {:.3e}", rinfo.matrix_inf_norm)?;
    writeln!(out, "  ‖x‖∞                 = {:.3e}", rinfo.solution_inf_norm)?;
    writeln!(out, "  scaled residual      = {:.3e}", rinfo.scaled_residual)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Status;
    use crate::matrix::CooMatrix;

    #[test]
    fn phases_advance_in_order() {
        let mut lu = SparseLu::<f64>::new();
        assert_eq!(lu.state(), Phase::Uninitialized);
        assert!(lu.analyze().is_err());
        lu.init(2);
        lu.insert(0, 0, 2.0);
        lu.insert(1, 1, 3.0);
        assert_eq!(lu.state(), Phase::Loaded);
        assert!(lu.factorize().is_err());
        lu.analyze().unwrap();
        assert_eq!(lu.state(), Phase::Analyzed);
        lu.factorize().unwrap();
        assert_eq!(lu.state(), Phase::Factorized);

        // new entries invalidate the factors
        lu.insert(0, 1, 1.0);
        assert_eq!(lu.state(), Phase::Loaded);
        let mut b = [1.0, 1.0];
        let err = lu.solve_in_place(&mut b).unwrap_err();
        assert_eq!(err.code(), -3);
        assert_eq!(lu.info().status, -3);
    }

    #[test]
    fn memory_ceiling_is_fatal() {
        let ctl = Control::default().with_memory_limit(64);
        let mut lu = SparseLu::<f64>::with_control(ctl);
        let err = lu.load_matrix(&CooMatrix::<f64>::identity(4)).unwrap_err();
        assert!(matches!(err, KError::WorkspaceLimitExceeded { limit_bytes: 64, .. }));
        assert_eq!(err.status(), Status::Fatal);
        assert_eq!(lu.state(), Phase::Loaded);
    }

    #[test]
    fn verbose_reports_go_to_the_print_target() {
        let mut lu = SparseLu::<f64>::with_control(Control::default().with_error_stats(true));
        lu.print_to_buffer();
        lu.set_verbose(true);
        lu.load_matrix(&CooMatrix::<f64>::identity(3)).unwrap();
        let mut b = [1.0, 2.0, 3.0];
        lu.solve_in_place(&mut b).unwrap();
        let out = lu.get_print_buffer().unwrap();
        assert!(out.contains("max front size"));
        assert!(out.contains("total flops"));
        assert!(out.contains("scaled residual"));
    }

    #[test]
    fn non_square_source_is_rejected() {
        let mut lu = SparseLu::<f64>::new();
        let a = CooMatrix::<f64>::new(2, 3);
        assert_eq!(
            lu.load_matrix(&a),
            Err(KError::DimensionMismatch { expected: 2, got: 3 })
        );
    }
}
