//! Solve phase against the factors left in the workspaces.
//!
//! With `P (Dr A Dc) Q = L U`:
//! - `A x = b`:  `x = Dc Q U⁻¹ L⁻¹ P Dr b`
//! - `Aᵀ x = b`: `x = Dr Pᵀ L⁻ᵀ U⁻ᵀ Qᵀ Dc b`

use super::{Keep, Layout, RealInfo};
use crate::config::Control;
use crate::core::Scalar;
use crate::error::KError;
use num_traits::{Float, Zero};

/// Read-only view of the factorization stored in the workspaces.
pub(crate) struct Factors<'a, T> {
    pub n: usize,
    pub q: &'a [usize],
    pub acol: &'a [usize],
    pub arow: &'a [usize],
    pub aval: &'a [T],
    pub lp: &'a [usize],
    pub up: &'a [usize],
    pub pinv: &'a [usize],
    pub idx: &'a [usize],
    pub val: &'a [T],
}

impl<'a, T: Scalar> Factors<'a, T> {
    /// Carve the factor view out of the workspaces. `tail` is the real
    /// workspace past the 2n solve scratch.
    pub(crate) fn view(keep: &Keep, is: &'a [usize], tail: &'a [T]) -> Factors<'a, T> {
        let (n, ne) = (keep.n, keep.ne);
        let (q, rest) = is.split_at(n);
        let (acol, rest) = rest.split_at(n + 1);
        let (arow, rest) = rest.split_at(ne);
        let (lp, rest) = rest.split_at(n + 1);
        let (up, rest) = rest.split_at(n + 1);
        let (pinv, rest) = rest.split_at(n);
        let idx = &rest[4 * n..4 * n + keep.cap];
        let (aval, rlu) = tail.split_at(ne);
        Factors {
            n,
            q,
            acol,
            arow,
            aval,
            lp,
            up,
            pinv,
            idx,
            val: &rlu[..keep.cap],
        }
    }

    /// Overwrite `rhs` with op(A)⁻¹ rhs using the n-length scratch `x`.
    pub(crate) fn solve_with(
        &self,
        rhs: &mut [T],
        x: &mut [T],
        transpose: bool,
        rowsca: &[T::Real],
        colsca: &[T::Real],
    ) {
        let n = self.n;
        if transpose {
            for k in 0..n {
                let c = self.q[k];
                x[k] = rhs[c].scale(colsca[c]);
            }
            self.utsolve(x);
            self.ltsolve(x);
            for i in 0..n {
                rhs[i] = x[self.pinv[i]].scale(rowsca[i]);
            }
        } else {
            for i in 0..n {
                x[self.pinv[i]] = rhs[i].scale(rowsca[i]);
            }
            self.lsolve(x);
            self.usolve(x);
            for k in 0..n {
                let c = self.q[k];
                rhs[c] = x[k].scale(colsca[c]);
            }
        }
    }

    fn lsolve(&self, x: &mut [T]) {
        for j in 0..self.n {
            let xj = x[j];
            for p in self.lp[j] + 1..self.lp[j + 1] {
                x[self.idx[p]] -= self.val[p] * xj;
            }
        }
    }

    fn ltsolve(&self, x: &mut [T]) {
        for j in (0..self.n).rev() {
            for p in self.lp[j] + 1..self.lp[j + 1] {
                let v = self.val[p] * x[self.idx[p]];
                x[j] -= v;
            }
        }
    }

    // U column j lives in [up[j + 1], up[j]) with the diagonal first
    fn usolve(&self, x: &mut [T]) {
        for j in (0..self.n).rev() {
            let d = self.up[j + 1];
            x[j] /= self.val[d];
            let xj = x[j];
            for p in d + 1..self.up[j] {
                x[self.idx[p]] -= self.val[p] * xj;
            }
        }
    }

    fn utsolve(&self, x: &mut [T]) {
        for j in 0..self.n {
            let d = self.up[j + 1];
            for p in d + 1..self.up[j] {
                let v = self.val[p] * x[self.idx[p]];
                x[j] -= v;
            }
            x[j] /= self.val[d];
        }
    }

    /// `r -= op(A) x` with the unscaled compressed copy of A.
    pub(crate) fn residual(&self, x: &[T], r: &mut [T], transpose: bool) {
        for j in 0..self.n {
            for p in self.acol[j]..self.acol[j + 1] {
                let i = self.arow[p];
                if transpose {
                    r[j] -= self.aval[p] * x[i];
                } else {
                    r[i] -= self.aval[p] * x[j];
                }
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub(super) fn solve<T: Scalar>(
    rhs: &mut [T],
    transpose: bool,
    colsca: &[T::Real],
    rowsca: &[T::Real],
    keep: &Keep,
    is: &[usize],
    s: &mut [T],
    control: &Control,
    rinfo: &mut RealInfo,
) -> Result<(), KError> {
    if !keep.factorized {
        return Err(KError::InvalidJobSequence {
            requested: "solve",
            missing: "factorization",
        });
    }
    let n = keep.n;
    if rhs.len() != n {
        return Err(KError::DimensionMismatch {
            expected: n,
            got: rhs.len(),
        });
    }
    if colsca.len() < n || rowsca.len() < n {
        return Err(KError::DimensionMismatch {
            expected: n,
            got: colsca.len().min(rowsca.len()),
        });
    }
    let required = Layout::real_header(n, keep.ne) + keep.cap;
    if s.len() < required || is.len() < Layout::int_header(n, keep.ne) + keep.cap {
        return Err(KError::SolveRealWorkspace { required });
    }

    let (scratch, factors) = s.split_at_mut(2 * n);
    let (x, b) = scratch.split_at_mut(n);
    let f = Factors::view(keep, is, factors);

    if control.compute_error_stats {
        b.copy_from_slice(rhs);
    }
    f.solve_with(rhs, x, transpose, rowsca, colsca);

    if control.compute_error_stats {
        f.residual(rhs, b, transpose);
        let rnorm = b.iter().fold(T::Real::zero(), |a, v| a.max(v.modulus()));
        let xnorm = rhs.iter().fold(T::Real::zero(), |a, v| a.max(v.modulus()));
        let anorm = if transpose { keep.anorm_one } else { keep.anorm_inf };
        let (rnorm, xnorm) = (T::real_to_f64(rnorm), T::real_to_f64(xnorm));
        let denom = anorm * xnorm;
        rinfo.matrix_inf_norm = anorm;
        rinfo.solution_inf_norm = xnorm;
        rinfo.scaled_residual = if denom > 0.0 { rnorm / denom } else { rnorm };
    }
    Ok(())
}
