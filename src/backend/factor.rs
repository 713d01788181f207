//! Numeric factorization: assembly, equilibration and left-looking LU.
//!
//! Integer workspace layout:
//! `[q: n | acol: n+1 | arow: ne | lp: n+1 | up: n+1 | pinv: n | xi | stack | pstack | mark | factor region]`
//!
//! Real workspace layout:
//! `[scratch: 2n | aval: ne | factor region]`
//!
//! The factor regions hold L from the front and U from the back, so they only
//! run out when the two meet. Entry `p` of the integer region is the row index
//! of entry `p` of the real region.

use super::{Info, Keep, Layout, NONE, RealInfo, Triplets};
use crate::config::{Control, Scaling};
use crate::core::Scalar;
use crate::error::KError;
use num_traits::{Float, One, Zero};

#[allow(clippy::too_many_arguments)]
pub(super) fn factorize<T: Scalar>(
    mat: &Triplets<'_, T>,
    colsca: &mut [T::Real],
    rowsca: &mut [T::Real],
    keep: &mut Keep,
    is: &mut [usize],
    s: &mut [T],
    control: &Control,
    info: &mut Info,
    rinfo: &mut RealInfo,
) -> Result<(), KError> {
    keep.factorized = false;
    if !keep.analyzed || keep.n != mat.n || keep.ne != mat.ne() {
        return Err(KError::InvalidJobSequence {
            requested: "factorization",
            missing: "analysis",
        });
    }
    let n = keep.n;
    let ne = keep.ne;
    let min_factor = keep.est_lnz + keep.est_unz;
    if s.len() < Layout::real_header(n, ne) {
        return Err(KError::PreprocessWorkspace {
            required: Layout::real_header(n, ne) + min_factor,
        });
    }
    if is.len() < Layout::int_header(n, ne) {
        return Err(KError::FactorIntWorkspace {
            required: Layout::int_header(n, ne) + min_factor,
        });
    }
    if colsca.len() < n || rowsca.len() < n {
        return Err(KError::DimensionMismatch {
            expected: n,
            got: colsca.len().min(rowsca.len()),
        });
    }

    let (q, rest) = is.split_at_mut(n);
    let (acol, rest) = rest.split_at_mut(n + 1);
    let (arow, rest) = rest.split_at_mut(ne);
    let (lp, rest) = rest.split_at_mut(n + 1);
    let (up, rest) = rest.split_at_mut(n + 1);
    let (pinv, rest) = rest.split_at_mut(n);
    let (xi, rest) = rest.split_at_mut(n);
    let (stack, rest) = rest.split_at_mut(n);
    let (pstack, rest) = rest.split_at_mut(n);
    let (mark, ilu) = rest.split_at_mut(n);

    let (scratch, rest) = s.split_at_mut(2 * n);
    let (aval, rlu) = rest.split_at_mut(ne);
    let x = &mut scratch[..n];

    assemble(mat, acol, arow, aval, mark);
    let colsca = &mut colsca[..n];
    let rowsca = &mut rowsca[..n];
    matrix_norms(acol, arow, aval, x, keep);
    equilibrate(control.scaling, acol, arow, aval, rowsca, colsca);

    // left-looking LU
    let tol = T::real_from_f64(control.pivot_threshold);
    let int_room = ilu.len();
    let real_room = rlu.len();
    let cap = int_room.min(real_room);
    let (idx, val) = (&mut ilu[..cap], &mut rlu[..cap]);

    x.fill(T::zero());
    pinv.fill(NONE);
    mark.fill(NONE);
    let mut lnz = 0usize;
    let mut uptr = cap;
    up[0] = cap;
    let mut flops_assembly = 0.0;
    let mut flops_elimination = 0.0;
    let mut flops_division = 0.0;
    info.off_diagonal_pivots = 0;

    for k in 0..n {
        lp[k] = lnz;
        let col = q[k];
        let top = reach(k, col, acol, arow, lp, idx, pinv, xi, stack, pstack, mark);

        let reached = n - top;
        if lnz + reached + 1 > uptr {
            let used = lnz + (cap - uptr);
            let projected = (used + reached + 1).max(used.saturating_mul(n) / k.max(1));
            return Err(if real_room <= int_room {
                KError::FactorRealWorkspace {
                    required: Layout::real_header(n, ne) + projected,
                }
            } else {
                KError::FactorIntWorkspace {
                    required: Layout::int_header(n, ne) + projected,
                }
            });
        }

        // x = scaled A(:, col), then solve with the columns of L found by reach
        let cs = colsca[col];
        for p in acol[col]..acol[col + 1] {
            let i = arow[p];
            x[i] = aval[p].scale(rowsca[i] * cs);
            flops_assembly += 1.0;
        }
        for &j in xi[top..].iter() {
            let jl = pinv[j];
            if jl == NONE {
                continue;
            }
            let xj = x[j];
            for p in lp[jl] + 1..lp[jl + 1] {
                x[idx[p]] -= val[p] * xj;
            }
            flops_elimination += 2.0 * (lp[jl + 1] - lp[jl] - 1) as f64;
        }

        // pick the pivot; rows already pivoted go to U
        let mut ipiv = NONE;
        let mut amax = -T::Real::one();
        for &i in xi[top..].iter() {
            if pinv[i] == NONE {
                let t = x[i].modulus();
                if t > amax {
                    amax = t;
                    ipiv = i;
                }
            } else {
                uptr -= 1;
                idx[uptr] = pinv[i];
                val[uptr] = x[i];
            }
        }
        if ipiv == NONE || amax <= T::Real::zero() {
            return Err(KError::NumericallySingular { rank: k });
        }
        // a zero diagonal never passes, even with a zero threshold
        let diag = x[col].modulus();
        if pinv[col] == NONE && diag > T::Real::zero() && diag >= amax * tol {
            ipiv = col;
        }
        if ipiv != col {
            info.off_diagonal_pivots += 1;
        }

        let pivot = x[ipiv];
        uptr -= 1;
        idx[uptr] = k;
        val[uptr] = pivot;
        up[k + 1] = uptr;
        pinv[ipiv] = k;
        idx[lnz] = ipiv;
        val[lnz] = T::one();
        lnz += 1;
        for &i in xi[top..].iter() {
            if pinv[i] == NONE {
                idx[lnz] = i;
                val[lnz] = x[i] / pivot;
                lnz += 1;
                flops_division += 1.0;
            }
            x[i] = T::zero();
        }
    }
    lp[n] = lnz;
    for r in idx[..lnz].iter_mut() {
        *r = pinv[*r];
    }

    keep.lnz = lnz;
    keep.unz = cap - uptr;
    keep.cap = cap;
    keep.factorized = true;

    let factors = keep.lnz + keep.unz;
    info.real_factor_space = factors;
    info.int_factor_space = factors + 3 * n + 2;
    info.real_space_used = Layout::real_header(n, ne) + factors;
    info.int_space_used = Layout::int_header(n, ne) + factors;
    rinfo.flops_assembly = flops_assembly;
    rinfo.flops_elimination = flops_elimination;
    rinfo.flops_factorization = flops_assembly + flops_elimination + flops_division;
    Ok(())
}

/// Compressed column copy of the in-range entries, duplicates summed.
/// `w` is n-length scratch.
fn assemble<T: Scalar>(
    mat: &Triplets<'_, T>,
    acol: &mut [usize],
    arow: &mut [usize],
    aval: &mut [T],
    w: &mut [usize],
) {
    let n = mat.n;
    acol.fill(0);
    for (_, j, _) in mat.entries() {
        acol[j + 1] += 1;
    }
    for j in 0..n {
        acol[j + 1] += acol[j];
    }
    w.copy_from_slice(&acol[..n]);
    for (i, j, v) in mat.entries() {
        arow[w[j]] = i;
        aval[w[j]] = v;
        w[j] += 1;
    }

    w.fill(NONE);
    let mut nz = 0;
    let mut start = 0;
    for j in 0..n {
        let end = acol[j + 1];
        let q = nz;
        for p in start..end {
            let i = arow[p];
            if w[i] != NONE && w[i] >= q {
                let v = aval[p];
                aval[w[i]] += v;
            } else {
                w[i] = nz;
                arow[nz] = i;
                aval[nz] = aval[p];
                nz += 1;
            }
        }
        acol[j] = q;
        start = end;
    }
    acol[n] = nz;
}

/// Infinity and one norms of the unscaled matrix, kept for error statistics.
fn matrix_norms<T: Scalar>(acol: &[usize], arow: &[usize], aval: &[T], x: &mut [T], keep: &mut Keep) {
    let n = acol.len() - 1;
    x.fill(T::zero());
    let mut one = T::Real::zero();
    for j in 0..n {
        let mut colsum = T::Real::zero();
        for p in acol[j]..acol[j + 1] {
            let m = aval[p].modulus();
            colsum += m;
            x[arow[p]] += T::from_real(m);
        }
        one = one.max(colsum);
    }
    let inf = x.iter().fold(T::Real::zero(), |a, v| a.max(v.modulus()));
    keep.anorm_one = T::real_to_f64(one);
    keep.anorm_inf = T::real_to_f64(inf);
}

/// Row then column infinity-norm scaling. Empty rows or columns keep a
/// factor of one.
fn equilibrate<T: Scalar>(
    scaling: Scaling,
    acol: &[usize],
    arow: &[usize],
    aval: &[T],
    rowsca: &mut [T::Real],
    colsca: &mut [T::Real],
) {
    let one = T::Real::one();
    rowsca.fill(one);
    colsca.fill(one);
    if scaling == Scaling::None {
        return;
    }
    let n = colsca.len();
    rowsca.fill(T::Real::zero());
    for p in 0..acol[n] {
        let m = aval[p].modulus();
        if m > rowsca[arow[p]] {
            rowsca[arow[p]] = m;
        }
    }
    for r in rowsca.iter_mut() {
        *r = if *r > T::Real::zero() { one / *r } else { one };
    }
    for j in 0..n {
        let mut cmax = T::Real::zero();
        for p in acol[j]..acol[j + 1] {
            cmax = cmax.max(aval[p].modulus() * rowsca[arow[p]]);
        }
        colsca[j] = if cmax > T::Real::zero() { one / cmax } else { one };
    }
}

/// Nonzero pattern of column k of L \ A(:, col), in topological order in
/// `xi[top..n]`. Rows are marked with stamp k.
#[allow(clippy::too_many_arguments)]
fn reach(
    k: usize,
    col: usize,
    acol: &[usize],
    arow: &[usize],
    lp: &[usize],
    li: &[usize],
    pinv: &[usize],
    xi: &mut [usize],
    stack: &mut [usize],
    pstack: &mut [usize],
    mark: &mut [usize],
) -> usize {
    let mut top = xi.len();
    for p in acol[col]..acol[col + 1] {
        let root = arow[p];
        if mark[root] == k {
            continue;
        }
        let mut head = 0;
        stack[0] = root;
        loop {
            let j = stack[head];
            let jl = pinv[j];
            if mark[j] != k {
                mark[j] = k;
                pstack[head] = if jl == NONE { 0 } else { lp[jl] };
            }
            let end = if jl == NONE { 0 } else { lp[jl + 1] };
            let mut pushed = false;
            let mut q = pstack[head];
            while q < end {
                let i = li[q];
                q += 1;
                if mark[i] != k {
                    pstack[head] = q;
                    head += 1;
                    stack[head] = i;
                    pushed = true;
                    break;
                }
            }
            if !pushed {
                top -= 1;
                xi[top] = j;
                if head == 0 {
                    break;
                }
                head -= 1;
            }
        }
    }
    top
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assemble_sums_duplicates() {
        let irn = [1, 2, 1, 2];
        let jcn = [1, 1, 1, 2];
        let a = [1.0, 2.0, 3.0, 4.0];
        let mat = Triplets { n: 2, irn: &irn, jcn: &jcn, a: &a };
        let mut acol = [0; 3];
        let mut arow = [0; 4];
        let mut aval = [0.0; 4];
        let mut w = [0; 2];
        assemble(&mat, &mut acol, &mut arow, &mut aval, &mut w);
        assert_eq!(acol, [0, 2, 3]);
        assert_eq!(&arow[..3], &[0, 1, 1]);
        assert_eq!(&aval[..3], &[4.0, 2.0, 4.0]);
    }

    #[test]
    fn equilibrate_normalises_rows_and_columns() {
        // [[4, 0], [0, 0.5]]
        let acol = [0, 1, 2];
        let arow = [0, 1];
        let aval = [4.0f64, 0.5];
        let mut r = [0.0; 2];
        let mut c = [0.0; 2];
        equilibrate(Scaling::RowColumn, &acol, &arow, &aval, &mut r, &mut c);
        assert_eq!(r, [0.25, 2.0]);
        assert_eq!(c, [1.0, 1.0]);
        equilibrate(Scaling::None, &acol, &arow, &aval, &mut r, &mut c);
        assert_eq!(r, [1.0, 1.0]);
    }
}
