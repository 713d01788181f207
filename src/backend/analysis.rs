//! Analysis phase: ordering and symbolic size estimates.
//!
//! Integer workspace layout during analysis:
//! `[q: n | pcol: n+1 | prow: 2 ne + n | qinv | parent | ancestor | count | w]`
//! where the last five blocks have length n. Only `q` survives the phase.

use super::{Info, Keep, Layout, NONE, RealInfo, Triplets};
use crate::config::{Control, Ordering};
use crate::core::Scalar;
use crate::error::KError;

pub(super) fn analyze<T: Scalar>(
    mat: &Triplets<'_, T>,
    keep: &mut Keep,
    is: &mut [usize],
    control: &Control,
    info: &mut Info,
    rinfo: &mut RealInfo,
) -> Result<(), KError> {
    let n = mat.n;
    let ne = mat.ne();
    keep.analyzed = false;
    keep.factorized = false;

    if n < 1 {
        return Err(KError::InvalidDimension(n));
    }
    if ne < 1 || mat.irn.len() != ne || mat.jcn.len() != ne {
        return Err(KError::InvalidEntryCount(ne));
    }
    let required = Layout::analysis_int(n, ne);
    if is.len() < required {
        return Err(KError::AnalysisIntWorkspace { required });
    }

    let (q, rest) = is.split_at_mut(n);
    let (pcol, rest) = rest.split_at_mut(n + 1);
    let (prow, rest) = rest.split_at_mut(2 * ne + n);
    let (qinv, rest) = rest.split_at_mut(n);
    let (parent, rest) = rest.split_at_mut(n);
    let (ancestor, rest) = rest.split_at_mut(n);
    let (count, rest) = rest.split_at_mut(n);
    let w = &mut rest[..n];

    // structural rank check: every row and column needs an entry
    w.fill(0);
    let mut valid = 0usize;
    for (i, j, _) in mat.entries() {
        w[i] |= 1;
        w[j] |= 2;
        valid += 1;
    }
    info.ignored_entries = ne - valid;
    let rows = w.iter().filter(|&&f| f & 1 != 0).count();
    let cols = w.iter().filter(|&&f| f & 2 != 0).count();
    if rows < n || cols < n {
        return Err(KError::StructurallySingular {
            rank: rows.min(cols),
        });
    }

    // pattern of A + Aᵀ with a full diagonal, sorted and deduplicated per
    // column; amd needs at least n entries
    pcol.fill(0);
    for j in 0..n {
        pcol[j + 1] = 1;
    }
    for (i, j, _) in mat.entries() {
        if i != j {
            pcol[j + 1] += 1;
            pcol[i + 1] += 1;
        }
    }
    for j in 0..n {
        pcol[j + 1] += pcol[j];
    }
    count.copy_from_slice(&pcol[..n]);
    for j in 0..n {
        prow[count[j]] = j;
        count[j] += 1;
    }
    for (i, j, _) in mat.entries() {
        if i != j {
            prow[count[j]] = i;
            count[j] += 1;
            prow[count[i]] = j;
            count[i] += 1;
        }
    }
    let mut wp = 0;
    let mut old_start = 0;
    for j in 0..n {
        let old_end = pcol[j + 1];
        prow[old_start..old_end].sort_unstable();
        pcol[j] = wp;
        let mut last = NONE;
        for p in old_start..old_end {
            let i = prow[p];
            if i != last {
                prow[wp] = i;
                wp += 1;
                last = i;
            }
        }
        old_start = old_end;
    }
    pcol[n] = wp;

    match &control.ordering {
        Ordering::Natural => {
            for (k, qk) in q.iter_mut().enumerate() {
                *qk = k;
            }
        }
        Ordering::Given(perm) => {
            if perm.len() != n {
                return Err(KError::PermutationError(format!(
                    "permutation has length {}, expected {n}",
                    perm.len()
                )));
            }
            w.fill(0);
            for (k, &c) in perm.iter().enumerate() {
                if c >= n || w[c] != 0 {
                    return Err(KError::PermutationError(format!(
                        "entry {k} = {c} is out of range or repeated"
                    )));
                }
                w[c] = 1;
                q[k] = c;
            }
        }
        Ordering::Amd => {
            let amd_control = amd::Control::default();
            let (perm, _iperm, _info) = amd::order(n, &pcol[..], &prow[..wp], &amd_control)
                .map_err(|status| KError::PermutationError(format!("amd failed: {status:?}")))?;
            q.copy_from_slice(&perm);
        }
    }
    for (k, &c) in q.iter().enumerate() {
        qinv[c] = k;
    }

    // elimination tree of Qᵀ (A + Aᵀ) Q
    for k in 0..n {
        parent[k] = NONE;
        ancestor[k] = NONE;
        let col = q[k];
        for p in pcol[col]..pcol[col + 1] {
            let mut i = qinv[prow[p]];
            while i != NONE && i < k {
                let inext = ancestor[i];
                ancestor[i] = k;
                if inext == NONE {
                    parent[i] = k;
                }
                i = inext;
            }
        }
    }

    // column counts via row subtrees; ancestor is reused as the mark array
    let mark = ancestor;
    mark.fill(NONE);
    count.fill(0);
    for k in 0..n {
        mark[k] = k;
        count[k] += 1;
        let col = q[k];
        for p in pcol[col]..pcol[col + 1] {
            let mut j = qinv[prow[p]];
            if j >= k {
                continue;
            }
            while mark[j] != k {
                count[j] += 1;
                mark[j] = k;
                j = parent[j];
            }
        }
    }

    // fundamental supernodes: j extends the supernode of j - 1 when j - 1 is
    // the only child of j and the column count drops by exactly one
    w.fill(0);
    for &pj in parent.iter() {
        if pj != NONE {
            w[pj] += 1;
        }
    }
    let mut tree_nodes = 0;
    for j in 0..n {
        let merges = j > 0 && parent[j - 1] == j && count[j - 1] == count[j] + 1 && w[j] == 1;
        if !merges {
            tree_nodes += 1;
        }
    }

    let lnz: usize = count.iter().sum();
    let max_front = count.iter().copied().max().unwrap_or(0);
    let flops: f64 = count
        .iter()
        .map(|&c| {
            let c = (c - 1) as f64;
            c + 2.0 * c * c
        })
        .sum();

    keep.n = n;
    keep.ne = ne;
    keep.est_lnz = lnz;
    keep.est_unz = lnz;
    keep.analyzed = true;

    let factors = keep.est_lnz + keep.est_unz;
    info.real_factor_space = factors;
    info.int_factor_space = factors + 3 * n + 2;
    info.max_front_size = max_front;
    info.tree_nodes = tree_nodes;
    info.min_int_workspace = Layout::int_header(n, ne) + factors;
    info.min_real_workspace = Layout::real_header(n, ne) + factors;
    rinfo.estimated_flops = flops;
    Ok(())
}
