//! Matrix generators shared by the integration tests.
//!
//! Every generator takes the random source explicitly so each test owns a
//! seeded, reproducible stream.

#![allow(dead_code)]

use rand::Rng;
use rand::rngs::StdRng;
use sparsetool::CooMatrix;

/// Random `n x n` matrix with about `per_row` off-diagonal entries per row
/// and a strictly dominant diagonal.
pub fn random_dominant(rng: &mut StdRng, n: usize, per_row: usize) -> CooMatrix<f64> {
    let mut a = CooMatrix::with_capacity(n, n, n * (per_row + 1));
    for i in 0..n {
        let mut row_sum = 0.0;
        for _ in 0..per_row {
            let j = rng.gen_range(0..n);
            if j == i {
                continue;
            }
            let v: f64 = rng.gen_range(-1.0..1.0);
            row_sum += v.abs();
            a.push(i, j, v);
        }
        a.push(i, i, row_sum + rng.gen_range(1.0..2.0));
    }
    a
}

/// 5-point Laplacian on an `m x m` grid.
pub fn laplacian_2d(m: usize) -> CooMatrix<f64> {
    let n = m * m;
    let mut a = CooMatrix::with_capacity(n, n, 5 * n);
    for r in 0..m {
        for c in 0..m {
            let k = r * m + c;
            a.push(k, k, 4.0);
            if r > 0 {
                a.push(k, k - m, -1.0);
            }
            if r + 1 < m {
                a.push(k, k + m, -1.0);
            }
            if c > 0 {
                a.push(k, k - 1, -1.0);
            }
            if c + 1 < m {
                a.push(k, k + 1, -1.0);
            }
        }
    }
    a
}

pub fn random_vec(rng: &mut StdRng, n: usize) -> Vec<f64> {
    (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect()
}
