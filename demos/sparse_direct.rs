//! Solve a random sparse system with both adapters and report timings,
//! solution error and residual.
//!
//! Usage: `cargo run --example sparse_direct -- [n] [seed]`

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sparsetool::utils::{dist2, norm_inf, residual_inf};
use sparsetool::{Control, CooMatrix, DenseLu, DirectSolver, SparseLu, SparseMatrix, TicToc};

fn random_system(rng: &mut StdRng, n: usize) -> (CooMatrix<f64>, Vec<f64>) {
    let mut a = CooMatrix::with_capacity(n, n, 6 * n);
    for i in 0..n {
        let mut sum = 0.0;
        for _ in 0..5 {
            let j = rng.gen_range(0..n);
            if j != i {
                let v: f64 = rng.gen_range(-1.0..1.0);
                sum += v.abs();
                a.push(i, j, v);
            }
        }
        a.push(i, i, sum + 1.0);
    }
    let x: Vec<f64> = (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect();
    (a, x)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let n: usize = args.next().map(|s| s.parse()).transpose()?.unwrap_or(2000);
    let seed: u64 = args.next().map(|s| s.parse()).transpose()?.unwrap_or(1);
    let mut rng = StdRng::seed_from_u64(seed);

    let (a, x_true) = random_system(&mut rng, n);
    let mut b = vec![0.0; n];
    a.spmv(&x_true, &mut b);
    println!("n = {n}, nnz = {}", a.values().len());

    let mut tm = TicToc::new();
    let mut sparse = SparseLu::with_control(Control::default().with_error_stats(true));
    sparse.set_verbose(true);
    tm.tic();
    sparse.load(&a)?;
    tm.toc();
    println!("sparse setup    {:10.3} ms", tm.elapsed_ms());

    let mut x = vec![0.0; n];
    tm.tic();
    sparse.solve(&b, &mut x, false)?;
    tm.toc();
    println!("sparse solve    {:10.3} ms", tm.elapsed_ms());
    println!("  error    ‖x - x*‖₂ = {:.3e}", dist2(&x, &x_true));
    println!("  residual ‖b - Ax‖∞ = {:.3e}", residual_inf(&a, &x, &b, false));

    if n <= 3000 {
        let mut dense = DenseLu::<f64>::new();
        tm.tic();
        dense.load(&a)?;
        dense.solve(&b, &mut x, false)?;
        tm.toc();
        println!("dense factor+solve {:7.3} ms", tm.elapsed_ms());
        println!("  error    ‖x - x*‖₂ = {:.3e}", dist2(&x, &x_true));
        println!("  ‖x‖∞ = {:.3e}", norm_inf(&x));
    }
    Ok(())
}
