use criterion::{Criterion, black_box, criterion_group, criterion_main};
use sparsetool::{CooMatrix, DenseLu, DirectSolver, SparseLu};

fn laplacian_2d(m: usize) -> CooMatrix<f64> {
    let n = m * m;
    let mut a = CooMatrix::with_capacity(n, n, 5 * n);
    for k in 0..n {
        let (r, c) = (k / m, k % m);
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
    a
}

fn bench_sparse_vs_dense(c: &mut Criterion) {
    let a = laplacian_2d(16);
    let n = 256;
    let b: Vec<f64> = (0..n).map(|i| (i as f64).cos()).collect();
    let mut x = vec![0.0; n];

    c.bench_function("sparse LU factor+solve", |ben| {
        let mut solver = SparseLu::new();
        ben.iter(|| {
            solver.load(black_box(&a)).unwrap();
            solver.solve(black_box(&b), black_box(&mut x), false).unwrap();
        })
    });

    c.bench_function("dense LU factor+solve", |ben| {
        let mut solver = DenseLu::<f64>::new();
        ben.iter(|| {
            solver.load(black_box(&a)).unwrap();
            solver.solve(black_box(&b), black_box(&mut x), false).unwrap();
        })
    });

    let mut factored = SparseLu::new();
    factored.load(&a).unwrap();
    c.bench_function("sparse LU solve only", |ben| {
        ben.iter(|| factored.solve(black_box(&b), black_box(&mut x), false).unwrap())
    });
}

criterion_group!(benches, bench_sparse_vs_dense);
criterion_main!(benches);
