//! End-to-end tests of the sparse direct adapter: load, factorize, solve.

mod common;

use approx::assert_abs_diff_eq;
use num_complex::Complex;
use rand::SeedableRng;
use rand::rngs::StdRng;
use sparsetool::utils::{norm_inf, residual_inf};
use sparsetool::{
    Control, CooMatrix, DirectSolver, KError, Ordering, Phase, Scaling, SparseLu, SparseMatrix,
    Status, Workspace,
};

fn solve_with(a: &CooMatrix<f64>, b: &[f64], transpose: bool) -> Vec<f64> {
    let mut lu = SparseLu::new();
    lu.load(a).unwrap();
    let mut x = vec![0.0; b.len()];
    lu.solve(b, &mut x, transpose).unwrap();
    x
}

#[test]
fn diagonal_two_by_two() {
    let mut lu = SparseLu::<f64>::new();
    lu.init(2);
    lu.insert(0, 0, 2.0);
    lu.insert(1, 1, 3.0);
    lu.setup(2, false).unwrap();
    let mut x = [0.0; 2];
    lu.solve(&[4.0, 9.0], &mut x, false).unwrap();
    assert_abs_diff_eq!(x[0], 2.0, epsilon = 1e-9);
    assert_abs_diff_eq!(x[1], 3.0, epsilon = 1e-9);
}

#[test]
fn identity_one_by_one_is_exact() {
    let a = CooMatrix::<f64>::identity(1);
    let x = solve_with(&a, &[0.7], false);
    assert_eq!(residual_inf(&a, &x, &[0.7], false), 0.0);
}

#[test]
fn random_systems_have_small_residuals() {
    let mut rng = StdRng::seed_from_u64(42);
    for &n in &[5, 20, 80] {
        let a = common::random_dominant(&mut rng, n, 4);
        let x_true = common::random_vec(&mut rng, n);
        let mut b = vec![0.0; n];
        a.spmv(&x_true, &mut b);
        let x = solve_with(&a, &b, false);
        assert!(residual_inf(&a, &x, &b, false) < 1e-10 * norm_inf(&b).max(1.0));
        for i in 0..n {
            assert_abs_diff_eq!(x[i], x_true[i], epsilon = 1e-8);
        }
    }
}

#[test]
fn out_of_range_insert_panics_without_mutation() {
    let mut lu = SparseLu::<f64>::new();
    lu.init(2);
    lu.insert(0, 0, 1.0);
    let r = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| lu.insert(2, 0, 1.0)));
    assert!(r.is_err());
    assert_eq!(lu.nnz(), 1);

    assert_eq!(
        lu.try_insert(0, 5, 1.0),
        Err(KError::IndexOutOfRange { row: 0, col: 5, n: 2 })
    );
    assert_eq!(lu.nnz(), 1);
}

#[test]
fn second_load_discards_first_matrix() {
    let mut rng = StdRng::seed_from_u64(7);
    let big = common::random_dominant(&mut rng, 10, 3);
    let small = CooMatrix::<f64>::identity(3);
    let mut lu = SparseLu::new();
    lu.load(&big).unwrap();
    lu.load(&small).unwrap();
    assert_eq!(lu.nnz(), 3);
    assert_eq!(lu.dimension(), 3);
    let mut x = [0.0; 3];
    lu.solve(&[1.0, 2.0, 3.0], &mut x, false).unwrap();
    assert_eq!(x, [1.0, 2.0, 3.0]);
}

#[test]
fn repeated_solves_obey_superposition() {
    let mut rng = StdRng::seed_from_u64(11);
    let n = 30;
    let a = common::random_dominant(&mut rng, n, 5);
    let b1 = common::random_vec(&mut rng, n);
    let b2 = common::random_vec(&mut rng, n);
    let b12: Vec<f64> = b1.iter().zip(&b2).map(|(p, q)| p + q).collect();

    let mut lu = SparseLu::new();
    lu.load(&a).unwrap();
    let flops = lu.rinfo().flops_factorization;
    let (mut x1, mut x2, mut x12) = (vec![0.0; n], vec![0.0; n], vec![0.0; n]);
    lu.solve(&b1, &mut x1, false).unwrap();
    lu.solve(&b2, &mut x2, false).unwrap();
    lu.solve(&b12, &mut x12, false).unwrap();
    assert_eq!(lu.rinfo().flops_factorization, flops);
    for i in 0..n {
        assert_abs_diff_eq!(x12[i], x1[i] + x2[i], epsilon = 1e-10);
    }
}

#[test]
fn workspace_never_shrinks_below_heuristic() {
    let a = common::laplacian_2d(6);
    let (n, nnz) = (36, a.values().len());
    let heuristic = 2 * nnz + 11 * n + 1;
    let mut lu = SparseLu::new();
    lu.load(&a).unwrap();
    let (is_len, s_len) = lu.workspace_sizes();
    assert!(is_len >= heuristic && s_len >= heuristic);
    assert!(is_len >= lu.info().min_int_workspace);
    assert!(s_len >= lu.info().min_real_workspace);
}

#[test]
fn transposed_solve_satisfies_transposed_system() {
    let mut rng = StdRng::seed_from_u64(3);
    let n = 25;
    let a = common::random_dominant(&mut rng, n, 4);
    let b = common::random_vec(&mut rng, n);
    let x = solve_with(&a, &b, true);
    assert!(residual_inf(&a, &x, &b, true) < 1e-10);

    let mut lu = SparseLu::new();
    lu.load(&a).unwrap();
    let mut y = b.clone();
    lu.solve_transpose_in_place(&mut y).unwrap();
    for i in 0..n {
        assert_abs_diff_eq!(x[i], y[i], epsilon = 1e-12);
    }
}

#[test]
fn structurally_singular_reports_rank() {
    // column 2 is empty
    let a = CooMatrix::from_triplets(3, 3, vec![0, 1, 2], vec![0, 1, 1], vec![1.0, 1.0, 1.0]).unwrap();
    let mut lu = SparseLu::new();
    let err = lu.load(&a).unwrap_err();
    assert_eq!(err.status(), Status::SingularMatrix { estimated_rank: 2 });
    assert_eq!(lu.info().status, -6);
}

#[test]
fn numerically_singular_reports_rank() {
    // third row = first + second
    let a = CooMatrix::from_triplets(
        3,
        3,
        vec![0, 0, 1, 1, 2, 2, 2],
        vec![0, 1, 1, 2, 0, 1, 2],
        vec![1.0, 1.0, 1.0, 1.0, 1.0, 2.0, 1.0],
    )
    .unwrap();
    let mut lu = SparseLu::new();
    let err = lu.load(&a).unwrap_err();
    assert!(matches!(err, KError::NumericallySingular { rank: 2 }));
    assert_eq!(lu.state(), Phase::Analyzed);
}

#[test]
fn zero_threshold_never_pivots_on_a_zero_diagonal() {
    // [[0, 1], [1, 0]]: the diagonal is absent, so both pivots are off it
    let a = CooMatrix::from_triplets(2, 2, vec![0, 1], vec![1, 0], vec![1.0, 1.0]).unwrap();
    let control = Control::default()
        .with_pivot_threshold(0.0)
        .with_ordering(Ordering::Natural)
        .with_scaling(Scaling::None);
    let mut lu = SparseLu::with_control(control);
    lu.load(&a).unwrap();
    assert_eq!(lu.info().off_diagonal_pivots, 2);
    let mut x = [0.0; 2];
    lu.solve(&[3.0, 5.0], &mut x, false).unwrap();
    assert_eq!(x, [5.0, 3.0]);
}

#[test]
fn factorize_retries_after_reserving_workspace() {
    // lower bandwidth two with a tiny diagonal: every pivot comes from two
    // rows down, so U grows past both the symmetric estimate and the
    // initial workspace
    let n = 10;
    let control = Control::default()
        .with_ordering(Ordering::Natural)
        .with_scaling(Scaling::None)
        .with_workspace_multiplier(1);
    let mut lu = SparseLu::<f64>::with_control(control);
    lu.init(n);
    for j in 0..n {
        if j > 0 {
            lu.insert(j - 1, j, 1.0);
        }
        lu.insert(j, j, 1e-3);
        if j + 1 < n {
            lu.insert(j + 1, j, 3.0);
        }
        if j + 2 < n {
            lu.insert(j + 2, j, 9.0);
        }
    }
    lu.analyze().unwrap();

    let mut retries = 0;
    loop {
        let r = lu.factorize();
        match Status::of(&r) {
            Status::Ok => break,
            Status::NeedsMoreWorkspace { workspace, required } => {
                assert_eq!(lu.state(), Phase::Analyzed);
                lu.reserve_workspace(workspace, required).unwrap();
                retries += 1;
                assert!(retries < 20, "workspace never converged");
            }
            other => panic!("unexpected status {other:?}"),
        }
    }
    assert!(retries >= 1);
    assert_eq!(lu.state(), Phase::Factorized);
    assert!(lu.info().off_diagonal_pivots > 0);

    // row sums of A, so x = 1
    let mut b = vec![0.0; n];
    for (i, bi) in b.iter_mut().enumerate() {
        *bi = 1e-3
            + if i + 1 < n { 1.0 } else { 0.0 }
            + if i >= 1 { 3.0 } else { 0.0 }
            + if i >= 2 { 9.0 } else { 0.0 };
    }
    lu.solve_in_place(&mut b).unwrap();
    for v in b {
        assert_abs_diff_eq!(v, 1.0, epsilon = 1e-8);
    }
}

#[test]
fn reserve_workspace_rejects_the_ceiling() {
    let mut lu = SparseLu::<f64>::with_control(Control::default().with_memory_limit(1 << 16));
    lu.load(&CooMatrix::identity(2)).unwrap();
    let err = lu.reserve_workspace(Workspace::Real, 1 << 20).unwrap_err();
    assert_eq!(err.status(), Status::Fatal);
}

#[test]
fn solve_before_factorize_is_an_invalid_sequence() {
    let mut lu = SparseLu::<f64>::new();
    let mut x = [0.0];
    assert!(matches!(
        lu.solve(&[1.0], &mut x, false),
        Err(KError::InvalidJobSequence { .. })
    ));
    lu.init(1);
    lu.insert(0, 0, 1.0);
    lu.analyze().unwrap();
    assert_eq!(lu.solve(&[1.0], &mut x, false).unwrap_err().code(), -3);
}

#[test]
fn solve_multiple_matches_single_solves() {
    let mut rng = StdRng::seed_from_u64(5);
    let n = 40;
    let a = common::random_dominant(&mut rng, n, 3);
    let mut lu = SparseLu::new();
    lu.load(&a).unwrap();
    let rhs: Vec<Vec<f64>> = (0..6).map(|_| common::random_vec(&mut rng, n)).collect();
    for transpose in [false, true] {
        let mut many = rhs.clone();
        lu.solve_multiple(&mut many, transpose).unwrap();
        for (b, x) in rhs.iter().zip(&many) {
            let mut y = vec![0.0; n];
            lu.solve(b, &mut y, transpose).unwrap();
            for i in 0..n {
                assert_abs_diff_eq!(x[i], y[i], epsilon = 1e-12);
            }
        }
    }
}

#[test]
fn complex_system() {
    // [[2+i, 1], [0, 1-i]] x = b with x = [1, i]
    let a = CooMatrix::from_triplets(
        2,
        2,
        vec![0, 0, 1],
        vec![0, 1, 1],
        vec![Complex::new(2.0, 1.0), Complex::new(1.0, 0.0), Complex::new(1.0, -1.0)],
    )
    .unwrap();
    let x_true = [Complex::new(1.0, 0.0), Complex::new(0.0, 1.0)];
    let mut b = [Complex::new(0.0, 0.0); 2];
    a.spmv(&x_true, &mut b);
    let mut lu = SparseLu::<Complex<f64>>::new();
    lu.load(&a).unwrap();
    let mut x = [Complex::new(0.0, 0.0); 2];
    lu.solve(&b, &mut x, false).unwrap();
    for i in 0..2 {
        assert_abs_diff_eq!(x[i].re, x_true[i].re, epsilon = 1e-12);
        assert_abs_diff_eq!(x[i].im, x_true[i].im, epsilon = 1e-12);
    }
}
