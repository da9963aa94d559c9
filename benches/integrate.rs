use criterion::{Criterion, black_box, criterion_group, criterion_main};
use numint::{ODEMethod, ODEOptions, OdeintOptions, QuadOptions, dblquad, odeint, quad, solve_ivp};

fn bench_quad_oscillatory(c: &mut Criterion) {
    let opts = QuadOptions::default();
    c.bench_function("quad_oscillatory", |b| {
        b.iter(|| quad(|x: f64| (10.0 * x).sin() * (-x).exp(), 0.0, black_box(10.0), &opts).unwrap())
    });
}

fn bench_quad_infinite(c: &mut Criterion) {
    let opts = QuadOptions::default();
    c.bench_function("quad_gaussian_infinite", |b| {
        b.iter(|| {
            quad(
                |x: f64| (-x * x).exp(),
                black_box(f64::NEG_INFINITY),
                f64::INFINITY,
                &opts,
            )
            .unwrap()
        })
    });
}

fn bench_dblquad_disk(c: &mut Criterion) {
    let opts = QuadOptions::default();
    c.bench_function("dblquad_disk", |b| {
        b.iter(|| {
            dblquad(
                |y: f64, x: f64| x * x + y * y,
                -1.0,
                black_box(1.0),
                |x| -(1.0 - x * x).max(0.0).sqrt(),
                |x| (1.0 - x * x).max(0.0).sqrt(),
                &opts,
            )
            .unwrap()
        })
    });
}

fn bench_solve_ivp_oscillator(c: &mut Criterion) {
    let y0 = [1.0, 0.0];
    let period = 2.0 * std::f64::consts::PI;

    for method in [ODEMethod::RK23, ODEMethod::RK45, ODEMethod::RK4] {
        let opts = ODEOptions::with_tolerances(1e-8, 1e-10).method(method);
        c.bench_function(&format!("solve_ivp_oscillator_{:?}", method), |b| {
            b.iter(|| {
                solve_ivp(
                    |_t, y: &[f64]| vec![y[1], -y[0]],
                    [0.0, period],
                    black_box(&y0),
                    &opts,
                )
                .unwrap()
            })
        });
    }
}

fn bench_odeint_grid(c: &mut Criterion) {
    let grid: Vec<f64> = (0..=200).map(|i| i as f64 * 0.05).collect();
    let y0 = [2.0, 0.0];

    // Van der Pol, mu = 1
    let vdp = |y: &[f64], _t: f64| vec![y[1], (1.0 - y[0] * y[0]) * y[1] - y[0]];

    c.bench_function("odeint_van_der_pol_fixed", |b| {
        b.iter(|| odeint(vdp, black_box(&y0), &grid, &OdeintOptions::default()).unwrap())
    });
    c.bench_function("odeint_van_der_pol_adaptive", |b| {
        let opts = OdeintOptions::with_tolerances(1e-8, 1e-8);
        b.iter(|| odeint(vdp, black_box(&y0), &grid, &opts).unwrap())
    });
}

criterion_group!(
    benches,
    bench_quad_oscillatory,
    bench_quad_infinite,
    bench_dblquad_disk,
    bench_solve_ivp_oscillator,
    bench_odeint_grid,
);
criterion_main!(benches);
