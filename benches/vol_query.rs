use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use ivsurf::surface::{Grid, SurfaceBuilder, VolSurface};
use ivsurf::SurfacePoint;

fn vol_query_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("query");

    let points: Vec<SurfacePoint> = (0..5)
        .flat_map(|e| {
            let t = 0.1 + 0.2 * e as f64;
            (0..50).map(move |i| {
                let k = -0.3 + 0.6 * i as f64 / 49.0;
                SurfacePoint::new(k, t, (0.04 - 0.04 * k + 0.12 * k * k + 0.01 * t).sqrt())
            })
        })
        .collect();
    let surface = SurfaceBuilder::new()
        .add_points(&points)
        .build()
        .expect("benchmark surface should fit");

    group.bench_function("black_vol_single", |b| {
        b.iter(|| surface.black_vol(black_box(0.05), black_box(0.4)));
    });

    let grid = Grid::from_points(&points, (5.0, 95.0), 80, 40).expect("valid benchmark grid");
    group.bench_function("evaluate_grid_80x40", |b| {
        b.iter(|| surface.evaluate_grid(black_box(&grid)));
    });

    group.bench_function("fit_error_250_points", |b| {
        b.iter(|| surface.fit_error(black_box(&points)).unwrap());
    });

    group.finish();
}

criterion_group!(benches, vol_query_benchmarks);
criterion_main!(benches);
