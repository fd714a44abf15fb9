use criterion::{criterion_group, criterion_main, Criterion};
use panorama::{
    dem::{ContinuousElevationModel, SyntheticElevationModel},
    math::{GeoPoint, Interval1D, Interval2D},
    PanoramaComputer, PanoramaParameters,
};

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

/// Sample indices of 7°E, 46°N.
const X0: i32 = 7 * 3600;
const Y0: i32 = 46 * 3600;

/// Rolling hills, a few hundred meters high, every couple of
/// kilometers.
fn hills(x: i32, y: i32) -> f64 {
    let (x, y) = (f64::from(x - X0) / 70.0, f64::from(y - Y0) / 50.0);
    600.0 + 300.0 * x.sin() * y.cos()
}

fn panorama(c: &mut Criterion) {
    let mut group = c.benchmark_group("Panorama");
    group.sample_size(10);

    let extent = Interval2D::new(
        Interval1D::new(X0 - 2_000, X0 + 2_000).unwrap(),
        Interval1D::new(Y0 - 2_000, Y0 + 2_000).unwrap(),
    );
    let dem = ContinuousElevationModel::new(SyntheticElevationModel::new(extent, hills));
    let computer = PanoramaComputer::builder().dem(dem).build().unwrap();
    let observer = GeoPoint::from_degrees(7.0, 46.0).unwrap();

    let params = PanoramaParameters::new(
        observer,
        1_200.0,
        0.0,
        60_f64.to_radians(),
        20_000.0,
        200,
        60,
    )
    .unwrap();
    group.bench_with_input("200x60", &params, |b, p| {
        b.iter(|| computer.compute_panorama(p).unwrap())
    });

    let params = params.supersampled(1).unwrap();
    group.bench_with_input("400x120", &params, |b, p| {
        b.iter(|| computer.compute_panorama(p).unwrap())
    });
}

criterion_group!(benches, panorama);
criterion_main!(benches);
