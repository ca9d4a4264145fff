use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use ionocond::grid::align::{Table, align_tables, canonical_sort};
use ionocond::grid::generator::GridAxes;
use ionocond::models::inputs::CompositionUnit;
use ionocond::models::reference::reference_problem_def;
use ionocond::physics::conductivity::ConductivityField;
use ionocond::physics::constants::PhysicalConstants;
use ionocond::pipeline;

/// Latitude step [deg] per problem size; smaller steps give more keys.
fn problem_sizes() -> Vec<u32> {
    vec![20, 10, 5]
}

fn axes(lat_step: u32) -> GridAxes {
    let step = lat_step as f64;
    GridAxes::from_ranges(
        vec![0, 3600],
        (80.0, 500.0, 10.0),
        (-80.0, 80.0, step),
        (0.0, 340.0, 2.0 * step),
    )
}

fn bench_align(c: &mut Criterion) {
    let mut group = c.benchmark_group("align");
    for &size in &problem_sizes() {
        let inputs = reference_problem_def(&axes(size), CompositionUnit::Fraction).unwrap();
        let ne = Table::from_field(inputs.ionosphere.ne());
        let te = Table::from_field(inputs.ionosphere.te());
        let n2 = Table::from_field(inputs.neutrals.n2());
        let b = Table::from_field(inputs.magnetic.b());
        let keys = inputs.ionosphere.ne().len();
        group.bench_with_input(BenchmarkId::from_parameter(keys), &keys, |bch, &_| {
            bch.iter(|| {
                let table = align_tables(std::hint::black_box(&[&ne, &te, &n2, &b])).unwrap();
                std::hint::black_box(table);
            });
        });
    }
    group.finish();
}

fn bench_canonical_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("canonical_sort");
    for &size in &problem_sizes() {
        let inputs = reference_problem_def(&axes(size), CompositionUnit::Fraction).unwrap();
        // ionosphere rows come in reverse order
        let table = Table::from_field(inputs.ionosphere.ne());
        let keys = table.len();
        group.bench_with_input(BenchmarkId::from_parameter(keys), &keys, |b, &_| {
            b.iter(|| {
                let sorted = canonical_sort(std::hint::black_box(&table));
                std::hint::black_box(sorted);
            });
        });
    }
    group.finish();
}

fn bench_conductivity(c: &mut Criterion) {
    let mut group = c.benchmark_group("conductivity");
    let constants = PhysicalConstants::default();
    for &size in &problem_sizes() {
        let inputs = reference_problem_def(&axes(size), CompositionUnit::Fraction).unwrap();
        let aligned = pipeline::run(&inputs, &constants).unwrap().stages.aligned;
        let keys = aligned.len();
        group.bench_with_input(BenchmarkId::from_parameter(keys), &keys, |b, &_| {
            b.iter(|| {
                let cond =
                    ConductivityField::from_table(&constants, std::hint::black_box(&aligned))
                        .unwrap();
                std::hint::black_box(cond);
            });
        });
    }
    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    group.sample_size(20);
    let constants = PhysicalConstants::default();
    for &size in &problem_sizes() {
        let axes = axes(size);
        let keys = axes.num_keys();
        group.bench_with_input(BenchmarkId::from_parameter(keys), &keys, |b, &_| {
            b.iter_batched(
                || reference_problem_def(&axes, CompositionUnit::Fraction).unwrap(),
                |inputs| {
                    let out = pipeline::run(&inputs, &constants).unwrap();
                    std::hint::black_box(out.conductivity);
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_align,
    bench_canonical_sort,
    bench_conductivity,
    bench_pipeline
);
criterion_main!(benches);
