use benchmarks::{Bestiary, Metrics};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use forest_machine::{Machine, Trainer};
use std::hint::black_box;

/// Train a machine once for prediction benchmarks
fn train_machine_for_prediction(n_estimators: usize) -> (Machine, Bestiary) {
    let bestiary = Bestiary::generate(1000, 42).expect("Failed to generate bestiary");
    let machine = Trainer::builder()
        .n_estimators(n_estimators)
        .seed(42)
        .build()
        .expect("Invalid trainer settings")
        .fit(&bestiary.table)
        .expect("Failed to fit machine");
    (machine, bestiary)
}

fn bench_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("fit");
    group.sample_size(10);

    for n_rows in [100, 1000].iter() {
        let bestiary = Bestiary::generate(*n_rows, 7).expect("Failed to generate bestiary");
        let trainer = Trainer::builder()
            .n_estimators(50)
            .build()
            .expect("Invalid trainer settings");
        group.bench_with_input(BenchmarkId::new("rows", n_rows), &bestiary, |b, bestiary| {
            b.iter(|| {
                let machine = trainer.fit(black_box(&bestiary.table)).unwrap();
                black_box(machine);
            });
        });
    }
    group.finish();
}

fn bench_fit_trees(c: &mut Criterion) {
    let mut group = c.benchmark_group("fit_trees");
    group.sample_size(10);
    let bestiary = Bestiary::generate(500, 7).expect("Failed to generate bestiary");

    for n_estimators in [10, 100, 300].iter() {
        let trainer = Trainer::builder()
            .n_estimators(*n_estimators)
            .build()
            .expect("Invalid trainer settings");
        group.bench_with_input(
            BenchmarkId::new("n_estimators", n_estimators),
            n_estimators,
            |b, _| {
                b.iter(|| black_box(trainer.fit(black_box(&bestiary.table)).unwrap()));
            },
        );
    }
    group.finish();
}

fn bench_predict_single(c: &mut Criterion) {
    let (machine, _) = train_machine_for_prediction(300);
    let row = Bestiary::row(90.0, 40.0, 60.0, 20.0).expect("Failed to build row");

    c.bench_function("predict_single", |b| {
        b.iter(|| {
            let prediction = machine.predict(black_box(&row)).unwrap();
            black_box(prediction);
        });
    });
}

fn bench_predict_batch(c: &mut Criterion) {
    let (machine, bestiary) = train_machine_for_prediction(100);
    let predictions = machine
        .predict_batch(&bestiary.features)
        .expect("Failed to predict batch");
    let eval = Metrics::evaluate(&bestiary.labels, &predictions, "Rare");
    println!(
        "training accuracy: {:.3}, mean confidence: {:.3}, Rare precision: {:.3}, Rare recall: {:.3}",
        eval.accuracy, eval.mean_confidence, eval.class.precision, eval.class.recall
    );

    c.bench_function("predict_batch_1000", |b| {
        b.iter(|| {
            let predictions = machine.predict_batch(black_box(&bestiary.features)).unwrap();
            black_box(predictions);
        });
    });
}

fn bench_save_open(c: &mut Criterion) {
    let (machine, _) = train_machine_for_prediction(100);
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("bench.machine");

    c.bench_function("save", |b| {
        b.iter(|| machine.save(black_box(&path)).unwrap());
    });
    c.bench_function("open", |b| {
        b.iter(|| black_box(Machine::open(black_box(&path)).unwrap()));
    });
}

criterion_group!(
    benches,
    bench_fit,
    bench_fit_trees,
    bench_predict_single,
    bench_predict_batch,
    bench_save_open
);
criterion_main!(benches);
