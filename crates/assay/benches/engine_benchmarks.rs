//! Rule engine, profiler and detector benchmarks.
//!
//! Measures each stage on synthetic order tables, then the full run.

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use std::io::Write;
use tempfile::NamedTempFile;

use assay::anomaly::{IsolationConfig, IsolationForest};
use assay::{
    AnomalyDetector, Assay, Dataset, Parser, Profiler, ReferenceKeys, RuleEngine, RuleRegistry,
};

/// Generate an orders CSV with a few invalid quantities and cost outliers.
fn generate_orders(rows: usize) -> String {
    let mut data = String::new();
    data.push_str(
        "order_id,supplier_id,order_quantity,order_cost,expected_delivery_date,actual_delivery_date\n",
    );

    for row in 0..rows {
        let quantity = if row % 97 == 0 { 0 } else { 1 + (row % 40) as i64 };
        let cost = if row % 250 == 0 {
            25_000.0
        } else {
            40.0 + (row % 60) as f64 * 2.5
        };
        let day = (row % 27) + 1;
        let delay = (row % 5) as i64 - 1;
        data.push_str(&format!(
            "{},{},{},{:.2},2024-03-{:02},2024-03-{:02}\n",
            row + 1,
            row % 12 + 1,
            quantity,
            cost,
            day,
            (day as i64 + delay).max(1)
        ));
    }

    data
}

fn orders_dataset(rows: usize) -> Dataset {
    Parser::new().parse_str(&generate_orders(rows)).unwrap()
}

/// Benchmark parsing with type inference.
fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    for rows in [100, 1_000, 10_000].iter() {
        let data = generate_orders(*rows);
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::new("orders_rows", rows), &data, |b, data| {
            b.iter_with_setup(
                || {
                    let mut temp = NamedTempFile::with_suffix(".csv").unwrap();
                    temp.write_all(data.as_bytes()).unwrap();
                    temp
                },
                |temp| black_box(Parser::new().parse_file(temp.path()).unwrap()),
            )
        });
    }

    group.finish();
}

/// Benchmark rule execution against the standard rules.
fn bench_rules(c: &mut Criterion) {
    let mut group = c.benchmark_group("rules");
    let registry = Arc::new(RuleRegistry::with_standard_rules().unwrap());

    for rows in [1_000, 10_000, 100_000].iter() {
        let ds = orders_dataset(*rows);
        group.throughput(Throughput::Elements(*rows as u64));
        group.bench_with_input(BenchmarkId::new("orders_rows", rows), &ds, |b, ds| {
            b.iter(|| {
                let mut engine = RuleEngine::new(Arc::clone(&registry));
                black_box(engine.execute(ds, "orders"))
            })
        });
    }

    group.finish();
}

/// Benchmark profiling and univariate outlier detection.
fn bench_profile_and_anomalies(c: &mut Criterion) {
    let mut group = c.benchmark_group("profile_and_anomalies");
    let ds = orders_dataset(10_000);

    group.bench_function("profile_10k", |b| {
        b.iter(|| black_box(Profiler::new().profile(&ds, "orders")))
    });
    group.bench_function("iqr_10k", |b| {
        b.iter(|| black_box(AnomalyDetector::new().analyze_table(&ds, "orders")))
    });

    group.finish();
}

/// Benchmark isolation forest scoring at different ensemble sizes.
fn bench_isolation_forest(c: &mut Criterion) {
    let mut group = c.benchmark_group("isolation_forest");
    group.sample_size(20);

    let points: Vec<Vec<f64>> = (0..5_000)
        .map(|i| vec![(i % 40) as f64, 40.0 + (i % 60) as f64 * 2.5])
        .collect();

    for trees in [10, 50, 100].iter() {
        let forest = IsolationForest::new(IsolationConfig {
            n_trees: *trees,
            ..IsolationConfig::default()
        });
        group.bench_with_input(BenchmarkId::new("trees", trees), &points, |b, points| {
            b.iter(|| black_box(forest.fit_predict(points)))
        });
    }

    group.finish();
}

/// Benchmark prepare plus assess for one table.
fn bench_full_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_run");
    group.sample_size(10);

    for rows in [1_000, 10_000].iter() {
        let ds = orders_dataset(*rows);
        group.bench_with_input(BenchmarkId::new("orders_rows", rows), &ds, |b, ds| {
            b.iter(|| {
                let mut assay = Assay::new().unwrap();
                black_box(assay.run([("orders", ds)], &ReferenceKeys::new()))
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_parse,
    bench_rules,
    bench_profile_and_anomalies,
    bench_isolation_forest,
    bench_full_run,
);
criterion_main!(benches);
