//! Criterion benchmarks for arbor-tree: induction and batch prediction.

use criterion::{Criterion, criterion_group, criterion_main};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use arbor_tree::{Algorithm, CartPartition, Dataset, Row, TreeConfig, Value, predict_batch};

fn make_categorical(n_samples: usize, n_features: usize, arity: u32, seed: u64) -> Vec<Row> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n_samples)
        .map(|_| {
            let values: Vec<u32> = (0..n_features).map(|_| rng.gen_range(0..arity)).collect();
            let mut row: Row = values
                .iter()
                .enumerate()
                .map(|(f, v)| (format!("f{f}"), Value::Int(i64::from(*v))))
                .collect();
            let label = (values[0] + values[1]) % 3;
            row.insert("label".into(), Value::Int(i64::from(label)));
            row.insert("y".into(), Value::Float(f64::from(values[0]) * 1.5 + rng.r#gen::<f64>()));
            row
        })
        .collect()
}

fn names(n_features: usize) -> Vec<String> {
    (0..n_features).map(|f| format!("f{f}")).collect()
}

fn bench_id3(c: &mut Criterion) {
    let rows = make_categorical(1000, 8, 4, 42);
    let data = Dataset::from_rows(&rows, "label", &names(8)).unwrap();
    let cfg = TreeConfig::new(Algorithm::Id3);

    c.bench_function("id3_1000x8_arity4", |b| {
        b.iter(|| cfg.fit(&data, &names(8)).unwrap());
    });
}

fn bench_cart_binary(c: &mut Criterion) {
    let rows = make_categorical(500, 6, 4, 42);
    let data = Dataset::from_rows(&rows, "label", &names(6)).unwrap();
    let cfg = TreeConfig::new(Algorithm::Cart).with_cart_partition(CartPartition::Binary);

    c.bench_function("cart_binary_500x6_arity4", |b| {
        b.iter(|| cfg.fit(&data, &names(6)).unwrap());
    });
}

fn bench_regression(c: &mut Criterion) {
    let rows = make_categorical(1000, 8, 4, 42);
    let data = Dataset::from_rows(&rows, "y", &names(8)).unwrap();
    let cfg = TreeConfig::new(Algorithm::Regression).with_max_depth(4);

    c.bench_function("regression_1000x8_depth4", |b| {
        b.iter(|| cfg.fit(&data, &names(8)).unwrap());
    });
}

fn bench_predict_batch(c: &mut Criterion) {
    let rows = make_categorical(1000, 8, 4, 42);
    let data = Dataset::from_rows(&rows, "label", &names(8)).unwrap();
    let tree = TreeConfig::new(Algorithm::Id3).fit(&data, &names(8)).unwrap();

    c.bench_function("predict_batch_1000", |b| {
        b.iter(|| predict_batch(&tree, &rows));
    });
}

criterion_group!(
    benches,
    bench_id3,
    bench_cart_binary,
    bench_regression,
    bench_predict_batch
);
criterion_main!(benches);
