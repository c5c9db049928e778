//! Benchmarks for per-frame classification.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use fingerspell_core::Landmark;
use fingerspell_recognizer::{
    extract_features, ClassificationPipeline, RecognizerConfig, RuleClassifier, TemplateSet,
    TemplateStore,
};

/// Upright hand with index and middle raised
fn create_test_hand() -> Vec<Landmark> {
    let mut landmarks = vec![Landmark::default(); 21];
    landmarks[0] = Landmark::new(0.5, 0.8, 0.0);
    landmarks[1] = Landmark::new(0.42, 0.76, 0.0);
    landmarks[2] = Landmark::new(0.38, 0.70, 0.0);
    landmarks[3] = Landmark::new(0.42, 0.71, 0.0);
    landmarks[4] = Landmark::new(0.47, 0.72, 0.0);

    let raised = [true, true, false, false];
    for (finger, x) in [0.44, 0.50, 0.56, 0.62].iter().enumerate() {
        let ys = if raised[finger] {
            [0.6, 0.54, 0.50, 0.46]
        } else {
            [0.6, 0.56, 0.585, 0.605]
        };
        for (joint, y) in ys.iter().enumerate() {
            landmarks[5 + finger * 4 + joint] = Landmark::new(*x, *y, 0.01 * joint as f64);
        }
    }
    landmarks
}

fn benchmark_features(c: &mut Criterion) {
    let hand = create_test_hand();

    c.bench_function("extract_features", |b| {
        b.iter(|| extract_features(black_box(&hand)))
    });

    let features = extract_features(&hand).unwrap();
    let rules = RuleClassifier::default();
    c.bench_function("rules_classify", |b| {
        b.iter(|| rules.classify(black_box(&features), black_box(&hand)))
    });
}

fn benchmark_templates(c: &mut Criterion) {
    let store = TemplateStore::with_templates(TemplateSet::seeded(), 0.45);
    let features = extract_features(&create_test_hand()).unwrap();

    c.bench_function("nearest_neighbor_seeded", |b| {
        b.iter(|| store.nearest_neighbor(black_box(&features)))
    });
}

fn benchmark_pipeline(c: &mut Criterion) {
    let hand = create_test_hand();
    let store = TemplateStore::with_templates(TemplateSet::seeded(), 0.45).into_shared();
    let mut pipeline = ClassificationPipeline::new(&RecognizerConfig::default(), store);

    c.bench_function("classify_frame", |b| {
        b.iter(|| pipeline.classify_frame(Some(black_box(hand.as_slice()))))
    });
}

criterion_group!(
    benches,
    benchmark_features,
    benchmark_templates,
    benchmark_pipeline
);
criterion_main!(benches);
