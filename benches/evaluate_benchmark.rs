use std::{path::Path, time::Duration};

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hmmtag::{
    corpus,
    evaluation::{evaluate, viterbi_decode},
    CorpusStats,
};

fn evaluate_benchmark(c: &mut Criterion) {
    let fpath = Path::new("tests/data/corpus.json");
    let sentences = corpus::read_corpus(fpath).expect("failed to read corpus");
    let stats = CorpusStats::from_corpus(&sentences);
    let vocab = stats.tag_set();

    for workers in [1, 4] {
        c.bench_function(&format!("evaluate/{workers}"), |b| {
            b.iter(|| evaluate(viterbi_decode, black_box(&sentences), &stats, &vocab, workers))
        });
    }
}

criterion_group! {
    name = benchmarks;
    config = Criterion::default().measurement_time(Duration::from_secs(10));
    targets = evaluate_benchmark
}

criterion_main!(benchmarks);
