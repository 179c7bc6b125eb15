//! Benchmarks for the die-line engine
//!
//! Run with: cargo bench -p cartonkit-dieline

use cartonkit_core::{AllowanceTable, FluteCatalogue};
use cartonkit_dieline::rsc::flaps::propagate_gaps;
use cartonkit_dieline::{BoxSpec, DesignRequest, DieLineEngine, GapConfig, GapEdit};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

fn bench_design(c: &mut Criterion) {
    let table = AllowanceTable::standard();
    let flutes = FluteCatalogue::standard();
    let engine = DieLineEngine::new(&table, &flutes);

    let mut group = c.benchmark_group("dieline/design");
    for (name, l, w, h) in [
        ("small", 150.0, 100.0, 80.0),
        ("medium", 400.0, 300.0, 250.0),
        ("large", 1200.0, 800.0, 900.0),
    ] {
        let request = DesignRequest {
            spec: BoxSpec::new(l, w, h, 3.0),
            ..DesignRequest::default()
        };
        group.bench_with_input(BenchmarkId::new("rsc", name), &request, |b, request| {
            b.iter(|| black_box(engine.design(request)))
        });
    }
    group.finish();
}

fn bench_gap_edit(c: &mut Criterion) {
    let gaps = GapConfig::default().with_edit(GapEdit::BotOuter, 6.0);
    c.bench_function("dieline/propagate_gaps", |b| {
        b.iter(|| black_box(propagate_gaps(black_box(&gaps), -147.0)))
    });
}

criterion_group!(benches, bench_design, bench_gap_edit);
criterion_main!(benches);
