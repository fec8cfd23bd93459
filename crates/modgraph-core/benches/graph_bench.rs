//! Criterion benchmarks for the signal graph engine (`modgraph-core`).
//!
//! Three axes:
//!
//! - **Evaluate**: one memoized pass over chains and fan-out graphs
//! - **Render**: `Renderer::process()` throughput at varying block sizes
//! - **Reconcile**: diffing a one-edit snapshot against a 64-node baseline
//!
//! Run with: `cargo bench -p modgraph-core -- graph/`
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use modgraph_core::{Command, Evaluator, GraphDescription, GraphStore, ModuleKind, Renderer};

const SAMPLE_RATE: f64 = 48000.0;
const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512, 1024];

// ---------------------------------------------------------------------------
// Graph constructors
// ---------------------------------------------------------------------------

/// Const → n oscillators in series (each driving the next's frequency) → Out.
fn linear(n: usize) -> GraphDescription {
    let mut description = GraphDescription::new()
        .with_node("freq", ModuleKind::Constant, "220")
        .with_node("out", ModuleKind::Output, "");
    let mut prev = "freq".to_string();
    for i in 0..n {
        let id = format!("osc{i}");
        let kind = if i % 2 == 0 {
            ModuleKind::Sine
        } else {
            ModuleKind::Triangle
        };
        description = description
            .with_node(id.clone(), kind, "")
            .with_connection(format!("{prev}-output-0"), format!("{id}-input-0"));
        prev = id;
    }
    description.with_connection(format!("{prev}-output-0"), "out-input-0")
}

/// One oscillator fanned out into a balanced tree of `Add` nodes.
fn fan_out(leaves: usize) -> GraphDescription {
    let mut description = GraphDescription::new()
        .with_node("freq", ModuleKind::Constant, "110")
        .with_node("osc", ModuleKind::Sawtooth, "")
        .with_node("out", ModuleKind::Output, "")
        .with_connection("freq-output-0", "osc-input-0");
    let mut level: Vec<String> = vec!["osc".to_string(); leaves];
    let mut next_id = 0;
    while level.len() > 1 {
        let mut next = Vec::with_capacity(level.len().div_ceil(2));
        for pair in level.chunks(2) {
            let id = format!("add{next_id}");
            next_id += 1;
            description = description.with_node(id.clone(), ModuleKind::Add, "");
            for (port, source) in pair.iter().enumerate() {
                description = description
                    .with_connection(format!("{source}-output-0"), format!("{id}-input-{port}"));
            }
            next.push(id);
        }
        level = next;
    }
    description.with_connection(format!("{}-output-0", level[0]), "out-input-0")
}

fn compiled(description: &GraphDescription) -> GraphStore {
    let mut store = GraphStore::new();
    store.compile(description);
    store
}

// ---------------------------------------------------------------------------
// Evaluate benchmarks
// ---------------------------------------------------------------------------

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph/evaluate");

    for n in [5, 20, 100] {
        let store = compiled(&linear(n));
        let mut evaluator = Evaluator::new();
        group.bench_with_input(BenchmarkId::new("linear", n), &n, |b, _| {
            let mut t = 0.0;
            b.iter(|| {
                t += 1.0 / SAMPLE_RATE;
                black_box(evaluator.evaluate(&store, black_box(t)));
            });
        });
    }

    for leaves in [8, 64] {
        let store = compiled(&fan_out(leaves));
        let mut evaluator = Evaluator::new();
        group.bench_with_input(BenchmarkId::new("fan_out", leaves), &leaves, |b, _| {
            b.iter(|| black_box(evaluator.evaluate(&store, black_box(0.25))));
        });
    }

    group.finish();
}

// ---------------------------------------------------------------------------
// Render benchmarks
// ---------------------------------------------------------------------------

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph/render");

    for &block_size in BLOCK_SIZES {
        let mut renderer = Renderer::new(SAMPLE_RATE);
        renderer.handle(Command::PushGraph(linear(20)));
        let mut buffer = vec![0.0_f32; block_size * 2];
        group.bench_with_input(
            BenchmarkId::new("linear_20_stereo", block_size),
            &block_size,
            |b, _| {
                b.iter(|| {
                    renderer.process(&mut buffer, 2);
                    black_box(&buffer);
                });
            },
        );
    }

    group.finish();
}

// ---------------------------------------------------------------------------
// Reconcile benchmarks
// ---------------------------------------------------------------------------

fn bench_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph/reconcile");

    let base = linear(64);
    let edited = base.clone().with_node("freq", ModuleKind::Constant, "330");

    group.bench_function("linear_64_content_edit", |b| {
        let mut renderer = Renderer::new(SAMPLE_RATE);
        renderer.reconcile(base.clone());
        let mut flip = false;
        b.iter(|| {
            flip = !flip;
            let next = if flip { edited.clone() } else { base.clone() };
            black_box(renderer.reconcile(next));
        });
    });

    group.bench_function("linear_64_cycle_check", |b| {
        let store = compiled(&base);
        b.iter(|| black_box(store.detect_cycle()));
    });

    group.finish();
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

criterion_group!(benches, bench_evaluate, bench_render, bench_reconcile);
criterion_main!(benches);
