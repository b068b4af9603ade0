//! Benchmarks for pipeline construction and sends.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fanpipe::callable::{FnCallable, Handle};
use fanpipe::events::NoOpEventSink;
use fanpipe::pipeline::{Pipeline, PipelineBuilder};
use fanpipe::types::Value;
use std::sync::Arc;

fn stages(count: usize) -> Vec<Handle> {
    (0..count)
        .map(|i| FnCallable::unary(format!("inc_{i}"), |n: i64| n + 1).into())
        .collect()
}

fn pipeline(stage_count: usize, subscriber_count: usize) -> Pipeline {
    let mut builder = PipelineBuilder::new("bench")
        .event_sink(Arc::new(NoOpEventSink))
        .stages(stages(stage_count));
    for i in 0..subscriber_count {
        builder = builder.subscriber(FnCallable::unary(format!("sink_{i}"), |n: i64| {
            black_box(n);
        }));
    }
    builder.build().expect("bench pipeline is well-typed")
}

fn construct_benchmark(c: &mut Criterion) {
    c.bench_function("construct_10_stages", |b| {
        b.iter(|| Pipeline::construct(black_box(stages(10))))
    });
}

fn send_benchmark(c: &mut Criterion) {
    let small = pipeline(3, 1);
    c.bench_function("send_3_stages_1_subscriber", |b| {
        b.iter(|| small.send(black_box(vec![Value::I64(1)])))
    });

    let wide = pipeline(10, 10);
    c.bench_function("send_10_stages_10_subscribers", |b| {
        b.iter(|| wide.send(black_box(vec![Value::I64(1)])))
    });

    let widening = pipeline(1, 1);
    c.bench_function("send_with_widening", |b| {
        b.iter(|| widening.send(black_box(vec![Value::U8(1)])))
    });
}

criterion_group!(benches, construct_benchmark, send_benchmark);
criterion_main!(benches);
