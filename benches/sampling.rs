//! Benchmarks for the capture cycle and value formatting
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rtscope::acquire::{run_cycle, AcquisitionContext};
use rtscope::codec;
use rtscope::directory::sim::{SimDirectory, SimPattern};
use rtscope::types::{Direction, SourceKind, TriggerMode, TypedValue, ValueType};

fn capture_directory(channels: usize) -> (SimDirectory, Vec<rtscope::types::DirectoryHandle>) {
    let directory = SimDirectory::new();
    let handles = (0..channels)
        .map(|i| {
            let handle = directory.add_entry(
                format!("bench.chan{}", i),
                SourceKind::Pin,
                ValueType::Float,
                Direction::Out,
            );
            directory.set_pattern(
                handle,
                SimPattern::Sine {
                    frequency: 1.0 + i as f64,
                    amplitude: 1.0,
                    offset: 0.0,
                },
            );
            handle
        })
        .collect();
    (directory, handles)
}

fn bench_capture_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("capture_cycle");
    group.throughput(Throughput::Elements(1));

    for channels in [1usize, 4, 16] {
        let (mut directory, handles) = capture_directory(channels);
        let mut ctx = AcquisitionContext::new(channels, 100_000);
        for (i, handle) in handles.iter().enumerate() {
            ctx.channels.configure(i, *handle, SourceKind::Pin);
        }
        ctx.trigger.run(TriggerMode::Capturing, 0.0, 0.0);

        group.bench_with_input(
            BenchmarkId::from_parameter(channels),
            &channels,
            |b, _| {
                b.iter(|| {
                    run_cycle(black_box(&mut ctx), &mut directory);
                    if ctx.ring.len() + channels > 100_000 {
                        ctx.ring.reset();
                        ctx.trigger.run(TriggerMode::Capturing, 0.0, 0.0);
                    }
                });
            },
        );
    }
    group.finish();
}

fn bench_format_value(c: &mut Criterion) {
    let mut group = c.benchmark_group("format_value");
    let values = [
        ("bit", TypedValue::Bit(true)),
        ("float", TypedValue::Float(3.14159265)),
        ("s32", TypedValue::Signed32(-123456)),
        ("u32", TypedValue::Unsigned32(0xDEADBEEF)),
    ];
    for (name, value) in values {
        group.bench_function(name, |b| {
            b.iter(|| codec::format_value(black_box(&value)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_capture_cycle, bench_format_value);
criterion_main!(benches);
