// APU Benchmarks
// Performance benchmarks for the per-cycle APU path

use criterion::{criterion_group, criterion_main, Criterion};
use nes_sound::apu::constants::CPU_CLOCK_HZ;
use nes_sound::Apu;
use std::hint::black_box;

/// APU with every channel enabled and sounding
fn sounding_apu() -> Apu {
    let mut apu = Apu::new();
    apu.write_register(0x15, 0x0F);
    let channels = [
        (0x00, 0xBF, 0x80),
        (0x04, 0x7F, 0x95),
        (0x08, 0xFF, 0x40),
        (0x0C, 0x3F, 0x04),
    ];
    for (base, control, period) in channels {
        apu.write_register(base, control);
        apu.write_register(base + 2, period);
        apu.write_register(base + 3, 0x08);
    }
    apu
}

/// Benchmark single APU cycles
fn bench_apu_cycles(c: &mut Criterion) {
    let mut group = c.benchmark_group("apu_cycles");

    group.bench_function("silent_cycle", |b| {
        let mut apu = Apu::new();

        b.iter(|| black_box(apu.produce_next_sample()));
    });

    group.bench_function("sounding_cycle", |b| {
        let mut apu = sounding_apu();

        b.iter(|| black_box(apu.produce_next_sample()));
    });

    group.finish();
}

/// Benchmark APU execution over longer spans
fn bench_apu_frames(c: &mut Criterion) {
    let mut group = c.benchmark_group("apu_frames");
    group.sample_size(20); // Reduce sample size for longer benchmarks

    group.bench_function("29830_cycles_one_frame", |b| {
        let mut apu = sounding_apu();

        b.iter(|| {
            let mut sum = 0i32;
            for _ in 0..29830 {
                sum += i32::from(apu.produce_next_sample());
            }
            black_box(sum)
        });
    });

    group.bench_function("one_second", |b| {
        let mut apu = sounding_apu();

        b.iter(|| {
            for _ in 0..CPU_CLOCK_HZ {
                apu.clock();
            }
            black_box(apu.output())
        });
    });

    group.finish();
}

/// Benchmark register writes
fn bench_register_writes(c: &mut Criterion) {
    c.bench_function("register_write_pulse_note", |b| {
        let mut apu = Apu::new();
        apu.write_register(0x15, 0x01);

        b.iter(|| {
            apu.write_register(black_box(0x00), 0xBF);
            apu.write_register(black_box(0x01), 0x00);
            apu.write_register(black_box(0x02), 0x80);
            apu.write_register(black_box(0x03), 0x08);
        });
    });
}

criterion_group!(
    benches,
    bench_apu_cycles,
    bench_apu_frames,
    bench_register_writes
);
criterion_main!(benches);
