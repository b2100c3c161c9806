// Run with:  cargo bench --bench encode

use buse_framebuffer::buse128x19::{self, Frame, FRAME_BYTES, SURFACE_BYTES};
use buse_framebuffer::{encode, Snapshot};
use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::hint::black_box;

fn snapshot_with(pattern: u8) -> Snapshot<SURFACE_BYTES> {
    Snapshot::from_bytes([pattern; SURFACE_BYTES])
}

fn encode_frame(c: &mut Criterion) {
    let geometry = buse128x19::config()
        .geometry()
        .expect("reference geometry is valid");

    let mut group = c.benchmark_group("encode");
    group.throughput(Throughput::Bytes(FRAME_BYTES as u64));

    for (name, pattern) in [("blank", 0x00), ("checker", 0x55), ("full", 0xff)] {
        let snapshot = snapshot_with(pattern);
        group.bench_function(name, |b| {
            let mut frame = Frame::new();
            b.iter(|| {
                encode(black_box(&snapshot), &geometry, black_box(&mut frame));
            });
        });
    }

    group.finish();
}

criterion_group!(benches, encode_frame);
criterion_main!(benches);
