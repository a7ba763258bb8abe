use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use shardnet::*;
use std::time::Duration;

fn bench_route_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("routing");
    group.bench_function("route_index_1k", |b| {
        b.iter(|| {
            let mut acc = 0usize;
            for id in 0..1000u64 {
                acc += route_index(black_box(id), 16);
            }
            black_box(acc)
        });
    });
    group.finish();
}

fn bench_queue_and_arm(c: &mut Criterion) {
    let cfg = EngineConfig {
        shard_count: 1,
        role: SocketRole::Listen,
        wait_error_backoff: Duration::from_millis(5),
        ..Default::default()
    };
    let registry = ConnectionRegistry::new(&cfg).expect("registry");
    // A listening socket never becomes writable, so sends stay queued and
    // every iteration after the first takes the already-armed fast path.
    let info = registry.build_connection(1, "127.0.0.1", 1).expect("connection");
    let payload = Bytes::from_static(&[0u8; 512]);

    let mut group = c.benchmark_group("send");
    group.bench_function("queue_armed", |b| {
        b.iter(|| {
            registry
                .send_data(info.fd, info.identity, black_box(payload.clone()))
                .expect("send")
        });
    });
    group.finish();
}

criterion_group!(benches, bench_route_index, bench_queue_and_arm);
criterion_main!(benches);
