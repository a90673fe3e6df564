use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use isitup::{
    CheckStore, EndpointRecord, ProbeResult, Prober, Settings, SqliteStore, run_checks,
    schedule,
};
use std::hint::black_box;
use std::time::Duration;

fn record(last_up: i64, last_check: i64) -> EndpointRecord {
    EndpointRecord {
        id: 1,
        host: "127.0.0.1".to_string(),
        port: 1,
        resource: "http://127.0.0.1:1/".to_string(),
        last_up,
        last_check,
    }
}

fn due_check_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("due_check");
    let settings = Settings::default();

    // Up, between routine checks (skip path)
    let up = record(1000, 1000);
    group.bench_function("recently_up", |b| {
        b.iter(|| black_box(schedule::due_reason(&settings, black_box(1050), &up)))
    });

    // Down long enough for the fast cadence
    let down = record(0, 1300);
    group.bench_function("down_recheck", |b| {
        b.iter(|| black_box(schedule::due_reason(&settings, black_box(1400), &down)))
    });

    group.bench_function("countdown", |b| {
        b.iter(|| black_box(schedule::countdown_due(&settings, black_box(1050), &up)))
    });

    group.finish();
}

/// Prober that never touches the network
struct InstantProber;

#[async_trait::async_trait]
impl Prober for InstantProber {
    async fn connect(&self, _host: &str, _port: u16) -> ProbeResult {
        ProbeResult::unreachable(Duration::ZERO, "benchmark")
    }

    async fn fetch(&self, _resource: &str) -> ProbeResult {
        ProbeResult::reachable(Duration::ZERO)
    }
}

fn run_overhead_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("run_overhead");
    group.sample_size(10); // Each iteration writes to SQLite

    for count in [1, 10, 100].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            let store = SqliteStore::open_in_memory().unwrap();
            store.initialize().unwrap();
            for i in 0..count {
                store
                    .add(&format!("host{}", i), 80, "http://127.0.0.1:1/")
                    .unwrap();
            }
            let settings = Settings::default();
            let mut now = 1_000_000;

            b.iter(|| {
                // Advance past the check interval so every record is due
                now += 1000;
                rt.block_on(async {
                    black_box(run_checks(&store, &InstantProber, &settings, now).await.unwrap())
                })
            });
        });
    }

    group.finish();
}

criterion_group!(benches, due_check_benchmark, run_overhead_benchmark);

criterion_main!(benches);
