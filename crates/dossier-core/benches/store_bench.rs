use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tempfile::TempDir;

use dossier_core::{AccessLevel, AgentFields, AgentFilter, AgentStore, CodenameGenerator};

fn seeded_store(agents: usize) -> AgentStore {
    let store = AgentStore::in_memory().unwrap();
    for i in 0..agents {
        store
            .create(AgentFields::new(
                format!("Agent {}", i),
                "555-0100",
                format!("agent{}@example.com", i),
                AccessLevel::ALL[i % 3],
            ))
            .unwrap();
    }
    store
}

fn store_create_benchmark(c: &mut Criterion) {
    let temp_dir = TempDir::new().unwrap();
    let store = AgentStore::open(&temp_dir.path().join("bench.db")).unwrap();
    let mut n = 0u64;

    c.bench_function("store_create_on_disk", |b| {
        b.iter(|| {
            n += 1;
            store
                .create(black_box(AgentFields::new(
                    format!("Bench {}", n),
                    "555-0100",
                    format!("bench{}@example.com", n),
                    AccessLevel::Secret,
                )))
                .unwrap();
        });
    });
}

fn store_list_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_list");

    for size in [10, 100, 1000].iter() {
        let store = seeded_store(*size);
        group.bench_with_input(BenchmarkId::new("all", size), size, |b, _| {
            b.iter(|| store.list(black_box(&AgentFilter::default())).unwrap());
        });

        let filter = AgentFilter::default()
            .codename("7")
            .access_level(AccessLevel::TopSecret);
        group.bench_with_input(BenchmarkId::new("filtered", size), size, |b, _| {
            b.iter(|| store.list(black_box(&filter)).unwrap());
        });
    }

    group.finish();
}

fn codename_benchmark(c: &mut Criterion) {
    let empty = seeded_store(0);
    let generator = CodenameGenerator::default();

    c.bench_function("codename_generate_empty_registry", |b| {
        b.iter(|| generator.generate_unique(black_box(&empty)).unwrap());
    });
}

criterion_group!(
    benches,
    store_create_benchmark,
    store_list_benchmark,
    codename_benchmark,
);
criterion_main!(benches);
