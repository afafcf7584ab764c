//! Throughput of each policy and of the lockstep driver.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use evictsim::{EvictionPolicy, PolicyKind, PolicyRegistry, SimulationDriver};

/// Deterministic trace with a hot working set and a cold tail.
fn synthetic_trace(len: usize) -> Vec<u32> {
    let mut state = 0x2545_f491_u32;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            if state % 4 == 0 {
                state % 256
            } else {
                state % 16
            }
        })
        .collect()
}

fn bench_policies(c: &mut Criterion) {
    let trace = synthetic_trace(10_000);
    let registry = PolicyRegistry::<u32>::standard();
    let mut group = c.benchmark_group("policy_access");

    for kind in PolicyKind::ALL {
        group.bench_with_input(BenchmarkId::from_parameter(kind), &trace, |b, trace| {
            b.iter(|| {
                let mut policy = registry.create_kind(kind, 32).unwrap();
                for r in trace {
                    black_box(policy.access(r));
                }
                policy.stats()
            })
        });
    }
    group.finish();
}

fn bench_driver(c: &mut Criterion) {
    let trace = synthetic_trace(2_000);

    c.bench_function("driver_run_to_end", |b| {
        b.iter(|| {
            let mut driver = SimulationDriver::new();
            driver.initialize(["FIFO", "LRU", "LFU"], 32).unwrap();
            driver.load_trace(trace.clone());
            black_box(driver.run_to_end().unwrap())
        })
    });
}

criterion_group!(benches, bench_policies, bench_driver);
criterion_main!(benches);
