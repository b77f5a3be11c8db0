use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use parbench::{Collatz, Executor, Job, JobInput, MonteCarloPi, Partition, ThreadExecutor};

const LIMIT: u64 = 200_000;

fn threads() -> usize {
    std::thread::available_parallelism().map_or(4, |n| n.get())
}

fn bench_collatz_partitions(c: &mut Criterion) {
    let threads = threads();
    let mut group = c.benchmark_group("collatz");
    let partitions = [
        ("static", Partition::Static { materialize: false }),
        ("static_array", Partition::Static { materialize: true }),
        ("dynamic_64", Partition::Dynamic { chunk: 64 }),
        ("dynamic_1024", Partition::Dynamic { chunk: 1024 }),
    ];
    for (name, partition) in partitions {
        let job = Job { items: LIMIT, threads, partition };
        let input = JobInput::prepare(&job).expect("collatz input");
        group.bench_with_input(BenchmarkId::new(name, threads), &job, |b, job| {
            b.iter(|| {
                ThreadExecutor
                    .run_prepared(&Collatz, job, &input)
                    .expect("collatz run")
            });
        });
    }
    group.finish();
}

fn bench_pi_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("monte_carlo_pi");
    let kernel = MonteCarloPi::seeded(1);
    let mut counts = vec![1, 2, 4, threads()];
    counts.sort_unstable();
    counts.dedup();
    for threads in counts {
        let job = Job {
            items: LIMIT,
            threads,
            partition: Partition::Static { materialize: false },
        };
        group.bench_with_input(BenchmarkId::from_parameter(threads), &job, |b, job| {
            b.iter(|| ThreadExecutor.run(&kernel, job).expect("pi run"));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_collatz_partitions, bench_pi_scaling);
criterion_main!(benches);
