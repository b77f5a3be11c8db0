use std::sync::Arc;

use parbench::executor::aggregate;
use parbench::{
    static_slices, Error, Executor, Job, JobInput, Kernel, PartialResult, Partition, Result,
    WorkCursor, WorkSource, Worker,
};
use tokio::runtime::{Builder, Runtime};
use tokio::task::{self, JoinHandle};

/// Runs workers on tokio's blocking pool: a bounded set of OS threads that
/// is kept alive and reused from one run to the next.
pub struct PooledExecutor {
    runtime: Runtime,
    pool_size: usize,
}

impl PooledExecutor {
    pub fn new(pool_size: usize) -> Result<Self> {
        if pool_size == 0 {
            return Err(Error::invalid("pool size", "must be a positive integer"));
        }
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(pool_size)
            .thread_name("pool-worker")
            .enable_all()
            .build()
            .map_err(Error::Spawn)?;
        Ok(Self { runtime, pool_size })
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }
}

impl Executor for PooledExecutor {
    /// Blocks the calling thread until the job completes. Must not be called
    /// from inside an async context; use [`run_pooled`] there.
    fn run_prepared<K: Kernel>(&self, kernel: &K, job: &Job, input: &JobInput) -> Result<u64> {
        if job.threads > self.pool_size {
            tracing::warn!(
                threads = job.threads,
                pool = self.pool_size,
                "more workers than pool threads; some will queue"
            );
        }
        self.runtime
            .block_on(run_pooled(kernel.clone(), *job, input.clone()))
    }
}

/// Submits one blocking task per worker to the current runtime and awaits
/// them all before summing. A materialized job reads the array already held
/// by `input`; nothing is allocated here.
pub async fn run_pooled<K: Kernel>(kernel: K, job: Job, input: JobInput) -> Result<u64> {
    job.validate()?;

    let mut tasks: Vec<JoinHandle<PartialResult>> = Vec::with_capacity(job.threads);
    match job.partition {
        Partition::Static { materialize: false } => {
            for (id, range) in static_slices(job.items, job.threads)?.into_iter().enumerate() {
                let kernel = kernel.clone();
                tasks.push(task::spawn_blocking(move || {
                    Worker::new(id, WorkSource::Slice(range)).run(&kernel)
                }));
            }
        }
        Partition::Static { materialize: true } => {
            let numbers = input.numbers_for(&job)?;
            for (id, range) in static_slices(job.items, job.threads)?.into_iter().enumerate() {
                let kernel = kernel.clone();
                let numbers = Arc::clone(numbers);
                tasks.push(task::spawn_blocking(move || {
                    let items = &numbers[(range.start - 1) as usize..range.end as usize];
                    Worker::new(id, WorkSource::Items(items)).run(&kernel)
                }));
            }
        }
        Partition::Dynamic { chunk } => {
            let cursor = Arc::new(WorkCursor::new(job.items, chunk, job.threads)?);
            for id in 0..job.threads {
                let kernel = kernel.clone();
                let cursor = Arc::clone(&cursor);
                tasks.push(task::spawn_blocking(move || {
                    Worker::new(id, WorkSource::Cursor(&cursor)).run(&kernel)
                }));
            }
        }
    }

    let mut partials = Vec::with_capacity(tasks.len());
    let mut failed = None;
    for (id, task) in tasks.into_iter().enumerate() {
        match task.await {
            Ok(partial) => partials.push(partial),
            Err(err) => {
                tracing::error!(worker = id, %err, "pooled worker failed");
                failed.get_or_insert(id);
            }
        }
    }
    if let Some(worker) = failed {
        return Err(Error::WorkerPanicked { worker });
    }

    Ok(aggregate(partials))
}
