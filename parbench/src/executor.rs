//! Runs one job to completion: partition, spawn workers, join, sum.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

use crate::error::{require_positive, Error, Result};
use crate::kernel::Kernel;
use crate::partition::{check_cursor_range, static_slices, Partition, WorkCursor};
use crate::worker::{PartialResult, WorkSource, Worker};

/// One unit of measured work: `items` items split across `threads` workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Job {
    pub items: u64,
    pub threads: usize,
    pub partition: Partition,
}

impl Job {
    pub fn validate(&self) -> Result<()> {
        require_positive("items", self.items)?;
        require_positive("threads", self.threads as u64)?;
        self.partition.validate()?;
        if let Partition::Dynamic { chunk } = self.partition {
            check_cursor_range(self.items, chunk, self.threads)?;
        }
        Ok(())
    }
}

/// Read-only input built before any timing starts. Only the materialized
/// static strategy carries an array; one input serves every thread count
/// of the same job.
#[derive(Debug, Clone, Default)]
pub struct JobInput {
    numbers: Option<Arc<Vec<u64>>>,
}

impl JobInput {
    pub fn prepare(job: &Job) -> Result<Self> {
        job.validate()?;
        match job.partition {
            Partition::Static { materialize: true } => Ok(Self {
                numbers: Some(Arc::new(materialize(job.items)?)),
            }),
            _ => Ok(Self::default()),
        }
    }

    pub fn numbers(&self) -> Option<&Arc<Vec<u64>>> {
        self.numbers.as_ref()
    }

    /// The array a materialized `job` reads, checked against its size.
    pub fn numbers_for(&self, job: &Job) -> Result<&Arc<Vec<u64>>> {
        match &self.numbers {
            Some(numbers) if numbers.len() as u64 == job.items => Ok(numbers),
            _ => Err(Error::invalid(
                "input",
                format!("materialized job needs a prepared array of {} items", job.items),
            )),
        }
    }
}

/// Something that can carry out a [`Job`] and return the aggregated total.
pub trait Executor {
    /// Runs `job` over input from [`JobInput::prepare`].
    fn run_prepared<K: Kernel>(&self, kernel: &K, job: &Job, input: &JobInput) -> Result<u64>;

    /// Prepares the input and runs once; preparation is part of the call.
    fn run<K: Kernel>(&self, kernel: &K, job: &Job) -> Result<u64> {
        let input = JobInput::prepare(job)?;
        self.run_prepared(kernel, job, &input)
    }
}

/// Folds published partial results. Callers hand over partials only after
/// every worker has been joined.
pub fn aggregate(partials: impl IntoIterator<Item = PartialResult>) -> u64 {
    partials.into_iter().map(|p| p.total).sum()
}

/// Builds the read-only input array `[1, 2, ..., items]`.
pub fn materialize(items: u64) -> Result<Vec<u64>> {
    let len = usize::try_from(items).map_err(|_| Error::Allocation { items })?;
    let mut numbers = Vec::new();
    numbers
        .try_reserve_exact(len)
        .map_err(|_| Error::Allocation { items })?;
    numbers.extend(1..=items);
    Ok(numbers)
}

/// Spawns a fresh OS thread per worker for every run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadExecutor;

impl ThreadExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl Executor for ThreadExecutor {
    fn run_prepared<K: Kernel>(&self, kernel: &K, job: &Job, input: &JobInput) -> Result<u64> {
        job.validate()?;

        let cursor;
        let sources: Vec<WorkSource<'_>> = match job.partition {
            Partition::Static { materialize: false } => static_slices(job.items, job.threads)?
                .into_iter()
                .map(WorkSource::Slice)
                .collect(),
            Partition::Static { materialize: true } => {
                let numbers = input.numbers_for(job)?;
                static_slices(job.items, job.threads)?
                    .into_iter()
                    .map(|r| {
                        let (lo, hi) = ((r.start - 1) as usize, r.end as usize);
                        WorkSource::Items(&numbers[lo..hi])
                    })
                    .collect()
            }
            Partition::Dynamic { chunk } => {
                cursor = WorkCursor::new(job.items, chunk, job.threads)?;
                (0..job.threads).map(|_| WorkSource::Cursor(&cursor)).collect()
            }
        };

        // Baseline: no threads at all, the caller does the work itself.
        if let [source] = sources.as_slice() {
            let mut worker = Worker::new(0, *source);
            return panic::catch_unwind(AssertUnwindSafe(|| worker.run(kernel)))
                .map(|partial| partial.total)
                .map_err(|_| Error::WorkerPanicked { worker: 0 });
        }

        let partials = thread::scope(|s| -> Result<Vec<PartialResult>> {
            let mut handles = Vec::with_capacity(sources.len());
            for (id, source) in sources.into_iter().enumerate() {
                let handle = thread::Builder::new()
                    .name(format!("worker-{id}"))
                    .spawn_scoped(s, move || Worker::new(id, source).run(kernel))
                    .map_err(Error::Spawn)?;
                handles.push(handle);
            }

            let mut partials = Vec::with_capacity(handles.len());
            let mut failed = None;
            for (id, handle) in handles.into_iter().enumerate() {
                match handle.join() {
                    Ok(partial) => partials.push(partial),
                    Err(_) => {
                        tracing::error!(worker = id, "worker panicked");
                        failed.get_or_insert(id);
                    }
                }
            }
            match failed {
                Some(worker) => Err(Error::WorkerPanicked { worker }),
                None => Ok(partials),
            }
        })?;

        Ok(aggregate(partials))
    }
}
