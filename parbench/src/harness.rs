//! Repeated, timed runs across thread counts.

use std::time::Instant;

use tracing::{debug, info};

use crate::error::{require_positive, Result};
use crate::executor::{Executor, Job, JobInput};
use crate::kernel::Kernel;
use crate::partition::Partition;
use crate::stats::{speedup, RunResult, Stats};

pub const DEFAULT_RUNS: usize = 7;

#[derive(Debug, Clone, Copy)]
pub struct Bench {
    pub runs: usize,
    pub warmup: bool,
}

impl Default for Bench {
    fn default() -> Self {
        Self {
            runs: DEFAULT_RUNS,
            warmup: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Row {
    pub threads: usize,
    pub stats: Stats,
    pub speedup: f64,
}

/// All rows of one sweep. The first row is always the single-thread
/// baseline.
#[derive(Debug, Clone)]
pub struct Sweep {
    pub kernel: &'static str,
    pub items: u64,
    pub partition: Partition,
    pub runs: usize,
    pub rows: Vec<Row>,
}

impl Sweep {
    pub fn baseline(&self) -> &Row {
        &self.rows[0]
    }
}

impl Bench {
    /// Times one full partition/work/aggregate cycle. `input` is built
    /// beforehand and is not part of the measurement.
    pub fn time_once<E: Executor, K: Kernel>(
        &self,
        exec: &E,
        kernel: &K,
        job: &Job,
        input: &JobInput,
    ) -> Result<RunResult> {
        let start = Instant::now();
        let total = exec.run_prepared(kernel, job, input)?;
        let elapsed = start.elapsed();
        Ok(RunResult {
            total,
            estimate: kernel.estimate(total, job.items),
            elapsed,
        })
    }

    /// `runs` timed repetitions of `job`, sharing one prepared input.
    pub fn measure<E: Executor, K: Kernel>(&self, exec: &E, kernel: &K, job: &Job) -> Result<Stats> {
        require_positive("runs", self.runs as u64)?;
        let input = JobInput::prepare(job)?;
        self.measure_prepared(exec, kernel, job, &input)
    }

    pub fn measure_prepared<E: Executor, K: Kernel>(
        &self,
        exec: &E,
        kernel: &K,
        job: &Job,
        input: &JobInput,
    ) -> Result<Stats> {
        require_positive("runs", self.runs as u64)?;
        let mut runs = Vec::with_capacity(self.runs);
        for rep in 0..self.runs {
            let run = self.time_once(exec, kernel, job, input)?;
            debug!(
                threads = job.threads,
                rep,
                elapsed_ms = run.elapsed_ms(),
                total = run.total,
                "run finished"
            );
            runs.push(run);
        }
        Ok(Stats::new(runs))
    }

    /// Measures the single-thread baseline, then every entry of
    /// `thread_counts`, reporting each against the baseline.
    pub fn sweep<E: Executor, K: Kernel>(
        &self,
        exec: &E,
        kernel: &K,
        items: u64,
        partition: Partition,
        thread_counts: &[usize],
    ) -> Result<Sweep> {
        let baseline_job = Job {
            items,
            threads: 1,
            partition,
        };
        baseline_job.validate()?;
        for &threads in thread_counts {
            Job { threads, ..baseline_job }.validate()?;
        }

        // Shared by every thread count: the input does not depend on T.
        let input = JobInput::prepare(&baseline_job)?;

        if self.warmup {
            let warm = self.time_once(exec, kernel, &baseline_job, &input)?;
            debug!(elapsed_ms = warm.elapsed_ms(), "warm-up finished");
        }

        info!(kernel = kernel.name(), items, strategy = partition.label(), "measuring baseline");
        let baseline = self.measure_prepared(exec, kernel, &baseline_job, &input)?;
        let mut rows = vec![Row {
            threads: 1,
            stats: baseline.clone(),
            speedup: 1.0,
        }];

        for &threads in thread_counts.iter().filter(|&&t| t != 1) {
            let job = Job { threads, ..baseline_job };
            let stats = self.measure_prepared(exec, kernel, &job, &input)?;
            let ratio = speedup(&baseline, &stats);
            info!(
                threads,
                mean_ms = stats.mean_ms(),
                stddev_ms = stats.stddev_ms(),
                speedup = ratio,
                "thread count measured"
            );
            rows.push(Row {
                threads,
                stats,
                speedup: ratio,
            });
        }

        Ok(Sweep {
            kernel: kernel.name(),
            items,
            partition,
            runs: self.runs,
            rows,
        })
    }
}
