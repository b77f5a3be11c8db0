//! Parallel work-partitioning harness for embarrassingly parallel kernels.
//!
//! A [`Job`] splits items `1..=N` across `T` workers, either as static
//! slices or as dynamically claimed chunks. Every worker folds its share
//! into a private partial result which is handed back when the worker is
//! joined; the partials are then summed. [`Bench`] repeats jobs, times them
//! and compares each thread count against the single-thread baseline.

pub mod app;
pub mod config;
pub mod error;
pub mod executor;
pub mod harness;
pub mod kernel;
pub mod partition;
pub mod report;
pub mod stats;
pub mod worker;

pub use error::{Error, Result};
pub use executor::{Executor, Job, JobInput, ThreadExecutor};
pub use harness::{Bench, Row, Sweep};
pub use kernel::{collatz_steps, Collatz, Kernel, MonteCarloPi};
pub use partition::{check_cursor_range, static_slices, Partition, WorkCursor, WorkRange};
pub use stats::{speedup, RunResult, Stats};
pub use worker::{PartialResult, WorkSource, Worker, WorkerState};
