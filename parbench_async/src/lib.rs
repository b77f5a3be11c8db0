//! Async-runtime flavour of the harness: the same kernels and partitioning,
//! executed on a fixed-size tokio blocking pool instead of fresh threads.

mod pool;

pub use pool::{run_pooled, PooledExecutor};
