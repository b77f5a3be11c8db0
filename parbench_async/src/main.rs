use anyhow::Context;
use clap::{CommandFactory, FromArgMatches};

use parbench::app;
use parbench::config::Cli;
use parbench_async::PooledExecutor;

fn main() -> anyhow::Result<()> {
    app::init_tracing();

    let matches = Cli::command().name("parbench-async").get_matches();
    let plan = Cli::from_arg_matches(&matches)?
        .into_plan()
        .context("invalid arguments")?;

    let exec = PooledExecutor::new(plan.largest_thread_count())
        .context("failed to start worker pool")?;
    tracing::info!(pool = exec.pool_size(), "running on a reused blocking pool");

    app::run(&plan, &exec).context("benchmark failed")?;
    Ok(())
}
