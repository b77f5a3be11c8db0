use anyhow::Context;
use clap::Parser;

use parbench::app;
use parbench::config::Cli;
use parbench::ThreadExecutor;

fn main() -> anyhow::Result<()> {
    app::init_tracing();

    let plan = Cli::parse().into_plan().context("invalid arguments")?;
    tracing::info!(
        threads = ?plan.threads,
        items = plan.items,
        "running with fresh OS threads per run"
    );
    app::run(&plan, &ThreadExecutor).context("benchmark failed")?;
    Ok(())
}
