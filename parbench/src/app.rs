//! Glue between a parsed [`Plan`], an [`Executor`] and the report output.

use std::io::{self, Write};

use crate::config::{Plan, Workload};
use crate::error::{Error, Result};
use crate::executor::Executor;
use crate::harness::Sweep;
use crate::report;

/// Installs the fmt subscriber on stderr, filtered by `RUST_LOG` and
/// defaulting to `info`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .try_init();
}

pub fn sweep<E: Executor>(plan: &Plan, exec: &E) -> Result<Sweep> {
    match &plan.workload {
        Workload::Pi(kernel) => plan
            .bench
            .sweep(exec, kernel, plan.items, plan.partition, &plan.threads),
        Workload::Collatz(kernel) => plan
            .bench
            .sweep(exec, kernel, plan.items, plan.partition, &plan.threads),
    }
}

/// Runs the sweep, prints the table to stdout, then writes the CSV if one
/// was asked for.
pub fn run<E: Executor>(plan: &Plan, exec: &E) -> Result<Sweep> {
    run_to(plan, exec, &mut io::stdout().lock())
}

/// Like [`run`] with the table going to `out`. Failing to write the table
/// is an error; a CSV failure is logged and does not fail the command.
pub fn run_to<E: Executor, W: Write>(plan: &Plan, exec: &E, out: &mut W) -> Result<Sweep> {
    let sweep = sweep(plan, exec)?;

    out.write_all(report::render_table(&sweep).as_bytes())
        .and_then(|()| out.flush())
        .map_err(Error::Report)?;

    if let Some(path) = &plan.csv {
        if let Err(err) = report::write_csv(&sweep, path) {
            tracing::error!(%err, "could not write results file");
        }
    }
    Ok(sweep)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Cli;
    use crate::executor::ThreadExecutor;
    use clap::Parser;

    #[test]
    fn end_to_end_collatz_with_csv() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("collatz.csv");
        let csv_arg = csv.to_string_lossy().into_owned();
        let plan = Cli::try_parse_from([
            "parbench", "collatz", "--limit", "3000", "--threads", "2,3", "--runs", "2",
            "--csv", csv_arg.as_str(),
        ])
        .unwrap()
        .into_plan()
        .unwrap();

        let mut out = Vec::new();
        let sweep = run_to(&plan, &ThreadExecutor, &mut out).unwrap();
        assert_eq!(sweep.rows.len(), 3);
        assert!(String::from_utf8(out).unwrap().contains("collatz"));
        let text = std::fs::read_to_string(&csv).unwrap();
        assert_eq!(text.lines().count(), 4);
    }

    #[test]
    fn csv_failure_does_not_fail_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let plan = Plan {
            csv: Some(dir.path().join("no-such-dir").join("out.csv")),
            ..Cli::try_parse_from(["parbench", "pi", "--samples", "2000", "--threads", "2", "--runs", "1"])
                .unwrap()
                .into_plan()
                .unwrap()
        };
        assert!(run_to(&plan, &ThreadExecutor, &mut io::sink()).is_ok());
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn table_write_failure_fails_the_run() {
        let plan = Cli::try_parse_from([
            "parbench", "collatz", "--limit", "500", "--threads", "2", "--runs", "1",
        ])
        .unwrap()
        .into_plan()
        .unwrap();
        let err = run_to(&plan, &ThreadExecutor, &mut BrokenPipe).unwrap_err();
        assert!(matches!(err, Error::Report(_)), "{err}");
    }
}
