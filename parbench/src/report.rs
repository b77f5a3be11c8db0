//! Console table and CSV log for a finished sweep.

use std::fmt::Write as _;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::error::{Error, Result};
use crate::harness::{Row, Sweep};

/// Which per-row value accompanies the timings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueColumn {
    MeanPi,
    TotalSteps,
}

impl ValueColumn {
    fn of(sweep: &Sweep) -> Self {
        if sweep.baseline().stats.mean_estimate().is_some() {
            ValueColumn::MeanPi
        } else {
            ValueColumn::TotalSteps
        }
    }

    fn title(self) -> &'static str {
        match self {
            ValueColumn::MeanPi => "Pi (avg)",
            ValueColumn::TotalSteps => "Total steps",
        }
    }

    fn csv_name(self) -> &'static str {
        match self {
            ValueColumn::MeanPi => "mean_pi",
            ValueColumn::TotalSteps => "total_steps",
        }
    }

    fn format(self, row: &Row) -> String {
        match self {
            ValueColumn::MeanPi => format!("{:.7}", row.stats.mean_estimate().unwrap_or(f64::NAN)),
            ValueColumn::TotalSteps => format!("{:.0}", row.stats.mean_total()),
        }
    }
}

pub fn csv_header(sweep: &Sweep) -> String {
    format!(
        "threads,mean_time_ms,stddev_ms,{},speedup",
        ValueColumn::of(sweep).csv_name()
    )
}

pub fn render_table(sweep: &Sweep) -> String {
    let column = ValueColumn::of(sweep);
    let mut out = String::new();
    let _ = writeln!(
        out,
        "=== {} ({}) ===",
        sweep.kernel,
        sweep.partition.label()
    );
    let _ = writeln!(out, "Items: {}  |  Repeats: {}", sweep.items, sweep.runs);
    if column == ValueColumn::TotalSteps {
        let avg = sweep.baseline().stats.mean_total() / sweep.items as f64;
        let _ = writeln!(out, "Average steps per number: {avg:.4}");
    }
    let _ = writeln!(
        out,
        "{:<8} | {:<12} | {:<12} | {:<12} | {:<8}",
        "Threads",
        "Mean (ms)",
        "StdDev (ms)",
        column.title(),
        "Speedup"
    );
    let _ = writeln!(out, "{}", "-".repeat(66));
    for row in &sweep.rows {
        let _ = writeln!(
            out,
            "{:<8} | {:<12.2} | {:<12.2} | {:<12} | {:<8.2}",
            row.threads,
            row.stats.mean_ms(),
            row.stats.stddev_ms(),
            column.format(row),
            row.speedup
        );
    }
    out
}

pub fn write_csv_to<W: Write>(sweep: &Sweep, mut out: W) -> io::Result<()> {
    let column = ValueColumn::of(sweep);
    writeln!(out, "{}", csv_header(sweep))?;
    for row in &sweep.rows {
        writeln!(
            out,
            "{},{:.2},{:.2},{},{:.2}",
            row.threads,
            row.stats.mean_ms(),
            row.stats.stddev_ms(),
            column.format(row),
            row.speedup
        )?;
    }
    out.flush()
}

pub fn write_csv(sweep: &Sweep, path: &Path) -> Result<()> {
    let io_err = |source| Error::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_err)?;
    write_csv_to(sweep, BufWriter::new(file)).map_err(io_err)?;
    tracing::info!(path = %path.display(), rows = sweep.rows.len(), "results written");
    Ok(())
}
