//! Command-line surface shared by the threaded and pooled binaries, and the
//! validated [`Plan`] it turns into.

use std::path::PathBuf;
use std::thread;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::error::{require_positive, Error, Result};
use crate::harness::{Bench, DEFAULT_RUNS};
use crate::kernel::{Collatz, MonteCarloPi};
use crate::partition::Partition;

pub const DEFAULT_SAMPLES: u64 = 1_000_000;
pub const DEFAULT_LIMIT: u64 = 10_000_000;
pub const DEFAULT_CHUNK: u64 = 1024;
pub const DEFAULT_PI_THREADS: [usize; 6] = [2, 4, 8, 16, 32, 64];
pub const DEFAULT_PI_CSV: &str = "results.csv";

#[derive(Debug, Parser)]
#[command(
    version,
    about = "Single- vs multi-threaded timing of embarrassingly parallel kernels",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Estimate π by Monte Carlo sampling of the unit square
    Pi(PiArgs),
    /// Sum Collatz stopping times over 1..=LIMIT
    Collatz(CollatzArgs),
}

#[derive(Debug, Args)]
pub struct CommonArgs {
    /// Thread counts to compare against the single-thread baseline
    #[arg(short, long, value_delimiter = ',', value_name = "LIST")]
    pub threads: Vec<usize>,

    /// Timed repetitions per thread count
    #[arg(short, long, default_value_t = DEFAULT_RUNS)]
    pub runs: usize,

    /// Skip the untimed warm-up run
    #[arg(long)]
    pub no_warmup: bool,

    /// Write a CSV row per thread count to this file
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,

    /// Do not write the CSV log, not even the default one
    #[arg(long, conflicts_with = "csv")]
    pub no_csv: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Strategy {
    /// Contiguous ranges assigned up front
    Static,
    /// Fixed-size chunks claimed from a shared atomic cursor
    Dynamic,
}

#[derive(Debug, Args)]
pub struct PiArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Number of random points
    #[arg(short, long, default_value_t = DEFAULT_SAMPLES)]
    pub samples: u64,

    #[arg(long, value_enum, default_value_t = Strategy::Static)]
    pub strategy: Strategy,

    /// Chunk size for the dynamic strategy
    #[arg(short, long, default_value_t = DEFAULT_CHUNK)]
    pub chunk: u64,

    /// Fixed seed; each worker derives its own stream from it
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Debug, Args)]
pub struct CollatzArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Largest starting value
    #[arg(short, long, default_value_t = DEFAULT_LIMIT)]
    pub limit: u64,

    #[arg(long, value_enum, default_value_t = Strategy::Dynamic)]
    pub strategy: Strategy,

    /// Chunk size for the dynamic strategy
    #[arg(short, long, default_value_t = DEFAULT_CHUNK)]
    pub chunk: u64,

    /// Build the input array 1..=LIMIT before slicing it (static only)
    #[arg(long)]
    pub materialize: bool,
}

#[derive(Debug, Clone, Copy)]
pub enum Workload {
    Pi(MonteCarloPi),
    Collatz(Collatz),
}

/// Everything a sweep needs, already validated.
#[derive(Debug, Clone)]
pub struct Plan {
    pub workload: Workload,
    pub items: u64,
    pub partition: Partition,
    pub threads: Vec<usize>,
    pub bench: Bench,
    pub csv: Option<PathBuf>,
}

pub fn available_threads() -> usize {
    thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

impl Plan {
    pub fn largest_thread_count(&self) -> usize {
        self.threads.iter().copied().max().unwrap_or(1)
    }
}

impl Cli {
    pub fn into_plan(self) -> Result<Plan> {
        match self.command {
            Command::Pi(args) => {
                let kernel = match args.seed {
                    Some(seed) => MonteCarloPi::seeded(seed),
                    None => MonteCarloPi::new(),
                };
                let partition = partition_for(args.strategy, args.chunk, false)?;
                build_plan(
                    Workload::Pi(kernel),
                    "samples",
                    args.samples,
                    partition,
                    args.common,
                    &DEFAULT_PI_THREADS,
                    Some(DEFAULT_PI_CSV),
                )
            }
            Command::Collatz(args) => {
                let partition = partition_for(args.strategy, args.chunk, args.materialize)?;
                build_plan(
                    Workload::Collatz(Collatz),
                    "limit",
                    args.limit,
                    partition,
                    args.common,
                    &[available_threads()],
                    None,
                )
            }
        }
    }
}

fn partition_for(strategy: Strategy, chunk: u64, materialize: bool) -> Result<Partition> {
    match strategy {
        Strategy::Static => Ok(Partition::Static { materialize }),
        Strategy::Dynamic if materialize => Err(Error::invalid(
            "materialize",
            "only applies to the static strategy",
        )),
        Strategy::Dynamic => Ok(Partition::Dynamic {
            chunk: require_positive("chunk size", chunk)?,
        }),
    }
}

fn build_plan(
    workload: Workload,
    size_name: &'static str,
    items: u64,
    partition: Partition,
    common: CommonArgs,
    default_threads: &[usize],
    default_csv: Option<&str>,
) -> Result<Plan> {
    require_positive(size_name, items)?;
    require_positive("runs", common.runs as u64)?;
    let threads = if common.threads.is_empty() {
        default_threads.to_vec()
    } else {
        common.threads
    };
    for &t in &threads {
        require_positive("threads", t as u64)?;
    }
    let csv = if common.no_csv {
        None
    } else {
        common.csv.or_else(|| default_csv.map(PathBuf::from))
    };

    Ok(Plan {
        workload,
        items,
        partition,
        threads,
        bench: Bench {
            runs: common.runs,
            warmup: !common.no_warmup,
        },
        csv,
    })
}
