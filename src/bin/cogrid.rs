//! Command-line runner for the gridworld curriculum.
//!
//! Usage:
//!   cogrid run                          # default curriculum, seed 42, into store/42
//!   cogrid run --config run.json --agent q
//!   cogrid sweep --seeds 100 --out store
//!
//! Log verbosity follows `RUST_LOG` (default `cogrid=info`).

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cogrid::config::{AgentKind, RunConfig};
use cogrid::sweep::{run_seed, run_seeds};
use cogrid::Result;

#[derive(Parser)]
#[command(name = "cogrid")]
#[command(about = "Train and test cooperative tabular agents on a gridworld curriculum")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the curriculum once
    Run {
        #[command(flatten)]
        common: CommonArgs,

        /// Seed of the run; overrides the config file
        #[arg(short, long)]
        seed: Option<u64>,
    },
    /// Run the curriculum for a range of seeds in parallel
    Sweep {
        #[command(flatten)]
        common: CommonArgs,

        /// Number of seeds to run
        #[arg(short = 'n', long, default_value = "100")]
        seeds: u64,

        /// First seed of the range
        #[arg(long, default_value = "0")]
        seed_start: u64,

        /// Worker threads (defaults to one per core)
        #[arg(short = 'j', long)]
        threads: Option<usize>,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// JSON run configuration; missing fields use defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory; each seed writes to <out>/<seed>
    #[arg(short, long, default_value = "store")]
    out: PathBuf,

    /// Agent variant: q (action values) or v (state values)
    #[arg(short, long)]
    agent: Option<AgentKind>,
}

impl CommonArgs {
    fn load(&self) -> Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::from_json_file(path)?,
            None => RunConfig::default(),
        };
        if let Some(kind) = self.agent {
            config.agent_kind = kind;
        }
        Ok(config)
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cogrid=info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Run { common, seed } => run(&common, seed),
        Command::Sweep {
            common,
            seeds,
            seed_start,
            threads,
        } => sweep(&common, seed_start..seed_start + seeds, threads),
    }
}

fn run(common: &CommonArgs, seed: Option<u64>) -> ExitCode {
    let mut config = match common.load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(seed) = seed {
        config.seed = seed;
    }

    let root = common.out.join(config.seed.to_string());
    match run_seed(&config, &root) {
        Ok(summaries) => {
            println!("Seed {} ({} agents)", config.seed, config.agent_kind.name());
            for summary in &summaries {
                println!("{}", summary);
            }
            println!("Output: {}", root.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Run failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn sweep(common: &CommonArgs, seeds: std::ops::Range<u64>, threads: Option<usize>) -> ExitCode {
    let config = match common.load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(n) = threads {
        if let Err(e) = rayon::ThreadPoolBuilder::new().num_threads(n).build_global() {
            eprintln!("Could not configure {} worker threads: {}", n, e);
            return ExitCode::FAILURE;
        }
    }

    let seeds: Vec<u64> = seeds.collect();
    let outcomes = run_seeds(&config, &seeds, &common.out);

    let mut failed = 0;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(summaries) => {
                let last = summaries.last();
                println!(
                    "seed {:>4}: {} phases, final collection rate {:.1}%",
                    outcome.seed,
                    summaries.len(),
                    last.map(|s| s.collection_rate() * 100.0).unwrap_or(0.0)
                );
            }
            Err(e) => {
                failed += 1;
                eprintln!("seed {:>4}: failed: {}", outcome.seed, e);
            }
        }
    }
    println!("{}/{} seeds completed", outcomes.len() - failed, outcomes.len());

    if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
