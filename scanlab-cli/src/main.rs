//! ScanLab CLI — batch signal scans with checkpointed, resumable state.
//!
//! Commands:
//! - `scan` — run the next batch (or, with `--all`, every batch) over a universe
//! - `status` — report phase, counts and current hits from the saved state
//! - `reset` — delete the saved state
//! - `universe` — show the normalized universe, or write the default one as TOML

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use scanlab_core::data::{CircuitBreaker, DataProvider, SyntheticProvider, Universe, YahooProvider};
use scanlab_core::domain::{Interval, Period};
use scanlab_runner::export::{results_table, write_results};
use scanlab_runner::{
    JsonFileStore, NoProgress, ScanConfig, ScanProgress, ScanStore, ScanSummary, Scanner,
    StdoutProgress,
};

#[derive(Parser)]
#[command(
    name = "scanlab",
    about = "ScanLab — EMA/RSI signal scanner with forward-return backtests"
)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct UniverseArgs {
    /// Universe file: `.toml` (tickers / [sectors]) or a CSV / one-per-line list.
    #[arg(long)]
    universe: Option<PathBuf>,

    /// Explicit tickers; takes precedence over --universe.
    #[arg(long, num_args = 1..)]
    tickers: Vec<String>,
}

impl UniverseArgs {
    /// Explicit tickers, then the file, then the built-in default.
    fn load(&self) -> Result<Universe> {
        if !self.tickers.is_empty() {
            return Ok(Universe::new(&self.tickers)?);
        }
        match &self.universe {
            Some(path) => Universe::from_file(path)
                .with_context(|| format!("failed to load universe {}", path.display())),
            None => Ok(Universe::default_us()),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Scan the next batch of unscanned tickers and checkpoint.
    Scan {
        #[command(flatten)]
        universe: UniverseArgs,

        /// TOML config file. Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Scan state file.
        #[arg(long, default_value = "scan_state.json")]
        state: PathBuf,

        /// Keep going batch after batch until the universe is covered.
        #[arg(long, default_value_t = false)]
        all: bool,

        /// Use deterministic synthetic data instead of Yahoo Finance.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Override the bar interval (1h, 4h, 1d, 1wk).
        #[arg(long)]
        interval: Option<Interval>,

        /// Override the history period (1mo, 3mo, 6mo, 1y, 2y, 5y, max).
        #[arg(long)]
        period: Option<Period>,

        /// Also write the hits to this file (.csv or .json).
        #[arg(long)]
        output: Option<PathBuf>,

        /// No per-ticker progress lines.
        #[arg(long, default_value_t = false)]
        quiet: bool,
    },
    /// Show progress and hits from the saved state.
    Status {
        #[command(flatten)]
        universe: UniverseArgs,

        /// Scan state file.
        #[arg(long, default_value = "scan_state.json")]
        state: PathBuf,
    },
    /// Delete the saved state so the next scan starts over.
    Reset {
        /// Scan state file.
        #[arg(long, default_value = "scan_state.json")]
        state: PathBuf,
    },
    /// Print the normalized universe.
    Universe {
        #[command(flatten)]
        universe: UniverseArgs,

        /// Write the universe as TOML to this path instead of printing it.
        #[arg(long)]
        write: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Scan {
            universe,
            config,
            state,
            all,
            synthetic,
            interval,
            period,
            output,
            quiet,
        } => run_scan(
            &universe,
            config.as_deref(),
            &state,
            ScanOptions {
                all,
                synthetic,
                interval,
                period,
                output,
                quiet,
            },
        ),
        Commands::Status { universe, state } => run_status(&universe, &state),
        Commands::Reset { state } => run_reset(&state),
        Commands::Universe { universe, write } => run_universe(&universe, write.as_deref()),
    }
}

/// Logs go to stderr so stdout carries only tables and progress.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

struct ScanOptions {
    all: bool,
    synthetic: bool,
    interval: Option<Interval>,
    period: Option<Period>,
    output: Option<PathBuf>,
    quiet: bool,
}

fn run_scan(
    universe_args: &UniverseArgs,
    config_path: Option<&Path>,
    state_path: &Path,
    opts: ScanOptions,
) -> Result<()> {
    let universe = universe_args.load()?;

    let mut config = match config_path {
        Some(path) => ScanConfig::from_file(path)?,
        None => ScanConfig::default(),
    };
    if let Some(interval) = opts.interval {
        config.scan.interval = interval;
    }
    if let Some(period) = opts.period {
        config.scan.period = period;
    }

    let provider: Arc<dyn DataProvider> = if opts.synthetic {
        Arc::new(SyntheticProvider::new())
    } else {
        let circuit_breaker = Arc::new(CircuitBreaker::default_provider());
        Arc::new(YahooProvider::new(circuit_breaker)?)
    };
    info!(
        provider = provider.name(),
        tickers = universe.len(),
        interval = %config.scan.interval,
        period = %config.scan.period,
        "scan requested"
    );
    let store = Arc::new(JsonFileStore::new(state_path));
    let scanner = Scanner::new(provider, store, config)?;

    let progress: &dyn ScanProgress = if opts.quiet {
        &NoProgress
    } else {
        &StdoutProgress
    };

    let mut state = scanner.load_state();
    let summary = if opts.all {
        scanner.run_to_completion(&universe, &mut state, progress, None)?
    } else {
        scanner
            .continue_scan(&universe, &mut state, progress, None)?
            .summary
    };

    println!();
    print_summary(&summary, state_path);
    if !state.high_prob.is_empty() {
        println!();
        print!("{}", results_table(&state.high_prob));
    }

    if let Some(path) = opts.output {
        write_results(&path, &state.high_prob)?;
        println!("Results written to: {}", path.display());
    }
    Ok(())
}

fn run_status(universe_args: &UniverseArgs, state_path: &Path) -> Result<()> {
    let universe = universe_args.load()?;
    let store = JsonFileStore::new(state_path);
    let Some(state) = store.load()? else {
        println!("No saved scan at {}", state_path.display());
        return Ok(());
    };

    print_summary(&state.summary(&universe), state_path);
    if state.high_prob.is_empty() {
        println!("No high-probability setups yet.");
    } else {
        println!();
        print!("{}", results_table(&state.high_prob));
    }
    Ok(())
}

fn run_reset(state_path: &Path) -> Result<()> {
    JsonFileStore::new(state_path).clear()?;
    println!("Scan state cleared: {}", state_path.display());
    Ok(())
}

fn run_universe(universe_args: &UniverseArgs, write: Option<&Path>) -> Result<()> {
    let universe = universe_args.load()?;

    if let Some(path) = write {
        if path.exists() {
            bail!("{} already exists", path.display());
        }
        std::fs::write(path, universe.to_toml()?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Universe ({} tickers) written to {}", universe.len(), path.display());
        return Ok(());
    }

    let sectors = universe.sector_names();
    if sectors.is_empty() {
        println!("{}", universe.symbols().join(" "));
    } else {
        for sector in sectors {
            let tickers = universe.sector_tickers(sector).unwrap_or_default();
            println!("{sector:<12} {}", tickers.join(" "));
        }
    }
    println!("Total: {} tickers", universe.len());
    Ok(())
}

fn print_summary(summary: &ScanSummary, state_path: &Path) {
    println!("State:      {}", state_path.display());
    println!("Phase:      {}", summary.phase);
    println!(
        "Scanned:    {}/{} ({} remaining)",
        summary.scanned, summary.universe_size, summary.remaining
    );
    println!("Hits:       {}", summary.qualified);
    println!("Failed:     {}", summary.failed);
}
