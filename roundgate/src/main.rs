//! Bounded-round completion tracker CLI.
//!
//! Runs the round loop from `roundgate.toml`, checks deliverables of a run
//! directory, lists runs, and triages issue labels.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::warn;

use roundgate::check::check_run;
use roundgate::core::registry::TaskRegistry;
use roundgate::core::simulator::ProgressSimulator;
use roundgate::core::strategy::VerificationStrategy;
use roundgate::core::triage::{Owner, triage};
use roundgate::exit_codes;
use roundgate::io::artifact::{ArtifactVerifier, Manifest};
use roundgate::io::config::{
    DEFAULT_CONFIG_FILE, StrategyKind, TrackerConfig, load_config, write_config,
};
use roundgate::io::report_store::write_report;
use roundgate::io::runs::{DEFAULT_RUNS_DIR, list_runs, resolve_run};
use roundgate::logging;
use roundgate::orchestrator::{RoundOrchestrator, RunReport};
use roundgate::report::ReportRenderer;

#[derive(Parser)]
#[command(
    name = "roundgate",
    version,
    about = "Bounded-round task completion tracker with a quality gate"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a starter `roundgate.toml`.
    Init {
        #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
    },
    /// Drive tasks through the round loop; exits 2 if completion was forced.
    Run {
        #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,
        /// Seed for simulated progress (overrides the config).
        #[arg(long)]
        seed: Option<u64>,
        /// Round budget (overrides the config).
        #[arg(long)]
        max_rounds: Option<u32>,
        /// Write the final report as JSON (overrides the config).
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Show which deliverables of a run exist (defaults to the latest run).
    Check {
        /// Run directory, or a run id under `--runs-dir`.
        run_dir: Option<PathBuf>,
        #[arg(long, default_value = DEFAULT_RUNS_DIR)]
        runs_dir: PathBuf,
    },
    /// List runs, newest first.
    Runs {
        #[arg(long, default_value = DEFAULT_RUNS_DIR)]
        runs_dir: PathBuf,
    },
    /// Route issue labels such as "AUTH: session bug" to owners.
    Triage {
        #[arg(required = true)]
        labels: Vec<String>,
        /// Owner for labels no rule matches.
        #[arg(long, default_value = "engineering")]
        fallback: Owner,
    },
}

fn main() {
    logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Init { config, force } => cmd_init(&config, force),
        Command::Run {
            config,
            seed,
            max_rounds,
            report,
        } => cmd_run(&config, seed, max_rounds, report),
        Command::Check { run_dir, runs_dir } => cmd_check(run_dir, &runs_dir),
        Command::Runs { runs_dir } => cmd_runs(&runs_dir),
        Command::Triage { labels, fallback } => cmd_triage(&labels, fallback),
    }
}

fn cmd_init(config: &Path, force: bool) -> Result<i32> {
    if config.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", config.display());
    }
    write_config(config, &TrackerConfig::starter())
        .with_context(|| format!("write {}", config.display()))?;
    println!("wrote {}", config.display());
    Ok(exit_codes::OK)
}

fn cmd_run(
    config: &Path,
    seed: Option<u64>,
    max_rounds: Option<u32>,
    report_path: Option<PathBuf>,
) -> Result<i32> {
    let mut cfg = load_config(config)?;
    if seed.is_some() {
        cfg.seed = seed;
    }
    if let Some(max_rounds) = max_rounds {
        cfg.max_rounds = max_rounds;
    }
    cfg.validate()?;
    let report_path = report_path.or_else(|| cfg.report_path.clone());
    let renderer = ReportRenderer::new()?;

    let report = match cfg.strategy {
        StrategyKind::Simulate => {
            let mut registry = cfg.build_registry(&Manifest::default())?;
            drive(
                ProgressSimulator::with_seed(cfg.seed),
                &mut registry,
                cfg.max_rounds,
                &renderer,
            )?
        }
        StrategyKind::Artifacts => {
            let manifest = cfg.resolve_manifest()?;
            let mut registry = cfg.build_registry(&manifest)?;
            drive(
                ArtifactVerifier::new(&cfg.artifacts.base_dir, manifest),
                &mut registry,
                cfg.max_rounds,
                &renderer,
            )?
        }
    };

    print!("{}", renderer.render_final(&report)?);
    if let Some(path) = report_path {
        write_report(&path, &report)?;
        println!("report written to {}", path.display());
    }

    if report.forced() {
        Ok(exit_codes::FORCED)
    } else {
        Ok(exit_codes::OK)
    }
}

fn drive<S: VerificationStrategy>(
    strategy: S,
    registry: &mut TaskRegistry,
    max_rounds: u32,
    renderer: &ReportRenderer,
) -> Result<RunReport> {
    let mut orchestrator = RoundOrchestrator::new(strategy, max_rounds)?;
    orchestrator.run(registry, |summary| {
        match renderer.render_round(summary, max_rounds) {
            Ok(text) => println!("{text}"),
            Err(err) => warn!(round = summary.index, error = %format!("{err:#}"), "render round"),
        }
    })
}

fn cmd_check(run_dir: Option<PathBuf>, runs_dir: &Path) -> Result<i32> {
    let run_dir = resolve_run(run_dir.as_deref(), runs_dir)?;
    let report = check_run(&run_dir)?;
    print!("{}", ReportRenderer::new()?.render_check(&report)?);
    Ok(exit_codes::OK)
}

fn cmd_runs(runs_dir: &Path) -> Result<i32> {
    let runs = list_runs(runs_dir)?;
    if runs.is_empty() {
        println!("no runs under {}", runs_dir.display());
    }
    for run in runs {
        match run.goal {
            Some(goal) => println!("{}\t{}", run.id, goal),
            None => println!("{}", run.id),
        }
    }
    Ok(exit_codes::OK)
}

fn cmd_triage(labels: &[String], fallback: Owner) -> Result<i32> {
    let report = triage(labels, fallback);
    print!("{}", ReportRenderer::new()?.render_triage(&report, fallback)?);
    Ok(exit_codes::OK)
}
