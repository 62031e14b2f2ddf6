//! Analyzer - command-line driver for the Gambit MCTS engine
//!
//! Two subcommands:
//! 1. `search` runs one search from a position and prints root statistics,
//!    optionally exporting the tree as Graphviz DOT
//! 2. `selfplay` plays two engines against each other, reusing each engine's
//!    tree across plies, and stores the game as JSON under the data directory

use std::path::Path;

use anyhow::Result;
use clap::Parser;
use games_chess::CozyChess;
use mcts::{Evaluator, UniformEvaluator};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tracing::{error, info, warn};

mod analyze;
mod config;
mod record;
mod selfplay;

use crate::config::{Cli, Command};

/// Root moves shown by `search`.
const REPORT_LIMIT: usize = 10;

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    Ok(())
}

#[cfg(feature = "onnx")]
fn load_evaluator(model: Option<&Path>) -> Result<Box<dyn Evaluator>> {
    match model {
        Some(path) => {
            let evaluator = mcts::OnnxEvaluator::load(path)?;
            info!(model = %path.display(), "Loaded ONNX model");
            Ok(Box::new(evaluator))
        }
        None => Ok(Box::new(UniformEvaluator::new())),
    }
}

#[cfg(not(feature = "onnx"))]
fn load_evaluator(model: Option<&Path>) -> Result<Box<dyn Evaluator>> {
    if let Some(path) = model {
        anyhow::bail!(
            "cannot load {}: analyzer was built without the `onnx` feature",
            path.display()
        );
    }
    Ok(Box::new(UniformEvaluator::new()))
}

fn run(cli: Cli) -> Result<()> {
    let rules = CozyChess::new();
    let boxed = load_evaluator(cli.model.as_deref())?;
    let evaluator: &dyn Evaluator = boxed.as_ref();
    let config = cli.search.mcts_config();

    info!(
        simulations = config.num_simulations,
        c_puct = config.c_puct,
        stochastic = config.stochastic,
        temperature = config.temperature,
        claim_draw = config.claim_draw,
        "Search configuration"
    );

    match cli.command {
        Command::Search { fen, dot } => {
            // Search-only runs are reproducible
            let mut rng = ChaCha20Rng::seed_from_u64(0);
            let report =
                analyze::analyze(&rules, &evaluator, config, &fen, dot.as_deref(), &mut rng)?;
            print!("{}", analyze::render_report(&report, REPORT_LIMIT));
            if let Some(path) = dot {
                info!("Search tree written to {}", path.display());
            }
        }
        Command::Selfplay {
            plies,
            seed,
            fen,
            no_record,
        } => {
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            let record =
                selfplay::play_game(&rules, &evaluator, &config, &fen, plies, seed, &mut rng)?;

            let moves: Vec<&str> = record.plies.iter().map(|p| p.uci.as_str()).collect();
            println!("{} {}", moves.join(" "), record.result);

            if no_record {
                return Ok(());
            }
            match record.write(Path::new(&cli.data_dir)) {
                Ok(path) => info!("Game record written to {}", path.display()),
                Err(e) => warn!("Failed to write game record: {:#}", e),
            }
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.validate()?;

    init_tracing(&cli.log_level)?;
    info!(log_level = %cli.log_level, "Tracing initialized");

    match run(cli) {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Analyzer failed: {:#}", e);
            Err(e)
        }
    }
}
