//! Command-line configuration for the analyzer.
//!
//! Defaults come from config.toml (with `GAMBIT_*` environment overrides);
//! command-line arguments take priority over both.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use engine_config::{load_config, CentralConfig};
use engine_core::STARTING_FEN;
use mcts::MctsConfig;
use once_cell::sync::Lazy;
use tracing::level_filters::LevelFilter;

// Load central config once at startup
static CENTRAL_CONFIG: Lazy<CentralConfig> = Lazy::new(load_config);

fn default_log_level() -> String {
    CENTRAL_CONFIG.common.log_level.clone()
}

fn default_data_dir() -> String {
    CENTRAL_CONFIG.common.data_dir.clone()
}

fn default_num_simulations() -> u32 {
    CENTRAL_CONFIG.mcts.num_simulations
}

fn default_c_puct() -> f32 {
    CENTRAL_CONFIG.mcts.c_puct as f32
}

fn default_dirichlet_alpha() -> f32 {
    CENTRAL_CONFIG.mcts.dirichlet_alpha as f32
}

fn default_temperature() -> f32 {
    CENTRAL_CONFIG.mcts.temperature as f32
}

fn default_plies() -> u32 {
    CENTRAL_CONFIG.selfplay.plies
}

fn default_seed() -> u64 {
    CENTRAL_CONFIG.selfplay.seed
}

#[derive(Parser, Debug, Clone)]
#[command(name = "analyzer")]
#[command(about = "Gambit analyzer - MCTS search and self-play from the command line")]
#[command(
    long_about = "Runs Monte Carlo Tree Search over chess positions, either once from a
given position or as a two-engine self-play game with tree reuse.

Configuration is loaded from config.toml with environment variable overrides.
CLI arguments take highest priority."
)]
pub struct Cli {
    #[command(flatten)]
    pub search: SearchArgs,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value_t = default_log_level())]
    pub log_level: String,

    /// Data directory for game records
    #[arg(long, global = true, default_value_t = default_data_dir())]
    pub data_dir: String,

    /// ONNX model used for evaluation (uniform priors when absent)
    #[arg(long, global = true)]
    pub model: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Search parameters shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// Number of MCTS simulations per move
    #[arg(long, global = true, default_value_t = default_num_simulations())]
    pub simulations: u32,

    /// PUCT exploration constant
    #[arg(long, global = true, default_value_t = default_c_puct())]
    pub c_puct: f32,

    /// Dirichlet noise concentration (only with --stochastic)
    #[arg(long, global = true, default_value_t = default_dirichlet_alpha())]
    pub dirichlet_alpha: f32,

    /// Apply Dirichlet noise at the root
    #[arg(long, global = true, overrides_with = "no_stochastic")]
    pub stochastic: bool,

    /// Disable root noise even when config.toml enables it
    #[arg(long, global = true, overrides_with = "stochastic")]
    pub no_stochastic: bool,

    /// Move selection temperature (0 = most visited)
    #[arg(long, global = true, default_value_t = default_temperature())]
    pub temperature: f32,

    /// Treat drawn positions with legal moves left as terminal
    #[arg(long, global = true, overrides_with = "no_claim_draw")]
    pub claim_draw: bool,

    /// Only positions without legal moves are terminal
    #[arg(long, global = true, overrides_with = "claim_draw")]
    pub no_claim_draw: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Search a single position and print root statistics
    Search {
        /// Position to search
        #[arg(long, default_value = STARTING_FEN)]
        fen: String,

        /// Write the search tree in Graphviz DOT format to this file
        #[arg(long)]
        dot: Option<PathBuf>,
    },

    /// Play two engines against each other with per-engine tree reuse
    Selfplay {
        /// Maximum number of plies to play
        #[arg(long, default_value_t = default_plies())]
        plies: u32,

        /// Seed for move sampling and root noise
        #[arg(long, default_value_t = default_seed())]
        seed: u64,

        /// Starting position
        #[arg(long, default_value = STARTING_FEN)]
        fen: String,

        /// Skip writing the JSON game record
        #[arg(long)]
        no_record: bool,
    },
}

impl Cli {
    pub fn validate(&self) -> Result<()> {
        if self.log_level.parse::<LevelFilter>().is_err() {
            return Err(anyhow!(
                "invalid log level '{}', expected one of trace, debug, info, warn, error",
                self.log_level
            ));
        }

        self.search.validate()?;

        match &self.command {
            Command::Search { fen, .. } if fen.trim().is_empty() => {
                Err(anyhow!("fen cannot be empty"))
            }
            Command::Selfplay { plies: 0, .. } => Err(anyhow!("plies must be greater than 0")),
            Command::Selfplay { fen, .. } if fen.trim().is_empty() => {
                Err(anyhow!("fen cannot be empty"))
            }
            _ => Ok(()),
        }
    }
}

impl SearchArgs {
    pub fn validate(&self) -> Result<()> {
        if self.simulations == 0 {
            return Err(anyhow!("simulations must be greater than 0"));
        }

        if !(self.c_puct.is_finite() && self.c_puct > 0.0) {
            return Err(anyhow!("c_puct must be a positive number, got {}", self.c_puct));
        }

        if !(self.temperature.is_finite() && self.temperature >= 0.0) {
            return Err(anyhow!(
                "temperature must be zero or positive, got {}",
                self.temperature
            ));
        }

        // Non-positive alpha is accepted; the search falls back to no noise
        if self.dirichlet_alpha.is_nan() {
            return Err(anyhow!("dirichlet_alpha must be a number"));
        }

        Ok(())
    }

    /// Search configuration combining these arguments with config.toml.
    pub fn mcts_config(&self) -> MctsConfig {
        self.to_mcts_config(&CENTRAL_CONFIG)
    }

    fn to_mcts_config(&self, central: &CentralConfig) -> MctsConfig {
        MctsConfig::default()
            .with_simulations(self.simulations)
            .with_c_puct(self.c_puct)
            .with_dirichlet_alpha(self.dirichlet_alpha)
            .with_stochastic(flag(self.stochastic, self.no_stochastic, central.mcts.stochastic))
            .with_temperature(self.temperature)
            .with_claim_draw(flag(self.claim_draw, self.no_claim_draw, central.mcts.claim_draw))
    }
}

/// Resolve a `--x` / `--no-x` pair, falling back to the configured value.
fn flag(on: bool, off: bool, configured: bool) -> bool {
    if on {
        true
    } else if off {
        false
    } else {
        configured
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> SearchArgs {
        SearchArgs {
            simulations: 100,
            c_puct: 1.25,
            dirichlet_alpha: 0.3,
            stochastic: false,
            no_stochastic: false,
            temperature: 0.0,
            claim_draw: false,
            no_claim_draw: false,
        }
    }

    fn base_cli(command: Command) -> Cli {
        Cli {
            search: base_args(),
            log_level: "info".into(),
            data_dir: "./data".into(),
            model: None,
            command,
        }
    }

    fn search_command() -> Command {
        Command::Search {
            fen: STARTING_FEN.into(),
            dot: None,
        }
    }

    #[test]
    fn validate_accepts_valid_configuration() {
        assert!(base_cli(search_command()).validate().is_ok());
    }

    #[test]
    fn validate_rejects_invalid_log_level() {
        let mut cli = base_cli(search_command());
        cli.log_level = "nope".into();
        let err = cli.validate().unwrap_err();
        assert!(err.to_string().contains("invalid log level"));
    }

    #[test]
    fn validate_rejects_zero_simulations() {
        let mut args = base_args();
        args.simulations = 0;
        let err = args.validate().unwrap_err();
        assert!(err.to_string().contains("simulations"));
    }

    #[test]
    fn validate_rejects_bad_c_puct() {
        let mut args = base_args();
        args.c_puct = -1.0;
        assert!(args.validate().is_err());
        args.c_puct = f32::NAN;
        assert!(args.validate().is_err());
    }

    #[test]
    fn validate_rejects_negative_temperature() {
        let mut args = base_args();
        args.temperature = -0.5;
        let err = args.validate().unwrap_err();
        assert!(err.to_string().contains("temperature"));
    }

    #[test]
    fn validate_accepts_zero_alpha() {
        let mut args = base_args();
        args.dirichlet_alpha = 0.0;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_plies() {
        let cli = base_cli(Command::Selfplay {
            plies: 0,
            seed: 1,
            fen: STARTING_FEN.into(),
            no_record: true,
        });
        let err = cli.validate().unwrap_err();
        assert!(err.to_string().contains("plies"));
    }

    #[test]
    fn validate_rejects_empty_fen() {
        let cli = base_cli(Command::Search {
            fen: "  ".into(),
            dot: None,
        });
        assert!(cli.validate().is_err());
    }

    #[test]
    fn mcts_config_follows_arguments() {
        let mut args = base_args();
        args.simulations = 64;
        args.c_puct = 2.0;
        args.temperature = 1.0;

        let config = args.to_mcts_config(&CentralConfig::default());
        assert_eq!(config.num_simulations, 64);
        assert!((config.c_puct - 2.0).abs() < 1e-6);
        assert!((config.temperature - 1.0).abs() < 1e-6);
        assert!(!config.stochastic);
        assert!(!config.claim_draw);
    }

    #[test]
    fn mcts_config_flags_fall_back_to_central_config() {
        let mut central = CentralConfig::default();
        central.mcts.stochastic = true;
        central.mcts.claim_draw = true;

        let config = base_args().to_mcts_config(&central);
        assert!(config.stochastic);
        assert!(config.claim_draw);
    }

    #[test]
    fn mcts_config_flags_override_central_config_both_ways() {
        let mut central = CentralConfig::default();
        central.mcts.stochastic = true;
        central.mcts.claim_draw = true;

        let mut args = base_args();
        args.no_stochastic = true;
        args.no_claim_draw = true;
        let config = args.to_mcts_config(&central);
        assert!(!config.stochastic);
        assert!(!config.claim_draw);

        let mut args = base_args();
        args.stochastic = true;
        args.claim_draw = true;
        let config = args.to_mcts_config(&CentralConfig::default());
        assert!(config.stochastic);
        assert!(config.claim_draw);
    }

    #[test]
    fn cli_last_flag_of_a_pair_wins() {
        let cli = Cli::try_parse_from([
            "analyzer",
            "search",
            "--stochastic",
            "--no-stochastic",
            "--no-claim-draw",
            "--claim-draw",
        ])
        .unwrap();

        assert!(!cli.search.stochastic);
        assert!(cli.search.no_stochastic);
        assert!(cli.search.claim_draw);
        assert!(!cli.search.no_claim_draw);
    }

    #[test]
    fn cli_parses_selfplay() {
        let cli = Cli::try_parse_from([
            "analyzer",
            "selfplay",
            "--plies",
            "6",
            "--seed",
            "9",
            "--simulations",
            "32",
            "--stochastic",
        ])
        .unwrap();

        assert_eq!(cli.search.simulations, 32);
        assert!(cli.search.stochastic);
        match cli.command {
            Command::Selfplay { plies, seed, .. } => {
                assert_eq!(plies, 6);
                assert_eq!(seed, 9);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn cli_search_defaults_to_starting_position() {
        let cli = Cli::try_parse_from(["analyzer", "search"]).unwrap();
        match cli.command {
            Command::Search { fen, dot } => {
                assert_eq!(fen, STARTING_FEN);
                assert!(dot.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
