//! Centralized configuration loading from config.toml.
//!
//! This crate provides configuration structs and loading logic shared
//! across Gambit components (the analyzer binary, benchmarks).
//!
//! # Configuration Priority
//!
//! Settings are loaded with the following priority (highest to lowest):
//! 1. Environment variables (`GAMBIT_<SECTION>_<KEY>`)
//! 2. config.toml file
//! 3. Built-in defaults
//!
//! # Environment Variable Override Pattern
//!
//! ```text
//! GAMBIT_<SECTION>_<KEY>=value
//!
//! Examples:
//!     GAMBIT_COMMON_LOG_LEVEL=debug
//!     GAMBIT_MCTS_NUM_SIMULATIONS=800
//!     GAMBIT_MCTS_STOCHASTIC=true
//!     GAMBIT_SELFPLAY_SEED=7
//! ```

mod defaults;
mod loader;
mod structs;

pub use defaults::*;
pub use loader::{
    apply_env_overrides, load_config, load_from_path, CONFIG_ENV_VAR, CONFIG_SEARCH_PATHS,
};
pub use structs::*;
