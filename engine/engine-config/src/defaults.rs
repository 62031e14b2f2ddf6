//! Default configuration values loaded from config.defaults.toml.
//!
//! The shared TOML file is embedded at compile time, so the binary and any
//! tooling reading the same file agree on every default.

use once_cell::sync::Lazy;
use serde::Deserialize;

/// The embedded defaults TOML file (loaded at compile time)
const DEFAULTS_TOML: &str = include_str!("../../../config.defaults.toml");

/// Parsed defaults structure (parsed once at first use)
static DEFAULTS: Lazy<DefaultsConfig> = Lazy::new(|| {
    toml::from_str(DEFAULTS_TOML).expect("config.defaults.toml should be valid TOML")
});

// ============================================================================
// Internal structs for parsing config.defaults.toml
// ============================================================================

#[derive(Debug, Deserialize)]
struct DefaultsConfig {
    common: CommonDefaults,
    mcts: MctsDefaults,
    selfplay: SelfplayDefaults,
}

#[derive(Debug, Deserialize)]
struct CommonDefaults {
    data_dir: String,
    log_level: String,
}

#[derive(Debug, Deserialize)]
struct MctsDefaults {
    num_simulations: u32,
    c_puct: f64,
    dirichlet_alpha: f64,
    stochastic: bool,
    temperature: f64,
    claim_draw: bool,
}

#[derive(Debug, Deserialize)]
struct SelfplayDefaults {
    plies: u32,
    seed: u64,
}

// ============================================================================
// Public accessor functions
// ============================================================================

// Common
pub fn data_dir() -> &'static str {
    &DEFAULTS.common.data_dir
}
pub fn log_level() -> &'static str {
    &DEFAULTS.common.log_level
}

// MCTS
pub fn num_simulations() -> u32 {
    DEFAULTS.mcts.num_simulations
}
pub fn c_puct() -> f64 {
    DEFAULTS.mcts.c_puct
}
pub fn dirichlet_alpha() -> f64 {
    DEFAULTS.mcts.dirichlet_alpha
}
pub fn stochastic() -> bool {
    DEFAULTS.mcts.stochastic
}
pub fn temperature() -> f64 {
    DEFAULTS.mcts.temperature
}
pub fn claim_draw() -> bool {
    DEFAULTS.mcts.claim_draw
}

// Self-play
pub fn plies() -> u32 {
    DEFAULTS.selfplay.plies
}
pub fn seed() -> u64 {
    DEFAULTS.selfplay.seed
}
