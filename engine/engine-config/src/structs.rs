//! Configuration struct definitions.
//!
//! All config structs with serde deserialization support and default values.

use crate::defaults;
use serde::Deserialize;

// ============================================================================
// Serde default functions (required for #[serde(default = "...")])
// These call the accessor functions from defaults module
// ============================================================================

fn d_data_dir() -> String {
    defaults::data_dir().into()
}
fn d_log_level() -> String {
    defaults::log_level().into()
}
fn d_num_sims() -> u32 {
    defaults::num_simulations()
}
fn d_c_puct() -> f64 {
    defaults::c_puct()
}
fn d_dirichlet_alpha() -> f64 {
    defaults::dirichlet_alpha()
}
fn d_stochastic() -> bool {
    defaults::stochastic()
}
fn d_temperature() -> f64 {
    defaults::temperature()
}
fn d_claim_draw() -> bool {
    defaults::claim_draw()
}
fn d_plies() -> u32 {
    defaults::plies()
}
fn d_seed() -> u64 {
    defaults::seed()
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Root configuration structure matching config.toml
#[derive(Debug, Deserialize, Default, Clone)]
pub struct CentralConfig {
    #[serde(default)]
    pub common: CommonConfig,
    #[serde(default)]
    pub mcts: MctsConfig,
    #[serde(default)]
    pub selfplay: SelfplayConfig,
}

/// Common configuration shared by all components
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CommonConfig {
    #[serde(default = "d_data_dir")]
    pub data_dir: String,
    #[serde(default = "d_log_level")]
    pub log_level: String,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            data_dir: defaults::data_dir().into(),
            log_level: defaults::log_level().into(),
        }
    }
}

/// MCTS (Monte Carlo Tree Search) configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MctsConfig {
    #[serde(default = "d_num_sims")]
    pub num_simulations: u32,
    #[serde(default = "d_c_puct")]
    pub c_puct: f64,
    #[serde(default = "d_dirichlet_alpha")]
    pub dirichlet_alpha: f64,
    /// Apply Dirichlet noise at the root
    #[serde(default = "d_stochastic")]
    pub stochastic: bool,
    #[serde(default = "d_temperature")]
    pub temperature: f64,
    /// Treat claimable and automatic draws as terminal during search
    #[serde(default = "d_claim_draw")]
    pub claim_draw: bool,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            num_simulations: defaults::num_simulations(),
            c_puct: defaults::c_puct(),
            dirichlet_alpha: defaults::dirichlet_alpha(),
            stochastic: defaults::stochastic(),
            temperature: defaults::temperature(),
            claim_draw: defaults::claim_draw(),
        }
    }
}

/// Self-play driver configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SelfplayConfig {
    /// Maximum number of plies before the game is abandoned
    #[serde(default = "d_plies")]
    pub plies: u32,
    #[serde(default = "d_seed")]
    pub seed: u64,
}

impl Default for SelfplayConfig {
    fn default() -> Self {
        Self {
            plies: defaults::plies(),
            seed: defaults::seed(),
        }
    }
}
