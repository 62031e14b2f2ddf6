//! MCTS configuration parameters.

/// Configuration for Monte Carlo Tree Search.
#[derive(Debug, Clone)]
pub struct MctsConfig {
    /// Number of simulations to run per search.
    pub num_simulations: u32,

    /// Exploration constant for the PUCT formula.
    /// Higher values encourage exploration, lower values favor exploitation.
    pub c_puct: f32,

    /// Dirichlet concentration for root exploration noise.
    /// Only used when `stochastic` is set. 0.0 disables the noise.
    pub dirichlet_alpha: f32,

    /// Multiply root exploration terms by a fresh Dirichlet sample every
    /// simulation. Used for self-play; off for analysis and evaluation.
    pub stochastic: bool,

    /// Temperature for move choice after search.
    /// 1.0 = sample proportional to visit counts
    /// 0.0 = always pick most-visited (argmax)
    pub temperature: f32,

    /// Treat drawn positions (insufficient material, seventy-five and
    /// fifty-move rules) as terminal even while legal moves remain.
    /// Off by default: only positions without legal moves are terminal.
    pub claim_draw: bool,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            num_simulations: 400,
            c_puct: 1.25,
            dirichlet_alpha: 0.3,
            stochastic: true,
            temperature: 1.0,
            claim_draw: false,
        }
    }
}

impl MctsConfig {
    /// Create config for self-play training (with exploration noise).
    pub fn for_training() -> Self {
        Self::default()
    }

    /// Create config for evaluation/analysis (no noise, greedy selection).
    pub fn for_evaluation() -> Self {
        Self {
            num_simulations: 400,
            c_puct: 1.25,
            dirichlet_alpha: 0.0, // No noise
            stochastic: false,
            temperature: 0.0, // Greedy
            claim_draw: false,
        }
    }

    /// Create a fast config for testing.
    pub fn for_testing() -> Self {
        Self {
            num_simulations: 50,
            c_puct: 1.25,
            dirichlet_alpha: 0.0,
            stochastic: false,
            temperature: 0.0,
            claim_draw: false,
        }
    }

    /// Builder pattern: set number of simulations.
    pub fn with_simulations(mut self, n: u32) -> Self {
        self.num_simulations = n;
        self
    }

    /// Builder pattern: set c_puct exploration constant.
    pub fn with_c_puct(mut self, c: f32) -> Self {
        self.c_puct = c;
        self
    }

    /// Builder pattern: set temperature.
    pub fn with_temperature(mut self, t: f32) -> Self {
        self.temperature = t;
        self
    }

    /// Builder pattern: enable or disable root exploration noise.
    pub fn with_stochastic(mut self, stochastic: bool) -> Self {
        self.stochastic = stochastic;
        self
    }

    /// Builder pattern: set the Dirichlet concentration.
    pub fn with_dirichlet_alpha(mut self, alpha: f32) -> Self {
        self.dirichlet_alpha = alpha;
        self
    }

    pub fn with_claim_draw(mut self, claim_draw: bool) -> Self {
        self.claim_draw = claim_draw;
        self
    }

    /// Whether root noise is sampled during selection.
    #[inline]
    pub fn root_noise_enabled(&self) -> bool {
        self.stochastic && self.dirichlet_alpha > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MctsConfig::default();
        assert_eq!(config.num_simulations, 400);
        assert!((config.c_puct - 1.25).abs() < 1e-6);
        assert!((config.dirichlet_alpha - 0.3).abs() < 1e-6);
        assert!(config.root_noise_enabled());
        assert!(!config.claim_draw);
    }

    #[test]
    fn test_builder_pattern() {
        let config = MctsConfig::default()
            .with_simulations(100)
            .with_temperature(0.5)
            .with_stochastic(false)
            .with_claim_draw(true);

        assert_eq!(config.num_simulations, 100);
        assert!(config.claim_draw);
        assert!((config.temperature - 0.5).abs() < 1e-6);
        assert!(!config.root_noise_enabled());
    }

    #[test]
    fn test_evaluation_config() {
        let config = MctsConfig::for_evaluation();
        assert!((config.dirichlet_alpha).abs() < 1e-6);
        assert!((config.temperature).abs() < 1e-6);
        assert!(!config.stochastic);
    }

    #[test]
    fn test_zero_alpha_disables_noise() {
        let config = MctsConfig::for_training().with_dirichlet_alpha(0.0);
        assert!(config.stochastic);
        assert!(!config.root_noise_enabled());
    }
}
