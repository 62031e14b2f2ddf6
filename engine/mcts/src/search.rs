//! MCTS search implementation.
//!
//! Implements the core MCTS algorithm:
//! 1. Selection: Traverse tree using PUCT to find a leaf
//! 2. Expansion: Evaluate the leaf and add one child per legal move,
//!    with priors taken from the evaluator's policy
//! 3. Backpropagation: Update statistics along the selected path
//!
//! Values are always from White's perspective. Backpropagation adds the
//! same value at every level and selection flips it for Black.

use engine_core::{outcome_value, ChessMove, Rules, RulesError};
use rand::Rng;
use rand_chacha::ChaCha20Rng;
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::config::MctsConfig;
use crate::evaluator::{Evaluator, EvaluatorError};
use crate::mapper;
use crate::tree::MctsTree;

/// Errors that can occur during MCTS search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Rules error: {0}")]
    Rules(#[from] RulesError),

    #[error("Evaluator error: {0}")]
    Evaluator(#[from] EvaluatorError),
}

/// What happened to the tree when moves were committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReuseOutcome {
    /// The subtree reached by the moves became the new root
    Reused,
    /// The moves were not in the tree; search restarted from the given position
    Rebuilt,
}

/// Result of an MCTS search.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Move chosen with the configured temperature, None if the root is terminal
    pub best_move: Option<ChessMove>,

    /// Root visit distribution (training target)
    pub policy: Vec<(ChessMove, f32)>,

    /// Value estimate at root, White's perspective
    pub value: f32,

    /// Number of simulations performed in this call
    pub simulations: u32,

    /// Root visit count after the search
    pub root_visits: u32,
}

/// MCTS search state for one player.
pub struct MctsSearch<'a, R: Rules, E: Evaluator> {
    tree: MctsTree,
    rules: &'a R,
    evaluator: &'a E,
    config: MctsConfig,
}

impl<'a, R: Rules, E: Evaluator> MctsSearch<'a, R, E> {
    /// Create a new MCTS search from the position `fen`.
    pub fn new(
        rules: &'a R,
        evaluator: &'a E,
        config: MctsConfig,
        fen: &str,
    ) -> Result<Self, SearchError> {
        let board = rules.parse(fen)?;
        let tree = MctsTree::new(rules.to_fen(&board), rules.side_to_move(&board));

        Ok(Self {
            tree,
            rules,
            evaluator,
            config,
        })
    }

    /// Run the configured number of simulations and pick a move.
    pub fn run(&mut self, rng: &mut ChaCha20Rng) -> Result<SearchResult, SearchError> {
        let simulations = self.config.num_simulations;
        self.run_simulations(simulations, rng)?;

        let best_move = self.select_move(self.config.temperature, rng);
        let result = SearchResult {
            best_move,
            policy: self.tree.visit_policy(),
            value: self.tree.root_value(),
            simulations,
            root_visits: self.tree.root().visit_count,
        };

        debug!(
            best_move = ?result.best_move.map(|m| m.to_string()),
            value = result.value,
            root_visits = result.root_visits,
            "MCTS search complete"
        );

        Ok(result)
    }

    /// Run `n` simulations from the current root.
    ///
    /// An unexpanded root is expanded first, counting as its selection visit,
    /// so every one of the `n` simulations descends through a root edge
    /// unless the root is terminal.
    pub fn run_simulations(&mut self, n: u32, rng: &mut ChaCha20Rng) -> Result<(), SearchError> {
        if !self.tree.root().expanded {
            self.expand(&[])?;
            self.tree.root_mut().visit_count += 1;
        }

        for _ in 0..n {
            self.simulate(rng)?;
        }
        Ok(())
    }

    /// Run a single simulation (select -> expand/evaluate -> backpropagate).
    fn simulate(&mut self, rng: &mut ChaCha20Rng) -> Result<(), SearchError> {
        let path = self.select(rng);

        let leaf = self.tree.node_at_mut(&path);
        leaf.visit_count += 1;
        let known_value = leaf.expanded.then_some(leaf.value);

        // Terminal leaves keep the value they got at expansion
        let value = match known_value {
            Some(value) => value,
            None => self.expand(&path)?,
        };

        self.tree.backpropagate(&path, value);

        trace!(depth = path.len(), value, "MCTS simulation complete");
        Ok(())
    }

    /// Select a leaf by descending through the best PUCT edge.
    ///
    /// Returns the path of edge indices from the root.
    fn select(&self, rng: &mut ChaCha20Rng) -> Vec<usize> {
        let mut path = Vec::new();

        loop {
            let node = self.tree.node_at(&path);

            // Unexpanded or terminal
            if node.is_leaf() {
                break;
            }

            let noise = (path.is_empty() && self.config.root_noise_enabled())
                .then(|| dirichlet_noise(node.edges.len(), self.config.dirichlet_alpha, rng));

            let Some(index) = self
                .tree
                .select_child(&path, self.config.c_puct, noise.as_deref())
            else {
                panic!("no selectable edge in expanded node {}", node.state);
            };
            path.push(index);
        }

        path
    }

    /// Expand the node at `path` and return its value.
    ///
    /// Positions without legal moves, and drawn positions when draw claims
    /// are enabled, become terminal with the game result as value. Otherwise
    /// the evaluator's policy is mapped onto the legal moves and one child is
    /// added per move in enumeration order.
    fn expand(&mut self, path: &[usize]) -> Result<f32, SearchError> {
        let state = self.tree.node_at(path).state.clone();
        let board = self.rules.parse(&state)?;
        let moves = self.rules.legal_moves(&board);

        let outcome = self.rules.outcome(&board, true);
        if moves.is_empty() || (self.config.claim_draw && outcome.is_some()) {
            let value = outcome_value(outcome);
            let node = self.tree.node_at_mut(path);
            node.value = value;
            node.expanded = true;
            debug!(fen = %state, value, "Reached terminal position");
            return Ok(value);
        }

        let eval = self.evaluator.evaluate(&state)?;
        eval.validate()?;

        let priors = mapper::policy_to_priors(self.rules, &board, &moves, &eval.policy);

        let children = moves
            .iter()
            .map(|&mv| {
                let next = self.rules.play(&board, mv)?;
                Ok((self.rules.to_fen(&next), mv))
            })
            .collect::<Result<Vec<_>, RulesError>>()?;

        let node = self.tree.node_at_mut(path);
        node.value = eval.value;
        node.expanded = true;
        for (child_state, mv) in children {
            let prior = priors.get(&mv).copied().unwrap_or(0.0);
            node.add_child(child_state, mv, prior);
        }

        debug!(
            fen = %state,
            children = moves.len(),
            value = eval.value,
            "Expanded node"
        );

        Ok(eval.value)
    }

    /// Promote the subtree reached by `moves` to root.
    ///
    /// If any move is missing from the tree the search starts over from
    /// `fen`; that fallback is logged, not reported as an error. `fen` is only
    /// read on the fallback path.
    pub fn reuse_subtree(
        &mut self,
        moves: &[ChessMove],
        fen: &str,
    ) -> Result<ReuseOutcome, SearchError> {
        if self.tree.reroot(moves) {
            debug!(
                moves = %format_moves(moves),
                root_visits = self.tree.root().visit_count,
                "Reused search subtree"
            );
            return Ok(ReuseOutcome::Reused);
        }

        warn!(
            moves = %format_moves(moves),
            fen,
            "Moves not found in search tree, starting a fresh tree"
        );
        self.reset(fen)?;
        Ok(ReuseOutcome::Rebuilt)
    }

    /// Re-root after one move by each side.
    pub fn commit_moves(
        &mut self,
        first: ChessMove,
        second: ChessMove,
        fen: &str,
    ) -> Result<ReuseOutcome, SearchError> {
        self.reuse_subtree(&[first, second], fen)
    }

    /// Discard the tree and start from `fen`.
    pub fn reset(&mut self, fen: &str) -> Result<(), SearchError> {
        let board = self.rules.parse(fen)?;
        self.tree
            .reset(self.rules.to_fen(&board), self.rules.side_to_move(&board));
        Ok(())
    }

    /// Pick a root move from the visit counts.
    ///
    /// Greedy (most visited, first on ties) when `temperature` is ~0,
    /// otherwise sampled proportionally to N^(1/temperature).
    pub fn select_move(&self, temperature: f32, rng: &mut ChaCha20Rng) -> Option<ChessMove> {
        let greedy = self.tree.best_action().map(|(action, _)| action);
        if temperature < 1e-6 {
            return greedy;
        }

        let edges = &self.tree.root().edges;
        let weights: Vec<f32> = edges
            .iter()
            .map(|e| {
                let v = e.visit_count as f32;
                if temperature == 1.0 {
                    v
                } else {
                    v.powf(1.0 / temperature)
                }
            })
            .collect();

        sample_index(&weights, rng)
            .map(|i| edges[i].action)
            .or(greedy)
    }

    /// Get the search tree (for inspection/debugging).
    pub fn tree(&self) -> &MctsTree {
        &self.tree
    }

    pub fn config(&self) -> &MctsConfig {
        &self.config
    }
}

fn format_moves(moves: &[ChessMove]) -> String {
    moves
        .iter()
        .map(|m| m.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Sample an index proportionally to non-negative weights.
/// None if the weights have no mass.
fn sample_index(weights: &[f32], rng: &mut ChaCha20Rng) -> Option<usize> {
    let total: f32 = weights.iter().sum();
    if total <= 0.0 || !total.is_finite() {
        return None;
    }

    let r: f32 = rng.gen::<f32>() * total;
    let mut cumsum = 0.0;

    for (i, &w) in weights.iter().enumerate() {
        cumsum += w;
        if r < cumsum {
            return Some(i);
        }
    }

    // Fallback to last non-zero weight (handles floating point issues)
    weights.iter().rposition(|&w| w > 0.0)
}

/// Generate Dirichlet-distributed noise using Gamma variates.
///
/// Falls back to all ones (no noise) if `alpha` is not a valid Gamma shape.
fn dirichlet_noise(n: usize, alpha: f32, rng: &mut ChaCha20Rng) -> Vec<f32> {
    use rand_distr::{Distribution, Gamma};

    let gamma = match Gamma::new(alpha as f64, 1.0) {
        Ok(gamma) => gamma,
        Err(e) => {
            warn!(alpha, error = %e, "Invalid Dirichlet alpha, disabling root noise");
            return vec![1.0; n];
        }
    };
    let mut samples: Vec<f32> = (0..n).map(|_| gamma.sample(rng) as f32).collect();

    // Normalize
    let sum: f32 = samples.iter().sum();
    if sum > 0.0 {
        for s in &mut samples {
            *s /= sum;
        }
    } else {
        samples.fill(1.0);
    }

    samples
}
