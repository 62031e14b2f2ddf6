//! Monte Carlo Tree Search (MCTS) for AlphaZero-style chess play.
//!
//! The search is generic over a [`Rules`](engine_core::Rules) implementation
//! that supplies move generation and over an [`Evaluator`] that supplies
//! policy/value estimates.
//!
//! # Overview
//!
//! MCTS is a search algorithm that builds a search tree by running simulations.
//! Each simulation consists of four phases:
//!
//! 1. **Selection**: Traverse the tree using PUCT to balance exploration
//!    and exploitation
//! 2. **Expansion**: When reaching a leaf, expand it by adding one edge per
//!    legal move
//! 3. **Evaluation**: Use a policy/value network (or uniform prior for testing)
//!    to estimate the value of the new position; the policy is mapped onto
//!    the legal moves through the 73-plane move encoding in [`mapper`]
//! 4. **Backpropagation**: Update visit counts and value estimates along the
//!    path from leaf to root
//!
//! # Usage
//!
//! ```rust,ignore
//! use engine_core::STARTING_FEN;
//! use games_chess::CozyChess;
//! use mcts::{MctsConfig, MctsSearch, UniformEvaluator};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha20Rng;
//!
//! let rules = CozyChess::new();
//! let evaluator = UniformEvaluator::new();
//! let config = MctsConfig::for_evaluation().with_simulations(200);
//!
//! let mut search = MctsSearch::new(&rules, &evaluator, config, STARTING_FEN).unwrap();
//! let mut rng = ChaCha20Rng::seed_from_u64(42);
//! let result = search.run(&mut rng).unwrap();
//!
//! println!("Best move: {:?}", result.best_move);
//! println!("Value: {}", result.value);
//!
//! // Keep the explored subtree after e2e4 e7e5
//! let e4 = "e2e4".parse().unwrap();
//! let e5 = "e7e5".parse().unwrap();
//! let fen = "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2";
//! search.commit_moves(e4, e5, fen).unwrap();
//! ```
//!
//! # Configuration
//!
//! The [`MctsConfig`] struct controls search behavior:
//!
//! - `num_simulations`: Number of simulations per search (default: 400)
//! - `c_puct`: Exploration constant for PUCT (default: 1.25)
//! - `dirichlet_alpha`: Root noise concentration, only used when `stochastic`
//!   is set (default: 0.3)
//! - `temperature`: Temperature for move selection (1.0 = proportional, 0.0 = greedy)
//!
//! # Evaluators
//!
//! - [`UniformEvaluator`]: Flat policy and zero value (for testing)
//! - `OnnxEvaluator` (feature `onnx`): neural network inference via ONNX Runtime
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                         MctsSearch                         │
//! ├────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────┐ │
//! │  │  MctsTree   │  │    Rules    │  │     Evaluator       │ │
//! │  │ (Node/Edge) │  │ (movegen)   │  │ (policy/value)      │ │
//! │  └──────┬──────┘  └──────┬──────┘  └──────────┬──────────┘ │
//! │         │                │                    │            │
//! │         ▼                ▼                    ▼            │
//! │  ┌──────────────────────────────────────────────────────┐  │
//! │  │     select → expand (mapper) → evaluate →            │  │
//! │  │                     backpropagate                    │  │
//! │  └──────────────────────────────────────────────────────┘  │
//! └────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod edge;
pub mod evaluator;
pub mod mapper;
pub mod node;
pub mod search;
pub mod tree;
pub mod visualize;

#[cfg(feature = "onnx")]
pub mod onnx;

// Re-export main types
pub use config::MctsConfig;
pub use edge::Edge;
pub use evaluator::{EvalResult, Evaluator, EvaluatorError, UniformEvaluator};
pub use mapper::{decode, move_index, policy_to_priors, POLICY_SIZE};
pub use node::Node;
pub use search::{MctsSearch, ReuseOutcome, SearchError, SearchResult};
pub use tree::{EdgeStats, MctsTree, TreeStats};
pub use visualize::{to_dot, write_dot};

#[cfg(feature = "onnx")]
pub use onnx::{OnnxEvaluator, OnnxStats};
