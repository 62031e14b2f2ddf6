//! Evaluator trait for position evaluation.
//!
//! The evaluator provides a policy (probabilities over the structured move
//! encoding, see [`crate::mapper`]) and a value estimate for a position. In
//! self-play this is a neural network. For testing, a uniform evaluator
//! returns equal priors and a neutral value.

use thiserror::Error;

use crate::mapper::POLICY_SIZE;

/// Errors that can occur during evaluation.
#[derive(Debug, Error)]
pub enum EvaluatorError {
    #[error("Evaluation failed: {0}")]
    EvaluationFailed(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Model error: {0}")]
    ModelError(String),

    #[error("Policy has {actual} entries, expected {expected}")]
    PolicySize { expected: usize, actual: usize },

    #[error("Value {0} is outside [-1, 1]")]
    InvalidValue(f32),
}

/// Result of evaluating a position.
#[derive(Debug, Clone)]
pub struct EvalResult {
    /// Probabilities over the flattened 73x8x8 move encoding.
    /// Entries for illegal moves are ignored by the search.
    pub policy: Vec<f32>,

    /// Value estimate from White's perspective.
    /// Range: -1.0 (Black wins) to +1.0 (White wins).
    pub value: f32,
}

impl EvalResult {
    /// Fail unless the policy has exactly `POLICY_SIZE` entries and the
    /// value is a finite number in [-1, 1].
    pub fn validate(&self) -> Result<(), EvaluatorError> {
        if self.policy.len() != POLICY_SIZE {
            return Err(EvaluatorError::PolicySize {
                expected: POLICY_SIZE,
                actual: self.policy.len(),
            });
        }

        // NaN fails the range check
        if !(-1.0..=1.0).contains(&self.value) {
            return Err(EvaluatorError::InvalidValue(self.value));
        }

        Ok(())
    }
}

/// Trait for position evaluators.
///
/// Implementations could be:
/// - UniformEvaluator: Returns uniform policy (for testing)
/// - OnnxEvaluator: Neural network inference (for self-play)
pub trait Evaluator: Send + Sync {
    /// Evaluate a single position given as FEN.
    fn evaluate(&self, fen: &str) -> Result<EvalResult, EvaluatorError>;
}

impl<E: Evaluator + ?Sized> Evaluator for &E {
    fn evaluate(&self, fen: &str) -> Result<EvalResult, EvaluatorError> {
        (**self).evaluate(fen)
    }
}

/// Uniform evaluator that assigns equal probability to every policy entry.
/// Value is always 0.0 (neutral). Useful for testing MCTS without a model.
#[derive(Debug, Clone, Default)]
pub struct UniformEvaluator;

impl UniformEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl Evaluator for UniformEvaluator {
    fn evaluate(&self, _fen: &str) -> Result<EvalResult, EvaluatorError> {
        Ok(EvalResult {
            policy: vec![1.0 / POLICY_SIZE as f32; POLICY_SIZE],
            value: 0.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_evaluator() {
        let eval = UniformEvaluator::new();
        let result = eval
            .evaluate("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")
            .unwrap();

        assert_eq!(result.policy.len(), POLICY_SIZE);
        let expected_prob = 1.0 / POLICY_SIZE as f32;
        for p in &result.policy {
            assert!((p - expected_prob).abs() < 1e-9);
        }
        let sum: f32 = result.policy.iter().sum();
        assert!((sum - 1.0).abs() < 1e-3);

        // Value should be neutral
        assert!((result.value).abs() < 1e-6);
        assert!(result.validate().is_ok());
    }

    #[test]
    fn test_policy_size_check() {
        let result = EvalResult {
            policy: vec![0.5; 9],
            value: 0.0,
        };
        let err = result.validate().unwrap_err();
        assert!(matches!(
            err,
            EvaluatorError::PolicySize {
                expected: POLICY_SIZE,
                actual: 9
            }
        ));
    }

    #[test]
    fn test_value_range_check() {
        let policy = vec![1.0 / POLICY_SIZE as f32; POLICY_SIZE];
        for value in [-1.0, 0.0, 1.0] {
            let result = EvalResult {
                policy: policy.clone(),
                value,
            };
            assert!(result.validate().is_ok(), "value {}", value);
        }

        for value in [f32::NAN, f32::INFINITY, 1.5, -2.0] {
            let result = EvalResult {
                policy: policy.clone(),
                value,
            };
            assert!(
                matches!(result.validate(), Err(EvaluatorError::InvalidValue(_))),
                "value {}",
                value
            );
        }
    }
}
