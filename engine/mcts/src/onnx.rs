//! ONNX Runtime evaluator for neural network inference.
//!
//! This module provides an evaluator that uses ONNX models exported from
//! the trainer. The model takes encoded positions as input and outputs
//! policy logits and value estimates.
//!
//! # Model Format
//!
//! The ONNX model is expected to have:
//! - Input: "input" - shape (1, 19, 8, 8) float32, see
//!   `games_chess::observation`
//! - Output: "policy" - shape (1, 4672) float32 logits
//! - Output: "value" - shape (1, 1) float32, White's perspective

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Instant;

use games_chess::{encode_fen, INPUT_PLANES};
use ort::{session::Session, value::Value};
use tracing::debug;

use crate::evaluator::{EvalResult, Evaluator, EvaluatorError};
use crate::mapper::POLICY_SIZE;

/// ONNX Runtime evaluator that loads and runs neural network models.
///
/// Uses a Mutex internally because `Session::run` requires `&mut self`,
/// but the `Evaluator` trait uses `&self` for thread-safe sharing.
pub struct OnnxEvaluator {
    session: Mutex<Session>,
    /// Number of inferences performed (for diagnostics)
    inference_count: AtomicU64,
    /// Total inference time in microseconds (for diagnostics)
    total_inference_time_us: AtomicU64,
}

impl std::fmt::Debug for OnnxEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxEvaluator")
            .field("inference_count", &self.inference_count.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

/// Snapshot of inference counters.
#[derive(Debug, Clone, Copy)]
pub struct OnnxStats {
    pub inferences: u64,
    pub avg_inference_us: u64,
}

impl OnnxEvaluator {
    /// Load an ONNX model from the given path.
    pub fn load<P: AsRef<Path>>(model_path: P) -> Result<Self, EvaluatorError> {
        let session = Session::builder()
            .map_err(|e| {
                EvaluatorError::ModelError(format!("Failed to create session builder: {}", e))
            })?
            .with_intra_threads(4)
            .map_err(|e| EvaluatorError::ModelError(format!("Failed to set intra threads: {}", e)))?
            .commit_from_file(model_path)
            .map_err(|e| EvaluatorError::ModelError(format!("Failed to load model: {}", e)))?;

        Ok(Self::with_session(session))
    }

    fn with_session(session: Session) -> Self {
        Self {
            session: Mutex::new(session),
            inference_count: AtomicU64::new(0),
            total_inference_time_us: AtomicU64::new(0),
        }
    }

    pub fn stats(&self) -> OnnxStats {
        let inferences = self.inference_count.load(Ordering::Relaxed);
        let total_us = self.total_inference_time_us.load(Ordering::Relaxed);
        OnnxStats {
            inferences,
            avg_inference_us: if inferences == 0 { 0 } else { total_us / inferences },
        }
    }

    /// Numerically stable softmax over the full policy.
    fn softmax(logits: &[f32]) -> Vec<f32> {
        let max_logit = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        if !max_logit.is_finite() {
            return vec![0.0; logits.len()];
        }

        let mut exp_values: Vec<f32> = logits.iter().map(|&l| (l - max_logit).exp()).collect();
        let exp_sum: f32 = exp_values.iter().sum();
        if exp_sum > 0.0 {
            for v in &mut exp_values {
                *v /= exp_sum;
            }
        }
        exp_values
    }

    /// Run the model on one encoded position.
    /// Returns the policy logits and the value.
    fn infer(&self, input: Vec<f32>) -> Result<(Vec<f32>, f32), EvaluatorError> {
        let input_array = ndarray::Array4::from_shape_vec((1, INPUT_PLANES, 8, 8), input)
            .map_err(|e| {
                EvaluatorError::InvalidState(format!("Failed to create input array: {}", e))
            })?;

        let input_value = Value::from_array(input_array).map_err(|e| {
            EvaluatorError::ModelError(format!("Failed to create input tensor: {}", e))
        })?;

        // Run inference - extract all data inside the lock scope
        let inference_start = Instant::now();
        let (policy_logits, values) = {
            let mut session = self.session.lock().map_err(|e| {
                EvaluatorError::EvaluationFailed(format!("Failed to acquire session lock: {}", e))
            })?;
            let outputs = session
                .run(ort::inputs!["input" => input_value])
                .map_err(|e| {
                    EvaluatorError::EvaluationFailed(format!("Inference failed: {}", e))
                })?;

            let policy_output = outputs
                .get("policy")
                .ok_or_else(|| EvaluatorError::ModelError("Missing policy output".to_string()))?;
            let (_shape, policy_data) = policy_output.try_extract_tensor::<f32>().map_err(|e| {
                EvaluatorError::ModelError(format!("Failed to extract policy tensor: {}", e))
            })?;

            let value_output = outputs
                .get("value")
                .ok_or_else(|| EvaluatorError::ModelError("Missing value output".to_string()))?;
            let (_shape, value_data) = value_output.try_extract_tensor::<f32>().map_err(|e| {
                EvaluatorError::ModelError(format!("Failed to extract value tensor: {}", e))
            })?;

            (policy_data.to_vec(), value_data.to_vec())
        };

        if policy_logits.len() != POLICY_SIZE {
            return Err(EvaluatorError::PolicySize {
                expected: POLICY_SIZE,
                actual: policy_logits.len(),
            });
        }
        let value = single_value(&values)?;

        // Track inference timing for diagnostics
        let inference_time_us = inference_start.elapsed().as_micros() as u64;
        let total_us = self
            .total_inference_time_us
            .fetch_add(inference_time_us, Ordering::Relaxed)
            + inference_time_us;
        let count = self.inference_count.fetch_add(1, Ordering::Relaxed) + 1;

        // Log stats periodically (every 10,000 inferences)
        if count % 10_000 == 0 {
            debug!(
                "ONNX inference stats: {} calls, avg {:.2}ms per call",
                count,
                (total_us / count) as f64 / 1000.0
            );
        }

        Ok((policy_logits, value))
    }
}

/// The value head must produce exactly one number per position.
fn single_value(values: &[f32]) -> Result<f32, EvaluatorError> {
    match values {
        [value] => Ok(*value),
        _ => Err(EvaluatorError::ModelError(format!(
            "Value output has {} entries, expected 1",
            values.len()
        ))),
    }
}

impl Evaluator for OnnxEvaluator {
    fn evaluate(&self, fen: &str) -> Result<EvalResult, EvaluatorError> {
        let input = encode_fen(fen).map_err(|e| EvaluatorError::InvalidState(e.to_string()))?;
        let (logits, value) = self.infer(input)?;

        Ok(EvalResult {
            policy: Self::softmax(&logits),
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_softmax_sums_to_one() {
        let logits = vec![1.0, 2.0, 3.0];
        let policy = OnnxEvaluator::softmax(&logits);

        let sum: f32 = policy.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);

        // Higher logit should have higher probability
        assert!(policy[2] > policy[1]);
        assert!(policy[1] > policy[0]);
    }

    #[test]
    fn test_softmax_large_logits() {
        let policy = OnnxEvaluator::softmax(&[1000.0, 1000.0]);
        assert!((policy[0] - 0.5).abs() < 1e-6);
        assert!((policy[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_softmax_degenerate() {
        let policy = OnnxEvaluator::softmax(&[f32::NEG_INFINITY, f32::NEG_INFINITY]);
        for p in &policy {
            assert!(p.abs() < 1e-6);
        }
        assert!(OnnxEvaluator::softmax(&[]).is_empty());
    }

    #[test]
    fn test_single_value() {
        assert!((single_value(&[0.25]).unwrap() - 0.25).abs() < 1e-6);
        assert!(matches!(
            single_value(&[]),
            Err(EvaluatorError::ModelError(_))
        ));
        assert!(matches!(
            single_value(&[0.1, 0.2]),
            Err(EvaluatorError::ModelError(_))
        ));
    }

    #[test]
    fn test_load_missing_model() {
        let err = OnnxEvaluator::load("/nonexistent/model.onnx").unwrap_err();
        assert!(matches!(err, EvaluatorError::ModelError(_)));
    }
}
