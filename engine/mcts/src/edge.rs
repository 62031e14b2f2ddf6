//! MCTS tree edge: one legal move and its search statistics.

use engine_core::{relative_value, ChessMove, Color};

use crate::node::Node;

/// A move from its parent node to the child it owns.
#[derive(Debug, Clone)]
pub struct Edge {
    /// Move played along this edge
    pub action: ChessMove,

    /// Prior probability P from the evaluator's policy
    pub prior: f32,

    /// Simulations that passed through this edge (N)
    pub visit_count: u32,

    /// Sum of backpropagated values, White's perspective (W)
    pub value_sum: f32,

    /// Position after `action`
    pub node: Node,
}

impl Edge {
    pub fn new(action: ChessMove, prior: f32, node: Node) -> Self {
        Self {
            action,
            prior,
            visit_count: 0,
            value_sum: 0.0,
            node,
        }
    }

    /// Q = W / N, or 0.0 if never visited.
    #[inline]
    pub fn mean_value(&self) -> f32 {
        if self.visit_count == 0 {
            0.0
        } else {
            self.value_sum / self.visit_count as f32
        }
    }

    /// PUCT score for choosing this edge.
    ///
    /// `Q * sign(mover) + c_puct * P * noise * sqrt(N_parent) / (1 + N)`
    ///
    /// Stored values are from White's perspective, so Q is flipped when the
    /// side choosing among the edges (`mover`) is Black.
    ///
    /// Takes pre-computed sqrt(parent_visits) to avoid redundant sqrt calls
    /// when comparing multiple edges.
    #[inline]
    pub fn upper_confidence_bound(
        &self,
        parent_visits_sqrt: f32,
        c_puct: f32,
        noise: f32,
        mover: Color,
    ) -> f32 {
        let q = relative_value(self.mean_value(), mover);
        let u = c_puct * self.prior * noise * parent_visits_sqrt / (1.0 + self.visit_count as f32);
        q + u
    }

    /// The node this edge leads to.
    #[inline]
    pub fn output_node(&self) -> &Node {
        &self.node
    }
}
