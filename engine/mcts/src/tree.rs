//! MCTS tree structure with owned nodes.
//!
//! The root owns the whole tree. A simulation addresses a node by the path
//! of edge indices leading to it from the root; a node's parent is the
//! previous step of that path. Re-rooting moves a subtree out of its parent
//! edge and drops everything else.

use engine_core::{ChessMove, Color};

use crate::node::Node;

/// Search statistics of one root edge.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeStats {
    pub action: ChessMove,
    pub visits: u32,
    pub prior: f32,
    /// Mean value Q, White's perspective
    pub mean_value: f32,
}

/// MCTS tree rooted at the current game position.
#[derive(Debug, Clone)]
pub struct MctsTree {
    root: Node,
}

impl MctsTree {
    /// Create a new single-node tree.
    pub fn new(root_state: impl Into<String>, turn: Color) -> Self {
        Self {
            root: Node::new(root_state, turn),
        }
    }

    #[inline]
    pub fn root(&self) -> &Node {
        &self.root
    }

    #[inline]
    pub fn root_mut(&mut self) -> &mut Node {
        &mut self.root
    }

    /// Node at the end of `path` (edge indices from the root).
    #[inline]
    pub fn node_at(&self, path: &[usize]) -> &Node {
        self.root.descendant(path)
    }

    #[inline]
    pub fn node_at_mut(&mut self, path: &[usize]) -> &mut Node {
        self.root.descendant_mut(path)
    }

    /// Total number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.root.subtree_size()
    }

    /// Always false: a tree has at least its root.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Select the best edge of the node at `path` by PUCT score.
    ///
    /// `noise` holds one multiplier per edge, or `None` for no noise.
    /// The first edge with the strictly greatest score wins; `None` if the
    /// node has no edges.
    pub fn select_child(&self, path: &[usize], c_puct: f32, noise: Option<&[f32]>) -> Option<usize> {
        let node = self.node_at(path);
        // Pre-compute sqrt once instead of per-edge comparison
        let parent_visits_sqrt = (node.visit_count as f32).sqrt();

        let mut best = None;
        let mut best_score = f32::NEG_INFINITY;
        for (i, edge) in node.edges.iter().enumerate() {
            let n = noise.map_or(1.0, |noise| noise[i]);
            let score = edge.upper_confidence_bound(parent_visits_sqrt, c_puct, n, node.turn);
            if score > best_score {
                best_score = score;
                best = Some(i);
            }
        }
        best
    }

    /// Backpropagate a value along `path`.
    ///
    /// For every edge on the path the owning node gains a visit, and the edge
    /// gains a visit and `value`. The value is White-relative and is added
    /// unchanged at every level.
    pub fn backpropagate(&mut self, path: &[usize], value: f32) {
        let mut node = &mut self.root;
        for &i in path {
            node.visit_count += 1;
            let edge = &mut node.edges[i];
            edge.visit_count += 1;
            edge.value_sum += value;
            node = &mut edge.node;
        }
    }

    /// Promote the node reached by playing `moves` from the root.
    ///
    /// Returns false, leaving the tree untouched, if any move has no edge.
    pub fn reroot(&mut self, moves: &[ChessMove]) -> bool {
        let mut path = Vec::with_capacity(moves.len());
        let mut node = &self.root;
        for &mv in moves {
            match node.edge_index(mv) {
                Some(i) => {
                    path.push(i);
                    node = &node.edges[i].node;
                }
                None => return false,
            }
        }

        let Some((&last, parent_path)) = path.split_last() else {
            return true;
        };
        let parent = self.root.descendant_mut(parent_path);
        let new_root = std::mem::take(&mut parent.edges[last].node);
        self.root = new_root;
        true
    }

    /// Replace the whole tree with a single unexpanded node.
    pub fn reset(&mut self, root_state: impl Into<String>, turn: Color) {
        self.root = Node::new(root_state, turn);
    }

    /// Most visited root edge as (action, visit_count).
    /// The first-enumerated edge wins ties. None if the root has no edges.
    pub fn best_action(&self) -> Option<(ChessMove, u32)> {
        let mut best: Option<(ChessMove, u32)> = None;
        for edge in &self.root.edges {
            if best.map_or(true, |(_, visits)| edge.visit_count > visits) {
                best = Some((edge.action, edge.visit_count));
            }
        }
        best
    }

    /// Root visit distribution N(e) / sum(N) in edge order.
    /// Empty if the root has no visited edges.
    pub fn visit_policy(&self) -> Vec<(ChessMove, f32)> {
        let total: u32 = self.root.edges.iter().map(|e| e.visit_count).sum();
        if total == 0 {
            return Vec::new();
        }
        self.root
            .edges
            .iter()
            .map(|e| (e.action, e.visit_count as f32 / total as f32))
            .collect()
    }

    /// Snapshot of every root edge.
    pub fn root_edges(&self) -> Vec<EdgeStats> {
        self.root
            .edges
            .iter()
            .map(|e| EdgeStats {
                action: e.action,
                visits: e.visit_count,
                prior: e.prior,
                mean_value: e.mean_value(),
            })
            .collect()
    }

    /// Visit-weighted mean of the root edges' values, White's perspective.
    /// Falls back to the root's own value before any edge is visited.
    pub fn root_value(&self) -> f32 {
        let (visits, value_sum) = self
            .root
            .edges
            .iter()
            .fold((0u32, 0.0f32), |(n, w), e| (n + e.visit_count, w + e.value_sum));
        if visits == 0 {
            self.root.value
        } else {
            value_sum / visits as f32
        }
    }

    /// Get statistics about the tree for debugging.
    pub fn stats(&self) -> TreeStats {
        TreeStats {
            total_nodes: self.len(),
            root_visits: self.root.visit_count,
            root_value: self.root_value(),
            max_depth: self.root.max_depth(),
        }
    }
}

/// Statistics about an MCTS tree.
#[derive(Debug, Clone)]
pub struct TreeStats {
    pub total_nodes: usize,
    pub root_visits: u32,
    pub root_value: f32,
    pub max_depth: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mv(uci: &str) -> ChessMove {
        ChessMove::from_uci(uci).unwrap()
    }

    /// root -> (e2e4, d2d4); e2e4 -> e7e5
    fn small_tree() -> MctsTree {
        let mut tree = MctsTree::new("root", Color::White);
        let root = tree.root_mut();
        root.expanded = true;
        root.add_child("e4", mv("e2e4"), 0.6);
        root.add_child("d4", mv("d2d4"), 0.4);
        let e4 = &mut root.edges[0].node;
        e4.expanded = true;
        e4.add_child("e4e5", mv("e7e5"), 1.0);
        tree
    }

    #[test]
    fn test_new_tree() {
        let tree = MctsTree::new("start", Color::White);

        assert_eq!(tree.len(), 1);
        assert!(!tree.is_empty());
        assert_eq!(tree.root().state, "start");
        assert!(tree.root().is_leaf());
    }

    #[test]
    fn test_node_at() {
        let tree = small_tree();
        assert_eq!(tree.node_at(&[]).state, "root");
        assert_eq!(tree.node_at(&[0]).state, "e4");
        assert_eq!(tree.node_at(&[0, 0]).state, "e4e5");
        assert_eq!(tree.node_at(&[1]).turn, Color::Black);
    }

    #[test]
    fn test_backpropagate() {
        let mut tree = small_tree();

        // Leaf visit is counted by the search before backpropagation
        tree.node_at_mut(&[0, 0]).visit_count += 1;
        tree.backpropagate(&[0, 0], 1.0);

        assert_eq!(tree.root().visit_count, 1);
        assert_eq!(tree.node_at(&[0]).visit_count, 1);
        assert_eq!(tree.node_at(&[0, 0]).visit_count, 1);

        // Same value at every level
        let root_edge = &tree.root().edges[0];
        assert_eq!(root_edge.visit_count, 1);
        assert!((root_edge.value_sum - 1.0).abs() < 1e-6);
        let inner_edge = &tree.node_at(&[0]).edges[0];
        assert_eq!(inner_edge.visit_count, 1);
        assert!((inner_edge.value_sum - 1.0).abs() < 1e-6);

        // Untouched sibling
        assert_eq!(tree.root().edges[1].visit_count, 0);
    }

    #[test]
    fn test_select_child_prefers_prior_when_unvisited() {
        let mut tree = small_tree();
        tree.root_mut().visit_count = 1;

        // Higher prior wins when nothing has been visited
        assert_eq!(tree.select_child(&[], 1.0, None), Some(0));

        // Noise can flip the choice
        assert_eq!(tree.select_child(&[], 1.0, Some(&[0.1, 1.0])), Some(1));
    }

    #[test]
    fn test_select_child_ties_go_to_first_edge() {
        let mut tree = MctsTree::new("root", Color::White);
        let root = tree.root_mut();
        root.add_child("a", mv("a2a3"), 0.5);
        root.add_child("b", mv("b2b3"), 0.5);
        root.visit_count = 1;

        assert_eq!(tree.select_child(&[], 1.25, None), Some(0));
    }

    #[test]
    fn test_select_child_uses_mover_perspective() {
        let mut tree = MctsTree::new("root", Color::Black);
        let root = tree.root_mut();
        root.visit_count = 3;
        root.add_child("a", mv("a7a6"), 0.5);
        root.add_child("b", mv("b7b6"), 0.5);
        // White won through edge 0, Black through edge 1
        root.edges[0].visit_count = 1;
        root.edges[0].value_sum = 1.0;
        root.edges[1].visit_count = 1;
        root.edges[1].value_sum = -1.0;

        assert_eq!(tree.select_child(&[], 1.0, None), Some(1));
    }

    #[test]
    fn test_select_child_without_edges() {
        let tree = MctsTree::new("root", Color::White);
        assert_eq!(tree.select_child(&[], 1.0, None), None);
    }

    #[test]
    fn test_reroot() {
        let mut tree = small_tree();
        tree.node_at_mut(&[0, 0]).visit_count = 7;

        assert!(tree.reroot(&[mv("e2e4"), mv("e7e5")]));
        assert_eq!(tree.root().state, "e4e5");
        assert_eq!(tree.root().visit_count, 7);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_reroot_missing_edge_leaves_tree() {
        let mut tree = small_tree();

        assert!(!tree.reroot(&[mv("e2e4"), mv("c7c5")]));
        assert!(!tree.reroot(&[mv("d2d4"), mv("d7d5")]));
        assert_eq!(tree.root().state, "root");
        assert_eq!(tree.len(), 4);

        // Empty move list keeps the current root
        assert!(tree.reroot(&[]));
        assert_eq!(tree.root().state, "root");
    }

    #[test]
    fn test_best_action_and_policy() {
        let mut tree = small_tree();
        tree.root_mut().edges[0].visit_count = 30;
        tree.root_mut().edges[1].visit_count = 70;

        assert_eq!(tree.best_action(), Some((mv("d2d4"), 70)));

        let policy = tree.visit_policy();
        assert_eq!(policy.len(), 2);
        assert_eq!(policy[0].0, mv("e2e4"));
        assert!((policy[0].1 - 0.3).abs() < 1e-6);
        assert!((policy[1].1 - 0.7).abs() < 1e-6);

        // Ties go to the first edge
        tree.root_mut().edges[0].visit_count = 70;
        assert_eq!(tree.best_action(), Some((mv("e2e4"), 70)));
    }

    #[test]
    fn test_empty_policy_before_visits() {
        let tree = small_tree();
        assert!(tree.visit_policy().is_empty());
        assert_eq!(tree.best_action(), Some((mv("e2e4"), 0)));
        assert_eq!(MctsTree::new("x", Color::White).best_action(), None);
    }

    #[test]
    fn test_root_edges_and_value() {
        let mut tree = small_tree();
        tree.root_mut().value = 0.25;
        assert!((tree.root_value() - 0.25).abs() < 1e-6);

        {
            let root = tree.root_mut();
            root.edges[0].visit_count = 2;
            root.edges[0].value_sum = 1.0;
            root.edges[1].visit_count = 2;
            root.edges[1].value_sum = -2.0;
        }

        let edges = tree.root_edges();
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].action, mv("e2e4"));
        assert_eq!(edges[0].visits, 2);
        assert!((edges[0].prior - 0.6).abs() < 1e-6);
        assert!((edges[0].mean_value - 0.5).abs() < 1e-6);
        assert!((edges[1].mean_value + 1.0).abs() < 1e-6);

        assert!((tree.root_value() + 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_tree_stats() {
        let tree = small_tree();

        let stats = tree.stats();
        assert_eq!(stats.total_nodes, 4);
        assert_eq!(stats.max_depth, 2);
        assert_eq!(stats.root_visits, 0);
    }
}
