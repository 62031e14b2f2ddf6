//! MCTS tree node representation.
//!
//! Each node is one chess position. A node owns its outgoing edges and every
//! edge owns the node it leads to, so the whole tree hangs off the root and a
//! subtree is dropped together with its parent edge.

use engine_core::{ChessMove, Color, Rules, RulesError};

use crate::edge::Edge;

/// A node in the MCTS tree.
#[derive(Debug, Clone, Default)]
pub struct Node {
    /// Position as FEN
    pub state: String,

    /// Side to move in `state`
    pub turn: Color,

    /// Outgoing edges in legal-move order. Empty until expanded, and stays
    /// empty for terminal positions.
    pub edges: Vec<Edge>,

    /// Selections as a simulation leaf plus backpropagations through
    /// one of this node's edges.
    pub visit_count: u32,

    /// Value estimate from White's perspective, set at expansion
    pub value: f32,

    /// Whether expansion has run
    pub expanded: bool,
}

impl Node {
    pub fn new(state: impl Into<String>, turn: Color) -> Self {
        Self {
            state: state.into(),
            turn,
            ..Default::default()
        }
    }

    /// True until the node has children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.edges.is_empty()
    }

    /// Expanded without children: the game is over in this position.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.expanded && self.edges.is_empty()
    }

    /// Append an edge for `action` leading to a fresh node at `child_state`.
    ///
    /// # Panics
    /// If this node already has an edge for `action`.
    pub fn add_child(
        &mut self,
        child_state: impl Into<String>,
        action: ChessMove,
        prior: f32,
    ) -> &mut Edge {
        assert!(
            self.get_edge(action).is_none(),
            "duplicate action {} in {}",
            action,
            self.state
        );
        let child = Node::new(child_state, self.turn.opponent());
        self.edges.push(Edge::new(action, prior, child));
        let last = self.edges.len() - 1;
        &mut self.edges[last]
    }

    pub fn get_edge(&self, action: ChessMove) -> Option<&Edge> {
        self.edges.iter().find(|e| e.action == action)
    }

    pub fn get_edge_mut(&mut self, action: ChessMove) -> Option<&mut Edge> {
        self.edges.iter_mut().find(|e| e.action == action)
    }

    pub fn edge_index(&self, action: ChessMove) -> Option<usize> {
        self.edges.iter().position(|e| e.action == action)
    }

    /// The node reached by `action`, if that edge exists.
    pub fn child(&self, action: ChessMove) -> Option<&Node> {
        self.get_edge(action).map(|e| &e.node)
    }

    /// FEN after playing `action` from this node's position.
    pub fn step<R: Rules>(&self, rules: &R, action: ChessMove) -> Result<String, RulesError> {
        rules.step(&self.state, action)
    }

    /// Follow edge indices from this node.
    ///
    /// # Panics
    /// If an index is out of range.
    pub fn descendant(&self, path: &[usize]) -> &Node {
        path.iter().fold(self, |node, &i| &node.edges[i].node)
    }

    /// Mutable form of [`Node::descendant`].
    pub fn descendant_mut(&mut self, path: &[usize]) -> &mut Node {
        let mut node = self;
        for &i in path {
            node = &mut node.edges[i].node;
        }
        node
    }

    /// Number of nodes in this subtree, including this one.
    pub fn subtree_size(&self) -> usize {
        1 + self.edges.iter().map(|e| e.node.subtree_size()).sum::<usize>()
    }

    /// Longest edge chain below this node.
    pub fn max_depth(&self) -> u32 {
        self.edges
            .iter()
            .map(|e| e.node.max_depth() + 1)
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::STARTING_FEN;
    use games_chess::CozyChess;

    fn mv(uci: &str) -> ChessMove {
        ChessMove::from_uci(uci).unwrap()
    }

    #[test]
    fn test_new_node() {
        let node = Node::new(STARTING_FEN, Color::White);

        assert_eq!(node.state, STARTING_FEN);
        assert_eq!(node.visit_count, 0);
        assert!(node.is_leaf());
        assert!(!node.is_terminal());
        assert!(!node.expanded);
    }

    #[test]
    fn test_add_child() {
        let mut node = Node::new(STARTING_FEN, Color::White);
        let edge = node.add_child("child", mv("e2e4"), 0.25);

        assert_eq!(edge.action, mv("e2e4"));
        assert!((edge.prior - 0.25).abs() < 1e-6);
        assert_eq!(edge.visit_count, 0);
        assert!((edge.value_sum).abs() < 1e-6);
        assert_eq!(edge.node.turn, Color::Black);

        assert!(!node.is_leaf());
        assert_eq!(node.child(mv("e2e4")).unwrap().state, "child");
        assert!(node.get_edge(mv("d2d4")).is_none());
        assert_eq!(node.edge_index(mv("e2e4")), Some(0));
    }

    #[test]
    #[should_panic(expected = "duplicate action")]
    fn test_add_child_duplicate_panics() {
        let mut node = Node::new(STARTING_FEN, Color::White);
        node.add_child("a", mv("e2e4"), 0.5);
        node.add_child("b", mv("e2e4"), 0.5);
    }

    #[test]
    fn test_terminal_vs_leaf() {
        let mut node = Node::new("8/8/8/8/8/8/8/8 w - - 0 1", Color::White);
        node.expanded = true;
        assert!(node.is_leaf());
        assert!(node.is_terminal());
    }

    #[test]
    fn test_step_is_pure() {
        let rules = CozyChess::new();
        let node = Node::new(STARTING_FEN, Color::White);

        let next = node.step(&rules, mv("e2e4")).unwrap();
        assert_ne!(next, STARTING_FEN);
        assert_eq!(node.state, STARTING_FEN);
        assert!(node.is_leaf());

        assert!(node.step(&rules, mv("e2e5")).is_err());
    }

    #[test]
    fn test_descendants_and_shape() {
        let mut root = Node::new("root", Color::White);
        root.add_child("a", mv("e2e4"), 0.5);
        root.add_child("b", mv("d2d4"), 0.5);
        root.edges[1].node.add_child("c", mv("d7d5"), 1.0);

        assert_eq!(root.descendant(&[]).state, "root");
        assert_eq!(root.descendant(&[1, 0]).state, "c");
        root.descendant_mut(&[1, 0]).visit_count = 3;
        assert_eq!(root.descendant(&[1, 0]).visit_count, 3);

        assert_eq!(root.subtree_size(), 4);
        assert_eq!(root.max_depth(), 2);
    }
}
