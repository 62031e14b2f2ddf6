//! Single-position search with a printed root summary.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use engine_core::Rules;
use mcts::{write_dot, EdgeStats, Evaluator, MctsConfig, MctsSearch, SearchResult, TreeStats};
use rand_chacha::ChaCha20Rng;
use tracing::info;

/// Everything printed after a search.
#[derive(Debug, Clone)]
pub struct SearchReport {
    pub fen: String,
    pub result: SearchResult,
    pub edges: Vec<EdgeStats>,
    pub tree: TreeStats,
}

/// Search `fen` once and optionally export the tree to `dot`.
pub fn analyze<R: Rules, E: Evaluator>(
    rules: &R,
    evaluator: &E,
    config: MctsConfig,
    fen: &str,
    dot: Option<&Path>,
    rng: &mut ChaCha20Rng,
) -> Result<SearchReport> {
    let mut search = MctsSearch::new(rules, evaluator, config, fen)
        .with_context(|| format!("Cannot search position '{}'", fen))?;
    let result = search.run(rng)?;

    if let Some(path) = dot {
        write_dot(search.tree(), path)
            .with_context(|| format!("Failed to write DOT file {}", path.display()))?;
    }

    let tree = search.tree();
    let report = SearchReport {
        fen: tree.root().state.clone(),
        result,
        edges: tree.root_edges(),
        tree: tree.stats(),
    };

    info!(
        nodes = report.tree.total_nodes,
        depth = report.tree.max_depth,
        root_visits = report.tree.root_visits,
        "Search finished"
    );

    Ok(report)
}

/// Render the report as a plain-text table, most visited moves first.
pub fn render_report(report: &SearchReport, limit: usize) -> String {
    let mut edges = report.edges.clone();
    // Stable sort keeps move-generation order among equal counts
    edges.sort_by(|a, b| b.visits.cmp(&a.visits));

    let mut out = String::new();
    let _ = writeln!(out, "position: {}", report.fen);
    match report.result.best_move {
        Some(mv) => {
            let _ = writeln!(out, "best move: {}", mv);
        }
        None => {
            let _ = writeln!(out, "best move: none (terminal position)");
        }
    }
    let _ = writeln!(
        out,
        "value: {:+.3} (white)  visits: {}  nodes: {}  depth: {}",
        report.result.value, report.tree.root_visits, report.tree.total_nodes, report.tree.max_depth
    );

    if edges.is_empty() {
        return out;
    }

    let _ = writeln!(out, "{:<8} {:>7} {:>8} {:>8}", "move", "visits", "prior", "Q");
    for edge in edges.iter().take(limit) {
        let _ = writeln!(
            out,
            "{:<8} {:>7} {:>8.4} {:>+8.3}",
            edge.action.to_string(),
            edge.visits,
            edge.prior,
            edge.mean_value
        );
    }
    if edges.len() > limit {
        let _ = writeln!(out, "... {} more", edges.len() - limit);
    }
    out
}
