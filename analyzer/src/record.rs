//! JSON game records for self-play runs.
//!
//! Records are written to `<data_dir>/games/` with a write-then-rename so a
//! reader never sees a partial file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use engine_core::{Color, Outcome};
use mcts::ReuseOutcome;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One move of a self-play game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlyRecord {
    pub ply: u32,
    /// "white" or "black"
    pub side: String,
    /// Move in UCI notation
    pub uci: String,
    /// Position before the move
    pub fen: String,
    /// Root value after the search, White's perspective
    pub value: f32,
    pub root_visits: u32,
    /// Root visit distribution as (UCI move, N / sum N), move-generation order
    pub policy: Vec<(String, f32)>,
    /// "fresh" for an engine's first search, otherwise "reused" or "rebuilt"
    pub tree: String,
}

/// A complete self-play game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecord {
    pub start_fen: String,
    pub seed: u64,
    pub simulations: u32,
    pub plies: Vec<PlyRecord>,
    /// PGN-style result: "1-0", "0-1", "1/2-1/2" or "*" when unfinished
    pub result: String,
    /// How the game ended, absent when the ply limit was reached
    pub termination: Option<String>,
    pub final_fen: String,
}

impl GameRecord {
    /// Number of searches that kept their subtree.
    pub fn reused_count(&self) -> usize {
        self.plies.iter().filter(|p| p.tree == "reused").count()
    }

    /// Write the record as pretty JSON to `<data_dir>/games/selfplay-<seed>.json`.
    pub fn write(&self, data_dir: &Path) -> Result<PathBuf> {
        let dir = data_dir.join("games");
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;

        let path = dir.join(format!("selfplay-{}.json", self.seed));
        let json = serde_json::to_string_pretty(self).context("Failed to serialize game record")?;

        // Write to temp file then rename (atomic on most filesystems)
        let temp_path = path.with_extension("json.tmp");
        let mut file = fs::File::create(&temp_path)
            .with_context(|| format!("Failed to create {}", temp_path.display()))?;
        file.write_all(json.as_bytes())
            .with_context(|| format!("Failed to write {}", temp_path.display()))?;

        if let Err(e) = fs::rename(&temp_path, &path) {
            let _ = fs::remove_file(&temp_path);
            return Err(e).with_context(|| format!("Failed to rename to {}", path.display()));
        }

        debug!("Wrote game record to {}", path.display());
        Ok(path)
    }
}

pub fn side_name(color: Color) -> &'static str {
    match color {
        Color::White => "white",
        Color::Black => "black",
    }
}

pub fn tree_label(reuse: Option<ReuseOutcome>) -> &'static str {
    match reuse {
        None => "fresh",
        Some(ReuseOutcome::Reused) => "reused",
        Some(ReuseOutcome::Rebuilt) => "rebuilt",
    }
}

/// PGN-style result string.
pub fn result_string(outcome: Option<Outcome>) -> &'static str {
    match outcome.map(|o| o.winner) {
        None => "*",
        Some(Some(Color::White)) => "1-0",
        Some(Some(Color::Black)) => "0-1",
        Some(None) => "1/2-1/2",
    }
}
