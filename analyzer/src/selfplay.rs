//! Two-engine self-play.
//!
//! Each side owns its own search tree. Before an engine searches again it
//! commits the pair of moves played since its last search (its own and the
//! reply), keeping the subtree below them when both are in its tree.

use anyhow::{Context, Result};
use engine_core::{ChessMove, Rules};
use mcts::{Evaluator, MctsConfig, MctsSearch, ReuseOutcome};
use rand_chacha::ChaCha20Rng;
use tracing::{debug, info};

use crate::record::{result_string, side_name, tree_label, GameRecord, PlyRecord};

/// Play one game of at most `max_plies` plies starting at `start_fen`.
pub fn play_game<R: Rules, E: Evaluator>(
    rules: &R,
    evaluator: &E,
    config: &MctsConfig,
    start_fen: &str,
    max_plies: u32,
    seed: u64,
    rng: &mut ChaCha20Rng,
) -> Result<GameRecord> {
    let mut board = rules
        .parse(start_fen)
        .with_context(|| format!("Invalid starting position '{}'", start_fen))?;
    let start_fen = rules.to_fen(&board);

    // Indexed by ply parity: slot 0 is the side to move at the start
    let mut engines: [Option<MctsSearch<'_, R, E>>; 2] = [None, None];
    let mut pending: [Vec<ChessMove>; 2] = [Vec::new(), Vec::new()];
    let mut plies = Vec::new();
    let mut outcome = rules.outcome(&board, config.claim_draw);

    for ply in 0..max_plies {
        if outcome.is_some() {
            break;
        }

        let slot = (ply % 2) as usize;
        let fen = rules.to_fen(&board);
        let side = rules.side_to_move(&board);

        let mut reuse: Option<ReuseOutcome> = None;
        let engine = match &mut engines[slot] {
            Some(engine) => {
                let moves = std::mem::take(&mut pending[slot]);
                reuse = Some(match moves[..] {
                    [first, second] => engine.commit_moves(first, second, &fen)?,
                    _ => engine.reuse_subtree(&moves, &fen)?,
                });
                engine
            }
            empty => {
                pending[slot].clear();
                empty.insert(MctsSearch::new(rules, evaluator, config.clone(), &fen)?)
            }
        };

        let result = engine.run(rng)?;
        let Some(mv) = result.best_move else {
            debug!(ply, fen = %fen, "Search found no move, stopping");
            break;
        };

        info!(
            ply,
            side = side_name(side),
            mv = %mv,
            value = format!("{:.3}", result.value),
            root_visits = result.root_visits,
            tree = tree_label(reuse),
            "Played move"
        );

        plies.push(PlyRecord {
            ply,
            side: side_name(side).to_string(),
            uci: mv.to_string(),
            fen,
            value: result.value,
            root_visits: result.root_visits,
            policy: result
                .policy
                .iter()
                .map(|(action, p)| (action.to_string(), *p))
                .collect(),
            tree: tree_label(reuse).to_string(),
        });

        board = rules.play(&board, mv)?;
        for moves in &mut pending {
            moves.push(mv);
        }
        outcome = rules.outcome(&board, config.claim_draw);
    }

    let record = GameRecord {
        start_fen,
        seed,
        simulations: config.num_simulations,
        plies,
        result: result_string(outcome).to_string(),
        termination: outcome.map(|o| format!("{:?}", o.termination)),
        final_fen: rules.to_fen(&board),
    };

    info!(
        plies = record.plies.len(),
        result = %record.result,
        termination = ?record.termination,
        reused = record.reused_count(),
        "Self-play game finished"
    );

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::STARTING_FEN;
    use games_chess::CozyChess;
    use mcts::UniformEvaluator;
    use rand::SeedableRng;

    #[test]
    fn test_selfplay_reuses_trees() {
        let rules = CozyChess::new();
        let evaluator = UniformEvaluator::new();
        let config = MctsConfig::for_testing().with_simulations(16);
        let mut rng = ChaCha20Rng::seed_from_u64(1);

        let record =
            play_game(&rules, &evaluator, &config, STARTING_FEN, 4, 1, &mut rng).unwrap();

        assert_eq!(record.plies.len(), 4);
        assert_eq!(record.result, "*");
        assert!(record.termination.is_none());

        let sides: Vec<&str> = record.plies.iter().map(|p| p.side.as_str()).collect();
        assert_eq!(sides, ["white", "black", "white", "black"]);

        // First search of each engine starts fresh; later ones keep the subtree
        assert_eq!(record.plies[0].tree, "fresh");
        assert_eq!(record.plies[1].tree, "fresh");
        assert_eq!(record.plies[2].tree, "reused");
        assert_eq!(record.plies[3].tree, "reused");
        assert_eq!(record.reused_count(), 2);

        // Every ply keeps the root visit distribution of its search
        let first = &record.plies[0];
        assert_eq!(first.policy.len(), 20);
        let sum: f32 = first.policy.iter().map(|(_, p)| p).sum();
        assert!((sum - 1.0).abs() < 1e-4);
        assert!(first.policy.iter().any(|(uci, _)| *uci == first.uci));
        for ply in &record.plies {
            assert!(!ply.policy.is_empty());
        }
    }

    #[test]
    fn test_selfplay_moves_are_consistent() {
        let rules = CozyChess::new();
        let evaluator = UniformEvaluator::new();
        let config = MctsConfig::for_testing().with_simulations(8);
        let mut rng = ChaCha20Rng::seed_from_u64(5);

        let record =
            play_game(&rules, &evaluator, &config, STARTING_FEN, 6, 5, &mut rng).unwrap();

        // Replaying the recorded moves reaches the final position
        let mut board = rules.parse(STARTING_FEN).unwrap();
        for ply in &record.plies {
            assert_eq!(rules.to_fen(&board), ply.fen);
            board = rules.play(&board, ply.uci.parse().unwrap()).unwrap();
        }
        assert_eq!(rules.to_fen(&board), record.final_fen);
    }

    #[test]
    fn test_selfplay_stops_at_checkmate() {
        let rules = CozyChess::new();
        let evaluator = UniformEvaluator::new();
        let config = MctsConfig::for_testing().with_simulations(200);
        let mut rng = ChaCha20Rng::seed_from_u64(42);

        let record = play_game(
            &rules,
            &evaluator,
            &config,
            "6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1",
            10,
            42,
            &mut rng,
        )
        .unwrap();

        assert_eq!(record.plies.len(), 1);
        assert_eq!(record.plies[0].uci, "a1a8");
        assert_eq!(record.result, "1-0");
        assert_eq!(record.termination.as_deref(), Some("Checkmate"));
    }

    #[test]
    fn test_selfplay_terminal_start() {
        let rules = CozyChess::new();
        let evaluator = UniformEvaluator::new();
        let config = MctsConfig::for_testing();
        let mut rng = ChaCha20Rng::seed_from_u64(0);

        let record = play_game(
            &rules,
            &evaluator,
            &config,
            "k7/2K5/1Q6/8/8/8/8/8 b - - 0 1",
            10,
            0,
            &mut rng,
        )
        .unwrap();

        assert!(record.plies.is_empty());
        assert_eq!(record.result, "1/2-1/2");
        assert_eq!(record.termination.as_deref(), Some("Stalemate"));
    }

    #[test]
    fn test_selfplay_invalid_fen() {
        let rules = CozyChess::new();
        let evaluator = UniformEvaluator::new();
        let config = MctsConfig::for_testing();
        let mut rng = ChaCha20Rng::seed_from_u64(0);

        let err = play_game(&rules, &evaluator, &config, "bogus", 4, 0, &mut rng).unwrap_err();
        assert!(err.to_string().contains("Invalid starting position"));
    }
}
