use crate::board::Color;
use crate::error::{EngineError, EngineResult};
use crate::evaluation::Evaluator;
use crate::movegen::{Move, MoveGenerator};
use crate::position::Position;
use crate::time_control::Deadline;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, info, warn};

/// Starting value for the maximizer and lower window bound. Evaluator output
/// stays well inside (-999, 999), so a node returning exactly this value had
/// no legal move to try.
pub const NEG_INFINITY: i32 = -999;
pub const POS_INFINITY: i32 = 999;

/// What an expansion returns once the time budget has run out.
pub const TIMEOUT_SCORE: i32 = 0;

pub const DEFAULT_MAX_DEPTH: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// Deepest search run per root move, in plies below the root move.
    pub max_depth: u32,
    /// Fixed seed for the tie-break draw. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            seed: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchResult {
    pub best_move: Move,
    /// Highest completed score, or `None` if time ran out before any.
    pub best_score: Option<i32>,
    /// Every root move that reached `best_score`; `best_move` is drawn from these.
    pub candidates: Vec<Move>,
    /// Number of (root move, depth) searches that finished inside the budget.
    pub completed: usize,
    pub nodes: u64,
}

pub struct Search {
    evaluator: Evaluator,
    move_generator: MoveGenerator,
    max_depth: u32,
    nodes_searched: u64,
    rng: StdRng,
}

impl Default for Search {
    fn default() -> Self {
        Self::new()
    }
}

impl Search {
    pub fn new() -> Self {
        Self::with_config(&SearchConfig::default())
    }

    pub fn with_config(config: &SearchConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            evaluator: Evaluator::new(),
            move_generator: MoveGenerator::new(),
            max_depth: config.max_depth,
            nodes_searched: 0,
            rng,
        }
    }

    /// Picks a move for `side`.
    ///
    /// Every legal root move is searched at each depth from 0 to the maximum,
    /// each run starting from scratch. The moves sharing the best score seen
    /// over all runs form the candidate set and one of them is drawn at
    /// random. A run cut short by the deadline is discarded and no further
    /// runs start.
    pub fn find_best_move(
        &mut self,
        position: &Position,
        side: Color,
        deadline: &Deadline,
    ) -> EngineResult<SearchResult> {
        self.find_best_move_to_depth(position, side, deadline, self.max_depth)
    }

    /// Same as [`Search::find_best_move`] with `max_depth` for this call only.
    pub fn find_best_move_to_depth(
        &mut self,
        position: &Position,
        side: Color,
        deadline: &Deadline,
        max_depth: u32,
    ) -> EngineResult<SearchResult> {
        self.nodes_searched = 0;

        let root = self.move_generator.generate_successors(position, side);
        if root.is_empty() {
            return Err(EngineError::NoLegalMove { side });
        }

        let mut best_score = None;
        let mut candidates: Vec<Move> = Vec::new();
        let mut completed = 0;

        'root: for node in &root {
            for depth in 0..=max_depth {
                if deadline.is_expired() {
                    break 'root;
                }

                let score = self.alpha_beta(
                    &node.position,
                    depth,
                    side,
                    false,
                    NEG_INFINITY,
                    POS_INFINITY,
                    deadline,
                );
                if deadline.is_expired() {
                    debug!(mv = %node.mv, depth, "time budget exceeded, discarding run");
                    break 'root;
                }

                completed += 1;
                debug!(mv = %node.mv, depth, score, "root move searched");

                match best_score {
                    Some(best) if score < best => {}
                    Some(best) if score == best => {
                        if !candidates.contains(&node.mv) {
                            candidates.push(node.mv);
                        }
                    }
                    _ => {
                        best_score = Some(score);
                        candidates.clear();
                        candidates.push(node.mv);
                    }
                }
            }
        }

        if candidates.is_empty() {
            warn!(
                legal_moves = root.len(),
                "no search finished inside the time budget, choosing among all legal moves"
            );
            candidates = root.iter().map(|node| node.mv).collect();
        }

        let best_move = *candidates
            .choose(&mut self.rng)
            .ok_or(EngineError::NoLegalMove { side })?;

        info!(
            %best_move,
            score = ?best_score,
            candidates = candidates.len(),
            completed,
            nodes = self.nodes_searched,
            max_depth,
            budget = ?deadline.budget(),
            elapsed_ms = deadline.elapsed().as_millis() as u64,
            "search finished"
        );

        Ok(SearchResult {
            best_move,
            best_score,
            candidates,
            completed,
            nodes: self.nodes_searched,
        })
    }

    /// Minimax with alpha-beta pruning, scored from `perspective`'s side.
    ///
    /// `perspective` moves at maximizing plies and its opponent at minimizing
    /// ones. The search stops at depth 0 or when the opponent's king is gone
    /// from the board, which stands in for checkmate. A node without legal
    /// moves keeps its starting bound, so `NEG_INFINITY` or `POS_INFINITY`
    /// comes back. The deadline is sampled before each child; once it has
    /// passed the node gives up and returns `TIMEOUT_SCORE`.
    #[allow(clippy::too_many_arguments)]
    pub fn alpha_beta(
        &mut self,
        position: &Position,
        depth: u32,
        perspective: Color,
        maximizing: bool,
        mut alpha: i32,
        mut beta: i32,
        deadline: &Deadline,
    ) -> i32 {
        self.nodes_searched += 1;

        let board = &position.board;
        if depth == 0 || board.find_king(perspective.opposite()).is_none() {
            return self.evaluator.evaluate(board, perspective);
        }

        let side = if maximizing { perspective } else { perspective.opposite() };
        let children = self.move_generator.generate_successors(position, side);

        if maximizing {
            let mut value = NEG_INFINITY;
            for child in &children {
                if deadline.is_expired() {
                    return TIMEOUT_SCORE;
                }
                let score = self.alpha_beta(&child.position, depth - 1, perspective, false, alpha, beta, deadline);
                value = value.max(score);
                alpha = alpha.max(value);
                if alpha >= beta {
                    break;
                }
            }
            value
        } else {
            let mut value = POS_INFINITY;
            for child in &children {
                if deadline.is_expired() {
                    return TIMEOUT_SCORE;
                }
                let score = self.alpha_beta(&child.position, depth - 1, perspective, true, alpha, beta, deadline);
                value = value.min(score);
                beta = beta.min(value);
                if alpha >= beta {
                    break;
                }
            }
            value
        }
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn get_nodes_searched(&self) -> u64 {
        self.nodes_searched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn seeded(max_depth: u32) -> Search {
        Search::with_config(&SearchConfig {
            max_depth,
            seed: Some(7),
        })
    }

    fn position(fen: &str) -> Position {
        Position::from_fen(fen).unwrap()
    }

    /// Reference minimax without pruning, same terminal rules.
    fn minimax(search: &Search, position: &Position, depth: u32, perspective: Color, maximizing: bool) -> i32 {
        let board = &position.board;
        if depth == 0 || board.find_king(perspective.opposite()).is_none() {
            return search.evaluator.evaluate(board, perspective);
        }
        let side = if maximizing { perspective } else { perspective.opposite() };
        let children = search.move_generator.generate_successors(position, side);
        let scores = children
            .iter()
            .map(|child| minimax(search, &child.position, depth - 1, perspective, !maximizing));
        if maximizing {
            scores.fold(NEG_INFINITY, i32::max)
        } else {
            scores.fold(POS_INFINITY, i32::min)
        }
    }

    #[test]
    fn test_pruning_matches_plain_minimax() {
        let fens = [
            "k7/8/8/3p4/4P3/8/8/7K w - - 0 1",
            "4k3/8/8/8/8/8/3n4/R3K3 w - - 0 1",
            "6k1/5ppp/8/8/8/8/5PPP/R5K1 b - - 0 1",
            "7k/8/8/q7/8/8/8/R6K w - - 0 1",
        ];
        let mut search = seeded(3);
        let deadline = Deadline::unbounded();
        for fen in fens {
            let position = position(fen);
            for side in [Color::White, Color::Black] {
                for depth in 1..=3 {
                    let pruned = search.alpha_beta(
                        &position,
                        depth,
                        side,
                        true,
                        NEG_INFINITY,
                        POS_INFINITY,
                        &deadline,
                    );
                    let plain = minimax(&search, &position, depth, side, true);
                    assert_eq!(pruned, plain, "{} {} depth {}", fen, side, depth);
                }
            }
        }
    }

    #[test]
    fn test_pruning_visits_fewer_nodes() {
        let position = position("4k3/8/8/8/8/8/3n4/R3K3 w - - 0 1");
        let mut search = seeded(3);
        let deadline = Deadline::unbounded();
        search.alpha_beta(&position, 3, Color::White, true, NEG_INFINITY, POS_INFINITY, &deadline);
        let pruned_nodes = search.get_nodes_searched();

        let mut full = 0u64;
        fn count(generator: &MoveGenerator, position: &Position, depth: u32, side: Color, nodes: &mut u64) {
            *nodes += 1;
            if depth == 0 {
                return;
            }
            for child in generator.generate_successors(position, side) {
                count(generator, &child.position, depth - 1, side.opposite(), nodes);
            }
        }
        count(&MoveGenerator::new(), &position, 3, Color::White, &mut full);
        assert!(pruned_nodes < full);
    }

    #[test]
    fn test_missing_opponent_king_is_terminal() {
        let position = position("8/8/8/8/8/8/8/R6K w - - 0 1");
        let mut search = seeded(3);
        let score = search.alpha_beta(
            &position,
            3,
            Color::White,
            true,
            NEG_INFINITY,
            POS_INFINITY,
            &Deadline::unbounded(),
        );
        assert_eq!(score, search.evaluator.evaluate(&position.board, Color::White));
        assert_eq!(score, 5);
        assert_eq!(search.get_nodes_searched(), 1);
    }

    #[test]
    fn test_depth_override_applies_to_one_call() {
        let mut search = seeded(DEFAULT_MAX_DEPTH);
        let result = search
            .find_best_move_to_depth(&Position::new(), Color::White, &Deadline::unbounded(), 0)
            .unwrap();
        assert_eq!(result.completed, 20);
        assert_eq!(search.max_depth(), DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_captures_hanging_queen() {
        let position = position("7k/8/8/q7/8/8/8/R6K w - - 0 1");
        let mut search = seeded(2);
        let result = search
            .find_best_move(&position, Color::White, &Deadline::unbounded())
            .unwrap();
        assert_eq!(result.best_move.to_string(), "a1a5");
        assert_eq!(result.candidates.len(), 1);
        let root_moves = MoveGenerator::new().generate_moves(&position, Color::White).len();
        assert_eq!(result.completed, 3 * root_moves);
    }

    #[test]
    fn test_finds_back_rank_mate() {
        let position = position("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1");
        let mut search = seeded(1);
        let result = search
            .find_best_move(&position, Color::White, &Deadline::unbounded())
            .unwrap();
        assert_eq!(result.best_move.to_string(), "a1a8");
        assert_eq!(result.best_score, Some(POS_INFINITY));
    }

    #[test]
    fn test_ties_are_collected() {
        let mut search = seeded(0);
        let result = search
            .find_best_move(&Position::new(), Color::White, &Deadline::unbounded())
            .unwrap();
        assert_eq!(result.best_score, Some(0));
        assert_eq!(result.candidates.len(), 20);
        assert!(result.candidates.contains(&result.best_move));
    }

    #[test]
    fn test_same_seed_same_choice() {
        let pick = || {
            seeded(0)
                .find_best_move(&Position::new(), Color::Black, &Deadline::unbounded())
                .unwrap()
                .best_move
        };
        assert_eq!(pick(), pick());
    }

    #[test]
    fn test_no_legal_move() {
        let mut search = seeded(2);
        let mated = position("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3");
        let err = search
            .find_best_move(&mated, Color::White, &Deadline::unbounded())
            .unwrap_err();
        assert_eq!(err, EngineError::NoLegalMove { side: Color::White });

        let stalemated = position("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
        let err = search
            .find_best_move(&stalemated, Color::Black, &Deadline::unbounded())
            .unwrap_err();
        assert_eq!(err, EngineError::NoLegalMove { side: Color::Black });
    }

    #[test]
    fn test_expired_budget_still_returns_legal_move() {
        let position = Position::new();
        let mut search = seeded(DEFAULT_MAX_DEPTH);
        let deadline = Deadline::new(Duration::ZERO);
        std::thread::sleep(Duration::from_millis(1));

        let result = search.find_best_move(&position, Color::White, &deadline).unwrap();
        assert_eq!(result.completed, 0);
        assert_eq!(result.best_score, None);
        assert_eq!(result.candidates.len(), 20);
        assert!(MoveGenerator::new().is_move_legal(&position, Color::White, &result.best_move));
    }

    #[test]
    fn test_timeout_returns_neutral_score() {
        let position = Position::new();
        let mut search = seeded(DEFAULT_MAX_DEPTH);
        let deadline = Deadline::new(Duration::ZERO);
        std::thread::sleep(Duration::from_millis(1));

        let score = search.alpha_beta(&position, 3, Color::White, true, NEG_INFINITY, POS_INFINITY, &deadline);
        assert_eq!(score, TIMEOUT_SCORE);
        assert_eq!(search.get_nodes_searched(), 1);
    }
}
