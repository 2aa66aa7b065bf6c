use std::time::Duration;

use tracing::{debug, info};

use crate::board::Color;
use crate::error::EngineResult;
use crate::movegen::Move;
use crate::position::Position;
use crate::search::{Search, SearchConfig};
use crate::time_control::{allocate_budget_nanos, Deadline};

/// What the game host hands over at the start of each turn.
#[derive(Debug, Clone, Copy)]
pub struct TurnRequest<'a> {
    pub fen: &'a str,
    pub color: Color,
    /// Clock left for `color`, in nanoseconds.
    pub remaining_ns: u64,
    /// Number of moves played so far in the game.
    pub history_len: usize,
}

impl TurnRequest<'_> {
    pub fn is_first_move(&self) -> bool {
        self.history_len == 0
    }
}

/// The engine as seen by a game host. Nothing about the game is remembered
/// between turns except the random source used for tie-breaks.
pub struct Player {
    search: Search,
}

impl Player {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            search: Search::with_config(config),
        }
    }

    /// Depth used when a turn does not ask for one.
    pub fn max_depth(&self) -> u32 {
        self.search.max_depth()
    }

    pub fn game_started(&self, color: Color) {
        info!(%color, max_depth = self.max_depth(), "game started");
    }

    pub fn game_updated(&self) {
        debug!("game updated");
    }

    pub fn game_ended(&self, won: bool, reason: &str) {
        info!(won, reason, "game ended");
    }

    /// Decides one turn and returns the move text for the host.
    pub fn make_move(&mut self, turn: &TurnRequest) -> EngineResult<String> {
        let position = Position::from_fen(turn.fen)?;
        debug!(first_move = turn.is_first_move(), "board before move:\n{}", position.board);

        let budget = allocate_budget_nanos(turn.remaining_ns);
        let mv = self.choose_move(&position, turn.color, budget, None)?;
        Ok(mv.to_string())
    }

    /// Searches `position` for `side` within `budget`. `max_depth` overrides
    /// the configured depth for this turn only.
    pub fn choose_move(
        &mut self,
        position: &Position,
        side: Color,
        budget: Duration,
        max_depth: Option<u32>,
    ) -> EngineResult<Move> {
        let max_depth = max_depth.unwrap_or_else(|| self.max_depth());
        info!(%side, budget_ms = budget.as_millis() as u64, max_depth, "thinking");
        let deadline = Deadline::new(budget);
        let result = self
            .search
            .find_best_move_to_depth(position, side, &deadline, max_depth)?;
        Ok(result.best_move)
    }
}
