use thiserror::Error;

use crate::board::Color;

/// Reasons a position text could not be decoded into a board.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FenParseError {
    #[error("expected at least 4 space-separated fields, found {found}")]
    MissingFields { found: usize },

    #[error("expected 8 ranks, found {found}")]
    MissingRanks { found: usize },

    #[error("rank {rank} expands to {columns} columns, expected 8")]
    ShortRank { rank: usize, columns: usize },
}

/// Errors that make a turn fail. The host should treat either as a forfeit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("invalid position: {0}")]
    Fen(#[from] FenParseError),

    #[error("{side} has no legal move")]
    NoLegalMove { side: Color },
}

pub type EngineResult<T> = Result<T, EngineError>;
