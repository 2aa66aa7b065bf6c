use std::fmt;

use crate::board::{file_of, parse_square, rank_of, Board, Color, Piece};
use crate::error::FenParseError;
use crate::movegen::Move;

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// The four castling flags, one bit each: `K`, `Q`, `k`, `q`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const WHITE_KINGSIDE: CastlingRights = CastlingRights(0b0001);
    pub const WHITE_QUEENSIDE: CastlingRights = CastlingRights(0b0010);
    pub const BLACK_KINGSIDE: CastlingRights = CastlingRights(0b0100);
    pub const BLACK_QUEENSIDE: CastlingRights = CastlingRights(0b1000);
    pub const NONE: CastlingRights = CastlingRights(0);
    pub const ALL: CastlingRights = CastlingRights(0b1111);

    /// Reads the castling field of a position text. A flag is present only
    /// when its exact letter appears; anything else is ignored.
    pub fn from_field(field: &str) -> Self {
        field.chars().fold(Self::NONE, |rights, flag| match flag {
            'K' => rights.with(Self::WHITE_KINGSIDE),
            'Q' => rights.with(Self::WHITE_QUEENSIDE),
            'k' => rights.with(Self::BLACK_KINGSIDE),
            'q' => rights.with(Self::BLACK_QUEENSIDE),
            _ => rights,
        })
    }

    pub fn has(&self, right: CastlingRights) -> bool {
        self.0 & right.0 != 0
    }

    pub fn with(self, right: CastlingRights) -> Self {
        CastlingRights(self.0 | right.0)
    }

    pub fn without(self, right: CastlingRights) -> Self {
        CastlingRights(self.0 & !right.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn kingside(color: Color) -> Self {
        match color {
            Color::White => Self::WHITE_KINGSIDE,
            Color::Black => Self::BLACK_KINGSIDE,
        }
    }

    pub fn queenside(color: Color) -> Self {
        match color {
            Color::White => Self::WHITE_QUEENSIDE,
            Color::Black => Self::BLACK_QUEENSIDE,
        }
    }

    /// The right tied to a rook home square, if `square` is one.
    fn for_rook_square(square: u8) -> Option<Self> {
        match square {
            0 => Some(Self::WHITE_QUEENSIDE),
            7 => Some(Self::WHITE_KINGSIDE),
            56 => Some(Self::BLACK_QUEENSIDE),
            63 => Some(Self::BLACK_KINGSIDE),
            _ => None,
        }
    }
}

impl fmt::Display for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "-");
        }
        for (right, flag) in [
            (Self::WHITE_KINGSIDE, 'K'),
            (Self::WHITE_QUEENSIDE, 'Q'),
            (Self::BLACK_KINGSIDE, 'k'),
            (Self::BLACK_QUEENSIDE, 'q'),
        ] {
            if self.has(right) {
                write!(f, "{}", flag)?;
            }
        }
        Ok(())
    }
}

/// A board plus the metadata move generation needs beyond piece placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub board: Board,
    pub castling_rights: CastlingRights,
    pub en_passant_square: Option<u8>,
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl Position {
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            castling_rights: CastlingRights::ALL,
            en_passant_square: None,
        }
    }

    pub fn from_board(board: Board) -> Self {
        Self {
            board,
            castling_rights: CastlingRights::NONE,
            en_passant_square: None,
        }
    }

    /// Decodes position-notation text. Only the placement, castling and en
    /// passant fields are read; side to move and counters are left to the host.
    pub fn from_fen(fen: &str) -> Result<Self, FenParseError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() < 4 {
            return Err(FenParseError::MissingFields { found: fields.len() });
        }

        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() < 8 {
            return Err(FenParseError::MissingRanks { found: ranks.len() });
        }

        let mut board = Board::empty();
        for (row, text) in ranks.iter().take(8).enumerate() {
            let cells = expand_rank(text);
            if cells.len() < 8 {
                return Err(FenParseError::ShortRank { rank: 8 - row, columns: cells.len() });
            }
            let rank = 7 - row as u8;
            for (file, &cell) in cells.iter().take(8).enumerate() {
                board.set_piece(rank * 8 + file as u8, cell);
            }
        }

        Ok(Self {
            board,
            castling_rights: CastlingRights::from_field(fields[2]),
            en_passant_square: parse_square(fields[3]),
        })
    }

    /// The position after `mv`. Castling rights drop when a king or rook
    /// leaves home or a rook is captured there; a double pawn push leaves an
    /// en passant target behind it.
    pub fn play(&self, mv: &Move) -> Position {
        let mut next = *self;
        let mover = self.board.get_piece_at(mv.from).map(|(_, color)| color);
        next.board.make_move(mv);

        if mv.piece == Piece::King {
            if let Some(color) = mover {
                next.castling_rights = next
                    .castling_rights
                    .without(CastlingRights::kingside(color))
                    .without(CastlingRights::queenside(color));
            }
        }
        for square in [mv.from, mv.to] {
            if let Some(right) = CastlingRights::for_rook_square(square) {
                next.castling_rights = next.castling_rights.without(right);
            }
        }

        next.en_passant_square = if mv.piece == Piece::Pawn
            && (rank_of(mv.to) - rank_of(mv.from)).abs() == 2
        {
            let middle_rank = (rank_of(mv.from) + rank_of(mv.to)) / 2;
            Some(middle_rank as u8 * 8 + file_of(mv.from) as u8)
        } else {
            None
        };

        next
    }
}

/// Expands one placement rank; a run of digits becomes that many empty cells.
/// Empty runs never grow the rank past eight cells, since only those are read.
fn expand_rank(text: &str) -> Vec<Option<(Piece, Color)>> {
    let mut cells = Vec::with_capacity(8);
    let mut run = 0usize;
    for symbol in text.chars() {
        if let Some(digit) = symbol.to_digit(10) {
            run = run.saturating_mul(10).saturating_add(digit as usize);
            continue;
        }
        push_empty(&mut cells, run);
        run = 0;
        cells.push(Piece::from_symbol(symbol));
    }
    push_empty(&mut cells, run);
    cells
}

fn push_empty(cells: &mut Vec<Option<(Piece, Color)>>, run: usize) {
    let room = 8usize.saturating_sub(cells.len());
    cells.extend(std::iter::repeat(None).take(run.min(room)));
}
