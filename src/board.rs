use std::fmt;
use crate::movegen::Move;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Piece {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl Piece {
    /// Decodes a position-notation symbol. Uppercase is white, lowercase black.
    pub fn from_symbol(symbol: char) -> Option<(Piece, Color)> {
        let color = if symbol.is_ascii_uppercase() { Color::White } else { Color::Black };
        let piece = match symbol.to_ascii_lowercase() {
            'p' => Piece::Pawn,
            'n' => Piece::Knight,
            'b' => Piece::Bishop,
            'r' => Piece::Rook,
            'q' => Piece::Queen,
            'k' => Piece::King,
            _ => return None,
        };
        Some((piece, color))
    }

    pub fn symbol(&self, color: Color) -> char {
        let symbol = match self {
            Piece::Pawn => 'p',
            Piece::Knight => 'n',
            Piece::Bishop => 'b',
            Piece::Rook => 'r',
            Piece::Queen => 'q',
            Piece::King => 'k',
        };
        match color {
            Color::White => symbol.to_ascii_uppercase(),
            Color::Black => symbol,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opposite(&self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Rank delta of a pawn push for this side.
    pub fn forward(&self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    /// Rank (0-based) the side's pawns start on.
    pub fn pawn_rank(&self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => 6,
        }
    }

    /// Rank (0-based) of the side's king and rooks in the initial setup.
    pub fn back_rank(&self) -> i8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

/// Square index for a rank/file pair, or `None` when it falls off the board.
/// Squares are numbered a1 = 0 through h8 = 63.
pub fn square_at(rank: i8, file: i8) -> Option<u8> {
    if (0..8).contains(&rank) && (0..8).contains(&file) {
        Some((rank * 8 + file) as u8)
    } else {
        None
    }
}

pub fn rank_of(square: u8) -> i8 {
    (square / 8) as i8
}

pub fn file_of(square: u8) -> i8 {
    (square % 8) as i8
}

/// Parses coordinate text such as `e3`.
pub fn parse_square(text: &str) -> Option<u8> {
    let mut chars = text.chars();
    let file = chars.next()?;
    let rank = chars.next()?;
    if chars.next().is_some() || !('a'..='h').contains(&file) || !('1'..='8').contains(&rank) {
        return None;
    }
    square_at(rank as i8 - '1' as i8, file as i8 - 'a' as i8)
}

pub fn square_name(square: u8) -> String {
    let mut name = String::with_capacity(2);
    name.push((b'a' + square % 8) as char);
    name.push((b'1' + square / 8) as char);
    name
}

/// An 8x8 grid of cells. Small enough to copy freely, so every simulated move
/// works on its own value rather than on a shared board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Board {
    squares: [Option<(Piece, Color)>; 64],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// The standard starting arrangement.
    pub fn new() -> Self {
        let mut board = Self::empty();
        let back_rank = [
            Piece::Rook,
            Piece::Knight,
            Piece::Bishop,
            Piece::Queen,
            Piece::King,
            Piece::Bishop,
            Piece::Knight,
            Piece::Rook,
        ];
        for (file, &piece) in back_rank.iter().enumerate() {
            let file = file as u8;
            board.set_piece(file, Some((piece, Color::White)));
            board.set_piece(8 + file, Some((Piece::Pawn, Color::White)));
            board.set_piece(48 + file, Some((Piece::Pawn, Color::Black)));
            board.set_piece(56 + file, Some((piece, Color::Black)));
        }
        board
    }

    pub fn empty() -> Self {
        Self { squares: [None; 64] }
    }

    pub fn get_piece_at(&self, square: u8) -> Option<(Piece, Color)> {
        self.squares[square as usize]
    }

    pub fn set_piece(&mut self, square: u8, cell: Option<(Piece, Color)>) {
        self.squares[square as usize] = cell;
    }

    pub fn is_empty(&self, square: u8) -> bool {
        self.squares[square as usize].is_none()
    }

    /// Whether `square` holds a piece belonging to the side opposing `color`.
    pub fn is_enemy(&self, square: u8, color: Color) -> bool {
        matches!(self.squares[square as usize], Some((_, owner)) if owner != color)
    }

    pub fn find_king(&self, color: Color) -> Option<u8> {
        self.squares
            .iter()
            .position(|&cell| cell == Some((Piece::King, color)))
            .map(|square| square as u8)
    }

    /// Occupied squares with their contents, a1 first.
    pub fn pieces(&self) -> impl Iterator<Item = (u8, Piece, Color)> + '_ {
        self.squares
            .iter()
            .enumerate()
            .filter_map(|(square, cell)| cell.map(|(piece, color)| (square as u8, piece, color)))
    }

    /// Moves the piece on `mv.from` to `mv.to`, removing whatever stood there.
    /// En passant also lifts the bypassed pawn; castling relocates the rook.
    pub fn make_move(&mut self, mv: &Move) {
        let moving = self.squares[mv.from as usize].take();

        if mv.is_en_passant {
            // The captured pawn sits beside the origin, on the destination's file.
            let captured_square = rank_of(mv.from) as u8 * 8 + file_of(mv.to) as u8;
            self.squares[captured_square as usize] = None;
        }

        self.squares[mv.to as usize] = moving;

        if let (Some(rook_from), Some(rook_to)) = (mv.castling_rook_from, mv.castling_rook_to) {
            let rook = self.squares[rook_from as usize].take();
            self.squares[rook_to as usize] = rook;
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "  a b c d e f g h")?;
        for rank in (0..8).rev() {
            write!(f, "{}", rank + 1)?;
            for file in 0..8 {
                let symbol = match self.squares[rank * 8 + file] {
                    Some((piece, color)) => piece.symbol(color),
                    None => '.',
                };
                write!(f, " {}", symbol)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
