use std::fmt;

use crate::board::{file_of, rank_of, square_at, square_name, Board, Color, Piece};
use crate::position::{CastlingRights, Position};

pub const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (2, 1), (2, -1), (-2, 1), (-2, -1),
    (1, 2), (1, -2), (-1, 2), (-1, -2),
];

pub const KING_OFFSETS: [(i8, i8); 8] = [
    (-1, -1), (-1, 0), (-1, 1),
    (0, -1), (0, 1),
    (1, -1), (1, 0), (1, 1),
];

pub const ORTHOGONAL_DIRECTIONS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
pub const DIAGONAL_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (-1, -1), (1, -1), (-1, 1)];
pub const QUEEN_DIRECTIONS: [(i8, i8); 8] = [
    (1, 0), (-1, 0), (0, 1), (0, -1),
    (1, 1), (-1, -1), (1, -1), (-1, 1),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub from: u8,
    pub to: u8,
    pub piece: Piece,
    pub captured_piece: Option<Piece>,
    pub is_en_passant: bool,
    pub is_castling: bool,
    pub castling_rook_from: Option<u8>,
    pub castling_rook_to: Option<u8>,
}

impl Move {
    pub fn new(from: u8, to: u8, piece: Piece) -> Self {
        Self {
            from,
            to,
            piece,
            captured_piece: None,
            is_en_passant: false,
            is_castling: false,
            castling_rook_from: None,
            castling_rook_to: None,
        }
    }

    pub fn new_capture(from: u8, to: u8, piece: Piece, captured_piece: Piece) -> Self {
        Self {
            captured_piece: Some(captured_piece),
            ..Self::new(from, to, piece)
        }
    }

    pub fn new_en_passant(from: u8, to: u8) -> Self {
        Self {
            captured_piece: Some(Piece::Pawn),
            is_en_passant: true,
            ..Self::new(from, to, Piece::Pawn)
        }
    }

    pub fn new_castling(from: u8, to: u8, rook_from: u8, rook_to: u8) -> Self {
        Self {
            is_castling: true,
            castling_rook_from: Some(rook_from),
            castling_rook_to: Some(rook_to),
            ..Self::new(from, to, Piece::King)
        }
    }
}

/// Coordinate notation, e.g. `e2e4`. Castling prints the king's path, which
/// gives the fixed strings `e1g1`, `e1c1`, `e8g8` and `e8c8`.
impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", square_name(self.from), square_name(self.to))
    }
}

/// A legal successor: the position reached and the move that reached it.
/// Each one belongs to the search frame that generated it.
#[derive(Debug, Clone, Copy)]
pub struct SearchNode {
    pub position: Position,
    pub mv: Move,
}

struct CastlingPath {
    rook_file: i8,
    empty_files: &'static [i8],
    king_to_file: i8,
    rook_to_file: i8,
}

const KINGSIDE_PATH: CastlingPath = CastlingPath {
    rook_file: 7,
    empty_files: &[5, 6],
    king_to_file: 6,
    rook_to_file: 5,
};

const QUEENSIDE_PATH: CastlingPath = CastlingPath {
    rook_file: 0,
    empty_files: &[1, 2, 3],
    king_to_file: 2,
    rook_to_file: 3,
};

const KING_HOME_FILE: i8 = 4;

#[derive(Debug, Clone, Copy, Default)]
pub struct MoveGenerator;

impl MoveGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Whether a piece of `defender`'s opponent attacks `square`.
    pub fn is_square_attacked(&self, board: &Board, square: u8, defender: Color) -> bool {
        let attacker = defender.opposite();
        let rank = rank_of(square);
        let file = file_of(square);
        let holds = |target: Option<u8>, piece: Piece| {
            target.map_or(false, |target| board.get_piece_at(target) == Some((piece, attacker)))
        };

        if KNIGHT_OFFSETS
            .iter()
            .any(|&(dr, df)| holds(square_at(rank + dr, file + df), Piece::Knight))
        {
            return true;
        }

        let first_blocker_is = |directions: &[(i8, i8)], sliders: [Piece; 2]| {
            directions.iter().any(|&direction| {
                match first_piece_along(board, square, direction) {
                    Some((piece, color)) => color == attacker && sliders.contains(&piece),
                    None => false,
                }
            })
        };
        if first_blocker_is(&ORTHOGONAL_DIRECTIONS[..], [Piece::Rook, Piece::Queen]) {
            return true;
        }
        if first_blocker_is(&DIAGONAL_DIRECTIONS[..], [Piece::Bishop, Piece::Queen]) {
            return true;
        }

        if KING_OFFSETS
            .iter()
            .any(|&(dr, df)| holds(square_at(rank + dr, file + df), Piece::King))
        {
            return true;
        }

        // Enemy pawns capture towards the defender, so they stand one rank
        // further along the defender's own forward direction.
        let pawn_rank = rank + defender.forward();
        holds(square_at(pawn_rank, file - 1), Piece::Pawn)
            || holds(square_at(pawn_rank, file + 1), Piece::Pawn)
    }

    /// A side without a king on the board is never in check.
    pub fn is_king_in_check(&self, board: &Board, color: Color) -> bool {
        match board.find_king(color) {
            Some(king_square) => self.is_square_attacked(board, king_square, color),
            None => false,
        }
    }

    /// Legal moves for `side`, in generation order.
    pub fn generate_moves(&self, position: &Position, side: Color) -> Vec<Move> {
        self.generate_successors(position, side)
            .into_iter()
            .map(|node| node.mv)
            .collect()
    }

    /// Legal moves for `side` together with the positions they lead to.
    pub fn generate_successors(&self, position: &Position, side: Color) -> Vec<SearchNode> {
        self.generate_pseudo_legal_moves(position, side)
            .into_iter()
            .filter_map(|mv| {
                let next = position.play(&mv);
                if self.is_king_in_check(&next.board, side) {
                    None
                } else {
                    Some(SearchNode { position: next, mv })
                }
            })
            .collect()
    }

    /// Candidates that follow piece movement rules but may leave the mover's
    /// king attacked. Castling and en passant come first, then pieces in
    /// placement order (a8 through h1).
    pub fn generate_pseudo_legal_moves(&self, position: &Position, side: Color) -> Vec<Move> {
        let board = &position.board;
        let mut moves = Vec::with_capacity(48);

        if !position.castling_rights.is_empty() {
            self.castling_moves(position, side, &mut moves);
        }
        if position.en_passant_square.is_some() {
            self.en_passant_moves(position, side, &mut moves);
        }

        for rank in (0..8).rev() {
            for file in 0..8 {
                let from = (rank * 8 + file) as u8;
                let piece = match board.get_piece_at(from) {
                    Some((piece, color)) if color == side => piece,
                    _ => continue,
                };
                match piece {
                    Piece::Pawn => self.pawn_moves(board, from, side, &mut moves),
                    Piece::Knight => self.step_moves(board, from, piece, side, &KNIGHT_OFFSETS, &mut moves),
                    Piece::Bishop => self.slide_moves(board, from, piece, side, &DIAGONAL_DIRECTIONS, &mut moves),
                    Piece::Rook => self.slide_moves(board, from, piece, side, &ORTHOGONAL_DIRECTIONS, &mut moves),
                    Piece::Queen => self.slide_moves(board, from, piece, side, &QUEEN_DIRECTIONS, &mut moves),
                    Piece::King => self.step_moves(board, from, piece, side, &KING_OFFSETS, &mut moves),
                }
            }
        }

        moves
    }

    /// Whether `mv` appears among the legal moves for `side`.
    pub fn is_move_legal(&self, position: &Position, side: Color, mv: &Move) -> bool {
        self.generate_moves(position, side).contains(mv)
    }

    /// Resolves coordinate text such as `e2e4` against the legal moves.
    pub fn find_move(&self, position: &Position, side: Color, text: &str) -> Option<Move> {
        self.generate_moves(position, side)
            .into_iter()
            .find(|mv| mv.to_string() == text)
    }

    fn pawn_moves(&self, board: &Board, from: u8, side: Color, moves: &mut Vec<Move>) {
        let rank = rank_of(from);
        let file = file_of(from);
        let forward = side.forward();

        if let Some(to) = square_at(rank + forward, file) {
            if board.is_empty(to) {
                moves.push(Move::new(from, to, Piece::Pawn));

                if rank == side.pawn_rank() {
                    if let Some(to) = square_at(rank + 2 * forward, file) {
                        if board.is_empty(to) {
                            moves.push(Move::new(from, to, Piece::Pawn));
                        }
                    }
                }
            }
        }

        for df in [1, -1] {
            let Some(to) = square_at(rank + forward, file + df) else {
                continue;
            };
            if !board.is_enemy(to, side) {
                continue;
            }
            if let Some((captured, _)) = board.get_piece_at(to) {
                moves.push(Move::new_capture(from, to, Piece::Pawn, captured));
            }
        }
    }

    fn step_moves(
        &self,
        board: &Board,
        from: u8,
        piece: Piece,
        side: Color,
        offsets: &[(i8, i8)],
        moves: &mut Vec<Move>,
    ) {
        let rank = rank_of(from);
        let file = file_of(from);
        for &(dr, df) in offsets {
            let Some(to) = square_at(rank + dr, file + df) else {
                continue;
            };
            match board.get_piece_at(to) {
                None => moves.push(Move::new(from, to, piece)),
                Some((captured, _)) if board.is_enemy(to, side) => {
                    moves.push(Move::new_capture(from, to, piece, captured))
                }
                Some(_) => {}
            }
        }
    }

    /// Walks each direction until the edge or the first occupied square,
    /// which is included when it holds an enemy piece.
    fn slide_moves(
        &self,
        board: &Board,
        from: u8,
        piece: Piece,
        side: Color,
        directions: &[(i8, i8)],
        moves: &mut Vec<Move>,
    ) {
        for &(dr, df) in directions {
            let mut rank = rank_of(from) + dr;
            let mut file = file_of(from) + df;
            while let Some(to) = square_at(rank, file) {
                match board.get_piece_at(to) {
                    None => moves.push(Move::new(from, to, piece)),
                    Some((captured, _)) => {
                        if board.is_enemy(to, side) {
                            moves.push(Move::new_capture(from, to, piece, captured));
                        }
                        break;
                    }
                }
                rank += dr;
                file += df;
            }
        }
    }

    fn castling_moves(&self, position: &Position, side: Color, moves: &mut Vec<Move>) {
        let board = &position.board;
        let back_rank = side.back_rank();
        let Some(king_from) = square_at(back_rank, KING_HOME_FILE) else {
            return;
        };
        if board.get_piece_at(king_from) != Some((Piece::King, side)) {
            return;
        }

        for (right, path) in [
            (CastlingRights::kingside(side), &KINGSIDE_PATH),
            (CastlingRights::queenside(side), &QUEENSIDE_PATH),
        ] {
            if !position.castling_rights.has(right) {
                continue;
            }
            let (Some(rook_from), Some(king_to), Some(rook_to)) = (
                square_at(back_rank, path.rook_file),
                square_at(back_rank, path.king_to_file),
                square_at(back_rank, path.rook_to_file),
            ) else {
                continue;
            };
            if board.get_piece_at(rook_from) != Some((Piece::Rook, side)) {
                continue;
            }
            let path_clear = path
                .empty_files
                .iter()
                .all(|&file| square_at(back_rank, file).map_or(false, |square| board.is_empty(square)));
            if path_clear {
                moves.push(Move::new_castling(king_from, king_to, rook_from, rook_to));
            }
        }
    }

    /// Rebuilds the capture from the target square alone: the capturing pawn
    /// stands diagonally behind the target and the enemy pawn it takes stands
    /// beside it on the target's file.
    fn en_passant_moves(&self, position: &Position, side: Color, moves: &mut Vec<Move>) {
        let board = &position.board;
        let Some(target) = position.en_passant_square else {
            return;
        };
        if !board.is_empty(target) {
            return;
        }

        let origin_rank = rank_of(target) - side.forward();
        let target_file = file_of(target);
        let Some(bypassed) = square_at(origin_rank, target_file) else {
            return;
        };
        if board.get_piece_at(bypassed) != Some((Piece::Pawn, side.opposite())) {
            return;
        }

        for df in [-1, 1] {
            if let Some(from) = square_at(origin_rank, target_file + df) {
                if board.get_piece_at(from) == Some((Piece::Pawn, side)) {
                    moves.push(Move::new_en_passant(from, target));
                }
            }
        }
    }
}

/// The first occupied square reached from `square` in `direction`.
fn first_piece_along(board: &Board, square: u8, (dr, df): (i8, i8)) -> Option<(Piece, Color)> {
    let mut rank = rank_of(square) + dr;
    let mut file = file_of(square) + df;
    while let Some(target) = square_at(rank, file) {
        if let Some(cell) = board.get_piece_at(target) {
            return Some(cell);
        }
        rank += dr;
        file += df;
    }
    None
}
