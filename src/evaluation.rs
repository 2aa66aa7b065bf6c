use crate::board::{Board, Color, Piece};
use crate::movegen::MoveGenerator;

/// Material plus a flat bonus for giving check. No positional terms.
pub struct Evaluator {
    pub pawn_value: i32,
    pub knight_value: i32,
    pub bishop_value: i32,
    pub rook_value: i32,
    pub queen_value: i32,
    pub check_value: i32,
    move_generator: MoveGenerator,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self {
            pawn_value: 1,
            knight_value: 3,
            bishop_value: 3,
            rook_value: 5,
            queen_value: 9,
            check_value: 50,
            move_generator: MoveGenerator::new(),
        }
    }

    /// Score of `board` as seen by `perspective`: its material minus the
    /// opponent's, plus `check_value` if the opponent's king is attacked and
    /// minus it if its own king is.
    pub fn evaluate(&self, board: &Board, perspective: Color) -> i32 {
        let mut score = 0;

        for (_, piece, color) in board.pieces() {
            let value = self.get_piece_value(piece);
            score += if color == perspective { value } else { -value };
        }

        if self.move_generator.is_king_in_check(board, perspective.opposite()) {
            score += self.check_value;
        }
        if self.move_generator.is_king_in_check(board, perspective) {
            score -= self.check_value;
        }

        score
    }

    pub fn get_piece_value(&self, piece: Piece) -> i32 {
        match piece {
            Piece::Pawn => self.pawn_value,
            Piece::Knight => self.knight_value,
            Piece::Bishop => self.bishop_value,
            Piece::Rook => self.rook_value,
            Piece::Queen => self.queen_value,
            Piece::King => 0,
        }
    }
}
