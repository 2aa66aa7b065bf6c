pub mod board;
pub mod error;
pub mod evaluation;
pub mod movegen;
pub mod player;
pub mod position;
pub mod search;
pub mod time_control;
pub mod uci;

pub use board::{Board, Color, Piece};
pub use error::{EngineError, EngineResult, FenParseError};
pub use evaluation::Evaluator;
pub use movegen::{Move, MoveGenerator, SearchNode};
pub use player::{Player, TurnRequest};
pub use position::{CastlingRights, Position, START_FEN};
pub use search::{Search, SearchConfig, SearchResult, DEFAULT_MAX_DEPTH};
pub use time_control::{allocate_budget, Deadline};
pub use uci::UciHandler;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_position() {
        let position = Position::new();
        let generator = MoveGenerator::new();
        let moves = generator.generate_moves(&position, Color::White);

        // 16 pawn moves and 4 knight moves
        assert_eq!(moves.len(), 20);
        for mv in &moves {
            assert!(generator.is_move_legal(&position, Color::White, mv));
        }
        assert_eq!(generator.generate_moves(&position, Color::Black).len(), 20);
    }

    #[test]
    fn test_check() {
        // Black king on e8 faces the queen on e2 down an open file.
        let position = Position::from_fen("4k3/8/8/8/8/8/4Q3/4K3 b - - 0 1").unwrap();
        let generator = MoveGenerator::new();
        assert!(generator.is_king_in_check(&position.board, Color::Black));
        assert!(!generator.is_king_in_check(&position.board, Color::White));

        let moves = generator.generate_moves(&position, Color::Black);
        assert!(moves.iter().all(|mv| mv.from == 60 && crate::board::file_of(mv.to) != 4));
    }

    #[test]
    fn test_checkmate() {
        // Black king on a1, white queen b2 protected by the king on c3.
        let position = Position::from_fen("8/8/8/8/8/2K5/1Q6/k7 b - - 0 1").unwrap();
        let generator = MoveGenerator::new();

        assert!(generator.is_king_in_check(&position.board, Color::Black));
        assert!(generator.generate_moves(&position, Color::Black).is_empty());
    }

    #[test]
    fn test_stalemate() {
        // White king on a1 boxed in by the queen on b3, not in check.
        let position = Position::from_fen("8/8/8/8/8/1q6/2k5/K7 w - - 0 1").unwrap();
        let generator = MoveGenerator::new();

        assert!(!generator.is_king_in_check(&position.board, Color::White));
        assert!(generator.generate_moves(&position, Color::White).is_empty());
    }

    #[test]
    fn test_perft_initial_position() {
        let position = Position::new();
        let generator = MoveGenerator::new();

        assert_eq!(perft(&position, Color::White, &generator, 1), 20);
        assert_eq!(perft(&position, Color::White, &generator, 2), 400);
        assert_eq!(perft(&position, Color::White, &generator, 3), 8902);
    }

    #[test]
    fn test_play_a_short_game() {
        let mut position = Position::new();
        let mut side = Color::White;
        let generator = MoveGenerator::new();

        for text in ["e2e4", "d7d5", "e4e5", "f7f5", "e5f6"] {
            let mv = generator.find_move(&position, side, text).unwrap();
            position = position.play(&mv);
            side = side.opposite();
        }
        // The f5 pawn went off the board with the en passant capture.
        assert_eq!(position.board.get_piece_at(37), None);
        assert_eq!(position.board.get_piece_at(45), Some((Piece::Pawn, Color::White)));
    }

    fn perft(position: &Position, side: Color, generator: &MoveGenerator, depth: u32) -> u64 {
        if depth == 0 {
            return 1;
        }

        let successors = generator.generate_successors(position, side);
        if depth == 1 {
            return successors.len() as u64;
        }

        successors
            .iter()
            .map(|node| perft(&node.position, side.opposite(), generator, depth - 1))
            .sum()
    }
}
