use crate::board::Color;
use crate::error::EngineError;
use crate::movegen::MoveGenerator;
use crate::player::Player;
use crate::position::Position;
use crate::search::SearchConfig;
use crate::time_control::allocate_budget;
use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};
use std::time::Duration;
use tracing::{debug, error, warn};

const DEFAULT_MOVE_TIME: Duration = Duration::from_secs(5);

/// Line-protocol front end: keeps the position the host last sent and answers
/// `go` with one move.
pub struct UciHandler {
    position: Position,
    side_to_move: Color,
    history_len: usize,
    position_error: Option<EngineError>,
    move_generator: MoveGenerator,
    player: Player,
}

impl UciHandler {
    pub fn new(config: &SearchConfig) -> Self {
        UciHandler {
            position: Position::new(),
            side_to_move: Color::White,
            history_len: 0,
            position_error: None,
            move_generator: MoveGenerator::new(),
            player: Player::new(config),
        }
    }

    pub fn run(&mut self) -> Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        let mut reader = stdin.lock();
        let mut line = String::new();

        while reader.read_line(&mut line).context("reading command")? > 0 {
            let command = line.trim();
            if command == "quit" {
                break;
            }

            let response = self.handle_command(command);
            write!(stdout, "{}", response).context("writing response")?;
            stdout.flush().context("flushing response")?;
            line.clear();
        }
        Ok(())
    }

    pub fn handle_command(&mut self, command: &str) -> String {
        let parts: Vec<&str> = command.split_whitespace().collect();
        if parts.is_empty() {
            return String::new();
        }

        match parts[0] {
            "uci" => self.handle_uci(),
            "isready" => "readyok\n".to_string(),
            "ucinewgame" => self.handle_ucinewgame(),
            "position" => self.handle_position(&parts[1..]),
            "go" => self.handle_go(&parts[1..]),
            "quit" => String::new(),
            other => {
                debug!(command = other, "ignoring unknown command");
                String::new()
            }
        }
    }

    fn handle_uci(&self) -> String {
        "id name Minimax Turn\nid author Your Name\nuciok\n".to_string()
    }

    fn handle_ucinewgame(&mut self) -> String {
        self.reset(Position::new(), Color::White);
        self.player.game_started(Color::White);
        String::new()
    }

    fn reset(&mut self, position: Position, side_to_move: Color) {
        self.position = position;
        self.side_to_move = side_to_move;
        self.history_len = 0;
        self.position_error = None;
    }

    fn handle_position(&mut self, parts: &[&str]) -> String {
        let moves_at = parts.iter().position(|&part| part == "moves");
        let setup = &parts[..moves_at.unwrap_or(parts.len())];

        match setup.first() {
            Some(&"startpos") => self.reset(Position::new(), Color::White),
            Some(&"fen") => {
                let fen = setup[1..].join(" ");
                match Position::from_fen(&fen) {
                    Ok(position) => {
                        let side = match setup.get(2) {
                            Some(&"b") => Color::Black,
                            _ => Color::White,
                        };
                        self.reset(position, side);
                    }
                    Err(err) => {
                        warn!(%fen, %err, "rejected position");
                        self.position_error = Some(err.into());
                        return String::new();
                    }
                }
            }
            _ => {
                warn!("position command without startpos or fen");
                return String::new();
            }
        }

        if let Some(index) = moves_at {
            for text in &parts[index + 1..] {
                match self.move_generator.find_move(&self.position, self.side_to_move, text) {
                    Some(mv) => {
                        self.position = self.position.play(&mv);
                        self.side_to_move = self.side_to_move.opposite();
                        self.history_len += 1;
                    }
                    None => {
                        warn!(mv = %text, side = %self.side_to_move, "ignoring illegal move and the rest of the list");
                        break;
                    }
                }
            }
        }
        self.player.game_updated();
        String::new()
    }

    fn handle_go(&mut self, parts: &[&str]) -> String {
        let mut white_time = None;
        let mut black_time = None;
        let mut move_time = None;
        let mut depth = None;

        for (i, &key) in parts.iter().enumerate() {
            let value = parts.get(i + 1).and_then(|s| s.parse::<u64>().ok());
            match key {
                "wtime" => white_time = value,
                "btime" => black_time = value,
                "movetime" => move_time = value,
                "depth" => match value.map(u32::try_from) {
                    Some(Ok(value)) => depth = Some(value),
                    _ => warn!(value = ?parts.get(i + 1), "ignoring unusable depth"),
                },
                _ => {}
            }
        }

        if let Some(err) = &self.position_error {
            error!(%err, "cannot move from a rejected position");
            return "bestmove 0000\n".to_string();
        }

        let remaining = match self.side_to_move {
            Color::White => white_time,
            Color::Black => black_time,
        };
        let budget = match (move_time, remaining) {
            (Some(ms), _) => Duration::from_millis(ms),
            (None, Some(ms)) => allocate_budget(Duration::from_millis(ms)),
            (None, None) => DEFAULT_MOVE_TIME,
        };

        debug!(history_len = self.history_len, "go");
        match self.player.choose_move(&self.position, self.side_to_move, budget, depth) {
            Ok(mv) => format!("bestmove {}\n", mv),
            Err(err) => {
                error!(%err, "turn failed");
                "bestmove 0000\n".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handler() -> UciHandler {
        UciHandler::new(&SearchConfig {
            max_depth: 1,
            seed: Some(11),
        })
    }

    fn best_move(response: &str) -> &str {
        response.trim().strip_prefix("bestmove ").unwrap()
    }

    #[test]
    fn test_handshake() {
        let mut uci = handler();
        assert!(uci.handle_command("uci").ends_with("uciok\n"));
        assert_eq!(uci.handle_command("isready"), "readyok\n");
        assert_eq!(uci.handle_command("ucinewgame"), "");
        assert_eq!(uci.handle_command("bogus"), "");
    }

    #[test]
    fn test_startpos_with_moves() {
        let mut uci = handler();
        uci.handle_command("position startpos moves e2e4 e7e5 g1f3");
        assert_eq!(uci.side_to_move, Color::Black);
        assert_eq!(uci.history_len, 3);

        let response = uci.handle_command("go movetime 2000");
        let text = best_move(&response);
        assert!(uci.move_generator.find_move(&uci.position, Color::Black, text).is_some());
    }

    #[test]
    fn test_fen_position_and_clock() {
        let mut uci = handler();
        uci.handle_command("position fen 6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1");
        let response = uci.handle_command("go wtime 60000 btime 60000");
        assert_eq!(response, "bestmove a1a8\n");
    }

    #[test]
    fn test_castling_through_moves() {
        let mut uci = handler();
        uci.handle_command("position fen r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1 moves e1g1");
        assert_eq!(uci.side_to_move, Color::Black);
        assert_eq!(uci.position.board.get_piece_at(5).map(|(piece, _)| piece), Some(crate::board::Piece::Rook));
    }

    #[test]
    fn test_depth_is_per_search() {
        let mut uci = UciHandler::new(&SearchConfig {
            max_depth: 0,
            seed: Some(5),
        });
        uci.handle_command("position fen 6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1");
        assert_eq!(uci.handle_command("go movetime 10000 depth 1"), "bestmove a1a8\n");
        assert_eq!(uci.player.max_depth(), 0);
    }

    #[test]
    fn test_oversized_depth_is_ignored() {
        let mut uci = handler();
        uci.handle_command("position startpos");
        let response = uci.handle_command("go movetime 2000 depth 4294967296");
        let text = best_move(&response);
        assert!(uci.move_generator.find_move(&uci.position, Color::White, text).is_some());
        assert_eq!(uci.player.max_depth(), 1);
    }

    #[test]
    fn test_rejected_position_forfeits() {
        let mut uci = handler();
        uci.handle_command("position fen 8/8/8/8 w - - 0 1");
        assert_eq!(uci.handle_command("go movetime 100"), "bestmove 0000\n");

        uci.handle_command("position startpos");
        assert_ne!(uci.handle_command("go movetime 1000"), "bestmove 0000\n");
    }

    #[test]
    fn test_no_legal_move_forfeits() {
        let mut uci = handler();
        uci.handle_command("position startpos moves f2f3 e7e5 g2g4 d8h4");
        assert_eq!(uci.handle_command("go movetime 100"), "bestmove 0000\n");
    }
}
