use crate::error::DuelError;
use shakmaty::{Chess, File, Move, Position, Rank, Square, san::San, uci::UciMove};
use std::fmt::Display;
use std::str::FromStr;

/// Parse a move token in relaxed mode: UCI notation first, SAN as fallback.
/// Sloppy sources emit either, so a token is only rejected once both
/// readings fail against the current position.
pub fn parse_move(pos: &Chess, token: &str) -> Result<Move, DuelError> {
    let token = token.trim();

    if let Ok(uci) = UciMove::from_str(token) {
        return uci.to_move(pos).map_err(|e| illegal(token, e));
    }

    match San::from_str(token) {
        Ok(san) => san.to_move(pos).map_err(|e| illegal(token, e)),
        Err(e) => Err(illegal(token, e)),
    }
}

fn illegal(token: &str, reason: impl Display) -> DuelError {
    DuelError::IllegalMove {
        token: token.to_string(),
        reason: reason.to_string(),
    }
}

/// ASCII rendering of the board, rank 8 at the top.
pub fn render_board(pos: &Chess) -> String {
    let mut out = String::from("  +-----------------+\n");
    for rank in Rank::ALL.iter().rev() {
        out.push(rank.char());
        out.push_str(" |");
        for file in File::ALL {
            let piece = pos.board().piece_at(Square::from_coords(file, *rank));
            out.push(' ');
            out.push(piece.map_or('.', |p| p.char()));
        }
        out.push_str(" |\n");
    }
    out.push_str("  +-----------------+\n");
    out.push_str("    a b c d e f g h");
    out
}
