//! Terminal-state classification and the final game record.

use serde::Serialize;
use shakmaty::Color;

/// Why the game ended. Exactly one of these is attributed per finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Termination {
    Checkmate,
    Stalemate,
    InsufficientMaterial,
    ThreefoldRepetition,
    FiftyMoveRule,
}

/// Terminal signals read off the board once the game loop has stopped.
#[derive(Debug, Clone, Copy)]
pub struct TerminalFlags {
    pub checkmate: bool,
    pub stalemate: bool,
    pub insufficient_material: bool,
    pub threefold_repetition: bool,
    pub side_to_move: Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub termination: Termination,
    pub winner: Option<Color>,
}

/// Map terminal flags to an outcome. Fixed priority order, first match wins:
/// checkmate and stalemate are mutually exclusive in practice and must
/// shadow the weaker draw conditions. A game that is over without any flag
/// set ran out the halfmove clock, so the fifty-move rule is the fallback.
pub fn classify(flags: &TerminalFlags) -> Outcome {
    let termination = if flags.checkmate {
        Termination::Checkmate
    } else if flags.stalemate {
        Termination::Stalemate
    } else if flags.insufficient_material {
        Termination::InsufficientMaterial
    } else if flags.threefold_repetition {
        Termination::ThreefoldRepetition
    } else {
        Termination::FiftyMoveRule
    };

    // Only a mate is decisive, and it is the side to move that is mated.
    let winner = match termination {
        Termination::Checkmate => Some(flags.side_to_move.other()),
        _ => None,
    };

    Outcome { termination, winner }
}

impl Outcome {
    pub fn result(&self) -> &'static str {
        match self.winner {
            Some(Color::White) => "1-0",
            Some(Color::Black) => "0-1",
            None => "1/2-1/2",
        }
    }

    /// The record printed to stdout when the game is over.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "termination": self.termination,
            "winner": self.winner.map(|c| if c.is_white() { "white" } else { "black" }),
            "result": self.result(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draw_flags() -> TerminalFlags {
        TerminalFlags {
            checkmate: false,
            stalemate: false,
            insufficient_material: false,
            threefold_repetition: false,
            side_to_move: Color::White,
        }
    }

    #[test]
    fn test_checkmate_shadows_stalemate() {
        // Contradictory on a real board, but the priority order must hold.
        let flags = TerminalFlags {
            checkmate: true,
            stalemate: true,
            ..draw_flags()
        };
        assert_eq!(classify(&flags).termination, Termination::Checkmate);
    }

    #[test]
    fn test_mated_black_means_white_wins() {
        let flags = TerminalFlags {
            checkmate: true,
            side_to_move: Color::Black,
            ..draw_flags()
        };
        let outcome = classify(&flags);
        assert_eq!(outcome.winner, Some(Color::White));
        assert_eq!(outcome.result(), "1-0");
    }

    #[test]
    fn test_mated_white_means_black_wins() {
        let flags = TerminalFlags {
            checkmate: true,
            side_to_move: Color::White,
            ..draw_flags()
        };
        let outcome = classify(&flags);
        assert_eq!(outcome.winner, Some(Color::Black));
        assert_eq!(outcome.result(), "0-1");
    }

    #[test]
    fn test_all_draw_kinds_have_no_winner() {
        let cases = [
            (
                TerminalFlags {
                    stalemate: true,
                    ..draw_flags()
                },
                Termination::Stalemate,
            ),
            (
                TerminalFlags {
                    insufficient_material: true,
                    ..draw_flags()
                },
                Termination::InsufficientMaterial,
            ),
            (
                TerminalFlags {
                    threefold_repetition: true,
                    ..draw_flags()
                },
                Termination::ThreefoldRepetition,
            ),
            // No flag set at all: the fifty-move fallback.
            (draw_flags(), Termination::FiftyMoveRule),
        ];

        for (flags, expected) in cases {
            let outcome = classify(&flags);
            assert_eq!(outcome.termination, expected);
            assert_eq!(outcome.winner, None);
            assert_eq!(outcome.result(), "1/2-1/2");
        }
    }

    #[test]
    fn test_json_record() {
        let flags = TerminalFlags {
            checkmate: true,
            side_to_move: Color::Black,
            ..draw_flags()
        };
        let record = classify(&flags).to_json();
        assert_eq!(record["termination"], "Checkmate");
        assert_eq!(record["winner"], "white");
        assert_eq!(record["result"], "1-0");
    }
}
