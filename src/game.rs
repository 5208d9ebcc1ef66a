//! The game loop: rotate opponents, exchange position for move, apply it,
//! classify the terminal state.

use crate::engine::Engine;
use crate::error::DuelError;
use crate::outcome::{self, Outcome, TerminalFlags};
use crate::util;
use log::{debug, info};
use shakmaty::{Chess, EnPassantMode, Position, fen::Fen};
use std::collections::HashMap;
use std::time::Duration;

/// One side of the game, backed by a move source.
pub struct Opponent {
    pub name: String,
    pub engine: Box<dyn Engine>,
}

impl Opponent {
    pub fn new(name: impl Into<String>, engine: Box<dyn Engine>) -> Self {
        Self {
            name: name.into(),
            engine,
        }
    }
}

/// Round-robin over a fixed opponent list, as an index with modular
/// increment. Tracks rotation order only, never board content.
struct Rotation {
    upcoming: usize,
    len: usize,
}

impl Rotation {
    fn new(len: usize) -> Self {
        Self { upcoming: 0, len }
    }

    fn next(&mut self) -> usize {
        let idx = self.upcoming;
        self.upcoming = (self.upcoming + 1) % self.len;
        idx
    }
}

/// Occurrence counts for positions seen so far, keyed on the first four FEN
/// fields (placement, turn, castling, en passant). The position itself does
/// not remember its history, so the runner has to.
#[derive(Default)]
struct Repetitions {
    seen: HashMap<String, u32>,
    threefold: bool,
}

impl Repetitions {
    fn record(&mut self, pos: &Chess) {
        let fen = Fen::from_position(pos, EnPassantMode::Legal).to_string();
        let key = fen.split(' ').take(4).collect::<Vec<_>>().join(" ");
        let count = self.seen.entry(key).or_insert(0);
        *count += 1;
        if *count >= 3 {
            self.threefold = true;
        }
    }
}

/// A single game between the registered opponents. Owns the board and the
/// opponent list exclusively; one instance per game.
pub struct Game {
    board: Chess,
    opponents: Vec<Opponent>,
    rotation: Rotation,
    repetitions: Repetitions,
    movetime: Duration,
    ply: u32,
}

impl Game {
    /// The first registered opponent moves first.
    pub fn new(board: Chess, opponents: Vec<Opponent>, movetime: Duration) -> Self {
        assert!(!opponents.is_empty(), "a game needs at least one opponent");
        let rotation = Rotation::new(opponents.len());
        Self {
            board,
            opponents,
            rotation,
            repetitions: Repetitions::default(),
            movetime,
            ply: 0,
        }
    }

    /// Play the game to its end. Every exit path, including propagated
    /// engine failures, shuts all opponents down before returning.
    pub async fn run(mut self) -> Result<Outcome, DuelError> {
        let result = self.play().await;
        for opponent in &mut self.opponents {
            debug!("shutting down {}", opponent.name);
            opponent.engine.shutdown().await;
        }
        result
    }

    async fn play(&mut self) -> Result<Outcome, DuelError> {
        self.repetitions.record(&self.board);
        self.log_position();

        while !self.is_over() {
            let idx = self.rotation.next();
            let name = self.opponents[idx].name.clone();
            let fen = self.fen();

            let token = self.opponents[idx]
                .engine
                .best_move(&fen, self.movetime)
                .await?;
            let mv = util::parse_move(&self.board, &token)?;

            self.ply += 1;
            info!("[ply {}] {} plays {}", self.ply, name, token);

            self.board.play_unchecked(mv);
            self.repetitions.record(&self.board);
            self.log_position();
        }

        Ok(outcome::classify(&self.flags()))
    }

    /// The board alone only knows about mate, stalemate and material; the
    /// clock and repetition draws come from the runner's own tracking.
    fn is_over(&self) -> bool {
        self.board.is_game_over()
            || self.board.halfmoves() >= 100
            || self.repetitions.threefold
    }

    fn flags(&self) -> TerminalFlags {
        TerminalFlags {
            checkmate: self.board.is_checkmate(),
            stalemate: self.board.is_stalemate(),
            insufficient_material: self.board.is_insufficient_material(),
            threefold_repetition: self.repetitions.threefold,
            side_to_move: self.board.turn(),
        }
    }

    fn fen(&self) -> String {
        Fen::from_position(&self.board, EnPassantMode::Legal).to_string()
    }

    fn log_position(&self) {
        info!("\n{}", util::render_board(&self.board));
        info!("{}", self.fen());
    }
}
