mod uci;

pub use uci::UciEngine;

use crate::error::DuelError;
use async_trait::async_trait;
use std::time::Duration;

/// A move source for one side of the game. The game loop only ever talks to
/// this trait, so tests can swap in scripted implementations.
#[async_trait]
pub trait Engine: Send {
    /// Compute the best move for the position `fen`, searching for at most
    /// `movetime` of wall-clock time. Returns the raw move token as emitted
    /// by the source; the board decides whether it is playable.
    async fn best_move(&mut self, fen: &str, movetime: Duration) -> Result<String, DuelError>;

    /// Terminate the underlying move source. Called exactly once per
    /// opponent, on every exit path of the game loop.
    async fn shutdown(&mut self);
}
