//! Error types for the match runner.

use thiserror::Error;

/// Everything that can abort a game. None of these are retried: a move
/// source that fails invalidates the whole game, not just one ply.
#[derive(Error, Debug)]
pub enum DuelError {
    #[error("engine startup failed: {0}")]
    EngineStartup(String),

    #[error("engine communication failed: {0}")]
    EngineCommunication(String),

    #[error("board rejected move {token:?}: {reason}")]
    IllegalMove { token: String, reason: String },
}
