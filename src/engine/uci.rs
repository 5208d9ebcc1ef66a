//! UCI engine wrapper around an external process (async I/O).

use super::Engine;
use crate::error::DuelError;
use async_trait::async_trait;
use log::debug;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::time::timeout;

/// How long a freshly spawned engine gets to answer the UCI handshake.
const STARTUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Grace period for a clean exit after `quit` before the process is killed.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// One external UCI engine process.
pub struct UciEngine {
    name: String,
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl UciEngine {
    /// Spawn the engine binary and complete the UCI handshake. The engine is
    /// only handed out once it has confirmed readiness.
    pub async fn spawn(cmd: &str) -> Result<Self, DuelError> {
        let mut child = Command::new(cmd)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::null())
            .spawn()
            .map_err(|e| DuelError::EngineStartup(format!("failed to spawn {cmd}: {e}")))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| DuelError::EngineStartup(format!("{cmd}: no stdin handle")))?;
        let stdout = child
            .stdout
            .take()
            .map(BufReader::new)
            .ok_or_else(|| DuelError::EngineStartup(format!("{cmd}: no stdout handle")))?;

        let mut engine = Self {
            name: cmd.to_string(),
            child,
            stdin,
            stdout,
        };

        match timeout(STARTUP_TIMEOUT, engine.handshake()).await {
            Ok(Ok(())) => Ok(engine),
            Ok(Err(e)) => Err(DuelError::EngineStartup(format!("{cmd}: {e}"))),
            Err(_) => Err(DuelError::EngineStartup(format!(
                "{cmd}: not ready within {}s",
                STARTUP_TIMEOUT.as_secs()
            ))),
        }
    }

    async fn handshake(&mut self) -> Result<(), DuelError> {
        self.send("uci").await?;
        self.wait_for("uciok").await?;

        self.send("setoption name MultiPV value 1").await?;
        self.send("isready").await?;
        self.wait_for("readyok").await?;

        Ok(())
    }

    /// Send one command line to the engine.
    async fn send(&mut self, cmd: &str) -> Result<(), DuelError> {
        debug!("{} < {cmd}", self.name);
        self.stdin
            .write_all(format!("{cmd}\n").as_bytes())
            .await
            .map_err(|e| DuelError::EngineCommunication(format!("{}: write failed: {e}", self.name)))?;
        self.stdin
            .flush()
            .await
            .map_err(|e| DuelError::EngineCommunication(format!("{}: flush failed: {e}", self.name)))?;
        Ok(())
    }

    /// Read lines until `expected` appears. EOF means the process died.
    async fn wait_for(&mut self, expected: &str) -> Result<(), DuelError> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.read_line(&mut line).await? == 0 {
                return Err(DuelError::EngineCommunication(format!(
                    "{}: stream closed while waiting for {expected:?}",
                    self.name
                )));
            }
            if line.trim() == expected {
                return Ok(());
            }
        }
    }

    async fn read_line(&mut self, line: &mut String) -> Result<usize, DuelError> {
        let n = self
            .stdout
            .read_line(line)
            .await
            .map_err(|e| DuelError::EngineCommunication(format!("{}: read failed: {e}", self.name)))?;
        if n > 0 {
            debug!("{} > {}", self.name, line.trim_end());
        }
        Ok(n)
    }
}

#[async_trait]
impl Engine for UciEngine {
    async fn best_move(&mut self, fen: &str, movetime: Duration) -> Result<String, DuelError> {
        self.send(&format!("position fen {fen}")).await?;
        self.send(&format!("go movetime {}", movetime.as_millis())).await?;

        let mut line = String::new();
        loop {
            line.clear();
            if self.read_line(&mut line).await? == 0 {
                return Err(DuelError::EngineCommunication(format!(
                    "{}: engine exited during search",
                    self.name
                )));
            }
            let trimmed = line.trim();
            if trimmed.starts_with("bestmove") {
                return parse_bestmove(trimmed).ok_or_else(|| {
                    DuelError::EngineCommunication(format!(
                        "{}: no playable move in {trimmed:?}",
                        self.name
                    ))
                });
            }
        }
    }

    async fn shutdown(&mut self) {
        let _ = self.send("quit").await;
        if timeout(SHUTDOWN_GRACE, self.child.wait()).await.is_err() {
            let _ = self.child.start_kill();
            let _ = self.child.wait().await;
        }
    }
}

impl Drop for UciEngine {
    fn drop(&mut self) {
        // Backstop for exit paths that never reached shutdown()
        let _ = self.child.start_kill();
    }
}

/// Extract the move token from a `bestmove ...` line. The null-move answers
/// some engines give on terminal positions count as no move at all.
fn parse_bestmove(line: &str) -> Option<String> {
    let mut parts = line.split_whitespace();
    if parts.next()? != "bestmove" {
        return None;
    }
    let token = parts.next()?;
    if token == "(none)" || token == "0000" {
        return None;
    }
    Some(token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bestmove() {
        assert_eq!(parse_bestmove("bestmove e2e4"), Some("e2e4".to_string()));
        assert_eq!(
            parse_bestmove("bestmove e7e8q ponder d2d4"),
            Some("e7e8q".to_string())
        );
    }

    #[test]
    fn test_parse_bestmove_null_moves() {
        assert_eq!(parse_bestmove("bestmove (none)"), None);
        assert_eq!(parse_bestmove("bestmove 0000"), None);
    }

    #[test]
    fn test_parse_bestmove_rejects_other_lines() {
        assert_eq!(parse_bestmove("info depth 10 score cp 35 pv e2e4"), None);
        assert_eq!(parse_bestmove("bestmove"), None);
    }
}
