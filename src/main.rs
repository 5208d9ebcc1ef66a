mod engine;
mod error;
mod game;
mod outcome;
mod util;

use crate::engine::{Engine, UciEngine};
use crate::game::{Game, Opponent};
use anyhow::{Context, Result, bail};
use log::info;
use shakmaty::Chess;
use std::{env, time::Duration};

/// Wall-clock search budget per move, unless overridden via
/// UCI_DUEL_MOVETIME_MS.
const DEFAULT_MOVETIME_MS: u64 = 15;

#[tokio::main]
async fn main() -> Result<()> {
    setup_logger()?;

    let mut args = env::args().skip(1);
    let (white_cmd, black_cmd) = match (args.next(), args.next()) {
        (Some(white), Some(black)) => (white, black),
        _ => bail!("usage: uci-duel <white-engine> <black-engine>"),
    };

    let movetime = Duration::from_millis(match env::var("UCI_DUEL_MOVETIME_MS") {
        Ok(raw) => raw
            .parse()
            .context("UCI_DUEL_MOVETIME_MS must be a millisecond count")?,
        Err(_) => DEFAULT_MOVETIME_MS,
    });

    info!("starting white engine: {white_cmd}");
    let mut white = UciEngine::spawn(&white_cmd).await?;

    info!("starting black engine: {black_cmd}");
    let black = match UciEngine::spawn(&black_cmd).await {
        Ok(black) => black,
        Err(e) => {
            white.shutdown().await;
            return Err(e.into());
        }
    };

    let game = Game::new(
        Chess::default(),
        vec![
            Opponent::new(white_cmd, Box::new(white)),
            Opponent::new(black_cmd, Box::new(black)),
        ],
        movetime,
    );

    let outcome = game.run().await?;
    info!(
        "game over: {:?}, {}",
        outcome.termination,
        outcome.result()
    );
    println!("{}", outcome.to_json());

    Ok(())
}

fn setup_logger() -> Result<()> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(log::LevelFilter::Info)
        .chain(std::io::stdout())
        .apply()?;
    Ok(())
}
