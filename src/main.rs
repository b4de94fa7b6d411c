use anyhow::Context;
use simplelog::{Config, LevelFilter, WriteLogger};
use std::fs::File;

use gridsnake::engine::Engine;
use gridsnake::storage::HighScoreFile;
use gridsnake::ui;

const LOG_FILE: &str = "gridsnake.log";

fn main() -> anyhow::Result<()> {
    // Stdout belongs to the game, so logs go to a file.
    WriteLogger::init(
        LevelFilter::Info,
        Config::default(),
        File::create(LOG_FILE).context("could not create log file")?,
    )?;

    let mut engine = Engine::new(HighScoreFile::default());
    ui::run(&mut engine)?;

    println!(
        "Thanks for playing! Score: {}    High score: {}",
        engine.score(),
        engine.high_score()
    );
    Ok(())
}
