use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{self, Event, KeyCode},
    execute,
    style::Print,
    terminal::{self, Clear, ClearType},
};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};

use crate::engine::{Command, Engine, Phase, Snapshot, TICK_INTERVAL};
use crate::grid::{Direction, Point, GRID_SIZE};
use crate::storage::HighScoreStore;

const INPUT_POLL: Duration = Duration::from_millis(50);

/// Runs the game in the current terminal until the player quits.
pub fn run<S: HighScoreStore>(engine: &mut Engine<S>) -> io::Result<()> {
    terminal::enable_raw_mode()?;
    execute!(stdout(), Hide)?;

    let result = event_loop(engine);

    terminal::disable_raw_mode()?;
    execute!(stdout(), Show)?;
    result
}

fn event_loop<S: HighScoreStore>(engine: &mut Engine<S>) -> io::Result<()> {
    let mut last_tick = Instant::now();
    draw(&engine.snapshot())?;

    loop {
        if event::poll(INPUT_POLL)? {
            if let Event::Key(key) = event::read()? {
                if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                    break;
                }
                if let Some(command) = map_key(key.code) {
                    let was_running = engine.phase() == Phase::Running;
                    engine.handle(command);
                    // Entering Running re-arms the tick clock.
                    if !was_running && engine.phase() == Phase::Running {
                        last_tick = Instant::now();
                    }
                    draw(&engine.snapshot())?;
                }
            }
        }

        if engine.phase() == Phase::Running && last_tick.elapsed() >= TICK_INTERVAL {
            engine.tick();
            last_tick = Instant::now();
            draw(&engine.snapshot())?;
        }
    }

    Ok(())
}

fn map_key(code: KeyCode) -> Option<Command> {
    match code {
        KeyCode::Up | KeyCode::Char('w') => Some(Command::Direction(Direction::Up)),
        KeyCode::Down | KeyCode::Char('s') => Some(Command::Direction(Direction::Down)),
        KeyCode::Left | KeyCode::Char('a') => Some(Command::Direction(Direction::Left)),
        KeyCode::Right | KeyCode::Char('d') => Some(Command::Direction(Direction::Right)),
        KeyCode::Char(' ') => Some(Command::TogglePause),
        KeyCode::Char('r') => Some(Command::Restart),
        _ => None,
    }
}

fn draw(snap: &Snapshot<'_>) -> io::Result<()> {
    let mut stdout = stdout();
    let size = GRID_SIZE as u16;
    execute!(stdout, Clear(ClearType::All), MoveTo(0, 0))?;

    // Border surrounds the board; every grid cell is playable.
    for x in 0..size + 2 {
        execute!(stdout, MoveTo(x, 0), Print("#"))?;
        execute!(stdout, MoveTo(x, size + 1), Print("#"))?;
    }

    for y in 0..size {
        execute!(stdout, MoveTo(0, y + 1), Print("#"))?;
        for x in 0..size {
            let cell = Point::new(i32::from(x), i32::from(y));
            let glyph = if snap.snake.back() == Some(&cell) {
                'O'
            } else if snap.snake.contains(&cell) {
                'o'
            } else if snap.food == Some(cell) {
                '*'
            } else {
                ' '
            };
            execute!(stdout, MoveTo(x + 1, y + 1), Print(glyph))?;
        }
        execute!(stdout, MoveTo(size + 1, y + 1), Print("#"))?;
    }

    execute!(
        stdout,
        MoveTo(0, size + 2),
        Print(format!(
            "Score: {}    High Score: {}",
            snap.score, snap.high_score
        ))
    )?;

    let status = match snap.phase {
        Phase::Idle => "Press an arrow key or space to start.",
        Phase::Running => "Avoid the walls and your own body!",
        Phase::Paused => "Paused. Space resumes.",
        Phase::Ended => "Game over! Press 'r' to play again.",
    };
    execute!(stdout, MoveTo(0, size + 3), Print(status))?;
    execute!(
        stdout,
        MoveTo(0, size + 4),
        Print("Arrows/WASD to steer, space to pause, 'r' to restart, 'q' to quit")
    )?;

    stdout.flush()?;
    Ok(())
}
