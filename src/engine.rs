use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use std::time::Duration;

use crate::grid::{Direction, Point, GRID_SIZE};
use crate::storage::HighScoreStore;

/// Fixed delay between simulation steps while the game is running.
pub const TICK_INTERVAL: Duration = Duration::from_millis(150);

/// Points awarded per food eaten.
pub const FOOD_SCORE: u32 = 10;

// How many random draws food placement makes before switching to an
// exhaustive scan of the free cells.
const FOOD_SAMPLE_ATTEMPTS: u32 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Paused,
    Ended,
}

/// A request from the outside world: a key press, a button, a menu action.
/// The engine is the only thing that mutates game state in response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Direction(Direction),
    Start,
    Pause,
    Resume,
    TogglePause,
    Restart,
}

/// What a single tick did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Moved,
    Ate,
    Collided,
}

/// Read-only view of the game handed to the renderer.
pub struct Snapshot<'a> {
    pub phase: Phase,
    pub snake: &'a VecDeque<Point>,
    pub food: Option<Point>,
    pub direction: Direction,
    pub score: u32,
    pub high_score: u32,
}

/// The snake simulation: a finite-state machine advanced by discrete ticks.
///
/// The snake body is kept tail-first, head-last. Direction changes are
/// queued and applied one per tick so that two quick key presses between
/// ticks both take effect instead of the second overwriting the first.
pub struct Engine<S> {
    phase: Phase,
    snake: VecDeque<Point>,
    direction: Direction,
    queue: VecDeque<Direction>,
    food: Option<Point>,
    score: u32,
    high_score: u32,
    store: S,
    rng: StdRng,
}

impl<S: HighScoreStore> Engine<S> {
    pub fn new(store: S) -> Self {
        let seed: u64 = rand::thread_rng().gen();
        Self::with_seed(seed, store)
    }

    pub fn with_seed(seed: u64, mut store: S) -> Self {
        let high_score = store.load();
        let mut engine = Engine {
            phase: Phase::Idle,
            snake: VecDeque::new(),
            direction: Direction::Right,
            queue: VecDeque::new(),
            food: None,
            score: 0,
            high_score,
            store,
            rng: StdRng::seed_from_u64(seed),
        };
        info!("engine ready (seed {seed}, high score {high_score})");
        engine.reset();
        engine
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            phase: self.phase,
            snake: &self.snake,
            food: self.food,
            direction: self.direction,
            score: self.score,
            high_score: self.high_score,
        }
    }

    pub fn handle(&mut self, command: Command) {
        match command {
            Command::Direction(direction) => {
                self.queue_direction(direction);
                // A direction press is as good as pressing start.
                if self.phase == Phase::Idle {
                    self.start();
                }
            }
            Command::Start => self.start(),
            Command::Pause => self.pause(),
            Command::Resume => self.resume(),
            Command::TogglePause => self.toggle_pause(),
            Command::Restart => self.restart(),
        }
    }

    /// Advances the simulation by one step. Does nothing unless Running.
    pub fn tick(&mut self) -> Option<StepOutcome> {
        if self.phase != Phase::Running {
            return None;
        }

        if let Some(next) = self.queue.pop_front() {
            self.direction = next;
        }

        let head = *self
            .snake
            .back()
            .expect("snake always has at least one cell");
        let new_head = head.step(self.direction);

        // The body check includes the tail cell even though it is about to
        // be vacated: moving into the cell the tail currently occupies ends
        // the game.
        if !new_head.in_bounds() || self.occupied(new_head) {
            self.end_round(new_head);
            return Some(StepOutcome::Collided);
        }

        self.snake.push_back(new_head);

        if self.food == Some(new_head) {
            self.score += FOOD_SCORE;
            info!(
                "ate food at ({}, {}), score {}",
                new_head.x, new_head.y, self.score
            );
            self.raise_high_score();
            self.food = self.spawn_food();
            Some(StepOutcome::Ate)
        } else {
            self.snake.pop_front();
            Some(StepOutcome::Moved)
        }
    }

    fn queue_direction(&mut self, next: Direction) {
        // Reversals are judged against the last queued turn, falling back
        // to the live direction when nothing is queued.
        let reference = self.queue.back().copied().unwrap_or(self.direction);
        if next == reference.opposite() {
            return;
        }
        self.queue.push_back(next);
    }

    fn start(&mut self) {
        match self.phase {
            Phase::Running => {}
            Phase::Ended => {
                self.reset();
                self.phase = Phase::Running;
                info!("new round started");
            }
            Phase::Idle | Phase::Paused => {
                self.phase = Phase::Running;
                info!("round running");
            }
        }
    }

    fn pause(&mut self) {
        if self.phase == Phase::Running {
            self.phase = Phase::Paused;
        }
    }

    fn resume(&mut self) {
        if self.phase == Phase::Paused {
            self.phase = Phase::Running;
        }
    }

    fn toggle_pause(&mut self) {
        match self.phase {
            Phase::Running => self.pause(),
            Phase::Paused => self.resume(),
            Phase::Idle => self.start(),
            Phase::Ended => {}
        }
    }

    fn restart(&mut self) {
        self.reset();
        self.phase = Phase::Running;
        info!("restarted");
    }

    /// Rebuilds the round: three-cell snake in the middle of the board
    /// heading right, empty turn queue, zero score, fresh food.
    fn reset(&mut self) {
        self.phase = Phase::Idle;
        let x = GRID_SIZE / 2 - 1;
        let y = GRID_SIZE / 2;
        self.snake.clear();
        for dx in -1..=1 {
            self.snake.push_back(Point::new(x + dx, y));
        }
        self.direction = Direction::Right;
        self.queue.clear();
        self.score = 0;
        self.food = self.spawn_food();
    }

    fn occupied(&self, cell: Point) -> bool {
        self.snake.iter().any(|&segment| segment == cell)
    }

    /// Picks a food cell uniformly among the free cells: bounded rejection
    /// sampling first, then an exhaustive scan of whatever is left. `None`
    /// only when the snake covers the whole board.
    fn spawn_food(&mut self) -> Option<Point> {
        let capacity = (GRID_SIZE * GRID_SIZE) as usize;
        if self.snake.len() >= capacity {
            return None;
        }

        for _ in 0..FOOD_SAMPLE_ATTEMPTS {
            let candidate = Point::new(
                self.rng.gen_range(0..GRID_SIZE),
                self.rng.gen_range(0..GRID_SIZE),
            );
            if !self.occupied(candidate) {
                debug!("food spawned at ({}, {})", candidate.x, candidate.y);
                return Some(candidate);
            }
        }

        let free: Vec<Point> = (0..GRID_SIZE)
            .flat_map(|y| (0..GRID_SIZE).map(move |x| Point::new(x, y)))
            .filter(|&cell| !self.occupied(cell))
            .collect();
        let candidate = free[self.rng.gen_range(0..free.len())];
        debug!(
            "food spawned at ({}, {}) after scan",
            candidate.x, candidate.y
        );
        Some(candidate)
    }

    fn end_round(&mut self, hit: Point) {
        self.phase = Phase::Ended;
        info!(
            "game over at ({}, {}), final score {}",
            hit.x, hit.y, self.score
        );
        // Re-check is idempotent with the per-food update.
        self.raise_high_score();
    }

    fn raise_high_score(&mut self) {
        if self.score > self.high_score {
            self.high_score = self.score;
            if let Err(err) = self.store.save(self.high_score) {
                warn!("could not persist high score: {err}");
            }
        }
    }
}
