use std::collections::VecDeque;
use std::fmt;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::constants::MAX_LEVEL;
use crate::grid::{Direction, Grid, Position};
use crate::level::{level_config, level_up_message, points_for_food};
use crate::util::PseudoRandom;

// After this many rejected samples the remaining free cells are enumerated
const MAX_SPAWN_ATTEMPTS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Idle,
    Running,
    Paused,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    WallCollision,
    SelfCollision,
    /// The sausage covers every cell, there is nowhere left to put an egg.
    GridFilled,
}

impl EndReason {
    pub fn message(&self) -> &'static str {
        match self {
            EndReason::WallCollision => "💥 Wall collision!",
            EndReason::SelfCollision => "💀 Self collision!",
            EndReason::GridFilled => "🏆 Board cleared!",
        }
    }
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub enum GameCommand {
    Start,
    Pause,
    Resume,
    TogglePause,
    Turn { direction: Direction },
    Tick,
    Reset,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub enum GameEvent {
    Started { tick_interval_ms: u32 },
    Paused,
    Resumed { tick_interval_ms: u32 },
    DirectionQueued { direction: Direction },
    Moved { head: Position },
    FoodEaten { position: Position, points: u32, score: u32 },
    FoodSpawned { position: Position },
    HighScore { score: u32 },
    LevelUp { level: u32, tick_interval_ms: u32, message: String },
    GameOver { reason: EndReason, score: u32, level: u32 },
    Reset,
}

/// What the front-end must do with its repeating tick timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    /// (Re)start the timer at this interval, cancelling any running one.
    Start { interval_ms: u32 },
    Stop,
}

impl GameEvent {
    pub fn timer_action(&self) -> Option<TimerAction> {
        match self {
            GameEvent::Started { tick_interval_ms }
            | GameEvent::Resumed { tick_interval_ms }
            | GameEvent::LevelUp { tick_interval_ms, .. } => Some(TimerAction::Start {
                interval_ms: *tick_interval_ms,
            }),
            GameEvent::Paused | GameEvent::GameOver { .. } | GameEvent::Reset => {
                Some(TimerAction::Stop)
            }
            _ => None,
        }
    }
}

/// Everything a renderer needs to draw one frame.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SimulationSnapshot {
    pub grid: Grid,
    pub phase: GamePhase,
    pub snake: Vec<Position>,
    pub direction: Direction,
    pub food: Position,
    pub score: u32,
    pub high_score: u32,
    pub level: u32,
    pub food_eaten: u32,
    pub foods_to_next_level: u32,
    pub tick_interval_ms: u32,
    pub tick: u64,
}

/// One game session: the sausage, the egg, score and level, and the phase
/// machine Idle -> Running <-> Paused -> GameOver -> Idle.
///
/// Operations never render and never own a timer. Each returns the events it
/// produced; front-ends redraw and drive their timer from those events.
#[derive(Debug, Clone)]
pub struct Simulation {
    grid: Grid,
    phase: GamePhase,
    snake: VecDeque<Position>,
    direction: Direction,
    pending_direction: Direction,
    food: Position,
    score: u32,
    level: u32,
    food_eaten: u32,
    tick_interval_ms: u32,
    high_score: u32,
    end_reason: Option<EndReason>,
    tick: u64,
    rng: PseudoRandom,
}

impl Simulation {
    pub fn new(grid: Grid, seed: u64) -> Self {
        let grid = if grid.cell_count() < 2 {
            warn!("Grid {}x{} is too small to play, using the default board", grid.width, grid.height);
            Grid::default()
        } else {
            grid
        };

        let mut simulation = Simulation {
            grid,
            phase: GamePhase::Idle,
            snake: VecDeque::new(),
            direction: Direction::Right,
            pending_direction: Direction::Right,
            food: grid.center(),
            score: 0,
            level: 1,
            food_eaten: 0,
            tick_interval_ms: level_config(1).tick_interval_ms,
            high_score: 0,
            end_reason: None,
            tick: 0,
            rng: PseudoRandom::new(seed),
        };
        simulation.reset_session();
        simulation
    }

    /// Carries a high score over from durable storage.
    pub fn with_high_score(mut self, high_score: u32) -> Self {
        self.high_score = high_score;
        self
    }

    pub fn exec_command(&mut self, command: GameCommand) -> Vec<GameEvent> {
        match command {
            GameCommand::Start => self.start(),
            GameCommand::Pause => self.pause(),
            GameCommand::Resume => self.resume(),
            GameCommand::TogglePause => self.toggle_pause(),
            GameCommand::Turn { direction } => self.set_direction(direction),
            GameCommand::Tick => self.tick(),
            GameCommand::Reset => self.reset(),
        }
    }

    /// Starts a fresh session from Idle or GameOver, resumes from Paused.
    pub fn start(&mut self) -> Vec<GameEvent> {
        match self.phase {
            GamePhase::Running => Vec::new(),
            GamePhase::Paused => self.resume(),
            GamePhase::Idle | GamePhase::GameOver => {
                self.reset_session();
                self.phase = GamePhase::Running;
                debug!("Game started on a {}x{} grid", self.grid.width, self.grid.height);
                vec![GameEvent::Started {
                    tick_interval_ms: self.tick_interval_ms,
                }]
            }
        }
    }

    pub fn pause(&mut self) -> Vec<GameEvent> {
        if self.phase != GamePhase::Running {
            return Vec::new();
        }
        self.phase = GamePhase::Paused;
        vec![GameEvent::Paused]
    }

    pub fn resume(&mut self) -> Vec<GameEvent> {
        if self.phase != GamePhase::Paused {
            return Vec::new();
        }
        self.phase = GamePhase::Running;
        vec![GameEvent::Resumed {
            tick_interval_ms: self.tick_interval_ms,
        }]
    }

    pub fn toggle_pause(&mut self) -> Vec<GameEvent> {
        match self.phase {
            GamePhase::Running => self.pause(),
            GamePhase::Paused => self.resume(),
            _ => Vec::new(),
        }
    }

    /// Buffers a turn for the next tick. Ignored unless running, rejected when
    /// it would reverse the committed direction.
    pub fn set_direction(&mut self, direction: Direction) -> Vec<GameEvent> {
        if self.phase != GamePhase::Running || direction.is_opposite(&self.direction) {
            return Vec::new();
        }
        self.pending_direction = direction;
        vec![GameEvent::DirectionQueued { direction }]
    }

    /// Same as [`Simulation::set_direction`] for a raw `(dx, dy)` vector.
    pub fn set_direction_delta(&mut self, dx: i32, dy: i32) -> Vec<GameEvent> {
        match Direction::from_delta(dx, dy) {
            Some(direction) => self.set_direction(direction),
            None => Vec::new(),
        }
    }

    /// Advances the sausage by one cell.
    pub fn tick(&mut self) -> Vec<GameEvent> {
        let mut out = Vec::new();
        if self.phase != GamePhase::Running {
            return out;
        }

        self.direction = self.pending_direction;
        self.tick += 1;

        let head = self.head().step(self.direction);

        if !self.grid.contains(head) {
            self.end_game(EndReason::WallCollision, &mut out);
            return out;
        }

        if self.snake.contains(&head) {
            self.end_game(EndReason::SelfCollision, &mut out);
            return out;
        }

        self.snake.push_front(head);

        if head == self.food {
            let points = points_for_food(self.level);
            self.score += points;
            self.food_eaten += 1;
            out.push(GameEvent::FoodEaten {
                position: head,
                points,
                score: self.score,
            });

            if self.score > self.high_score {
                self.high_score = self.score;
                out.push(GameEvent::HighScore { score: self.score });
            }

            match self.spawn_food() {
                Some(position) => {
                    self.food = position;
                    out.push(GameEvent::FoodSpawned { position });
                }
                None => {
                    out.push(GameEvent::Moved { head });
                    self.end_game(EndReason::GridFilled, &mut out);
                    return out;
                }
            }

            let config = level_config(self.level);
            if self.food_eaten >= config.foods_to_next_level && self.level < MAX_LEVEL {
                self.level_up(&mut out);
            }
        } else {
            self.snake.pop_back();
        }

        out.push(GameEvent::Moved { head });
        out
    }

    /// Back to Idle from any phase with a fresh session and no timer.
    pub fn reset(&mut self) -> Vec<GameEvent> {
        self.phase = GamePhase::Idle;
        self.reset_session();
        vec![GameEvent::Reset]
    }

    fn reset_session(&mut self) {
        self.snake.clear();
        self.snake.push_back(self.grid.center());
        self.direction = Direction::Right;
        self.pending_direction = Direction::Right;
        self.score = 0;
        self.level = 1;
        self.food_eaten = 0;
        self.tick_interval_ms = level_config(1).tick_interval_ms;
        self.end_reason = None;
        self.tick = 0;
        // A board with at least two cells always has room next to a single segment
        if let Some(position) = self.spawn_food() {
            self.food = position;
        }
    }

    fn end_game(&mut self, reason: EndReason, out: &mut Vec<GameEvent>) {
        self.phase = GamePhase::GameOver;
        self.end_reason = Some(reason);

        if self.score > self.high_score {
            self.high_score = self.score;
            out.push(GameEvent::HighScore { score: self.score });
        }

        debug!("Game over ({:?}) with score {} at level {}", reason, self.score, self.level);
        out.push(GameEvent::GameOver {
            reason,
            score: self.score,
            level: self.level,
        });
    }

    fn level_up(&mut self, out: &mut Vec<GameEvent>) {
        self.level += 1;
        self.food_eaten = 0;
        self.tick_interval_ms = level_config(self.level).tick_interval_ms;

        out.push(GameEvent::LevelUp {
            level: self.level,
            tick_interval_ms: self.tick_interval_ms,
            message: level_up_message(self.level),
        });
    }

    fn spawn_food(&mut self) -> Option<Position> {
        if self.snake.len() >= self.grid.cell_count() {
            return None;
        }

        let width = self.grid.width as u32;
        let height = self.grid.height as u32;

        for _ in 0..MAX_SPAWN_ATTEMPTS {
            let candidate = Position::new(
                self.rng.below(width) as i16,
                self.rng.below(height) as i16,
            );
            if !self.snake.contains(&candidate) {
                return Some(candidate);
            }
        }

        let free: Vec<Position> = (0..height as i16)
            .flat_map(|y| (0..width as i16).map(move |x| Position::new(x, y)))
            .filter(|position| !self.snake.contains(position))
            .collect();
        let index = self.rng.below(free.len() as u32) as usize;
        free.get(index).copied()
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Running
    }

    pub fn snake(&self) -> &VecDeque<Position> {
        &self.snake
    }

    pub fn head(&self) -> Position {
        self.snake.front().copied().unwrap_or_else(|| self.grid.center())
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn pending_direction(&self) -> Direction {
        self.pending_direction
    }

    pub fn food(&self) -> Position {
        self.food
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn food_eaten(&self) -> u32 {
        self.food_eaten
    }

    pub fn foods_to_next_level(&self) -> u32 {
        level_config(self.level).foods_to_next_level
    }

    pub fn tick_interval_ms(&self) -> u32 {
        self.tick_interval_ms
    }

    pub fn end_reason(&self) -> Option<EndReason> {
        self.end_reason
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// HUD text for the level, e.g. `2 (3/7)`.
    pub fn level_label(&self) -> String {
        format!("{} ({}/{})", self.level, self.food_eaten, self.foods_to_next_level())
    }

    pub fn snapshot(&self) -> SimulationSnapshot {
        SimulationSnapshot {
            grid: self.grid,
            phase: self.phase,
            snake: self.snake.iter().copied().collect(),
            direction: self.direction,
            food: self.food,
            score: self.score,
            high_score: self.high_score,
            level: self.level,
            food_eaten: self.food_eaten,
            foods_to_next_level: self.foods_to_next_level(),
            tick_interval_ms: self.tick_interval_ms,
            tick: self.tick,
        }
    }

    #[cfg(test)]
    pub(crate) fn place_food(&mut self, position: Position) {
        self.food = position;
    }

    #[cfg(test)]
    pub(crate) fn place_snake(&mut self, body: &[Position], direction: Direction) {
        self.snake = body.iter().copied().collect();
        self.direction = direction;
        self.pending_direction = direction;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running(width: u16, height: u16) -> Simulation {
        let mut sim = Simulation::new(Grid::new(width, height), 99);
        sim.start();
        sim
    }

    #[test]
    fn test_start_initializes_session() {
        let mut sim = Simulation::new(Grid::new(20, 20), 1);
        assert_eq!(sim.phase(), GamePhase::Idle);

        let events = sim.start();
        assert_eq!(events, vec![GameEvent::Started { tick_interval_ms: 100 }]);
        assert_eq!(sim.phase(), GamePhase::Running);
        assert_eq!(sim.snake().len(), 1);
        assert_eq!(sim.head(), Position::new(10, 10));
        assert_eq!(sim.direction(), Direction::Right);
        assert_eq!(sim.score(), 0);
        assert_eq!(sim.level(), 1);

        // Starting again while running does nothing
        assert!(sim.start().is_empty());
    }

    #[test]
    fn test_wall_collision_leaves_snake_untouched() {
        let mut sim = running(5, 5);
        sim.place_snake(&[Position::new(4, 2), Position::new(3, 2)], Direction::Right);
        sim.place_food(Position::new(0, 0));

        let events = sim.tick();
        assert_eq!(sim.phase(), GamePhase::GameOver);
        assert_eq!(sim.end_reason(), Some(EndReason::WallCollision));
        assert!(events.contains(&GameEvent::GameOver {
            reason: EndReason::WallCollision,
            score: 0,
            level: 1,
        }));
        let body: Vec<Position> = sim.snake().iter().copied().collect();
        assert_eq!(body, vec![Position::new(4, 2), Position::new(3, 2)]);
    }

    #[test]
    fn test_self_collision() {
        let mut sim = running(10, 10);
        // A hook shape where turning up runs into the body
        sim.place_snake(
            &[
                Position::new(5, 5),
                Position::new(4, 5),
                Position::new(4, 4),
                Position::new(5, 4),
                Position::new(6, 4),
            ],
            Direction::Right,
        );
        sim.place_food(Position::new(0, 0));
        sim.set_direction(Direction::Up);

        let events = sim.tick();
        assert_eq!(sim.end_reason(), Some(EndReason::SelfCollision));
        assert!(matches!(events.last(), Some(GameEvent::GameOver { .. })));
    }

    #[test]
    fn test_moving_keeps_length() {
        let mut sim = running(10, 10);
        sim.place_snake(&[Position::new(3, 3), Position::new(2, 3)], Direction::Right);
        sim.place_food(Position::new(9, 9));

        let events = sim.tick();
        assert_eq!(events, vec![GameEvent::Moved { head: Position::new(4, 3) }]);
        let body: Vec<Position> = sim.snake().iter().copied().collect();
        assert_eq!(body, vec![Position::new(4, 3), Position::new(3, 3)]);
    }

    #[test]
    fn test_eating_grows_and_scores() {
        let mut sim = running(10, 10);
        sim.place_snake(&[Position::new(3, 3)], Direction::Right);
        sim.place_food(Position::new(4, 3));

        let events = sim.tick();
        assert_eq!(sim.score(), 15);
        assert_eq!(sim.snake().len(), 2);
        assert_eq!(sim.food_eaten(), 1);
        assert!(events.contains(&GameEvent::FoodEaten {
            position: Position::new(4, 3),
            points: 15,
            score: 15,
        }));
        assert!(!sim.snake().contains(&sim.food()));
    }

    fn feed_straight(sim: &mut Simulation, count: u32) -> Vec<GameEvent> {
        let mut events = Vec::new();
        for _ in 0..count {
            let next = sim.head().step(sim.direction());
            sim.place_food(next);
            events.extend(sim.tick());
        }
        events
    }

    #[test]
    fn test_fifth_egg_levels_up() {
        let mut sim = running(40, 5);
        sim.place_snake(&[Position::new(1, 2)], Direction::Right);

        let events = feed_straight(&mut sim, 4);
        assert_eq!(sim.level(), 1);
        assert_eq!(sim.food_eaten(), 4);
        assert!(!events.iter().any(|e| matches!(e, GameEvent::LevelUp { .. })));

        let events = feed_straight(&mut sim, 1);
        assert_eq!(sim.level(), 2);
        assert_eq!(sim.food_eaten(), 0);
        assert_eq!(sim.tick_interval_ms(), 85);
        assert_eq!(sim.score(), 75);
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::LevelUp { level: 2, tick_interval_ms: 85, .. }
        )));
        assert_eq!(sim.level_label(), "2 (0/7)");
    }

    #[test]
    fn test_level_stops_at_six() {
        let mut sim = running(200, 3);
        sim.place_snake(&[Position::new(0, 1)], Direction::Right);

        // 5 + 7 + 8 + 10 + 12 eggs reach level 6
        feed_straight(&mut sim, 42);
        assert_eq!(sim.level(), 6);
        assert_eq!(sim.tick_interval_ms(), 30);

        feed_straight(&mut sim, 20);
        assert_eq!(sim.level(), 6);
        assert_eq!(sim.food_eaten(), 20);
    }

    #[test]
    fn test_food_never_on_snake() {
        let mut sim = running(8, 8);
        let mut spawned = 0;

        for _ in 0..5000 {
            if sim.phase() == GamePhase::GameOver {
                sim.start();
            }
            let head = sim.head();
            let food = sim.food();
            let wanted = if food.x > head.x {
                Direction::Right
            } else if food.x < head.x {
                Direction::Left
            } else if food.y > head.y {
                Direction::Down
            } else {
                Direction::Up
            };
            sim.set_direction(wanted);

            for event in sim.tick() {
                if let GameEvent::FoodSpawned { position } = event {
                    spawned += 1;
                    assert!(!sim.snake().contains(&position));
                    assert_eq!(sim.food(), position);
                }
            }
        }
        assert!(spawned > 0);
    }

    #[test]
    fn test_reversal_is_rejected() {
        let mut sim = running(20, 20);
        assert!(sim.set_direction(Direction::Left).is_empty());
        assert_eq!(sim.pending_direction(), Direction::Right);

        assert_eq!(
            sim.set_direction(Direction::Down),
            vec![GameEvent::DirectionQueued { direction: Direction::Down }]
        );
        // Committed direction only changes on the next tick
        assert_eq!(sim.direction(), Direction::Right);
    }

    #[test]
    fn test_input_ignored_unless_running() {
        let mut sim = Simulation::new(Grid::new(20, 20), 3);
        assert!(sim.set_direction(Direction::Down).is_empty());
        assert!(sim.tick().is_empty());

        sim.start();
        sim.pause();
        assert!(sim.set_direction(Direction::Down).is_empty());
        assert!(sim.tick().is_empty());
        assert_eq!(sim.current_tick(), 0);
    }

    #[test]
    fn test_pause_resume_keeps_state() {
        let mut sim = running(20, 20);
        sim.place_food(Position::new(0, 0));
        sim.tick();
        let head = sim.head();

        assert_eq!(sim.toggle_pause(), vec![GameEvent::Paused]);
        assert_eq!(sim.phase(), GamePhase::Paused);
        assert_eq!(sim.start(), vec![GameEvent::Resumed { tick_interval_ms: 100 }]);
        assert_eq!(sim.head(), head);
    }

    #[test]
    fn test_reset_from_game_over() {
        let mut sim = running(3, 3);
        sim.place_food(Position::new(0, 0));
        sim.tick();
        sim.tick();
        assert_eq!(sim.phase(), GamePhase::GameOver);

        assert_eq!(sim.reset(), vec![GameEvent::Reset]);
        assert_eq!(sim.phase(), GamePhase::Idle);
        assert_eq!(sim.snake().len(), 1);
        assert_eq!(sim.end_reason(), None);
    }

    #[test]
    fn test_high_score_follows_score() {
        let mut sim = Simulation::new(Grid::new(10, 10), 5).with_high_score(20);
        sim.start();
        sim.place_snake(&[Position::new(3, 3)], Direction::Right);
        sim.place_food(Position::new(4, 3));
        sim.tick();
        assert_eq!(sim.high_score(), 20);

        sim.place_food(Position::new(5, 3));
        let events = sim.tick();
        assert_eq!(sim.high_score(), 30);
        assert!(events.contains(&GameEvent::HighScore { score: 30 }));
    }

    #[test]
    fn test_grid_filled_ends_game() {
        let mut sim = running(2, 1);
        sim.place_snake(&[Position::new(0, 0)], Direction::Right);
        sim.place_food(Position::new(1, 0));

        let events = sim.tick();
        assert_eq!(sim.end_reason(), Some(EndReason::GridFilled));
        assert!(matches!(events.last(), Some(GameEvent::GameOver { score: 15, .. })));
    }

    #[test]
    fn test_timer_actions() {
        assert_eq!(
            GameEvent::Started { tick_interval_ms: 100 }.timer_action(),
            Some(TimerAction::Start { interval_ms: 100 })
        );
        assert_eq!(GameEvent::Paused.timer_action(), Some(TimerAction::Stop));
        assert_eq!(GameEvent::Moved { head: Position::new(0, 0) }.timer_action(), None);
    }
}
