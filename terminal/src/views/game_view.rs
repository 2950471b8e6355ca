use super::View;
use crate::app::AppCommand;
use crate::render::board::BoardRenderer;
use crate::render::standard_renderer::StandardRenderer;
use crate::render::types::{CharDimensions, RenderConfig};
use common::{
    Direction, GameEvent, GamePhase, Grid, KeyValueStorage, LeaderboardStore, Simulation,
    StatusKind, StatusLine, TimerAction,
};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Direction as LayoutDirection, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// One game session in the terminal. The tick timer is an accumulator fed
/// by the main loop; it only runs while the simulation asks for it.
pub struct GameViewState<S: KeyValueStorage> {
    simulation: Simulation,
    store: LeaderboardStore<S>,
    status: StatusLine,
    tick_interval: Option<Duration>,
    tick_accumulator: Duration,
    clock: Instant,
}

impl<S: KeyValueStorage> GameViewState<S> {
    pub fn new(grid: Grid, seed: u64, store: LeaderboardStore<S>) -> Self {
        let simulation = Simulation::new(grid, seed).with_high_score(store.high_score());
        Self {
            simulation,
            store,
            status: StatusLine::default(),
            tick_interval: None,
            tick_accumulator: Duration::ZERO,
            clock: Instant::now(),
        }
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn store(&self) -> &LeaderboardStore<S> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut LeaderboardStore<S> {
        &mut self.store
    }

    pub fn status(&self) -> &StatusLine {
        &self.status
    }

    /// Current timer period, `None` while stopped.
    pub fn tick_interval(&self) -> Option<Duration> {
        self.tick_interval
    }

    pub fn start(&mut self) {
        let events = self.simulation.start();
        self.apply(events);
    }

    pub fn pause(&mut self) {
        let events = self.simulation.pause();
        self.apply(events);
    }

    fn now_ms(&self) -> u64 {
        self.clock.elapsed().as_millis() as u64
    }

    fn apply(&mut self, events: Vec<GameEvent>) {
        let now = self.now_ms();
        for event in &events {
            self.status.apply(event, now);
            if let Err(e) = self.store.handle_event(event) {
                warn!("Could not record game result: {:#}", e);
            }
            match event.timer_action() {
                Some(TimerAction::Start { interval_ms }) => {
                    debug!(interval_ms, "Tick timer started");
                    self.tick_interval = Some(Duration::from_millis(interval_ms as u64));
                    self.tick_accumulator = Duration::ZERO;
                }
                Some(TimerAction::Stop) => {
                    self.tick_interval = None;
                    self.tick_accumulator = Duration::ZERO;
                }
                None => {}
            }
        }
    }

    fn start_label(&self) -> &'static str {
        match self.simulation.phase() {
            GamePhase::Idle => "Start Game",
            GamePhase::Running | GamePhase::Paused => "Resume",
            GamePhase::GameOver => "Play Again",
        }
    }

    fn render_header(&self) -> Paragraph<'_> {
        let line = Line::from(vec![
            Span::raw("Score: "),
            Span::styled(
                self.simulation.score().to_string(),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::raw("  |  Level: "),
            Span::styled(self.simulation.level_label(), Style::default().fg(Color::Cyan)),
            Span::raw("  |  High Score: "),
            Span::styled(
                self.simulation.high_score().to_string(),
                Style::default().fg(Color::Magenta),
            ),
        ]);

        Paragraph::new(line)
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .title("🌭 Pablo el Devorador de Huevos")
                    .borders(Borders::ALL),
            )
    }

    fn render_board(&self, frame: &mut Frame, area: Rect) {
        let char_dims = CharDimensions::new(2, 1);
        let renderer = BoardRenderer::new(StandardRenderer::new(char_dims));
        let config = RenderConfig { chars_per_cell: char_dims };
        let snapshot = self.simulation.snapshot();
        let char_grid = renderer.render(&snapshot, &config);

        // +2 for the border
        let board_width = char_grid.physical_width() as u16 + 2;
        let board_height = char_grid.physical_height() as u16 + 2;
        let x_offset = area.width.saturating_sub(board_width) / 2;
        let y_offset = area.height.saturating_sub(board_height) / 2;
        let board_area = Rect {
            x: area.x + x_offset,
            y: area.y + y_offset,
            width: board_width.min(area.width),
            height: board_height.min(area.height),
        };

        let lines: Vec<Line> = char_grid
            .into_styled_lines()
            .into_iter()
            .map(|(chars, styles)| {
                Line::from(
                    chars
                        .into_iter()
                        .zip(styles)
                        .map(|(ch, style)| Span::styled(ch.to_string(), style))
                        .collect::<Vec<_>>(),
                )
            })
            .collect();

        let board = Paragraph::new(lines)
            .style(Style::default().bg(Color::Rgb(26, 26, 26)))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
        frame.render_widget(board, board_area);
    }

    fn render_status(&self) -> Paragraph<'_> {
        let color = match self.status.kind {
            StatusKind::Neutral => Color::White,
            StatusKind::Success => Color::Green,
            StatusKind::Error => Color::Red,
        };
        Paragraph::new(self.status.text.as_str())
            .style(Style::default().fg(color))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL))
    }

    fn render_controls(&self) -> Paragraph<'_> {
        let lines = vec![
            Line::from(format!(
                "Enter: {} | Space/p: Pause | r: Reset | Arrows/WASD: Turn",
                self.start_label()
            )),
            Line::from("l: Leaderboard | q: Quit"),
        ];

        Paragraph::new(lines)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL))
    }
}

impl<S: KeyValueStorage> View for GameViewState<S> {
    fn handle_input(&mut self, key: KeyEvent) -> Option<AppCommand> {
        let events = match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Some(AppCommand::Quit),
            KeyCode::Char('l') => return Some(AppCommand::ShowLeaderboard),
            KeyCode::Enter => self.simulation.start(),
            KeyCode::Char(' ') | KeyCode::Char('p') => self.simulation.toggle_pause(),
            KeyCode::Char('r') => self.simulation.reset(),
            KeyCode::Up | KeyCode::Char('w') => self.simulation.set_direction(Direction::Up),
            KeyCode::Down | KeyCode::Char('s') => self.simulation.set_direction(Direction::Down),
            KeyCode::Left | KeyCode::Char('a') => self.simulation.set_direction(Direction::Left),
            KeyCode::Right | KeyCode::Char('d') => self.simulation.set_direction(Direction::Right),
            _ => return None,
        };
        self.apply(events);
        None
    }

    fn update(&mut self, dt: Duration) {
        if self.tick_interval.is_some() {
            self.tick_accumulator += dt;
        }

        // A tick can change or stop the timer, so re-read it every round
        while let Some(interval) = self.tick_interval {
            if self.tick_accumulator < interval {
                break;
            }
            self.tick_accumulator -= interval;
            let events = self.simulation.tick();
            self.apply(events);
        }

        let now = self.now_ms();
        self.status.refresh(self.simulation.phase(), now);
    }

    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(LayoutDirection::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3), // Score, level, high score
                Constraint::Min(10),   // Board
                Constraint::Length(3), // Status line
                Constraint::Length(4), // Controls help
            ])
            .split(frame.area());

        frame.render_widget(self.render_header(), chunks[0]);
        self.render_board(frame, chunks[1]);
        frame.render_widget(self.render_status(), chunks[2]);
        frame.render_widget(self.render_controls(), chunks[3]);
    }
}
