use super::View;
use crate::app::AppCommand;
use common::{
    compose_display, rank_label, LeaderboardSource, RankedEntry, RemoteLeaderboard, ScoreEntry,
    CLIENT_LEADERBOARD_CAPACITY, MAX_NAME_CHARS,
};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};
use std::time::Duration;
use tokio::sync::oneshot::{self, error::TryRecvError};

enum RemoteState {
    Loading(oneshot::Receiver<RemoteLeaderboard>),
    Ready(LeaderboardSource),
}

/// The merged leaderboard plus the player name editor.
pub struct LeaderboardViewState {
    local: Vec<ScoreEntry>,
    rows: Vec<RankedEntry>,
    remote: RemoteState,
    player_name: String,
    name_input: Option<String>,
    selected_index: usize,
}

impl LeaderboardViewState {
    /// Shows `local` right away and merges remote scores once `remote`
    /// delivers. `None` means offline.
    pub fn new(
        local: Vec<ScoreEntry>,
        player_name: String,
        remote: Option<oneshot::Receiver<RemoteLeaderboard>>,
    ) -> Self {
        let rows = compose_display(&local, &RemoteLeaderboard::local_only(), CLIENT_LEADERBOARD_CAPACITY);
        let remote = match remote {
            Some(rx) => RemoteState::Loading(rx),
            None => RemoteState::Ready(LeaderboardSource::LocalOnly),
        };
        Self {
            local,
            rows,
            remote,
            player_name,
            name_input: None,
            selected_index: 0,
        }
    }

    pub fn rows(&self) -> &[RankedEntry] {
        &self.rows
    }

    pub fn source(&self) -> Option<LeaderboardSource> {
        match self.remote {
            RemoteState::Loading(_) => None,
            RemoteState::Ready(source) => Some(source),
        }
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    pub fn set_player_name(&mut self, name: &str) {
        self.player_name = name.to_string();
    }

    pub fn is_editing_name(&self) -> bool {
        self.name_input.is_some()
    }

    fn merge_remote(&mut self, remote: RemoteLeaderboard) {
        self.rows = compose_display(&self.local, &remote, CLIENT_LEADERBOARD_CAPACITY);
        self.remote = RemoteState::Ready(remote.source);
    }

    fn handle_name_input(&mut self, key: KeyEvent) -> Option<AppCommand> {
        let input = self.name_input.as_mut()?;
        match key.code {
            KeyCode::Enter => {
                let name = input.trim().to_string();
                self.name_input = None;
                if name.is_empty() {
                    None
                } else {
                    Some(AppCommand::SetPlayerName(name))
                }
            }
            KeyCode::Esc => {
                self.name_input = None;
                None
            }
            KeyCode::Backspace => {
                input.pop();
                None
            }
            KeyCode::Char(c) => {
                if input.chars().count() < MAX_NAME_CHARS {
                    input.push(c);
                }
                None
            }
            _ => None,
        }
    }

    fn source_line(&self) -> Line<'static> {
        let (text, color) = match self.source() {
            None => ("⏳ Loading global scores...", Color::DarkGray),
            Some(LeaderboardSource::Service) => ("🌐 Global scores from leaderboard service", Color::Green),
            Some(LeaderboardSource::Fallback) => ("📄 Global scores from backup document", Color::Yellow),
            Some(LeaderboardSource::LocalOnly) => ("💾 Local scores only", Color::DarkGray),
        };
        Line::from(Span::styled(text, Style::default().fg(color)))
    }
}

impl View for LeaderboardViewState {
    fn handle_input(&mut self, key: KeyEvent) -> Option<AppCommand> {
        if self.is_editing_name() {
            return self.handle_name_input(key);
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('l') | KeyCode::Esc => Some(AppCommand::BackToGame),
            KeyCode::Char('n') => {
                self.name_input = Some(String::new());
                None
            }
            KeyCode::Char('j') | KeyCode::Down => {
                if self.selected_index < self.rows.len().saturating_sub(1) {
                    self.selected_index += 1;
                }
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.selected_index = self.selected_index.saturating_sub(1);
                None
            }
            _ => None,
        }
    }

    fn update(&mut self, _dt: Duration) {
        let RemoteState::Loading(rx) = &mut self.remote else {
            return;
        };
        match rx.try_recv() {
            Ok(remote) => self.merge_remote(remote),
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Closed) => self.remote = RemoteState::Ready(LeaderboardSource::LocalOnly),
        }
    }

    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
                Constraint::Length(3),
            ])
            .split(frame.area());

        let title = Paragraph::new(vec![Line::from("🏆 Leaderboard"), self.source_line()])
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::NONE));
        frame.render_widget(title, chunks[0]);

        let list_area = chunks[1];
        if self.rows.is_empty() {
            let empty = Paragraph::new("Sin puntuaciones aún. ¡Sé el primero!")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(empty, list_area);
        } else {
            let visible_height = list_area.height.saturating_sub(2) as usize;
            let scroll_offset = (self.selected_index + 1).saturating_sub(visible_height);

            let items: Vec<ListItem> = self
                .rows
                .iter()
                .enumerate()
                .skip(scroll_offset)
                .take(visible_height)
                .map(|(idx, row)| {
                    // Only the podium highlights the current player
                    let is_current = row.entry.name == self.player_name && row.rank <= 3;
                    let mut style = if is_current {
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                    } else {
                        Style::default()
                    };
                    if idx == self.selected_index {
                        style = style.bg(Color::DarkGray);
                    }

                    let content = format!(
                        "{:>4}  {:<15}  {:>6} puntos • Nivel {}",
                        rank_label(row.rank),
                        row.entry.name,
                        row.entry.score,
                        row.entry.level
                    );
                    ListItem::new(content).style(style)
                })
                .collect();

            let list = List::new(items).block(
                Block::default()
                    .title(format!("Top {}", self.rows.len()))
                    .borders(Borders::ALL),
            );
            frame.render_widget(list, list_area);
        }

        let name_text = match &self.name_input {
            Some(input) => format!("New name: {}▏", input),
            None => format!("Playing as: {}", self.player_name),
        };
        let name = Paragraph::new(name_text)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(name, chunks[2]);

        let controls = if self.is_editing_name() {
            "Enter: Save name | Esc: Cancel"
        } else {
            "n: Change name | j/k: Scroll | q/Esc: Back to game"
        };
        let controls = Paragraph::new(controls)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(controls, chunks[3]);
    }
}
