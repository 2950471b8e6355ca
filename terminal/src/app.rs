use anyhow::Result;
use common::{
    Grid, HttpTransport, LeaderboardStore, PseudoRandom, ServiceKind, SyncGateway, DEFAULT_GRID_HEIGHT,
    DEFAULT_GRID_WIDTH,
};
use crossterm::event::KeyEvent;
use ratatui::Frame;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::{error, info, warn};

use crate::storage::JsonFileStorage;
use crate::sync::{spawn_remote_load, Gateway, RuntimeSink};
use crate::views::{GameViewState, LeaderboardViewState, View};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    Quit,
    ShowLeaderboard,
    BackToGame,
    SetPlayerName(String),
}

/// Where scores go and where local state lives.
#[derive(Debug, Clone)]
pub struct TerminalConfig {
    pub service_url: String,
    pub service_kind: ServiceKind,
    pub fallback_url: Option<String>,
    pub data_dir: PathBuf,
    pub offline: bool,
}

pub enum AppState {
    Game,
    Leaderboard(Box<LeaderboardViewState>),
}

pub struct App {
    pub state: AppState,
    game: GameViewState<JsonFileStorage>,
    gateway: Option<Gateway>,
    handle: Handle,
}

impl App {
    pub fn new(config: &TerminalConfig, handle: Handle) -> Result<Self> {
        let storage = JsonFileStorage::open(&config.data_dir)?;
        info!(path = %storage.path().display(), "Opened local storage");

        let gateway = if config.offline {
            info!("Offline mode, scores stay local");
            None
        } else {
            let transport = HttpTransport::new(
                &config.service_url,
                config.service_kind,
                config.fallback_url.as_deref(),
            )?;
            Some(Arc::new(SyncGateway::new(transport)))
        };

        let mut store = LeaderboardStore::load(storage);
        if let Some(gateway) = &gateway {
            store = store.with_sink(Box::new(RuntimeSink::new(gateway.clone(), handle.clone())));
        }

        let grid = Grid::new(DEFAULT_GRID_WIDTH, DEFAULT_GRID_HEIGHT);
        let game = GameViewState::new(grid, PseudoRandom::from_clock().next_u64(), store);

        Ok(Self {
            state: AppState::Game,
            game,
            gateway,
            handle,
        })
    }

    pub fn game(&self) -> &GameViewState<JsonFileStorage> {
        &self.game
    }

    pub fn handle_input(&mut self, key: KeyEvent) -> Option<AppCommand> {
        match &mut self.state {
            AppState::Game => self.game.handle_input(key),
            AppState::Leaderboard(board) => board.handle_input(key),
        }
    }

    pub fn update(&mut self, dt: Duration) {
        match &mut self.state {
            AppState::Game => self.game.update(dt),
            AppState::Leaderboard(board) => board.update(dt),
        }
    }

    pub fn render(&self, frame: &mut Frame) {
        match &self.state {
            AppState::Game => self.game.render(frame),
            AppState::Leaderboard(board) => board.render(frame),
        }
    }

    pub fn handle_command(&mut self, command: AppCommand) -> Result<()> {
        match command {
            AppCommand::ShowLeaderboard => {
                self.game.pause();
                let remote = self
                    .gateway
                    .as_ref()
                    .map(|gateway| spawn_remote_load(gateway.clone(), &self.handle));
                let store = self.game.store();
                let board = LeaderboardViewState::new(store.entries().to_vec(), store.player_name(), remote);
                self.state = AppState::Leaderboard(Box::new(board));
            }
            AppCommand::BackToGame => {
                self.state = AppState::Game;
            }
            AppCommand::SetPlayerName(name) => {
                // The name stays in memory for this session even if it cannot be saved
                match self.game.store_mut().set_player_name(&name) {
                    Ok(true) => info!("Player name set to {}", name),
                    Ok(false) => warn!("Ignored blank player name"),
                    Err(e) => error!("Could not save player name: {:#}", e),
                }
                if let AppState::Leaderboard(board) = &mut self.state {
                    board.set_player_name(&self.game.store().player_name());
                }
            }
            AppCommand::Quit => {
                // Handled in main loop
            }
        }
        Ok(())
    }
}
