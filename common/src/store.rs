use anyhow::{Context, Result};
use log::warn;
use serde_json::Value;

use crate::constants::{
    CLIENT_LEADERBOARD_CAPACITY, DEFAULT_PLAYER_NAME, HIGH_SCORE_KEY, LEADERBOARD_KEY,
    PLAYER_NAME_KEY, SYNC_TOKEN_KEY,
};
use crate::leaderboard::{
    Leaderboard, LeaderboardStats, RankedEntry, ScoreEntry, entries_from_values,
};
use crate::simulation::GameEvent;
use crate::storage::KeyValueStorage;
use crate::sync::SubmissionSink;

/// The player's own leaderboard and preferences, kept in durable client
/// storage. Every recorded entry is also handed to the submission sink.
pub struct LeaderboardStore<S: KeyValueStorage> {
    storage: S,
    board: Leaderboard,
    sink: Option<Box<dyn SubmissionSink>>,
}

impl<S: KeyValueStorage> LeaderboardStore<S> {
    pub fn load(storage: S) -> Self {
        Self::with_capacity(storage, CLIENT_LEADERBOARD_CAPACITY)
    }

    pub fn with_capacity(storage: S, capacity: usize) -> Self {
        let entries = read_entries(&storage);
        LeaderboardStore {
            storage,
            board: Leaderboard::from_entries(entries, capacity),
            sink: None,
        }
    }

    pub fn with_sink(mut self, sink: Box<dyn SubmissionSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Inserts, trims, persists, then forwards the entry. Forwarding happens
    /// even when persisting fails. Returns the entry's rank if it was kept.
    pub fn record(&mut self, entry: ScoreEntry) -> Result<Option<usize>> {
        let rank = self.board.insert(entry.clone());
        let persisted = self.persist();

        if let Some(sink) = &self.sink {
            sink.forward(&entry);
        }

        persisted.map(|_| rank)
    }

    /// Reacts to simulation events that matter beyond the session.
    pub fn handle_event(&mut self, event: &GameEvent) -> Result<()> {
        match event {
            GameEvent::HighScore { score } => {
                self.record_high_score(*score)?;
            }
            GameEvent::GameOver { score, level, .. } => {
                let entry = ScoreEntry::new(&self.player_name(), *score, *level);
                self.record(entry)?;
            }
            _ => {}
        }
        Ok(())
    }

    fn persist(&mut self) -> Result<()> {
        let json = serde_json::to_string(self.board.entries())
            .context("Failed to serialize leaderboard")?;
        self.storage
            .set(LEADERBOARD_KEY, &json)
            .context("Failed to persist leaderboard")
    }

    pub fn top_n(&self, n: usize) -> Vec<RankedEntry> {
        self.board.top_n(n)
    }

    pub fn stats(&self) -> LeaderboardStats {
        self.board.stats()
    }

    pub fn entries(&self) -> &[ScoreEntry] {
        self.board.entries()
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.board
    }

    pub fn high_score(&self) -> u32 {
        self.storage
            .get(HIGH_SCORE_KEY)
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(0)
    }

    /// Stores `score` if it beats the stored high score.
    pub fn record_high_score(&mut self, score: u32) -> Result<bool> {
        if score <= self.high_score() {
            return Ok(false);
        }
        self.storage
            .set(HIGH_SCORE_KEY, &score.to_string())
            .context("Failed to persist high score")?;
        Ok(true)
    }

    pub fn player_name(&self) -> String {
        self.storage
            .get(PLAYER_NAME_KEY)
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PLAYER_NAME.to_string())
    }

    /// Returns `false` and changes nothing for a blank name.
    pub fn set_player_name(&mut self, name: &str) -> Result<bool> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(false);
        }
        self.storage
            .set(PLAYER_NAME_KEY, name)
            .context("Failed to persist player name")?;
        Ok(true)
    }

    pub fn sync_token(&self) -> Option<String> {
        self.storage
            .get(SYNC_TOKEN_KEY)
            .filter(|token| !token.trim().is_empty())
    }

    /// Returns `false` and changes nothing for a blank token.
    pub fn set_sync_token(&mut self, token: &str) -> Result<bool> {
        let token = token.trim();
        if token.is_empty() {
            return Ok(false);
        }
        self.storage
            .set(SYNC_TOKEN_KEY, token)
            .context("Failed to persist sync token")?;
        Ok(true)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

// Unreadable entries are skipped one by one so a single bad record does not
// wipe the player's history.
fn read_entries<S: KeyValueStorage>(storage: &S) -> Vec<ScoreEntry> {
    let Some(raw) = storage.get(LEADERBOARD_KEY) else {
        return Vec::new();
    };

    let values: Vec<Value> = match serde_json::from_str(&raw) {
        Ok(values) => values,
        Err(e) => {
            warn!("Stored leaderboard is not a JSON array, starting empty: {}", e);
            return Vec::new();
        }
    };

    entries_from_values(values)
}
