use std::collections::HashSet;

use chrono::{DateTime, NaiveDateTime, Utc};
use log::warn;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::constants::{LEADERBOARD_DOCUMENT_VERSION, MAX_NAME_CHARS};

/// One finished game. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub name: String,
    pub score: u32,
    pub level: u32,
    #[serde(rename = "date", default = "Utc::now", deserialize_with = "deserialize_date")]
    pub timestamp: DateTime<Utc>,
}

// Earlier versions of the game stored `toLocaleString('es-ES')` dates
const LOCALE_DATE_FORMATS: &[&str] = &["%d/%m/%Y, %H:%M:%S", "%d/%m/%Y %H:%M:%S"];

/// Reads a stored date. RFC 3339 and the old `d/m/yyyy, H:MM:SS` form are
/// understood; anything else maps to the Unix epoch so the entry survives.
pub fn parse_date(raw: &str) -> DateTime<Utc> {
    let raw = raw.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return date.with_timezone(&Utc);
    }
    LOCALE_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

fn deserialize_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let date = match Value::deserialize(deserializer)? {
        Value::String(raw) => parse_date(&raw),
        // Milliseconds, as `Date.now()` produces
        Value::Number(millis) => millis
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
        _ => DateTime::<Utc>::UNIX_EPOCH,
    };
    Ok(date)
}

/// Keeps every value that reads as an entry and logs how many did not.
pub fn entries_from_values(values: Vec<Value>) -> Vec<ScoreEntry> {
    let total = values.len();
    let entries: Vec<ScoreEntry> = values
        .into_iter()
        .filter_map(|value| serde_json::from_value(value).ok())
        .collect();
    if entries.len() < total {
        warn!("Skipped {} unreadable leaderboard entries", total - entries.len());
    }
    entries
}

/// `deserialize_with` helper for entry lists: one bad record never takes the
/// rest of the list down with it.
pub fn deserialize_entries<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<ScoreEntry>, D::Error> {
    let values = Vec::<Value>::deserialize(deserializer)?;
    Ok(entries_from_values(values))
}

impl ScoreEntry {
    /// Stamps the entry with the current time and truncates the name.
    pub fn new(name: &str, score: u32, level: u32) -> Self {
        Self::with_timestamp(name, score, level, Utc::now())
    }

    pub fn with_timestamp(name: &str, score: u32, level: u32, timestamp: DateTime<Utc>) -> Self {
        ScoreEntry {
            name: truncate_name(name),
            score,
            level,
            timestamp,
        }
    }
}

/// Cuts a player name down to the allowed number of characters.
pub fn truncate_name(name: &str) -> String {
    name.chars().take(MAX_NAME_CHARS).collect()
}

/// A score entry annotated with its 1-based position in a sorted view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedEntry {
    #[serde(flatten)]
    pub entry: ScoreEntry,
    pub rank: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardStats {
    pub total_scores: usize,
    pub unique_players: usize,
    pub highest_score: u32,
    pub average_score: u32,
}

/// Medal for the podium, ordinal for everyone else.
pub fn rank_label(rank: usize) -> String {
    match rank {
        1 => "🥇".to_string(),
        2 => "🥈".to_string(),
        3 => "🥉".to_string(),
        n => format!("{}º", n),
    }
}

/// Sorts by score, highest first. The sort is stable so equal scores keep
/// their insertion order.
pub fn sort_by_score(entries: &mut [ScoreEntry]) {
    entries.sort_by(|a, b| b.score.cmp(&a.score));
}

/// Ranks the first `n` entries of an already sorted slice.
pub fn rank_top(entries: &[ScoreEntry], n: usize) -> Vec<RankedEntry> {
    entries
        .iter()
        .take(n)
        .enumerate()
        .map(|(idx, entry)| RankedEntry {
            entry: entry.clone(),
            rank: idx + 1,
        })
        .collect()
}

pub fn compute_stats(entries: &[ScoreEntry]) -> LeaderboardStats {
    if entries.is_empty() {
        return LeaderboardStats {
            total_scores: 0,
            unique_players: 0,
            highest_score: 0,
            average_score: 0,
        };
    }

    let unique_players = entries
        .iter()
        .map(|entry| entry.name.as_str())
        .collect::<HashSet<_>>()
        .len();
    let highest_score = entries.iter().map(|entry| entry.score).max().unwrap_or(0);
    let total: u64 = entries.iter().map(|entry| entry.score as u64).sum();
    let average_score = (total as f64 / entries.len() as f64).round() as u32;

    LeaderboardStats {
        total_scores: entries.len(),
        unique_players,
        highest_score,
        average_score,
    }
}

/// Sorted, capped list of score entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaderboard {
    entries: Vec<ScoreEntry>,
    capacity: usize,
}

impl Leaderboard {
    pub fn new(capacity: usize) -> Self {
        Leaderboard {
            entries: Vec::new(),
            capacity,
        }
    }

    /// Builds a leaderboard from entries in any order.
    pub fn from_entries(mut entries: Vec<ScoreEntry>, capacity: usize) -> Self {
        sort_by_score(&mut entries);
        entries.truncate(capacity);
        Leaderboard { entries, capacity }
    }

    /// Inserts an entry and trims to capacity. Returns the entry's rank, or
    /// `None` when its score was too low to stay.
    pub fn insert(&mut self, entry: ScoreEntry) -> Option<usize> {
        // Below every existing score it lands at the end; ties land after their equals
        let position = self
            .entries
            .iter()
            .position(|existing| existing.score < entry.score)
            .unwrap_or(self.entries.len());
        self.entries.insert(position, entry);
        self.entries.truncate(self.capacity);

        (position < self.capacity).then_some(position + 1)
    }

    pub fn top_n(&self, n: usize) -> Vec<RankedEntry> {
        rank_top(&self.entries, n)
    }

    pub fn stats(&self) -> LeaderboardStats {
        compute_stats(&self.entries)
    }

    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<ScoreEntry> {
        self.entries
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Layout of every persisted or mirrored leaderboard file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardDocument {
    #[serde(default, deserialize_with = "deserialize_entries")]
    pub leaderboard: Vec<ScoreEntry>,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "Utc::now")]
    pub last_updated: DateTime<Utc>,
}

fn default_version() -> String {
    LEADERBOARD_DOCUMENT_VERSION.to_string()
}

impl Default for LeaderboardDocument {
    fn default() -> Self {
        LeaderboardDocument {
            leaderboard: Vec::new(),
            version: default_version(),
            last_updated: Utc::now(),
        }
    }
}

impl LeaderboardDocument {
    /// A fresh document holding the best `capacity` of `scores`.
    pub fn from_scores(scores: &[ScoreEntry], capacity: usize) -> Self {
        let leaderboard = Leaderboard::from_entries(scores.to_vec(), capacity).into_entries();
        LeaderboardDocument {
            leaderboard,
            version: default_version(),
            last_updated: Utc::now(),
        }
    }

    pub fn touch(&mut self) {
        self.last_updated = Utc::now();
    }
}
