use std::str::FromStr;

use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::constants::REQUEST_TIMEOUT_MS;
use crate::leaderboard::{
    Leaderboard, LeaderboardDocument, RankedEntry, ScoreEntry, deserialize_entries,
};

// A remote copy of a local game is stamped by the service, not the client
const SAME_GAME_WINDOW_SECS: i64 = 60;

/// Body of a score submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSubmission {
    pub name: String,
    pub score: u32,
    pub level: u32,
}

impl From<&ScoreEntry> for ScoreSubmission {
    fn from(entry: &ScoreEntry) -> Self {
        ScoreSubmission {
            name: entry.name.clone(),
            score: entry.score,
            level: entry.level,
        }
    }
}

/// What a service answered to an accepted submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct SubmitReceipt {
    /// Whether the service also mirrored the scores remotely.
    #[serde(rename = "githubSync", default)]
    pub remote_synced: bool,
}

/// Which of the two leaderboard services the game talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    #[default]
    Proxy,
    Direct,
}

impl ServiceKind {
    fn submit_path(&self) -> &'static str {
        match self {
            ServiceKind::Proxy => "/api/save-score",
            ServiceKind::Direct => "/api/leaderboard",
        }
    }

    fn scores_path(&self) -> &'static str {
        match self {
            ServiceKind::Proxy => "/api/scores",
            ServiceKind::Direct => "/api/leaderboard",
        }
    }
}

impl FromStr for ServiceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "proxy" => Ok(ServiceKind::Proxy),
            "direct" | "api" => Ok(ServiceKind::Direct),
            other => Err(anyhow!("Unknown service kind: {}", other)),
        }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait LeaderboardTransport {
    async fn submit(&self, submission: &ScoreSubmission) -> Result<SubmitReceipt>;
    async fn fetch_service(&self) -> Result<Vec<ScoreEntry>>;
    async fn fetch_fallback(&self) -> Result<Vec<ScoreEntry>>;
}

/// Receives every locally recorded entry. Implementations hand the entry to
/// an async runtime and return immediately.
pub trait SubmissionSink {
    fn forward(&self, entry: &ScoreEntry);
}

impl<F: Fn(&ScoreEntry)> SubmissionSink for F {
    fn forward(&self, entry: &ScoreEntry) {
        self(entry)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LeaderboardSource {
    Service,
    Fallback,
    LocalOnly,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteLeaderboard {
    pub source: LeaderboardSource,
    pub entries: Vec<ScoreEntry>,
}

impl RemoteLeaderboard {
    pub fn local_only() -> Self {
        RemoteLeaderboard {
            source: LeaderboardSource::LocalOnly,
            entries: Vec::new(),
        }
    }
}

/// Best-effort bridge between the local leaderboard and whichever service is
/// reachable. Nothing is retried or queued.
#[derive(Debug, Clone)]
pub struct SyncGateway<T> {
    transport: T,
}

impl<T: LeaderboardTransport> SyncGateway<T> {
    pub fn new(transport: T) -> Self {
        SyncGateway { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Pushes one entry. Failures are logged and dropped.
    pub async fn submit(&self, entry: &ScoreEntry) -> Option<SubmitReceipt> {
        match self.transport.submit(&ScoreSubmission::from(entry)).await {
            Ok(receipt) => {
                if receipt.remote_synced {
                    info!("Score {} for {} saved and mirrored", entry.score, entry.name);
                } else {
                    info!("Score {} for {} saved (cached)", entry.score, entry.name);
                }
                Some(receipt)
            }
            Err(e) => {
                warn!("Leaderboard service unavailable, score saved locally only: {:#}", e);
                None
            }
        }
    }

    /// Service first, then the static fallback document, then nothing.
    pub async fn load_remote(&self) -> RemoteLeaderboard {
        match self.transport.fetch_service().await {
            Ok(entries) => {
                info!("Loaded {} scores from leaderboard service", entries.len());
                return RemoteLeaderboard {
                    source: LeaderboardSource::Service,
                    entries,
                };
            }
            Err(e) => info!("Leaderboard service not available, trying fallback: {:#}", e),
        }

        match self.transport.fetch_fallback().await {
            Ok(entries) => {
                info!("Loaded {} scores from fallback document", entries.len());
                RemoteLeaderboard {
                    source: LeaderboardSource::Fallback,
                    entries,
                }
            }
            Err(e) => {
                warn!("Could not load remote leaderboard: {:#}", e);
                RemoteLeaderboard::local_only()
            }
        }
    }
}

fn is_same_game(a: &ScoreEntry, b: &ScoreEntry) -> bool {
    a.name == b.name
        && a.score == b.score
        && a.level == b.level
        && (a.timestamp - b.timestamp).num_seconds().abs() <= SAME_GAME_WINDOW_SECS
}

/// Local entries plus any remote entries that are not copies of them,
/// sorted, capped and ranked for display.
pub fn compose_display(
    local: &[ScoreEntry],
    remote: &RemoteLeaderboard,
    capacity: usize,
) -> Vec<RankedEntry> {
    let mut merged = local.to_vec();
    for entry in &remote.entries {
        if !merged.iter().any(|existing| is_same_game(existing, entry)) {
            merged.push(entry.clone());
        }
    }
    Leaderboard::from_entries(merged, capacity).top_n(capacity)
}

#[derive(Deserialize)]
struct ScoresEnvelope {
    #[serde(default, alias = "leaderboard", deserialize_with = "deserialize_entries")]
    scores: Vec<ScoreEntry>,
}

/// HTTP transport shared by the browser and terminal front-ends.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    service_url: String,
    kind: ServiceKind,
    fallback_url: Option<String>,
}

impl HttpTransport {
    pub fn new(service_url: &str, kind: ServiceKind, fallback_url: Option<&str>) -> Result<Self> {
        let builder = reqwest::Client::builder();
        // The browser bounds requests itself
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(std::time::Duration::from_millis(REQUEST_TIMEOUT_MS));
        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(HttpTransport {
            client,
            service_url: service_url.trim_end_matches('/').to_string(),
            kind,
            fallback_url: fallback_url.map(str::to_string),
        })
    }

    pub fn kind(&self) -> ServiceKind {
        self.kind
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.service_url, path)
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl LeaderboardTransport for HttpTransport {
    async fn submit(&self, submission: &ScoreSubmission) -> Result<SubmitReceipt> {
        let url = self.endpoint(self.kind.submit_path());
        let response = self
            .client
            .post(&url)
            .json(submission)
            .send()
            .await
            .with_context(|| format!("Failed to reach {}", url))?;

        if !response.status().is_success() {
            bail!("{} returned {}", url, response.status());
        }

        // An unreadable body still means the score was accepted
        Ok(response.json::<SubmitReceipt>().await.unwrap_or_default())
    }

    async fn fetch_service(&self) -> Result<Vec<ScoreEntry>> {
        let url = self.endpoint(self.kind.scores_path());
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to reach {}", url))?;

        if !response.status().is_success() {
            bail!("{} returned {}", url, response.status());
        }

        let envelope: ScoresEnvelope = response
            .json()
            .await
            .context("Failed to parse leaderboard service response")?;
        Ok(envelope.scores)
    }

    async fn fetch_fallback(&self) -> Result<Vec<ScoreEntry>> {
        let url = self
            .fallback_url
            .as_deref()
            .context("No fallback leaderboard configured")?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to reach {}", url))?;

        if !response.status().is_success() {
            bail!("{} returned {}", url, response.status());
        }

        let document: LeaderboardDocument = response
            .json()
            .await
            .context("Failed to parse fallback leaderboard document")?;
        Ok(document.leaderboard)
    }
}
