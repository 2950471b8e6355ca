use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use common::{LeaderboardDocument, MIRROR_LEADERBOARD_CAPACITY, ScoreEntry};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::MirrorConfig;

/// A remote copy of the proxy's score cache.
#[async_trait]
pub trait RemoteMirror: Send + Sync {
    /// Replaces the remote document with one built from `scores`.
    async fn publish(&self, scores: &[ScoreEntry]) -> Result<()>;
}

/// The document a mirror receives: best scores first, capped.
pub fn build_mirror_document(scores: &[ScoreEntry]) -> LeaderboardDocument {
    LeaderboardDocument::from_scores(scores, MIRROR_LEADERBOARD_CAPACITY)
}

pub fn commit_message(total: usize) -> String {
    format!("🌭 Scores updated: {} total", total)
}

#[derive(Debug, Deserialize)]
struct RemoteFile {
    sha: String,
}

#[derive(Debug, Serialize)]
struct ContentUpdate<'a> {
    message: String,
    content: String,
    sha: &'a str,
}

/// Mirrors scores into a file of a GitHub repository via the contents API.
#[derive(Debug, Clone)]
pub struct GithubMirror {
    client: reqwest::Client,
    config: MirrorConfig,
}

impl GithubMirror {
    pub fn new(config: MirrorConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("pablo-leaderboard/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(GithubMirror { client, config })
    }

    fn contents_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.config.api_base.trim_end_matches('/'),
            self.config.owner,
            self.config.repo,
            self.config.path
        )
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("Authorization", format!("token {}", self.config.token))
            .header("Accept", "application/vnd.github.v3+json")
    }

    async fn current_sha(&self, url: &str) -> Result<String> {
        let response = self
            .authorized(self.client.get(url))
            .send()
            .await
            .context("Failed to fetch remote document")?;
        if !response.status().is_success() {
            bail!("Fetching remote document returned {}", response.status());
        }
        let file: RemoteFile = response
            .json()
            .await
            .context("Failed to parse remote document metadata")?;
        Ok(file.sha)
    }
}

#[async_trait]
impl RemoteMirror for GithubMirror {
    async fn publish(&self, scores: &[ScoreEntry]) -> Result<()> {
        let url = self.contents_url();
        let sha = self.current_sha(&url).await?;

        let document = build_mirror_document(scores);
        let json = serde_json::to_vec_pretty(&document).context("Failed to serialize document")?;
        let update = ContentUpdate {
            message: commit_message(scores.len()),
            content: STANDARD.encode(json),
            sha: &sha,
        };

        let response = self
            .authorized(self.client.put(&url))
            .json(&update)
            .send()
            .await
            .context("Failed to update remote document")?;
        if !response.status().is_success() {
            bail!("Updating remote document returned {}", response.status());
        }

        info!("Remote mirror updated: {} scores", scores.len());
        Ok(())
    }
}
