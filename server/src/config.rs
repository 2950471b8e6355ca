use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_CACHE_FILE: &str = ".scores-cache.json";
pub const DEFAULT_DB_FILE: &str = "db.json";
pub const DEFAULT_GITHUB_OWNER: &str = "frijolito2024";
pub const DEFAULT_GITHUB_REPO: &str = "frijolito-snake";
pub const DEFAULT_GITHUB_PATH: &str = "db.json";
pub const DEFAULT_GITHUB_API: &str = "https://api.github.com";

/// Where and how the proxy mirrors its scores.
#[derive(Debug, Clone)]
pub struct MirrorConfig {
    pub token: String,
    pub owner: String,
    pub repo: String,
    pub path: String,
    pub api_base: String,
}

#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub bind_addr: String,
    pub cache_file: PathBuf,
    pub mirror: MirrorConfig,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: String,
    pub db_file: PathBuf,
}

impl ProxyConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Fails when no GitHub token is configured.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let token = lookup("GITHUB_TOKEN")
            .filter(|token| !token.trim().is_empty())
            .context(
                "GITHUB_TOKEN not found. Put GITHUB_TOKEN=your_token in a .env file or export it",
            )?;

        Ok(ProxyConfig {
            bind_addr: var("PABLO_BIND_ADDR", DEFAULT_BIND_ADDR),
            cache_file: PathBuf::from(var("PABLO_CACHE_FILE", DEFAULT_CACHE_FILE)),
            mirror: MirrorConfig {
                token,
                owner: var("PABLO_GITHUB_OWNER", DEFAULT_GITHUB_OWNER),
                repo: var("PABLO_GITHUB_REPO", DEFAULT_GITHUB_REPO),
                path: var("PABLO_GITHUB_PATH", DEFAULT_GITHUB_PATH),
                api_base: var("PABLO_GITHUB_API", DEFAULT_GITHUB_API),
            },
        })
    }
}

impl ApiConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        ApiConfig {
            bind_addr: lookup("PABLO_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            db_file: PathBuf::from(
                lookup("PABLO_DB_FILE").unwrap_or_else(|| DEFAULT_DB_FILE.to_string()),
            ),
        }
    }
}
