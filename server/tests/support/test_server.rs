#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Result, bail};
use async_trait::async_trait;
use axum::Router;
use common::ScoreEntry;
use server::api::direct::DirectState;
use server::api::proxy::ProxyState;
use server::api::{direct_router, proxy_router};
use server::cache::JsonFile;
use server::mirror::RemoteMirror;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Mirror that remembers what it was asked to publish.
#[derive(Default)]
pub struct FakeMirror {
    pub fail: bool,
    pub published: Mutex<Vec<Vec<ScoreEntry>>>,
}

impl FakeMirror {
    pub fn failing() -> Self {
        FakeMirror {
            fail: true,
            ..Default::default()
        }
    }

    pub fn publish_count(&self) -> usize {
        self.published.lock().unwrap().len()
    }
}

#[async_trait]
impl RemoteMirror for FakeMirror {
    async fn publish(&self, scores: &[ScoreEntry]) -> Result<()> {
        self.published.lock().unwrap().push(scores.to_vec());
        if self.fail {
            bail!("remote unavailable");
        }
        Ok(())
    }
}

/// A service bound to an ephemeral port, backed by a temp directory.
pub struct TestServer {
    pub addr: SocketAddr,
    pub file: PathBuf,
    handle: JoinHandle<()>,
    _dir: TempDir,
}

impl TestServer {
    pub async fn proxy(mirror: Arc<FakeMirror>) -> Result<Self> {
        Self::proxy_with(mirror).await
    }

    /// Proxy backed by any mirror, e.g. a real `GithubMirror` aimed at a stub.
    pub async fn proxy_with(mirror: Arc<dyn RemoteMirror>) -> Result<Self> {
        let dir = tempfile::tempdir()?;
        let file = dir.path().join(".scores-cache.json");
        let router = proxy_router(ProxyState {
            cache: JsonFile::new(&file),
            mirror,
        });
        Self::spawn(router, dir, file).await
    }

    pub async fn direct() -> Result<Self> {
        let dir = tempfile::tempdir()?;
        let file = dir.path().join("db.json");
        let router = direct_router(DirectState {
            db: JsonFile::new(&file),
        });
        Self::spawn(router, dir, file).await
    }

    async fn spawn(router: Router, dir: TempDir, file: PathBuf) -> Result<Self> {
        let (addr, handle) = serve_router(router).await?;
        Ok(TestServer {
            addr,
            file,
            handle,
            _dir: dir,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn read_file(&self) -> Option<String> {
        std::fs::read_to_string(&self.file).ok()
    }

    /// Seeds the backing file before any request touches it.
    pub fn write_file(&self, contents: &str) -> Result<()> {
        std::fs::write(&self.file, contents)?;
        Ok(())
    }
}

/// Serves `router` on an ephemeral local port.
pub async fn serve_router(router: Router) -> Result<(SocketAddr, JoinHandle<()>)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok((addr, handle))
}

/// An address nothing listens on.
pub async fn closed_addr() -> Result<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(addr)
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
