use std::sync::Arc;

use common::{HttpTransport, RemoteLeaderboard, ScoreEntry, SubmissionSink, SyncGateway};
use tokio::runtime::Handle;
use tokio::sync::oneshot;

pub type Gateway = Arc<SyncGateway<HttpTransport>>;

/// Submits each recorded score on the tokio runtime without blocking the UI.
pub struct RuntimeSink {
    gateway: Gateway,
    handle: Handle,
}

impl RuntimeSink {
    pub fn new(gateway: Gateway, handle: Handle) -> Self {
        Self { gateway, handle }
    }
}

impl SubmissionSink for RuntimeSink {
    fn forward(&self, entry: &ScoreEntry) {
        let gateway = self.gateway.clone();
        let entry = entry.clone();
        self.handle.spawn(async move {
            gateway.submit(&entry).await;
        });
    }
}

/// Starts loading the remote leaderboard; the result arrives on the
/// returned receiver.
pub fn spawn_remote_load(gateway: Gateway, handle: &Handle) -> oneshot::Receiver<RemoteLeaderboard> {
    let (tx, rx) = oneshot::channel();
    handle.spawn(async move {
        let remote = gateway.load_remote().await;
        let _ = tx.send(remote);
    });
    rx
}
