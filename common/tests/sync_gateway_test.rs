use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use common::{
    LeaderboardSource, LeaderboardTransport, ScoreEntry, ScoreSubmission, SubmitReceipt,
    SyncGateway,
};

/// Transport whose every call is scripted up front.
#[derive(Default)]
struct ScriptedTransport {
    service: Option<Vec<ScoreEntry>>,
    fallback: Option<Vec<ScoreEntry>>,
    accept: Option<SubmitReceipt>,
    submitted: Mutex<Vec<ScoreSubmission>>,
    fallback_calls: AtomicUsize,
}

#[async_trait]
impl LeaderboardTransport for ScriptedTransport {
    async fn submit(&self, submission: &ScoreSubmission) -> Result<SubmitReceipt> {
        self.submitted.lock().unwrap().push(submission.clone());
        self.accept.ok_or_else(|| anyhow!("connection refused"))
    }

    async fn fetch_service(&self) -> Result<Vec<ScoreEntry>> {
        self.service.clone().ok_or_else(|| anyhow!("service down"))
    }

    async fn fetch_fallback(&self) -> Result<Vec<ScoreEntry>> {
        self.fallback_calls.fetch_add(1, Ordering::SeqCst);
        self.fallback.clone().ok_or_else(|| anyhow!("fallback down"))
    }
}

#[tokio::test]
async fn test_service_answer_wins() {
    let gateway = SyncGateway::new(ScriptedTransport {
        service: Some(vec![ScoreEntry::new("ana", 120, 3)]),
        fallback: Some(vec![ScoreEntry::new("old", 1, 1)]),
        ..Default::default()
    });

    let remote = gateway.load_remote().await;
    assert_eq!(remote.source, LeaderboardSource::Service);
    assert_eq!(remote.entries.len(), 1);
    assert_eq!(remote.entries[0].name, "ana");
    assert_eq!(gateway.transport().fallback_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_fallback_used_when_service_fails() {
    let gateway = SyncGateway::new(ScriptedTransport {
        fallback: Some(vec![ScoreEntry::new("old", 1, 1), ScoreEntry::new("older", 2, 1)]),
        ..Default::default()
    });

    let remote = gateway.load_remote().await;
    assert_eq!(remote.source, LeaderboardSource::Fallback);
    assert_eq!(remote.entries.len(), 2);
}

#[tokio::test]
async fn test_local_only_when_everything_fails() {
    let gateway = SyncGateway::new(ScriptedTransport::default());

    let remote = gateway.load_remote().await;
    assert_eq!(remote.source, LeaderboardSource::LocalOnly);
    assert!(remote.entries.is_empty());
}

#[tokio::test]
async fn test_submit_failure_is_swallowed() {
    let gateway = SyncGateway::new(ScriptedTransport::default());

    let receipt = gateway.submit(&ScoreEntry::new("ana", 50, 2)).await;
    assert!(receipt.is_none());
    // The attempt was made exactly once
    assert_eq!(gateway.transport().submitted.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_submit_sends_name_score_level() {
    let gateway = SyncGateway::new(ScriptedTransport {
        accept: Some(SubmitReceipt { remote_synced: true }),
        ..Default::default()
    });

    let receipt = gateway.submit(&ScoreEntry::new("Pablo", 205, 4)).await;
    assert_eq!(receipt, Some(SubmitReceipt { remote_synced: true }));

    let submitted = gateway.transport().submitted.lock().unwrap();
    assert_eq!(
        submitted.as_slice(),
        &[ScoreSubmission {
            name: "Pablo".to_string(),
            score: 205,
            level: 4,
        }]
    );
}
