use std::rc::Rc;

use common::{HttpTransport, ScoreEntry, SubmissionSink, SyncGateway};
use wasm_bindgen_futures::spawn_local;

/// Submits each recorded score on the browser's event loop.
pub struct SpawnLocalSink {
    gateway: Rc<SyncGateway<HttpTransport>>,
}

impl SpawnLocalSink {
    pub fn new(gateway: Rc<SyncGateway<HttpTransport>>) -> Self {
        SpawnLocalSink { gateway }
    }
}

impl SubmissionSink for SpawnLocalSink {
    fn forward(&self, entry: &ScoreEntry) {
        let gateway = self.gateway.clone();
        let entry = entry.clone();
        spawn_local(async move {
            gateway.submit(&entry).await;
        });
    }
}
