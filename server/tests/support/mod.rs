pub mod test_server;

pub use test_server::{FakeMirror, TestServer, closed_addr, serve_router};

/// Macro to wrap test bodies with a timeout to prevent hanging tests
#[macro_export]
macro_rules! timeout_test {
    ($duration:expr, $body:expr) => {
        tokio::time::timeout($duration, $body)
            .await
            .map_err(|_| anyhow::anyhow!("Test timed out after {:?}", $duration))?
    };
}
