//! A fetcher that simulates network latency and failures.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use scriptorium_script::{FetchError, ScriptElement, ScriptFetcher};

/// Pretends to fetch and execute scripts.
///
/// Every fetch sleeps for the configured latency. Sources registered with
/// [`fail_on`](Self::fail_on) fail the way a 404 would.
#[derive(Debug, Default)]
pub struct SimulatedFetcher {
    latency: Duration,
    failing: Mutex<HashSet<String>>,
    executed: Mutex<Vec<String>>,
}

impl SimulatedFetcher {
    /// Creates a fetcher with the given per-fetch latency.
    #[must_use]
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    /// Makes fetches of `src` fail.
    #[must_use]
    pub fn fail_on(self, src: impl Into<String>) -> Self {
        self.failing.lock().insert(src.into());
        self
    }

    /// Sources in the order they finished executing.
    #[must_use]
    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().clone()
    }
}

#[async_trait]
impl ScriptFetcher for SimulatedFetcher {
    async fn fetch(&self, src: &str) -> Result<(), FetchError> {
        tokio::time::sleep(self.latency).await;

        if self.failing.lock().contains(src) {
            tracing::debug!(%src, "simulated fetch failed");
            return Err(FetchError::new(format!("404 Not Found: {src}")));
        }

        self.executed.lock().push(src.to_string());
        tracing::debug!(%src, "simulated fetch executed");
        Ok(())
    }

    async fn fetch_element(&self, element: &ScriptElement) -> Result<(), FetchError> {
        tracing::trace!(
            src = element.src(),
            script_type = element.script_type(),
            is_async = element.is_async(),
            "attaching script element"
        );
        self.fetch(element.src()).await
    }
}
