//! Shared test utilities for `scriptorium_script` integration tests.
//!
//! Provides a recording, gateable fetcher and small async helpers. Import via
//! `mod test_utils;` in test files.

#![allow(
    dead_code,
    missing_docs,
    reason = "shared test utilities, not all items used in every test binary"
)]

use async_trait::async_trait;
use scriptorium_hooks::{HooksAPI, LifecycleEvent};
use scriptorium_script::{FetchError, ScriptFetcher, ScriptLoader};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

pub const GOOD_SRC: &str = "https://good.example/a.js";
pub const BAD_SRC: &str = "https://bad.example/missing.js";

// ═══════════════════════════════════════════════════════════════════════════════
// MOCK FETCHER
// ═══════════════════════════════════════════════════════════════════════════════

/// Fetcher that records every call and can be told to fail or to hold a
/// source until released.
#[derive(Default)]
pub struct MockFetcher {
    started: Mutex<Vec<String>>,
    finished: Mutex<Vec<String>>,
    failing: Mutex<HashSet<String>>,
    gates: Mutex<HashMap<String, Arc<Semaphore>>>,
}

impl MockFetcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Makes fetches of `src` fail with `"Failed loading"`.
    pub fn fail(&self, src: &str) {
        self.failing.lock().unwrap().insert(src.to_string());
    }

    /// Makes fetches of `src` succeed again.
    pub fn recover(&self, src: &str) {
        self.failing.lock().unwrap().remove(src);
    }

    /// Holds fetches of `src` until [`release`](Self::release) is called.
    pub fn hold(&self, src: &str) {
        self.gates
            .lock()
            .unwrap()
            .insert(src.to_string(), Arc::new(Semaphore::new(0)));
    }

    /// Lets one held fetch of `src` settle.
    pub fn release(&self, src: &str) {
        if let Some(gate) = self.gates.lock().unwrap().get(src) {
            gate.add_permits(1);
        }
    }

    /// Sources in the order their fetch started.
    pub fn started(&self) -> Vec<String> {
        self.started.lock().unwrap().clone()
    }

    /// Sources in the order their fetch settled.
    pub fn finished(&self) -> Vec<String> {
        self.finished.lock().unwrap().clone()
    }

    pub fn has_started(&self, src: &str) -> bool {
        self.started.lock().unwrap().iter().any(|s| s == src)
    }

    pub fn fetch_count(&self, src: &str) -> usize {
        self.started.lock().unwrap().iter().filter(|s| *s == src).count()
    }

    pub fn total_fetches(&self) -> usize {
        self.started.lock().unwrap().len()
    }
}

#[async_trait]
impl ScriptFetcher for MockFetcher {
    async fn fetch(&self, src: &str) -> Result<(), FetchError> {
        self.started.lock().unwrap().push(src.to_string());

        let gate = self.gates.lock().unwrap().get(src).cloned();
        if let Some(gate) = gate {
            let permit = gate.acquire().await.map_err(|_| FetchError::new("gate closed"))?;
            permit.forget();
        }

        self.finished.lock().unwrap().push(src.to_string());
        if self.failing.lock().unwrap().contains(src) {
            return Err(FetchError::new("Failed loading"));
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// LOADER & HOOK HELPERS
// ═══════════════════════════════════════════════════════════════════════════════

pub fn loader(fetcher: &Arc<MockFetcher>) -> ScriptLoader {
    ScriptLoader::new(Arc::clone(fetcher) as Arc<dyn ScriptFetcher>)
}

/// Records every lifecycle event delivered to `hooks`, rendered with
/// `Display`.
pub fn record_events(hooks: &HooksAPI) -> Arc<Mutex<Vec<String>>> {
    use scriptorium_hooks::schedule::{
        OnDisabled, OnEnabled, OnErrored, OnExecuted, OnInitialized, OnLoaded, OnLoading,
    };

    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    hooks
        .register_observer::<
            (OnEnabled, OnDisabled, OnLoading, OnLoaded, OnErrored, OnExecuted, OnInitialized),
            _,
        >("recorder", move |event: &LifecycleEvent| {
            sink.lock().unwrap().push(event.to_string());
        })
        .unwrap();
    log
}

// ═══════════════════════════════════════════════════════════════════════════════
// ASYNC HELPERS
// ═══════════════════════════════════════════════════════════════════════════════

/// Yields to the runtime until `condition` holds.
///
/// Panics after a bounded number of yields so a broken ordering fails fast
/// instead of hanging.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..1_000 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}

/// Yields to the runtime a fixed number of times.
pub async fn settle() {
    for _ in 0..50 {
        tokio::task::yield_now().await;
    }
}
