//! The [`ScriptFetcher`] trait for fetch-and-execute backends.

use async_trait::async_trait;

use crate::error::FetchError;

/// MIME type given to every script element.
pub const SCRIPT_TYPE: &str = "text/javascript";

/// Descriptor of the executable element a fetcher attaches for a script.
///
/// Always `text/javascript` and marked for asynchronous execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptElement {
    src: String,
}

impl ScriptElement {
    /// Creates an element descriptor for `src`.
    #[must_use]
    pub fn new(src: impl Into<String>) -> Self {
        Self { src: src.into() }
    }

    /// The source URL.
    #[must_use]
    pub fn src(&self) -> &str {
        &self.src
    }

    /// The element's MIME type.
    #[must_use]
    pub fn script_type(&self) -> &'static str {
        SCRIPT_TYPE
    }

    /// Whether the element executes asynchronously. Always `true`.
    #[must_use]
    pub fn is_async(&self) -> bool {
        true
    }
}

/// Trait implemented by backends that fetch and execute script URLs.
///
/// A fetch resolves once the environment confirms the script executed and
/// fails with a [`FetchError`] on a load or execution failure. Each call must
/// settle exactly once.
#[async_trait]
pub trait ScriptFetcher: Send + Sync + 'static {
    /// Fetches and executes the script at `src`.
    async fn fetch(&self, src: &str) -> Result<(), FetchError>;

    /// Fetches and executes a pre-built element.
    ///
    /// Scripts always call this entry point. The default delegates to
    /// [`fetch`](Self::fetch) with the element's source.
    async fn fetch_element(&self, element: &ScriptElement) -> Result<(), FetchError> {
        self.fetch(element.src()).await
    }
}
