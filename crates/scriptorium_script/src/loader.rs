//! [`ScriptLoader`]: shared configuration for building scripts.

use core::fmt;
use std::sync::Arc;

use scriptorium_hooks::HooksAPI;

use crate::basic::{self, BasicScript};
use crate::fetch::ScriptFetcher;
use crate::loadable::Loadable;
use crate::script::{self, Script};
use crate::validate::is_valid_src;

/// Factory holding the collaborators every script needs.
///
/// By default each script gets its own hooks registry and the default
/// namespace of its type (`"BasicScript"` or `"Script"`).
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use async_trait::async_trait;
/// use scriptorium_hooks::HooksAPI;
/// use scriptorium_script::{FetchError, Loadable, ScriptFetcher, ScriptLoader};
///
/// struct AlwaysOk;
///
/// #[async_trait]
/// impl ScriptFetcher for AlwaysOk {
///     async fn fetch(&self, _src: &str) -> Result<(), FetchError> {
///         Ok(())
///     }
/// }
///
/// let hooks = Arc::new(HooksAPI::new());
/// let loader = ScriptLoader::new(Arc::new(AlwaysOk))
///     .with_hooks(Arc::clone(&hooks))
///     .with_namespace("Widgets");
///
/// let script = loader.script("//cdn.example/widget.js");
/// assert_eq!(script.namespace(), "Widgets");
/// assert_eq!(script.src(), "//cdn.example/widget.js");
/// ```
#[derive(Clone)]
pub struct ScriptLoader {
    fetcher: Arc<dyn ScriptFetcher>,
    hooks: Option<Arc<HooksAPI>>,
    namespace: Option<String>,
}

impl ScriptLoader {
    /// Creates a loader using `fetcher` for every script it builds.
    #[must_use]
    pub fn new(fetcher: Arc<dyn ScriptFetcher>) -> Self {
        Self {
            fetcher,
            hooks: None,
            namespace: None,
        }
    }

    /// Shares one hooks registry between every script built from now on.
    #[must_use]
    pub fn with_hooks(mut self, hooks: Arc<HooksAPI>) -> Self {
        self.hooks = Some(hooks);
        self
    }

    /// Overrides the namespace used in diagnostics.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// The fetcher handed to every script.
    #[must_use]
    pub fn fetcher(&self) -> &Arc<dyn ScriptFetcher> {
        &self.fetcher
    }

    /// The shared hooks registry, if one was configured.
    #[must_use]
    pub fn hooks(&self) -> Option<&Arc<HooksAPI>> {
        self.hooks.as_ref()
    }

    /// Builds a basic script with `src`, unvalidated.
    #[must_use]
    pub fn basic_script(&self, src: impl Into<String>) -> BasicScript {
        let script = self.empty_basic_script();
        script.set_src(src);
        script
    }

    /// Builds a script with `src`, unvalidated.
    #[must_use]
    pub fn script(&self, src: impl Into<String>) -> Script {
        let script = self.empty_script();
        script.set_src(src);
        script
    }

    /// Builds a basic script, keeping `candidate` only if it is a valid
    /// source.
    #[must_use]
    pub fn basic_script_from(&self, candidate: &str) -> BasicScript {
        let script = self.empty_basic_script();
        if is_valid_src(candidate) {
            script.set_src(candidate);
        }
        script
    }

    /// Builds a script, keeping `candidate` only if it is a valid source.
    #[must_use]
    pub fn script_from(&self, candidate: &str) -> Script {
        let script = self.empty_script();
        if is_valid_src(candidate) {
            script.set_src(candidate);
        }
        script
    }

    fn empty_basic_script(&self) -> BasicScript {
        BasicScript::build(
            Arc::clone(&self.fetcher),
            self.hooks_for_script(),
            self.namespace_or(basic::DEFAULT_NAMESPACE),
            None,
        )
    }

    fn empty_script(&self) -> Script {
        Script::build(
            Arc::clone(&self.fetcher),
            self.hooks_for_script(),
            self.namespace_or(script::DEFAULT_NAMESPACE),
        )
    }

    fn hooks_for_script(&self) -> Arc<HooksAPI> {
        self.hooks
            .as_ref()
            .map_or_else(|| Arc::new(HooksAPI::new()), Arc::clone)
    }

    fn namespace_or(&self, default: &str) -> String {
        self.namespace.as_deref().unwrap_or(default).to_string()
    }
}

impl fmt::Debug for ScriptLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptLoader")
            .field("shared_hooks", &self.hooks.is_some())
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}
