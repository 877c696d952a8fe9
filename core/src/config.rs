//! Client configuration.

use std::env;
use std::fmt;
use std::sync::Arc;

use tokio::runtime::Handle;
use tracing::Dispatch;

use crate::writer::{EntityHooks, NoopHooks};

/// Environment variable enabling per-header diagnostic lines.
pub const VERBOSE_DIAGNOSTICS_ENV: &str = "COURIER_VERBOSE_DIAGNOSTICS";

/// Settings applied to one `Client` for its whole lifetime.
#[derive(Clone)]
pub struct ClientConfig {
    /// Emit one diagnostic line per request header.
    pub verbose_diagnostics: bool,
    /// Sink for this client's diagnostic events.
    pub diagnostics: Option<Dispatch>,
    /// Runtime whose blocking pool runs request workers. Defaults to the
    /// runtime current when the client is built.
    pub runtime: Option<Handle>,
    /// Callbacks fired after a request entity is sent or fails to send.
    pub hooks: Arc<dyn EntityHooks>,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults, with `verbose_diagnostics` taken from
    /// `COURIER_VERBOSE_DIAGNOSTICS` when set.
    pub fn from_env() -> Self {
        let verbose = env::var(VERBOSE_DIAGNOSTICS_ENV)
            .map(|raw| parse_flag(&raw))
            .unwrap_or(false);
        Self::default().with_verbose_diagnostics(verbose)
    }

    pub fn with_verbose_diagnostics(mut self, verbose: bool) -> Self {
        self.verbose_diagnostics = verbose;
        self
    }

    pub fn with_diagnostics(mut self, dispatch: Dispatch) -> Self {
        self.diagnostics = Some(dispatch);
        self
    }

    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn with_hooks(mut self, hooks: impl EntityHooks + 'static) -> Self {
        self.hooks = Arc::new(hooks);
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            verbose_diagnostics: false,
            diagnostics: None,
            runtime: None,
            hooks: Arc::new(NoopHooks),
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("verbose_diagnostics", &self.verbose_diagnostics)
            .field("diagnostics", &self.diagnostics.is_some())
            .field("runtime", &self.runtime.is_some())
            .finish_non_exhaustive()
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
