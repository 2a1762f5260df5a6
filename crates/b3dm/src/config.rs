//! Walker configuration.

use std::path::PathBuf;

use crate::sink::OutputMode;

/// Environment variable holding the bearer token for remote tilesets.
pub const ACCESS_TOKEN_VAR: &str = "B3DM_ACCESS_TOKEN";

/// Environment variable overriding [`WalkerConfig::concurrency`].
pub const CONCURRENCY_VAR: &str = "B3DM_CONCURRENCY";

/// Settings for one tileset walk.
#[derive(Debug, Clone)]
pub struct WalkerConfig {
    /// Maximum number of tiles fetched and decoded at once.
    pub concurrency: usize,
    /// Decode b3dm payloads. When off, payloads are only fetched.
    pub decode: bool,
    /// Root directory for sinks that write files.
    pub output_dir: PathBuf,
    pub output_mode: OutputMode,
    /// Bearer token sent with remote requests.
    pub access_token: Option<String>,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            concurrency: 8,
            decode: true,
            output_dir: PathBuf::from("output"),
            output_mode: OutputMode::Keep,
            access_token: None,
        }
    }
}

impl WalkerConfig {
    /// Defaults overridden by [`ACCESS_TOKEN_VAR`] and [`CONCURRENCY_VAR`].
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_overrides(|name| std::env::var(name).ok())
    }

    fn with_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(token) = var(ACCESS_TOKEN_VAR).filter(|t| !t.is_empty()) {
            self.access_token = Some(token);
        }
        match var(CONCURRENCY_VAR).map(|v| v.parse::<usize>()) {
            Some(Ok(n)) if n > 0 => self.concurrency = n,
            Some(_) => tracing::warn!("Ignoring invalid {CONCURRENCY_VAR}"),
            None => {}
        }
        self
    }
}
