//! Pipeline configuration.
//!
//! The harvest pipeline never reads ambient process state. Binaries build a
//! [`HarvestConfig`] once (usually via [`HarvestConfig::from_env`]) and pass
//! it down as an immutable value.

use std::time::Duration;

/// Environment variable holding the Cloudflare Radar API credential.
pub const RADAR_TOKEN_ENV: &str = "RADAR_API_TOKEN";
/// Environment variable forcing the pure-Rust digest provider when set to a
/// truthy value (`1`, `true`, `yes`, `on`).
pub const FORCE_SOFT_DIGEST_ENV: &str = "WEBENTROPY_FORCE_SOFT_DIGEST";

/// Configuration for one harvest invocation.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    /// Bearer credential for the Radar source group. When absent, every
    /// Radar source fails immediately without touching the network.
    pub radar_token: Option<String>,

    /// Skip the accelerated digest provider and use the bundled pure-Rust
    /// implementation directly.
    pub force_soft_digest: bool,

    /// Per-source network budget. A source that has not produced a terminal
    /// outcome within this window is recorded as timed out.
    /// Default: 5000 ms
    pub source_timeout: Duration,

    /// Length of the local CSPRNG sample in bytes.
    /// Default: 64
    pub local_sample_bytes: usize,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            radar_token: None,
            force_soft_digest: false,
            source_timeout: Duration::from_millis(5000),
            local_sample_bytes: 64,
        }
    }
}

impl HarvestConfig {
    /// Build a config from the process environment.
    ///
    /// This is the only place the crate touches environment variables, and
    /// it is only ever called from binary entry points.
    pub fn from_env() -> Self {
        let radar_token = std::env::var(RADAR_TOKEN_ENV)
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        let force_soft_digest = std::env::var(FORCE_SOFT_DIGEST_ENV)
            .map(|v| is_truthy(&v))
            .unwrap_or(false);

        Self {
            radar_token,
            force_soft_digest,
            ..Self::default()
        }
    }
}

fn is_truthy(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
