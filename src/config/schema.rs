/// Configuration schema and defaults for botdash.
///
/// Sections: `[server]`, `[poll]`, `[notifications]`, `[logging]` and
/// `[render]`. Every field has a built-in default, so a config file only
/// needs the keys it wants to change.
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Smallest poll period accepted. Anything lower is raised to this.
pub const MIN_POLL_INTERVAL_MS: u64 = 250;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level botdash configuration.
///
/// Maps to `~/.botdash/config.toml` and `.botdash.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashConfig {
    pub server: ServerConfig,
    pub poll: PollConfig,
    pub notifications: NotificationConfig,
    pub logging: LoggingConfig,
    pub render: RenderConfig,
}

// ---------------------------------------------------------------------------
// [server]
// ---------------------------------------------------------------------------

/// Where the bot's HTTP API lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Origin of the bot API, without the `/api` prefix.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_ms: 10_000,
        }
    }
}

impl ServerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

// ---------------------------------------------------------------------------
// [poll]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    pub interval_ms: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self { interval_ms: 5_000 }
    }
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(MIN_POLL_INTERVAL_MS))
    }
}

// ---------------------------------------------------------------------------
// [notifications]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// How long a notification stays visible.
    pub ttl_ms: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            ttl_ms: crate::notify::DEFAULT_TTL_MS,
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

/// Diagnostic log settings. Logs go to stderr.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// An `EnvFilter` directive such as `warn` or `botdash=debug`.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// [render]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub color: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { color: true }
    }
}

// ---------------------------------------------------------------------------
// Annotated defaults
// ---------------------------------------------------------------------------

impl DashConfig {
    /// The default config file written by `botdash config init`.
    pub fn default_toml() -> String {
        r#"# botdash configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (BOTDASH_*)
#   2. Project config (.botdash.toml in current directory)
#   3. User global config (~/.botdash/config.toml)
#   4. Built-in defaults

[server]
base_url = "http://localhost:8080"   # BOTDASH_URL
timeout_ms = 10000                   # BOTDASH_TIMEOUT_MS

[poll]
interval_ms = 5000                   # BOTDASH_POLL_INTERVAL_MS

[notifications]
ttl_ms = 5000                        # BOTDASH_NOTIFICATION_TTL_MS

[logging]
level = "warn"                       # overridden by BOTDASH_LOG

[render]
color = true                         # BOTDASH_COLOR
"#
        .to_string()
    }
}
