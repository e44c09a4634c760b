/// Wire types for the bot's dashboard API.
///
/// Every struct here maps one-to-one onto a JSON body exchanged with the
/// backend. Server-owned documents (`Config`, `Stats`) use `serde(default)`
/// so a partially populated response still decodes; absent strings become
/// empty and absent counters become zero.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Server-owned documents
// ---------------------------------------------------------------------------

/// Bot configuration as reported by `GET /api/config` and returned by
/// `PUT /api/config`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub prefix: String,
    pub auto_response_enabled: bool,
    pub auto_response_phrase: String,
    pub auto_emoji_enabled: bool,
    pub auto_emoji: String,
    /// Raw presence string. Use [`Config::presence`] for the typed value.
    pub current_status: String,
    pub auto_pressure_active: bool,
}

impl Config {
    /// The presence this snapshot reports, or `None` if the server sent a
    /// value outside the four known states.
    pub fn presence(&self) -> Option<Presence> {
        Presence::from_wire(&self.current_status)
    }

    /// Current value of a boolean toggle.
    pub fn toggle(&self, id: ToggleId) -> bool {
        match id {
            ToggleId::AutoResponder => self.auto_response_enabled,
            ToggleId::AutoEmoji => self.auto_emoji_enabled,
        }
    }
}

/// Runtime statistics from `GET /api/stats`. Read-only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    pub uptime_days: u64,
    pub uptime_hours: u64,
    pub uptime_minutes: u64,
    pub commands_handled: u64,
    pub messages_logged: u64,
    pub memory_usage_mb: f64,
}

// ---------------------------------------------------------------------------
// Presence
// ---------------------------------------------------------------------------

/// Presence status of the bot account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    Online,
    Idle,
    Dnd,
    Invisible,
}

impl Presence {
    /// All presence values in display order.
    pub const ALL: [Presence; 4] = [
        Presence::Online,
        Presence::Idle,
        Presence::Dnd,
        Presence::Invisible,
    ];

    /// The canonical wire string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Idle => "idle",
            Self::Dnd => "dnd",
            Self::Invisible => "invisible",
        }
    }

    /// Strict match against the canonical wire strings only.
    pub fn from_wire(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == value)
    }
}

impl fmt::Display for Presence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lenient parse for operator input. Accepts the aliases the server itself
/// understands (`do_not_disturb`, `offline`).
impl FromStr for Presence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "online" => Ok(Self::Online),
            "idle" => Ok(Self::Idle),
            "dnd" | "do_not_disturb" => Ok(Self::Dnd),
            "invisible" | "offline" => Ok(Self::Invisible),
            other => Err(format!(
                "unknown status '{other}' (expected online, idle, dnd or invisible)"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Toggles
// ---------------------------------------------------------------------------

/// Server-side boolean features flipped through `POST /api/toggle/*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToggleId {
    AutoResponder,
    AutoEmoji,
}

impl ToggleId {
    /// Last path segment of the toggle endpoint.
    pub fn endpoint(self) -> &'static str {
        match self {
            Self::AutoResponder => "autoresponder",
            Self::AutoEmoji => "autoemoji",
        }
    }

    /// Human-readable name used in notifications.
    pub fn label(self) -> &'static str {
        match self {
            Self::AutoResponder => "auto responder",
            Self::AutoEmoji => "auto emoji",
        }
    }

    /// [`ToggleId::label`] with a leading capital, for row titles and
    /// sentence starts.
    pub fn title(self) -> &'static str {
        match self {
            Self::AutoResponder => "Auto responder",
            Self::AutoEmoji => "Auto emoji",
        }
    }
}

impl FromStr for ToggleId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "autoresponder" | "auto-responder" | "auto_responder" => Ok(Self::AutoResponder),
            "autoemoji" | "auto-emoji" | "auto_emoji" => Ok(Self::AutoEmoji),
            other => Err(format!(
                "unknown toggle '{other}' (expected autoresponder or autoemoji)"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Request / response bodies
// ---------------------------------------------------------------------------

/// Generic `{message}` acknowledgement. Toggle endpoints also report the
/// resulting state in `enabled`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

/// Body of `POST /api/status`. `custom_text` is omitted entirely when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRequest {
    pub status: Presence,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_text: Option<String>,
}

/// Body of the `POST /api/autopressure/stop` response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopResponse {
    #[serde(default)]
    pub stopped: bool,
    #[serde(default)]
    pub message: String,
}

/// Partial update sent with `PUT /api/config`. Only present keys are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_response_phrase: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_emoji: Option<String>,
}

impl ConfigUpdate {
    /// True when no field would be sent.
    pub fn is_empty(&self) -> bool {
        self.prefix.is_none() && self.auto_response_phrase.is_none() && self.auto_emoji.is_none()
    }
}

/// Optional `{message}` carried by error responses.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
