//! Request effects emitted by the controller and their completions.
//!
//! Handlers never touch the network. They return [`Request`] values; the
//! host executes each one against a [`Backend`] (inline, or on a worker
//! thread) and hands the resulting [`Completion`] back to the controller.

use crate::api::client::Backend;
use crate::api::error::ApiError;
use crate::api::types::{
    Config, ConfigUpdate, MessageResponse, Presence, Stats, StatusRequest, StopResponse, ToggleId,
};

/// A request the controller wants performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// `GET /api/config`, stamped with the generation it was issued under.
    FetchConfig { generation: u64 },
    /// `GET /api/stats`
    FetchStats,
    /// `POST /api/toggle/*`
    Toggle(ToggleId),
    /// `POST /api/status`
    SetStatus(StatusRequest),
    /// `POST /api/autopressure/stop`
    StopAutoPressure { generation: u64 },
    /// `PUT /api/config`
    SaveSettings { generation: u64, update: ConfigUpdate },
}

/// The outcome of a [`Request`], carrying whatever the controller needs to
/// settle it.
#[derive(Debug, Clone)]
pub enum Completion {
    Config {
        generation: u64,
        result: Result<Config, ApiError>,
    },
    Stats(Result<Stats, ApiError>),
    Toggle {
        id: ToggleId,
        result: Result<MessageResponse, ApiError>,
    },
    Status {
        presence: Presence,
        result: Result<MessageResponse, ApiError>,
    },
    AutoPressure {
        generation: u64,
        result: Result<StopResponse, ApiError>,
    },
    Save {
        generation: u64,
        result: Result<Config, ApiError>,
    },
}

impl Request {
    /// Perform the request. Blocks until the backend answers or fails.
    pub fn execute<B: Backend + ?Sized>(&self, backend: &B) -> Completion {
        match self {
            Self::FetchConfig { generation } => Completion::Config {
                generation: *generation,
                result: backend.fetch_config(),
            },
            Self::FetchStats => Completion::Stats(backend.fetch_stats()),
            Self::Toggle(id) => Completion::Toggle {
                id: *id,
                result: backend.toggle(*id),
            },
            Self::SetStatus(body) => Completion::Status {
                presence: body.status,
                result: backend.set_status(body),
            },
            Self::StopAutoPressure { generation } => Completion::AutoPressure {
                generation: *generation,
                result: backend.stop_auto_pressure(),
            },
            Self::SaveSettings { generation, update } => Completion::Save {
                generation: *generation,
                result: backend.update_config(update),
            },
        }
    }

    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::FetchConfig { .. } => "fetch_config",
            Self::FetchStats => "fetch_stats",
            Self::Toggle(_) => "toggle",
            Self::SetStatus(_) => "set_status",
            Self::StopAutoPressure { .. } => "stop_auto_pressure",
            Self::SaveSettings { .. } => "save_settings",
        }
    }
}
