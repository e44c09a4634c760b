//! Typed access to the bot's dashboard REST API.
//!
//! - [`types`] — JSON bodies for config, stats and every mutation endpoint
//! - [`error`] — the failure taxonomy shared by all calls
//! - [`client`] — the [`Backend`] seam and its `ureq` implementation

pub mod client;
pub mod error;
pub mod types;

pub use client::{Backend, RemoteConfigClient};
pub use error::ApiError;
pub use types::{
    Config, ConfigUpdate, MessageResponse, Presence, Stats, StatusRequest, StopResponse, ToggleId,
};
