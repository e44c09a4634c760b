//! Failure taxonomy for dashboard API calls.

use thiserror::Error;

/// Why a request to the backend did not produce a usable response.
///
/// `Transport` means no HTTP response arrived at all. `Status` is any
/// non-2xx answer and keeps whatever message the server supplied. `Decode`
/// covers a 2xx answer whose body did not match the expected shape; it is
/// treated as a failure of the operation like the other two.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("request to {endpoint} failed: {details}")]
    Transport { endpoint: String, details: String },

    #[error("{endpoint} returned HTTP {code}{}", message_suffix(.message))]
    Status {
        endpoint: String,
        code: u16,
        message: Option<String>,
    },

    #[error("failed to decode response from {endpoint}: {details}")]
    Decode { endpoint: String, details: String },
}

fn message_suffix(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {m}"))
        .unwrap_or_default()
}

impl ApiError {
    /// Message the server attached to a non-2xx response, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status {
                message: Some(m), ..
            } if !m.trim().is_empty() => Some(m.as_str()),
            _ => None,
        }
    }

    /// The server's message verbatim, or `fallback` when there is none.
    pub fn user_message(&self, fallback: &str) -> String {
        self.server_message()
            .map(str::to_string)
            .unwrap_or_else(|| fallback.to_string())
    }
}
