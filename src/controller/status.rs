//! Presence selection.
//!
//! Unlike toggles, nothing is applied before the server confirms: the
//! highlighted button only moves on success, so a failure has nothing to
//! undo. One request may be outstanding at a time.

use crate::api::error::ApiError;
use crate::api::types::{MessageResponse, Presence, StatusRequest};
use crate::notify::NotificationBus;

use super::effects::Request;
use super::view::DashboardView;

const FAILED_MESSAGE: &str = "Failed to update status";

#[derive(Debug, Default)]
pub struct StatusController {
    in_flight: Option<Presence>,
}

impl StatusController {
    /// Whether a status request is awaiting its response.
    pub fn is_pending(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Build the request for `presence`. `custom_text` is trimmed and left
    /// out of the body when empty. Returns `None` while another status
    /// request is outstanding.
    pub fn request(&mut self, presence: Presence, custom_text: &str) -> Option<Request> {
        if let Some(pending) = self.in_flight {
            tracing::debug!(%pending, requested = %presence, "status request already in flight");
            return None;
        }
        self.in_flight = Some(presence);

        let text = custom_text.trim();
        Some(Request::SetStatus(StatusRequest {
            status: presence,
            custom_text: (!text.is_empty()).then(|| text.to_string()),
        }))
    }

    /// Settle the outstanding request. Returns `true` when a reconcile pass
    /// should follow.
    pub fn settle(
        &mut self,
        view: &mut DashboardView,
        notices: &mut NotificationBus,
        presence: Presence,
        result: Result<MessageResponse, ApiError>,
    ) -> bool {
        self.in_flight = None;

        match result {
            Ok(resp) => {
                view.presence = Some(presence);
                let message = if resp.message.trim().is_empty() {
                    format!("Status updated to {presence}")
                } else {
                    resp.message
                };
                tracing::info!(%presence, "status updated");
                notices.success(message);
                true
            }
            Err(e) => {
                tracing::warn!(%presence, error = %e, "status update failed");
                notices.error(e.user_message(FAILED_MESSAGE));
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::Level;

    #[test]
    fn request_trims_and_omits_empty_text() {
        let mut ctl = StatusController::default();
        let req = ctl.request(Presence::Idle, "   ").unwrap();
        assert_eq!(
            req,
            Request::SetStatus(StatusRequest {
                status: Presence::Idle,
                custom_text: None
            })
        );

        let mut ctl = StatusController::default();
        let req = ctl.request(Presence::Dnd, "  in a meeting ").unwrap();
        assert_eq!(
            req,
            Request::SetStatus(StatusRequest {
                status: Presence::Dnd,
                custom_text: Some("in a meeting".to_string())
            })
        );
    }

    #[test]
    fn only_one_request_outstanding() {
        let mut ctl = StatusController::default();
        assert!(ctl.request(Presence::Online, "").is_some());
        assert!(ctl.request(Presence::Idle, "").is_none());
        assert!(ctl.is_pending());
    }

    #[test]
    fn failure_leaves_highlight_and_surfaces_server_message() {
        let mut ctl = StatusController::default();
        let mut view = DashboardView::default();
        let mut notices = NotificationBus::default();
        view.presence = Some(Presence::Online);

        ctl.request(Presence::Dnd, "");
        let resync = ctl.settle(
            &mut view,
            &mut notices,
            Presence::Dnd,
            Err(ApiError::Status {
                endpoint: "/status".to_string(),
                code: 400,
                message: Some("discord rejected the update".to_string()),
            }),
        );

        assert!(!resync);
        assert!(!ctl.is_pending());
        assert_eq!(view.presence, Some(Presence::Online));
        let last = notices.latest().unwrap();
        assert_eq!(last.level, Level::Error);
        assert_eq!(last.message, "discord rejected the update");
    }

    #[test]
    fn transport_failure_uses_generic_message() {
        let mut ctl = StatusController::default();
        let mut view = DashboardView::default();
        let mut notices = NotificationBus::default();

        ctl.request(Presence::Idle, "");
        ctl.settle(
            &mut view,
            &mut notices,
            Presence::Idle,
            Err(ApiError::Transport {
                endpoint: "/status".to_string(),
                details: "connection refused".to_string(),
            }),
        );

        assert_eq!(view.presence, None);
        assert_eq!(notices.latest().unwrap().message, "Failed to update status");
    }

    #[test]
    fn success_moves_highlight() {
        let mut ctl = StatusController::default();
        let mut view = DashboardView::default();
        let mut notices = NotificationBus::default();

        ctl.request(Presence::Invisible, "");
        let resync = ctl.settle(
            &mut view,
            &mut notices,
            Presence::Invisible,
            Ok(MessageResponse {
                message: "Status updated to invisible".to_string(),
                enabled: None,
            }),
        );

        assert!(resync);
        assert_eq!(view.presence, Some(Presence::Invisible));
        assert_eq!(notices.latest().unwrap().level, Level::Success);
    }
}
