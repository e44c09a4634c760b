//! Optimistic boolean toggles.
//!
//! The checkbox flips before any request is issued. The confirmation either
//! settles it or restores the value it had before the flip.

use crate::api::error::ApiError;
use crate::api::types::{MessageResponse, ToggleId};
use crate::notify::NotificationBus;

use super::effects::Request;
use super::view::{DashboardView, ToggleState};

pub struct OptimisticToggle;

impl OptimisticToggle {
    /// Flip the local value and return the confirmation request.
    ///
    /// A second flip while one is pending is allowed; the revert target then
    /// becomes the value just before the newest flip.
    pub fn flip(view: &mut DashboardView, id: ToggleId) -> Request {
        let toggle = view.toggle_mut(id);
        let previous = toggle.checked;
        toggle.checked = !previous;
        toggle.state = ToggleState::Pending { previous };
        tracing::info!(toggle = id.label(), checked = toggle.checked, "toggle flipped");
        Request::Toggle(id)
    }

    /// Settle a confirmation. Returns `true` when a reconcile pass should
    /// follow.
    pub fn settle(
        view: &mut DashboardView,
        notices: &mut NotificationBus,
        id: ToggleId,
        result: Result<MessageResponse, ApiError>,
    ) -> bool {
        let toggle = view.toggle_mut(id);
        let state = std::mem::take(&mut toggle.state);

        match result {
            Ok(resp) => {
                notices.success(success_message(id, &resp));
                true
            }
            Err(e) => {
                if let ToggleState::Pending { previous } = state {
                    toggle.checked = previous;
                }
                tracing::warn!(toggle = id.label(), error = %e, "toggle failed, reverted");
                notices.error(format!("Failed to toggle {}", id.label()));
                false
            }
        }
    }
}

fn success_message(id: ToggleId, resp: &MessageResponse) -> String {
    if !resp.message.trim().is_empty() {
        return resp.message.clone();
    }
    match resp.enabled {
        Some(true) => format!("{} enabled", id.title()),
        Some(false) => format!("{} disabled", id.title()),
        None => format!("{} updated", id.title()),
    }
}
