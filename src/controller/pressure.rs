//! Stop control for the server's auto-pressure process.
//!
//! The button goes to a disabled "Stopping..." state as soon as it is
//! pressed. A `{stopped: false}` answer is an informational no-op rather
//! than an error: the button becomes usable again because the process may
//! still be running.

use crate::api::error::ApiError;
use crate::api::types::{Config, StopResponse};
use crate::notify::NotificationBus;

use super::effects::Request;
use super::reconcile::SnapshotSequencer;
use super::view::{ButtonView, DashboardView};

const FAILED_MESSAGE: &str = "Failed to stop auto pressure";

#[derive(Debug, Default)]
pub struct AutoPressureController {
    in_flight: Option<u64>,
}

impl AutoPressureController {
    pub fn is_pending(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Press the stop button. A disabled button does nothing.
    pub fn stop(&mut self, view: &mut DashboardView, seq: &mut SnapshotSequencer) -> Option<Request> {
        if !view.auto_pressure.enabled {
            tracing::debug!(label = view.auto_pressure.label, "stop ignored, control disabled");
            return None;
        }
        view.auto_pressure = ButtonView::stopping();

        let generation = seq.issue();
        self.in_flight = Some(generation);
        tracing::info!(generation, "stopping auto pressure");
        Some(Request::StopAutoPressure { generation })
    }

    /// Keep the button in "Stopping..." against a polled snapshot that was
    /// requested before the outstanding stop.
    pub fn hold_stopping(&self, view: &mut DashboardView, snapshot_generation: u64) {
        if let Some(stop) = self.in_flight
            && snapshot_generation < stop
        {
            view.auto_pressure = ButtonView::stopping();
        }
    }

    /// Settle the stop request. Returns `true` when a reconcile pass should
    /// follow.
    ///
    /// When the outcome leaves the process possibly running, the button is
    /// re-enabled, unless a snapshot fetched after the stop was pressed has
    /// already been applied; that snapshot then decides the button state.
    /// The outcome of a stop that has since been superseded by a newer one
    /// is still reported, but leaves the button to the newer request.
    pub fn settle(
        &mut self,
        view: &mut DashboardView,
        notices: &mut NotificationBus,
        seq: &SnapshotSequencer,
        latest: Option<&Config>,
        generation: u64,
        result: Result<StopResponse, ApiError>,
    ) -> bool {
        let current = self.in_flight == Some(generation);
        if current {
            self.in_flight = None;
        } else {
            tracing::debug!(generation, pending = ?self.in_flight, "superseded stop settled");
        }

        let still_running = || match latest {
            Some(cfg) if seq.applied_since(generation) => {
                ButtonView::auto_pressure(cfg.auto_pressure_active)
            }
            _ => ButtonView::auto_pressure(true),
        };

        match result {
            Ok(resp) if resp.stopped => {
                if current {
                    view.auto_pressure = ButtonView::auto_pressure(false);
                }
                notices.success(message_or(resp.message, "Auto pressure stopped"));
                true
            }
            Ok(resp) => {
                if current {
                    view.auto_pressure = still_running();
                }
                notices.info(message_or(resp.message, "Auto pressure was not active"));
                false
            }
            Err(e) => {
                if current {
                    view.auto_pressure = still_running();
                }
                tracing::warn!(error = %e, "stop auto pressure failed");
                notices.error(FAILED_MESSAGE);
                false
            }
        }
    }
}

fn message_or(message: String, fallback: &str) -> String {
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}
