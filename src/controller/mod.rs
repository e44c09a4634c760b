//! State reconciliation and optimistic mutation for the bot dashboard.
//!
//! [`Dashboard`] owns the last server snapshots, the view model, the
//! notification bus and the per-control in-flight state. It is driven from
//! a single thread by three kinds of input:
//!
//! - poll ticks ([`Dashboard::poll_tick`]),
//! - operator actions ([`Dashboard::dispatch`] and the field editing calls),
//! - request completions ([`Dashboard::complete`]).
//!
//! Each call mutates the view model synchronously and returns the requests
//! to perform next. Nothing in here blocks or performs I/O; see
//! [`session::Session`] for an inline driver and
//! [`crate::scheduler::event_loop`] for the threaded one.

pub mod actions;
pub mod effects;
pub mod focus;
pub mod pressure;
pub mod reconcile;
pub mod session;
pub mod settings;
pub mod status;
pub mod toggle;
pub mod view;

use chrono::{DateTime, Utc};

use crate::api::error::ApiError;
use crate::api::types::{Config, Presence, Stats, ToggleId};
use crate::notify::{Level, NotificationBus};

pub use actions::{ACTIONS, UnknownAction};
pub use effects::{Completion, Request};
pub use view::{DashboardView, FieldId};

use pressure::AutoPressureController;
use reconcile::{ConfigReconciler, SnapshotSequencer};
use settings::SettingsSaver;
use status::StatusController;
use toggle::OptimisticToggle;
use view::StatsView;

const LOAD_CONFIG_FAILED: &str = "Failed to load configuration";

/// The dashboard controller.
#[derive(Debug)]
pub struct Dashboard {
    config: Option<Config>,
    stats: Option<Stats>,
    view: DashboardView,
    notices: NotificationBus,
    sequencer: SnapshotSequencer,
    status: StatusController,
    pressure: AutoPressureController,
    saver: SettingsSaver,
    revision: u64,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new(NotificationBus::default())
    }
}

impl Dashboard {
    pub fn new(notices: NotificationBus) -> Self {
        Self {
            config: None,
            stats: None,
            view: DashboardView::default(),
            notices,
            sequencer: SnapshotSequencer::default(),
            status: StatusController::default(),
            pressure: AutoPressureController::default(),
            saver: SettingsSaver::default(),
            revision: 0,
        }
    }

    // -- Read access --

    pub fn view(&self) -> &DashboardView {
        &self.view
    }

    /// Last applied config snapshot.
    pub fn config(&self) -> Option<&Config> {
        self.config.as_ref()
    }

    /// Last fetched stats snapshot.
    pub fn stats(&self) -> Option<&Stats> {
        self.stats.as_ref()
    }

    pub fn notifications(&self) -> &NotificationBus {
        &self.notices
    }

    pub fn notifications_mut(&mut self) -> &mut NotificationBus {
        &mut self.notices
    }

    /// Bumped whenever the view model or the notification list changes.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    // -- Poll cycle --

    /// One poll tick: fetch config and stats.
    pub fn poll_tick(&mut self) -> Vec<Request> {
        vec![self.fetch_config(), Request::FetchStats]
    }

    /// Same as a poll tick, triggered on demand.
    pub fn refresh(&mut self) -> Vec<Request> {
        self.poll_tick()
    }

    fn fetch_config(&mut self) -> Request {
        Request::FetchConfig {
            generation: self.sequencer.issue(),
        }
    }

    // -- Field editing --

    /// Give a field input focus.
    pub fn focus(&mut self, field: FieldId) {
        self.observe(|d| d.view.fields.focus(field));
    }

    /// Release focus from a field.
    pub fn blur(&mut self, field: FieldId) {
        self.observe(|d| {
            d.view.fields.blur(field);
        });
    }

    /// Replace a field's value as the operator typing would. Typing implies
    /// focus.
    pub fn input(&mut self, field: FieldId, text: impl Into<String>) {
        let text = text.into();
        self.observe(|d| {
            d.view.fields.focus(field);
            d.view.fields.get_mut(field).value = text;
        });
    }

    // -- Operator actions --

    /// Run the handler registered for `action_id`.
    pub fn dispatch(&mut self, action_id: &str) -> Result<Vec<Request>, UnknownAction> {
        let entry = actions::lookup(action_id)?;
        tracing::debug!(action = entry.id, "dispatch");
        Ok((entry.handler)(self))
    }

    pub fn flip(&mut self, id: ToggleId) -> Vec<Request> {
        self.observe(|d| vec![OptimisticToggle::flip(&mut d.view, id)])
    }

    /// Request `presence`, taking the custom text from its field.
    pub fn set_status(&mut self, presence: Presence) -> Vec<Request> {
        let text = self.view.fields.custom_status_text.value.clone();
        self.status.request(presence, &text).into_iter().collect()
    }

    pub fn stop_auto_pressure(&mut self) -> Vec<Request> {
        self.observe(|d| {
            d.pressure
                .stop(&mut d.view, &mut d.sequencer)
                .into_iter()
                .collect()
        })
    }

    pub fn save_settings(&mut self) -> Vec<Request> {
        self.observe(|d| {
            d.saver
                .save(&mut d.view, &mut d.sequencer)
                .into_iter()
                .collect()
        })
    }

    // -- Completions --

    /// Feed back the outcome of a request. Returns follow-up requests (the
    /// resync pass after a confirmed mutation).
    pub fn complete(&mut self, completion: Completion) -> Vec<Request> {
        self.observe(|d| d.settle(completion))
    }

    fn settle(&mut self, completion: Completion) -> Vec<Request> {
        let resync = match completion {
            Completion::Config { generation, result } => {
                self.apply_polled(generation, result);
                false
            }
            Completion::Stats(result) => {
                self.apply_stats(result);
                false
            }
            Completion::Toggle { id, result } => {
                OptimisticToggle::settle(&mut self.view, &mut self.notices, id, result)
            }
            Completion::Status { presence, result } => {
                self.status
                    .settle(&mut self.view, &mut self.notices, presence, result)
            }
            Completion::AutoPressure { generation, result } => self.pressure.settle(
                &mut self.view,
                &mut self.notices,
                &self.sequencer,
                self.config.as_ref(),
                generation,
                result,
            ),
            Completion::Save { generation, result } => {
                if let Some(config) = self.saver.settle(
                    &mut self.view,
                    &mut self.notices,
                    &mut self.sequencer,
                    generation,
                    result,
                ) {
                    self.config = Some(config);
                }
                false
            }
        };

        if resync {
            vec![self.fetch_config()]
        } else {
            Vec::new()
        }
    }

    fn apply_polled(&mut self, generation: u64, result: Result<Config, ApiError>) {
        match result {
            Ok(snapshot) => {
                if !self.sequencer.is_current(generation) {
                    tracing::debug!(
                        generation,
                        applied = self.sequencer.applied(),
                        "discarding stale config snapshot"
                    );
                    return;
                }
                ConfigReconciler::apply(&mut self.view, &snapshot);
                self.pressure.hold_stopping(&mut self.view, generation);
                self.sequencer.mark_applied(generation);
                self.config = Some(snapshot);
            }
            Err(e) => {
                tracing::warn!(error = %e, "loading config failed");
                self.notices.error(LOAD_CONFIG_FAILED);
            }
        }
    }

    fn apply_stats(&mut self, result: Result<Stats, ApiError>) {
        match result {
            Ok(stats) => {
                if let Some(prev) = &self.stats
                    && (stats.commands_handled < prev.commands_handled
                        || stats.messages_logged < prev.messages_logged)
                {
                    tracing::debug!(
                        prev_commands = prev.commands_handled,
                        commands = stats.commands_handled,
                        "stats counters went backwards, server probably restarted"
                    );
                }
                self.view.stats = Some(StatsView::from_stats(&stats));
                self.stats = Some(stats);
            }
            Err(e) => tracing::warn!(error = %e, "loading stats failed"),
        }
    }

    // -- Notifications --

    /// Raise a notification from outside the controller (host messages such
    /// as input errors).
    pub fn notify(&mut self, level: Level, message: impl Into<String>) -> u64 {
        let message = message.into();
        self.observe(|d| d.notices.push(level, message))
    }

    /// Drop expired notifications. Bumps the revision if any were removed.
    pub fn prune_notifications(&mut self, now: DateTime<Utc>) -> usize {
        let removed = self.notices.prune(now);
        if removed > 0 {
            self.revision += 1;
        }
        removed
    }

    /// Remove one notification early.
    pub fn dismiss_notification(&mut self, id: u64) -> bool {
        let removed = self.notices.dismiss(id);
        if removed {
            self.revision += 1;
        }
        removed
    }

    /// Run `f` and bump the revision if it changed anything visible.
    fn observe<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let before = self.view.clone();
        let last_notice = self.notices.latest().map(|n| n.id);
        let out = f(self);
        if self.view != before || self.notices.latest().map(|n| n.id) != last_notice {
            self.revision += 1;
        }
        out
    }

    /// Whether any operator-initiated request is still awaiting its answer.
    pub fn has_pending_actions(&self) -> bool {
        self.status.is_pending()
            || self.pressure.is_pending()
            || self.saver.is_pending()
            || self.view.auto_responder.is_pending()
            || self.view.auto_emoji.is_pending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::view::ButtonView;

    fn snapshot(prefix: &str, status: &str, pressure: bool) -> Config {
        Config {
            prefix: prefix.to_string(),
            current_status: status.to_string(),
            auto_pressure_active: pressure,
            ..Config::default()
        }
    }

    fn config_generation(requests: &[Request]) -> u64 {
        requests
            .iter()
            .find_map(|r| match r {
                Request::FetchConfig { generation } => Some(*generation),
                _ => None,
            })
            .expect("config fetch")
    }

    #[test]
    fn poll_tick_requests_config_and_stats() {
        let mut d = Dashboard::default();
        let reqs = d.poll_tick();
        assert_eq!(
            reqs,
            vec![Request::FetchConfig { generation: 1 }, Request::FetchStats]
        );
    }

    #[test]
    fn stale_poll_is_discarded() {
        let mut d = Dashboard::default();
        let old = config_generation(&d.poll_tick());
        let new = config_generation(&d.poll_tick());

        d.complete(Completion::Config {
            generation: new,
            result: Ok(snapshot("new", "idle", true)),
        });
        d.complete(Completion::Config {
            generation: old,
            result: Ok(snapshot("old", "online", false)),
        });

        assert_eq!(d.view().fields.prefix.value, "new");
        assert_eq!(d.view().presence, Some(Presence::Idle));
        assert_eq!(d.config().unwrap().prefix, "new");
    }

    #[test]
    fn fetch_failure_keeps_previous_snapshot() {
        let mut d = Dashboard::default();
        let g = config_generation(&d.poll_tick());
        d.complete(Completion::Config {
            generation: g,
            result: Ok(snapshot("!", "dnd", true)),
        });
        let before = d.view().clone();

        let g = config_generation(&d.poll_tick());
        d.complete(Completion::Config {
            generation: g,
            result: Err(ApiError::Transport {
                endpoint: "/config".to_string(),
                details: "refused".to_string(),
            }),
        });

        assert_eq!(d.view(), &before);
        assert_eq!(d.notifications().len(), 1);
        let last = d.notifications().latest().unwrap();
        assert_eq!(last.level, Level::Error);
        assert_eq!(last.message, "Failed to load configuration");
    }

    #[test]
    fn stats_failure_is_silent() {
        let mut d = Dashboard::default();
        d.complete(Completion::Stats(Err(ApiError::Transport {
            endpoint: "/stats".to_string(),
            details: "refused".to_string(),
        })));
        assert!(d.notifications().is_empty());
        assert!(d.view().stats.is_none());
    }

    #[test]
    fn confirmed_toggle_triggers_resync() {
        let mut d = Dashboard::default();
        let reqs = d.dispatch("toggle.autoemoji").unwrap();
        assert_eq!(reqs, vec![Request::Toggle(ToggleId::AutoEmoji)]);

        let follow = d.complete(Completion::Toggle {
            id: ToggleId::AutoEmoji,
            result: Ok(Default::default()),
        });
        assert!(matches!(follow.as_slice(), [Request::FetchConfig { .. }]));
    }

    #[test]
    fn status_reads_custom_text_field() {
        let mut d = Dashboard::default();
        d.input(FieldId::CustomStatusText, "  lunch  ");
        let reqs = d.dispatch("status.idle").unwrap();
        match reqs.as_slice() {
            [Request::SetStatus(body)] => {
                assert_eq!(body.status, Presence::Idle);
                assert_eq!(body.custom_text.as_deref(), Some("lunch"));
            }
            other => panic!("unexpected requests: {other:?}"),
        }
    }

    #[test]
    fn save_response_beats_older_poll() {
        let mut d = Dashboard::default();
        let poll = config_generation(&d.poll_tick());
        d.input(FieldId::Prefix, "?");
        let save = match d.save_settings().as_slice() {
            [Request::SaveSettings { generation, .. }] => *generation,
            other => panic!("unexpected requests: {other:?}"),
        };

        d.complete(Completion::Save {
            generation: save,
            result: Ok(snapshot("?", "online", false)),
        });
        d.complete(Completion::Config {
            generation: poll,
            result: Ok(snapshot("!", "online", false)),
        });

        assert_eq!(d.view().fields.prefix.value, "?");
        assert_eq!(d.view().save, ButtonView::save_idle());
    }

    #[test]
    fn poll_issued_before_stop_keeps_stopping() {
        let mut d = Dashboard::default();
        let g = config_generation(&d.poll_tick());
        d.complete(Completion::Config {
            generation: g,
            result: Ok(snapshot("!", "online", true)),
        });

        let poll = config_generation(&d.poll_tick());
        let first = d.stop_auto_pressure();
        assert!(matches!(first.as_slice(), [Request::StopAutoPressure { .. }]));

        d.complete(Completion::Config {
            generation: poll,
            result: Ok(snapshot("!", "online", true)),
        });
        assert_eq!(d.view().auto_pressure, ButtonView::stopping());
        assert!(d.stop_auto_pressure().is_empty());
        assert!(d.has_pending_actions());
    }

    #[test]
    fn superseded_stop_does_not_clear_pending() {
        let mut d = Dashboard::default();
        let g = config_generation(&d.poll_tick());
        d.complete(Completion::Config {
            generation: g,
            result: Ok(snapshot("!", "online", true)),
        });

        let first = match d.stop_auto_pressure().as_slice() {
            [Request::StopAutoPressure { generation }] => *generation,
            other => panic!("unexpected requests: {other:?}"),
        };
        // A poll issued after the stop reports the process still active.
        let poll = config_generation(&d.poll_tick());
        d.complete(Completion::Config {
            generation: poll,
            result: Ok(snapshot("!", "online", true)),
        });
        assert!(d.view().auto_pressure.enabled);
        assert_eq!(d.stop_auto_pressure().len(), 1);

        d.complete(Completion::AutoPressure {
            generation: first,
            result: Ok(Default::default()),
        });
        assert!(d.has_pending_actions());
        assert_eq!(d.view().auto_pressure, ButtonView::stopping());
    }

    #[test]
    fn stats_counters_going_backwards_still_replace_snapshot() {
        let mut d = Dashboard::default();
        d.complete(Completion::Stats(Ok(Stats {
            commands_handled: 1_500,
            messages_logged: 900,
            ..Stats::default()
        })));
        d.complete(Completion::Stats(Ok(Stats {
            commands_handled: 12,
            messages_logged: 3,
            uptime_minutes: 1,
            ..Stats::default()
        })));

        let stats = d.stats().unwrap();
        assert_eq!(stats.commands_handled, 12);
        assert_eq!(stats.messages_logged, 3);
        let view = d.view().stats.as_ref().unwrap();
        assert_eq!(view.commands_handled, "12");
        assert_eq!(view.uptime, "0d 0h 1m");
    }

    #[test]
    fn revision_tracks_visible_changes() {
        let mut d = Dashboard::default();
        let r0 = d.revision();
        d.poll_tick();
        assert_eq!(d.revision(), r0);

        d.input(FieldId::Prefix, "x");
        assert_eq!(d.revision(), r0 + 1);

        d.flip(ToggleId::AutoResponder);
        assert_eq!(d.revision(), r0 + 2);
        assert!(d.has_pending_actions());
    }

    #[test]
    fn pruning_expired_notices_bumps_revision() {
        let mut d = Dashboard::new(NotificationBus::with_ttl_ms(1_000));
        d.notifications_mut().info("hello");
        let r0 = d.revision();

        assert_eq!(d.prune_notifications(Utc::now()), 0);
        assert_eq!(d.revision(), r0);

        let later = Utc::now() + chrono::Duration::seconds(5);
        assert_eq!(d.prune_notifications(later), 1);
        assert_eq!(d.revision(), r0 + 1);
        assert!(d.notifications().is_empty());
    }

    #[test]
    fn dismiss_removes_notice() {
        let mut d = Dashboard::default();
        let id = d.notifications_mut().warning("careful");
        assert!(d.dismiss_notification(id));
        assert!(!d.dismiss_notification(id));
        assert!(d.notifications().is_empty());
    }

    #[test]
    fn unknown_action_is_an_error() {
        let mut d = Dashboard::default();
        assert!(d.dispatch("launch.rockets").is_err());
    }
}
