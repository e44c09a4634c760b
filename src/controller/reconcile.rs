/// Merging server configuration snapshots into the view model.
///
/// Toggles, the presence highlight and the auto-pressure button are derived
/// from the snapshot unconditionally. Free-text fields are overwritten only
/// when [`FocusGuard`] allows it, except on the authoritative path used for
/// the operator's own save.
///
/// [`SnapshotSequencer`] orders snapshots by the generation stamped on the
/// request that fetched them, so a slow response cannot roll the view back
/// past a newer one that was already applied.
use crate::api::types::{Config, ToggleId};

use super::focus::FocusGuard;
use super::view::{ButtonView, DashboardView, FieldId};

// ---------------------------------------------------------------------------
// Reconciler
// ---------------------------------------------------------------------------

/// Stateless merge of a [`Config`] into a [`DashboardView`].
pub struct ConfigReconciler;

impl ConfigReconciler {
    /// Apply a polled or resync snapshot. Focused fields are left untouched.
    pub fn apply(view: &mut DashboardView, snapshot: &Config) {
        Self::merge(view, snapshot, true);
    }

    /// Apply a snapshot that is the answer to the operator's own save.
    /// Overwrites every field regardless of focus.
    pub fn apply_authoritative(view: &mut DashboardView, snapshot: &Config) {
        Self::merge(view, snapshot, false);
    }

    fn merge(view: &mut DashboardView, snapshot: &Config, respect_focus: bool) {
        for id in [ToggleId::AutoResponder, ToggleId::AutoEmoji] {
            view.toggle_mut(id).checked = snapshot.toggle(id);
        }

        let synced: Vec<FieldId> = {
            let guard = FocusGuard::new(&view.fields);
            [
                FieldId::Prefix,
                FieldId::AutoResponsePhrase,
                FieldId::AutoEmoji,
            ]
            .into_iter()
            .filter(|&id| !respect_focus || guard.may_sync(id))
            .collect()
        };
        for id in synced {
            if let Some(value) = server_value(snapshot, id) {
                view.fields.get_mut(id).value = value.to_string();
            }
        }

        view.presence = snapshot.presence();
        view.auto_pressure = ButtonView::auto_pressure(snapshot.auto_pressure_active);
    }
}

/// Server-side value backing a text field. The custom status text has none.
fn server_value(snapshot: &Config, id: FieldId) -> Option<&str> {
    match id {
        FieldId::Prefix => Some(&snapshot.prefix),
        FieldId::AutoResponsePhrase => Some(&snapshot.auto_response_phrase),
        FieldId::AutoEmoji => Some(&snapshot.auto_emoji),
        FieldId::CustomStatusText => None,
    }
}

// ---------------------------------------------------------------------------
// Generation guard
// ---------------------------------------------------------------------------

/// Monotonic generation counter for config-producing requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapshotSequencer {
    issued: u64,
    applied: u64,
}

impl SnapshotSequencer {
    /// Stamp a new request. Generations start at 1 and never repeat.
    pub fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// Whether a polled snapshot from request `generation` is still current.
    pub fn is_current(&self, generation: u64) -> bool {
        generation >= self.applied
    }

    /// Record that the snapshot from `generation` is now displayed.
    pub fn mark_applied(&mut self, generation: u64) {
        self.applied = self.applied.max(generation);
    }

    /// Whether a snapshot requested after `generation` has been applied.
    pub fn applied_since(&self, generation: u64) -> bool {
        self.applied > generation
    }

    /// Generation of the newest applied snapshot (0 before the first one).
    pub fn applied(&self) -> u64 {
        self.applied
    }
}
