//! Batched save of the text settings.

use crate::api::error::ApiError;
use crate::api::types::{Config, ConfigUpdate};
use crate::notify::NotificationBus;

use super::effects::Request;
use super::reconcile::{ConfigReconciler, SnapshotSequencer};
use super::view::{ButtonView, DashboardView, EditableFields};

const FAILED_MESSAGE: &str = "Failed to save settings";
const SAVED_MESSAGE: &str = "Settings saved successfully";

#[derive(Debug, Default)]
pub struct SettingsSaver {
    in_flight: Option<u64>,
}

impl SettingsSaver {
    pub fn is_pending(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Build the partial update from the current field values.
    ///
    /// Values are trimmed and a key is only included when its trimmed value
    /// is non-empty, so this path can never clear a server-side value.
    pub fn payload(fields: &EditableFields) -> ConfigUpdate {
        let pick = |value: &str| {
            let trimmed = value.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        };
        ConfigUpdate {
            prefix: pick(&fields.prefix.value),
            auto_response_phrase: pick(&fields.auto_response_phrase.value),
            auto_emoji: pick(&fields.auto_emoji.value),
        }
    }

    /// Press the save button. Does nothing while a save is in flight.
    pub fn save(&mut self, view: &mut DashboardView, seq: &mut SnapshotSequencer) -> Option<Request> {
        if !view.save.enabled || self.in_flight.is_some() {
            tracing::debug!("save ignored, already saving");
            return None;
        }
        view.save = ButtonView::saving();

        let generation = seq.issue();
        self.in_flight = Some(generation);
        let update = Self::payload(&view.fields);
        tracing::info!(generation, ?update, "saving settings");
        Some(Request::SaveSettings { generation, update })
    }

    /// Settle the save. On success the returned config replaces the local
    /// snapshot and is applied without focus protection. The button is
    /// restored on every outcome.
    pub fn settle(
        &mut self,
        view: &mut DashboardView,
        notices: &mut NotificationBus,
        seq: &mut SnapshotSequencer,
        generation: u64,
        result: Result<Config, ApiError>,
    ) -> Option<Config> {
        let saved = match result {
            Ok(config) => {
                ConfigReconciler::apply_authoritative(view, &config);
                seq.mark_applied(generation);
                notices.success(SAVED_MESSAGE);
                Some(config)
            }
            Err(e) => {
                tracing::warn!(error = %e, "saving settings failed");
                notices.error(e.user_message(FAILED_MESSAGE));
                None
            }
        };

        self.in_flight = None;
        view.save = ButtonView::save_idle();
        saved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::Level;

    #[test]
    fn payload_keeps_only_non_empty_trimmed_values() {
        let mut fields = EditableFields::default();
        fields.prefix.value = String::new();
        fields.auto_response_phrase.value = "x".to_string();
        fields.auto_emoji.value = "  ".to_string();

        let update = SettingsSaver::payload(&fields);
        assert_eq!(
            update,
            ConfigUpdate {
                auto_response_phrase: Some("x".to_string()),
                ..ConfigUpdate::default()
            }
        );
        assert_eq!(
            serde_json::to_string(&update).unwrap(),
            r#"{"auto_response_phrase":"x"}"#
        );
    }

    #[test]
    fn save_disables_button_until_settled() {
        let mut saver = SettingsSaver::default();
        let mut view = DashboardView::default();
        let mut seq = SnapshotSequencer::default();
        let mut notices = NotificationBus::default();

        let Some(Request::SaveSettings { generation, .. }) = saver.save(&mut view, &mut seq) else {
            panic!("expected save request");
        };
        assert_eq!(view.save, ButtonView::saving());
        assert!(saver.save(&mut view, &mut seq).is_none());

        saver.settle(
            &mut view,
            &mut notices,
            &mut seq,
            generation,
            Err(ApiError::Status {
                endpoint: "/config".to_string(),
                code: 400,
                message: Some("Invalid JSON".to_string()),
            }),
        );

        assert_eq!(view.save, ButtonView::save_idle());
        assert!(!saver.is_pending());
        let last = notices.latest().unwrap();
        assert_eq!(last.level, Level::Error);
        assert_eq!(last.message, "Invalid JSON");
    }

    #[test]
    fn success_overrides_focused_field() {
        let mut saver = SettingsSaver::default();
        let mut view = DashboardView::default();
        let mut seq = SnapshotSequencer::default();
        let mut notices = NotificationBus::default();
        view.fields.focus(crate::controller::view::FieldId::Prefix);
        view.fields.prefix.value = " ?? ".to_string();

        let Some(Request::SaveSettings { generation, update }) = saver.save(&mut view, &mut seq)
        else {
            panic!("expected save request");
        };
        assert_eq!(update.prefix.as_deref(), Some("??"));

        let config = Config {
            prefix: "??".to_string(),
            ..Config::default()
        };
        let saved = saver.settle(&mut view, &mut notices, &mut seq, generation, Ok(config.clone()));

        assert_eq!(saved, Some(config));
        assert_eq!(view.fields.prefix.value, "??");
        assert_eq!(seq.applied(), generation);
        assert_eq!(view.save, ButtonView::save_idle());
        assert_eq!(notices.latest().unwrap().message, "Settings saved successfully");
    }
}
