/// Plain-data view model of the dashboard.
///
/// Handlers mutate only these types; a rendering layer reads them. Nothing
/// here performs I/O or knows how it will be drawn.
use std::fmt;
use std::str::FromStr;

use crate::api::types::{Presence, Stats, ToggleId};

pub const LABEL_STOP_AUTO_PRESSURE: &str = "Stop Auto Pressure";
pub const LABEL_AUTO_PRESSURE_INACTIVE: &str = "Auto Pressure Not Active";
pub const LABEL_STOPPING: &str = "Stopping...";
pub const LABEL_SAVE: &str = "Save Settings";
pub const LABEL_SAVING: &str = "Saving...";

// ---------------------------------------------------------------------------
// Editable text fields
// ---------------------------------------------------------------------------

/// Identifies one free-text input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldId {
    Prefix,
    AutoResponsePhrase,
    AutoEmoji,
    /// Custom presence text. Has no server counterpart.
    CustomStatusText,
}

impl FieldId {
    pub const ALL: [FieldId; 4] = [
        FieldId::Prefix,
        FieldId::AutoResponsePhrase,
        FieldId::AutoEmoji,
        FieldId::CustomStatusText,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Prefix => "prefix",
            Self::AutoResponsePhrase => "auto_response_phrase",
            Self::AutoEmoji => "auto_emoji",
            Self::CustomStatusText => "custom_status_text",
        }
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prefix" => Ok(Self::Prefix),
            "auto_response_phrase" | "phrase" => Ok(Self::AutoResponsePhrase),
            "auto_emoji" | "emoji" => Ok(Self::AutoEmoji),
            "custom_status_text" | "status_text" | "text" => Ok(Self::CustomStatusText),
            other => Err(format!("unknown field '{other}'")),
        }
    }
}

/// Displayed value and focus flag of one input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldState {
    pub value: String,
    pub focused: bool,
}

/// The four editable inputs. At most one is focused at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditableFields {
    pub prefix: FieldState,
    pub auto_response_phrase: FieldState,
    pub auto_emoji: FieldState,
    pub custom_status_text: FieldState,
}

impl EditableFields {
    pub fn get(&self, id: FieldId) -> &FieldState {
        match id {
            FieldId::Prefix => &self.prefix,
            FieldId::AutoResponsePhrase => &self.auto_response_phrase,
            FieldId::AutoEmoji => &self.auto_emoji,
            FieldId::CustomStatusText => &self.custom_status_text,
        }
    }

    pub fn get_mut(&mut self, id: FieldId) -> &mut FieldState {
        match id {
            FieldId::Prefix => &mut self.prefix,
            FieldId::AutoResponsePhrase => &mut self.auto_response_phrase,
            FieldId::AutoEmoji => &mut self.auto_emoji,
            FieldId::CustomStatusText => &mut self.custom_status_text,
        }
    }

    /// The field currently holding focus, if any.
    pub fn focused(&self) -> Option<FieldId> {
        FieldId::ALL.into_iter().find(|&id| self.get(id).focused)
    }

    /// Give `id` focus, taking it away from every other field.
    pub fn focus(&mut self, id: FieldId) {
        for other in FieldId::ALL {
            self.get_mut(other).focused = other == id;
        }
    }

    /// Release focus from `id`. Returns `false` if it was not focused.
    pub fn blur(&mut self, id: FieldId) -> bool {
        std::mem::replace(&mut self.get_mut(id).focused, false)
    }
}

// ---------------------------------------------------------------------------
// Toggles
// ---------------------------------------------------------------------------

/// Whether a toggle has an unconfirmed flip outstanding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ToggleState {
    #[default]
    Settled,
    /// A confirmation is in flight; `previous` is the value to restore if
    /// it fails.
    Pending { previous: bool },
}

/// A checkbox-style boolean control.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToggleView {
    pub checked: bool,
    pub state: ToggleState,
}

impl ToggleView {
    pub fn is_pending(&self) -> bool {
        matches!(self.state, ToggleState::Pending { .. })
    }
}

// ---------------------------------------------------------------------------
// Buttons
// ---------------------------------------------------------------------------

/// An action button: enabled flag and current label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonView {
    pub enabled: bool,
    pub label: &'static str,
}

impl ButtonView {
    /// Auto-pressure stop button for a given server state.
    pub fn auto_pressure(active: bool) -> Self {
        if active {
            Self {
                enabled: true,
                label: LABEL_STOP_AUTO_PRESSURE,
            }
        } else {
            Self {
                enabled: false,
                label: LABEL_AUTO_PRESSURE_INACTIVE,
            }
        }
    }

    pub fn stopping() -> Self {
        Self {
            enabled: false,
            label: LABEL_STOPPING,
        }
    }

    pub fn save_idle() -> Self {
        Self {
            enabled: true,
            label: LABEL_SAVE,
        }
    }

    pub fn saving() -> Self {
        Self {
            enabled: false,
            label: LABEL_SAVING,
        }
    }
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Display strings for the statistics panel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsView {
    pub uptime: String,
    pub commands_handled: String,
    pub messages_logged: String,
    pub memory: String,
}

impl StatsView {
    pub fn from_stats(stats: &Stats) -> Self {
        Self {
            uptime: format_uptime(stats),
            commands_handled: format_count(stats.commands_handled),
            messages_logged: format_count(stats.messages_logged),
            memory: format!("{:.1} MB", stats.memory_usage_mb),
        }
    }
}

/// `"{days}d {hours}h {minutes}m"`.
pub fn format_uptime(stats: &Stats) -> String {
    format!(
        "{}d {}h {}m",
        stats.uptime_days, stats.uptime_hours, stats.uptime_minutes
    )
}

/// Format a counter with comma thousands separators.
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

// ---------------------------------------------------------------------------
// Whole dashboard
// ---------------------------------------------------------------------------

/// Everything the rendering layer needs to draw the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardView {
    pub auto_responder: ToggleView,
    pub auto_emoji: ToggleView,
    pub fields: EditableFields,
    /// Highlighted presence button; `None` highlights nothing.
    pub presence: Option<Presence>,
    pub auto_pressure: ButtonView,
    pub save: ButtonView,
    /// `None` until the first successful stats fetch.
    pub stats: Option<StatsView>,
}

impl Default for DashboardView {
    fn default() -> Self {
        Self {
            auto_responder: ToggleView::default(),
            auto_emoji: ToggleView::default(),
            fields: EditableFields::default(),
            presence: None,
            auto_pressure: ButtonView::auto_pressure(false),
            save: ButtonView::save_idle(),
            stats: None,
        }
    }
}

impl DashboardView {
    pub fn toggle(&self, id: ToggleId) -> &ToggleView {
        match id {
            ToggleId::AutoResponder => &self.auto_responder,
            ToggleId::AutoEmoji => &self.auto_emoji,
        }
    }

    pub fn toggle_mut(&mut self, id: ToggleId) -> &mut ToggleView {
        match id {
            ToggleId::AutoResponder => &mut self.auto_responder,
            ToggleId::AutoEmoji => &mut self.auto_emoji,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_count_groups_thousands() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_000), "1,000");
        assert_eq!(format_count(12_345), "12,345");
        assert_eq!(format_count(1_234_567), "1,234,567");
    }

    #[test]
    fn stats_view_formats_uptime_and_memory() {
        let stats = Stats {
            uptime_days: 2,
            uptime_hours: 5,
            uptime_minutes: 7,
            commands_handled: 4_200,
            messages_logged: 17,
            memory_usage_mb: 12.345,
        };
        let view = StatsView::from_stats(&stats);
        assert_eq!(view.uptime, "2d 5h 7m");
        assert_eq!(view.commands_handled, "4,200");
        assert_eq!(view.messages_logged, "17");
        assert_eq!(view.memory, "12.3 MB");
    }

    #[test]
    fn focusing_one_field_blurs_the_rest() {
        let mut fields = EditableFields::default();
        fields.focus(FieldId::Prefix);
        fields.focus(FieldId::AutoEmoji);
        assert_eq!(fields.focused(), Some(FieldId::AutoEmoji));
        assert!(!fields.prefix.focused);

        assert!(fields.blur(FieldId::AutoEmoji));
        assert!(!fields.blur(FieldId::AutoEmoji));
        assert_eq!(fields.focused(), None);
    }

    #[test]
    fn field_id_parses_short_names() {
        assert_eq!("phrase".parse::<FieldId>(), Ok(FieldId::AutoResponsePhrase));
        assert_eq!("custom_status_text".parse::<FieldId>(), Ok(FieldId::CustomStatusText));
        assert!("nickname".parse::<FieldId>().is_err());
    }

    #[test]
    fn auto_pressure_button_follows_state() {
        assert_eq!(
            ButtonView::auto_pressure(true),
            ButtonView {
                enabled: true,
                label: "Stop Auto Pressure"
            }
        );
        assert_eq!(
            ButtonView::auto_pressure(false),
            ButtonView {
                enabled: false,
                label: "Auto Pressure Not Active"
            }
        );
    }
}
