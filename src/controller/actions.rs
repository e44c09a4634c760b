//! Dispatch table from action identifiers to handlers.
//!
//! Every operator action is addressed by a stable string id so that any
//! input surface (a key binding, a typed command, a CLI flag) can drive the
//! controller without knowing its methods.

use thiserror::Error;

use crate::api::types::{Presence, ToggleId};

use super::Dashboard;
use super::effects::Request;

/// A handler reads whatever input it needs from the dashboard's own field
/// state and returns the requests to perform.
pub type Handler = fn(&mut Dashboard) -> Vec<Request>;

/// One row of the dispatch table.
#[derive(Clone, Copy)]
pub struct ActionEntry {
    pub id: &'static str,
    pub description: &'static str,
    pub handler: Handler,
}

/// Returned for an id that is not in [`ACTIONS`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown action '{0}'")]
pub struct UnknownAction(pub String);

pub static ACTIONS: &[ActionEntry] = &[
    ActionEntry {
        id: "toggle.autoresponder",
        description: "flip the auto responder",
        handler: toggle_autoresponder,
    },
    ActionEntry {
        id: "toggle.autoemoji",
        description: "flip the auto emoji reaction",
        handler: toggle_autoemoji,
    },
    ActionEntry {
        id: "status.online",
        description: "set presence to online (uses custom_status_text)",
        handler: status_online,
    },
    ActionEntry {
        id: "status.idle",
        description: "set presence to idle (uses custom_status_text)",
        handler: status_idle,
    },
    ActionEntry {
        id: "status.dnd",
        description: "set presence to do not disturb (uses custom_status_text)",
        handler: status_dnd,
    },
    ActionEntry {
        id: "status.invisible",
        description: "set presence to invisible (uses custom_status_text)",
        handler: status_invisible,
    },
    ActionEntry {
        id: "autopressure.stop",
        description: "stop the running auto pressure process",
        handler: stop_auto_pressure,
    },
    ActionEntry {
        id: "settings.save",
        description: "save prefix, auto_response_phrase and auto_emoji",
        handler: save_settings,
    },
    ActionEntry {
        id: "refresh",
        description: "reload config and stats now",
        handler: refresh,
    },
];

/// Find the table entry for `id`.
pub fn lookup(id: &str) -> Result<&'static ActionEntry, UnknownAction> {
    ACTIONS
        .iter()
        .find(|entry| entry.id == id)
        .ok_or_else(|| UnknownAction(id.to_string()))
}

/// Action id that selects `presence`.
pub fn status_action(presence: Presence) -> &'static str {
    match presence {
        Presence::Online => "status.online",
        Presence::Idle => "status.idle",
        Presence::Dnd => "status.dnd",
        Presence::Invisible => "status.invisible",
    }
}

/// Action id that flips `toggle`.
pub fn toggle_action(toggle: ToggleId) -> &'static str {
    match toggle {
        ToggleId::AutoResponder => "toggle.autoresponder",
        ToggleId::AutoEmoji => "toggle.autoemoji",
    }
}

fn toggle_autoresponder(d: &mut Dashboard) -> Vec<Request> {
    d.flip(ToggleId::AutoResponder)
}

fn toggle_autoemoji(d: &mut Dashboard) -> Vec<Request> {
    d.flip(ToggleId::AutoEmoji)
}

fn status_online(d: &mut Dashboard) -> Vec<Request> {
    d.set_status(Presence::Online)
}

fn status_idle(d: &mut Dashboard) -> Vec<Request> {
    d.set_status(Presence::Idle)
}

fn status_dnd(d: &mut Dashboard) -> Vec<Request> {
    d.set_status(Presence::Dnd)
}

fn status_invisible(d: &mut Dashboard) -> Vec<Request> {
    d.set_status(Presence::Invisible)
}

fn stop_auto_pressure(d: &mut Dashboard) -> Vec<Request> {
    d.stop_auto_pressure()
}

fn save_settings(d: &mut Dashboard) -> Vec<Request> {
    d.save_settings()
}

fn refresh(d: &mut Dashboard) -> Vec<Request> {
    d.refresh()
}
