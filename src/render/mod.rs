//! Terminal rendering of the dashboard view model.
//!
//! Rendering is a pure function of [`Dashboard`] state plus the current
//! time (for notification expiry). The controller never calls into this
//! module; hosts re-render when [`Dashboard::revision`] moves.

use std::fmt::Write as _;
use std::io::{self, Write};

use chrono::{DateTime, Utc};
use colored::{ColoredString, Colorize};

use crate::api::types::{Presence, ToggleId};
use crate::controller::actions::ACTIONS;
use crate::controller::view::{ButtonView, DashboardView, FieldId, ToggleView};
use crate::controller::Dashboard;
use crate::notify::{Level, Notification};

/// Something that can draw the dashboard.
pub trait Renderer {
    fn render(&mut self, dashboard: &Dashboard) -> io::Result<()>;
}

/// Writes a full-screen text rendering to any writer.
pub struct TerminalRenderer<W: Write> {
    out: W,
    clear_screen: bool,
    show_help: bool,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            clear_screen: false,
            show_help: false,
        }
    }

    /// Clear the terminal before each frame.
    pub fn clear_screen(mut self, on: bool) -> Self {
        self.clear_screen = on;
        self
    }

    /// Append the list of action ids to each frame.
    pub fn show_help(mut self, on: bool) -> Self {
        self.show_help = on;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn render(&mut self, dashboard: &Dashboard) -> io::Result<()> {
        let mut frame = String::new();
        if self.clear_screen {
            frame.push_str("\x1b[2J\x1b[H");
        }
        frame.push_str(&render_dashboard(dashboard, Utc::now()));
        if self.show_help {
            frame.push('\n');
            frame.push_str(&render_help());
        }
        self.out.write_all(frame.as_bytes())?;
        self.out.flush()
    }
}

/// The whole dashboard as text.
pub fn render_dashboard(dashboard: &Dashboard, now: DateTime<Utc>) -> String {
    let view = dashboard.view();
    let mut out = String::new();

    let _ = writeln!(out, "{}", "Bot Dashboard".bold().cyan());
    let _ = writeln!(out, "{}", "=".repeat(60));

    render_stats(&mut out, view);
    let _ = writeln!(out);
    render_controls(&mut out, view);
    let _ = writeln!(out);
    render_fields(&mut out, view);

    let active = dashboard.notifications().active(now);
    if !active.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", "Notifications".bold().cyan());
        for notification in active {
            let _ = writeln!(out, "  {}", render_notification(notification));
        }
    }
    out
}

fn render_stats(out: &mut String, view: &DashboardView) {
    match &view.stats {
        Some(stats) => {
            let _ = writeln!(
                out,
                "  {} {}   {} {}   {} {}   {} {}",
                "Uptime:".bold(),
                stats.uptime,
                "Commands:".bold(),
                stats.commands_handled,
                "Messages:".bold(),
                stats.messages_logged,
                "Memory:".bold(),
                stats.memory,
            );
        }
        None => {
            let _ = writeln!(out, "  {}", "Stats not loaded yet".dimmed());
        }
    }
}

fn render_controls(out: &mut String, view: &DashboardView) {
    let presences: Vec<String> = Presence::ALL
        .iter()
        .map(|&p| presence_button(p, view.presence == Some(p)).to_string())
        .collect();
    let _ = writeln!(out, "  {:<16} {}", "Status:".bold(), presences.join(" "));

    for id in [ToggleId::AutoResponder, ToggleId::AutoEmoji] {
        let _ = writeln!(
            out,
            "  {:<16} {}",
            format!("{}:", id.title()).bold(),
            toggle_box(view.toggle(id))
        );
    }

    let _ = writeln!(
        out,
        "  {:<16} {}",
        "Auto pressure:".bold(),
        button(&view.auto_pressure)
    );
}

fn render_fields(out: &mut String, view: &DashboardView) {
    for id in FieldId::ALL {
        let field = view.fields.get(id);
        let value = format!("\"{}\"", field.value);
        if field.focused {
            let _ = writeln!(
                out,
                "  {:<22} {} {}",
                id.as_str(),
                value.bold(),
                "(editing)".yellow()
            );
        } else {
            let _ = writeln!(out, "  {:<22} {}", id.as_str(), value);
        }
    }
    let _ = writeln!(out, "  {:<22} {}", "", button(&view.save));
}

/// One notification line.
pub fn render_notification(n: &Notification) -> String {
    let tag = match n.level {
        Level::Success => "ok".green().bold(),
        Level::Info => "info".blue().bold(),
        Level::Warning => "warn".yellow().bold(),
        Level::Error => "error".red().bold(),
    };
    format!("#{} [{}] {}", n.id, tag, n.message)
}

/// Action ids and how to type them in the watch loop.
pub fn render_help() -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "Commands".bold().cyan());
    for entry in ACTIONS {
        let _ = writeln!(out, "  {:<22} {}", entry.id, entry.description.dimmed());
    }
    let _ = writeln!(out, "  {:<22} {}", "edit <field> <text>", "change a field".dimmed());
    let _ = writeln!(out, "  {:<22} {}", "blur", "stop editing".dimmed());
    let _ = writeln!(out, "  {:<22} {}", "dismiss <id>", "hide a notification".dimmed());
    let _ = writeln!(out, "  {:<22} {}", "quit", "exit".dimmed());
    out
}

fn presence_button(presence: Presence, highlighted: bool) -> ColoredString {
    let label = presence_label(presence);
    if highlighted {
        format!("[{label}]").bold().reversed()
    } else {
        format!(" {label} ").dimmed()
    }
}

fn presence_label(presence: Presence) -> &'static str {
    match presence {
        Presence::Online => "Online",
        Presence::Idle => "Idle",
        Presence::Dnd => "Do Not Disturb",
        Presence::Invisible => "Invisible",
    }
}

fn toggle_box(toggle: &ToggleView) -> String {
    let mark = if toggle.checked {
        "[x] on".green().to_string()
    } else {
        "[ ] off".to_string()
    };
    if toggle.is_pending() {
        format!("{mark} {}", "(updating)".yellow())
    } else {
        mark
    }
}

fn button(b: &ButtonView) -> ColoredString {
    let text = format!("< {} >", b.label);
    if b.enabled { text.bold() } else { text.dimmed() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{Config, Stats};
    use crate::controller::Completion;

    fn loaded_dashboard() -> Dashboard {
        let mut d = Dashboard::default();
        let generation = match d.poll_tick().first() {
            Some(crate::controller::Request::FetchConfig { generation }) => *generation,
            other => panic!("unexpected {other:?}"),
        };
        d.complete(Completion::Config {
            generation,
            result: Ok(Config {
                prefix: "!".to_string(),
                auto_response_enabled: true,
                current_status: "dnd".to_string(),
                auto_pressure_active: true,
                ..Config::default()
            }),
        });
        d.complete(Completion::Stats(Ok(Stats {
            uptime_days: 2,
            uptime_hours: 5,
            uptime_minutes: 7,
            commands_handled: 1234,
            messages_logged: 56789,
            memory_usage_mb: 42.25,
        })));
        d
    }

    #[test]
    fn renders_stats_and_controls() {
        colored::control::set_override(false);
        let text = render_dashboard(&loaded_dashboard(), Utc::now());

        assert!(text.contains("2d 5h 7m"));
        assert!(text.contains("1,234"));
        assert!(text.contains("56,789"));
        assert!(text.contains("42.2 MB") || text.contains("42.3 MB"));
        assert!(text.contains("[Do Not Disturb]"));
        assert!(text.contains(" Online "));
        assert!(text.contains("[x] on"));
        assert!(text.contains("< Stop Auto Pressure >"));
        assert!(text.contains("\"!\""));
        assert!(text.contains("< Save Settings >"));
    }

    #[test]
    fn placeholder_before_first_stats() {
        colored::control::set_override(false);
        let text = render_dashboard(&Dashboard::default(), Utc::now());
        assert!(text.contains("Stats not loaded yet"));
        assert!(text.contains("< Auto Pressure Not Active >"));
        assert!(!text.contains("Notifications"));
    }

    #[test]
    fn shows_only_active_notifications() {
        colored::control::set_override(false);
        let mut d = Dashboard::default();
        let id = d.notifications_mut().error("Failed to toggle auto emoji");

        let text = render_dashboard(&d, Utc::now());
        assert!(text.contains(&format!("#{id} [error] Failed to toggle auto emoji")));

        let later = Utc::now() + chrono::Duration::seconds(60);
        assert!(!render_dashboard(&d, later).contains("Failed to toggle"));
    }

    #[test]
    fn focused_field_is_marked() {
        colored::control::set_override(false);
        let mut d = Dashboard::default();
        d.input(FieldId::AutoEmoji, "🔥");
        let text = render_dashboard(&d, Utc::now());
        assert!(text.contains("\"🔥\" (editing)"));
    }

    #[test]
    fn terminal_renderer_writes_frame() {
        colored::control::set_override(false);
        let mut r = TerminalRenderer::new(Vec::new()).show_help(true);
        r.render(&Dashboard::default()).unwrap();
        let text = String::from_utf8(r.into_inner()).unwrap();
        assert!(text.starts_with("Bot Dashboard"));
        assert!(text.contains("settings.save"));
        assert!(text.contains("dismiss <id>"));
    }
}
