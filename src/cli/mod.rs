//! CLI command implementations for botdash.
//!
//! Provides subcommand handlers for:
//! - `botdash watch` — live dashboard driven by stdin commands
//! - `botdash show` — one refresh, printed once
//! - `botdash toggle|status|stop-pressure|save` — one action, then exit
//! - `botdash actions` — list action ids
//! - `botdash config show|init|set` — configuration management

use std::io::{self, BufReader};

use anyhow::{Context, Result};
use botdash::api::types::{Config, Presence, Stats, ToggleId};
use botdash::api::RemoteConfigClient;
use botdash::config::{self, DashConfig};
use botdash::controller::actions::{self, ACTIONS};
use botdash::controller::session::Session;
use botdash::controller::{Dashboard, FieldId};
use botdash::notify::{Level, NotificationBus};
use botdash::render::{self, TerminalRenderer};
use botdash::scheduler::event_loop::{self, EventLoop};
use chrono::Utc;
use colored::Colorize;
use serde::Serialize;

/// Output format for `botdash show`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            _ => Self::Table,
        }
    }
}

fn open_session(cfg: &DashConfig) -> Session<RemoteConfigClient> {
    let client = RemoteConfigClient::from_config(&cfg.server);
    let notices = NotificationBus::with_ttl_ms(cfg.notifications.ttl_ms);
    Session::new(client, Dashboard::new(notices))
}

// ---------------------------------------------------------------------------
// botdash watch
// ---------------------------------------------------------------------------

/// Run the live dashboard until `quit` or end of input.
pub fn run_watch(cfg: &DashConfig) -> Result<()> {
    let client = RemoteConfigClient::from_config(&cfg.server);
    let notices = NotificationBus::with_ttl_ms(cfg.notifications.ttl_ms);
    let renderer = TerminalRenderer::new(io::stdout())
        .clear_screen(true)
        .show_help(true);

    let lp = EventLoop::new(client, Dashboard::new(notices), cfg.poll.interval(), renderer);
    // Blocked on stdin until exit; never joined.
    let _reader = event_loop::spawn_line_reader(BufReader::new(io::stdin()), lp.sender());

    lp.run();
    Ok(())
}

// ---------------------------------------------------------------------------
// botdash show
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct Snapshot<'a> {
    config: Option<&'a Config>,
    stats: Option<&'a Stats>,
}

pub fn run_show(cfg: &DashConfig, format: OutputFormat) -> Result<()> {
    let mut session = open_session(cfg);
    session.refresh();
    let dashboard = session.dashboard();

    match format {
        OutputFormat::Table => print!("{}", render::render_dashboard(dashboard, Utc::now())),
        OutputFormat::Json => {
            let snapshot = Snapshot {
                config: dashboard.config(),
                stats: dashboard.stats(),
            };
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
            print_notifications(dashboard, 0);
        }
    }

    fail_on_errors(dashboard, 0)
}

// ---------------------------------------------------------------------------
// One-shot actions
// ---------------------------------------------------------------------------

pub fn run_toggle(cfg: &DashConfig, toggle: ToggleId) -> Result<()> {
    run_action(cfg, actions::toggle_action(toggle), |_| {})
}

pub fn run_status(cfg: &DashConfig, presence: Presence, text: Option<String>) -> Result<()> {
    run_action(cfg, actions::status_action(presence), |d| {
        if let Some(text) = text {
            set_field(d, FieldId::CustomStatusText, text);
        }
    })
}

pub fn run_stop_pressure(cfg: &DashConfig) -> Result<()> {
    run_action(cfg, "autopressure.stop", |_| {})
}

/// Field overrides for `botdash save`. Unset fields keep the server's value.
#[derive(Debug, Default)]
pub struct SaveArgs {
    pub prefix: Option<String>,
    pub phrase: Option<String>,
    pub emoji: Option<String>,
}

pub fn run_save(cfg: &DashConfig, args: SaveArgs) -> Result<()> {
    run_action(cfg, "settings.save", |d| {
        let overrides = [
            (FieldId::Prefix, args.prefix),
            (FieldId::AutoResponsePhrase, args.phrase),
            (FieldId::AutoEmoji, args.emoji),
        ];
        for (field, value) in overrides {
            if let Some(value) = value {
                set_field(d, field, value);
            }
        }
    })
}

/// Refresh, let `prepare` fill in fields, dispatch `action_id`, drive it to
/// completion and print what happened.
fn run_action(
    cfg: &DashConfig,
    action_id: &str,
    prepare: impl FnOnce(&mut Dashboard),
) -> Result<()> {
    let mut session = open_session(cfg);
    session.refresh();
    prepare(session.dashboard_mut());

    let mark = session
        .dashboard()
        .notifications()
        .latest()
        .map_or(0, |n| n.id);
    let executed = session.dispatch(action_id)?;

    let dashboard = session.dashboard();
    if executed == 0 {
        println!(
            "{}",
            format!("'{action_id}' is not available right now.").yellow()
        );
    }
    print_notifications(dashboard, 0);
    fail_on_errors(dashboard, mark)
}

fn set_field(d: &mut Dashboard, field: FieldId, value: String) {
    d.input(field, value);
    d.blur(field);
}

// ---------------------------------------------------------------------------
// botdash actions
// ---------------------------------------------------------------------------

pub fn run_actions() {
    println!("{}", "Actions".bold().cyan());
    println!("{}", "=".repeat(60));
    for entry in ACTIONS {
        println!("  {:<22} {}", entry.id, entry.description);
    }
}

// ---------------------------------------------------------------------------
// botdash config
// ---------------------------------------------------------------------------

pub fn run_config_show() -> Result<()> {
    let sources = [
        ("global", config::global_config_file()),
        ("project", config::project_config_file()),
    ];
    for (label, path) in sources {
        let line = match path {
            Some(p) if p.exists() => format!("# {label}: {}", p.display()),
            Some(p) => format!("# {label}: {} (not found)", p.display()),
            None => format!("# {label}: unavailable"),
        };
        println!("{}", line.dimmed());
    }
    print!("{}", config::show_effective_config()?);
    Ok(())
}

pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!("{} {}", "Wrote".green(), path.display());
    Ok(())
}

pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    let path = config::set_config_value(key, value)
        .with_context(|| format!("failed to set '{key}'"))?;
    println!("{} {key} = {value} in {}", "Set".green(), path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn print_notifications(dashboard: &Dashboard, after: u64) {
    for n in dashboard.notifications().since(after) {
        println!("{}", render::render_notification(n));
    }
}

/// Error out if any error notification was raised after `after`.
fn fail_on_errors(dashboard: &Dashboard, after: u64) -> Result<()> {
    let first_error = dashboard
        .notifications()
        .since(after)
        .find(|n| n.level == Level::Error);
    match first_error {
        Some(n) => anyhow::bail!("{}", n.message),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parsing() {
        assert_eq!(OutputFormat::from_str_opt(None), OutputFormat::Table);
        assert_eq!(OutputFormat::from_str_opt(Some("json")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str_opt(Some("csv")), OutputFormat::Table);
    }

    #[test]
    fn fail_on_errors_only_counts_after_mark() {
        let mut d = Dashboard::default();
        let early = d.notifications_mut().error("Failed to load configuration");
        d.notifications_mut().success("Status updated to idle");

        assert!(fail_on_errors(&d, early).is_ok());
        let err = fail_on_errors(&d, 0).unwrap_err();
        assert_eq!(err.to_string(), "Failed to load configuration");
    }

    #[test]
    fn set_field_leaves_nothing_focused() {
        let mut d = Dashboard::default();
        set_field(&mut d, FieldId::Prefix, "?".to_string());
        assert_eq!(d.view().fields.prefix.value, "?");
        assert_eq!(d.view().fields.focused(), None);
    }
}
