//! Threaded host for the dashboard controller.
//!
//! One loop thread owns the [`Dashboard`] and is the only place handlers
//! run. Every request is executed on its own short-lived worker thread, so
//! requests overlap freely; their completions come back over a channel
//! together with operator input lines and are applied one at a time.

use std::io::BufRead;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use chrono::Utc;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use thiserror::Error;

use crate::api::client::Backend;
use crate::controller::actions::ACTIONS;
use crate::controller::view::FieldId;
use crate::controller::{Completion, Dashboard, Request};
use crate::notify::Level;
use crate::render::Renderer;

use super::{CancellationToken, PollScheduler};

/// Upper bound on how long the loop sleeps, so expired notifications
/// disappear promptly.
const HOUSEKEEPING_PERIOD: Duration = Duration::from_millis(250);

/// Everything the loop thread reacts to besides the clock.
#[derive(Debug)]
pub enum Event {
    Completed(Completion),
    Input(String),
    Shutdown,
}

// ---------------------------------------------------------------------------
// Operator commands
// ---------------------------------------------------------------------------

/// A parsed operator input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Any id from the action table.
    Action(String),
    Edit { field: FieldId, text: String },
    Focus(FieldId),
    Blur,
    Dismiss(u64),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown field '{0}'")]
    UnknownField(String),
    #[error("usage: {0}")]
    Usage(&'static str),
}

/// Parse one input line. Blank lines yield `None`.
///
/// `edit <field> <text>` keeps the text verbatim after the first space
/// following the field name, so leading blanks inside it survive.
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim_end_matches(['\r', '\n']);
    let trimmed = line.trim_start();
    let (word, rest) = trimmed.split_once(' ').unwrap_or((trimmed, ""));

    let command = match word {
        "" => return Ok(None),
        "quit" | "exit" | "q" => Command::Quit,
        "help" | "?" => Command::Help,
        "blur" => Command::Blur,
        "focus" => Command::Focus(parse_field(rest.trim(), "focus <field>")?),
        "edit" => {
            let (name, text) = rest.split_once(' ').unwrap_or((rest, ""));
            Command::Edit {
                field: parse_field(name.trim(), "edit <field> <text>")?,
                text: text.to_string(),
            }
        }
        "dismiss" => {
            let id = rest
                .trim()
                .parse()
                .map_err(|_| CommandError::Usage("dismiss <id>"))?;
            Command::Dismiss(id)
        }
        other => Command::Action(other.to_string()),
    };
    Ok(Some(command))
}

fn parse_field(name: &str, usage: &'static str) -> Result<FieldId, CommandError> {
    if name.is_empty() {
        return Err(CommandError::Usage(usage));
    }
    name.parse()
        .map_err(|_| CommandError::UnknownField(name.to_string()))
}

// ---------------------------------------------------------------------------
// Loop
// ---------------------------------------------------------------------------

pub struct EventLoop<B, R> {
    backend: Arc<B>,
    dashboard: Dashboard,
    scheduler: PollScheduler,
    renderer: R,
    tx: Sender<Event>,
    rx: Receiver<Event>,
    in_flight: usize,
    rendered: Option<u64>,
}

impl<B, R> EventLoop<B, R>
where
    B: Backend + Send + Sync + 'static,
    R: Renderer,
{
    pub fn new(backend: B, dashboard: Dashboard, interval: Duration, renderer: R) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self {
            backend: Arc::new(backend),
            dashboard,
            scheduler: PollScheduler::new(interval, CancellationToken::new()),
            renderer,
            tx,
            rx,
            in_flight: 0,
            rendered: None,
        }
    }

    /// Channel for feeding input lines or a shutdown from other threads.
    pub fn sender(&self) -> Sender<Event> {
        self.tx.clone()
    }

    /// Cancelling this token ends [`EventLoop::run`] and stops polling.
    pub fn token(&self) -> CancellationToken {
        self.scheduler.token().clone()
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    /// Requests currently executing on worker threads.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Run until cancelled. Returns the final controller state.
    pub fn run(mut self) -> Dashboard {
        let token = self.token();
        self.scheduler.start(Instant::now());
        tracing::info!(interval_ms = self.scheduler.interval().as_millis() as u64, "event loop started");

        while !token.is_cancelled() {
            self.tick(Instant::now());
            if let Some(event) = self.next_event(self.wait_time(Instant::now())) {
                self.process(event);
            }
        }

        tracing::info!(
            in_flight = self.in_flight,
            pending_actions = self.dashboard.has_pending_actions(),
            "event loop stopped"
        );
        self.dashboard
    }

    /// Clock-driven work: fire a due poll, expire notifications, redraw.
    pub fn tick(&mut self, now: Instant) {
        if self.scheduler.fire(now) {
            let requests = self.dashboard.poll_tick();
            self.spawn(requests);
        }
        self.dashboard.prune_notifications(Utc::now());
        self.redraw();
    }

    /// Wait up to `timeout` for the next event.
    pub fn next_event(&self, timeout: Duration) -> Option<Event> {
        match self.rx.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) => None,
            // The loop holds a sender itself, so this cannot happen while it
            // is alive.
            Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Apply one event on the loop thread.
    pub fn process(&mut self, event: Event) {
        match event {
            Event::Completed(completion) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                let follow_ups = self.dashboard.complete(completion);
                self.spawn(follow_ups);
            }
            Event::Input(line) => self.handle_input(&line),
            Event::Shutdown => self.scheduler.cancel(),
        }
        self.redraw();
    }

    fn wait_time(&self, now: Instant) -> Duration {
        self.scheduler
            .time_until_due(now)
            .map_or(HOUSEKEEPING_PERIOD, |d| d.min(HOUSEKEEPING_PERIOD))
    }

    fn handle_input(&mut self, line: &str) {
        let command = match parse_command(line) {
            Ok(Some(command)) => command,
            Ok(None) => return,
            Err(e) => {
                self.dashboard.notify(Level::Warning, e.to_string());
                return;
            }
        };
        tracing::debug!(?command, "operator command");

        match command {
            Command::Action(id) => match self.dashboard.dispatch(&id) {
                Ok(requests) => self.spawn(requests),
                Err(e) => {
                    self.dashboard.notify(Level::Warning, e.to_string());
                }
            },
            Command::Edit { field, text } => self.dashboard.input(field, text),
            Command::Focus(field) => self.dashboard.focus(field),
            Command::Blur => {
                if let Some(field) = self.dashboard.view().fields.focused() {
                    self.dashboard.blur(field);
                }
            }
            Command::Dismiss(id) => {
                if !self.dashboard.dismiss_notification(id) {
                    tracing::debug!(id, "nothing to dismiss");
                }
            }
            Command::Help => {
                let ids: Vec<&str> = ACTIONS.iter().map(|a| a.id).collect();
                self.dashboard
                    .notify(Level::Info, format!("actions: {}", ids.join(", ")));
            }
            Command::Quit => self.scheduler.cancel(),
        }
    }

    fn spawn(&mut self, requests: Vec<Request>) {
        for request in requests {
            let backend = Arc::clone(&self.backend);
            let tx = self.tx.clone();
            self.in_flight += 1;
            tracing::trace!(kind = request.kind(), "spawning request");
            thread::spawn(move || {
                let completion = request.execute(backend.as_ref());
                // The loop may already be gone on shutdown.
                let _ = tx.send(Event::Completed(completion));
            });
        }
    }

    fn redraw(&mut self) {
        let revision = self.dashboard.revision();
        if self.rendered == Some(revision) {
            return;
        }
        if let Err(e) = self.renderer.render(&self.dashboard) {
            tracing::warn!(error = %e, "render failed");
        }
        self.rendered = Some(revision);
    }
}

/// Forward lines from `reader` as [`Event::Input`]. Sends
/// [`Event::Shutdown`] at end of input.
pub fn spawn_line_reader<Rd>(reader: Rd, tx: Sender<Event>) -> JoinHandle<()>
where
    Rd: BufRead + Send + 'static,
{
    thread::spawn(move || {
        for line in reader.lines() {
            match line {
                Ok(line) => {
                    if tx.send(Event::Input(line)).is_err() {
                        return;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "reading input failed");
                    break;
                }
            }
        }
        let _ = tx.send(Event::Shutdown);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::ApiError;
    use crate::api::types::{
        Config, ConfigUpdate, MessageResponse, Stats, StatusRequest, StopResponse, ToggleId,
    };
    use std::io::{self, Cursor};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeBackend {
        config: Mutex<Config>,
    }

    impl Backend for FakeBackend {
        fn fetch_config(&self) -> Result<Config, ApiError> {
            Ok(self.config.lock().unwrap().clone())
        }

        fn fetch_stats(&self) -> Result<Stats, ApiError> {
            Ok(Stats::default())
        }

        fn toggle(&self, id: ToggleId) -> Result<MessageResponse, ApiError> {
            let mut config = self.config.lock().unwrap();
            let enabled = match id {
                ToggleId::AutoResponder => {
                    config.auto_response_enabled = !config.auto_response_enabled;
                    config.auto_response_enabled
                }
                ToggleId::AutoEmoji => {
                    config.auto_emoji_enabled = !config.auto_emoji_enabled;
                    config.auto_emoji_enabled
                }
            };
            Ok(MessageResponse {
                message: String::new(),
                enabled: Some(enabled),
            })
        }

        fn set_status(&self, _: &StatusRequest) -> Result<MessageResponse, ApiError> {
            Ok(MessageResponse::default())
        }

        fn stop_auto_pressure(&self) -> Result<StopResponse, ApiError> {
            Ok(StopResponse::default())
        }

        fn update_config(&self, update: &ConfigUpdate) -> Result<Config, ApiError> {
            let mut config = self.config.lock().unwrap();
            if let Some(prefix) = &update.prefix {
                config.prefix = prefix.clone();
            }
            Ok(config.clone())
        }
    }

    #[derive(Default)]
    struct CountingRenderer {
        frames: usize,
    }

    impl Renderer for CountingRenderer {
        fn render(&mut self, _: &Dashboard) -> io::Result<()> {
            self.frames += 1;
            Ok(())
        }
    }

    fn drain<B, R>(lp: &mut EventLoop<B, R>)
    where
        B: Backend + Send + Sync + 'static,
        R: Renderer,
    {
        let deadline = Instant::now() + Duration::from_secs(5);
        while lp.in_flight() > 0 && Instant::now() < deadline {
            if let Some(event) = lp.next_event(Duration::from_millis(100)) {
                lp.process(event);
            }
        }
        assert_eq!(lp.in_flight(), 0, "requests did not finish");
    }

    fn new_loop() -> EventLoop<FakeBackend, CountingRenderer> {
        EventLoop::new(
            FakeBackend::default(),
            Dashboard::default(),
            Duration::from_secs(60),
            CountingRenderer::default(),
        )
    }

    #[test]
    fn parse_commands() {
        assert_eq!(parse_command("  "), Ok(None));
        assert_eq!(parse_command("quit"), Ok(Some(Command::Quit)));
        assert_eq!(
            parse_command("settings.save\n"),
            Ok(Some(Command::Action("settings.save".to_string())))
        );
        assert_eq!(
            parse_command("edit prefix  ?? "),
            Ok(Some(Command::Edit {
                field: FieldId::Prefix,
                text: " ?? ".to_string()
            }))
        );
        assert_eq!(
            parse_command("edit text"),
            Ok(Some(Command::Edit {
                field: FieldId::CustomStatusText,
                text: String::new()
            }))
        );
        assert_eq!(parse_command("dismiss 4"), Ok(Some(Command::Dismiss(4))));
        assert_eq!(
            parse_command("dismiss four"),
            Err(CommandError::Usage("dismiss <id>"))
        );
        assert_eq!(
            parse_command("edit colour red"),
            Err(CommandError::UnknownField("colour".to_string()))
        );
        assert_eq!(parse_command("edit"), Err(CommandError::Usage("edit <field> <text>")));
    }

    #[test]
    fn first_tick_polls_and_renders() {
        let mut lp = new_loop();
        lp.scheduler.start(Instant::now());
        lp.tick(Instant::now());
        assert_eq!(lp.in_flight(), 2);
        assert_eq!(lp.renderer.frames, 1);

        drain(&mut lp);
        assert!(lp.dashboard().config().is_some());
        assert!(lp.dashboard().view().stats.is_some());
    }

    #[test]
    fn toggle_round_trip_through_workers() {
        let mut lp = new_loop();
        lp.process(Event::Input("toggle.autoemoji".to_string()));
        assert!(lp.dashboard().view().auto_emoji.checked);
        assert!(lp.dashboard().view().auto_emoji.is_pending());

        drain(&mut lp);
        let view = lp.dashboard().view();
        assert!(view.auto_emoji.checked);
        assert!(!view.auto_emoji.is_pending());
        assert!(lp.dashboard().config().unwrap().auto_emoji_enabled);
    }

    #[test]
    fn edit_and_save() {
        let mut lp = new_loop();
        lp.process(Event::Input("edit prefix ?".to_string()));
        lp.process(Event::Input("settings.save".to_string()));
        drain(&mut lp);

        assert_eq!(lp.dashboard().config().unwrap().prefix, "?");
        assert_eq!(
            lp.dashboard().notifications().latest().unwrap().message,
            "Settings saved successfully"
        );
    }

    #[test]
    fn unknown_action_warns() {
        let mut lp = new_loop();
        lp.process(Event::Input("launch".to_string()));
        let latest = lp.dashboard().notifications().latest().unwrap();
        assert_eq!(latest.message, "unknown action 'launch'");
        assert_eq!(lp.in_flight(), 0);
    }

    #[test]
    fn quit_and_shutdown_cancel() {
        let mut lp = new_loop();
        let token = lp.token();
        lp.process(Event::Input("quit".to_string()));
        assert!(token.is_cancelled());

        let mut lp = new_loop();
        let token = lp.token();
        lp.process(Event::Shutdown);
        assert!(token.is_cancelled());
    }

    #[test]
    fn run_exits_on_end_of_input() {
        let lp = new_loop();
        let reader = spawn_line_reader(Cursor::new("focus phrase\nblur\n"), lp.sender());
        let dashboard = lp.run();
        reader.join().unwrap();

        assert_eq!(dashboard.view().fields.focused(), None);
    }

    #[test]
    fn redraw_only_on_revision_change() {
        let mut lp = new_loop();
        lp.redraw();
        lp.redraw();
        assert_eq!(lp.renderer.frames, 1);
        lp.process(Event::Input("focus emoji".to_string()));
        assert_eq!(lp.renderer.frames, 2);
    }
}
