//! Event loop tying the subscription, the terminal and the presenter together.
//!
//! Every accepted event is applied to the [`Presenter`] and the frame is
//! redrawn before the next event is taken. A shutdown scheduled by the
//! presenter runs at the top of the following iteration, after that frame
//! has been written.

use recipes_transport::{ChannelEvent, SubscriptionHandle};
use recipes_tui::{parse_input_events, InlineRenderer, Terminal, SPINNER_INTERVAL};
use serde_json::Value;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::app::{HostOps, Outcome, Presenter};
use crate::dispatch::EventDispatcher;
use crate::document::DocumentTheme;
use crate::error::RunError;
use crate::view::Screen;

const DRAIN_MAX_MS: u64 = 1000;
const DRAIN_IDLE_MS: u64 = 50;

#[derive(Debug)]
enum TerminalEvent {
    Input(String),
    Resize,
}

/// [`HostOps`] backed by the live dispatcher.
struct LiveHost {
    dispatcher: EventDispatcher,
    render_requested: bool,
    pending_shutdown: Option<Outcome>,
}

impl HostOps for LiveHost {
    fn create_operation(&mut self, recipe_path: &str, project_root: &str) {
        self.dispatcher.create_operation(recipe_path, project_root);
    }

    fn send_event(&mut self, event: &str, input: Option<Value>) {
        self.dispatcher.send_event(event, input.as_ref());
    }

    fn request_render(&mut self) {
        self.render_requested = true;
    }

    fn schedule_shutdown(&mut self, outcome: Outcome) {
        self.pending_shutdown.get_or_insert(outcome);
    }
}

pub struct Runtime<T: Terminal> {
    terminal: T,
    renderer: InlineRenderer,
    screen: Screen,
    presenter: Presenter,
    host: LiveHost,
}

impl<T: Terminal> Runtime<T> {
    pub fn new(
        terminal: T,
        presenter: Presenter,
        dispatcher: EventDispatcher,
        theme: DocumentTheme,
    ) -> Self {
        Self {
            terminal,
            renderer: InlineRenderer::new(),
            screen: Screen::new(theme),
            presenter,
            host: LiveHost {
                dispatcher,
                render_requested: false,
                pending_shutdown: None,
            },
        }
    }

    /// Runs until the presenter schedules a shutdown, then restores the
    /// terminal and returns how the run ended.
    pub async fn run(
        mut self,
        mut events: UnboundedReceiver<ChannelEvent>,
        mut signals: UnboundedReceiver<i32>,
        subscription: Option<SubscriptionHandle>,
    ) -> Result<Outcome, RunError> {
        let (terminal_tx, mut terminal_rx) = mpsc::unbounded_channel();
        let resize_tx = terminal_tx.clone();
        self.terminal.start(
            Box::new(move |data| {
                let _ = terminal_tx.send(TerminalEvent::Input(data));
            }),
            Box::new(move || {
                let _ = resize_tx.send(TerminalEvent::Resize);
            }),
        )?;

        let outcome = self
            .event_loop(&mut events, &mut signals, &mut terminal_rx)
            .await;

        if let Some(subscription) = subscription {
            subscription.close().await;
        }
        self.teardown(outcome)
    }

    async fn event_loop(
        &mut self,
        events: &mut UnboundedReceiver<ChannelEvent>,
        signals: &mut UnboundedReceiver<i32>,
        terminal_rx: &mut UnboundedReceiver<TerminalEvent>,
    ) -> Outcome {
        let mut ticker = tokio::time::interval(SPINNER_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut events_open = true;
        let mut signals_open = true;
        let mut terminal_open = true;

        self.render();
        loop {
            if let Some(outcome) = self.host.pending_shutdown.take() {
                return outcome;
            }

            tokio::select! {
                event = events.recv(), if events_open => match event {
                    Some(ChannelEvent::Connected) => {
                        info!("subscription connected");
                        self.presenter.on_connected(&mut self.host);
                    }
                    Some(ChannelEvent::Snapshot(raw)) => {
                        self.presenter.on_snapshot(&raw, &mut self.host);
                    }
                    Some(ChannelEvent::Disconnected { reason }) => {
                        warn!(%reason, "subscription lost, reconnecting");
                    }
                    None => {
                        debug!("subscription channel closed");
                        events_open = false;
                    }
                },
                event = terminal_rx.recv(), if terminal_open => match event {
                    Some(TerminalEvent::Input(data)) => {
                        for input in parse_input_events(&data) {
                            self.presenter.on_event(&input, &mut self.host);
                        }
                    }
                    Some(TerminalEvent::Resize) => self.host.render_requested = true,
                    None => terminal_open = false,
                },
                signal = signals.recv(), if signals_open => match signal {
                    Some(signal) => {
                        info!(signal, "exit signal received");
                        self.presenter.on_interrupt(&mut self.host);
                    }
                    None => signals_open = false,
                },
                _ = ticker.tick(), if self.presenter.needs_spinner() => {
                    self.screen.tick();
                    self.host.render_requested = true;
                }
                else => {
                    warn!("every event source closed");
                    return Outcome::Failed;
                }
            }

            if std::mem::take(&mut self.host.render_requested) {
                self.render();
            }
        }
    }

    fn render(&mut self) {
        let width = usize::from(self.terminal.columns()).max(1);
        let height = usize::from(self.terminal.rows()).max(1);
        let lines = self.screen.render(&mut self.presenter, width);
        let out = self.renderer.render(&lines, width, height);
        if !out.is_empty() {
            self.terminal.write(&out);
        }
    }

    fn teardown(&mut self, outcome: Outcome) -> Result<Outcome, RunError> {
        let tail = self.renderer.finish();
        if !tail.is_empty() {
            self.terminal.write(&tail);
        }
        self.terminal.drain_input(DRAIN_MAX_MS, DRAIN_IDLE_MS);
        self.terminal.stop()?;
        if let Some(message) = outcome.completion_message() {
            self.terminal.write(message);
        }
        debug!(?outcome, "runtime stopped");
        Ok(outcome)
    }
}
