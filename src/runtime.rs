//! # Run Loop
//!
//! Executes the [`Effect`]s a [`ShellPane`] returns against a caller-supplied
//! [`ShellHandlers`] implementation, and drives the pane from terminal
//! events and the session message channel.
//!
//! ## Threading
//!
//! - Terminal events, rendering and every handler call except connect run
//!   on the loop's task, one event at a time.
//! - The connect handshake runs on a blocking worker
//!   (`tokio::task::spawn_blocking`); its outcome comes back as a
//!   [`ShellMsg`] like any other session notification.
//! - Background producers (a PTY reader, a network client) send
//!   [`ShellMsg`]s through the sender returned by [`Runtime::sender`]. The
//!   loop drains them before every frame.

use crate::shell::{CommandSubmission, Effect, RemoteCapabilities, ShellMsg, ShellPane};
use crate::ui::clipboard::ClipboardSink;
use crate::ui::render;
use crate::ui::theme::PaneStyles;
use anyhow::{anyhow, Context, Result};
use crossterm::event::{self, Event};
use ratatui::{backend::Backend, Terminal};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

/// Callbacks into the surrounding application. Every method except
/// [`ShellHandlers::on_command`] has a no-op default.
///
/// Remote round-trips (Tab, Up, Down) are only forwarded when
/// [`ShellHandlers::capabilities`] says so; their answers arrive later as
/// [`ShellMsg::Output`].
pub trait ShellHandlers: Send + Sync + 'static {
    fn on_command(&self, submission: &CommandSubmission) -> Result<()>;

    /// Called on a blocking worker thread.
    fn on_connect(&self) -> Result<()> {
        Ok(())
    }

    fn on_disconnect(&self) -> Result<()> {
        Ok(())
    }

    fn on_resize(&self, _cols: u16, _rows: u16) -> Result<()> {
        Ok(())
    }

    fn on_tab_send(&self, _current: &str) -> Result<()> {
        Ok(())
    }

    fn on_arrow_up_send(&self, _current: &str) -> Result<()> {
        Ok(())
    }

    fn on_arrow_down_send(&self, _current: &str) -> Result<()> {
        Ok(())
    }

    fn capabilities(&self) -> RemoteCapabilities {
        RemoteCapabilities::default()
    }
}

/// Trait for reading terminal events (allows dependency injection for testing)
pub trait EventReader {
    fn read_event(&mut self, timeout: Duration) -> Result<Option<Event>>;
}

/// Production event reader that uses crossterm's event polling + read
pub struct CrosstermEventReader;

impl EventReader for CrosstermEventReader {
    fn read_event(&mut self, timeout: Duration) -> Result<Option<Event>> {
        if event::poll(timeout).context("Failed to poll for events")? {
            Ok(Some(event::read().context("Failed to read terminal event")?))
        } else {
            Ok(None)
        }
    }
}

/// Whether the loop should keep going after a batch of effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Effect executor and message pump for one pane.
pub struct Runtime<H: ShellHandlers> {
    handlers: Arc<H>,
    clipboard: Box<dyn ClipboardSink>,
    tx: UnboundedSender<ShellMsg>,
    rx: UnboundedReceiver<ShellMsg>,
    poll_timeout: Duration,
}

impl<H: ShellHandlers> Runtime<H> {
    /// `tx` and `rx` are the two ends of the session message channel; hand
    /// further clones of `tx` to background producers.
    pub fn new(
        handlers: Arc<H>,
        clipboard: Box<dyn ClipboardSink>,
        tx: UnboundedSender<ShellMsg>,
        rx: UnboundedReceiver<ShellMsg>,
    ) -> Self {
        Self {
            handlers,
            clipboard,
            tx,
            rx,
            poll_timeout: Duration::from_millis(16),
        }
    }

    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }

    /// Sender for session notifications.
    pub fn sender(&self) -> UnboundedSender<ShellMsg> {
        self.tx.clone()
    }

    /// Perform `effects` in order. Failures are reported to the pane and do
    /// not stop the batch.
    pub fn execute(&mut self, pane: &mut ShellPane, effects: Vec<Effect>) -> Flow {
        let mut flow = Flow::Continue;
        for effect in effects {
            if self.execute_one(pane, &effect) == Flow::Quit {
                flow = Flow::Quit;
            }
        }
        flow
    }

    fn execute_one(&mut self, pane: &mut ShellPane, effect: &Effect) -> Flow {
        let result = match effect {
            Effect::Connect => {
                self.spawn_connect();
                Ok(())
            }
            Effect::Disconnect => self.handlers.on_disconnect(),
            Effect::Resize { cols, rows } => self.handlers.on_resize(*cols, *rows),
            Effect::SubmitCommand(submission) => self.handlers.on_command(submission),
            Effect::SendTab(current) => self
                .handlers
                .on_tab_send(current)
                .map(|()| pane.mark_injected_buffer(current)),
            Effect::SendArrowUp(current) => self.handlers.on_arrow_up_send(current),
            Effect::SendArrowDown(current) => self.handlers.on_arrow_down_send(current),
            Effect::CopyToClipboard(text) => self.clipboard.copy(text).map_err(anyhow::Error::from),
            Effect::Quit => return Flow::Quit,
        };

        if let Err(err) = result {
            pane.report_failure(effect, format!("{:#}", err));
        }
        Flow::Continue
    }

    fn spawn_connect(&self) {
        let handlers = Arc::clone(&self.handlers);
        let tx = self.tx.clone();
        tokio::task::spawn_blocking(move || {
            let msg = match handlers.on_connect() {
                Ok(()) => ShellMsg::Connected,
                Err(err) => {
                    tracing::warn!(error = %err, "connect handler failed");
                    ShellMsg::Error(format!(
                        "{}: {:#}",
                        Effect::Connect.failure_context(),
                        err
                    ))
                }
            };
            // The receiver is gone once the loop has exited.
            let _ = tx.send(msg);
        });
    }

    /// Apply every message already queued. Returns how many were applied.
    pub fn drain_messages(&mut self, pane: &mut ShellPane) -> usize {
        let mut applied = 0;
        while let Ok(msg) = self.rx.try_recv() {
            pane.apply_message(msg);
            applied += 1;
        }
        applied
    }

    /// Wait for the next message and apply it. Returns false if the channel
    /// is closed.
    pub async fn recv_message(&mut self, pane: &mut ShellPane) -> bool {
        match self.rx.recv().await {
            Some(msg) => {
                pane.apply_message(msg);
                true
            }
            None => false,
        }
    }

    /// Run until the pane asks to quit.
    pub async fn run<B: Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        pane: &mut ShellPane,
        styles: &PaneStyles,
        event_reader: &mut dyn EventReader,
    ) -> Result<()> {
        let size = terminal
            .size()
            .map_err(|e| anyhow!("Failed to read terminal size: {}", e))?;
        let mut effects = pane.init();
        effects.extend(pane.handle(Event::Resize(size.width, size.height).into()));
        if self.execute(pane, effects) == Flow::Quit {
            return Ok(());
        }

        loop {
            self.drain_messages(pane);

            terminal
                .draw(|f| render::render(f, pane, styles))
                .map_err(|e| anyhow!("Failed to draw terminal UI: {}", e))?;

            let event = match event_reader.read_event(self.poll_timeout)? {
                Some(event) => event,
                None => {
                    // Let the connect worker and other tasks make progress.
                    tokio::task::yield_now().await;
                    continue;
                }
            };

            let effects = pane.handle(event.into());
            if self.execute(pane, effects) == Flow::Quit {
                tracing::info!(session = pane.session_id(), "run loop finished");
                return Ok(());
            }
        }
    }
}
