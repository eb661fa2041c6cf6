//! Run loop tests
//!
//! Drives `Runtime::run` with scripted terminal events and a `TestBackend`.

use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::{backend::TestBackend, Terminal};
use shellpane::runtime::{EventReader, Runtime, ShellHandlers};
use shellpane::shell::{CommandSubmission, PaneConfig, ShellError, ShellPane};
use shellpane::ui::clipboard::ClipboardSink;
use shellpane::ui::PaneStyles;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

/// Scripted events. `None` entries are idle polls; once the script runs
/// out the reader sends Ctrl+D so a broken loop cannot hang the test.
struct MockEventReader {
    events: VecDeque<Option<Event>>,
}

impl MockEventReader {
    fn new(events: Vec<Option<Event>>) -> Self {
        Self {
            events: VecDeque::from(events),
        }
    }
}

impl EventReader for MockEventReader {
    fn read_event(&mut self, _timeout: Duration) -> Result<Option<Event>> {
        Ok(self.events.pop_front().unwrap_or_else(|| Some(ctrl('d'))))
    }
}

#[derive(Default)]
struct Recorder {
    calls: Mutex<Vec<String>>,
}

impl Recorder {
    fn record(&self, call: String) {
        self.calls.lock().expect("lock").push(call);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("lock").clone()
    }
}

impl ShellHandlers for Recorder {
    fn on_command(&self, submission: &CommandSubmission) -> Result<()> {
        self.record(format!("command:{}", submission.command));
        Ok(())
    }

    fn on_disconnect(&self) -> Result<()> {
        self.record("disconnect".to_string());
        Ok(())
    }

    fn on_resize(&self, cols: u16, rows: u16) -> Result<()> {
        self.record(format!("resize:{cols}x{rows}"));
        Ok(())
    }
}

struct NullClipboard;

impl ClipboardSink for NullClipboard {
    fn copy(&mut self, _text: &str) -> Result<(), ShellError> {
        Ok(())
    }
}

fn key_event(code: KeyCode) -> Event {
    Event::Key(KeyEvent::new(code, KeyModifiers::empty()))
}

fn ctrl(c: char) -> Event {
    Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
}

fn typed(text: &str) -> Vec<Option<Event>> {
    text.chars().map(|c| Some(key_event(KeyCode::Char(c)))).collect()
}

#[tokio::test]
async fn test_run_submits_command_and_quits() {
    let handlers = Arc::new(Recorder::default());
    let (tx, rx) = mpsc::unbounded_channel();
    let mut runtime = Runtime::new(Arc::clone(&handlers), Box::new(NullClipboard), tx, rx)
        .with_poll_timeout(Duration::from_millis(1));
    let mut pane = ShellPane::new("loop", &PaneConfig::default()).expect("pane");
    let mut terminal = Terminal::new(TestBackend::new(40, 5)).expect("terminal");

    let mut events = vec![None, None];
    events.extend(typed("echo hi"));
    events.push(Some(key_event(KeyCode::Enter)));
    events.push(Some(ctrl('d')));
    let mut reader = MockEventReader::new(events);

    runtime
        .run(&mut terminal, &mut pane, &PaneStyles::default(), &mut reader)
        .await
        .expect("run");

    assert_eq!(
        handlers.calls(),
        vec!["resize:40x5", "command:echo hi", "disconnect"]
    );
    assert_eq!(pane.history(), ["echo hi"]);
    assert!(pane.quit_requested());
    assert_eq!(pane.size(), (40, 5));

    // The connect worker may finish after the loop has stopped drawing.
    if !pane.is_connected() {
        assert!(runtime.recv_message(&mut pane).await);
    }
    assert!(pane.is_connected());
}

#[tokio::test]
async fn test_run_draws_output_sent_by_producer() {
    let handlers = Arc::new(Recorder::default());
    let (tx, rx) = mpsc::unbounded_channel();
    let mut runtime = Runtime::new(Arc::clone(&handlers), Box::new(NullClipboard), tx, rx)
        .with_poll_timeout(Duration::from_millis(1));
    let mut pane = ShellPane::new("loop", &PaneConfig::default()).expect("pane");
    let mut terminal = Terminal::new(TestBackend::new(30, 4)).expect("terminal");

    runtime
        .sender()
        .send(shellpane::shell::ShellMsg::Output("hello from producer\n".to_string()))
        .expect("send");

    let mut reader = MockEventReader::new(vec![None, Some(ctrl('d'))]);
    runtime
        .run(&mut terminal, &mut pane, &PaneStyles::default(), &mut reader)
        .await
        .expect("run");

    let buffer = terminal.backend().buffer();
    let rows: Vec<String> = (0..buffer.area.height)
        .map(|y| {
            (0..buffer.area.width)
                .map(|x| buffer[(x, y)].symbol().to_string())
                .collect::<String>()
        })
        .collect();
    assert!(rows.iter().any(|r| r.starts_with("hello from producer")));
}
