//! # Shell Pane
//!
//! [`ShellPane`] owns every piece of pane state and exposes a single entry
//! point, [`ShellPane::handle`], that applies one event and returns the side
//! effects the caller must perform. The pane never performs I/O itself, so
//! it can be driven from tests with synthetic events.
//!
//! ## Key routing (highest priority first)
//!
//! | Key | Action |
//! |-----|--------|
//! | `Ctrl+C` | Clear the selection if any, otherwise clear the input line |
//! | `Ctrl+L` | Clear the output log |
//! | `Esc` | Clear the selection |
//! | `Ctrl+D` | Disconnect and quit |
//! | `Tab` | Forward to the remote side for completion |
//! | `Up` / `Down` | Remote history if supported, local history otherwise |
//! | `Enter` | Submit the input line |
//! | anything else | Edit the input line |

use crate::shell::ansi::{normalize, PromptDetector, PromptPattern};
use crate::shell::error::ShellError;
use crate::shell::event::{CommandSubmission, Effect, PaneEvent, ShellMsg};
use crate::shell::history::History;
use crate::shell::input::InputField;
use crate::shell::output::{DisplayLine, LineKind, OutputSink};
use crate::shell::pending::{completion_text, history_text, PendingRequests};
use crate::shell::selection::{FlatContent, Selection};
use crate::shell::viewport::Viewport;
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use std::fmt::Display;
use std::time::{Duration, Instant};
use unicode_width::UnicodeWidthStr;

/// Shown until the first resize tells the pane its size.
pub const INITIALIZING_TEXT: &str = "Initializing shell...";

/// Construction-time settings. Immutable once the pane is built.
#[derive(Debug, Clone)]
pub struct PaneConfig {
    pub max_output_lines: usize,
    pub max_history: usize,
    pub double_click: Duration,
    pub wheel_delta: usize,
    pub default_prompt: String,
    pub prompt_patterns: Vec<PromptPattern>,
    pub initial_input_width: usize,
    /// Viewport height until the first resize.
    pub initial_height: u16,
}

impl Default for PaneConfig {
    fn default() -> Self {
        Self {
            max_output_lines: 1000,
            max_history: 100,
            double_click: Duration::from_millis(300),
            wheel_delta: 3,
            default_prompt: "$ ".to_string(),
            prompt_patterns: PromptPattern::defaults(),
            initial_input_width: 50,
            initial_height: 20,
        }
    }
}

/// Which round-trips the remote side can answer. Without a capability the
/// corresponding key falls back to local behaviour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemoteCapabilities {
    pub tab_completion: bool,
    pub history: bool,
}

/// Drops the remote echo of a locally echoed command, once.
#[derive(Debug, Clone, Default)]
struct EchoSuppression {
    target: String,
    armed: bool,
}

impl EchoSuppression {
    fn arm(&mut self, command: &str) {
        self.target = command.to_string();
        self.armed = true;
    }

    /// True if `line` should be dropped; disarms on the first match.
    fn suppress(&mut self, line: &str) -> bool {
        if self.armed && line == self.target {
            self.armed = false;
            return true;
        }
        false
    }
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone)]
pub struct PaneFrame {
    /// Output lines followed by the live input line.
    pub lines: Vec<DisplayLine>,
    /// Ordered character range to highlight, already bounds-checked.
    pub selection: Option<(usize, usize)>,
    pub y_offset: usize,
    /// Cursor cell within the input line.
    pub cursor_col: usize,
}

/// Interactive shell pane state.
pub struct ShellPane {
    session_id: String,
    connected: bool,
    sink: OutputSink,
    detector: PromptDetector,
    prompt: String,
    input: InputField,
    history: History,
    pending: PendingRequests,
    echo: EchoSuppression,
    selection: Selection,
    viewport: Viewport,
    width: u16,
    height: u16,
    origin: (u16, u16),
    double_click: Duration,
    remote: RemoteCapabilities,
    quit: bool,
}

impl ShellPane {
    pub fn new(session_id: &str, config: &PaneConfig) -> Result<Self, ShellError> {
        let detector = PromptDetector::new(&config.prompt_patterns)?;
        Ok(Self {
            session_id: session_id.to_string(),
            connected: false,
            sink: OutputSink::new(config.max_output_lines),
            detector,
            prompt: config.default_prompt.clone(),
            input: InputField::new(config.initial_input_width),
            history: History::new(config.max_history),
            pending: PendingRequests::new(),
            echo: EchoSuppression::default(),
            selection: Selection::new(),
            viewport: Viewport::new(config.initial_height, config.wheel_delta),
            width: 0,
            height: 0,
            origin: (0, 0),
            double_click: config.double_click,
            remote: RemoteCapabilities::default(),
            quit: false,
        })
    }

    pub fn with_remote(mut self, remote: RemoteCapabilities) -> Self {
        self.remote = remote;
        self
    }

    /// Effects to run once before the first event.
    pub fn init(&mut self) -> Vec<Effect> {
        vec![Effect::Connect]
    }

    pub fn handle(&mut self, event: PaneEvent) -> Vec<Effect> {
        self.handle_at(event, Instant::now())
    }

    /// [`Self::handle`] with an explicit clock for click-rate detection.
    pub fn handle_at(&mut self, event: PaneEvent, now: Instant) -> Vec<Effect> {
        match event {
            PaneEvent::Message(msg) => {
                self.apply_message(msg);
                Vec::new()
            }
            PaneEvent::Terminal(Event::Key(key)) => self.handle_key(key),
            PaneEvent::Terminal(Event::Mouse(mouse)) => self.handle_mouse(mouse, now),
            PaneEvent::Terminal(Event::Resize(cols, rows)) => self.resize(cols, rows),
            PaneEvent::Terminal(Event::Paste(text)) => {
                self.input.insert_str(&text);
                Vec::new()
            }
            PaneEvent::Terminal(_) => Vec::new(),
        }
    }

    pub fn apply_message(&mut self, msg: ShellMsg) {
        match msg {
            ShellMsg::Output(raw) => {
                if self.pending.completion_pending() {
                    self.apply_completion_text(&raw);
                } else if self.pending.history_pending() {
                    self.apply_history_text(&raw);
                } else {
                    self.add_output(&raw);
                }
            }
            ShellMsg::Error(text) => self.add_error(&text),
            ShellMsg::Connected => {
                self.connected = true;
                tracing::info!(session = %self.session_id, "shell session connected");
                let banner = format!("Connected to shell session: {}", self.session_id);
                self.append_lines(vec![DisplayLine::session(banner)]);
            }
            ShellMsg::Disconnected => {
                self.connected = false;
                tracing::info!(session = %self.session_id, "shell session disconnected");
                self.append_lines(vec![DisplayLine::error("Disconnected from shell session")]);
            }
            ShellMsg::PromptChanged(prompt) => self.set_prompt(&prompt),
        }
    }

    /// Record that an effect failed. The failure becomes an error line and
    /// any request waiting on that effect is abandoned.
    pub fn report_failure(&mut self, effect: &Effect, err: impl Display) {
        match effect {
            Effect::SendTab(_) => self.pending.clear_completion(),
            Effect::SendArrowUp(_) | Effect::SendArrowDown(_) => self.pending.clear_history(),
            _ => {}
        }
        tracing::warn!(context = effect.failure_context(), error = %err, "handler failed");
        self.add_error(&format!("{}: {}", effect.failure_context(), err));
    }

    // ------------------------------------------------------------------
    // Keyboard
    // ------------------------------------------------------------------

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        if key.kind == KeyEventKind::Release {
            return Vec::new();
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Char('c') if ctrl => {
                if self.has_selection() {
                    self.clear_selection();
                } else {
                    self.input.clear();
                    self.history.reset_navigation();
                }
                Vec::new()
            }
            KeyCode::Char('l') if ctrl => {
                self.clear_output();
                Vec::new()
            }
            KeyCode::Esc => {
                if self.has_selection() {
                    self.clear_selection();
                }
                Vec::new()
            }
            KeyCode::Char('d') if ctrl => {
                self.quit = true;
                vec![Effect::Disconnect, Effect::Quit]
            }
            KeyCode::Tab => {
                if !self.remote.tab_completion {
                    return Vec::new();
                }
                self.pending.begin_completion();
                vec![Effect::SendTab(self.input.value().to_string())]
            }
            KeyCode::Up if self.remote.history => {
                self.pending.begin_history();
                vec![Effect::SendArrowUp(self.input.value().to_string())]
            }
            KeyCode::Down if self.remote.history => {
                self.pending.begin_history();
                vec![Effect::SendArrowDown(self.input.value().to_string())]
            }
            KeyCode::Up => {
                let current = self.input.value().to_string();
                if let Some(entry) = self.history.previous(&current).map(str::to_string) {
                    self.input.set_value(&entry);
                }
                Vec::new()
            }
            KeyCode::Down => {
                if let Some(entry) = self.history.next() {
                    self.input.set_value(&entry);
                }
                Vec::new()
            }
            KeyCode::Enter => self.submit(),
            _ => {
                if self.input.handle_key(key) {
                    self.history.reset_navigation();
                }
                Vec::new()
            }
        }
    }

    fn submit(&mut self) -> Vec<Effect> {
        let command = self.input.value().to_string();
        if command.is_empty() {
            return Vec::new();
        }

        self.history.push(&command);
        let already_sent = self.pending.remote_buffer_matches(&command);
        self.echo_command_line(&command);
        self.pending.clear_injected();
        self.input.clear();

        tracing::debug!(command = %command, already_sent, "command submitted");
        vec![Effect::SubmitCommand(CommandSubmission {
            command,
            already_sent,
        })]
    }

    /// Show `prompt + command` immediately and drop the remote's copy of
    /// the command line when it arrives.
    fn echo_command_line(&mut self, command: &str) {
        self.append_lines(vec![DisplayLine::echo(&self.prompt, command)]);
        self.echo.arm(command);
    }

    // ------------------------------------------------------------------
    // Mouse
    // ------------------------------------------------------------------

    fn handle_mouse(&mut self, mouse: MouseEvent, now: Instant) -> Vec<Effect> {
        let x = mouse.column.saturating_sub(self.origin.0) as usize;
        let y = mouse.row.saturating_sub(self.origin.1) as usize;

        match mouse.kind {
            MouseEventKind::ScrollUp | MouseEventKind::ScrollDown => {
                let total = self.content_line_count();
                self.viewport
                    .wheel(mouse.kind == MouseEventKind::ScrollUp, total);
            }
            MouseEventKind::Down(MouseButton::Left) => {
                let content = self.flat_content();
                let offset = self.click_offset(&content, x, y);
                self.selection
                    .press(offset, now, self.double_click, &content);
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if self.selection.is_selecting() {
                    let content = self.flat_content();
                    let offset = self.click_offset(&content, x, y);
                    self.selection.drag(offset);
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let content = self.flat_content();
                let offset = self.click_offset(&content, x, y);
                if let Some(text) = self.selection.release(offset, &content) {
                    return vec![Effect::CopyToClipboard(text)];
                }
            }
            _ => {}
        }
        Vec::new()
    }

    /// Character offset under pane cell `(x, y)`, accounting for scroll.
    fn click_offset(&self, content: &FlatContent, x: usize, y: usize) -> usize {
        content.offset_at(y + self.viewport.y_offset(), x)
    }

    // ------------------------------------------------------------------
    // Geometry
    // ------------------------------------------------------------------

    fn resize(&mut self, cols: u16, rows: u16) -> Vec<Effect> {
        self.width = cols;
        self.height = rows;
        self.viewport.set_height(rows);
        self.fit_input_width();
        vec![Effect::Resize { cols, rows }]
    }

    fn fit_input_width(&mut self) {
        if self.width > 0 {
            let width = (self.width as usize).saturating_sub(self.prompt.width());
            self.input.set_width(width);
        }
    }

    /// Top-left cell of the pane on screen; mouse coordinates are taken
    /// relative to it.
    pub fn set_origin(&mut self, x: u16, y: u16) {
        self.origin = (x, y);
    }

    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    // ------------------------------------------------------------------
    // Output
    // ------------------------------------------------------------------

    /// Normalize a raw chunk into the output log, updating the prompt when
    /// the chunk ends with one.
    pub fn add_output(&mut self, raw: &str) {
        let normalized = normalize(raw, &self.detector);
        let lines: Vec<DisplayLine> = normalized
            .lines
            .into_iter()
            .filter(|line| !self.echo.suppress(line))
            .map(DisplayLine::output)
            .collect();
        self.append_lines(lines);

        if let Some(prompt) = normalized.prompt {
            self.set_prompt(&format!("{} ", prompt));
        }
    }

    pub fn add_error(&mut self, text: &str) {
        self.append_lines(vec![DisplayLine::error(format!("ERROR: {}", text))]);
    }

    fn append_lines(&mut self, lines: Vec<DisplayLine>) {
        if let Some(first_new) = self.sink.append(lines) {
            self.viewport.anchor_to(first_new);
        }
    }

    pub fn clear_output(&mut self) {
        self.sink.clear();
    }

    /// Shared handle for producers that append lines directly.
    pub fn sink(&self) -> OutputSink {
        self.sink.clone()
    }

    // ------------------------------------------------------------------
    // Prompt and input
    // ------------------------------------------------------------------

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn set_prompt(&mut self, prompt: &str) {
        if prompt != self.prompt {
            tracing::debug!(prompt, "prompt changed");
        }
        self.prompt = prompt.to_string();
        self.fit_input_width();
    }

    pub fn input_value(&self) -> &str {
        self.input.value()
    }

    pub fn set_input_value(&mut self, value: &str) {
        self.input.set_value(value);
    }

    pub fn input_width(&self) -> usize {
        self.input.width()
    }

    pub fn history(&self) -> &[String] {
        self.history.entries()
    }

    // ------------------------------------------------------------------
    // Pending requests
    // ------------------------------------------------------------------

    pub fn completion_pending(&self) -> bool {
        self.pending.completion_pending()
    }

    pub fn history_pending(&self) -> bool {
        self.pending.history_pending()
    }

    pub fn clear_completion_pending(&mut self) {
        self.pending.clear_completion();
    }

    pub fn clear_history_pending(&mut self) {
        self.pending.clear_history();
    }

    /// Resolve a pending completion with a raw response chunk.
    pub fn apply_completion_text(&mut self, raw: &str) {
        if let Some(text) = completion_text(raw) {
            tracing::debug!(completion = %text, "completion applied");
            self.input.set_value(&text);
        }
        self.pending.clear_completion();
    }

    /// Resolve a pending history recall with a raw response chunk.
    pub fn apply_history_text(&mut self, raw: &str) {
        let text = history_text(raw);
        tracing::debug!(entry = %text, "history entry applied");
        self.input.set_value(&text);
        self.pending.clear_history();
    }

    pub fn mark_injected_buffer(&mut self, current: &str) {
        self.pending.mark_injected(current);
    }

    pub fn remote_buffer_matches(&self, current: &str) -> bool {
        self.pending.remote_buffer_matches(current)
    }

    pub fn clear_injected_buffer(&mut self) {
        self.pending.clear_injected();
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    pub fn has_selection(&self) -> bool {
        self.selection.has_selection()
    }

    pub fn is_selecting(&self) -> bool {
        self.selection.is_selecting()
    }

    pub fn selection_range(&self) -> (usize, usize) {
        self.selection.range()
    }

    pub fn selected_text(&self) -> Option<String> {
        self.selection.selected_text(&self.flat_content())
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    // ------------------------------------------------------------------
    // Session
    // ------------------------------------------------------------------

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    pub fn follow(&self) -> bool {
        self.viewport.follow()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    fn input_line(&self) -> DisplayLine {
        DisplayLine {
            text: format!("{}{}", self.prompt, self.input.view_text()),
            kind: LineKind::Input {
                prompt_chars: self.prompt.chars().count(),
            },
        }
    }

    fn content_line_count(&self) -> usize {
        self.sink.len() + 1
    }

    /// Output lines plus the live input line, as displayed.
    pub fn content_lines(&self) -> Vec<DisplayLine> {
        let mut lines = self.sink.snapshot();
        lines.push(self.input_line());
        lines
    }

    /// The flattened text that selection offsets refer to.
    pub fn flat_content(&self) -> FlatContent {
        FlatContent::new(self.content_lines().into_iter().map(|l| l.text).collect())
    }

    /// Compose the next frame and settle the scroll position for it.
    pub fn frame(&mut self) -> PaneFrame {
        let lines = self.content_lines();
        self.viewport.sync(lines.len());

        let content = FlatContent::new(lines.iter().map(|l| l.text.clone()).collect());
        PaneFrame {
            selection: self.selection.within(&content),
            y_offset: self.viewport.y_offset(),
            cursor_col: self.prompt.width() + self.input.view_cursor(),
            lines,
        }
    }

    /// Plain-text rendering of the visible window.
    pub fn view(&mut self) -> String {
        if self.width == 0 {
            return INITIALIZING_TEXT.to_string();
        }
        let frame = self.frame();
        let height = self.viewport.height() as usize;
        frame
            .lines
            .iter()
            .skip(frame.y_offset)
            .take(height)
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pane() -> ShellPane {
        ShellPane::new("test", &PaneConfig::default()).expect("default config")
    }

    fn output_texts(pane: &ShellPane) -> Vec<String> {
        pane.sink().snapshot().into_iter().map(|l| l.text).collect()
    }

    #[test]
    fn test_prompt_line_is_not_output() {
        let mut pane = pane();
        pane.add_output("total 12\ndrwx root\nuser@host:/tmp$ ");
        assert_eq!(output_texts(&pane), vec!["total 12", "drwx root"]);
        assert_eq!(pane.prompt(), "user@host:/tmp$ ");
    }

    #[test]
    fn test_chunk_without_prompt_keeps_prompt() {
        let mut pane = pane();
        pane.add_output("building...\n");
        assert_eq!(pane.prompt(), "$ ");
        assert_eq!(output_texts(&pane), vec!["building..."]);
    }

    #[test]
    fn test_empty_chunk_is_noop() {
        let mut pane = pane();
        pane.add_output("");
        assert!(pane.sink().is_empty());
        assert!(pane.follow());
    }

    #[test]
    fn test_echo_suppressed_once() {
        let mut pane = pane();
        pane.set_input_value("ls");
        pane.submit();
        pane.add_output("ls\nfile\nls\n");
        assert_eq!(output_texts(&pane), vec!["$ ls", "file", "ls"]);
    }

    #[test]
    fn test_resize_fits_input_to_prompt() {
        let mut pane = pane();
        let effects = pane.resize(100, 30);
        assert_eq!(effects, vec![Effect::Resize { cols: 100, rows: 30 }]);
        assert_eq!(pane.input_width(), 98);
        pane.set_prompt("user@host:~$ ");
        assert_eq!(pane.input_width(), 87);
    }

    #[test]
    fn test_view_before_resize() {
        let mut pane = pane();
        assert_eq!(pane.view(), INITIALIZING_TEXT);
    }

    #[test]
    fn test_report_failure_clears_pending_and_shows_error() {
        let mut pane = pane().with_remote(RemoteCapabilities {
            tab_completion: true,
            history: true,
        });
        pane.pending.begin_completion();
        pane.report_failure(&Effect::SendTab("ls".to_string()), "broken pipe");
        assert!(!pane.completion_pending());
        assert_eq!(
            output_texts(&pane),
            vec!["ERROR: Tab send failed: broken pipe"]
        );
    }
}
