//! Messages into the pane and effects out of it.

use crossterm::event::Event;

/// Notifications from the session worker. Applied synchronously, in
/// delivery order, by [`crate::shell::ShellPane::apply_message`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellMsg {
    /// Raw remote output, control sequences included.
    Output(String),
    /// An error to show as an error line.
    Error(String),
    Connected,
    Disconnected,
    /// The remote prompt changed; the text is used as-is.
    PromptChanged(String),
}

/// Everything the pane reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaneEvent {
    Terminal(Event),
    Message(ShellMsg),
}

impl From<Event> for PaneEvent {
    fn from(event: Event) -> Self {
        PaneEvent::Terminal(event)
    }
}

impl From<ShellMsg> for PaneEvent {
    fn from(msg: ShellMsg) -> Self {
        PaneEvent::Message(msg)
    }
}

/// A finished command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSubmission {
    pub command: String,
    /// The remote line buffer already holds `command`; only a line
    /// terminator needs to be sent.
    pub already_sent: bool,
}

/// Side effects requested by the pane. The caller performs them and reports
/// failures back through [`crate::shell::ShellPane::report_failure`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Connect,
    Disconnect,
    Resize { cols: u16, rows: u16 },
    SubmitCommand(CommandSubmission),
    SendTab(String),
    SendArrowUp(String),
    SendArrowDown(String),
    CopyToClipboard(String),
    /// Stop the run loop.
    Quit,
}

impl Effect {
    /// Prefix used when this effect's failure is shown in the pane.
    pub fn failure_context(&self) -> &'static str {
        match self {
            Effect::Connect => "Connection failed",
            Effect::Disconnect => "Disconnect failed",
            Effect::Resize { .. } => "Resize failed",
            Effect::SubmitCommand(_) => "Command failed",
            Effect::SendTab(_) => "Tab send failed",
            Effect::SendArrowUp(_) => "Arrow up send failed",
            Effect::SendArrowDown(_) => "Arrow down send failed",
            Effect::CopyToClipboard(_) => "Failed to copy to clipboard",
            Effect::Quit => "Quit failed",
        }
    }
}
