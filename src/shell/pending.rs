//! # Pending-Request Tracker
//!
//! Tab completion and history recall are answered by the remote shell as
//! ordinary terminal output. The pane is told out of band that an answer is
//! expected (Tab or an arrow key was forwarded) and treats the *next*
//! output chunk as that answer.

use crate::shell::ansi::{after_last_cursor_position, strip_ansi};

/// Outstanding remote round-trips plus the injected-buffer marker.
#[derive(Debug, Clone, Default)]
pub struct PendingRequests {
    completion: bool,
    history: bool,
    /// Last input line already pushed to the remote side
    injected_buffer: String,
}

impl PendingRequests {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn completion_pending(&self) -> bool {
        self.completion
    }

    pub fn history_pending(&self) -> bool {
        self.history
    }

    /// Expect a completion answer. Any outstanding history request is
    /// dropped: only one answer can be waited for at a time.
    pub fn begin_completion(&mut self) {
        self.completion = true;
        self.history = false;
    }

    pub fn begin_history(&mut self) {
        self.history = true;
        self.completion = false;
    }

    pub fn clear_completion(&mut self) {
        self.completion = false;
    }

    pub fn clear_history(&mut self) {
        self.history = false;
    }

    pub fn mark_injected(&mut self, current: &str) {
        self.injected_buffer = current.to_string();
    }

    pub fn clear_injected(&mut self) {
        self.injected_buffer.clear();
    }

    /// True when `current` is exactly what was last pushed to the remote
    /// side, so Enter only needs to send a line terminator.
    pub fn remote_buffer_matches(&self, current: &str) -> bool {
        !self.injected_buffer.is_empty() && current == self.injected_buffer
    }
}

/// Extract the completed line from a raw completion response.
///
/// The shell redraws the edited line after positioning the cursor, so the
/// text following the last `ESC[row;colH` is the new line. Leftover `?25h`
/// (cursor show) and `m` fragments are dropped before stripping the rest;
/// if nothing is left after the cursor sequence there is no completion.
/// Without a cursor sequence the whole stripped response is used as-is,
/// even when empty.
pub fn completion_text(raw: &str) -> Option<String> {
    match after_last_cursor_position(raw) {
        Some(idx) => {
            let rest = &raw[idx..];
            let rest = rest.strip_prefix("?25h").unwrap_or(rest);
            let rest = rest.strip_prefix('m').unwrap_or(rest);
            let text = strip_ansi(rest);
            (!text.is_empty()).then_some(text)
        }
        None => Some(strip_ansi(raw)),
    }
}

/// Extract the recalled command from a raw history response.
pub fn history_text(raw: &str) -> String {
    strip_ansi(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_after_cursor_sequence() {
        assert_eq!(completion_text("\x1b[3;10Hfoo").as_deref(), Some("foo"));
        assert_eq!(
            completion_text("junk\x1b[1;1Hold\x1b[2;5H?25hgit status").as_deref(),
            Some("git status")
        );
        assert_eq!(
            completion_text("\x1b[2;5Hm\x1b[32mls -la\x1b[0m").as_deref(),
            Some("ls -la")
        );
    }

    #[test]
    fn test_completion_without_cursor_sequence_uses_stripped_text() {
        assert_eq!(
            completion_text("\x1b[1mcargo build\x1b[0m").as_deref(),
            Some("cargo build")
        );
    }

    #[test]
    fn test_completion_without_cursor_sequence_may_be_empty() {
        assert_eq!(completion_text("").as_deref(), Some(""));
        assert_eq!(completion_text("\x07").as_deref(), Some(""));
        assert_eq!(completion_text("\x1b[0m").as_deref(), Some(""));
    }

    #[test]
    fn test_completion_empty_after_cursor_sequence() {
        assert_eq!(completion_text("\x1b[3;1H"), None);
        assert_eq!(completion_text("\x1b[3;1H?25h\x1b[0m"), None);
    }

    #[test]
    fn test_history_text_strips_ansi() {
        assert_eq!(history_text("\x1b[Kmake test"), "make test");
        assert_eq!(history_text(""), "");
    }

    #[test]
    fn test_requests_are_exclusive() {
        let mut pending = PendingRequests::new();
        pending.begin_history();
        pending.begin_completion();
        assert!(pending.completion_pending());
        assert!(!pending.history_pending());
    }

    #[test]
    fn test_remote_buffer_matches() {
        let mut pending = PendingRequests::new();
        assert!(!pending.remote_buffer_matches(""));
        pending.mark_injected("ls /tm");
        assert!(pending.remote_buffer_matches("ls /tm"));
        assert!(!pending.remote_buffer_matches("ls /tmp"));
        pending.clear_injected();
        assert!(!pending.remote_buffer_matches("ls /tm"));
    }
}
