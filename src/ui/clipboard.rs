//! # System Clipboard
//!
//! Copies selected text out of the pane.
//!
//! [`SystemClipboard`] tries `arboard` first (X11/Wayland/macOS/Windows
//! APIs) and falls back to an OSC 52 escape sequence written to the
//! terminal, which most modern terminal emulators honour even over SSH.
//!
//! On X11 the clipboard owner must stay alive to answer paste requests, so
//! the `arboard` handle is kept in a process-wide static.

use crate::shell::ShellError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::io::{self, Write};
use std::sync::Mutex;

static SYSTEM_CLIPBOARD: Mutex<Option<arboard::Clipboard>> = Mutex::new(None);

/// Destination for copied selections.
pub trait ClipboardSink {
    fn copy(&mut self, text: &str) -> Result<(), ShellError>;
}

/// The platform clipboard with an OSC 52 fallback.
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl SystemClipboard {
    pub fn new() -> Self {
        Self
    }

    fn copy_arboard(text: &str) -> Result<(), ShellError> {
        let mut guard = SYSTEM_CLIPBOARD
            .lock()
            .map_err(|_| ShellError::Clipboard("clipboard lock poisoned".to_string()))?;

        if guard.is_none() {
            let clipboard =
                arboard::Clipboard::new().map_err(|e| ShellError::Clipboard(e.to_string()))?;
            *guard = Some(clipboard);
        }

        match guard.as_mut() {
            Some(clipboard) => clipboard
                .set_text(text)
                .map_err(|e| ShellError::Clipboard(e.to_string())),
            None => Err(ShellError::Clipboard("no clipboard".to_string())),
        }
    }

    fn copy_osc52(text: &str) -> Result<(), ShellError> {
        let mut out = io::stdout();
        out.write_all(osc52_sequence(text).as_bytes())
            .and_then(|()| out.flush())
            .map_err(|e| ShellError::Clipboard(e.to_string()))
    }
}

impl ClipboardSink for SystemClipboard {
    fn copy(&mut self, text: &str) -> Result<(), ShellError> {
        match Self::copy_arboard(text) {
            Ok(()) => {
                tracing::debug!(chars = text.chars().count(), "copied via arboard");
                Ok(())
            }
            Err(err) => {
                tracing::debug!(error = %err, "arboard copy failed, falling back to OSC 52");
                Self::copy_osc52(text)
            }
        }
    }
}

/// `ESC ] 52 ; c ; <base64> BEL`
pub fn osc52_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", STANDARD.encode(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_osc52_sequence() {
        assert_eq!(osc52_sequence("hi"), "\x1b]52;c;aGk=\x07");
        assert_eq!(osc52_sequence(""), "\x1b]52;c;\x07");
    }
}
