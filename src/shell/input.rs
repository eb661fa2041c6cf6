//! The pane's text-entry field.
//!
//! Wraps [`tui_input::Input`] with readline-style key bindings and a
//! horizontal window so that a long line scrolls inside `width` cells.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tui_input::{Input, InputRequest};
use unicode_width::UnicodeWidthChar;

/// Editable input line.
#[derive(Debug, Clone, Default)]
pub struct InputField {
    input: Input,
    width: usize,
}

impl InputField {
    pub fn new(width: usize) -> Self {
        Self {
            input: Input::default(),
            width,
        }
    }

    pub fn value(&self) -> &str {
        self.input.value()
    }

    /// Replace the whole line; the cursor moves to the end.
    pub fn set_value(&mut self, value: &str) {
        self.input = Input::new(value.to_string());
    }

    pub fn clear(&mut self) {
        self.input.reset();
    }

    pub fn is_empty(&self) -> bool {
        self.input.value().is_empty()
    }

    /// Cursor position in characters.
    pub fn cursor(&self) -> usize {
        self.input.cursor()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn set_width(&mut self, width: usize) {
        self.width = width;
    }

    pub fn insert_str(&mut self, text: &str) {
        for c in text.chars().filter(|c| !c.is_control()) {
            self.input.handle(InputRequest::InsertChar(c));
        }
    }

    /// Apply an editing key. Returns false when the key means nothing to the
    /// field.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);

        let request = match key.code {
            KeyCode::Char('a') if ctrl => InputRequest::GoToStart,
            KeyCode::Char('e') if ctrl => InputRequest::GoToEnd,
            KeyCode::Char('b') if ctrl => InputRequest::GoToPrevChar,
            KeyCode::Char('f') if ctrl => InputRequest::GoToNextChar,
            KeyCode::Char('k') if ctrl => InputRequest::DeleteTillEnd,
            KeyCode::Char('w') if ctrl => InputRequest::DeletePrevWord,
            KeyCode::Char('u') if ctrl => {
                self.kill_to_start();
                return true;
            }
            KeyCode::Char(_) if ctrl => return false,
            KeyCode::Char('b') if alt => InputRequest::GoToPrevWord,
            KeyCode::Char('f') if alt => InputRequest::GoToNextWord,
            KeyCode::Char(c) => InputRequest::InsertChar(c),
            KeyCode::Backspace if alt => InputRequest::DeletePrevWord,
            KeyCode::Backspace => InputRequest::DeletePrevChar,
            KeyCode::Delete => InputRequest::DeleteNextChar,
            KeyCode::Left if ctrl || alt => InputRequest::GoToPrevWord,
            KeyCode::Right if ctrl || alt => InputRequest::GoToNextWord,
            KeyCode::Left => InputRequest::GoToPrevChar,
            KeyCode::Right => InputRequest::GoToNextChar,
            KeyCode::Home => InputRequest::GoToStart,
            KeyCode::End => InputRequest::GoToEnd,
            _ => return false,
        };
        self.input.handle(request);
        true
    }

    fn kill_to_start(&mut self) {
        for _ in 0..self.input.cursor() {
            self.input.handle(InputRequest::DeletePrevChar);
        }
    }

    /// Columns scrolled off the left edge.
    fn scroll(&self) -> usize {
        self.input.visual_scroll(self.width.max(1))
    }

    /// The part of the line visible inside the field's width.
    pub fn view_text(&self) -> String {
        let scroll = self.scroll();
        let limit = scroll + self.width.max(1);
        let mut col = 0;
        let mut out = String::new();
        for c in self.input.value().chars() {
            let w = c.width().unwrap_or(0);
            if col >= scroll && col + w <= limit {
                out.push(c);
            }
            col += w;
            if col >= limit {
                break;
            }
        }
        out
    }

    /// Cursor column relative to the start of [`Self::view_text`].
    pub fn view_cursor(&self) -> usize {
        self.input.visual_cursor().saturating_sub(self.scroll())
    }
}
