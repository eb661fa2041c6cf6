//! # Selection Engine
//!
//! Mouse selection over the pane's *flattened* content: every output line
//! plus the live prompt and input, joined with `\n`.
//!
//! Offsets are character offsets into that string. They are only valid
//! against the content they were computed from, so callers rebuild a
//! [`FlatContent`] for every press, drag, release and frame instead of
//! caching one. When the content shrinks under a selection the range is
//! treated as empty rather than clipped.
//!
//! Column positions arrive in terminal cells; wide glyphs (CJK, emoji) take
//! two cells but one character, which [`FlatContent::offset_at`] accounts
//! for.

use std::time::{Duration, Instant};
use unicode_width::UnicodeWidthChar;

/// Newline-joined content with per-line character starts.
#[derive(Debug, Clone, Default)]
pub struct FlatContent {
    lines: Vec<String>,
    /// Character offset at which each line begins
    starts: Vec<usize>,
    char_len: usize,
}

impl FlatContent {
    pub fn new(lines: Vec<String>) -> Self {
        let mut starts = Vec::with_capacity(lines.len());
        let mut offset = 0;
        for (i, line) in lines.iter().enumerate() {
            starts.push(offset);
            offset += line.chars().count();
            if i + 1 < lines.len() {
                offset += 1;
            }
        }
        Self {
            lines,
            starts,
            char_len: offset,
        }
    }

    /// Length of the joined content in characters.
    pub fn char_len(&self) -> usize {
        self.char_len
    }

    /// The joined content.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Map a (cell column, line) position to a character offset. Both
    /// coordinates are clamped into the content.
    pub fn offset_at(&self, row: usize, col: usize) -> usize {
        if self.lines.is_empty() {
            return 0;
        }
        let row = row.min(self.lines.len() - 1);
        let line = &self.lines[row];

        let mut cells = 0;
        let mut chars = 0;
        for c in line.chars() {
            let w = c.width().unwrap_or(0);
            if cells + w > col {
                break;
            }
            cells += w;
            chars += 1;
        }

        (self.starts[row] + chars).min(self.char_len)
    }

    /// Characters `[start, end)`, or None when the range is empty or no
    /// longer inside the content.
    pub fn slice(&self, start: usize, end: usize) -> Option<String> {
        if start >= end || end > self.char_len {
            return None;
        }
        Some(self.text().chars().skip(start).take(end - start).collect())
    }

    /// Range of the word containing `offset`. Word characters are ASCII
    /// alphanumerics, `_` and `-`.
    pub fn word_at(&self, offset: usize) -> Option<(usize, usize)> {
        let chars: Vec<char> = self.text().chars().collect();
        if offset >= chars.len() {
            return None;
        }
        let mut start = offset;
        while start > 0 && is_word_char(chars[start - 1]) {
            start -= 1;
        }
        let mut end = offset;
        while end < chars.len() && is_word_char(chars[end]) {
            end += 1;
        }
        Some((start, end))
    }

    /// Range of the line containing `offset`, without its newline.
    pub fn line_at(&self, offset: usize) -> Option<(usize, usize)> {
        if offset >= self.char_len {
            return None;
        }
        let row = match self.starts.binary_search(&offset) {
            Ok(row) => row,
            Err(next) => next.saturating_sub(1),
        };
        let start = self.starts[row];
        Some((start, start + self.lines[row].chars().count()))
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// In-progress or completed selection.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    selecting: bool,
    start: usize,
    end: usize,
    last_click_pos: usize,
    click_count: u32,
    last_click_time: Option<Instant>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Left button pressed at `offset`. A press within `double_click` of the
    /// previous one counts as a repeat click: the second selects the word,
    /// the third the whole line.
    pub fn press(
        &mut self,
        offset: usize,
        now: Instant,
        double_click: Duration,
        content: &FlatContent,
    ) {
        let repeat = self
            .last_click_time
            .is_some_and(|t| now.saturating_duration_since(t) < double_click);
        self.click_count = if repeat { self.click_count + 1 } else { 1 };
        self.last_click_time = Some(now);

        self.selecting = true;
        self.start = offset;
        self.end = offset;
        self.last_click_pos = offset;

        let expanded = match self.click_count {
            1 => None,
            2 => content.word_at(offset),
            _ => content.line_at(offset),
        };
        if let Some((start, end)) = expanded {
            self.start = start;
            self.end = end;
        }
    }

    pub fn drag(&mut self, offset: usize) {
        if self.selecting {
            self.end = offset;
        }
    }

    /// Left button released at `offset`. Returns the text to copy when the
    /// finalized range is non-empty; the selection is cleared in that case.
    pub fn release(&mut self, offset: usize, content: &FlatContent) -> Option<String> {
        if !self.selecting {
            return None;
        }
        let keep_expanded = self.click_count > 1 && offset == self.last_click_pos;
        if !keep_expanded {
            self.end = offset;
        }
        if self.start > self.end {
            std::mem::swap(&mut self.start, &mut self.end);
        }
        if self.start == self.end {
            return None;
        }
        let text = content.slice(self.start, self.end);
        self.clear();
        text.filter(|t| !t.is_empty())
    }

    pub fn has_selection(&self) -> bool {
        self.selecting && self.start != self.end
    }

    pub fn is_selecting(&self) -> bool {
        self.selecting
    }

    /// Raw `(start, end)`; `start` may exceed `end` while dragging backwards.
    pub fn range(&self) -> (usize, usize) {
        (self.start, self.end)
    }

    /// Ordered range, if there is a non-empty selection.
    pub fn ordered(&self) -> Option<(usize, usize)> {
        self.has_selection()
            .then(|| (self.start.min(self.end), self.start.max(self.end)))
    }

    /// Ordered range clipped to nothing when it no longer fits `content`.
    pub fn within(&self, content: &FlatContent) -> Option<(usize, usize)> {
        self.ordered()
            .filter(|&(start, end)| start < content.char_len() && end <= content.char_len())
    }

    pub fn selected_text(&self, content: &FlatContent) -> Option<String> {
        self.within(content)
            .and_then(|(start, end)| content.slice(start, end))
    }

    pub fn click_count(&self) -> u32 {
        self.click_count
    }

    pub fn clear(&mut self) {
        self.selecting = false;
        self.start = 0;
        self.end = 0;
    }
}
