//! Bounded command history with readline-style navigation.

/// Previously submitted commands, oldest first.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<String>,
    max_entries: usize,
    /// Position while navigating (None = editing a fresh line)
    cursor: Option<usize>,
    /// The in-progress line saved when navigation started
    saved_input: String,
}

impl History {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Vec::new(),
            max_entries: max_entries.max(1),
            cursor: None,
            saved_input: String::new(),
        }
    }

    /// Record a submitted command. Repeats of the immediately preceding
    /// entry are skipped. Navigation is reset either way.
    pub fn push(&mut self, command: &str) {
        if self.entries.last().map(String::as_str) != Some(command) {
            self.entries.push(command.to_string());
            if self.entries.len() > self.max_entries {
                self.entries.remove(0);
            }
        }
        self.reset_navigation();
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Step back one entry. `current` is remembered when navigation starts so
    /// that stepping forward past the newest entry restores it.
    pub fn previous(&mut self, current: &str) -> Option<&str> {
        if self.entries.is_empty() {
            return None;
        }
        let pos = match self.cursor {
            None => {
                self.saved_input = current.to_string();
                self.entries.len() - 1
            }
            Some(pos) => pos.saturating_sub(1),
        };
        self.cursor = Some(pos);
        self.entries.get(pos).map(String::as_str)
    }

    /// Step forward one entry, or back to the saved line past the newest.
    pub fn next(&mut self) -> Option<String> {
        let pos = self.cursor?;
        if pos + 1 >= self.entries.len() {
            self.cursor = None;
            return Some(std::mem::take(&mut self.saved_input));
        }
        self.cursor = Some(pos + 1);
        self.entries.get(pos + 1).cloned()
    }

    pub fn reset_navigation(&mut self) {
        self.cursor = None;
        self.saved_input.clear();
    }
}
