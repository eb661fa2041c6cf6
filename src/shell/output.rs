//! # Output Log and Sink
//!
//! The output log is the pane's scrollback: an append-only list of display
//! lines capped at a maximum count, oldest evicted first.
//!
//! [`OutputSink`] is the shared handle to it. A background reader may append
//! through its own clone while the render path reads; every call holds the
//! lock for its whole duration, so a batch of lines is never observed half
//! appended.

use std::sync::{Arc, Mutex};

/// How a line should be styled when rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Ordinary remote output.
    Output,
    /// A locally generated error line.
    Error,
    /// Session lifecycle banner.
    Session,
    /// Local echo of a submitted command. The first `prompt_chars` characters
    /// are the prompt.
    Echo { prompt_chars: usize },
    /// The live prompt and input line. Never stored in the log.
    Input { prompt_chars: usize },
}

/// One line of scrollback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayLine {
    pub text: String,
    pub kind: LineKind,
}

impl DisplayLine {
    pub fn output(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: LineKind::Output,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: LineKind::Error,
        }
    }

    pub fn session(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: LineKind::Session,
        }
    }

    pub fn echo(prompt: &str, command: &str) -> Self {
        Self {
            text: format!("{}{}", prompt, command),
            kind: LineKind::Echo {
                prompt_chars: prompt.chars().count(),
            },
        }
    }
}

/// Capped list of display lines.
#[derive(Debug, Clone)]
pub struct OutputLog {
    lines: Vec<DisplayLine>,
    max_lines: usize,
}

impl OutputLog {
    pub fn new(max_lines: usize) -> Self {
        Self {
            lines: Vec::new(),
            max_lines: max_lines.max(1),
        }
    }

    /// Append all `lines`, then evict from the front until the cap holds.
    /// Returns the number of lines evicted.
    pub fn extend(&mut self, lines: impl IntoIterator<Item = DisplayLine>) -> usize {
        self.lines.extend(lines);
        let excess = self.lines.len().saturating_sub(self.max_lines);
        if excess > 0 {
            self.lines.drain(..excess);
        }
        excess
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn lines(&self) -> &[DisplayLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn max_lines(&self) -> usize {
        self.max_lines
    }
}

/// Thread-safe handle to an [`OutputLog`].
#[derive(Debug, Clone)]
pub struct OutputSink {
    log: Arc<Mutex<OutputLog>>,
}

impl OutputSink {
    pub fn new(max_lines: usize) -> Self {
        Self {
            log: Arc::new(Mutex::new(OutputLog::new(max_lines))),
        }
    }

    /// Append a batch of lines atomically. Returns the index of the first
    /// new line still present after eviction, computed under the same lock
    /// so a concurrent producer cannot shift it. None for an empty batch.
    pub fn append(&self, lines: Vec<DisplayLine>) -> Option<usize> {
        if lines.is_empty() {
            return None;
        }
        let added = lines.len();
        let mut log = self.log.lock().ok()?;
        let cap = log.max_lines();
        log.extend(lines);
        Some(log.len() - added.min(cap))
    }

    pub fn push(&self, line: DisplayLine) -> Option<usize> {
        self.append(vec![line])
    }

    pub fn clear(&self) {
        if let Ok(mut log) = self.log.lock() {
            log.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.log.lock().map(|log| log.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the current lines.
    pub fn snapshot(&self) -> Vec<DisplayLine> {
        self.log
            .lock()
            .map(|log| log.lines().to_vec())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(sink: &OutputSink) -> Vec<String> {
        sink.snapshot().into_iter().map(|l| l.text).collect()
    }

    #[test]
    fn test_cap_evicts_oldest() {
        let mut log = OutputLog::new(3);
        let evicted = log.extend((0..5).map(|i| DisplayLine::output(i.to_string())));
        assert_eq!(evicted, 2);
        let texts: Vec<&str> = log.lines().iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["2", "3", "4"]);
    }

    #[test]
    fn test_never_exceeds_cap() {
        let sink = OutputSink::new(10);
        for batch in 0..7 {
            sink.append((0..batch).map(|i| DisplayLine::output(i.to_string())).collect());
            assert!(sink.len() <= 10);
        }
        assert_eq!(sink.len(), 10);
    }

    #[test]
    fn test_append_reports_first_new_line() {
        let sink = OutputSink::new(4);
        assert_eq!(sink.append(Vec::new()), None);
        assert_eq!(sink.push(DisplayLine::output("a")), Some(0));
        assert_eq!(
            sink.append(vec![DisplayLine::output("b"), DisplayLine::output("c")]),
            Some(1)
        );

        // Eviction shifts the index back to the first surviving new line.
        let first = sink.append(vec![
            DisplayLine::output("d"),
            DisplayLine::output("e"),
            DisplayLine::output("f"),
        ]);
        assert_eq!(first, Some(1));
        assert_eq!(texts(&sink), vec!["c", "d", "e", "f"]);

        let first = sink.append((0..6).map(|i| DisplayLine::output(i.to_string())).collect());
        assert_eq!(first, Some(0));
        assert_eq!(texts(&sink), vec!["2", "3", "4", "5"]);
    }

    #[test]
    fn test_first_new_line_ignores_later_producers() {
        let sink = OutputSink::new(100);
        let producer = sink.clone();
        sink.append(vec![DisplayLine::output("old")]);

        let first = sink.append(vec![DisplayLine::output("mine")]);
        producer.append(vec![DisplayLine::output("theirs")]);

        let first = first.expect("appended");
        assert_eq!(sink.snapshot()[first].text, "mine");
    }

    #[test]
    fn test_echo_line_records_prompt_width() {
        let line = DisplayLine::echo("λ ", "ls");
        assert_eq!(line.text, "λ ls");
        assert_eq!(line.kind, LineKind::Echo { prompt_chars: 2 });
    }

    #[test]
    fn test_concurrent_appends_keep_batch_order() {
        let sink = OutputSink::new(1000);
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let sink = sink.clone();
                std::thread::spawn(move || {
                    for i in 0..50 {
                        sink.append(vec![
                            DisplayLine::output(format!("{t}-{i}-a")),
                            DisplayLine::output(format!("{t}-{i}-b")),
                        ]);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("writer thread");
        }

        let lines = texts(&sink);
        assert_eq!(lines.len(), 400);
        for pair in lines.chunks(2) {
            assert!(pair[0].ends_with("-a"));
            assert_eq!(pair[1], pair[0].replace("-a", "-b"));
        }
        // Each writer's own lines stay in submission order.
        for t in 0..4 {
            let mine: Vec<&String> = lines
                .iter()
                .filter(|l| l.starts_with(&format!("{t}-")) && l.ends_with("-a"))
                .collect();
            let expected: Vec<String> = (0..50).map(|i| format!("{t}-{i}-a")).collect();
            assert_eq!(mine, expected.iter().collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_clear() {
        let sink = OutputSink::new(5);
        sink.push(DisplayLine::error("ERROR: x"));
        assert!(!sink.is_empty());
        sink.clear();
        assert!(sink.is_empty());
    }
}
