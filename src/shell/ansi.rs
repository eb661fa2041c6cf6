//! # ANSI and Prompt Normalizer
//!
//! Remote shells repaint their prompt with cursor and colour codes on every
//! command. Without a full terminal emulator the only way to keep the local
//! prompt in sync is to treat the last line of each output chunk as a
//! candidate prompt and test it against a list of known prompt shapes.
//!
//! ## Pattern precedence
//!
//! Patterns are tried in order and the first match wins. The default list is:
//!
//! | # | Name | Example |
//! |---|------|---------|
//! | 1 | Windows drive prompt | `C:\Users\me>` |
//! | 2 | `PowerShell` prompt | `PS C:\work>` |
//! | 3 | user@host:path prompt | `root@box:/tmp$` |
//! | 4 | path prompt | `box:~#` |
//! | 5 | simple prompt | `$` |
//! | 6 | general prompt | `mysql>` |
//! | 7 | lambda prompt | `~/src λ` |
//!
//! Several shapes overlap (the general prompt is a superset of the simple
//! one), so the order is part of the observable behaviour. It is supplied
//! through [`PromptPattern`] lists and can be replaced from configuration.

use crate::shell::error::ShellError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

// The two control-sequence patterns below are fixed literals; compiling them
// cannot fail at runtime and both are forced in the tests. User-supplied
// prompt patterns go through `PromptDetector::new` and report errors.

/// CSI sequences (`ESC [ params final`), OSC sequences (`ESC ] ... BEL|ST`)
/// and stray bell characters.
static ANSI_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1b\[[0-9;?]*[a-zA-Z@-~]|\x1b\][^\x07\x1b]*(?:\x07|\x1b\\)|\x07")
        .expect("literal ANSI pattern compiles")
});

/// Absolute cursor positioning, `ESC[row;colH`. Some peers send the escape
/// already rendered as the literal text `\u{1b}`.
static CURSOR_POSITION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\x1b|\\u\{1b\})\[\d+;\d+H")
        .expect("literal cursor pattern compiles")
});

/// Remove terminal control sequences from `text`.
pub fn strip_ansi(text: &str) -> String {
    ANSI_PATTERN.replace_all(text, "").into_owned()
}

/// Byte index just past the last cursor-positioning sequence in `text`.
pub fn after_last_cursor_position(text: &str) -> Option<usize> {
    CURSOR_POSITION_PATTERN
        .find_iter(text)
        .last()
        .map(|m| m.end())
}

/// A named prompt shape. The first capture group is the prompt text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PromptPattern {
    pub name: String,
    pub pattern: String,
}

impl PromptPattern {
    pub fn new(name: &str, pattern: &str) -> Self {
        Self {
            name: name.to_string(),
            pattern: pattern.to_string(),
        }
    }

    /// The built-in prompt shapes, in precedence order.
    pub fn defaults() -> Vec<PromptPattern> {
        vec![
            Self::new("Windows drive prompt", r"([A-Z]:\\[^>]*>)\s*$"),
            Self::new("PowerShell prompt", r"(PS\s+[A-Z]:\\[^>]*>\s*)$"),
            Self::new("user@host:path prompt", r"(.+@.+:\S*[$#>])\s*$"),
            Self::new("path prompt", r"(.+:\S*[$#>])\s*$"),
            Self::new("simple prompt", r"([$#>])\s*$"),
            Self::new("general prompt", r"(.+[$#>])\s*$"),
            Self::new("lambda prompt", r"(.+λ)\s*$"),
        ]
    }
}

/// Compiled, ordered prompt patterns.
#[derive(Debug, Clone)]
pub struct PromptDetector {
    patterns: Vec<(String, Regex)>,
}

impl PromptDetector {
    pub fn new(patterns: &[PromptPattern]) -> Result<Self, ShellError> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Regex::new(&p.pattern)
                    .map(|re| (p.name.clone(), re))
                    .map_err(|source| ShellError::InvalidPromptPattern {
                        name: p.name.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Try each pattern against `line`; return the trimmed capture of the
    /// first one that yields a non-empty prompt.
    pub fn detect(&self, line: &str) -> Option<String> {
        if line.is_empty() {
            return None;
        }
        self.patterns.iter().find_map(|(name, re)| {
            let caps = re.captures(line)?;
            let prompt = caps.get(1)?.as_str().trim();
            if prompt.is_empty() {
                return None;
            }
            tracing::trace!(pattern = %name, prompt, "prompt matched");
            Some(prompt.to_string())
        })
    }
}

/// Result of normalizing one raw output chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Normalized {
    /// Clean lines to display, in arrival order.
    pub lines: Vec<String>,
    /// Prompt taken from the chunk's last line, if any.
    pub prompt: Option<String>,
}

/// Strip control sequences from `chunk`, split it into lines and pull a
/// trailing prompt off the last line.
///
/// A newline that terminates the chunk ends the preceding line; it does not
/// open an empty one.
pub fn normalize(chunk: &str, detector: &PromptDetector) -> Normalized {
    if chunk.is_empty() {
        return Normalized::default();
    }

    let clean = strip_ansi(chunk);
    let mut lines: Vec<String> = clean
        .split('\n')
        .map(|l| l.trim_end_matches('\r').to_string())
        .collect();

    let mut prompt = None;
    if let Some(last) = lines.last() {
        if let Some(found) = detector.detect(last) {
            prompt = Some(found);
            lines.pop();
        } else if last.is_empty() {
            lines.pop();
        }
    }

    Normalized { lines, prompt }
}
