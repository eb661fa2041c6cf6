//! # Theme System
//!
//! Colors for the shell pane, grouped by semantic role.
//!
//! A [`Theme`] is a named palette; [`PaneStyles`] is the immutable set of
//! ratatui styles the renderer actually applies, derived once from a theme.
//!
//! ## Built-in Themes
//!
//! - **Catppuccin Mocha** (default)
//! - **Dracula**
//! - **Nord**
//! - **Tokyo Night**
//! - **Gruvbox Dark**
//! - **One Dark**

use crate::shell::LineKind;
use ratatui::style::{Color, Modifier, Style};

/// A named palette.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Name accepted by `--theme` and the config file.
    pub name: &'static str,

    /// Pane background.
    pub bg: Color,
    /// Remote output.
    pub fg: Color,
    /// Session banners.
    pub fg_dim: Color,
    /// Prompt segment of the input and echo lines.
    pub accent: Color,
    pub error: Color,
    /// Background for mouse-drag text selection.
    pub selection_bg: Color,
}

impl Theme {
    /// All built-in themes, default first.
    pub fn all() -> &'static [Theme] {
        &BUILT_IN_THEMES
    }

    /// Find a built-in theme by name (case-insensitive).
    pub fn by_name(name: &str) -> Option<&'static Theme> {
        BUILT_IN_THEMES
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }

    pub fn default_theme() -> &'static Theme {
        &BUILT_IN_THEMES[0]
    }

    pub fn styles(&self) -> PaneStyles {
        PaneStyles::from_theme(self)
    }
}

/// Styles applied when rendering the pane. Built once, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaneStyles {
    /// Base style for the whole pane area.
    pub background: Style,
    pub prompt: Style,
    pub output: Style,
    pub session: Style,
    pub error: Style,
    pub selection: Style,
}

impl PaneStyles {
    pub fn from_theme(theme: &Theme) -> Self {
        Self {
            background: Style::default().bg(theme.bg).fg(theme.fg),
            prompt: Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
            output: Style::default().fg(theme.fg),
            session: Style::default()
                .fg(theme.fg_dim)
                .add_modifier(Modifier::ITALIC),
            error: Style::default().fg(theme.error),
            selection: Style::default().bg(theme.selection_bg),
        }
    }

    /// Style for the body of a line of `kind`.
    pub fn for_kind(&self, kind: LineKind) -> Style {
        match kind {
            LineKind::Output | LineKind::Echo { .. } | LineKind::Input { .. } => self.output,
            LineKind::Error => self.error,
            LineKind::Session => self.session,
        }
    }
}

impl Default for PaneStyles {
    fn default() -> Self {
        Theme::default_theme().styles()
    }
}

static BUILT_IN_THEMES: [Theme; 6] = [
    Theme {
        name: "Catppuccin Mocha",
        bg: Color::Rgb(30, 30, 46),           // base
        fg: Color::Rgb(205, 214, 244),        // text
        fg_dim: Color::Rgb(108, 112, 134),    // overlay0
        accent: Color::Rgb(137, 180, 250),    // blue
        error: Color::Rgb(243, 139, 168),     // red
        selection_bg: Color::Rgb(69, 71, 90), // surface1
    },
    Theme {
        name: "Dracula",
        bg: Color::Rgb(40, 42, 54),
        fg: Color::Rgb(248, 248, 242),
        fg_dim: Color::Rgb(98, 114, 164),
        accent: Color::Rgb(80, 250, 123), // green
        error: Color::Rgb(255, 85, 85),
        selection_bg: Color::Rgb(68, 71, 90),
    },
    Theme {
        name: "Nord",
        bg: Color::Rgb(46, 52, 64),
        fg: Color::Rgb(216, 222, 233),
        fg_dim: Color::Rgb(76, 86, 106),
        accent: Color::Rgb(136, 192, 208), // frost
        error: Color::Rgb(191, 97, 106),
        selection_bg: Color::Rgb(67, 76, 94),
    },
    Theme {
        name: "Tokyo Night",
        bg: Color::Rgb(26, 27, 38),
        fg: Color::Rgb(169, 177, 214),
        fg_dim: Color::Rgb(86, 95, 137),
        accent: Color::Rgb(122, 162, 247),
        error: Color::Rgb(247, 118, 142),
        selection_bg: Color::Rgb(41, 46, 66),
    },
    Theme {
        name: "Gruvbox Dark",
        bg: Color::Rgb(40, 40, 40),
        fg: Color::Rgb(235, 219, 178),
        fg_dim: Color::Rgb(146, 131, 116),
        accent: Color::Rgb(184, 187, 38),
        error: Color::Rgb(251, 73, 52),
        selection_bg: Color::Rgb(80, 73, 69),
    },
    Theme {
        name: "One Dark",
        bg: Color::Rgb(40, 44, 52),
        fg: Color::Rgb(171, 178, 191),
        fg_dim: Color::Rgb(92, 99, 112),
        accent: Color::Rgb(97, 175, 239),
        error: Color::Rgb(224, 108, 117),
        selection_bg: Color::Rgb(62, 68, 82),
    },
];
