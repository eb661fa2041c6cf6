//! # UI Module
//!
//! ratatui glue for the shell pane.
//!
//! - [`mod@render`] - draws a pane frame with styles and selection highlight
//! - [`theme`] - built-in palettes and the derived [`PaneStyles`]
//! - [`config`] - persisted user configuration
//! - [`clipboard`] - system clipboard with an OSC 52 fallback
//!
//! ```text
//! ┌────────────────────────────────────────────┐
//! │ Connected to shell session: local          │
//! │ $ ls                                       │
//! │ Cargo.toml  src  tests                     │
//! │ user@host:~/shellpane$ █                   │
//! └────────────────────────────────────────────┘
//! ```

pub mod clipboard;
pub mod config;
pub mod render;
pub mod theme;

pub use config::Config;
pub use render::{render, ShellView};
pub use theme::{PaneStyles, Theme};
