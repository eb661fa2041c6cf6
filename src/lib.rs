//! shellpane - an interactive shell pane for ratatui applications
//!
//! The pane buffers remote command output, strips control sequences, tracks
//! a changing shell prompt, supports mouse selection with clipboard copy and
//! keeps the view sensibly scrolled while output keeps arriving.
//!
//! - [`shell`] - the terminal-agnostic pane state and event dispatcher
//! - [`ui`] - rendering, themes, configuration and the clipboard
//! - [`runtime`] - effect execution and the terminal run loop
//! - [`pty_session`] - a local shell in a pseudo-terminal
//! - [`logging`] - tracing setup

pub mod logging;
pub mod pty_session;
pub mod runtime;
pub mod shell;
pub mod ui;
