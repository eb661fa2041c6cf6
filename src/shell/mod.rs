//! # Shell Pane Core
//!
//! Terminal-agnostic state for an interactive shell pane: scrollback,
//! prompt detection, input editing, history, selection and scroll follow.
//!
//! The pane is driven by [`ShellPane::handle`], which applies one
//! [`PaneEvent`] and returns the [`Effect`]s the caller must perform. Nothing
//! in this module performs I/O; see [`crate::runtime`] for the loop that
//! executes effects against a remote shell.
//!
//! ## Modules
//!
//! - [`ansi`] - escape stripping, prompt detection, chunk normalization
//! - [`output`] - capped scrollback and its thread-safe sink
//! - [`input`] - readline-style input line
//! - [`history`] - local command history
//! - [`pending`] - tab-completion and history round-trips
//! - [`selection`] - mouse selection over the flattened content
//! - [`viewport`] - scroll position and follow mode
//! - [`pane`] - the state object tying it all together

pub mod ansi;
pub mod error;
pub mod event;
pub mod history;
pub mod input;
pub mod output;
pub mod pane;
pub mod pending;
pub mod selection;
pub mod viewport;

pub use ansi::{PromptDetector, PromptPattern};
pub use error::ShellError;
pub use event::{CommandSubmission, Effect, PaneEvent, ShellMsg};
pub use output::{DisplayLine, LineKind, OutputSink};
pub use pane::{PaneConfig, PaneFrame, RemoteCapabilities, ShellPane, INITIALIZING_TEXT};
