use thiserror::Error;

/// Failures originating inside the shell pane itself.
///
/// Handler failures are not represented here: those belong to the caller and
/// travel as `anyhow::Error` until the pane turns them into error lines.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("invalid prompt pattern `{name}`: {source}")]
    InvalidPromptPattern {
        name: String,
        #[source]
        source: regex::Error,
    },

    #[error("clipboard unavailable: {0}")]
    Clipboard(String),
}
