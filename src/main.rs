//! # shellpane CLI Entry Point
//!
//! Hosts a [`ShellPane`] full-screen over a local shell running in a
//! pseudo-terminal.
//!
//! ## Usage
//!
//! ```bash
//! # Use $SHELL
//! shellpane
//!
//! # Pick the shell, theme and scrollback size
//! shellpane --shell bash --theme Nord --max-lines 5000
//!
//! # Debug logging
//! RUST_LOG=shellpane=debug shellpane --log-file /tmp/shellpane.log
//! ```
//!
//! ## Key Bindings
//!
//! - `Enter` - Run the input line
//! - `Tab` - Complete via the shell
//! - `Up` / `Down` - Walk command history
//! - `Ctrl+C` - Clear the selection, or the input line
//! - `Ctrl+L` - Clear the output
//! - `Esc` - Clear the selection
//! - `Ctrl+D` - Disconnect and quit
//! - Mouse drag - Select and copy text; double-click a word, triple-click a line
//! - Mouse wheel - Scroll

use shellpane::logging;
use shellpane::pty_session::PtySession;
use shellpane::runtime::{CrosstermEventReader, Runtime, ShellHandlers};
use shellpane::shell::ShellPane;
use shellpane::ui::clipboard::SystemClipboard;
use shellpane::ui::{Config, Theme};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::panic;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

/// shellpane - an interactive shell in a terminal pane
#[derive(Parser, Debug)]
#[command(name = "shellpane")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Interactive shell pane with prompt tracking and mouse selection", long_about = None)]
struct Args {
    /// Shell program to run (defaults to $SHELL)
    #[arg(short, long, value_name = "PROG")]
    shell: Option<String>,

    /// Session identifier shown in the connection banner
    #[arg(long, value_name = "ID")]
    session: Option<String>,

    /// Configuration file (defaults to the platform config directory)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Built-in theme name
    #[arg(short, long, value_name = "NAME")]
    theme: Option<String>,

    /// Log file (defaults to the platform data directory)
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Maximum number of scrollback lines
    #[arg(long, value_name = "N")]
    max_lines: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Set up panic hook to ensure terminal is restored on panic
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(
            io::stdout(),
            LeaveAlternateScreen,
            DisableMouseCapture,
            DisableBracketedPaste
        );
        original_hook(panic_info);
    }));

    let result = run_application(args).await;

    let _ = panic::take_hook();

    result
}

/// Resolve configuration: file first, then command-line overrides.
fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    };
    if let Some(theme) = &args.theme {
        config.theme.clone_from(theme);
    }
    if let Some(max_lines) = args.max_lines {
        config.max_output_lines = max_lines;
    }
    Ok(config)
}

fn resolve_theme(name: &str) -> Result<&'static Theme> {
    Theme::by_name(name).with_context(|| {
        let names: Vec<&str> = Theme::all().iter().map(|t| t.name).collect();
        format!("Unknown theme '{}'. Available: {}", name, names.join(", "))
    })
}

async fn run_application(args: Args) -> Result<()> {
    let log_path = match &args.log_file {
        Some(path) => path.clone(),
        None => logging::default_log_path()?,
    };
    if let Err(e) = logging::init_global(&log_path) {
        eprintln!("Warning: logging disabled: {:#}", e);
    }

    let config = load_config(&args)?;
    let styles = resolve_theme(&config.theme)?.styles();

    let program = args.shell.clone().unwrap_or_else(PtySession::default_program);
    let session_id = args
        .session
        .clone()
        .unwrap_or_else(|| format!("local-{}", std::process::id()));

    let (tx, rx) = mpsc::unbounded_channel();
    let session = Arc::new(PtySession::new(&program, tx.clone()));
    let mut pane =
        ShellPane::new(&session_id, &config.pane_config())?.with_remote(session.capabilities());
    let mut runtime = Runtime::new(session, Box::new(SystemClipboard::new()), tx, rx);

    tracing::info!(session = %session_id, program = %program, "starting");

    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )
    .context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let mut event_reader = CrosstermEventReader;
    let run_result = runtime
        .run(&mut terminal, &mut pane, &styles, &mut event_reader)
        .await;

    // Restore terminal (always runs, even if the loop failed)
    let cleanup_result = cleanup_terminal(&mut terminal);

    run_result?;
    cleanup_result?;

    Ok(())
}

fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;

    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )
    .context("Failed to restore terminal")?;

    terminal.show_cursor().context("Failed to show cursor")?;

    Ok(())
}
