//! # Local PTY Session
//!
//! A [`ShellHandlers`] implementation that runs a local shell inside a
//! pseudo-terminal, used by the `shellpane` binary.
//!
//! ## Architecture
//!
//! - `portable-pty` opens the PTY and spawns the shell on connect
//! - A background reader thread forwards raw output as
//!   [`ShellMsg::Output`] and reports [`ShellMsg::Disconnected`] at EOF
//! - Commands and completion requests are written to the PTY master
//!
//! The remote line buffer is killed with `Ctrl+U` before anything is typed
//! into it, so a completion request never stacks on leftovers from an
//! earlier one.

use crate::runtime::ShellHandlers;
use crate::shell::{CommandSubmission, RemoteCapabilities, ShellMsg};
use anyhow::{anyhow, Context, Result};
use portable_pty::{
    Child, ChildKiller, CommandBuilder, MasterPty, NativePtySystem, PtySize, PtySystem,
};
use std::io::{Read, Write};
use std::sync::Mutex;
use tokio::sync::mpsc::UnboundedSender;

const KILL_LINE: &str = "\x15";

struct PtyState {
    master: Box<dyn MasterPty + Send>,
    writer: Box<dyn Write + Send>,
    child: Box<dyn Child + Send + Sync>,
}

/// A shell process behind a PTY.
pub struct PtySession {
    program: String,
    size: Mutex<PtySize>,
    tx: UnboundedSender<ShellMsg>,
    state: Mutex<Option<PtyState>>,
}

impl PtySession {
    pub fn new(program: &str, tx: UnboundedSender<ShellMsg>) -> Self {
        Self {
            program: program.to_string(),
            size: Mutex::new(PtySize {
                rows: 24,
                cols: 80,
                pixel_width: 0,
                pixel_height: 0,
            }),
            tx,
            state: Mutex::new(None),
        }
    }

    /// The user's login shell, or `sh`.
    pub fn default_program() -> String {
        std::env::var("SHELL").unwrap_or_else(|_| "sh".to_string())
    }

    fn write(&self, data: &str) -> Result<()> {
        let mut guard = self
            .state
            .lock()
            .map_err(|e| anyhow!("Failed to lock PTY state: {}", e))?;
        let state = guard.as_mut().context("Shell is not connected")?;
        state
            .writer
            .write_all(data.as_bytes())
            .context("Failed to write to PTY")?;
        state.writer.flush().context("Failed to flush PTY writer")?;
        Ok(())
    }

    fn spawn_reader(&self, reader: Box<dyn Read + Send>) {
        let tx = self.tx.clone();
        std::thread::spawn(move || pump_output(reader, &tx));
    }
}

/// Forward everything `reader` yields as [`ShellMsg::Output`], then report
/// [`ShellMsg::Disconnected`]. Characters split across reads are joined
/// before they are sent.
fn pump_output(mut reader: impl Read, tx: &UnboundedSender<ShellMsg>) {
    let mut decoder = Utf8Decoder::default();
    let mut buf = [0u8; 4096];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => {
                let chunk = decoder.decode(&buf[..n]);
                if !chunk.is_empty() && tx.send(ShellMsg::Output(chunk)).is_err() {
                    return;
                }
            }
            Err(err) => {
                tracing::debug!(error = %err, "PTY read ended");
                break;
            }
        }
    }
    if let Some(rest) = decoder.finish() {
        let _ = tx.send(ShellMsg::Output(rest));
    }
    let _ = tx.send(ShellMsg::Disconnected);
}

/// Incremental UTF-8 decoding. An incomplete sequence at the end of a read
/// is held back until the next one; invalid bytes become U+FFFD.
#[derive(Debug, Default)]
struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    fn decode(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        let mut out = String::new();
        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    out.push_str(text);
                    self.pending.clear();
                    return out;
                }
                Err(err) => {
                    let valid = err.valid_up_to();
                    if let Ok(text) = std::str::from_utf8(&self.pending[..valid]) {
                        out.push_str(text);
                    }
                    match err.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + len);
                        }
                        None => {
                            self.pending.drain(..valid);
                            return out;
                        }
                    }
                }
            }
        }
    }

    /// Whatever is still held back, decoded lossily.
    fn finish(self) -> Option<String> {
        (!self.pending.is_empty()).then(|| String::from_utf8_lossy(&self.pending).into_owned())
    }
}

impl ShellHandlers for PtySession {
    fn on_connect(&self) -> Result<()> {
        let size = *self
            .size
            .lock()
            .map_err(|e| anyhow!("Failed to lock PTY size: {}", e))?;

        let pty_pair = NativePtySystem::default()
            .openpty(size)
            .context("Failed to open PTY")?;

        let mut cmd = CommandBuilder::new(&self.program);
        cmd.env("TERM", "dumb");
        if let Ok(dir) = std::env::current_dir() {
            cmd.cwd(dir);
        }

        let child = pty_pair
            .slave
            .spawn_command(cmd)
            .with_context(|| format!("Failed to spawn {} in PTY", self.program))?;
        drop(pty_pair.slave);

        let reader = pty_pair
            .master
            .try_clone_reader()
            .context("Failed to clone PTY reader")?;
        let writer = pty_pair
            .master
            .take_writer()
            .context("Failed to take PTY writer")?;

        self.spawn_reader(reader);

        let mut guard = self
            .state
            .lock()
            .map_err(|e| anyhow!("Failed to lock PTY state: {}", e))?;
        *guard = Some(PtyState {
            master: pty_pair.master,
            writer,
            child,
        });

        tracing::info!(program = %self.program, "shell spawned");
        Ok(())
    }

    fn on_disconnect(&self) -> Result<()> {
        let mut guard = self
            .state
            .lock()
            .map_err(|e| anyhow!("Failed to lock PTY state: {}", e))?;
        if let Some(mut state) = guard.take() {
            state.child.kill().context("Failed to stop shell")?;
        }
        Ok(())
    }

    fn on_resize(&self, cols: u16, rows: u16) -> Result<()> {
        let size = PtySize {
            rows,
            cols,
            pixel_width: 0,
            pixel_height: 0,
        };
        if let Ok(mut current) = self.size.lock() {
            *current = size;
        }
        let guard = self
            .state
            .lock()
            .map_err(|e| anyhow!("Failed to lock PTY state: {}", e))?;
        if let Some(state) = guard.as_ref() {
            state.master.resize(size).context("Failed to resize PTY")?;
        }
        Ok(())
    }

    fn on_command(&self, submission: &CommandSubmission) -> Result<()> {
        if submission.already_sent {
            self.write("\r")
        } else {
            self.write(&format!("{}{}\r", KILL_LINE, submission.command))
        }
    }

    fn on_tab_send(&self, current: &str) -> Result<()> {
        self.write(&format!("{}{}\t", KILL_LINE, current))
    }

    fn capabilities(&self) -> RemoteCapabilities {
        RemoteCapabilities {
            tab_completion: true,
            history: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tokio::sync::mpsc;

    #[test]
    fn test_write_before_connect_fails() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let session = PtySession::new("sh", tx);
        let err = session
            .on_command(&CommandSubmission {
                command: "ls".to_string(),
                already_sent: false,
            })
            .expect_err("not connected");
        assert!(err.to_string().contains("not connected"));
    }

    #[test]
    fn test_resize_before_connect_is_remembered() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let session = PtySession::new("sh", tx);
        session.on_resize(120, 40).expect("resize");
        let size = *session.size.lock().expect("lock");
        assert_eq!((size.cols, size.rows), (120, 40));
    }

    #[test]
    fn test_disconnect_without_session_is_ok() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let session = PtySession::new("sh", tx);
        assert!(session.on_disconnect().is_ok());
    }

    fn collect_output(rx: &mut mpsc::UnboundedReceiver<ShellMsg>) -> (String, bool) {
        let mut text = String::new();
        let mut disconnected = false;
        while let Ok(msg) = rx.try_recv() {
            match msg {
                ShellMsg::Output(chunk) => text.push_str(&chunk),
                ShellMsg::Disconnected => disconnected = true,
                _ => {}
            }
        }
        (text, disconnected)
    }

    #[test]
    fn test_reader_keeps_characters_split_across_reads() {
        // 4095 bytes then a two-byte character: the first read ends mid-character.
        let expected = format!("{}é\n", "a".repeat(4095));
        let (tx, mut rx) = mpsc::unbounded_channel();
        pump_output(Cursor::new(expected.clone().into_bytes()), &tx);

        let (text, disconnected) = collect_output(&mut rx);
        assert!(!text.contains(char::REPLACEMENT_CHARACTER));
        assert_eq!(text, expected);
        assert!(disconnected);
    }

    #[test]
    fn test_decoder_joins_split_sequences() {
        let mut decoder = Utf8Decoder::default();
        let bytes = "日本".as_bytes();
        assert_eq!(decoder.decode(&bytes[..2]), "");
        assert_eq!(decoder.decode(&bytes[2..4]), "日");
        assert_eq!(decoder.decode(&bytes[4..]), "本");
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn test_decoder_replaces_invalid_bytes() {
        let mut decoder = Utf8Decoder::default();
        assert_eq!(decoder.decode(b"ok\xffgo"), "ok\u{FFFD}go");
    }

    #[test]
    fn test_truncated_tail_is_flushed_at_eof() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        pump_output(Cursor::new(b"end\xe6\x97".to_vec()), &tx);
        let (text, disconnected) = collect_output(&mut rx);
        assert_eq!(text, "end\u{FFFD}");
        assert!(disconnected);
    }
}
