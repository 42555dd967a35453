//! Raw terminal access.
//!
//! Owns the switch into and out of raw input mode, the byte-level input
//! channel, and the window-size query. Input reads are bounded by a short
//! timeout so callers can re-poll instead of blocking forever; a read that
//! returns no byte is not an error.

use std::io::{self, Read, Write};

use crossterm::terminal;
use thiserror::Error;
use tracing::warn;

/// Input read timeout in milliseconds
const READ_TIMEOUT_MS: i32 = 100;

#[derive(Error, Debug)]
pub enum TermError {
    #[error("failed to enable raw mode: {0}")]
    RawMode(#[source] io::Error),

    #[error("unable to determine window size")]
    WindowSize,

    #[error("terminal I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, TermError>;

/// Source of raw input bytes with a bounded read.
///
/// `Ok(None)` means the timeout elapsed with nothing to read. The key
/// decoder is written against this trait so it can be driven by scripted
/// byte sequences in tests.
pub trait ByteRead {
    fn read_byte(&mut self) -> Result<Option<u8>>;
}

/// Handle on the controlling terminal.
///
/// Raw mode is tracked so `disable_raw_mode` is idempotent and the `Drop`
/// impl restores the original mode on every exit path, including panics.
pub struct Terminal {
    stdin: io::Stdin,
    raw: bool,
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Terminal {
    pub fn new() -> Self {
        Self {
            stdin: io::stdin(),
            raw: false,
        }
    }

    /// Switch the terminal into raw input mode
    pub fn enable_raw_mode(&mut self) -> Result<()> {
        terminal::enable_raw_mode().map_err(TermError::RawMode)?;
        self.raw = true;
        Ok(())
    }

    /// Restore the original terminal mode
    pub fn disable_raw_mode(&mut self) {
        if self.raw {
            if let Err(e) = terminal::disable_raw_mode() {
                warn!("failed to restore terminal mode: {}", e);
            }
            self.raw = false;
        }
    }

    /// Query the window size as (rows, cols).
    ///
    /// Falls back to positioning the cursor at the bottom-right corner and
    /// asking the terminal to report where it ended up. Failure of both
    /// mechanisms is fatal to the caller.
    pub fn window_size(&mut self) -> Result<(u16, u16)> {
        match terminal::size() {
            Ok((cols, rows)) if cols > 0 && rows > 0 => Ok((rows, cols)),
            _ => self.cursor_position_fallback(),
        }
    }

    /// Window size via a cursor-position report (`ESC [ 6 n`).
    fn cursor_position_fallback(&mut self) -> Result<(u16, u16)> {
        let mut stdout = io::stdout();
        stdout.write_all(b"\x1b[999C\x1b[999B\x1b[6n")?;
        stdout.flush()?;

        // Response: ESC [ <rows> ; <cols> R
        let mut response = Vec::with_capacity(16);
        loop {
            match self.read_byte()? {
                Some(b'R') => break,
                Some(b) => {
                    response.push(b);
                    if response.len() > 32 {
                        return Err(TermError::WindowSize);
                    }
                }
                None => return Err(TermError::WindowSize),
            }
        }
        parse_cursor_report(&response).ok_or(TermError::WindowSize)
    }
}

impl ByteRead for Terminal {
    fn read_byte(&mut self) -> Result<Option<u8>> {
        if !stdin_ready(READ_TIMEOUT_MS)? {
            return Ok(None);
        }
        let mut buf = [0u8; 1];
        let n = self.stdin.read(&mut buf)?;
        Ok(if n == 1 { Some(buf[0]) } else { None })
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        self.disable_raw_mode();
    }
}

/// Parse the body of a cursor-position report, without the trailing `R`
fn parse_cursor_report(response: &[u8]) -> Option<(u16, u16)> {
    let text = std::str::from_utf8(response).ok()?;
    let body = text.strip_prefix("\x1b[")?;
    let (rows, cols) = body.split_once(';')?;
    Some((rows.parse().ok()?, cols.parse().ok()?))
}

/// Wait until stdin has input, up to `timeout_ms`
#[cfg(unix)]
fn stdin_ready(timeout_ms: i32) -> Result<bool> {
    let mut fds = libc::pollfd {
        fd: libc::STDIN_FILENO,
        events: libc::POLLIN,
        revents: 0,
    };
    let rc = unsafe { libc::poll(&mut fds, 1, timeout_ms) };
    if rc < 0 {
        let err = io::Error::last_os_error();
        if err.kind() == io::ErrorKind::Interrupted {
            return Ok(false);
        }
        return Err(err.into());
    }
    Ok(rc > 0 && fds.revents & libc::POLLIN != 0)
}

/// Non-unix fallback: reads block until a byte arrives
#[cfg(not(unix))]
fn stdin_ready(_timeout_ms: i32) -> Result<bool> {
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cursor_report() {
        assert_eq!(parse_cursor_report(b"\x1b[24;80"), Some((24, 80)));
        assert_eq!(parse_cursor_report(b"\x1b[1;1"), Some((1, 1)));
    }

    #[test]
    fn test_parse_cursor_report_rejects_garbage() {
        assert_eq!(parse_cursor_report(b""), None);
        assert_eq!(parse_cursor_report(b"24;80"), None);
        assert_eq!(parse_cursor_report(b"\x1b[24"), None);
        assert_eq!(parse_cursor_report(b"\x1b[a;b"), None);
    }
}
