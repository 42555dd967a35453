//! Editor state and command dispatch.
//!
//! This module owns everything between a decoded key and the buffer:
//!
//! - **Editor**: cursor, viewport offsets, status message, quit confirmation
//! - **dispatch**: key events to edits, moves, save and search requests
//! - **prompt**: the single-line input loop used by save-as and search
//! - **search**: incremental search session (submodule)
//!
//! The dispatcher itself is pure state manipulation; requests that need the
//! terminal (save-as, search) are returned as an [`Outcome`] and wired up by
//! the main loop.

pub mod search;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{error, info};

use crate::buffer::Document;
use crate::config::Config;
use crate::core::input::{ctrl, read_key, Key, ESC};
use crate::core::term::Terminal;
use crate::ui::Screen;

/// Rows reserved below the text area (status bar + message bar)
const RESERVED_ROWS: usize = 2;

/// Status messages stop rendering after this long
const MESSAGE_TIMEOUT: Duration = Duration::from_secs(5);

/// What the main loop should do with a processed key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Quit,
    /// Save requested; may need a filename prompt
    Save,
    /// Incremental search requested
    Find,
}

/// A transient message for the message bar
struct StatusMessage {
    text: String,
    time: Instant,
}

/// The whole editing session: document, cursor, viewport, status.
///
/// `cy` may equal `doc.len()` (one past the last row, for appending);
/// `cx` is a byte column and `rx` the derived display column.
pub struct Editor {
    pub doc: Document,
    pub cx: usize,
    pub cy: usize,
    pub rx: usize,
    pub row_off: usize,
    pub col_off: usize,
    pub screen_rows: usize,
    pub screen_cols: usize,
    status: Option<StatusMessage>,
    quit_confirm: u32,
    quit_remaining: u32,
}

impl Editor {
    pub fn new(doc: Document, config: &Config, rows: u16, cols: u16) -> Self {
        Self {
            doc,
            cx: 0,
            cy: 0,
            rx: 0,
            row_off: 0,
            col_off: 0,
            screen_rows: (rows as usize).saturating_sub(RESERVED_ROWS),
            screen_cols: cols as usize,
            status: None,
            quit_confirm: config.quit_confirm,
            quit_remaining: config.quit_confirm,
        }
    }

    /// Interpret one key event. Pure with respect to the terminal; save and
    /// search are reported back for the main loop to run.
    pub fn process_keypress(&mut self, key: Key) -> Outcome {
        if key == Key::Byte(ctrl(b'q')) {
            if self.doc.is_dirty() && self.quit_remaining > 0 {
                self.quit_remaining -= 1;
                if self.quit_remaining > 0 {
                    self.set_status(format!(
                        "WARNING! File has unsaved changes. Press Ctrl-Q {} more times to quit.",
                        self.quit_remaining
                    ));
                    return Outcome::Continue;
                }
            }
            return Outcome::Quit;
        }
        // Any non-quit key abandons a pending quit sequence
        self.quit_remaining = self.quit_confirm;

        match key {
            Key::Byte(b) if b == ctrl(b's') => Outcome::Save,
            Key::Byte(b) if b == ctrl(b'f') => Outcome::Find,
            Key::Byte(b'\r') => {
                self.insert_newline();
                Outcome::Continue
            }
            Key::Backspace | Key::Byte(0x08) => {
                self.delete_char();
                Outcome::Continue
            }
            Key::Delete => {
                self.move_cursor(Key::ArrowRight);
                self.delete_char();
                Outcome::Continue
            }
            Key::Home => {
                self.cx = 0;
                Outcome::Continue
            }
            Key::End => {
                if let Some(row) = self.doc.row(self.cy) {
                    self.cx = row.len();
                }
                Outcome::Continue
            }
            Key::PageUp | Key::PageDown => {
                self.page_scroll(key);
                Outcome::Continue
            }
            Key::ArrowUp | Key::ArrowDown | Key::ArrowLeft | Key::ArrowRight => {
                self.move_cursor(key);
                Outcome::Continue
            }
            // The refresh loop redraws every frame anyway
            Key::Byte(b) if b == ctrl(b'l') || b == ESC => Outcome::Continue,
            Key::Byte(b) if b == b'\t' || (0x20..0x80).contains(&b) => {
                self.insert_char(b);
                Outcome::Continue
            }
            _ => Outcome::Continue,
        }
    }

    /// Insert one byte at the cursor, appending a fresh row when the cursor
    /// sits one past the last line
    pub fn insert_char(&mut self, c: u8) {
        if self.cy == self.doc.len() {
            self.doc.insert_row(self.doc.len(), Vec::new());
        }
        self.doc.insert_byte(self.cy, self.cx, c);
        self.cx += 1;
    }

    /// Split the current row at the cursor, or open an empty row above when
    /// the cursor is at column 0
    pub fn insert_newline(&mut self) {
        if self.cx == 0 {
            self.doc.insert_row(self.cy, Vec::new());
        } else {
            self.doc.split_row(self.cy, self.cx);
        }
        self.cy += 1;
        self.cx = 0;
    }

    /// Delete the byte before the cursor, merging with the previous row at
    /// column 0. No-op at the very start of the document and past the end.
    pub fn delete_char(&mut self) {
        if self.cy == self.doc.len() {
            return;
        }
        if self.cx == 0 && self.cy == 0 {
            return;
        }
        if self.cx > 0 {
            self.doc.delete_byte(self.cy, self.cx - 1);
            self.cx -= 1;
        } else {
            self.cx = self.doc.row(self.cy - 1).map_or(0, |r| r.len());
            self.doc.merge_row_up(self.cy);
            self.cy -= 1;
        }
    }

    /// Move the cursor one step, wrapping at line boundaries and snapping
    /// the column to the destination row length
    pub fn move_cursor(&mut self, key: Key) {
        match key {
            Key::ArrowLeft => {
                if self.cx > 0 {
                    self.cx -= 1;
                } else if self.cy > 0 {
                    self.cy -= 1;
                    self.cx = self.doc.row(self.cy).map_or(0, |r| r.len());
                }
            }
            Key::ArrowRight => {
                if let Some(row) = self.doc.row(self.cy) {
                    if self.cx < row.len() {
                        self.cx += 1;
                    } else {
                        self.cy += 1;
                        self.cx = 0;
                    }
                }
            }
            Key::ArrowUp => {
                if self.cy > 0 {
                    self.cy -= 1;
                }
            }
            Key::ArrowDown => {
                if self.cy < self.doc.len() {
                    self.cy += 1;
                }
            }
            _ => {}
        }
        let len = self.doc.row(self.cy).map_or(0, |r| r.len());
        if self.cx > len {
            self.cx = len;
        }
    }

    /// Move a full text-window height, stepping from the window edge
    fn page_scroll(&mut self, key: Key) {
        let step = match key {
            Key::PageUp => {
                self.cy = self.row_off;
                Key::ArrowUp
            }
            Key::PageDown => {
                self.cy = (self.row_off + self.screen_rows.saturating_sub(1)).min(self.doc.len());
                Key::ArrowDown
            }
            _ => return,
        };
        for _ in 0..self.screen_rows {
            self.move_cursor(step);
        }
    }

    /// Re-derive the display column and pull the offsets so the cursor is
    /// inside the visible window. Runs fresh before every frame.
    pub fn scroll(&mut self) {
        let tab_stop = self.doc.opts().tab_stop;
        self.rx = self
            .doc
            .row(self.cy)
            .map_or(0, |r| r.cx_to_rx(self.cx, tab_stop));

        if self.cy < self.row_off {
            self.row_off = self.cy;
        }
        if self.cy >= self.row_off + self.screen_rows {
            self.row_off = self.cy + 1 - self.screen_rows;
        }
        if self.rx < self.col_off {
            self.col_off = self.rx;
        }
        if self.rx >= self.col_off + self.screen_cols {
            self.col_off = self.rx + 1 - self.screen_cols;
        }
    }

    /// Post a message to the message bar; it expires on its own
    pub fn set_status<S: Into<String>>(&mut self, text: S) {
        self.status = Some(StatusMessage {
            text: text.into(),
            time: Instant::now(),
        });
    }

    /// The current status message, if it has not expired yet
    pub fn status_text(&self) -> Option<&str> {
        self.status
            .as_ref()
            .filter(|m| m.time.elapsed() < MESSAGE_TIMEOUT)
            .map(|m| m.text.as_str())
    }

    /// Save the document, prompting for a filename when it has none
    pub fn save(&mut self, term: &mut Terminal, screen: &mut Screen) -> anyhow::Result<()> {
        if self.doc.filename().is_none() {
            match self.prompt(term, screen, "Save as: ", |_, _, _| {})? {
                Some(name) => self.doc.set_filename(PathBuf::from(name)),
                None => {
                    self.set_status("Save aborted");
                    return Ok(());
                }
            }
        }
        match self.doc.save() {
            Ok(written) => {
                info!("saved {} bytes", written);
                self.set_status(format!("{} bytes written to disk", written));
            }
            Err(e) => {
                error!("save failed: {}", e);
                self.set_status(format!("Can't save! I/O error: {}", e));
            }
        }
        Ok(())
    }

    /// Single-line input in the message bar.
    ///
    /// The callback runs after every keystroke with the input so far, which
    /// is how incremental search hooks in. Escape aborts and returns `None`;
    /// Enter submits once the input is non-empty.
    pub fn prompt<F>(
        &mut self,
        term: &mut Terminal,
        screen: &mut Screen,
        prompt: &str,
        mut callback: F,
    ) -> anyhow::Result<Option<String>>
    where
        F: FnMut(&mut Editor, &str, Key),
    {
        let mut input = String::new();
        loop {
            self.set_status(format!("{}{}", prompt, input));
            screen.refresh(self)?;

            let key = read_key(term)?;
            match key {
                Key::Backspace | Key::Delete | Key::Byte(0x08) => {
                    input.pop();
                }
                Key::Byte(ESC) => {
                    self.set_status("");
                    callback(self, &input, key);
                    return Ok(None);
                }
                Key::Byte(b'\r') => {
                    if !input.is_empty() {
                        self.set_status("");
                        callback(self, &input, key);
                        return Ok(Some(input));
                    }
                }
                Key::Byte(b) if !b.is_ascii_control() && b < 0x80 => {
                    input.push(b as char);
                }
                _ => {}
            }
            callback(self, &input, key);
        }
    }
}
