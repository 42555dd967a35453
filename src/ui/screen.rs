//! Screen composition.
//!
//! Builds one in-memory frame per refresh and flushes it with a single
//! write, so the terminal never sees a partial update. Cursor movement and
//! visibility go through crossterm commands queued into the frame; color
//! and video attributes are written as raw SGR sequences.

use std::io::{self, Write};

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    queue,
    terminal::{Clear, ClearType},
};

use crate::buffer::Highlight;
use crate::editor::Editor;

/// Foreground SGR sequence for one highlight class
fn hl_color(hl: Highlight) -> &'static [u8] {
    match hl {
        Highlight::Normal => b"\x1b[39m",
        Highlight::Number => b"\x1b[31m",
        Highlight::Match => b"\x1b[34m",
    }
}

/// The compositor: owns the frame buffer reused across refreshes
pub struct Screen {
    frame: Vec<u8>,
}

impl Default for Screen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen {
    pub fn new() -> Self {
        Self {
            frame: Vec::with_capacity(16 * 1024),
        }
    }

    /// Recompute the viewport, compose a full frame, and flush it in one
    /// write
    pub fn refresh(&mut self, ed: &mut Editor) -> io::Result<()> {
        ed.scroll();
        self.compose(ed)?;

        let stdout = io::stdout();
        let mut out = stdout.lock();
        out.write_all(&self.frame)?;
        out.flush()
    }

    /// Wipe the screen; used when leaving the editor
    pub fn clear(&mut self) -> io::Result<()> {
        self.frame.clear();
        queue!(self.frame, Clear(ClearType::All), MoveTo(0, 0))?;

        let stdout = io::stdout();
        let mut out = stdout.lock();
        out.write_all(&self.frame)?;
        out.flush()
    }

    /// Build the frame: hidden cursor, text rows, status bar, message bar,
    /// cursor placement
    fn compose(&mut self, ed: &Editor) -> io::Result<()> {
        self.frame.clear();
        queue!(self.frame, Hide, MoveTo(0, 0))?;

        self.draw_rows(ed);
        self.draw_status_bar(ed);
        self.draw_message_bar(ed);

        let crow = ed.cy.saturating_sub(ed.row_off) as u16;
        let ccol = ed.rx.saturating_sub(ed.col_off) as u16;
        queue!(self.frame, MoveTo(ccol, crow), Show)?;
        Ok(())
    }

    fn draw_rows(&mut self, ed: &Editor) {
        for y in 0..ed.screen_rows {
            let file_row = y + ed.row_off;
            match ed.doc.row(file_row) {
                Some(row) => self.draw_text_row(row.render(), row.hl(), ed),
                None => self.draw_filler_row(ed, y),
            }
            self.frame.extend_from_slice(b"\x1b[K\r\n");
        }
    }

    /// One buffer row: the visible render slice, switching colors only on
    /// highlight transitions and resetting at the end of the row
    fn draw_text_row(&mut self, render: &[u8], hl: &[Highlight], ed: &Editor) {
        let start = ed.col_off.min(render.len());
        let end = (start + ed.screen_cols).min(render.len());

        let mut current = Highlight::Normal;
        for i in start..end {
            if hl[i] != current {
                current = hl[i];
                self.frame.extend_from_slice(hl_color(current));
            }
            self.frame.push(render[i]);
        }
        if current != Highlight::Normal {
            self.frame.extend_from_slice(hl_color(Highlight::Normal));
        }
    }

    /// `~` filler past the end of the document, with a centered welcome
    /// banner a third of the way down an empty document
    fn draw_filler_row(&mut self, ed: &Editor, y: usize) {
        if ed.doc.is_empty() && y == ed.screen_rows / 3 {
            let mut welcome = format!("ted editor -- version {}", crate::VERSION);
            welcome.truncate(ed.screen_cols);
            let padding = (ed.screen_cols - welcome.len()) / 2;
            if padding > 0 {
                self.frame.push(b'~');
                for _ in 1..padding {
                    self.frame.push(b' ');
                }
            }
            self.frame.extend_from_slice(welcome.as_bytes());
        } else {
            self.frame.push(b'~');
        }
    }

    /// Inverse-video bar: filename, line count, modified marker, and the
    /// cursor line on the right
    fn draw_status_bar(&mut self, ed: &Editor) {
        self.frame.extend_from_slice(b"\x1b[7m");

        let name = ed
            .doc
            .filename()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_else(|| "[No Name]".to_string());
        let modified = if ed.doc.is_dirty() { " (modified)" } else { "" };

        let mut left = format!(" {:.20} - {} lines{}", name, ed.doc.len(), modified);
        left.truncate(ed.screen_cols);
        let right = format!("{}/{} ", ed.cy + 1, ed.doc.len());

        self.frame.extend_from_slice(left.as_bytes());
        if left.len() + right.len() <= ed.screen_cols {
            let padding = ed.screen_cols - left.len() - right.len();
            for _ in 0..padding {
                self.frame.push(b' ');
            }
            self.frame.extend_from_slice(right.as_bytes());
        } else {
            for _ in left.len()..ed.screen_cols {
                self.frame.push(b' ');
            }
        }

        self.frame.extend_from_slice(b"\x1b[m\r\n");
    }

    /// The transient message line below the status bar
    fn draw_message_bar(&mut self, ed: &Editor) {
        self.frame.extend_from_slice(b"\x1b[K");
        if let Some(msg) = ed.status_text() {
            let mut msg = msg.to_string();
            msg.truncate(ed.screen_cols);
            self.frame.extend_from_slice(msg.as_bytes());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{Document, RenderOpts};
    use crate::config::Config;

    fn editor_with(lines: &[&str]) -> Editor {
        let mut doc = Document::new(RenderOpts::default());
        for (i, line) in lines.iter().enumerate() {
            doc.insert_row(i, line.as_bytes().to_vec());
        }
        Editor::new(doc, &Config::default(), 24, 80)
    }

    fn composed(ed: &mut Editor) -> Vec<u8> {
        ed.scroll();
        let mut screen = Screen::new();
        screen.compose(ed).unwrap();
        screen.frame
    }

    fn contains(frame: &[u8], needle: &[u8]) -> bool {
        frame.windows(needle.len()).any(|w| w == needle)
    }

    #[test]
    fn test_empty_document_shows_welcome_and_filler() {
        let mut ed = editor_with(&[]);
        let frame = composed(&mut ed);
        assert!(contains(&frame, b"ted editor -- version"));
        assert!(contains(&frame, b"~\x1b[K\r\n"));
    }

    #[test]
    fn test_document_rows_are_rendered() {
        let mut ed = editor_with(&["Hello", "World"]);
        let frame = composed(&mut ed);
        assert!(contains(&frame, b"Hello\x1b[K"));
        assert!(contains(&frame, b"World\x1b[K"));
        // no welcome banner once the document has content
        assert!(!contains(&frame, b"version"));
    }

    #[test]
    fn test_status_bar_placeholder_and_inverse_video() {
        let mut ed = editor_with(&["x"]);
        let frame = composed(&mut ed);
        assert!(contains(&frame, b"\x1b[7m"));
        assert!(contains(&frame, b"[No Name]"));
        assert!(contains(&frame, b"(modified)"));
        assert!(contains(&frame, b"1/1 \x1b[m"));
    }

    #[test]
    fn test_numbers_get_color_and_reset() {
        let mut ed = editor_with(&["abc 42"]);
        let frame = composed(&mut ed);
        assert!(contains(&frame, b"abc \x1b[31m42\x1b[39m"));
    }

    #[test]
    fn test_message_bar_shows_fresh_status() {
        let mut ed = editor_with(&[]);
        ed.set_status("HELP: Ctrl-S = save");
        let frame = composed(&mut ed);
        assert!(contains(&frame, b"HELP: Ctrl-S = save"));
    }

    #[test]
    fn test_long_row_is_clipped_to_screen_width() {
        let long = "x".repeat(300);
        let mut ed = editor_with(&[&long]);
        let frame = composed(&mut ed);
        assert!(!contains(&frame, "x".repeat(81).as_bytes()));
        assert!(contains(&frame, "x".repeat(80).as_bytes()));
    }

    #[test]
    fn test_column_offset_slices_rows() {
        let mut ed = editor_with(&["0123456789"]);
        ed.col_off = 4;
        // compose without scroll so the offset stays put
        let mut screen = Screen::new();
        ed.rx = 4;
        ed.cx = 4;
        screen.compose(&ed).unwrap();
        assert!(contains(&screen.frame, b"456789\x1b[K"));
        assert!(!contains(&screen.frame, b"0123456789"));
    }
}
