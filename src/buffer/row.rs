//! A single document row and its display form.
//!
//! Every row keeps its logical bytes (`chars`, no trailing newline) plus two
//! derived sequences: `render`, with tabs expanded to the next tab stop, and
//! a highlight class per display column. Both are rebuilt together on every
//! mutation so they are never read stale.

/// Separators terminate a numeric literal and allow a new one to start
const SEPARATORS: &[u8] = b",.()+-/*=~%<>[];";

/// Rendering parameters fixed at startup
#[derive(Debug, Clone, Copy)]
pub struct RenderOpts {
    /// Display columns per tab stop
    pub tab_stop: usize,
    /// Classify numeric literals
    pub highlight_numbers: bool,
}

impl Default for RenderOpts {
    fn default() -> Self {
        Self {
            tab_stop: 8,
            highlight_numbers: true,
        }
    }
}

/// Highlight class of one display column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    Normal,
    Number,
    /// Current search match
    Match,
}

/// One logical line of text
#[derive(Debug, Clone)]
pub struct Row {
    /// Logical content, without the terminating newline
    chars: Vec<u8>,
    /// Display form: tabs expanded to spaces
    render: Vec<u8>,
    /// Highlight class per display column; always `render.len()` long
    hl: Vec<Highlight>,
}

impl Row {
    pub fn new(chars: Vec<u8>, opts: RenderOpts) -> Self {
        let mut row = Self {
            chars,
            render: Vec::new(),
            hl: Vec::new(),
        };
        row.update(opts);
        row
    }

    /// Logical length in bytes
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn chars(&self) -> &[u8] {
        &self.chars
    }

    pub fn render(&self) -> &[u8] {
        &self.render
    }

    pub fn hl(&self) -> &[Highlight] {
        &self.hl
    }

    /// Convert a byte column into a display column
    pub fn cx_to_rx(&self, cx: usize, tab_stop: usize) -> usize {
        let mut rx = 0;
        for &c in self.chars.iter().take(cx) {
            if c == b'\t' {
                rx += (tab_stop - 1) - (rx % tab_stop);
            }
            rx += 1;
        }
        rx
    }

    /// Convert a display column back into a byte column.
    ///
    /// Returns the first byte column whose expansion passes `rx`, so a
    /// display column inside a tab resolves to the tab itself.
    pub fn rx_to_cx(&self, rx: usize, tab_stop: usize) -> usize {
        let mut cur_rx = 0;
        for (cx, &c) in self.chars.iter().enumerate() {
            if c == b'\t' {
                cur_rx += (tab_stop - 1) - (cur_rx % tab_stop);
            }
            cur_rx += 1;
            if cur_rx > rx {
                return cx;
            }
        }
        self.chars.len()
    }

    /// Insert one byte at `at`, clamped to the row length
    pub fn insert_byte(&mut self, at: usize, c: u8, opts: RenderOpts) {
        let at = at.min(self.chars.len());
        self.chars.insert(at, c);
        self.update(opts);
    }

    /// Delete the byte at `at`; out of range is a no-op
    pub fn delete_byte(&mut self, at: usize, opts: RenderOpts) {
        if at < self.chars.len() {
            self.chars.remove(at);
            self.update(opts);
        }
    }

    /// Append raw bytes to the end of the row
    pub fn append(&mut self, bytes: &[u8], opts: RenderOpts) {
        self.chars.extend_from_slice(bytes);
        self.update(opts);
    }

    /// Split the row at `at`, keeping the left part and returning the right.
    ///
    /// Each side owns its bytes; nothing is shared.
    pub fn split_off(&mut self, at: usize, opts: RenderOpts) -> Row {
        let at = at.min(self.chars.len());
        let rest = self.chars.split_off(at);
        self.update(opts);
        Row::new(rest, opts)
    }

    /// First display column where `needle` occurs in the render form
    pub fn find(&self, needle: &[u8]) -> Option<usize> {
        if needle.is_empty() || needle.len() > self.render.len() {
            return None;
        }
        self.render
            .windows(needle.len())
            .position(|window| window == needle)
    }

    /// Paint a display-column range as the current search match
    pub fn highlight_match(&mut self, at: usize, len: usize) {
        let hl_len = self.hl.len();
        let end = (at + len).min(hl_len);
        for h in &mut self.hl[at.min(hl_len)..end] {
            *h = Highlight::Match;
        }
    }

    /// Replace the highlight array, restoring a snapshot taken before a
    /// search match was painted
    pub fn set_hl(&mut self, hl: Vec<Highlight>) {
        if hl.len() == self.render.len() {
            self.hl = hl;
        }
    }

    /// Rebuild the render form and its highlight array
    fn update(&mut self, opts: RenderOpts) {
        self.render.clear();
        for &c in &self.chars {
            if c == b'\t' {
                self.render.push(b' ');
                while self.render.len() % opts.tab_stop != 0 {
                    self.render.push(b' ');
                }
            } else {
                self.render.push(c);
            }
        }
        self.update_highlight(opts);
    }

    /// Single left-to-right pass; the only carried state is whether the
    /// previous character was a separator
    fn update_highlight(&mut self, opts: RenderOpts) {
        self.hl = vec![Highlight::Normal; self.render.len()];
        if !opts.highlight_numbers {
            return;
        }
        let mut prev_sep = true;
        for i in 0..self.render.len() {
            let c = self.render[i];
            let prev_hl = if i > 0 { self.hl[i - 1] } else { Highlight::Normal };
            let is_number = (c.is_ascii_digit() && (prev_sep || prev_hl == Highlight::Number))
                || (c == b'.' && prev_hl == Highlight::Number);
            if is_number {
                self.hl[i] = Highlight::Number;
                prev_sep = false;
            } else {
                prev_sep = is_separator(c);
            }
        }
    }
}

fn is_separator(c: u8) -> bool {
    c == b'\0' || c.is_ascii_whitespace() || SEPARATORS.contains(&c)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(text: &str) -> Row {
        Row::new(text.as_bytes().to_vec(), RenderOpts::default())
    }

    #[test]
    fn test_render_expands_tabs() {
        let r = row("a\tb");
        assert_eq!(r.render(), b"a       b");
        assert_eq!(r.hl().len(), r.render().len());
    }

    #[test]
    fn test_render_tab_at_stop_boundary() {
        // A tab right on a stop boundary still advances a full stop
        let r = row("12345678\tx");
        assert_eq!(r.render(), b"12345678        x");
    }

    #[test]
    fn test_cx_rx_round_trip() {
        let r = row("\ta\tbc\td");
        for cx in 0..=r.len() {
            let rx = r.cx_to_rx(cx, 8);
            assert_eq!(r.rx_to_cx(rx, 8), cx, "cx {} rx {}", cx, rx);
        }
    }

    #[test]
    fn test_rx_inside_tab_resolves_to_the_tab() {
        let r = row("\tx");
        for rx in 0..8 {
            assert_eq!(r.rx_to_cx(rx, 8), 0);
        }
        assert_eq!(r.rx_to_cx(8, 8), 1);
    }

    #[test]
    fn test_number_highlighting() {
        let r = row("see 42 and 3.14, x9");
        let hl = r.hl();
        // "42" at display columns 4-5
        assert_eq!(hl[4], Highlight::Number);
        assert_eq!(hl[5], Highlight::Number);
        // "3.14" at 11-14, decimal point included
        for i in 11..15 {
            assert_eq!(hl[i], Highlight::Number, "column {}", i);
        }
        // the comma after it is not
        assert_eq!(hl[15], Highlight::Normal);
        // "9" glued to a letter is not a number
        assert_eq!(hl[18], Highlight::Normal);
    }

    #[test]
    fn test_number_after_separator_punctuation() {
        let r = row("(1+2)*3");
        for (i, expect) in [
            Highlight::Normal,
            Highlight::Number,
            Highlight::Normal,
            Highlight::Number,
            Highlight::Normal,
            Highlight::Normal,
            Highlight::Number,
        ]
        .iter()
        .enumerate()
        {
            assert_eq!(r.hl()[i], *expect, "column {}", i);
        }
    }

    #[test]
    fn test_highlighting_can_be_disabled() {
        let opts = RenderOpts {
            highlight_numbers: false,
            ..RenderOpts::default()
        };
        let r = Row::new(b"42".to_vec(), opts);
        assert!(r.hl().iter().all(|&h| h == Highlight::Normal));
    }

    #[test]
    fn test_edit_rebuilds_render_and_highlight() {
        let mut r = row("4x");
        assert_eq!(r.hl()[0], Highlight::Number);
        r.delete_byte(1, RenderOpts::default());
        assert_eq!(r.render(), b"4");
        assert_eq!(r.hl(), &[Highlight::Number]);
        r.insert_byte(0, b'\t', RenderOpts::default());
        assert_eq!(r.render(), b"        4");
        assert_eq!(r.hl().len(), 9);
    }

    #[test]
    fn test_split_off_owns_both_sides() {
        let mut left = row("HelloWorld");
        let right = left.split_off(5, RenderOpts::default());
        assert_eq!(left.chars(), b"Hello");
        assert_eq!(right.chars(), b"World");
        assert_eq!(left.render(), b"Hello");
        assert_eq!(right.render(), b"World");
    }

    #[test]
    fn test_find_in_render() {
        let r = row("\tneedle");
        // tab expands to 8 columns, so the match is at display column 8
        assert_eq!(r.find(b"needle"), Some(8));
        assert_eq!(r.find(b"missing"), None);
        assert_eq!(r.find(b""), None);
    }

    #[test]
    fn test_match_highlight_and_restore() {
        let mut r = row("Hello");
        let saved = r.hl().to_vec();
        r.highlight_match(3, 2);
        assert_eq!(r.hl()[3], Highlight::Match);
        assert_eq!(r.hl()[4], Highlight::Match);
        assert_eq!(r.hl()[2], Highlight::Normal);
        r.set_hl(saved);
        assert!(r.hl().iter().all(|&h| h == Highlight::Normal));
    }

    #[test]
    fn test_match_highlight_clamps_to_row_end() {
        let mut r = row("ab");
        r.highlight_match(1, 10);
        assert_eq!(r.hl()[1], Highlight::Match);
    }
}
