//! Incremental search.
//!
//! One search session lives inside one prompt: the per-keystroke callback
//! rescans the document for the input so far, moves the cursor to the
//! match, and paints it with the match highlight. The previous highlight of
//! a matched row is saved so it can be restored on the next keystroke or
//! when the session ends.

use crate::buffer::Highlight;
use crate::core::input::{Key, ESC};
use crate::core::term::Terminal;
use crate::editor::Editor;
use crate::ui::Screen;

/// State threaded through one search session
pub struct SearchState {
    /// Row index of the previous match, if any
    last_match: Option<usize>,
    forward: bool,
    /// Highlight snapshot of the matched row, to restore when the match
    /// moves on
    saved_hl: Option<(usize, Vec<Highlight>)>,
}

impl Default for SearchState {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchState {
    pub fn new() -> Self {
        Self {
            last_match: None,
            forward: true,
            saved_hl: None,
        }
    }

    /// React to one prompt keystroke: restore the previous match highlight,
    /// update direction, and scan for the next match.
    pub fn apply(&mut self, ed: &mut Editor, query: &str, key: Key) {
        if let Some((at, hl)) = self.saved_hl.take() {
            if let Some(row) = ed.doc.row_mut(at) {
                row.set_hl(hl);
            }
        }

        match key {
            Key::Byte(b'\r') | Key::Byte(ESC) => {
                self.last_match = None;
                self.forward = true;
                return;
            }
            Key::ArrowRight | Key::ArrowDown => self.forward = true,
            Key::ArrowLeft | Key::ArrowUp => self.forward = false,
            _ => {
                // Fresh query: restart scanning from the cursor, forward
                self.last_match = None;
                self.forward = true;
            }
        }

        if query.is_empty() || ed.doc.is_empty() {
            return;
        }
        if self.last_match.is_none() {
            self.forward = true;
        }

        // At most one full traversal, wrapping at both ends
        let total = ed.doc.len() as i64;
        let mut current = self.last_match.map_or(-1, |m| m as i64);
        for _ in 0..total {
            current += if self.forward { 1 } else { -1 };
            if current < 0 {
                current = total - 1;
            } else if current >= total {
                current = 0;
            }

            let at = current as usize;
            let hit = ed.doc.row(at).and_then(|row| {
                row.find(query.as_bytes())
                    .map(|rx| (rx, row.rx_to_cx(rx, ed.doc.opts().tab_stop), row.hl().to_vec()))
            });
            if let Some((rx, cx, hl)) = hit {
                self.last_match = Some(at);
                ed.cy = at;
                ed.cx = cx;
                // Forces the next scroll pass to re-derive the row offset
                ed.row_off = ed.doc.len();
                self.saved_hl = Some((at, hl));
                if let Some(row) = ed.doc.row_mut(at) {
                    row.highlight_match(rx, query.len());
                }
                break;
            }
        }
    }
}

/// Run an incremental search session, restoring the cursor and viewport
/// when the prompt is aborted with Escape
pub fn find(ed: &mut Editor, term: &mut Terminal, screen: &mut Screen) -> anyhow::Result<()> {
    let saved = (ed.cx, ed.cy, ed.col_off, ed.row_off);
    let mut state = SearchState::new();

    let query = ed.prompt(
        term,
        screen,
        "Search (Use ESC/Arrows/Enter): ",
        |ed, query, key| state.apply(ed, query, key),
    )?;

    if query.is_none() {
        (ed.cx, ed.cy, ed.col_off, ed.row_off) = saved;
    }
    Ok(())
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

    #[test]
    fn test_match_moves_cursor_and_paints_highlight() {
        let mut ed = editor_with(&["Hello", "World"]);
        let mut state = SearchState::new();
        state.apply(&mut ed, "lo", Key::Byte(b'o'));

        assert_eq!((ed.cy, ed.cx), (0, 3));
        let hl = ed.doc.row(0).unwrap().hl();
        assert_eq!(hl[3], Highlight::Match);
        assert_eq!(hl[4], Highlight::Match);
        assert_eq!(hl[2], Highlight::Normal);
        // the offset is forced out of range so the next scroll re-derives it
        assert_eq!(ed.row_off, ed.doc.len());
        ed.scroll();
        assert!(ed.row_off <= ed.cy);
    }

    #[test]
    fn test_highlight_restored_on_next_keystroke() {
        let mut ed = editor_with(&["Hello", "World"]);
        let mut state = SearchState::new();
        state.apply(&mut ed, "lo", Key::Byte(b'o'));
        assert_eq!(ed.doc.row(0).unwrap().hl()[3], Highlight::Match);

        // next keystroke extends the query; old highlight is gone first
        state.apply(&mut ed, "lor", Key::Byte(b'r'));
        assert!(ed
            .doc
            .row(0)
            .unwrap()
            .hl()
            .iter()
            .all(|&h| h != Highlight::Match));
        // "lor" has no match anywhere, cursor stays where the last match put it
        assert_eq!((ed.cy, ed.cx), (0, 3));
    }

    #[test]
    fn test_enter_ends_session_and_restores_highlight() {
        let mut ed = editor_with(&["Hello"]);
        let mut state = SearchState::new();
        state.apply(&mut ed, "He", Key::Byte(b'e'));
        assert_eq!(ed.doc.row(0).unwrap().hl()[0], Highlight::Match);

        state.apply(&mut ed, "He", Key::Byte(b'\r'));
        assert!(ed
            .doc
            .row(0)
            .unwrap()
            .hl()
            .iter()
            .all(|&h| h != Highlight::Match));
    }

    #[test]
    fn test_forward_stepping_wraps() {
        let mut ed = editor_with(&["match one", "nothing", "match two"]);
        let mut state = SearchState::new();
        state.apply(&mut ed, "match", Key::Byte(b'h'));
        assert_eq!(ed.cy, 0);
        state.apply(&mut ed, "match", Key::ArrowDown);
        assert_eq!(ed.cy, 2);
        state.apply(&mut ed, "match", Key::ArrowDown);
        assert_eq!(ed.cy, 0);
    }

    #[test]
    fn test_backward_stepping_wraps() {
        let mut ed = editor_with(&["match one", "nothing", "match two"]);
        let mut state = SearchState::new();
        state.apply(&mut ed, "match", Key::Byte(b'h'));
        assert_eq!(ed.cy, 0);
        state.apply(&mut ed, "match", Key::ArrowUp);
        assert_eq!(ed.cy, 2);
    }

    #[test]
    fn test_no_match_leaves_cursor_alone() {
        let mut ed = editor_with(&["Hello", "World"]);
        ed.cy = 1;
        ed.cx = 2;
        let mut state = SearchState::new();
        state.apply(&mut ed, "zzz", Key::Byte(b'z'));
        assert_eq!((ed.cy, ed.cx), (1, 2));
        assert_eq!(ed.row_off, 0);
    }

    #[test]
    fn test_match_position_accounts_for_tabs() {
        let mut ed = editor_with(&["\tWorld"]);
        let mut state = SearchState::new();
        state.apply(&mut ed, "World", Key::Byte(b'd'));
        // display column 8, byte column 1
        assert_eq!((ed.cy, ed.cx), (0, 1));
        assert_eq!(ed.doc.row(0).unwrap().hl()[8], Highlight::Match);
    }
}
