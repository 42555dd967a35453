//! The document: an ordered sequence of rows.
//!
//! Out-of-range indices in the row operations are invariant-violation
//! guards, not user-facing errors; they are defined as silent no-ops.
//! Every mutation bumps the dirty counter, which only returns to zero on
//! load or save.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::buffer::row::{RenderOpts, Row};

/// A document addressable by row index `0..len()`.
///
/// The cursor may legitimately sit one past the last row when appending;
/// that position has no `Row` of its own.
pub struct Document {
    rows: Vec<Row>,
    /// Mutations since load or save; strictly increasing between saves
    dirty: u32,
    /// Absent until the first save-as
    filename: Option<PathBuf>,
    opts: RenderOpts,
}

impl Document {
    pub fn new(opts: RenderOpts) -> Self {
        Self {
            rows: Vec::new(),
            dirty: 0,
            filename: None,
            opts,
        }
    }

    /// Load a document from disk, splitting on `\n` and stripping any
    /// trailing `\r`. The loaded document is clean.
    pub fn open(path: &Path, opts: RenderOpts) -> io::Result<Self> {
        let data = fs::read(path)?;
        let mut doc = Self::new(opts);
        if !data.is_empty() {
            let mut lines: Vec<&[u8]> = data.split(|&b| b == b'\n').collect();
            if data.ends_with(b"\n") {
                lines.pop();
            }
            for line in lines {
                let line = line.strip_suffix(b"\r").unwrap_or(line);
                doc.rows.push(Row::new(line.to_vec(), opts));
            }
        }
        doc.filename = Some(path.to_path_buf());
        Ok(doc)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, at: usize) -> Option<&Row> {
        self.rows.get(at)
    }

    /// Mutable row access for highlight overlays; does not mark the
    /// document dirty. Content edits go through the operations below.
    pub fn row_mut(&mut self, at: usize) -> Option<&mut Row> {
        self.rows.get_mut(at)
    }

    pub fn opts(&self) -> RenderOpts {
        self.opts
    }

    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    pub fn set_filename(&mut self, path: PathBuf) {
        self.filename = Some(path);
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty > 0
    }

    /// Insert a new row at `at`, shifting subsequent rows down
    pub fn insert_row(&mut self, at: usize, text: Vec<u8>) {
        if at > self.rows.len() {
            return;
        }
        self.rows.insert(at, Row::new(text, self.opts));
        self.dirty += 1;
    }

    /// Remove the row at `at`, shifting subsequent rows up
    pub fn delete_row(&mut self, at: usize) {
        if at >= self.rows.len() {
            return;
        }
        self.rows.remove(at);
        self.dirty += 1;
    }

    /// Insert one byte into the row at (`row`, `col`); the column is
    /// clamped to the row length
    pub fn insert_byte(&mut self, row: usize, col: usize, c: u8) {
        let opts = self.opts;
        if let Some(r) = self.rows.get_mut(row) {
            r.insert_byte(col, c, opts);
            self.dirty += 1;
        }
    }

    /// Delete the byte at (`row`, `col`)
    pub fn delete_byte(&mut self, row: usize, col: usize) {
        let opts = self.opts;
        if let Some(r) = self.rows.get_mut(row) {
            r.delete_byte(col, opts);
            self.dirty += 1;
        }
    }

    /// Split the row at `row` into two at byte column `col`; the right
    /// part becomes a new row immediately after
    pub fn split_row(&mut self, row: usize, col: usize) {
        let opts = self.opts;
        if let Some(r) = self.rows.get_mut(row) {
            let rest = r.split_off(col, opts);
            self.rows.insert(row + 1, rest);
            self.dirty += 1;
        }
    }

    /// Append the row at `at` to the end of the row above it and remove it
    pub fn merge_row_up(&mut self, at: usize) {
        if at == 0 || at >= self.rows.len() {
            return;
        }
        let opts = self.opts;
        let bytes = self.rows[at].chars().to_vec();
        self.rows[at - 1].append(&bytes, opts);
        self.dirty += 1;
        self.delete_row(at);
    }

    /// Flatten the document: every row's bytes followed by one newline.
    /// This is the sole on-disk representation.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for row in &self.rows {
            out.extend_from_slice(row.chars());
            out.push(b'\n');
        }
        out
    }

    /// Write the document to its filename and reset the dirty counter.
    ///
    /// The bytes go to a temporary file in the target directory first and
    /// are renamed into place, so a failed write leaves the previous
    /// contents intact. Returns the number of bytes written.
    pub fn save(&mut self) -> io::Result<usize> {
        let path = self
            .filename
            .clone()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "no filename"))?;
        let bytes = self.serialize();

        let mut tmp = path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        if let Err(e) = fs::write(&tmp, &bytes) {
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }
        fs::rename(&tmp, &path)?;

        self.dirty = 0;
        Ok(bytes.len())
    }
}
