//! Core terminal I/O components.
//!
//! This module contains the low-level terminal plumbing:
//!
//! - **term**: raw mode control, bounded single-byte reads, window-size query
//! - **input**: decoding of the raw byte stream into logical key events
//!
//! # Architecture
//!
//! ```text
//! Terminal (raw mode + timed byte reads)
//! └── read_key (escape-sequence decoding)
//!     └── Key (one logical event per call)
//! ```

pub mod input;
pub mod term;

pub use input::{read_key, Key};
pub use term::{ByteRead, Terminal};
