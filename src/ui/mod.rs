//! User interface rendering.
//!
//! This module provides the screen compositor:
//!
//! - **screen**: builds one coalesced output frame per refresh (text rows,
//!   status bar, message bar, cursor placement) and flushes it in a single
//!   write

pub mod screen;

pub use screen::Screen;
