//! In-memory text buffer.
//!
//! This module provides the document model:
//!
//! - **row**: one logical line, its tab-expanded display form, and the
//!   per-display-column highlight classification
//! - **document**: the ordered row sequence, dirty tracking, and
//!   load/serialize/save
//!
//! # Module Hierarchy
//!
//! ```text
//! buffer/
//! ├── mod.rs       - Module exports
//! ├── row.rs       - Row (chars + render + highlight)
//! └── document.rs  - Document (rows + dirty + filename)
//! ```

pub mod document;
pub mod row;

pub use document::Document;
pub use row::{Highlight, RenderOpts, Row};
