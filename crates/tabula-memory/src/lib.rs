//! # tabula-memory
//!
//! A [`DocumentEngine`](tabula_core::DocumentEngine) that keeps documents in
//! memory as sparse cell grids.
//!
//! Documents can be created blank or loaded from disk:
//! - `.csv` / `.tsv` / `.txt` - delimited text, one sheet named after the file
//! - `.json` - a whole workbook (sheets, values, colors, number formats)
//!
//! Range reads return one-based buffers like a native engine does;
//! [`MemoryEngine::with_buffer_base`] changes that to exercise other buffer
//! shapes. Handles are counted so tests can check that every handle a caller
//! obtained was released, and [`MemoryEngine::fail_next`] makes the next call
//! of an operation fail.
//!
//! ## Example
//!
//! ```rust
//! use tabula_core::DocumentEngine;
//! use tabula_memory::MemoryEngine;
//!
//! let mut engine = MemoryEngine::new();
//! let doc = engine.create_document().unwrap();
//! let sheet = engine.sheet_at(doc, 1).unwrap();
//! assert_eq!(engine.sheet_name(sheet).unwrap(), "Sheet1");
//! engine.release(sheet.into()).unwrap();
//! assert_eq!(engine.live_handles(), 0);
//! ```

mod engine;
mod error;
mod persist;
mod sheet;

pub use engine::{FailPoint, MemoryEngine};
pub use error::MemoryError;
pub use sheet::{CellData, Sheet};
