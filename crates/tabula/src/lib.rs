//! # tabula
//!
//! Zero-based row and column access to spreadsheet documents.
//!
//! A [`Session`] owns a [`DocumentEngine`] and one open document. Callers
//! address cells with zero-based rows and columns; the session translates
//! them to the engine's one-based A1 addresses, optionally skipping a header
//! row, and reads rectangular ranges back as [`TabularValues`].
//!
//! ## Example
//!
//! ```rust
//! use tabula::prelude::*;
//!
//! let mut session = Session::in_memory();
//! session.create().unwrap();
//!
//! session
//!     .set_range_values(0, 0, vec![vec!["name", "qty"], vec!["bolt", "12"]])
//!     .unwrap();
//!
//! // the end column is one-based: 2 means column B
//! let table = session.range_values(0, 1, 0, 2).unwrap();
//! assert_eq!(table.get(1, 0), Some("bolt"));
//!
//! // with a header row, row 0 is the first row under it
//! session.set_header_row(true);
//! assert_eq!(session.cell_value(0, 1).unwrap(), "12");
//! ```

mod options;
mod session;

pub mod prelude;

pub use options::SessionOptions;
pub use session::Session;

// Re-export core types
pub use tabula_core::{
    adjust_column, adjust_row, column_index, column_name, materialize, parse_range_address,
    CellAddress, CellValue, Color, ColumnRef, DocumentEngine, EngineError, Error, RangeAddress,
    RangeRequest, RawValues, Result, SaveFormat, Shift, TabularValues, ValueGrid,
};

#[cfg(feature = "memory")]
pub use tabula_memory::{MemoryEngine, MemoryError};

/// Session over the in-memory engine
#[cfg(feature = "memory")]
pub type MemorySession = Session<MemoryEngine>;
