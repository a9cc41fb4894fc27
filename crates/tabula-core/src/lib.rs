//! # tabula-core
//!
//! Addressing and range materialization for tabula.
//!
//! This crate holds the parts of tabula that carry real invariants:
//! - [`address`] - translating zero-based caller rows/columns (optionally shifted
//!   by a header row) into one-based A1-style document addresses
//! - [`materialize`] - turning the raw value buffer a document engine returns
//!   for a range into [`TabularValues`]
//! - [`DocumentEngine`] - the capability trait every backing engine implements
//! - [`Scoped`] - drop guard that releases engine handles on every exit path
//!
//! ## Example
//!
//! ```rust
//! use tabula_core::address::{adjust_row, column_name, RangeRequest};
//!
//! assert_eq!(column_name(1), "A");
//! assert_eq!(column_name(27), "AA");
//! assert_eq!(adjust_row(0, true), 2);
//!
//! let address = RangeRequest::new(0, 2, 0, 2).resolve(false);
//! assert_eq!(address.to_string(), "A1:B3");
//! ```

pub mod address;
pub mod color;
pub mod engine;
pub mod error;
pub mod materialize;
pub mod scoped;
pub mod value;

pub use address::{
    adjust_column, adjust_row, column_index, column_name, parse_range_address, CellAddress,
    ColumnRef, RangeAddress, RangeRequest,
};
pub use color::Color;
pub use engine::{
    DocumentEngine, DocumentHandle, Handle, RangeHandle, SaveFormat, SheetHandle, Shift,
};
pub use error::{EngineError, EngineResult, Error, Result};
pub use materialize::{materialize, read_range, resolve_range, TabularValues};
pub use scoped::{RangeGuard, Scoped, SheetGuard};
pub use value::{CellValue, RawValues, ValueGrid};

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLUMNS: u32 = 16_384;
