//! Prelude module - common imports for tabula users
//!
//! ```rust
//! use tabula::prelude::*;
//! ```

pub use crate::{
    CellValue, Color, ColumnRef, DocumentEngine, Error, Result, SaveFormat, Session,
    SessionOptions, Shift, TabularValues,
};

#[cfg(feature = "memory")]
pub use crate::{MemoryEngine, MemorySession};
