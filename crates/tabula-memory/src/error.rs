//! Memory engine error types

use thiserror::Error;

use crate::engine::FailPoint;
use tabula_core::EngineError;

/// Failures specific to the in-memory engine
#[derive(Debug, Error)]
pub enum MemoryError {
    /// Delimited text could not be read or written
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Workbook file could not be parsed or serialized
    #[error("Workbook JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Workbook file lists no sheets
    #[error("Workbook contains no sheets")]
    EmptyWorkbook,

    /// Workbook file places a cell outside the sheet limits
    #[error("Cell R{row}C{column} is outside the sheet")]
    CellOutOfBounds { row: u32, column: u32 },

    /// Sheet name is empty or already used in the document
    #[error("Invalid sheet name: {0}")]
    InvalidSheetName(String),

    /// Color index outside the 1..=56 palette
    #[error("Invalid color index: {0}")]
    InvalidColorIndex(u8),

    /// Failure requested through `MemoryEngine::fail_next`
    #[error("Injected failure at {0:?}")]
    Injected(FailPoint),
}

impl From<MemoryError> for EngineError {
    fn from(err: MemoryError) -> Self {
        EngineError::backend(err)
    }
}
