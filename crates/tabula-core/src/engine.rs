//! The document engine capability interface
//!
//! A session never touches document storage directly. Everything it needs
//! (opening files, resolving addresses, reading buffers, formatting) goes
//! through [`DocumentEngine`], which backing adapters implement.
//!
//! Engines hand out opaque handles. Sheet and range handles are native
//! resources: whoever obtains one releases it with [`DocumentEngine::release`]
//! once the operation is done. [`Scoped`](crate::Scoped) does this on drop.

use std::fmt;
use std::path::Path;

use crate::color::Color;
use crate::error::EngineResult;
use crate::value::{CellValue, RawValues, ValueGrid};

/// Handle to an open document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentHandle(pub u64);

/// Handle to a sheet within a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SheetHandle(pub u64);

/// Handle to a resolved range on a sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RangeHandle(pub u64);

/// Any releasable engine handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    Sheet(SheetHandle),
    Range(RangeHandle),
}

impl From<SheetHandle> for Handle {
    fn from(handle: SheetHandle) -> Self {
        Handle::Sheet(handle)
    }
}

impl From<RangeHandle> for Handle {
    fn from(handle: RangeHandle) -> Self {
        Handle::Range(handle)
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handle::Sheet(h) => write!(f, "sheet#{}", h.0),
            Handle::Range(h) => write!(f, "range#{}", h.0),
        }
    }
}

/// Direction remaining cells move when a range is deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Shift {
    #[default]
    Up,
    Left,
}

/// Persistence formats for [`DocumentEngine::save_as`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaveFormat {
    /// Native multi-sheet workbook
    Workbook,
    /// Comma-separated text of the active sheet
    Csv,
    /// Tab-separated text of the active sheet
    TabDelimited,
}

impl SaveFormat {
    /// Infer the format from a path's extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match extension.as_deref() {
            Some("json") => Some(SaveFormat::Workbook),
            Some("csv") => Some(SaveFormat::Csv),
            Some("tsv") | Some("txt") => Some(SaveFormat::TabDelimited),
            _ => None,
        }
    }

    /// Field delimiter for delimited formats
    pub fn delimiter(&self) -> Option<u8> {
        match self {
            SaveFormat::Workbook => None,
            SaveFormat::Csv => Some(b','),
            SaveFormat::TabDelimited => Some(b'\t'),
        }
    }
}

/// Capability interface over a spreadsheet document engine
///
/// Sheet indices are one-based. Range addresses are A1-style strings such as
/// `"B2:D4"` or `"C3"`. Rows and columns reported by
/// [`last_used_cell`](Self::last_used_cell) are one-based.
pub trait DocumentEngine {
    // -- Documents --

    /// Create a new blank document with one sheet
    fn create_document(&mut self) -> EngineResult<DocumentHandle>;

    /// Open a document from disk
    fn open(&mut self, path: &Path, read_only: bool) -> EngineResult<DocumentHandle>;

    /// Close a document without saving
    fn close(&mut self, document: DocumentHandle) -> EngineResult<()>;

    /// Save a document to `path` in the format it was opened with
    fn save(&mut self, document: DocumentHandle, path: &Path) -> EngineResult<()>;

    /// Save a document to `path` in an explicit format
    fn save_as(
        &mut self,
        document: DocumentHandle,
        path: &Path,
        format: SaveFormat,
    ) -> EngineResult<()>;

    // -- Sheets --

    fn sheet_count(&mut self, document: DocumentHandle) -> EngineResult<usize>;

    /// Sheet by one-based index
    fn sheet_at(&mut self, document: DocumentHandle, index: usize) -> EngineResult<SheetHandle>;

    /// Sheet by name, compared case-insensitively
    fn find_sheet(
        &mut self,
        document: DocumentHandle,
        name: &str,
    ) -> EngineResult<Option<SheetHandle>>;

    fn sheet_name(&mut self, sheet: SheetHandle) -> EngineResult<String>;

    fn activate_sheet(&mut self, sheet: SheetHandle) -> EngineResult<()>;

    /// Append a new sheet with a generated name
    fn create_sheet(&mut self, document: DocumentHandle) -> EngineResult<SheetHandle>;

    fn rename_sheet(&mut self, sheet: SheetHandle, name: &str) -> EngineResult<()>;

    /// Remove a sheet from its document. The handle itself stays issued until
    /// released.
    fn delete_sheet(&mut self, sheet: SheetHandle) -> EngineResult<()>;

    // -- Ranges --

    fn resolve_range(&mut self, sheet: SheetHandle, address: &str) -> EngineResult<RangeHandle>;

    /// Value of the range's top-left cell
    fn read_cell(&mut self, range: RangeHandle) -> EngineResult<Option<CellValue>>;

    /// Values of the whole range: a grid for multi-cell ranges, a scalar or
    /// null for a single cell
    fn read_values(&mut self, range: RangeHandle) -> EngineResult<RawValues>;

    /// Write one value to every cell of the range
    fn write_cell(&mut self, range: RangeHandle, value: Option<CellValue>) -> EngineResult<()>;

    /// Write a buffer starting at the range's top-left cell
    fn write_values(&mut self, range: RangeHandle, values: &ValueGrid) -> EngineResult<()>;

    fn delete_range(&mut self, range: RangeHandle, shift: Shift) -> EngineResult<()>;

    fn count_non_empty(&mut self, range: RangeHandle) -> EngineResult<usize>;

    // -- Formatting --

    fn background_color(&mut self, range: RangeHandle) -> EngineResult<Color>;

    fn set_background_color(&mut self, range: RangeHandle, color: Color) -> EngineResult<()>;

    fn font_color(&mut self, range: RangeHandle) -> EngineResult<Color>;

    fn set_font_color(&mut self, range: RangeHandle, color: Color) -> EngineResult<()>;

    /// Palette index of the background color, if it has one
    fn background_color_index(&mut self, range: RangeHandle) -> EngineResult<Option<u8>>;

    fn set_background_color_index(&mut self, range: RangeHandle, index: u8) -> EngineResult<()>;

    /// Palette index of the font color, if it has one
    fn font_color_index(&mut self, range: RangeHandle) -> EngineResult<Option<u8>>;

    fn set_font_color_index(&mut self, range: RangeHandle, index: u8) -> EngineResult<()>;

    fn number_format(&mut self, range: RangeHandle) -> EngineResult<String>;

    fn set_number_format(&mut self, range: RangeHandle, format: &str) -> EngineResult<()>;

    // -- Sheet extent --

    /// One-based (row, column) of the last used cell; `(1, 1)` on an empty sheet
    fn last_used_cell(&mut self, sheet: SheetHandle) -> EngineResult<(u32, u32)>;

    // -- Resources --

    /// Release a sheet or range handle
    fn release(&mut self, handle: Handle) -> EngineResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_format_from_path() {
        assert_eq!(
            SaveFormat::from_path(Path::new("out/book.JSON")),
            Some(SaveFormat::Workbook)
        );
        assert_eq!(
            SaveFormat::from_path(Path::new("a.csv")),
            Some(SaveFormat::Csv)
        );
        assert_eq!(
            SaveFormat::from_path(Path::new("a.tsv")),
            Some(SaveFormat::TabDelimited)
        );
        assert_eq!(SaveFormat::from_path(Path::new("a.xlsx")), None);
        assert_eq!(SaveFormat::from_path(Path::new("noext")), None);
    }
}
