//! Session: one open document, one active sheet, caller-space coordinates

use std::fmt;
use std::path::{Path, PathBuf};

use tabula_core::{
    adjust_column, adjust_row, read_range, resolve_range, CellAddress, CellValue, Color,
    ColumnRef, DocumentEngine, DocumentHandle, EngineError, EngineResult, Error, Handle,
    RangeAddress, RangeHandle, RangeRequest, Result, SaveFormat, Scoped, SheetHandle, Shift,
    TabularValues, ValueGrid, MAX_COLUMNS, MAX_ROWS,
};

use crate::options::SessionOptions;

/// A document opened through a [`DocumentEngine`]
///
/// Rows and columns are zero-based. With
/// [`header_row`](SessionOptions::header_row) set, row 0 is the first row
/// under the header. Range end columns are passed through untranslated, so
/// `column_end` reads as the one-based index of the last column wanted;
/// [`last_used_column`](Self::last_used_column) plus one reaches the end of
/// the used area.
///
/// Operations that need a document return
/// [`Error::InvalidDocumentState`] when none is open. Every sheet and range
/// handle a call obtains is released before the call returns.
pub struct Session<E: DocumentEngine> {
    engine: E,
    options: SessionOptions,
    document: Option<DocumentHandle>,
    active_sheet: Option<SheetHandle>,
    path: Option<PathBuf>,
}

impl<E: DocumentEngine> Session<E> {
    pub fn new(engine: E) -> Self {
        Self::with_options(engine, SessionOptions::default())
    }

    pub fn with_options(engine: E, options: SessionOptions) -> Self {
        Self {
            engine,
            options,
            document: None,
            active_sheet: None,
            path: None,
        }
    }

    pub fn options(&self) -> SessionOptions {
        self.options
    }

    pub fn header_row(&self) -> bool {
        self.options.header_row
    }

    /// Declare whether the first document row holds headers
    ///
    /// Affects every row translation after the call; tables already read are
    /// unaffected.
    pub fn set_header_row(&mut self, header_row: bool) {
        self.options.header_row = header_row;
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    // -- Documents --

    /// Close any open document and start a blank one
    pub fn create(&mut self) -> Result<()> {
        self.close()?;
        let document = self.engine.create_document()?;
        self.attach(document, None)
    }

    /// Close any open document and open the one at `path`
    ///
    /// On failure no document is open afterwards.
    pub fn open<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        self.close()?;
        let document = self.engine.open(path, self.options.read_only)?;
        self.attach(document, Some(path.to_path_buf()))
    }

    fn attach(&mut self, document: DocumentHandle, path: Option<PathBuf>) -> Result<()> {
        self.document = Some(document);
        self.path = path;
        let sheet = self.engine.sheet_at(document, 1)?;
        self.switch_to(sheet)
    }

    /// Close the open document without saving; a no-op when none is open
    pub fn close(&mut self) -> Result<()> {
        let Some(document) = self.document.take() else {
            return Ok(());
        };
        self.path = None;

        if let Some(sheet) = self.active_sheet.take() {
            let handle = Handle::from(sheet);
            if let Err(e) = self.engine.release(handle) {
                tracing::warn!("Failed to release {handle}: {e}");
            }
        }
        self.engine.close(document)?;
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.document.is_some()
    }

    /// Path the document was opened from or last saved to
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Save back to [`path`](Self::path)
    pub fn save(&mut self) -> Result<()> {
        let document = self.document()?;
        let path = self
            .path
            .clone()
            .ok_or_else(|| Error::invalid_state("document has no file path; use save_as"))?;
        self.engine.save(document, &path)?;
        Ok(())
    }

    /// Save to `path`, choosing the format from its extension
    pub fn save_as<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let format = SaveFormat::from_path(path)
            .ok_or_else(|| EngineError::UnsupportedFormat(path.display().to_string()))?;
        self.save_as_format(path, format)
    }

    pub fn save_as_format<P: AsRef<Path>>(&mut self, path: P, format: SaveFormat) -> Result<()> {
        let path = path.as_ref();
        let document = self.document()?;
        self.engine.save_as(document, path, format)?;
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    // -- Sheets --

    pub fn sheet_count(&mut self) -> Result<usize> {
        let document = self.document()?;
        Ok(self.engine.sheet_count(document)?)
    }

    /// Names of every sheet, in document order
    pub fn sheet_names(&mut self) -> Result<Vec<String>> {
        let document = self.document()?;
        let count = self.engine.sheet_count(document)?;

        let mut names = Vec::with_capacity(count);
        for index in 1..=count {
            let handle = self.engine.sheet_at(document, index)?;
            let mut sheet = Scoped::new(&mut self.engine, handle);
            names.push(sheet.engine().sheet_name(handle)?);
        }
        Ok(names)
    }

    pub fn active_sheet_name(&mut self) -> Result<String> {
        let sheet = self.sheet()?;
        Ok(self.engine.sheet_name(sheet)?)
    }

    /// Make the sheet called `name` (any case) active
    ///
    /// Returns `false`, leaving the active sheet alone, when no sheet has
    /// that name.
    pub fn activate_sheet(&mut self, name: &str) -> Result<bool> {
        let document = self.document()?;
        match self.engine.find_sheet(document, name)? {
            Some(sheet) => {
                self.switch_to(sheet)?;
                Ok(true)
            }
            None => {
                tracing::debug!("No sheet named {name:?}");
                Ok(false)
            }
        }
    }

    /// Make the sheet at a zero-based position active
    pub fn activate_sheet_at(&mut self, index: usize) -> Result<()> {
        let document = self.document()?;
        let sheet = self.engine.sheet_at(document, index.saturating_add(1))?;
        self.switch_to(sheet)
    }

    /// Append a sheet called `name` and make it active
    pub fn add_sheet(&mut self, name: &str) -> Result<()> {
        let document = self.document()?;
        let handle = self.engine.create_sheet(document)?;
        let mut sheet = Scoped::new(&mut self.engine, handle);
        if let Err(e) = sheet.engine().rename_sheet(handle, name) {
            sheet.engine().delete_sheet(handle)?;
            return Err(e.into());
        }
        let handle = sheet.into_handle();
        self.switch_to(handle)
    }

    pub fn rename_active_sheet(&mut self, name: &str) -> Result<()> {
        let sheet = self.sheet()?;
        self.engine.rename_sheet(sheet, name)?;
        Ok(())
    }

    fn switch_to(&mut self, sheet: SheetHandle) -> Result<()> {
        let mut guard = Scoped::new(&mut self.engine, sheet);
        guard.engine().activate_sheet(sheet)?;
        let sheet = guard.into_handle();

        if let Some(previous) = self.active_sheet.replace(sheet) {
            self.engine.release(previous.into())?;
        }
        tracing::debug!("Active sheet is now {}", Handle::from(sheet));
        Ok(())
    }

    // -- Cells --

    /// Value of a cell, `None` when it is empty
    pub fn cell(&mut self, row: u32, column: u32) -> Result<Option<CellValue>> {
        let at = self.cell_address(row, column);
        self.with_range(at, |engine, range| engine.read_cell(range))
    }

    /// Text of a cell, empty for an empty cell
    pub fn cell_value(&mut self, row: u32, column: u32) -> Result<String> {
        Ok(self
            .cell(row, column)?
            .map(|value| value.to_string())
            .unwrap_or_default())
    }

    /// True when the cell's text is empty or whitespace
    pub fn is_cell_empty(&mut self, row: u32, column: u32) -> Result<bool> {
        Ok(self.cell_value(row, column)?.trim().is_empty())
    }

    pub fn set_cell_value<V: Into<CellValue>>(
        &mut self,
        row: u32,
        column: u32,
        value: V,
    ) -> Result<()> {
        let at = self.cell_address(row, column);
        let value = value.into();
        self.with_range(at, move |engine, range| engine.write_cell(range, Some(value)))
    }

    pub fn clear_cell(&mut self, row: u32, column: u32) -> Result<()> {
        let at = self.cell_address(row, column);
        self.with_range(at, |engine, range| engine.write_cell(range, None))
    }

    pub fn cell_background_color(&mut self, row: u32, column: u32) -> Result<Color> {
        let at = self.cell_address(row, column);
        self.with_range(at, |engine, range| engine.background_color(range))
    }

    pub fn set_cell_background_color(&mut self, row: u32, column: u32, color: Color) -> Result<()> {
        let at = self.cell_address(row, column);
        self.with_range(at, |engine, range| engine.set_background_color(range, color))
    }

    pub fn cell_font_color(&mut self, row: u32, column: u32) -> Result<Color> {
        let at = self.cell_address(row, column);
        self.with_range(at, |engine, range| engine.font_color(range))
    }

    pub fn set_cell_font_color(&mut self, row: u32, column: u32, color: Color) -> Result<()> {
        let at = self.cell_address(row, column);
        self.with_range(at, |engine, range| engine.set_font_color(range, color))
    }

    /// Palette index (1..=56) of the background color, if it has one
    pub fn cell_background_color_index(&mut self, row: u32, column: u32) -> Result<Option<u8>> {
        let at = self.cell_address(row, column);
        self.with_range(at, |engine, range| engine.background_color_index(range))
    }

    pub fn set_cell_background_color_index(
        &mut self,
        row: u32,
        column: u32,
        index: u8,
    ) -> Result<()> {
        let at = self.cell_address(row, column);
        self.with_range(at, |engine, range| {
            engine.set_background_color_index(range, index)
        })
    }

    /// Palette index (1..=56) of the font color, if it has one
    pub fn cell_font_color_index(&mut self, row: u32, column: u32) -> Result<Option<u8>> {
        let at = self.cell_address(row, column);
        self.with_range(at, |engine, range| engine.font_color_index(range))
    }

    pub fn set_cell_font_color_index(&mut self, row: u32, column: u32, index: u8) -> Result<()> {
        let at = self.cell_address(row, column);
        self.with_range(at, |engine, range| engine.set_font_color_index(range, index))
    }

    pub fn cell_number_format(&mut self, row: u32, column: u32) -> Result<String> {
        let at = self.cell_address(row, column);
        self.with_range(at, |engine, range| engine.number_format(range))
    }

    pub fn set_cell_number_format(&mut self, row: u32, column: u32, format: &str) -> Result<()> {
        let at = self.cell_address(row, column);
        self.with_range(at, |engine, range| engine.set_number_format(range, format))
    }

    // -- Ranges --

    /// Text of a rectangle, row-major
    ///
    /// A range the engine answers with a single value instead of a buffer
    /// (one cell) yields an empty table.
    pub fn range_values(
        &mut self,
        row_begin: u32,
        row_end: u32,
        column_begin: u32,
        column_end: u32,
    ) -> Result<TabularValues> {
        let request = RangeRequest::new(row_begin, row_end, column_begin, column_end);
        let sheet = self.sheet()?;
        let table = read_range(&mut self.engine, sheet, &request, self.options.header_row)?;
        Ok(table.unwrap_or_default())
    }

    /// Text of every used row, from row 0 through the last used cell
    pub fn sheet_data(&mut self) -> Result<TabularValues> {
        let (last_row, last_column) = self.last_used_cell()?;
        match self.data_row(last_row) {
            Some(row_end) => self.range_values(0, row_end, 0, last_column),
            None => Ok(TabularValues::new()),
        }
    }

    /// Text of one row through the last used column
    pub fn row_values(&mut self, row: u32) -> Result<Vec<String>> {
        let (_, last_column) = self.last_used_cell()?;
        if last_column <= 1 {
            return Ok(vec![self.cell_value(row, 0)?]);
        }
        let table = self.range_values(row, row, 0, last_column)?;
        Ok(table.into_rows().into_iter().next().unwrap_or_default())
    }

    /// Text of one column from row 0 through the last used row
    pub fn column_values(&mut self, column: u32) -> Result<Vec<String>> {
        let (last_row, _) = self.last_used_cell()?;
        let Some(row_end) = self.data_row(last_row) else {
            return Ok(Vec::new());
        };
        if row_end == 0 {
            return Ok(vec![self.cell_value(0, column)?]);
        }
        let table = self.range_values(0, row_end, column, column.saturating_add(1))?;
        Ok(table
            .into_rows()
            .into_iter()
            .map(|row| row.into_iter().next().unwrap_or_default())
            .collect())
    }

    /// Write rows of values with their top-left corner at (`row`, `column`)
    pub fn set_range_values<I, R, V>(&mut self, row: u32, column: u32, rows: I) -> Result<()>
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        let grid = ValueGrid::from_rows(rows.into_iter().map(|row| {
            row.into_iter()
                .map(|v| Some(v.into()))
                .collect::<Vec<Option<CellValue>>>()
        }));
        if grid.rows() == 0 || grid.columns() == 0 {
            return Ok(());
        }

        let start = self.cell_address(row, column);
        let address = RangeAddress::new(
            start.row,
            start.row.saturating_add(grid.rows() as u32 - 1),
            start.column,
            start.column.saturating_add(grid.columns() as u32 - 1),
        );
        self.with_range(address, |engine, range| engine.write_values(range, &grid))
    }

    /// Remove a rectangle, moving the remaining cells up or left
    pub fn delete_range(
        &mut self,
        row_begin: u32,
        row_end: u32,
        column_begin: u32,
        column_end: u32,
        shift: Shift,
    ) -> Result<()> {
        let address = self.range_address(row_begin, row_end, column_begin, column_end);
        self.with_range(address, |engine, range| engine.delete_range(range, shift))
    }

    /// Remove a whole row, moving the rows below it up
    pub fn delete_row(&mut self, row: u32) -> Result<()> {
        let row = adjust_row(row, self.options.header_row);
        let address = RangeAddress::new(row, row, 1, MAX_COLUMNS);
        self.with_range(address, |engine, range| engine.delete_range(range, Shift::Up))
    }

    /// Remove a whole column, moving the columns right of it left
    pub fn delete_column(&mut self, column: ColumnRef) -> Result<()> {
        let column = self.document_column(column)?;
        let address = RangeAddress::new(1, MAX_ROWS, column, column);
        self.with_range(address, |engine, range| engine.delete_range(range, Shift::Left))
    }

    /// Number of cells holding a value
    pub fn count_non_empty(
        &mut self,
        row_begin: u32,
        row_end: u32,
        column_begin: u32,
        column_end: u32,
    ) -> Result<usize> {
        let address = self.range_address(row_begin, row_end, column_begin, column_end);
        self.with_range(address, |engine, range| engine.count_non_empty(range))
    }

    pub fn set_range_background_color(
        &mut self,
        row_begin: u32,
        row_end: u32,
        column_begin: u32,
        column_end: u32,
        color: Color,
    ) -> Result<()> {
        let address = self.range_address(row_begin, row_end, column_begin, column_end);
        self.with_range(address, |engine, range| {
            engine.set_background_color(range, color)
        })
    }

    pub fn set_range_font_color(
        &mut self,
        row_begin: u32,
        row_end: u32,
        column_begin: u32,
        column_end: u32,
        color: Color,
    ) -> Result<()> {
        let address = self.range_address(row_begin, row_end, column_begin, column_end);
        self.with_range(address, |engine, range| engine.set_font_color(range, color))
    }

    pub fn set_range_number_format(
        &mut self,
        row_begin: u32,
        row_end: u32,
        column_begin: u32,
        column_end: u32,
        format: &str,
    ) -> Result<()> {
        let address = self.range_address(row_begin, row_end, column_begin, column_end);
        self.with_range(address, |engine, range| {
            engine.set_number_format(range, format)
        })
    }

    /// Apply a number format to a column, from row 0 through the last used row
    pub fn set_column_number_format(&mut self, column: ColumnRef, format: &str) -> Result<()> {
        let column = self.document_column(column)?;
        let (last_row, _) = self.last_used_cell()?;
        let first_row = adjust_row(0, self.options.header_row);
        let address = RangeAddress::new(first_row, last_row.max(first_row), column, column);
        self.with_range(address, |engine, range| {
            engine.set_number_format(range, format)
        })
    }

    // -- Extent --

    /// Last used row in caller space, `None` when only a header row is used
    pub fn last_used_row(&mut self) -> Result<Option<u32>> {
        let (last_row, _) = self.last_used_cell()?;
        Ok(self.data_row(last_row))
    }

    /// Last used column in caller space
    pub fn last_used_column(&mut self) -> Result<u32> {
        let (_, last_column) = self.last_used_cell()?;
        Ok(last_column.saturating_sub(1))
    }

    // -- Internals --

    fn document(&self) -> Result<DocumentHandle> {
        self.document
            .ok_or_else(|| Error::invalid_state("no document is open"))
    }

    fn sheet(&self) -> Result<SheetHandle> {
        self.document()?;
        self.active_sheet
            .ok_or_else(|| Error::invalid_state("document has no active sheet"))
    }

    fn last_used_cell(&mut self) -> Result<(u32, u32)> {
        let sheet = self.sheet()?;
        Ok(self.engine.last_used_cell(sheet)?)
    }

    fn cell_address(&self, row: u32, column: u32) -> CellAddress {
        CellAddress::resolve(row, column, self.options.header_row)
    }

    /// Caller row of a one-based document row, `None` for the header row
    fn data_row(&self, document_row: u32) -> Option<u32> {
        let first = adjust_row(0, self.options.header_row);
        document_row.checked_sub(first)
    }

    /// One-based document column, resolving `Last` to the last used column
    fn document_column(&mut self, column: ColumnRef) -> Result<u32> {
        match adjust_column(column) {
            ColumnRef::At(column) => Ok(column),
            ColumnRef::Last => Ok(self.last_used_cell()?.1),
        }
    }

    fn range_address(
        &self,
        row_begin: u32,
        row_end: u32,
        column_begin: u32,
        column_end: u32,
    ) -> RangeAddress {
        RangeRequest::new(row_begin, row_end, column_begin, column_end)
            .resolve(self.options.header_row)
    }

    fn with_range<A, T, F>(&mut self, address: A, op: F) -> Result<T>
    where
        A: fmt::Display,
        F: FnOnce(&mut E, RangeHandle) -> EngineResult<T>,
    {
        let sheet = self.sheet()?;
        let mut range = resolve_range(&mut self.engine, sheet, address)?;
        let handle = range.handle();
        Ok(op(range.engine(), handle)?)
    }
}

impl<E: DocumentEngine> Drop for Session<E> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!("Failed to close document: {e}");
        }
    }
}

#[cfg(feature = "memory")]
mod memory {
    use super::{Session, SessionOptions};
    use tabula_memory::MemoryEngine;

    impl Session<MemoryEngine> {
        /// Session over a fresh in-memory engine
        pub fn in_memory() -> Self {
            Session::new(MemoryEngine::new())
        }

        pub fn in_memory_with(options: SessionOptions) -> Self {
            Session::with_options(MemoryEngine::new(), options)
        }
    }
}
