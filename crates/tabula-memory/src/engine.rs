//! The in-memory document engine

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use tabula_core::{
    parse_range_address, CellAddress, CellValue, Color, DocumentEngine, DocumentHandle,
    EngineError, EngineResult, Handle, RangeAddress, RangeHandle, RawValues, SaveFormat,
    SheetHandle, Shift, ValueGrid,
};

use crate::error::MemoryError;
use crate::persist::{read_delimited, read_workbook, write_delimited, write_workbook};
use crate::sheet::{Sheet, GENERAL_FORMAT};

/// Operations that [`MemoryEngine::fail_next`] can make fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    Open,
    Save,
    ResolveRange,
    ReadCell,
    ReadValues,
    WriteValues,
    LastUsedCell,
}

struct SheetSlot {
    id: u64,
    sheet: Sheet,
}

struct Document {
    sheets: Vec<SheetSlot>,
    active: usize,
    read_only: bool,
    format: SaveFormat,
}

impl Document {
    fn new(sheets: Vec<SheetSlot>, active: usize, read_only: bool, format: SaveFormat) -> Self {
        Self {
            sheets,
            active,
            read_only,
            format,
        }
    }

    fn position(&self, sheet: u64) -> Option<usize> {
        self.sheets.iter().position(|slot| slot.id == sheet)
    }

    fn has_name(&self, name: &str, except: Option<u64>) -> bool {
        let name = name.to_lowercase();
        self.sheets
            .iter()
            .any(|slot| Some(slot.id) != except && slot.sheet.name().to_lowercase() == name)
    }

    fn write(&self, path: &Path, format: SaveFormat) -> EngineResult<()> {
        let file = File::create(path)?;
        match format.delimiter() {
            Some(delimiter) => {
                let slot = self
                    .sheets
                    .get(self.active)
                    .ok_or(MemoryError::EmptyWorkbook)?;
                write_delimited(&slot.sheet, file, delimiter)?;
            }
            None => {
                write_workbook(self.sheets.iter().map(|slot| &slot.sheet), self.active, file)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
struct SheetTarget {
    document: u64,
    sheet: u64,
}

#[derive(Debug, Clone, Copy)]
struct RangeTarget {
    document: u64,
    sheet: u64,
    address: RangeAddress,
}

/// Document engine holding every document in memory
///
/// Sheet and range handles stay live until released or until their document
/// is closed; [`live_handles`](Self::live_handles) reports how many are
/// outstanding.
pub struct MemoryEngine {
    documents: HashMap<u64, Document>,
    sheet_handles: HashMap<u64, SheetTarget>,
    range_handles: HashMap<u64, RangeTarget>,
    next_id: u64,
    buffer_base: usize,
    fail_next: Option<FailPoint>,
}

impl Default for MemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self {
            documents: HashMap::new(),
            sheet_handles: HashMap::new(),
            range_handles: HashMap::new(),
            next_id: 1,
            buffer_base: 1,
            fail_next: None,
        }
    }

    /// Use `base` as the lower bound of buffers returned by `read_values`
    pub fn with_buffer_base(mut self, base: usize) -> Self {
        self.buffer_base = base;
        self
    }

    /// Make the next call of `point` fail with [`MemoryError::Injected`]
    pub fn fail_next(&mut self, point: FailPoint) {
        self.fail_next = Some(point);
    }

    /// Number of sheet and range handles issued and not yet released
    pub fn live_handles(&self) -> usize {
        self.sheet_handles.len() + self.range_handles.len()
    }

    /// Add a document built from ready-made sheets; the first sheet is active
    pub fn insert_document(&mut self, sheets: Vec<Sheet>) -> DocumentHandle {
        let slots = sheets
            .into_iter()
            .map(|sheet| SheetSlot {
                id: self.allocate_id(),
                sheet,
            })
            .collect();
        let id = self.allocate_id();
        self.documents
            .insert(id, Document::new(slots, 0, false, SaveFormat::Workbook));
        DocumentHandle(id)
    }

    /// Look at a sheet of an open document by name
    pub fn sheet(&self, document: DocumentHandle, name: &str) -> Option<&Sheet> {
        self.documents
            .get(&document.0)?
            .sheets
            .iter()
            .map(|slot| &slot.sheet)
            .find(|sheet| sheet.name() == name)
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn check(&mut self, point: FailPoint) -> EngineResult<()> {
        if self.fail_next == Some(point) {
            self.fail_next = None;
            return Err(MemoryError::Injected(point).into());
        }
        Ok(())
    }

    fn add_document(
        &mut self,
        sheets: Vec<Sheet>,
        active: usize,
        read_only: bool,
        format: SaveFormat,
    ) -> DocumentHandle {
        let handle = self.insert_document(sheets);
        if let Some(document) = self.documents.get_mut(&handle.0) {
            document.active = active;
            document.read_only = read_only;
            document.format = format;
        }
        handle
    }

    fn document(&self, handle: DocumentHandle) -> EngineResult<&Document> {
        self.documents
            .get(&handle.0)
            .ok_or_else(|| EngineError::StaleHandle(format!("document#{}", handle.0)))
    }

    fn document_mut(&mut self, handle: DocumentHandle) -> EngineResult<&mut Document> {
        self.documents
            .get_mut(&handle.0)
            .ok_or_else(|| EngineError::StaleHandle(format!("document#{}", handle.0)))
    }

    fn sheet_target(&self, handle: SheetHandle) -> EngineResult<SheetTarget> {
        self.sheet_handles
            .get(&handle.0)
            .copied()
            .ok_or_else(|| EngineError::StaleHandle(Handle::from(handle).to_string()))
    }

    fn range_target(&self, handle: RangeHandle) -> EngineResult<RangeTarget> {
        self.range_handles
            .get(&handle.0)
            .copied()
            .ok_or_else(|| EngineError::StaleHandle(Handle::from(handle).to_string()))
    }

    fn slot(&self, document: u64, sheet: u64) -> EngineResult<&SheetSlot> {
        let doc = self.document(DocumentHandle(document))?;
        doc.sheets
            .iter()
            .find(|slot| slot.id == sheet)
            .ok_or_else(|| EngineError::StaleHandle(format!("sheet#{sheet}")))
    }

    fn slot_mut(&mut self, document: u64, sheet: u64) -> EngineResult<&mut SheetSlot> {
        let doc = self.document_mut(DocumentHandle(document))?;
        doc.sheets
            .iter_mut()
            .find(|slot| slot.id == sheet)
            .ok_or_else(|| EngineError::StaleHandle(format!("sheet#{sheet}")))
    }

    fn sheet_of(&self, handle: SheetHandle) -> EngineResult<&Sheet> {
        let target = self.sheet_target(handle)?;
        Ok(&self.slot(target.document, target.sheet)?.sheet)
    }

    fn range_of(&self, handle: RangeHandle) -> EngineResult<(&Sheet, RangeAddress)> {
        let target = self.range_target(handle)?;
        let slot = self.slot(target.document, target.sheet)?;
        Ok((&slot.sheet, target.address))
    }

    fn range_of_mut(&mut self, handle: RangeHandle) -> EngineResult<(&mut Sheet, RangeAddress)> {
        let target = self.range_target(handle)?;
        let slot = self.slot_mut(target.document, target.sheet)?;
        Ok((&mut slot.sheet, target.address))
    }

    fn issue_sheet(&mut self, document: u64, sheet: u64) -> SheetHandle {
        let id = self.allocate_id();
        self.sheet_handles.insert(id, SheetTarget { document, sheet });
        tracing::trace!("Issued sheet#{id}");
        SheetHandle(id)
    }
}

impl DocumentEngine for MemoryEngine {
    fn create_document(&mut self) -> EngineResult<DocumentHandle> {
        let handle = self.insert_document(vec![Sheet::new("Sheet1")]);
        tracing::info!("Created new document: document#{}", handle.0);
        Ok(handle)
    }

    fn open(&mut self, path: &Path, read_only: bool) -> EngineResult<DocumentHandle> {
        self.check(FailPoint::Open)?;

        let format = SaveFormat::from_path(path)
            .ok_or_else(|| EngineError::UnsupportedFormat(path.display().to_string()))?;
        let file = File::open(path)?;

        let (sheets, active) = match format.delimiter() {
            Some(delimiter) => {
                let name = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("Sheet1");
                (vec![read_delimited(file, delimiter, name)?], 0)
            }
            None => read_workbook(file)?,
        };

        let handle = self.add_document(sheets, active, read_only, format);
        tracing::info!("Opened {} as document#{}", path.display(), handle.0);
        Ok(handle)
    }

    fn close(&mut self, document: DocumentHandle) -> EngineResult<()> {
        self.documents
            .remove(&document.0)
            .ok_or_else(|| EngineError::StaleHandle(format!("document#{}", document.0)))?;
        self.sheet_handles.retain(|_, t| t.document != document.0);
        self.range_handles.retain(|_, t| t.document != document.0);
        tracing::info!("Closed document#{}", document.0);
        Ok(())
    }

    fn save(&mut self, document: DocumentHandle, path: &Path) -> EngineResult<()> {
        self.check(FailPoint::Save)?;
        let doc = self.document(document)?;
        if doc.read_only {
            return Err(EngineError::ReadOnly(path.display().to_string()));
        }
        doc.write(path, doc.format)?;
        tracing::info!("Saved document#{} to {}", document.0, path.display());
        Ok(())
    }

    fn save_as(
        &mut self,
        document: DocumentHandle,
        path: &Path,
        format: SaveFormat,
    ) -> EngineResult<()> {
        self.check(FailPoint::Save)?;
        self.document(document)?.write(path, format)?;
        self.document_mut(document)?.format = format;
        tracing::info!(
            "Saved document#{} to {} as {:?}",
            document.0,
            path.display(),
            format
        );
        Ok(())
    }

    fn sheet_count(&mut self, document: DocumentHandle) -> EngineResult<usize> {
        Ok(self.document(document)?.sheets.len())
    }

    fn sheet_at(&mut self, document: DocumentHandle, index: usize) -> EngineResult<SheetHandle> {
        let doc = self.document(document)?;
        let count = doc.sheets.len();
        let id = index
            .checked_sub(1)
            .and_then(|i| doc.sheets.get(i))
            .map(|slot| slot.id)
            .ok_or(EngineError::SheetIndex(index, count))?;
        Ok(self.issue_sheet(document.0, id))
    }

    fn find_sheet(
        &mut self,
        document: DocumentHandle,
        name: &str,
    ) -> EngineResult<Option<SheetHandle>> {
        let name = name.to_lowercase();
        let found = self
            .document(document)?
            .sheets
            .iter()
            .find(|slot| slot.sheet.name().to_lowercase() == name)
            .map(|slot| slot.id);
        Ok(found.map(|id| self.issue_sheet(document.0, id)))
    }

    fn sheet_name(&mut self, sheet: SheetHandle) -> EngineResult<String> {
        Ok(self.sheet_of(sheet)?.name().to_string())
    }

    fn activate_sheet(&mut self, sheet: SheetHandle) -> EngineResult<()> {
        let target = self.sheet_target(sheet)?;
        let doc = self.document_mut(DocumentHandle(target.document))?;
        let position = doc
            .position(target.sheet)
            .ok_or_else(|| EngineError::StaleHandle(Handle::from(sheet).to_string()))?;
        doc.active = position;
        Ok(())
    }

    fn create_sheet(&mut self, document: DocumentHandle) -> EngineResult<SheetHandle> {
        let doc = self.document(document)?;
        let mut n = doc.sheets.len() + 1;
        while doc.has_name(&format!("Sheet{n}"), None) {
            n += 1;
        }

        let id = self.allocate_id();
        self.document_mut(document)?.sheets.push(SheetSlot {
            id,
            sheet: Sheet::new(format!("Sheet{n}")),
        });
        Ok(self.issue_sheet(document.0, id))
    }

    fn rename_sheet(&mut self, sheet: SheetHandle, name: &str) -> EngineResult<()> {
        let target = self.sheet_target(sheet)?;
        let doc = self.document(DocumentHandle(target.document))?;
        if name.trim().is_empty() || doc.has_name(name, Some(target.sheet)) {
            return Err(MemoryError::InvalidSheetName(name.to_string()).into());
        }
        self.slot_mut(target.document, target.sheet)?
            .sheet
            .set_name(name);
        Ok(())
    }

    fn delete_sheet(&mut self, sheet: SheetHandle) -> EngineResult<()> {
        let target = self.sheet_target(sheet)?;
        let doc = self.document_mut(DocumentHandle(target.document))?;
        let position = doc
            .position(target.sheet)
            .ok_or_else(|| EngineError::StaleHandle(Handle::from(sheet).to_string()))?;
        if doc.sheets.len() == 1 {
            return Err(MemoryError::EmptyWorkbook.into());
        }

        doc.sheets.remove(position);
        if doc.active > position || doc.active == doc.sheets.len() {
            doc.active -= 1;
        }
        Ok(())
    }

    fn resolve_range(&mut self, sheet: SheetHandle, address: &str) -> EngineResult<RangeHandle> {
        self.check(FailPoint::ResolveRange)?;
        let target = self.sheet_target(sheet)?;
        let parsed = parse_range_address(address)
            .ok_or_else(|| EngineError::InvalidAddress(address.to_string()))?;

        let id = self.allocate_id();
        self.range_handles.insert(
            id,
            RangeTarget {
                document: target.document,
                sheet: target.sheet,
                address: parsed.normalized(),
            },
        );
        tracing::trace!("Issued range#{id} for {address}");
        Ok(RangeHandle(id))
    }

    fn read_cell(&mut self, range: RangeHandle) -> EngineResult<Option<CellValue>> {
        self.check(FailPoint::ReadCell)?;
        let (sheet, address) = self.range_of(range)?;
        Ok(sheet.value(address.start()).cloned())
    }

    fn read_values(&mut self, range: RangeHandle) -> EngineResult<RawValues> {
        self.check(FailPoint::ReadValues)?;
        let base = self.buffer_base;
        let (sheet, address) = self.range_of(range)?;

        if address.is_single_cell() {
            return Ok(match sheet.value(address.start()) {
                Some(value) => RawValues::Scalar(value.clone()),
                None => RawValues::Null,
            });
        }

        let rows = address.row_count() as usize;
        let columns = address.column_count() as usize;
        let mut grid = ValueGrid::with_base(rows, columns, base);
        for r in 0..rows {
            for c in 0..columns {
                let at = CellAddress::new(
                    address.row_begin + r as u32,
                    address.column_begin + c as u32,
                );
                grid.set(base + r, base + c, sheet.value(at).cloned());
            }
        }
        Ok(RawValues::Grid(grid))
    }

    fn write_cell(&mut self, range: RangeHandle, value: Option<CellValue>) -> EngineResult<()> {
        let (sheet, address) = self.range_of_mut(range)?;
        sheet.update_range(&address, |cell| cell.value = value.clone());
        Ok(())
    }

    fn write_values(&mut self, range: RangeHandle, values: &ValueGrid) -> EngineResult<()> {
        self.check(FailPoint::WriteValues)?;
        let (sheet, address) = self.range_of_mut(range)?;
        let start = address.start();
        for (r, row) in values.iter_rows().enumerate() {
            for (c, value) in row.iter().enumerate() {
                let at = CellAddress::new(start.row + r as u32, start.column + c as u32);
                sheet.set_value(at, value.clone());
            }
        }
        Ok(())
    }

    fn delete_range(&mut self, range: RangeHandle, shift: Shift) -> EngineResult<()> {
        let (sheet, address) = self.range_of_mut(range)?;
        sheet.delete_range(&address, shift);
        Ok(())
    }

    fn count_non_empty(&mut self, range: RangeHandle) -> EngineResult<usize> {
        let (sheet, address) = self.range_of(range)?;
        Ok(sheet.count_values(&address))
    }

    fn background_color(&mut self, range: RangeHandle) -> EngineResult<Color> {
        let (sheet, address) = self.range_of(range)?;
        Ok(sheet
            .cell(address.start())
            .map(|c| c.background)
            .unwrap_or_default())
    }

    fn set_background_color(&mut self, range: RangeHandle, color: Color) -> EngineResult<()> {
        let (sheet, address) = self.range_of_mut(range)?;
        sheet.update_range(&address, |cell| cell.background = color);
        Ok(())
    }

    fn font_color(&mut self, range: RangeHandle) -> EngineResult<Color> {
        let (sheet, address) = self.range_of(range)?;
        Ok(sheet
            .cell(address.start())
            .map(|c| c.font)
            .unwrap_or_default())
    }

    fn set_font_color(&mut self, range: RangeHandle, color: Color) -> EngineResult<()> {
        let (sheet, address) = self.range_of_mut(range)?;
        sheet.update_range(&address, |cell| cell.font = color);
        Ok(())
    }

    fn background_color_index(&mut self, range: RangeHandle) -> EngineResult<Option<u8>> {
        Ok(self.background_color(range)?.palette_index())
    }

    fn set_background_color_index(&mut self, range: RangeHandle, index: u8) -> EngineResult<()> {
        let color = Color::from_index(index).ok_or(MemoryError::InvalidColorIndex(index))?;
        self.set_background_color(range, color)
    }

    fn font_color_index(&mut self, range: RangeHandle) -> EngineResult<Option<u8>> {
        Ok(self.font_color(range)?.palette_index())
    }

    fn set_font_color_index(&mut self, range: RangeHandle, index: u8) -> EngineResult<()> {
        let color = Color::from_index(index).ok_or(MemoryError::InvalidColorIndex(index))?;
        self.set_font_color(range, color)
    }

    fn number_format(&mut self, range: RangeHandle) -> EngineResult<String> {
        let (sheet, address) = self.range_of(range)?;
        Ok(sheet
            .cell(address.start())
            .and_then(|c| c.number_format.clone())
            .unwrap_or_else(|| GENERAL_FORMAT.to_string()))
    }

    fn set_number_format(&mut self, range: RangeHandle, format: &str) -> EngineResult<()> {
        let format = (format != GENERAL_FORMAT).then(|| format.to_string());
        let (sheet, address) = self.range_of_mut(range)?;
        sheet.update_range(&address, |cell| cell.number_format = format.clone());
        Ok(())
    }

    fn last_used_cell(&mut self, sheet: SheetHandle) -> EngineResult<(u32, u32)> {
        self.check(FailPoint::LastUsedCell)?;
        Ok(self.sheet_of(sheet)?.last_used_cell())
    }

    fn release(&mut self, handle: Handle) -> EngineResult<()> {
        let released = match handle {
            Handle::Sheet(h) => self.sheet_handles.remove(&h.0).is_some(),
            Handle::Range(h) => self.range_handles.remove(&h.0).is_some(),
        };
        if released {
            Ok(())
        } else {
            Err(EngineError::StaleHandle(handle.to_string()))
        }
    }
}
