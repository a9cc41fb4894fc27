//! Sparse cell storage for one sheet
//!
//! Only cells with a value or non-default formatting are stored, keyed by
//! one-based (row, column) in a BTreeMap so iteration is row-major.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tabula_core::{CellAddress, CellValue, Color, RangeAddress, Shift};

/// Number format reported for cells that never had one set
pub const GENERAL_FORMAT: &str = "General";

/// Complete data for a single cell
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CellData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<CellValue>,
    #[serde(default, skip_serializing_if = "Color::is_auto")]
    pub background: Color,
    #[serde(default, skip_serializing_if = "Color::is_auto")]
    pub font: Color,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_format: Option<String>,
}

impl CellData {
    /// Check if this cell is effectively empty (no value and default formatting)
    pub fn is_empty(&self) -> bool {
        self.value.is_none()
            && self.background.is_auto()
            && self.font.is_auto()
            && self.number_format.is_none()
    }
}

/// A named sheet holding sparse cells
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    name: String,
    cells: BTreeMap<(u32, u32), CellData>,
}

impl Sheet {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            cells: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name<S: Into<String>>(&mut self, name: S) {
        self.name = name.into();
    }

    /// Cell at a one-based address, if anything is stored there
    pub fn cell(&self, at: CellAddress) -> Option<&CellData> {
        self.cells.get(&(at.row, at.column))
    }

    /// Iterate stored cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = (CellAddress, &CellData)> + '_ {
        self.cells
            .iter()
            .map(|(&(row, column), data)| (CellAddress::new(row, column), data))
    }

    pub fn value(&self, at: CellAddress) -> Option<&CellValue> {
        self.cell(at).and_then(|c| c.value.as_ref())
    }

    pub fn set_value(&mut self, at: CellAddress, value: Option<CellValue>) {
        self.update(at, |cell| cell.value = value);
    }

    /// Apply a change to a cell, dropping it if it ends up empty
    pub fn update<F: FnOnce(&mut CellData)>(&mut self, at: CellAddress, change: F) {
        let key = (at.row, at.column);
        let cell = self.cells.entry(key).or_default();
        change(cell);
        if cell.is_empty() {
            self.cells.remove(&key);
        }
    }

    /// Apply a change to every cell of a range
    pub fn update_range<F: FnMut(&mut CellData)>(&mut self, range: &RangeAddress, mut change: F) {
        let range = range.normalized();
        for row in range.row_begin..=range.row_end {
            for column in range.column_begin..=range.column_end {
                self.update(CellAddress::new(row, column), &mut change);
            }
        }
    }

    /// One-based (row, column) of the last cell holding a value; `(1, 1)` when none does
    ///
    /// Row and column are maximised independently, so the result may name a
    /// cell that is itself empty.
    pub fn last_used_cell(&self) -> (u32, u32) {
        self.cells
            .iter()
            .filter(|(_, data)| data.value.is_some())
            .fold((1, 1), |(row, column), (&(r, c), _)| {
                (row.max(r), column.max(c))
            })
    }

    /// Number of cells in the range holding a value
    pub fn count_values(&self, range: &RangeAddress) -> usize {
        self.cells
            .iter()
            .filter(|&(&(row, column), data)| {
                data.value.is_some() && range.contains(CellAddress::new(row, column))
            })
            .count()
    }

    /// Remove a range and close the gap by moving neighbouring cells
    ///
    /// `Shift::Up` pulls cells below the range (in the range's columns) up by
    /// its height; `Shift::Left` pulls cells to its right (in its rows) left
    /// by its width.
    pub fn delete_range(&mut self, range: &RangeAddress, shift: Shift) {
        let range = range.normalized();
        let height = range.row_count();
        let width = range.column_count();

        let cells = std::mem::take(&mut self.cells);
        for ((row, column), data) in cells {
            let at = CellAddress::new(row, column);
            if range.contains(at) {
                continue;
            }

            let moved = match shift {
                Shift::Up
                    if row > range.row_end
                        && (range.column_begin..=range.column_end).contains(&column) =>
                {
                    (row - height, column)
                }
                Shift::Left
                    if column > range.column_end
                        && (range.row_begin..=range.row_end).contains(&row) =>
                {
                    (row, column - width)
                }
                _ => (row, column),
            };
            self.cells.insert(moved, data);
        }
    }

    /// Build a sheet from rows of values, starting at A1
    pub fn from_rows<S, I, R>(name: S, rows: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = Option<CellValue>>,
    {
        let mut sheet = Sheet::new(name);
        for (r, row) in rows.into_iter().enumerate() {
            for (c, value) in row.into_iter().enumerate() {
                if value.is_some() {
                    sheet.set_value(CellAddress::new(r as u32 + 1, c as u32 + 1), value);
                }
            }
        }
        sheet
    }

    pub(crate) fn insert_cell(&mut self, at: CellAddress, data: CellData) {
        if !data.is_empty() {
            self.cells.insert((at.row, at.column), data);
        }
    }
}
