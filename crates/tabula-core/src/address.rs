//! Address translation between caller space and document space
//!
//! Caller space is zero-based: row 0 is the first row (or the first data row
//! when the document declares a header row) and column 0 is the first column.
//! Document space is the one-based A1 convention of the underlying engine.

use std::fmt;

use crate::{MAX_COLUMNS, MAX_ROWS};

/// Convert a one-based column index to its letter name (1 = A, 26 = Z, 27 = AA)
///
/// Zero-less base 26: there is no digit for zero, so the next letter is
/// `(n - 1) % 26` and the remainder carries `(n - modulo) / 26`.
/// An index of `0` yields the empty string.
///
/// # Examples
/// ```
/// use tabula_core::column_name;
///
/// assert_eq!(column_name(1), "A");
/// assert_eq!(column_name(52), "AZ");
/// assert_eq!(column_name(0), "");
/// ```
pub fn column_name(column: u32) -> String {
    let mut name = String::new();
    let mut dividend = column;

    while dividend > 0 {
        let modulo = (dividend - 1) % 26;
        name.insert(0, (b'A' + modulo as u8) as char);
        dividend = (dividend - modulo) / 26;
    }

    name
}

/// Convert a column letter name back to its one-based index (A = 1, AA = 27)
///
/// Letters are case-insensitive. Returns `None` for an empty name, a
/// non-alphabetic character, or a name past `u32` range.
pub fn column_index(name: &str) -> Option<u32> {
    if name.is_empty() {
        return None;
    }

    let mut index: u32 = 0;
    for c in name.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let digit = c.to_ascii_uppercase() as u32 - 'A' as u32 + 1;
        index = index.checked_mul(26)?.checked_add(digit)?;
    }

    Some(index)
}

/// Translate a zero-based caller row into a one-based document row
///
/// The header row, when present, occupies document row 1, so caller row 0
/// becomes document row 2.
pub fn adjust_row(row: u32, header_row: bool) -> u32 {
    let row = row.saturating_add(1);
    if header_row {
        row.saturating_add(1)
    } else {
        row
    }
}

/// A column reference in caller space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnRef {
    /// A concrete column index
    At(u32),
    /// Open-ended: the last used column of the sheet
    Last,
}

impl ColumnRef {
    /// The concrete index, if any
    pub fn index(self) -> Option<u32> {
        match self {
            ColumnRef::At(column) => Some(column),
            ColumnRef::Last => None,
        }
    }
}

impl From<u32> for ColumnRef {
    fn from(column: u32) -> Self {
        ColumnRef::At(column)
    }
}

/// Translate a caller column into document space
///
/// [`ColumnRef::Last`] is passed through untouched; it has to be resolved
/// against the engine's last used cell before it can be named.
pub fn adjust_column(column: ColumnRef) -> ColumnRef {
    match column {
        ColumnRef::At(column) => ColumnRef::At(document_column(column)),
        ColumnRef::Last => ColumnRef::Last,
    }
}

fn document_column(column: u32) -> u32 {
    column.saturating_add(1)
}

/// A single cell in document space (one-based row and column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellAddress {
    pub row: u32,
    pub column: u32,
}

impl CellAddress {
    /// Create a document-space address
    pub fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Translate a caller-space cell into document space
    pub fn resolve(row: u32, column: u32, header_row: bool) -> Self {
        Self {
            row: adjust_row(row, header_row),
            column: document_column(column),
        }
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_name(self.column), self.row)
    }
}

/// A rectangular region in caller space
///
/// Ordering of the bounds is the caller's business; nothing here swaps or
/// rejects a reversed range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RangeRequest {
    pub row_begin: u32,
    pub row_end: u32,
    pub column_begin: u32,
    /// Used as-is when naming the end column, so it reads as the one-based
    /// index of the last column (an exclusive bound in caller terms).
    pub column_end: u32,
}

impl RangeRequest {
    pub fn new(row_begin: u32, row_end: u32, column_begin: u32, column_end: u32) -> Self {
        Self {
            row_begin,
            row_end,
            column_begin,
            column_end,
        }
    }

    /// Translate into a document-space range
    ///
    /// Rows go through [`adjust_row`] and the begin column through
    /// [`adjust_column`]; the end column is not incremented.
    pub fn resolve(&self, header_row: bool) -> RangeAddress {
        RangeAddress {
            row_begin: adjust_row(self.row_begin, header_row),
            row_end: adjust_row(self.row_end, header_row),
            column_begin: document_column(self.column_begin),
            column_end: self.column_end,
        }
    }
}

/// A rectangular region in document space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RangeAddress {
    pub row_begin: u32,
    pub row_end: u32,
    pub column_begin: u32,
    pub column_end: u32,
}

impl RangeAddress {
    pub fn new(row_begin: u32, row_end: u32, column_begin: u32, column_end: u32) -> Self {
        Self {
            row_begin,
            row_end,
            column_begin,
            column_end,
        }
    }

    /// A range covering a single cell
    pub fn single(cell: CellAddress) -> Self {
        Self::new(cell.row, cell.row, cell.column, cell.column)
    }

    /// Swap bounds so that begin <= end on both axes
    pub fn normalized(&self) -> Self {
        Self {
            row_begin: self.row_begin.min(self.row_end),
            row_end: self.row_begin.max(self.row_end),
            column_begin: self.column_begin.min(self.column_end),
            column_end: self.column_begin.max(self.column_end),
        }
    }

    /// Top-left cell
    pub fn start(&self) -> CellAddress {
        CellAddress::new(self.row_begin, self.column_begin)
    }

    /// Bottom-right cell
    pub fn end(&self) -> CellAddress {
        CellAddress::new(self.row_end, self.column_end)
    }

    pub fn is_single_cell(&self) -> bool {
        self.row_begin == self.row_end && self.column_begin == self.column_end
    }

    /// Number of rows, after normalization. Saturates at `u32::MAX`.
    pub fn row_count(&self) -> u32 {
        let n = self.normalized();
        (n.row_end - n.row_begin).saturating_add(1)
    }

    /// Number of columns, after normalization. Saturates at `u32::MAX`.
    pub fn column_count(&self) -> u32 {
        let n = self.normalized();
        (n.column_end - n.column_begin).saturating_add(1)
    }

    /// Check if a document-space cell lies inside this range
    pub fn contains(&self, cell: CellAddress) -> bool {
        let n = self.normalized();
        cell.row >= n.row_begin
            && cell.row <= n.row_end
            && cell.column >= n.column_begin
            && cell.column <= n.column_end
    }
}

impl fmt::Display for RangeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}:{}{}",
            column_name(self.column_begin),
            self.row_begin,
            column_name(self.column_end),
            self.row_end
        )
    }
}

/// Parse an A1-style range ("B2:D4") or single cell ("C3")
///
/// `$` markers are accepted and ignored. Bounds are returned as written,
/// without normalization. Returns `None` for anything that does not name a
/// cell inside the sheet limits, including the column-less `"A1:1"` that a
/// zero end column produces.
pub fn parse_range_address(address: &str) -> Option<RangeAddress> {
    let address = address.trim();

    match address.split_once(':') {
        Some((start, end)) => {
            let start = parse_cell(start)?;
            let end = parse_cell(end)?;
            Some(RangeAddress::new(start.row, end.row, start.column, end.column))
        }
        None => parse_cell(address).map(RangeAddress::single),
    }
}

fn parse_cell(s: &str) -> Option<CellAddress> {
    let s = s.trim();
    let bytes = s.as_bytes();
    let mut pos = 0;

    if bytes.get(pos) == Some(&b'$') {
        pos += 1;
    }

    let letters_start = pos;
    while pos < bytes.len() && bytes[pos].is_ascii_alphabetic() {
        pos += 1;
    }
    let column = column_index(&s[letters_start..pos])?;

    if bytes.get(pos) == Some(&b'$') {
        pos += 1;
    }

    let digits = &s[pos..];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let row: u32 = digits.parse().ok()?;

    if row == 0 || row > MAX_ROWS || column > MAX_COLUMNS {
        return None;
    }

    Some(CellAddress::new(row, column))
}
