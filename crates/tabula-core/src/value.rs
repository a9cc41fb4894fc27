//! Cell values and the raw buffers engines hand back for ranges

use std::fmt;

/// A non-empty cell value
///
/// Absent cells are modelled as `Option::None` wherever a value may be missing.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellValue {
    Bool(bool),
    Number(f64),
    Text(String),
    /// Error code such as `#DIV/0!`
    Error(String),
}

impl CellValue {
    /// Create a text value
    pub fn text<S: Into<String>>(s: S) -> Self {
        CellValue::Text(s.into())
    }

    /// Create an error value from its code
    pub fn error<S: Into<String>>(code: S) -> Self {
        CellValue::Error(code.into())
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Infer a value from text the way a delimited-text import does
    ///
    /// Empty input yields `None`. Numbers and `TRUE`/`FALSE` (any case) are
    /// recognised; everything else stays text.
    pub fn infer(field: &str) -> Option<Self> {
        if field.is_empty() {
            return None;
        }

        if field.eq_ignore_ascii_case("true") {
            return Some(CellValue::Bool(true));
        }
        if field.eq_ignore_ascii_case("false") {
            return Some(CellValue::Bool(false));
        }

        let trimmed = field.trim();
        if !trimmed.is_empty() && trimmed == field {
            if let Ok(n) = trimmed.parse::<f64>() {
                if n.is_finite() {
                    return Some(CellValue::Number(n));
                }
            }
        }

        Some(CellValue::Text(field.to_string()))
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Error(code) => write!(f, "{code}"),
        }
    }
}

/// What an engine returns when asked for the values of a range
#[derive(Debug, Clone, PartialEq)]
pub enum RawValues {
    /// Nothing at all (an empty single cell)
    Null,
    /// A single cell's value
    Scalar(CellValue),
    /// A rectangular buffer
    Grid(ValueGrid),
}

impl RawValues {
    pub fn is_grid(&self) -> bool {
        matches!(self, RawValues::Grid(_))
    }
}

/// A rectangular value buffer with native lower bounds
///
/// Engines index both dimensions from a lower bound, which is 1 for the
/// native one-based shape. Dimension 0 is rows, dimension 1 is columns.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueGrid {
    rows: usize,
    columns: usize,
    base: usize,
    cells: Vec<Option<CellValue>>,
}

impl ValueGrid {
    /// Create an empty one-based buffer
    pub fn new(rows: usize, columns: usize) -> Self {
        Self::with_base(rows, columns, 1)
    }

    /// Create an empty buffer whose indices start at `base` in both dimensions
    pub fn with_base(rows: usize, columns: usize, base: usize) -> Self {
        Self {
            rows,
            columns,
            base,
            cells: vec![None; rows * columns],
        }
    }

    /// Build a one-based buffer from rows, padding short rows with absent cells
    pub fn from_rows<I, R>(rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = Option<CellValue>>,
    {
        let rows: Vec<Vec<Option<CellValue>>> = rows
            .into_iter()
            .map(|row| row.into_iter().collect())
            .collect();
        let columns = rows.iter().map(Vec::len).max().unwrap_or(0);

        let mut grid = Self::new(rows.len(), columns);
        for (r, row) in rows.into_iter().enumerate() {
            for (c, value) in row.into_iter().enumerate() {
                grid.cells[r * columns + c] = value;
            }
        }
        grid
    }

    /// Number of elements along a dimension (0 = rows, 1 = columns)
    pub fn extent(&self, dimension: usize) -> usize {
        match dimension {
            0 => self.rows,
            _ => self.columns,
        }
    }

    /// Lowest valid index along either dimension
    pub fn lower_bound(&self) -> usize {
        self.base
    }

    /// Highest valid index along a dimension, saturating at zero when empty
    pub fn upper_bound(&self, dimension: usize) -> usize {
        (self.base + self.extent(dimension)).saturating_sub(1)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    fn offset(&self, row: usize, column: usize) -> Option<usize> {
        let r = row.checked_sub(self.base)?;
        let c = column.checked_sub(self.base)?;
        (r < self.rows && c < self.columns).then(|| r * self.columns + c)
    }

    /// Value at native indices; `None` if absent or out of bounds
    pub fn get(&self, row: usize, column: usize) -> Option<&CellValue> {
        self.offset(row, column)
            .and_then(|i| self.cells[i].as_ref())
    }

    /// Store a value at native indices, ignoring out-of-bounds writes
    pub fn set(&mut self, row: usize, column: usize, value: Option<CellValue>) {
        if let Some(i) = self.offset(row, column) {
            self.cells[i] = value;
        }
    }

    /// Iterate rows as slices, top to bottom
    pub fn iter_rows(&self) -> impl Iterator<Item = &[Option<CellValue>]> + '_ {
        // chunks() rejects a zero size
        self.cells
            .chunks(self.columns.max(1))
            .take(if self.columns == 0 { 0 } else { self.rows })
    }
}
