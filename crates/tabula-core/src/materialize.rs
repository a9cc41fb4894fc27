//! Range materialization: engine value buffers into caller-owned tables

use std::fmt;
use std::ops::Index;

use crate::address::RangeRequest;
use crate::engine::{DocumentEngine, SheetHandle};
use crate::error::Result;
use crate::scoped::{RangeGuard, Scoped};
use crate::value::RawValues;

/// Rows of cell text read from a range
///
/// Every row has the same length. Absent cells are empty strings. The table
/// owns its data and keeps nothing from the document it came from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct TabularValues {
    rows: Vec<Vec<String>>,
}

impl TabularValues {
    /// An empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from rows, padding short rows with empty strings
    pub fn from_rows(mut rows: Vec<Vec<String>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, String::new());
        }
        Self { rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.rows.first().map(Vec::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[String]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// Text at (row, column), zero-based within the table
    pub fn get(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row)?.get(column).map(String::as_str)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Vec<String>> {
        self.rows.iter()
    }

    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.rows
    }
}

impl Index<usize> for TabularValues {
    type Output = [String];

    fn index(&self, row: usize) -> &[String] {
        &self.rows[row]
    }
}

impl IntoIterator for TabularValues {
    type Item = Vec<String>;
    type IntoIter = std::vec::IntoIter<Vec<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a TabularValues {
    type Item = &'a Vec<String>;
    type IntoIter = std::slice::Iter<'a, Vec<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Convert an engine value buffer into [`TabularValues`]
///
/// Only a 2-D buffer materializes; a scalar or null yields `None`.
///
/// The row count is the extent of the first dimension. The column count is
/// the *upper bound* of the second dimension, not its extent: both agree for
/// the native one-based shape, while a zero-based buffer loses its last
/// column. Cells are read from the lower bound upwards in both dimensions.
pub fn materialize(raw: &RawValues) -> Option<TabularValues> {
    let RawValues::Grid(grid) = raw else {
        return None;
    };

    let base = grid.lower_bound();
    let columns = grid.upper_bound(1);

    let rows = (0..grid.extent(0))
        .map(|r| {
            (0..columns)
                .map(|c| {
                    grid.get(base + r, base + c)
                        .map(ToString::to_string)
                        .unwrap_or_default()
                })
                .collect()
        })
        .collect();

    Some(TabularValues { rows })
}

/// Resolve an address on a sheet into a range handle released on drop
pub fn resolve_range<'e, E, A>(
    engine: &'e mut E,
    sheet: SheetHandle,
    address: A,
) -> Result<RangeGuard<'e, E>>
where
    E: DocumentEngine + ?Sized,
    A: fmt::Display,
{
    let address = address.to_string();
    tracing::debug!("Resolving range {address}");
    let handle = engine.resolve_range(sheet, &address)?;
    Ok(Scoped::new(engine, handle))
}

/// Read a caller-space rectangle from a sheet
///
/// The range handle is released before returning, on success and on error.
pub fn read_range<E>(
    engine: &mut E,
    sheet: SheetHandle,
    request: &RangeRequest,
    header_row: bool,
) -> Result<Option<TabularValues>>
where
    E: DocumentEngine + ?Sized,
{
    let address = request.resolve(header_row);
    let mut range = resolve_range(engine, sheet, address)?;
    let handle = range.handle();
    let raw = range.engine().read_values(handle)?;
    Ok(materialize(&raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{CellValue, ValueGrid};
    use pretty_assertions::assert_eq;

    fn text(s: &str) -> Option<CellValue> {
        Some(CellValue::text(s))
    }

    #[test]
    fn test_materialize_populated_grid() {
        let grid = ValueGrid::from_rows(vec![
            vec![text("a"), Some(CellValue::Number(1.0))],
            vec![text("b"), Some(CellValue::Number(2.5))],
            vec![text("c"), Some(CellValue::Bool(false))],
        ]);

        let table = materialize(&RawValues::Grid(grid)).unwrap();
        assert_eq!(table.row_count(), 3);
        assert!(table.iter().all(|row| row.len() == 2));
        assert_eq!(
            table.into_rows(),
            vec![
                vec!["a".to_string(), "1".to_string()],
                vec!["b".to_string(), "2.5".to_string()],
                vec!["c".to_string(), "FALSE".to_string()],
            ]
        );
    }

    #[test]
    fn test_materialize_null_cell_is_empty_string() {
        let grid = ValueGrid::from_rows(vec![
            vec![text("a"), text("b")],
            vec![text("c"), None],
        ]);

        let table = materialize(&RawValues::Grid(grid)).unwrap();
        assert_eq!(table.get(1, 1), Some(""));
        assert_eq!(table.row(1).map(|r| r.len()), Some(2));
    }

    #[test]
    fn test_materialize_non_grid_yields_nothing() {
        assert_eq!(materialize(&RawValues::Null), None);
        assert_eq!(materialize(&RawValues::Scalar(CellValue::from(3))), None);
    }

    #[test]
    fn test_materialize_zero_based_grid_drops_last_column() {
        let mut grid = ValueGrid::with_base(2, 3, 0);
        for r in 0..2 {
            for c in 0..3 {
                grid.set(r, c, Some(CellValue::text(format!("r{r}c{c}"))));
            }
        }

        let table = materialize(&RawValues::Grid(grid)).unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 2);
        assert_eq!(table[0], ["r0c0".to_string(), "r0c1".to_string()]);
        assert_eq!(table[1], ["r1c0".to_string(), "r1c1".to_string()]);
    }

    #[test]
    fn test_materialize_one_based_grid_keeps_every_column() {
        let grid = ValueGrid::from_rows(vec![vec![text("x"), text("y"), text("z")]]);
        let table = materialize(&RawValues::Grid(grid)).unwrap();
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.get(0, 2), Some("z"));
    }

    #[test]
    fn test_from_rows_pads() {
        let table = TabularValues::from_rows(vec![vec!["a".into()], vec![]]);
        assert_eq!(table.column_count(), 1);
        assert_eq!(table.get(1, 0), Some(""));
    }
}
