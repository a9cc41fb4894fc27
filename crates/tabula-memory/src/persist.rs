//! Loading and saving documents
//!
//! Delimited text holds values only: the first record is row 1 and every
//! field goes through [`CellValue::infer`]. The JSON workbook format keeps
//! every sheet together with colors and number formats.

use std::io::{BufReader, BufWriter, Read, Write};

use serde::{Deserialize, Serialize};
use tabula_core::{CellAddress, CellValue, MAX_COLUMNS, MAX_ROWS};

use crate::error::MemoryError;
use crate::sheet::{CellData, Sheet};

/// Read delimited text into a sheet
pub fn read_delimited<R: Read>(
    reader: R,
    delimiter: u8,
    name: &str,
) -> Result<Sheet, MemoryError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut sheet = Sheet::new(name);
    for (row, result) in csv_reader.records().enumerate() {
        let record = result?;
        for (column, field) in record.iter().enumerate() {
            if let Some(value) = CellValue::infer(field) {
                sheet.set_value(
                    CellAddress::new(row as u32 + 1, column as u32 + 1),
                    Some(value),
                );
            }
        }
    }

    Ok(sheet)
}

/// Write a sheet as delimited text, from A1 through its last used cell
pub fn write_delimited<W: Write>(
    sheet: &Sheet,
    writer: W,
    delimiter: u8,
) -> Result<(), MemoryError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    if sheet.cells().any(|(_, data)| data.value.is_some()) {
        let (last_row, last_column) = sheet.last_used_cell();
        for row in 1..=last_row {
            let record: Vec<String> = (1..=last_column)
                .map(|column| {
                    sheet
                        .value(CellAddress::new(row, column))
                        .map(ToString::to_string)
                        .unwrap_or_default()
                })
                .collect();
            csv_writer.write_record(&record)?;
        }
    }

    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

#[derive(Debug, Serialize, Deserialize)]
struct WorkbookFile {
    #[serde(default)]
    active: usize,
    sheets: Vec<SheetFile>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SheetFile {
    name: String,
    #[serde(default)]
    cells: Vec<CellRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CellRecord {
    row: u32,
    column: u32,
    #[serde(flatten)]
    data: CellData,
}

/// Read a JSON workbook, returning its sheets and the zero-based active sheet
pub fn read_workbook<R: Read>(reader: R) -> Result<(Vec<Sheet>, usize), MemoryError> {
    let file: WorkbookFile = serde_json::from_reader(BufReader::new(reader))?;

    let mut sheets = Vec::with_capacity(file.sheets.len());
    for sheet_file in file.sheets {
        let mut sheet = Sheet::new(sheet_file.name);
        for record in sheet_file.cells {
            let (row, column) = (record.row, record.column);
            if !(1..=MAX_ROWS).contains(&row) || !(1..=MAX_COLUMNS).contains(&column) {
                return Err(MemoryError::CellOutOfBounds { row, column });
            }
            sheet.insert_cell(CellAddress::new(row, column), record.data);
        }
        sheets.push(sheet);
    }

    if sheets.is_empty() {
        return Err(MemoryError::EmptyWorkbook);
    }

    let active = file.active.min(sheets.len() - 1);
    Ok((sheets, active))
}

/// Write every sheet as a JSON workbook
pub fn write_workbook<'a, I, W>(sheets: I, active: usize, writer: W) -> Result<(), MemoryError>
where
    I: IntoIterator<Item = &'a Sheet>,
    W: Write,
{
    let file = WorkbookFile {
        active,
        sheets: sheets
            .into_iter()
            .map(|sheet| SheetFile {
                name: sheet.name().to_string(),
                cells: sheet
                    .cells()
                    .map(|(at, data)| CellRecord {
                        row: at.row,
                        column: at.column,
                        data: data.clone(),
                    })
                    .collect(),
            })
            .collect(),
    };

    let mut writer = BufWriter::new(writer);
    serde_json::to_writer_pretty(&mut writer, &file)?;
    writer.flush().map_err(serde_json::Error::io)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tabula_core::Color;

    #[test]
    fn test_read_delimited_infers_values() {
        let data = "name,qty,ok\nwidget,3,true\n,,\"a, b\"\n";
        let sheet = read_delimited(data.as_bytes(), b',', "Stock").unwrap();

        assert_eq!(sheet.name(), "Stock");
        assert_eq!(
            sheet.value(CellAddress::new(1, 1)),
            Some(&CellValue::text("name"))
        );
        assert_eq!(
            sheet.value(CellAddress::new(2, 2)),
            Some(&CellValue::Number(3.0))
        );
        assert_eq!(
            sheet.value(CellAddress::new(2, 3)),
            Some(&CellValue::Bool(true))
        );
        assert_eq!(sheet.value(CellAddress::new(3, 1)), None);
        assert_eq!(
            sheet.value(CellAddress::new(3, 3)),
            Some(&CellValue::text("a, b"))
        );
        assert_eq!(sheet.last_used_cell(), (3, 3));
    }

    #[test]
    fn test_write_delimited_fills_gaps() {
        let mut sheet = Sheet::new("S");
        sheet.set_value(CellAddress::new(1, 1), Some(CellValue::text("a")));
        sheet.set_value(CellAddress::new(2, 3), Some(CellValue::Number(1.5)));

        let mut out = Vec::new();
        write_delimited(&sheet, &mut out, b'\t').unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "a\t\t\n\t\t1.5\n");
    }

    #[test]
    fn test_write_delimited_empty_sheet() {
        let mut out = Vec::new();
        write_delimited(&Sheet::new("S"), &mut out, b',').unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_workbook_keeps_formatting() {
        let mut first = Sheet::new("First");
        first.set_value(CellAddress::new(1, 1), Some(CellValue::from(7)));
        first.update(CellAddress::new(1, 1), |c| {
            c.background = Color::YELLOW;
            c.number_format = Some("0.00".into());
        });
        let second = Sheet::new("Second");

        let mut out = Vec::new();
        write_workbook(&[first.clone(), second], 1, &mut out).unwrap();

        let (sheets, active) = read_workbook(out.as_slice()).unwrap();
        assert_eq!(active, 1);
        assert_eq!(sheets.len(), 2);
        assert_eq!(sheets[0], first);
        assert_eq!(sheets[1].name(), "Second");
    }

    #[test]
    fn test_workbook_without_sheets_is_rejected() {
        let err = read_workbook(r#"{"sheets": []}"#.as_bytes()).unwrap_err();
        assert!(matches!(err, MemoryError::EmptyWorkbook));
    }

    #[test]
    fn test_workbook_cells_outside_sheet_are_rejected() {
        for (row, column) in [(0, 1), (1, 0), (MAX_ROWS + 1, 1), (1, MAX_COLUMNS + 1)] {
            let json = format!(
                r#"{{"sheets": [{{"name": "Data", "cells": [{{"row": {row}, "column": {column}, "value": {{"Number": 1.0}}}}]}}]}}"#
            );
            let err = read_workbook(json.as_bytes()).unwrap_err();
            assert!(
                matches!(err, MemoryError::CellOutOfBounds { row: r, column: c } if r == row && c == column),
                "{row},{column}: {err}"
            );
        }

        let json = format!(
            r#"{{"sheets": [{{"name": "Data", "cells": [{{"row": {MAX_ROWS}, "column": {MAX_COLUMNS}}}]}}]}}"#
        );
        let (sheets, _) = read_workbook(json.as_bytes()).unwrap();
        assert_eq!(sheets[0].name(), "Data");
    }
}
