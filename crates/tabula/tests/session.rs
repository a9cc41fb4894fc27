//! End-to-end tests for sessions over the memory engine

use std::fs;

use pretty_assertions::assert_eq;
use tabula::prelude::*;
use tabula::{EngineError, MemoryError};
use tabula_memory::{FailPoint, Sheet};

fn rows(table: &[&[&str]]) -> Vec<Vec<String>> {
    table
        .iter()
        .map(|row| row.iter().map(|s| s.to_string()).collect())
        .collect()
}

/// Session over a single sheet holding `data` from A1
fn session_with(data: Vec<Vec<Option<CellValue>>>) -> MemorySession {
    let mut engine = MemoryEngine::new();
    let sheet = Sheet::from_rows("Data", data);
    let document = engine.insert_document(vec![sheet]);

    let path = tempfile::Builder::new()
        .suffix(".json")
        .tempfile()
        .unwrap()
        .into_temp_path();
    engine
        .save_as(document, &path, SaveFormat::Workbook)
        .unwrap();
    engine.close(document).unwrap();

    let mut session = Session::new(engine);
    session.open(&path).unwrap();
    session
}

fn n(v: i32) -> Option<CellValue> {
    Some(CellValue::from(v))
}

fn t(s: &str) -> Option<CellValue> {
    Some(CellValue::text(s))
}

#[test]
fn test_three_by_two_range() {
    let mut session = session_with(vec![
        vec![t("a"), n(1)],
        vec![t("b"), n(2)],
        vec![t("c"), n(3)],
    ]);

    let table = session.range_values(0, 2, 0, 2).unwrap();
    assert_eq!(table.row_count(), 3);
    assert_eq!(
        table.into_rows(),
        rows(&[&["a", "1"], &["b", "2"], &["c", "3"]])
    );
}

#[test]
fn test_null_cell_reads_as_empty_string() {
    let mut session = session_with(vec![vec![t("a"), t("b")], vec![t("c"), None]]);

    let table = session.range_values(0, 1, 0, 2).unwrap();
    assert_eq!(table.get(1, 1), Some(""));
    assert_eq!(table[1].len(), 2);
}

#[test]
fn test_header_row_whole_sheet() {
    let mut session = session_with(vec![
        vec![t("id"), t("name"), t("score")],
        vec![n(1), t("ada"), n(90)],
        vec![n(2), t("alan"), None],
        vec![n(3), t("grace"), n(75)],
        vec![n(4), None, n(60)],
    ]);
    session.set_header_row(true);

    assert_eq!(session.cell_value(0, 1).unwrap(), "ada");
    assert_eq!(session.last_used_row().unwrap(), Some(3));
    assert_eq!(session.last_used_column().unwrap(), 2);

    let table = session.sheet_data().unwrap();
    assert_eq!(table.row_count(), 4);
    assert!(table.iter().all(|row| row.len() == 3));
    assert_eq!(
        table.into_rows(),
        rows(&[
            &["1", "ada", "90"],
            &["2", "alan", ""],
            &["3", "grace", "75"],
            &["4", "", "60"],
        ])
    );
}

#[test]
fn test_whole_sheet_without_header() {
    let mut session = session_with(vec![vec![t("x"), t("y")], vec![t("z"), None]]);
    assert_eq!(
        session.sheet_data().unwrap().into_rows(),
        rows(&[&["x", "y"], &["z", ""]])
    );
}

#[test]
fn test_is_cell_empty() {
    let mut session = session_with(vec![vec![t(""), t(" "), None, t("0"), t("false")]]);

    assert!(session.is_cell_empty(0, 0).unwrap());
    assert!(session.is_cell_empty(0, 1).unwrap());
    assert!(session.is_cell_empty(0, 2).unwrap());
    assert!(!session.is_cell_empty(0, 3).unwrap());
    assert!(!session.is_cell_empty(0, 4).unwrap());
}

#[test]
fn test_open_missing_path() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = Session::in_memory();

    let err = session.open(dir.path().join("missing.csv")).unwrap_err();
    assert!(err.is_engine_failure());
    assert!(!session.is_open());

    assert!(matches!(
        session.cell_value(0, 0),
        Err(Error::InvalidDocumentState(_))
    ));
    assert!(matches!(
        session.range_values(0, 1, 0, 1),
        Err(Error::InvalidDocumentState(_))
    ));
    assert!(matches!(
        session.sheet_data(),
        Err(Error::InvalidDocumentState(_))
    ));
}

#[test]
fn test_failed_open_closes_previous_document() {
    let mut session = Session::in_memory();
    session.create().unwrap();

    session.engine_mut().fail_next(FailPoint::Open);
    assert!(session.open("book.json").is_err());
    assert!(!session.is_open());
    assert_eq!(session.engine().live_handles(), 0);
}

#[test]
fn test_single_cell_range_is_empty_table() {
    let mut session = session_with(vec![vec![t("only")]]);
    assert!(session.range_values(0, 0, 0, 1).unwrap().is_empty());
    assert_eq!(session.cell_value(0, 0).unwrap(), "only");
}

#[test]
fn test_zero_end_column_is_engine_failure() {
    let mut session = session_with(vec![vec![t("a"), t("b")]]);
    let err = session.range_values(0, 0, 0, 0).unwrap_err();
    assert!(matches!(err, Error::Engine(EngineError::InvalidAddress(_))));
    assert_eq!(session.engine().live_handles(), 1);
}

#[test]
fn test_engine_failure_releases_range() {
    let mut session = session_with(vec![vec![t("a"), t("b")], vec![t("c"), t("d")]]);

    session.engine_mut().fail_next(FailPoint::ReadValues);
    assert!(session.range_values(0, 1, 0, 2).is_err());
    session.engine_mut().fail_next(FailPoint::ReadCell);
    assert!(session.cell_value(0, 0).is_err());

    // only the active sheet is held
    assert_eq!(session.engine().live_handles(), 1);
    assert_eq!(session.cell_value(0, 0).unwrap(), "a");
}

#[test]
fn test_row_and_column_values() {
    let mut session = session_with(vec![
        vec![t("a"), t("b"), t("c")],
        vec![t("d"), None, t("f")],
    ]);

    assert_eq!(session.row_values(1).unwrap(), vec!["d", "", "f"]);
    assert_eq!(session.column_values(2).unwrap(), vec!["c", "f"]);

    session.set_header_row(true);
    assert_eq!(session.column_values(0).unwrap(), vec!["d"]);
}

#[test]
fn test_write_then_read() {
    let mut session = Session::in_memory();
    session.create().unwrap();

    session.set_cell_value(0, 0, "total").unwrap();
    session.set_cell_value(0, 1, 12.5).unwrap();
    session.set_cell_value(1, 1, true).unwrap();
    assert_eq!(
        session.sheet_data().unwrap().into_rows(),
        rows(&[&["total", "12.5"], &["", "TRUE"]])
    );
    assert_eq!(session.count_non_empty(0, 1, 0, 2).unwrap(), 3);

    session.clear_cell(0, 1).unwrap();
    assert_eq!(session.cell(0, 1).unwrap(), None);
}

#[test]
fn test_delete_row_and_column() {
    let mut session = session_with(vec![
        vec![n(1), n(2), n(3)],
        vec![n(4), n(5), n(6)],
        vec![n(7), n(8), n(9)],
    ]);

    session.delete_row(0).unwrap();
    session.delete_column(ColumnRef::At(1)).unwrap();
    assert_eq!(
        session.sheet_data().unwrap().into_rows(),
        rows(&[&["4", "6"], &["7", "9"]])
    );

    session.delete_column(ColumnRef::Last).unwrap();
    assert_eq!(session.column_values(0).unwrap(), vec!["4", "7"]);
    assert_eq!(session.last_used_column().unwrap(), 0);
}

#[test]
fn test_delete_range_shift_left() {
    let mut session = session_with(vec![vec![t("a"), t("b"), t("c")]]);
    session.delete_range(0, 0, 0, 1, Shift::Left).unwrap();
    assert_eq!(session.row_values(0).unwrap(), vec!["b", "c"]);
}

#[test]
fn test_cell_colors_and_formats() {
    let mut session = Session::in_memory();
    session.create().unwrap();

    session
        .set_cell_background_color(0, 0, Color::rgb(255, 0, 0))
        .unwrap();
    assert_eq!(session.cell_background_color_index(0, 0).unwrap(), Some(3));

    session.set_cell_font_color_index(0, 0, 5).unwrap();
    assert_eq!(session.cell_font_color(0, 0).unwrap().to_rgb(), (0, 0, 255));

    assert_eq!(session.cell_number_format(0, 0).unwrap(), "General");
    session.set_cell_number_format(0, 0, "0.0").unwrap();
    assert_eq!(session.cell_number_format(0, 0).unwrap(), "0.0");

    let err = session.set_cell_background_color_index(0, 0, 0).unwrap_err();
    assert!(err.is_engine_failure());
}

#[test]
fn test_range_formatting_respects_header() {
    let mut session = session_with(vec![
        vec![t("h1"), t("h2")],
        vec![n(1), n(2)],
        vec![n(3), n(4)],
    ]);
    session.set_header_row(true);

    session
        .set_range_background_color(0, 1, 0, 2, Color::YELLOW)
        .unwrap();
    session.set_range_font_color(0, 0, 0, 1, Color::BLUE).unwrap();
    session.set_range_number_format(1, 1, 1, 2, "0%").unwrap();
    session
        .set_column_number_format(ColumnRef::At(0), "0.00")
        .unwrap();

    assert_eq!(session.cell_background_color(1, 1).unwrap(), Color::YELLOW);
    assert_eq!(session.cell_font_color(0, 0).unwrap(), Color::BLUE);
    assert_eq!(session.cell_number_format(1, 1).unwrap(), "0%");
    assert_eq!(session.cell_number_format(1, 0).unwrap(), "0.00");

    session.set_header_row(false);
    assert_eq!(session.cell_background_color(0, 0).unwrap(), Color::Auto);
    assert_eq!(session.cell_number_format(0, 0).unwrap(), "General");
}

#[test]
fn test_sheet_management() {
    let mut session = Session::in_memory();
    session.create().unwrap();
    session.rename_active_sheet("Summary").unwrap();
    session.add_sheet("Detail").unwrap();
    session.set_cell_value(0, 0, "detail").unwrap();

    assert_eq!(session.sheet_count().unwrap(), 2);
    assert_eq!(session.sheet_names().unwrap(), vec!["Summary", "Detail"]);
    assert_eq!(session.active_sheet_name().unwrap(), "Detail");

    assert!(session.activate_sheet("SUMMARY").unwrap());
    assert!(session.is_cell_empty(0, 0).unwrap());
    assert!(!session.activate_sheet("Archive").unwrap());
    assert_eq!(session.active_sheet_name().unwrap(), "Summary");

    session.activate_sheet_at(1).unwrap();
    assert_eq!(session.cell_value(0, 0).unwrap(), "detail");
    assert!(session.activate_sheet_at(2).is_err());

    let err = session.add_sheet("summary").unwrap_err();
    assert!(matches!(
        &err,
        Error::Engine(EngineError::Backend(inner))
            if matches!(inner.downcast_ref::<MemoryError>(), Some(MemoryError::InvalidSheetName(_)))
    ));
    assert_eq!(session.engine().live_handles(), 1);
}

#[test]
fn test_failed_add_sheet_leaves_document_unchanged() {
    let mut session = Session::in_memory();
    session.create().unwrap();
    session.rename_active_sheet("Summary").unwrap();
    session.set_cell_value(0, 0, "total").unwrap();

    assert!(session.add_sheet("summary").is_err());
    assert!(session.add_sheet("").is_err());

    assert_eq!(session.sheet_count().unwrap(), 1);
    assert_eq!(session.sheet_names().unwrap(), vec!["Summary"]);
    assert_eq!(session.active_sheet_name().unwrap(), "Summary");
    assert_eq!(session.cell_value(0, 0).unwrap(), "total");
    assert_eq!(session.engine().live_handles(), 1);

    session.add_sheet("Detail").unwrap();
    assert_eq!(session.sheet_names().unwrap(), vec!["Summary", "Detail"]);
}

#[test]
fn test_tables_outlive_sheet_switch() {
    let mut session = Session::in_memory();
    session.create().unwrap();
    session
        .set_range_values(0, 0, vec![vec!["a", "b"], vec!["c", "d"]])
        .unwrap();
    let table = session.sheet_data().unwrap();

    session.add_sheet("Other").unwrap();
    session.close().unwrap();
    assert_eq!(table.into_rows(), rows(&[&["a", "b"], &["c", "d"]]));
}

#[test]
fn test_csv_save_and_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");

    let mut session = Session::in_memory();
    session.create().unwrap();
    session
        .set_range_values(0, 0, vec![vec!["id", "qty"], vec!["7", "3"]])
        .unwrap();
    session.save_as(&path).unwrap();
    assert_eq!(session.path(), Some(path.as_path()));
    assert_eq!(fs::read_to_string(&path).unwrap(), "id,qty\n7,3\n");

    let mut reopened = Session::in_memory_with(SessionOptions::new().with_header_row(true));
    reopened.open(&path).unwrap();
    assert_eq!(reopened.cell(0, 0).unwrap(), Some(CellValue::Number(7.0)));
    assert_eq!(reopened.sheet_data().unwrap().into_rows(), rows(&[&["7", "3"]]));
}

#[test]
fn test_read_only_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("locked.tsv");
    fs::write(&path, "a\tb\n").unwrap();

    let mut session = Session::in_memory_with(SessionOptions::new().with_read_only(true));
    session.open(&path).unwrap();
    let err = session.save().unwrap_err();
    assert!(matches!(err, Error::Engine(EngineError::ReadOnly(_))));

    let err = session.save_as(dir.path().join("copy.xlsx")).unwrap_err();
    assert!(matches!(
        err,
        Error::Engine(EngineError::UnsupportedFormat(_))
    ));
}
