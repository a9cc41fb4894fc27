//! Runs the tabula binary against files in a temp directory

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use pretty_assertions::assert_eq;

fn tabula(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tabula"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "tabula failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout.clone()).unwrap()
}

fn write_stock(dir: &Path) -> String {
    let path = dir.join("stock.csv");
    fs::write(&path, "item,qty,price\nbolt,12,0.5\nnut,40,\nwasher,7,0.1\n").unwrap();
    path.display().to_string()
}

#[test]
fn test_dump_whole_sheet_with_header() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_stock(dir.path());

    let output = tabula(&["dump", &input, "--header", "--delimiter", ","]);
    assert_eq!(stdout(&output), "bolt,12,0.5\nnut,40,\nwasher,7,0.1\n");
}

#[test]
fn test_dump_range() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_stock(dir.path());

    let output = tabula(&["dump", &input, "--range", "1,2,0,2"]);
    assert_eq!(stdout(&output), "bolt\t12\nnut\t40\n");
}

#[test]
fn test_cell() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_stock(dir.path());

    let output = tabula(&["cell", &input, "2", "1"]);
    assert_eq!(
        stdout(&output),
        "value: 40\nbackground: auto\nfont: auto\nnumber format: General\n"
    );
}

#[test]
fn test_convert_and_list_sheets() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_stock(dir.path());
    let book = dir.path().join("stock.json");
    let book = book.display().to_string();

    let output = tabula(&["convert", &input, &book]);
    stdout(&output);

    let output = tabula(&["sheets", &book]);
    assert_eq!(stdout(&output), "0\tstock\n");

    let tsv = dir.path().join("stock.tsv");
    let output = tabula(&["convert", &book, &tsv.display().to_string()]);
    stdout(&output);
    assert_eq!(
        fs::read_to_string(&tsv).unwrap(),
        "item\tqty\tprice\nbolt\t12\t0.5\nnut\t40\t\nwasher\t7\t0.1\n"
    );
}

#[test]
fn test_missing_input_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.csv");

    let output = tabula(&["dump", &missing.display().to_string()]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to open"));
}

#[test]
fn test_unknown_sheet_fails() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_stock(dir.path());

    let output = tabula(&["dump", &input, "--sheet", "Other"]);
    assert!(!output.status.success());
}
