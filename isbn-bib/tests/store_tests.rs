//! CSV store tests

mod helpers;

use helpers::{seeded_record, write_input_csv};
use isbn_bib::{CsvStore, RecordStore, StoreError};
use isbn_common::record::COLUMNS;
use isbn_common::BibliographicRecord;
use tempfile::TempDir;

const SHEET: &str = "Bibliography";

#[test]
fn test_read_identifiers_trims_and_drops_empty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("input.csv");
    std::fs::write(
        &path,
        "Title,ISBN\nA, 978-0-306-40615-7 \nB,\nC,0439023521\n",
    )
    .unwrap();

    let ids = CsvStore::new().read_identifiers(&path, "ISBN").unwrap();
    assert_eq!(ids, vec!["978-0-306-40615-7", "0439023521"]);
}

#[test]
fn test_read_identifiers_handles_bom_header() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("input.csv");
    std::fs::write(&path, "\u{feff}ISBN\n9780306406157\n").unwrap();

    let ids = CsvStore::new().read_identifiers(&path, "ISBN").unwrap();
    assert_eq!(ids, vec!["9780306406157"]);
}

#[test]
fn test_read_identifiers_missing_column_lists_available() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("input.csv");
    write_input_csv(&path, "Barcode", &["9780306406157"]);

    let err = CsvStore::new().read_identifiers(&path, "ISBN").unwrap_err();
    match &err {
        StoreError::MissingColumn {
            column, available, ..
        } => {
            assert_eq!(column, "ISBN");
            assert_eq!(available, &vec!["Barcode".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("Available columns: Barcode"));
}

#[test]
fn test_read_identifiers_missing_file_is_error() {
    let dir = TempDir::new().unwrap();
    let result = CsvStore::new().read_identifiers(&dir.path().join("nope.csv"), "ISBN");
    assert!(result.is_err());
}

#[test]
fn test_load_missing_file_is_none() {
    let dir = TempDir::new().unwrap();
    let loaded = CsvStore::new()
        .load_records(&dir.path().join("nope.csv"), SHEET)
        .unwrap();
    assert!(loaded.is_none());
}

#[test]
fn test_load_without_record_layout_is_missing_sheet() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("other.csv");
    std::fs::write(&path, "Name,Value\nx,1\n").unwrap();

    let err = CsvStore::new().load_records(&path, SHEET).unwrap_err();
    assert!(matches!(err, StoreError::MissingSheet { ref sheet, .. } if sheet == SHEET));
}

#[test]
fn test_load_bad_page_count_is_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.csv");
    std::fs::write(&path, "Input ISBN,Page Count\n9780306406157,many\n").unwrap();

    let err = CsvStore::new().load_records(&path, SHEET).unwrap_err();
    assert!(matches!(err, StoreError::Parse { .. }));
}

#[test]
fn test_load_accepts_partial_layout() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("partial.csv");
    std::fs::write(&path, "Input ISBN,Title,Notes\n0306406152,Experiments,shelf 3\n").unwrap();

    let records = CsvStore::new().load_records(&path, SHEET).unwrap().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].input_identifier, "0306406152");
    assert_eq!(records[0].title.as_deref(), Some("Experiments"));
    assert_eq!(records[0].authors, None);
}

#[test]
fn test_write_uses_fixed_header_and_overwrites() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.csv");
    let store = CsvStore::new();

    store
        .write_records(
            &[seeded_record("a", "A"), seeded_record("b", "B")],
            &path,
            SHEET,
        )
        .unwrap();
    let written = store
        .write_records(&[seeded_record("c", "C")], &path, SHEET)
        .unwrap();
    assert_eq!(written, 1);

    let content = std::fs::read_to_string(&path).unwrap();
    let header = content.lines().next().unwrap();
    assert_eq!(header, COLUMNS.join(","));

    let records = store.load_records(&path, SHEET).unwrap().unwrap();
    assert_eq!(records, vec![seeded_record("c", "C")]);
    assert!(!dir.path().join("out.csv.tmp").exists());
}

#[test]
fn test_write_preserves_every_field() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.csv");
    let record = BibliographicRecord {
        input_identifier: "0-306-40615-2".to_string(),
        title: Some("Experiments, Volume 1".to_string()),
        authors: Some("A. Author, B. Author".to_string()),
        publication_date: Some("1985-09-01".to_string()),
        publication_year: Some("1985".to_string()),
        isbn_10: Some("0306406152".to_string()),
        isbn_13: Some("9780306406157".to_string()),
        page_count: Some(312),
        description: Some("Line one\nline \"two\"".to_string()),
        source: Some("google".to_string()),
        ..BibliographicRecord::default()
    };

    let store = CsvStore::new();
    store.write_records(&[record.clone()], &path, SHEET).unwrap();
    let loaded = store.load_records(&path, SHEET).unwrap().unwrap();
    assert_eq!(loaded, vec![record]);
}

#[test]
fn test_write_empty_set_is_refused() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.csv");

    let err = CsvStore::new().write_records(&[], &path, SHEET).unwrap_err();
    assert!(matches!(err, StoreError::Empty));
    assert!(!path.exists());
}

#[test]
fn test_write_creates_parent_directory() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("out.csv");

    CsvStore::new()
        .write_records(&[seeded_record("a", "A")], &path, SHEET)
        .unwrap();
    assert!(path.exists());
}

#[cfg(unix)]
#[test]
fn test_failed_rename_removes_temp_file() {
    let dir = TempDir::new().unwrap();
    // A directory at the destination makes the final rename fail
    let path = dir.path().join("out.csv");
    std::fs::create_dir(&path).unwrap();
    std::fs::write(path.join("keep.txt"), "x").unwrap();

    let err = CsvStore::new()
        .write_records(&[seeded_record("a", "A")], &path, SHEET)
        .unwrap_err();
    assert!(matches!(err, StoreError::Io(_)));
    assert!(!dir.path().join("out.csv.tmp").exists());
    assert!(path.join("keep.txt").exists());
}
