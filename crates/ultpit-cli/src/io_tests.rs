//! Tests for value ingestion and selection output.

use std::fs;
use std::io::{Cursor, Read};

use flate2::read::GzDecoder;

use super::*;

fn pit(selections: Vec<Vec<bool>>) -> PitSolution {
    PitSolution {
        selections,
        reports: Vec::new(),
        relevant_blocks: 0,
    }
}

fn gzip(text: &str) -> Vec<u8> {
    let mut enc = GzEncoder::new(Vec::new(), Compression::default());
    enc.write_all(text.as_bytes()).unwrap();
    enc.finish().unwrap()
}

#[test]
fn test_parse_plain_skips_blank_lines() {
    let values = parse_plain(Cursor::new("1.5\n\n-2\n  3e1  \n")).unwrap();
    assert_eq!(values, vec![1.5, -2.0, 30.0]);
}

#[test]
fn test_parse_plain_reports_line() {
    let err = parse_plain(Cursor::new("1\n2\nore\n")).unwrap_err();
    assert!(matches!(err, UltpitError::InputData(_)));
    assert!(err.to_string().contains("line 3"));
}

#[test]
fn test_parse_geoeas_column() {
    let text = "deposit\n3\nx\nebv\ngrade\n1 10.0 0.5\n2 -4.0 0.1\n\n3 0 0\n";
    assert_eq!(parse_geoeas(Cursor::new(text), 2).unwrap(), vec![10.0, -4.0, 0.0]);
    assert_eq!(parse_geoeas(Cursor::new(text), 1).unwrap(), vec![1.0, 2.0, 3.0]);
}

#[test]
fn test_parse_geoeas_column_out_of_range() {
    let text = "deposit\n1\nebv\n4\n";
    let err = parse_geoeas(Cursor::new(text), 2).unwrap_err();
    assert!(err.to_string().contains("outside the 1 GEOEAS columns"));
}

#[test]
fn test_parse_geoeas_short_header() {
    let err = parse_geoeas(Cursor::new("deposit\n2\nebv\n"), 1).unwrap_err();
    assert!(err.to_string().contains("column names"));

    let err = parse_geoeas(Cursor::new("deposit\ntwo\n"), 1).unwrap_err();
    assert!(err.to_string().contains("invalid column count"));
}

#[test]
fn test_parse_geoeas_short_row() {
    let text = "deposit\n2\nx\nebv\n1 2\n3\n";
    let err = parse_geoeas(Cursor::new(text), 2).unwrap_err();
    assert!(err.to_string().contains("line 6"));
}

#[test]
fn test_read_values_gzip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("values.txt.gz");
    fs::write(&path, gzip("1\n2\n3\n4\n5\n6\n")).unwrap();

    let values = read_values(&path, &InputConfig::default(), 3).unwrap();
    assert_eq!(values.realization_count(), 2);
    assert_eq!(values.realization(1), &[4.0, 5.0, 6.0]);
}

#[test]
fn test_read_values_partial_realization() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("values.txt");
    fs::write(&path, "1\n2\n3\n4\n").unwrap();

    let err = read_values(&path, &InputConfig::default(), 3).unwrap_err();
    assert!(matches!(err, CliError::Ultpit(UltpitError::InputData(_))));
}

#[test]
fn test_read_values_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_values(&dir.path().join("nope.txt"), &InputConfig::default(), 3).unwrap_err();
    assert!(matches!(err, CliError::Read { .. }));
}

#[test]
fn test_write_rows_in_realization_order() {
    let mut out = Vec::new();
    write_rows(&mut out, &pit(vec![vec![true, false], vec![false, true]])).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "1\n0\n0\n1\n");
}

#[test]
fn test_write_plain_file_has_no_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pit.txt");
    write_selections(Some(&path), &pit(vec![vec![true, false, true]])).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "1\n0\n1\n");
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_write_gzip_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pit.gz");
    write_selections(Some(&path), &pit(vec![vec![false, true]])).unwrap();

    let mut text = String::new();
    GzDecoder::new(fs::File::open(&path).unwrap())
        .read_to_string(&mut text)
        .unwrap();
    assert_eq!(text, "0\n1\n");
}

#[test]
fn test_write_replaces_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pit.txt");
    fs::write(&path, "stale\n").unwrap();

    write_selections(Some(&path), &pit(vec![vec![true]])).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "1\n");
}

#[test]
fn test_write_into_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("pit.txt");
    let err = write_selections(Some(&path), &pit(vec![vec![true]])).unwrap_err();

    assert!(matches!(err, CliError::Write { .. }));
    assert!(!path.exists());
}
