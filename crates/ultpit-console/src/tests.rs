//! Tests for console event formatting.

use super::*;

fn visitor(event: &str) -> EventVisitor {
    EventVisitor {
        event: Some(event.to_string()),
        ..EventVisitor::default()
    }
}

#[test]
fn test_realization_line() {
    let mut v = visitor("realization_end");
    v.realization = Some(3);
    v.engine = Some("lerchs_grossmann".to_string());
    v.blocks = Some(12_345);
    v.value = Some(42.5);
    v.duration_ms = Some(1500);

    let line = format_event(&v, Level::INFO);
    assert!(line.contains("Realization"));
    assert!(line.contains("12,345"));
    assert!(line.contains("42.50"));
    assert!(line.contains("1.50s"));
    assert!(line.contains("lerchs_grossmann"));
}

#[test]
fn test_compaction_line() {
    let mut v = visitor("compaction_start");
    v.original = Some(46_800);
    v.compacted = Some(9_000);
    v.reduction_pct = Some(80.769);

    let line = format_event(&v, Level::INFO);
    assert!(line.contains("46,800"));
    assert!(line.contains("9,000"));
    assert!(line.contains("80.8%"));
}

#[test]
fn test_failure_line_shows_status() {
    let mut v = visitor("realization_failed");
    v.status = Some(6);
    v.error = Some("timed out".to_string());

    let line = format_event(&v, Level::ERROR);
    assert!(line.contains("status 6"));
    assert!(line.contains("timed out"));
}

#[test]
fn test_values_read_line() {
    let mut v = visitor("values_read");
    v.values = Some(93_600);
    v.path = Some("marvin.txt.gz".to_string());

    let line = format_event(&v, Level::INFO);
    assert!(line.contains("93,600 values"));
    assert!(line.contains("marvin.txt.gz"));
}

#[test]
fn test_engine_detail_only_below_info() {
    let mut v = visitor("tree_solved");
    v.visits = Some(1_000);
    assert!(format_event(&v, Level::INFO).is_empty());
    assert!(format_event(&v, Level::DEBUG).contains("1,000 visits"));
}

#[test]
fn test_unknown_events_are_silent() {
    assert!(format_event(&visitor("merge"), Level::TRACE).is_empty());
    assert!(format_event(&EventVisitor::default(), Level::INFO).is_empty());
}

#[test]
fn test_duration_format() {
    assert_eq!(format_duration_ms(999), "999ms");
    assert_eq!(format_duration_ms(2_500), "2.50s");
    assert_eq!(format_duration_ms(125_000), "2m 5s");
}

#[test]
fn test_init_file_target_is_idempotent() {
    let path = std::env::temp_dir().join(format!("ultpit-console-{}.log", std::process::id()));
    assert!(init(LogTarget::File(path.clone())).is_ok());
    assert!(init(LogTarget::Console).is_ok());
    let _ = std::fs::remove_file(path);
}
