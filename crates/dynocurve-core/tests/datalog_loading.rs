//! Tests for loading speed/RPM logs from disk

use dynocurve_core::datalog::{load, load_default, ColumnMap, Delimiter, RawRecord};
use dynocurve_core::error::DynoError;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_log(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("Failed to write log fixture");
    path
}

fn short_columns() -> ColumnMap {
    ColumnMap::new("time", "speed", "rpm")
}

#[test]
fn test_load_scanner_export() {
    let dir = TempDir::new().unwrap();
    let content = "TIME;Скорость автомобиля;Число оборотов коленвала;Температура ОЖ\n\
                   0.0;40;2000;88\n\
                   0.5;45;2250;88\n\
                   1.0;50;2500;89\n";
    let path = write_log(&dir, "scanner.csv", content);

    let table = load_default(&path).unwrap();

    assert_eq!(table.delimiter(), Delimiter::Semicolon);
    assert_eq!(table.len(), 3);
    assert_eq!(
        table.records(),
        &[
            RawRecord::new(0.0, 40.0, 2000.0),
            RawRecord::new(0.5, 45.0, 2250.0),
            RawRecord::new(1.0, 50.0, 2500.0),
        ]
    );
}

#[test]
fn test_missing_speed_column_names_found_columns() {
    let dir = TempDir::new().unwrap();
    let path = write_log(&dir, "no_speed.csv", "time,rpm\n0,1000\n1,1500\n");

    let err = load(&path, &short_columns()).unwrap_err();
    match err {
        DynoError::Schema { missing, found } => {
            assert_eq!(found, vec!["time".to_string(), "rpm".to_string()]);
            assert_eq!(missing, vec!["speed".to_string()]);
        }
        other => panic!("Expected schema error, got {:?}", other),
    }
}

#[test]
fn test_schema_error_message_lists_headers() {
    let dir = TempDir::new().unwrap();
    let path = write_log(&dir, "other.csv", "a,b\n1,2\n");

    let message = load(&path, &short_columns()).unwrap_err().to_string();
    assert!(message.contains("\"a\""), "message: {}", message);
    assert!(message.contains("\"rpm\""), "message: {}", message);
}

#[test]
fn test_non_numeric_cells_become_missing() {
    let dir = TempDir::new().unwrap();
    let path = write_log(
        &dir,
        "dirty.csv",
        "time,speed,rpm\n0,10,1000\n0.1,--,1100\n0.2,12,\n0.3,13,1300\n",
    );

    let table = load(&path, &short_columns()).unwrap();
    assert_eq!(table.len(), 4, "rows must not be dropped");
    assert_eq!(table.incomplete_rows(), 2);
    assert_eq!(table.records()[1].speed_kmh, None);
    assert_eq!(table.records()[2].rpm, None);
    assert_eq!(table.records()[3], RawRecord::new(0.3, 13.0, 1300.0));
}

#[test]
fn test_tab_separated_by_extension() {
    let dir = TempDir::new().unwrap();
    let path = write_log(&dir, "pull.tsv", "time\tspeed\trpm\n0\t20\t1500\n");

    let table = load(&path, &short_columns()).unwrap();
    assert_eq!(table.delimiter(), Delimiter::Tab);
    assert_eq!(table.records()[0], RawRecord::new(0.0, 20.0, 1500.0));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let result = load(dir.path().join("absent.csv"), &short_columns());
    assert!(matches!(result, Err(DynoError::Io(_))));
}

#[test]
fn test_non_utf8_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("latin1.csv");
    fs::write(&path, b"time,speed,rpm\n0,\xff\xfe,1000\n").unwrap();

    assert!(matches!(load(&path, &short_columns()), Err(DynoError::Io(_))));
}

#[test]
fn test_ragged_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let path = write_log(&dir, "ragged.csv", "time,speed,rpm\n0,10,1000\n1,11,1100,extra\n");

    assert!(matches!(load(&path, &short_columns()), Err(DynoError::Io(_))));
}
