//! Log reader
//!
//! Reads a delimited log, checks the required channels and coerces cells.

use std::fs;
use std::path::Path;

use super::{ColumnMap, Delimiter, RawRecord, RawTable};
use crate::error::DynoError;

/// Load a log file using explicit column names
///
/// The file is read in one shot; nothing stays open after return.
pub fn load<P: AsRef<Path>>(path: P, columns: &ColumnMap) -> Result<RawTable, DynoError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .map_err(|e| DynoError::Io(format!("cannot read {}: {e}", path.display())))?;

    let table = parse(&content, Delimiter::from_extension(path), columns)?;
    tracing::debug!(
        "Loaded {} rows from {} ({:?}, {} incomplete)",
        table.len(),
        path.display(),
        table.delimiter(),
        table.incomplete_rows()
    );
    Ok(table)
}

/// Load a log file using the scanner's default column names
pub fn load_default<P: AsRef<Path>>(path: P) -> Result<RawTable, DynoError> {
    load(path, &ColumnMap::default())
}

/// Parse log text
///
/// `delimiter` of `None` sniffs the header line.
pub fn parse(
    content: &str,
    delimiter: Option<Delimiter>,
    columns: &ColumnMap,
) -> Result<RawTable, DynoError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let header_line = content
        .lines()
        .next()
        .filter(|line| !line.trim().is_empty())
        .ok_or_else(|| DynoError::Io("log file is empty".to_string()))?;
    let delimiter = delimiter.unwrap_or_else(|| Delimiter::sniff(header_line));

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter.as_byte())
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let index_of = |name: &str| headers.iter().position(|h| h == name);

    let (time_idx, speed_idx, rpm_idx) = match (
        index_of(&columns.time),
        index_of(&columns.speed),
        index_of(&columns.rpm),
    ) {
        (Some(t), Some(s), Some(r)) => (t, s, r),
        (t, s, r) => {
            let missing = [(t, &columns.time), (s, &columns.speed), (r, &columns.rpm)]
                .into_iter()
                .filter(|(idx, _)| idx.is_none())
                .map(|(_, name)| name.clone())
                .collect();
            return Err(DynoError::Schema {
                missing,
                found: headers,
            });
        }
    };

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result?;
        records.push(RawRecord {
            time: coerce(row.get(time_idx)),
            speed_kmh: coerce(row.get(speed_idx)),
            rpm: coerce(row.get(rpm_idx)),
        });
    }

    Ok(RawTable::with_source(records, headers, delimiter))
}

/// Numeric coercion: anything that is not a finite number becomes missing
fn coerce(cell: Option<&str>) -> Option<f64> {
    cell.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}
