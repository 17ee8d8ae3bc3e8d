//! Decodes an uploaded roster into a [`Roster`].
//!
//! `.csv` files go through the delimited-text reader; anything else is opened
//! as a spreadsheet and only its first worksheet is read.

use crate::error::ReadError;
use crate::ingest::{dedup_headers, RawRow, Roster};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::{Duration, NaiveDate};
use log::{debug, info};
use std::io::Cursor;

/// Reads `bytes` according to the extension of `file_name`.
pub fn read_roster(bytes: &[u8], file_name: &str) -> Result<Roster, ReadError> {
    let roster = if file_name.to_lowercase().ends_with(".csv") {
        read_delimited(bytes)?
    } else {
        read_spreadsheet(bytes)?
    };
    info!(
        "Read {} row(s) with {} column(s) from {}",
        roster.rows.len(),
        roster.headers.len(),
        file_name
    );
    Ok(roster)
}

/// Comma-separated text with quoted fields, `""` escapes and any of `\r\n`,
/// `\r` or `\n` as line ending. Fields are trimmed and blank lines skipped.
pub fn read_delimited(bytes: &[u8]) -> Result<Roster, ReadError> {
    let text = String::from_utf8_lossy(bytes);
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let positional: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if positional.len() == 1 && positional[0].is_empty() {
        return Ok(Roster::default());
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        // A whitespace-only line decodes as a single empty field.
        if record.len() == 1 && record[0].is_empty() {
            continue;
        }
        let values: Vec<&str> = record.iter().collect();
        rows.push(RawRow::from_positional(&positional, &values));
    }

    Ok(Roster {
        headers: dedup_headers(positional),
        rows,
    })
}

/// First worksheet of any workbook format calamine understands. The first
/// non-empty row is the header row; empty cells become empty strings.
pub fn read_spreadsheet(bytes: &[u8]) -> Result<Roster, ReadError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let range = workbook.worksheet_range_at(0).ok_or(ReadError::NoSheets)??;

    let mut rows_iter = range.rows();
    let positional: Vec<String> = match rows_iter.next() {
        Some(header_row) => header_row.iter().map(|c| cell_to_string(c).trim().to_string()).collect(),
        None => return Ok(Roster::default()),
    };

    let mut rows = Vec::new();
    for cells in rows_iter {
        let values: Vec<String> = cells.iter().map(cell_to_string).collect();
        let row = RawRow::from_positional(&positional, &values);
        if row.is_blank() {
            continue;
        }
        rows.push(row);
    }
    debug!("Spreadsheet header row: {:?}", positional);

    Ok(Roster {
        headers: dedup_headers(positional),
        rows,
    })
}

/// String form of a cell. Whole floats drop their `.0`; date cells render as
/// ISO dates so the certificate date formatter can read them back.
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => excel_serial_to_iso(dt.as_f64()),
        other => other.to_string(),
    }
}

fn excel_serial_to_iso(serial: f64) -> String {
    let Some(epoch) = NaiveDate::from_ymd_opt(1899, 12, 30) else {
        return serial.to_string();
    };
    let days = serial.trunc() as i64;
    let seconds = ((serial - serial.trunc()) * 86_400.0).round() as i64;
    match epoch
        .and_hms_opt(0, 0, 0)
        .and_then(|midnight| midnight.checked_add_signed(Duration::days(days)))
        .and_then(|day| day.checked_add_signed(Duration::seconds(seconds)))
    {
        Some(moment) if seconds == 0 => moment.format("%Y-%m-%d").to_string(),
        Some(moment) => moment.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => serial.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_fields_and_escaped_quotes() {
        let csv = "Participant Name,National ID,County\n\"Doe, Jane\",\" 123 \",\"Nai\"\"robi\"\n";
        let roster = read_roster(csv.as_bytes(), "people.CSV").unwrap();
        assert_eq!(roster.headers, vec!["Participant Name", "National ID", "County"]);
        assert_eq!(roster.rows.len(), 1);
        assert_eq!(roster.rows[0].get("Participant Name"), "Doe, Jane");
        assert_eq!(roster.rows[0].get("National ID"), "123");
        assert_eq!(roster.rows[0].get("County"), "Nai\"robi");
    }

    #[test]
    fn mixed_line_endings_and_blank_lines() {
        let csv = "name,id\r\nA,1\rB,2\n\n   \nC,3\r\n";
        let roster = read_delimited(csv.as_bytes()).unwrap();
        let names: Vec<&str> = roster.rows.iter().map(|r| r.get("name")).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn short_rows_are_padded_and_long_rows_truncated() {
        let csv = "a,b,c\n1\n1,2,3,4\n";
        let roster = read_delimited(csv.as_bytes()).unwrap();
        assert_eq!(roster.rows[0].get("b"), "");
        assert_eq!(roster.rows[0].get("c"), "");
        assert_eq!(roster.rows[1].columns().count(), 3);
        assert_eq!(roster.rows[1].get("c"), "3");
    }

    #[test]
    fn byte_order_mark_is_not_part_of_first_header() {
        let csv = "\u{feff}Name,ID\nA,1\n";
        let roster = read_delimited(csv.as_bytes()).unwrap();
        assert_eq!(roster.headers[0], "Name");
    }

    #[test]
    fn empty_input_yields_empty_roster() {
        let roster = read_delimited(b"").unwrap();
        assert!(roster.headers.is_empty());
        assert!(roster.rows.is_empty());
    }

    #[test]
    fn undecodable_spreadsheet_is_a_read_error() {
        let err = read_roster(b"definitely not a workbook", "roster.xlsx").unwrap_err();
        assert!(matches!(err, ReadError::Spreadsheet(_)));
    }

    #[test]
    fn cells_stringify_without_placeholders() {
        assert_eq!(cell_to_string(&Data::Empty), "");
        assert_eq!(cell_to_string(&Data::Float(12345678.0)), "12345678");
        assert_eq!(cell_to_string(&Data::Float(1.5)), "1.5");
        assert_eq!(cell_to_string(&Data::Int(42)), "42");
        assert_eq!(cell_to_string(&Data::Bool(true)), "true");
    }

    #[test]
    fn excel_serials_become_iso_dates() {
        assert_eq!(excel_serial_to_iso(46052.0), "2026-01-30");
        assert_eq!(excel_serial_to_iso(46052.5), "2026-01-30 12:00:00");
    }
}
