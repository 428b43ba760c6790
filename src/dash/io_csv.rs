// Primitives for reading CSV payloads.

use std::fs;

use log::debug;
use snafu::prelude::*;

use crate::dash::{
    io_common::{map_columns, normalize_header},
    *,
};

/// Reads a CSV payload (the sheet export body or a local file's contents)
/// into raw rows. The first line must be the header row.
pub fn read_csv_payload(payload: &str) -> DashResult<Vec<RawRow>> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(payload.as_bytes());
    let mut records = rdr.into_records();

    let header = match records.next() {
        Some(line_r) => line_r.context(CsvLineParseSnafu {})?,
        None => return EmptyPayloadSnafu {}.fail(),
    };
    let headers: Vec<String> = header.iter().map(normalize_header).collect();
    debug!("read_csv_payload: headers: {:?}", headers);
    let cmap = map_columns(&headers)?;

    let mut res: Vec<RawRow> = Vec::new();
    for (idx, line_r) in records.enumerate() {
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu {})?;
        debug!("read_csv_payload: lineno: {:?} row: {:?}", lineno, line);
        res.push(raw_row(&line, &cmap));
    }
    Ok(res)
}

pub fn read_csv_file(path: String) -> DashResult<Vec<RawRow>> {
    let payload = fs::read_to_string(path.clone()).context(OpeningFileSnafu { path })?;
    read_csv_payload(&payload)
}

fn cell(line: &csv::StringRecord, idx: Option<usize>) -> String {
    idx.and_then(|i| line.get(i)).unwrap_or("").to_string()
}

fn raw_row(line: &csv::StringRecord, cmap: &ColumnMap) -> RawRow {
    RawRow {
        timestamp: cell(line, cmap.timestamp),
        session_id: cell(line, Some(cmap.session_id)),
        kind: cell(line, Some(cmap.kind)),
        subject: cell(line, cmap.subject),
        metric: cell(line, cmap.metric),
        value: cell(line, cmap.value),
    }
}
