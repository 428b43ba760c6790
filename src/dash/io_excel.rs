// Reader for local XLSX exports of the sheet.

use calamine::{open_workbook, Reader, Xlsx};
use log::debug;
use snafu::prelude::*;

use crate::dash::{
    io_common::{excel_serial_to_datetime, map_columns, normalize_header},
    *,
};

/// Reads the first worksheet of a downloaded spreadsheet export. The layout
/// contract is the same as the CSV export: a header row followed by one row
/// per response.
pub fn read_xlsx_file(path: String) -> DashResult<Vec<RawRow>> {
    let mut workbook: Xlsx<_> =
        open_workbook(path.clone()).context(OpeningExcelSnafu { path: path.clone() })?;
    let wrange = workbook
        .worksheet_range_at(0)
        .context(EmptyExcelSnafu {})?
        .context(OpeningExcelSnafu { path })?;

    let mut iter = wrange.rows();
    let header = iter.next().context(EmptyExcelSnafu {})?;
    let headers: Vec<String> = header
        .iter()
        .map(|c| normalize_header(&cell_to_string(c)))
        .collect();
    debug!("read_xlsx_file: headers: {:?}", headers);
    let cmap = map_columns(&headers)?;

    let mut res: Vec<RawRow> = Vec::new();
    for (idx, row) in iter.enumerate() {
        debug!("read_xlsx_file: idx: {:?} row: {:?}", idx, row);
        let cell = |i: Option<usize>| {
            i.and_then(|i| row.get(i))
                .map(cell_to_string)
                .unwrap_or_default()
        };
        res.push(RawRow {
            timestamp: cell(cmap.timestamp),
            session_id: cell(Some(cmap.session_id)),
            kind: cell(Some(cmap.kind)),
            subject: cell(cmap.subject),
            metric: cell(cmap.metric),
            value: cell(cmap.value),
        });
    }
    Ok(res)
}

/// Renders a cell the way the CSV export would have.
/// Dates come out in a format the timestamp coercion understands.
fn cell_to_string(cell: &calamine::DataType) -> String {
    match cell {
        calamine::DataType::String(s) => s.clone(),
        calamine::DataType::Int(i) => i.to_string(),
        calamine::DataType::Float(f) if f.fract() == 0.0 => (*f as i64).to_string(),
        calamine::DataType::Float(f) => f.to_string(),
        calamine::DataType::Bool(b) => b.to_string(),
        calamine::DataType::DateTime(serial) => excel_serial_to_datetime(*serial)
            .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default(),
        _ => String::new(),
    }
}
