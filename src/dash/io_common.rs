// Primitives shared by the sheet readers.

use chrono::{NaiveDate, NaiveDateTime};
use snafu::OptionExt;

use crate::dash::{ColumnMap, DashResult, MissingColumnSnafu};

/// Column names are matched after trimming and lowercasing, so
/// `" Session_ID "` in the sheet header still maps to `session_id`.
pub fn normalize_header(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Maps normalized header names onto record fields.
///
/// Only `session_id` and `type` are required; everything else degrades to an
/// empty cell when the column is missing. Extra columns are ignored.
pub fn map_columns(headers: &[String]) -> DashResult<ColumnMap> {
    let find = |name: &str| headers.iter().position(|h| h == name);
    Ok(ColumnMap {
        timestamp: find("timestamp"),
        session_id: find("session_id").context(MissingColumnSnafu {
            column: "session_id".to_string(),
        })?,
        kind: find("type").context(MissingColumnSnafu {
            column: "type".to_string(),
        })?,
        subject: find("image_name"),
        metric: find("metric"),
        value: find("value"),
    })
}

/// Converts an Excel serial date (days since 1899-12-30, fraction = time of
/// day) to a date-time. Out-of-range serials come back as None.
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    let days = serial.floor() as i64;
    let secs = ((serial - serial.floor()) * 86_400.0).round() as i64;
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    let date = base.checked_add_signed(chrono::Duration::days(days))?;
    date.and_hms_opt(0, 0, 0)?
        .checked_add_signed(chrono::Duration::seconds(secs))
}
