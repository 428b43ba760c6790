//! Best-effort coercion of raw sheet cells.
//!
//! Both helpers return a `Result` so the failure stays observable; the
//! loading layer converts a failure into an absent optional exactly once,
//! never into a dropped record.

use chrono::NaiveDateTime;

/// Date formats seen in spreadsheet exports, tried in order.
const TIMESTAMP_FORMATS: [&str; 4] = [
    "%m/%d/%Y %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Parses a raw timestamp cell against the known spreadsheet formats.
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    let trimmed = s.trim();
    let mut last_err = None;
    for fmt in TIMESTAMP_FORMATS {
        match NaiveDateTime::parse_from_str(trimmed, fmt) {
            Ok(ts) => return Ok(ts),
            Err(e) => last_err = Some(e),
        }
    }
    Err(last_err.unwrap())
}

/// Parses a raw value cell as a number.
pub fn parse_numeric(s: &str) -> Result<f64, std::num::ParseFloatError> {
    s.trim().parse::<f64>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    #[test]
    fn timestamp_google_forms_format() {
        let ts = parse_timestamp("3/14/2025 09:26:53").unwrap();
        assert_eq!(ts.date(), NaiveDate::from_ymd_opt(2025, 3, 14).unwrap());
        assert_eq!(ts.hour(), 9);
    }

    #[test]
    fn timestamp_iso_format() {
        assert!(parse_timestamp("2025-03-14 09:26:53").is_ok());
        assert!(parse_timestamp(" 2025-03-14T09:26:53 ").is_ok());
    }

    #[test]
    fn timestamp_garbage_is_an_error() {
        assert!(parse_timestamp("yesterday").is_err());
        assert!(parse_timestamp("").is_err());
    }

    #[test]
    fn numeric_coercion() {
        assert_eq!(parse_numeric("3").unwrap(), 3.0);
        assert_eq!(parse_numeric(" 4.5 ").unwrap(), 4.5);
        assert!(parse_numeric("bad").is_err());
        assert!(parse_numeric("").is_err());
    }
}
