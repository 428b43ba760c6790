pub use crate::config::*;
use crate::coerce::{parse_numeric, parse_timestamp};

/// A builder for assembling record snapshots from raw cell values.
///
/// It applies the same soft coercion as the dataset loader: a timestamp or
/// value that does not parse becomes absent, never an error. The only row
/// that is rejected is one without a response type tag.
///
/// ```
/// pub use survey_report::builder::SnapshotBuilder;
/// # use survey_report::ReportErrors;
///
/// let mut builder = SnapshotBuilder::new();
/// builder.add_row("3/14/2025 09:26:53", "s1", "rating", "img1", Some("act"), "4")?;
/// builder.add_row("", "s1", "feedback", "", None, "more cat pictures")?;
///
/// let records = builder.build();
/// assert_eq!(records.len(), 2);
/// assert_eq!(records[0].value_num, Some(4.0));
///
/// # Ok::<(), ReportErrors>(())
/// ```
pub struct SnapshotBuilder {
    pub(crate) _records: Vec<ResponseRecord>,
}

impl Default for SnapshotBuilder {
    fn default() -> SnapshotBuilder {
        SnapshotBuilder::new()
    }
}

impl SnapshotBuilder {
    pub fn new() -> SnapshotBuilder {
        SnapshotBuilder {
            _records: Vec::new(),
        }
    }

    /// Adds one raw row. Empty cells stand for missing values.
    pub fn add_row(
        &mut self,
        timestamp: &str,
        session_id: &str,
        kind: &str,
        subject: &str,
        metric: Option<&str>,
        value: &str,
    ) -> Result<(), ReportErrors> {
        if kind.trim().is_empty() {
            return Err(ReportErrors::MissingKindTag);
        }
        let record = ResponseRecord {
            timestamp: parse_timestamp(timestamp).ok(),
            session_id: session_id.to_string(),
            kind: ResponseKind::parse(kind.trim()),
            subject: subject.to_string(),
            metric: match metric {
                Some(m) if !m.trim().is_empty() => Some(MetricCode::parse(m.trim())),
                _ => None,
            },
            value: value.to_string(),
            value_num: parse_numeric(value).ok(),
        };
        self.add_record(record)
    }

    pub fn add_record(&mut self, record: ResponseRecord) -> Result<(), ReportErrors> {
        self._records.push(record);
        Ok(())
    }

    pub fn build(self) -> Vec<ResponseRecord> {
        self._records
    }
}
