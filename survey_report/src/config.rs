// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

use chrono::NaiveDateTime;

use crate::report::ChartKind;

/// The category of one survey response row.
///
/// Unknown tags are carried through as [ResponseKind::Other] so that a sheet
/// with extra response types still loads; no defined report renders them.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum ResponseKind {
    /// A 1-5 rating of an image on a named metric.
    Rating,
    /// A forced choice between two images or "Neither".
    Comparison,
    /// A fixed-choice survey question not tied to one image.
    General,
    /// Free-text feedback.
    Feedback,
    /// Any tag not listed above.
    Other(String),
}

impl ResponseKind {
    pub fn parse(tag: &str) -> ResponseKind {
        match tag {
            "rating" => ResponseKind::Rating,
            "ab" => ResponseKind::Comparison,
            "general" => ResponseKind::General,
            "feedback" => ResponseKind::Feedback,
            other => ResponseKind::Other(other.to_string()),
        }
    }

    /// The raw tag as it appears in the sheet.
    pub fn tag(&self) -> &str {
        match self {
            ResponseKind::Rating => "rating",
            ResponseKind::Comparison => "ab",
            ResponseKind::General => "general",
            ResponseKind::Feedback => "feedback",
            ResponseKind::Other(s) => s.as_str(),
        }
    }
}

/// A rating dimension code, as stored in the `metric` column.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum MetricCode {
    Act,
    Mot,
    Trust,
    Other(String),
}

impl MetricCode {
    pub fn parse(code: &str) -> MetricCode {
        match code {
            "act" => MetricCode::Act,
            "mot" => MetricCode::Mot,
            "trust" => MetricCode::Trust,
            other => MetricCode::Other(other.to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            MetricCode::Act => "act",
            MetricCode::Mot => "mot",
            MetricCode::Trust => "trust",
            MetricCode::Other(s) => s.as_str(),
        }
    }
}

/// One normalized survey response row.
///
/// Records are immutable once built; a snapshot is replaced wholesale on
/// refresh. Grouping keys (`session_id`, `subject`, `metric`) are opaque
/// strings and are only interpreted through display-label lookup.
#[derive(PartialEq, Debug, Clone)]
pub struct ResponseRecord {
    /// Absent when the raw cell was missing or did not parse as a date.
    pub timestamp: Option<NaiveDateTime>,
    /// Participant identifier. One participant submits many records.
    pub session_id: String,
    pub kind: ResponseKind,
    /// Meaning depends on `kind`: image id for ratings, comparison key for
    /// comparisons, question key for general questions, unused for feedback.
    pub subject: String,
    /// Present only for rating rows.
    pub metric: Option<MetricCode>,
    /// Raw response payload.
    pub value: String,
    /// Numeric coercion of `value`. Defined iff `value` parses as a number.
    pub value_num: Option<f64>,
}

// ******** Output data structures *********

/// Headline numbers for the dashboard KPI strip.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SurveyKpis {
    pub total_rows: u64,
    pub unique_participants: u64,
    pub rated_subjects: u64,
}

/// Errors that prevent a report from being assembled.
///
/// Empty data is never an error: every section degrades to a placeholder.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ReportErrors {
    /// The options specify no rating buckets at all.
    EmptyBuckets,
    /// A row was submitted to the builder without a response type tag.
    MissingKindTag,
}

impl Error for ReportErrors {}

impl Display for ReportErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportErrors::EmptyBuckets => write!(f, "no rating buckets configured"),
            ReportErrors::MissingKindTag => write!(f, "response row without a type tag"),
        }
    }
}

// ********* Configuration **********

/// Display-label lookups for raw codes.
///
/// A code with no entry degrades to the raw code itself, never to an error.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct LabelTable {
    pub metric_labels: Vec<(String, String)>,
    pub comparison_labels: Vec<(String, String)>,
}

impl Default for LabelTable {
    fn default() -> LabelTable {
        LabelTable {
            metric_labels: vec![
                ("act".to_string(), "Liked / Likely to Act".to_string()),
                ("mot".to_string(), "Motivating".to_string()),
                ("trust".to_string(), "Trustworthy".to_string()),
            ],
            comparison_labels: vec![
                ("ab1".to_string(), "img1 vs img4".to_string()),
                ("ab2".to_string(), "img11 vs img14".to_string()),
                ("ab3".to_string(), "img16 vs img7".to_string()),
                ("ab4".to_string(), "img21 vs img9".to_string()),
            ],
        }
    }
}

impl LabelTable {
    pub fn metric_label(&self, metric: &MetricCode) -> String {
        let code = metric.code();
        self.metric_labels
            .iter()
            .find(|(c, _)| c == code)
            .map(|(_, label)| label.clone())
            .unwrap_or_else(|| code.to_string())
    }

    pub fn comparison_label(&self, key: &str) -> String {
        self.comparison_labels
            .iter()
            .find(|(c, _)| c == key)
            .map(|(_, label)| label.clone())
            .unwrap_or_else(|| key.to_string())
    }
}

/// One general-question panel: which question key to count and how to chart it.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct GeneralQuestionSpec {
    pub key: String,
    pub title: String,
    pub chart: ChartKind,
}

/// Everything that parameterizes report assembly.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ReportOptions {
    pub rating_buckets: Vec<i64>,
    pub comparison_choices: Vec<String>,
    pub labels: LabelTable,
    pub general_questions: Vec<GeneralQuestionSpec>,
}

impl Default for ReportOptions {
    /// The reference dashboard: 1-5 ratings, A/B/Neither comparisons and the
    /// three general-question panels.
    fn default() -> ReportOptions {
        ReportOptions {
            rating_buckets: vec![1, 2, 3, 4, 5],
            comparison_choices: vec![
                "A".to_string(),
                "B".to_string(),
                "Neither".to_string(),
            ],
            labels: LabelTable::default(),
            general_questions: vec![
                GeneralQuestionSpec {
                    key: "motivatesMost".to_string(),
                    title: "What motivates people most?".to_string(),
                    chart: ChartKind::Pie,
                },
                GeneralQuestionSpec {
                    key: "ignore".to_string(),
                    title: "Which messages do people tend to ignore?".to_string(),
                    chart: ChartKind::Bar,
                },
                GeneralQuestionSpec {
                    key: "frequency".to_string(),
                    title: "Preferred number of messages per week".to_string(),
                    chart: ChartKind::Pie,
                },
            ],
        }
    }
}
