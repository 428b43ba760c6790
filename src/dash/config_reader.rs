use crate::dash::*;

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

use survey_report::{
    ChartKind, GeneralQuestionSpec, LabelTable, ReportOptions,
};

/// The published CSV export of the reference collection sheet.
pub const DEFAULT_SHEET_URL: &str = "https://docs.google.com/spreadsheets/d/13UyKNgOm4h8-kdZg0uhKa6YlFDCceHfEmY5qzN1x2Qc/export?format=csv&gid=0";

pub const DEFAULT_CACHE_SECONDS: u64 = 60;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "dashboardTitle")]
    pub dashboard_title: String,
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SheetSourceConfig {
    /// One of `sheetUrl`, `csv`, `xlsx`.
    pub provider: String,
    pub url: Option<String>,
    #[serde(rename = "filePath")]
    pub file_path: Option<String>,
    #[serde(rename = "cacheSeconds")]
    pub cache_seconds: Option<u64>,
    #[serde(rename = "timeoutSeconds")]
    pub timeout_seconds: Option<u64>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct LabelEntry {
    pub code: String,
    pub label: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct GeneralQuestion {
    pub key: String,
    pub title: String,
    /// `pie` or `bar`.
    pub chart: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct DashConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    #[serde(rename = "sheetSource")]
    pub sheet_source: SheetSourceConfig,
    #[serde(rename = "metricLabels")]
    pub metric_labels: Option<Vec<LabelEntry>>,
    #[serde(rename = "comparisonLabels")]
    pub comparison_labels: Option<Vec<LabelEntry>>,
    #[serde(rename = "generalQuestions")]
    pub general_questions: Option<Vec<GeneralQuestion>>,
}

impl DashConfig {
    /// The configuration of the reference dashboard, used when no config
    /// file is given. Label tables and question panels fall back to the
    /// library defaults.
    pub fn reference() -> DashConfig {
        DashConfig {
            output_settings: OutputSettings {
                dashboard_title: "Message Evaluation Survey Dashboard".to_string(),
                output_directory: None,
            },
            sheet_source: SheetSourceConfig {
                provider: "sheetUrl".to_string(),
                url: Some(DEFAULT_SHEET_URL.to_string()),
                file_path: None,
                cache_seconds: None,
                timeout_seconds: None,
            },
            metric_labels: None,
            comparison_labels: None,
            general_questions: None,
        }
    }
}

pub fn read_config(path: String) -> DashResult<DashConfig> {
    let contents = fs::read_to_string(path.clone()).context(OpeningFileSnafu { path })?;
    let config: DashConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(config)
}

pub fn read_summary(path: String) -> DashResult<JSValue> {
    let contents = fs::read_to_string(path.clone()).context(OpeningFileSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

fn label_pairs(entries: &Option<Vec<LabelEntry>>, defaults: Vec<(String, String)>) -> Vec<(String, String)> {
    match entries {
        Some(entries) => entries
            .iter()
            .map(|e| (e.code.clone(), e.label.clone()))
            .collect(),
        None => defaults,
    }
}

fn chart_kind(tag: &str) -> ChartKind {
    match tag {
        "pie" => ChartKind::Pie,
        "bar" => ChartKind::Bar,
        "table" => ChartKind::Table,
        other => {
            warn!("chart_kind: unknown chart kind {:?}, falling back to bar", other);
            ChartKind::Bar
        }
    }
}

/// Turns the configuration into report options, with reference defaults for
/// everything left unspecified.
pub fn report_options(config: &DashConfig) -> ReportOptions {
    let defaults = ReportOptions::default();
    let labels = LabelTable {
        metric_labels: label_pairs(&config.metric_labels, defaults.labels.metric_labels.clone()),
        comparison_labels: label_pairs(
            &config.comparison_labels,
            defaults.labels.comparison_labels.clone(),
        ),
    };
    let general_questions = match &config.general_questions {
        Some(questions) => questions
            .iter()
            .map(|q| GeneralQuestionSpec {
                key: q.key.clone(),
                title: q.title.clone(),
                chart: chart_kind(q.chart.as_str()),
            })
            .collect(),
        None => defaults.general_questions.clone(),
    };
    ReportOptions {
        rating_buckets: defaults.rating_buckets,
        comparison_choices: defaults.comparison_choices,
        labels,
        general_questions,
    }
}
