use log::{debug, info, warn};

use survey_report::*;

use snafu::{prelude::*, Snafu};

use std::fs;
use std::time::Duration;

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use survey_report::coerce;
use text_diff::print_diff;

use crate::args::Args;
use crate::dash::config_reader::*;
use crate::dash::fetch::{CachedLoader, CsvFileSource, HttpSheetSource, SheetSource, XlsxFileSource};

pub mod config_reader;
pub mod fetch;
pub mod io_common;
pub mod io_csv;
pub mod io_excel;

#[derive(Debug, Snafu)]
pub enum DashError {
    #[snafu(display("Error fetching sheet from {url}"))]
    FetchingSheet { source: reqwest::Error, url: String },
    #[snafu(display("Sheet fetch from {url} returned HTTP status {status}"))]
    SheetHttpStatus { status: u16, url: String },
    #[snafu(display("Error opening file {path}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error opening workbook {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display(""))]
    EmptyExcel {},
    #[snafu(display(""))]
    EmptyPayload {},
    #[snafu(display(""))]
    CsvLineParse { source: csv::Error },
    #[snafu(display("The sheet is missing the required column {column}"))]
    MissingColumn { column: String },
    #[snafu(display(""))]
    ParsingJson { source: serde_json::Error },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type DashResult<T> = Result<T, DashError>;

/// Positions of the record fields in the sheet, after header normalization.
/// Only the participant id and the response type are mandatory.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ColumnMap {
    pub timestamp: Option<usize>,
    pub session_id: usize,
    pub kind: usize,
    pub subject: Option<usize>,
    pub metric: Option<usize>,
    pub value: Option<usize>,
}

/// One sheet row, as parsed by the readers.
/// This is before any type coercion; empty strings stand for missing cells.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RawRow {
    pub timestamp: String,
    pub session_id: String,
    pub kind: String,
    pub subject: String,
    pub metric: String,
    pub value: String,
}

/// Turns raw rows into normalized records.
///
/// Timestamp and numeric coercion fail soft: the parse error becomes an
/// absent optional here and nowhere else. The one hard rule is that a row
/// without a response type is dropped, with a warning.
pub fn normalize_rows(rows: &[RawRow]) -> Vec<ResponseRecord> {
    let mut res: Vec<ResponseRecord> = Vec::new();
    for (idx, row) in rows.iter().enumerate() {
        let kind_tag = row.kind.trim();
        if kind_tag.is_empty() {
            warn!(
                "normalize_rows: row {:?} has no response type, skipping: {:?}",
                idx, row
            );
            continue;
        }
        let timestamp = match row.timestamp.trim() {
            "" => None,
            s => coerce::parse_timestamp(s).ok(),
        };
        let metric = match row.metric.trim() {
            "" => None,
            m => Some(MetricCode::parse(m)),
        };
        res.push(ResponseRecord {
            timestamp,
            session_id: row.session_id.trim().to_string(),
            kind: ResponseKind::parse(kind_tag),
            subject: row.subject.trim().to_string(),
            metric,
            value: row.value.clone(),
            value_num: coerce::parse_numeric(&row.value).ok(),
        });
    }
    res
}

fn open_source(source: &SheetSourceConfig) -> DashResult<Box<dyn SheetSource>> {
    let timeout = Duration::from_secs(source.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS));
    match source.provider.as_str() {
        "sheetUrl" => {
            let url = source
                .url
                .clone()
                .whatever_context("sheetUrl provider without a url")?;
            Ok(Box::new(HttpSheetSource::new(url, timeout)))
        }
        "csv" => {
            let path = source
                .file_path
                .clone()
                .whatever_context("csv provider without a filePath")?;
            Ok(Box::new(CsvFileSource { path }))
        }
        "xlsx" => {
            let path = source
                .file_path
                .clone()
                .whatever_context("xlsx provider without a filePath")?;
            Ok(Box::new(XlsxFileSource { path }))
        }
        x => whatever!("Provider not implemented {:?}", x),
    }
}

// **** Summary output ****

fn chart_data_to_json(data: &ChartData) -> JSValue {
    match data {
        ChartData::Series(points) => JSValue::Array(
            points
                .iter()
                .map(|(label, value)| json!({"label": label, "value": value}))
                .collect(),
        ),
        ChartData::Rows { columns, rows } => json!({"columns": columns, "rows": rows}),
    }
}

fn descriptor_to_json(descriptor: &ChartDescriptor) -> JSValue {
    let mut m: JSMap<String, JSValue> = JSMap::new();
    m.insert("kind".to_string(), json!(descriptor.kind.tag()));
    m.insert("data".to_string(), chart_data_to_json(&descriptor.data));
    if !descriptor.x_label.is_empty() {
        m.insert("xLabel".to_string(), json!(descriptor.x_label));
    }
    if !descriptor.y_label.is_empty() {
        m.insert("yLabel".to_string(), json!(descriptor.y_label));
    }
    if let Some((lo, hi)) = descriptor.axis_range {
        m.insert("axisRange".to_string(), json!([lo, hi]));
    }
    if let Some(order) = &descriptor.category_order {
        m.insert("categoryOrder".to_string(), json!(order));
    }
    JSValue::Object(m)
}

fn sections_to_json(sections: &[ReportSection]) -> Vec<JSValue> {
    sections
        .iter()
        .map(|section| match &section.content {
            SectionContent::Chart(descriptor) => {
                json!({"title": section.title, "chart": descriptor_to_json(descriptor)})
            }
            SectionContent::Placeholder(message) => {
                json!({"title": section.title, "placeholder": message})
            }
        })
        .collect()
}

pub fn build_summary_js(config: &DashConfig, summary: &DashboardSummary) -> JSValue {
    json!({
        "config": {
            "title": config.output_settings.dashboard_title,
            "provider": config.sheet_source.provider,
        },
        "kpis": {
            "totalResponses": summary.kpis.total_rows,
            "uniqueParticipants": summary.kpis.unique_participants,
            "imagesWithRatings": summary.kpis.rated_subjects,
        },
        "imageRatings": sections_to_json(&summary.image_ratings),
        "comparisons": sections_to_json(&summary.comparisons),
        "generalQuestions": sections_to_json(&summary.general_questions),
        "feedback": sections_to_json(std::slice::from_ref(&summary.feedback)),
    })
}

/// Loads the snapshot, assembles the dashboard summary and writes it out.
pub fn run_dashboard(args: &Args) -> DashResult<()> {
    let mut config = match &args.config {
        Some(path) => read_config(path.clone())?,
        None => DashConfig::reference(),
    };

    // Command-line overrides for the sheet source.
    if let Some(url) = &args.url {
        config.sheet_source.provider = "sheetUrl".to_string();
        config.sheet_source.url = Some(url.clone());
        config.sheet_source.file_path = None;
    }
    if let Some(input) = &args.input {
        config.sheet_source.provider = args.input_type.clone().unwrap_or_else(|| "csv".to_string());
        config.sheet_source.file_path = Some(input.clone());
        config.sheet_source.url = None;
    }
    if let Some(secs) = args.cache_seconds {
        config.sheet_source.cache_seconds = Some(secs);
    }
    info!("config: {:?}", config);

    let source = open_source(&config.sheet_source)?;
    let window = Duration::from_secs(
        config
            .sheet_source
            .cache_seconds
            .unwrap_or(DEFAULT_CACHE_SECONDS),
    );
    let mut loader = CachedLoader::new(source, window);
    let records = loader.load()?;
    debug!("run_dashboard: {:?} records", records.len());

    let options = report_options(&config);
    let summary = match run_survey_stats(&records, &options) {
        Result::Ok(s) => s,
        Result::Err(e) => {
            whatever!("Report error: {:?}", e)
        }
    };

    let result_js = build_summary_js(&config, &summary);
    let pretty_js_summary = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;
    match args.out.as_deref() {
        None | Some("stdout") => println!("summary:{}", pretty_js_summary),
        Some(path) => fs::write(path, &pretty_js_summary).context(OpeningFileSnafu {
            path: path.to_string(),
        })?,
    }

    // The reference summary, if provided for comparison
    if let Some(reference_path) = &args.reference {
        let summary_ref = read_summary(reference_path.clone())?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_summary {
            warn!("Found differences with the reference summary");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_summary.as_ref(),
                "\n",
            );
            whatever!("Difference detected between calculated summary and reference summary")
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dash::io_csv::read_csv_payload;

    const SAMPLE_CSV: &str = "\
 Timestamp ,Session_ID,Type,Image_Name,Metric,Value,Extra
3/14/2025 09:26:53,s1,rating,img1,act,4,x
3/14/2025 09:27:02,s2,rating,img1,act,4,
not a date,s1,rating,img1,act,2,
3/14/2025 09:28:10,s1,ab,ab1,,A,
3/14/2025 09:28:11,s2,ab,ab1,,A,
3/14/2025 09:28:12,s3,ab,ab1,,B,
3/14/2025 09:28:13,s4,ab,ab1,,Neither,
3/14/2025 09:29:00,s1,general,motivatesMost,,facts,
3/14/2025 09:30:00,s2,feedback,,,loved it,
3/14/2025 09:31:00,s9,,,,ignored row,
";

    #[test]
    fn csv_columns_are_normalized_and_extras_ignored() {
        let rows = read_csv_payload(SAMPLE_CSV).unwrap();
        assert_eq!(rows.len(), 10);
        assert_eq!(rows[0].session_id, "s1");
        assert_eq!(rows[0].kind, "rating");
        assert_eq!(rows[0].value, "4");
    }

    #[test]
    fn missing_required_column_is_data_unavailable() {
        let res = read_csv_payload("timestamp,value\n1,2\n");
        assert!(matches!(res, Err(DashError::MissingColumn { .. })));
    }

    #[test]
    fn missing_optional_columns_degrade_to_empty_cells() {
        let rows = read_csv_payload("session_id,type,value\ns1,feedback,hello\n").unwrap();
        assert_eq!(rows[0].subject, "");
        assert_eq!(rows[0].metric, "");
        let records = normalize_rows(&rows);
        assert_eq!(records[0].metric, None);
    }

    #[test]
    fn numeric_coercion_degrades_to_absent() {
        let payload = "session_id,type,value\ns1,rating,3\ns1,rating,bad\ns1,rating,\ns1,rating,5\n";
        let records = normalize_rows(&read_csv_payload(payload).unwrap());
        let nums: Vec<Option<f64>> = records.iter().map(|r| r.value_num).collect();
        assert_eq!(nums, vec![Some(3.0), None, None, Some(5.0)]);
    }

    #[test]
    fn rows_without_a_type_are_dropped() {
        let records = normalize_rows(&read_csv_payload(SAMPLE_CSV).unwrap());
        assert_eq!(records.len(), 9);
        assert!(records.iter().all(|r| !r.kind.tag().is_empty()));
    }

    #[test]
    fn unparseable_timestamps_become_absent() {
        let records = normalize_rows(&read_csv_payload(SAMPLE_CSV).unwrap());
        assert!(records[0].timestamp.is_some());
        assert!(records[2].timestamp.is_none());
        // The record itself survives the bad timestamp.
        assert_eq!(records[2].value_num, Some(2.0));
    }

    #[test]
    fn end_to_end_summary_over_sample_csv() {
        let records = normalize_rows(&read_csv_payload(SAMPLE_CSV).unwrap());
        let summary = run_survey_stats(&records, &ReportOptions::default()).unwrap();

        assert_eq!(summary.kpis.unique_participants, 4);
        assert_eq!(summary.kpis.rated_subjects, 1);

        // s1 rated img1/act twice (4 and 2), s2 once (4).
        match &summary.image_ratings[0].content {
            SectionContent::Chart(c) => match &c.data {
                ChartData::Series(points) => {
                    assert_eq!(
                        points,
                        &vec![("s1".to_string(), 3.0), ("s2".to_string(), 4.0)]
                    );
                }
                other => panic!("expected a series, got {:?}", other),
            },
            other => panic!("expected a chart, got {:?}", other),
        }

        // ab1: A=2, B=1, Neither=1, in fixed order.
        match &summary.comparisons[0].content {
            SectionContent::Chart(c) => match &c.data {
                ChartData::Series(points) => {
                    assert_eq!(
                        points,
                        &vec![
                            ("A".to_string(), 2.0),
                            ("B".to_string(), 1.0),
                            ("Neither".to_string(), 1.0)
                        ]
                    );
                }
                other => panic!("expected a series, got {:?}", other),
            },
            other => panic!("expected a chart, got {:?}", other),
        }
        assert_eq!(summary.comparisons[0].title, "Results for img1 vs img4");
    }

    #[test]
    fn summary_json_has_stable_section_shape() {
        let records = normalize_rows(&read_csv_payload(SAMPLE_CSV).unwrap());
        let summary = run_survey_stats(&records, &ReportOptions::default()).unwrap();
        let js = build_summary_js(&DashConfig::reference(), &summary);

        assert_eq!(js["kpis"]["uniqueParticipants"], json!(4));
        assert_eq!(js["imageRatings"][0]["chart"]["kind"], json!("bar"));
        assert_eq!(
            js["imageRatings"][0]["chart"]["axisRange"],
            json!([1.0, 5.0])
        );
        assert_eq!(
            js["comparisons"][0]["chart"]["categoryOrder"],
            json!(["A", "B", "Neither"])
        );
        // Feedback stays a raw table.
        assert_eq!(js["feedback"][0]["chart"]["kind"], json!("table"));
    }
}
