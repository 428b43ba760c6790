mod config;
pub mod builder;
pub mod coerce;
pub mod quick_start;
pub mod report;

use log::{debug, info};

use std::collections::{HashMap, HashSet};

pub use crate::config::*;
pub use crate::report::{
    ChartData, ChartDescriptor, ChartKind, DashboardSummary, ReportSection, SectionContent,
};

use crate::report::{
    choice_chart, comparison_chart, participant_mean_chart, rating_distribution_chart,
    records_table,
};

// **** Aggregation primitives ****
//
// All of these are pure: they take a record slice plus selection parameters
// and return a fresh summary. The snapshot is never mutated.

/// Which record field a categorical count runs over.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ValueField {
    Value,
    Subject,
}

/// Keeps the records whose kind matches exactly.
pub fn filter_by_kind(records: &[ResponseRecord], kind: &ResponseKind) -> Vec<ResponseRecord> {
    records
        .iter()
        .filter(|r| r.kind == *kind)
        .cloned()
        .collect()
}

/// Restricts a rating subset to one metric and one subject.
/// Records without a metric are excluded.
pub fn filter_ratings(
    records: &[ResponseRecord],
    metric: &MetricCode,
    subject: &str,
) -> Vec<ResponseRecord> {
    records
        .iter()
        .filter(|r| r.subject == subject && r.metric.as_ref() == Some(metric))
        .cloned()
        .collect()
}

/// Mean numeric value per participant, ordered by session id.
///
/// Records with an absent numeric value are dropped before grouping, so a
/// session whose rows are all non-numeric does not appear at all.
pub fn per_participant_mean(records: &[ResponseRecord]) -> Vec<(String, f64)> {
    let mut sums: HashMap<String, (f64, u64)> = HashMap::new();
    for r in records.iter() {
        if let Some(v) = r.value_num {
            let e = sums.entry(r.session_id.clone()).or_insert((0.0, 0));
            e.0 += v;
            e.1 += 1;
        }
    }
    let mut means: Vec<(String, f64)> = sums
        .iter()
        .map(|(sid, (sum, n))| (sid.clone(), sum / *n as f64))
        .collect();
    means.sort_by(|a, b| a.0.cmp(&b.0));
    debug!("per_participant_mean: {:?} participants", means.len());
    means
}

/// Count of records per integer rating bucket.
///
/// The output follows `buckets` exactly: zero-observation buckets are still
/// emitted so the chart frame is stable over sparse data. Records with an
/// absent or non-integer numeric value are not counted.
pub fn rating_distribution(records: &[ResponseRecord], buckets: &[i64]) -> Vec<(i64, u64)> {
    let mut counts: HashMap<i64, u64> = HashMap::new();
    for r in records.iter() {
        if let Some(v) = r.value_num {
            if v.fract() == 0.0 {
                *counts.entry(v as i64).or_insert(0) += 1;
            }
        }
    }
    buckets
        .iter()
        .map(|b| (*b, counts.get(b).copied().unwrap_or(0)))
        .collect()
}

/// Count of occurrences of each distinct value of `field`.
///
/// With a fixed order the output follows it exactly and missing choices are
/// emitted with count 0. Without one, the order is the first occurrence of
/// each distinct value in the input, which is stable for a given snapshot.
pub fn choice_counts(
    records: &[ResponseRecord],
    field: ValueField,
    fixed_order: Option<&[String]>,
) -> Vec<(String, u64)> {
    let mut counts: HashMap<String, u64> = HashMap::new();
    let mut first_seen: Vec<String> = Vec::new();
    for r in records.iter() {
        let key = match field {
            ValueField::Value => r.value.clone(),
            ValueField::Subject => r.subject.clone(),
        };
        if !counts.contains_key(&key) {
            first_seen.push(key.clone());
        }
        *counts.entry(key).or_insert(0) += 1;
    }
    match fixed_order {
        Some(order) => order
            .iter()
            .map(|c| (c.clone(), counts.get(c).copied().unwrap_or(0)))
            .collect(),
        None => first_seen
            .iter()
            .map(|c| (c.clone(), counts[c]))
            .collect(),
    }
}

/// Distinct subject keys in first-seen order.
pub fn subjects_first_seen(records: &[ResponseRecord]) -> Vec<String> {
    choice_counts(records, ValueField::Subject, None)
        .into_iter()
        .map(|(subject, _)| subject)
        .collect()
}

/// Distinct non-empty subject keys, sorted. Drives the per-image tab list.
pub fn distinct_subjects(records: &[ResponseRecord]) -> Vec<String> {
    let mut subjects: Vec<String> = subjects_first_seen(records)
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect();
    subjects.sort();
    subjects
}

/// Distinct metric codes in first-seen order. Records without a metric are skipped.
pub fn distinct_metrics(records: &[ResponseRecord]) -> Vec<MetricCode> {
    let mut seen: Vec<MetricCode> = Vec::new();
    for r in records.iter() {
        if let Some(m) = &r.metric {
            if !seen.contains(m) {
                seen.push(m.clone());
            }
        }
    }
    seen
}

/// Headline numbers: row count, unique participants, images with ratings.
pub fn survey_kpis(records: &[ResponseRecord]) -> SurveyKpis {
    let participants: HashSet<&str> = records.iter().map(|r| r.session_id.as_str()).collect();
    let ratings = filter_by_kind(records, &ResponseKind::Rating);
    SurveyKpis {
        total_rows: records.len() as u64,
        unique_participants: participants.len() as u64,
        rated_subjects: distinct_subjects(&ratings).len() as u64,
    }
}

// **** Dashboard assembly ****

fn format_timestamp(ts: &Option<chrono::NaiveDateTime>) -> String {
    match ts {
        Some(t) => t.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => String::new(),
    }
}

fn rating_sections(ratings: &[ResponseRecord], options: &ReportOptions) -> Vec<ReportSection> {
    let mut sections: Vec<ReportSection> = Vec::new();
    if ratings.is_empty() {
        sections.push(ReportSection::placeholder(
            "Image Ratings (1-5)",
            "No rating data found yet.",
        ));
        return sections;
    }
    let metrics = distinct_metrics(ratings);
    let subjects = distinct_subjects(ratings);
    for metric in metrics.iter() {
        let metric_label = options.labels.metric_label(metric);
        for subject in subjects.iter() {
            let subset = filter_ratings(ratings, metric, subject);
            let title = format!("{} - {}", subject, metric_label);
            if subset.is_empty() {
                sections.push(ReportSection::placeholder(
                    &title,
                    "No ratings yet for this image.",
                ));
                continue;
            }
            let means = per_participant_mean(&subset);
            let dist = rating_distribution(&subset, &options.rating_buckets);
            sections.push(ReportSection::chart(
                &format!("{} (per participant)", title),
                participant_mean_chart(&means),
            ));
            sections.push(ReportSection::chart(
                &format!("{} (distribution)", title),
                rating_distribution_chart(&dist),
            ));
        }
    }
    sections
}

fn comparison_sections(
    comparisons: &[ResponseRecord],
    options: &ReportOptions,
) -> Vec<ReportSection> {
    let mut sections: Vec<ReportSection> = Vec::new();
    if comparisons.is_empty() {
        sections.push(ReportSection::placeholder(
            "Comparisons",
            "No comparison data yet.",
        ));
        return sections;
    }
    for key in subjects_first_seen(comparisons).iter() {
        let subset: Vec<ResponseRecord> = comparisons
            .iter()
            .filter(|r| r.subject == *key)
            .cloned()
            .collect();
        let counts = choice_counts(&subset, ValueField::Value, Some(&options.comparison_choices));
        let pretty = options.labels.comparison_label(key);
        sections.push(ReportSection::chart(
            &format!("Results for {}", pretty),
            comparison_chart(&counts, &options.comparison_choices),
        ));
        let rows: Vec<Vec<String>> = subset
            .iter()
            .map(|r| {
                vec![
                    format_timestamp(&r.timestamp),
                    r.session_id.clone(),
                    r.subject.clone(),
                    r.value.clone(),
                ]
            })
            .collect();
        sections.push(ReportSection::chart(
            &format!("Raw comparison responses ({})", pretty),
            records_table(&["timestamp", "session_id", "image_name", "value"], rows),
        ));
    }
    sections
}

fn general_sections(general: &[ResponseRecord], options: &ReportOptions) -> Vec<ReportSection> {
    let mut sections: Vec<ReportSection> = Vec::new();
    if general.is_empty() {
        sections.push(ReportSection::placeholder(
            "General Questions",
            "No general-question data yet.",
        ));
        return sections;
    }
    for question in options.general_questions.iter() {
        let subset: Vec<ResponseRecord> = general
            .iter()
            .filter(|r| r.subject == question.key)
            .cloned()
            .collect();
        if subset.is_empty() {
            sections.push(ReportSection::placeholder(
                &question.title,
                &format!("No data yet for '{}'.", question.key),
            ));
            continue;
        }
        let counts = choice_counts(&subset, ValueField::Value, None);
        sections.push(ReportSection::chart(
            &question.title,
            choice_chart(question.chart, &counts),
        ));
    }
    sections
}

fn feedback_section(feedback: &[ResponseRecord]) -> ReportSection {
    if feedback.is_empty() {
        return ReportSection::placeholder("Open Feedback", "No feedback submitted yet.");
    }
    let rows: Vec<Vec<String>> = feedback
        .iter()
        .map(|r| {
            vec![
                format_timestamp(&r.timestamp),
                r.session_id.clone(),
                r.value.clone(),
            ]
        })
        .collect();
    ReportSection::chart(
        "Open Feedback",
        records_table(&["timestamp", "session_id", "feedback_text"], rows),
    )
}

/// Assembles the whole dashboard from one snapshot.
///
/// Arguments:
/// * `records` the normalized snapshot to report over
/// * `options` buckets, fixed choice orders, labels and question panels
///
/// Empty subsets come back as placeholder sections; the only error cases are
/// misconfigured options.
pub fn run_survey_stats(
    records: &[ResponseRecord],
    options: &ReportOptions,
) -> Result<DashboardSummary, ReportErrors> {
    info!(
        "run_survey_stats: processing {:?} records, {:?} general question panels",
        records.len(),
        options.general_questions.len()
    );
    if options.rating_buckets.is_empty() {
        return Err(ReportErrors::EmptyBuckets);
    }

    let kpis = survey_kpis(records);
    debug!("run_survey_stats: kpis: {:?}", kpis);

    let ratings = filter_by_kind(records, &ResponseKind::Rating);
    let comparisons = filter_by_kind(records, &ResponseKind::Comparison);
    let general = filter_by_kind(records, &ResponseKind::General);
    let feedback = filter_by_kind(records, &ResponseKind::Feedback);
    debug!(
        "run_survey_stats: ratings: {:?} comparisons: {:?} general: {:?} feedback: {:?}",
        ratings.len(),
        comparisons.len(),
        general.len(),
        feedback.len()
    );

    Ok(DashboardSummary {
        kpis,
        image_ratings: rating_sections(&ratings, options),
        comparisons: comparison_sections(&comparisons, options),
        general_questions: general_sections(&general, options),
        feedback: feedback_section(&feedback),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::SnapshotBuilder;

    fn rating(session: &str, metric: &str, subject: &str, value: &str) -> ResponseRecord {
        let mut b = SnapshotBuilder::new();
        b.add_row("", session, "rating", subject, Some(metric), value)
            .unwrap();
        b.build().remove(0)
    }

    fn sample_ratings() -> Vec<ResponseRecord> {
        vec![
            rating("s1", "act", "img1", "4"),
            rating("s2", "act", "img1", "4"),
            rating("s1", "act", "img1", "2"),
        ]
    }

    #[test]
    fn per_participant_mean_scenario() {
        let means = per_participant_mean(&sample_ratings());
        assert_eq!(
            means,
            vec![("s1".to_string(), 3.0), ("s2".to_string(), 4.0)]
        );
    }

    #[test]
    fn per_participant_mean_drops_non_numeric_sessions() {
        let mut records = sample_ratings();
        records.push(rating("s3", "act", "img1", "n/a"));
        let means = per_participant_mean(&records);
        assert!(means.iter().all(|(sid, _)| sid != "s3"));
        assert_eq!(means.len(), 2);
    }

    #[test]
    fn rating_distribution_scenario() {
        let dist = rating_distribution(&sample_ratings(), &[1, 2, 3, 4, 5]);
        assert_eq!(dist, vec![(1, 0), (2, 1), (3, 0), (4, 2), (5, 0)]);
    }

    #[test]
    fn rating_distribution_sum_matches_numeric_rows() {
        let mut records = sample_ratings();
        records.push(rating("s9", "act", "img1", "bad"));
        let dist = rating_distribution(&records, &[1, 2, 3, 4, 5]);
        assert_eq!(dist.len(), 5);
        let total: u64 = dist.iter().map(|(_, c)| *c).sum();
        let numeric = records.iter().filter(|r| r.value_num.is_some()).count() as u64;
        assert_eq!(total, numeric);
    }

    #[test]
    fn rating_distribution_empty_subset_keeps_buckets() {
        let dist = rating_distribution(&[], &[1, 2, 3, 4, 5]);
        assert_eq!(dist, vec![(1, 0), (2, 0), (3, 0), (4, 0), (5, 0)]);
    }

    fn comparison(session: &str, key: &str, value: &str) -> ResponseRecord {
        let mut b = SnapshotBuilder::new();
        b.add_row("", session, "ab", key, None, value).unwrap();
        b.build().remove(0)
    }

    #[test]
    fn choice_counts_fixed_order_scenario() {
        let records = vec![
            comparison("s1", "ab1", "A"),
            comparison("s2", "ab1", "A"),
            comparison("s3", "ab1", "B"),
            comparison("s4", "ab1", "Neither"),
        ];
        let order = vec!["A".to_string(), "B".to_string(), "Neither".to_string()];
        let counts = choice_counts(&records, ValueField::Value, Some(&order));
        assert_eq!(
            counts,
            vec![
                ("A".to_string(), 2),
                ("B".to_string(), 1),
                ("Neither".to_string(), 1)
            ]
        );
    }

    #[test]
    fn choice_counts_fixed_order_fills_missing_choices() {
        let records = vec![comparison("s1", "ab2", "B")];
        let order = vec!["A".to_string(), "B".to_string(), "Neither".to_string()];
        let counts = choice_counts(&records, ValueField::Value, Some(&order));
        assert_eq!(
            counts,
            vec![
                ("A".to_string(), 0),
                ("B".to_string(), 1),
                ("Neither".to_string(), 0)
            ]
        );
    }

    #[test]
    fn choice_counts_without_order_keeps_first_seen() {
        let records = vec![
            comparison("s1", "ab1", "Neither"),
            comparison("s2", "ab1", "A"),
            comparison("s3", "ab1", "Neither"),
        ];
        let counts = choice_counts(&records, ValueField::Value, None);
        assert_eq!(
            counts,
            vec![("Neither".to_string(), 2), ("A".to_string(), 1)]
        );
    }

    #[test]
    fn kpis_count_rows_participants_and_rated_images() {
        let mut records = sample_ratings();
        records.push(rating("s1", "mot", "img2", "5"));
        records.push(comparison("s3", "ab1", "A"));
        let kpis = survey_kpis(&records);
        assert_eq!(kpis.total_rows, 5);
        assert_eq!(kpis.unique_participants, 3);
        assert_eq!(kpis.rated_subjects, 2);
    }

    #[test]
    fn empty_snapshot_yields_placeholders_everywhere() {
        let _ = env_logger::builder().is_test(true).try_init();
        let summary = run_survey_stats(&[], &ReportOptions::default()).unwrap();
        assert_eq!(summary.kpis.total_rows, 0);
        for section in summary
            .image_ratings
            .iter()
            .chain(summary.comparisons.iter())
            .chain(summary.general_questions.iter())
        {
            assert!(matches!(section.content, SectionContent::Placeholder(_)));
        }
        assert!(matches!(
            summary.feedback.content,
            SectionContent::Placeholder(_)
        ));
    }

    #[test]
    fn empty_buckets_is_a_report_error() {
        let options = ReportOptions {
            rating_buckets: vec![],
            ..ReportOptions::default()
        };
        assert_eq!(
            run_survey_stats(&[], &options),
            Err(ReportErrors::EmptyBuckets)
        );
    }

    #[test]
    fn rating_sections_pin_axes() {
        let summary = run_survey_stats(&sample_ratings(), &ReportOptions::default()).unwrap();
        assert_eq!(summary.image_ratings.len(), 2);
        match &summary.image_ratings[0].content {
            SectionContent::Chart(c) => {
                assert_eq!(c.axis_range, Some((1.0, 5.0)));
                assert_eq!(c.kind, ChartKind::Bar);
            }
            other => panic!("expected a chart, got {:?}", other),
        }
        match &summary.image_ratings[1].content {
            SectionContent::Chart(c) => assert_eq!(c.axis_range, Some((0.0, 2.0))),
            other => panic!("expected a chart, got {:?}", other),
        }
    }

    #[test]
    fn unmapped_comparison_key_falls_back_to_raw_code() {
        let records = vec![comparison("s1", "ab9", "A")];
        let summary = run_survey_stats(&records, &ReportOptions::default()).unwrap();
        assert_eq!(summary.comparisons[0].title, "Results for ab9");
    }

    #[test]
    fn unknown_kind_is_carried_but_not_rendered() {
        let mut b = SnapshotBuilder::new();
        b.add_row("", "s1", "pulse", "q1", None, "7").unwrap();
        let records = b.build();
        assert_eq!(records[0].kind, ResponseKind::Other("pulse".to_string()));
        let summary = run_survey_stats(&records, &ReportOptions::default()).unwrap();
        assert_eq!(summary.kpis.total_rows, 1);
        assert!(matches!(
            summary.image_ratings[0].content,
            SectionContent::Placeholder(_)
        ));
    }

    #[test]
    fn general_questions_follow_configured_panels() {
        let mut b = SnapshotBuilder::new();
        b.add_row("", "s1", "general", "motivatesMost", None, "facts")
            .unwrap();
        b.add_row("", "s2", "general", "motivatesMost", None, "stories")
            .unwrap();
        let summary = run_survey_stats(&b.build(), &ReportOptions::default()).unwrap();
        assert_eq!(summary.general_questions.len(), 3);
        match &summary.general_questions[0].content {
            SectionContent::Chart(c) => assert_eq!(c.kind, ChartKind::Pie),
            other => panic!("expected a chart, got {:?}", other),
        }
        // The two panels with no data degrade to placeholders.
        assert!(matches!(
            summary.general_questions[1].content,
            SectionContent::Placeholder(_)
        ));
    }

    #[test]
    fn feedback_rows_keep_timestamp_session_and_text() {
        let mut b = SnapshotBuilder::new();
        b.add_row(
            "2025-03-14 09:26:53",
            "s1",
            "feedback",
            "",
            None,
            "loved the blue one",
        )
        .unwrap();
        let summary = run_survey_stats(&b.build(), &ReportOptions::default()).unwrap();
        match &summary.feedback.content {
            SectionContent::Chart(c) => match &c.data {
                ChartData::Rows { columns, rows } => {
                    assert_eq!(columns, &["timestamp", "session_id", "feedback_text"]);
                    assert_eq!(
                        rows[0],
                        vec![
                            "2025-03-14 09:26:53".to_string(),
                            "s1".to_string(),
                            "loved the blue one".to_string()
                        ]
                    );
                }
                other => panic!("expected rows, got {:?}", other),
            },
            other => panic!("expected a table, got {:?}", other),
        }
    }
}
