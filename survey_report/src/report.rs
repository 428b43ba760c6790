//! Abstract chart and table descriptors.
//!
//! The engine never renders anything; it hands these descriptors to a
//! presentation layer. Axis ranges and category orders are attached here so
//! every renderer pins rating axes to 1-5 and keeps comparison categories in
//! a stable order, even over empty data.

use crate::config::SurveyKpis;

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ChartKind {
    Bar,
    Pie,
    Table,
}

impl ChartKind {
    pub fn tag(&self) -> &'static str {
        match self {
            ChartKind::Bar => "bar",
            ChartKind::Pie => "pie",
            ChartKind::Table => "table",
        }
    }
}

/// Chart payload: either a labeled series or raw table rows.
#[derive(PartialEq, Debug, Clone)]
pub enum ChartData {
    Series(Vec<(String, f64)>),
    Rows {
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
    },
}

#[derive(PartialEq, Debug, Clone)]
pub struct ChartDescriptor {
    pub kind: ChartKind,
    pub data: ChartData,
    pub x_label: String,
    pub y_label: String,
    /// Pinned numeric axis, e.g. [1, 5] for rating axes or [0, max] for counts.
    pub axis_range: Option<(f64, f64)>,
    /// Explicit ordering of category labels, when first-seen order is not wanted.
    pub category_order: Option<Vec<String>>,
}

/// A dashboard section is a chart or an explicit "no data yet" placeholder.
/// An empty filtered subset is not a failure.
#[derive(PartialEq, Debug, Clone)]
pub enum SectionContent {
    Chart(ChartDescriptor),
    Placeholder(String),
}

#[derive(PartialEq, Debug, Clone)]
pub struct ReportSection {
    pub title: String,
    pub content: SectionContent,
}

impl ReportSection {
    pub fn chart(title: &str, descriptor: ChartDescriptor) -> ReportSection {
        ReportSection {
            title: title.to_string(),
            content: SectionContent::Chart(descriptor),
        }
    }

    pub fn placeholder(title: &str, message: &str) -> ReportSection {
        ReportSection {
            title: title.to_string(),
            content: SectionContent::Placeholder(message.to_string()),
        }
    }
}

/// The full dashboard, grouped the way the presentation layer tabs it.
#[derive(PartialEq, Debug, Clone)]
pub struct DashboardSummary {
    pub kpis: SurveyKpis,
    pub image_ratings: Vec<ReportSection>,
    pub comparisons: Vec<ReportSection>,
    pub general_questions: Vec<ReportSection>,
    pub feedback: ReportSection,
}

// ******** Descriptor constructors *********

/// Per-participant mean ratings. The y axis is always pinned to the rating
/// scale so half-empty charts do not rescale.
pub fn participant_mean_chart(means: &[(String, f64)]) -> ChartDescriptor {
    ChartDescriptor {
        kind: ChartKind::Bar,
        data: ChartData::Series(means.to_vec()),
        x_label: "Participant".to_string(),
        y_label: "Rating (1-5)".to_string(),
        axis_range: Some((1.0, 5.0)),
        category_order: None,
    }
}

/// Count of responses per rating bucket. The count axis starts at zero and
/// reaches at least 1 so an all-zero distribution still has a visible frame.
pub fn rating_distribution_chart(distribution: &[(i64, u64)]) -> ChartDescriptor {
    let max_count = distribution.iter().map(|(_, c)| *c).max().unwrap_or(0).max(1);
    let order: Vec<String> = distribution.iter().map(|(b, _)| b.to_string()).collect();
    ChartDescriptor {
        kind: ChartKind::Bar,
        data: ChartData::Series(
            distribution
                .iter()
                .map(|(b, c)| (b.to_string(), *c as f64))
                .collect(),
        ),
        x_label: "Rating (1-5)".to_string(),
        y_label: "Responses".to_string(),
        axis_range: Some((0.0, max_count as f64)),
        category_order: Some(order),
    }
}

/// A/B/Neither tallies for one comparison key.
pub fn comparison_chart(counts: &[(String, u64)], choices: &[String]) -> ChartDescriptor {
    let max_count = counts.iter().map(|(_, c)| *c).max().unwrap_or(0).max(1);
    ChartDescriptor {
        kind: ChartKind::Bar,
        data: ChartData::Series(
            counts.iter().map(|(c, n)| (c.clone(), *n as f64)).collect(),
        ),
        x_label: "Choice (A / B / Neither)".to_string(),
        y_label: "Number of responses".to_string(),
        axis_range: Some((0.0, max_count as f64)),
        category_order: Some(choices.to_vec()),
    }
}

/// A general-question panel, charted as configured (pie or bar).
pub fn choice_chart(kind: ChartKind, counts: &[(String, u64)]) -> ChartDescriptor {
    let max_count = counts.iter().map(|(_, c)| *c).max().unwrap_or(0).max(1);
    ChartDescriptor {
        kind,
        data: ChartData::Series(
            counts.iter().map(|(c, n)| (c.clone(), *n as f64)).collect(),
        ),
        x_label: "Option".to_string(),
        y_label: "Responses".to_string(),
        axis_range: match kind {
            ChartKind::Pie => None,
            _ => Some((0.0, max_count as f64)),
        },
        category_order: None,
    }
}

/// A raw-record table.
pub fn records_table(columns: &[&str], rows: Vec<Vec<String>>) -> ChartDescriptor {
    ChartDescriptor {
        kind: ChartKind::Table,
        data: ChartData::Rows {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
        },
        x_label: String::new(),
        y_label: String::new(),
        axis_range: None,
        category_order: None,
    }
}
