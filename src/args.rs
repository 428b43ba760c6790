use clap::Parser;

/// Generates the summary of a message-evaluation survey dashboard.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The JSON dashboard configuration: sheet source, cache window,
    /// display-label tables and general-question panels. Without it, the built-in reference
    /// configuration is used.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (url, optional) Overrides the sheet source with a published CSV export URL.
    #[clap(short, long, value_parser)]
    pub url: Option<String>,

    /// (file path, optional) Overrides the sheet source with a local download of the sheet.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (default csv) The type of the local input: csv or xlsx.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (file path, 'stdout' or empty) Where to write the JSON summary. Defaults to stdout.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference summary in JSON format. If provided, survdash will check that
    /// the generated summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (seconds, optional) Overrides the snapshot cache window.
    #[clap(long, value_parser)]
    pub cache_seconds: Option<u64>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
