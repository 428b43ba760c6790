// Sheet fetching and the snapshot cache.

use std::time::{Duration, Instant};

use log::{debug, info};
use snafu::prelude::*;

use survey_report::ResponseRecord;

use crate::dash::{
    io_csv, io_excel, normalize_rows, DashResult, FetchingSheetSnafu, RawRow, SheetHttpStatusSnafu,
};

/// Where raw rows come from. The loader only sees this trait, so tests can
/// substitute a source that counts fetches.
pub trait SheetSource {
    fn describe(&self) -> String;
    fn fetch_rows(&self) -> DashResult<Vec<RawRow>>;
}

/// GET of the published CSV export, with a bounded timeout so a stalled
/// network call cannot hang the dashboard.
pub struct HttpSheetSource {
    url: String,
    timeout: Duration,
}

impl HttpSheetSource {
    pub fn new(url: String, timeout: Duration) -> HttpSheetSource {
        HttpSheetSource { url, timeout }
    }
}

impl SheetSource for HttpSheetSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    fn fetch_rows(&self) -> DashResult<Vec<RawRow>> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .context(FetchingSheetSnafu {
                url: self.url.clone(),
            })?;
        let response = client.get(&self.url).send().context(FetchingSheetSnafu {
            url: self.url.clone(),
        })?;
        ensure!(
            response.status().is_success(),
            SheetHttpStatusSnafu {
                status: response.status().as_u16(),
                url: self.url.clone(),
            }
        );
        let payload = response.text().context(FetchingSheetSnafu {
            url: self.url.clone(),
        })?;
        io_csv::read_csv_payload(&payload)
    }
}

pub struct CsvFileSource {
    pub path: String,
}

impl SheetSource for CsvFileSource {
    fn describe(&self) -> String {
        self.path.clone()
    }

    fn fetch_rows(&self) -> DashResult<Vec<RawRow>> {
        io_csv::read_csv_file(self.path.clone())
    }
}

pub struct XlsxFileSource {
    pub path: String,
}

impl SheetSource for XlsxFileSource {
    fn describe(&self) -> String {
        self.path.clone()
    }

    fn fetch_rows(&self) -> DashResult<Vec<RawRow>> {
        io_excel::read_xlsx_file(self.path.clone())
    }
}

/// The process-wide snapshot cache.
///
/// Holds `(snapshot, fetched_at)`; `load` returns the held snapshot while it
/// is younger than the window and re-fetches after expiry. The whole snapshot
/// is replaced on refresh, never patched. Callers own the object and pass it
/// where it is needed rather than going through a global.
pub struct CachedLoader {
    source: Box<dyn SheetSource>,
    window: Duration,
    cached: Option<(Vec<ResponseRecord>, Instant)>,
}

impl CachedLoader {
    pub fn new(source: Box<dyn SheetSource>, window: Duration) -> CachedLoader {
        CachedLoader {
            source,
            window,
            cached: None,
        }
    }

    /// The current snapshot, fetched at most once per cache window.
    pub fn load(&mut self) -> DashResult<Vec<ResponseRecord>> {
        if let Some((snapshot, fetched_at)) = &self.cached {
            if fetched_at.elapsed() < self.window {
                debug!(
                    "load: snapshot is {:?} old, returning cached {:?} records",
                    fetched_at.elapsed(),
                    snapshot.len()
                );
                return Ok(snapshot.clone());
            }
        }
        info!("load: fetching {}", self.source.describe());
        let rows = self.source.fetch_rows()?;
        let records = normalize_rows(&rows);
        info!(
            "load: normalized {:?} records out of {:?} raw rows",
            records.len(),
            rows.len()
        );
        self.cached = Some((records.clone(), Instant::now()));
        Ok(records)
    }
}
