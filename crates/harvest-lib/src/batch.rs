use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::AnalysisConfig;
use crate::detectors::{cycles::segment_cycles, drops::detect_series_drops};
use crate::error::{HarvestError, Result};
use crate::io::datalogger::read_measurement_log;
use crate::metrics::recharge::{summarize, FileSummary};
use crate::signal::{DropEvents, MeasurementSeries};

/// Something that can produce one measurement series on demand.
pub trait SeriesSource {
    fn name(&self) -> &str;
    fn load(&self) -> Result<MeasurementSeries>;
}

/// Logger export on disk.
#[derive(Debug, Clone)]
pub struct CsvFileSource {
    pub path: PathBuf,
    pub header_lines: usize,
    name: String,
}

impl CsvFileSource {
    pub fn new(path: PathBuf, header_lines: usize) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            path,
            header_lines,
            name,
        }
    }
}

impl SeriesSource for CsvFileSource {
    fn name(&self) -> &str {
        &self.name
    }
    fn load(&self) -> Result<MeasurementSeries> {
        read_measurement_log(&self.path, self.header_lines)
    }
}

/// List the logs of a folder (not recursive, dot files skipped), sorted by path.
pub fn scan_sources(dir: &Path, extension: &str, header_lines: usize) -> Result<Vec<CsvFileSource>> {
    let io_err = |source| HarvestError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        let hidden = path
            .file_name()
            .is_some_and(|n| n.to_string_lossy().starts_with('.'));
        if hidden || !path.is_file() {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(extension));
        if matches {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths
        .into_iter()
        .map(|p| CsvFileSource::new(p, header_lines))
        .collect())
}

/// Why a readable log contributes no row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    NoDrops,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoDrops => write!(f, "no drop detected"),
        }
    }
}

/// Detect drops, segment cycles and summarize one series.
pub fn analyze_series(
    name: &str,
    series: &MeasurementSeries,
    threshold: f64,
) -> std::result::Result<FileSummary, SkipReason> {
    let drops = detect_series_drops(series, threshold);
    summarize_drops(name, series, &drops)
}

/// Segment and summarize a series whose drops are already known.
pub fn summarize_drops(
    name: &str,
    series: &MeasurementSeries,
    drops: &DropEvents,
) -> std::result::Result<FileSummary, SkipReason> {
    if drops.is_empty() {
        return Err(SkipReason::NoDrops);
    }
    let segmentation = segment_cycles(series, drops);
    Ok(summarize(name, series.power_level_dbm, drops, &segmentation))
}

/// Receives per-file progress of a batch run.
pub trait BatchObserver {
    fn on_loaded(&mut self, _name: &str, _series: &MeasurementSeries) {}
    fn on_summary(&mut self, _summary: &FileSummary) {}
    fn on_skipped(&mut self, _name: &str, _reason: SkipReason) {}
    fn on_failed(&mut self, _name: &str, _error: &HarvestError) {}
}

/// Forwards batch progress to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl BatchObserver for LogObserver {
    fn on_loaded(&mut self, name: &str, series: &MeasurementSeries) {
        info!(
            "{}: {} readings every {} s",
            name,
            series.len(),
            series.sample_interval_s
        );
    }

    fn on_summary(&mut self, s: &FileSummary) {
        info!("{}", describe_summary(s));
    }

    fn on_skipped(&mut self, name: &str, reason: SkipReason) {
        warn!("{}: skipped ({})", name, reason);
    }

    fn on_failed(&mut self, name: &str, error: &HarvestError) {
        warn!("{}: excluded from batch: {}", name, error);
    }
}

/// One-line account of a summary row; missing values read `n/a`.
fn describe_summary(s: &FileSummary) -> String {
    format!(
        "{}: power {}, first charge {}, recharge {} (std {}), {} drop(s)",
        s.source,
        display_opt(s.power_level_dbm.map(|v| format!("{} dBm", v))),
        display_opt(s.first_charge_h.map(|v| format!("{:.2} h", v))),
        display_opt(s.mean_recharge_min.map(|v| format!("{:.2} min", v))),
        display_opt(s.std_recharge_min.map(|v| format!("{:.2} min", v))),
        s.cycle_count
    )
}

fn display_opt(value: Option<String>) -> String {
    value.unwrap_or_else(|| "n/a".into())
}

/// Per-file rows of one experiment, ordered by transmit power.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub label: String,
    pub rows: Vec<FileSummary>,
}

impl BatchSummary {
    /// Sort rows by ascending power (stable); rows without power go last.
    pub fn from_rows(label: impl Into<String>, mut rows: Vec<FileSummary>) -> Self {
        rows.sort_by_key(|r| (r.power_level_dbm.is_none(), r.power_level_dbm));
        Self {
            label: label.into(),
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Run the per-file pipeline over every source.
///
/// A source that fails to load or has no drop is reported to `observer` and
/// left out; it never affects the other rows.
pub fn process_sources<S: SeriesSource>(
    sources: &[S],
    label: &str,
    config: &AnalysisConfig,
    observer: &mut dyn BatchObserver,
) -> BatchSummary {
    let mut rows = Vec::with_capacity(sources.len());
    for source in sources {
        let series = match source.load() {
            Ok(series) => series,
            Err(err) => {
                observer.on_failed(source.name(), &err);
                continue;
            }
        };
        observer.on_loaded(source.name(), &series);
        match analyze_series(source.name(), &series, config.drop_threshold_v) {
            Ok(summary) => {
                observer.on_summary(&summary);
                rows.push(summary);
            }
            Err(reason) => observer.on_skipped(source.name(), reason),
        }
    }
    BatchSummary::from_rows(label, rows)
}

pub fn process_folder(
    dir: &Path,
    label: &str,
    config: &AnalysisConfig,
    observer: &mut dyn BatchObserver,
) -> Result<BatchSummary> {
    let sources = scan_sources(dir, &config.extension, config.header_lines)?;
    info!(
        "{}: {} log(s) found in {}",
        label,
        sources.len(),
        dir.display()
    );
    Ok(process_sources(&sources, label, config, observer))
}
