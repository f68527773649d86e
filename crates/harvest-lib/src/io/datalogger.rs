use csv::{ReaderBuilder, Trim};
use log::debug;
use std::path::Path;

use crate::error::{HarvestError, Result};
use crate::signal::MeasurementSeries;

/// Lines before the first reading in a logger export.
pub const DEFAULT_HEADER_LINES: usize = 3;

const SAMPLE_INTERVAL_LABEL: &str = "sample interval";

/// Extract the sampling period (seconds) from a `Sample interval,<seconds>` header line.
pub fn parse_sample_interval(text: &str, source_name: &str) -> Result<f64> {
    let line = text
        .lines()
        .map(str::trim)
        .find(|line| line.to_lowercase().starts_with(SAMPLE_INTERVAL_LABEL))
        .ok_or_else(|| HarvestError::MissingSampleInterval(source_name.to_string()))?;
    let raw = line.split(',').nth(1).unwrap_or("").trim();
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => Ok(value),
        _ => Err(HarvestError::InvalidSampleInterval {
            source_name: source_name.to_string(),
            value: raw.to_string(),
        }),
    }
}

/// Transmit power encoded in a file name as `..._<n>dBm...`.
pub fn power_level_from_name(name: &str) -> Option<i32> {
    let basename = Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(name);
    let bytes = basename.as_bytes();
    for (start, _) in basename.match_indices('_') {
        let digits = bytes[start + 1..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if digits == 0 {
            continue;
        }
        let end = start + 1 + digits;
        if basename[end..].starts_with("dBm") {
            if let Ok(power) = basename[start + 1..end].parse() {
                return Some(power);
            }
        }
    }
    None
}

/// Parse the full text of a logger export.
///
/// Readings whose voltage is blank or not a finite number are left out; an
/// unreadable reading number is an error.
pub fn parse_measurement_log(
    text: &str,
    source_name: &str,
    header_lines: usize,
) -> Result<MeasurementSeries> {
    let sample_interval_s = parse_sample_interval(text, source_name)?;
    let body_start: usize = text
        .split_inclusive('\n')
        .take(header_lines)
        .map(str::len)
        .sum();
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text[body_start..].as_bytes());

    let mut readings = Vec::new();
    let mut dropped = 0usize;
    for record in reader.records() {
        let record = record?;
        let line = header_lines + record.position().map(|p| p.line() as usize).unwrap_or(0);
        let index_field = record.get(0).unwrap_or("");
        if index_field.is_empty() {
            dropped += 1;
            continue;
        }
        let index: u64 = index_field.parse().map_err(|_| HarvestError::MalformedRow {
            line,
            text: record.iter().collect::<Vec<_>>().join(","),
        })?;
        match record.get(1).and_then(|v| v.parse::<f64>().ok()) {
            Some(voltage) if voltage.is_finite() => readings.push((index, voltage)),
            _ => dropped += 1,
        }
    }
    if dropped > 0 {
        debug!("{}: dropped {} non-numeric reading(s)", source_name, dropped);
    }
    if readings.is_empty() {
        return Err(HarvestError::EmptyTable(source_name.to_string()));
    }
    MeasurementSeries::from_readings(
        sample_interval_s,
        power_level_from_name(source_name),
        &readings,
    )
}

/// Read a logger export from disk; the power level comes from the file name.
pub fn read_measurement_log(path: &Path, header_lines: usize) -> Result<MeasurementSeries> {
    let text = std::fs::read_to_string(path).map_err(|source| HarvestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    parse_measurement_log(&text, &name, header_lines)
}
