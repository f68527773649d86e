use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::detectors::drops::DEFAULT_DROP_THRESHOLD_V;
use crate::io::datalogger::DEFAULT_HEADER_LINES;

/// Tunable parameters of the folder analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Minimum single-step voltage decrease (volts) counted as a drop.
    pub drop_threshold_v: f64,
    /// Lines preceding the `Reading #,Reading` rows of a log.
    pub header_lines: usize,
    /// File extension of measurement logs inside a folder.
    pub extension: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            drop_threshold_v: DEFAULT_DROP_THRESHOLD_V,
            header_lines: DEFAULT_HEADER_LINES,
            extension: "csv".into(),
        }
    }
}

pub fn read_config(path: &Path) -> Result<AnalysisConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: AnalysisConfig =
        toml::from_str(&contents).with_context(|| format!("parsing config {}", path.display()))?;
    if !(config.drop_threshold_v.is_finite() && config.drop_threshold_v >= 0.0) {
        anyhow::bail!(
            "drop_threshold_v must be a non-negative number, got {}",
            config.drop_threshold_v
        );
    }
    Ok(config)
}

/// The two antenna configurations measured in the experiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Experiment {
    /// A single rectenna feeding the capacitor
    Unitary,
    /// An array of rectennas feeding the capacitor
    Array,
}

impl Experiment {
    pub fn label(&self) -> &'static str {
        match self {
            Experiment::Unitary => "Rectenna unitaire",
            Experiment::Array => "Réseau de rectenna",
        }
    }
}
