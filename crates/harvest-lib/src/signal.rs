use crate::error::{HarvestError, Result};
use serde::{Deserialize, Serialize};

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Voltage log of one charge/discharge experiment.
///
/// The three sample vectors always have the same length. `elapsed_h[i]` is
/// `index[i] * sample_interval_s / 3600`, so a reading dropped by the loader
/// leaves a gap in time instead of shifting later samples.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasurementSeries {
    /// Logger sampling period in seconds
    pub sample_interval_s: f64,
    /// Transmit power of the source, when the file name carries it
    pub power_level_dbm: Option<i32>,
    /// Logger reading numbers (`Reading #`)
    pub index: Vec<u64>,
    /// Elapsed time in hours
    pub elapsed_h: Vec<f64>,
    /// Capacitor voltage in volts
    pub voltage: Vec<f64>,
}

impl MeasurementSeries {
    /// Build a series from `(reading #, voltage)` pairs.
    ///
    /// Reading numbers must be strictly increasing.
    pub fn from_readings(
        sample_interval_s: f64,
        power_level_dbm: Option<i32>,
        readings: &[(u64, f64)],
    ) -> Result<Self> {
        let mut index = Vec::with_capacity(readings.len());
        let mut elapsed_h = Vec::with_capacity(readings.len());
        let mut voltage = Vec::with_capacity(readings.len());
        for &(i, v) in readings {
            if let Some(&previous) = index.last() {
                if i <= previous {
                    return Err(HarvestError::NonMonotonicIndex { previous, index: i });
                }
            }
            index.push(i);
            elapsed_h.push(i as f64 * sample_interval_s / SECONDS_PER_HOUR);
            voltage.push(v);
        }
        Ok(Self {
            sample_interval_s,
            power_level_dbm,
            index,
            elapsed_h,
            voltage,
        })
    }

    /// Series whose reading numbers are `0..voltage.len()`.
    pub fn uniform(sample_interval_s: f64, power_level_dbm: Option<i32>, voltage: Vec<f64>) -> Self {
        let index: Vec<u64> = (0..voltage.len() as u64).collect();
        let elapsed_h = index
            .iter()
            .map(|&i| i as f64 * sample_interval_s / SECONDS_PER_HOUR)
            .collect();
        Self {
            sample_interval_s,
            power_level_dbm,
            index,
            elapsed_h,
            voltage,
        }
    }

    pub fn len(&self) -> usize {
        self.voltage.len()
    }
    pub fn is_empty(&self) -> bool {
        self.voltage.is_empty()
    }
    pub fn duration_h(&self) -> f64 {
        self.elapsed_h.last().copied().unwrap_or(0.0)
    }
}

/// Sample positions where the voltage collapses in a single step (discharge onsets).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropEvents {
    pub indices: Vec<usize>,
}

impl DropEvents {
    pub fn from_indices(indices: Vec<usize>) -> Self {
        Self { indices }
    }
    pub fn len(&self) -> usize {
        self.indices.len()
    }
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
    pub fn first(&self) -> Option<usize> {
        self.indices.first().copied()
    }
}
