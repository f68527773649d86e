use crate::{detectors::drops::steepest_drop, signal::MeasurementSeries};
use serde::{Deserialize, Serialize};

/// Timing of a single supercapacitor discharge captured at high sample rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DischargeAnalysis {
    /// Sample where the steepest single-step decrease starts
    pub onset_index: usize,
    /// First sample at the global voltage minimum
    pub minimum_index: usize,
    pub onset_voltage: f64,
    pub minimum_voltage: f64,
    /// Reading numbers between onset and minimum, negative if the minimum
    /// precedes the onset. Dropped blank readings still count.
    pub samples: i64,
    pub duration_ms: f64,
}

pub fn analyze_discharge(series: &MeasurementSeries) -> Option<DischargeAnalysis> {
    let onset_index = steepest_drop(&series.voltage)?;
    let minimum_index = first_argmin(&series.voltage)?;
    let samples = series.index[minimum_index] as i64 - series.index[onset_index] as i64;
    Some(DischargeAnalysis {
        onset_index,
        minimum_index,
        onset_voltage: series.voltage[onset_index],
        minimum_voltage: series.voltage[minimum_index],
        samples,
        duration_ms: samples as f64 * series.sample_interval_s * 1000.0,
    })
}

fn first_argmin(data: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in data.iter().enumerate() {
        match best {
            Some((_, min)) if v >= min => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}
