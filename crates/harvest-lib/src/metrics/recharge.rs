use crate::{detectors::cycles::CycleSegmentation, signal::DropEvents};
use serde::{Deserialize, Serialize};

/// Per-file charge/recharge figures, one row of the batch table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileSummary {
    /// Name of the log the row was computed from
    pub source: String,
    pub power_level_dbm: Option<i32>,
    /// Hours until the first discharge
    pub first_charge_h: Option<f64>,
    /// `None` when the log holds no complete cycle
    pub mean_recharge_min: Option<f64>,
    /// Population standard deviation, `None` when the log holds no complete cycle
    pub std_recharge_min: Option<f64>,
    /// Number of detected drops
    pub cycle_count: usize,
}

/// Mean and population variance accumulated in one pass (Welford).
#[derive(Debug, Clone, Copy, Default)]
pub struct RunningStats {
    n: usize,
    mean: f64,
    m2: f64,
}

impl RunningStats {
    pub fn push(&mut self, x: f64) {
        self.n += 1;
        let delta = x - self.mean;
        self.mean += delta / self.n as f64;
        self.m2 += delta * (x - self.mean);
    }

    pub fn count(&self) -> usize {
        self.n
    }

    pub fn mean(&self) -> Option<f64> {
        (self.n > 0).then_some(self.mean)
    }

    pub fn population_std(&self) -> Option<f64> {
        (self.n > 0).then(|| (self.m2 / self.n as f64).max(0.0).sqrt())
    }
}

impl FromIterator<f64> for RunningStats {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut stats = RunningStats::default();
        for x in iter {
            stats.push(x);
        }
        stats
    }
}

pub fn summarize(
    source: impl Into<String>,
    power_level_dbm: Option<i32>,
    drops: &DropEvents,
    segmentation: &CycleSegmentation,
) -> FileSummary {
    let stats: RunningStats = segmentation.recharge_min.iter().copied().collect();
    FileSummary {
        source: source.into(),
        power_level_dbm,
        first_charge_h: segmentation.first_charge_h,
        mean_recharge_min: stats.mean(),
        std_recharge_min: stats.population_std(),
        cycle_count: drops.len(),
    }
}
