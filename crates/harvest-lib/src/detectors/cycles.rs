use crate::signal::{DropEvents, MeasurementSeries};
use serde::{Deserialize, Serialize};

const MINUTES_PER_HOUR: f64 = 60.0;

/// One recharge interval between two consecutive drops.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cycle {
    /// Sample index of the drop that opens the cycle
    pub start: usize,
    /// Sample index of the next drop (excluded from the cycle)
    pub end: usize,
    /// Absolute index of the first sample reaching the cycle's peak voltage
    pub peak_index: usize,
    /// Time from the opening drop to the peak, in minutes
    pub recharge_min: f64,
}

/// Outcome of splitting one log into charge/recharge cycles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CycleSegmentation {
    /// Elapsed time at the first drop; `None` when no drop was found
    pub first_charge_h: Option<f64>,
    pub recharge_min: Vec<f64>,
}

/// Locate the recharge peak of every complete cycle.
///
/// Pairs of adjacent drops with no sample in between yield no cycle, and the
/// samples after the last drop are never a cycle.
pub fn find_cycles(series: &MeasurementSeries, drops: &DropEvents) -> Vec<Cycle> {
    let mut cycles = Vec::with_capacity(drops.len().saturating_sub(1));
    for w in drops.indices.windows(2) {
        let (start, end) = (w[0], w[1]);
        let first = start + 1;
        if first >= end || end > series.len() {
            continue;
        }
        let Some(offset) = first_argmax(&series.voltage[first..end]) else {
            continue;
        };
        let peak_index = first + offset;
        let recharge_min = (series.elapsed_h[peak_index] - series.elapsed_h[start]) * MINUTES_PER_HOUR;
        cycles.push(Cycle {
            start,
            end,
            peak_index,
            recharge_min,
        });
    }
    cycles
}

pub fn segment_cycles(series: &MeasurementSeries, drops: &DropEvents) -> CycleSegmentation {
    let Some(first) = drops.first() else {
        return CycleSegmentation::default();
    };
    let recharge_min = find_cycles(series, drops)
        .into_iter()
        .map(|c| c.recharge_min)
        .collect();
    CycleSegmentation {
        first_charge_h: series.elapsed_h.get(first).copied(),
        recharge_min,
    }
}

fn first_argmax(data: &[f64]) -> Option<usize> {
    let mut iter = data.iter().enumerate();
    let (mut best_idx, mut best) = iter.next().map(|(i, &v)| (i, v))?;
    for (i, &v) in iter {
        if v > best {
            best = v;
            best_idx = i;
        }
    }
    Some(best_idx)
}
