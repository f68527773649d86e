use crate::signal::{DropEvents, MeasurementSeries};

/// Single-step decrease (volts) above which a sample is treated as a discharge onset.
pub const DEFAULT_DROP_THRESHOLD_V: f64 = 0.3;

/// Report every `i` with `voltage[i + 1] - voltage[i] < -threshold`, ascending.
///
/// Input is expected to be finite; a step involving NaN never counts as a drop.
pub fn detect_drops(voltage: &[f64], threshold: f64) -> DropEvents {
    let indices = voltage
        .windows(2)
        .enumerate()
        .filter(|(_, w)| w[1] - w[0] < -threshold)
        .map(|(i, _)| i)
        .collect();
    DropEvents::from_indices(indices)
}

pub fn detect_series_drops(series: &MeasurementSeries, threshold: f64) -> DropEvents {
    detect_drops(&series.voltage, threshold)
}

/// Position of the largest single-step decrease (first one on ties).
pub fn steepest_drop(voltage: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, w) in voltage.windows(2).enumerate() {
        let step = w[1] - w[0];
        match best {
            Some((_, min)) if step >= min => {}
            _ => best = Some((i, step)),
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_series_have_no_drops() {
        assert!(detect_drops(&[], 0.3).is_empty());
        assert!(detect_drops(&[4.2], 0.3).is_empty());
    }

    #[test]
    fn finds_sharp_single_step_decreases() {
        let voltage = [5.0, 4.9, 4.5, 1.0, 2.0, 3.8, 1.0];
        let drops = detect_drops(&voltage, DEFAULT_DROP_THRESHOLD_V);
        assert_eq!(drops.indices, vec![1, 2, 5]);
        let drops = detect_drops(&voltage, 0.5);
        assert_eq!(drops.indices, vec![2, 5]);
    }

    #[test]
    fn gradual_decay_is_not_a_drop() {
        let voltage: Vec<f64> = (0..50).map(|i| 5.0 - 0.1 * i as f64).collect();
        assert!(detect_drops(&voltage, 0.3).is_empty());
    }

    #[test]
    fn threshold_is_strict() {
        let drops = detect_drops(&[1.0, 0.5, 0.0], 0.5);
        assert!(drops.is_empty());
        let drops = detect_drops(&[1.0, 0.5, 0.0], 0.49);
        assert_eq!(drops.indices, vec![0, 1]);
    }

    #[test]
    fn detector_partitions_indices_by_predicate() {
        let voltage = [
            3.1, 3.3, 2.2, 2.25, 2.9, 3.4, 0.4, 0.9, 1.8, 1.2, 1.19, 3.0, 2.6, 2.0,
        ];
        for &threshold in &[0.0, 0.05, 0.3, 0.5, 1.0, 3.0] {
            let drops = detect_drops(&voltage, threshold);
            for i in 0..voltage.len() - 1 {
                let is_drop = voltage[i + 1] - voltage[i] < -threshold;
                assert_eq!(
                    drops.indices.contains(&i),
                    is_drop,
                    "index {} at threshold {}",
                    i,
                    threshold
                );
            }
            assert!(drops.indices.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn steepest_drop_prefers_first_on_ties() {
        assert_eq!(steepest_drop(&[3.0, 1.0, 2.0, 0.0]), Some(0));
        assert_eq!(steepest_drop(&[1.0, 1.5, 0.2, 0.1]), Some(1));
        assert_eq!(steepest_drop(&[1.0]), None);
    }
}
