use serde::{Deserialize, Serialize};

use crate::batch::BatchSummary;
use crate::signal::MeasurementSeries;

pub const TAB_BLUE: Color = Color(0x1F77B4);
pub const TAB_ORANGE: Color = Color(0xFF7F0E);
const PALETTE: [u32; 6] = [0x1F77B4, 0xFF7F0E, 0x2CA02C, 0xD62728, 0x9467BD, 0x8C564B];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Axis {
    pub label: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Style {
    pub width: f32,
    /// Draw a marker on every point
    pub markers: bool,
    pub color: Color,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color(pub u32);

impl Color {
    pub fn rgb(&self) -> (u8, u8, u8) {
        (
            ((self.0 >> 16) & 0xFF) as u8,
            ((self.0 >> 8) & 0xFF) as u8,
            (self.0 & 0xFF) as u8,
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineSeries {
    pub name: String,
    pub points: Vec<[f64; 2]>,
    pub style: Style,
}

/// Points with a symmetric vertical error, `[x, y, err]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBarSeries {
    pub name: String,
    pub points: Vec<[f64; 3]>,
    pub style: Style,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Series {
    Line(LineSeries),
    ErrorBars(ErrorBarSeries),
}

impl Series {
    /// Every `(x, y)` the series may cover, error extents included.
    pub fn extent_points(&self) -> Vec<[f64; 2]> {
        match self {
            Series::Line(line) => line.points.clone(),
            Series::ErrorBars(bars) => bars
                .points
                .iter()
                .flat_map(|p| [[p[0], p[1] - p[2]], [p[0], p[1] + p[2]]])
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Figure {
    pub title: Option<String>,
    pub x: Axis,
    pub y: Axis,
    pub series: Vec<Series>,
}

impl Figure {
    pub fn new(title: impl Into<Option<String>>) -> Self {
        Self {
            title: title.into(),
            x: Axis { label: None },
            y: Axis { label: None },
            series: Vec::new(),
        }
    }

    pub fn with_axes(mut self, x: &str, y: &str) -> Self {
        self.x.label = Some(x.into());
        self.y.label = Some(y.into());
        self
    }

    pub fn add_series(&mut self, series: Series) {
        self.series.push(series);
    }

    /// `((x_min, x_max), (y_min, y_max))` over all finite points.
    pub fn bounds(&self) -> Option<((f64, f64), (f64, f64))> {
        let mut bounds: Option<((f64, f64), (f64, f64))> = None;
        for p in self.series.iter().flat_map(Series::extent_points) {
            if !(p[0].is_finite() && p[1].is_finite()) {
                continue;
            }
            bounds = Some(match bounds {
                None => ((p[0], p[0]), (p[1], p[1])),
                Some(((x0, x1), (y0, y1))) => {
                    ((x0.min(p[0]), x1.max(p[0])), (y0.min(p[1]), y1.max(p[1])))
                }
            });
        }
        bounds
    }
}

pub trait PlotBackend {
    fn draw(&mut self, fig: &Figure) -> anyhow::Result<()>;
}

pub fn decimate_points(points: &[[f64; 2]], max_points: usize) -> Vec<[f64; 2]> {
    if points.len() <= max_points || max_points == 0 {
        return points.to_vec();
    }
    let bucket_size = points.len() as f64 / max_points as f64;
    (0..max_points)
        .map(|i| (i as f64 * bucket_size).floor() as usize)
        .take_while(|&start| start < points.len())
        .map(|start| points[start])
        .collect()
}

/// Voltage against elapsed hours, one line per log.
pub fn figure_from_series(
    title: &str,
    logs: &[(String, MeasurementSeries)],
    max_points: usize,
) -> Figure {
    let mut fig = Figure::new(Some(title.to_string())).with_axes("Time (hour)", "Voltage (V)");
    for (i, (name, series)) in logs.iter().enumerate() {
        let points: Vec<[f64; 2]> = series
            .elapsed_h
            .iter()
            .zip(series.voltage.iter())
            .map(|(&t, &v)| [t, v])
            .collect();
        fig.add_series(Series::Line(LineSeries {
            name: name.clone(),
            points: decimate_points(&points, max_points),
            style: Style {
                width: 1.4,
                markers: false,
                color: Color(PALETTE[i % PALETTE.len()]),
            },
        }));
    }
    fig
}

/// First-charge time against transmit power; rows without power are left out.
pub fn figure_first_charge(summary: &BatchSummary) -> Figure {
    let points = summary
        .rows
        .iter()
        .filter_map(|r| Some([r.power_level_dbm? as f64, r.first_charge_h?]))
        .collect();
    let mut fig = Figure::new(Some(format!(
        "Temps de première charge vs puissance d'émission ({})",
        summary.label
    )))
    .with_axes("Puissance d'émission (dBm)", "Temps de première charge (h)");
    fig.add_series(Series::Line(LineSeries {
        name: "Temps de charge (h)".into(),
        points,
        style: Style {
            width: 2.0,
            markers: true,
            color: TAB_ORANGE,
        },
    }));
    fig
}

/// Mean recharge time against transmit power, standard deviation as error bars.
pub fn figure_mean_recharge(summary: &BatchSummary) -> Figure {
    let points = summary
        .rows
        .iter()
        .filter_map(|r| {
            Some([
                r.power_level_dbm? as f64,
                r.mean_recharge_min?,
                r.std_recharge_min.unwrap_or(0.0),
            ])
        })
        .collect();
    let mut fig = Figure::new(Some(format!(
        "Temps de recharge moyen vs puissance d'émission ({})",
        summary.label
    )))
    .with_axes("Puissance d'émission (dBm)", "Temps de recharge moyen (min)");
    fig.add_series(Series::ErrorBars(ErrorBarSeries {
        name: "Temps de recharge (min)".into(),
        points,
        style: Style {
            width: 2.0,
            markers: true,
            color: TAB_BLUE,
        },
    }));
    fig
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::recharge::FileSummary;

    fn row(power: Option<i32>, mean: Option<f64>) -> FileSummary {
        FileSummary {
            source: "r.csv".into(),
            power_level_dbm: power,
            first_charge_h: Some(1.0),
            mean_recharge_min: mean,
            std_recharge_min: mean.map(|_| 0.5),
            cycle_count: 3,
        }
    }

    #[test]
    fn power_plots_skip_incomplete_rows() {
        let summary = BatchSummary::from_rows(
            "Rectenna unitaire",
            vec![row(Some(10), Some(4.0)), row(None, Some(2.0)), row(Some(12), None)],
        );
        let first = figure_first_charge(&summary);
        match &first.series[0] {
            Series::Line(line) => assert_eq!(line.points, vec![[10.0, 1.0], [12.0, 1.0]]),
            other => panic!("unexpected series {:?}", other),
        }
        let mean = figure_mean_recharge(&summary);
        match &mean.series[0] {
            Series::ErrorBars(bars) => assert_eq!(bars.points, vec![[10.0, 4.0, 0.5]]),
            other => panic!("unexpected series {:?}", other),
        }
        assert!(mean.title.unwrap().contains("Rectenna unitaire"));
    }

    #[test]
    fn bounds_include_error_extents() {
        let mut fig = Figure::new(Some("bounds".to_string()));
        fig.add_series(Series::ErrorBars(ErrorBarSeries {
            name: "e".into(),
            points: vec![[1.0, 5.0, 2.0], [3.0, 4.0, 0.5]],
            style: Style {
                width: 1.0,
                markers: false,
                color: TAB_BLUE,
            },
        }));
        assert_eq!(fig.bounds(), Some(((1.0, 3.0), (3.0, 7.0))));
        assert_eq!(Figure::new(Some("empty".to_string())).bounds(), None);
    }

    #[test]
    fn raw_figure_has_one_line_per_log() {
        let logs = vec![
            (
                "a".to_string(),
                MeasurementSeries::uniform(1.0, None, vec![1.0; 5000]),
            ),
            (
                "b".to_string(),
                MeasurementSeries::uniform(1.0, None, vec![2.0; 10]),
            ),
        ];
        let fig = figure_from_series("raw", &logs, 1000);
        assert_eq!(fig.series.len(), 2);
        match &fig.series[0] {
            Series::Line(line) => assert_eq!(line.points.len(), 1000),
            other => panic!("unexpected series {:?}", other),
        }
    }

    #[test]
    fn color_channels() {
        assert_eq!(TAB_ORANGE.rgb(), (0xFF, 0x7F, 0x0E));
    }
}
