use anyhow::{anyhow, Result};
use harvest_lib::plot::{self, Figure, PlotBackend, Series};
use plotters::prelude::*;
use std::path::PathBuf;

/// Renders figures to a PNG file through plotters' bitmap backend.
pub struct PngBackend {
    path: PathBuf,
    size: (u32, u32),
}

impl PngBackend {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            size: (800, 500),
        }
    }
}

impl PlotBackend for PngBackend {
    fn draw(&mut self, fig: &Figure) -> Result<()> {
        let ((x_min, x_max), (y_min, y_max)) = fig
            .bounds()
            .ok_or_else(|| anyhow!("figure has no finite point"))?;
        let (x_min, x_max) = padded(x_min, x_max);
        let (y_min, y_max) = padded(y_min, y_max);

        let root = BitMapBackend::new(&self.path, self.size).into_drawing_area();
        root.fill(&WHITE)?;
        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .caption(
                fig.title.clone().unwrap_or_else(|| "Plot".into()),
                ("sans-serif", 20),
            )
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)?;
        chart
            .configure_mesh()
            .x_desc(fig.x.label.clone().unwrap_or_default())
            .y_desc(fig.y.label.clone().unwrap_or_default())
            .draw()?;

        for series in &fig.series {
            match series {
                Series::Line(line) => {
                    let color = rgb(line.style.color);
                    let points: Vec<(f64, f64)> = line.points.iter().map(|p| (p[0], p[1])).collect();
                    chart
                        .draw_series(LineSeries::new(
                            points.iter().copied(),
                            color.stroke_width(stroke(line.style.width)),
                        ))?
                        .label(line.name.clone())
                        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
                    if line.style.markers {
                        chart.draw_series(
                            points.iter().map(|&p| Circle::new(p, 4, color.filled())),
                        )?;
                    }
                }
                Series::ErrorBars(bars) => {
                    let color = rgb(bars.style.color);
                    chart.draw_series(bars.points.iter().map(|p| {
                        PathElement::new(
                            vec![(p[0], p[1] - p[2]), (p[0], p[1] + p[2])],
                            BLACK.stroke_width(2),
                        )
                    }))?;
                    chart
                        .draw_series(LineSeries::new(
                            bars.points.iter().map(|p| (p[0], p[1])),
                            color.stroke_width(stroke(bars.style.width)),
                        ))?
                        .label(bars.name.clone())
                        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
                    if bars.style.markers {
                        chart.draw_series(
                            bars.points
                                .iter()
                                .map(|p| Circle::new((p[0], p[1]), 4, color.filled())),
                        )?;
                    }
                }
            }
        }
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
        root.present()?;
        Ok(())
    }
}

fn rgb(color: plot::Color) -> RGBColor {
    let (r, g, b) = color.rgb();
    RGBColor(r, g, b)
}

fn stroke(width: f32) -> u32 {
    width.round().max(1.0) as u32
}

/// Widen a range by 5% on both sides; a degenerate range gets a unit margin.
fn padded(lo: f64, hi: f64) -> (f64, f64) {
    let span = hi - lo;
    if span.abs() < 1e-12 {
        (lo - 1.0, hi + 1.0)
    } else {
        (lo - span * 0.05, hi + span * 0.05)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padding_never_collapses() {
        assert_eq!(padded(2.0, 2.0), (1.0, 3.0));
        let (lo, hi) = padded(0.0, 10.0);
        assert!((lo + 0.5).abs() < 1e-12 && (hi - 10.5).abs() < 1e-12);
    }
}
