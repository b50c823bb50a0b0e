//! Plotters-powered national trend chart widget for Ratatui.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use chrono::NaiveDate;
use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::domain::NationalSeries;

/// A lightweight, render-only chart description.
///
/// All series and bounds are computed outside the render call.
pub struct TrendPlottersChart<'a> {
    /// Contiguous runs of defined points; an undefined date splits the line.
    pub segments: &'a [Vec<(f64, f64)>],
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub x_label: &'a str,
    pub y_label: &'a str,
    pub fmt_x: &'a dyn Fn(f64) -> String,
    pub fmt_y: &'a dyn Fn(f64) -> String,
}

impl Widget for TrendPlottersChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to build a chart in a tiny area.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 9)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc(self.y_label)
                .x_labels(6)
                .y_labels(5)
                .x_label_formatter(&|v| (self.fmt_x)(*v))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            let line_color = RGBColor(0, 255, 255); // cyan
            for segment in self.segments {
                if segment.len() > 1 {
                    chart.draw_series(LineSeries::new(segment.iter().copied(), &line_color))?;
                }
                // Isolated points would be invisible as a line.
                chart.draw_series(segment.iter().map(|&(x, y)| Pixel::new((x, y), WHITE)))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}

/// Chart-ready national series.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendSeries {
    /// Date at x = 0; x is measured in days from here.
    pub origin: NaiveDate,
    pub segments: Vec<Vec<(f64, f64)>>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

/// Convert the national series to chart coordinates, or `None` when no point is defined.
pub fn trend_series(series: &NationalSeries) -> Option<TrendSeries> {
    let (origin, _) = series.defined().next()?;

    let mut segments: Vec<Vec<(f64, f64)>> = Vec::new();
    let mut current = Vec::new();
    for p in &series.points {
        match p.mean_price {
            Some(v) => current.push(((p.date - origin).num_days() as f64, v)),
            None if !current.is_empty() => segments.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }

    let (mut x_max, mut y_min, mut y_max) = (0.0_f64, f64::INFINITY, f64::NEG_INFINITY);
    for &(x, y) in segments.iter().flatten() {
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if y_max <= y_min {
        y_min -= 1.0;
        y_max += 1.0;
    }
    let pad = ((y_max - y_min) * 0.05).max(1e-9);

    Some(TrendSeries {
        origin,
        segments,
        x_bounds: [0.0, x_max.max(1.0)],
        y_bounds: [y_min - pad, y_max + pad],
    })
}
