//! Choropleth map on a Ratatui canvas.
//!
//! The canvas has no polygon fill, so filled regions are painted with
//! horizontal scanlines (even-odd rule over all of a region's rings) and then
//! outlined.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Block, Borders, Paragraph,
        canvas::{Canvas, Line as CanvasLine},
    },
};

use crate::app::pipeline::MapRun;
use crate::map::regions::{Ring, bounds_of};
use crate::map::style::{NO_DATA_COLOR, PALETTE, price_range, region_style};
use crate::report::format_rupiah;

pub(super) fn render_choropleth(frame: &mut Frame<'_>, area: Rect, run: &MapRun, title: String) {
    let block = Block::default().title(title).borders(Borders::ALL);

    let rings: Vec<Vec<Ring>> = run.regions.iter().map(|r| r.region.rings()).collect();
    let Some([x_min, y_min, x_max, y_max]) = bounds_of(rings.iter().flatten()) else {
        let msg = Paragraph::new("No polygon geometry in the boundary file.")
            .style(Style::default().fg(Color::Yellow))
            .block(block);
        frame.render_widget(msg, area);
        return;
    };

    let range = price_range(&run.aggregates);
    // Braille cells are 4 dots tall.
    let rows = usize::from(area.height.saturating_sub(2)) * 4;
    let step = (y_max - y_min) / rows.max(1) as f64;

    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds([x_min, x_max])
        .y_bounds([y_min, y_max])
        .paint(|ctx| {
            for (region, region_rings) in run.regions.iter().zip(&rings) {
                let style = region_style(region.price, range);
                if style.filled {
                    for i in 0..rows {
                        let y = y_min + (i as f64 + 0.5) * step;
                        for (xa, xb) in scanline_segments(region_rings, y) {
                            ctx.draw(&CanvasLine::new(xa, y, xb, y, style.color));
                        }
                    }
                }
                for ring in region_rings {
                    for w in ring.windows(2) {
                        ctx.draw(&CanvasLine::new(w[0].0, w[0].1, w[1].0, w[1].1, style.color));
                    }
                }
            }
        });

    frame.render_widget(canvas, area);
}

/// Palette swatches with their price ranges, plus the no-data swatch.
pub(super) fn legend(run: &MapRun) -> Line<'static> {
    let mut spans = Vec::new();
    if let Some((lo, hi)) = price_range(&run.aggregates) {
        let width = (hi - lo) / PALETTE.len() as f64;
        for (i, color) in PALETTE.iter().enumerate() {
            spans.push(Span::styled("■ ", Style::default().fg(*color)));
            let from = lo + width * i as f64;
            spans.push(Span::raw(format!("{}  ", short_rupiah(from))));
        }
        spans.push(Span::raw(format!("(max {})  ", format_rupiah(hi))));
    }
    spans.push(Span::styled("□ ", Style::default().fg(NO_DATA_COLOR)));
    spans.push(Span::raw(crate::domain::NO_DATA_LABEL));
    Line::from(spans)
}

/// X-intervals of `y` inside the region (even-odd rule). Open rings are closed implicitly.
pub(super) fn scanline_segments(rings: &[Ring], y: f64) -> Vec<(f64, f64)> {
    let mut xs = Vec::new();
    for ring in rings {
        let n = ring.len();
        for i in 0..n {
            let (x0, y0) = ring[i];
            let (x1, y1) = ring[(i + 1) % n];
            // Half-open test so a vertex on the scanline is counted once.
            if (y0 <= y && y < y1) || (y1 <= y && y < y0) {
                xs.push(x0 + (y - y0) / (y1 - y0) * (x1 - x0));
            }
        }
    }
    xs.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    xs.chunks_exact(2).map(|p| (p[0], p[1])).collect()
}

fn short_rupiah(v: f64) -> String {
    if v >= 1_000.0 {
        format!("{:.1}k", v / 1_000.0)
    } else {
        format!("{v:.0}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: f64, y0: f64, side: f64) -> Ring {
        vec![(x0, y0), (x0 + side, y0), (x0 + side, y0 + side), (x0, y0 + side), (x0, y0)]
    }

    #[test]
    fn scanline_through_square() {
        assert_eq!(scanline_segments(&[square(0.0, 0.0, 2.0)], 1.0), vec![(0.0, 2.0)]);
        assert!(scanline_segments(&[square(0.0, 0.0, 2.0)], 3.0).is_empty());
    }

    #[test]
    fn hole_splits_the_scanline() {
        let rings = vec![square(0.0, 0.0, 4.0), square(1.0, 1.0, 2.0)];
        assert_eq!(scanline_segments(&rings, 2.0), vec![(0.0, 1.0), (3.0, 4.0)]);
    }

    #[test]
    fn open_ring_is_closed_implicitly() {
        let triangle = vec![(0.0, 0.0), (4.0, 0.0), (0.0, 4.0)];
        assert_eq!(scanline_segments(&[triangle], 2.0), vec![(0.0, 2.0)]);
    }
}
