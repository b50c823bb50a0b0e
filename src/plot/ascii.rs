//! ASCII/Unicode plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - national mean series: `o` points joined by `-` lines
//! - bar charts: `#` bars, one row per label

use chrono::NaiveDate;

use crate::domain::NationalSeries;

/// Render the national mean price series. Undefined points leave a gap in the line.
pub fn render_national_plot(series: &NationalSeries, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let defined: Vec<(NaiveDate, f64)> = series.defined().collect();
    let Some(&(first, _)) = defined.first() else {
        return "Plot: no national prices for this commodity.\n".to_string();
    };
    let last = defined.last().map_or(first, |&(d, _)| d);

    let x_of = |d: NaiveDate| (d - first).num_days() as f64;
    let (x_min, x_max) = (0.0, x_of(last).max(1.0));
    let (y_min, y_max) = y_range(&defined).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Lines first so points overlay them; a missing day breaks the line.
    let mut prev: Option<(usize, usize)> = None;
    for p in &series.points {
        let Some(v) = p.mean_price else {
            prev = None;
            continue;
        };
        if p.date < first {
            continue;
        }
        let cell = (
            map_x(x_of(p.date), x_min, x_max, width),
            map_y(v, y_min, y_max, height),
        );
        if let Some((x0, y0)) = prev {
            draw_line(&mut grid, x0, y0, cell.0, cell.1, '-');
        }
        prev = Some(cell);
    }
    for &(d, v) in &defined {
        let x = map_x(x_of(d), x_min, x_max, width);
        let y = map_y(v, y_min, y_max, height);
        grid[y][x] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: date=[{first}, {last}] | price=[{y_min:.2}, {y_max:.2}]\n"
    ));

    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }

    out
}

/// Horizontal bar chart scaled so the largest value spans `width` cells.
pub fn render_bar_chart(items: &[(String, f64)], width: usize) -> String {
    let width = width.max(1);
    let label_width = items.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
    let max = items
        .iter()
        .map(|&(_, v)| v)
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);

    let mut out = String::new();
    for (label, value) in items {
        let len = if max > 0.0 && value.is_finite() && *value > 0.0 {
            ((value / max) * width as f64).round() as usize
        } else {
            0
        };
        out.push_str(&format!(
            "{label:<label_width$} |{} {value:.0}\n",
            "#".repeat(len.min(width))
        ));
    }
    out
}

fn y_range(points: &[(NaiveDate, f64)]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for &(_, y) in points {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }
    if !(min_y.is_finite() && max_y.is_finite()) {
        return None;
    }
    if max_y > min_y {
        Some((min_y, max_y))
    } else {
        // Flat series: center it.
        Some((min_y - 1.0, max_y + 1.0))
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NationalPoint;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn national_plot_golden_snapshot_small() {
        let series = NationalSeries {
            points: vec![
                NationalPoint { date: day(1), mean_price: Some(100.0) },
                NationalPoint { date: day(10), mean_price: Some(110.0) },
            ],
        };

        let txt = render_national_plot(&series, 10, 5);
        let expected = concat!(
            "Plot: date=[2024-01-01, 2024-01-10] | price=[99.50, 110.50]\n",
            "        -o\n",
            "      --\n",
            "    --\n",
            "  --\n",
            "o-\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn undefined_points_break_the_line() {
        let series = NationalSeries {
            points: vec![
                NationalPoint { date: day(1), mean_price: Some(100.0) },
                NationalPoint { date: day(2), mean_price: None },
                NationalPoint { date: day(3), mean_price: Some(100.0) },
            ],
        };
        let txt = render_national_plot(&series, 11, 5);
        let body: Vec<&str> = txt.lines().skip(1).collect();
        assert!(body.iter().all(|l| !l.contains('-')), "{txt}");
        assert_eq!(body.iter().map(|l| l.matches('o').count()).sum::<usize>(), 2);
    }

    #[test]
    fn empty_series_has_message() {
        let txt = render_national_plot(&NationalSeries::default(), 20, 5);
        assert!(txt.contains("no national prices"));
    }

    #[test]
    fn bar_chart_scales_to_largest() {
        let items = vec![("today".to_string(), 50.0), ("tomorrow".to_string(), 100.0)];
        let txt = render_bar_chart(&items, 10);
        assert_eq!(txt, "today    |##### 50\ntomorrow |########## 100\n");
    }
}
