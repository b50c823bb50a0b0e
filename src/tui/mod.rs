//! Ratatui-based terminal UI.
//!
//! Three screens:
//! - welcome: what the dashboard does and how to drive it
//! - map: commodity + min/max selectors, choropleth, per-province bars, national trend
//! - predict: province/city/market/commodity/date selectors and the day-over-day result
//!
//! Artifacts load the first time a screen needs them. Failures are shown in the
//! status line; the next action that needs the artifact tries again.

use std::io;
use std::time::Duration;

use chrono::Local;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, List, ListItem, ListState, Paragraph, Tabs, Wrap},
};

use crate::app::context::AppContext;
use crate::app::pipeline::{self, MapRun, PredictionRun};
use crate::domain::{AggregationMethod, Field, RegionPrice, Selection};
use crate::error::AppError;
use crate::map::style::{price_range, region_style};
use crate::report::format_rupiah;

mod choropleth;
mod plotters_chart;

use plotters_chart::{TrendPlottersChart, trend_series};

/// Start the TUI.
pub fn run(ctx: AppContext) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    tracing::info!(?ctx, "starting tui");
    let mut app = App::new(ctx);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Welcome,
    Map,
    Predict,
}

impl Screen {
    const ALL: [Screen; 3] = [Screen::Welcome, Screen::Map, Screen::Predict];

    fn title(self) -> &'static str {
        match self {
            Screen::Welcome => "1 Welcome",
            Screen::Map => "2 Map",
            Screen::Predict => "3 Predict",
        }
    }

    fn index(self) -> usize {
        match self {
            Screen::Welcome => 0,
            Screen::Map => 1,
            Screen::Predict => 2,
        }
    }

    fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Rows of the prediction settings list: the four fields, then the date.
const PREDICT_ROWS: usize = Field::ALL.len() + 1;
const DATE_ROW: usize = Field::ALL.len();

struct App {
    ctx: AppContext,
    screen: Screen,
    status: String,

    commodities: Vec<String>,
    commodity_idx: usize,
    method: AggregationMethod,
    map_field: usize,
    map_run: Option<MapRun>,

    labels: Option<[Vec<String>; 4]>,
    choices: [usize; 4],
    predict_field: usize,
    date_input: String,
    editing_date: bool,
    prediction: Option<PredictionRun>,
}

impl App {
    fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            screen: Screen::Welcome,
            status: "Tab to switch screens.".to_string(),
            commodities: Vec::new(),
            commodity_idx: 0,
            method: AggregationMethod::Min,
            map_field: 0,
            map_run: None,
            labels: None,
            choices: [0; 4],
            predict_field: 0,
            date_input: Local::now().date_naive().format("%Y-%m-%d").to_string(),
            editing_date: false,
            prediction: None,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.editing_date {
            self.handle_date_edit(code);
            return false;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Tab => self.switch_screen(self.screen.next()),
            KeyCode::BackTab => self.switch_screen(self.screen.prev()),
            KeyCode::Char('1') => self.switch_screen(Screen::Welcome),
            KeyCode::Char('2') => self.switch_screen(Screen::Map),
            KeyCode::Char('3') => self.switch_screen(Screen::Predict),
            _ => match self.screen {
                Screen::Welcome => {}
                Screen::Map => self.handle_map_key(code),
                Screen::Predict => self.handle_predict_key(code),
            },
        }
        false
    }

    fn switch_screen(&mut self, screen: Screen) {
        self.screen = screen;
        match screen {
            Screen::Welcome => {}
            Screen::Map if self.map_run.is_none() => self.refresh_map(),
            Screen::Predict if self.labels.is_none() => self.load_labels(),
            _ => {}
        }
    }

    fn handle_map_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up => self.map_field = self.map_field.saturating_sub(1),
            KeyCode::Down => self.map_field = (self.map_field + 1).min(1),
            KeyCode::Left => self.adjust_map_field(-1),
            KeyCode::Right => self.adjust_map_field(1),
            KeyCode::Char('m') => {
                self.method = self.method.toggle();
                self.refresh_map();
            }
            KeyCode::Char('r') => self.refresh_map(),
            _ => {}
        }
    }

    fn adjust_map_field(&mut self, delta: isize) {
        match self.map_field {
            0 => {
                if self.commodities.is_empty() {
                    self.refresh_map();
                    return;
                }
                self.commodity_idx = cycle(self.commodity_idx, self.commodities.len(), delta);
            }
            _ => self.method = self.method.toggle(),
        }
        self.refresh_map();
    }

    fn refresh_map(&mut self) {
        if self.commodities.is_empty() {
            match self.table_commodities() {
                Ok(list) => self.commodities = list,
                Err(err) => return self.fail(err),
            }
        }
        match self.compute_map() {
            Ok(run) => {
                self.status = format!(
                    "{} | {} | {} of {} regions with data",
                    run.commodity,
                    run.method.display_name(),
                    run.covered(),
                    run.regions.len()
                );
                self.map_run = Some(run);
            }
            Err(err) => self.fail(err),
        }
    }

    fn table_commodities(&self) -> Result<Vec<String>, AppError> {
        let commodities = self.ctx.table()?.commodities();
        if commodities.is_empty() {
            return Err(AppError::new(2, "Price table has no rows."));
        }
        Ok(commodities)
    }

    fn compute_map(&self) -> Result<MapRun, AppError> {
        let commodity = self
            .commodities
            .get(self.commodity_idx)
            .ok_or_else(|| AppError::new(2, "No commodity selected."))?;
        let table = self.ctx.table()?;
        let regions = self.ctx.regions()?;
        Ok(pipeline::run_map(
            table,
            regions,
            commodity,
            self.method,
            &self.ctx.paths().geo_key,
        ))
    }

    fn handle_predict_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up => self.predict_field = self.predict_field.saturating_sub(1),
            KeyCode::Down => self.predict_field = (self.predict_field + 1).min(PREDICT_ROWS - 1),
            KeyCode::Left => self.adjust_choice(-1),
            KeyCode::Right => self.adjust_choice(1),
            KeyCode::PageUp => self.adjust_choice(-10),
            KeyCode::PageDown => self.adjust_choice(10),
            KeyCode::Enter if self.predict_field == DATE_ROW => {
                self.editing_date = true;
                self.status = "Editing date (YYYY-MM-DD). Enter to apply, Esc to cancel.".to_string();
            }
            KeyCode::Enter | KeyCode::Char('p') => self.predict(),
            _ => {}
        }
    }

    fn handle_date_edit(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.editing_date = false;
                self.status = "Date edit canceled.".to_string();
            }
            KeyCode::Enter => {
                self.editing_date = false;
                self.predict();
            }
            KeyCode::Backspace => {
                self.date_input.pop();
            }
            KeyCode::Char(c) => {
                if c.is_ascii_digit() || c == '-' || c == '/' {
                    self.date_input.push(c);
                }
            }
            _ => {}
        }
    }

    fn adjust_choice(&mut self, delta: isize) {
        let Some(labels) = &self.labels else {
            self.load_labels();
            return;
        };
        if self.predict_field >= DATE_ROW {
            return;
        }
        let field = self.predict_field;
        let len = labels[field].len();
        if len > 0 {
            self.choices[field] = cycle(self.choices[field], len, delta);
        }
    }

    fn load_labels(&mut self) {
        match self.registry_labels() {
            Ok(labels) => {
                self.status = format!(
                    "Loaded encoders: {} provinces, {} commodities.",
                    labels[0].len(),
                    labels[3].len()
                );
                self.labels = Some(labels);
            }
            Err(err) => self.fail(err),
        }
    }

    fn registry_labels(&self) -> Result<[Vec<String>; 4], AppError> {
        let registry = self.ctx.registry()?;
        Ok(Field::ALL.map(|f| registry.labels(f).to_vec()))
    }

    fn predict(&mut self) {
        if self.labels.is_none() {
            self.load_labels();
            if self.labels.is_none() {
                return;
            }
        }
        match self.compute_prediction() {
            Ok(run) => {
                self.status = format!(
                    "{} {} -> {}",
                    run.trend.direction.arrow(),
                    format_rupiah(run.today.price),
                    format_rupiah(run.tomorrow.price)
                );
                self.prediction = Some(run);
            }
            Err(err) => self.fail(err),
        }
    }

    fn selection(&self) -> Result<Selection, AppError> {
        let labels = self
            .labels
            .as_ref()
            .ok_or_else(|| AppError::new(3, "Encoder labels are not loaded."))?;
        let pick = |i: usize| {
            labels[i]
                .get(self.choices[i])
                .cloned()
                .ok_or_else(|| AppError::new(2, format!("No {} labels available.", Field::ALL[i].display_name())))
        };
        Ok(Selection {
            province: pick(0)?,
            city: pick(1)?,
            market: pick(2)?,
            commodity: pick(3)?,
            date: crate::predict::parse_query_date(&self.date_input)?,
        })
    }

    fn compute_prediction(&self) -> Result<PredictionRun, AppError> {
        let selection = self.selection()?;
        let registry = self.ctx.registry()?;
        let predictor = self.ctx.predictor()?;
        Ok(pipeline::predict_day_over_day(registry, predictor, &selection)?)
    }

    fn fail(&mut self, err: AppError) {
        tracing::error!(%err, "action failed");
        self.status = format!("Error: {err}");
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        match self.screen {
            Screen::Welcome => self.draw_welcome(frame, chunks[1]),
            Screen::Map => self.draw_map(frame, chunks[1]),
            Screen::Predict => self.draw_predict(frame, chunks[1]),
        }
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let tabs = Tabs::new(Screen::ALL.map(Screen::title))
            .select(self.screen.index())
            .block(Block::default().title(" pangan ").borders(Borders::ALL))
            .style(Style::default().fg(Color::Gray))
            .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
        frame.render_widget(tabs, area);
    }

    fn draw_welcome(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let heading = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
        let lines = vec![
            Line::from(Span::styled("Commodity price dashboard", heading)),
            Line::from(""),
            Line::from("Map: pick a commodity and whether each province shows its lowest or highest price"),
            Line::from("on the most recent date. Provinces are shaded by price, regions without data are"),
            Line::from("outlined only. The national mean price over time is plotted below the map."),
            Line::from(""),
            Line::from("Predict: pick a province, city, market and commodity plus a date. The model"),
            Line::from("predicts that day's price and the next day's, and says whether it goes up, down"),
            Line::from("or stays stable."),
            Line::from(""),
            Line::from(Span::styled("Keys", heading)),
            Line::from("Tab / Shift-Tab or 1-3  switch screens"),
            Line::from("↑/↓ select  ←/→ change  PgUp/PgDn jump  m toggle min/max  p predict  q quit"),
        ];
        let p = Paragraph::new(Text::from(lines))
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_map(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
            .split(area);
        let top = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(rows[0]);
        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(top[0]);
        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0)])
            .split(top[1]);

        self.draw_map_settings(frame, right[0]);

        let Some(run) = &self.map_run else {
            let msg = Paragraph::new("No map data loaded (r to retry).")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(msg, left[0]);
            frame.render_widget(Block::default().borders(Borders::ALL), rows[1]);
            return;
        };

        let date = run
            .latest_date
            .map(|d| d.format("%d/%m/%Y").to_string())
            .unwrap_or_else(|| "-".to_string());
        choropleth::render_choropleth(
            frame,
            left[0],
            run,
            format!(" {} per province - {date} ", run.commodity),
        );
        frame.render_widget(Paragraph::new(choropleth::legend(run)), left[1]);

        self.draw_province_bars(frame, right[1], run);
        self.draw_national(frame, rows[1], run);
    }

    fn draw_map_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let commodity = self
            .commodities
            .get(self.commodity_idx)
            .map(String::as_str)
            .unwrap_or("-");
        let items = vec![
            ListItem::new(format!("Commodity: ‹ {commodity} ›")),
            ListItem::new(format!("Method: ‹ {} ›", self.method.display_name())),
        ];
        let list = List::new(items)
            .block(Block::default().title("Settings").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.map_field));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_province_bars(&self, frame: &mut ratatui::Frame<'_>, area: Rect, run: &MapRun) {
        let block = Block::default()
            .title(format!("{} by province", run.method.display_name()))
            .borders(Borders::ALL);
        if run.aggregates.is_empty() {
            let msg = Paragraph::new(crate::domain::NO_DATA_LABEL)
                .style(Style::default().fg(Color::Yellow))
                .block(block);
            frame.render_widget(msg, area);
            return;
        }

        let range = price_range(&run.aggregates);
        let bars: Vec<Bar> = run
            .aggregates
            .iter()
            .map(|a| {
                let color = region_style(RegionPrice::Available(a.price), range).color;
                Bar::default()
                    .label(Line::from(a.province.clone()))
                    .value(a.price.max(0.0).round() as u64)
                    .text_value(format_rupiah(a.price))
                    .style(Style::default().fg(color))
            })
            .collect();

        let chart = BarChart::default()
            .block(block)
            .direction(Direction::Horizontal)
            .bar_width(1)
            .bar_gap(0)
            .data(BarGroup::default().bars(&bars));
        frame.render_widget(chart, area);
    }

    fn draw_national(&self, frame: &mut ratatui::Frame<'_>, area: Rect, run: &MapRun) {
        let block = Block::default()
            .title(format!("National mean price - {}", run.commodity))
            .borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let Some(trend) = trend_series(&run.national) else {
            let msg = Paragraph::new(crate::domain::NO_DATA_LABEL).style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };

        let origin = trend.origin;
        let fmt_x = move |v: f64| (origin + chrono::Duration::days(v.round() as i64)).format("%d/%m").to_string();
        let fmt_y = |v: f64| format!("{:.1}k", v / 1_000.0);
        let widget = TrendPlottersChart {
            segments: &trend.segments,
            x_bounds: trend.x_bounds,
            y_bounds: trend.y_bounds,
            x_label: "date",
            y_label: "Rp",
            fmt_x: &fmt_x,
            fmt_y: &fmt_y,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_predict(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(48), Constraint::Min(0)])
            .split(area);
        self.draw_predict_settings(frame, cols[0]);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(7), Constraint::Min(0)])
            .split(cols[1]);

        let Some(run) = &self.prediction else {
            let msg = Paragraph::new("Choose the inputs and press p (or Enter) to predict.")
                .style(Style::default().fg(Color::Gray))
                .block(Block::default().title("Prediction").borders(Borders::ALL));
            frame.render_widget(msg, cols[1]);
            return;
        };

        self.draw_prediction_summary(frame, right[0], run);
        self.draw_comparison(frame, right[1], run);
    }

    fn draw_predict_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut items: Vec<ListItem> = Field::ALL
            .iter()
            .enumerate()
            .map(|(i, field)| {
                let label = self
                    .labels
                    .as_ref()
                    .and_then(|l| l[i].get(self.choices[i]))
                    .map(String::as_str)
                    .unwrap_or("-");
                ListItem::new(format!("{}: ‹ {label} ›", field.display_name()))
            })
            .collect();
        let date = if self.editing_date {
            format!("Date: {}_", self.date_input)
        } else {
            format!("Date: {}", self.date_input)
        };
        items.push(ListItem::new(date));

        let list = List::new(items)
            .block(Block::default().title("Inputs").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.predict_field));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_prediction_summary(&self, frame: &mut ratatui::Frame<'_>, area: Rect, run: &PredictionRun) {
        let direction_color = match run.trend.direction {
            crate::domain::Direction::Up => Color::Red,
            crate::domain::Direction::Down => Color::Green,
            crate::domain::Direction::Stable => Color::Yellow,
        };
        let lines = vec![
            Line::from(format!(
                "{} | {} | {}",
                run.selection.commodity, run.selection.market, run.selection.province
            )),
            Line::from(format!("Today    ({}): {}", run.today.date, format_rupiah(run.today.price))),
            Line::from(format!("Tomorrow ({}): {}", run.tomorrow.date, format_rupiah(run.tomorrow.price))),
            Line::from(Span::styled(
                crate::report::direction_text(&run.trend),
                Style::default().fg(direction_color).add_modifier(Modifier::BOLD),
            )),
        ];
        let p = Paragraph::new(Text::from(lines))
            .block(Block::default().title("Prediction").borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_comparison(&self, frame: &mut ratatui::Frame<'_>, area: Rect, run: &PredictionRun) {
        let colors = [Color::Blue, Color::Red];
        let bars: Vec<Bar> = run
            .trend
            .series
            .iter()
            .zip(colors)
            .map(|((label, price), color)| {
                Bar::default()
                    .label(Line::from(label.as_str()))
                    .value(price.max(0.0).round() as u64)
                    .text_value(format_rupiah(*price))
                    .style(Style::default().fg(color))
            })
            .collect();

        let chart = BarChart::default()
            .block(Block::default().title("Price comparison").borders(Borders::ALL))
            .bar_width(16)
            .bar_gap(4)
            .data(BarGroup::default().bars(&bars));
        frame.render_widget(chart, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = match self.screen {
            Screen::Welcome => "Tab/1-3 screens  q quit",
            Screen::Map => "↑/↓ select  ←/→ change  m min/max  r reload  Tab screens  q quit",
            Screen::Predict => "↑/↓ select  ←/→ PgUp/PgDn change  Enter edit date  p predict  q quit",
        };
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Move `idx` by `delta` within `0..len`, wrapping at both ends.
fn cycle(idx: usize, len: usize, delta: isize) -> usize {
    if len == 0 {
        return 0;
    }
    let len = len as isize;
    ((idx as isize + delta).rem_euclid(len)) as usize
}
