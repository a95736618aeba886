use std::io;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, Event as CEvent, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use indexmap::IndexSet;
use log::debug;
use tui::backend::{Backend, CrosstermBackend};
use tui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Span, Spans};
use tui::widgets::{
    Axis, BarChart, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph, Row, Table, Tabs,
    Wrap,
};
use tui::{symbols, Frame, Terminal};

use crate::chart::{Figure, Mode, Trace, Values};
use crate::controller::{Control, Dashboard, Selection, View};
use crate::error::DashboardError;

const SERIES_COLORS: [Color; 6] = [
    Color::Cyan,
    Color::Yellow,
    Color::Magenta,
    Color::Green,
    Color::Red,
    Color::Blue,
];

// Viridis, dark to light.
const HEAT_COLORS: [(u8, u8, u8); 5] = [
    (68, 1, 84),
    (59, 82, 139),
    (33, 145, 140),
    (94, 201, 98),
    (253, 231, 37),
];

enum Event<I> {
    Input(I),
    Tick,
}

impl From<View> for usize {
    fn from(input: View) -> usize {
        View::all().iter().position(|v| *v == input).unwrap_or(0)
    }
}

/// Interactive state: the active tab, one selection per view and the figure
/// for the active selection.
pub struct App<'a> {
    dashboard: &'a Dashboard,
    view: View,
    selections: Vec<Selection>,
    focus: usize,
    figure: Figure,
}

impl<'a> App<'a> {
    pub fn new(dashboard: &'a Dashboard) -> Self {
        let selections = View::all()
            .iter()
            .map(|v| dashboard.default_selection(*v))
            .collect::<Vec<_>>();
        let view = View::Bar;
        let figure = dashboard.render(&selections[usize::from(view)]);
        App {
            dashboard,
            view,
            selections,
            focus: 0,
            figure,
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn selection(&self) -> &Selection {
        &self.selections[usize::from(self.view)]
    }

    pub fn figure(&self) -> &Figure {
        &self.figure
    }

    pub fn focused_control(&self) -> Control {
        let controls = self.view.controls();
        controls[self.focus % controls.len()]
    }

    pub fn next_tab(&mut self) {
        self.switch_to(self.view.next());
    }

    pub fn previous_tab(&mut self) {
        self.switch_to(self.view.previous());
    }

    pub fn toggle_focus(&mut self) {
        self.focus = (self.focus + 1) % self.view.controls().len();
    }

    /// Moves the focused control `step` options forward, wrapping around.
    pub fn cycle_value(&mut self, step: isize) {
        let control = self.focused_control();
        let options = self.dashboard.options(control);
        if options.is_empty() {
            return;
        }
        let current = self
            .selection()
            .get(control)
            .and_then(|value| options.iter().position(|o| *o == value))
            .unwrap_or(0);
        let len = options.len() as isize;
        let next = (current as isize + step).rem_euclid(len) as usize;
        let value = options[next].to_string();
        self.selections[usize::from(self.view)].set(control, &value);
        self.refresh();
    }

    fn switch_to(&mut self, view: View) {
        self.view = view;
        self.focus = 0;
        self.refresh();
    }

    fn refresh(&mut self) {
        self.figure = self.dashboard.render(self.selection());
        debug!("{:?} -> {} trace(s)", self.selection(), self.figure.data.len());
    }
}

pub fn run(dashboard: &Dashboard) -> Result<(), DashboardError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let (tx, rx) = mpsc::channel();
    let tick_rate = Duration::from_millis(200);
    thread::spawn(move || {
        let mut last_tick = Instant::now();
        loop {
            let timeout = tick_rate
                .checked_sub(last_tick.elapsed())
                .unwrap_or_else(|| Duration::from_secs(0));

            match event::poll(timeout) {
                Ok(true) => {
                    if let Ok(CEvent::Key(key)) = event::read() {
                        if tx.send(Event::Input(key)).is_err() {
                            break;
                        }
                    }
                }
                Ok(false) => {}
                Err(_) => break,
            }

            if last_tick.elapsed() >= tick_rate {
                if tx.send(Event::Tick).is_err() {
                    break;
                }
                last_tick = Instant::now();
            }
        }
    });

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut app = App::new(dashboard);
    let result = event_loop(&mut terminal, &mut app, &rx);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

fn event_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: &mpsc::Receiver<Event<event::KeyEvent>>,
) -> Result<(), DashboardError> {
    loop {
        terminal.draw(|rect| draw(rect, app))?;

        match rx.recv() {
            Ok(Event::Input(event)) => match event.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Right | KeyCode::Char('l') => app.next_tab(),
                KeyCode::Left | KeyCode::Char('h') => app.previous_tab(),
                KeyCode::Down | KeyCode::Char('j') => app.cycle_value(1),
                KeyCode::Up | KeyCode::Char('k') => app.cycle_value(-1),
                KeyCode::Tab => app.toggle_focus(),
                _ => {}
            },
            Ok(Event::Tick) => {}
            // input thread gone
            Err(_) => break,
        }
    }
    Ok(())
}

fn draw<B: Backend>(rect: &mut Frame<B>, app: &App) {
    let size = rect.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(size);

    let menu = View::all()
        .iter()
        .map(|v| Spans::from(Span::raw(v.label())))
        .collect();
    let tabs = Tabs::new(menu)
        .select(app.view().into())
        .block(Block::default().title("FunOlympics Games Dashboard").borders(Borders::ALL))
        .style(Style::default().fg(Color::Cyan))
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .divider(Span::raw("|"));
    rect.render_widget(tabs, chunks[0]);

    let focused = app.focused_control();
    let controls = app
        .view()
        .controls()
        .iter()
        .flat_map(|control| {
            let value = app.selection().get(*control).unwrap_or("");
            let style = if *control == focused {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            vec![
                Span::raw(format!("{}: ", control.key())),
                Span::styled(format!("< {} >", value), style),
                Span::raw("   "),
            ]
        })
        .collect::<Vec<_>>();
    let selection = Paragraph::new(Spans::from(controls))
        .block(Block::default().title("Selection").borders(Borders::ALL))
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true });
    rect.render_widget(selection, chunks[1]);

    draw_figure(rect, app.view(), app.figure(), chunks[2]);

    let help = Paragraph::new(Spans::from(Span::styled(
        "←/→ tab   ↑/↓ value   Tab next control   q quit",
        Style::default().fg(Color::DarkGray),
    )));
    rect.render_widget(help, chunks[3]);
}

fn draw_figure<B: Backend>(rect: &mut Frame<B>, view: View, figure: &Figure, area: Rect) {
    let title = figure.title().unwrap_or("No data").to_string();
    let block = Block::default().title(title).borders(Borders::ALL);
    if figure.marks() == 0 && view != View::Heatmap {
        let empty = Paragraph::new("No matching records")
            .block(block)
            .alignment(Alignment::Center);
        rect.render_widget(empty, area);
        return;
    }

    match view {
        View::Bar | View::Histogram => {
            let bars = bar_data(figure);
            let data = bars
                .iter()
                .map(|(label, value)| (label.as_str(), *value))
                .collect::<Vec<_>>();
            let chart = BarChart::default()
                .block(block)
                .data(&data)
                .bar_width(6)
                .bar_gap(1)
                .bar_style(Style::default().fg(Color::Yellow))
                .value_style(Style::default().fg(Color::Black).bg(Color::Yellow));
            rect.render_widget(chart, area);
        }
        View::AgeLine | View::Scatter => {
            let plot = series_data(figure);
            let datasets = plot
                .series
                .iter()
                .enumerate()
                .map(|(i, s)| {
                    Dataset::default()
                        .name(s.name.clone())
                        .marker(symbols::Marker::Braille)
                        .graph_type(if s.lines { GraphType::Line } else { GraphType::Scatter })
                        .style(Style::default().fg(SERIES_COLORS[i % SERIES_COLORS.len()]))
                        .data(&s.points)
                })
                .collect::<Vec<_>>();
            let x_labels = plot
                .x_labels
                .iter()
                .map(|l| Span::raw(l.clone()))
                .collect::<Vec<_>>();
            let y_labels = [plot.y_bounds[0], plot.y_bounds[1]]
                .iter()
                .map(|v| Span::raw(format!("{:.0}", v)))
                .collect::<Vec<_>>();
            let axis_title = |axis: &Option<crate::chart::AxisLayout>| {
                axis.as_ref().map(|a| a.title.text.clone()).unwrap_or_default()
            };
            let chart = Chart::new(datasets)
                .block(block)
                .x_axis(
                    Axis::default()
                        .title(axis_title(&figure.layout.xaxis))
                        .style(Style::default().fg(Color::Gray))
                        .bounds(plot.x_bounds)
                        .labels(x_labels),
                )
                .y_axis(
                    Axis::default()
                        .title(axis_title(&figure.layout.yaxis))
                        .style(Style::default().fg(Color::Gray))
                        .bounds(plot.y_bounds)
                        .labels(y_labels),
                );
            rect.render_widget(chart, area);
        }
        View::Heatmap => {
            let (label, cells) = heatmap_cells(figure);
            let max = cells.iter().map(|(_, v)| *v).fold(0.0, f64::max);
            let header = Row::new(
                std::iter::once(String::new())
                    .chain(cells.iter().map(|(time, _)| time.clone()))
                    .collect::<Vec<_>>(),
            )
            .style(Style::default().add_modifier(Modifier::BOLD));
            let row = Row::new(
                std::iter::once(Cell::from(label)).chain(cells.iter().map(|(_, views)| {
                    let (r, g, b) = heat_color(*views, max);
                    Cell::from(format!("{:.0}", views))
                        .style(Style::default().bg(Color::Rgb(r, g, b)).fg(Color::White))
                })),
            );
            let widths = std::iter::once(Constraint::Length(14))
                .chain(cells.iter().map(|_| Constraint::Length(10)))
                .collect::<Vec<_>>();
            let table = Table::new(vec![row])
                .header(header)
                .block(block)
                .widths(&widths)
                .column_spacing(1);
            rect.render_widget(table, area);
        }
    }
}

fn heat_color(value: f64, max: f64) -> (u8, u8, u8) {
    if max <= 0.0 {
        return HEAT_COLORS[0];
    }
    let idx = ((value / max) * (HEAT_COLORS.len() - 1) as f64).round() as usize;
    HEAT_COLORS[idx.min(HEAT_COLORS.len() - 1)]
}

/// Flattens bar traces into labelled bars. Grouped traces are interleaved so
/// each category's bars sit side by side.
fn bar_data(figure: &Figure) -> Vec<(String, u64)> {
    let bar_traces = figure
        .data
        .iter()
        .filter_map(|t| match t {
            Trace::Bar { name, x, y } => Some((name, x, y)),
            _ => None,
        })
        .collect::<Vec<_>>();

    if bar_traces.len() == 1 && bar_traces[0].0.is_none() {
        let (_, x, y) = bar_traces[0];
        return x
            .iter()
            .zip(y)
            .map(|(label, value)| (label.clone(), value.round() as u64))
            .collect();
    }

    let categories = bar_traces
        .iter()
        .flat_map(|(_, x, _)| x.iter())
        .collect::<IndexSet<_>>();
    let mut bars = Vec::<(String, u64)>::new();
    for category in categories {
        for (name, x, y) in &bar_traces {
            if let Some(pos) = x.iter().position(|c| c == category) {
                let group = name.as_deref().unwrap_or("");
                bars.push((format!("{}/{}", category, group), y[pos].round() as u64));
            }
        }
    }
    bars
}

struct Series {
    name: String,
    lines: bool,
    points: Vec<(f64, f64)>,
}

struct Plot {
    series: Vec<Series>,
    x_labels: Vec<String>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
}

/// Converts scatter/line traces to plottable points. Text x values are placed
/// at their index among all categories.
fn series_data(figure: &Figure) -> Plot {
    let categories = figure
        .data
        .iter()
        .filter_map(|t| match t {
            Trace::Scatter { x: Values::Text(x), .. } => Some(x.iter()),
            _ => None,
        })
        .flatten()
        .cloned()
        .collect::<IndexSet<String>>();

    let series = figure
        .data
        .iter()
        .filter_map(|t| match t {
            Trace::Scatter { name, mode, x, y } => {
                let xs = match x {
                    Values::Number(v) => v.clone(),
                    Values::Text(v) => v
                        .iter()
                        .map(|c| categories.get_index_of(c).unwrap_or(0) as f64)
                        .collect(),
                };
                Some(Series {
                    name: name.clone(),
                    lines: *mode == Mode::Lines,
                    points: xs.into_iter().zip(y.iter().copied()).collect(),
                })
            }
            _ => None,
        })
        .collect::<Vec<_>>();

    let points = series.iter().flat_map(|s| s.points.iter());
    let (mut x_min, mut x_max, mut y_max) = (f64::MAX, f64::MIN, 0.0_f64);
    for (x, y) in points {
        x_min = x_min.min(*x);
        x_max = x_max.max(*x);
        y_max = y_max.max(*y);
    }
    if x_min > x_max {
        x_min = 0.0;
        x_max = 1.0;
    }

    let x_labels = if categories.is_empty() {
        vec![format!("{:.0}", x_min), format!("{:.0}", x_max)]
    } else {
        categories.into_iter().collect()
    };

    Plot {
        series,
        x_labels,
        x_bounds: [x_min - 0.5, x_max + 0.5],
        y_bounds: [0.0, (y_max * 1.1).max(1.0)],
    }
}

fn heatmap_cells(figure: &Figure) -> (String, Vec<(String, f64)>) {
    for trace in &figure.data {
        if let Trace::Heatmap { x, y, z, .. } = trace {
            let label = y.first().cloned().unwrap_or_default();
            let values = z.first().cloned().unwrap_or_default();
            return (label, x.iter().cloned().zip(values).collect());
        }
    }
    (String::new(), Vec::new())
}
