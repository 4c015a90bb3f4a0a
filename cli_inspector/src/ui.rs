use std::collections::VecDeque;

use ratatui::layout::{Constraint, Direction, Layout, Margin};
use ratatui::prelude::Rect;
use ratatui::style::{Color, Style};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Wrap};
use ratatui::Frame;

use core_feed::{
    project, roster_lines, view_title, LinkStatus, Projection, Session, ViewSelector, ViewWindow,
};

const WRITHE_COLOR: Color = Color::Green;
const BURAU_COLOR: Color = Color::Cyan;

pub struct UiState {
    pub session: Session,
    pub selector: ViewSelector,
    pub window: ViewWindow,
    pub logs: VecDeque<String>,
    pub max_logs: usize,
}

impl UiState {
    pub fn new(selector: ViewSelector, window: ViewWindow, max_logs: usize) -> Self {
        Self {
            session: Session::new(),
            selector,
            window,
            logs: VecDeque::new(),
            max_logs,
        }
    }

    pub fn push_log<S: Into<String>>(&mut self, line: S) {
        let mut text: String = line.into();
        while text.ends_with('\n') || text.ends_with('\r') {
            text.pop();
        }
        if text.is_empty() {
            return;
        }
        self.logs.push_front(text);
        while self.logs.len() > self.max_logs {
            self.logs.pop_back();
        }
    }

    pub fn projection(&self) -> Projection {
        project(
            self.session.history().snapshot(),
            &self.selector,
            self.window,
        )
    }

    pub fn toggle_auto_scroll(&mut self) -> bool {
        self.window.auto_scroll = !self.window.auto_scroll;
        self.window.auto_scroll
    }
}

pub fn draw_ui(frame: &mut Frame, state: &UiState) {
    let projection = state.projection();

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(75), Constraint::Percentage(25)])
        .split(frame.size());

    let main = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Min(6),
            Constraint::Length(log_panel_height(state.max_logs)),
        ])
        .split(columns[0]);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(7)])
        .split(columns[1]);

    draw_header(frame, main[0], state, &projection);
    draw_writhe(frame, main[1], &projection);
    draw_burau(frame, main[2], &projection);
    draw_logs(frame, main[3], state);
    draw_roster(frame, side[0], state);
    draw_commands(frame, side[1]);
}

/// Log lines plus the two border rows, saturating at the terminal's limits.
fn log_panel_height(max_logs: usize) -> u16 {
    u16::try_from(max_logs)
        .unwrap_or(u16::MAX)
        .saturating_add(2)
}

fn draw_header(frame: &mut Frame, area: Rect, state: &UiState, projection: &Projection) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Braid Fingerprint Inspector");
    let link = match state.session.link() {
        LinkStatus::Waiting => Span::styled("Waiting", Style::default().fg(Color::Yellow)),
        LinkStatus::Connected(_) => Span::styled("Connected", Style::default().fg(Color::Green)),
        LinkStatus::Disconnected(_) => {
            Span::styled("Disconnected", Style::default().fg(Color::Red))
        }
    };
    let line = Line::from(vec![
        link,
        Span::raw(" | "),
        Span::raw(view_title(
            &state.selector,
            state.session.registry(),
            projection,
        )),
    ]);
    let text = Paragraph::new(line).wrap(Wrap { trim: true });
    frame.render_widget(block, area);
    frame.render_widget(
        text,
        area.inner(&Margin {
            vertical: 1,
            horizontal: 1,
        }),
    );
}

/// Points for a post-step line: each value holds until the next step.
fn step_points(steps: &[u64], values: &[i64]) -> Vec<(f64, f64)> {
    let mut points = Vec::with_capacity(steps.len() * 2);
    for (index, (step, value)) in steps.iter().zip(values).enumerate() {
        let y = *value as f64;
        points.push((*step as f64, y));
        if let Some(next) = steps.get(index + 1) {
            points.push((*next as f64, y));
        }
    }
    points
}

fn axis_labels(bounds: [f64; 2], precision: usize) -> Vec<Span<'static>> {
    let mid = (bounds[0] + bounds[1]) / 2.0;
    [bounds[0], mid, bounds[1]]
        .iter()
        .map(|value| Span::raw(format!("{value:.precision$}")))
        .collect()
}

fn draw_writhe(frame: &mut Frame, area: Rect, projection: &Projection) {
    let points = step_points(&projection.steps, &projection.primary);
    let x_bounds = projection.step_bounds().unwrap_or((0.0, 1.0));
    let y_bounds = projection.primary_bounds().unwrap_or((-1.0, 1.0));
    let dataset = Dataset::default()
        .name("Writhe")
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(WRITHE_COLOR))
        .data(&points);
    let chart = Chart::new(vec![dataset])
        .block(Block::default().borders(Borders::ALL).title("Writhe"))
        .x_axis(
            Axis::default()
                .bounds([x_bounds.0, x_bounds.1])
                .labels(axis_labels([x_bounds.0, x_bounds.1], 0)),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(WRITHE_COLOR))
                .bounds([y_bounds.0, y_bounds.1])
                .labels(axis_labels([y_bounds.0, y_bounds.1], 0)),
        );
    frame.render_widget(chart, area);
}

fn draw_burau(frame: &mut Frame, area: Rect, projection: &Projection) {
    let points: Vec<(f64, f64)> = projection
        .steps
        .iter()
        .zip(&projection.secondary)
        .map(|(step, value)| (*step as f64, *value))
        .collect();
    let x_bounds = projection.step_bounds().unwrap_or((0.0, 1.0));
    let y_bounds = projection.secondary_bounds().unwrap_or((0.0, 1.0));
    let dataset = Dataset::default()
        .name("Burau Trace Magnitude")
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(BURAU_COLOR))
        .data(&points);
    let chart = Chart::new(vec![dataset])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Burau Trace Magnitude"),
        )
        .x_axis(
            Axis::default()
                .title("Step")
                .bounds([x_bounds.0, x_bounds.1])
                .labels(axis_labels([x_bounds.0, x_bounds.1], 0)),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(BURAU_COLOR))
                .bounds([y_bounds.0, y_bounds.1])
                .labels(axis_labels([y_bounds.0, y_bounds.1], 2)),
        );
    frame.render_widget(chart, area);
}

fn draw_roster(frame: &mut Frame, area: Rect, state: &UiState) {
    let block = Block::default().borders(Borders::ALL).title("Roster");
    let lines: Vec<Line> = roster_lines(state.session.registry())
        .into_iter()
        .map(|entry| Line::from(Span::styled(entry, Style::default().fg(WRITHE_COLOR))))
        .collect();
    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(block, area);
    frame.render_widget(
        paragraph,
        area.inner(&Margin {
            vertical: 1,
            horizontal: 1,
        }),
    );
}

fn draw_commands(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(vec![
            Span::styled("` / g", Style::default().fg(Color::Yellow)),
            Span::raw("  global view"),
        ]),
        Line::from(vec![
            Span::styled("0-9", Style::default().fg(Color::Yellow)),
            Span::raw("    seat by [S#] tag"),
        ]),
        Line::from(vec![
            Span::styled("a", Style::default().fg(Color::Yellow)),
            Span::raw("      toggle auto-scroll"),
        ]),
        Line::from(vec![
            Span::styled("q", Style::default().fg(Color::Yellow)),
            Span::raw("      exit inspector"),
        ]),
    ];
    let block = Block::default().borders(Borders::ALL).title("Hotkeys");
    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(block, area);
    frame.render_widget(
        paragraph,
        area.inner(&Margin {
            vertical: 1,
            horizontal: 1,
        }),
    );
}

fn draw_logs(frame: &mut Frame, area: Rect, state: &UiState) {
    let block = Block::default().borders(Borders::ALL).title("Logs");
    let lines: Vec<Line> = state
        .logs
        .iter()
        .map(|entry| Line::from(Span::raw(entry)))
        .collect();
    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(block, area);
    frame.render_widget(
        paragraph,
        area.inner(&Margin {
            vertical: 1,
            horizontal: 1,
        }),
    );
}
