use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style, Stylize};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Axis, Block, Borders, Cell, Chart, Clear, Dataset, Gauge, GraphType, Paragraph, Row, Table, Wrap,
};
use unicode_width::UnicodeWidthStr;

use robobat_core::battery::forecast::{self, LevelBand};
use robobat_core::types::{BatteryStatus, Severity};
use robobat_logs::source::LogStatus;

use crate::tui::{App, LogsView, Page, Theme};

/// Colours for one theme.
struct Palette {
    bg: Color,
    fg: Color,
    muted: Color,
    accent: Color,
    good: Color,
    fair: Color,
    critical: Color,
    voltage: Color,
}

impl Palette {
    fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                bg: Color::Rgb(30, 30, 47),
                fg: Color::Rgb(230, 230, 230),
                muted: Color::Rgb(136, 136, 136),
                accent: Color::Rgb(225, 78, 202),
                good: Color::Rgb(66, 184, 131),
                fair: Color::Rgb(241, 196, 15),
                critical: Color::Rgb(231, 76, 60),
                voltage: Color::Rgb(0, 210, 255),
            },
            Theme::Light => Self {
                bg: Color::Rgb(244, 245, 250),
                fg: Color::Rgb(34, 42, 66),
                muted: Color::Rgb(110, 110, 120),
                accent: Color::Rgb(186, 54, 166),
                good: Color::Rgb(40, 140, 96),
                fair: Color::Rgb(196, 150, 0),
                critical: Color::Rgb(200, 50, 40),
                voltage: Color::Rgb(0, 130, 180),
            },
        }
    }

    fn band(&self, band: LevelBand) -> Color {
        match band {
            LevelBand::Good => self.good,
            LevelBand::Fair => self.fair,
            LevelBand::Critical => self.critical,
        }
    }

    fn severity(&self, severity: Severity) -> Color {
        match severity {
            Severity::Success => self.good,
            Severity::Warning => self.fair,
            Severity::Error => self.critical,
        }
    }

    fn block<'a>(&self, title: &'a str) -> Block<'a> {
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.muted))
            .title(Span::styled(title, Style::default().fg(self.fg).bold()))
    }
}

pub fn draw(f: &mut Frame, app: &App) {
    let p = Palette::for_theme(app.theme);
    f.render_widget(Block::default().style(Style::default().bg(p.bg).fg(p.fg)), f.area());

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(22), Constraint::Min(30)])
        .split(f.area());
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(cols[1]);

    draw_sidebar(f, app, &p, cols[0]);
    match app.page {
        Page::Dashboard => draw_dashboard(f, app, &p, rows[0]),
        Page::Logs => draw_logs(f, app, &p, rows[0]),
        Page::System => draw_system(f, app, &p, rows[0]),
    }
    draw_status(f, app, &p, rows[1]);
    draw_toasts(f, app, &p, f.area());
}

fn draw_sidebar(f: &mut Frame, app: &App, p: &Palette, area: Rect) {
    let mut lines = vec![
        Line::from(vec![
            Span::styled("RoboBat ", Style::default().fg(p.fg).bold()),
            Span::styled("PRO", Style::default().fg(p.accent)),
        ]),
        Line::default(),
    ];
    for (i, page) in Page::ALL.iter().enumerate() {
        let label = format!(" {} {} ", i + 1, page.title());
        let style = if *page == app.page {
            Style::default().fg(p.bg).bg(p.accent).bold()
        } else {
            Style::default().fg(p.muted)
        };
        lines.push(Line::from(Span::styled(label, style)));
    }
    f.render_widget(Paragraph::new(lines).block(p.block(" nav ")), area);
}

fn draw_status(f: &mut Frame, app: &App, p: &Palette, area: Rect) {
    let s = &app.status;
    let theme = match app.theme {
        Theme::Dark => "dark",
        Theme::Light => "light",
    };
    let text = format!(
        " tick {}  |  level {:.1}%  |  threshold {}%  |  {} theme  |  Tab pages  Esc dismiss  Ctrl+C quit",
        s.tick_count, s.battery.level, s.threshold, theme
    );
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(text, Style::default().fg(p.muted)))),
        area,
    );
}

// ── Dashboard ──

fn draw_dashboard(f: &mut Frame, app: &App, p: &Palette, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(8),
        ])
        .split(area);

    let battery = &app.status.battery;
    let header = Line::from(vec![
        Span::styled("System status", Style::default().fg(p.fg).bold()),
        Span::raw("    "),
        Span::styled(
            format!("Time to empty: {}", forecast::format_remaining(app.status.time_to_empty)),
            Style::default().fg(p.accent),
        ),
    ]);
    f.render_widget(Paragraph::new(header), chunks[0]);

    let band_color = p.band(LevelBand::from_level(battery.level));
    let gauge = Gauge::default()
        .block(p.block(" charge "))
        .gauge_style(Style::default().fg(band_color).bg(p.bg))
        .ratio((battery.level / 100.0).clamp(0.0, 1.0))
        .label(Span::styled(
            format!("{:.1}%", battery.level),
            Style::default().fg(p.fg).add_modifier(Modifier::BOLD),
        ));
    f.render_widget(gauge, chunks[1]);

    let stats = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3); 3])
        .split(chunks[2]);
    let temp_color = if forecast::is_overheated(battery.temperature) { p.critical } else { p.fg };
    let status_color = match battery.status {
        BatteryStatus::Active => p.good,
        BatteryStatus::LowBattery => p.critical,
        BatteryStatus::Charging => p.voltage,
    };
    stat_box(f, p, stats[0], " Voltage ", format!("{:.2} V", battery.voltage), p.voltage);
    stat_box(f, p, stats[1], " Temperature ", format!("{:.1}°C", battery.temperature), temp_color);
    stat_box(f, p, stats[2], " Status ", battery.status.to_string(), status_color);

    draw_chart(f, app, p, chunks[3]);
}

fn stat_box(f: &mut Frame, p: &Palette, area: Rect, title: &str, value: String, color: Color) {
    let para = Paragraph::new(Line::from(Span::styled(value, Style::default().fg(color).bold())))
        .block(p.block(title));
    f.render_widget(para, area);
}

fn draw_chart(f: &mut Frame, app: &App, p: &Palette, area: Rect) {
    let history = &app.status.history;
    let points: Vec<(f64, f64)> = history
        .iter()
        .enumerate()
        .map(|(i, s)| (i as f64, s.level))
        .collect();
    let x_max = (points.len().max(2) - 1) as f64;

    let first = history.first().map(|s| s.timestamp_label.clone()).unwrap_or_default();
    let last = history.last().map(|s| s.timestamp_label.clone()).unwrap_or_default();

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(p.accent))
        .data(&points);

    let chart = Chart::new(vec![dataset])
        .block(p.block(" Discharge dynamics (real-time) "))
        .x_axis(
            Axis::default()
                .style(Style::default().fg(p.muted))
                .bounds([0.0, x_max])
                .labels(vec![Span::raw(first), Span::raw(last)]),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(p.muted))
                .bounds([0.0, 100.0])
                .labels(vec![Span::raw("0"), Span::raw("50"), Span::raw("100")]),
        );
    f.render_widget(chart, area);
}

// ── Logs ──

fn draw_logs(f: &mut Frame, app: &App, p: &Palette, area: Rect) {
    let block = p.block(" Event log (Server API) ");
    let entries = match &app.logs {
        LogsView::Loading => {
            let para = Paragraph::new(Span::styled("Fetching data...", Style::default().fg(p.muted).dim()))
                .block(block);
            f.render_widget(para, area);
            return;
        }
        LogsView::Loaded(entries) => entries,
    };

    let header = Row::new(vec!["Time", "Event", "Operator", "Status"])
        .style(Style::default().fg(p.muted).bold());
    let rows = entries.iter().map(|e| {
        let badge = match e.status {
            LogStatus::Ok => p.good,
            LogStatus::Warning => p.fair,
        };
        Row::new(vec![
            Cell::from(e.time.clone()),
            Cell::from(e.event.clone()),
            Cell::from(e.operator.clone()),
            Cell::from(Span::styled(e.status.to_string(), Style::default().fg(badge).bold())),
        ])
    });
    let table = Table::new(
        rows,
        [
            Constraint::Length(7),
            Constraint::Min(20),
            Constraint::Length(18),
            Constraint::Length(9),
        ],
    )
    .header(header)
    .block(block);
    f.render_widget(table, area);
}

// ── System ──

fn draw_system(f: &mut Frame, app: &App, p: &Palette, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Min(3),
        ])
        .split(area);

    let theme_hint = match app.theme {
        Theme::Dark => "Ctrl+T  switch to light theme",
        Theme::Light => "Ctrl+T  switch to dark theme",
    };
    f.render_widget(
        Paragraph::new(Span::styled(theme_hint, Style::default().fg(p.fg))).block(p.block(" Appearance ")),
        chunks[0],
    );

    let prefix = "Threshold %: ";
    let form = vec![
        Line::from(vec![
            Span::styled(prefix, Style::default().fg(p.muted)),
            Span::styled(app.input.as_str(), Style::default().fg(p.fg).bold()),
        ]),
        Line::from(Span::styled(
            format!("Enter to save (current {}%)", app.status.threshold),
            Style::default().fg(p.muted).dim(),
        )),
    ];
    f.render_widget(Paragraph::new(form).block(p.block(" Safety parameters ")), chunks[1]);

    let cursor_w = prefix.width() + app.input[..app.cursor].width();
    f.set_cursor_position(Position::new(
        chunks[1].x + 1 + cursor_w as u16,
        chunks[1].y + 1,
    ));

    f.render_widget(
        Paragraph::new(Span::styled("Ctrl+R  FULL RECHARGE", Style::default().fg(p.critical).bold()))
            .block(p.block(" Emergency power ")),
        chunks[2],
    );

    let cfg_lines: Vec<Line> = app
        .config_entries
        .iter()
        .map(|(key, value, desc)| {
            Line::from(vec![
                Span::styled(format!("{key:<26}"), Style::default().fg(p.fg)),
                Span::styled(format!("{value:<8}"), Style::default().fg(p.accent)),
                Span::styled(*desc, Style::default().fg(p.muted)),
            ])
        })
        .collect();
    f.render_widget(
        Paragraph::new(cfg_lines)
            .wrap(Wrap { trim: true })
            .block(p.block(" Simulation (ROBOBAT_* env) ")),
        chunks[3],
    );
}

// ── Toasts ──

fn draw_toasts(f: &mut Frame, app: &App, p: &Palette, area: Rect) {
    const WIDTH: u16 = 44;
    const HEIGHT: u16 = 3;
    if app.toasts.is_empty() || area.width < WIDTH || area.height < HEIGHT + 1 {
        return;
    }

    // newest at the bottom, stacked upward above the status line
    let mut y = area.bottom().saturating_sub(1 + HEIGHT);
    for toast in app.toasts.iter().rev() {
        if y < area.y {
            break;
        }
        let rect = Rect::new(area.right() - WIDTH, y, WIDTH, HEIGHT);
        let color = p.severity(toast.notification.severity);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color))
            .style(Style::default().bg(p.bg));
        f.render_widget(Clear, rect);
        f.render_widget(
            Paragraph::new(Span::styled(toast.notification.message.as_str(), Style::default().fg(p.fg)))
                .block(block),
            rect,
        );
        match y.checked_sub(HEIGHT) {
            Some(next) => y = next,
            None => break,
        }
    }
}
