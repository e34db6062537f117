use chrono::Local;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Clear, Gauge, Paragraph, Row, Table},
    Frame,
};

use crate::clock::ClockState;
use crate::format::{format_best, format_elapsed, format_wall_clock};

use super::app::{App, InputField, InputMode};

pub fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(9), // Clock panel
                Constraint::Min(0),    // Roster table
                Constraint::Length(3), // Help
            ]
            .as_ref(),
        )
        .split(f.area());

    draw_clock_panel(f, app, chunks[0]);
    draw_roster(f, app, chunks[1]);
    draw_help(f, app, chunks[2]);

    // Render input box if needed
    if app.input_mode == InputMode::Editing {
        let area = centered_rect(60, 3, f.area());
        f.render_widget(Clear, area);

        let title = match app.input_field {
            InputField::AddName => "Add Task: Enter Name",
            InputField::RenameName => "Rename Task",
            InputField::None => "",
        };
        let input = Paragraph::new(app.input_buffer.as_str())
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(input, area);
    }
}

/// Section one: the elapsed-time clock (or BREAK), the task name, the best
/// record, and the break countdown gauge.
fn draw_clock_panel(f: &mut Frame, app: &App, area: Rect) {
    let now = Local::now();
    let settings = &app.tracker.settings;
    let border = hex_color(&settings.colors.border_color).unwrap_or(Color::Reset);
    let text = hex_color(&settings.colors.text_color).unwrap_or(Color::Reset);
    let bg = hex_color(&settings.colors.section1_bg);

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title("tictask");
    if let Some(bg) = bg {
        block = block.style(Style::default().bg(bg));
    }
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(1), // wall clock
                Constraint::Length(1), // elapsed / BREAK
                Constraint::Length(1), // task or break name
                Constraint::Length(1), // best record / countdown
                Constraint::Length(1), // gauge / paused hint
                Constraint::Length(1), // notice
            ]
            .as_ref(),
        )
        .split(inner);

    let wall = Paragraph::new(format_wall_clock(now))
        .style(Style::default().fg(text))
        .alignment(Alignment::Right);
    f.render_widget(wall, rows[0]);

    let clock = &app.tracker.clock;
    let state = clock.state();
    let current_task = clock.current_index().and_then(|i| app.tracker.roster.get(i));

    // The clock line
    let clock_line = match state {
        ClockState::OnBreak => "BREAK".to_string(),
        _ => format_elapsed(clock.compute_elapsed(now)),
    };
    let clock_style = match state {
        ClockState::OnBreak => Style::default()
            .fg(Color::Magenta)
            .add_modifier(Modifier::BOLD),
        ClockState::Paused => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        _ => Style::default().fg(text).add_modifier(Modifier::BOLD),
    };
    f.render_widget(
        Paragraph::new(clock_line)
            .style(clock_style)
            .alignment(Alignment::Center),
        rows[1],
    );

    // The name line: break name while on break, task name otherwise
    let name_line = match state {
        ClockState::Idle => "No Task Selected".to_string(),
        ClockState::OnBreak => clock
            .on_break()
            .map(|b| b.name.clone())
            .unwrap_or_default(),
        _ => current_task.map(|t| t.name.clone()).unwrap_or_default(),
    };
    let name_color = match state {
        ClockState::OnBreak => Color::Magenta,
        _ => current_task
            .and_then(|t| {
                settings
                    .colors
                    .task_specific
                    .get(&t.id)
                    .or(Some(&t.color))
            })
            .and_then(|c| hex_color(c))
            .unwrap_or(text),
    };
    if blink_visible(app, state, now.timestamp_millis()) {
        f.render_widget(
            Paragraph::new(name_line)
                .style(Style::default().fg(name_color))
                .alignment(Alignment::Center),
            rows[2],
        );
    }

    // Best record, or the countdown while on break
    let detail = match (state, clock.on_break()) {
        (ClockState::OnBreak, Some(b)) => format!("ends in {}", format_elapsed(b.remaining_ms(now))),
        _ => format!("Best: {}", format_best(current_task.and_then(|t| t.best_record))),
    };
    f.render_widget(
        Paragraph::new(detail)
            .style(Style::default().fg(text))
            .alignment(Alignment::Center),
        rows[3],
    );

    if let (ClockState::OnBreak, Some(b)) = (state, clock.on_break()) {
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(Color::Magenta))
            .ratio(b.fraction_remaining(now))
            .label(format!("{:.0}% left", b.fraction_remaining(now) * 100.0));
        f.render_widget(gauge, rows[4]);
    } else if clock.is_paused() && state != ClockState::Idle {
        f.render_widget(
            Paragraph::new("[paused]")
                .style(Style::default().fg(Color::Yellow))
                .alignment(Alignment::Center),
            rows[4],
        );
    }

    if let Some(notice) = &app.notice {
        f.render_widget(
            Paragraph::new(notice.as_str())
                .style(Style::default().fg(Color::Yellow))
                .alignment(Alignment::Center),
            rows[5],
        );
    }
}

/// Section two: the roster.
fn draw_roster(f: &mut Frame, app: &mut App, area: Rect) {
    let now = Local::now();
    let settings = &app.tracker.settings;
    let border = hex_color(&settings.colors.border_color).unwrap_or(Color::Reset);
    let current = app.tracker.clock.current_index();

    let rows: Vec<Row> = app
        .tracker
        .roster
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let is_current = current == Some(i);
            let total = if is_current {
                t.total_time + app.tracker.clock.compute_elapsed(now)
            } else {
                t.total_time
            };
            let status = if t.completed {
                "Done"
            } else if is_current {
                match app.tracker.clock.state() {
                    ClockState::OnBreak => "On break",
                    ClockState::Paused => "Paused",
                    _ => "Timing",
                }
            } else {
                "Pending"
            };
            let marker = if is_current { ">" } else { "" };
            let row_color = settings
                .colors
                .task_specific
                .get(&t.id)
                .and_then(|c| hex_color(c));
            let mut style = Style::default();
            if let Some(c) = row_color {
                style = style.fg(c);
            }
            if t.completed {
                style = style.add_modifier(Modifier::DIM);
            }
            Row::new(vec![
                Cell::from(marker),
                Cell::from((i + 1).to_string()),
                Cell::from(t.name.clone()),
                Cell::from(format_elapsed(total)),
                Cell::from(format_best(t.best_record)),
                Cell::from(status),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(1),
        Constraint::Length(4),
        Constraint::Min(20),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(9),
    ];

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title("Tasks");
    if let Some(bg) = hex_color(&settings.colors.section2_bg) {
        block = block.style(Style::default().bg(bg));
    }

    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["", "#", "Name", "Total", "Best", "Status"])
                .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                .bottom_margin(1),
        )
        .block(block)
        .row_highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
        .highlight_symbol(">> ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn draw_help(f: &mut Frame, app: &App, area: Rect) {
    let help_text = match app.input_mode {
        InputMode::Normal => {
            "q: Quit | Enter: Start Task | Space: Pause/Resume | c: Complete | n: Next | a: Add | r: Rename | d: Del | J/K: Move"
        }
        InputMode::Editing => "Enter: Save | Esc: Cancel",
    };

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(help, area);
}

/// Whether the task name is visible this frame. Blinking runs only while
/// actually timing; paused, idle and on-break names hold steady.
fn blink_visible(app: &App, state: ClockState, now_ms: i64) -> bool {
    if app.tracker.settings.disable_blink || state != ClockState::Running {
        return true;
    }
    let period = app.tracker.settings.blink_speed.max(1) as i64;
    (now_ms / period) % 2 == 0
}

/// Parses `#rrggbb` into a terminal color.
fn hex_color(s: &str) -> Option<Color> {
    let hex = s.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length((r.height.saturating_sub(height)) / 2),
                Constraint::Length(height),
                Constraint::Length((r.height.saturating_sub(height)) / 2),
            ]
            .as_ref(),
        )
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ]
            .as_ref(),
        )
        .split(popup_layout[1])[1]
}
