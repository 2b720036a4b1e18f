use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use common::{RankedScoreList, TileId, TilePalette};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

/// How many event-log lines are kept; older lines fall off the bottom.
const EVENT_LOG_CAP: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Play,
    Leaderboard,
}

/// Everything the renderer needs. Written by the presenter, the relay reader,
/// and the key handler; read once per frame.
#[derive(Debug, Clone)]
pub struct UiState {
    pub player_name: String,
    pub score_text: String,
    /// Currently activated tile and whether the activation is muted.
    pub active_tile: Option<(TileId, bool)>,
    pub failure_flash: bool,
    /// Newest first.
    pub event_log: Vec<String>,
    pub view: View,
    pub leaderboard: RankedScoreList,
}

pub type SharedUi = Arc<Mutex<UiState>>;

impl UiState {
    pub fn new(player_name: String) -> Self {
        UiState {
            player_name,
            score_text: "--".to_string(),
            active_tile: None,
            failure_flash: false,
            event_log: Vec::new(),
            view: View::Play,
            leaderboard: RankedScoreList::new(),
        }
    }

    pub fn shared(player_name: String) -> SharedUi {
        Arc::new(Mutex::new(Self::new(player_name)))
    }

    /// Prepends one line to the rolling event log.
    pub fn push_notice(&mut self, line: String) {
        self.event_log.insert(0, line);
        self.event_log.truncate(EVENT_LOG_CAP);
    }

    pub fn set_score(&mut self, score: Option<u32>) {
        self.score_text = match score {
            Some(s) => format!("{:02}", s),
            None => "--".to_string(),
        };
    }
}

/// Poison-tolerant lock: a panicked writer never takes the UI down with it.
pub fn lock_ui(ui: &SharedUi) -> MutexGuard<'_, UiState> {
    ui.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub fn render(frame: &mut Frame, ui: &UiState, palette: &TilePalette) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(9),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_header(frame, chunks[0], ui);
    match ui.view {
        View::Play => {
            render_tiles(frame, chunks[1], ui, palette);
            render_event_log(frame, chunks[2], ui);
        }
        View::Leaderboard => {
            let body = Rect {
                y: chunks[1].y,
                height: chunks[1].height + chunks[2].height,
                ..chunks[1]
            };
            render_leaderboard(frame, body, ui);
        }
    }
    render_footer(frame, chunks[3], ui);
}

fn render_header(frame: &mut Frame, area: Rect, ui: &UiState) {
    let title = Line::from(vec![
        Span::styled(
            ui.player_name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("   score "),
        Span::styled(
            ui.score_text.clone(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
    ]);
    let block = Block::default().borders(Borders::ALL).title("EchoTiles");
    frame.render_widget(Paragraph::new(title).block(block), area);
}

fn render_tiles(frame: &mut Frame, area: Rect, ui: &UiState, palette: &TilePalette) {
    let constraints: Vec<Constraint> =
        vec![Constraint::Ratio(1, palette.len() as u32); palette.len()];
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for (i, tile) in palette.iter().enumerate() {
        let active = matches!(ui.active_tile, Some((id, _)) if id == tile.id);
        // Mirrors the reference palette: lit tiles at 50% lightness, idle at 25%.
        let lightness = if active { 0.50 } else { 0.25 };
        let (r, g, b) = hsl_to_rgb(tile.hue as f32, 1.0, lightness);
        let style = Style::default().bg(Color::Rgb(r, g, b));
        let label = format!("[{}]", i + 1);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(if ui.failure_flash {
                Style::default().fg(Color::Red)
            } else {
                Style::default()
            });
        let paragraph = Paragraph::new(label).style(style).block(block);
        frame.render_widget(paragraph, columns[i]);
    }
}

fn render_event_log(frame: &mut Frame, area: Rect, ui: &UiState) {
    let lines: Vec<Line> = ui
        .event_log
        .iter()
        .map(|l| Line::from(l.as_str()))
        .collect();
    let block = Block::default().borders(Borders::ALL).title("Players");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_leaderboard(frame: &mut Frame, area: Rect, ui: &UiState) {
    let block = Block::default().borders(Borders::ALL).title("High Scores");
    if ui.leaderboard.is_empty() {
        frame.render_widget(
            Paragraph::new("Be the first to score!").block(block),
            area,
        );
        return;
    }

    let now = Utc::now();
    let rows: Vec<Row> = ui
        .leaderboard
        .entries()
        .iter()
        .enumerate()
        .map(|(i, record)| {
            Row::new(vec![
                Cell::from(format!("{}", i + 1)),
                Cell::from(record.name.clone()),
                Cell::from(format!("{}", record.score)),
                Cell::from(format_relative_date(&record.date, now)),
            ])
        })
        .collect();
    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Min(12),
            Constraint::Length(7),
            Constraint::Min(16),
        ],
    )
    .header(Row::new(vec!["#", "Name", "Score", "Date"]).style(Style::default().add_modifier(Modifier::BOLD)))
    .block(block);
    frame.render_widget(table, area);
}

fn render_footer(frame: &mut Frame, area: Rect, ui: &UiState) {
    let help = match ui.view {
        View::Play => "1-4 press tile  |  l leaderboard  |  q quit",
        View::Leaderboard => "l back to game  |  q quit",
    };
    frame.render_widget(
        Paragraph::new(help).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}

/// Renders a stored date relative to now, in the style of the reference
/// leaderboard. Unparseable dates are shown as-is.
pub fn format_relative_date(date: &str, now: DateTime<Utc>) -> String {
    let parsed = match DateTime::parse_from_rfc3339(date) {
        Ok(d) => d.with_timezone(&Utc),
        Err(_) => return date.to_string(),
    };
    let minutes_ago = (now - parsed).num_minutes();
    if minutes_ago < 1 {
        "Seconds ago...".to_string()
    } else if minutes_ago < 60 {
        if minutes_ago == 1 {
            "1 minute ago".to_string()
        } else {
            format!("{} minutes ago", minutes_ago)
        }
    } else if minutes_ago < 60 * 24 {
        "Today".to_string()
    } else if minutes_ago < 60 * 24 * 2 {
        "Yesterday".to_string()
    } else {
        parsed.format("%a %b %e %Y").to_string()
    }
}

fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> (u8, u8, u8) {
    let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let h = hue / 60.0;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = lightness - c / 2.0;
    (
        ((r + m) * 255.0) as u8,
        ((g + m) * 255.0) as u8,
        ((b + m) * 255.0) as u8,
    )
}
