use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use afl_corr_terminal::config::AppConfig;
use afl_corr_terminal::corr_color::{self, cell_paint, legend_gradient};
use afl_corr_terminal::corr_matrix::{CorrelationMatrix, format_cell_detail, format_cell_label};
use afl_corr_terminal::locator::team_display_name;
use afl_corr_terminal::player_rounds::{comparison_tables, format_round};
use afl_corr_terminal::provider::spawn_provider;
use afl_corr_terminal::state::{
    AppState, Delta, LoadState, ProviderCommand, RoundsView, Screen, apply_delta,
};

const LEGEND_STEPS: usize = 24;
const ERROR_COLOR: Color = Color::Rgb(0xb9, 0x1c, 0x1c);

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
}

impl App {
    fn new(state: AppState, cmd_tx: Option<mpsc::Sender<ProviderCommand>>) -> Self {
        Self {
            state,
            should_quit: false,
            cmd_tx,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                return;
            }
            KeyCode::Char('?') => {
                self.state.help_overlay = !self.state.help_overlay;
                return;
            }
            _ => {}
        }
        match self.state.screen {
            Screen::Heatmap => self.on_heatmap_key(key),
            Screen::PlayerRounds => self.on_rounds_key(key),
        }
    }

    fn on_heatmap_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('t') => self.change_selection(|s| s.cycle_team(true)),
            KeyCode::Char('T') => self.change_selection(|s| s.cycle_team(false)),
            KeyCode::Char('a') => self.change_selection(|s| s.cycle_stat1(true)),
            KeyCode::Char('A') => self.change_selection(|s| s.cycle_stat1(false)),
            KeyCode::Char('s') => self.change_selection(|s| s.cycle_stat2(true)),
            KeyCode::Char('S') => self.change_selection(|s| s.cycle_stat2(false)),
            KeyCode::Char('r') => self.request_matrix(),
            KeyCode::Char('v') => self.state.show_values = !self.state.show_values,
            KeyCode::Char('k') | KeyCode::Up => self.state.move_cursor(-1, 0),
            KeyCode::Char('j') | KeyCode::Down => self.state.move_cursor(1, 0),
            KeyCode::Char('h') | KeyCode::Left => self.state.move_cursor(0, -1),
            KeyCode::Char('l') | KeyCode::Right => self.state.move_cursor(0, 1),
            KeyCode::PageUp => self.state.move_cursor(-10, 0),
            KeyCode::PageDown => self.state.move_cursor(10, 0),
            KeyCode::Enter | KeyCode::Char('d') => self.request_rounds(),
            _ => {}
        }
    }

    fn on_rounds_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('b') | KeyCode::Esc => self.state.close_rounds(),
            KeyCode::Char('j') | KeyCode::Down => self.state.scroll_rounds(1),
            KeyCode::Char('k') | KeyCode::Up => self.state.scroll_rounds(-1),
            KeyCode::PageDown => self.state.scroll_rounds(10),
            KeyCode::PageUp => self.state.scroll_rounds(-10),
            KeyCode::Char('r') => self.request_rounds(),
            _ => {}
        }
    }

    fn change_selection(&mut self, f: impl FnOnce(&mut AppState)) {
        f(&mut self.state);
        self.request_matrix();
    }

    fn request_matrix(&mut self) {
        let cmd = self.state.begin_matrix_request();
        self.send(cmd, "Heatmap");
    }

    fn request_rounds(&mut self) {
        let Some(cmd) = self.state.begin_rounds_request() else {
            self.state.push_log("[INFO] No cell selected");
            return;
        };
        self.send(cmd, "Round data");
    }

    fn send(&mut self, cmd: ProviderCommand, what: &str) {
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log(format!("[INFO] {what} fetch unavailable"));
            return;
        };
        if tx.send(cmd).is_err() {
            self.state.push_log(format!("[WARN] {what} request failed"));
        }
    }
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let config = AppConfig::from_env().context("invalid configuration")?;
    let mut state = AppState::from_config(&config);
    state.push_log(format!("[INFO] Data source: {}", config.source.label()));

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    spawn_provider(config, state.latest.clone(), tx, cmd_rx);

    let mut app = App::new(state, Some(cmd_tx));
    app.request_matrix();

    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("enter alternate screen")?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend).context("create terminal")?;

    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Heatmap => render_heatmap(frame, chunks[1], &app.state),
        Screen::PlayerRounds => render_rounds(frame, chunks[1], &app.state),
    }

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text(&app.state)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let sel = &state.selection;
    let line1 = match state.screen {
        Screen::Heatmap => "AFL HEATMAPS".to_string(),
        Screen::PlayerRounds => "AFL HEATMAPS | PLAYER ROUNDS".to_string(),
    };
    let line2 = format!(
        "Team: {} | Stat 1: {} | Stat 2: {}",
        sel.team(),
        sel.stat1(),
        sel.stat2()
    );
    format!("{line1}\n{line2}")
}

fn footer_text(state: &AppState) -> String {
    match state.screen {
        Screen::Heatmap => {
            "t/T Team | a/A Stat 1 | s/S Stat 2 | hjkl/←↓↑→ Move | Enter/d Rounds | v Values | r Reload | ? Help | q Quit".to_string()
        }
        Screen::PlayerRounds => {
            "b/Esc Back to heatmap | j/k/↑/↓ Scroll | r Reload | ? Help | q Quit".to_string()
        }
    }
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No messages yet".to_string();
    }
    let start = state.logs.len().saturating_sub(3);
    state
        .logs
        .iter()
        .skip(start)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_heatmap(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default()
        .title(state.selection.label())
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    match &state.matrix {
        LoadState::Idle | LoadState::Loading => {
            frame.render_widget(Paragraph::new("Loading heatmap…"), inner);
        }
        LoadState::Failed(msg) => {
            let err = Paragraph::new(format!("Error: {msg}")).style(Style::default().fg(ERROR_COLOR));
            frame.render_widget(err, inner);
        }
        LoadState::Ready(matrix) if matrix.is_empty() => {
            let empty = Paragraph::new("Heatmap has no players")
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(empty, inner);
        }
        LoadState::Ready(matrix) => render_matrix(frame, inner, state, matrix),
    }
}

fn render_matrix(frame: &mut Frame, area: Rect, state: &AppState, matrix: &CorrelationMatrix) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    let cell_w: usize = if state.show_values { 6 } else { 3 };
    let label_w = matrix
        .row_labels
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0)
        .clamp(10, 22)
        + 1;

    let visible_cols = (area.width as usize).saturating_sub(label_w) / cell_w;
    let visible_rows = sections[1].height as usize;
    let (col_start, col_end) = visible_range(state.cursor_col, matrix.col_count(), visible_cols);
    let (row_start, row_end) = visible_range(state.cursor_row, matrix.row_count(), visible_rows);

    let bold = Style::default().add_modifier(Modifier::BOLD);

    let mut header = vec![Span::styled(pad("Players", label_w), bold)];
    for j in col_start..col_end {
        let text = format!(" {}", pad(&short_label(&matrix.col_labels[j], cell_w - 1), cell_w - 1));
        let style = if j == state.cursor_col {
            bold.fg(Color::Yellow)
        } else {
            Style::default()
        };
        header.push(Span::styled(text, style));
    }
    frame.render_widget(Paragraph::new(Line::from(header)), sections[0]);

    let mut lines = Vec::with_capacity(row_end - row_start);
    for i in row_start..row_end {
        let label_style = if i == state.cursor_row {
            bold.fg(Color::Yellow)
        } else {
            Style::default()
        };
        let mut spans = vec![Span::styled(pad(&matrix.row_labels[i], label_w), label_style)];
        for j in col_start..col_end {
            let value = matrix.value(i, j);
            let paint = cell_paint(value, matrix.is_diagonal(i, j));
            let label = if state.show_values {
                format_cell_label(value)
            } else {
                String::new()
            };
            let mut style = Style::default().bg(rgb(paint.fill)).fg(rgb(paint.text));
            if i == state.cursor_row && j == state.cursor_col {
                style = style.add_modifier(Modifier::REVERSED | Modifier::BOLD);
            }
            spans.push(Span::styled(
                format!(" {:>width$}", label, width = cell_w - 1),
                style,
            ));
        }
        lines.push(Line::from(spans));
    }
    frame.render_widget(Paragraph::new(lines), sections[1]);

    let status = match matrix.pair(state.cursor_row, state.cursor_col) {
        Some((r, c)) => format!(
            "{r} × {c}: {}   (Enter for round comparison)",
            format_cell_detail(matrix.value(state.cursor_row, state.cursor_col))
        ),
        None => String::new(),
    };
    frame.render_widget(Paragraph::new(status), sections[2]);

    frame.render_widget(Paragraph::new(legend_line()), sections[3]);
}

fn legend_line() -> Line<'static> {
    let mut spans = vec![Span::raw("−1 ")];
    for fill in legend_gradient(LEGEND_STEPS) {
        spans.push(Span::styled("█", Style::default().fg(rgb(fill))));
    }
    spans.push(Span::raw(" +1   "));
    spans.push(Span::styled(
        "grey = diagonal / missing",
        Style::default().fg(Color::DarkGray),
    ));
    Line::from(spans)
}

fn render_rounds(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Player Rounds").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(view) = &state.rounds else {
        frame.render_widget(Paragraph::new("No players selected"), inner);
        return;
    };

    let mut lines = vec![
        Line::styled(
            format!(
                "{} × {} | Team: {}",
                view.row_player,
                view.col_player,
                team_display_name(&view.team)
            ),
            Style::default().fg(Color::Gray),
        ),
        Line::raw(""),
    ];
    lines.extend(rounds_body(view));

    let body = Paragraph::new(lines).scroll((view.scroll, 0));
    frame.render_widget(body, inner);
}

fn rounds_body(view: &RoundsView) -> Vec<Line<'static>> {
    let rounds = match &view.data {
        LoadState::Idle | LoadState::Loading => return vec![Line::raw("Loading round data…")],
        LoadState::Failed(msg) => {
            return vec![Line::styled(msg.clone(), Style::default().fg(ERROR_COLOR))];
        }
        LoadState::Ready(rounds) => rounds,
    };
    if rounds.rounds().is_empty() {
        return vec![Line::raw("No round data found for the selected players.")];
    }

    let round_w = 7;
    let row_w = view.row_player.chars().count().clamp(8, 24) + 2;
    let col_w = view.col_player.chars().count().clamp(8, 24) + 2;
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let mut lines = Vec::new();
    for table in comparison_tables(rounds, &view.stats) {
        lines.push(Line::styled(table.entry.heading(), bold.fg(Color::Cyan)));
        lines.push(Line::styled(
            format!(
                "{}{}{}",
                pad("Round", round_w),
                pad(&view.row_player, row_w),
                pad(&view.col_player, col_w)
            ),
            bold,
        ));
        for row in &table.rows {
            lines.push(Line::raw(format!(
                "{}{}{}",
                pad(&format_round(row.round), round_w),
                pad(&row.row_value, row_w),
                pad(&row.col_value, col_w)
            )));
        }
        lines.push(Line::raw(""));
    }
    lines
}

fn rgb(c: corr_color::Rgb) -> Color {
    Color::Rgb(c.r, c.g, c.b)
}

/// Truncate or right-pad to exactly `width` columns.
fn pad(text: &str, width: usize) -> String {
    let truncated: String = text.chars().take(width.saturating_sub(1)).collect();
    format!("{truncated:<width$}")
}

/// "James Sicily" -> "J.Sicily", cut to `width`.
fn short_label(name: &str, width: usize) -> String {
    if name.chars().count() <= width {
        return name.to_string();
    }
    let words: Vec<&str> = name.split_whitespace().collect();
    let short = match (words.first(), words.last()) {
        (Some(first), Some(last)) if words.len() > 1 => {
            let initial = first.chars().next().unwrap_or_default();
            format!("{initial}.{last}")
        }
        _ => name.to_string(),
    };
    short.chars().take(width).collect()
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 || visible == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "AFL Heatmaps - Help",
        "",
        "Heatmap:",
        "  t / T        Next / previous team",
        "  a / A        Cycle stat 1",
        "  s / S        Cycle stat 2",
        "  hjkl / ←↓↑→  Move cell cursor",
        "  Enter / d    Compare the two players by round",
        "  v            Toggle cell values",
        "  r            Reload",
        "",
        "Player rounds:",
        "  b / Esc      Back to heatmap",
        "  j/k or ↑/↓   Scroll",
        "",
        "  ?            Toggle help",
        "  q            Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
