use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::AppConfig;
use crate::corr_matrix::CorrelationMatrix;
use crate::error::DataError;
use crate::locator::{STATS, TEAMS, team_display_name};
use crate::player_rounds::{PlayerRounds, StatDisplayEntry, resolve_stats};

const MAX_LOGS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Heatmap,
    PlayerRounds,
}

/// Team and the two stats whose correlation is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub team_idx: usize,
    pub stat1_idx: usize,
    pub stat2_idx: usize,
}

impl Selection {
    pub fn team(&self) -> &'static str {
        TEAMS[self.team_idx % TEAMS.len()]
    }

    pub fn stat1(&self) -> &'static str {
        STATS[self.stat1_idx % STATS.len()]
    }

    pub fn stat2(&self) -> &'static str {
        STATS[self.stat2_idx % STATS.len()]
    }

    pub fn label(&self) -> String {
        format!("{}: {} vs {}", self.team(), self.stat1(), self.stat2())
    }
}

/// Identifies one in-flight fetch. A response is applied only while its tag
/// is still the one the screen is waiting for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTag {
    pub generation: u64,
    pub key: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Matrix,
    Rounds,
}

/// Latest issued generation per request kind, shared with the provider so it
/// can skip commands that were superseded while queued.
#[derive(Debug, Clone, Default)]
pub struct LatestRequests {
    matrix: Arc<AtomicU64>,
    rounds: Arc<AtomicU64>,
}

impl LatestRequests {
    fn slot(&self, kind: RequestKind) -> &AtomicU64 {
        match kind {
            RequestKind::Matrix => &self.matrix,
            RequestKind::Rounds => &self.rounds,
        }
    }

    pub fn mark(&self, kind: RequestKind, generation: u64) {
        self.slot(kind).store(generation, Ordering::SeqCst);
    }

    pub fn is_current(&self, kind: RequestKind, generation: u64) -> bool {
        self.slot(kind).load(Ordering::SeqCst) == generation
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    Idle,
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> LoadState<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            LoadState::Ready(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoundsView {
    pub team: String,
    pub row_player: String,
    pub col_player: String,
    pub stats: Vec<StatDisplayEntry>,
    pub data: LoadState<PlayerRounds>,
    pub scroll: u16,
}

/// Title line and the blank under it.
const ROUNDS_HEADER_LINES: usize = 2;

impl RoundsView {
    /// Lines the rounds screen renders for this view.
    ///
    /// Each stat table is a heading, a column header, one line per round and
    /// a trailing blank. Loading, failure and "no data" are one line.
    pub fn content_lines(&self) -> usize {
        let body = match self.data.ready() {
            Some(rounds) => match rounds.rounds().len() {
                0 => 1,
                n => self.stats.len() * (n + 3),
            },
            None => 1,
        };
        ROUNDS_HEADER_LINES + body
    }
}

#[derive(Debug)]
pub enum ProviderCommand {
    FetchMatrix {
        tag: RequestTag,
        team: String,
        stat1: String,
        stat2: String,
    },
    FetchPlayerRounds {
        tag: RequestTag,
        team: String,
        row_player: String,
        col_player: String,
    },
}

#[derive(Debug)]
pub enum Delta {
    MatrixLoaded {
        tag: RequestTag,
        result: Result<CorrelationMatrix, DataError>,
    },
    RoundsLoaded {
        tag: RequestTag,
        result: Result<PlayerRounds, DataError>,
    },
    Log(String),
}

#[derive(Debug)]
pub struct AppState {
    pub screen: Screen,
    pub selection: Selection,
    pub show_values: bool,
    pub cursor_row: usize,
    pub cursor_col: usize,
    pub matrix: LoadState<CorrelationMatrix>,
    pub matrix_tag: Option<RequestTag>,
    pub rounds: Option<RoundsView>,
    pub rounds_tag: Option<RequestTag>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
    pub latest: LatestRequests,
    next_generation: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            screen: Screen::Heatmap,
            selection: Selection {
                team_idx: 0,
                stat1_idx: 0,
                stat2_idx: 1,
            },
            show_values: true,
            cursor_row: 0,
            cursor_col: 0,
            matrix: LoadState::Idle,
            matrix_tag: None,
            rounds: None,
            rounds_tag: None,
            logs: VecDeque::with_capacity(MAX_LOGS),
            help_overlay: false,
            latest: LatestRequests::default(),
            next_generation: 0,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let mut state = Self::new();
        state.selection = Selection {
            team_idx: config.team_idx,
            stat1_idx: config.stat1_idx,
            stat2_idx: config.stat2_idx,
        };
        state.show_values = config.show_values;
        state
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    fn issue(&mut self, kind: RequestKind, key: String) -> RequestTag {
        self.next_generation += 1;
        self.latest.mark(kind, self.next_generation);
        RequestTag {
            generation: self.next_generation,
            key,
        }
    }

    /// Start loading the matrix for the current selection; any older matrix
    /// request becomes stale.
    pub fn begin_matrix_request(&mut self) -> ProviderCommand {
        let tag = self.issue(RequestKind::Matrix, self.selection.label());
        self.matrix = LoadState::Loading;
        self.matrix_tag = Some(tag.clone());
        ProviderCommand::FetchMatrix {
            tag,
            team: self.selection.team().to_string(),
            stat1: self.selection.stat1().to_string(),
            stat2: self.selection.stat2().to_string(),
        }
    }

    /// Open the round comparison for the cell under the cursor.
    pub fn begin_rounds_request(&mut self) -> Option<ProviderCommand> {
        let (row_player, col_player) = self.selected_pair()?;
        let team = self.selection.team().to_string();
        let key = format!("{team}: {row_player} × {col_player}");
        let tag = self.issue(RequestKind::Rounds, key);
        self.rounds = Some(RoundsView {
            team: team.clone(),
            row_player: row_player.clone(),
            col_player: col_player.clone(),
            stats: resolve_stats(&[self.selection.stat1(), self.selection.stat2()]),
            data: LoadState::Loading,
            scroll: 0,
        });
        self.rounds_tag = Some(tag.clone());
        self.screen = Screen::PlayerRounds;
        Some(ProviderCommand::FetchPlayerRounds {
            tag,
            team,
            row_player,
            col_player,
        })
    }

    /// Leave the round comparison; a response still in flight is dropped.
    pub fn close_rounds(&mut self) {
        if self.rounds_tag.take().is_some() {
            self.next_generation += 1;
            self.latest.mark(RequestKind::Rounds, self.next_generation);
        }
        self.rounds = None;
        self.screen = Screen::Heatmap;
    }

    pub fn cycle_team(&mut self, forward: bool) {
        self.selection.team_idx = cycle(self.selection.team_idx, TEAMS.len(), forward);
    }

    pub fn cycle_stat1(&mut self, forward: bool) {
        self.selection.stat1_idx = cycle(self.selection.stat1_idx, STATS.len(), forward);
    }

    pub fn cycle_stat2(&mut self, forward: bool) {
        self.selection.stat2_idx = cycle(self.selection.stat2_idx, STATS.len(), forward);
    }

    pub fn team_display(&self) -> String {
        team_display_name(self.selection.team())
    }

    pub fn move_cursor(&mut self, d_row: isize, d_col: isize) {
        let Some(m) = self.matrix.ready() else {
            return;
        };
        self.cursor_row = step(self.cursor_row, d_row, m.row_count());
        self.cursor_col = step(self.cursor_col, d_col, m.col_count());
    }

    pub fn selected_pair(&self) -> Option<(String, String)> {
        let m = self.matrix.ready()?;
        m.pair(self.cursor_row, self.cursor_col)
            .map(|(r, c)| (r.to_string(), c.to_string()))
    }

    /// Scroll the rounds screen, keeping at least its last line in view.
    pub fn scroll_rounds(&mut self, delta: i16) {
        if let Some(view) = self.rounds.as_mut() {
            let max = u16::try_from(view.content_lines().saturating_sub(1)).unwrap_or(u16::MAX);
            view.scroll = view.scroll.saturating_add_signed(delta).min(max);
        }
    }

    fn clamp_cursor(&mut self) {
        let (rows, cols) = self
            .matrix
            .ready()
            .map(|m| (m.row_count(), m.col_count()))
            .unwrap_or((0, 0));
        self.cursor_row = self.cursor_row.min(rows.saturating_sub(1));
        self.cursor_col = self.cursor_col.min(cols.saturating_sub(1));
    }
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::MatrixLoaded { tag, result } => {
            if state.matrix_tag.as_ref() != Some(&tag) {
                state.push_log(format!("[INFO] Dropped stale heatmap response ({})", tag.key));
                return;
            }
            match result {
                Ok(matrix) => {
                    state.push_log(format!(
                        "[INFO] Loaded {} ({} x {})",
                        tag.key,
                        matrix.row_count(),
                        matrix.col_count()
                    ));
                    state.matrix = LoadState::Ready(matrix);
                    state.clamp_cursor();
                }
                Err(err) => {
                    state.push_log(format!("[WARN] {} [{}]: {err}", tag.key, err.kind_label()));
                    state.matrix = LoadState::Failed(err.to_string());
                }
            }
        }
        Delta::RoundsLoaded { tag, result } => {
            if state.rounds_tag.as_ref() != Some(&tag) {
                state.push_log(format!("[INFO] Dropped stale round response ({})", tag.key));
                return;
            }
            let Some(view) = state.rounds.as_mut() else {
                return;
            };
            let msg = match result {
                Ok(rounds) => {
                    let msg = format!(
                        "[INFO] Loaded rounds for {} ({} + {} records)",
                        tag.key,
                        rounds.row.len(),
                        rounds.col.len()
                    );
                    view.data = LoadState::Ready(rounds);
                    msg
                }
                Err(err) => {
                    let msg = format!("[WARN] {} [{}]: {err}", tag.key, err.kind_label());
                    view.data = LoadState::Failed(err.to_string());
                    msg
                }
            };
            state.push_log(msg);
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}

fn cycle(idx: usize, len: usize, forward: bool) -> usize {
    if len == 0 {
        return 0;
    }
    if forward {
        (idx + 1) % len
    } else {
        (idx + len - 1) % len
    }
}

fn step(idx: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let next = idx as isize + delta;
    next.clamp(0, len as isize - 1) as usize
}
