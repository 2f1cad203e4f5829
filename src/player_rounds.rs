use std::collections::{HashMap, HashSet};

use csv::ReaderBuilder;

use crate::error::DataError;

pub const PLAYER_FIELD: &str = "Player";
pub const ROUND_FIELD: &str = "Round";

/// Difference stats are shown through the raw per-round count they derive from.
const STAT_TO_COLUMN: [(&str, &str); 4] = [
    ("DispDiff", "Disposals"),
    ("KickDiff", "Kicks"),
    ("HbDiff", "Handballs"),
    ("MarkDiff", "Marks"),
];

const MISSING_VALUE: &str = "—";

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRoundRecord {
    pub player: String,
    pub round: f64,
    /// Every column of the source row, raw.
    pub fields: HashMap<String, String>,
}

impl PlayerRoundRecord {
    pub fn field(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(|v| v.as_str())
    }
}

/// Round histories for the two players of a clicked cell.
///
/// When both names are the same player the two histories are identical.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlayerRounds {
    pub row_player: String,
    pub col_player: String,
    pub row: Vec<PlayerRoundRecord>,
    pub col: Vec<PlayerRoundRecord>,
}

impl PlayerRounds {
    pub fn history(&self, player: &str) -> &[PlayerRoundRecord] {
        if player == self.row_player {
            &self.row
        } else if player == self.col_player {
            &self.col
        } else {
            &[]
        }
    }

    /// Rounds either player appears in, ascending, each once.
    pub fn rounds(&self) -> Vec<f64> {
        let mut rounds: Vec<f64> = self.row.iter().chain(&self.col).map(|r| r.round).collect();
        rounds.sort_by(f64::total_cmp);
        rounds.dedup();
        rounds
    }

    pub fn is_empty(&self) -> bool {
        self.row.is_empty() && self.col.is_empty()
    }
}

pub fn extract_player_rounds(
    text: &str,
    row_player: &str,
    col_player: &str,
) -> Result<PlayerRounds, DataError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());
    let headers = reader
        .headers()
        .map_err(|err| DataError::Parse(err.to_string()))?
        .clone();

    let mut out = PlayerRounds {
        row_player: row_player.to_string(),
        col_player: col_player.to_string(),
        ..PlayerRounds::default()
    };

    for result in reader.records() {
        let Ok(raw) = result else {
            continue;
        };
        // Short rows just lack the trailing columns; extra fields have no name and are ignored.
        let fields: HashMap<String, String> = headers
            .iter()
            .zip(raw.iter())
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        let Some(player) = fields.get(PLAYER_FIELD).filter(|p| !p.is_empty()) else {
            continue;
        };
        if player != row_player && player != col_player {
            continue;
        }
        let Some(round) = parse_round(fields.get(ROUND_FIELD)) else {
            continue;
        };
        let record = PlayerRoundRecord {
            player: player.clone(),
            round,
            fields,
        };
        if record.player == row_player {
            out.row.push(record.clone());
        }
        if record.player == col_player {
            out.col.push(record);
        }
    }

    // Vec::sort_by is stable, so duplicate rounds keep file order.
    out.row.sort_by(|a, b| a.round.total_cmp(&b.round));
    out.col.sort_by(|a, b| a.round.total_cmp(&b.round));
    Ok(out)
}

fn parse_round(raw: Option<&String>) -> Option<f64> {
    raw?.trim().parse::<f64>().ok().filter(|r| r.is_finite())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatDisplayEntry {
    pub requested: String,
    pub column: String,
}

impl StatDisplayEntry {
    pub fn heading(&self) -> String {
        if self.column == self.requested {
            self.column.clone()
        } else {
            format!("{} (from {})", self.column, self.requested)
        }
    }
}

pub fn stat_to_column(stat: &str) -> &str {
    STAT_TO_COLUMN
        .iter()
        .find(|(name, _)| *name == stat)
        .map(|(_, column)| *column)
        .unwrap_or(stat)
}

/// Resolve requested stats to columns, keeping the first request for each column.
pub fn resolve_stats<S: AsRef<str>>(requested: &[S]) -> Vec<StatDisplayEntry> {
    let mut seen = HashSet::new();
    let mut order = Vec::new();
    for stat in requested {
        let stat = stat.as_ref();
        if stat.is_empty() {
            continue;
        }
        let column = stat_to_column(stat);
        if !seen.insert(column.to_string()) {
            continue;
        }
        order.push(StatDisplayEntry {
            requested: stat.to_string(),
            column: column.to_string(),
        });
    }
    order
}

pub fn format_value(record: Option<&PlayerRoundRecord>, column: &str) -> String {
    let Some(record) = record else {
        return MISSING_VALUE.to_string();
    };
    let raw = match record.field(column) {
        Some(raw) if !raw.is_empty() => raw,
        _ => return MISSING_VALUE.to_string(),
    };
    match raw.trim().parse::<f64>() {
        Ok(num) if num.is_finite() && num.fract() == 0.0 => format!("{num}"),
        Ok(num) if num.is_finite() => format!("{num:.2}"),
        _ => raw.to_string(),
    }
}

pub fn format_round(round: f64) -> String {
    if round.fract() == 0.0 {
        format!("{round}")
    } else {
        format!("{round:.2}")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    pub round: f64,
    pub row_value: String,
    pub col_value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatTable {
    pub entry: StatDisplayEntry,
    pub rows: Vec<ComparisonRow>,
}

/// One table per displayed stat, one row per round either player played.
/// A round listed twice for a player shows its first record.
pub fn comparison_tables(rounds: &PlayerRounds, stats: &[StatDisplayEntry]) -> Vec<StatTable> {
    let all_rounds = rounds.rounds();
    stats
        .iter()
        .map(|entry| {
            let rows = all_rounds
                .iter()
                .map(|&round| {
                    let row_rec = rounds.row.iter().find(|r| r.round == round);
                    let col_rec = rounds.col.iter().find(|r| r.round == round);
                    ComparisonRow {
                        round,
                        row_value: format_value(row_rec, &entry.column),
                        col_value: format_value(col_rec, &entry.column),
                    }
                })
                .collect();
            StatTable {
                entry: entry.clone(),
                rows,
            }
        })
        .collect()
}
