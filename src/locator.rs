//! Static file layout for matrices and round stats.
//!
//! Locators are plain path segments; `data_fetch` decides whether they become
//! URL path segments (percent-encoded) or filesystem components.

pub const TEAMS: [&str; 18] = [
    "Hawthorn",
    "Essendon",
    "Collingwood",
    "Sydney",
    "Melbourne",
    "Carlton",
    "Richmond",
    "Geelong",
    "Brisbane",
    "Fremantle",
    "Adelaide",
    "Port-Adelaide",
    "St-Kilda",
    "Western-Bulldogs",
    "Greater-Western-Sydney",
    "Gold-Coast",
    "North-Melbourne",
    "West-Coast",
];

pub const STATS: [&str; 10] = [
    "DispDiff",
    "KickDiff",
    "HbDiff",
    "MarkDiff",
    "Disposals",
    "Kicks",
    "Handballs",
    "Marks",
    "K%",
    "H%",
];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataLocator {
    pub segments: Vec<String>,
}

impl DataLocator {
    fn under(root: &str, tail: impl IntoIterator<Item = String>) -> Self {
        let mut segments: Vec<String> = root
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect();
        segments.extend(tail);
        Self { segments }
    }

    /// Unencoded `a/b/c` form, for log lines.
    pub fn display(&self) -> String {
        self.segments.join("/")
    }
}

/// Lowercase, whitespace runs collapsed to a single `-`.
pub fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_space = false;
    for ch in name.chars() {
        if ch.is_whitespace() {
            if !in_space {
                out.push('-');
            }
            in_space = true;
        } else {
            out.extend(ch.to_lowercase());
            in_space = false;
        }
    }
    out
}

/// Teams are keyed with hyphens (`Port-Adelaide`); round-stat folders use spaces.
pub fn team_display_name(team: &str) -> String {
    team.replace('-', " ")
}

pub fn corr_matrix_locator(root: &str, team: &str, stat1: &str, stat2: &str) -> DataLocator {
    let folder = format!("{stat1}_vs_{stat2}");
    let file = format!(
        "{}_{}_vs_{}_corr.csv",
        slug(team),
        stat1.to_lowercase(),
        stat2.to_lowercase()
    );
    DataLocator::under(root, [team.to_string(), folder, file])
}

pub fn player_rounds_locator(root: &str, team: &str) -> DataLocator {
    let team_spaced = team_display_name(team);
    let folder = format!("{team_spaced}_R1-24");
    let file = format!("{}_stats_clean.csv", team_spaced.to_lowercase());
    DataLocator::under(root, [folder, file])
}
