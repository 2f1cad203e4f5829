use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use url::Url;

use crate::locator::{STATS, TEAMS};

const DEFAULT_DATA_BASE: &str = "http://localhost:3000";
const DEFAULT_CORR_ROOT: &str = "data";
const DEFAULT_ROUNDS_ROOT: &str = "player-round-stats";
const DEFAULT_TEAM: &str = "Hawthorn";
const DEFAULT_STAT1: &str = "DispDiff";
const DEFAULT_STAT2: &str = "KickDiff";

/// Where the static CSV tree lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Http(Url),
    Dir(PathBuf),
}

impl DataSource {
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(anyhow!("empty data base"));
        }
        if raw.starts_with("http://") || raw.starts_with("https://") {
            let url = Url::parse(raw).with_context(|| format!("invalid data base url {raw}"))?;
            return Ok(DataSource::Http(url));
        }
        if raw.starts_with("file://") {
            let url = Url::parse(raw).with_context(|| format!("invalid file url {raw}"))?;
            let path = url
                .to_file_path()
                .map_err(|_| anyhow!("file url has no local path: {raw}"))?;
            return Ok(DataSource::Dir(path));
        }
        Ok(DataSource::Dir(PathBuf::from(raw)))
    }

    pub fn label(&self) -> String {
        match self {
            DataSource::Http(url) => url.to_string(),
            DataSource::Dir(path) => path.display().to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub source: DataSource,
    pub corr_root: String,
    pub rounds_root: String,
    pub team_idx: usize,
    pub stat1_idx: usize,
    pub stat2_idx: usize,
    pub show_values: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let base = env::var("AFL_DATA_BASE").unwrap_or_else(|_| DEFAULT_DATA_BASE.to_string());
        let source = DataSource::parse(&base)?;
        Ok(Self {
            source,
            corr_root: env_or("AFL_CORR_ROOT", DEFAULT_CORR_ROOT),
            rounds_root: env_or("AFL_ROUNDS_ROOT", DEFAULT_ROUNDS_ROOT),
            team_idx: index_of(&TEAMS, &env_or("AFL_TEAM", DEFAULT_TEAM)).unwrap_or(0),
            stat1_idx: index_of(&STATS, &env_or("AFL_STAT1", DEFAULT_STAT1)).unwrap_or(0),
            stat2_idx: index_of(&STATS, &env_or("AFL_STAT2", DEFAULT_STAT2)).unwrap_or(1),
            show_values: env_bool("AFL_SHOW_VALUES", true),
        })
    }

    pub fn with_source(source: DataSource) -> Self {
        Self {
            source,
            corr_root: DEFAULT_CORR_ROOT.to_string(),
            rounds_root: DEFAULT_ROUNDS_ROOT.to_string(),
            team_idx: 0,
            stat1_idx: 0,
            stat2_idx: 1,
            show_values: true,
        }
    }
}

pub fn index_of(options: &[&str], value: &str) -> Option<usize> {
    let value = value.trim();
    options
        .iter()
        .position(|o| *o == value)
        .or_else(|| options.iter().position(|o| o.eq_ignore_ascii_case(value)))
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .map(|v| {
            let t = v.trim().to_ascii_lowercase();
            !(t.is_empty() || t == "0" || t == "false" || t == "off" || t == "no")
        })
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sources() {
        assert!(matches!(
            DataSource::parse("http://localhost:3000").unwrap(),
            DataSource::Http(_)
        ));
        assert_eq!(
            DataSource::parse("/srv/afl").unwrap(),
            DataSource::Dir(PathBuf::from("/srv/afl"))
        );
        assert_eq!(
            DataSource::parse("file:///srv/afl").unwrap(),
            DataSource::Dir(PathBuf::from("/srv/afl"))
        );
        assert!(DataSource::parse("  ").is_err());
    }

    #[test]
    fn lookup_is_case_insensitive_fallback() {
        assert_eq!(index_of(&TEAMS, "st-kilda"), Some(12));
        assert_eq!(index_of(&STATS, "K%"), Some(8));
        assert_eq!(index_of(&STATS, "Tackles"), None);
    }
}
