use std::fs;
use std::path::{Path, PathBuf};

use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use url::Url;

use crate::config::{AppConfig, DataSource};
use crate::corr_matrix::{CorrelationMatrix, parse_corr_csv};
use crate::error::DataError;
use crate::http_client::http_client;
use crate::locator::{DataLocator, corr_matrix_locator, player_rounds_locator};
use crate::player_rounds::{PlayerRounds, extract_player_rounds};

pub fn fetch_corr_matrix(
    config: &AppConfig,
    team: &str,
    stat1: &str,
    stat2: &str,
) -> Result<CorrelationMatrix, DataError> {
    let locator = corr_matrix_locator(&config.corr_root, team, stat1, stat2);
    let text = fetch_text(&config.source, &locator)?;
    parse_corr_csv(&text)
}

pub fn fetch_player_rounds(
    config: &AppConfig,
    team: &str,
    row_player: &str,
    col_player: &str,
) -> Result<PlayerRounds, DataError> {
    let locator = player_rounds_locator(&config.rounds_root, team);
    let text = fetch_text(&config.source, &locator)?;
    extract_player_rounds(&text, row_player, col_player)
}

pub fn fetch_text(source: &DataSource, locator: &DataLocator) -> Result<String, DataError> {
    match source {
        DataSource::Http(base) => fetch_http(base, locator),
        DataSource::Dir(root) => read_local(root, locator),
    }
}

/// Segments are percent-encoded individually, so `K%` and spaces survive.
pub fn locator_url(base: &Url, locator: &DataLocator) -> Result<Url, DataError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| DataError::fetch(base.as_str(), "base url cannot hold a path"))?
        .pop_if_empty()
        .extend(locator.segments.iter());
    Ok(url)
}

pub fn locator_path(root: &Path, locator: &DataLocator) -> PathBuf {
    let mut path = root.to_path_buf();
    for segment in &locator.segments {
        path.push(segment);
    }
    path
}

fn fetch_http(base: &Url, locator: &DataLocator) -> Result<String, DataError> {
    let url = locator_url(base, locator)?;
    let client = http_client().map_err(|err| DataError::fetch(url.as_str(), format!("{err:#}")))?;
    let resp = client
        .get(url.clone())
        .send()
        .map_err(|err| DataError::fetch(url.as_str(), err))?;

    let status = resp.status();
    let content_type = resp
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    check_response(url.as_str(), status, &content_type)?;
    resp.text()
        .map_err(|err| DataError::fetch(url.as_str(), err))
}

fn read_local(root: &Path, locator: &DataLocator) -> Result<String, DataError> {
    let path = locator_path(root, locator);
    fs::read_to_string(&path).map_err(|err| DataError::fetch(path.display().to_string(), err))
}

/// A CSV response must be 2xx and must not be an HTML page.
pub fn check_response(
    location: &str,
    status: StatusCode,
    content_type: &str,
) -> Result<(), DataError> {
    if !status.is_success() {
        return Err(DataError::fetch(location, format!("http {status}")));
    }
    // Dev servers answer unknown paths with their index page instead of a 404.
    if is_html_content_type(content_type) {
        return Err(DataError::fetch(location, "not a CSV (got text/html)"));
    }
    Ok(())
}

pub fn is_html_content_type(content_type: &str) -> bool {
    content_type.to_ascii_lowercase().contains("text/html")
}
