use thiserror::Error;

/// Failure of one data request. Scoped to that request; never fatal to the app.
#[derive(Debug, Error)]
pub enum DataError {
    /// Network/HTTP failure, missing file, or an HTML page served where a CSV was expected.
    #[error("fetch failed for {location}: {reason}")]
    Fetch { location: String, reason: String },

    /// The CSV is structurally unusable (no header row, too few columns).
    #[error("CSV format not recognized: {0}")]
    Format(String),

    /// The CSV text could not be read at all.
    #[error("unable to parse player data: {0}")]
    Parse(String),
}

impl DataError {
    pub fn fetch(location: impl Into<String>, reason: impl ToString) -> Self {
        DataError::Fetch {
            location: location.into(),
            reason: reason.to_string(),
        }
    }

    pub fn kind_label(&self) -> &'static str {
        match self {
            DataError::Fetch { .. } => "FETCH",
            DataError::Format(_) => "FORMAT",
            DataError::Parse(_) => "PARSE",
        }
    }
}
