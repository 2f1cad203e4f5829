use csv::ReaderBuilder;

use crate::error::DataError;

/// Player-by-player correlation grid for one (team, stat1, stat2) selection.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub row_labels: Vec<String>,
    pub col_labels: Vec<String>,
    /// Row-major, `cells[row][col]`; always `row_labels.len()` x `col_labels.len()`.
    pub cells: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn row_count(&self) -> usize {
        self.row_labels.len()
    }

    pub fn col_count(&self) -> usize {
        self.col_labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_labels.is_empty() || self.col_labels.is_empty()
    }

    pub fn value(&self, row: usize, col: usize) -> Option<f64> {
        self.cells.get(row).and_then(|r| r.get(col)).copied().flatten()
    }

    /// A player compared with themselves.
    pub fn is_diagonal(&self, row: usize, col: usize) -> bool {
        match (self.row_labels.get(row), self.col_labels.get(col)) {
            (Some(r), Some(c)) => r == c,
            _ => false,
        }
    }

    pub fn pair(&self, row: usize, col: usize) -> Option<(&str, &str)> {
        let r = self.row_labels.get(row)?;
        let c = self.col_labels.get(col)?;
        Some((r.as_str(), c.as_str()))
    }
}

/// Parse a correlation CSV: row 0 holds column labels after a corner field,
/// column 0 of every later row holds the row label.
pub fn parse_corr_csv(text: &str) -> Result<CorrelationMatrix, DataError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.trim().as_bytes());

    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|err| DataError::Format(err.to_string()))?;
        rows.push(record.iter().map(|f| f.to_string()).collect());
    }

    let Some(header) = rows.first() else {
        return Err(DataError::Format("no rows".to_string()));
    };
    if header.len() < 2 {
        return Err(DataError::Format(
            "header row has no column labels".to_string(),
        ));
    }

    let col_labels = header[1..].to_vec();
    let width = col_labels.len();
    let mut row_labels = Vec::with_capacity(rows.len() - 1);
    let mut cells = Vec::with_capacity(rows.len() - 1);

    for line in &rows[1..] {
        row_labels.push(line.first().cloned().unwrap_or_default());
        let mut values: Vec<Option<f64>> = line
            .iter()
            .skip(1)
            .take(width)
            .map(|raw| parse_cell(raw))
            .collect();
        values.resize(width, None);
        cells.push(values);
    }

    Ok(CorrelationMatrix {
        row_labels,
        col_labels,
        cells,
    })
}

/// Blank, `nan` (any case) and `NA` are missing; so is anything that is not a finite number.
pub fn parse_cell(raw: &str) -> Option<f64> {
    let t = raw.trim();
    if t.is_empty() || t.eq_ignore_ascii_case("nan") || t == "NA" {
        return None;
    }
    t.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn format_cell_label(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.2}")).unwrap_or_default()
}

pub fn format_cell_detail(value: Option<f64>) -> String {
    value
        .map(|v| format!("{v:.3}"))
        .unwrap_or_else(|| "—".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_tokens_are_none() {
        assert_eq!(parse_cell(""), None);
        assert_eq!(parse_cell("   "), None);
        assert_eq!(parse_cell("nan"), None);
        assert_eq!(parse_cell("NaN"), None);
        assert_eq!(parse_cell("NA"), None);
        assert_eq!(parse_cell("inf"), None);
        assert_eq!(parse_cell("abc"), None);
        assert_eq!(parse_cell(" 0.25 "), Some(0.25));
        assert_eq!(parse_cell("-1"), Some(-1.0));
    }

    #[test]
    fn out_of_range_values_are_kept() {
        assert_eq!(parse_cell("1.5"), Some(1.5));
    }

    #[test]
    fn short_and_long_rows_are_squared_off() {
        let m = parse_corr_csv(",A,B,C\nA,1\nB,0.1,1,0.2,9\n").unwrap();
        assert_eq!(m.cells[0], vec![Some(1.0), None, None]);
        assert_eq!(m.cells[1], vec![Some(0.1), Some(1.0), Some(0.2)]);
    }

    #[test]
    fn empty_text_is_format_error() {
        assert!(matches!(parse_corr_csv(""), Err(DataError::Format(_))));
        assert!(matches!(parse_corr_csv("\n\n"), Err(DataError::Format(_))));
    }

    #[test]
    fn single_column_header_is_format_error() {
        assert!(matches!(
            parse_corr_csv("players\nA\nB"),
            Err(DataError::Format(_))
        ));
    }

    #[test]
    fn header_only_gives_no_rows() {
        let m = parse_corr_csv(",A,B").unwrap();
        assert_eq!(m.col_labels, vec!["A", "B"]);
        assert!(m.row_labels.is_empty());
        assert!(m.cells.is_empty());
        assert!(m.is_empty());
    }

    #[test]
    fn labels_format() {
        assert_eq!(format_cell_label(Some(0.456)), "0.46");
        assert_eq!(format_cell_label(None), "");
        assert_eq!(format_cell_detail(Some(-0.1234)), "-0.123");
        assert_eq!(format_cell_detail(None), "—");
    }
}
