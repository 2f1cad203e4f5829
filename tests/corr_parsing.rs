use std::fs;
use std::path::PathBuf;

use afl_corr_terminal::corr_color::{DIAGONAL_GREY, WARM, cell_paint};
use afl_corr_terminal::corr_matrix::parse_corr_csv;
use afl_corr_terminal::error::DataError;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_small_matrix_end_to_end() {
    let m = parse_corr_csv(",P1,P2\nP1,1,0.5\nP2,0.5,1").expect("valid csv");
    assert_eq!(m.row_labels, vec!["P1", "P2"]);
    assert_eq!(m.col_labels, vec!["P1", "P2"]);
    assert_eq!(
        m.cells,
        vec![vec![Some(1.0), Some(0.5)], vec![Some(0.5), Some(1.0)]]
    );

    for i in 0..2 {
        assert!(m.is_diagonal(i, i));
        let paint = cell_paint(m.value(i, i), m.is_diagonal(i, i));
        assert_eq!(paint.fill, DIAGONAL_GREY);
        // Same value off the diagonal paints warm.
        assert_eq!(cell_paint(m.value(i, i), false).fill, WARM);
    }
    assert!(!m.is_diagonal(0, 1));
}

#[test]
fn parses_team_fixture() {
    let raw = read_fixture("hawthorn_dispdiff_vs_kickdiff_corr.csv");
    let m = parse_corr_csv(&raw).expect("fixture should parse");

    assert_eq!(
        m.col_labels,
        vec!["James Sicily", "Jai Newcombe", "Will Day", "Karl Amon"]
    );
    assert_eq!(
        m.row_labels,
        vec!["James Sicily", "Jai Newcombe", "Will Day", "Karl Amon"]
    );
    assert_eq!(m.cells.len(), m.row_labels.len());
    assert!(m.cells.iter().all(|row| row.len() == m.col_labels.len()));

    assert_eq!(m.value(0, 1), Some(0.42));
    assert_eq!(m.value(2, 0), Some(-0.31));
    assert_eq!(m.value(0, 3), None);
    assert_eq!(m.value(1, 3), None);
    assert_eq!(m.value(2, 3), None);
    assert_eq!(m.cells[3], vec![None, None, None, Some(1.0)]);
}

#[test]
fn missing_tokens_never_become_numbers() {
    let m = parse_corr_csv(",A,B,C\nA,NA,nan,\nB,NAN,na,x").expect("valid csv");
    assert_eq!(m.cells[0], vec![None, None, None]);
    // "na" is not a recognised token and is not a number either.
    assert_eq!(m.cells[1], vec![None, None, None]);
}

#[test]
fn rejects_structurally_invalid_text() {
    assert!(matches!(parse_corr_csv(""), Err(DataError::Format(_))));
    assert!(matches!(
        parse_corr_csv("only-one-column\nrow"),
        Err(DataError::Format(_))
    ));
}

#[test]
fn order_is_preserved_as_written() {
    let m = parse_corr_csv(",Z,A,M\nZ,1,0.1,0.2\nA,0.1,1,0.3\nM,0.2,0.3,1").expect("valid csv");
    assert_eq!(m.col_labels, vec!["Z", "A", "M"]);
    assert_eq!(m.row_labels, vec!["Z", "A", "M"]);
    assert_eq!(m.value(2, 1), Some(0.3));
}
