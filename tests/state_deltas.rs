use afl_corr_terminal::corr_matrix::parse_corr_csv;
use afl_corr_terminal::error::DataError;
use afl_corr_terminal::player_rounds::extract_player_rounds;
use afl_corr_terminal::state::{
    AppState, Delta, LoadState, ProviderCommand, RequestKind, RequestTag, Screen, apply_delta,
};

fn matrix_tag(cmd: &ProviderCommand) -> RequestTag {
    match cmd {
        ProviderCommand::FetchMatrix { tag, .. } => tag.clone(),
        other => panic!("expected matrix command, got {other:?}"),
    }
}

fn rounds_tag(cmd: &ProviderCommand) -> RequestTag {
    match cmd {
        ProviderCommand::FetchPlayerRounds { tag, .. } => tag.clone(),
        other => panic!("expected rounds command, got {other:?}"),
    }
}

fn loaded_state() -> AppState {
    let mut state = AppState::new();
    let tag = matrix_tag(&state.begin_matrix_request());
    apply_delta(
        &mut state,
        Delta::MatrixLoaded {
            tag,
            result: parse_corr_csv(",A,B\nA,1,0.2\nB,0.2,1"),
        },
    );
    state
}

#[test]
fn matrix_response_fills_state() {
    let state = loaded_state();
    let m = state.matrix.ready().expect("matrix should be ready");
    assert_eq!(m.row_labels, vec!["A", "B"]);
    assert!(state.logs.back().is_some_and(|l| l.starts_with("[INFO] Loaded")));
}

#[test]
fn stale_matrix_response_is_discarded() {
    let mut state = AppState::new();
    let old = matrix_tag(&state.begin_matrix_request());
    state.cycle_team(true);
    let fresh = matrix_tag(&state.begin_matrix_request());
    assert_ne!(old, fresh);
    assert!(!state.latest.is_current(RequestKind::Matrix, old.generation));
    assert!(state.latest.is_current(RequestKind::Matrix, fresh.generation));

    apply_delta(
        &mut state,
        Delta::MatrixLoaded {
            tag: fresh,
            result: parse_corr_csv(",X\nX,1"),
        },
    );
    // The slow, older response arrives last and must not win.
    apply_delta(
        &mut state,
        Delta::MatrixLoaded {
            tag: old,
            result: parse_corr_csv(",A,B\nA,1,0.2\nB,0.2,1"),
        },
    );

    let m = state.matrix.ready().expect("matrix should be ready");
    assert_eq!(m.row_labels, vec!["X"]);
    assert!(state.logs.back().is_some_and(|l| l.contains("stale")));
}

#[test]
fn fetch_failure_is_shown_not_fatal() {
    let mut state = AppState::new();
    let tag = matrix_tag(&state.begin_matrix_request());
    apply_delta(
        &mut state,
        Delta::MatrixLoaded {
            tag,
            result: Err(DataError::fetch("data/x.csv", "http 404 Not Found")),
        },
    );
    assert!(matches!(&state.matrix, LoadState::Failed(msg) if msg.contains("404")));
    assert!(state.logs.back().is_some_and(|l| l.starts_with("[WARN]")));
}

#[test]
fn drill_down_uses_cursor_players() {
    let mut state = loaded_state();
    state.move_cursor(0, 1);
    let cmd = state.begin_rounds_request().expect("cell selected");
    match &cmd {
        ProviderCommand::FetchPlayerRounds {
            row_player,
            col_player,
            team,
            ..
        } => {
            assert_eq!(row_player, "A");
            assert_eq!(col_player, "B");
            assert_eq!(team, "Hawthorn");
        }
        other => panic!("unexpected command {other:?}"),
    }
    assert_eq!(state.screen, Screen::PlayerRounds);
    let view = state.rounds.as_ref().expect("rounds view open");
    assert!(view.data.is_loading());
    let cols: Vec<_> = view.stats.iter().map(|s| s.column.as_str()).collect();
    assert_eq!(cols, vec!["Disposals", "Kicks"]);

    let tag = rounds_tag(&cmd);
    apply_delta(
        &mut state,
        Delta::RoundsLoaded {
            tag,
            result: extract_player_rounds("Player,Round\nA,1\nB,1\n", "A", "B"),
        },
    );
    let view = state.rounds.as_ref().expect("rounds view open");
    assert_eq!(view.data.ready().map(|r| r.rounds()), Some(vec![1.0]));
}

#[test]
fn cursor_is_clamped_to_matrix() {
    let mut state = loaded_state();
    state.move_cursor(10, 10);
    assert_eq!((state.cursor_row, state.cursor_col), (1, 1));
    state.move_cursor(-5, -5);
    assert_eq!((state.cursor_row, state.cursor_col), (0, 0));
}

#[test]
fn rounds_response_after_back_is_dropped() {
    let mut state = loaded_state();
    let tag = rounds_tag(&state.begin_rounds_request().expect("cell selected"));
    state.close_rounds();
    assert_eq!(state.screen, Screen::Heatmap);
    assert!(!state.latest.is_current(RequestKind::Rounds, tag.generation));

    apply_delta(
        &mut state,
        Delta::RoundsLoaded {
            tag,
            result: extract_player_rounds("Player,Round\nA,1\n", "A", "A"),
        },
    );
    assert!(state.rounds.is_none());
    assert_eq!(state.screen, Screen::Heatmap);
}

#[test]
fn rounds_scroll_stays_within_rendered_lines() {
    let mut state = loaded_state();
    let tag = rounds_tag(&state.begin_rounds_request().expect("cell selected"));

    // Loading: title, blank and one status line.
    state.scroll_rounds(10);
    assert_eq!(state.rounds.as_ref().map(|v| v.scroll), Some(2));

    apply_delta(
        &mut state,
        Delta::RoundsLoaded {
            tag,
            result: extract_player_rounds("Player,Round\nA,1\nB,2\nA,3\n", "A", "B"),
        },
    );
    let view = state.rounds.as_ref().expect("rounds view open");
    // Two stat tables of heading, column header, three rounds and a blank.
    assert_eq!(view.content_lines(), 2 + 2 * 6);

    for _ in 0..10_000 {
        state.scroll_rounds(10);
    }
    assert_eq!(state.rounds.as_ref().map(|v| v.scroll), Some(13));

    state.scroll_rounds(-10);
    assert_eq!(state.rounds.as_ref().map(|v| v.scroll), Some(3));
    state.scroll_rounds(-10);
    state.scroll_rounds(-1);
    assert_eq!(state.rounds.as_ref().map(|v| v.scroll), Some(0));
}

#[test]
fn log_is_bounded() {
    let mut state = AppState::new();
    for i in 0..250 {
        apply_delta(&mut state, Delta::Log(format!("[INFO] {i}")));
    }
    assert_eq!(state.logs.len(), 200);
    assert_eq!(state.logs.front().map(String::as_str), Some("[INFO] 50"));
}
