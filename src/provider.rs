use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::config::AppConfig;
use crate::data_fetch;
use crate::state::{Delta, LatestRequests, ProviderCommand, RequestKind};

/// Background fetcher. Runs until the command channel closes or the UI stops
/// listening for deltas.
pub fn spawn_provider(
    config: AppConfig,
    latest: LatestRequests,
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        while let Ok(cmd) = cmd_rx.recv() {
            let delta = handle_command(&config, &latest, cmd);
            if tx.send(delta).is_err() {
                break;
            }
        }
    })
}

/// Run one command. Commands superseded before they started are skipped
/// without touching the network; only a log line is reported for them.
pub fn handle_command(config: &AppConfig, latest: &LatestRequests, cmd: ProviderCommand) -> Delta {
    match cmd {
        ProviderCommand::FetchMatrix {
            tag,
            team,
            stat1,
            stat2,
        } => {
            if !latest.is_current(RequestKind::Matrix, tag.generation) {
                return skipped("heatmap", &tag.key);
            }
            let result = data_fetch::fetch_corr_matrix(config, &team, &stat1, &stat2);
            Delta::MatrixLoaded { tag, result }
        }
        ProviderCommand::FetchPlayerRounds {
            tag,
            team,
            row_player,
            col_player,
        } => {
            if !latest.is_current(RequestKind::Rounds, tag.generation) {
                return skipped("round", &tag.key);
            }
            let result = data_fetch::fetch_player_rounds(config, &team, &row_player, &col_player);
            Delta::RoundsLoaded { tag, result }
        }
    }
}

fn skipped(what: &str, key: &str) -> Delta {
    Delta::Log(format!("[INFO] Skipped superseded {what} request ({key})"))
}
