use anyhow::{Context, Result, anyhow};

use afl_corr_terminal::config::{AppConfig, index_of};
use afl_corr_terminal::corr_color::{Rgb, cell_paint};
use afl_corr_terminal::corr_matrix::{CorrelationMatrix, format_cell_label};
use afl_corr_terminal::data_fetch;
use afl_corr_terminal::locator::{STATS, TEAMS};
use afl_corr_terminal::player_rounds::{comparison_tables, format_round, resolve_stats};

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    let config = AppConfig::from_env().context("invalid configuration")?;
    let team = pick(&args, "--team", &TEAMS, config.team_idx)?;
    let stat1 = pick(&args, "--stat1", &STATS, config.stat1_idx)?;
    let stat2 = pick(&args, "--stat2", &STATS, config.stat2_idx)?;
    let color = !args.iter().any(|a| a == "--no-color");

    let matrix = data_fetch::fetch_corr_matrix(&config, team, stat1, stat2)
        .with_context(|| format!("load {team}: {stat1} vs {stat2}"))?;
    println!("{team}: {stat1} vs {stat2}");
    println!(
        "Players: {} rows x {} cols",
        matrix.row_count(),
        matrix.col_count()
    );
    print_matrix(&matrix, color);

    if let Some(players) = arg_value(&args, "--players") {
        let (row_player, col_player) = players
            .split_once(',')
            .map(|(a, b)| (a.trim().to_string(), b.trim().to_string()))
            .ok_or_else(|| anyhow!("--players expects \"Row Player,Col Player\""))?;
        let rounds = data_fetch::fetch_player_rounds(&config, team, &row_player, &col_player)
            .with_context(|| format!("load rounds for {team}"))?;
        println!();
        println!("{row_player} × {col_player}");
        if rounds.rounds().is_empty() {
            println!("No round data found for the selected players.");
            return Ok(());
        }
        for table in comparison_tables(&rounds, &resolve_stats(&[stat1, stat2])) {
            println!();
            println!("{}", table.entry.heading());
            println!("{:<7}{:<24}{:<24}", "Round", row_player, col_player);
            for row in table.rows {
                println!(
                    "{:<7}{:<24}{:<24}",
                    format_round(row.round),
                    row.row_value,
                    row.col_value
                );
            }
        }
    }

    Ok(())
}

fn print_matrix(matrix: &CorrelationMatrix, color: bool) {
    let label_w = matrix
        .row_labels
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0)
        .max(8);
    for (i, label) in matrix.row_labels.iter().enumerate() {
        let mut line = format!("{label:<label_w$}");
        for j in 0..matrix.col_count() {
            let value = matrix.value(i, j);
            let text = format!(" {:>5}", format_cell_label(value));
            if color {
                let paint = cell_paint(value, matrix.is_diagonal(i, j));
                line.push_str(&ansi(paint.fill, paint.text, &text));
            } else {
                line.push_str(&text);
            }
        }
        println!("{line}");
    }
}

fn ansi(bg: Rgb, fg: Rgb, text: &str) -> String {
    format!(
        "\x1b[48;2;{};{};{}m\x1b[38;2;{};{};{}m{text}\x1b[0m",
        bg.r, bg.g, bg.b, fg.r, fg.g, fg.b
    )
}

fn pick<'a>(args: &[String], name: &str, options: &[&'a str], default: usize) -> Result<&'a str> {
    match arg_value(args, name) {
        Some(raw) => index_of(options, &raw)
            .map(|idx| options[idx])
            .ok_or_else(|| anyhow!("unknown value for {name}: {raw}")),
        None => Ok(options[default % options.len()]),
    }
}

fn arg_value(args: &[String], name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == name {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(next.trim().to_string());
            }
        }
    }
    None
}

fn print_usage() {
    println!("corr_dump [--team NAME] [--stat1 STAT] [--stat2 STAT] [--players \"A,B\"] [--no-color]");
    println!();
    println!("Data location comes from AFL_DATA_BASE / AFL_CORR_ROOT / AFL_ROUNDS_ROOT.");
    println!("Teams: {}", TEAMS.join(", "));
    println!("Stats: {}", STATS.join(", "));
}
