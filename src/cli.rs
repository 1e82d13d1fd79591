use std::fmt::Write as _;
use std::fs;
use std::io::{self, Read};

use crate::client::{run_client, ClientConfig, Pilot, SessionEnd};
use crate::engine::{EngineConfig, RoundController};
use crate::protocol::{encode_client_message, ClientMessage};
use crate::replay::{load_rounds, parse_round, replay_rounds, ReplayReport};

pub const USAGE: &str = "usage: quartermaster <play|decide [path]|replay <path> [--table]>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Play,
    Decide,
    Replay,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("play") => Some(Command::Play),
        Some("decide") => Some(Command::Decide),
        Some("replay") => Some(Command::Replay),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    let Some(command) = parse_command(args) else {
        eprintln!("{USAGE}");
        return 2;
    };

    let engine_config = match EngineConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("config error: {err}");
            return 1;
        }
    };
    let controller = RoundController::new(engine_config);

    match command {
        Command::Play => handle_play(controller),
        Command::Decide => handle_decide(args, &controller),
        Command::Replay => handle_replay(args, &controller),
    }
}

fn handle_play(controller: RoundController) -> i32 {
    let client_config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("config error: {err}");
            return 1;
        }
    };
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("failed to start runtime: {err}");
            return 1;
        }
    };

    let mut pilot = Pilot::new(controller);
    match runtime.block_on(run_client(&client_config, &mut pilot)) {
        Ok(end) => {
            if end == SessionEnd::GameEnded {
                if let Some(leaderboard) = pilot.last_leaderboard() {
                    for (rank, team) in leaderboard.iter().enumerate() {
                        println!("{}\t{}\t{}", rank + 1, team.name, team.points);
                    }
                }
            }
            0
        }
        Err(err) => {
            eprintln!("client error: {err}");
            1
        }
    }
}

fn handle_decide(args: &[String], controller: &RoundController) -> i32 {
    let raw = match args.get(2) {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer).map(|_| buffer)
        }
    };
    let raw = match raw {
        Ok(raw) => raw,
        Err(err) => {
            eprintln!("failed to read round: {err}");
            return 1;
        }
    };
    let round = match parse_round(&raw) {
        Ok(round) => round,
        Err(err) => {
            eprintln!("invalid round: {err}");
            return 1;
        }
    };

    let selection = controller.decide(&round);
    match encode_client_message(&ClientMessage::SelectActions(selection)) {
        Ok(line) => {
            println!("{line}");
            0
        }
        Err(err) => {
            eprintln!("{err}");
            1
        }
    }
}

fn handle_replay(args: &[String], controller: &RoundController) -> i32 {
    let Some(path) = args.get(2) else {
        eprintln!("usage: quartermaster replay <rounds.json> [--table]");
        return 2;
    };
    let as_table = args.iter().any(|arg| arg == "--table");

    let rounds = match load_rounds(path) {
        Ok(rounds) => rounds,
        Err(err) => {
            eprintln!("replay failed: {err}");
            return 1;
        }
    };
    let report = replay_rounds(controller, &rounds);

    if as_table {
        print!("{}", render_table(&report));
        return 0;
    }
    match serde_json::to_string_pretty(&report) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize replay report: {err}");
            1
        }
    }
}

fn render_table(report: &ReplayReport) -> String {
    let mut out = String::from("round\tactions\tabstained\thealth\tcrew\tsurvives\n");
    for entry in &report.entries {
        let ids: Vec<String> = entry.action_ids.iter().map(i64::to_string).collect();
        let _ = writeln!(
            &mut out,
            "{}\t{}\t{}\t{}\t{}\t{}",
            entry.round,
            ids.join(","),
            entry.abstained,
            entry.projected.health,
            entry.projected.crew,
            entry.survives
        );
    }
    out
}
