//! Offline replay of recorded rounds.
//!
//! Rounds are independent, so they are decided in parallel. Each entry projects the vessel
//! through the round (effects first, then the selected actions) to show whether the
//! decision would have kept it alive.

use std::fs;

use rayon::prelude::*;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::engine::RoundController;
use crate::error::ReplayError;
use crate::model::{Round, Values};
use crate::protocol::{decode_server_message, ServerMessage};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundReplay {
    pub round: u64,
    pub round_id: Uuid,
    pub action_ids: Vec<i64>,
    pub abstained: bool,
    pub total_score: Decimal,
    pub projected: Values,
    pub survives: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub generated_at: String,
    pub rounds: usize,
    pub abstentions: usize,
    pub projected_deaths: usize,
    pub entries: Vec<RoundReplay>,
}

/// Parses a bare round or a `GameRoundServerMessage` envelope.
pub fn parse_round(raw: &str) -> Result<Round, serde_json::Error> {
    match serde_json::from_str::<Round>(raw) {
        Ok(round) => Ok(round),
        Err(err) => match decode_server_message(raw) {
            Ok(ServerMessage::GameRound(round)) => Ok(round),
            _ => Err(err),
        },
    }
}

/// Reads a JSON array of rounds, or one round per line.
pub fn load_rounds(path: &str) -> Result<Vec<Round>, ReplayError> {
    let raw = fs::read_to_string(path).map_err(|source| ReplayError::Read {
        path: path.to_string(),
        source,
    })?;
    parse_rounds(&raw)
}

pub fn parse_rounds(raw: &str) -> Result<Vec<Round>, ReplayError> {
    if raw.trim_start().starts_with('[') {
        return serde_json::from_str(raw).map_err(|source| ReplayError::Parse {
            line: source.line(),
            source,
        });
    }

    raw.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            parse_round(line).map_err(|source| ReplayError::Parse {
                line: index + 1,
                source,
            })
        })
        .collect()
}

/// Vessel values after every effect and then every selected action of the round.
pub fn project_round(round: &Round, action_ids: &[i64]) -> Values {
    let after_effects = round
        .effects
        .iter()
        .fold(round.our_spaceship.values, |values, effect| values.sum(&effect.values));

    action_ids
        .iter()
        .filter_map(|id| round.actions.iter().find(|action| action.id == *id))
        .fold(after_effects, |values, action| values.sum(&action.values))
}

pub fn replay_rounds(controller: &RoundController, rounds: &[Round]) -> ReplayReport {
    let entries: Vec<RoundReplay> = rounds
        .par_iter()
        .map(|round| {
            let outcome = controller.evaluate(round);
            let action_ids = outcome.action_ids();
            let projected = project_round(round, &action_ids);
            RoundReplay {
                round: round.round,
                round_id: round.round_id,
                action_ids,
                abstained: outcome.abstained,
                total_score: outcome.total_score,
                projected,
                survives: projected.is_alive(),
            }
        })
        .collect();

    let abstentions = entries.iter().filter(|entry| entry.abstained).count();
    let projected_deaths = entries.iter().filter(|entry| !entry.survives).count();
    tracing::info!(
        rounds = entries.len(),
        abstentions,
        projected_deaths,
        "replay complete"
    );

    ReplayReport {
        generated_at: chrono::Utc::now().to_rfc3339(),
        rounds: entries.len(),
        abstentions,
        projected_deaths,
        entries,
    }
}
