use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::values::Values;

/// Sentinel `effectId` for actions that are not coupled to any effect.
pub const NO_EFFECT: i64 = -1;

/// A vessel as last synchronized by the server. Read-only for the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spaceship {
    pub name: String,
    pub values: Values,
    pub alive: bool,
}

/// A delta the server applies this round whatever the bot replies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub id: i64,
    #[serde(default)]
    pub step: i32,
    pub values: Values,
}

/// An optional delta the bot triggers by echoing `id` in its reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub id: i64,
    #[serde(default = "no_effect")]
    pub effect_id: i64,
    pub values: Values,
}

fn no_effect() -> i64 {
    NO_EFFECT
}

impl Action {
    pub fn linked_effect(&self) -> Option<i64> {
        (self.effect_id != NO_EFFECT).then_some(self.effect_id)
    }
}

/// Resource threshold the vessel must meet by `round`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub round: u64,
    pub values: Values,
}

/// One server turn. Consumed once by the engine, then discarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    pub round: u64,
    pub round_id: Uuid,
    pub next_checkpoint: Checkpoint,
    #[serde(default)]
    pub effects: Vec<Effect>,
    #[serde(default)]
    pub actions: Vec<Action>,
    pub our_spaceship: Spaceship,
    #[serde(default)]
    pub competing_spaceships: Vec<Spaceship>,
}

/// The engine's reply: the chosen action ids for `round_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub round_id: Uuid,
    pub action_ids: Vec<i64>,
}

impl Selection {
    pub fn empty(round_id: Uuid) -> Self {
        Self {
            round_id,
            action_ids: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.action_ids.is_empty()
    }
}

/// Final standing of one team, reported when the game ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardTeam {
    pub name: String,
    pub last_round: u64,
    pub points: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEnded {
    pub round: u64,
    #[serde(default)]
    pub leaderboard: Vec<LeaderboardTeam>,
}
