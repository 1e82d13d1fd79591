//! Desirability of a single action given the round's projected losses.
//!
//! Rewards restored health/crew and capacity growth, penalizes anything that takes
//! resources or capacity away. Penalty weights outweigh rewards, so an action that trades
//! one unit of capacity for one unit of health scores negative.

use rust_decimal::Decimal;

use crate::engine::aggregate::ProjectedLoss;
use crate::engine::config::ScoringWeights;
use crate::model::{Action, Values};

#[derive(Debug, Clone, Copy)]
pub struct RankedAction<'a> {
    /// Index in the round's action list; breaks score ties.
    pub position: usize,
    pub action: &'a Action,
    pub score: Decimal,
}

pub fn score_action(action: &Action, loss: &ProjectedLoss, weights: &ScoringWeights) -> Decimal {
    score_values(&action.values, loss, weights)
}

pub fn score_values(delta: &Values, loss: &ProjectedLoss, weights: &ScoringWeights) -> Decimal {
    let terms = [
        signed_term(delta.health, weights.gain, weights.current_penalty),
        signed_term(delta.crew, weights.gain, weights.current_penalty),
        signed_term(delta.max_health, weights.capacity_gain, weights.capacity_penalty),
        signed_term(delta.max_crew, weights.capacity_gain, weights.capacity_penalty),
    ];
    let score = terms
        .into_iter()
        .fold(Decimal::ZERO, |score, term| score.saturating_add(term));

    // Diversify toward the resource the round threatens less.
    if loss.health > loss.crew && delta.crew > Decimal::ZERO {
        score.saturating_add(delta.crew.saturating_mul(weights.trade_off_bonus))
    } else if loss.crew > loss.health && delta.health > Decimal::ZERO {
        score.saturating_add(delta.health.saturating_mul(weights.trade_off_bonus))
    } else {
        score
    }
}

fn signed_term(delta: Decimal, reward: Decimal, penalty: Decimal) -> Decimal {
    if delta > Decimal::ZERO {
        delta.saturating_mul(reward)
    } else {
        delta.saturating_mul(penalty)
    }
}

/// Scores every action and orders them best first. Equal scores keep input order.
pub fn rank_actions<'a>(
    actions: &'a [Action],
    loss: &ProjectedLoss,
    weights: &ScoringWeights,
) -> Vec<RankedAction<'a>> {
    let mut ranked: Vec<RankedAction<'a>> = actions
        .iter()
        .enumerate()
        .map(|(position, action)| RankedAction {
            position,
            action,
            score: score_action(action, loss, weights),
        })
        .collect();

    ranked.sort_by(|left, right| {
        right
            .score
            .cmp(&left.score)
            .then_with(|| left.position.cmp(&right.position))
    });

    ranked
}
