//! Greedy assembly of one round's reply.
//!
//! Ranked actions are walked twice. The primary pass takes positive-score actions that
//! mitigate projected loss, reach the next checkpoint, or grow a saturated capacity. The
//! fallback pass spends whatever is left on remaining loss, preferring actions that keep
//! capacities intact. Finally the abstention gate drops selections that are not worth it.

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::engine::aggregate::ProjectedLoss;
use crate::engine::config::{EngineConfig, SelectionPolicy};
use crate::engine::scoring::{rank_actions, RankedAction};
use crate::model::{Action, Checkpoint, Values};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PickReason {
    Mitigation,
    Checkpoint,
    CapacityGrowth,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pick {
    pub action_id: i64,
    pub score: Decimal,
    pub reason: PickReason,
    pub health_mitigation: Decimal,
    pub crew_mitigation: Decimal,
}

/// What the selector decided and why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionOutcome {
    /// Picks in selection order. Kept for diagnostics even when `abstained`.
    pub picks: Vec<Pick>,
    pub loss: ProjectedLoss,
    pub remaining: ProjectedLoss,
    pub total_score: Decimal,
    pub gained_health: Decimal,
    pub gained_crew: Decimal,
    pub abstained: bool,
}

impl SelectionOutcome {
    /// Ids to send. Empty when the engine abstained.
    pub fn action_ids(&self) -> Vec<i64> {
        if self.abstained {
            return Vec::new();
        }
        let mut seen = HashSet::with_capacity(self.picks.len());
        self.picks
            .iter()
            .map(|pick| pick.action_id)
            .filter(|id| seen.insert(*id))
            .collect()
    }
}

/// Everything about the vessel the selector looks at besides the actions.
#[derive(Debug, Clone, Copy)]
pub struct SelectionContext<'a> {
    pub round: u64,
    pub vessel: &'a Values,
    pub checkpoint: &'a Checkpoint,
    pub loss: ProjectedLoss,
}

impl SelectionContext<'_> {
    /// The action alone lifts the vessel to a checkpoint it does not meet yet.
    fn reaches_checkpoint(&self, delta: &Values) -> bool {
        if self.checkpoint.round < self.round || self.vessel.meets(&self.checkpoint.values) {
            return false;
        }
        let after = self.vessel.sum(delta);
        after.meets(&self.checkpoint.values) && after.has_positive_capacities()
    }

    fn grows_saturated_capacity(&self, delta: &Values) -> bool {
        (delta.max_health > Decimal::ZERO && self.vessel.health_saturated())
            || (delta.max_crew > Decimal::ZERO && self.vessel.crew_saturated())
    }
}

struct Accumulator {
    remaining: ProjectedLoss,
    picks: Vec<Pick>,
    picked_ids: HashSet<i64>,
    total_score: Decimal,
    gained_health: Decimal,
    gained_crew: Decimal,
}

impl Accumulator {
    fn new(loss: ProjectedLoss) -> Self {
        Self {
            remaining: loss,
            picks: Vec::new(),
            picked_ids: HashSet::new(),
            total_score: Decimal::ZERO,
            gained_health: Decimal::ZERO,
            gained_crew: Decimal::ZERO,
        }
    }

    fn loss_covered(&self) -> bool {
        self.remaining.is_zero()
    }

    fn is_picked(&self, id: i64) -> bool {
        self.picked_ids.contains(&id)
    }

    /// Portion of the remaining loss the delta offsets. Never negative.
    fn mitigation(&self, delta: &Values) -> (Decimal, Decimal) {
        (
            offset(delta.health, self.remaining.health),
            offset(delta.crew, self.remaining.crew),
        )
    }

    fn mitigates(&self, delta: &Values) -> bool {
        let (health, crew) = self.mitigation(delta);
        health > Decimal::ZERO || crew > Decimal::ZERO
    }

    fn take(&mut self, ranked: &RankedAction<'_>, reason: PickReason) {
        let delta = &ranked.action.values;
        let (health_mitigation, crew_mitigation) = self.mitigation(delta);
        self.remaining.health -= health_mitigation;
        self.remaining.crew -= crew_mitigation;
        self.total_score = self.total_score.saturating_add(ranked.score);
        self.gained_health = self.gained_health.saturating_add(delta.health.max(Decimal::ZERO));
        self.gained_crew = self.gained_crew.saturating_add(delta.crew.max(Decimal::ZERO));
        self.picked_ids.insert(ranked.action.id);

        tracing::debug!(
            action_id = ranked.action.id,
            score = %ranked.score,
            ?reason,
            %health_mitigation,
            %crew_mitigation,
            "action picked"
        );

        self.picks.push(Pick {
            action_id: ranked.action.id,
            score: ranked.score,
            reason,
            health_mitigation,
            crew_mitigation,
        });
    }

    fn finish(self, loss: ProjectedLoss, policy: &SelectionPolicy) -> SelectionOutcome {
        let abstained = !self.picks.is_empty()
            && self.total_score < policy.abstain_threshold
            && self.gained_health.saturating_add(self.gained_crew) <= loss.total();
        if abstained {
            tracing::debug!(
                total_score = %self.total_score,
                threshold = %policy.abstain_threshold,
                "selection below threshold, abstaining"
            );
        }

        SelectionOutcome {
            picks: self.picks,
            loss,
            remaining: self.remaining,
            total_score: self.total_score,
            gained_health: self.gained_health,
            gained_crew: self.gained_crew,
            abstained,
        }
    }
}

fn offset(delta: Decimal, remaining: Decimal) -> Decimal {
    if delta <= Decimal::ZERO || remaining <= Decimal::ZERO {
        Decimal::ZERO
    } else {
        delta.min(remaining)
    }
}

pub fn select_actions(
    actions: &[Action],
    ctx: &SelectionContext<'_>,
    config: &EngineConfig,
) -> SelectionOutcome {
    let policy = &config.policy;
    let ranked = rank_actions(actions, &ctx.loss, &config.weights);
    let mut acc = Accumulator::new(ctx.loss);

    primary_pass(&ranked, ctx, policy, &mut acc);
    if policy.fallback_pass && !acc.loss_covered() {
        fallback_pass(&ranked, &mut acc);
    }

    acc.finish(ctx.loss, policy)
}

fn primary_pass(
    ranked: &[RankedAction<'_>],
    ctx: &SelectionContext<'_>,
    policy: &SelectionPolicy,
    acc: &mut Accumulator,
) {
    let gates_enabled = policy.honor_checkpoint || policy.pursue_capacity_growth;

    for candidate in ranked {
        if acc.loss_covered() && !gates_enabled {
            break;
        }
        // Ranked best first: nothing past here is worth taking on its own merit.
        if candidate.score <= Decimal::ZERO {
            break;
        }
        let delta = &candidate.action.values;
        if acc.is_picked(candidate.action.id) {
            continue;
        }

        let reason = if acc.mitigates(delta) {
            Some(PickReason::Mitigation)
        } else if policy.honor_checkpoint && ctx.reaches_checkpoint(delta) {
            Some(PickReason::Checkpoint)
        } else if policy.pursue_capacity_growth && ctx.grows_saturated_capacity(delta) {
            Some(PickReason::CapacityGrowth)
        } else {
            None
        };

        match reason {
            Some(reason) => acc.take(candidate, reason),
            None => tracing::trace!(action_id = candidate.action.id, score = %candidate.score, "action skipped"),
        }
    }
}

/// Spends leftovers on remaining loss. Capacity-shrinking actions only get a turn once
/// every capacity-neutral alternative has been tried.
fn fallback_pass(ranked: &[RankedAction<'_>], acc: &mut Accumulator) {
    for shrinking in [false, true] {
        for candidate in ranked
            .iter()
            .filter(|c| c.action.values.shrinks_capacity() == shrinking)
        {
            if acc.loss_covered() {
                return;
            }
            if acc.is_picked(candidate.action.id) || !acc.mitigates(&candidate.action.values) {
                continue;
            }
            acc.take(candidate, PickReason::Fallback);
        }
    }
}
