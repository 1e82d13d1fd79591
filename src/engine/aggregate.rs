use rust_decimal::Decimal;
use serde::Serialize;

use crate::model::Effect;

/// Worst-case damage projected for one round, as non-negative magnitudes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProjectedLoss {
    pub health: Decimal,
    pub crew: Decimal,
}

impl ProjectedLoss {
    pub fn total(&self) -> Decimal {
        self.health.saturating_add(self.crew)
    }

    pub fn is_zero(&self) -> bool {
        self.health <= Decimal::ZERO && self.crew <= Decimal::ZERO
    }
}

/// Sums the negative health and crew deltas of `effects`.
///
/// Positive deltas are not netted against losses: mitigation is planned against what the
/// round takes away, not against what it gives back.
pub fn aggregate_losses(effects: &[Effect]) -> ProjectedLoss {
    effects
        .iter()
        .fold(ProjectedLoss::default(), |mut loss, effect| {
            if effect.values.health < Decimal::ZERO {
                loss.health = loss.health.saturating_sub(effect.values.health);
            }
            if effect.values.crew < Decimal::ZERO {
                loss.crew = loss.crew.saturating_sub(effect.values.crew);
            }
            loss
        })
}
