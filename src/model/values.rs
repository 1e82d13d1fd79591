//! Resource arithmetic over `(health, maxHealth, crew, maxCrew)`.
//!
//! A [Values] is either a snapshot of a vessel (bounded by its capacities) or a delta to be
//! applied to one. Deltas are unconstrained until [Values::sum] clamps the result.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Values {
    pub health: Decimal,
    pub max_health: Decimal,
    pub crew: Decimal,
    pub max_crew: Decimal,
}

impl Values {
    pub const ZERO: Values = Values {
        health: Decimal::ZERO,
        max_health: Decimal::ZERO,
        crew: Decimal::ZERO,
        max_crew: Decimal::ZERO,
    };

    pub const fn new(health: Decimal, max_health: Decimal, crew: Decimal, max_crew: Decimal) -> Self {
        Self {
            health,
            max_health,
            crew,
            max_crew,
        }
    }

    /// Applies `delta` to `self`.
    ///
    /// Capacities are clamped at zero first, then current values are clamped into
    /// `[0, new capacity]`, so a capacity-reducing delta also caps current resources.
    /// Additions saturate at the decimal range instead of overflowing.
    pub fn sum(&self, delta: &Values) -> Values {
        let max_health = self.max_health.saturating_add(delta.max_health).max(Decimal::ZERO);
        let max_crew = self.max_crew.saturating_add(delta.max_crew).max(Decimal::ZERO);

        Values {
            health: self.health.saturating_add(delta.health).clamp(Decimal::ZERO, max_health),
            max_health,
            crew: self.crew.saturating_add(delta.crew).clamp(Decimal::ZERO, max_crew),
            max_crew,
        }
    }

    /// Alive while both health and crew are strictly positive.
    pub fn is_alive(&self) -> bool {
        self.health > Decimal::ZERO && self.crew > Decimal::ZERO
    }

    pub fn is_dead(&self) -> bool {
        !self.is_alive()
    }

    /// True when health and crew both reach the threshold's health and crew.
    pub fn meets(&self, threshold: &Values) -> bool {
        self.health >= threshold.health && self.crew >= threshold.crew
    }

    pub fn has_positive_capacities(&self) -> bool {
        self.max_health > Decimal::ZERO && self.max_crew > Decimal::ZERO
    }

    pub fn health_saturated(&self) -> bool {
        self.health >= self.max_health
    }

    pub fn crew_saturated(&self) -> bool {
        self.crew >= self.max_crew
    }

    /// True when the delta shrinks either capacity.
    pub fn shrinks_capacity(&self) -> bool {
        self.max_health < Decimal::ZERO || self.max_crew < Decimal::ZERO
    }
}
