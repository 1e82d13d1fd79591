pub mod aggregate;
pub mod config;
pub mod controller;
pub mod scoring;
pub mod selector;

pub use aggregate::{aggregate_losses, ProjectedLoss};
pub use config::{EngineConfig, ScoringWeights, SelectionPolicy};
pub use controller::{decide, RoundController};
pub use scoring::{rank_actions, score_action, RankedAction};
pub use selector::{select_actions, Pick, PickReason, SelectionContext, SelectionOutcome};
