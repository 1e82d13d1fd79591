//! Decision engine for the spaceship survival game bot.
//!
//! Each server round is reduced to projected losses, every available action is scored,
//! and a greedy selector assembles the reply. The engine is a pure function of the round;
//! [client] and [replay] are thin drivers around [engine::RoundController].

pub mod cli;
pub mod client;
pub mod engine;
pub mod error;
pub mod model;
pub mod protocol;
pub mod replay;

pub use engine::{decide, EngineConfig, RoundController};
pub use model::{Action, Checkpoint, Effect, Round, Selection, Spaceship, Values};
