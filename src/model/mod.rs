pub mod round;
pub mod values;

pub use round::{
    Action, Checkpoint, Effect, GameEnded, LeaderboardTeam, Round, Selection, Spaceship, NO_EFFECT,
};
pub use values::Values;
