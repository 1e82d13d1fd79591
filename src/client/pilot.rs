use tracing::{error, info, warn};

use crate::engine::RoundController;
use crate::model::{GameEnded, LeaderboardTeam, Round, Selection};
use crate::protocol::GameListener;

/// The bot: answers every round through a [RoundController] and logs the rest.
#[derive(Debug, Clone, Default)]
pub struct Pilot {
    controller: RoundController,
    rounds_played: u64,
    warnings: Vec<String>,
    leaderboard: Option<Vec<LeaderboardTeam>>,
}

impl Pilot {
    pub fn new(controller: RoundController) -> Self {
        Self {
            controller,
            ..Self::default()
        }
    }

    pub fn rounds_played(&self) -> u64 {
        self.rounds_played
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Final standings, once the game has ended.
    pub fn last_leaderboard(&self) -> Option<&[LeaderboardTeam]> {
        self.leaderboard.as_deref()
    }
}

impl GameListener for Pilot {
    fn on_round(&mut self, round: &Round) -> Selection {
        self.rounds_played += 1;
        self.controller.decide(round)
    }

    fn on_warning(&mut self, msg: &str) {
        warn!(message = msg, "server warning");
        self.warnings.push(msg.to_string());
    }

    fn on_error(&mut self, msg: &str) {
        error!(message = msg, "server error, session will close");
    }

    fn on_game_ended(&mut self, ended: &GameEnded) {
        info!(
            round = ended.round,
            teams = ended.leaderboard.len(),
            rounds_played = self.rounds_played,
            "game ended"
        );
        for (rank, team) in ended.leaderboard.iter().enumerate() {
            info!(
                rank = rank + 1,
                team = %team.name,
                last_round = team.last_round,
                points = %team.points,
                "leaderboard"
            );
        }
        self.leaderboard = Some(ended.leaderboard.clone());
    }
}
