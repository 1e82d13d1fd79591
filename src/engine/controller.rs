use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::engine::aggregate::aggregate_losses;
use crate::engine::config::EngineConfig;
use crate::engine::selector::{select_actions, SelectionContext, SelectionOutcome};
use crate::model::{Round, Selection};

/// Entry point invoked once per server round. Holds configuration only, no round state.
#[derive(Debug, Clone, Default)]
pub struct RoundController {
    config: EngineConfig,
}

impl RoundController {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs aggregation and selection without logging the round summary.
    pub fn evaluate(&self, round: &Round) -> SelectionOutcome {
        let loss = aggregate_losses(&round.effects);
        let ctx = SelectionContext {
            round: round.round,
            vessel: &round.our_spaceship.values,
            checkpoint: &round.next_checkpoint,
            loss,
        };
        select_actions(&round.actions, &ctx, &self.config)
    }

    pub fn decide(&self, round: &Round) -> Selection {
        let started = Instant::now();
        let outcome = self.evaluate(round);
        let selection = Selection {
            round_id: round.round_id,
            action_ids: outcome.action_ids(),
        };
        let elapsed = started.elapsed();

        info!(
            round = round.round,
            round_id = %round.round_id,
            alive = round.our_spaceship.alive,
            health_loss = %outcome.loss.health,
            crew_loss = %outcome.loss.crew,
            effects = round.effects.len(),
            candidates = round.actions.len(),
            selected = selection.action_ids.len(),
            abstained = outcome.abstained,
            total_score = %outcome.total_score,
            elapsed_us = elapsed.as_micros() as u64,
            "round decided"
        );

        let budget = Duration::from_millis(self.config.latency_budget_ms);
        if elapsed > budget {
            warn!(
                round = round.round,
                elapsed_ms = elapsed.as_millis() as u64,
                budget_ms = self.config.latency_budget_ms,
                "decision exceeded latency budget"
            );
        }

        selection
    }
}

/// Decides one round with the given configuration.
pub fn decide(round: &Round, config: &EngineConfig) -> Selection {
    RoundController::new(*config).decide(round)
}

#[cfg(test)]
mod tests {
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use super::*;
    use crate::model::{Action, Checkpoint, Effect, Spaceship, Values, NO_EFFECT};

    fn health_delta(health: Decimal) -> Values {
        Values::new(health, Decimal::ZERO, Decimal::ZERO, Decimal::ZERO)
    }

    fn round_with(effects: Vec<Effect>, actions: Vec<Action>) -> Round {
        Round {
            round: 4,
            round_id: Uuid::new_v4(),
            next_checkpoint: Checkpoint {
                round: 20,
                values: Values::ZERO,
            },
            effects,
            actions,
            our_spaceship: Spaceship {
                name: "ours".to_string(),
                values: Values::new(dec!(50), dec!(100), dec!(10), dec!(10)),
                alive: true,
            },
            competing_spaceships: Vec::new(),
        }
    }

    #[test]
    fn selection_echoes_round_id() {
        let round = round_with(Vec::new(), Vec::new());
        let selection = RoundController::default().decide(&round);
        assert_eq!(selection.round_id, round.round_id);
        assert!(selection.is_empty());
    }

    #[test]
    fn unlinked_action_is_still_eligible() {
        let effects = vec![Effect {
            id: 1,
            step: 0,
            values: health_delta(dec!(-10)),
        }];
        let actions = vec![Action {
            id: 5,
            effect_id: 99,
            values: health_delta(dec!(15)),
        }];
        let selection = decide(&round_with(effects, actions), &EngineConfig::default());
        assert_eq!(selection.action_ids, vec![5]);
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().expect("log buffer").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().expect("log buffer")).into_owned()
        }
    }

    fn decide_with_logs(controller: &RoundController, round: &Round) -> (Selection, String) {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let selection = tracing::subscriber::with_default(subscriber, || controller.decide(round));
        (selection, logs.contents())
    }

    #[test]
    fn exceeding_latency_budget_warns_but_still_answers() {
        let effects = vec![Effect {
            id: 1,
            step: 0,
            values: health_delta(dec!(-10)),
        }];
        let actions = vec![Action {
            id: 5,
            effect_id: 1,
            values: health_delta(dec!(15)),
        }];
        let round = round_with(effects, actions);
        let slow = RoundController::new(EngineConfig {
            latency_budget_ms: 0,
            ..EngineConfig::default()
        });

        let (selection, logs) = decide_with_logs(&slow, &round);
        assert_eq!(selection.action_ids, vec![5]);
        assert!(logs.contains("round decided"));
        assert!(logs.contains("decision exceeded latency budget"));

        let (_, logs) = decide_with_logs(&RoundController::default(), &round);
        assert!(logs.contains("round decided"));
        assert!(!logs.contains("exceeded latency budget"));
    }

    #[test]
    fn decide_is_deterministic() {
        let effects = vec![Effect {
            id: 1,
            step: 0,
            values: Values::new(dec!(-25), dec!(0), dec!(-3), dec!(0)),
        }];
        let actions = (0..20)
            .map(|id| Action {
                id,
                effect_id: NO_EFFECT,
                values: Values::new(
                    Decimal::from(id % 7),
                    Decimal::from(id % 3) - Decimal::ONE,
                    Decimal::from(id % 4),
                    Decimal::ZERO,
                ),
            })
            .collect();
        let round = round_with(effects, actions);
        let controller = RoundController::default();
        let first = controller.decide(&round);
        for _ in 0..10 {
            assert_eq!(controller.decide(&round), first);
        }
    }
}
