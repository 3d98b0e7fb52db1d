use std::fmt::Write;

use serde::Serialize;

use crate::battle::{
    BattleOutcome,
    Round,
    RoundOutcome,
};
use crate::config::BattleConfig;
use crate::policy::Strategy;
use crate::population::Arena;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleReport {
    pub namespace: String,
    pub strategy: Strategy,
    pub arena: Arena,
    pub outcome: BattleOutcome,
    pub rounds_fought: u32,
    pub failed_rounds: u32,
    pub history: Vec<Round>,
}

impl BattleReport {
    pub fn new(config: &BattleConfig, outcome: BattleOutcome, history: Vec<Round>) -> BattleReport {
        let failed_rounds = history.iter().filter(|r| matches!(r.outcome, RoundOutcome::Failed(_))).count() as u32;
        BattleReport {
            namespace: config.namespace.clone(),
            strategy: config.strategy,
            arena: config.arena,
            outcome,
            rounds_fought: history.len() as u32,
            failed_rounds,
            history,
        }
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_yaml(&self) -> anyhow::Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();

        // Writing to a String can't fail, so the results are ignored here
        let _ = writeln!(
            out,
            "battle in {} (strategy={}, arena={})",
            self.namespace, self.strategy, self.arena
        );
        for round in &self.history {
            let status = match &round.outcome {
                RoundOutcome::Success => "ok".to_string(),
                RoundOutcome::Failed(reason) => format!("FAILED: {reason}"),
            };
            let fallback = if round.fallback { " [random fallback]" } else { "" };
            let _ = writeln!(
                out,
                "  round {:>3}  {}  size={:<4} {} ({}){fallback}  {status}",
                round.number,
                round.timestamp.format("%H:%M:%S"),
                round.population_size,
                round.victim,
                round.action,
            );
        }
        let _ = writeln!(out, "{} rounds fought, {} failed", self.rounds_fought, self.failed_rounds);
        let _ = write!(out, "{}", self.outcome);
        out
    }
}
