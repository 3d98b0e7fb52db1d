use std::fmt;

use chrono::{
    DateTime,
    Utc,
};
use kb_core::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tokio::sync::watch;
use tracing::*;

use crate::accessor::ClusterAccessor;
use crate::collector::MetricCollector;
use crate::combatant::{
    Action,
    CombatantKind,
    CombatantRef,
};
use crate::config::BattleConfig;
use crate::policy::{
    Selection,
    select,
};
use crate::population::{
    Population,
    census,
};
use crate::report::BattleReport;

const UNREACHABLE_REASON: &str = "cluster unreachable";

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BattleState {
    Running,
    Paused,
    Terminated,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "lowercase")]
pub enum RoundOutcome {
    Success,
    Failed(String),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    pub number: u32,
    pub timestamp: DateTime<Utc>,
    pub population_size: u32,
    pub victim: CombatantRef,
    pub action: Action,
    pub outcome: RoundOutcome,
    pub fallback: bool,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "camelCase")]
pub enum BattleOutcome {
    Winner { kind: CombatantKind, name: String },
    NoWinner,
    RoundLimit { survivors: Vec<String> },
    Aborted { reason: String },
    Cancelled,
}

impl fmt::Display for BattleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BattleOutcome::Winner { kind, name } => write!(f, "winner: {kind}/{name}"),
            BattleOutcome::NoWinner => write!(f, "no winner"),
            BattleOutcome::RoundLimit { survivors } => {
                write!(f, "round limit reached; survivors: {}", survivors.join(", "))
            },
            BattleOutcome::Aborted { reason } => write!(f, "aborted — {reason}"),
            BattleOutcome::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Drives the elimination loop for a single namespace.
///
/// Each round takes a fresh census, stops if at most one unit is left standing, otherwise
/// collects metrics, picks a victim, eliminates one unit, records the round, and sleeps for
/// the configured interval.  Write failures are recorded and the battle continues, unless
/// `failure_threshold` of them happen back to back, in which case the battle is aborted.
/// Failing to take a census counts toward that same threshold, but doesn't produce a round.
pub struct Battle {
    config: BattleConfig,
    accessor: Box<dyn ClusterAccessor>,
    clock: Box<dyn Clockable>,
    stop: watch::Receiver<bool>,
    rng: StdRng,

    state: BattleState,
    round_number: u32,
    consecutive_failures: u32,
    history: Vec<Round>,
}

impl Battle {
    pub fn new(
        config: BattleConfig,
        accessor: Box<dyn ClusterAccessor>,
        clock: Box<dyn Clockable>,
        stop: watch::Receiver<bool>,
    ) -> Battle {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Battle {
            config,
            accessor,
            clock,
            stop,
            rng,
            state: BattleState::Running,
            round_number: 0,
            consecutive_failures: 0,
            history: vec![],
        }
    }

    pub fn state(&self) -> BattleState {
        self.state
    }

    #[instrument(skip_all, fields(namespace=self.config.namespace))]
    pub async fn run(&mut self) -> BattleReport {
        info!(
            "starting battle: strategy={}, arena={}, interval={}s",
            self.config.strategy, self.config.arena, self.config.interval_seconds
        );

        let outcome = loop {
            if let Some(outcome) = self.step().await {
                break outcome;
            }
        };

        self.state = BattleState::Terminated;
        info!("battle over after {} rounds: {outcome}", self.round_number);
        BattleReport::new(&self.config, outcome, self.history.clone())
    }

    // Runs one iteration of the loop; returns Some(outcome) once the battle is finished
    async fn step(&mut self) -> Option<BattleOutcome> {
        if self.stop_requested() {
            return Some(BattleOutcome::Cancelled);
        }

        if !self.wait_if_paused().await {
            return Some(BattleOutcome::Cancelled);
        }

        let population = match census(self.accessor.as_ref(), self.config.arena).await {
            Ok(p) => p,
            Err(err) => {
                error!("could not take census: {err}");
                if self.record_failure() {
                    return Some(BattleOutcome::Aborted { reason: UNREACHABLE_REASON.into() });
                }
                self.sleep_or_stop(self.config.interval_seconds).await;
                return None;
            },
        };

        if let Some(outcome) = self.check_finished(&population) {
            return Some(outcome);
        }

        let metrics = MetricCollector::new(self.accessor.as_ref(), self.clock.as_ref())
            .collect(&population, self.config.strategy.needs_usage())
            .await;

        let selection = match select(&population, self.config.strategy, &metrics, &mut self.rng) {
            Ok(s) => s,
            Err(err) => {
                // Can't actually happen, since check_finished already handled the empty case
                error!("{err}");
                return Some(BattleOutcome::NoWinner);
            },
        };

        let round = self.fight_round(population.size(), selection).await;
        let failed = matches!(round.outcome, RoundOutcome::Failed(_));
        self.history.push(round);
        self.round_number += 1;

        if failed {
            if self.record_failure() {
                return Some(BattleOutcome::Aborted { reason: UNREACHABLE_REASON.into() });
            }
        } else {
            self.consecutive_failures = 0;
        }

        self.sleep_or_stop(self.config.interval_seconds).await;
        None
    }

    fn check_finished(&self, population: &Population) -> Option<BattleOutcome> {
        let size = population.size();
        info!("round {}: {size} units left across {} combatants", self.round_number + 1, population.len());

        if size == 0 {
            return Some(BattleOutcome::NoWinner);
        } else if let Some(winner) = population.sole_survivor() {
            return Some(BattleOutcome::Winner { kind: winner.kind, name: winner.name.clone() });
        }

        match self.config.max_rounds {
            Some(max) if max > 0 && self.round_number >= max => {
                Some(BattleOutcome::RoundLimit { survivors: population.survivor_names() })
            },
            _ => None,
        }
    }

    async fn fight_round(&self, population_size: u32, selection: Selection<'_>) -> Round {
        let victim = selection.victim.key();
        info!("eliminating {victim} ({})", selection.action);

        let res = match selection.action {
            Action::DeletePod => self.accessor.delete_pod(&victim.name).await,
            Action::ScaleDown { to, .. } => self.accessor.scale(&victim, to).await,
        };

        let outcome = match res {
            Ok(()) => RoundOutcome::Success,
            Err(err) => {
                warn!("could not eliminate {victim}: {err}");
                RoundOutcome::Failed(err.to_string())
            },
        };

        Round {
            number: self.round_number + 1,
            timestamp: self.clock.now(),
            population_size,
            victim,
            action: selection.action,
            outcome,
            fallback: selection.fallback,
        }
    }

    // Returns true if we've hit the failure threshold and the battle should be aborted
    fn record_failure(&mut self) -> bool {
        self.consecutive_failures += 1;
        if self.consecutive_failures >= self.config.failure_threshold {
            error!("{} consecutive failures, giving up", self.consecutive_failures);
            return true;
        }
        false
    }

    // Polls the namespace until nobody has it paused anymore.  Returns false if the battle was
    // stopped while we were waiting.  If the pause annotation can't be read, we carry on and let
    // the census find out whether the cluster is actually reachable.
    async fn wait_if_paused(&mut self) -> bool {
        loop {
            match self.accessor.is_paused().await {
                Ok(true) => {
                    if self.state != BattleState::Paused {
                        info!("battle is paused, checking again every {} seconds", self.config.pause_poll_seconds);
                        self.state = BattleState::Paused;
                    }
                    self.sleep_or_stop(self.config.pause_poll_seconds).await;
                    if self.stop_requested() {
                        return false;
                    }
                },
                Ok(false) => break,
                Err(err) => {
                    warn!("could not check whether the battle is paused: {err}");
                    break;
                },
            }
        }

        if self.state == BattleState::Paused {
            info!("battle resumed");
        }
        self.state = BattleState::Running;
        true
    }

    async fn sleep_or_stop(&mut self, seconds: u64) {
        if seconds == 0 {
            return;
        }

        // If the sender has gone away, `changed` errors out immediately; the pattern match
        // disables that branch so we still sleep the full interval
        tokio::select! {
            _ = self.clock.sleep(seconds) => (),
            Ok(()) = self.stop.changed() => debug!("stop requested, waking up early"),
        }
    }

    fn stop_requested(&self) -> bool {
        *self.stop.borrow()
    }
}
