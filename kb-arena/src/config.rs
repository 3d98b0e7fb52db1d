use std::fs::File;
use std::path::Path;

use kb_core::prelude::*;
use serde::{
    Deserialize,
    Serialize,
};

use crate::errors::BattleError;
use crate::policy::Strategy;
use crate::population::Arena;

// Settings as a user writes them, either in a config file or on the command line; nothing here
// has been checked yet.  Any field can be left out and picks up the default at validation time.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct BattleSettings {
    pub namespace: Option<String>,
    pub strategy: Option<String>,
    pub arena: Option<String>,
    pub interval_seconds: Option<i64>,
    pub max_rounds: Option<i64>,
    pub failure_threshold: Option<i64>,
    pub pause_poll_seconds: Option<i64>,
    pub seed: Option<u64>,
}

impl BattleSettings {
    pub fn load(filename: &Path) -> anyhow::Result<BattleSettings> {
        let file = File::open(filename)?;
        serde_yaml::from_reader(file).map_err(|e| BattleError::invalid_configuration(&format!("{}: {e}", filename.display())))
    }

    /// Layer `other` on top of these settings; anything set in `other` wins.
    pub fn overlay(self, other: BattleSettings) -> BattleSettings {
        BattleSettings {
            namespace: other.namespace.or(self.namespace),
            strategy: other.strategy.or(self.strategy),
            arena: other.arena.or(self.arena),
            interval_seconds: other.interval_seconds.or(self.interval_seconds),
            max_rounds: other.max_rounds.or(self.max_rounds),
            failure_threshold: other.failure_threshold.or(self.failure_threshold),
            pause_poll_seconds: other.pause_poll_seconds.or(self.pause_poll_seconds),
            seed: other.seed.or(self.seed),
        }
    }

    pub fn validate(&self) -> anyhow::Result<BattleConfig> {
        let namespace = self.namespace.clone().unwrap_or_else(|| DEFAULT_NAMESPACE.into());
        if namespace.is_empty() {
            return Err(BattleError::invalid_configuration("namespace must not be empty"));
        }

        let strategy = self.strategy.as_deref().unwrap_or(DEFAULT_STRATEGY).parse()?;
        let arena = self.arena.as_deref().unwrap_or(DEFAULT_ARENA).parse()?;
        let interval_seconds = non_negative("intervalSeconds", self.interval_seconds.unwrap_or(DEFAULT_INTERVAL_SECONDS))?;
        let max_rounds = match non_negative("maxRounds", self.max_rounds.unwrap_or(0))? {
            0 => None,
            n => Some(u32::try_from(n).map_err(|_| BattleError::invalid_configuration("maxRounds is too large"))?),
        };

        let failure_threshold = non_negative("failureThreshold", self.failure_threshold.unwrap_or(DEFAULT_FAILURE_THRESHOLD))?;
        if failure_threshold == 0 {
            return Err(BattleError::invalid_configuration("failureThreshold must be at least 1"));
        }
        let failure_threshold =
            u32::try_from(failure_threshold).map_err(|_| BattleError::invalid_configuration("failureThreshold is too large"))?;

        let pause_poll_seconds =
            non_negative("pausePollSeconds", self.pause_poll_seconds.unwrap_or(DEFAULT_PAUSE_POLL_SECONDS))?;
        if pause_poll_seconds == 0 {
            return Err(BattleError::invalid_configuration("pausePollSeconds must be at least 1"));
        }

        Ok(BattleConfig {
            namespace,
            strategy,
            arena,
            interval_seconds,
            max_rounds,
            failure_threshold,
            pause_poll_seconds,
            seed: self.seed,
        })
    }
}

fn non_negative(field: &str, value: i64) -> anyhow::Result<u64> {
    u64::try_from(value).map_err(|_| BattleError::invalid_configuration(&format!("{field} must be non-negative, got {value}")))
}

/// Validated, immutable battle configuration.  `max_rounds` of `None` means keep fighting until
/// there's a winner.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleConfig {
    pub namespace: String,
    pub strategy: Strategy,
    pub arena: Arena,
    pub interval_seconds: u64,
    pub max_rounds: Option<u32>,
    pub failure_threshold: u32,
    pub pause_poll_seconds: u64,
    pub seed: Option<u64>,
}

impl BattleConfig {
    pub fn new(namespace: &str) -> BattleConfig {
        BattleConfig { namespace: namespace.into(), ..Default::default() }
    }
}

impl Default for BattleConfig {
    fn default() -> BattleConfig {
        BattleConfig {
            namespace: DEFAULT_NAMESPACE.into(),
            strategy: Strategy::default(),
            arena: Arena::default(),
            interval_seconds: DEFAULT_INTERVAL_SECONDS as u64,
            max_rounds: None,
            failure_threshold: DEFAULT_FAILURE_THRESHOLD as u32,
            pause_poll_seconds: DEFAULT_PAUSE_POLL_SECONDS as u64,
            seed: None,
        }
    }
}
