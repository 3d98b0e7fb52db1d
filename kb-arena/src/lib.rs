#![cfg_attr(coverage, feature(coverage_attribute))]
mod accessor;
mod battle;
mod collector;
mod combatant;
mod config;
mod errors;
mod policy;
mod population;
mod report;

pub use crate::accessor::{
    ClusterAccessor,
    KubeAccessor,
};
pub use crate::battle::{
    Battle,
    BattleOutcome,
    BattleState,
    Round,
    RoundOutcome,
};
pub use crate::collector::{
    CombatantMetrics,
    MetricCollector,
    MetricsSnapshot,
    ResourceUsage,
};
pub use crate::combatant::{
    Action,
    Combatant,
    CombatantKind,
    CombatantRef,
};
pub use crate::config::{
    BattleConfig,
    BattleSettings,
};
pub use crate::errors::BattleError;
pub use crate::policy::{
    Selection,
    Strategy,
    action_for,
    select,
};
pub use crate::population::{
    Arena,
    Population,
    census,
};
pub use crate::report::BattleReport;

#[cfg(any(test, feature = "mock"))]
pub mod mock {
    pub use crate::accessor::MockClusterAccessor;
}

#[cfg(test)]
mod tests;
