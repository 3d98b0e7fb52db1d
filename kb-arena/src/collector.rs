use std::collections::BTreeMap;
use std::fmt;
use std::ops::Add;

use kb_core::prelude::*;
use serde::Serialize;
use tracing::*;

use crate::accessor::ClusterAccessor;
use crate::combatant::{
    Combatant,
    CombatantKind,
    CombatantRef,
};
use crate::population::Population;

// Ordering is lexicographic on (cpu, memory), which is what the resource-hog strategy uses to
// decide who's hogging the most
#[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceUsage {
    pub cpu_nanocores: u64,
    pub memory_bytes: u64,
}

impl Add for ResourceUsage {
    type Output = ResourceUsage;

    fn add(self, other: ResourceUsage) -> ResourceUsage {
        ResourceUsage {
            cpu_nanocores: self.cpu_nanocores.saturating_add(other.cpu_nanocores),
            memory_bytes: self.memory_bytes.saturating_add(other.memory_bytes),
        }
    }
}

impl fmt::Display for ResourceUsage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}m cpu, {}Mi mem", self.cpu_nanocores / 1_000_000, self.memory_bytes / (1 << 20))
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatantMetrics {
    pub age_seconds: i64,
    pub live: bool,
    pub ready: String,
    pub restarts: i32,
    pub usage: Option<ResourceUsage>,
}

#[derive(Clone, Debug, Default)]
pub struct MetricsSnapshot {
    metrics: BTreeMap<CombatantRef, CombatantMetrics>,
}

impl MetricsSnapshot {
    pub fn get(&self, key: &CombatantRef) -> Option<&CombatantMetrics> {
        self.metrics.get(key)
    }

    pub fn usage_of(&self, key: &CombatantRef) -> Option<ResourceUsage> {
        self.metrics.get(key).and_then(|m| m.usage)
    }

    pub fn has_usage(&self) -> bool {
        self.metrics.values().any(|m| m.usage.is_some())
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}

pub struct MetricCollector<'a> {
    accessor: &'a dyn ClusterAccessor,
    clock: &'a dyn Clockable,
}

impl<'a> MetricCollector<'a> {
    pub fn new(accessor: &'a dyn ClusterAccessor, clock: &'a dyn Clockable) -> MetricCollector<'a> {
        MetricCollector { accessor, clock }
    }

    // Resource usage is best-effort: plenty of clusters don't run metrics-server, and we'd rather
    // fight on without it than stop the battle.  Callers can tell it's missing because no
    // combatant in the snapshot will have a usage value.
    pub async fn collect(&self, population: &Population, want_usage: bool) -> MetricsSnapshot {
        let pod_usage = if want_usage {
            match self.accessor.pod_usage().await {
                Ok(usage) => usage,
                Err(err) => {
                    info!("{err}; continuing without resource usage");
                    BTreeMap::new()
                },
            }
        } else {
            BTreeMap::new()
        };

        let metrics = population.iter().map(|c| (c.key(), self.collect_one(c, &pod_usage))).collect();
        MetricsSnapshot { metrics }
    }

    pub fn collect_one(&self, combatant: &Combatant, pod_usage: &BTreeMap<String, ResourceUsage>) -> CombatantMetrics {
        let age_seconds = (self.clock.now() - combatant.created).num_seconds().max(0);
        let (ready, usage) = match combatant.kind {
            CombatantKind::Pod => {
                (if combatant.live { "1/1" } else { "0/1" }.to_string(), pod_usage.get(&combatant.name).copied())
            },
            _ => {
                // A controller only has usage if at least one of its pods reported some
                let usage = combatant
                    .members
                    .iter()
                    .filter_map(|m| pod_usage.get(m).copied())
                    .reduce(|acc, u| acc + u);
                (format!("{}/{}", combatant.ready_replicas, combatant.replicas), usage)
            },
        };

        CombatantMetrics {
            age_seconds,
            live: combatant.live,
            ready,
            restarts: combatant.restarts,
            usage,
        }
    }
}
