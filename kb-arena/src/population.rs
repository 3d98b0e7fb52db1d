use std::fmt;
use std::str::FromStr;

use kb_core::k8s::{
    is_empty_selector,
    label_selector_matches,
};
use serde::{
    Deserialize,
    Serialize,
};
use tracing::*;

use crate::accessor::ClusterAccessor;
use crate::combatant::{
    Combatant,
    CombatantRef,
};
use crate::errors::BattleError;

/// Which kinds of workloads are allowed to fight.
///
/// In the `All` arena, pods that are managed by one of the controllers in the namespace fight as
/// part of that controller rather than on their own, so that no replica is counted twice.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Arena {
    #[default]
    All,
    Pods,
    Controllers,
}

impl Arena {
    pub fn includes_pods(&self) -> bool {
        matches!(self, Arena::All | Arena::Pods)
    }

    pub fn includes_controllers(&self) -> bool {
        matches!(self, Arena::All | Arena::Controllers)
    }
}

impl FromStr for Arena {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Arena> {
        match s.to_lowercase().as_str() {
            "all" => Ok(Arena::All),
            "pods" => Ok(Arena::Pods),
            "controllers" => Ok(Arena::Controllers),
            _ => Err(BattleError::invalid_configuration(&format!("unknown arena: {s}"))),
        }
    }
}

impl fmt::Display for Arena {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Arena::All => "all",
            Arena::Pods => "pods",
            Arena::Controllers => "controllers",
        };
        write!(f, "{s}")
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Population {
    combatants: Vec<Combatant>,
}

impl Population {
    // Pods handed in here are expected to have already had terminating pods filtered out; a pod
    // that's on its way out isn't eligible to fight anymore.
    pub fn assemble(arena: Arena, pods: Vec<Combatant>, controllers: Vec<Combatant>) -> Population {
        let mut claimed = vec![false; pods.len()];
        let mut combatants = vec![];

        // Controllers scaled to zero still claim their pods, so that pods left over from the
        // scale-down don't come back as standalone combatants while they're shutting down
        for mut ctrl in controllers {
            if let Some(sel) = ctrl.selector.as_ref().filter(|s| !is_empty_selector(s)) {
                for (i, pod) in pods.iter().enumerate() {
                    match label_selector_matches(&pod.labels, sel) {
                        Ok(true) => {
                            claimed[i] = true;
                            ctrl.restarts += pod.restarts;
                            ctrl.members.push(pod.name.clone());
                        },
                        Ok(false) => (),
                        Err(err) => {
                            warn!("could not match pods for {}: {err}", ctrl.key());
                            ctrl.members.clear();
                            ctrl.restarts = 0;
                            break;
                        },
                    }
                }
            }

            if arena.includes_controllers() && ctrl.replicas > 0 {
                combatants.push(ctrl);
            }
        }

        for (pod, owned) in pods.into_iter().zip(claimed) {
            if arena.includes_pods() && (arena == Arena::Pods || !owned) {
                combatants.push(pod);
            }
        }

        combatants.sort_by(|a, b| a.name.cmp(&b.name).then(a.kind.cmp(&b.kind)));
        Population { combatants }
    }

    pub fn combatants(&self) -> &[Combatant] {
        &self.combatants
    }

    pub fn iter(&self) -> impl Iterator<Item = &Combatant> {
        self.combatants.iter()
    }

    pub fn len(&self) -> usize {
        self.combatants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combatants.is_empty()
    }

    pub fn get(&self, key: &CombatantRef) -> Option<&Combatant> {
        self.combatants.iter().find(|c| c.kind == key.kind && c.name == key.name)
    }

    pub fn contains(&self, key: &CombatantRef) -> bool {
        self.get(key).is_some()
    }

    /// The number of units still standing; the battle is over once this drops to one or zero.
    pub fn size(&self) -> u32 {
        self.combatants.iter().map(|c| c.units()).sum()
    }

    /// Returns the winner if there's exactly one unit left.  Since every combatant in the
    /// population is worth at least one unit, a size of one means exactly one combatant.
    pub fn sole_survivor(&self) -> Option<&Combatant> {
        if self.size() == 1 { self.combatants.first() } else { None }
    }

    pub fn survivor_names(&self) -> Vec<String> {
        self.combatants.iter().map(|c| c.name.clone()).collect()
    }
}

/// Take a fresh census of the namespace.  Pods are always listed, even in the controllers-only
/// arena, so that each controller knows which pods it owns.
pub async fn census(accessor: &dyn ClusterAccessor, arena: Arena) -> anyhow::Result<Population> {
    let pods = accessor.list_pods().await?;
    let mut controllers = vec![];
    if arena.includes_controllers() {
        controllers.extend(accessor.list_deployments().await?);
        controllers.extend(accessor.list_stateful_sets().await?);
    }

    let population = Population::assemble(arena, pods, controllers);
    debug!("census found {} combatants ({} units)", population.len(), population.size());
    Ok(population)
}
