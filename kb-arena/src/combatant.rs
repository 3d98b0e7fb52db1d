use std::collections::BTreeMap;
use std::fmt;

use chrono::{
    DateTime,
    Utc,
};
use kb_core::prelude::*;
use serde::{
    Deserialize,
    Serialize,
};

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CombatantKind {
    Pod,
    Deployment,
    StatefulSet,
}

impl CombatantKind {
    pub fn is_controller(&self) -> bool {
        !matches!(self, CombatantKind::Pod)
    }
}

impl fmt::Display for CombatantKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            CombatantKind::Pod => "pod",
            CombatantKind::Deployment => "deployment",
            CombatantKind::StatefulSet => "statefulset",
        };
        write!(f, "{s}")
    }
}

// Names are only unique per-kind, so anything that needs to point back at a combatant across
// rounds (the history, the metrics snapshot) keys off of the (kind, name) pair.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct CombatantRef {
    pub kind: CombatantKind,
    pub name: String,
}

impl CombatantRef {
    pub fn new(kind: CombatantKind, name: &str) -> CombatantRef {
        CombatantRef { kind, name: name.into() }
    }
}

impl fmt::Display for CombatantRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.name)
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Action {
    DeletePod,
    ScaleDown { from: i32, to: i32 },
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Action::DeletePod => write!(f, "delete"),
            Action::ScaleDown { from, to } => write!(f, "scale {from} -> {to}"),
        }
    }
}

/// A single participant in the battle: either a standalone pod, or a workload controller whose
/// replicas are eliminated one at a time.
///
/// Pod-only fields (`live`, `restarts`, `labels`) and controller-only fields (`replicas`,
/// `ready_replicas`, `selector`, `members`) are left at their defaults for the other kind.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Combatant {
    pub kind: CombatantKind,
    pub name: String,
    pub namespace: String,
    pub created: DateTime<Utc>,

    pub live: bool,
    pub restarts: i32,
    #[serde(skip)]
    pub labels: BTreeMap<String, String>,

    pub replicas: i32,
    pub ready_replicas: i32,
    #[serde(skip)]
    pub selector: Option<metav1::LabelSelector>,
    pub members: Vec<String>,
}

impl Combatant {
    pub fn from_pod(pod: &corev1::Pod) -> Combatant {
        Combatant {
            kind: CombatantKind::Pod,
            name: pod.name_any(),
            namespace: pod.namespace().unwrap_or_default(),
            created: pod.created_at(),
            live: pod.is_ready(),
            restarts: pod.restart_count(),
            labels: pod.labels_or_empty(),
            replicas: 1,
            ready_replicas: if pod.is_ready() { 1 } else { 0 },
            selector: None,
            members: vec![],
        }
    }

    // The apiserver defaults an unset replica count to 1, so that's what we do too
    pub fn from_deployment(depl: &appsv1::Deployment) -> Combatant {
        let spec = depl.spec.as_ref();
        Combatant::controller(
            CombatantKind::Deployment,
            depl,
            spec.and_then(|s| s.replicas).unwrap_or(1),
            depl.status.as_ref().and_then(|s| s.ready_replicas).unwrap_or(0),
            spec.map(|s| s.selector.clone()),
        )
    }

    pub fn from_stateful_set(sts: &appsv1::StatefulSet) -> Combatant {
        let spec = sts.spec.as_ref();
        Combatant::controller(
            CombatantKind::StatefulSet,
            sts,
            spec.and_then(|s| s.replicas).unwrap_or(1),
            sts.status.as_ref().and_then(|s| s.ready_replicas).unwrap_or(0),
            spec.map(|s| s.selector.clone()),
        )
    }

    fn controller<K: kube::Resource>(
        kind: CombatantKind,
        obj: &K,
        replicas: i32,
        ready_replicas: i32,
        selector: Option<metav1::LabelSelector>,
    ) -> Combatant {
        Combatant {
            kind,
            name: obj.name_any(),
            namespace: obj.namespace().unwrap_or_default(),
            created: obj.created_at(),
            live: ready_replicas > 0,
            restarts: 0,
            labels: BTreeMap::new(),
            replicas,
            ready_replicas,
            selector,
            members: vec![],
        }
    }

    pub fn key(&self) -> CombatantRef {
        CombatantRef::new(self.kind, &self.name)
    }

    /// How many units this combatant contributes to the population size; pods are always worth
    /// one, controllers are worth however many replicas they currently want.
    pub fn units(&self) -> u32 {
        if self.kind.is_controller() { self.replicas.max(0) as u32 } else { 1 }
    }
}
