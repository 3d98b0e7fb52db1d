use std::collections::BTreeMap;

use async_trait::async_trait;
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use kb_core::errors::*;
use kb_core::k8s::{
    cpu_nanocores,
    memory_bytes,
};
use kb_core::prelude::*;
use kube::api::{
    ApiResource,
    DeleteParams,
    DynamicObject,
    ListParams,
    Patch,
    PatchParams,
};
#[cfg(any(test, feature = "mock"))]
use mockall::automock;
use serde_json::json;
use tracing::*;

use crate::collector::ResourceUsage;
use crate::combatant::{
    Combatant,
    CombatantKind,
    CombatantRef,
};
use crate::errors::{
    BattleError,
    classify_kube_error,
};

/// Everything the battle needs to know about (or do to) the cluster.  Every call is scoped to
/// the single namespace the accessor was built for.
///
/// Errors coming back from these calls are `BattleError`s: `TargetVanished` when the thing we
/// wanted to touch is gone, `WriteConflict` when someone else updated it first, and
/// `ControlPlaneUnavailable` for everything else.  `pod_usage` fails with `MetricsUnavailable`
/// instead, since a missing metrics API says nothing about the rest of the control plane.
#[cfg_attr(any(test, feature = "mock"), automock)]
#[async_trait]
pub trait ClusterAccessor: Send + Sync {
    async fn namespace_exists(&self) -> anyhow::Result<bool>;
    async fn is_paused(&self) -> anyhow::Result<bool>;

    // Pods that are already terminating are never returned
    async fn list_pods(&self) -> anyhow::Result<Vec<Combatant>>;
    async fn list_deployments(&self) -> anyhow::Result<Vec<Combatant>>;
    async fn list_stateful_sets(&self) -> anyhow::Result<Vec<Combatant>>;
    async fn pod_usage(&self) -> anyhow::Result<BTreeMap<String, ResourceUsage>>;

    async fn delete_pod(&self, name: &str) -> EmptyResult;
    async fn scale(&self, target: &CombatantRef, replicas: i32) -> EmptyResult;
}

#[derive(Clone)]
pub struct KubeAccessor {
    client: kube::Client,
    namespace: String,
}

impl KubeAccessor {
    pub fn new(client: kube::Client, namespace: &str) -> KubeAccessor {
        KubeAccessor { client, namespace: namespace.into() }
    }

    fn pods(&self) -> kube::Api<corev1::Pod> {
        kube::Api::namespaced(self.client.clone(), &self.namespace)
    }

    fn deployments(&self) -> kube::Api<appsv1::Deployment> {
        kube::Api::namespaced(self.client.clone(), &self.namespace)
    }

    fn stateful_sets(&self) -> kube::Api<appsv1::StatefulSet> {
        kube::Api::namespaced(self.client.clone(), &self.namespace)
    }

    fn pod_metrics(&self) -> kube::Api<DynamicObject> {
        let ar = ApiResource::from_gvk_with_plural(&POD_METRICS_GVK, POD_METRICS_PLURAL);
        kube::Api::namespaced_with(self.client.clone(), &self.namespace, &ar)
    }

    fn patch_params() -> PatchParams {
        PatchParams { field_manager: Some(FIELD_MANAGER.into()), ..Default::default() }
    }
}

#[async_trait]
impl ClusterAccessor for KubeAccessor {
    async fn namespace_exists(&self) -> anyhow::Result<bool> {
        let ns_api = kube::Api::<corev1::Namespace>::all(self.client.clone());
        match ns_api.get_opt(&self.namespace).await {
            Ok(ns) => Ok(ns.is_some()),
            Err(e) => Err(classify_kube_error(e, &format!("namespace/{}", self.namespace))),
        }
    }

    async fn is_paused(&self) -> anyhow::Result<bool> {
        let ns_api = kube::Api::<corev1::Namespace>::all(self.client.clone());
        let ns = ns_api
            .get(&self.namespace)
            .await
            .map_err(|e| classify_kube_error(e, &format!("namespace/{}", self.namespace)))?;
        Ok(ns.annotations().contains_key(PAUSED_ANNOTATION_KEY))
    }

    async fn list_pods(&self) -> anyhow::Result<Vec<Combatant>> {
        let pods = self
            .pods()
            .list(&ListParams::default())
            .await
            .map_err(|e| classify_kube_error(e, "pods"))?;

        Ok(pods
            .iter()
            .filter(|pod| {
                let terminating = pod.is_terminating();
                if terminating {
                    debug!("skipping terminating pod {}", pod.name_any());
                }
                !terminating
            })
            .map(Combatant::from_pod)
            .collect())
    }

    async fn list_deployments(&self) -> anyhow::Result<Vec<Combatant>> {
        let depls = self
            .deployments()
            .list(&ListParams::default())
            .await
            .map_err(|e| classify_kube_error(e, "deployments"))?;
        Ok(depls.iter().map(Combatant::from_deployment).collect())
    }

    async fn list_stateful_sets(&self) -> anyhow::Result<Vec<Combatant>> {
        let sets = self
            .stateful_sets()
            .list(&ListParams::default())
            .await
            .map_err(|e| classify_kube_error(e, "statefulsets"))?;
        Ok(sets.iter().map(Combatant::from_stateful_set).collect())
    }

    async fn pod_usage(&self) -> anyhow::Result<BTreeMap<String, ResourceUsage>> {
        let objs = self
            .pod_metrics()
            .list(&ListParams::default())
            .await
            .map_err(|e| BattleError::metrics_unavailable(&e.to_string()))?;

        let mut usage = BTreeMap::new();
        for obj in objs.iter() {
            match parse_pod_usage(obj) {
                Ok(u) => {
                    usage.insert(obj.name_any(), u);
                },
                Err(err) => warn!("ignoring metrics for pod {}: {err}", obj.name_any()),
            }
        }
        Ok(usage)
    }

    async fn delete_pod(&self, name: &str) -> EmptyResult {
        info!("deleting pod {}/{name}", self.namespace);
        match self.pods().delete(name, &DeleteParams::default()).await {
            Ok(_) => Ok(()),
            Err(e) => Err(classify_kube_error(e, &format!("pod/{name}"))),
        }
    }

    async fn scale(&self, target: &CombatantRef, replicas: i32) -> EmptyResult {
        info!("scaling {target} in {} to {replicas} replicas", self.namespace);
        let patch = Patch::Merge(json!({"spec": {"replicas": replicas}}));
        let res = match target.kind {
            CombatantKind::Deployment => self
                .deployments()
                .patch_scale(&target.name, &KubeAccessor::patch_params(), &patch)
                .await
                .map(|_| ()),
            CombatantKind::StatefulSet => self
                .stateful_sets()
                .patch_scale(&target.name, &KubeAccessor::patch_params(), &patch)
                .await
                .map(|_| ()),
            CombatantKind::Pod => bail!("pods can't be scaled: {target}"),
        };
        res.map_err(|e| classify_kube_error(e, &target.to_string()))
    }
}

// A PodMetrics object reports usage per container; the pod's usage is the sum across all of them
pub(crate) fn parse_pod_usage(obj: &DynamicObject) -> anyhow::Result<ResourceUsage> {
    let Some(containers) = obj.data.get("containers").and_then(|c| c.as_array()) else {
        bail!("no container metrics present");
    };

    let mut total = ResourceUsage::default();
    for container in containers {
        let cpu = container.pointer("/usage/cpu").and_then(|v| v.as_str()).unwrap_or("0");
        let mem = container.pointer("/usage/memory").and_then(|v| v.as_str()).unwrap_or("0");
        total = total
            + ResourceUsage {
                cpu_nanocores: cpu_nanocores(&Quantity(cpu.into()))?,
                memory_bytes: memory_bytes(&Quantity(mem.into()))?,
            };
    }
    Ok(total)
}
