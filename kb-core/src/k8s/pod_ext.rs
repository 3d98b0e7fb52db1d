use std::collections::BTreeMap;

use super::*;

// Helper functions to get at the bits of a pod's status that matter for a fight
impl PodExt for corev1::Pod {
    fn status(&self) -> anyhow::Result<&corev1::PodStatus> {
        match self.status.as_ref() {
            None => bail!(KubernetesError::field_not_found("pod status")),
            Some(ps) => Ok(ps),
        }
    }

    fn phase(&self) -> Option<&str> {
        self.status.as_ref()?.phase.as_deref()
    }

    // A pod is "alive" if it's running and the kubelet reports it ready; a pod with no status
    // at all hasn't been scheduled yet, so it's not alive either
    fn is_ready(&self) -> bool {
        let Ok(status) = PodExt::status(self) else {
            return false;
        };

        if status.phase.as_deref() != Some(POD_PHASE_RUNNING) {
            return false;
        }

        status
            .conditions
            .as_ref()
            .is_some_and(|conds| conds.iter().any(|c| c.type_ == POD_CONDITION_READY && c.status == "True"))
    }

    fn restart_count(&self) -> i32 {
        self.status
            .as_ref()
            .and_then(|st| st.container_statuses.as_ref())
            .map(|statuses| statuses.iter().map(|cs| cs.restart_count).sum())
            .unwrap_or(0)
    }

    fn labels_or_empty(&self) -> BTreeMap<String, String> {
        self.metadata.labels.clone().unwrap_or_default()
    }
}
