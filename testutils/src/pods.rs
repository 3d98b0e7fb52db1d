use chrono::DateTime;
use k8s_openapi::api::core::v1 as corev1;
use k8s_openapi::apimachinery::pkg::apis::meta::v1 as metav1;
use kb_core::macros::*;
use rstest::*;
use serde_json::json;

use crate::constants::*;

#[fixture]
pub fn test_pod(#[default(TEST_POD)] name: &str) -> corev1::Pod {
    build_pod(name, "the-app", TEST_START_TS)
}

pub fn build_pod(name: &str, app: &str, created_ts: i64) -> corev1::Pod {
    corev1::Pod {
        metadata: metav1::ObjectMeta {
            namespace: Some(TEST_NAMESPACE.into()),
            name: Some(name.into()),
            labels: klabel!("app" => app),
            creation_timestamp: Some(metav1::Time(DateTime::from_timestamp(created_ts, 0).unwrap())),
            ..Default::default()
        },
        spec: Some(corev1::PodSpec {
            containers: vec![corev1::Container { name: "main".into(), ..Default::default() }],
            ..Default::default()
        }),
        status: Some(corev1::PodStatus {
            phase: Some("Running".into()),
            conditions: Some(vec![corev1::PodCondition {
                type_: "Ready".into(),
                status: "True".into(),
                ..Default::default()
            }]),
            container_statuses: Some(vec![corev1::ContainerStatus {
                name: "main".into(),
                ready: true,
                restart_count: 0,
                ..Default::default()
            }]),
            ..Default::default()
        }),
    }
}

pub fn set_pod_ready(pod: &mut corev1::Pod, ready: bool) {
    let status = if ready { "True" } else { "False" };
    if let Some(conds) = pod.status.as_mut().and_then(|st| st.conditions.as_mut()) {
        for cond in conds.iter_mut().filter(|c| c.type_ == "Ready") {
            cond.status = status.into();
        }
    }
}

pub fn set_pod_restarts(pod: &mut corev1::Pod, restarts: i32) {
    if let Some(statuses) = pod.status.as_mut().and_then(|st| st.container_statuses.as_mut()) {
        for cs in statuses.iter_mut() {
            cs.restart_count = restarts;
        }
    }
}

pub fn mark_terminating(pod: &mut corev1::Pod) {
    pod.metadata.deletion_timestamp = Some(metav1::Time(DateTime::from_timestamp(TEST_NOW_TS, 0).unwrap()));
}

// A single PodMetrics object as served by metrics-server; each entry in `containers` is a
// (name, cpu, memory) triple using whatever quantity format the test wants to exercise
pub fn pod_metrics(name: &str, containers: &[(&str, &str, &str)]) -> serde_json::Value {
    json!({
        "apiVersion": "metrics.k8s.io/v1beta1",
        "kind": "PodMetrics",
        "metadata": {
            "name": name,
            "namespace": TEST_NAMESPACE,
        },
        "timestamp": "2023-11-14T23:13:20Z",
        "window": "15s",
        "containers": containers
            .iter()
            .map(|(c, cpu, mem)| json!({"name": c, "usage": {"cpu": cpu, "memory": mem}}))
            .collect::<Vec<_>>(),
    })
}
