use chrono::DateTime;
use k8s_openapi::api::apps::v1 as appsv1;
use k8s_openapi::apimachinery::pkg::apis::meta::v1 as metav1;
use kb_core::macros::*;
use rstest::*;

use crate::constants::*;

#[fixture]
pub fn test_deployment(#[default(TEST_DEPLOYMENT)] name: &str) -> appsv1::Deployment {
    build_deployment(name, 3, TEST_START_TS)
}

#[fixture]
pub fn test_stateful_set(#[default(TEST_STATEFUL_SET)] name: &str) -> appsv1::StatefulSet {
    build_stateful_set(name, 2, TEST_START_TS)
}

// Controllers select pods with `app=<controller name>`, so pods built with build_pod(_, name, _)
// belong to the controller with that name
pub fn build_deployment(name: &str, replicas: i32, created_ts: i64) -> appsv1::Deployment {
    appsv1::Deployment {
        metadata: build_meta(name, created_ts),
        spec: Some(appsv1::DeploymentSpec {
            replicas: Some(replicas),
            selector: app_selector(name),
            ..Default::default()
        }),
        status: Some(appsv1::DeploymentStatus {
            replicas: Some(replicas),
            ready_replicas: Some(replicas),
            ..Default::default()
        }),
    }
}

pub fn build_stateful_set(name: &str, replicas: i32, created_ts: i64) -> appsv1::StatefulSet {
    appsv1::StatefulSet {
        metadata: build_meta(name, created_ts),
        spec: Some(appsv1::StatefulSetSpec {
            replicas: Some(replicas),
            selector: app_selector(name),
            ..Default::default()
        }),
        status: Some(appsv1::StatefulSetStatus {
            replicas,
            ready_replicas: Some(replicas),
            ..Default::default()
        }),
    }
}

fn build_meta(name: &str, created_ts: i64) -> metav1::ObjectMeta {
    metav1::ObjectMeta {
        namespace: Some(TEST_NAMESPACE.into()),
        name: Some(name.into()),
        creation_timestamp: Some(metav1::Time(DateTime::from_timestamp(created_ts, 0).unwrap())),
        ..Default::default()
    }
}

fn app_selector(name: &str) -> metav1::LabelSelector {
    metav1::LabelSelector {
        match_labels: klabel!("app" => name),
        ..Default::default()
    }
}
