use kube::api::GroupVersionKind;
use lazy_static::lazy_static;

// Annotations
pub const PAUSED_ANNOTATION_KEY: &str = "kubattle.io/paused-at";

// Server-side field manager used for every write
pub const FIELD_MANAGER: &str = "kubattle";

// Defaults
pub const DEFAULT_NAMESPACE: &str = "loadbalancer-fight";
pub const DEFAULT_STRATEGY: &str = "random";
pub const DEFAULT_ARENA: &str = "all";
pub const DEFAULT_INTERVAL_SECONDS: i64 = 10;
pub const DEFAULT_FAILURE_THRESHOLD: i64 = 3;
pub const DEFAULT_PAUSE_POLL_SECONDS: i64 = 10;

// Pod phases and condition types
pub const POD_PHASE_RUNNING: &str = "Running";
pub const POD_CONDITION_READY: &str = "Ready";

// Resource metrics API
pub const POD_METRICS_PLURAL: &str = "pods";

lazy_static! {
    pub static ref POD_METRICS_GVK: GroupVersionKind = GroupVersionKind::gvk("metrics.k8s.io", "v1beta1", "PodMetrics");
}
