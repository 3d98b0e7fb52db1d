use std::collections::BTreeMap;

use tracing_test::traced_test;

use super::*;

fn mib(n: u64) -> u64 {
    n << 20
}

#[rstest]
fn test_collect_one_pod(mut test_pod: corev1::Pod) {
    set_pod_restarts(&mut test_pod, 2);
    let accessor = MockClusterAccessor::new();
    let clock = MockUtcClock::new(TEST_NOW_TS);
    let collector = MetricCollector::new(&accessor, &clock);

    let metrics = collector.collect_one(&Combatant::from_pod(&test_pod), &BTreeMap::new());

    assert_eq!(
        metrics,
        CombatantMetrics {
            age_seconds: 3600,
            live: true,
            ready: "1/1".into(),
            restarts: 2,
            usage: None,
        }
    );
}

#[rstest]
fn test_collect_one_unready_pod(mut test_pod: corev1::Pod) {
    set_pod_ready(&mut test_pod, false);
    let accessor = MockClusterAccessor::new();
    let clock = MockUtcClock::new(TEST_START_TS - 10);
    let collector = MetricCollector::new(&accessor, &clock);

    let metrics = collector.collect_one(&Combatant::from_pod(&test_pod), &BTreeMap::new());

    // clock skew never produces a negative age
    assert_eq!(metrics.age_seconds, 0);
    assert!(!metrics.live);
    assert_eq!(metrics.ready, "0/1");
}

#[rstest]
#[tokio::test]
async fn test_collect_controller_sums_member_usage(test_deployment: appsv1::Deployment) {
    let pods = vec![
        Combatant::from_pod(&build_pod("web-1", TEST_DEPLOYMENT, TEST_START_TS)),
        Combatant::from_pod(&build_pod("web-2", TEST_DEPLOYMENT, TEST_START_TS)),
        Combatant::from_pod(&build_pod("loner", "loner", TEST_START_TS)),
    ];
    let population = Population::assemble(Arena::All, pods, vec![Combatant::from_deployment(&test_deployment)]);

    let mut accessor = MockClusterAccessor::new();
    accessor.expect_pod_usage().times(1).returning(|| {
        Ok(BTreeMap::from([
            ("web-1".into(), ResourceUsage { cpu_nanocores: 100, memory_bytes: mib(10) }),
            ("web-2".into(), ResourceUsage { cpu_nanocores: 50, memory_bytes: mib(20) }),
        ]))
    });
    let clock = MockUtcClock::new(TEST_NOW_TS);

    let snapshot = MetricCollector::new(&accessor, &clock).collect(&population, true).await;

    let depl_ref = CombatantRef::new(CombatantKind::Deployment, TEST_DEPLOYMENT);
    assert_eq!(snapshot.len(), 2);
    assert!(snapshot.has_usage());
    assert_eq!(snapshot.usage_of(&depl_ref), Some(ResourceUsage { cpu_nanocores: 150, memory_bytes: mib(30) }));
    assert_eq!(snapshot.get(&depl_ref).unwrap().ready, "3/3");
    assert_none!(snapshot.usage_of(&CombatantRef::new(CombatantKind::Pod, "loner")));
}

#[rstest]
#[tokio::test]
async fn test_collect_without_usage_skips_metrics_api(test_pod: corev1::Pod) {
    let population = Population::assemble(Arena::All, vec![Combatant::from_pod(&test_pod)], vec![]);
    let accessor = MockClusterAccessor::new();
    let clock = MockUtcClock::new(TEST_NOW_TS);

    let snapshot = MetricCollector::new(&accessor, &clock).collect(&population, false).await;

    assert_eq!(snapshot.len(), 1);
    assert!(!snapshot.has_usage());
}

#[rstest]
#[traced_test]
#[tokio::test]
async fn test_collect_metrics_unavailable(test_pod: corev1::Pod) {
    let population = Population::assemble(Arena::All, vec![Combatant::from_pod(&test_pod)], vec![]);
    let mut accessor = MockClusterAccessor::new();
    accessor
        .expect_pod_usage()
        .returning(|| Err(BattleError::metrics_unavailable("the server could not find the requested resource")));
    let clock = MockUtcClock::new(TEST_NOW_TS);

    let snapshot = MetricCollector::new(&accessor, &clock).collect(&population, true).await;

    assert!(!snapshot.has_usage());
    assert_eq!(snapshot.get(&CombatantRef::new(CombatantKind::Pod, TEST_POD)).unwrap().age_seconds, 3600);
    assert!(logs_contain("continuing without resource usage"));
}

#[rstest]
fn test_resource_usage_ordering() {
    let small = ResourceUsage { cpu_nanocores: 1, memory_bytes: mib(100) };
    let big = ResourceUsage { cpu_nanocores: 2, memory_bytes: 0 };
    assert_lt!(small, big);
    assert_eq!(format!("{}", ResourceUsage { cpu_nanocores: 250_000_000, memory_bytes: mib(64) }), "250m cpu, 64Mi mem");
}
