use std::collections::BTreeMap;

use super::*;
use crate::output::OutputFormat;
use crate::roster::{
    build_roster,
    format_age,
};

#[rstest]
#[case::seconds(42, "42s")]
#[case::minutes(600, "10m")]
#[case::hours(3 * 3600, "3h")]
#[case::days(5 * 86400, "5d")]
fn test_format_age(#[case] seconds: i64, #[case] expected: &str) {
    assert_eq!(format_age(seconds), expected);
}

#[rstest]
#[tokio::test]
async fn test_roster_with_usage() {
    let mut accessor = MockClusterAccessor::new();
    accessor.expect_list_pods().returning(|| {
        Ok(vec![
            Combatant::from_pod(&build_pod("web-1", TEST_DEPLOYMENT, TEST_START_TS)),
            Combatant::from_pod(&build_pod("loner", "loner", TEST_START_TS)),
        ])
    });
    accessor
        .expect_list_deployments()
        .returning(|| Ok(vec![Combatant::from_deployment(&build_deployment(TEST_DEPLOYMENT, 1, TEST_START_TS))]));
    accessor.expect_list_stateful_sets().returning(|| Ok(vec![]));
    accessor.expect_pod_usage().returning(|| {
        Ok(BTreeMap::from([("web-1".into(), ResourceUsage { cpu_nanocores: 250_000_000, memory_bytes: 64 << 20 })]))
    });
    let clock = MockUtcClock::new(TEST_NOW_TS);

    let roster = build_roster(&accessor, &clock, TEST_NAMESPACE, Arena::All, true).await.unwrap();
    let text = roster.to_text();

    assert_eq!(roster.size, 2);
    assert_eq!(roster.combatants.len(), 2);
    assert_contains!(text, "250m cpu, 64Mi mem");
    assert_contains!(text, "60m");
    assert_ends_with!(text, format!("2 combatants, 2 units in {TEST_NAMESPACE}"));
}

#[rstest]
#[tokio::test]
async fn test_roster_json_without_usage() {
    let mut accessor = MockClusterAccessor::new();
    accessor
        .expect_list_pods()
        .returning(|| Ok(vec![Combatant::from_pod(&build_pod("solo", "solo", TEST_START_TS))]));
    let clock = MockUtcClock::new(TEST_NOW_TS);

    let roster = build_roster(&accessor, &clock, TEST_NAMESPACE, Arena::Pods, false).await.unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&OutputFormat::Json.render(&roster, |r| r.to_text()).unwrap()).unwrap();

    assert_eq!(value["size"], 1);
    assert_eq!(value["combatants"][0]["name"], "solo");
    assert_eq!(value["combatants"][0]["kind"], "pod");
    assert_eq!(value["combatants"][0]["ageSeconds"], 3600);
    assert!(value["combatants"][0]["usage"].is_null());
}
