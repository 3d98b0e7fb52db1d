use super::fake::standalone_pod;
use super::*;

fn web_pod(name: &str) -> Combatant {
    Combatant::from_pod(&build_pod(name, "web", TEST_START_TS))
}

fn solo_pod(name: &str) -> Combatant {
    Combatant::from_pod(&standalone_pod(name, TEST_START_TS))
}

fn web_deployment(replicas: i32) -> Combatant {
    Combatant::from_deployment(&build_deployment("web", replicas, TEST_START_TS))
}

#[rstest]
fn test_arena_from_str() {
    assert_eq!("all".parse::<Arena>().unwrap(), Arena::All);
    assert_eq!("PODS".parse::<Arena>().unwrap(), Arena::Pods);
    assert_eq!("controllers".parse::<Arena>().unwrap(), Arena::Controllers);
    assert_err!("everything".parse::<Arena>());
}

#[rstest]
fn test_assemble_all_arena() {
    let pods = vec![web_pod("web-1"), web_pod("web-2"), solo_pod("solo")];
    let population = Population::assemble(Arena::All, pods, vec![web_deployment(3)]);

    assert_eq!(population.len(), 2);
    assert_eq!(population.size(), 4);
    assert_eq!(population.survivor_names(), vec!["solo", "web"]);

    let web = population.get(&CombatantRef::new(CombatantKind::Deployment, "web")).unwrap();
    assert_eq!(web.members, vec!["web-1", "web-2"]);
    assert!(!population.contains(&CombatantRef::new(CombatantKind::Pod, "web-1")));
    assert_none!(population.sole_survivor());
}

#[rstest]
fn test_assemble_pods_arena() {
    let pods = vec![web_pod("web-1"), web_pod("web-2"), solo_pod("solo")];
    let population = Population::assemble(Arena::Pods, pods, vec![web_deployment(3)]);

    assert_eq!(population.size(), 3);
    assert!(population.iter().all(|c| c.kind == CombatantKind::Pod));
    assert_eq!(population.survivor_names(), vec!["solo", "web-1", "web-2"]);
}

#[rstest]
fn test_assemble_controllers_arena() {
    let pods = vec![web_pod("web-1"), solo_pod("solo")];
    let sts = Combatant::from_stateful_set(&build_stateful_set("db", 2, TEST_START_TS));
    let population = Population::assemble(Arena::Controllers, pods, vec![web_deployment(1), sts]);

    assert_eq!(population.survivor_names(), vec!["db", "web"]);
    assert_eq!(population.size(), 3);
}

#[rstest]
fn test_assemble_drops_scaled_to_zero() {
    let population = Population::assemble(Arena::All, vec![web_pod("web-1"), solo_pod("solo")], vec![web_deployment(0)]);

    // the leftover pod of a scaled-down deployment doesn't get to fight on its own
    assert_eq!(population.survivor_names(), vec!["solo"]);
    assert_eq!(population.size(), 1);
    assert_eq!(population.sole_survivor().unwrap().name, "solo");
}

#[rstest]
fn test_assemble_empty_selector_claims_nothing() {
    let mut depl = build_deployment("web", 2, TEST_START_TS);
    depl.spec.as_mut().unwrap().selector = Default::default();
    let population =
        Population::assemble(Arena::All, vec![web_pod("web-1")], vec![Combatant::from_deployment(&depl)]);

    assert_eq!(population.len(), 2);
    assert_is_empty!(population.get(&CombatantRef::new(CombatantKind::Deployment, "web")).unwrap().members);
}

#[rstest]
fn test_assemble_sums_member_restarts() {
    let mut restarted = build_pod("web-1", "web", TEST_START_TS);
    set_pod_restarts(&mut restarted, 4);
    let population =
        Population::assemble(Arena::All, vec![Combatant::from_pod(&restarted), web_pod("web-2")], vec![web_deployment(2)]);

    assert_eq!(population.combatants()[0].restarts, 4);
}

#[rstest]
fn test_sole_survivor() {
    let population = Population::assemble(Arena::All, vec![solo_pod("solo")], vec![]);
    assert_eq!(population.sole_survivor().unwrap().name, "solo");

    let population = Population::assemble(Arena::All, vec![], vec![web_deployment(1)]);
    assert_eq!(population.sole_survivor().unwrap().name, "web");
}

#[rstest]
#[tokio::test]
async fn test_census_pods_arena_skips_controllers() {
    let mut accessor = MockClusterAccessor::new();
    accessor
        .expect_list_pods()
        .times(1)
        .returning(|| Ok(vec![Combatant::from_pod(&standalone_pod("a", TEST_START_TS))]));

    let population = census(&accessor, Arena::Pods).await.unwrap();

    assert_eq!(population.survivor_names(), vec!["a"]);
}

#[rstest]
#[tokio::test]
async fn test_census_propagates_errors() {
    let mut accessor = MockClusterAccessor::new();
    accessor.expect_list_pods().returning(|| Ok(vec![]));
    accessor
        .expect_list_deployments()
        .returning(|| Err(BattleError::control_plane_unavailable("deployments")));

    let err = census(&accessor, Arena::All).await.unwrap_err();

    assert_matches!(err.downcast::<BattleError>().unwrap(), BattleError::ControlPlaneUnavailable(_));
}
