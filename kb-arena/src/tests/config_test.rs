use assert_fs::prelude::*;

use super::*;

#[rstest]
fn test_validate_defaults() {
    let config = BattleSettings::default().validate().unwrap();
    assert_eq!(config, BattleConfig::default());
    assert_eq!(config.namespace, DEFAULT_NAMESPACE);
    assert_eq!(config.strategy, Strategy::Random);
    assert_eq!(config.arena, Arena::All);
    assert_none!(config.max_rounds);
}

#[rstest]
fn test_validate_full_settings() {
    let settings = BattleSettings {
        namespace: Some(TEST_NAMESPACE.into()),
        strategy: Some("resource-hog".into()),
        arena: Some("controllers".into()),
        interval_seconds: Some(0),
        max_rounds: Some(7),
        failure_threshold: Some(5),
        pause_poll_seconds: Some(2),
        seed: Some(42),
    };

    assert_eq!(
        settings.validate().unwrap(),
        BattleConfig {
            namespace: TEST_NAMESPACE.into(),
            strategy: Strategy::ResourceHog,
            arena: Arena::Controllers,
            interval_seconds: 0,
            max_rounds: Some(7),
            failure_threshold: 5,
            pause_poll_seconds: 2,
            seed: Some(42),
        }
    );
}

#[rstest]
fn test_validate_zero_max_rounds_is_unbounded() {
    let settings = BattleSettings { max_rounds: Some(0), ..Default::default() };
    assert_none!(settings.validate().unwrap().max_rounds);
}

#[rstest]
#[case::negative_interval(BattleSettings { interval_seconds: Some(-1), ..Default::default() })]
#[case::negative_max_rounds(BattleSettings { max_rounds: Some(-5), ..Default::default() })]
#[case::negative_poll(BattleSettings { pause_poll_seconds: Some(-10), ..Default::default() })]
#[case::zero_poll(BattleSettings { pause_poll_seconds: Some(0), ..Default::default() })]
#[case::zero_threshold(BattleSettings { failure_threshold: Some(0), ..Default::default() })]
#[case::unknown_strategy(BattleSettings { strategy: Some("tallest".into()), ..Default::default() })]
#[case::unknown_arena(BattleSettings { arena: Some("services".into()), ..Default::default() })]
#[case::empty_namespace(BattleSettings { namespace: Some("".into()), ..Default::default() })]
fn test_validate_invalid(#[case] settings: BattleSettings) {
    let err = settings.validate().unwrap_err();
    assert_matches!(err.downcast::<BattleError>().unwrap(), BattleError::InvalidConfiguration(_));
}

#[rstest]
fn test_overlay() {
    let file = BattleSettings {
        namespace: Some("from-file".into()),
        strategy: Some("oldest".into()),
        seed: Some(1),
        ..Default::default()
    };
    let flags = BattleSettings {
        strategy: Some("youngest".into()),
        max_rounds: Some(3),
        ..Default::default()
    };

    let merged = file.overlay(flags);

    assert_eq!(merged.namespace.as_deref(), Some("from-file"));
    assert_eq!(merged.strategy.as_deref(), Some("youngest"));
    assert_eq!(merged.max_rounds, Some(3));
    assert_eq!(merged.seed, Some(1));
}

#[rstest]
fn test_load_settings() {
    let file = assert_fs::NamedTempFile::new("battle.yml").unwrap();
    file.write_str(
        r#"---
namespace: arena
strategy: oldest
intervalSeconds: 30
maxRounds: 10
"#,
    )
    .unwrap();

    let settings = BattleSettings::load(file.path()).unwrap();

    assert_eq!(
        settings,
        BattleSettings {
            namespace: Some("arena".into()),
            strategy: Some("oldest".into()),
            interval_seconds: Some(30),
            max_rounds: Some(10),
            ..Default::default()
        }
    );
}

#[rstest]
fn test_load_settings_unknown_field() {
    let file = assert_fs::NamedTempFile::new("battle.yml").unwrap();
    file.write_str("namespace: arena\nstrateyg: oldest\n").unwrap();

    let err = BattleSettings::load(file.path()).unwrap_err();

    assert_matches!(err.downcast::<BattleError>().unwrap(), BattleError::InvalidConfiguration(_));
}
