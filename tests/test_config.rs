use survival_shooter::config::{ConfigError, GameConfig};
use survival_shooter::entities::EnemyKind;
use survival_shooter::spawner::Quota;

#[test]
fn empty_file_yields_defaults() {
    let cfg = GameConfig::from_toml_str("").expect("empty config parses");
    assert_eq!(cfg, GameConfig::default());
}

#[test]
fn partial_sections_keep_remaining_defaults() {
    let cfg = GameConfig::from_toml_str(
        r#"
        [player]
        speed = 6.0

        [enemies.bouncing]
        hp = 30
        "#,
    )
    .expect("valid config");

    assert_eq!(cfg.player.speed, 6.0);
    assert_eq!(cfg.player.max_hp, 100);
    assert_eq!(cfg.enemies.bouncing.hp, 30);
    assert_eq!(cfg.enemies.bouncing.width, 40.0);
    assert_eq!(cfg.enemies.basic.hp, 20);
}

#[test]
fn level_table_from_toml() {
    let cfg = GameConfig::from_toml_str(
        r#"
        [spawner]
        frequency_ms = 1000
        levels = [
            [],
            [{ count = 2, kind = "bouncing" }],
            [{ count = 1, kind = "big_bouncing" }, { count = 3, kind = "basic" }],
        ]
        "#,
    )
    .expect("valid config");

    assert_eq!(cfg.spawner.frequency_ms, 1000);
    assert_eq!(cfg.spawner.levels.len(), 3);
    assert_eq!(cfg.spawner.levels[1], vec![Quota::new(2, EnemyKind::Bouncing)]);
    assert_eq!(
        cfg.spawner.levels[2],
        vec![
            Quota::new(1, EnemyKind::BigBouncing),
            Quota::new(3, EnemyKind::Basic)
        ]
    );
}

#[test]
fn unknown_enemy_kind_is_a_parse_error() {
    let err = GameConfig::from_toml_str(
        r#"
        [spawner]
        levels = [[{ count = 1, kind = "dragon" }]]
        "#,
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let err = GameConfig::from_toml_str("[[[player").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn zero_frame_time_is_rejected() {
    let err = GameConfig::from_toml_str("[terminal]\nframe_ms = 0\n").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn zero_drop_odds_are_rejected() {
    let err = GameConfig::from_toml_str("[drops]\nhealth_odds = 0\n").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn start_level_past_table_is_rejected() {
    let err = GameConfig::from_toml_str("[spawner]\nstart_level = 10\n").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn start_level_just_past_table_is_allowed() {
    // Starting on the exhausted level is a valid (if quiet) game.
    let cfg = GameConfig::from_toml_str("[spawner]\nstart_level = 6\n").expect("valid config");
    assert_eq!(cfg.spawner.start_level, 6);
}

#[test]
fn missing_file_is_an_io_error() {
    let path = std::env::temp_dir().join("survival_shooter_no_such_config.toml");
    let err = GameConfig::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn load_reads_file_from_disk() {
    let path = std::env::temp_dir().join(format!(
        "survival_shooter_test_{}.toml",
        std::process::id()
    ));
    std::fs::write(&path, "[terminal]\ncell_width = 8.0\nlog_file = \"\"\n").expect("write temp");
    let cfg = GameConfig::load(&path);
    let _ = std::fs::remove_file(&path);

    let cfg = cfg.expect("valid config");
    assert_eq!(cfg.terminal.cell_width, 8.0);
    assert!(cfg.terminal.log_file.is_empty());
}

#[test]
fn error_messages_name_the_problem() {
    let err = GameConfig::from_toml_str("[terminal]\ncell_height = 0.0\n").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid configuration: terminal cell size must be positive"
    );
}
