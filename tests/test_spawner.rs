use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;

use survival_shooter::entities::EnemyKind;
use survival_shooter::spawner::{default_levels, EnemySpawner, Quota, SpawnEvent};

const WIDTH: f32 = 1000.0;
const HEIGHT: f32 = 800.0;

fn spawner_at(level: usize) -> EnemySpawner {
    EnemySpawner::new(level, 3000, 100.0, default_levels())
}

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn spawned_kind(ev: &SpawnEvent) -> Option<EnemyKind> {
    match ev {
        SpawnEvent::Spawned { kind, .. } => Some(*kind),
        _ => None,
    }
}

// ── Quota handling ────────────────────────────────────────────────────────────

#[test]
fn first_spawn_is_immediate() {
    let mut s = spawner_at(1);
    let ev = s.update(0, 0, WIDTH, HEIGHT, &mut seeded_rng());
    assert_eq!(spawned_kind(&ev), Some(EnemyKind::Basic));
    assert_eq!(s.remaining(), 0);
    assert_eq!(s.last_spawn_ms, Some(0));
}

#[test]
fn spawns_are_spaced_by_frequency() {
    let mut rng = seeded_rng();
    let mut s = spawner_at(2);
    assert!(spawned_kind(&s.update(0, 0, WIDTH, HEIGHT, &mut rng)).is_some());
    assert_eq!(s.update(2999, 1, WIDTH, HEIGHT, &mut rng), SpawnEvent::Idle);
    assert!(spawned_kind(&s.update(3000, 1, WIDTH, HEIGHT, &mut rng)).is_some());
    assert_eq!(s.remaining(), 1);
}

#[test]
fn level_releases_exactly_its_quota() {
    let mut rng = seeded_rng();
    let mut s = spawner_at(3);
    let mut basic = 0;
    let mut bouncing = 0;
    let mut now = 0;
    loop {
        match spawned_kind(&s.update(now, 1, WIDTH, HEIGHT, &mut rng)) {
            Some(EnemyKind::Basic) => basic += 1,
            Some(EnemyKind::Bouncing) => bouncing += 1,
            Some(other) => panic!("unexpected {other:?}"),
            None => break,
        }
        now += 3000;
    }
    assert_eq!((basic, bouncing), (3, 5));
    assert_eq!(s.remaining(), 0);
    assert_eq!(s.level, 3);
}

#[test]
fn exhausted_entries_are_skipped() {
    let mut rng = seeded_rng();
    let levels = vec![vec![
        Quota::new(0, EnemyKind::Basic),
        Quota::new(1, EnemyKind::Bouncing),
    ]];
    let mut s = EnemySpawner::new(0, 3000, 100.0, levels);
    let ev = s.update(0, 0, WIDTH, HEIGHT, &mut rng);
    assert_eq!(spawned_kind(&ev), Some(EnemyKind::Bouncing));
}

// ── Level progression ─────────────────────────────────────────────────────────

#[test]
fn level_waits_for_field_to_clear() {
    let mut rng = seeded_rng();
    let mut s = spawner_at(1);
    s.update(0, 0, WIDTH, HEIGHT, &mut rng);

    assert_eq!(s.update(5000, 1, WIDTH, HEIGHT, &mut rng), SpawnEvent::Idle);
    assert_eq!(s.level, 1);

    assert_eq!(
        s.update(5016, 0, WIDTH, HEIGHT, &mut rng),
        SpawnEvent::LevelAdvanced(2)
    );
    assert_eq!(s.level, 2);
}

#[test]
fn empty_level_zero_advances_immediately() {
    let mut s = spawner_at(0);
    assert_eq!(
        s.update(0, 0, WIDTH, HEIGHT, &mut seeded_rng()),
        SpawnEvent::LevelAdvanced(1)
    );
}

#[test]
fn spawner_is_quiet_past_last_level() {
    let mut rng = seeded_rng();
    let mut s = spawner_at(5);
    s.update(0, 0, WIDTH, HEIGHT, &mut rng); // the lone BigBouncing
    assert_eq!(
        s.update(100, 0, WIDTH, HEIGHT, &mut rng),
        SpawnEvent::LevelAdvanced(6)
    );
    assert!(s.is_exhausted());

    for now in [200, 10_000, 1_000_000] {
        assert_eq!(s.update(now, 0, WIDTH, HEIGHT, &mut rng), SpawnEvent::Idle);
    }
    assert_eq!(s.level, 6);
    assert_eq!(s.remaining(), 0);
}

#[test]
fn default_table_shape() {
    let levels = default_levels();
    assert_eq!(levels.len(), 6);
    assert!(levels[0].is_empty());
    let totals: Vec<u32> = levels
        .iter()
        .map(|l| l.iter().map(|q| q.count).sum())
        .collect();
    assert_eq!(totals, vec![0, 1, 3, 8, 9, 1]);
    assert_eq!(levels[5], vec![Quota::new(1, EnemyKind::BigBouncing)]);
}

// ── Spawn positions ───────────────────────────────────────────────────────────

#[test]
fn spawn_positions_respect_margin() {
    let mut rng = seeded_rng();
    let levels = vec![vec![Quota::new(50, EnemyKind::Bouncing)]];
    let mut s = EnemySpawner::new(0, 0, 100.0, levels);
    for now in 0..50 {
        match s.update(now, 0, WIDTH, HEIGHT, &mut rng) {
            SpawnEvent::Spawned { pos, .. } => {
                assert!(pos.x >= 1.0 && pos.x < 900.0, "{pos:?}");
                assert!(pos.y >= 1.0 && pos.y < 700.0, "{pos:?}");
            }
            other => panic!("expected a spawn, got {other:?}"),
        }
    }
}

#[test]
fn tiny_field_spawns_at_origin() {
    let mut s = spawner_at(1);
    match s.update(0, 0, 50.0, 50.0, &mut seeded_rng()) {
        SpawnEvent::Spawned { pos, .. } => assert_eq!(pos, Vec2::ZERO),
        other => panic!("expected a spawn, got {other:?}"),
    }
}
