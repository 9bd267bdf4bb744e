//! Leveled enemy spawner.
//!
//! Each level holds a quota table of `(count, kind)` pairs.  One enemy is
//! released per `frequency_ms`; the level only advances once its quota is
//! spent *and* the playfield is clear.  Past the last level the spawner
//! goes quiet.

use glam::Vec2;
use rand::Rng;
use serde::Deserialize;

use crate::entities::EnemyKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct Quota {
    pub count: u32,
    pub kind: EnemyKind,
}

impl Quota {
    pub const fn new(count: u32, kind: EnemyKind) -> Self {
        Self { count, kind }
    }
}

/// Built-in wave table.  Level 0 is intentionally empty so a restart
/// rolls straight into level 1.
pub fn default_levels() -> Vec<Vec<Quota>> {
    use EnemyKind::*;
    vec![
        vec![],
        vec![Quota::new(1, Basic)],
        vec![Quota::new(2, Basic), Quota::new(1, Bouncing)],
        vec![Quota::new(3, Basic), Quota::new(5, Bouncing)],
        vec![Quota::new(2, Basic), Quota::new(7, Bouncing)],
        vec![Quota::new(1, BigBouncing)],
    ]
}

/// What a single `update` call did.
#[derive(Clone, Debug, PartialEq)]
pub enum SpawnEvent {
    Idle,
    Spawned { kind: EnemyKind, pos: Vec2 },
    LevelAdvanced(usize),
}

#[derive(Clone, Debug)]
pub struct EnemySpawner {
    pub level: usize,
    pub frequency_ms: u64,
    pub last_spawn_ms: Option<u64>,
    /// Spawn positions stay this far from the right and bottom edges.
    pub margin: f32,
    levels: Vec<Vec<Quota>>,
}

impl EnemySpawner {
    pub fn new(level: usize, frequency_ms: u64, margin: f32, levels: Vec<Vec<Quota>>) -> Self {
        Self {
            level,
            frequency_ms,
            last_spawn_ms: None,
            margin,
            levels,
        }
    }

    /// True once every defined level has been cleared.
    pub fn is_exhausted(&self) -> bool {
        self.level >= self.levels.len()
    }

    /// Enemies still to be released on the current level.
    pub fn remaining(&self) -> u32 {
        self.levels
            .get(self.level)
            .map(|quotas| quotas.iter().map(|q| q.count).sum())
            .unwrap_or(0)
    }

    /// Advance the spawner by one frame.
    ///
    /// `enemies_alive` is the number of enemies currently on the field;
    /// `width`/`height` bound the random spawn position.
    pub fn update(
        &mut self,
        now_ms: u64,
        enemies_alive: usize,
        width: f32,
        height: f32,
        rng: &mut impl Rng,
    ) -> SpawnEvent {
        let Some(quotas) = self.levels.get_mut(self.level) else {
            return SpawnEvent::Idle;
        };

        quotas.retain(|q| q.count > 0);

        if !quotas.is_empty() {
            let due = self
                .last_spawn_ms
                .map_or(true, |last| now_ms.saturating_sub(last) >= self.frequency_ms);
            if !due {
                return SpawnEvent::Idle;
            }

            let pos = Vec2::new(
                random_coord(rng, width - self.margin),
                random_coord(rng, height - self.margin),
            );
            let index = rng.gen_range(0..quotas.len());
            quotas[index].count -= 1;
            self.last_spawn_ms = Some(now_ms);
            return SpawnEvent::Spawned {
                kind: quotas[index].kind,
                pos,
            };
        }

        if enemies_alive == 0 {
            self.level += 1;
            return SpawnEvent::LevelAdvanced(self.level);
        }
        SpawnEvent::Idle
    }
}

/// Random whole-pixel coordinate in `[1, upper)`, or 0 when the field is
/// too small to leave room.
fn random_coord(rng: &mut impl Rng, upper: f32) -> f32 {
    let hi = upper.floor() as i64;
    if hi > 1 {
        rng.gen_range(1..hi) as f32
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn random_coord_degenerates_to_zero() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(random_coord(&mut rng, 1.5), 0.0);
        assert_eq!(random_coord(&mut rng, -40.0), 0.0);
    }

    #[test]
    fn random_coord_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let c = random_coord(&mut rng, 50.0);
            assert!((1.0..50.0).contains(&c));
            assert_eq!(c, c.floor());
        }
    }
}
