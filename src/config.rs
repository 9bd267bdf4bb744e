//! Game tuning, optionally loaded from a TOML file.
//!
//! Every section defaults to the stock game balance, so a config file only
//! needs the keys it wants to change.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::entities::EnemyKind;
use crate::spawner::{default_levels, Quota};

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(default)]
pub struct GameConfig {
    pub player: PlayerConfig,
    pub enemies: EnemiesConfig,
    pub drops: DropConfig,
    pub effects: EffectsConfig,
    pub spawner: SpawnerConfig,
    pub terminal: TerminalConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub width: f32,
    pub height: f32,
    pub speed: f32,
    pub max_hp: u32,
    pub damage: u32,
    /// Bullet damage is `damage * damage_multiplier`.
    pub damage_multiplier: u32,
    /// Hp drained per frame by each touching enemy.
    pub contact_damage: u32,
    pub first_level_exp: u32,
    pub exp_step: u32,
    pub hp_per_level: u32,
    pub bullet_speed: f32,
    pub bullet_size: f32,
    pub bullet_cooldown_ms: u64,
    pub cooldown_step_ms: u64,
    pub min_cooldown_ms: u64,
    /// Every n-th level grants +1 speed.
    pub speed_bonus_every: u32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            width: 100.0,
            height: 100.0,
            speed: 4.0,
            max_hp: 100,
            damage: 1,
            damage_multiplier: 10,
            contact_damage: 1,
            first_level_exp: 10,
            exp_step: 5,
            hp_per_level: 5,
            bullet_speed: 10.0,
            bullet_size: 20.0,
            bullet_cooldown_ms: 750,
            cooldown_step_ms: 10,
            min_cooldown_ms: 300,
            speed_bonus_every: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnemyStats {
    pub width: f32,
    pub height: f32,
    pub speed: f32,
    pub hp: i32,
    pub exp_worth: u32,
    pub explosion_particles: u32,
    pub explosion_hold_ms: u64,
}

impl Default for EnemyStats {
    fn default() -> Self {
        Self {
            width: 100.0,
            height: 100.0,
            speed: 2.0,
            hp: 20,
            exp_worth: 5,
            explosion_particles: 20,
            explosion_hold_ms: 100,
        }
    }
}

/// Per-kind stats.  A partial table only overrides the keys it names; the
/// rest keep that kind's own defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "EnemiesOverride")]
pub struct EnemiesConfig {
    pub basic: EnemyStats,
    pub bouncing: EnemyStats,
    pub big_bouncing: EnemyStats,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StatsOverride {
    width: Option<f32>,
    height: Option<f32>,
    speed: Option<f32>,
    hp: Option<i32>,
    exp_worth: Option<u32>,
    explosion_particles: Option<u32>,
    explosion_hold_ms: Option<u64>,
}

impl StatsOverride {
    fn apply(self, base: EnemyStats) -> EnemyStats {
        EnemyStats {
            width: self.width.unwrap_or(base.width),
            height: self.height.unwrap_or(base.height),
            speed: self.speed.unwrap_or(base.speed),
            hp: self.hp.unwrap_or(base.hp),
            exp_worth: self.exp_worth.unwrap_or(base.exp_worth),
            explosion_particles: self.explosion_particles.unwrap_or(base.explosion_particles),
            explosion_hold_ms: self.explosion_hold_ms.unwrap_or(base.explosion_hold_ms),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EnemiesOverride {
    basic: StatsOverride,
    bouncing: StatsOverride,
    big_bouncing: StatsOverride,
}

impl From<EnemiesOverride> for EnemiesConfig {
    fn from(o: EnemiesOverride) -> Self {
        let base = EnemiesConfig::default();
        Self {
            basic: o.basic.apply(base.basic),
            bouncing: o.bouncing.apply(base.bouncing),
            big_bouncing: o.big_bouncing.apply(base.big_bouncing),
        }
    }
}

impl Default for EnemiesConfig {
    fn default() -> Self {
        Self {
            basic: EnemyStats::default(),
            bouncing: EnemyStats {
                width: 40.0,
                height: 40.0,
                speed: 9.0,
                hp: 10,
                exp_worth: 7,
                ..EnemyStats::default()
            },
            big_bouncing: EnemyStats {
                width: 200.0,
                height: 200.0,
                speed: 15.0,
                hp: 250,
                exp_worth: 15,
                explosion_particles: 75,
                explosion_hold_ms: 500,
            },
        }
    }
}

impl EnemiesConfig {
    pub fn stats(&self, kind: EnemyKind) -> &EnemyStats {
        match kind {
            EnemyKind::Basic => &self.basic,
            EnemyKind::Bouncing => &self.bouncing,
            EnemyKind::BigBouncing => &self.big_bouncing,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DropConfig {
    /// A dying enemy drops health with probability `1 / health_odds`.
    pub health_odds: u32,
    pub health_value: u32,
    pub rapidfire_odds: u32,
    pub rapidfire_duration_ms: u64,
    pub rapidfire_cooldown_divisor: u64,
    pub pickup_size: f32,
}

impl Default for DropConfig {
    fn default() -> Self {
        Self {
            health_odds: 21,
            health_value: 20,
            rapidfire_odds: 25,
            rapidfire_duration_ms: 5000,
            rapidfire_cooldown_divisor: 3,
            pickup_size: 40.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EffectsConfig {
    pub exp_particle_size: f32,
    /// Homing step is `(exp_pull / distance)^2` pixels per frame.
    pub exp_pull: f32,
    pub explosion_alpha: f32,
    pub explosion_fade: f32,
    pub particle_min_size: u32,
    pub particle_max_size: u32,
    pub particle_max_speed: i32,
    pub text_fade: f32,
    pub text_fade_window_ms: u64,
    pub level_up_text_ms: u64,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            exp_particle_size: 8.0,
            exp_pull: 300.0,
            explosion_alpha: 0.7,
            explosion_fade: 0.01,
            particle_min_size: 5,
            particle_max_size: 30,
            particle_max_speed: 4,
            text_fade: 0.03,
            text_fade_window_ms: 500,
            level_up_text_ms: 1500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SpawnerConfig {
    pub frequency_ms: u64,
    pub start_level: usize,
    /// Level the spawner restarts from after the player dies.
    pub restart_level: usize,
    pub margin: f32,
    pub levels: Vec<Vec<Quota>>,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            frequency_ms: 3000,
            start_level: 1,
            restart_level: 0,
            margin: 100.0,
            levels: default_levels(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    pub frame_ms: u64,
    /// World pixels covered by one terminal cell.
    pub cell_width: f32,
    pub cell_height: f32,
    /// A key counts as held if seen within this many frames.
    pub hold_window_frames: u64,
    /// Empty disables logging.
    pub log_file: String,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            frame_ms: 16,
            cell_width: 10.0,
            cell_height: 20.0,
            hold_window_frames: 8,
            log_file: "survival_shooter.log".to_string(),
        }
    }
}

impl GameConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if self.terminal.frame_ms == 0 {
            return invalid("terminal.frame_ms must be positive");
        }
        if self.terminal.cell_width <= 0.0 || self.terminal.cell_height <= 0.0 {
            return invalid("terminal cell size must be positive");
        }
        if self.drops.health_odds == 0 || self.drops.rapidfire_odds == 0 {
            return invalid("drop odds must be at least 1");
        }
        if self.drops.rapidfire_cooldown_divisor == 0 {
            return invalid("drops.rapidfire_cooldown_divisor must be at least 1");
        }
        if self.effects.particle_min_size >= self.effects.particle_max_size {
            return invalid("effects.particle_min_size must be below particle_max_size");
        }
        if self.effects.particle_max_speed <= 0 {
            return invalid("effects.particle_max_speed must be positive");
        }
        if self.spawner.start_level > self.spawner.levels.len()
            || self.spawner.restart_level > self.spawner.levels.len()
        {
            return invalid("spawner start/restart level lies past the level table");
        }
        if self.player.width <= 0.0 || self.player.height <= 0.0 {
            return invalid("player size must be positive");
        }
        Ok(())
    }
}
