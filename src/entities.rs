//! All game entity types: pure data, no logic.
//!
//! Positions are the top-left corner of an object in world pixels;
//! velocities are pixels per frame.

use glam::Vec2;
use serde::Deserialize;

use crate::spawner::EnemySpawner;

// ── Colours ───────────────────────────────────────────────────────────────────

/// Plain RGB triple; the renderer fades it toward black for alpha.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const RED: Rgb = Rgb(0xff, 0x00, 0x00);
    pub const WHITE: Rgb = Rgb(0xff, 0xff, 0xff);
    pub const LEVEL_UP: Rgb = Rgb(0xe3, 0xf2, 0x38);
}

// ── Kinds ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    /// Chases the player in straight axis steps.
    Basic,
    /// Bounces off the playfield edges.
    Bouncing,
    /// A large bouncer that splits into four bouncers on death.
    BigBouncing,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PickupKind {
    /// Restores a fixed amount of health, clamped to the maximum.
    Health,
    /// Shortens the shot cooldown for a limited time.
    Rapidfire,
}

// ── Player ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Player {
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    /// Pixels moved per frame on each held axis.
    pub speed: f32,
    pub hp: u32,
    pub max_hp: u32,
    pub damage: u32,
    pub level: u32,
    pub exp: u32,
    pub next_level_exp: u32,
    pub bullet_speed: f32,
    pub bullet_size: f32,
    pub bullet_cooldown_ms: u64,
    pub last_shot_ms: Option<u64>,
    /// Clock time at which an active Rapidfire pickup wears off.
    pub rapidfire_until_ms: Option<u64>,
}

// ── Enemies ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub width: f32,
    pub height: f32,
    pub hp: i32,
    pub max_hp: i32,
    pub exp_worth: u32,
}

// ── Projectiles & pickups ─────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Bullet {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
}

/// Experience orb that homes in on the player.
#[derive(Clone, Debug)]
pub struct ExpParticle {
    pub pos: Vec2,
    pub size: f32,
}

#[derive(Clone, Debug)]
pub struct Pickup {
    pub kind: PickupKind,
    pub pos: Vec2,
    pub size: f32,
}

// ── Effects ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub color: Rgb,
}

/// A burst of particles sharing one alpha; fades once `hold_ms` has passed.
#[derive(Clone, Debug)]
pub struct ParticleExplosion {
    pub particles: Vec<Particle>,
    pub alpha: f32,
    pub hold_ms: u64,
    pub created_ms: u64,
}

/// Transient on-screen message. A `duration_ms` of 0 never expires.
#[derive(Clone, Debug)]
pub struct GameText {
    pub text: String,
    pub pos: Vec2,
    pub size: u16,
    pub color: Rgb,
    pub duration_ms: u64,
    pub alpha: f32,
    pub created_ms: u64,
}

// ── Input ─────────────────────────────────────────────────────────────────────

/// Snapshot of the controls held during one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InputState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub aim_up: bool,
    pub aim_down: bool,
    pub aim_left: bool,
    pub aim_right: bool,
    /// World position of a held mouse button, if any.
    pub aim_target: Option<Vec2>,
}

// ── Master game state ─────────────────────────────────────────────────────────

/// The entire game state.  Cloneable so pure update functions can
/// return a new copy without mutating the original.
#[derive(Clone, Debug)]
pub struct GameState {
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub bullets: Vec<Bullet>,
    pub exp_particles: Vec<ExpParticle>,
    pub pickups: Vec<Pickup>,
    pub explosions: Vec<ParticleExplosion>,
    pub texts: Vec<GameText>,
    pub spawner: EnemySpawner,
    /// Playfield size in world pixels.
    pub width: f32,
    pub height: f32,
    /// Milliseconds of simulated time since the state was created.
    pub clock_ms: u64,
    pub frame: u64,
}
