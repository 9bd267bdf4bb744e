//! Pure game-logic functions.
//!
//! Every public state transition takes an immutable reference to the current
//! `GameState` (and, where needed, an RNG handle) and returns a brand-new
//! `GameState`.  Side effects are limited to the injected RNG and logging.

use glam::Vec2;
use log::{debug, info, warn};
use rand::Rng;

use crate::config::{GameConfig, TerminalConfig};
use crate::entities::{
    Bullet, Enemy, EnemyKind, ExpParticle, GameState, GameText, InputState, Particle,
    ParticleExplosion, Pickup, PickupKind, Player, Rgb,
};
use crate::hitbox::{Collider, Hitbox};
use crate::spawner::{EnemySpawner, SpawnEvent};

/// Directions of the four children released by a dying BigBouncing.
const SPLIT_DIRECTIONS: [Vec2; 4] = [
    Vec2::new(-1.0, -1.0),
    Vec2::new(1.0, 1.0),
    Vec2::new(-1.0, 1.0),
    Vec2::new(1.0, -1.0),
];

// ── Constructors ─────────────────────────────────────────────────────────────

/// World size in pixels for a terminal of `cols` x `rows`, leaving room for
/// the HUD, border and hint rows.
pub fn world_size(cols: u16, rows: u16, terminal: &TerminalConfig) -> (f32, f32) {
    let width = f32::from(cols.saturating_sub(2)) * terminal.cell_width;
    let height = f32::from(rows.saturating_sub(4)) * terminal.cell_height;
    (width, height)
}

/// A fresh player centred in a `width` x `height` field.
pub fn new_player(config: &GameConfig, width: f32, height: f32) -> Player {
    let p = &config.player;
    Player {
        pos: Vec2::new(width / 2.0 - p.width / 2.0, height / 2.0 - p.height / 2.0),
        width: p.width,
        height: p.height,
        speed: p.speed,
        hp: p.max_hp,
        max_hp: p.max_hp,
        damage: p.damage,
        level: 1,
        exp: 0,
        next_level_exp: p.first_level_exp,
        bullet_speed: p.bullet_speed,
        bullet_size: p.bullet_size,
        bullet_cooldown_ms: p.bullet_cooldown_ms,
        last_shot_ms: None,
        rapidfire_until_ms: None,
    }
}

pub fn new_enemy(kind: EnemyKind, pos: Vec2, config: &GameConfig) -> Enemy {
    let stats = config.enemies.stats(kind);
    Enemy {
        kind,
        pos,
        vel: Vec2::splat(stats.speed),
        width: stats.width,
        height: stats.height,
        hp: stats.hp,
        max_hp: stats.hp,
        exp_worth: stats.exp_worth,
    }
}

fn new_spawner(level: usize, config: &GameConfig) -> EnemySpawner {
    let s = &config.spawner;
    EnemySpawner::new(level, s.frequency_ms, s.margin, s.levels.clone())
}

fn new_explosion(
    origin: Vec2,
    amount: u32,
    hold_ms: u64,
    color: Rgb,
    now_ms: u64,
    config: &GameConfig,
    rng: &mut impl Rng,
) -> ParticleExplosion {
    let fx = &config.effects;
    let particles = (0..amount)
        .map(|_| Particle {
            pos: origin,
            vel: Vec2::new(
                rng.gen_range(-fx.particle_max_speed..fx.particle_max_speed) as f32,
                rng.gen_range(-fx.particle_max_speed..fx.particle_max_speed) as f32,
            ),
            size: rng.gen_range(fx.particle_min_size..fx.particle_max_size) as f32,
            color,
        })
        .collect();
    ParticleExplosion {
        particles,
        alpha: fx.explosion_alpha,
        hold_ms,
        created_ms: now_ms,
    }
}

/// Build the initial game state for the given playfield size.
pub fn init_state(config: &GameConfig, width: f32, height: f32) -> GameState {
    if width < config.player.width || height < config.player.height {
        warn!("playfield {width}x{height} is smaller than the player");
    }
    GameState {
        player: new_player(config, width, height),
        enemies: Vec::new(),
        bullets: Vec::new(),
        exp_particles: Vec::new(),
        pickups: Vec::new(),
        explosions: Vec::new(),
        texts: Vec::new(),
        spawner: new_spawner(config.spawner.start_level, config),
        width,
        height,
        clock_ms: 0,
        frame: 0,
    }
}

// ── Geometry helpers ─────────────────────────────────────────────────────────

/// Keep a `w` x `h` body inside the field.
fn clamp_to_field(pos: Vec2, w: f32, h: f32, field_w: f32, field_h: f32) -> Vec2 {
    Vec2::new(
        pos.x.clamp(0.0, (field_w - w).max(0.0)),
        pos.y.clamp(0.0, (field_h - h).max(0.0)),
    )
}

/// Signed step from `from` toward `to`, never overshooting.
fn approach(from: f32, to: f32, step: f32) -> f32 {
    let gap = to - from;
    if gap == 0.0 {
        0.0
    } else {
        gap.signum() * step.min(gap.abs())
    }
}

fn random_between(rng: &mut impl Rng, lo: f32, hi: f32) -> f32 {
    if hi > lo {
        rng.gen_range(lo..hi)
    } else {
        lo
    }
}

// ── Input-driven state transitions (pure) ───────────────────────────────────

/// Playfield resize: record the new size and pull the player and any
/// pickups back inside.
pub fn resize(state: &GameState, width: f32, height: f32) -> GameState {
    debug!("playfield resized to {width}x{height}");
    let mut next = state.clone();
    next.width = width;
    next.height = height;
    next.player.pos = clamp_to_field(
        next.player.pos,
        next.player.width,
        next.player.height,
        width,
        height,
    );
    for pickup in &mut next.pickups {
        pickup.pos = clamp_to_field(pickup.pos, pickup.size, pickup.size, width, height);
    }
    next
}

fn step_player_movement(player: &mut Player, input: &InputState, field_w: f32, field_h: f32) {
    let mut step = Vec2::ZERO;
    if input.up {
        step.y -= player.speed;
    }
    if input.down {
        step.y += player.speed;
    }
    if input.left {
        step.x -= player.speed;
    }
    if input.right {
        step.x += player.speed;
    }
    player.pos = clamp_to_field(player.pos + step, player.width, player.height, field_w, field_h);
}

pub fn move_player(state: &GameState, input: &InputState) -> GameState {
    let mut next = state.clone();
    step_player_movement(&mut next.player, input, next.width, next.height);
    next
}

/// Bullet velocity for the current aim, if the player is aiming at all.
///
/// Arrow keys pick a per-axis velocity (diagonals allowed); otherwise a
/// held mouse button fires toward the pointer at `bullet_speed`.
pub fn aim_velocity(player: &Player, input: &InputState) -> Option<Vec2> {
    let speed = player.bullet_speed;
    let mut vel = Vec2::ZERO;
    if input.aim_up {
        vel.y = -speed;
    }
    if input.aim_down {
        vel.y = speed;
    }
    if input.aim_left {
        vel.x = -speed;
    }
    if input.aim_right {
        vel.x = speed;
    }
    if vel != Vec2::ZERO {
        return Some(vel);
    }

    let target = input.aim_target?;
    let dir = (target - player.hitbox().center()).normalize_or_zero();
    (dir != Vec2::ZERO).then(|| dir * speed)
}

/// Milliseconds of Rapidfire left at `now_ms`, if active.
pub fn rapidfire_remaining_ms(player: &Player, now_ms: u64) -> Option<u64> {
    player
        .rapidfire_until_ms
        .filter(|&until| now_ms < until)
        .map(|until| until - now_ms)
}

pub fn effective_cooldown_ms(player: &Player, now_ms: u64, config: &GameConfig) -> u64 {
    if rapidfire_remaining_ms(player, now_ms).is_some() {
        player.bullet_cooldown_ms / config.drops.rapidfire_cooldown_divisor.max(1)
    } else {
        player.bullet_cooldown_ms
    }
}

fn fire(state: &mut GameState, input: &InputState, config: &GameConfig) {
    let now = state.clock_ms;
    let player = &state.player;

    if let Some(last) = player.last_shot_ms {
        if now.saturating_sub(last) < effective_cooldown_ms(player, now, config) {
            return;
        }
    }
    let Some(vel) = aim_velocity(player, input) else {
        return;
    };

    let size = player.bullet_size;
    let pos = player.hitbox().center() - Vec2::splat(size / 2.0);
    state.bullets.push(Bullet { pos, vel, size });
    state.player.last_shot_ms = Some(now);
}

/// Fire a bullet if the cooldown allows and the player is aiming.
pub fn player_shoot(state: &GameState, input: &InputState, config: &GameConfig) -> GameState {
    let mut next = state.clone();
    fire(&mut next, input, config);
    next
}

// ── Player progression ───────────────────────────────────────────────────────

/// Apply one level-up: experience rolls over and every stat grows.
pub fn level_up(player: &Player, config: &GameConfig) -> Player {
    let cfg = &config.player;
    let mut p = player.clone();
    p.level += 1;
    p.exp = p.exp.saturating_sub(p.next_level_exp);
    p.next_level_exp += cfg.exp_step;
    p.damage += 1;
    p.max_hp += cfg.hp_per_level;
    p.hp += cfg.hp_per_level;
    if p.bullet_cooldown_ms > cfg.min_cooldown_ms {
        p.bullet_cooldown_ms = p
            .bullet_cooldown_ms
            .saturating_sub(cfg.cooldown_step_ms)
            .max(cfg.min_cooldown_ms);
    }
    if cfg.speed_bonus_every > 0 && p.level % cfg.speed_bonus_every == 0 {
        p.speed += 1.0;
    }
    p
}

pub fn apply_pickup(player: &Player, kind: PickupKind, now_ms: u64, config: &GameConfig) -> Player {
    let mut p = player.clone();
    match kind {
        PickupKind::Health => {
            p.hp = (p.hp + config.drops.health_value).min(p.max_hp);
        }
        PickupKind::Rapidfire => {
            p.rapidfire_until_ms = Some(now_ms + config.drops.rapidfire_duration_ms);
        }
    }
    p
}

/// Returns `true` if the player died this frame.
fn update_player(state: &mut GameState, input: &InputState, config: &GameConfig) -> bool {
    let touching = state
        .enemies
        .iter()
        .filter(|e| e.collides_with(&state.player))
        .count() as u32;
    state.player.hp = state
        .player
        .hp
        .saturating_sub(touching * config.player.contact_damage);

    step_player_movement(&mut state.player, input, state.width, state.height);
    fire(state, input, config);

    if state.player.exp >= state.player.next_level_exp {
        state.player = level_up(&state.player, config);
        info!("player reached level {}", state.player.level);
        state.texts.push(GameText {
            text: "Level up!".to_string(),
            pos: state.player.pos,
            size: 20,
            color: Rgb::LEVEL_UP,
            duration_ms: config.effects.level_up_text_ms,
            alpha: 1.0,
            created_ms: state.clock_ms,
        });
    }

    state.player.hp == 0
}

/// Wipe the field and start over from the restart level.  Texts survive.
fn reset_after_death(state: &mut GameState, config: &GameConfig) {
    info!(
        "player died at level {} during wave {}",
        state.player.level, state.spawner.level
    );
    let player = new_player(config, state.width, state.height);
    let pos = player.pos;

    state.player = player;
    state.enemies.clear();
    state.bullets.clear();
    state.exp_particles.clear();
    state.pickups.clear();
    state.explosions.clear();
    state.spawner = new_spawner(config.spawner.restart_level, config);
    state.texts.push(GameText {
        text: "You died!".to_string(),
        pos,
        size: 30,
        color: Rgb::RED,
        duration_ms: 2000,
        alpha: 1.0,
        created_ms: state.clock_ms,
    });
}

// ── Enemies ──────────────────────────────────────────────────────────────────

/// One frame of enemy movement.
pub fn move_enemy(enemy: &mut Enemy, player_pos: Vec2, field_w: f32, field_h: f32) {
    match enemy.kind {
        EnemyKind::Basic => {
            enemy.pos.x += if player_pos.x >= enemy.pos.x { enemy.vel.x } else { -enemy.vel.x };
            enemy.pos.y += if player_pos.y >= enemy.pos.y { enemy.vel.y } else { -enemy.vel.y };
        }
        EnemyKind::Bouncing | EnemyKind::BigBouncing => {
            enemy.pos += enemy.vel;
            if enemy.pos.x <= 0.0 {
                enemy.vel.x = enemy.vel.x.abs();
            } else if enemy.pos.x + enemy.width >= field_w {
                enemy.vel.x = -enemy.vel.x.abs();
            }
            if enemy.pos.y <= 0.0 {
                enemy.vel.y = enemy.vel.y.abs();
            } else if enemy.pos.y + enemy.height >= field_h {
                enemy.vel.y = -enemy.vel.y.abs();
            }
        }
    }
}

fn kill_enemy(state: &mut GameState, enemy: Enemy, config: &GameConfig, rng: &mut impl Rng) {
    debug!(
        "{:?} destroyed at ({:.0}, {:.0})",
        enemy.kind, enemy.pos.x, enemy.pos.y
    );
    let now = state.clock_ms;
    let center = enemy.hitbox().center();

    if enemy.kind == EnemyKind::BigBouncing {
        let speed = config.enemies.bouncing.speed;
        for dir in SPLIT_DIRECTIONS {
            let mut child = new_enemy(EnemyKind::Bouncing, center, config);
            child.vel = dir * speed;
            state.enemies.push(child);
        }
    }

    for _ in 0..enemy.exp_worth {
        let pos = Vec2::new(
            random_between(rng, enemy.pos.x, enemy.pos.x + enemy.width),
            random_between(rng, enemy.pos.y, enemy.pos.y + enemy.height),
        );
        state.exp_particles.push(ExpParticle {
            pos,
            size: config.effects.exp_particle_size,
        });
    }

    // Drops land fully inside the field so the player can always reach them.
    let drops = &config.drops;
    let size = drops.pickup_size;
    let (field_w, field_h) = (state.width, state.height);
    if rng.gen_range(0..drops.health_odds) == 0 {
        state.pickups.push(Pickup {
            kind: PickupKind::Health,
            pos: clamp_to_field(enemy.pos, size, size, field_w, field_h),
            size,
        });
    }
    if rng.gen_range(0..drops.rapidfire_odds) == 0 {
        let pos = enemy.pos + Vec2::new(size, 0.0);
        state.pickups.push(Pickup {
            kind: PickupKind::Rapidfire,
            pos: clamp_to_field(pos, size, size, field_w, field_h),
            size,
        });
    }

    let stats = config.enemies.stats(enemy.kind);
    let origin = if enemy.kind == EnemyKind::BigBouncing {
        center
    } else {
        enemy.pos
    };
    let explosion = new_explosion(
        origin,
        stats.explosion_particles,
        stats.explosion_hold_ms,
        Rgb::RED,
        now,
        config,
        rng,
    );
    state.explosions.push(explosion);
}

/// Bullets hit, enemies move, and the dead are replaced by their drops.
fn update_enemies(state: &mut GameState, config: &GameConfig, rng: &mut impl Rng) {
    let bullet_damage = (state.player.damage * config.player.damage_multiplier) as i32;
    let player_pos = state.player.pos;
    let (field_w, field_h) = (state.width, state.height);

    let mut survivors = Vec::with_capacity(state.enemies.len());
    let mut fallen = Vec::new();

    for mut enemy in std::mem::take(&mut state.enemies) {
        let before = state.bullets.len();
        state.bullets.retain(|b| !b.collides_with(&enemy));
        let hits = (before - state.bullets.len()) as i32;
        enemy.hp -= hits * bullet_damage;

        move_enemy(&mut enemy, player_pos, field_w, field_h);

        if enemy.hp <= 0 {
            fallen.push(enemy);
        } else {
            survivors.push(enemy);
        }
    }

    state.enemies = survivors;
    for enemy in fallen {
        kill_enemy(state, enemy, config, rng);
    }
}

// ── Projectiles, pickups and effects ─────────────────────────────────────────

fn update_bullets(state: &mut GameState) {
    let field = Hitbox::new(Vec2::ZERO, state.width, state.height);
    for bullet in &mut state.bullets {
        bullet.pos += bullet.vel;
    }
    state.bullets.retain(|b| b.hitbox().intersects(&field));
}

/// Inverse-square homing toward the player's centre.
pub fn home_exp_particle(particle: &mut ExpParticle, player: &Player, pull: f32) {
    let distance = (player.pos - particle.pos).length();
    let step = if distance > 0.0 {
        (pull / distance).powi(2)
    } else {
        f32::INFINITY
    };
    let target = player.hitbox().center();
    particle.pos.x += approach(particle.pos.x, target.x, step);
    particle.pos.y += approach(particle.pos.y, target.y, step);
}

fn update_exp_particles(state: &mut GameState, config: &GameConfig) {
    for particle in &mut state.exp_particles {
        home_exp_particle(particle, &state.player, config.effects.exp_pull);
    }
    let before = state.exp_particles.len();
    let player = &state.player;
    state.exp_particles.retain(|p| !p.collides_with(player));
    state.player.exp += (before - state.exp_particles.len()) as u32;
}

fn collect_pickups(state: &mut GameState, config: &GameConfig) {
    let (taken, left): (Vec<Pickup>, Vec<Pickup>) = std::mem::take(&mut state.pickups)
        .into_iter()
        .partition(|p| p.collides_with(&state.player));
    state.pickups = left;
    for pickup in taken {
        debug!("picked up {:?}", pickup.kind);
        state.player = apply_pickup(&state.player, pickup.kind, state.clock_ms, config);
    }
}

fn update_explosions(state: &mut GameState, config: &GameConfig) {
    let now = state.clock_ms;
    for explosion in &mut state.explosions {
        if now.saturating_sub(explosion.created_ms) > explosion.hold_ms {
            explosion.alpha -= config.effects.explosion_fade;
        }
        for particle in &mut explosion.particles {
            particle.pos += particle.vel;
        }
    }
    state.explosions.retain(|e| e.alpha > 0.0);
}

fn update_texts(texts: &mut Vec<GameText>, now_ms: u64, config: &GameConfig) {
    let fx = &config.effects;
    for text in texts.iter_mut() {
        if text.duration_ms == 0 {
            continue;
        }
        let age = now_ms.saturating_sub(text.created_ms);
        if age >= text.duration_ms.saturating_sub(fx.text_fade_window_ms) {
            text.alpha = (text.alpha - fx.text_fade).max(0.0);
        }
    }
    texts.retain(|t| t.duration_ms == 0 || now_ms.saturating_sub(t.created_ms) < t.duration_ms);
}

fn run_spawner(state: &mut GameState, config: &GameConfig, rng: &mut impl Rng) {
    let alive = state.enemies.len();
    match state
        .spawner
        .update(state.clock_ms, alive, state.width, state.height, rng)
    {
        SpawnEvent::Spawned { kind, pos } => {
            debug!("spawned {:?} at ({:.0}, {:.0})", kind, pos.x, pos.y);
            state.enemies.push(new_enemy(kind, pos, config));
        }
        SpawnEvent::LevelAdvanced(level) => {
            if state.spawner.is_exhausted() {
                info!("all waves cleared");
            } else {
                info!("wave {level} begins");
            }
        }
        SpawnEvent::Idle => {}
    }
}

// ── Per-frame tick (nearly pure: RNG is injected) ──────────────────────────

/// Advance the simulation by one frame of `dt_ms` milliseconds.  All
/// randomness comes through `rng` so callers control determinism.
pub fn tick(
    state: &GameState,
    input: &InputState,
    config: &GameConfig,
    dt_ms: u64,
    rng: &mut impl Rng,
) -> GameState {
    let mut next = state.clone();
    next.frame += 1;
    next.clock_ms += dt_ms;

    if update_player(&mut next, input, config) {
        reset_after_death(&mut next, config);
    } else {
        update_enemies(&mut next, config, rng);
        update_bullets(&mut next);
        update_exp_particles(&mut next, config);
        collect_pickups(&mut next, config);
        update_explosions(&mut next, config);
    }

    let now = next.clock_ms;
    update_texts(&mut next.texts, now, config);
    run_spawner(&mut next, config, rng);
    next
}
