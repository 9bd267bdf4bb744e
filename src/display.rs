//! Rendering layer: all terminal I/O lives here.
//!
//! Each function receives a mutable writer and an immutable view of the
//! game state.  No game logic is performed; this module only translates
//! world-pixel state into terminal commands.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Attribute, Color, Print},
    terminal, QueueableCommand,
};
use glam::Vec2;
use survival_shooter::compute::rapidfire_remaining_ms;
use survival_shooter::config::TerminalConfig;
use survival_shooter::entities::{
    Bullet, Enemy, EnemyKind, ExpParticle, GameState, GameText, ParticleExplosion, Pickup,
    PickupKind, Player, Rgb,
};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD: Color = Color::White;
const C_HINT: Color = Color::DarkGrey;
const C_POWERUP_ACTIVE: Color = Color::Yellow;
const C_CLEARED: Color = Color::Green;

const RGB_PLAYER: Rgb = Rgb(0x00, 0x00, 0xff);
const RGB_PLAYER_HP: Rgb = Rgb(0x00, 0xff, 0x00);
const RGB_ENEMY_HP: Rgb = Rgb(0xff, 0x00, 0x00);
const RGB_EXP: Rgb = Rgb(0x62, 0xd0, 0xf3);
const RGB_BASIC: Rgb = Rgb(0xff, 0x00, 0xff);
const RGB_BOUNCING: Rgb = Rgb(0xff, 0x46, 0x21);
const RGB_BULLET: Rgb = Rgb(0xff, 0xff, 0x00);
const RGB_HEALTH: Rgb = Rgb(0x13, 0xec, 0x41);
const RGB_RAPIDFIRE: Rgb = Rgb(0xf2, 0xa3, 0x3a);

/// Ghost copies drawn behind a bouncing enemy.
const TRAIL_LENGTH: u32 = 5;

const HINT: &str = "W A S D : Move   ← ↑ → ↓ / Mouse : Shoot   Q : Quit";

/// The background is black, so alpha is just a scale toward zero.
fn fade(c: Rgb, alpha: f32) -> Color {
    let a = alpha.clamp(0.0, 1.0);
    let scale = |v: u8| (f32::from(v) * a).round() as u8;
    Color::Rgb {
        r: scale(c.0),
        g: scale(c.1),
        b: scale(c.2),
    }
}

fn solid(c: Rgb) -> Color {
    fade(c, 1.0)
}

// ── Viewport ──────────────────────────────────────────────────────────────────

/// Maps world pixels onto the play area: columns `1..cols-1`, rows
/// `2..rows-2` (row 0 is the HUD, row 1 and `rows-2` the border).
#[derive(Clone, Copy, Debug)]
pub struct Viewport {
    cols: u16,
    rows: u16,
    cell_w: f32,
    cell_h: f32,
}

impl Viewport {
    pub fn new(cols: u16, rows: u16, terminal: &TerminalConfig) -> Self {
        Self {
            cols,
            rows,
            cell_w: terminal.cell_width,
            cell_h: terminal.cell_height,
        }
    }

    fn col(&self, x: f32) -> i32 {
        1 + (x / self.cell_w).floor() as i32
    }

    fn row(&self, y: f32) -> i32 {
        2 + (y / self.cell_h).floor() as i32
    }

    fn col_limit(&self) -> i32 {
        i32::from(self.cols) - 1
    }

    fn row_limit(&self) -> i32 {
        i32::from(self.rows) - 2
    }

    /// World-space centre of a terminal cell, used for mouse aiming.
    pub fn cell_to_world(&self, col: u16, row: u16) -> Vec2 {
        Vec2::new(
            (f32::from(col) - 0.5) * self.cell_w,
            (f32::from(row) - 1.5) * self.cell_h,
        )
    }

    /// Cells `[c0, c1) x [r0, r1)` covered by a world rectangle, clipped to
    /// the play area.  Every visible object covers at least one cell.
    fn span(&self, pos: Vec2, w: f32, h: f32) -> Option<(u16, u16, u16, u16)> {
        let c0 = self.col(pos.x);
        let c1 = (1 + ((pos.x + w) / self.cell_w).ceil() as i32).max(c0 + 1);
        let r0 = self.row(pos.y);
        let r1 = (2 + ((pos.y + h) / self.cell_h).ceil() as i32).max(r0 + 1);

        let (c0, c1) = (c0.max(1), c1.min(self.col_limit()));
        let (r0, r1) = (r0.max(2), r1.min(self.row_limit()));
        if c0 >= c1 || r0 >= r1 {
            return None;
        }
        Some((c0 as u16, c1 as u16, r0 as u16, r1 as u16))
    }

    fn fill_rect<W: Write>(
        &self,
        out: &mut W,
        pos: Vec2,
        w: f32,
        h: f32,
        glyph: char,
        color: Color,
    ) -> std::io::Result<()> {
        let Some((c0, c1, r0, r1)) = self.span(pos, w, h) else {
            return Ok(());
        };
        let line: String = std::iter::repeat(glyph).take(usize::from(c1 - c0)).collect();
        out.queue(style::SetForegroundColor(color))?;
        for row in r0..r1 {
            out.queue(cursor::MoveTo(c0, row))?;
            out.queue(Print(&line))?;
        }
        Ok(())
    }

    /// Print `text` starting at a cell, trimmed to the play area.
    fn print_clipped<W: Write>(
        &self,
        out: &mut W,
        col: i32,
        row: i32,
        text: &str,
        max_chars: usize,
    ) -> std::io::Result<()> {
        if row < 2 || row >= self.row_limit() {
            return Ok(());
        }
        let skip = usize::try_from(1 - col).unwrap_or(0);
        let start = col.max(1);
        let room = usize::try_from(self.col_limit() - start).unwrap_or(0);
        let visible: String = text.chars().skip(skip).take(room.min(max_chars)).collect();
        if visible.is_empty() {
            return Ok(());
        }
        out.queue(cursor::MoveTo(start as u16, row as u16))?;
        out.queue(Print(visible))?;
        Ok(())
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(
    out: &mut W,
    state: &GameState,
    view: &Viewport,
    fps: u32,
) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_border(out, view)?;
    draw_hud(out, state, view, fps)?;

    for pickup in &state.pickups {
        draw_pickup(out, view, pickup)?;
    }
    for particle in &state.exp_particles {
        draw_exp_particle(out, view, particle)?;
    }
    for enemy in &state.enemies {
        draw_enemy(out, view, enemy)?;
    }
    for bullet in &state.bullets {
        draw_bullet(out, view, bullet)?;
    }
    for explosion in &state.explosions {
        draw_explosion(out, view, explosion)?;
    }

    draw_player(out, view, &state.player)?;

    for text in &state.texts {
        draw_text(out, view, text)?;
    }

    draw_controls_hint(out, view)?;

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, view.rows.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, view: &Viewport) -> std::io::Result<()> {
    let w = usize::from(view.cols);
    let h = view.rows;

    out.queue(style::SetForegroundColor(C_BORDER))?;

    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    out.queue(cursor::MoveTo(0, h.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    for row in 2..h.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(view.cols.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }

    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(
    out: &mut W,
    state: &GameState,
    view: &Viewport,
    fps: u32,
) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD))?;
    out.queue(Print(format!("FPS: {fps}")))?;

    if let Some(left) = rapidfire_remaining_ms(&state.player, state.clock_ms) {
        let tag = format!("[RAPIDFIRE {:>2}s]", left / 1000 + 1);
        let cx = (view.cols / 2).saturating_sub(tag.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(cx, 0))?;
        out.queue(style::SetForegroundColor(C_POWERUP_ACTIVE))?;
        out.queue(Print(tag))?;
    }

    let (level_str, color) = if state.spawner.is_exhausted() {
        ("All waves cleared".to_string(), C_CLEARED)
    } else {
        (
            format!(
                "Level: {}  Incoming: {}",
                state.spawner.level,
                state.spawner.remaining()
            ),
            C_HUD,
        )
    };
    let rx = view
        .cols
        .saturating_sub(level_str.chars().count() as u16 + 1);
    out.queue(cursor::MoveTo(rx, 0))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(level_str))?;

    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

/// Horizontal bar one cell above `top`, `width` world pixels long.
fn draw_bar<W: Write>(
    out: &mut W,
    view: &Viewport,
    x: f32,
    top: f32,
    width: f32,
    color: Rgb,
) -> std::io::Result<()> {
    if width <= 0.0 {
        return Ok(());
    }
    view.fill_rect(out, Vec2::new(x, top), width, 1.0, '▬', solid(color))
}

fn draw_player<W: Write>(out: &mut W, view: &Viewport, p: &Player) -> std::io::Result<()> {
    view.fill_rect(out, p.pos, p.width, p.height, '█', solid(RGB_PLAYER))?;

    let hp_width = p.width * p.hp as f32 / p.max_hp.max(1) as f32;
    let exp_width = p.width * p.exp as f32 / p.next_level_exp.max(1) as f32;
    draw_bar(out, view, p.pos.x, p.pos.y - 2.0 * view.cell_h, hp_width, RGB_PLAYER_HP)?;
    draw_bar(out, view, p.pos.x, p.pos.y - view.cell_h, exp_width, RGB_EXP)?;

    // Stats printed inside the body
    let body_cols = (p.width / view.cell_w).ceil().max(1.0) as usize;
    let body_rows = (p.height / view.cell_h).ceil().max(1.0) as usize;
    let lines = [
        format!("Lv. {}", p.level),
        format!("Dmg: {}", p.damage),
        format!("Spd: {}", p.speed),
        format!("Hp: {}/{}", p.hp, p.max_hp),
    ];
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(style::SetBackgroundColor(solid(RGB_PLAYER)))?;
    let col = view.col(p.pos.x);
    let row = view.row(p.pos.y);
    for (i, line) in lines.iter().enumerate().take(body_rows) {
        view.print_clipped(out, col, row + i as i32, line, body_cols)?;
    }
    out.queue(style::ResetColor)?;
    Ok(())
}

fn enemy_color(kind: EnemyKind) -> Rgb {
    match kind {
        EnemyKind::Basic => RGB_BASIC,
        EnemyKind::Bouncing | EnemyKind::BigBouncing => RGB_BOUNCING,
    }
}

fn draw_enemy<W: Write>(out: &mut W, view: &Viewport, enemy: &Enemy) -> std::io::Result<()> {
    let color = enemy_color(enemy.kind);

    if enemy.kind != EnemyKind::Basic {
        let mut alpha = 0.25;
        for i in 1..=TRAIL_LENGTH {
            let ghost = enemy.pos - enemy.vel * i as f32;
            view.fill_rect(out, ghost, enemy.width, enemy.height, '▓', fade(color, alpha))?;
            alpha -= 0.05;
        }
    }

    view.fill_rect(out, enemy.pos, enemy.width, enemy.height, '█', solid(color))?;

    let hp_width = enemy.width * enemy.hp.max(0) as f32 / enemy.max_hp.max(1) as f32;
    draw_bar(out, view, enemy.pos.x, enemy.pos.y - view.cell_h, hp_width, RGB_ENEMY_HP)
}

fn draw_bullet<W: Write>(out: &mut W, view: &Viewport, bullet: &Bullet) -> std::io::Result<()> {
    view.fill_rect(out, bullet.pos, bullet.size, bullet.size, '●', solid(RGB_BULLET))
}

fn draw_exp_particle<W: Write>(
    out: &mut W,
    view: &Viewport,
    particle: &ExpParticle,
) -> std::io::Result<()> {
    view.fill_rect(out, particle.pos, particle.size, particle.size, '◆', solid(RGB_EXP))
}

/// Pickups:
///   green  `+`  Health, restores hp
///   orange `!`  Rapidfire, shortens the shot cooldown
fn draw_pickup<W: Write>(out: &mut W, view: &Viewport, pickup: &Pickup) -> std::io::Result<()> {
    let (glyph, color) = match pickup.kind {
        PickupKind::Health => ('+', RGB_HEALTH),
        PickupKind::Rapidfire => ('!', RGB_RAPIDFIRE),
    };
    view.fill_rect(out, pickup.pos, pickup.size, pickup.size, glyph, solid(color))
}

fn draw_explosion<W: Write>(
    out: &mut W,
    view: &Viewport,
    explosion: &ParticleExplosion,
) -> std::io::Result<()> {
    for p in &explosion.particles {
        view.fill_rect(out, p.pos, p.size, p.size, '▪', fade(p.color, explosion.alpha))?;
    }
    Ok(())
}

fn draw_text<W: Write>(out: &mut W, view: &Viewport, text: &GameText) -> std::io::Result<()> {
    out.queue(style::SetAttribute(Attribute::Bold))?;
    out.queue(style::SetForegroundColor(fade(text.color, text.alpha)))?;
    view.print_clipped(
        out,
        view.col(text.pos.x),
        view.row(text.pos.y),
        &text.text,
        usize::MAX,
    )?;
    out.queue(style::SetAttribute(Attribute::Reset))?;
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, view: &Viewport) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, view.rows.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(HINT))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> Viewport {
        Viewport::new(42, 24, &TerminalConfig::default())
    }

    #[test]
    fn span_covers_whole_cells() {
        // 100x100 px at the origin with 10x20 cells → 10 cols, 5 rows
        assert_eq!(view().span(Vec2::ZERO, 100.0, 100.0), Some((1, 11, 2, 7)));
    }

    #[test]
    fn span_is_clipped_to_play_area() {
        let v = view();
        assert_eq!(v.span(Vec2::new(-50.0, -50.0), 100.0, 100.0), Some((1, 6, 2, 5)));
        assert_eq!(v.span(Vec2::new(5000.0, 0.0), 10.0, 10.0), None);
    }

    #[test]
    fn cell_to_world_inverts_cell_mapping() {
        let v = view();
        let p = v.cell_to_world(5, 7);
        assert_eq!(v.col(p.x), 5);
        assert_eq!(v.row(p.y), 7);
    }

    #[test]
    fn fade_scales_toward_black() {
        assert_eq!(fade(Rgb(200, 100, 0), 0.5), Color::Rgb { r: 100, g: 50, b: 0 });
        assert_eq!(fade(Rgb(200, 100, 0), -1.0), Color::Rgb { r: 0, g: 0, b: 0 });
    }
}
