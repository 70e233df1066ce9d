/// Rendering layer — all terminal I/O lives here.
///
/// Each function receives a mutable writer and an immutable view of the
/// game state.  No game logic is performed; this module only translates
/// world coordinates into terminal cells and state into terminal commands.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use spacex_shooter::entities::{
    Bullet, Explosion, ExplosionSize, GameState, GameStatus, MeteorSize, Mob, PowerUp,
    PowerUpKind, Star, StarTier,
};
use spacex_shooter::geometry::Rect;
use spacex_shooter::settings::Settings;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_SCORE: Color = Color::White;
const C_HUD_LIVES: Color = Color::Red;
const C_HUD_POWER: Color = Color::Yellow;
const C_SHIELD_OK: Color = Color::Green;
const C_SHIELD_LOW: Color = Color::Red;
const C_PLAYER: Color = Color::Cyan;
const C_BULLET: Color = Color::Red;
const C_HINT: Color = Color::DarkGrey;

pub const HINT: &str = "← → / A D : Move   SPACE : Shoot   Q : Quit";

/// Width of the shield gauge in cells.
const SHIELD_BAR: usize = 10;

/// Glyph shown at a meteor's centre, cycling with its rotation.
const SPIN: [char; 4] = ['|', '/', '─', '\\'];

/// One glyph per explosion animation frame.
const BLAST: [char; 8] = ['·', '*', '✶', '✷', '✸', '✹', '+', '.'];

// ── World → terminal mapping ──────────────────────────────────────────────────

/// Maps the continuous world onto the play area inside the border:
/// columns `1..cols-1`, rows `2..rows-2`.
#[derive(Clone, Copy, Debug)]
pub struct Viewport {
    pub cols: u16,
    pub rows: u16,
    world_w: f32,
    world_h: f32,
}

impl Viewport {
    pub fn new(cols: u16, rows: u16, settings: &Settings) -> Self {
        Self {
            cols,
            rows,
            world_w: settings.width,
            world_h: settings.height,
        }
    }

    fn inner_cols(&self) -> u16 {
        self.cols.saturating_sub(2).max(1)
    }

    fn inner_rows(&self) -> u16 {
        self.rows.saturating_sub(4).max(1)
    }

    fn col_of(&self, x: f32) -> u16 {
        let n = self.inner_cols();
        let c = (x / self.world_w * f32::from(n)).floor().clamp(0.0, f32::from(n - 1));
        1 + c as u16
    }

    fn row_of(&self, y: f32) -> u16 {
        let n = self.inner_rows();
        let r = (y / self.world_h * f32::from(n)).floor().clamp(0.0, f32::from(n - 1));
        2 + r as u16
    }

    /// Cell holding a world point, if the point is inside the world.
    pub fn cell(&self, x: f32, y: f32) -> Option<(u16, u16)> {
        if x < 0.0 || y < 0.0 || x >= self.world_w || y >= self.world_h {
            return None;
        }
        Some((self.col_of(x), self.row_of(y)))
    }

    /// Inclusive cell range `(col0, row0, col1, row1)` covered by the visible
    /// part of a rectangle.
    pub fn span(&self, rect: &Rect) -> Option<(u16, u16, u16, u16)> {
        let left = rect.left().max(0.0);
        let top = rect.top().max(0.0);
        let right = rect.right().min(self.world_w);
        let bottom = rect.bottom().min(self.world_h);
        if left >= right || top >= bottom {
            return None;
        }
        // Nudge the far edges inward so an edge exactly on a cell boundary
        // does not spill into the next cell.
        let eps = 1e-3;
        Some((
            self.col_of(left),
            self.row_of(top),
            self.col_of((right - eps).max(left)),
            self.row_of((bottom - eps).max(top)),
        ))
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(
    out: &mut W,
    state: &GameState,
    view: &Viewport,
    best: u32,
) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_border(out, view)?;

    for star in &state.stars {
        draw_star(out, star, view)?;
    }
    for mob in &state.mobs {
        draw_mob(out, mob, view)?;
    }
    for bonus in &state.power_ups {
        draw_power_up(out, bonus, view)?;
    }
    for bullet in &state.bullets {
        draw_bullet(out, bullet, view)?;
    }
    if !state.player.hidden {
        draw_player(out, state, view)?;
    }
    for explosion in &state.explosions {
        draw_explosion(out, explosion, view)?;
    }

    draw_hud(out, state, view)?;
    draw_controls_hint(out, view)?;

    if state.player.hidden && state.player.lives > 0 {
        draw_respawn_notice(out, state, view)?;
    }
    if state.status == GameStatus::GameOver {
        draw_game_over(out, state, view, best)?;
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, view.rows.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, view: &Viewport) -> std::io::Result<()> {
    let w = view.cols as usize;
    let h = view.rows;

    out.queue(style::SetForegroundColor(C_BORDER))?;

    // Row 1 — top bar
    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    // Row h-2 — bottom bar
    out.queue(cursor::MoveTo(0, h.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    // Side walls
    for row in 2..h.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(view.cols.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }

    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn shield_gauge(shield: i32, max: i32) -> String {
    let filled = if max > 0 {
        (shield.clamp(0, max) as usize * SHIELD_BAR + max as usize - 1) / max as usize
    } else {
        0
    };
    format!("[{}{}]", "█".repeat(filled), "░".repeat(SHIELD_BAR - filled))
}

fn draw_hud<W: Write>(out: &mut W, state: &GameState, view: &Viewport) -> std::io::Result<()> {
    let p = &state.player;

    // Shield gauge — left
    out.queue(cursor::MoveTo(1, 0))?;
    let low = p.shield * 4 < state.settings.shield_max;
    out.queue(style::SetForegroundColor(if low { C_SHIELD_LOW } else { C_SHIELD_OK }))?;
    out.queue(Print(shield_gauge(p.shield, state.settings.shield_max)))?;

    // Score — centre
    let score_str = format!("Score = {}", state.score);
    let sx = (view.cols / 2).saturating_sub(score_str.len() as u16 / 2);
    out.queue(cursor::MoveTo(sx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(&score_str))?;

    // Weapon state + lives — right side, right-aligned
    let power_tag = format!("PWR {} {:>3}ms ", p.power_level, p.shot_delay);
    let lives_str = "▲".repeat(p.lives as usize);
    let width = power_tag.chars().count() + lives_str.chars().count();
    let rx = view.cols.saturating_sub(width as u16 + 1);
    out.queue(cursor::MoveTo(rx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_POWER))?;
    out.queue(Print(&power_tag))?;
    out.queue(style::SetForegroundColor(C_HUD_LIVES))?;
    out.queue(Print(&lives_str))?;

    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn draw_star<W: Write>(out: &mut W, star: &Star, view: &Viewport) -> std::io::Result<()> {
    let Some((col, row)) = view.cell(star.x, star.y) else {
        return Ok(());
    };
    let (glyph, color) = match star.tier {
        StarTier::Small => (".", Color::DarkGrey),
        StarTier::Medium => ("·", Color::Grey),
        StarTier::Big => ("*", Color::White),
    };
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(glyph))?;
    Ok(())
}

fn draw_player<W: Write>(out: &mut W, state: &GameState, view: &Viewport) -> std::io::Result<()> {
    // Sprite (2 rows, 3 cols):
    //   ▲       ← nose
    //  /█\      ← fuselage + wings, resting on the ship's bottom edge
    let p = &state.player;
    let Some((col, row)) = view.cell(p.rect.centerx(), (p.rect.bottom() - 1.0).max(0.0)) else {
        return Ok(());
    };
    out.queue(style::SetForegroundColor(C_PLAYER))?;

    out.queue(cursor::MoveTo(col.saturating_sub(1).max(1), row))?;
    out.queue(Print("/█\\"))?;

    if row > 2 {
        out.queue(cursor::MoveTo(col, row - 1))?;
        out.queue(Print("▲"))?;
    }
    Ok(())
}

fn draw_mob<W: Write>(out: &mut W, mob: &Mob, view: &Viewport) -> std::io::Result<()> {
    let Some((c0, r0, c1, r1)) = view.span(&mob.rect) else {
        return Ok(());
    };
    let (body, color) = match mob.meteor {
        MeteorSize::Big => ('▓', Color::DarkYellow),
        MeteorSize::Medium => ('▒', Color::DarkYellow),
        MeteorSize::Small => ('░', Color::Grey),
        MeteorSize::Tiny => ('•', Color::Grey),
    };
    out.queue(style::SetForegroundColor(color))?;
    let line: String = std::iter::repeat(body).take((c1 - c0 + 1) as usize).collect();
    for row in r0..=r1 {
        out.queue(cursor::MoveTo(c0, row))?;
        out.queue(Print(&line))?;
    }

    // Spinning core on anything wider than one cell
    if c1 > c0 {
        let spin = SPIN[(mob.rotation / 45) as usize % SPIN.len()];
        out.queue(cursor::MoveTo((c0 + c1) / 2, (r0 + r1) / 2))?;
        out.queue(style::SetForegroundColor(Color::Yellow))?;
        out.queue(Print(spin))?;
    }
    Ok(())
}

fn draw_bullet<W: Write>(out: &mut W, bullet: &Bullet, view: &Viewport) -> std::io::Result<()> {
    let Some((c0, r0, _, r1)) = view.span(&bullet.rect) else {
        return Ok(());
    };
    out.queue(style::SetForegroundColor(C_BULLET))?;
    for row in r0..=r1 {
        out.queue(cursor::MoveTo(c0, row))?;
        out.queue(Print("║"))?;
    }
    Ok(())
}

/// Draw a falling power-up.
///
/// Symbols:
///   ♦  (green)  — Shield:     restores part of the shield
///   ↯  (white)  — SilverBolt: shorter delay between shots
///   ↯  (yellow) — GoldBolt:   twin cannons for a while
fn draw_power_up<W: Write>(out: &mut W, bonus: &PowerUp, view: &Viewport) -> std::io::Result<()> {
    let (x, y) = bonus.rect.center();
    let Some((col, row)) = view.cell(x, y) else {
        return Ok(());
    };
    let (glyph, color) = power_up_symbol(bonus.kind);
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(glyph))?;
    Ok(())
}

pub fn power_up_symbol(kind: PowerUpKind) -> (&'static str, Color) {
    match kind {
        PowerUpKind::Shield => ("♦", Color::Green),
        PowerUpKind::SilverBolt => ("↯", Color::White),
        PowerUpKind::GoldBolt => ("↯", Color::Yellow),
    }
}

fn draw_explosion<W: Write>(
    out: &mut W,
    explosion: &Explosion,
    view: &Viewport,
) -> std::io::Result<()> {
    // The blast grows over the first half of the animation, then holds.
    let extent = explosion.size.extent();
    let growth = ((explosion.frame + 1) as f32 / 4.0).min(1.0);
    let (cx, cy) = explosion.center;
    let rect = Rect::from_center(cx, cy, extent * growth, extent * growth);
    let Some((c0, r0, c1, r1)) = view.span(&rect) else {
        return Ok(());
    };
    let color = match explosion.size {
        ExplosionSize::Small => Color::Yellow,
        ExplosionSize::Large => Color::DarkYellow,
        ExplosionSize::Player => Color::Magenta,
    };
    let glyph = BLAST[explosion.frame as usize % BLAST.len()];
    let line: String = std::iter::repeat(glyph).take((c1 - c0 + 1) as usize).collect();
    out.queue(style::SetForegroundColor(color))?;
    for row in r0..=r1 {
        out.queue(cursor::MoveTo(c0, row))?;
        out.queue(Print(&line))?;
    }
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, view: &Viewport) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, view.rows.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(HINT))?;
    Ok(())
}

// ── Overlays ──────────────────────────────────────────────────────────────────

fn draw_centered<W: Write>(
    out: &mut W,
    view: &Viewport,
    row: u16,
    text: &str,
    color: Color,
) -> std::io::Result<()> {
    let col = (view.cols / 2).saturating_sub(text.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(text))?;
    Ok(())
}

fn draw_respawn_notice<W: Write>(
    out: &mut W,
    state: &GameState,
    view: &Viewport,
) -> std::io::Result<()> {
    let hidden_for = state.now_ms.saturating_sub(state.player.hide_timer_ms);
    let left_ms = state.settings.respawn_time_ms.saturating_sub(hidden_for);
    let notice = format!("Ship lost! Back in {}…", left_ms / 1000 + 1);
    draw_centered(out, view, view.rows / 2, &notice, Color::White)
}

fn draw_game_over<W: Write>(
    out: &mut W,
    state: &GameState,
    view: &Viewport,
    best: u32,
) -> std::io::Result<()> {
    let new_best = state.score >= best && state.score > 0;
    let score_line = format!("Final Score: {:>6}", state.score);
    let best_line = if new_best {
        format!("★ NEW BEST: {:>6} ★", state.score)
    } else {
        format!("Best Score:  {:>6}", best.max(state.score))
    };

    let start_row = (view.rows / 2).saturating_sub(3);
    draw_centered(out, view, start_row, "╔════════════════════╗", Color::Red)?;
    draw_centered(out, view, start_row + 1, "║    GAME  OVER      ║", Color::Red)?;
    draw_centered(out, view, start_row + 2, "╚════════════════════╝", Color::Red)?;
    draw_centered(out, view, start_row + 3, &score_line, Color::Yellow)?;
    draw_centered(
        out,
        view,
        start_row + 4,
        &best_line,
        if new_best { Color::Yellow } else { Color::DarkGrey },
    )?;
    draw_centered(out, view, start_row + 5, "R - Play Again  Q - Quit", Color::White)?;
    Ok(())
}

/// Title screen shown between games.
pub fn render_title<W: Write>(out: &mut W, view: &Viewport, best: u32) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let cy = view.rows / 2;
    draw_centered(out, view, cy.saturating_sub(6), "★  S P A C E X  ★", Color::Cyan)?;
    if best > 0 {
        draw_centered(
            out,
            view,
            cy.saturating_sub(5),
            &format!("Best Score: {}", best),
            Color::Yellow,
        )?;
    }
    draw_centered(
        out,
        view,
        cy.saturating_sub(3),
        "Shoot the meteors, dodge the rest.",
        Color::White,
    )?;
    draw_centered(
        out,
        view,
        cy.saturating_sub(2),
        "Big rocks score more but hit harder.",
        Color::DarkGrey,
    )?;

    // Power-up legend
    let lx = (view.cols / 2).saturating_sub(16);
    out.queue(cursor::MoveTo(lx, cy))?;
    out.queue(style::SetForegroundColor(Color::DarkGrey))?;
    out.queue(Print("Power-ups (catch falling items):"))?;
    let legend: [(PowerUpKind, &str); 3] = [
        (PowerUpKind::Shield, " Shield     — repairs the shield"),
        (PowerUpKind::SilverBolt, " SilverBolt — faster fire"),
        (PowerUpKind::GoldBolt, " GoldBolt   — twin cannons"),
    ];
    for (i, (kind, desc)) in legend.iter().enumerate() {
        let (glyph, color) = power_up_symbol(*kind);
        out.queue(cursor::MoveTo(lx, cy + 1 + i as u16))?;
        out.queue(style::SetForegroundColor(color))?;
        out.queue(Print(glyph))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(*desc))?;
    }

    draw_centered(out, view, cy + 5, "SPACE : Start   Q : Quit", Color::White)?;
    draw_centered(out, view, cy + 6, HINT, C_HINT)?;

    out.queue(style::ResetColor)?;
    out.flush()?;
    Ok(())
}
