/// Pure game-logic functions.
///
/// Every public function takes an immutable reference to the current
/// `GameState` (and, where needed, an RNG handle) and returns a brand-new
/// `GameState`.  Side effects are limited to the injected RNG and tracing.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info};

use crate::entities::{
    Bullet, Explosion, ExplosionSize, GameState, GameStatus, Mob, Player, PowerUp, PowerUpKind,
    Star, StarTier, METEORS,
};
use crate::geometry::{circles_collide, Rect};
use crate::Result;
use crate::settings::{
    Settings, BULLET_HEIGHT, BULLET_SPEED, BULLET_WIDTH, EXPLOSION_FRAMES, EXPLOSION_FRAME_MS,
    MOB_ROTATE_MS, PLAYER_HEIGHT, PLAYER_RADIUS, PLAYER_WIDTH, POWER_UP_SIZE, POWER_UP_SPEED,
    SHIELD_BONUS_MAX, SHIELD_BONUS_MIN, SHOT_DELAY_BONUS,
};

// ── Bounds ───────────────────────────────────────────────────────────────────

/// A mob further than this below the bottom edge is recycled.
const MOB_BOTTOM_MARGIN: f32 = 10.0;
const MOB_LEFT_MARGIN: f32 = 25.0;
const MOB_RIGHT_MARGIN: f32 = 20.0;

// ── Constructors ─────────────────────────────────────────────────────────────

/// Build the initial game state: a fresh ship, a full wave of mobs and the
/// starfield.  Settings are validated first, so a degenerate world is an
/// error rather than a panic in the spawners.
pub fn init_state(settings: Settings, rng: &mut impl Rng) -> Result<GameState> {
    settings.validate()?;
    let player = new_player(&settings, 0);
    let mobs = (0..settings.mob_count)
        .map(|_| spawn_mob(&settings, 0, rng))
        .collect();
    let stars = init_starfield(&settings, rng);

    info!(
        mobs = settings.mob_count,
        lives = settings.lives,
        "new game"
    );

    Ok(GameState {
        player,
        mobs,
        bullets: Vec::new(),
        power_ups: Vec::new(),
        explosions: Vec::new(),
        stars,
        score: 0,
        status: GameStatus::Playing,
        frame: 0,
        now_ms: 0,
        settings,
    })
}

/// Ship resting bottom-centre with full shield and the initial weapon.
pub fn new_player(settings: &Settings, now_ms: u64) -> Player {
    Player {
        rect: spawn_rect(settings),
        radius: PLAYER_RADIUS,
        shield: settings.shield_max,
        shot_delay: settings.shot_delay_init,
        last_shot_ms: now_ms,
        power_level: 1,
        power_timer_ms: now_ms,
        lives: settings.lives,
        hidden: false,
        hide_timer_ms: now_ms,
    }
}

fn spawn_rect(settings: &Settings) -> Rect {
    Rect::from_midbottom(
        settings.width / 2.0,
        settings.height,
        PLAYER_WIDTH,
        PLAYER_HEIGHT,
    )
}

/// A new mob just above the top edge with a random meteor and velocity.
pub fn spawn_mob(settings: &Settings, now_ms: u64, rng: &mut impl Rng) -> Mob {
    let (meteor, w, h) = METEORS[rng.gen_range(0..METEORS.len())];
    let x = random_x(settings.width, w, rng);
    let y = random_entry_y(rng);
    Mob {
        rect: Rect::new(x, y, w, h),
        speed_x: rng.gen_range(-3..3) as f32,
        speed_y: random_fall_speed(rng),
        rotation: 0,
        rot_speed: rng.gen_range(-8..8),
        last_rotate_ms: now_ms,
        radius: (w * 0.85 / 2.0) as u32,
        meteor,
    }
}

fn random_x(world_width: f32, sprite_width: f32, rng: &mut impl Rng) -> f32 {
    let span = (world_width - sprite_width).floor() as i32;
    if span > 0 {
        rng.gen_range(0..span) as f32
    } else {
        0.0
    }
}

fn random_entry_y(rng: &mut impl Rng) -> f32 {
    rng.gen_range(-100..-40) as f32
}

fn random_fall_speed(rng: &mut impl Rng) -> f32 {
    rng.gen_range(1..8) as f32
}

pub fn spawn_power_up(center: (f32, f32), rng: &mut impl Rng) -> PowerUp {
    let kind = PowerUpKind::ALL[rng.gen_range(0..PowerUpKind::ALL.len())];
    PowerUp {
        rect: Rect::from_center(center.0, center.1, POWER_UP_SIZE, POWER_UP_SIZE),
        speed_y: POWER_UP_SPEED,
        kind,
    }
}

pub fn new_explosion(center: (f32, f32), size: ExplosionSize, now_ms: u64) -> Explosion {
    Explosion {
        center,
        size,
        frame: 0,
        last_update_ms: now_ms,
    }
}

/// Scatter `star_count` stars over the world, split into the three tiers and
/// shuffled so the tiers interleave when drawn.
pub fn init_starfield(settings: &Settings, rng: &mut impl Rng) -> Vec<Star> {
    let mut stars = Vec::with_capacity(settings.star_count);
    for tier in StarTier::ALL {
        let count = (settings.star_count as f64 * tier.share()) as usize;
        for _ in 0..count {
            stars.push(Star {
                x: rng.gen_range(0.0..settings.width),
                y: rng.gen_range(0.0..settings.height),
                tier,
            });
        }
    }
    stars.shuffle(rng);
    stars
}

// ── Input-driven state transitions (pure) ───────────────────────────────────

pub fn move_player_left(state: &GameState) -> GameState {
    move_player(state, -state.settings.player_speed)
}

pub fn move_player_right(state: &GameState) -> GameState {
    move_player(state, state.settings.player_speed)
}

fn move_player(state: &GameState, dx: f32) -> GameState {
    if state.player.hidden || state.status != GameStatus::Playing {
        return state.clone();
    }
    let mut rect = state.player.rect.translated(dx, 0.0);
    if rect.left() < 0.0 {
        rect.x = 0.0;
    } else if rect.right() > state.settings.width {
        rect.x = state.settings.width - rect.w;
    }
    GameState {
        player: Player {
            rect,
            ..state.player.clone()
        },
        ..state.clone()
    }
}

/// True when the ship is allowed to fire right now: the shot delay has
/// elapsed, or no bullet is left on screen.
pub fn can_shoot(state: &GameState) -> bool {
    let p = &state.player;
    if p.hidden || state.status != GameStatus::Playing {
        return false;
    }
    state.now_ms.saturating_sub(p.last_shot_ms) > p.shot_delay || state.bullets.is_empty()
}

/// Fire according to the current power level.  Level 1 shoots one bullet
/// from the nose; level 2 and above shoot two from the wing tips.
pub fn player_shoot(state: &GameState) -> GameState {
    if !can_shoot(state) {
        return state.clone();
    }
    let p = &state.player;
    let mut bullets = state.bullets.clone();
    if p.power_level >= 2 {
        bullets.push(new_bullet(p.rect.left(), p.rect.centery()));
        bullets.push(new_bullet(p.rect.right(), p.rect.centery()));
    } else {
        bullets.push(new_bullet(p.rect.centerx(), p.rect.top()));
    }
    debug!(power_level = p.power_level, at = state.now_ms, "shot fired");

    GameState {
        player: Player {
            last_shot_ms: state.now_ms,
            ..p.clone()
        },
        bullets,
        ..state.clone()
    }
}

fn new_bullet(centerx: f32, bottom: f32) -> Bullet {
    Bullet {
        rect: Rect::from_midbottom(centerx, bottom, BULLET_WIDTH, BULLET_HEIGHT),
        speed_y: BULLET_SPEED,
    }
}

// ── Per-frame tick (nearly pure — RNG is injected) ──────────────────────────

/// Advance the simulation by one frame.  All randomness comes through `rng`
/// so callers control determinism (useful for tests with a seeded RNG).
pub fn tick(state: &GameState, rng: &mut impl Rng) -> GameState {
    if state.status == GameStatus::GameOver {
        return state.clone();
    }
    let settings = &state.settings;
    let frame = state.frame + 1;
    let now = state.now_ms + settings.frame_ms();

    // ── 1. Player timers ─────────────────────────────────────────────────────
    let player = update_player(&state.player, settings, now);

    // ── 2. Move bullets, drop the ones past the top ──────────────────────────
    let bullets: Vec<Bullet> = state
        .bullets
        .iter()
        .map(|b| Bullet {
            rect: b.rect.translated(0.0, b.speed_y),
            ..b.clone()
        })
        .filter(|b| b.rect.bottom() >= 0.0)
        .collect();

    // ── 3. Move mobs, recycling the ones that left the field ─────────────────
    let mobs: Vec<Mob> = state
        .mobs
        .iter()
        .map(|m| update_mob(m, settings, now, rng))
        .collect();

    // ── 4. Power-ups fall until they pass the bottom ─────────────────────────
    let power_ups: Vec<PowerUp> = state
        .power_ups
        .iter()
        .map(|p| PowerUp {
            rect: p.rect.translated(0.0, p.speed_y),
            ..p.clone()
        })
        .filter(|p| p.rect.top() <= settings.height)
        .collect();

    // ── 5. Explosion animations ──────────────────────────────────────────────
    let explosions: Vec<Explosion> = state
        .explosions
        .iter()
        .filter_map(|e| advance_explosion(e, now))
        .collect();

    // ── 6. Background ────────────────────────────────────────────────────────
    let stars = update_stars(&state.stars, settings, rng);

    let moved = GameState {
        player,
        mobs,
        bullets,
        power_ups,
        explosions,
        stars,
        frame,
        now_ms: now,
        ..state.clone()
    };

    // ── 7. Collisions ────────────────────────────────────────────────────────
    let after_lasers = laser_with_mobs(&moved, rng);
    let after_pickups = player_with_power_ups(&after_lasers, rng);
    let resolved = player_with_mobs(&after_pickups, rng);

    // ── 8. Game over once the last ship explosion has played out ────────────
    let ship_exploding = resolved
        .explosions
        .iter()
        .any(|e| e.size == ExplosionSize::Player);
    if resolved.player.lives == 0 && !ship_exploding {
        info!(score = resolved.score, frame, "game over");
        return GameState {
            status: GameStatus::GameOver,
            ..resolved
        };
    }
    resolved
}

/// Power-level decay and respawn of a hidden ship.
pub fn update_player(player: &Player, settings: &Settings, now_ms: u64) -> Player {
    let mut p = player.clone();

    if p.power_level > 1 && now_ms.saturating_sub(p.power_timer_ms) > settings.power_level_time_ms
    {
        p.power_level -= 1;
        p.power_timer_ms = now_ms;
        debug!(power_level = p.power_level, "power level decayed");
    }

    if p.hidden && p.lives > 0 && now_ms.saturating_sub(p.hide_timer_ms) > settings.respawn_time_ms
    {
        p.hidden = false;
        p.rect = spawn_rect(settings);
        info!(lives = p.lives, "ship respawned");
    }

    p
}

pub fn update_mob(mob: &Mob, settings: &Settings, now_ms: u64, rng: &mut impl Rng) -> Mob {
    let mut m = mob.clone();

    if now_ms.saturating_sub(m.last_rotate_ms) > MOB_ROTATE_MS {
        m.last_rotate_ms = now_ms;
        m.rotation = (m.rotation + m.rot_speed).rem_euclid(360);
    }

    m.rect = m.rect.translated(m.speed_x, m.speed_y);

    let out_of_bounds = m.rect.top() > settings.height + MOB_BOTTOM_MARGIN
        || m.rect.left() < -MOB_LEFT_MARGIN
        || m.rect.right() > settings.width + MOB_RIGHT_MARGIN;
    if out_of_bounds {
        // Horizontal drift is kept on purpose.
        m.rect.x = random_x(settings.width, m.rect.w, rng);
        m.rect.y = random_entry_y(rng);
        m.speed_y = random_fall_speed(rng);
    }

    m
}

/// Step the animation when its frame time has elapsed.  Returns `None` once
/// the last frame has been shown.
pub fn advance_explosion(explosion: &Explosion, now_ms: u64) -> Option<Explosion> {
    if now_ms.saturating_sub(explosion.last_update_ms) <= EXPLOSION_FRAME_MS {
        return Some(explosion.clone());
    }
    let frame = explosion.frame + 1;
    if frame >= EXPLOSION_FRAMES {
        None
    } else {
        Some(Explosion {
            frame,
            last_update_ms: now_ms,
            ..explosion.clone()
        })
    }
}

pub fn update_stars(stars: &[Star], settings: &Settings, rng: &mut impl Rng) -> Vec<Star> {
    stars
        .iter()
        .map(|s| {
            let y = s.y + s.tier.speed();
            if y > settings.height {
                Star {
                    x: rng.gen_range(0.0..settings.width),
                    y: 0.0,
                    tier: s.tier,
                }
            } else {
                Star { y, ..s.clone() }
            }
        })
        .collect()
}

// ── Collision resolution ─────────────────────────────────────────────────────

/// Bullets × mobs.  Mobs are resolved in order; a mob dies together with
/// every live bullet touching it, and a spent bullet cannot hit a later mob; the mob's radius is added to the score, a large
/// explosion is spawned, a replacement mob enters and a power-up may drop.
pub fn laser_with_mobs(state: &GameState, rng: &mut impl Rng) -> GameState {
    let settings = &state.settings;
    let mut spent = vec![false; state.bullets.len()];
    let mut mobs = Vec::with_capacity(state.mobs.len());
    let mut explosions = state.explosions.clone();
    let mut power_ups = state.power_ups.clone();
    let mut score = state.score;

    for mob in &state.mobs {
        let mut hit = false;
        for (bi, bullet) in state.bullets.iter().enumerate() {
            if !spent[bi] && mob.rect.overlaps(&bullet.rect) {
                spent[bi] = true;
                hit = true;
            }
        }
        if !hit {
            mobs.push(mob.clone());
            continue;
        }

        score = score.saturating_add(mob.radius);
        let center = mob.rect.center();
        explosions.push(new_explosion(center, ExplosionSize::Large, state.now_ms));
        mobs.push(spawn_mob(settings, state.now_ms, rng));
        debug!(radius = mob.radius, score, "mob shot down");

        if rng.gen::<f64>() > settings.bonus_odd {
            let bonus = spawn_power_up(center, rng);
            debug!(kind = ?bonus.kind, "power-up dropped");
            power_ups.push(bonus);
        }
    }

    let bullets: Vec<Bullet> = state
        .bullets
        .iter()
        .zip(&spent)
        .filter(|(_, used)| !**used)
        .map(|(b, _)| b.clone())
        .collect();

    GameState {
        mobs,
        bullets,
        explosions,
        power_ups,
        score,
        ..state.clone()
    }
}

/// Player × power-ups.  Touched power-ups are consumed and applied in order.
pub fn player_with_power_ups(state: &GameState, rng: &mut impl Rng) -> GameState {
    if state.player.hidden {
        return state.clone();
    }
    let mut player = state.player.clone();
    let mut power_ups = Vec::with_capacity(state.power_ups.len());

    for bonus in &state.power_ups {
        if player.rect.overlaps(&bonus.rect) {
            player = apply_power_up(&player, bonus.kind, &state.settings, state.now_ms, rng);
            debug!(kind = ?bonus.kind, "power-up collected");
        } else {
            power_ups.push(bonus.clone());
        }
    }

    GameState {
        player,
        power_ups,
        ..state.clone()
    }
}

/// Effect of a single pickup on the ship.
pub fn apply_power_up(
    player: &Player,
    kind: PowerUpKind,
    settings: &Settings,
    now_ms: u64,
    rng: &mut impl Rng,
) -> Player {
    match kind {
        PowerUpKind::Shield => {
            let bonus = rng.gen_range(SHIELD_BONUS_MIN..SHIELD_BONUS_MAX);
            Player {
                shield: (player.shield + bonus).min(settings.shield_max),
                ..player.clone()
            }
        }
        PowerUpKind::SilverBolt => Player {
            shot_delay: player
                .shot_delay
                .saturating_sub(SHOT_DELAY_BONUS)
                .max(settings.shot_delay_min),
            ..player.clone()
        },
        PowerUpKind::GoldBolt => Player {
            power_level: player.power_level + 1,
            power_timer_ms: now_ms,
            ..player.clone()
        },
    }
}

/// Player × mobs, using the circle test.  Each rammed mob is replaced; its
/// doubled radius comes off the shield.  A drained shield costs a life and
/// hides the ship until the respawn delay has passed.
pub fn player_with_mobs(state: &GameState, rng: &mut impl Rng) -> GameState {
    if state.player.hidden {
        return state.clone();
    }
    let settings = &state.settings;
    let now = state.now_ms;
    let ship_center = state.player.rect.center();
    let mut player = state.player.clone();
    let mut mobs = Vec::with_capacity(state.mobs.len());
    let mut explosions = state.explosions.clone();

    for mob in &state.mobs {
        if !circles_collide(ship_center, player.radius, mob.rect.center(), mob.radius as f32) {
            mobs.push(mob.clone());
            continue;
        }
        mobs.push(spawn_mob(settings, now, rng));

        // Further hits in the same pass land on a ship that is already gone.
        if player.hidden {
            explosions.push(new_explosion(mob.rect.center(), ExplosionSize::Small, now));
            continue;
        }

        player.shield -= 2 * mob.radius as i32;
        if player.shield <= 0 {
            explosions.push(new_explosion(ship_center, ExplosionSize::Player, now));
            player = destroy_ship(&player, settings, now);
            info!(lives = player.lives, "ship destroyed");
        } else {
            explosions.push(new_explosion(
                mob.rect.center(),
                ExplosionSize::Small,
                now,
            ));
            debug!(shield = player.shield, radius = mob.radius, "ship rammed");
        }
    }

    GameState {
        player,
        mobs,
        explosions,
        ..state.clone()
    }
}

/// Lose a life and reset the ship's equipment; the ship stays hidden until
/// `update_player` brings it back.
pub fn destroy_ship(player: &Player, settings: &Settings, now_ms: u64) -> Player {
    Player {
        lives: player.lives.saturating_sub(1),
        shield: settings.shield_max,
        power_level: 1,
        power_timer_ms: now_ms,
        shot_delay: settings.shot_delay_init,
        hidden: true,
        hide_timer_ms: now_ms,
        ..player.clone()
    }
}
