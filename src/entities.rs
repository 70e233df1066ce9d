/// All game entity types — pure data, no logic.

use crate::geometry::Rect;
use crate::settings::Settings;

#[derive(Clone, Debug, PartialEq)]
pub enum GameStatus {
    Playing,
    GameOver,
}

// ── Power-ups ─────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PowerUpKind {
    /// Restores part of the shield, capped at the maximum.
    Shield,
    /// Weak weapon upgrade: shortens the shot delay down to a floor.
    SilverBolt,
    /// Strong weapon upgrade: one extra power level for a limited time.
    GoldBolt,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 3] = [
        PowerUpKind::Shield,
        PowerUpKind::SilverBolt,
        PowerUpKind::GoldBolt,
    ];
}

#[derive(Clone, Debug)]
pub struct PowerUp {
    pub rect: Rect,
    pub speed_y: f32,
    pub kind: PowerUpKind,
}

// ── Projectiles ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Bullet {
    pub rect: Rect,
    pub speed_y: f32,
}

// ── Explosions ────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExplosionSize {
    /// Mob destroyed by ramming the ship.
    Small,
    /// Mob destroyed by a bullet.
    Large,
    /// The ship itself.
    Player,
}

impl ExplosionSize {
    /// Diameter in world units.
    pub fn extent(self) -> f32 {
        match self {
            ExplosionSize::Small => 32.0,
            ExplosionSize::Large => 75.0,
            ExplosionSize::Player => 100.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Explosion {
    pub center: (f32, f32),
    pub size: ExplosionSize,
    /// Current animation frame, starting at 0.
    pub frame: u32,
    /// Clock time of the last frame change.
    pub last_update_ms: u64,
}

// ── Mobs ──────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MeteorSize {
    Big,
    Medium,
    Small,
    Tiny,
}

/// Every meteor sprite a mob can be spawned with: size class and its
/// unrotated width and height.
pub const METEORS: [(MeteorSize, f32, f32); 10] = [
    (MeteorSize::Big, 101.0, 84.0),
    (MeteorSize::Big, 120.0, 98.0),
    (MeteorSize::Big, 89.0, 82.0),
    (MeteorSize::Big, 98.0, 96.0),
    (MeteorSize::Medium, 43.0, 43.0),
    (MeteorSize::Medium, 45.0, 40.0),
    (MeteorSize::Small, 28.0, 28.0),
    (MeteorSize::Small, 29.0, 26.0),
    (MeteorSize::Tiny, 18.0, 18.0),
    (MeteorSize::Tiny, 16.0, 15.0),
];

#[derive(Clone, Debug)]
pub struct Mob {
    pub rect: Rect,
    pub speed_x: f32,
    pub speed_y: f32,
    /// Current rotation in degrees, always in [0, 360).
    pub rotation: i32,
    /// Degrees added every rotation step (may be negative).
    pub rot_speed: i32,
    pub last_rotate_ms: u64,
    /// Collision radius; also the score it is worth.
    pub radius: u32,
    pub meteor: MeteorSize,
}

// ── Player ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Player {
    pub rect: Rect,
    pub radius: f32,
    /// Damage buffer.  May dip below zero inside a collision pass, never
    /// between ticks.
    pub shield: i32,
    /// Milliseconds required between two shots.
    pub shot_delay: u64,
    pub last_shot_ms: u64,
    pub power_level: u32,
    pub power_timer_ms: u64,
    pub lives: u32,
    /// A hidden ship is waiting to respawn: it cannot shoot or collide.
    pub hidden: bool,
    pub hide_timer_ms: u64,
}

// ── Background ────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StarTier {
    Small,
    Medium,
    Big,
}

impl StarTier {
    pub const ALL: [StarTier; 3] = [StarTier::Small, StarTier::Medium, StarTier::Big];

    /// Fraction of the starfield drawn in this tier.
    pub fn share(self) -> f64 {
        match self {
            StarTier::Small => 0.2,
            StarTier::Medium => 0.3,
            StarTier::Big => 0.5,
        }
    }

    /// Downward drift per frame; bigger stars look closer and move faster.
    pub fn speed(self) -> f32 {
        match self {
            StarTier::Small => 0.1,
            StarTier::Medium => 0.2,
            StarTier::Big => 0.4,
        }
    }

    pub fn size(self) -> f32 {
        match self {
            StarTier::Small => 0.8,
            StarTier::Medium => 1.1,
            StarTier::Big => 2.2,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Star {
    pub x: f32,
    pub y: f32,
    pub tier: StarTier,
}

// ── Master game state ─────────────────────────────────────────────────────────

/// The entire game state.  Cloneable so pure update functions can
/// return a new copy without mutating the original.
#[derive(Clone, Debug)]
pub struct GameState {
    pub player: Player,
    pub mobs: Vec<Mob>,
    pub bullets: Vec<Bullet>,
    pub power_ups: Vec<PowerUp>,
    pub explosions: Vec<Explosion>,
    /// Scrolling background; cosmetic only.
    pub stars: Vec<Star>,
    pub score: u32,
    pub status: GameStatus,
    pub frame: u64,
    /// Simulated clock in milliseconds, advanced by one frame per tick.
    pub now_ms: u64,
    pub settings: Settings,
}
