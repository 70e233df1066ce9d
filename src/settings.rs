/// Gameplay tuning.
///
/// Defaults reproduce the classic balance; any field can be overridden from
/// a TOML file.  Missing keys fall back to the defaults below.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

// ── Fixed sprite geometry (world units) ──────────────────────────────────────

pub const PLAYER_WIDTH: f32 = 50.0;
pub const PLAYER_HEIGHT: f32 = 38.0;
pub const PLAYER_RADIUS: f32 = 20.0;

pub const BULLET_WIDTH: f32 = 9.0;
pub const BULLET_HEIGHT: f32 = 54.0;
pub const BULLET_SPEED: f32 = -10.0;

pub const POWER_UP_SIZE: f32 = 30.0;
pub const POWER_UP_SPEED: f32 = 10.0;

/// Milliseconds between two explosion animation frames.
pub const EXPLOSION_FRAME_MS: u64 = 60;
pub const EXPLOSION_FRAMES: u32 = 8;

/// Milliseconds between two mob rotation steps.
pub const MOB_ROTATE_MS: u64 = 50;

pub const SHIELD_BONUS_MIN: i32 = 10;
pub const SHIELD_BONUS_MAX: i32 = 30; // exclusive
pub const SHOT_DELAY_BONUS: u64 = 150;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Frames per second; every tick advances the clock by one frame.
    pub fps: u32,
    /// World width in world units.
    pub width: f32,
    /// World height in world units.
    pub height: f32,
    pub lives: u32,
    pub shield_max: i32,
    /// Initial milliseconds between two shots.
    pub shot_delay_init: u64,
    /// Floor for the shot delay after silver-bolt pickups.
    pub shot_delay_min: u64,
    /// How long a gold-bolt power level lasts before decaying by one.
    pub power_level_time_ms: u64,
    /// A destroyed mob drops a power-up when a uniform draw exceeds this.
    pub bonus_odd: f64,
    pub respawn_time_ms: u64,
    pub mob_count: usize,
    pub star_count: usize,
    /// Horizontal ship movement per frame while a direction key is held.
    pub player_speed: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fps: 60,
            width: 800.0,
            height: 600.0,
            lives: 3,
            shield_max: 100,
            shot_delay_init: 500,
            shot_delay_min: 200,
            power_level_time_ms: 10_000,
            bonus_odd: 0.95,
            respawn_time_ms: 3_000,
            mob_count: 8,
            star_count: 100,
            player_speed: 6.0,
        }
    }
}

impl Settings {
    /// Parse settings from TOML text and validate them.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read and parse a TOML settings file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.fps == 0 {
            return Err(Error::InvalidSettings("fps must be greater than zero".into()));
        }
        if !(self.width > 0.0 && self.height > 0.0) {
            return Err(Error::InvalidSettings(format!(
                "world must have a positive size, got {}x{}",
                self.width, self.height
            )));
        }
        if self.width <= PLAYER_WIDTH {
            return Err(Error::InvalidSettings(format!(
                "world width {} is too narrow for the ship",
                self.width
            )));
        }
        if self.shield_max <= 0 {
            return Err(Error::InvalidSettings("shield_max must be positive".into()));
        }
        if self.shot_delay_min > self.shot_delay_init {
            return Err(Error::InvalidSettings(format!(
                "shot_delay_min ({}) exceeds shot_delay_init ({})",
                self.shot_delay_min, self.shot_delay_init
            )));
        }
        if !(0.0..=1.0).contains(&self.bonus_odd) {
            return Err(Error::InvalidSettings(format!(
                "bonus_odd must lie in [0, 1], got {}",
                self.bonus_odd
            )));
        }
        if self.mob_count == 0 {
            return Err(Error::InvalidSettings("mob_count must be at least 1".into()));
        }
        if self.lives == 0 {
            return Err(Error::InvalidSettings("lives must be at least 1".into()));
        }
        Ok(())
    }

    /// Simulated milliseconds per tick.
    pub fn frame_ms(&self) -> u64 {
        (1000 / u64::from(self.fps)).max(1)
    }

    /// Wall-clock duration of one frame.
    pub fn frame(&self) -> Duration {
        Duration::from_millis(self.frame_ms())
    }
}
