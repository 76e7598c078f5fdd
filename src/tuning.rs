//! Data-driven game balance
//!
//! Every gameplay constant lives here so a run can be re-balanced from a JSON
//! file without recompiling. Missing fields fall back to the defaults below.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::consts::{GROUND_Y, SCREEN_WIDTH};
use crate::error::TuningError;

/// Complete balance sheet for a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Tuning {
    pub world: WorldTuning,
    pub player: PlayerTuning,
    pub obstacles: ObstacleTuning,
    pub powerups: PowerupTuning,
    pub spawn: SpawnTuning,
    pub scoring: ScoringTuning,
}

/// Playfield geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldTuning {
    /// Right edge; new obstacles appear here
    pub screen_width: f32,
    /// Y of the ground line (y grows downward)
    pub ground_y: f32,
}

impl Default for WorldTuning {
    fn default() -> Self {
        Self {
            screen_width: SCREEN_WIDTH,
            ground_y: GROUND_Y,
        }
    }
}

/// Impulse, displacement and effect length of one boost tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoostTuning {
    /// Vertical velocity set on use (negative = upward)
    pub impulse: f32,
    /// Horizontal displacement applied instantly
    pub forward: f32,
    /// Ticks the visual effect stays on
    pub effect_ticks: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub start_x: f32,
    pub width: f32,
    pub height: f32,

    // === Gravity ===
    pub gravity: f32,
    pub glide_gravity: f32,
    /// Fall-speed floor while gliding
    pub min_glide_speed: f32,

    // === Jump charge ===
    /// Weakest jump (charge starts here)
    pub min_jump_power: f32,
    /// Strongest jump (charge clamps here)
    pub max_jump_power: f32,
    /// Magnitude added to the charge per tick
    pub charge_rate: f32,

    // === Boosts ===
    /// One free boost per airborne phase, only while gliding
    pub free_boost: BoostTuning,
    /// Consumes one boost unit
    pub resource_boost: BoostTuning,

    // === Boost markers ===
    pub marker_fall_velocity: f32,
    pub marker_gravity: f32,
    pub marker_size: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            start_x: 50.0,
            width: 40.0,
            height: 60.0,

            gravity: 0.8,
            glide_gravity: 0.05,
            min_glide_speed: 1.0,

            min_jump_power: -12.0,
            max_jump_power: -20.0,
            charge_rate: 0.8,

            free_boost: BoostTuning {
                impulse: -8.0,
                forward: 50.0,
                effect_ticks: 10,
            },
            resource_boost: BoostTuning {
                impulse: -12.0,
                forward: 80.0,
                effect_ticks: 15,
            },

            marker_fall_velocity: 2.0,
            marker_gravity: 0.5,
            marker_size: 35.0,
        }
    }
}

/// Inclusive pixel ranges and pick weight for one obstacle size class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeRange {
    pub width: (u32, u32),
    pub height: (u32, u32),
    pub weight: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleTuning {
    pub small: SizeRange,
    pub medium: SizeRange,
    pub large: SizeRange,
    pub extra_large: SizeRange,
    /// Chance of the wider-but-shorter variant
    pub wide_chance: f64,
    pub wide_width_scale: f32,
    pub wide_height_scale: f32,
    /// Alpha when fading begins
    pub fade_start_alpha: u8,
    /// Alpha lost per tick while fading
    pub fade_step: u8,
}

impl Default for ObstacleTuning {
    fn default() -> Self {
        Self {
            small: SizeRange {
                width: (20, 30),
                height: (40, 60),
                weight: 3,
            },
            medium: SizeRange {
                width: (30, 45),
                height: (60, 80),
                weight: 3,
            },
            large: SizeRange {
                width: (40, 55),
                height: (70, 90),
                weight: 2,
            },
            extra_large: SizeRange {
                width: (50, 65),
                height: (85, 110),
                weight: 1,
            },
            wide_chance: 0.3,
            wide_width_scale: 1.5,
            wide_height_scale: 0.8,
            fade_start_alpha: 255,
            fade_step: 15,
        }
    }
}

/// Vertical band (top-left y range) a powerup may spawn in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandTuning {
    pub top: f32,
    pub bottom: f32,
    pub weight: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerupTuning {
    pub size: f32,
    /// Fixed scroll speed, independent of world speed
    pub speed: f32,
    /// Amplitude of the bobbing motion
    pub float_range: f32,
    /// Radians per tick of the bobbing motion
    pub float_speed: f32,
    pub low_band: BandTuning,
    pub mid_band: BandTuning,
    pub high_band: BandTuning,
}

impl Default for PowerupTuning {
    fn default() -> Self {
        Self {
            size: 30.0,
            speed: 5.0,
            float_range: 20.0,
            float_speed: 0.1,
            low_band: BandTuning {
                top: 230.0,
                bottom: 260.0,
                weight: 3,
            },
            mid_band: BandTuning {
                top: 180.0,
                bottom: 230.0,
                weight: 2,
            },
            high_band: BandTuning {
                top: 130.0,
                bottom: 180.0,
                weight: 1,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnTuning {
    // === Cooldown ===
    pub base_cooldown: i32,
    /// Cooldown never drops below this (minimum reaction window)
    pub min_gap: i32,
    /// Score needed to shave one tick off the cooldown
    pub score_per_cooldown_step: u64,

    // === Obstacles ===
    pub obstacle_chance: f64,
    pub obstacle_chance_per_point: f64,
    pub obstacle_chance_cap: f64,
    pub group_chance: f64,
    pub group_chance_decay_per_point: f64,
    pub group_chance_floor: f64,
    /// Inclusive obstacle count of a grouped spawn
    pub group_size: (u32, u32),
    /// Inclusive horizontal gap between grouped obstacles
    pub group_spacing: (u32, u32),

    // === Powerups ===
    pub powerup_chance: f64,
    pub powerup_chance_decay_per_point: f64,
    pub powerup_chance_floor: f64,
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self {
            base_cooldown: 60,
            min_gap: 30,
            score_per_cooldown_step: 100,

            obstacle_chance: 0.3,
            obstacle_chance_per_point: 1.0 / 5000.0,
            obstacle_chance_cap: 0.6,
            group_chance: 0.25,
            group_chance_decay_per_point: 1.0 / 4000.0,
            group_chance_floor: 0.1,
            group_size: (2, 3),
            group_spacing: (60, 120),

            powerup_chance: 0.005,
            powerup_chance_decay_per_point: 1.5e-6,
            powerup_chance_floor: 0.002,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringTuning {
    /// Obstacle scrolled off-screen untouched
    pub pass_bonus: u64,
    /// Obstacle faded out after an empowered hit
    pub destroy_bonus: u64,
    pub collect_bonus: u64,
    pub empowerment_ticks: u32,
    pub base_world_speed: f32,
    pub score_per_speed_step: u64,
    pub speed_step: f32,
}

impl Default for ScoringTuning {
    fn default() -> Self {
        Self {
            pass_bonus: 10,
            destroy_bonus: 50,
            collect_bonus: 25,
            empowerment_ticks: 300,
            base_world_speed: 5.0,
            score_per_speed_step: 200,
            speed_step: 1.0,
        }
    }
}

impl Tuning {
    /// Parse and validate a JSON balance sheet
    ///
    /// The sheet is laid over the defaults key by key, so any nested record
    /// (a boost tier, a size class, a band) can be overridden one field at a
    /// time.
    pub fn from_json_str(json: &str) -> Result<Self, TuningError> {
        let overrides: Value = serde_json::from_str(json)?;
        let mut merged = serde_json::to_value(Tuning::default())?;
        overlay(&mut merged, overrides);
        let tuning: Tuning = serde_json::from_value(merged)?;
        tuning
            .validate()
            .inspect_err(|err| log::warn!("Rejected tuning: {err}"))?;
        Ok(tuning)
    }

    /// Load a balance sheet from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| TuningError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let tuning = Self::from_json_str(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        let p = &self.player;
        if p.gravity <= 0.0 {
            return Err(TuningError::invalid("player.gravity", "must be positive"));
        }
        if p.glide_gravity < 0.0 || p.glide_gravity > p.gravity {
            return Err(TuningError::invalid(
                "player.glide_gravity",
                "must be within [0, gravity]",
            ));
        }
        // Jump power is a negative velocity: max is the more negative one
        if p.min_jump_power >= 0.0 || p.max_jump_power > p.min_jump_power {
            return Err(TuningError::invalid(
                "player.max_jump_power",
                format!(
                    "need max_jump_power <= min_jump_power < 0, got {} / {}",
                    p.max_jump_power, p.min_jump_power
                ),
            ));
        }
        if p.charge_rate <= 0.0 {
            return Err(TuningError::invalid("player.charge_rate", "must be positive"));
        }
        if p.width <= 0.0 || p.height <= 0.0 {
            return Err(TuningError::invalid("player.width", "body must have positive size"));
        }

        let o = &self.obstacles;
        if o.fade_step == 0 {
            return Err(TuningError::invalid("obstacles.fade_step", "must be non-zero"));
        }
        if !(0.0..=1.0).contains(&o.wide_chance) {
            return Err(TuningError::invalid("obstacles.wide_chance", "must be a probability"));
        }
        for (field, range) in [
            ("obstacles.small", o.small),
            ("obstacles.medium", o.medium),
            ("obstacles.large", o.large),
            ("obstacles.extra_large", o.extra_large),
        ] {
            check_range(field, range.width)?;
            check_range(field, range.height)?;
        }
        if [o.small, o.medium, o.large, o.extra_large]
            .iter()
            .all(|r| r.weight == 0)
        {
            return Err(TuningError::invalid("obstacles", "all size weights are zero"));
        }

        let w = &self.powerups;
        for (field, band) in [
            ("powerups.low_band", w.low_band),
            ("powerups.mid_band", w.mid_band),
            ("powerups.high_band", w.high_band),
        ] {
            if band.top > band.bottom {
                return Err(TuningError::invalid(field, "top must not exceed bottom"));
            }
        }
        if [w.low_band, w.mid_band, w.high_band]
            .iter()
            .all(|b| b.weight == 0)
        {
            return Err(TuningError::invalid("powerups", "all band weights are zero"));
        }

        let s = &self.spawn;
        if s.min_gap < 1 || s.min_gap > s.base_cooldown {
            return Err(TuningError::invalid(
                "spawn.min_gap",
                "must be within [1, base_cooldown]",
            ));
        }
        if s.score_per_cooldown_step == 0 {
            return Err(TuningError::invalid("spawn.score_per_cooldown_step", "must be non-zero"));
        }
        for (field, chance) in [
            ("spawn.obstacle_chance", s.obstacle_chance),
            ("spawn.obstacle_chance_cap", s.obstacle_chance_cap),
            ("spawn.group_chance", s.group_chance),
            ("spawn.group_chance_floor", s.group_chance_floor),
            ("spawn.powerup_chance", s.powerup_chance),
            ("spawn.powerup_chance_floor", s.powerup_chance_floor),
        ] {
            if !(0.0..=1.0).contains(&chance) {
                return Err(TuningError::invalid(field, format!("{chance} is not a probability")));
            }
        }
        check_range("spawn.group_size", s.group_size)?;
        check_range("spawn.group_spacing", s.group_spacing)?;
        if s.group_size.0 == 0 {
            return Err(TuningError::invalid("spawn.group_size", "groups need at least one obstacle"));
        }

        if self.scoring.score_per_speed_step == 0 {
            return Err(TuningError::invalid("scoring.score_per_speed_step", "must be non-zero"));
        }
        if self.scoring.base_world_speed <= 0.0 || self.scoring.speed_step < 0.0 {
            return Err(TuningError::invalid(
                "scoring.base_world_speed",
                "world speed must be positive and non-decreasing",
            ));
        }

        Ok(())
    }
}

/// Recursively replace the leaves of `base` present in `overrides`
fn overlay(base: &mut Value, overrides: Value) {
    match (base, overrides) {
        (Value::Object(base), Value::Object(overrides)) => {
            for (key, value) in overrides {
                match base.get_mut(&key) {
                    Some(slot) => overlay(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, value) => *base = value,
    }
}

fn check_range(field: &'static str, (lo, hi): (u32, u32)) -> Result<(), TuningError> {
    if lo > hi {
        return Err(TuningError::invalid(field, format!("empty range {lo}..={hi}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_override() {
        let tuning = Tuning::from_json_str(r#"{ "player": { "gravity": 1.2 } }"#).unwrap();
        assert!((tuning.player.gravity - 1.2).abs() < f32::EPSILON);
        // Untouched fields keep defaults
        assert_eq!(tuning.player.min_jump_power, -12.0);
        assert_eq!(tuning.scoring.destroy_bonus, 50);
    }

    #[test]
    fn test_partial_override_of_nested_records() {
        let tuning = Tuning::from_json_str(
            r#"{
                "player": { "free_boost": { "impulse": -9.0 } },
                "obstacles": { "small": { "weight": 5 } },
                "powerups": { "high_band": { "top": 120.0 } }
            }"#,
        )
        .unwrap();
        let defaults = Tuning::default();

        assert_eq!(tuning.player.free_boost.impulse, -9.0);
        assert_eq!(tuning.player.free_boost.forward, defaults.player.free_boost.forward);
        assert_eq!(
            tuning.player.free_boost.effect_ticks,
            defaults.player.free_boost.effect_ticks
        );
        assert_eq!(tuning.player.resource_boost, defaults.player.resource_boost);

        assert_eq!(tuning.obstacles.small.weight, 5);
        assert_eq!(tuning.obstacles.small.width, defaults.obstacles.small.width);
        assert_eq!(tuning.obstacles.small.height, defaults.obstacles.small.height);

        assert_eq!(tuning.powerups.high_band.top, 120.0);
        assert_eq!(tuning.powerups.high_band.bottom, defaults.powerups.high_band.bottom);
    }

    #[test]
    fn test_nested_override_with_wrong_type_is_parse_error() {
        let err = Tuning::from_json_str(r#"{ "player": { "free_boost": { "impulse": "up" } } }"#)
            .unwrap_err();
        assert!(matches!(err, TuningError::Parse(_)));
    }

    #[test]
    fn test_rejects_inverted_jump_power() {
        let err = Tuning::from_json_str(
            r#"{ "player": { "min_jump_power": -20.0, "max_jump_power": -12.0 } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, TuningError::Invalid { field: "player.max_jump_power", .. }));
    }

    #[test]
    fn test_rejects_zero_fade_step() {
        let err = Tuning::from_json_str(r#"{ "obstacles": { "fade_step": 0 } }"#).unwrap_err();
        assert!(matches!(err, TuningError::Invalid { field: "obstacles.fade_step", .. }));
    }

    #[test]
    fn test_rejects_bad_probability() {
        let err = Tuning::from_json_str(r#"{ "spawn": { "group_chance": 1.5 } }"#).unwrap_err();
        assert!(err.to_string().contains("spawn.group_chance"));
    }

    #[test]
    fn test_parse_error() {
        let err = Tuning::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, TuningError::Parse(_)));
    }

    #[test]
    fn test_json_roundtrip_keeps_defaults() {
        let json = serde_json::to_string(&Tuning::default()).unwrap();
        assert_eq!(Tuning::from_json_str(&json).unwrap(), Tuning::default());
    }
}
