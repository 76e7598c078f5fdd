//! Scrolling entities: obstacles and powerups
//!
//! Entities only move and fade themselves. Removing them from their
//! collection is always the session's job.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use crate::tuning::{BandTuning, ObstacleTuning, PowerupTuning, SizeRange, WorldTuning};

/// Obstacle size class, picked by weight at spawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SizeClass {
    Small,
    Medium,
    Large,
    ExtraLarge,
}

impl SizeClass {
    pub const ALL: [SizeClass; 4] = [
        SizeClass::Small,
        SizeClass::Medium,
        SizeClass::Large,
        SizeClass::ExtraLarge,
    ];

    pub fn range(self, tuning: &ObstacleTuning) -> SizeRange {
        match self {
            SizeClass::Small => tuning.small,
            SizeClass::Medium => tuning.medium,
            SizeClass::Large => tuning.large,
            SizeClass::ExtraLarge => tuning.extra_large,
        }
    }
}

/// Fade state of an obstacle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fade {
    Solid,
    /// Destroyed by an empowered player; removed once alpha hits zero
    Fading { alpha: u8 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    /// Top-left corner; y is derived from the ground line and height
    pub pos: Vec2,
    pub size: Vec2,
    pub class: SizeClass,
    /// Overwritten from world speed every tick
    pub speed: f32,
    pub fade: Fade,
}

impl Obstacle {
    /// Roll a size class and dimensions, standing on the ground at `x`
    pub fn spawn<R: Rng>(
        rng: &mut R,
        id: u32,
        x: f32,
        speed: f32,
        tuning: &ObstacleTuning,
        world: &WorldTuning,
    ) -> Self {
        let weights = SizeClass::ALL.map(|c| (c, c.range(tuning).weight));
        let class = pick_weighted(rng, &weights).unwrap_or(SizeClass::Small);
        let range = class.range(tuning);

        let mut width = rng.random_range(range.width.0..=range.width.1) as f32;
        let mut height = rng.random_range(range.height.0..=range.height.1) as f32;
        if rng.random_bool(tuning.wide_chance) {
            width = (width * tuning.wide_width_scale).floor();
            height = (height * tuning.wide_height_scale).floor();
        }

        Self::new(id, class, Vec2::new(width, height), x, speed, world)
    }

    pub fn new(id: u32, class: SizeClass, size: Vec2, x: f32, speed: f32, world: &WorldTuning) -> Self {
        Self {
            id,
            pos: Vec2::new(x, world.ground_y - size.y),
            size,
            class,
            speed,
            fade: Fade::Solid,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }

    pub fn is_fading(&self) -> bool {
        matches!(self.fade, Fade::Fading { .. })
    }

    /// Begin fading. Calling again while fading changes nothing.
    pub fn start_fade(&mut self, tuning: &ObstacleTuning) {
        if self.fade == Fade::Solid {
            self.fade = Fade::Fading {
                alpha: tuning.fade_start_alpha,
            };
        }
    }

    pub fn alpha(&self) -> u8 {
        match self.fade {
            Fade::Solid => u8::MAX,
            Fade::Fading { alpha } => alpha,
        }
    }

    /// Fully faded and ready for removal
    pub fn is_faded_out(&self) -> bool {
        self.fade == Fade::Fading { alpha: 0 }
    }

    /// Scroll left and decay alpha if fading
    pub fn advance(&mut self, tuning: &ObstacleTuning) {
        self.pos.x -= self.speed;
        if let Fade::Fading { alpha } = &mut self.fade {
            *alpha = alpha.saturating_sub(tuning.fade_step);
        }
    }

    /// Trailing edge has passed the left boundary
    pub fn is_off_screen(&self) -> bool {
        self.pos.x < -self.size.x
    }
}

/// Vertical band a powerup spawns in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerupBand {
    Low,
    Mid,
    High,
}

impl PowerupBand {
    pub const ALL: [PowerupBand; 3] = [PowerupBand::Low, PowerupBand::Mid, PowerupBand::High];

    pub fn range(self, tuning: &PowerupTuning) -> BandTuning {
        match self {
            PowerupBand::Low => tuning.low_band,
            PowerupBand::Mid => tuning.mid_band,
            PowerupBand::High => tuning.high_band,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Powerup {
    pub id: u32,
    /// Top-left corner before the bobbing offset
    pub pos: Vec2,
    pub band: PowerupBand,
    /// Current bobbing offset, a pure function of the session tick
    pub float_offset: f32,
}

impl Powerup {
    /// Roll a band and a height within it, entering at `x` on `tick`
    pub fn spawn<R: Rng>(rng: &mut R, id: u32, x: f32, tick: u64, tuning: &PowerupTuning) -> Self {
        let weights = PowerupBand::ALL.map(|b| (b, b.range(tuning).weight));
        let band = pick_weighted(rng, &weights).unwrap_or(PowerupBand::Low);
        let range = band.range(tuning);
        let y = if range.bottom > range.top {
            rng.random_range(range.top..=range.bottom)
        } else {
            range.top
        };
        Self {
            id,
            pos: Vec2::new(x, y),
            band,
            float_offset: Self::float_offset_at(tick, tuning),
        }
    }

    /// Bobbing offset; a pure function of the tick
    pub fn float_offset_at(tick: u64, tuning: &PowerupTuning) -> f32 {
        (tick as f32 * tuning.float_speed).sin() * tuning.float_range
    }

    pub fn advance(&mut self, tuning: &PowerupTuning, tick: u64) {
        self.pos.x -= tuning.speed;
        self.float_offset = Self::float_offset_at(tick, tuning);
    }

    pub fn bounds(&self, tuning: &PowerupTuning) -> Aabb {
        Aabb::new(
            Vec2::new(self.pos.x, self.pos.y + self.float_offset),
            Vec2::splat(tuning.size),
        )
    }

    pub fn is_off_screen(&self, tuning: &PowerupTuning) -> bool {
        self.pos.x < -tuning.size
    }
}

/// Pick an item with probability proportional to its weight
pub fn pick_weighted<T: Copy, R: Rng>(rng: &mut R, items: &[(T, u32)]) -> Option<T> {
    let total: u32 = items.iter().map(|(_, w)| *w).sum();
    if total == 0 {
        return None;
    }
    let mut roll = rng.random_range(0..total);
    for &(item, weight) in items {
        if roll < weight {
            return Some(item);
        }
        roll -= weight;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn obstacle() -> Obstacle {
        let world = WorldTuning::default();
        Obstacle::new(1, SizeClass::Medium, Vec2::new(40.0, 70.0), 800.0, 5.0, &world)
    }

    #[test]
    fn test_obstacle_stands_on_ground() {
        let world = WorldTuning::default();
        let o = obstacle();
        assert_eq!(o.pos.y + o.size.y, world.ground_y);
    }

    #[test]
    fn test_spawned_sizes_within_class_ranges() {
        let tuning = ObstacleTuning::default();
        let world = WorldTuning::default();
        let mut rng = Pcg32::seed_from_u64(7);
        for id in 0..500 {
            let o = Obstacle::spawn(&mut rng, id, 800.0, 5.0, &tuning, &world);
            let range = o.class.range(&tuning);
            let max_w = (range.width.1 as f32 * tuning.wide_width_scale).floor();
            let min_h = (range.height.0 as f32 * tuning.wide_height_scale).floor();
            assert!(o.size.x >= range.width.0 as f32 && o.size.x <= max_w);
            assert!(o.size.y >= min_h && o.size.y <= range.height.1 as f32);
            assert_eq!(o.pos.y + o.size.y, world.ground_y);
        }
    }

    #[test]
    fn test_fade_runs_exact_tick_count() {
        let tuning = ObstacleTuning::default();
        let mut o = obstacle();
        o.start_fade(&tuning);
        let expected = tuning.fade_start_alpha.div_ceil(tuning.fade_step);

        let mut ticks = 0;
        let mut last = o.alpha();
        while !o.is_faded_out() {
            o.advance(&tuning);
            assert!(o.alpha() <= last);
            last = o.alpha();
            ticks += 1;
        }
        assert_eq!(ticks, expected);
    }

    #[test]
    fn test_start_fade_is_idempotent() {
        let tuning = ObstacleTuning::default();
        let mut o = obstacle();
        o.start_fade(&tuning);
        o.advance(&tuning);
        let alpha = o.alpha();
        o.start_fade(&tuning);
        assert_eq!(o.alpha(), alpha);
    }

    #[test]
    fn test_off_screen_after_trailing_edge_passes() {
        let tuning = ObstacleTuning::default();
        let mut o = obstacle();
        o.pos.x = -o.size.x;
        assert!(!o.is_off_screen());
        o.advance(&tuning);
        assert!(o.is_off_screen());
    }

    #[test]
    fn test_powerup_float_is_deterministic() {
        let tuning = PowerupTuning::default();
        let mut a = Powerup {
            id: 1,
            pos: Vec2::new(800.0, 200.0),
            band: PowerupBand::Mid,
            float_offset: 0.0,
        };
        let mut b = a.clone();
        a.advance(&tuning, 42);
        b.advance(&tuning, 42);
        assert_eq!(a.float_offset, b.float_offset);
        assert!(a.float_offset.abs() <= tuning.float_range);
        assert_eq!(a.pos.x, 800.0 - tuning.speed);
    }

    #[test]
    fn test_powerup_bob_starts_in_phase_with_tick() {
        let tuning = PowerupTuning::default();
        let mut rng = Pcg32::seed_from_u64(4);
        let tick = 17;
        let mut p = Powerup::spawn(&mut rng, 1, 800.0, tick, &tuning);
        let expected = (tick as f32 * tuning.float_speed).sin() * tuning.float_range;
        assert_eq!(p.float_offset, expected);
        assert_ne!(p.float_offset, 0.0);

        // No jump on the first advance: the step matches any later step size
        let before = p.float_offset;
        p.advance(&tuning, tick + 1);
        assert_eq!(p.float_offset, Powerup::float_offset_at(tick + 1, &tuning));
        assert!((p.float_offset - before).abs() <= tuning.float_range * tuning.float_speed + 1e-4);
    }

    #[test]
    fn test_powerup_spawns_inside_its_band() {
        let tuning = PowerupTuning::default();
        let mut rng = Pcg32::seed_from_u64(3);
        for id in 0..200 {
            let p = Powerup::spawn(&mut rng, id, 800.0, 0, &tuning);
            let band = p.band.range(&tuning);
            assert!(p.pos.y >= band.top && p.pos.y <= band.bottom);
        }
    }

    #[test]
    fn test_pick_weighted_skips_zero_weights() {
        let mut rng = Pcg32::seed_from_u64(1);
        for _ in 0..100 {
            let pick = pick_weighted(&mut rng, &[('a', 0), ('b', 5), ('c', 0)]);
            assert_eq!(pick, Some('b'));
        }
        assert_eq!(pick_weighted::<char, _>(&mut rng, &[('a', 0)]), None);
    }
}
