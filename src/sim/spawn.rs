//! Procedural spawning under a score-driven difficulty curve
//!
//! Obstacles come on a cooldown that shrinks with score down to a minimum
//! reaction gap. Each ready tick rolls a spawn chance that rises with score
//! (capped), and a grouped-spawn chance that falls with score (floored).
//! Powerups are rare and never overlap an active empowerment.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::entities::{Obstacle, Powerup};
use crate::tuning::{SpawnTuning, Tuning};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpawnDirector {
    /// Ticks until the next obstacle roll
    pub cooldown: i32,
}

impl SpawnDirector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tick the cooldown and, once it is spent, maybe spawn one obstacle or a group
    pub fn maybe_spawn_obstacles<R: Rng>(
        &mut self,
        rng: &mut R,
        next_id: &mut u32,
        score: u64,
        world_speed: f32,
        tuning: &Tuning,
    ) -> Vec<Obstacle> {
        if self.cooldown > 0 {
            self.cooldown -= 1;
            return Vec::new();
        }

        let spawn = &tuning.spawn;
        if !rng.random_bool(obstacle_chance(score, spawn)) {
            return Vec::new();
        }

        let count = if rng.random_bool(group_chance(score, spawn)) {
            rng.random_range(spawn.group_size.0..=spawn.group_size.1)
        } else {
            1
        };

        let mut obstacles = Vec::with_capacity(count as usize);
        let mut x = tuning.world.screen_width;
        for _ in 0..count {
            let id = *next_id;
            *next_id += 1;
            let obstacle = Obstacle::spawn(rng, id, x, world_speed, &tuning.obstacles, &tuning.world);
            let gap = rng.random_range(spawn.group_spacing.0..=spawn.group_spacing.1) as f32;
            x += obstacle.size.x + gap;
            obstacles.push(obstacle);
        }

        self.cooldown = cooldown_for(score, spawn);
        log::debug!(
            "Spawned {} obstacle(s) at score {}, next roll in {} ticks",
            count,
            score,
            self.cooldown
        );
        obstacles
    }

    /// Maybe spawn a powerup. Never while one exists or the player is empowered.
    #[allow(clippy::too_many_arguments)]
    pub fn maybe_spawn_powerup<R: Rng>(
        &self,
        rng: &mut R,
        next_id: &mut u32,
        tick: u64,
        score: u64,
        powerup_present: bool,
        empowered: bool,
        tuning: &Tuning,
    ) -> Option<Powerup> {
        if powerup_present || empowered {
            return None;
        }
        if !rng.random_bool(powerup_chance(score, &tuning.spawn)) {
            return None;
        }
        let id = *next_id;
        *next_id += 1;
        let powerup = Powerup::spawn(rng, id, tuning.world.screen_width, tick, &tuning.powerups);
        log::debug!("Spawned powerup {} in {:?} band", id, powerup.band);
        Some(powerup)
    }
}

/// Per-roll obstacle chance; rises with score up to the cap
pub fn obstacle_chance(score: u64, spawn: &SpawnTuning) -> f64 {
    let chance = spawn.obstacle_chance + score as f64 * spawn.obstacle_chance_per_point;
    chance.min(spawn.obstacle_chance_cap).clamp(0.0, 1.0)
}

/// Chance a spawn comes as a group; decays with score down to the floor
pub fn group_chance(score: u64, spawn: &SpawnTuning) -> f64 {
    let chance = spawn.group_chance - score as f64 * spawn.group_chance_decay_per_point;
    chance.max(spawn.group_chance_floor).clamp(0.0, 1.0)
}

/// Per-tick powerup chance; decays with score down to the floor
pub fn powerup_chance(score: u64, spawn: &SpawnTuning) -> f64 {
    let chance = spawn.powerup_chance - score as f64 * spawn.powerup_chance_decay_per_point;
    chance.max(spawn.powerup_chance_floor).clamp(0.0, 1.0)
}

/// Cooldown after a spawn; shrinks with score, never below the minimum gap
pub fn cooldown_for(score: u64, spawn: &SpawnTuning) -> i32 {
    let steps = (score / spawn.score_per_cooldown_step).min(i32::MAX as u64) as i32;
    spawn.base_cooldown.saturating_sub(steps).max(spawn.min_gap)
}
