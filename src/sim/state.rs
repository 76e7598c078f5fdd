//! Session state and core simulation types
//!
//! A `GameSession` is one run: created on start/restart, mutated every active
//! tick, dropped on return to the menu. It owns the player and every entity;
//! entities never point back at it.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entities::{Obstacle, Powerup};
use super::player::{BoostKind, Player};
use super::spawn::SpawnDirector;
use crate::tuning::{ScoringTuning, Tuning};

/// Something that happened during a tick, drained by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Jumped { power: f32 },
    Boosted { kind: BoostKind },
    ObstaclesSpawned { count: usize },
    ObstaclePassed { id: u32 },
    /// Empowered player hit an obstacle; it starts fading
    ObstacleStruck { id: u32 },
    ObstacleDestroyed { id: u32 },
    PowerupSpawned { id: u32 },
    PowerupCollected { id: u32 },
    PowerupMissed { id: u32 },
    EmpowermentExpired,
    PlayerDied { score: u64 },
}

/// Score and best score of the running process
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreTracker {
    pub score: u64,
    pub high_score: u64,
}

impl ScoreTracker {
    pub fn new(high_score: u64) -> Self {
        Self {
            score: 0,
            high_score,
        }
    }

    pub fn award(&mut self, points: u64) {
        self.score = self.score.saturating_add(points);
    }

    /// Fold the current score into the best score (only done on death)
    pub fn commit(&mut self) {
        self.high_score = self.high_score.max(self.score);
    }
}

/// Invulnerability window granted by a powerup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Empowerment {
    pub remaining: u32,
    pub duration: u32,
}

impl Empowerment {
    pub fn remaining_fraction(&self) -> f32 {
        if self.duration == 0 {
            0.0
        } else {
            self.remaining as f32 / self.duration as f32
        }
    }
}

/// World scroll speed for a score: a non-decreasing step function
pub fn world_speed_for(score: u64, scoring: &ScoringTuning) -> f32 {
    let steps = score / scoring.score_per_speed_step.max(1);
    scoring.base_world_speed + steps as f32 * scoring.speed_step
}

#[derive(Debug, Clone)]
pub struct GameSession {
    /// Active ticks simulated so far
    pub tick: u64,
    pub scores: ScoreTracker,
    pub world_speed: f32,
    pub spawner: SpawnDirector,
    pub empowerment: Option<Empowerment>,
    pub player: Player,
    /// Spawn order
    pub obstacles: Vec<Obstacle>,
    /// At most one powerup at a time
    pub powerup: Option<Powerup>,
    /// Events raised since the last drain
    pub events: Vec<GameEvent>,
    pub rng: Pcg32,
    next_id: u32,
}

impl GameSession {
    /// Fresh run carrying over the best score so far
    pub fn new(tuning: &Tuning, seed: u64, high_score: u64) -> Self {
        Self {
            tick: 0,
            scores: ScoreTracker::new(high_score),
            world_speed: tuning.scoring.base_world_speed,
            spawner: SpawnDirector::new(),
            empowerment: None,
            player: Player::new(&tuning.player, &tuning.world),
            obstacles: Vec::new(),
            powerup: None,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn is_empowered(&self) -> bool {
        self.empowerment.is_some()
    }

    /// Start (or restart) the invulnerability window
    pub fn empower(&mut self, tuning: &Tuning) {
        let duration = tuning.scoring.empowerment_ticks;
        if duration == 0 {
            return;
        }
        self.empowerment = Some(Empowerment {
            remaining: duration,
            duration,
        });
        log::debug!("Empowered for {} ticks", duration);
    }

    /// Count the invulnerability window down by one tick
    pub fn tick_empowerment(&mut self) {
        if let Some(empowerment) = &mut self.empowerment {
            empowerment.remaining = empowerment.remaining.saturating_sub(1);
            if empowerment.remaining == 0 {
                self.empowerment = None;
                self.events.push(GameEvent::EmpowermentExpired);
                log::debug!("Empowerment expired at tick {}", self.tick);
            }
        }
    }

    /// Run the obstacle then powerup spawn checks, in that order
    pub fn spawn_entities(&mut self, tuning: &Tuning) {
        let score = self.scores.score;
        let spawned = self.spawner.maybe_spawn_obstacles(
            &mut self.rng,
            &mut self.next_id,
            score,
            self.world_speed,
            tuning,
        );
        if !spawned.is_empty() {
            self.events.push(GameEvent::ObstaclesSpawned {
                count: spawned.len(),
            });
            self.obstacles.extend(spawned);
        }

        let present = self.powerup.is_some();
        let empowered = self.is_empowered();
        let powerup = self.spawner.maybe_spawn_powerup(
            &mut self.rng,
            &mut self.next_id,
            self.tick,
            score,
            present,
            empowered,
            tuning,
        );
        if let Some(powerup) = powerup {
            self.events.push(GameEvent::PowerupSpawned { id: powerup.id });
            self.powerup = Some(powerup);
        }
    }

    /// Recompute world speed from score and push it onto every obstacle
    pub fn update_world_speed(&mut self, tuning: &Tuning) {
        let speed = world_speed_for(self.scores.score, &tuning.scoring);
        debug_assert!(speed >= self.world_speed);
        self.world_speed = speed;
        for obstacle in &mut self.obstacles {
            obstacle.speed = speed;
        }
    }

    /// Take the events raised since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
