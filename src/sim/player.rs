//! Player kinematics
//!
//! Vertical motion only: gravity integration, ground clamping, jump-charge
//! accumulation, glide gravity override and the two boost tiers. The player
//! moves horizontally only when a boost displaces it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::pool::Pool;
use crate::tuning::{PlayerTuning, WorldTuning};

/// Where the player is in the jump cycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum JumpPhase {
    /// Standing on the ground, no charge held
    Grounded,
    /// On the ground, building jump power (negative velocity magnitude)
    Charging { charge: f32 },
    /// In the air after a jump or boost
    Airborne,
}

/// Which gravity applies while falling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GravityMode {
    #[default]
    Normal,
    Gliding,
}

/// Boost tiers, in the order `apply_boost` tries them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoostKind {
    /// Once per airborne phase, only while gliding
    Free,
    /// Consumes one boost unit and drops a marker
    Resource,
}

/// Visual effect left running after a boost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoostEffect {
    pub kind: BoostKind,
    pub ticks_left: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MarkerState {
    /// Dropping toward the ground
    Falling { vel: f32 },
    /// Resting on the ground, scrolling with the world
    Landed,
}

/// Marker dropped by a resource boost
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub pos: Vec2,
    pub state: MarkerState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Top-left corner of the body
    pub pos: Vec2,
    /// Vertical velocity (positive = falling)
    pub vel: f32,
    pub jump: JumpPhase,
    pub gravity_mode: GravityMode,
    /// Boost units available for resource boosts
    pub boosts: u32,
    /// Free boost still available this airborne phase
    pub free_boost_ready: bool,
    pub effect: Option<BoostEffect>,
    pub markers: Pool<Marker>,
}

impl Player {
    /// Standing on the ground at the start position
    pub fn new(tuning: &PlayerTuning, world: &WorldTuning) -> Self {
        Self {
            pos: Vec2::new(tuning.start_x, world.ground_y - tuning.height),
            vel: 0.0,
            jump: JumpPhase::Grounded,
            gravity_mode: GravityMode::Normal,
            boosts: 0,
            free_boost_ready: true,
            effect: None,
            markers: Pool::new(),
        }
    }

    pub fn bounds(&self, tuning: &PlayerTuning) -> Aabb {
        Aabb::new(self.pos, Vec2::new(tuning.width, tuning.height))
    }

    pub fn is_grounded(&self) -> bool {
        self.jump == JumpPhase::Grounded
    }

    pub fn is_gliding(&self) -> bool {
        self.gravity_mode == GravityMode::Gliding
    }

    /// Current charge, zero unless charging
    pub fn charge(&self) -> f32 {
        match self.jump {
            JumpPhase::Charging { charge } => charge,
            _ => 0.0,
        }
    }

    /// How far the charge has moved from weakest (0.0) to strongest (1.0)
    pub fn charge_fraction(&self, tuning: &PlayerTuning) -> f32 {
        match self.jump {
            JumpPhase::Charging { charge } => {
                let span = tuning.min_jump_power - tuning.max_jump_power;
                if span <= 0.0 {
                    1.0
                } else {
                    ((tuning.min_jump_power - charge) / span).clamp(0.0, 1.0)
                }
            }
            _ => 0.0,
        }
    }

    /// Begin charging a jump. Ignored unless grounded.
    pub fn start_charge(&mut self, tuning: &PlayerTuning) -> bool {
        if self.jump != JumpPhase::Grounded {
            return false;
        }
        self.jump = JumpPhase::Charging {
            charge: tuning.min_jump_power,
        };
        true
    }

    /// Strengthen a held charge by one tick, clamped at max jump power
    pub fn tick_charge(&mut self, tuning: &PlayerTuning) {
        if let JumpPhase::Charging { charge } = &mut self.jump {
            *charge = (*charge - tuning.charge_rate).max(tuning.max_jump_power);
        }
    }

    /// Launch with the held charge. Ignored unless charging.
    pub fn release_jump(&mut self) -> bool {
        let JumpPhase::Charging { charge } = self.jump else {
            return false;
        };
        self.vel = charge;
        self.jump = JumpPhase::Airborne;
        self.free_boost_ready = true;
        true
    }

    /// Switch to glide gravity. Only takes effect while airborne and falling.
    pub fn start_glide(&mut self, tuning: &PlayerTuning) -> bool {
        if self.jump != JumpPhase::Airborne || self.vel <= 0.0 || self.is_gliding() {
            return false;
        }
        self.gravity_mode = GravityMode::Gliding;
        // Ease into the glide instead of snapping to the floor speed
        if self.vel > tuning.min_glide_speed {
            self.vel = tuning.min_glide_speed + 1.0;
        }
        true
    }

    pub fn stop_glide(&mut self) {
        self.gravity_mode = GravityMode::Normal;
    }

    /// Advance one tick: charge, gravity, position, ground contact, effects, markers
    pub fn integrate(&mut self, tuning: &PlayerTuning, world: &WorldTuning, world_speed: f32) {
        self.tick_charge(tuning);

        if self.is_gliding() && self.vel > 0.0 {
            if self.vel < tuning.min_glide_speed {
                self.vel = tuning.min_glide_speed;
            } else {
                self.vel += tuning.glide_gravity;
            }
        } else {
            self.vel += tuning.gravity;
        }

        self.pos.y += self.vel;

        if let Some(effect) = &mut self.effect {
            effect.ticks_left = effect.ticks_left.saturating_sub(1);
            if effect.ticks_left == 0 {
                self.effect = None;
            }
        }

        let ground_top = world.ground_y - tuning.height;
        if self.pos.y >= ground_top {
            self.pos.y = ground_top;
            self.vel = 0.0;
            if self.jump == JumpPhase::Airborne {
                self.jump = JumpPhase::Grounded;
            }
            self.gravity_mode = GravityMode::Normal;
            self.free_boost_ready = true;
        }

        debug_assert!(self.jump == JumpPhase::Airborne || self.vel == 0.0);

        self.update_markers(tuning, world, world_speed);
    }

    /// Use the best boost available: free glide boost first, then a boost unit
    pub fn apply_boost(&mut self, tuning: &PlayerTuning, world: &WorldTuning) -> Option<BoostKind> {
        let kind = if self.is_gliding() && self.free_boost_ready {
            self.free_boost_ready = false;
            BoostKind::Free
        } else if self.boosts > 0 {
            self.boosts -= 1;
            self.markers.insert(Marker {
                pos: self.pos,
                state: MarkerState::Falling {
                    vel: tuning.marker_fall_velocity,
                },
            });
            BoostKind::Resource
        } else {
            return None;
        };

        let boost = match kind {
            BoostKind::Free => tuning.free_boost,
            BoostKind::Resource => tuning.resource_boost,
        };
        self.vel = boost.impulse;
        let max_x = (world.screen_width - tuning.width).max(tuning.start_x);
        self.pos.x = (self.pos.x + boost.forward).min(max_x);
        // A boost always lifts off; any held charge is dropped
        self.jump = JumpPhase::Airborne;
        self.effect = Some(BoostEffect {
            kind,
            ticks_left: boost.effect_ticks,
        });
        Some(kind)
    }

    fn update_markers(&mut self, tuning: &PlayerTuning, world: &WorldTuning, world_speed: f32) {
        let rest_y = world.ground_y - tuning.marker_size;
        self.markers.retain(|marker| match &mut marker.state {
            MarkerState::Falling { vel } => {
                marker.pos.y += *vel;
                *vel += tuning.marker_gravity;
                if marker.pos.y >= rest_y {
                    marker.pos.y = rest_y;
                    marker.state = MarkerState::Landed;
                }
                true
            }
            MarkerState::Landed => {
                marker.pos.x -= world_speed;
                marker.pos.x >= -tuning.marker_size
            }
        });
    }
}
