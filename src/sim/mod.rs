//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod entities;
pub mod player;
pub mod pool;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{Aabb, Resolution, resolve};
pub use entities::{Fade, Obstacle, Powerup, PowerupBand, SizeClass};
pub use player::{BoostEffect, BoostKind, GravityMode, JumpPhase, Marker, MarkerState, Player};
pub use pool::Pool;
pub use spawn::SpawnDirector;
pub use state::{Empowerment, GameEvent, GameSession, ScoreTracker, world_speed_for};
pub use tick::{Action, ActionSet, InputSnapshot, tick};
