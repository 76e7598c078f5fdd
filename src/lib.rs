//! Dino Dash - a side-scrolling obstacle-avoidance arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (player physics, entities, spawning, collisions)
//! - `game`: Menu / active / game-over lifecycle driving the simulation
//! - `snapshot`: Read-only render projection handed to an external renderer
//! - `tuning`: Data-driven game balance
//! - `autopilot`: Heuristic input source for demo/idle play

pub mod autopilot;
pub mod error;
pub mod game;
pub mod sim;
pub mod snapshot;
pub mod tuning;

pub use error::TuningError;
pub use game::{Flow, Game, GamePhase};
pub use snapshot::RenderSnapshot;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Logical tick rate of the simulation
    pub const TICKS_PER_SECOND: u32 = 60;

    /// Right edge of the playfield
    pub const SCREEN_WIDTH: f32 = 800.0;
    /// Y coordinate of the ground line (screen coordinates, y grows downward)
    pub const GROUND_Y: f32 = 360.0;
}
