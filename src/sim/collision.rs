//! Collision detection and resolution
//!
//! Everything in the game is an axis-aligned box. Resolution decides what an
//! overlap means this tick: death, a struck obstacle that starts fading, or a
//! collected powerup. It also retires entities that scrolled away or faded out.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{GameEvent, GameSession};
use crate::tuning::Tuning;

/// Axis-aligned bounding box (top-left origin, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(top_left: Vec2, size: Vec2) -> Self {
        Self {
            min: top_left,
            max: top_left + size,
        }
    }

    /// Strict overlap: boxes that only share an edge do not collide
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }
}

/// What the collision pass decided for this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Survived,
    /// Unprotected hit; the session is over and the high score committed
    Fatal,
}

/// Resolve player overlaps, then retire finished entities
pub fn resolve(session: &mut GameSession, tuning: &Tuning) -> Resolution {
    let player_box = session.player.bounds(&tuning.player);
    let empowered = session.is_empowered();

    let mut fatal = false;
    for obstacle in &mut session.obstacles {
        // Fading obstacles are already destroyed
        if obstacle.is_fading() || !player_box.overlaps(&obstacle.bounds()) {
            continue;
        }
        if empowered {
            obstacle.start_fade(&tuning.obstacles);
            session.events.push(GameEvent::ObstacleStruck { id: obstacle.id });
        } else {
            fatal = true;
            break;
        }
    }

    if fatal {
        session.scores.commit();
        session.events.push(GameEvent::PlayerDied {
            score: session.scores.score,
        });
        return Resolution::Fatal;
    }

    let scoring = &tuning.scoring;
    let scores = &mut session.scores;
    let events = &mut session.events;
    session.obstacles.retain(|obstacle| {
        if obstacle.is_faded_out() || (obstacle.is_fading() && obstacle.is_off_screen()) {
            scores.award(scoring.destroy_bonus);
            events.push(GameEvent::ObstacleDestroyed { id: obstacle.id });
            false
        } else if obstacle.is_off_screen() {
            scores.award(scoring.pass_bonus);
            events.push(GameEvent::ObstaclePassed { id: obstacle.id });
            false
        } else {
            true
        }
    });

    let powerup_state = session.powerup.as_ref().map(|p| {
        (
            p.id,
            player_box.overlaps(&p.bounds(&tuning.powerups)),
            p.is_off_screen(&tuning.powerups),
        )
    });
    match powerup_state {
        Some((id, true, _)) => {
            session.powerup = None;
            session.empower(tuning);
            session.player.boosts += 1;
            session.scores.award(scoring.collect_bonus);
            session.events.push(GameEvent::PowerupCollected { id });
        }
        Some((id, false, true)) => {
            session.powerup = None;
            session.events.push(GameEvent::PowerupMissed { id });
        }
        _ => {}
    }

    Resolution::Survived
}
