//! Render snapshot
//!
//! Immutable projection of the game produced at the end of a tick. A renderer
//! (on this thread or another) draws from it and never sees the live session.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::game::GamePhase;
use crate::sim::{BoostKind, GameSession, MarkerState, SizeClass};
use crate::tuning::Tuning;

/// Charge meter colour tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChargeTier {
    Low,
    Medium,
    High,
}

impl ChargeTier {
    pub fn from_fraction(fraction: f32) -> Self {
        if fraction < 0.33 {
            ChargeTier::Low
        } else if fraction < 0.66 {
            ChargeTier::Medium
        } else {
            ChargeTier::High
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub pos: Vec2,
    pub size: Vec2,
    /// Present only while charging
    pub charge: Option<ChargeView>,
    pub gliding: bool,
    /// Boost effect currently showing, if any
    pub boost_effect: Option<BoostKind>,
    pub boosts: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChargeView {
    /// 0.0 = weakest, 1.0 = strongest
    pub fraction: f32,
    pub tier: ChargeTier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleView {
    pub pos: Vec2,
    pub size: Vec2,
    pub class: SizeClass,
    pub alpha: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerView {
    pub pos: Vec2,
    pub landed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSnapshot {
    pub phase: GamePhase,
    pub tick: u64,
    pub score: u64,
    pub high_score: u64,
    pub world_speed: f32,
    /// Remaining fraction of the invulnerability window, if empowered
    pub empowered: Option<f32>,
    pub player: Option<PlayerView>,
    pub obstacles: Vec<ObstacleView>,
    /// Drawn position including the bobbing offset
    pub powerups: Vec<Vec2>,
    pub markers: Vec<MarkerView>,
}

impl RenderSnapshot {
    pub fn capture(
        phase: GamePhase,
        session: Option<&GameSession>,
        high_score: u64,
        tuning: &Tuning,
    ) -> Self {
        let Some(session) = session else {
            return Self {
                phase,
                tick: 0,
                score: 0,
                high_score,
                world_speed: tuning.scoring.base_world_speed,
                empowered: None,
                player: None,
                obstacles: Vec::new(),
                powerups: Vec::new(),
                markers: Vec::new(),
            };
        };

        let player = &session.player;
        let charge = player.charge_fraction(&tuning.player);
        let charging = matches!(player.jump, crate::sim::JumpPhase::Charging { .. });

        Self {
            phase,
            tick: session.tick,
            score: session.scores.score,
            high_score: high_score.max(session.scores.high_score),
            world_speed: session.world_speed,
            empowered: session.empowerment.map(|e| e.remaining_fraction()),
            player: Some(PlayerView {
                pos: player.pos,
                size: Vec2::new(tuning.player.width, tuning.player.height),
                charge: charging.then(|| ChargeView {
                    fraction: charge,
                    tier: ChargeTier::from_fraction(charge),
                }),
                gliding: player.is_gliding(),
                boost_effect: player.effect.map(|e| e.kind),
                boosts: player.boosts,
            }),
            obstacles: session
                .obstacles
                .iter()
                .map(|o| ObstacleView {
                    pos: o.pos,
                    size: o.size,
                    class: o.class,
                    alpha: o.alpha(),
                })
                .collect(),
            powerups: session
                .powerup
                .iter()
                .map(|p| p.bounds(&tuning.powerups).min)
                .collect(),
            markers: player
                .markers
                .iter()
                .map(|(_, m)| MarkerView {
                    pos: m.pos,
                    landed: m.state == MarkerState::Landed,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Game;
    use crate::sim::{Action, InputSnapshot};

    #[test]
    fn test_charge_tiers() {
        assert_eq!(ChargeTier::from_fraction(0.0), ChargeTier::Low);
        assert_eq!(ChargeTier::from_fraction(0.5), ChargeTier::Medium);
        assert_eq!(ChargeTier::from_fraction(1.0), ChargeTier::High);
    }

    #[test]
    fn test_menu_snapshot_has_no_player() {
        let game = Game::new(Tuning::default(), 1);
        let snap = game.snapshot();
        assert_eq!(snap.phase, GamePhase::Menu);
        assert!(snap.player.is_none());
        assert!(snap.obstacles.is_empty());
    }

    #[test]
    fn test_charging_is_visible() {
        let mut game = Game::new(Tuning::default(), 1);
        game.step(&InputSnapshot::press(Action::Jump));
        game.step(&InputSnapshot::press(Action::Jump));
        let snap = game.snapshot();
        let charge = snap.player.and_then(|p| p.charge).map(|c| c.fraction);
        assert!(charge.is_some_and(|f| f > 0.0 && f < 0.33));
    }

    #[test]
    fn test_snapshot_serializes_to_json() {
        let mut game = Game::new(Tuning::default(), 1);
        game.step(&InputSnapshot::press(Action::Jump));
        let json = serde_json::to_string(&game.snapshot()).unwrap();
        assert!(json.contains("\"phase\":\"Active\""));
        let back: RenderSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.phase, GamePhase::Active);
    }
}
