//! Idle/demo mode input source
//!
//! A simple heuristic that plays the game through the same `InputSnapshot`
//! interface a keyboard would: it charges jumps in proportion to the next
//! obstacle's height, glides over obstacles while falling, and spends boosts
//! when a landing would end on top of one.

use crate::game::{Game, GamePhase};
use crate::sim::{Action, ActionSet, GameSession, InputSnapshot, JumpPhase, Obstacle};
use crate::tuning::Tuning;

/// Ticks of lead time before an obstacle reaches the player
const JUMP_LEAD_TICKS: f32 = 14.0;
/// Longest charge the autopilot will hold
const MAX_CHARGE_TICKS: u32 = 10;

#[derive(Debug, Clone, Default)]
pub struct Autopilot {
    /// Level state sent last tick, used to derive edges
    held: ActionSet,
    charge_ticks: u32,
    charge_target: u32,
}

impl Autopilot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide the input for the next tick
    pub fn next_input(&mut self, game: &Game) -> InputSnapshot {
        let want = match game.phase() {
            GamePhase::Menu => self.tap(Action::Jump),
            GamePhase::GameOver => self.tap(Action::Restart),
            GamePhase::Active => match game.session() {
                Some(session) => self.play(session, game.tuning()),
                None => ActionSet::EMPTY,
            },
        };
        let input = InputSnapshot::from_levels(self.held, want);
        self.held = want;
        input
    }

    /// Press an action, letting go for a tick first if it is already held
    fn tap(&self, action: Action) -> ActionSet {
        if self.held.contains(action) {
            ActionSet::EMPTY
        } else {
            ActionSet::EMPTY.with(action)
        }
    }

    fn play(&mut self, session: &GameSession, tuning: &Tuning) -> ActionSet {
        let mut want = ActionSet::EMPTY;
        let player = &session.player;
        let p = &tuning.player;
        let front = player.pos.x + p.width;
        let next = next_obstacle(session, player.pos.x);

        match player.jump {
            JumpPhase::Charging { .. } => {
                self.charge_ticks += 1;
                if self.charge_ticks < self.charge_target {
                    want.insert(Action::Jump);
                }
            }
            JumpPhase::Grounded => {
                // Empowered runs plough straight through
                if let Some(obstacle) = next.filter(|_| !session.is_empowered()) {
                    let distance = obstacle.pos.x - front;
                    if distance < session.world_speed * JUMP_LEAD_TICKS && !self.held.contains(Action::Jump) {
                        self.charge_ticks = 0;
                        self.charge_target = charge_ticks_for(obstacle, tuning);
                        want.insert(Action::Jump);
                    }
                }
            }
            JumpPhase::Airborne => {
                let Some(obstacle) = next else {
                    return want;
                };
                let falling = player.vel > 0.0;
                let ahead = obstacle.pos.x - front;
                let span = obstacle.pos.x + obstacle.size.x - player.pos.x;
                let over_or_near = ahead < session.world_speed * 20.0 && span > 0.0;

                if falling && over_or_near {
                    want.insert(Action::Glide);
                }

                let feet = player.pos.y + p.height;
                let obstacle_top = obstacle.pos.y;
                let about_to_land_on = falling && ahead <= 0.0 && feet > obstacle_top - 10.0;
                if about_to_land_on && !session.is_empowered() {
                    want.insert(Action::Boost);
                    // Re-arm the edge if boost was held last tick
                    if self.held.contains(Action::Boost) {
                        want.remove(Action::Boost);
                    }
                }
            }
        }

        want
    }
}

/// First solid obstacle the player has not fully passed
fn next_obstacle(session: &GameSession, player_x: f32) -> Option<&Obstacle> {
    session
        .obstacles
        .iter()
        .filter(|o| !o.is_fading() && o.pos.x + o.size.x > player_x)
        .min_by(|a, b| a.pos.x.total_cmp(&b.pos.x))
}

/// Taller obstacles get a longer charge
fn charge_ticks_for(obstacle: &Obstacle, tuning: &Tuning) -> u32 {
    let shortest = tuning.obstacles.small.height.0 as f32 * tuning.obstacles.wide_height_scale;
    let tallest = tuning.obstacles.extra_large.height.1 as f32;
    let t = ((obstacle.size.y - shortest) / (tallest - shortest).max(1.0)).clamp(0.0, 1.0);
    (t * MAX_CHARGE_TICKS as f32).round() as u32 + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SizeClass;
    use glam::Vec2;

    #[test]
    fn test_starts_game_from_menu() {
        let mut game = Game::new(Tuning::default(), 3);
        let mut pilot = Autopilot::new();
        let input = pilot.next_input(&game);
        assert!(input.was_pressed(Action::Jump));
        game.step(&input);
        assert_eq!(game.phase(), GamePhase::Active);
    }

    #[test]
    fn test_charges_for_incoming_obstacle() {
        let mut game = Game::new(Tuning::default(), 3);
        game.step(&InputSnapshot::press(Action::Jump));
        let world = game.tuning().world.clone();
        if let Some(session) = game.session_mut() {
            let id = session.next_entity_id();
            let x = session.player.pos.x + 60.0;
            session
                .obstacles
                .push(Obstacle::new(id, SizeClass::Large, Vec2::new(50.0, 80.0), x, 5.0, &world));
        }
        let mut pilot = Autopilot::new();
        let input = pilot.next_input(&game);
        assert!(input.was_pressed(Action::Jump));
    }

    #[test]
    fn test_taller_obstacles_get_longer_charge() {
        let tuning = Tuning::default();
        let world = tuning.world.clone();
        let short = Obstacle::new(1, SizeClass::Small, Vec2::new(20.0, 40.0), 0.0, 5.0, &world);
        let tall = Obstacle::new(2, SizeClass::ExtraLarge, Vec2::new(60.0, 110.0), 0.0, 5.0, &world);
        assert!(charge_ticks_for(&tall, &tuning) > charge_ticks_for(&short, &tuning));
        assert!(charge_ticks_for(&tall, &tuning) <= MAX_CHARGE_TICKS + 1);
    }

    #[test]
    fn test_demo_run_is_deterministic() {
        let play = || {
            let mut game = Game::new(Tuning::default(), 77);
            let mut pilot = Autopilot::new();
            for _ in 0..3000 {
                let input = pilot.next_input(&game);
                game.step(&input);
            }
            (game.runs(), game.high_score(), game.snapshot().score)
        };
        assert_eq!(play(), play());
    }
}
