//! Fixed timestep simulation tick
//!
//! Advances an active session by exactly one logical tick. The order is fixed:
//! input routing, empowerment countdown, player physics, entity scrolling,
//! spawning (obstacles before powerups), collision resolution, world speed.
//! Spawn rolls therefore see the score as it stood before this tick's bonuses.

use serde::{Deserialize, Serialize};

use super::collision::{self, Resolution};
use super::state::{GameEvent, GameSession};
use crate::tuning::Tuning;

/// Control actions a player can assert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Press starts a charge, release launches; also starts a run from the menu
    Jump,
    /// Level-triggered: glide while held
    Glide,
    Boost,
    Restart,
    /// Back to the menu while playing, exit otherwise
    Quit,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::Jump,
        Action::Glide,
        Action::Boost,
        Action::Restart,
        Action::Quit,
    ];

    fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// Small copyable set of actions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionSet(u8);

impl ActionSet {
    pub const EMPTY: ActionSet = ActionSet(0);

    pub fn insert(&mut self, action: Action) {
        self.0 |= action.bit();
    }

    pub fn remove(&mut self, action: Action) {
        self.0 &= !action.bit();
    }

    pub fn with(mut self, action: Action) -> Self {
        self.insert(action);
        self
    }

    pub fn contains(self, action: Action) -> bool {
        self.0 & action.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Actions in `self` but not in `other`
    pub fn difference(self, other: ActionSet) -> ActionSet {
        ActionSet(self.0 & !other.0)
    }

    pub fn iter(self) -> impl Iterator<Item = Action> {
        Action::ALL.into_iter().filter(move |a| self.contains(*a))
    }
}

impl FromIterator<Action> for ActionSet {
    fn from_iter<I: IntoIterator<Item = Action>>(iter: I) -> Self {
        let mut set = ActionSet::EMPTY;
        for action in iter {
            set.insert(action);
        }
        set
    }
}

/// Polled input for one tick: level state plus this tick's edges
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSnapshot {
    pub held: ActionSet,
    pub pressed: ActionSet,
    pub released: ActionSet,
}

impl InputSnapshot {
    /// Derive edges from the previous and current level samples
    pub fn from_levels(previous: ActionSet, current: ActionSet) -> Self {
        Self {
            held: current,
            pressed: current.difference(previous),
            released: previous.difference(current),
        }
    }

    /// A single press edge (action held this tick)
    pub fn press(action: Action) -> Self {
        let set = ActionSet::EMPTY.with(action);
        Self {
            held: set,
            pressed: set,
            released: ActionSet::EMPTY,
        }
    }

    /// A single release edge
    pub fn release(action: Action) -> Self {
        Self {
            held: ActionSet::EMPTY,
            pressed: ActionSet::EMPTY,
            released: ActionSet::EMPTY.with(action),
        }
    }

    /// Action held with no edge this tick
    pub fn hold(action: Action) -> Self {
        Self {
            held: ActionSet::EMPTY.with(action),
            ..Default::default()
        }
    }

    pub fn is_held(&self, action: Action) -> bool {
        self.held.contains(action)
    }

    pub fn was_pressed(&self, action: Action) -> bool {
        self.pressed.contains(action)
    }

    pub fn was_released(&self, action: Action) -> bool {
        self.released.contains(action)
    }
}

/// Advance an active session by one tick
pub fn tick(session: &mut GameSession, input: &InputSnapshot, tuning: &Tuning) -> Resolution {
    session.tick += 1;
    route_input(session, input, tuning);

    session.tick_empowerment();

    let world_speed = session.world_speed;
    session
        .player
        .integrate(&tuning.player, &tuning.world, world_speed);

    for obstacle in &mut session.obstacles {
        obstacle.advance(&tuning.obstacles);
    }
    if let Some(powerup) = &mut session.powerup {
        powerup.advance(&tuning.powerups, session.tick);
    }

    session.spawn_entities(tuning);

    if collision::resolve(session, tuning) == Resolution::Fatal {
        log::info!(
            "Player died at tick {} with score {}",
            session.tick,
            session.scores.score
        );
        return Resolution::Fatal;
    }

    session.update_world_speed(tuning);

    log::trace!(
        "tick {} y={:.1} vel={:.2} obstacles={} speed={}",
        session.tick,
        session.player.pos.y,
        session.player.vel,
        session.obstacles.len(),
        session.world_speed
    );

    Resolution::Survived
}

fn route_input(session: &mut GameSession, input: &InputSnapshot, tuning: &Tuning) {
    let player = &mut session.player;

    if input.was_pressed(Action::Jump) {
        player.start_charge(&tuning.player);
    }
    if input.was_released(Action::Jump) {
        let power = player.charge();
        if player.release_jump() {
            session.events.push(GameEvent::Jumped { power });
        }
    }

    if input.is_held(Action::Glide) {
        player.start_glide(&tuning.player);
    } else if player.is_gliding() {
        player.stop_glide();
    }

    if input.was_pressed(Action::Boost) {
        if let Some(kind) = player.apply_boost(&tuning.player, &tuning.world) {
            session.events.push(GameEvent::Boosted { kind });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::player::{BoostKind, JumpPhase};

    fn quiet_tuning() -> Tuning {
        // No random spawns so tests control the field
        let mut tuning = Tuning::default();
        tuning.spawn.obstacle_chance = 0.0;
        tuning.spawn.obstacle_chance_per_point = 0.0;
        tuning.spawn.powerup_chance = 0.0;
        tuning.spawn.powerup_chance_floor = 0.0;
        tuning
    }

    #[test]
    fn test_action_set() {
        let set: ActionSet = [Action::Jump, Action::Boost].into_iter().collect();
        assert!(set.contains(Action::Jump));
        assert!(set.contains(Action::Boost));
        assert!(!set.contains(Action::Glide));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![Action::Jump, Action::Boost]);

        let mut set = set;
        set.remove(Action::Jump);
        assert_eq!(set, ActionSet::EMPTY.with(Action::Boost));
    }

    #[test]
    fn test_edges_from_levels() {
        let before = ActionSet::EMPTY.with(Action::Jump).with(Action::Glide);
        let now = ActionSet::EMPTY.with(Action::Glide).with(Action::Boost);
        let input = InputSnapshot::from_levels(before, now);
        assert!(input.was_pressed(Action::Boost));
        assert!(input.was_released(Action::Jump));
        assert!(input.is_held(Action::Glide));
        assert!(!input.was_pressed(Action::Glide));
    }

    #[test]
    fn test_charge_and_release_through_input() {
        let tuning = quiet_tuning();
        let mut s = GameSession::new(&tuning, 1, 0);

        tick(&mut s, &InputSnapshot::press(Action::Jump), &tuning);
        assert!(matches!(s.player.jump, JumpPhase::Charging { .. }));
        for _ in 0..5 {
            tick(&mut s, &InputSnapshot::hold(Action::Jump), &tuning);
        }
        let charge = s.player.charge();
        tick(&mut s, &InputSnapshot::release(Action::Jump), &tuning);
        assert_eq!(s.player.jump, JumpPhase::Airborne);
        assert_eq!(s.drain_events(), vec![GameEvent::Jumped { power: charge }]);
        assert!(s.player.pos.y < tuning.world.ground_y - tuning.player.height);
    }

    #[test]
    fn test_glide_follows_held_level() {
        let tuning = quiet_tuning();
        let mut s = GameSession::new(&tuning, 1, 0);
        tick(&mut s, &InputSnapshot::press(Action::Jump), &tuning);
        tick(&mut s, &InputSnapshot::release(Action::Jump), &tuning);

        // Held from the start: glide engages once the player starts falling
        let mut engaged = false;
        for _ in 0..60 {
            tick(&mut s, &InputSnapshot::hold(Action::Glide), &tuning);
            if s.player.is_gliding() {
                engaged = true;
                break;
            }
        }
        assert!(engaged);
        tick(&mut s, &InputSnapshot::default(), &tuning);
        assert!(!s.player.is_gliding());
    }

    #[test]
    fn test_boost_event() {
        let tuning = quiet_tuning();
        let mut s = GameSession::new(&tuning, 1, 0);
        s.player.boosts = 1;
        tick(&mut s, &InputSnapshot::press(Action::Boost), &tuning);
        assert_eq!(
            s.drain_events(),
            vec![GameEvent::Boosted {
                kind: BoostKind::Resource
            }]
        );
        assert_eq!(s.player.boosts, 0);
    }

    #[test]
    fn test_obstacles_scroll_at_world_speed() {
        let tuning = quiet_tuning();
        let mut s = GameSession::new(&tuning, 1, 0);
        let id = s.next_entity_id();
        s.obstacles.push(crate::sim::entities::Obstacle::new(
            id,
            crate::sim::entities::SizeClass::Small,
            glam::Vec2::new(20.0, 40.0),
            600.0,
            s.world_speed,
            &tuning.world,
        ));
        tick(&mut s, &InputSnapshot::default(), &tuning);
        assert_eq!(s.obstacles[0].pos.x, 600.0 - tuning.scoring.base_world_speed);
    }

    #[test]
    fn test_spawn_roll_sees_score_before_this_ticks_bonus() {
        // Obstacles spawn with certainty from 10 points up, never below
        let mut tuning = quiet_tuning();
        tuning.spawn.obstacle_chance_per_point = 0.1;
        tuning.spawn.obstacle_chance_cap = 1.0;
        tuning.spawn.group_chance = 0.0;
        tuning.spawn.group_chance_floor = 0.0;
        let mut s = GameSession::new(&tuning, 1, 0);

        // About to scroll off-screen for a pass bonus
        let id = s.next_entity_id();
        let obstacle = crate::sim::entities::Obstacle::new(
            id,
            crate::sim::entities::SizeClass::Small,
            glam::Vec2::new(20.0, 40.0),
            -20.0,
            s.world_speed,
            &tuning.world,
        );
        s.obstacles.push(obstacle);

        tick(&mut s, &InputSnapshot::default(), &tuning);
        let events = s.drain_events();
        assert!(events.contains(&GameEvent::ObstaclePassed { id }));
        assert_eq!(s.scores.score, tuning.scoring.pass_bonus);
        assert!(s.obstacles.is_empty());

        tick(&mut s, &InputSnapshot::default(), &tuning);
        assert_eq!(s.drain_events(), vec![GameEvent::ObstaclesSpawned { count: 1 }]);
        assert_eq!(s.obstacles.len(), 1);
    }

    #[test]
    fn test_determinism() {
        // Two sessions with same seed and inputs should produce identical results
        let tuning = Tuning::default();
        let mut s1 = GameSession::new(&tuning, 99999, 0);
        let mut s2 = GameSession::new(&tuning, 99999, 0);

        let inputs = [
            InputSnapshot::press(Action::Jump),
            InputSnapshot::hold(Action::Jump),
            InputSnapshot::release(Action::Jump),
            InputSnapshot::hold(Action::Glide),
            InputSnapshot::default(),
        ];

        for i in 0..400 {
            let input = &inputs[i % inputs.len()];
            let r1 = tick(&mut s1, input, &tuning);
            let r2 = tick(&mut s2, input, &tuning);
            assert_eq!(r1, r2);
            if r1 == Resolution::Fatal {
                break;
            }
        }

        assert_eq!(s1.tick, s2.tick);
        assert_eq!(s1.scores, s2.scores);
        assert_eq!(s1.obstacles.len(), s2.obstacles.len());
        assert_eq!(s1.player.pos, s2.player.pos);
    }
}
