//! Game lifecycle: menu, active run, game over
//!
//! Only the `Active` phase runs the simulation pipeline. `Menu` and
//! `GameOver` just route input. The best score lives here for the whole
//! process and is only raised when a run ends in death.

use serde::{Deserialize, Serialize};

use crate::sim::{Action, GameEvent, GameSession, InputSnapshot, Resolution, tick};
use crate::snapshot::RenderSnapshot;
use crate::tuning::Tuning;

/// Current lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, no session
    Menu,
    /// A run is being simulated
    Active,
    /// Run ended; the final session is kept frozen for display
    GameOver,
}

/// Whether the loop should keep going
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

#[derive(Debug, Clone)]
pub struct Game {
    tuning: Tuning,
    phase: GamePhase,
    session: Option<GameSession>,
    high_score: u64,
    seed: u64,
    runs: u64,
}

impl Game {
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        Self {
            tuning,
            phase: GamePhase::Menu,
            session: None,
            high_score: 0,
            seed,
            runs: 0,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn session(&self) -> Option<&GameSession> {
        self.session.as_ref()
    }

    /// Direct access for scripted setups (tests, demos)
    pub fn session_mut(&mut self) -> Option<&mut GameSession> {
        self.session.as_mut()
    }

    pub fn high_score(&self) -> u64 {
        self.high_score
    }

    /// Sessions started so far
    pub fn runs(&self) -> u64 {
        self.runs
    }

    /// Process one logical tick of input
    pub fn step(&mut self, input: &InputSnapshot) -> Flow {
        match self.phase {
            GamePhase::Menu => {
                if input.was_pressed(Action::Quit) {
                    log::info!("Quit from menu");
                    return Flow::Exit;
                }
                if input.was_pressed(Action::Jump) {
                    self.start_session();
                }
            }
            GamePhase::Active => {
                if input.was_pressed(Action::Quit) {
                    self.return_to_menu();
                    return Flow::Continue;
                }
                let Some(session) = self.session.as_mut() else {
                    // Active always has a session; recover by going back to the menu
                    log::warn!("Active phase without a session");
                    self.phase = GamePhase::Menu;
                    return Flow::Continue;
                };
                if tick(session, input, &self.tuning) == Resolution::Fatal {
                    self.high_score = self.high_score.max(session.scores.high_score);
                    self.phase = GamePhase::GameOver;
                    log::info!(
                        "Game over: score {}, best {}",
                        session.scores.score,
                        self.high_score
                    );
                }
            }
            GamePhase::GameOver => {
                if input.was_pressed(Action::Quit) {
                    log::info!("Quit from game over");
                    return Flow::Exit;
                }
                if input.was_pressed(Action::Restart) {
                    self.start_session();
                }
            }
        }
        Flow::Continue
    }

    /// Events raised by the current session since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.session
            .as_mut()
            .map(GameSession::drain_events)
            .unwrap_or_default()
    }

    /// Read-only projection for the renderer
    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot::capture(self.phase, self.session.as_ref(), self.high_score, &self.tuning)
    }

    fn start_session(&mut self) {
        self.runs += 1;
        let seed = self
            .seed
            .wrapping_add(self.runs.wrapping_mul(0x9E37_79B9_7F4A_7C15));
        self.session = Some(GameSession::new(&self.tuning, seed, self.high_score));
        self.phase = GamePhase::Active;
        log::info!("Run {} started (seed {}, best {})", self.runs, seed, self.high_score);
    }

    fn return_to_menu(&mut self) {
        // Not a death: the score is dropped without touching the best score
        if let Some(session) = self.session.take() {
            log::info!("Back to menu, discarding run at score {}", session.scores.score);
        }
        self.phase = GamePhase::Menu;
    }
}
