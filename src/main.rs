//! Dino Dash entry point
//!
//! Runs the game headless at a fixed 60 Hz with the autopilot at the
//! controls. A renderer can attach by consuming the JSON snapshot stream.

use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;
use dino_dash::autopilot::Autopilot;
use dino_dash::consts::TICKS_PER_SECOND;
use dino_dash::sim::{Action, GameEvent};
use dino_dash::{Flow, Game, GamePhase, Tuning};

/// Headless runner: the autopilot plays, snapshots optionally go to stdout
#[derive(Parser, Debug)]
#[command(name = "dino-dash", version)]
#[command(about = "Deterministic side-scrolling runner driven by the autopilot")]
struct Options {
    /// Game seed; each run mixes in its run number
    #[arg(long, default_value_t = 0xD1_5EED)]
    seed: u64,
    /// Stop after this many ticks (0 = no limit)
    #[arg(long, default_value_t = 0)]
    ticks: u64,
    /// Quit after this many finished runs
    #[arg(long, default_value_t = 3)]
    runs: u64,
    /// JSON balance sheet overriding the defaults
    #[arg(long)]
    tuning: Option<PathBuf>,
    /// Run as fast as possible instead of at 60 ticks per second
    #[arg(long)]
    fast: bool,
    /// Write one JSON render snapshot per tick to stdout
    #[arg(long)]
    json: bool,
}

/// Blocks until the next tick deadline
struct TickPacer {
    period: Duration,
    next: Instant,
}

impl TickPacer {
    fn new(ticks_per_second: u32) -> Self {
        let period = Duration::from_secs(1) / ticks_per_second;
        Self {
            period,
            next: Instant::now() + period,
        }
    }

    fn wait(&mut self) {
        let now = Instant::now();
        if let Some(remaining) = self.next.checked_duration_since(now) {
            std::thread::sleep(remaining);
            self.next += self.period;
        } else {
            // Fell behind; resync instead of bursting to catch up
            self.next = now + self.period;
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let options = Options::parse();

    let tuning = match &options.tuning {
        Some(path) => match Tuning::load(path) {
            Ok(tuning) => tuning,
            Err(err) => {
                log::error!("{err}");
                return ExitCode::FAILURE;
            }
        },
        None => Tuning::default(),
    };

    log::info!("Dino Dash starting (seed {})", options.seed);
    match run(&options, tuning) {
        Ok(best) => {
            log::info!("Best score this session: {best}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("Snapshot output failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(options: &Options, tuning: Tuning) -> io::Result<u64> {
    let mut game = Game::new(tuning, options.seed);
    let mut pilot = Autopilot::new();
    let mut pacer = TickPacer::new(TICKS_PER_SECOND);
    let mut out = BufWriter::new(io::stdout().lock());
    let mut finished_runs = 0;
    let mut ticks = 0u64;

    loop {
        let mut input = pilot.next_input(&game);
        if game.phase() == GamePhase::GameOver && finished_runs >= options.runs {
            input.pressed.insert(Action::Quit);
        }

        let before = game.phase();
        if game.step(&input) == Flow::Exit {
            break;
        }
        if before == GamePhase::Active && game.phase() == GamePhase::GameOver {
            finished_runs += 1;
        }

        for event in game.drain_events() {
            log_event(&event);
        }

        if options.json {
            serde_json::to_writer(&mut out, &game.snapshot())?;
            out.write_all(b"\n")?;
        }

        ticks += 1;
        if options.ticks > 0 && ticks >= options.ticks {
            log::info!("Tick limit {} reached", options.ticks);
            break;
        }
        if !options.fast {
            pacer.wait();
        }
    }

    out.flush()?;
    Ok(game.high_score())
}

fn log_event(event: &GameEvent) {
    match event {
        GameEvent::PlayerDied { score } => log::info!("Player died with score {score}"),
        GameEvent::PowerupCollected { id } => log::info!("Powerup {id} collected"),
        GameEvent::EmpowermentExpired => log::info!("Empowerment expired"),
        other => log::debug!("{other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Options::command().debug_assert();
    }

    #[test]
    fn test_cli_defaults() {
        let options = Options::parse_from(["dino-dash"]);
        assert_eq!(options.seed, 0xD1_5EED);
        assert_eq!(options.ticks, 0);
        assert_eq!(options.runs, 3);
        assert!(options.tuning.is_none());
        assert!(!options.fast && !options.json);
    }

    #[test]
    fn test_cli_overrides() {
        let options = Options::parse_from([
            "dino-dash", "--seed", "7", "--runs", "1", "--tuning", "balance.json", "--fast", "--json",
        ]);
        assert_eq!(options.seed, 7);
        assert_eq!(options.runs, 1);
        assert_eq!(options.tuning, Some(PathBuf::from("balance.json")));
        assert!(options.fast && options.json);
    }

    #[test]
    fn test_cli_rejects_bad_seed() {
        assert!(Options::try_parse_from(["dino-dash", "--seed", "abc"]).is_err());
    }
}
