#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Game progression system reacting to where the player ends up.
//!
//! The world only reports that a move landed on a tile. This system decides
//! what that means for the game: it opens the way out of the start area when
//! play begins, tells the player how to use the rune once it is collected,
//! and plays the ending once the prison tile is reached.

use std::time::Duration;

use squirm_core::{Command, Cue, Event, TilePos};
use tracing::info;

const START_DOOR: TilePos = TilePos::new(7, 12);
const PRISON_TILE: TilePos = TilePos::new(0, 1);
const ENDING_VOICE_DELAY: Duration = Duration::from_secs(4);
const ENDING_MUSIC_DELAY: Duration = Duration::from_secs(8);

/// Notice shown once the rune has been picked up.
pub const RUNE_NOTICE: &str = "Press `E` to use the Rune when not moving";

/// Coarse phase of a play session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GamePhase {
    /// Waiting on the title screen.
    Title,
    /// The player is exploring the level.
    Playing,
    /// The player reached the prison and the ending runs.
    Ended,
}

/// Presentation-side effects requested by the progression system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Signal {
    /// The session moved to a new phase.
    PhaseChanged(GamePhase),
    /// A message should be shown to the player.
    Notice(&'static str),
    /// The rune pickup should disappear from the scene.
    HideRune,
    /// Background music should stop.
    StopMusic,
    /// A cue should be played right away.
    PlayCue(Cue),
    /// The ending theme should start.
    StartEndMusic,
}

/// Pure system tracking the session phase.
#[derive(Debug)]
pub struct Progression {
    phase: GamePhase,
    now: Duration,
    rune_hidden: bool,
    ending: Vec<(Duration, Signal)>,
}

impl Default for Progression {
    fn default() -> Self {
        Self {
            phase: GamePhase::Title,
            now: Duration::ZERO,
            rune_hidden: false,
            ending: Vec::new(),
        }
    }
}

impl Progression {
    /// Creates a progression tracker sitting on the title screen.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase of the session.
    #[must_use]
    pub const fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Whether the rune pickup has been hidden.
    #[must_use]
    pub const fn rune_hidden(&self) -> bool {
        self.rune_hidden
    }

    /// Leaves the title screen and opens the start door; ignored once playing.
    pub fn begin(&mut self, commands: &mut Vec<Command>, signals: &mut Vec<Signal>) {
        if self.phase != GamePhase::Title {
            return;
        }
        self.set_phase(GamePhase::Playing, signals);
        commands.push(Command::OpenDoor { tile: START_DOOR });
    }

    /// Consumes world events and emits the resulting presentation signals.
    pub fn handle(&mut self, events: &[Event], signals: &mut Vec<Signal>) {
        for event in events {
            match event {
                Event::TimeAdvanced { now, .. } => {
                    self.now = *now;
                    self.release(signals);
                }
                Event::RuneFound { .. } if !self.rune_hidden => {
                    self.rune_hidden = true;
                    signals.push(Signal::HideRune);
                    signals.push(Signal::Notice(RUNE_NOTICE));
                }
                Event::PositionReached { tile } if *tile == PRISON_TILE => {
                    if self.phase != GamePhase::Ended {
                        self.end(signals);
                    }
                }
                _ => {}
            }
        }
    }

    fn end(&mut self, signals: &mut Vec<Signal>) {
        self.set_phase(GamePhase::Ended, signals);
        signals.push(Signal::StopMusic);
        self.ending.push((
            self.now.saturating_add(ENDING_VOICE_DELAY),
            Signal::PlayCue(Cue::Insane),
        ));
        self.ending.push((
            self.now.saturating_add(ENDING_MUSIC_DELAY),
            Signal::StartEndMusic,
        ));
    }

    fn set_phase(&mut self, phase: GamePhase, signals: &mut Vec<Signal>) {
        info!(from = ?self.phase, to = ?phase, "game phase changed");
        self.phase = phase;
        signals.push(Signal::PhaseChanged(phase));
    }

    fn release(&mut self, signals: &mut Vec<Signal>) {
        let now = self.now;
        self.ending.retain(|(due, signal)| {
            if *due <= now {
                signals.push(*signal);
                false
            } else {
                true
            }
        });
    }
}
