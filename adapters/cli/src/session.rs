//! Headless play session wiring the world to the pure systems.

use std::{fmt, time::Duration};

use anyhow::{ensure, Context, Result};
use glam::Vec3;
use serde::Serialize;
use squirm_core::{
    Command, CueSink, Direction, Event, LevelLayout, ModeRejection, Scene, Stature, TilePos,
};
use squirm_system_controls::{bend_from_pointer, Controls, Key, KeyboardLayout};
use squirm_system_cues::{CueScheduler, SampleSink, VoiceGender, VoicedSink};
use squirm_system_progression::{GamePhase, Progression, Signal};
use squirm_world::{self as world, query, SceneGraph, TileGrid, World};
use tracing::{debug, info};

use crate::script::Step;

/// Audio backend stand-in that logs every sample it is asked to play.
#[derive(Debug, Default)]
struct LoggingSink {
    played: Vec<&'static str>,
}

impl SampleSink for LoggingSink {
    fn play_sample(&mut self, sample: &'static str) {
        info!(sample, "cue");
        self.played.push(sample);
    }
}

/// Drives one level with scripted input at a fixed frame length.
#[derive(Debug)]
pub(crate) struct Session {
    world: World,
    scene: SceneGraph,
    controls: Controls,
    cues: CueScheduler,
    progression: Progression,
    sink: VoicedSink<LoggingSink>,
    frame: Duration,
    frames: u64,
    held: Vec<Key>,
    notices: Vec<&'static str>,
    refusals: usize,
    rune_visible: bool,
}

impl Session {
    /// Loads the layout into a fresh world.
    pub(crate) fn new(
        layout: LevelLayout,
        keyboard: KeyboardLayout,
        voice: VoiceGender,
        frame: Duration,
    ) -> Result<Self> {
        ensure!(!frame.is_zero(), "frame length must be positive");
        let _ = TileGrid::from_layout(&layout).context("level layout is invalid")?;

        let mut scene = SceneGraph::new();
        let player = scene.make_entity(Vec3::ZERO, Vec3::ONE);
        let mut world = World::new(player);
        let debris = layout.debris.clone();
        world.set_entry_rule(move |tile, stature| {
            stature == Stature::Full || !debris.contains(&tile)
        });

        let rune_visible = layout.rune.is_some();
        let mut events = Vec::new();
        world::apply(&mut world, &mut scene, Command::LoadLevel { layout }, &mut events);
        ensure!(
            events
                .iter()
                .any(|event| matches!(event, Event::LevelLoaded { .. })),
            "level could not be loaded"
        );

        Ok(Self {
            world,
            scene,
            controls: Controls::new(keyboard),
            cues: CueScheduler::new(),
            progression: Progression::new(),
            sink: VoicedSink::new(voice, LoggingSink::default()),
            frame,
            frames: 0,
            held: Vec::new(),
            notices: Vec::new(),
            refusals: 0,
            rune_visible,
        })
    }

    /// Replays the script step by step.
    pub(crate) fn run(&mut self, steps: &[Step]) {
        for step in steps {
            match step {
                Step::Begin => self.begin(),
                Step::Hold { keys, duration } => {
                    self.held.clone_from(keys);
                    self.advance(*duration);
                    self.held.clear();
                }
                Step::Wait(duration) => self.advance(*duration),
                Step::Bend(offset) => {
                    let bend = bend_from_pointer(*offset);
                    self.send(vec![Command::SetBend { bend }]);
                }
            }
        }
    }

    fn begin(&mut self) {
        let mut commands = Vec::new();
        let mut signals = Vec::new();
        self.progression.begin(&mut commands, &mut signals);
        self.present(signals);
        self.send(commands);
    }

    fn advance(&mut self, duration: Duration) {
        let frame_ms = self.frame.as_millis().max(1);
        let frames = duration.as_millis().div_ceil(frame_ms);
        for _ in 0..frames {
            self.step_frame();
        }
    }

    fn step_frame(&mut self) {
        let is_small = query::player(&self.world).is_small();
        let mut commands = Vec::new();
        self.controls.handle(&self.held, is_small, &mut commands);
        commands.push(Command::Tick { dt: self.frame });
        self.send(commands);
        self.frames += 1;
    }

    fn send(&mut self, commands: Vec<Command>) {
        let mut events = Vec::new();
        for command in commands {
            world::apply(&mut self.world, &mut self.scene, command, &mut events);
        }
        for event in &events {
            self.observe(event);
        }

        self.cues.handle(&events, &mut self.sink);
        let mut signals = Vec::new();
        self.progression.handle(&events, &mut signals);
        self.present(signals);
    }

    fn observe(&mut self, event: &Event) {
        match event {
            Event::ModeRejected { reason, .. } if *reason != ModeRejection::Busy => {
                self.refusals += 1;
                debug!(?reason, "request refused");
            }
            Event::PositionReached { tile } => info!(x = tile.x(), z = tile.z(), "reached tile"),
            Event::StatureChanged { stature } => info!(?stature, "stature changed"),
            Event::DoorOpened { tile } => info!(x = tile.x(), z = tile.z(), "door opened"),
            Event::DoorClosed { tile } => info!(x = tile.x(), z = tile.z(), "door closed"),
            _ => {}
        }
    }

    fn present(&mut self, signals: Vec<Signal>) {
        for signal in signals {
            match signal {
                Signal::PhaseChanged(phase) => info!(?phase, "phase"),
                Signal::Notice(text) => {
                    info!(notice = text, "notice");
                    self.notices.push(text);
                }
                Signal::HideRune => self.rune_visible = false,
                Signal::StopMusic => info!("music stopped"),
                Signal::StartEndMusic => info!("ending music started"),
                Signal::PlayCue(cue) => self.sink.play_cue(cue),
            }
        }
    }

    /// Snapshot of where the session ended up.
    pub(crate) fn summary(&self) -> Summary {
        let player = query::player(&self.world);
        let doors = query::doors(&self.world)
            .map(|doors| {
                doors
                    .iter()
                    .map(|door| DoorState {
                        tile: door.tile(),
                        closed: door.is_closed(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Summary {
            frames: self.frames,
            elapsed_ms: u64::try_from(query::clock(&self.world).as_millis()).unwrap_or(u64::MAX),
            keyboard: self.controls.layout(),
            voice: self.sink.voice(),
            phase: phase_name(self.progression.phase()),
            tile: player.position(),
            facing: player.facing(),
            stature: player.stature(),
            has_rune: player.has_rune(),
            rune_visible: self.rune_visible,
            cues: self.sink.backend().played.clone(),
            notices: self.notices.clone(),
            refusals: self.refusals,
            doors,
        }
    }
}

const fn phase_name(phase: GamePhase) -> &'static str {
    match phase {
        GamePhase::Title => "title",
        GamePhase::Playing => "playing",
        GamePhase::Ended => "ended",
    }
}

/// Door state reported in the summary.
#[derive(Clone, Copy, Debug, Serialize)]
pub(crate) struct DoorState {
    tile: TilePos,
    closed: bool,
}

/// End-of-run report printed by the driver.
#[derive(Clone, Debug, Serialize)]
pub(crate) struct Summary {
    frames: u64,
    elapsed_ms: u64,
    keyboard: KeyboardLayout,
    voice: VoiceGender,
    phase: &'static str,
    tile: TilePos,
    facing: Direction,
    stature: Stature,
    has_rune: bool,
    rune_visible: bool,
    cues: Vec<&'static str>,
    notices: Vec<&'static str>,
    refusals: usize,
    doors: Vec<DoorState>,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} frames, {} ms, phase {}, {:?} voice",
            self.frames, self.elapsed_ms, self.phase, self.voice
        )?;
        writeln!(
            f,
            "player at ({}, {}) facing {:?}, {:?}, rune {}",
            self.tile.x(),
            self.tile.z(),
            self.facing,
            self.stature,
            if self.has_rune { "held" } else { "missing" }
        )?;
        for door in &self.doors {
            writeln!(
                f,
                "door ({}, {}) {}",
                door.tile.x(),
                door.tile.z(),
                if door.closed { "closed" } else { "open" }
            )?;
        }
        for notice in &self.notices {
            writeln!(f, "notice: {notice}")?;
        }
        write!(
            f,
            "{} cues played, {} requests refused",
            self.cues.len(),
            self.refusals
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::parse_script;
    use squirm_core::Cue;
    use squirm_world::parse_layout;

    fn bundled_session() -> Session {
        session_with_voice(VoiceGender::Female)
    }

    fn session_with_voice(voice: VoiceGender) -> Session {
        let layout = parse_layout(crate::BUNDLED_LEVEL).expect("bundled level parses");
        Session::new(layout, KeyboardLayout::Qwerty, voice, Duration::from_millis(16))
            .expect("session starts")
    }

    #[test]
    fn bundled_level_starts_in_the_sealed_room() {
        let session = bundled_session();
        let summary = session.summary();
        assert_eq!(summary.tile, TilePos::new(7, 14));
        assert_eq!(summary.phase, "title");
        assert!(summary.rune_visible);
        assert!(summary
            .doors
            .iter()
            .any(|door| door.tile == TilePos::new(7, 12) && door.closed));
    }

    #[test]
    fn walls_refuse_without_moving() {
        let mut session = bundled_session();
        let steps = parse_script("begin\nhold s 800\n").expect("script parses");
        session.run(&steps);
        let summary = session.summary();
        assert_eq!(summary.tile, TilePos::new(7, 14));
        assert_eq!(summary.facing, Direction::North);
        assert_eq!(summary.refusals, 50);
    }

    #[test]
    fn opening_script_reaches_the_crawlway() {
        let mut session = bundled_session();
        let steps = parse_script(crate::BUNDLED_SCRIPT).expect("script parses");
        session.run(&steps);

        let summary = session.summary();
        assert_eq!(summary.phase, "playing");
        assert_eq!(summary.tile, TilePos::new(13, 9));
        assert_eq!(summary.stature, Stature::Small);
        assert!(summary.has_rune);
        assert!(!summary.rune_visible);
        assert_eq!(summary.notices.len(), 1);
        assert!(summary.cues.contains(&Cue::RuneFound.name()));
        assert!(summary.cues.contains(&Cue::Gore.name()));
        assert!(summary
            .doors
            .iter()
            .any(|door| door.tile == TilePos::new(7, 12) && !door.closed));
    }

    #[test]
    fn summary_serialises_to_json() {
        let session = bundled_session();
        let json = serde_json::to_value(session.summary()).expect("summary serialises");
        assert_eq!(json["tile"]["x"], 7);
        assert_eq!(json["facing"], "north");
        assert_eq!(json["stature"], "full");
        assert_eq!(json["keyboard"], "qwerty");
        assert_eq!(json["voice"], "female");
    }

    #[test]
    fn male_voice_swaps_the_spoken_samples() {
        let mut session = session_with_voice(VoiceGender::Male);
        let steps = parse_script(crate::BUNDLED_SCRIPT).expect("script parses");
        session.run(&steps);

        let cues = session.summary().cues;
        assert!(cues.contains(&"scream-1-male"));
        assert!(cues.contains(&"pant-male"));
        assert!(!cues.iter().any(|sample| sample.ends_with("-female")));
        assert!(cues.contains(&Cue::Gore.name()));
    }
}
