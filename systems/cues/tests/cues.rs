use std::time::Duration;

use glam::Vec3;
use squirm_core::{Command, Cue, Event, LevelLayout, PlayerMode, Scene, TilePos};
use squirm_system_cues::CueScheduler;
use squirm_world::{self as world, SceneGraph, World};

struct Harness {
    world: World,
    scene: SceneGraph,
    scheduler: CueScheduler,
    played: Vec<(Duration, Cue)>,
}

impl Harness {
    fn new() -> Self {
        let mut scene = SceneGraph::new();
        let player = scene.make_entity(Vec3::ZERO, Vec3::ONE);
        let mut world = World::new(player);
        let mut layout = LevelLayout::empty(8, 8);
        layout.spawn = TilePos::new(3, 6);
        let mut events = Vec::new();
        world::apply(&mut world, &mut scene, Command::LoadLevel { layout }, &mut events);
        Self {
            world,
            scene,
            scheduler: CueScheduler::new(),
            played: Vec::new(),
        }
    }

    fn send(&mut self, command: Command) {
        let mut events = Vec::new();
        world::apply(&mut self.world, &mut self.scene, command, &mut events);

        let now = world::query::clock(&self.world);
        let mut cues = Vec::new();
        self.scheduler.handle(&events, &mut cues);
        self.played.extend(cues.into_iter().map(|cue| (now, cue)));
    }

    fn advance(&mut self, total: Duration, frame: Duration) {
        let mut elapsed = Duration::ZERO;
        while elapsed < total {
            self.send(Command::Tick { dt: frame });
            elapsed += frame;
        }
    }
}

#[test]
fn full_size_forward_plays_two_footsteps() {
    let mut harness = Harness::new();
    harness.send(Command::RequestMode {
        mode: PlayerMode::Forward,
    });
    harness.advance(Duration::from_millis(800), Duration::from_millis(100));

    assert_eq!(
        harness.played,
        vec![
            (Duration::from_millis(200), Cue::FootStep),
            (Duration::from_millis(600), Cue::FootStep),
        ]
    );
}

#[test]
fn turns_are_silent() {
    let mut harness = Harness::new();
    harness.send(Command::RequestMode {
        mode: PlayerMode::TurnLeft,
    });
    harness.advance(Duration::from_secs(1), Duration::from_millis(100));
    assert!(harness.played.is_empty());
}

#[test]
fn shrink_track_outlives_the_mode() {
    let mut harness = Harness::new();
    harness.send(Command::Tick {
        dt: Duration::from_millis(1_000),
    });
    let mut layout = LevelLayout::empty(16, 16);
    layout.spawn = TilePos::new(14, 11);
    layout.rune = Some(TilePos::new(14, 10));
    harness.send(Command::LoadLevel { layout });
    harness.send(Command::RequestMode {
        mode: PlayerMode::Forward,
    });
    harness.advance(Duration::from_millis(800), Duration::from_millis(100));
    assert!(harness.played.contains(&(Duration::from_millis(1_800), Cue::RuneFound)));
    harness.played.clear();

    harness.send(Command::RequestMode {
        mode: PlayerMode::Shrink,
    });
    harness.advance(Duration::from_millis(5_000), Duration::from_millis(50));
    assert_eq!(
        world::query::player(&harness.world).mode(),
        PlayerMode::Idle
    );
    assert!(!harness.played.iter().any(|(_, cue)| *cue == Cue::Pant));

    harness.advance(Duration::from_millis(300), Duration::from_millis(50));
    let cues: Vec<Cue> = harness.played.iter().map(|(_, cue)| *cue).collect();
    assert_eq!(cues.len(), 13);
    assert_eq!(cues.first(), Some(&Cue::Gore));
    assert_eq!(cues[1], Cue::Scream1);
    assert_eq!(cues.last(), Some(&Cue::Pant));
    assert_eq!(
        harness.played.last().map(|(at, _)| *at),
        Some(Duration::from_millis(7_100))
    );
}
