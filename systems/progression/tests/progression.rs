use std::time::Duration;

use glam::Vec3;
use squirm_core::{
    Command, Direction, DoorOrientation, DoorSpec, Event, LevelLayout, PlayerMode, Scene, TilePos,
};
use squirm_system_progression::{GamePhase, Progression, Signal};
use squirm_world::{self as world, query, SceneGraph, World};

fn boot() -> (World, SceneGraph) {
    let mut scene = SceneGraph::new();
    let player = scene.make_entity(Vec3::ZERO, Vec3::ONE);
    let mut world = World::new(player);
    let mut layout = LevelLayout::empty(16, 16);
    layout.spawn = TilePos::new(7, 14);
    layout.doors = vec![
        DoorSpec {
            tile: TilePos::new(7, 12),
            orientation: DoorOrientation::Top,
            closed: true,
        },
        DoorSpec {
            tile: TilePos::new(0, 1),
            orientation: DoorOrientation::Top,
            closed: false,
        },
    ];
    let mut events = Vec::new();
    world::apply(&mut world, &mut scene, Command::LoadLevel { layout }, &mut events);
    (world, scene)
}

#[test]
fn begin_unseals_the_start_area() {
    let (mut world, mut scene) = boot();
    let mut progression = Progression::new();
    let mut commands = Vec::new();
    let mut signals = Vec::new();
    progression.begin(&mut commands, &mut signals);

    let mut events = Vec::new();
    for command in commands {
        world::apply(&mut world, &mut scene, command, &mut events);
    }
    assert_eq!(
        events,
        vec![Event::DoorOpened {
            tile: TilePos::new(7, 12)
        }]
    );
    assert!(!query::edge_info(&world, TilePos::new(7, 12), Direction::North).wall);
}

#[test]
fn stepping_into_the_prison_ends_the_game() {
    let (mut world, mut scene) = boot();
    let mut progression = Progression::new();
    let mut signals = Vec::new();
    progression.begin(&mut Vec::new(), &mut signals);
    signals.clear();

    let mut events = Vec::new();
    world::apply(
        &mut world,
        &mut scene,
        Command::PlacePlayer {
            tile: TilePos::new(0, 2),
            facing: Direction::North,
        },
        &mut events,
    );
    world::apply(
        &mut world,
        &mut scene,
        Command::RequestMode {
            mode: PlayerMode::Forward,
        },
        &mut events,
    );
    for _ in 0..8 {
        world::apply(
            &mut world,
            &mut scene,
            Command::Tick {
                dt: Duration::from_millis(100),
            },
            &mut events,
        );
    }
    assert!(events.contains(&Event::DoorClosed {
        tile: TilePos::new(0, 1)
    }));

    progression.handle(&events, &mut signals);
    assert_eq!(progression.phase(), GamePhase::Ended);
    assert_eq!(
        signals,
        vec![Signal::PhaseChanged(GamePhase::Ended), Signal::StopMusic]
    );
}
