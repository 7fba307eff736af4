use std::{f32::consts::PI, time::Duration};

use glam::Vec3;
use squirm_core::{
    Command, Direction, DoorOrientation, DoorSpec, Event, LevelLayout, ModeRejection, PlayerMode,
    Scene, Stature, TilePos,
};
use squirm_world::{self as world, query, SceneGraph, World};

const FRAME: Duration = Duration::from_millis(50);

fn door(x: i32, z: i32, orientation: DoorOrientation, closed: bool) -> DoorSpec {
    DoorSpec {
        tile: TilePos::new(x, z),
        orientation,
        closed,
    }
}

fn level() -> LevelLayout {
    let mut layout = LevelLayout::empty(16, 16);
    layout.spawn = TilePos::new(7, 14);
    layout.facing = Direction::North;
    layout.rune = Some(TilePos::new(14, 10));
    layout.doors = vec![
        door(7, 12, DoorOrientation::Top, true),
        door(11, 12, DoorOrientation::Top, false),
        door(2, 10, DoorOrientation::Top, false),
        door(13, 8, DoorOrientation::Left, false),
    ];
    layout
}

fn boot(layout: LevelLayout) -> (World, SceneGraph) {
    let mut scene = SceneGraph::new();
    let player = scene.make_entity(Vec3::ZERO, Vec3::ONE);
    let mut world = World::new(player);
    let mut events = Vec::new();
    world::apply(&mut world, &mut scene, Command::LoadLevel { layout }, &mut events);
    assert!(matches!(events.as_slice(), [Event::LevelLoaded { .. }]));
    (world, scene)
}

fn send(world: &mut World, scene: &mut SceneGraph, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, scene, command, &mut events);
    events
}

fn request(world: &mut World, scene: &mut SceneGraph, mode: PlayerMode) -> Vec<Event> {
    send(world, scene, Command::RequestMode { mode })
}

fn place(world: &mut World, scene: &mut SceneGraph, x: i32, z: i32, facing: Direction) {
    let _ = send(
        world,
        scene,
        Command::PlacePlayer {
            tile: TilePos::new(x, z),
            facing,
        },
    );
}

fn run_until_idle(world: &mut World, scene: &mut SceneGraph) -> Vec<Event> {
    let mut events = Vec::new();
    for _ in 0..400 {
        let batch = send(world, scene, Command::Tick { dt: FRAME });
        let done = batch
            .iter()
            .any(|event| matches!(event, Event::ModeCompleted { .. }));
        events.extend(batch);
        if done {
            return events;
        }
    }
    panic!("mode never completed");
}

#[test]
fn east_and_south_queries_match_their_canonical_edges() {
    let mut layout = level();
    for (index, raw) in layout.walls.iter_mut().enumerate() {
        *raw = match index % 5 {
            0 => 0,
            1 => 2,
            2 => 3,
            3 => 4,
            _ => 1,
        };
    }
    for (index, raw) in layout.special.iter_mut().enumerate() {
        *raw = if index % 7 == 0 { 17 + 3 } else { 0 };
    }
    let (world, _scene) = boot(layout);

    for z in 0..15 {
        for x in 0..15 {
            let tile = TilePos::new(x, z);
            assert_eq!(
                query::edge_info(&world, tile, Direction::East),
                query::edge_info(&world, TilePos::new(x + 1, z), Direction::West)
            );
            assert_eq!(
                query::edge_info(&world, tile, Direction::South),
                query::edge_info(&world, TilePos::new(x, z + 1), Direction::North)
            );
        }
    }
}

#[test]
fn closed_door_walls_the_edge_until_opened() {
    let (mut world, mut scene) = boot(level());
    let tile = TilePos::new(7, 12);

    assert!(query::edge_info(&world, tile, Direction::North).wall);
    assert!(query::edge_info(&world, TilePos::new(7, 11), Direction::South).wall);

    let events = send(&mut world, &mut scene, Command::OpenDoor { tile });
    assert_eq!(events, vec![Event::DoorOpened { tile }]);
    assert!(!query::edge_info(&world, tile, Direction::North).wall);
}

#[test]
fn door_transitions_are_idempotent() {
    let (mut world, mut scene) = boot(level());
    let tile = TilePos::new(7, 12);

    assert_eq!(send(&mut world, &mut scene, Command::OpenDoor { tile }).len(), 1);
    assert!(send(&mut world, &mut scene, Command::OpenDoor { tile }).is_empty());
    assert_eq!(send(&mut world, &mut scene, Command::CloseDoor { tile }).len(), 1);
    assert!(send(&mut world, &mut scene, Command::CloseDoor { tile }).is_empty());

    let door = query::doors(&world)
        .and_then(|doors| doors.get(tile))
        .copied()
        .expect("door registered");
    assert!(door.is_closed());
    assert_eq!(scene.local_position(door.proxy()).y, 0.0);
}

#[test]
fn closed_door_blocks_the_spawn_corridor() {
    let (mut world, mut scene) = boot(level());
    place(&mut world, &mut scene, 7, 12, Direction::North);

    let events = request(&mut world, &mut scene, PlayerMode::Forward);
    assert_eq!(
        events,
        vec![Event::ModeRejected {
            mode: PlayerMode::Forward,
            reason: ModeRejection::Blocked,
        }]
    );
}

#[test]
fn forward_move_lands_on_the_next_tile() {
    let (mut world, mut scene) = boot(level());
    let _ = send(
        &mut world,
        &mut scene,
        Command::OpenDoor {
            tile: TilePos::new(7, 12),
        },
    );
    place(&mut world, &mut scene, 7, 12, Direction::North);

    let started = request(&mut world, &mut scene, PlayerMode::Forward);
    assert!(matches!(
        started.as_slice(),
        [Event::ModeStarted {
            mode: PlayerMode::Forward,
            stature: Stature::Full,
            ..
        }]
    ));

    let events = run_until_idle(&mut world, &mut scene);
    assert!(events.contains(&Event::PositionReached {
        tile: TilePos::new(7, 11)
    }));
    let player = query::player(&world);
    assert_eq!(player.position(), TilePos::new(7, 11));
    assert_eq!(player.mode(), PlayerMode::Idle);
    let pose = scene.world_position(player.entity());
    assert!((pose.z - 11.6 * 4.0).abs() < 1e-4);
}

#[test]
fn requests_while_moving_change_nothing() {
    let (mut world, mut scene) = boot(level());
    let _ = request(&mut world, &mut scene, PlayerMode::Forward);
    let _ = send(&mut world, &mut scene, Command::Tick { dt: FRAME });

    for mode in [PlayerMode::TurnLeft, PlayerMode::Reverse, PlayerMode::Forward] {
        assert_eq!(
            request(&mut world, &mut scene, mode),
            vec![Event::ModeRejected {
                mode,
                reason: ModeRejection::Busy,
            }]
        );
    }
    place(&mut world, &mut scene, 1, 1, Direction::West);

    let player = query::player(&world);
    assert_eq!(player.mode(), PlayerMode::Forward);
    assert_eq!(player.position(), TilePos::new(7, 14));
    assert_eq!(player.facing(), Direction::North);
}

#[test]
fn quarter_turns_never_take_the_long_way() {
    let (mut world, mut scene) = boot(level());
    place(&mut world, &mut scene, 4, 4, Direction::West);
    let _ = request(&mut world, &mut scene, PlayerMode::TurnRight);

    let mut previous = query::player(&world).yaw();
    for _ in 0..8 {
        let _ = send(&mut world, &mut scene, Command::Tick { dt: FRAME });
        let yaw = query::player(&world).yaw();
        assert!(yaw <= previous + 1e-5);
        assert!(yaw >= PI - 1e-5 && yaw <= 1.5 * PI + 1e-5);
        previous = yaw;
    }
    assert_eq!(query::player(&world).facing(), Direction::North);
}

#[test]
fn rune_tile_unlocks_shape_shifting() {
    let (mut world, mut scene) = boot(level());
    place(&mut world, &mut scene, 14, 11, Direction::North);

    assert_eq!(
        request(&mut world, &mut scene, PlayerMode::Shrink),
        vec![Event::ModeRejected {
            mode: PlayerMode::Shrink,
            reason: ModeRejection::MissingRune,
        }]
    );
    assert_eq!(query::player(&world).mode(), PlayerMode::Idle);

    let _ = request(&mut world, &mut scene, PlayerMode::Forward);
    let events = run_until_idle(&mut world, &mut scene);
    let rune = TilePos::new(14, 10);
    let found = events
        .iter()
        .position(|event| *event == Event::RuneFound { tile: rune })
        .expect("rune found");
    let reached = events
        .iter()
        .position(|event| *event == Event::PositionReached { tile: rune })
        .expect("position reached");
    assert!(found < reached);
    assert!(query::player(&world).has_rune());

    let started = request(&mut world, &mut scene, PlayerMode::Shrink);
    assert!(matches!(
        started.as_slice(),
        [Event::ModeStarted {
            mode: PlayerMode::Shrink,
            ..
        }]
    ));
    let events = run_until_idle(&mut world, &mut scene);
    assert!(events.contains(&Event::StatureChanged {
        stature: Stature::Small
    }));
}

#[test]
fn rune_is_only_found_once() {
    let (mut world, mut scene) = boot(level());
    place(&mut world, &mut scene, 14, 11, Direction::North);
    let _ = request(&mut world, &mut scene, PlayerMode::Forward);
    let _ = run_until_idle(&mut world, &mut scene);

    let _ = request(&mut world, &mut scene, PlayerMode::Reverse);
    let _ = run_until_idle(&mut world, &mut scene);
    let _ = request(&mut world, &mut scene, PlayerMode::Forward);
    let events = run_until_idle(&mut world, &mut scene);
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::RuneFound { .. })));
}

#[test]
fn chokepoint_trigger_closes_its_door() {
    let (mut world, mut scene) = boot(level());
    place(&mut world, &mut scene, 2, 9, Direction::North);
    let _ = request(&mut world, &mut scene, PlayerMode::Forward);

    let events = run_until_idle(&mut world, &mut scene);
    assert!(events.contains(&Event::DoorClosed {
        tile: TilePos::new(2, 10)
    }));
    assert!(query::edge_info(&world, TilePos::new(2, 10), Direction::North).wall);
}

#[test]
fn entry_rule_keeps_small_players_off_debris() {
    let (mut world, mut scene) = boot(level());
    let debris = TilePos::new(5, 4);
    world.set_entry_rule(move |tile, stature| stature == Stature::Full || tile != debris);
    place(&mut world, &mut scene, 5, 5, Direction::North);

    let _ = request(&mut world, &mut scene, PlayerMode::Forward);
    let _ = run_until_idle(&mut world, &mut scene);
    assert_eq!(query::player(&world).position(), debris);
}

#[test]
fn rune_pickup_follows_the_layout() {
    let mut layout = level();
    layout.rune = Some(TilePos::new(3, 3));
    let (mut world, mut scene) = boot(layout);

    place(&mut world, &mut scene, 14, 11, Direction::North);
    let _ = request(&mut world, &mut scene, PlayerMode::Forward);
    let events = run_until_idle(&mut world, &mut scene);
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::RuneFound { .. })));
    assert!(!query::player(&world).has_rune());

    place(&mut world, &mut scene, 3, 4, Direction::North);
    let _ = request(&mut world, &mut scene, PlayerMode::Forward);
    let events = run_until_idle(&mut world, &mut scene);
    assert!(events.contains(&Event::RuneFound {
        tile: TilePos::new(3, 3)
    }));
    assert!(query::player(&world).has_rune());
}

#[test]
fn levels_without_a_rune_never_grant_one() {
    let mut layout = level();
    layout.rune = None;
    let (mut world, mut scene) = boot(layout);

    place(&mut world, &mut scene, 14, 11, Direction::North);
    let _ = request(&mut world, &mut scene, PlayerMode::Forward);
    let _ = run_until_idle(&mut world, &mut scene);
    assert_eq!(query::player(&world).position(), TilePos::new(14, 10));
    assert!(!query::player(&world).has_rune());
}

#[test]
fn rejected_level_spawns_no_door_proxies() {
    let (mut world, mut scene) = boot(level());
    let entities = scene.len();

    let mut layout = level();
    layout.doors.push(door(2, 10, DoorOrientation::Left, true));
    let events = send(&mut world, &mut scene, Command::LoadLevel { layout });

    assert!(events.is_empty());
    assert_eq!(scene.len(), entities);
    assert_eq!(query::doors(&world).map(|doors| doors.len()), Some(4));
}
