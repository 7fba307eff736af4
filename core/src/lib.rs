#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Squirm engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Pose updates bypass the event stream and are
//! written straight into a [`Scene`] supplied by the adapter.

use std::time::Duration;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

pub mod layout;
pub mod math;
pub mod timing;

pub use layout::{DoorOrientation, DoorSpec, LevelLayout};

/// Length of a tile edge measured in world units.
pub const TILE_SCALE: f32 = 4.0;

/// Height of a single storey measured in world units.
pub const STOREY_HEIGHT: f32 = 2.5;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the active level with the decoded form of the provided layout.
    ///
    /// A rejected layout leaves both the current level and the scene untouched.
    LoadLevel {
        /// Raw layout describing the grid layers, doors and spawn point.
        layout: LevelLayout,
    },
    /// Moves the player to a tile without animating, valid only while idle.
    PlacePlayer {
        /// Tile the player should occupy.
        tile: TilePos,
        /// Facing the player should assume.
        facing: Direction,
    },
    /// Asks the player state machine to enter a new mode.
    RequestMode {
        /// Mode the caller would like to activate.
        mode: PlayerMode,
    },
    /// Updates the externally driven pitch tilt.
    SetBend {
        /// Bend factor, clamped to `-1.0..=1.0`.
        bend: f32,
    },
    /// Requests that the door registered at the tile be opened.
    OpenDoor {
        /// Tile that owns the door edge.
        tile: TilePos,
    },
    /// Requests that the door registered at the tile be closed.
    CloseDoor {
        /// Tile that owns the door edge.
        tile: TilePos,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that a level was decoded and attached.
    LevelLoaded {
        /// Number of tile columns in the grid.
        width: u32,
        /// Number of tile rows in the grid.
        height: u32,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
        /// Absolute simulation time after the tick.
        now: Duration,
    },
    /// Confirms that the player accepted a mode transition.
    ModeStarted {
        /// Mode that became active.
        mode: PlayerMode,
        /// Stature of the player when the mode began.
        stature: Stature,
        /// Simulation time at which the mode began.
        started_at: Duration,
        /// Time the mode needs to run to completion.
        duration: Duration,
    },
    /// Reports that a mode request was refused without any state change.
    ModeRejected {
        /// Mode the caller asked for.
        mode: PlayerMode,
        /// Reason the request was refused.
        reason: ModeRejection,
    },
    /// Announces that an active mode ran to completion and the player is idle.
    ModeCompleted {
        /// Mode that finished.
        mode: PlayerMode,
    },
    /// Confirms that a turn committed a new facing.
    FacingChanged {
        /// Facing after the turn.
        facing: Direction,
    },
    /// Confirms that a move committed the player onto a new tile.
    PositionReached {
        /// Tile the player now occupies.
        tile: TilePos,
    },
    /// Confirms that a shape shift committed a new stature.
    StatureChanged {
        /// Stature after the shift.
        stature: Stature,
    },
    /// Confirms that a door transitioned from closed to open.
    DoorOpened {
        /// Tile that owns the door edge.
        tile: TilePos,
    },
    /// Confirms that a door transitioned from open to closed.
    DoorClosed {
        /// Tile that owns the door edge.
        tile: TilePos,
    },
    /// Announces that the player picked up the rune.
    RuneFound {
        /// Tile where the rune was collected.
        tile: TilePos,
    },
}

/// Cardinal facings, numbered so that `facing * 90°` yields the yaw angle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Facing toward increasing row indices.
    South,
    /// Facing toward increasing column indices.
    East,
    /// Facing toward decreasing row indices.
    North,
    /// Facing toward decreasing column indices.
    West,
}

impl Direction {
    const ALL: [Direction; 4] = [
        Direction::South,
        Direction::East,
        Direction::North,
        Direction::West,
    ];

    /// Builds a facing from its integer index, wrapping modulo four.
    #[must_use]
    pub const fn from_index(index: u8) -> Self {
        Self::ALL[(index % 4) as usize]
    }

    /// Integer index of the facing in the range `0..4`.
    #[must_use]
    pub const fn index(self) -> u8 {
        match self {
            Self::South => 0,
            Self::East => 1,
            Self::North => 2,
            Self::West => 3,
        }
    }

    /// Facing reached by a left turn.
    #[must_use]
    pub const fn turned_left(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    /// Facing reached by a right turn.
    #[must_use]
    pub const fn turned_right(self) -> Self {
        Self::from_index(self.index() + 3)
    }

    /// Facing pointing the opposite way.
    #[must_use]
    pub const fn reversed(self) -> Self {
        Self::from_index(self.index() + 2)
    }

    /// Column and row delta covered by a single step in this direction.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::South => (0, 1),
            Self::East => (1, 0),
            Self::North => (0, -1),
            Self::West => (-1, 0),
        }
    }
}

/// Location of a single tile expressed as column (`x`) and row (`z`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TilePos {
    x: i32,
    z: i32,
}

impl TilePos {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Zero-based column index.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Zero-based row index.
    #[must_use]
    pub const fn z(&self) -> i32 {
        self.z
    }

    /// Tile adjacent to this one in the provided direction.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let (dx, dz) = direction.offset();
        Self::new(self.x + dx, self.z + dz)
    }

    /// Centre of the tile in world space, lifted to the provided height.
    #[must_use]
    pub fn world_position(self, height: f32) -> Vec3 {
        tile_to_world(self.x as f32, self.z as f32, height)
    }
}

/// Converts fractional tile coordinates into a world-space position.
#[must_use]
pub fn tile_to_world(x: f32, z: f32, height: f32) -> Vec3 {
    Vec3::new((x + 0.6) * TILE_SCALE, height, (z + 0.6) * TILE_SCALE)
}

/// Modes of the player state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerMode {
    /// Waiting for a new request.
    Idle,
    /// Rotating a quarter turn to the left.
    TurnLeft,
    /// Rotating a quarter turn to the right.
    TurnRight,
    /// Stepping one tile along the facing.
    Forward,
    /// Stepping one tile against the facing.
    Reverse,
    /// Contorting down to crawling size.
    Shrink,
    /// Contorting back up to full size.
    Expand,
}

impl PlayerMode {
    /// Reports whether the mode rotates the player in place.
    #[must_use]
    pub const fn is_turn(self) -> bool {
        matches!(self, Self::TurnLeft | Self::TurnRight)
    }

    /// Reports whether the mode moves the player to a neighbouring tile.
    #[must_use]
    pub const fn is_travel(self) -> bool {
        matches!(self, Self::Forward | Self::Reverse)
    }

    /// Reports whether the mode changes the player's stature.
    #[must_use]
    pub const fn is_shape_shift(self) -> bool {
        matches!(self, Self::Shrink | Self::Expand)
    }
}

/// Posture class derived from the player's height.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stature {
    /// Upright, walking on two feet.
    Full,
    /// Shrunk down and dragging along the floor.
    Small,
}

/// Reasons a mode request may be refused by the player state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModeRejection {
    /// No level has been attached yet.
    NoLevel,
    /// Another mode is still running.
    Busy,
    /// Shape shifting requires the rune.
    MissingRune,
    /// A wall blocks the edge in the direction of travel.
    Blocked,
    /// The edge is a crawl space and the player is too tall.
    TooTallToCrawl,
    /// The occupancy rule refused entry to the destination tile.
    Occupied,
    /// Idle is entered by completing a mode and cannot be requested.
    Unsupported,
}

/// Special property carried by an edge of the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeProperty {
    /// Plain edge.
    None,
    /// Low opening that can be passed only while small.
    Crawl,
    /// Opening that can be looked through but never passed.
    Window,
    /// Property kind without a dedicated meaning.
    Other(u32),
}

impl EdgeProperty {
    /// Decodes the property kind stored in the special layer.
    #[must_use]
    pub const fn from_kind(kind: u32) -> Self {
        match kind {
            0 => Self::Crawl,
            1 => Self::Window,
            other => Self::Other(other),
        }
    }
}

/// Answer to an edge query against the tile grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EdgeInfo {
    /// Whether a wall occupies the edge.
    pub wall: bool,
    /// Special property attached to the edge.
    pub property: EdgeProperty,
}

impl EdgeInfo {
    /// Edge used for queries that fall outside the grid.
    pub const SOLID: Self = Self {
        wall: true,
        property: EdgeProperty::None,
    };
}

/// Named audio cues dispatched to the external audio collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cue {
    /// Single footstep.
    FootStep,
    /// Body dragged across the floor.
    Drag,
    /// Wet flesh sound.
    Gore,
    /// Rune pickup chime.
    RuneFound,
    /// First voice scream.
    Scream1,
    /// Second voice scream.
    Scream2,
    /// Exhausted panting.
    Pant,
    /// Closing voice line.
    Insane,
}

impl Cue {
    /// Stable name of the cue used by audio backends and logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::FootStep => "footstep",
            Self::Drag => "drag",
            Self::Gore => "gore",
            Self::RuneFound => "rune-found",
            Self::Scream1 => "scream-1",
            Self::Scream2 => "scream-2",
            Self::Pant => "pant",
            Self::Insane => "insane",
        }
    }

    /// Reports whether the cue plays on the voice channel rather than effects.
    #[must_use]
    pub const fn is_voice(self) -> bool {
        matches!(
            self,
            Self::Scream1 | Self::Scream2 | Self::Pant | Self::Insane
        )
    }
}

/// Handle of an entity owned by the external scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity handle with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the handle.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Transform sink implemented by the adapter's scene graph.
///
/// Entities are never removed. A scene outlives the levels loaded into it, so
/// door proxies of a replaced level stay behind until the adapter builds a
/// fresh scene.
pub trait Scene {
    /// Creates a new entity at the provided position and scale.
    fn make_entity(&mut self, position: Vec3, scale: Vec3) -> EntityId;

    /// Moves the entity without touching its rotation.
    fn set_position(&mut self, entity: EntityId, position: Vec3);

    /// Rotates the entity without touching its position.
    fn set_rotation(&mut self, entity: EntityId, rotation: Quat);

    /// Writes both position and rotation in one call.
    fn set_position_and_rotation(&mut self, entity: EntityId, position: Vec3, rotation: Quat);

    /// Position of the entity after parent transforms are applied.
    fn world_position(&self, entity: EntityId) -> Vec3;

    /// Position of the entity relative to its parent.
    fn local_position(&self, entity: EntityId) -> Vec3;
}

/// Fire-and-forget audio dispatch implemented by the adapter.
pub trait CueSink {
    /// Plays the cue immediately.
    fn play_cue(&mut self, cue: Cue);
}

impl CueSink for Vec<Cue> {
    fn play_cue(&mut self, cue: Cue) {
        self.push(cue);
    }
}
