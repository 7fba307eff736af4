//! Raw level description handed to the world when a level is loaded.
//!
//! The two layers keep the on-disk encoding: every structural value is offset
//! by one and every special value by seventeen, so that a stored zero reads as
//! "no data". The world decodes them into explicit cell enums on load.

use serde::{Deserialize, Serialize};

use crate::{Direction, TilePos};

/// Which edge of its owner tile a door gates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DoorOrientation {
    /// The door sits on the top (north) edge of the tile.
    Top,
    /// The door sits on the left (west) edge of the tile.
    Left,
}

/// Door placement recorded in a level layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DoorSpec {
    /// Tile that owns the gated edge.
    pub tile: TilePos,
    /// Edge of the tile gated by the door.
    pub orientation: DoorOrientation,
    /// Whether the door starts lowered.
    pub closed: bool,
}

/// Complete raw description of a level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelLayout {
    /// Number of tile columns.
    pub width: u32,
    /// Number of tile rows.
    pub height: u32,
    /// Row-major structural layer values.
    pub walls: Vec<u32>,
    /// Row-major special layer values.
    pub special: Vec<u32>,
    /// Doors registered when the level is assembled.
    pub doors: Vec<DoorSpec>,
    /// Tile the player starts on.
    pub spawn: TilePos,
    /// Facing the player starts with.
    pub facing: Direction,
    /// Tile holding the rune.
    pub rune: Option<TilePos>,
    /// Tiles covered by debris that cannot be crawled over.
    pub debris: Vec<TilePos>,
}

impl LevelLayout {
    /// Creates an open layout of the given size with every layer value unset.
    #[must_use]
    pub fn empty(width: u32, height: u32) -> Self {
        let capacity = usize::try_from(u64::from(width) * u64::from(height)).unwrap_or(0);
        Self {
            width,
            height,
            walls: vec![0; capacity],
            special: vec![0; capacity],
            doors: Vec::new(),
            spawn: TilePos::new(0, 0),
            facing: Direction::North,
            rune: None,
            debris: Vec::new(),
        }
    }

    /// Number of tiles each layer must hold.
    #[must_use]
    pub fn tile_count(&self) -> usize {
        usize::try_from(u64::from(self.width) * u64::from(self.height)).unwrap_or(0)
    }
}
