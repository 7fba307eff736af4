//! Tile grid holding the structural and special edge layers of a level.
//!
//! Each tile owns exactly two edges: its left (west) edge and its top (north)
//! edge. East and south edges belong to the neighbouring tile, so every
//! physical edge is answered by a single authoritative cell no matter which
//! side asks.

use bitflags::bitflags;
use squirm_core::{Direction, EdgeInfo, EdgeProperty, LevelLayout, TilePos};

use crate::layout::LayoutError;

const STRUCTURAL_OFFSET: u32 = 1;
const SPECIAL_OFFSET: u32 = 16 + 1;
const EDGE_BITS: u32 = 2;

bitflags! {
    /// Edges of a tile that carry a bit in either layer.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct EdgeMask: u32 {
        /// The left (west) edge of the tile.
        const LEFT = 0b01;
        /// The top (north) edge of the tile.
        const TOP = 0b10;
    }
}

/// Decoded structural cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WallCell {
    /// The layer carries no data for this tile.
    Unset,
    /// Walls present on the owned edges, plus the wall material index.
    Set {
        /// Owned edges occupied by a wall.
        edges: EdgeMask,
        /// Material used to dress the walls of this tile.
        material: u32,
    },
}

impl WallCell {
    /// Decodes a raw layer value where zero means "no data".
    #[must_use]
    pub fn from_raw(raw: u32) -> Self {
        match raw.checked_sub(STRUCTURAL_OFFSET) {
            None => Self::Unset,
            Some(value) => Self::Set {
                edges: EdgeMask::from_bits_truncate(value),
                material: value >> EDGE_BITS,
            },
        }
    }

    /// Encodes the cell back into its raw layer value.
    #[must_use]
    pub fn to_raw(self) -> u32 {
        match self {
            Self::Unset => 0,
            Self::Set { edges, material } => {
                ((material << EDGE_BITS) | edges.bits()) + STRUCTURAL_OFFSET
            }
        }
    }

    /// Owned edges that currently hold a wall.
    #[must_use]
    pub fn edges(self) -> EdgeMask {
        match self {
            Self::Unset => EdgeMask::empty(),
            Self::Set { edges, .. } => edges,
        }
    }

    /// Returns the cell with the wall bits for `mask` raised or cleared.
    #[must_use]
    pub fn with_walls(self, mask: EdgeMask, wall: bool) -> Self {
        let (mut edges, material) = match self {
            Self::Unset => (EdgeMask::empty(), 0),
            Self::Set { edges, material } => (edges, material),
        };
        edges.set(mask, wall);
        Self::Set { edges, material }
    }
}

/// Decoded special-layer cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpecialCell {
    /// The layer carries no data for this tile.
    Unset,
    /// Owned edges carrying a property, and the property kind.
    Set {
        /// Owned edges that carry the property.
        edges: EdgeMask,
        /// Raw property kind, see [`EdgeProperty::from_kind`].
        kind: u32,
    },
}

impl SpecialCell {
    /// Decodes a raw layer value; anything below the special offset reads as unset.
    #[must_use]
    pub fn from_raw(raw: u32) -> Self {
        match raw.checked_sub(SPECIAL_OFFSET) {
            None => Self::Unset,
            Some(value) => Self::Set {
                edges: EdgeMask::from_bits_truncate(value),
                kind: value >> EDGE_BITS,
            },
        }
    }

    /// Encodes the cell back into its raw layer value.
    #[must_use]
    pub fn to_raw(self) -> u32 {
        match self {
            Self::Unset => 0,
            Self::Set { edges, kind } => ((kind << EDGE_BITS) | edges.bits()) + SPECIAL_OFFSET,
        }
    }

    /// Property carried by the requested owned edge.
    #[must_use]
    pub fn property(self, edge: EdgeMask) -> EdgeProperty {
        match self {
            Self::Set { edges, kind } if edges.contains(edge) => EdgeProperty::from_kind(kind),
            _ => EdgeProperty::None,
        }
    }
}

/// Width × height grid of decoded edge layers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileGrid {
    width: u32,
    height: u32,
    walls: Vec<WallCell>,
    special: Vec<SpecialCell>,
}

impl TileGrid {
    /// Creates a grid of the given size with no walls or properties.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let capacity = usize::try_from(u64::from(width) * u64::from(height)).unwrap_or(0);
        Self {
            width,
            height,
            walls: vec![WallCell::Unset; capacity],
            special: vec![SpecialCell::Unset; capacity],
        }
    }

    /// Decodes both layers of the layout.
    pub fn from_layout(layout: &LevelLayout) -> Result<Self, LayoutError> {
        if layout.width == 0 || layout.height == 0 {
            return Err(LayoutError::EmptyGrid {
                width: layout.width,
                height: layout.height,
            });
        }

        let expected = layout.tile_count();
        for (layer, values) in [("walls", &layout.walls), ("special", &layout.special)] {
            if values.len() != expected {
                return Err(LayoutError::LayerSize {
                    layer,
                    found: values.len(),
                    expected,
                });
            }
        }

        Ok(Self {
            width: layout.width,
            height: layout.height,
            walls: layout.walls.iter().copied().map(WallCell::from_raw).collect(),
            special: layout
                .special
                .iter()
                .copied()
                .map(SpecialCell::from_raw)
                .collect(),
        })
    }

    /// Number of tile columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of tile rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Reports whether the tile lies within the grid.
    #[must_use]
    pub fn contains(&self, tile: TilePos) -> bool {
        self.index(tile).is_some()
    }

    /// Structural cell stored for the tile.
    ///
    /// # Panics
    ///
    /// Panics when the tile lies outside the grid.
    #[must_use]
    pub fn tile_at(&self, tile: TilePos) -> WallCell {
        self.walls[self.checked_index(tile)]
    }

    /// Replaces the structural cell stored for the tile.
    ///
    /// # Panics
    ///
    /// Panics when the tile lies outside the grid.
    pub fn set_tile_at(&mut self, tile: TilePos, cell: WallCell) {
        let index = self.checked_index(tile);
        self.walls[index] = cell;
    }

    /// Special cell stored for the tile.
    ///
    /// # Panics
    ///
    /// Panics when the tile lies outside the grid.
    #[must_use]
    pub fn special_at(&self, tile: TilePos) -> SpecialCell {
        self.special[self.checked_index(tile)]
    }

    /// Replaces the special cell stored for the tile.
    ///
    /// # Panics
    ///
    /// Panics when the tile lies outside the grid.
    pub fn set_special_at(&mut self, tile: TilePos, cell: SpecialCell) {
        let index = self.checked_index(tile);
        self.special[index] = cell;
    }

    /// Raises or clears the wall on the owned edges selected by `mask`.
    ///
    /// # Panics
    ///
    /// Panics when the tile lies outside the grid.
    pub fn set_walls(&mut self, tile: TilePos, mask: EdgeMask, wall: bool) {
        let cell = self.tile_at(tile).with_walls(mask, wall);
        self.set_tile_at(tile, cell);
    }

    /// Describes the edge the player would cross leaving `tile` toward `facing`.
    ///
    /// East and south queries are answered by the west and north edges of the
    /// neighbouring tile. Edges owned by a tile outside the grid are solid.
    #[must_use]
    pub fn edge_info(&self, tile: TilePos, facing: Direction) -> EdgeInfo {
        let (owner, edge) = match facing {
            Direction::West => (tile, EdgeMask::LEFT),
            Direction::North => (tile, EdgeMask::TOP),
            Direction::East => (tile.step(Direction::East), EdgeMask::LEFT),
            Direction::South => (tile.step(Direction::South), EdgeMask::TOP),
        };

        let Some(index) = self.index(owner) else {
            return EdgeInfo::SOLID;
        };

        EdgeInfo {
            wall: self.walls[index].edges().contains(edge),
            property: self.special[index].property(edge),
        }
    }

    fn index(&self, tile: TilePos) -> Option<usize> {
        let x = u32::try_from(tile.x()).ok()?;
        let z = u32::try_from(tile.z()).ok()?;
        if x < self.width && z < self.height {
            let row = usize::try_from(z).ok()?;
            let column = usize::try_from(x).ok()?;
            let width = usize::try_from(self.width).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }

    fn checked_index(&self, tile: TilePos) -> usize {
        match self.index(tile) {
            Some(index) => index,
            None => panic!(
                "tile ({}, {}) lies outside the {}x{} grid",
                tile.x(),
                tile.z(),
                self.width,
                self.height
            ),
        }
    }
}
