//! Registry of gated edges that can be raised and lowered at runtime.

use std::collections::{HashMap, HashSet};

use glam::Vec3;
use squirm_core::{DoorOrientation, DoorSpec, EntityId, Scene, TilePos, STOREY_HEIGHT, TILE_SCALE};
use thiserror::Error;
use tracing::debug;

use crate::grid::{EdgeMask, TileGrid};

const PROXY_INSET: f32 = 0.015;
const RAISED_HEIGHT: f32 = STOREY_HEIGHT * 2.0;
const LOWERED_HEIGHT: f32 = 0.0;

/// Errors raised while registering doors.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum DoorError {
    /// A door already gates an edge of this tile.
    #[error("a door is already registered at ({}, {})", .0.x(), .0.z())]
    Duplicate(TilePos),
    /// The door tile lies outside the grid.
    #[error("door tile ({}, {}) lies outside the grid", .0.x(), .0.z())]
    OutOfBounds(TilePos),
}

/// Door registered on a single edge of a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Door {
    tile: TilePos,
    orientation: DoorOrientation,
    closed: bool,
    proxy: EntityId,
}

impl Door {
    /// Tile that owns the gated edge.
    #[must_use]
    pub const fn tile(&self) -> TilePos {
        self.tile
    }

    /// Edge of the tile gated by the door.
    #[must_use]
    pub const fn orientation(&self) -> DoorOrientation {
        self.orientation
    }

    /// Whether the door is currently lowered.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    /// Scene entity that visualises the door.
    #[must_use]
    pub const fn proxy(&self) -> EntityId {
        self.proxy
    }

    fn mask(&self) -> EdgeMask {
        match self.orientation {
            DoorOrientation::Top => EdgeMask::TOP,
            DoorOrientation::Left => EdgeMask::LEFT,
        }
    }
}

/// Keyed collection of doors; at most one door per tile.
#[derive(Clone, Debug, Default)]
pub struct DoorRegistry {
    doors: HashMap<TilePos, Door>,
}

impl DoorRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks a batch of door specs against the grid without touching any scene.
    pub fn validate(grid: &TileGrid, specs: &[DoorSpec]) -> Result<(), DoorError> {
        let mut seen = HashSet::with_capacity(specs.len());
        for spec in specs {
            if !grid.contains(spec.tile) {
                return Err(DoorError::OutOfBounds(spec.tile));
            }
            if !seen.insert(spec.tile) {
                return Err(DoorError::Duplicate(spec.tile));
            }
        }
        Ok(())
    }

    /// Registers a door, spawns its proxy and walls the edge if it starts closed.
    pub fn add<S>(
        &mut self,
        grid: &mut TileGrid,
        scene: &mut S,
        spec: DoorSpec,
    ) -> Result<EntityId, DoorError>
    where
        S: Scene + ?Sized,
    {
        if !grid.contains(spec.tile) {
            return Err(DoorError::OutOfBounds(spec.tile));
        }
        if self.doors.contains_key(&spec.tile) {
            return Err(DoorError::Duplicate(spec.tile));
        }

        let height = if spec.closed {
            LOWERED_HEIGHT
        } else {
            RAISED_HEIGHT
        };
        let position = Vec3::new(
            spec.tile.x() as f32 * TILE_SCALE + PROXY_INSET,
            height,
            spec.tile.z() as f32 * TILE_SCALE + PROXY_INSET,
        );
        let scale = Vec3::new(TILE_SCALE / 2.0, STOREY_HEIGHT / 2.0, TILE_SCALE / 2.0);
        let proxy = scene.make_entity(position, scale);

        let door = Door {
            tile: spec.tile,
            orientation: spec.orientation,
            closed: spec.closed,
            proxy,
        };
        if door.closed {
            grid.set_walls(door.tile, door.mask(), true);
        }
        let _ = self.doors.insert(door.tile, door);

        Ok(proxy)
    }

    /// Opens the door at the tile; returns `true` only on a closed → open transition.
    pub fn open<S>(&mut self, grid: &mut TileGrid, scene: &mut S, tile: TilePos) -> bool
    where
        S: Scene + ?Sized,
    {
        self.transition(grid, scene, tile, false)
    }

    /// Closes the door at the tile; returns `true` only on an open → closed transition.
    pub fn close<S>(&mut self, grid: &mut TileGrid, scene: &mut S, tile: TilePos) -> bool
    where
        S: Scene + ?Sized,
    {
        self.transition(grid, scene, tile, true)
    }

    /// Door registered at the tile, if any.
    #[must_use]
    pub fn get(&self, tile: TilePos) -> Option<&Door> {
        self.doors.get(&tile)
    }

    /// Iterates over the registered doors in tile order.
    pub fn iter(&self) -> impl Iterator<Item = &Door> {
        let mut doors: Vec<&Door> = self.doors.values().collect();
        doors.sort_by_key(|door| door.tile);
        doors.into_iter()
    }

    /// Number of registered doors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.doors.len()
    }

    /// Reports whether no doors are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.doors.is_empty()
    }

    fn transition<S>(&mut self, grid: &mut TileGrid, scene: &mut S, tile: TilePos, close: bool) -> bool
    where
        S: Scene + ?Sized,
    {
        let Some(door) = self.doors.get_mut(&tile) else {
            return false;
        };
        if door.closed == close {
            return false;
        }
        door.closed = close;

        grid.set_walls(door.tile, door.mask(), close);

        let mut position = scene.local_position(door.proxy);
        position.y = if close { LOWERED_HEIGHT } else { RAISED_HEIGHT };
        scene.set_position(door.proxy, position);

        debug!(x = tile.x(), z = tile.z(), closed = close, "door toggled");
        true
    }
}
