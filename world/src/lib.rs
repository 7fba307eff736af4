#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for Squirm.
//!
//! The world owns the decoded level (tile grid and doors), the player state
//! machine and the simulation clock. Every mutation goes through [`apply`],
//! which reports what happened as [`Event`] values; read access goes through
//! the [`query`] module.

use std::{fmt, time::Duration};

use squirm_core::{Command, EntityId, Event, LevelLayout, Scene, Stature, TilePos};
use tracing::{debug, warn};

pub mod doors;
pub mod grid;
pub mod layout;
pub mod player;
pub mod scene;
pub mod triggers;

pub use doors::{Door, DoorError, DoorRegistry};
pub use grid::{EdgeMask, SpecialCell, TileGrid, WallCell};
pub use layout::{load_layout, parse_layout, LayoutError};
pub use player::{Completion, ModeStart, Outcome, Player};
pub use scene::SceneGraph;
pub use triggers::{effects_at, trigger_at, TriggerEffect};

/// Rule deciding whether the player may enter a tile at a given stature.
pub type EntryRule = Box<dyn Fn(TilePos, Stature) -> bool>;

#[derive(Debug)]
struct Level {
    grid: TileGrid,
    doors: DoorRegistry,
    rune: Option<TilePos>,
}

impl Level {
    fn assemble<S>(scene: &mut S, layout: &LevelLayout) -> Result<Self, LayoutError>
    where
        S: Scene + ?Sized,
    {
        let mut grid = TileGrid::from_layout(layout)?;
        if !grid.contains(layout.spawn) {
            return Err(LayoutError::SpawnOutOfBounds(layout.spawn));
        }
        if let Some(rune) = layout.rune.filter(|rune| !grid.contains(*rune)) {
            return Err(LayoutError::RuneOutOfBounds(rune));
        }
        DoorRegistry::validate(&grid, &layout.doors)?;
        let mut doors = DoorRegistry::new();
        for spec in &layout.doors {
            let _ = doors.add(&mut grid, scene, *spec)?;
        }
        Ok(Self {
            grid,
            doors,
            rune: layout.rune,
        })
    }
}

/// Represents the authoritative Squirm world state.
pub struct World {
    clock: Duration,
    level: Option<Level>,
    player: Player,
    entry_rule: EntryRule,
}

impl World {
    /// Creates a world without a level, driving the provided player entity.
    #[must_use]
    pub fn new(player: EntityId) -> Self {
        Self {
            clock: Duration::ZERO,
            level: None,
            player: Player::new(player),
            entry_rule: Box::new(|_, _| true),
        }
    }

    /// Replaces the rule consulted before the player enters a tile.
    pub fn set_entry_rule<F>(&mut self, rule: F)
    where
        F: Fn(TilePos, Stature) -> bool + 'static,
    {
        self.entry_rule = Box::new(rule);
    }

    fn complete<S>(&mut self, completion: Completion, scene: &mut S, out_events: &mut Vec<Event>)
    where
        S: Scene + ?Sized,
    {
        match completion.outcome {
            Outcome::Turned(facing) => out_events.push(Event::FacingChanged { facing }),
            Outcome::Reshaped(stature) => out_events.push(Event::StatureChanged { stature }),
            Outcome::Moved(tile) => {
                let rune = self.level.as_ref().and_then(|level| level.rune);
                for effect in effects_at(tile, rune) {
                    match effect {
                        TriggerEffect::CloseDoor(door) => {
                            if let Some(level) = self.level.as_mut() {
                                if level.doors.close(&mut level.grid, scene, door) {
                                    debug!(x = door.x(), z = door.z(), "trigger closed door");
                                    out_events.push(Event::DoorClosed { tile: door });
                                }
                            }
                        }
                        TriggerEffect::GrantRune => {
                            if self.player.grant_rune() {
                                debug!(x = tile.x(), z = tile.z(), "rune collected");
                                out_events.push(Event::RuneFound { tile });
                            }
                        }
                    }
                }
                out_events.push(Event::PositionReached { tile });
            }
        }
        out_events.push(Event::ModeCompleted {
            mode: completion.mode,
        });
    }
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("clock", &self.clock)
            .field("level", &self.level)
            .field("player", &self.player)
            .finish_non_exhaustive()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply<S>(world: &mut World, scene: &mut S, command: Command, out_events: &mut Vec<Event>)
where
    S: Scene + ?Sized,
{
    match command {
        Command::LoadLevel { layout } => match Level::assemble(scene, &layout) {
            Ok(level) => {
                let (width, height) = (level.grid.width(), level.grid.height());
                world.level = Some(level);
                world.player = Player::new(world.player.entity());
                let _ = world.player.place(scene, layout.spawn, layout.facing);
                debug!(width, height, "level loaded");
                out_events.push(Event::LevelLoaded { width, height });
            }
            Err(error) => warn!(%error, "level rejected"),
        },
        Command::PlacePlayer { tile, facing } => {
            if !world.player.place(scene, tile, facing) {
                debug!(x = tile.x(), z = tile.z(), "placement ignored while moving");
            }
        }
        Command::RequestMode { mode } => {
            let grid = world.level.as_ref().map(|level| &level.grid);
            let rule = &world.entry_rule;
            match world
                .player
                .try_set_mode(mode, world.clock, grid, |tile, stature| rule(tile, stature))
            {
                Ok(start) => out_events.push(Event::ModeStarted {
                    mode: start.mode,
                    stature: start.stature,
                    started_at: start.started_at,
                    duration: start.duration,
                }),
                Err(reason) => {
                    debug!(?mode, ?reason, "mode rejected");
                    out_events.push(Event::ModeRejected { mode, reason });
                }
            }
        }
        Command::SetBend { bend } => world.player.set_bend(bend),
        Command::OpenDoor { tile } => {
            if let Some(level) = world.level.as_mut() {
                if level.doors.open(&mut level.grid, scene, tile) {
                    out_events.push(Event::DoorOpened { tile });
                }
            }
        }
        Command::CloseDoor { tile } => {
            if let Some(level) = world.level.as_mut() {
                if level.doors.close(&mut level.grid, scene, tile) {
                    out_events.push(Event::DoorClosed { tile });
                }
            }
        }
        Command::Tick { dt } => {
            world.clock = world.clock.saturating_add(dt);
            out_events.push(Event::TimeAdvanced {
                dt,
                now: world.clock,
            });
            if let Some(completion) = world.player.step(world.clock, scene) {
                world.complete(completion, scene, out_events);
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use glam::Mat4;
    use squirm_core::{Direction, EdgeInfo, Scene, TilePos};

    use super::{DoorRegistry, Player, TileGrid, World};

    /// Current simulation time.
    #[must_use]
    pub fn clock(world: &World) -> Duration {
        world.clock
    }

    /// Read-only view of the player state machine.
    #[must_use]
    pub fn player(world: &World) -> &Player {
        &world.player
    }

    /// Decoded grid of the active level, if one is loaded.
    #[must_use]
    pub fn grid(world: &World) -> Option<&TileGrid> {
        world.level.as_ref().map(|level| &level.grid)
    }

    /// Doors of the active level, if one is loaded.
    #[must_use]
    pub fn doors(world: &World) -> Option<&DoorRegistry> {
        world.level.as_ref().map(|level| &level.doors)
    }

    /// Edge crossed leaving `tile` toward `facing`; solid when no level is loaded.
    #[must_use]
    pub fn edge_info(world: &World, tile: TilePos, facing: Direction) -> EdgeInfo {
        grid(world).map_or(EdgeInfo::SOLID, |grid| grid.edge_info(tile, facing))
    }

    /// View transform of the player camera.
    #[must_use]
    pub fn view_matrix<S>(world: &World, scene: &S) -> Mat4
    where
        S: Scene + ?Sized,
    {
        world.player.view_matrix(scene)
    }
}
