//! Versioned TOML level files and the errors raised while assembling a level.

use std::{fs, path::Path};

use serde::Deserialize;
use squirm_core::{Direction, DoorSpec, LevelLayout, TilePos};
use thiserror::Error;

use crate::doors::DoorError;

/// Level file format version understood by [`parse_layout`].
pub const SUPPORTED_LAYOUT_VERSION: u32 = 1;

/// Errors that can occur while loading or assembling a level.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// The level file is not valid TOML or misses required fields.
    #[error("level file is malformed: {0}")]
    Parse(#[from] toml::de::Error),
    /// The level file could not be read.
    #[error("failed to read level file {path}")]
    Io {
        /// Path that failed to load.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The level file declares a format version this build does not know.
    #[error("unsupported level version {found}, expected {expected}")]
    UnsupportedVersion {
        /// Version found in the file.
        found: u32,
        /// Version this build understands.
        expected: u32,
    },
    /// The grid has no tiles.
    #[error("level grid must not be empty (got {width}x{height})")]
    EmptyGrid {
        /// Declared number of columns.
        width: u32,
        /// Declared number of rows.
        height: u32,
    },
    /// A layer holds the wrong number of tiles or rows.
    #[error("layer `{layer}` has {found} entries, expected {expected}")]
    LayerSize {
        /// Name of the offending layer.
        layer: &'static str,
        /// Number of entries found.
        found: usize,
        /// Number of entries required by the grid size.
        expected: usize,
    },
    /// A single row of a layer has the wrong width.
    #[error("row {row} of layer `{layer}` has {found} tiles, expected {expected}")]
    RowWidth {
        /// Name of the offending layer.
        layer: &'static str,
        /// Zero-based row index.
        row: usize,
        /// Number of tiles found in the row.
        found: usize,
        /// Number of columns declared by the grid.
        expected: usize,
    },
    /// A door could not be registered.
    #[error(transparent)]
    Door(#[from] DoorError),
    /// The spawn tile lies outside the grid.
    #[error("spawn tile ({}, {}) lies outside the grid", .0.x(), .0.z())]
    SpawnOutOfBounds(TilePos),
    /// The rune tile lies outside the grid.
    #[error("rune tile ({}, {}) lies outside the grid", .0.x(), .0.z())]
    RuneOutOfBounds(TilePos),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LayoutFile {
    version: u32,
    width: u32,
    height: u32,
    spawn: TilePos,
    #[serde(default = "default_facing")]
    facing: Direction,
    #[serde(default)]
    rune: Option<TilePos>,
    walls: Vec<Vec<u32>>,
    #[serde(default)]
    special: Vec<Vec<u32>>,
    #[serde(default)]
    doors: Vec<DoorSpec>,
    #[serde(default)]
    debris: Vec<TilePos>,
}

const fn default_facing() -> Direction {
    Direction::North
}

/// Parses a level description from TOML source.
pub fn parse_layout(source: &str) -> Result<LevelLayout, LayoutError> {
    let file: LayoutFile = toml::from_str(source)?;
    if file.version != SUPPORTED_LAYOUT_VERSION {
        return Err(LayoutError::UnsupportedVersion {
            found: file.version,
            expected: SUPPORTED_LAYOUT_VERSION,
        });
    }
    if file.width == 0 || file.height == 0 {
        return Err(LayoutError::EmptyGrid {
            width: file.width,
            height: file.height,
        });
    }

    let walls = flatten_rows("walls", file.walls, file.width, file.height)?;
    let special = if file.special.is_empty() {
        vec![0; walls.len()]
    } else {
        flatten_rows("special", file.special, file.width, file.height)?
    };

    let inside = |tile: TilePos| {
        tile.x() >= 0
            && tile.z() >= 0
            && (tile.x() as u32) < file.width
            && (tile.z() as u32) < file.height
    };
    if !inside(file.spawn) {
        return Err(LayoutError::SpawnOutOfBounds(file.spawn));
    }
    if let Some(rune) = file.rune.filter(|rune| !inside(*rune)) {
        return Err(LayoutError::RuneOutOfBounds(rune));
    }

    Ok(LevelLayout {
        width: file.width,
        height: file.height,
        walls,
        special,
        doors: file.doors,
        spawn: file.spawn,
        facing: file.facing,
        rune: file.rune,
        debris: file.debris,
    })
}

/// Reads and parses a level file from disk.
pub fn load_layout(path: &Path) -> Result<LevelLayout, LayoutError> {
    let source = fs::read_to_string(path).map_err(|source| LayoutError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_layout(&source)
}

fn flatten_rows(
    layer: &'static str,
    rows: Vec<Vec<u32>>,
    width: u32,
    height: u32,
) -> Result<Vec<u32>, LayoutError> {
    let width = width as usize;
    let height = height as usize;
    if rows.len() != height {
        return Err(LayoutError::LayerSize {
            layer,
            found: rows.len(),
            expected: height,
        });
    }

    let mut values = Vec::with_capacity(width * height);
    for (row, cells) in rows.into_iter().enumerate() {
        if cells.len() != width {
            return Err(LayoutError::RowWidth {
                layer,
                row,
                found: cells.len(),
                expected: width,
            });
        }
        values.extend(cells);
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use squirm_core::DoorOrientation;

    const SMALL_LEVEL: &str = r#"
version = 1
width = 3
height = 2
spawn = { x = 1, z = 1 }
facing = "east"
rune = { x = 2, z = 0 }
walls = [
    [4, 3, 2],
    [2, 1, 0],
]

[[doors]]
tile = { x = 1, z = 0 }
orientation = "left"
closed = true
"#;

    #[test]
    fn parses_a_complete_level() {
        let layout = parse_layout(SMALL_LEVEL).expect("level parses");
        assert_eq!((layout.width, layout.height), (3, 2));
        assert_eq!(layout.walls, vec![4, 3, 2, 2, 1, 0]);
        assert_eq!(layout.special, vec![0; 6]);
        assert_eq!(layout.spawn, TilePos::new(1, 1));
        assert_eq!(layout.facing, Direction::East);
        assert_eq!(layout.rune, Some(TilePos::new(2, 0)));
        assert_eq!(
            layout.doors,
            vec![DoorSpec {
                tile: TilePos::new(1, 0),
                orientation: DoorOrientation::Left,
                closed: true,
            }]
        );
        assert!(layout.debris.is_empty());
    }

    #[test]
    fn rejects_unknown_versions() {
        let source = SMALL_LEVEL.replace("version = 1", "version = 7");
        assert!(matches!(
            parse_layout(&source),
            Err(LayoutError::UnsupportedVersion {
                found: 7,
                expected: 1
            })
        ));
    }

    #[test]
    fn rejects_ragged_rows() {
        let source = SMALL_LEVEL.replace("[2, 1, 0]", "[2, 1]");
        assert!(matches!(
            parse_layout(&source),
            Err(LayoutError::RowWidth {
                layer: "walls",
                row: 1,
                found: 2,
                expected: 3
            })
        ));
    }

    #[test]
    fn rejects_spawn_outside_the_grid() {
        let source = SMALL_LEVEL.replace("spawn = { x = 1, z = 1 }", "spawn = { x = 3, z = 0 }");
        assert!(matches!(
            parse_layout(&source),
            Err(LayoutError::SpawnOutOfBounds(tile)) if tile == TilePos::new(3, 0)
        ));
    }

    #[test]
    fn rejects_rune_outside_the_grid() {
        let source = SMALL_LEVEL.replace("rune = { x = 2, z = 0 }", "rune = { x = 0, z = 2 }");
        assert!(matches!(
            parse_layout(&source),
            Err(LayoutError::RuneOutOfBounds(tile)) if tile == TilePos::new(0, 2)
        ));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        assert!(matches!(
            parse_layout("version = "),
            Err(LayoutError::Parse(_))
        ));
    }
}
