//! Player state machine: tile-based movement animated over time.
//!
//! The player is always in exactly one [`PlayerMode`]. Any mode other than
//! idle runs for a fixed duration measured from the instant it was accepted;
//! each call to [`Player::step`] derives a pose from the normalised progress
//! and writes it to the scene. Logical state (tile, facing, stature) only
//! changes once the progress reaches one, after which the player is idle and
//! accepts new requests.

use std::{f32::consts::PI, time::Duration};

use glam::{Mat4, Quat, Vec3};
use squirm_core::{
    math::{
        angle_for_direction, degrees, ease_in_out, forward_from_angles, lerp, progress,
        rotation_from_angles, shortest_arc_target,
    },
    timing::mode_duration,
    tile_to_world, Direction, EdgeProperty, EntityId, ModeRejection, PlayerMode, Scene, Stature,
    TilePos,
};
use tracing::debug;

use crate::grid::TileGrid;

const FULL_HEIGHT: f32 = 1.3;
const SMALL_HEIGHT: f32 = 0.25;
const SMALL_THRESHOLD: f32 = 0.5;
const CRAWL_THRESHOLD: f32 = 0.4;
const MAX_BEND: f32 = PI / 12.0;

const SHRINK_HEIGHTS: [f32; 4] = [FULL_HEIGHT, 1.0, 0.8, SMALL_HEIGHT];
const EXPAND_HEIGHTS: [f32; 4] = [SMALL_HEIGHT, 0.4, 0.95, FULL_HEIGHT];
const SEGMENTS: [(f32, f32); 3] = [(0.2, 0.3), (0.5, 0.6), (0.9, 1.0)];

/// Accepted mode transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModeStart {
    /// Mode that became active.
    pub mode: PlayerMode,
    /// Stature of the player when the mode began.
    pub stature: Stature,
    /// Simulation time the mode started at.
    pub started_at: Duration,
    /// Time the mode needs to run to completion.
    pub duration: Duration,
}

/// Logical change committed when a mode completes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// A turn settled on a new facing.
    Turned(Direction),
    /// A move landed on a new tile.
    Moved(TilePos),
    /// A shape shift settled on a new stature.
    Reshaped(Stature),
}

/// Mode that ran to completion together with its committed outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Completion {
    /// Mode that finished.
    pub mode: PlayerMode,
    /// State committed at the end of the mode.
    pub outcome: Outcome,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct ShapeFrame {
    tilt: Vec3,
    height: f32,
}

/// Movement state of the player avatar.
#[derive(Clone, Debug)]
pub struct Player {
    entity: EntityId,
    mode: PlayerMode,
    mode_started_at: Duration,
    mode_duration: Duration,
    facing: Direction,
    target_facing: Direction,
    position: TilePos,
    target: TilePos,
    yaw: f32,
    pitch: f32,
    height: f32,
    tilt: Vec3,
    has_rune: bool,
}

impl Player {
    /// Creates an idle, full-size player facing north at the origin tile.
    #[must_use]
    pub fn new(entity: EntityId) -> Self {
        Self {
            entity,
            mode: PlayerMode::Idle,
            mode_started_at: Duration::ZERO,
            mode_duration: Duration::ZERO,
            facing: Direction::North,
            target_facing: Direction::North,
            position: TilePos::new(0, 0),
            target: TilePos::new(0, 0),
            yaw: angle_for_direction(Direction::North),
            pitch: 0.0,
            height: FULL_HEIGHT,
            tilt: Vec3::ZERO,
            has_rune: false,
        }
    }

    /// Scene entity driven by the player.
    #[must_use]
    pub const fn entity(&self) -> EntityId {
        self.entity
    }

    /// Currently active mode.
    #[must_use]
    pub const fn mode(&self) -> PlayerMode {
        self.mode
    }

    /// Simulation time the active mode started at.
    #[must_use]
    pub const fn mode_started_at(&self) -> Duration {
        self.mode_started_at
    }

    /// Duration of the active mode.
    #[must_use]
    pub const fn mode_duration(&self) -> Duration {
        self.mode_duration
    }

    /// Committed facing.
    #[must_use]
    pub const fn facing(&self) -> Direction {
        self.facing
    }

    /// Committed tile.
    #[must_use]
    pub const fn position(&self) -> TilePos {
        self.position
    }

    /// Destination tile while a move is in progress.
    #[must_use]
    pub fn target(&self) -> Option<TilePos> {
        self.mode.is_travel().then_some(self.target)
    }

    /// Current yaw in radians.
    #[must_use]
    pub const fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Externally driven pitch in radians.
    #[must_use]
    pub const fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Vertical scale of the player.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Transient tilt applied while shape shifting.
    #[must_use]
    pub const fn tilt(&self) -> Vec3 {
        self.tilt
    }

    /// Whether the rune has been collected.
    #[must_use]
    pub const fn has_rune(&self) -> bool {
        self.has_rune
    }

    /// Reports whether the player is shrunk down.
    #[must_use]
    pub fn is_small(&self) -> bool {
        self.height < SMALL_THRESHOLD
    }

    /// Posture class derived from the height.
    #[must_use]
    pub fn stature(&self) -> Stature {
        if self.is_small() {
            Stature::Small
        } else {
            Stature::Full
        }
    }

    /// Base orientation built from pitch and yaw.
    #[must_use]
    pub fn rotation(&self) -> Quat {
        rotation_from_angles(Vec3::new(self.pitch, self.yaw, 0.0))
    }

    /// Moves the player onto a tile without animating; ignored unless idle.
    pub fn place<S>(&mut self, scene: &mut S, tile: TilePos, facing: Direction) -> bool
    where
        S: Scene + ?Sized,
    {
        if self.mode != PlayerMode::Idle {
            return false;
        }
        self.position = tile;
        self.target = tile;
        self.facing = facing;
        self.target_facing = facing;
        self.yaw = angle_for_direction(facing);
        scene.set_position_and_rotation(
            self.entity,
            tile.world_position(self.height),
            self.rotation(),
        );
        true
    }

    /// Sets the pitch from a bend factor in `-1.0..=1.0`.
    pub fn set_bend(&mut self, bend: f32) {
        let bend = if bend.is_nan() { 0.0 } else { bend.clamp(-1.0, 1.0) };
        self.pitch = MAX_BEND * bend;
    }

    /// Hands the rune to the player; returns `true` the first time only.
    pub fn grant_rune(&mut self) -> bool {
        if self.has_rune {
            return false;
        }
        self.has_rune = true;
        true
    }

    /// Attempts to enter a new mode.
    ///
    /// A rejected request leaves the player untouched. `can_enter` is asked
    /// about the destination tile of a move after the edge checks pass.
    pub fn try_set_mode<F>(
        &mut self,
        request: PlayerMode,
        now: Duration,
        grid: Option<&TileGrid>,
        can_enter: F,
    ) -> Result<ModeStart, ModeRejection>
    where
        F: FnOnce(TilePos, Stature) -> bool,
    {
        let Some(grid) = grid else {
            return Err(ModeRejection::NoLevel);
        };
        if self.mode != PlayerMode::Idle {
            return Err(ModeRejection::Busy);
        }
        if request == PlayerMode::Idle {
            return Err(ModeRejection::Unsupported);
        }
        if request.is_shape_shift() && !self.has_rune {
            return Err(ModeRejection::MissingRune);
        }

        let stature = self.stature();
        let mut target = self.position;
        if request.is_travel() {
            let heading = if request == PlayerMode::Forward {
                self.facing
            } else {
                self.facing.reversed()
            };
            let edge = grid.edge_info(self.position, heading);
            if edge.wall {
                match edge.property {
                    EdgeProperty::Crawl if self.height > CRAWL_THRESHOLD => {
                        return Err(ModeRejection::TooTallToCrawl);
                    }
                    EdgeProperty::Crawl => {}
                    _ => return Err(ModeRejection::Blocked),
                }
            }

            target = self.position.step(heading);
            if !grid.contains(target) {
                return Err(ModeRejection::Blocked);
            }
            if !can_enter(target, stature) {
                return Err(ModeRejection::Occupied);
            }
        }

        self.mode = request;
        self.mode_started_at = now;
        self.mode_duration = mode_duration(request, stature);
        self.target = target;
        self.target_facing = match request {
            PlayerMode::TurnLeft => self.facing.turned_left(),
            PlayerMode::TurnRight => self.facing.turned_right(),
            _ => self.facing,
        };

        debug!(mode = ?request, ?stature, at_ms = now.as_millis() as u64, "mode started");
        Ok(ModeStart {
            mode: request,
            stature,
            started_at: now,
            duration: self.mode_duration,
        })
    }

    /// Advances the active mode to `now`, writing the pose into the scene.
    ///
    /// Returns the committed outcome once the mode has run to completion.
    pub fn step<S>(&mut self, now: Duration, scene: &mut S) -> Option<Completion>
    where
        S: Scene + ?Sized,
    {
        if self.mode == PlayerMode::Idle {
            return None;
        }

        let ratio = progress(now, self.mode_started_at, self.mode_duration);
        match self.mode {
            PlayerMode::TurnLeft | PlayerMode::TurnRight => {
                let from = angle_for_direction(self.facing);
                let to = shortest_arc_target(from, angle_for_direction(self.target_facing));
                self.yaw = lerp(from, to, ease_in_out(ratio));
                scene.set_rotation(self.entity, self.rotation());
            }
            PlayerMode::Forward | PlayerMode::Reverse => {
                let x = lerp(self.position.x() as f32, self.target.x() as f32, ratio);
                let z = lerp(self.position.z() as f32, self.target.z() as f32, ratio);
                scene.set_position(self.entity, tile_to_world(x, z, self.height));
            }
            PlayerMode::Shrink | PlayerMode::Expand => {
                if let Some(frame) = shape_frame(self.mode, ratio) {
                    self.tilt = frame.tilt;
                    self.height = frame.height;
                    self.write_shape_pose(scene);
                }
            }
            PlayerMode::Idle => {}
        }

        if ratio < 1.0 {
            return None;
        }

        let mode = self.mode;
        let outcome = match mode {
            PlayerMode::TurnLeft | PlayerMode::TurnRight => {
                self.facing = self.target_facing;
                self.yaw = angle_for_direction(self.facing);
                scene.set_rotation(self.entity, self.rotation());
                Outcome::Turned(self.facing)
            }
            PlayerMode::Forward | PlayerMode::Reverse => {
                self.position = self.target;
                Outcome::Moved(self.position)
            }
            _ => {
                self.tilt = Vec3::ZERO;
                self.height = if mode == PlayerMode::Shrink {
                    SMALL_HEIGHT
                } else {
                    FULL_HEIGHT
                };
                self.write_shape_pose(scene);
                Outcome::Reshaped(self.stature())
            }
        };
        self.mode = PlayerMode::Idle;

        debug!(?mode, ?outcome, "mode completed");
        Some(Completion { mode, outcome })
    }

    /// Look-at transform from the player's eye along its tilted facing.
    #[must_use]
    pub fn view_matrix<S>(&self, scene: &S) -> Mat4
    where
        S: Scene + ?Sized,
    {
        let eye = scene.world_position(self.entity);
        let direction = forward_from_angles(
            Vec3::new(self.pitch, self.yaw, 0.0) + self.tilt,
        );
        Mat4::look_at_rh(eye, eye + direction, Vec3::Y)
    }

    fn write_shape_pose<S>(&self, scene: &mut S)
    where
        S: Scene + ?Sized,
    {
        let rotation = rotation_from_angles(self.tilt) * self.rotation();
        scene.set_position_and_rotation(
            self.entity,
            self.position.world_position(self.height),
            rotation,
        );
    }
}

fn tilt_keyframes() -> [Vec3; 4] {
    [
        Vec3::ZERO,
        degrees(5.0, -10.0, 15.0),
        degrees(-7.0, 4.0, -4.0),
        Vec3::ZERO,
    ]
}

// Before the first segment the pose is left alone; in a gap it holds the
// end of the previous segment.
fn shape_frame(mode: PlayerMode, ratio: f32) -> Option<ShapeFrame> {
    let heights = match mode {
        PlayerMode::Shrink => SHRINK_HEIGHTS,
        PlayerMode::Expand => EXPAND_HEIGHTS,
        _ => return None,
    };
    let tilts = tilt_keyframes();

    let mut settled = None;
    for (index, (start, end)) in SEGMENTS.iter().copied().enumerate() {
        if ratio < start {
            break;
        }
        if ratio <= end {
            let t = ease_in_out((ratio - start) / (end - start));
            return Some(ShapeFrame {
                tilt: tilts[index].lerp(tilts[index + 1], t),
                height: lerp(heights[index], heights[index + 1], t),
            });
        }
        settled = Some(ShapeFrame {
            tilt: tilts[index + 1],
            height: heights[index + 1],
        });
    }
    settled
}
