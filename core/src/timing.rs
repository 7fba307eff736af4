//! Mode durations and the audio cue tracks that accompany each mode.
//!
//! Every accepted mode owns a fixed track of `(offset, cue)` marks measured
//! from the instant the mode started. Tracks may extend past the end of the
//! mode they belong to; the closing pant of a shape shift lands after the
//! player is already idle again.

use std::time::Duration;

use crate::{Cue, PlayerMode, Stature};

/// A single cue scheduled at a fixed offset from the start of its mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CueMark {
    offset_ms: u64,
    cue: Cue,
}

impl CueMark {
    /// Creates a new mark firing `cue` after `offset_ms` milliseconds.
    #[must_use]
    pub const fn new(offset_ms: u64, cue: Cue) -> Self {
        Self { offset_ms, cue }
    }

    /// Delay between the mode start and the cue.
    #[must_use]
    pub const fn offset(&self) -> Duration {
        Duration::from_millis(self.offset_ms)
    }

    /// Cue dispatched when the mark comes due.
    #[must_use]
    pub const fn cue(&self) -> Cue {
        self.cue
    }
}

const TURN: Duration = Duration::from_millis(400);
const FORWARD_FULL: Duration = Duration::from_millis(800);
const FORWARD_SMALL: Duration = Duration::from_millis(1_300);
const REVERSE_FULL: Duration = Duration::from_millis(900);
const REVERSE_SMALL: Duration = Duration::from_millis(1_500);
const SHAPE_SHIFT: Duration = Duration::from_secs(5);

const FORWARD_FULL_TRACK: [CueMark; 2] = [
    CueMark::new(200, Cue::FootStep),
    CueMark::new(600, Cue::FootStep),
];
const FORWARD_SMALL_TRACK: [CueMark; 1] = [CueMark::new(200, Cue::Drag)];
const REVERSE_FULL_TRACK: [CueMark; 2] = [
    CueMark::new(250, Cue::FootStep),
    CueMark::new(700, Cue::FootStep),
];
const REVERSE_SMALL_TRACK: [CueMark; 1] = [CueMark::new(300, Cue::Drag)];

const SHRINK_TRACK: [CueMark; 13] = [
    CueMark::new(800, Cue::Gore),
    CueMark::new(1_000, Cue::Scream1),
    CueMark::new(1_050, Cue::Gore),
    CueMark::new(1_300, Cue::Gore),
    CueMark::new(1_900, Cue::Gore),
    CueMark::new(2_400, Cue::Gore),
    CueMark::new(2_500, Cue::Scream2),
    CueMark::new(2_750, Cue::Gore),
    CueMark::new(3_600, Cue::Gore),
    CueMark::new(4_400, Cue::Gore),
    CueMark::new(4_650, Cue::Gore),
    CueMark::new(4_800, Cue::Gore),
    CueMark::new(5_300, Cue::Pant),
];

const EXPAND_TRACK: [CueMark; 12] = [
    CueMark::new(800, Cue::Gore),
    CueMark::new(1_050, Cue::Gore),
    CueMark::new(1_300, Cue::Gore),
    CueMark::new(1_900, Cue::Gore),
    CueMark::new(2_400, Cue::Gore),
    CueMark::new(2_500, Cue::Scream2),
    CueMark::new(2_750, Cue::Gore),
    CueMark::new(3_600, Cue::Gore),
    CueMark::new(4_400, Cue::Gore),
    CueMark::new(4_650, Cue::Gore),
    CueMark::new(4_800, Cue::Gore),
    CueMark::new(5_300, Cue::Pant),
];

/// Time the mode needs to run to completion for a player of the given stature.
#[must_use]
pub const fn mode_duration(mode: PlayerMode, stature: Stature) -> Duration {
    match (mode, stature) {
        (PlayerMode::Idle, _) => Duration::ZERO,
        (PlayerMode::TurnLeft | PlayerMode::TurnRight, _) => TURN,
        (PlayerMode::Forward, Stature::Full) => FORWARD_FULL,
        (PlayerMode::Forward, Stature::Small) => FORWARD_SMALL,
        (PlayerMode::Reverse, Stature::Full) => REVERSE_FULL,
        (PlayerMode::Reverse, Stature::Small) => REVERSE_SMALL,
        (PlayerMode::Shrink | PlayerMode::Expand, _) => SHAPE_SHIFT,
    }
}

/// Ordered cue track that accompanies the mode.
#[must_use]
pub fn cue_track(mode: PlayerMode, stature: Stature) -> &'static [CueMark] {
    match (mode, stature) {
        (PlayerMode::Idle | PlayerMode::TurnLeft | PlayerMode::TurnRight, _) => &[],
        (PlayerMode::Forward, Stature::Full) => &FORWARD_FULL_TRACK,
        (PlayerMode::Forward, Stature::Small) => &FORWARD_SMALL_TRACK,
        (PlayerMode::Reverse, Stature::Full) => &REVERSE_FULL_TRACK,
        (PlayerMode::Reverse, Stature::Small) => &REVERSE_SMALL_TRACK,
        (PlayerMode::Shrink, _) => &SHRINK_TRACK,
        (PlayerMode::Expand, _) => &EXPAND_TRACK,
    }
}
