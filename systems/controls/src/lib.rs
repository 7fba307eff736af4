#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Input mapping from held keys and pointer offsets to world commands.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use squirm_core::{math::ease_in_out, Command, PlayerMode};
use thiserror::Error;

const BEND_DEAD_ZONE: f32 = 0.75;

/// Physical keys the game listens to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// The `A` key.
    A,
    /// The `D` key.
    D,
    /// The `E` key.
    E,
    /// The `Q` key.
    Q,
    /// The `S` key.
    S,
    /// The `W` key.
    W,
    /// The `Z` key.
    Z,
}

impl Key {
    /// Maps a character to the key carrying that label.
    #[must_use]
    pub fn from_char(label: char) -> Option<Self> {
        match label.to_ascii_lowercase() {
            'a' => Some(Self::A),
            'd' => Some(Self::D),
            'e' => Some(Self::E),
            'q' => Some(Self::Q),
            's' => Some(Self::S),
            'w' => Some(Self::W),
            'z' => Some(Self::Z),
            _ => None,
        }
    }
}

/// Logical actions a key can be bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyCommand {
    /// Turn a quarter to the left.
    Left,
    /// Turn a quarter to the right.
    Right,
    /// Step forward.
    Forward,
    /// Step backward.
    Backward,
    /// Use the rune to change size.
    Use,
}

/// Order in which held actions are considered; the first held one wins.
pub const PRIORITY: [KeyCommand; 5] = [
    KeyCommand::Left,
    KeyCommand::Right,
    KeyCommand::Forward,
    KeyCommand::Backward,
    KeyCommand::Use,
];

/// Keyboard layouts with their own movement bindings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyboardLayout {
    /// US and UK style layout.
    #[default]
    Qwerty,
    /// Central European layout.
    Qwertz,
    /// French and Belgian layout.
    Azerty,
}

impl KeyboardLayout {
    /// Key bound to the action on this layout.
    #[must_use]
    pub const fn key_for(self, command: KeyCommand) -> Key {
        match (command, self) {
            (KeyCommand::Forward, Self::Azerty) => Key::Z,
            (KeyCommand::Forward, _) => Key::W,
            (KeyCommand::Backward, _) => Key::S,
            (KeyCommand::Left, Self::Azerty) => Key::Q,
            (KeyCommand::Left, _) => Key::A,
            (KeyCommand::Right, _) => Key::D,
            (KeyCommand::Use, _) => Key::E,
        }
    }
}

/// Error returned when a keyboard layout name is not recognised.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown keyboard layout `{0}`, expected qwerty, qwertz or azerty")]
pub struct UnknownLayout(String);

impl FromStr for KeyboardLayout {
    type Err = UnknownLayout;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "qwerty" => Ok(Self::Qwerty),
            "qwertz" => Ok(Self::Qwertz),
            "azerty" => Ok(Self::Azerty),
            _ => Err(UnknownLayout(value.to_owned())),
        }
    }
}

/// Pure system that turns held keys into mode requests.
#[derive(Clone, Copy, Debug, Default)]
pub struct Controls {
    layout: KeyboardLayout,
}

impl Controls {
    /// Creates the controls for the provided layout.
    #[must_use]
    pub const fn new(layout: KeyboardLayout) -> Self {
        Self { layout }
    }

    /// Layout the controls are bound to.
    #[must_use]
    pub const fn layout(&self) -> KeyboardLayout {
        self.layout
    }

    /// Mode requested by the held keys, if any.
    ///
    /// Using the rune asks to expand while small and to shrink otherwise.
    #[must_use]
    pub fn requested_mode(&self, held: &[Key], is_small: bool) -> Option<PlayerMode> {
        let command = PRIORITY
            .into_iter()
            .find(|command| held.contains(&self.layout.key_for(*command)))?;
        Some(match command {
            KeyCommand::Left => PlayerMode::TurnLeft,
            KeyCommand::Right => PlayerMode::TurnRight,
            KeyCommand::Forward => PlayerMode::Forward,
            KeyCommand::Backward => PlayerMode::Reverse,
            KeyCommand::Use if is_small => PlayerMode::Expand,
            KeyCommand::Use => PlayerMode::Shrink,
        })
    }

    /// Emits the request for the held keys; re-issued every frame while held.
    pub fn handle(&self, held: &[Key], is_small: bool, out: &mut Vec<Command>) {
        if let Some(mode) = self.requested_mode(held, is_small) {
            out.push(Command::RequestMode { mode });
        }
    }
}

/// Converts a vertical pointer offset in `-1.0..=1.0` into a bend factor.
///
/// Offsets inside the central dead zone leave the view level.
#[must_use]
pub fn bend_from_pointer(offset: f32) -> f32 {
    if offset.is_nan() {
        return 0.0;
    }
    let offset = offset.clamp(-1.0, 1.0);
    let magnitude = offset.abs();
    if magnitude < BEND_DEAD_ZONE {
        return 0.0;
    }
    let scaled = (magnitude - BEND_DEAD_ZONE) / (1.0 - BEND_DEAD_ZONE);
    offset.signum() * ease_in_out(scaled)
}
