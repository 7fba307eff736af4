//! Tiles that fire side effects when a move lands on them.
//!
//! Door closures come from a fixed table. The rune tile is declared by the
//! level layout.

use squirm_core::TilePos;

/// Side effect fired when the player finishes a move on a trigger tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerEffect {
    /// Lowers the door registered at the tile.
    CloseDoor(TilePos),
    /// Hands the rune to the player the first time the tile is reached.
    GrantRune,
}

const TRIGGERS: [(TilePos, TriggerEffect); 4] = [
    // Force the rune to be used once it has been collected.
    (TilePos::new(12, 10), TriggerEffect::CloseDoor(TilePos::new(11, 12))),
    // Seal off the starting area.
    (TilePos::new(2, 8), TriggerEffect::CloseDoor(TilePos::new(2, 10))),
    (TilePos::new(13, 8), TriggerEffect::CloseDoor(TilePos::new(13, 8))),
    (TilePos::new(0, 1), TriggerEffect::CloseDoor(TilePos::new(0, 1))),
];

/// Door effect bound to the tile in the fixed table, if any.
#[must_use]
pub fn trigger_at(tile: TilePos) -> Option<TriggerEffect> {
    TRIGGERS
        .iter()
        .find(|(trigger, _)| *trigger == tile)
        .map(|(_, effect)| *effect)
}

/// Every effect fired by landing on `tile`, the rune pickup first.
pub fn effects_at(tile: TilePos, rune: Option<TilePos>) -> impl Iterator<Item = TriggerEffect> {
    let pickup = (rune == Some(tile)).then_some(TriggerEffect::GrantRune);
    pickup.into_iter().chain(trigger_at(tile))
}
