//! Per-side territory ledger.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::game::{Coord, SpecialItem};

/// Identity of one of the two combatants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum SideId {
    /// First to move; seeded in the top-left corner.
    A,
    /// Second to move; seeded in the bottom-right corner.
    B,
}

impl SideId {
    /// Both sides in turn order.
    pub const BOTH: [SideId; 2] = [SideId::A, SideId::B];

    /// Index into per-side arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            SideId::A => 0,
            SideId::B => 1,
        }
    }

    /// The other side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            SideId::A => SideId::B,
            SideId::B => SideId::A,
        }
    }

    /// Board glyph for this side's cells.
    #[must_use]
    pub const fn mark(self) -> char {
        match self {
            SideId::A => 'X',
            SideId::B => 'O',
        }
    }
}

impl fmt::Display for SideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SideId::A => write!(f, "A"),
            SideId::B => write!(f, "B"),
        }
    }
}

/// Territory held by a side, plus the captured items it holds.
///
/// `power` and `magic` are always subsets of `owned`; [`Side::release`]
/// cascades out of both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Side {
    /// Which side this ledger belongs to.
    pub id: SideId,
    owned: BTreeSet<Coord>,
    power: BTreeSet<Coord>,
    magic: BTreeSet<Coord>,
}

impl Side {
    /// Create a side owning only its seed cell.
    #[must_use]
    pub fn new(id: SideId, seed: Coord) -> Self {
        let mut owned = BTreeSet::new();
        owned.insert(seed);

        Self {
            id,
            owned,
            power: BTreeSet::new(),
            magic: BTreeSet::new(),
        }
    }

    /// Add a cell to the territory. Returns `false` if already owned.
    pub fn claim(&mut self, coord: Coord) -> bool {
        self.owned.insert(coord)
    }

    /// Remove a cell from the territory, dropping any item held there.
    ///
    /// Returns the held item, if there was one.
    pub fn release(&mut self, coord: Coord) -> Option<SpecialItem> {
        if !self.owned.remove(&coord) {
            return None;
        }
        self.drop_item(coord)
    }

    /// Record a captured PowerSource or MagicWell at an owned cell.
    ///
    /// Returns `false` (and records nothing) if the cell is not owned or
    /// the item is a shield.
    pub fn hold(&mut self, coord: Coord, item: SpecialItem) -> bool {
        if !self.owned.contains(&coord) {
            return false;
        }
        match item {
            SpecialItem::PowerSource => self.power.insert(coord),
            SpecialItem::MagicWell => self.magic.insert(coord),
            SpecialItem::Shield => false,
        }
    }

    /// Forget the item held at a cell without giving up the cell.
    pub fn drop_item(&mut self, coord: Coord) -> Option<SpecialItem> {
        if self.power.remove(&coord) {
            Some(SpecialItem::PowerSource)
        } else if self.magic.remove(&coord) {
            Some(SpecialItem::MagicWell)
        } else {
            None
        }
    }

    /// Item held at a cell, if any.
    #[must_use]
    pub fn held_item(&self, coord: Coord) -> Option<SpecialItem> {
        if self.power.contains(&coord) {
            Some(SpecialItem::PowerSource)
        } else if self.magic.contains(&coord) {
            Some(SpecialItem::MagicWell)
        } else {
            None
        }
    }

    /// Whether the side owns a cell.
    #[must_use]
    pub fn owns(&self, coord: Coord) -> bool {
        self.owned.contains(&coord)
    }

    /// Owned cells in row-major order.
    #[must_use]
    pub fn owned(&self) -> &BTreeSet<Coord> {
        &self.owned
    }

    /// Cells holding a captured PowerSource.
    #[must_use]
    pub fn power_sources(&self) -> &BTreeSet<Coord> {
        &self.power
    }

    /// Cells holding a captured MagicWell.
    #[must_use]
    pub fn magic_wells(&self) -> &BTreeSet<Coord> {
        &self.magic
    }

    /// Number of owned cells.
    #[must_use]
    pub fn territory(&self) -> usize {
        self.owned.len()
    }

    /// Whether the attack bonus applies.
    #[must_use]
    pub fn has_power(&self) -> bool {
        !self.power.is_empty()
    }

    /// Whether the side may nominate a MagicWell target.
    #[must_use]
    pub fn has_magic(&self) -> bool {
        !self.magic.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_creation() {
        let side = Side::new(SideId::A, Coord::new(0, 0));
        assert_eq!(side.territory(), 1);
        assert!(side.owns(Coord::new(0, 0)));
        assert!(!side.has_power());
        assert!(!side.has_magic());
    }

    #[test]
    fn test_hold_requires_ownership() {
        let mut side = Side::new(SideId::A, Coord::new(0, 0));
        assert!(!side.hold(Coord::new(1, 1), SpecialItem::PowerSource));
        assert!(!side.has_power());

        assert!(side.hold(Coord::new(0, 0), SpecialItem::PowerSource));
        assert!(side.has_power());
        assert!(!side.hold(Coord::new(0, 0), SpecialItem::Shield));
    }

    #[test]
    fn test_release_cascades_to_held_items() {
        let mut side = Side::new(SideId::B, Coord::new(4, 4));
        side.claim(Coord::new(4, 3));
        side.hold(Coord::new(4, 3), SpecialItem::MagicWell);
        assert!(side.has_magic());

        assert_eq!(side.release(Coord::new(4, 3)), Some(SpecialItem::MagicWell));
        assert!(!side.owns(Coord::new(4, 3)));
        assert!(!side.has_magic());
        assert_eq!(side.release(Coord::new(4, 3)), None);
    }

    #[test]
    fn test_drop_item_keeps_cell() {
        let mut side = Side::new(SideId::A, Coord::new(0, 0));
        side.hold(Coord::new(0, 0), SpecialItem::PowerSource);
        assert_eq!(side.drop_item(Coord::new(0, 0)), Some(SpecialItem::PowerSource));
        assert!(side.owns(Coord::new(0, 0)));
        assert_eq!(side.held_item(Coord::new(0, 0)), None);
    }

    #[test]
    fn test_side_id_helpers() {
        assert_eq!(SideId::A.opponent(), SideId::B);
        assert_eq!(SideId::B.opponent(), SideId::A);
        assert_eq!(SideId::A.mark(), 'X');
        assert_eq!(SideId::B.index(), 1);
    }
}
