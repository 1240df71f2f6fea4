//! Coordinates, ownership grid and special-item overlay.

use std::collections::HashMap;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::CoordParseError;
use crate::game::SideId;

/// A cell position, 0-indexed.
///
/// Displayed as a row letter followed by a 1-based column number, so
/// `Coord::new(1, 2)` is `B3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    /// Row index (`A` = 0).
    pub row: u8,
    /// Column index (`1` = 0).
    pub col: u8,
}

impl Coord {
    /// Create a new coordinate.
    #[must_use]
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Get orthogonal neighbours inside a `size`×`size` grid.
    ///
    /// Returns a fixed-size array and count to avoid heap allocation.
    /// The array contains valid coordinates in indices 0..count.
    #[must_use]
    #[inline]
    pub fn adjacent(&self, size: u8) -> ([Coord; 4], u8) {
        let mut result = [Coord::new(0, 0); 4];
        let mut count = 0u8;

        if self.row > 0 {
            result[count as usize] = Coord::new(self.row - 1, self.col); // up
            count += 1;
        }
        if self.row + 1 < size {
            result[count as usize] = Coord::new(self.row + 1, self.col); // down
            count += 1;
        }
        if self.col > 0 {
            result[count as usize] = Coord::new(self.row, self.col - 1); // left
            count += 1;
        }
        if self.col + 1 < size {
            result[count as usize] = Coord::new(self.row, self.col + 1); // right
            count += 1;
        }

        (result, count)
    }

    /// Manhattan distance to another coordinate.
    #[must_use]
    pub const fn manhattan(&self, other: Coord) -> u16 {
        (self.row.abs_diff(other.row) as u16) + (self.col.abs_diff(other.col) as u16)
    }

    /// Parse `<row letter><column number>` for a `size`×`size` grid.
    ///
    /// The row letter is case-insensitive and surrounding whitespace is
    /// ignored; nothing may sit between the letter and the number.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed text or a cell beyond the grid.
    pub fn parse(text: &str, size: u8) -> Result<Self, CoordParseError> {
        let token = text.trim();
        let mut chars = token.chars();
        let letter = chars.next().ok_or(CoordParseError::Empty)?;
        let digits = chars.as_str();

        if !letter.is_ascii_alphabetic()
            || digits.is_empty()
            || !digits.chars().all(|c| c.is_ascii_digit())
        {
            return Err(CoordParseError::Malformed(token.to_string()));
        }

        let row = letter.to_ascii_uppercase() as u32 - 'A' as u32;
        let column: u32 = digits
            .parse()
            .map_err(|_| CoordParseError::OutOfRange(token.to_string()))?;

        if row >= u32::from(size) || column == 0 || column > u32::from(size) {
            return Err(CoordParseError::OutOfRange(token.to_string()));
        }

        #[allow(clippy::cast_possible_truncation)]
        Ok(Self::new(row as u8, (column - 1) as u8))
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = char::from(b'A' + self.row);
        write!(f, "{letter}{}", u16::from(self.col) + 1)
    }
}

impl Serialize for Coord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Ownership mark of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellMark {
    /// Unclaimed.
    #[default]
    Empty,
    /// Claimed by a side.
    Owned(SideId),
}

impl CellMark {
    /// Owner of the cell, if any.
    #[must_use]
    pub const fn owner(self) -> Option<SideId> {
        match self {
            CellMark::Empty => None,
            CellMark::Owned(side) => Some(side),
        }
    }
}

/// Items that can sit on a cell independently of its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SpecialItem {
    /// Grants its holder an attack bonus.
    PowerSource,
    /// Lets its holder boost one owned cell's defense for one enemy turn.
    MagicWell,
    /// Grants the cell a defense bonus.
    Shield,
}

impl SpecialItem {
    /// All item kinds, in placement order.
    pub const ALL: [SpecialItem; 3] = [
        SpecialItem::PowerSource,
        SpecialItem::MagicWell,
        SpecialItem::Shield,
    ];

    /// Single-letter glyph used by the renderer and the prompt.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            SpecialItem::PowerSource => 'P',
            SpecialItem::MagicWell => 'M',
            SpecialItem::Shield => 'S',
        }
    }

    /// Items a side captures and holds in its ledger.
    #[must_use]
    pub const fn is_holdable(self) -> bool {
        matches!(self, SpecialItem::PowerSource | SpecialItem::MagicWell)
    }
}

/// The game board.
///
/// Ownership is a dense row-major grid; special items live in a sparse
/// overlay keyed by coordinate so the two can change independently.
#[derive(Debug, Clone)]
pub struct Board {
    /// Side length of the grid.
    size: u8,
    /// Marks stored in row-major order.
    cells: Vec<CellMark>,
    /// Special items by coordinate.
    specials: HashMap<Coord, SpecialItem>,
}

impl Board {
    /// Create an empty board.
    ///
    /// Returns `None` if `size` is zero.
    #[must_use]
    pub fn new(size: u8) -> Option<Self> {
        if size == 0 {
            return None;
        }

        let cells = vec![CellMark::Empty; usize::from(size) * usize::from(size)];

        Some(Self {
            size,
            cells,
            specials: HashMap::new(),
        })
    }

    /// Get the side length of the board.
    #[must_use]
    pub const fn size(&self) -> u8 {
        self.size
    }

    /// Check if a coordinate is within the board.
    #[must_use]
    pub const fn in_bounds(&self, coord: Coord) -> bool {
        coord.row < self.size && coord.col < self.size
    }

    fn index(&self, coord: Coord) -> Option<usize> {
        if self.in_bounds(coord) {
            Some(usize::from(coord.row) * usize::from(self.size) + usize::from(coord.col))
        } else {
            None
        }
    }

    /// Get the mark at a coordinate.
    #[must_use]
    pub fn mark(&self, coord: Coord) -> Option<CellMark> {
        self.index(coord).map(|idx| self.cells[idx])
    }

    /// Set the mark at a coordinate.
    ///
    /// Returns `false` if the coordinate is out of bounds.
    pub fn set_mark(&mut self, coord: Coord, mark: CellMark) -> bool {
        if let Some(idx) = self.index(coord) {
            self.cells[idx] = mark;
            true
        } else {
            false
        }
    }

    /// Owner of the cell at `coord`, if claimed.
    #[must_use]
    pub fn owner(&self, coord: Coord) -> Option<SideId> {
        self.mark(coord).and_then(CellMark::owner)
    }

    /// Special item at `coord`, if any.
    #[must_use]
    pub fn special(&self, coord: Coord) -> Option<SpecialItem> {
        self.specials.get(&coord).copied()
    }

    /// Whether `coord` carries a shield.
    #[must_use]
    pub fn is_shielded(&self, coord: Coord) -> bool {
        self.special(coord) == Some(SpecialItem::Shield)
    }

    /// Put an item on a cell, replacing whatever was there.
    ///
    /// Returns `false` if the coordinate is out of bounds.
    pub fn place_special(&mut self, coord: Coord, item: SpecialItem) -> bool {
        if self.in_bounds(coord) {
            self.specials.insert(coord, item);
            true
        } else {
            false
        }
    }

    /// Remove and return the item on a cell.
    pub fn remove_special(&mut self, coord: Coord) -> Option<SpecialItem> {
        self.specials.remove(&coord)
    }

    /// Iterate over the overlay.
    pub fn specials(&self) -> impl Iterator<Item = (Coord, SpecialItem)> + '_ {
        self.specials.iter().map(|(&coord, &item)| (coord, item))
    }

    /// Iterate over every coordinate in row-major order.
    pub fn coords(&self) -> impl Iterator<Item = Coord> + use<> {
        let size = self.size;
        (0..size).flat_map(move |row| (0..size).map(move |col| Coord::new(row, col)))
    }

    /// Iterate over all coordinates and marks.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, CellMark)> + '_ {
        self.coords().zip(self.cells.iter().copied())
    }

    /// Count cells marked for a side.
    #[must_use]
    pub fn count_owned(&self, side: SideId) -> usize {
        self.cells
            .iter()
            .filter(|mark| **mark == CellMark::Owned(side))
            .count()
    }
}
