//! Unit definitions and placed unit instances.

use alloc::vec::Vec;
use core::fmt;

use crate::common::Coordinate;

/// Orientation of a unit on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// Segments run along increasing columns.
    #[default]
    Horizontal,
    /// Segments run along increasing rows.
    Vertical,
}

impl Orientation {
    pub fn toggled(self) -> Self {
        match self {
            Orientation::Horizontal => Orientation::Vertical,
            Orientation::Vertical => Orientation::Horizontal,
        }
    }
}

/// Catalog entry: id, display name, segment count and visual tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitType {
    id: &'static str,
    name: &'static str,
    size: usize,
    tag: &'static str,
}

impl UnitType {
    /// Create a new unit type.
    pub const fn new(id: &'static str, name: &'static str, size: usize, tag: &'static str) -> Self {
        Self { id, name, size, tag }
    }

    pub fn id(&self) -> &'static str {
        self.id
    }

    /// Display name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Number of segments.
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Visual tag for front-ends.
    pub fn tag(&self) -> &'static str {
        self.tag
    }
}

/// Instance id of a placed unit, unique within its board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnitId {
    type_id: &'static str,
    seq: usize,
}

impl UnitId {
    pub(crate) fn new(type_id: &'static str, seq: usize) -> Self {
        Self { type_id, seq }
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.type_id, self.seq)
    }
}

/// A unit placed on a board, with the number of segments hit so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedUnit {
    id: UnitId,
    kind: UnitType,
    cells: Vec<Coordinate>,
    hits: usize,
    orientation: Orientation,
}

impl PlacedUnit {
    pub(crate) fn new(
        id: UnitId,
        kind: UnitType,
        cells: Vec<Coordinate>,
        orientation: Orientation,
    ) -> Self {
        Self {
            id,
            kind,
            cells,
            hits: 0,
            orientation,
        }
    }

    /// Copy of this unit with one more segment hit.
    pub(crate) fn with_hit(&self) -> Self {
        Self {
            hits: self.hits + 1,
            ..self.clone()
        }
    }

    pub fn id(&self) -> UnitId {
        self.id
    }

    pub fn kind(&self) -> UnitType {
        self.kind
    }

    /// Occupied cells, starting from the placement origin.
    pub fn cells(&self) -> &[Coordinate] {
        &self.cells
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Check if the unit is sunk (all segments hit).
    pub fn is_sunk(&self) -> bool {
        self.hits >= self.kind.size()
    }

    pub fn occupies(&self, coord: Coordinate) -> bool {
        self.cells.contains(&coord)
    }
}
