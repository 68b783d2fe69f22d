use smallvec::SmallVec;
use std::convert::From;
use std::fmt;

/// Address of a cell: `row` counts down from the top of the maze, `col` across from the left.
#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug, Ord, PartialOrd)]
pub struct GridCoordinate {
    pub row: u32,
    pub col: u32,
}

impl GridCoordinate {
    pub fn new(row: u32, col: u32) -> GridCoordinate {
        GridCoordinate { row, col }
    }

    /// The coordinate 1 cell away in the given direction, ignoring any grid boundary except zero.
    /// Returns None if the coordinate is not representable.
    pub fn offset(&self, dir: CompassPrimary) -> Option<GridCoordinate> {
        let (row, col) = (self.row, self.col);
        match dir {
            CompassPrimary::North => row.checked_sub(1).map(|r| GridCoordinate::new(r, col)),
            CompassPrimary::South => row.checked_add(1).map(|r| GridCoordinate::new(r, col)),
            CompassPrimary::East => col.checked_add(1).map(|c| GridCoordinate::new(row, c)),
            CompassPrimary::West => col.checked_sub(1).map(|c| GridCoordinate::new(row, c)),
        }
    }

    /// The direction to travel from `self` to reach `other` if they share an edge.
    pub fn direction_to(&self, other: GridCoordinate) -> Option<CompassPrimary> {
        CompassPrimary::ALL
            .iter()
            .cloned()
            .find(|dir| self.offset(*dir) == Some(other))
    }
}

impl From<(u32, u32)> for GridCoordinate {
    fn from(row_col_pair: (u32, u32)) -> GridCoordinate {
        GridCoordinate::new(row_col_pair.0, row_col_pair.1)
    }
}

impl fmt::Display for GridCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

pub type CoordinateSmallVec = SmallVec<[GridCoordinate; 4]>;

/// The four sides of a square cell.
/// North is the top side, South the bottom, West the left and East the right.
#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash)]
pub enum CompassPrimary {
    North,
    South,
    East,
    West,
}

impl CompassPrimary {
    /// Every direction, in the order neighbours are reported.
    pub const ALL: [CompassPrimary; 4] = [CompassPrimary::North,
                                          CompassPrimary::South,
                                          CompassPrimary::East,
                                          CompassPrimary::West];

    pub fn opposite(self) -> CompassPrimary {
        match self {
            CompassPrimary::North => CompassPrimary::South,
            CompassPrimary::South => CompassPrimary::North,
            CompassPrimary::East => CompassPrimary::West,
            CompassPrimary::West => CompassPrimary::East,
        }
    }

    /// Slot of this direction in a per-cell side array.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            CompassPrimary::North => 0,
            CompassPrimary::South => 1,
            CompassPrimary::East => 2,
            CompassPrimary::West => 3,
        }
    }
}

/// What a presentation layer should show for a cell body.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum CellTag {
    Unvisited,
    /// Visited by the maze generator and still on its stack.
    Carving,
    /// The generator has backtracked out of this cell.
    Backtracked,
    /// Dequeued and expanded by a path search.
    Explored,
    OnPath,
}

impl Default for CellTag {
    fn default() -> CellTag {
        CellTag::Unvisited
    }
}
