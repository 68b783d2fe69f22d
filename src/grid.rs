use rand::Rng;
use smallvec::SmallVec;
use std::fmt;

use crate::cells::{CellTag, CompassPrimary, CoordinateSmallVec, GridCoordinate};
use crate::errors::MazeError;
use crate::grid_iterators::{CellIter, RowIter};
use crate::units::{ColumnsCount, RowsCount};

/// Per cell bookkeeping owned by the grid.
///
/// `visited` belongs to maze generation, `explored` and `parent` to path solving and
/// `tag` to whatever is drawing the maze. A solve only ever paints over the tag generation
/// left behind, and that tag comes back when the solve state is reset.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct CellNode {
    visited: bool,
    explored: bool,
    parent: Option<usize>,
    tag: CellTag,
    generation_tag: CellTag,
}

impl CellNode {
    #[inline]
    pub fn is_visited(&self) -> bool {
        self.visited
    }

    #[inline]
    pub fn is_explored(&self) -> bool {
        self.explored
    }

    /// Row major index of the cell a path search reached this cell from.
    #[inline]
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    #[inline]
    pub fn tag(&self) -> CellTag {
        self.tag
    }

    pub(crate) fn mark_visited(&mut self, tag: CellTag) {
        self.visited = true;
        self.set_generation_tag(tag);
    }

    pub(crate) fn mark_explored(&mut self, parent: Option<usize>) {
        self.explored = true;
        self.parent = parent;
    }

    pub(crate) fn set_generation_tag(&mut self, tag: CellTag) {
        self.generation_tag = tag;
        self.tag = tag;
    }

    /// Tag set by a path search, undone by `reset_solve_state`.
    pub(crate) fn set_solve_tag(&mut self, tag: CellTag) {
        self.tag = tag;
    }

    fn reset_solve_state(&mut self) {
        self.explored = false;
        self.parent = None;
        self.tag = self.generation_tag;
    }
}

/// Largest number of cells a grid may have, 2048 x 2048.
pub const MAX_CELLS: usize = 1 << 22;

/// The rectangular table of maze cells and which cells sit next to one another.
///
/// Geometric adjacency is worked out once on construction and never changes; whether there is
/// a wall between two adjacent cells is the business of `Passages`.
#[derive(Clone)]
pub struct Grid {
    rows: RowsCount,
    columns: ColumnsCount,
    nodes: Vec<CellNode>,
    adjacency: Vec<SmallVec<[usize; 4]>>,
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Grid :: rows: {:?}, columns: {:?}", self.rows, self.columns)
    }
}

impl Grid {
    pub fn new(rows: RowsCount, columns: ColumnsCount) -> Result<Grid, MazeError> {
        let (RowsCount(rows_count), ColumnsCount(columns_count)) = (rows, columns);
        if rows_count == 0 || columns_count == 0 {
            return Err(MazeError::InvalidDimensions);
        }
        let cells_count = rows_count.checked_mul(columns_count)
            .filter(|&count| count <= MAX_CELLS)
            .ok_or(MazeError::InvalidDimensions)?;

        let mut grid = Grid {
            rows,
            columns,
            nodes: vec![CellNode::default(); cells_count],
            adjacency: Vec::with_capacity(cells_count),
        };

        for index in 0..cells_count {
            let coord = grid.index_to_coordinate(index);
            let neighbours = CompassPrimary::ALL
                .iter()
                .filter_map(|dir| grid.neighbour_at_direction(coord, *dir))
                .filter_map(|neighbour| grid.coordinate_to_index(neighbour))
                .collect();
            grid.adjacency.push(neighbours);
        }

        Ok(grid)
    }

    #[inline]
    pub fn rows(&self) -> RowsCount {
        self.rows
    }

    #[inline]
    pub fn columns(&self) -> ColumnsCount {
        self.columns
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    /// Is the grid coordinate valid for this grid - within the grid's dimensions
    #[inline]
    pub fn is_valid_coordinate(&self, coord: GridCoordinate) -> bool {
        (coord.row as usize) < self.rows.0 && (coord.col as usize) < self.columns.0
    }

    /// Convert a grid coordinate to a one dimensional index in the range 0...grid.size().
    /// Returns None if the grid coordinate is invalid.
    #[inline]
    pub fn coordinate_to_index(&self, coord: GridCoordinate) -> Option<usize> {
        if self.is_valid_coordinate(coord) {
            Some(coord.row as usize * self.columns.0 + coord.col as usize)
        } else {
            None
        }
    }

    /// Inverse of `coordinate_to_index`. The index is expected to be less than `size()`.
    #[inline]
    pub fn index_to_coordinate(&self, index: usize) -> GridCoordinate {
        let width = self.columns.0;
        GridCoordinate::new((index / width) as u32, (index % width) as u32)
    }

    #[inline]
    pub(crate) fn checked_index(&self, coord: GridCoordinate) -> Result<usize, MazeError> {
        self.coordinate_to_index(coord).ok_or(MazeError::OutOfBounds(coord))
    }

    /// Cells to the North, South, East or West of a cell, whether or not a passage joins them.
    /// Always reported in `CompassPrimary::ALL` order.
    pub fn neighbours_of(&self, coord: GridCoordinate) -> Result<CoordinateSmallVec, MazeError> {
        let index = self.checked_index(coord)?;
        Ok(self.adjacency[index]
            .iter()
            .map(|&neighbour_index| self.index_to_coordinate(neighbour_index))
            .collect())
    }

    #[inline]
    pub(crate) fn neighbour_indices(&self, index: usize) -> &[usize] {
        &self.adjacency[index]
    }

    /// The in bounds cell next to `coord` in direction `dir`, if there is one.
    pub fn neighbour_at_direction(&self,
                                  coord: GridCoordinate,
                                  dir: CompassPrimary)
                                  -> Option<GridCoordinate> {
        coord.offset(dir).filter(|neighbour| self.is_valid_coordinate(*neighbour))
    }

    pub fn node(&self, coord: GridCoordinate) -> Result<&CellNode, MazeError> {
        let index = self.checked_index(coord)?;
        Ok(&self.nodes[index])
    }

    #[inline]
    pub(crate) fn node_at(&self, index: usize) -> &CellNode {
        &self.nodes[index]
    }

    #[inline]
    pub(crate) fn node_at_mut(&mut self, index: usize) -> &mut CellNode {
        &mut self.nodes[index]
    }

    /// Uniformly random cell of the grid.
    pub fn random_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> GridCoordinate {
        let index = rng.gen_range(0..self.size());
        self.index_to_coordinate(index)
    }

    pub fn visited_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.visited).count()
    }

    /// Forget any previous path search: no cell is explored or has a parent afterwards, and
    /// every cell shows its generation tag again.
    pub fn reset_solve_state(&mut self) {
        for node in &mut self.nodes {
            node.reset_solve_state();
        }
    }

    #[inline]
    pub fn iter(&self) -> CellIter {
        CellIter::new(self.rows, self.columns)
    }

    #[inline]
    pub fn iter_row(&self) -> RowIter {
        RowIter::new(self.rows, self.columns)
    }
}
