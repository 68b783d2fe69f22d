use petgraph::graph::{NodeIndex, UnGraph};
use smallvec::SmallVec;

use crate::cells::{CompassPrimary, CoordinateSmallVec, GridCoordinate};
use crate::errors::MazeError;
use crate::grid::Grid;
use crate::units::{ColumnsCount, EdgesCount, RowsCount};

/// The state of one side of a cell.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum SideState {
    /// The outer edge of the grid, there is no cell on the other side.
    Boundary,
    /// A wall stands between this cell and its neighbour.
    Closed,
    /// The wall has been carved away.
    Open,
}

/// Which adjacent cells are joined by a passage.
///
/// Each cell keeps the state of its four sides, indexed by `CompassPrimary::index`. Opening a
/// passage always updates the two facing sides together, and passages are never closed again.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Passages {
    rows: RowsCount,
    columns: ColumnsCount,
    sides: Vec<[SideState; 4]>,
    links_count: usize,
}

impl Passages {
    /// Every interior wall standing.
    pub fn new(grid: &Grid) -> Passages {
        let sides = grid.iter()
            .map(|coord| {
                let mut cell_sides = [SideState::Boundary; 4];
                for dir in CompassPrimary::ALL.iter() {
                    if grid.neighbour_at_direction(coord, *dir).is_some() {
                        cell_sides[dir.index()] = SideState::Closed;
                    }
                }
                cell_sides
            })
            .collect();

        Passages {
            rows: grid.rows(),
            columns: grid.columns(),
            sides,
            links_count: 0,
        }
    }

    /// Carve a passage between two cells that share an edge.
    ///
    /// Returns true if a new passage was opened and false if the cells were already connected.
    pub fn connect(&mut self, a: GridCoordinate, b: GridCoordinate) -> Result<bool, MazeError> {
        let a_index = self.checked_index(a)?;
        let b_index = self.checked_index(b)?;
        let dir = a.direction_to(b).ok_or(MazeError::InvalidEdge(a, b))?;

        if self.sides[a_index][dir.index()] == SideState::Open {
            return Ok(false);
        }
        self.sides[a_index][dir.index()] = SideState::Open;
        self.sides[b_index][dir.opposite().index()] = SideState::Open;
        self.links_count += 1;
        Ok(true)
    }

    pub fn side(&self, coord: GridCoordinate, dir: CompassPrimary) -> Result<SideState, MazeError> {
        let index = self.checked_index(coord)?;
        Ok(self.sides[index][dir.index()])
    }

    /// Has the wall on the `dir` side of the cell been removed?
    pub fn is_open(&self, coord: GridCoordinate, dir: CompassPrimary) -> Result<bool, MazeError> {
        self.side(coord, dir).map(|side| side == SideState::Open)
    }

    /// Cells reachable from `coord` in one step, in `CompassPrimary::ALL` order.
    pub fn connected_neighbours(&self,
                                coord: GridCoordinate)
                                -> Result<CoordinateSmallVec, MazeError> {
        let index = self.checked_index(coord)?;
        Ok(CompassPrimary::ALL
            .iter()
            .filter(|dir| self.sides[index][dir.index()] == SideState::Open)
            .filter_map(|dir| coord.offset(*dir))
            .collect())
    }

    /// Are two cells joined by a passage? Invalid or non-adjacent cells never are.
    pub fn is_linked(&self, a: GridCoordinate, b: GridCoordinate) -> bool {
        match (a.direction_to(b), self.coordinate_to_index(a)) {
            (Some(dir), Some(index)) => self.sides[index][dir.index()] == SideState::Open,
            _ => false,
        }
    }

    /// Row major indices of the cells joined to the cell at `index`.
    pub(crate) fn linked_indices(&self, index: usize) -> SmallVec<[usize; 4]> {
        let width = self.columns.0;
        let cell_sides = &self.sides[index];
        CompassPrimary::ALL
            .iter()
            .filter(|dir| cell_sides[dir.index()] == SideState::Open)
            .map(|dir| match *dir {
                CompassPrimary::North => index - width,
                CompassPrimary::South => index + width,
                CompassPrimary::East => index + 1,
                CompassPrimary::West => index - 1,
            })
            .collect()
    }

    #[inline]
    pub fn rows(&self) -> RowsCount {
        self.rows
    }

    #[inline]
    pub fn columns(&self) -> ColumnsCount {
        self.columns
    }

    /// Were these passages laid out for a grid of this shape?
    pub fn matches(&self, grid: &Grid) -> bool {
        self.rows == grid.rows() && self.columns == grid.columns()
    }

    #[inline]
    pub fn links_count(&self) -> EdgesCount {
        EdgesCount(self.links_count)
    }

    /// Every passage once, as a pair of cells with the second south or east of the first.
    pub fn iter_links(&self) -> impl Iterator<Item = (GridCoordinate, GridCoordinate)> + '_ {
        let width = self.columns.0;
        self.sides
            .iter()
            .enumerate()
            .flat_map(move |(index, cell_sides)| {
                let coord = GridCoordinate::new((index / width) as u32, (index % width) as u32);
                [CompassPrimary::South, CompassPrimary::East]
                    .iter()
                    .filter(move |dir| cell_sides[dir.index()] == SideState::Open)
                    .filter_map(move |dir| coord.offset(*dir).map(|neighbour| (coord, neighbour)))
                    .collect::<Vec<_>>()
            })
    }

    /// The passages as an undirected petgraph graph.
    /// Node indices are the row major cell indices and node weights the cell coordinates.
    pub fn to_graph(&self) -> UnGraph<GridCoordinate, ()> {
        let cells_count = self.sides.len();
        let mut graph = UnGraph::with_capacity(cells_count, self.links_count);
        let width = self.columns.0;
        for index in 0..cells_count {
            let _ = graph.add_node(GridCoordinate::new((index / width) as u32,
                                                       (index % width) as u32));
        }
        for (a, b) in self.iter_links() {
            if let (Some(a_index), Some(b_index)) = (self.coordinate_to_index(a),
                                                     self.coordinate_to_index(b)) {
                let _ = graph.add_edge(NodeIndex::new(a_index), NodeIndex::new(b_index), ());
            }
        }
        graph
    }

    fn coordinate_to_index(&self, coord: GridCoordinate) -> Option<usize> {
        if (coord.row as usize) < self.rows.0 && (coord.col as usize) < self.columns.0 {
            Some(coord.row as usize * self.columns.0 + coord.col as usize)
        } else {
            None
        }
    }

    fn checked_index(&self, coord: GridCoordinate) -> Result<usize, MazeError> {
        self.coordinate_to_index(coord).ok_or(MazeError::OutOfBounds(coord))
    }
}
