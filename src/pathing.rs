// Two ways of answering "how far is it from here?" on a maze.
//
// `BreadthFirstSolver` answers it for one start and goal pair. It is a resumable step machine
// so the search frontier and the final backtrace can be drawn as they happen. Its working
// state (explored flags and parent links) lives on the grid's cells, parents being indices into
// the grid's cell table, and is cleared whenever a new solver is created.
//
// `Distances` floods the whole maze from a start cell level by level and keeps the distance to
// every reachable cell. It is the exhaustive reference the solver can be checked against and
// what a "show distances" rendering displays.

use log::{debug, trace, warn};
use smallvec::SmallVec;
use std::collections::VecDeque;
use std::ops::Deref;

use crate::cells::{CellTag, CoordinateSmallVec, GridCoordinate};
use crate::errors::MazeError;
use crate::grid::Grid;
use crate::passages::Passages;

/// A route through the maze from a start cell to a goal cell, both included.
#[derive(Eq, PartialEq, Clone, Debug)]
pub struct Path {
    cells: Vec<GridCoordinate>,
}

impl Path {
    fn new(cells: Vec<GridCoordinate>) -> Option<Path> {
        if cells.is_empty() { None } else { Some(Path { cells }) }
    }

    #[inline]
    pub fn cells(&self) -> &[GridCoordinate] {
        &self.cells
    }

    #[inline]
    pub fn start(&self) -> GridCoordinate {
        self.cells[0]
    }

    #[inline]
    pub fn goal(&self) -> GridCoordinate {
        self.cells[self.cells.len() - 1]
    }

    /// Number of passages walked along the path.
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.cells.len() - 1
    }

    pub fn into_vec(self) -> Vec<GridCoordinate> {
        self.cells
    }
}

impl Deref for Path {
    type Target = [GridCoordinate];

    fn deref(&self) -> &[GridCoordinate] {
        &self.cells
    }
}

#[derive(Eq, PartialEq, Clone, Debug)]
pub enum SolveOutcome {
    Found(Path),
    /// Every cell reachable from the start was explored without meeting the goal.
    Exhausted,
}

impl SolveOutcome {
    pub fn path(&self) -> Option<&Path> {
        match *self {
            SolveOutcome::Found(ref path) => Some(path),
            SolveOutcome::Exhausted => None,
        }
    }
}

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum SolverState {
    Idle,
    Searching,
    /// The goal was reached and the path is being followed back to the start.
    Tracing,
    Found,
    Exhausted,
}

/// What happened during one solver step.
#[derive(Eq, PartialEq, Clone, Debug)]
pub enum SolveStep {
    Started { start: GridCoordinate },
    /// `cell` was taken off the front of the queue and its unexplored neighbours queued.
    Expanded {
        cell: GridCoordinate,
        discovered: CoordinateSmallVec,
        frontier: usize,
        goal_reached: bool,
    },
    /// `cell` was added to the backtrace, which runs from the goal to the start.
    Traced { cell: GridCoordinate },
    Exhausted,
}

/// Breadth first search from a start cell to a goal cell over open passages.
///
/// Passages all have the same length and the queue is first in first out, so cells leave the
/// queue in order of their distance from the start and the first time the goal is discovered
/// it is by a shortest route. The search stops scanning at that moment, then follows the
/// parent links back to the start one cell per step.
pub struct BreadthFirstSolver<'a> {
    grid: &'a mut Grid,
    passages: &'a Passages,
    start: usize,
    goal: usize,
    state: SolverState,
    queue: VecDeque<usize>,
    trace_cursor: Option<usize>,
    backtrace: Vec<GridCoordinate>,
    path: Option<Path>,
    steps: usize,
}

impl<'a> BreadthFirstSolver<'a> {
    /// Clears any previous search state on the grid.
    pub fn new(grid: &'a mut Grid,
               passages: &'a Passages,
               start: GridCoordinate,
               goal: GridCoordinate)
               -> Result<BreadthFirstSolver<'a>, MazeError> {
        if !passages.matches(grid) {
            return Err(MazeError::InvalidDimensions);
        }
        let start_index = grid.checked_index(start)?;
        let goal_index = grid.checked_index(goal)?;
        grid.reset_solve_state();

        Ok(BreadthFirstSolver {
            grid,
            passages,
            start: start_index,
            goal: goal_index,
            state: SolverState::Idle,
            queue: VecDeque::new(),
            trace_cursor: None,
            backtrace: vec![],
            path: None,
            steps: 0,
        })
    }

    /// Advance the search by one step. Returns None once the search has finished.
    pub fn step(&mut self) -> Option<SolveStep> {
        let step = match self.state {
            SolverState::Idle => self.begin(),
            SolverState::Searching => self.expand_next(),
            SolverState::Tracing => self.trace_next(),
            SolverState::Found | SolverState::Exhausted => return None,
        };

        self.steps += 1;
        trace!("solve step {}: {:?}", self.steps, step);
        match self.state {
            SolverState::Found => {
                debug!("path found from {} to {} in {} steps",
                       self.grid.index_to_coordinate(self.start),
                       self.grid.index_to_coordinate(self.goal),
                       self.steps)
            }
            SolverState::Exhausted => {
                debug!("no path from {} to {}",
                       self.grid.index_to_coordinate(self.start),
                       self.grid.index_to_coordinate(self.goal))
            }
            _ => {}
        }
        Some(step)
    }

    /// Run the search to the end, handing each step and the grid after that step to `observer`.
    pub fn run<F>(&mut self, mut observer: F) -> SolveOutcome
        where F: FnMut(&SolveStep, &Grid)
    {
        while let Some(step) = self.step() {
            observer(&step, &*self.grid);
        }
        self.finished_outcome()
    }

    pub fn run_to_end(&mut self) -> SolveOutcome {
        self.run(|_, _| {})
    }

    /// The result, once the search has finished.
    pub fn outcome(&self) -> Option<SolveOutcome> {
        match self.state {
            SolverState::Found | SolverState::Exhausted => Some(self.finished_outcome()),
            _ => None,
        }
    }

    #[inline]
    pub fn state(&self) -> SolverState {
        self.state
    }

    #[inline]
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Cells queued for expansion but not yet expanded.
    pub fn frontier(&self) -> Vec<GridCoordinate> {
        self.queue.iter().map(|&index| self.grid.index_to_coordinate(index)).collect()
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &*self.grid
    }

    fn finished_outcome(&self) -> SolveOutcome {
        match self.path {
            Some(ref path) => SolveOutcome::Found(path.clone()),
            None => SolveOutcome::Exhausted,
        }
    }

    fn begin(&mut self) -> SolveStep {
        let start = self.start;
        self.grid.node_at_mut(start).mark_explored(None);
        self.queue.push_back(start);

        if start == self.goal {
            self.trace_cursor = Some(start);
            self.state = SolverState::Tracing;
        } else {
            self.state = SolverState::Searching;
        }
        SolveStep::Started { start: self.grid.index_to_coordinate(start) }
    }

    fn expand_next(&mut self) -> SolveStep {
        let node = match self.queue.pop_front() {
            Some(node) => node,
            None => {
                self.state = SolverState::Exhausted;
                return SolveStep::Exhausted;
            }
        };
        self.grid.node_at_mut(node).set_solve_tag(CellTag::Explored);

        let mut discovered = CoordinateSmallVec::new();
        let mut goal_reached = false;
        for neighbour in self.passages.linked_indices(node) {
            if self.grid.node_at(neighbour).is_explored() {
                continue;
            }
            self.grid.node_at_mut(neighbour).mark_explored(Some(node));
            self.queue.push_back(neighbour);
            discovered.push(self.grid.index_to_coordinate(neighbour));

            if neighbour == self.goal {
                goal_reached = true;
                break;
            }
        }

        if goal_reached {
            self.trace_cursor = Some(self.goal);
            self.state = SolverState::Tracing;
        }
        SolveStep::Expanded {
            cell: self.grid.index_to_coordinate(node),
            discovered,
            frontier: self.queue.len(),
            goal_reached,
        }
    }

    fn trace_next(&mut self) -> SolveStep {
        let cursor = match self.trace_cursor {
            Some(cursor) => cursor,
            None => {
                self.state = SolverState::Exhausted;
                return SolveStep::Exhausted;
            }
        };
        let cell = self.grid.index_to_coordinate(cursor);
        self.grid.node_at_mut(cursor).set_solve_tag(CellTag::OnPath);
        self.backtrace.push(cell);

        if cursor == self.start {
            let mut cells = std::mem::replace(&mut self.backtrace, vec![]);
            cells.reverse();
            self.path = Path::new(cells);
            self.trace_cursor = None;
            self.state = SolverState::Found;
        } else {
            self.trace_cursor = self.grid.node_at(cursor).parent();
            if self.trace_cursor.is_none() {
                warn!("backtrace from {} stopped at {} without reaching the start",
                      self.grid.index_to_coordinate(self.goal),
                      cell);
            }
        }
        SolveStep::Traced { cell }
    }
}

/// Distance, in passages walked, from one start cell to every cell of a maze.
#[derive(Debug, Clone)]
pub struct Distances {
    start_coordinate: GridCoordinate,
    distances: Vec<Option<u32>>,
    max_distance: u32,
    columns: usize,
}

impl Distances {
    pub fn new(grid: &Grid,
               passages: &Passages,
               start_coordinate: GridCoordinate)
               -> Result<Distances, MazeError> {
        if !passages.matches(grid) {
            return Err(MazeError::InvalidDimensions);
        }
        let start = grid.checked_index(start_coordinate)?;

        let mut distances = vec![None; grid.size()];
        let mut max = 0;
        distances[start] = Some(0);

        // Every passage is one step long, so the first time a cell is reached is by a shortest
        // route and its distance never needs revisiting. The distances vec doubles as the set of
        // cells already processed.
        let mut frontier = vec![start];
        let mut distance = 0;
        while !frontier.is_empty() {
            max = distance;
            distance += 1;

            let mut new_frontier = vec![];
            for &cell in &frontier {
                for link in passages.linked_indices(cell) {
                    if distances[link].is_none() {
                        distances[link] = Some(distance);
                        new_frontier.push(link);
                    }
                }
            }
            frontier = new_frontier;
        }

        Ok(Distances {
            start_coordinate,
            distances,
            max_distance: max,
            columns: grid.columns().0,
        })
    }

    #[inline(always)]
    pub fn start(&self) -> GridCoordinate {
        self.start_coordinate
    }

    /// Greatest distance to any reachable cell.
    #[inline(always)]
    pub fn max(&self) -> u32 {
        self.max_distance
    }

    /// None when the cell is unreachable from the start or outside the grid.
    pub fn distance_from_start_to(&self, coord: GridCoordinate) -> Option<u32> {
        self.index_of(coord).and_then(|index| self.distances[index])
    }

    pub fn reachable_count(&self) -> usize {
        self.distances.iter().filter(|distance| distance.is_some()).count()
    }

    pub fn furthest_points(&self) -> SmallVec<[GridCoordinate; 8]> {
        let furthest_distance = self.max();
        self.distances
            .iter()
            .enumerate()
            .filter(|&(_, distance)| *distance == Some(furthest_distance))
            .map(|(index, _)| self.coordinate_of(index))
            .collect()
    }

    /// Walk back from `goal` to the start, always stepping to a linked neighbour one closer to
    /// the start. Returns None if `goal` is unreachable.
    pub fn path_to(&self, passages: &Passages, goal: GridCoordinate) -> Option<Path> {
        if passages.columns().0 != self.columns ||
           passages.rows().0 * self.columns != self.distances.len() {
            warn!("passages of a {} by {} grid do not match these distances",
                  passages.rows(),
                  passages.columns());
            return None;
        }
        let mut current = self.index_of(goal)?;
        let mut current_distance = self.distances[current]?;
        let mut cells = vec![goal];

        while current_distance > 0 {
            let closer = passages.linked_indices(current)
                .into_iter()
                .find(|&link| self.distances[link] == Some(current_distance - 1))?;
            current = closer;
            current_distance -= 1;
            cells.push(self.coordinate_of(current));
        }

        cells.reverse();
        Path::new(cells)
    }

    fn index_of(&self, coord: GridCoordinate) -> Option<usize> {
        let index = coord.row as usize * self.columns + coord.col as usize;
        if (coord.col as usize) < self.columns && index < self.distances.len() {
            Some(index)
        } else {
            None
        }
    }

    fn coordinate_of(&self, index: usize) -> GridCoordinate {
        GridCoordinate::new((index / self.columns) as u32, (index % self.columns) as u32)
    }
}

#[cfg(test)]
mod tests {

    use itertools::Itertools;
    use quickcheck::{quickcheck, TestResult};
    use rand::SeedableRng;
    use rand_xorshift::XorShiftRng;

    use super::*;
    use crate::generators::RecursiveBacktracker;
    use crate::units::{ColumnsCount, RowsCount};

    fn gc(row: u32, col: u32) -> GridCoordinate {
        GridCoordinate::new(row, col)
    }

    fn open_grid(rows: usize, columns: usize) -> (Grid, Passages) {
        let grid = Grid::new(RowsCount(rows), ColumnsCount(columns)).unwrap();
        let mut passages = Passages::new(&grid);
        for coord in grid.iter() {
            for neighbour in grid.neighbours_of(coord).unwrap().iter() {
                passages.connect(coord, *neighbour).unwrap();
            }
        }
        (grid, passages)
    }

    fn generated_maze(rows: usize, columns: usize, seed: u64) -> (Grid, Passages) {
        let mut grid = Grid::new(RowsCount(rows), ColumnsCount(columns)).unwrap();
        let mut passages = Passages::new(&grid);
        RecursiveBacktracker::new(&mut grid, &mut passages, XorShiftRng::seed_from_u64(seed))
            .run_to_end()
            .unwrap();
        (grid, passages)
    }

    fn solve(grid: &mut Grid,
             passages: &Passages,
             start: GridCoordinate,
             goal: GridCoordinate)
             -> SolveOutcome {
        BreadthFirstSolver::new(grid, passages, start, goal).unwrap().run_to_end()
    }

    #[test]
    fn shortest_paths_on_generated_mazes() {
        fn p(size: u8, seed: u64, start_pick: u16, goal_pick: u16) -> TestResult {
            let rows = (size % 10) as usize + 1;
            let columns = (size / 10 % 10) as usize + 1;
            let (mut grid, passages) = generated_maze(rows, columns, seed);
            let start = grid.index_to_coordinate(start_pick as usize % grid.size());
            let goal = grid.index_to_coordinate(goal_pick as usize % grid.size());

            let path = match solve(&mut grid, &passages, start, goal) {
                SolveOutcome::Found(path) => path,
                SolveOutcome::Exhausted => return TestResult::failed(),
            };
            let distances = Distances::new(&grid, &passages, start).unwrap();

            let simple = path.iter().unique().count() == path.len();
            let linked = path.iter().tuple_windows().all(|(a, b)| passages.is_linked(*a, *b));
            let shortest = distances.distance_from_start_to(goal) == Some(path.edge_count() as u32);
            TestResult::from_bool(path.start() == start && path.goal() == goal && simple &&
                                  linked && shortest)
        }
        quickcheck(p as fn(u8, u64, u16, u16) -> TestResult);
    }

    #[test]
    fn solver_and_distances_agree_on_the_unique_route() {
        let (mut grid, passages) = generated_maze(12, 9, 77);
        let start = gc(0, 0);
        let goal = gc(11, 8);
        let distances = Distances::new(&grid, &passages, start).unwrap();
        let from_distances = distances.path_to(&passages, goal).unwrap();
        let outcome = solve(&mut grid, &passages, start, goal);
        assert_eq!(outcome, SolveOutcome::Found(from_distances));
    }

    #[test]
    fn ties_broken_in_direction_order() {
        let (mut grid, passages) = open_grid(2, 2);
        let outcome = solve(&mut grid, &passages, gc(0, 0), gc(1, 1));
        let path = outcome.path().unwrap();
        assert_eq!(path.cells(), &[gc(0, 0), gc(1, 0), gc(1, 1)]);
        assert_eq!(path.edge_count(), 2);
    }

    #[test]
    fn step_sequence_on_a_corridor() {
        // 1x3 corridor: (0,0) - (0,1) - (0,2)
        let (mut grid, passages) = open_grid(1, 3);
        let mut solver = BreadthFirstSolver::new(&mut grid, &passages, gc(0, 0), gc(0, 2))
            .unwrap();
        assert_eq!(solver.state(), SolverState::Idle);
        assert_eq!(solver.outcome(), None);

        let mut steps = vec![];
        while let Some(step) = solver.step() {
            steps.push(step);
        }
        let discovered = |coords: &[GridCoordinate]| -> CoordinateSmallVec {
            coords.iter().cloned().collect()
        };
        assert_eq!(steps,
                   vec![SolveStep::Started { start: gc(0, 0) },
                        SolveStep::Expanded {
                            cell: gc(0, 0),
                            discovered: discovered(&[gc(0, 1)]),
                            frontier: 1,
                            goal_reached: false,
                        },
                        SolveStep::Expanded {
                            cell: gc(0, 1),
                            discovered: discovered(&[gc(0, 2)]),
                            frontier: 1,
                            goal_reached: true,
                        },
                        SolveStep::Traced { cell: gc(0, 2) },
                        SolveStep::Traced { cell: gc(0, 1) },
                        SolveStep::Traced { cell: gc(0, 0) }]);
        assert_eq!(solver.state(), SolverState::Found);
        assert_eq!(solver.steps(), 6);
        assert_eq!(solver.outcome().unwrap().path().unwrap().cells(),
                   &[gc(0, 0), gc(0, 1), gc(0, 2)]);
    }

    #[test]
    fn goal_discovery_stops_the_scan() {
        // Centre of a fully open 3x3 grid: North is discovered first and is the goal, so the
        // South, East and West neighbours are never queued.
        let (mut grid, passages) = open_grid(3, 3);
        let mut solver = BreadthFirstSolver::new(&mut grid, &passages, gc(1, 1), gc(0, 1))
            .unwrap();
        let _ = solver.step();
        match solver.step() {
            Some(SolveStep::Expanded { discovered, frontier, goal_reached, .. }) => {
                assert_eq!(&*discovered, &[gc(0, 1)]);
                assert_eq!(frontier, 1);
                assert!(goal_reached);
            }
            other => panic!("unexpected step {:?}", other),
        }
        assert_eq!(solver.state(), SolverState::Tracing);
        assert_eq!(solver.frontier(), vec![gc(0, 1)]);
        assert!(!solver.grid().node(gc(2, 1)).unwrap().is_explored());
    }

    #[test]
    fn disconnected_cells_exhaust_the_search() {
        let grid = Grid::new(RowsCount(3), ColumnsCount(3)).unwrap();
        let mut passages = Passages::new(&grid);
        let mut grid = grid;
        passages.connect(gc(0, 0), gc(0, 1)).unwrap();
        passages.connect(gc(0, 1), gc(1, 1)).unwrap();
        passages.connect(gc(2, 2), gc(2, 1)).unwrap();

        let mut solver = BreadthFirstSolver::new(&mut grid, &passages, gc(0, 0), gc(2, 2))
            .unwrap();
        let mut last = None;
        let outcome = solver.run(|step, _| last = Some(step.clone()));
        assert_eq!(outcome, SolveOutcome::Exhausted);
        assert_eq!(last, Some(SolveStep::Exhausted));
        assert_eq!(solver.state(), SolverState::Exhausted);
        assert_eq!(solver.step(), None);

        let explored = grid.iter().filter(|c| grid.node(*c).unwrap().is_explored()).count();
        assert_eq!(explored, 3);
    }

    #[test]
    fn start_is_goal() {
        let (mut grid, passages) = generated_maze(4, 4, 1);
        let outcome = solve(&mut grid, &passages, gc(2, 3), gc(2, 3));
        let path = outcome.path().unwrap();
        assert_eq!(path.cells(), &[gc(2, 3)]);
        assert_eq!(path.edge_count(), 0);
    }

    #[test]
    fn out_of_bounds_endpoints() {
        let (mut grid, passages) = generated_maze(4, 4, 1);
        let outside = gc(4, 0);
        assert_eq!(BreadthFirstSolver::new(&mut grid, &passages, outside, gc(0, 0)).err(),
                   Some(MazeError::OutOfBounds(outside)));
        assert_eq!(BreadthFirstSolver::new(&mut grid, &passages, gc(0, 0), outside).err(),
                   Some(MazeError::OutOfBounds(outside)));
    }

    #[test]
    fn mismatched_passages_are_rejected() {
        let (mut grid, _) = generated_maze(4, 4, 1);
        let (_, other_passages) = generated_maze(5, 4, 1);
        assert_eq!(BreadthFirstSolver::new(&mut grid, &other_passages, gc(0, 0), gc(1, 1)).err(),
                   Some(MazeError::InvalidDimensions));
    }

    #[test]
    fn path_to_with_mismatched_passages_is_none() {
        let (grid, passages) = generated_maze(4, 4, 1);
        let distances = Distances::new(&grid, &passages, gc(0, 0)).unwrap();
        let (_, smaller) = generated_maze(2, 2, 1);
        let (_, taller) = generated_maze(5, 4, 1);
        assert_eq!(distances.path_to(&smaller, gc(3, 3)), None);
        assert_eq!(distances.path_to(&smaller, gc(1, 1)), None);
        assert_eq!(distances.path_to(&taller, gc(3, 3)), None);
        assert!(distances.path_to(&passages, gc(3, 3)).is_some());
    }

    #[test]
    fn stale_state_is_cleared_between_solves() {
        let (mut grid, passages) = generated_maze(8, 8, 31);
        let first = solve(&mut grid, &passages, gc(0, 0), gc(7, 7));

        // Abandon a solve half way through.
        {
            let mut solver = BreadthFirstSolver::new(&mut grid, &passages, gc(7, 0), gc(0, 7))
                .unwrap();
            for _ in 0..5 {
                let _ = solver.step();
            }
        }

        let again = solve(&mut grid, &passages, gc(0, 0), gc(7, 7));
        assert_eq!(first, again);

        let path = again.path().unwrap();
        for coord in grid.iter() {
            let on_path = path.contains(&coord);
            assert_eq!(grid.node(coord).unwrap().tag() == CellTag::OnPath, on_path);
        }
    }

    #[test]
    fn distances_on_open_grid() {
        let (grid, passages) = open_grid(2, 2);
        let distances = Distances::new(&grid, &passages, gc(0, 0)).unwrap();

        assert_eq!(distances.start(), gc(0, 0));
        assert_eq!(distances.distance_from_start_to(gc(0, 0)), Some(0));
        assert_eq!(distances.distance_from_start_to(gc(0, 1)), Some(1));
        assert_eq!(distances.distance_from_start_to(gc(1, 0)), Some(1));
        assert_eq!(distances.distance_from_start_to(gc(1, 1)), Some(2));
        assert_eq!(distances.max(), 2);
        assert_eq!(&*distances.furthest_points(), &[gc(1, 1)]);
    }

    #[test]
    fn distances_to_unreachable_or_invalid_cells_is_none() {
        let grid = Grid::new(RowsCount(3), ColumnsCount(3)).unwrap();
        let passages = Passages::new(&grid);
        let distances = Distances::new(&grid, &passages, gc(1, 1)).unwrap();
        for coord in grid.iter() {
            let expected = if coord == gc(1, 1) { Some(0) } else { None };
            assert_eq!(distances.distance_from_start_to(coord), expected);
        }
        assert_eq!(distances.distance_from_start_to(gc(0, 3)), None);
        assert_eq!(distances.distance_from_start_to(gc(u32::MAX, u32::MAX)), None);
        assert_eq!(distances.reachable_count(), 1);
        assert_eq!(distances.max(), 0);
        assert_eq!(distances.path_to(&passages, gc(2, 2)), None);
    }

    #[test]
    fn distances_require_valid_start_coordinate() {
        let grid = Grid::new(RowsCount(3), ColumnsCount(3)).unwrap();
        let passages = Passages::new(&grid);
        assert_eq!(Distances::new(&grid, &passages, gc(3, 3)).err(),
                   Some(MazeError::OutOfBounds(gc(3, 3))));
    }
}
