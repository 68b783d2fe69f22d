use log::debug;
use petgraph::graph::UnGraph;
use rand::Rng;
use rand_xorshift::XorShiftRng;

use crate::cells::{CompassPrimary, GridCoordinate};
use crate::errors::MazeError;
use crate::generators::{GenerationStep, GenerationSummary, RecursiveBacktracker};
use crate::grid::Grid;
use crate::passages::Passages;
use crate::pathing::{BreadthFirstSolver, Distances, Path, SolveOutcome};
use crate::units::{ColumnsCount, RowsCount};

/// A maze together with the start and goal cells a player travels between.
///
/// The session owns the grid and its passages. Generators and solvers borrow them from here,
/// so only one of them can be working on the maze at any time.
#[derive(Debug, Clone)]
pub struct Maze {
    grid: Grid,
    passages: Passages,
    start: GridCoordinate,
    goal: GridCoordinate,
}

impl Maze {
    /// An ungenerated maze, every wall standing, from the top left cell to the bottom right.
    pub fn new(rows: RowsCount, columns: ColumnsCount) -> Result<Maze, MazeError> {
        let grid = Grid::new(rows, columns)?;
        let goal = grid.index_to_coordinate(grid.size() - 1);
        Ok(Maze {
            passages: Passages::new(&grid),
            grid,
            start: GridCoordinate::new(0, 0),
            goal,
        })
    }

    pub fn with_points(rows: RowsCount,
                       columns: ColumnsCount,
                       start: GridCoordinate,
                       goal: GridCoordinate)
                       -> Result<Maze, MazeError> {
        let mut maze = Maze::new(rows, columns)?;
        maze.set_points(start, goal)?;
        Ok(maze)
    }

    #[inline]
    pub fn rows(&self) -> RowsCount {
        self.grid.rows()
    }

    #[inline]
    pub fn columns(&self) -> ColumnsCount {
        self.grid.columns()
    }

    #[inline]
    pub fn start(&self) -> GridCoordinate {
        self.start
    }

    #[inline]
    pub fn goal(&self) -> GridCoordinate {
        self.goal
    }

    pub fn set_points(&mut self,
                      start: GridCoordinate,
                      goal: GridCoordinate)
                      -> Result<(), MazeError> {
        self.grid.checked_index(start)?;
        self.grid.checked_index(goal)?;
        self.start = start;
        self.goal = goal;
        Ok(())
    }

    /// Choose a new start and goal uniformly at random. They differ whenever the maze has more
    /// than one cell.
    pub fn pick_random_points<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.start = self.grid.random_cell(rng);
        self.goal = self.grid.random_cell(rng);
        while self.grid.size() > 1 && self.goal == self.start {
            self.goal = self.grid.random_cell(rng);
        }
        debug!("start {} goal {}", self.start, self.goal);
    }

    /// Carve a brand new perfect maze, discarding the old one.
    ///
    /// Without a seed one is drawn from the thread rng. Either way the seed used is in the
    /// summary so the maze can be made again.
    pub fn generate(&mut self, seed: Option<u64>) -> Result<GenerationSummary, MazeError> {
        self.generate_with(seed, |_, _, _| {})
    }

    /// `generate`, calling `observer` with each step and the maze as it stands after it.
    pub fn generate_with<F>(&mut self,
                            seed: Option<u64>,
                            observer: F)
                            -> Result<GenerationSummary, MazeError>
        where F: FnMut(&GenerationStep, &Grid, &Passages)
    {
        let summary = self.carver(seed)?.run(observer)?;
        debug!("generated a {} by {} maze with seed {:?}",
               self.rows().0,
               self.columns().0,
               summary.seed);
        Ok(summary)
    }

    /// Clear the maze and hand back a generator to drive one step at a time.
    pub fn carver(&mut self,
                  seed: Option<u64>)
                  -> Result<RecursiveBacktracker<'_, XorShiftRng>, MazeError> {
        let seed = seed.unwrap_or_else(|| rand::thread_rng().gen());
        debug!("maze generation seed {}", seed);
        self.grid = Grid::new(self.grid.rows(), self.grid.columns())?;
        self.passages = Passages::new(&self.grid);
        Ok(RecursiveBacktracker::from_seed(&mut self.grid, &mut self.passages, seed))
    }

    /// Has a generator visited every cell?
    pub fn is_generated(&self) -> bool {
        self.grid.visited_count() == self.grid.size()
    }

    /// Open a passage by hand. See `Passages::connect`.
    pub fn connect(&mut self, a: GridCoordinate, b: GridCoordinate) -> Result<bool, MazeError> {
        self.passages.connect(a, b)
    }

    pub fn solver(&mut self,
                  start: GridCoordinate,
                  goal: GridCoordinate)
                  -> Result<BreadthFirstSolver<'_>, MazeError> {
        BreadthFirstSolver::new(&mut self.grid, &self.passages, start, goal)
    }

    pub fn solve(&mut self,
                 start: GridCoordinate,
                 goal: GridCoordinate)
                 -> Result<SolveOutcome, MazeError> {
        Ok(self.solver(start, goal)?.run_to_end())
    }

    /// Solve from anywhere, e.g. where a player gave up, to the maze's goal.
    pub fn solve_to_goal(&mut self, from: GridCoordinate) -> Result<SolveOutcome, MazeError> {
        let goal = self.goal;
        self.solve(from, goal)
    }

    pub fn shortest_path(&mut self,
                         start: GridCoordinate,
                         goal: GridCoordinate)
                         -> Result<Path, MazeError> {
        match self.solve(start, goal)? {
            SolveOutcome::Found(path) => Ok(path),
            SolveOutcome::Exhausted => Err(MazeError::NoPathFound(start, goal)),
        }
    }

    pub fn distances(&self, start: GridCoordinate) -> Result<Distances, MazeError> {
        Distances::new(&self.grid, &self.passages, start)
    }

    /// May a player standing on `current` step in `direction`? Only through an open passage.
    pub fn request_move(&self,
                        current: GridCoordinate,
                        direction: CompassPrimary)
                        -> Result<bool, MazeError> {
        self.passages.is_open(current, direction)
    }

    #[inline]
    pub fn is_start(&self, coord: GridCoordinate) -> bool {
        coord == self.start
    }

    #[inline]
    pub fn is_goal(&self, coord: GridCoordinate) -> bool {
        coord == self.goal
    }

    /// A player standing on the goal has won.
    #[inline]
    pub fn is_win(&self, position: GridCoordinate) -> bool {
        self.is_goal(position)
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[inline]
    pub fn passages(&self) -> &Passages {
        &self.passages
    }

    pub fn to_graph(&self) -> UnGraph<GridCoordinate, ()> {
        self.passages.to_graph()
    }
}
