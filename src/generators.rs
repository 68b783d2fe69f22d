use log::{debug, error, trace};
use rand::Rng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xorshift::XorShiftRng;
use smallvec::SmallVec;

use crate::cells::{CellTag, CompassPrimary, GridCoordinate};
use crate::errors::MazeError;
use crate::grid::Grid;
use crate::passages::Passages;

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum GeneratorState {
    Idle,
    Carving,
    Done,
}

/// What changed in the maze during one generation step.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum GenerationStep {
    /// The walk began at a randomly chosen cell.
    Started { cell: GridCoordinate },
    /// The wall between `from` and the unvisited cell `to` was carved away and the walk moved on.
    Carved {
        from: GridCoordinate,
        to: GridCoordinate,
        direction: CompassPrimary,
    },
    /// `from` was a dead end. The walk returned to `to`, or ended if the stack ran out.
    Backtracked {
        from: GridCoordinate,
        to: Option<GridCoordinate>,
    },
}

#[derive(Eq, PartialEq, Copy, Clone, Debug, Default)]
pub struct GenerationSummary {
    /// Seed of the random source, when the maze session created it.
    pub seed: Option<u64>,
    pub steps: usize,
    pub carved: usize,
    pub backtracked: usize,
}

/// Randomized depth first maze generation, also known as the recursive backtracker.
///
/// Starting from a random cell it walks to a random unvisited neighbour, carving a passage as
/// it goes. When every neighbour of the current cell has been visited it backs up along its
/// own trail until it finds a cell with unvisited neighbours. Neighbours are only ever
/// unvisited cells, so no cell is entered twice and the carved passages form a spanning tree
/// of the grid: a perfect maze with exactly one route between any two cells.
///
/// The walk is an explicit state machine. Each call to `step` does one unit of work and
/// reports it, so a caller can draw the maze between steps, or use `run` to go to the end.
///
/// The grid and passages are expected to be fresh: nothing visited and every wall standing.
pub struct RecursiveBacktracker<'a, R: Rng> {
    grid: &'a mut Grid,
    passages: &'a mut Passages,
    rng: R,
    state: GeneratorState,
    stack: Vec<usize>,
    current: usize,
    visited_count: usize,
    summary: GenerationSummary,
}

impl<'a> RecursiveBacktracker<'a, XorShiftRng> {
    /// A generator whose choices are fully determined by `seed`, which is recorded in the
    /// summary.
    pub fn from_seed(grid: &'a mut Grid, passages: &'a mut Passages, seed: u64) -> Self {
        let mut generator = RecursiveBacktracker::new(grid,
                                                      passages,
                                                      XorShiftRng::seed_from_u64(seed));
        generator.summary.seed = Some(seed);
        generator
    }
}

impl<'a, R: Rng> RecursiveBacktracker<'a, R> {
    pub fn new(grid: &'a mut Grid, passages: &'a mut Passages, rng: R) -> Self {
        let cells_count = grid.size();
        RecursiveBacktracker {
            grid,
            passages,
            rng,
            state: GeneratorState::Idle,
            stack: Vec::with_capacity(cells_count),
            current: 0,
            visited_count: 0,
            summary: GenerationSummary::default(),
        }
    }

    /// Advance the walk by one step.
    ///
    /// Returns `Ok(None)` once generation is done. An error means the grid adjacency is broken.
    pub fn step(&mut self) -> Result<Option<GenerationStep>, MazeError> {
        let step = match self.state {
            GeneratorState::Idle => self.start(),
            GeneratorState::Carving => {
                match self.carve_or_backtrack() {
                    Ok(step) => step,
                    Err(e) => {
                        error!("maze generation stopped: {}", e);
                        self.state = GeneratorState::Done;
                        return Err(e);
                    }
                }
            }
            GeneratorState::Done => return Ok(None),
        };

        self.summary.steps += 1;
        trace!("generation step {}: {:?}", self.summary.steps, step);
        if self.state == GeneratorState::Done {
            debug!("maze generation done: {} cells visited, {} passages, {} steps",
                   self.visited_count,
                   self.passages.links_count().0,
                   self.summary.steps);
        }
        Ok(Some(step))
    }

    /// Run to completion, handing every step and the maze as it stands after that step to
    /// `observer`.
    pub fn run<F>(&mut self, mut observer: F) -> Result<GenerationSummary, MazeError>
        where F: FnMut(&GenerationStep, &Grid, &Passages)
    {
        while let Some(step) = self.step()? {
            observer(&step, &*self.grid, &*self.passages);
        }
        Ok(self.summary)
    }

    pub fn run_to_end(&mut self) -> Result<GenerationSummary, MazeError> {
        self.run(|_, _, _| {})
    }

    #[inline]
    pub fn state(&self) -> GeneratorState {
        self.state
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.state == GeneratorState::Done
    }

    /// The cell the walk is at, once it has started.
    pub fn current(&self) -> Option<GridCoordinate> {
        match self.state {
            GeneratorState::Idle => None,
            _ => Some(self.grid.index_to_coordinate(self.current)),
        }
    }

    #[inline]
    pub fn visited_count(&self) -> usize {
        self.visited_count
    }

    #[inline]
    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    #[inline]
    pub fn summary(&self) -> GenerationSummary {
        self.summary
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &*self.grid
    }

    #[inline]
    pub fn passages(&self) -> &Passages {
        &*self.passages
    }

    fn start(&mut self) -> GenerationStep {
        let cells_count = self.grid.size();
        debug!("maze generation starting on a {} x {} grid",
               self.grid.rows().0,
               self.grid.columns().0);

        let start_index = self.rng.gen_range(0..cells_count);
        self.visit(start_index);
        self.state = if self.visited_count == cells_count {
            GeneratorState::Done
        } else {
            GeneratorState::Carving
        };

        GenerationStep::Started { cell: self.grid.index_to_coordinate(start_index) }
    }

    fn carve_or_backtrack(&mut self) -> Result<GenerationStep, MazeError> {
        let current = self.current;
        let from = self.grid.index_to_coordinate(current);

        let unvisited: SmallVec<[usize; 4]> = self.grid
            .neighbour_indices(current)
            .iter()
            .cloned()
            .filter(|&index| !self.grid.node_at(index).is_visited())
            .collect();

        if let Some(&next) = unvisited.choose(&mut self.rng) {
            let to = self.grid.index_to_coordinate(next);
            let direction = from.direction_to(to).ok_or(MazeError::InvalidEdge(from, to))?;
            self.passages.connect(from, to)?;

            self.visit(next);
            self.summary.carved += 1;
            if self.visited_count == self.grid.size() {
                self.state = GeneratorState::Done;
            }
            Ok(GenerationStep::Carved { from, to, direction })
        } else {
            self.grid.node_at_mut(current).set_generation_tag(CellTag::Backtracked);
            let _ = self.stack.pop();
            self.summary.backtracked += 1;

            let to = match self.stack.last() {
                Some(&top) => {
                    self.current = top;
                    Some(self.grid.index_to_coordinate(top))
                }
                None => {
                    self.state = GeneratorState::Done;
                    None
                }
            };
            Ok(GenerationStep::Backtracked { from, to })
        }
    }

    fn visit(&mut self, index: usize) {
        self.grid.node_at_mut(index).mark_visited(CellTag::Carving);
        self.stack.push(index);
        self.current = index;
        self.visited_count += 1;
    }
}
