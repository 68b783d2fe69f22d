//! **perfect_mazes** generates perfect mazes with a randomized depth first search and finds
//! routes through them with a breadth first search.
//!
//! Both run as step machines so each carved passage, explored cell and traced path cell can be
//! observed as it happens. A `maze::Maze` ties a grid, its passages and a start and goal
//! together.

pub mod cells;
pub mod errors;
pub mod generators;
pub mod grid;
pub mod grid_displays;
pub mod grid_iterators;
pub mod maze;
pub mod passages;
pub mod pathing;
pub mod units;
