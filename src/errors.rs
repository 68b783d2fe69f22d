use std::error::Error;
use std::fmt;

use crate::cells::GridCoordinate;

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum MazeError {
    /// A grid needs at least one row and one column, and no more cells than a `u32` can index.
    InvalidDimensions,
    OutOfBounds(GridCoordinate),
    /// Two cells can only be connected when they share an edge.
    InvalidEdge(GridCoordinate, GridCoordinate),
    NoPathFound(GridCoordinate, GridCoordinate),
}

impl fmt::Display for MazeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            MazeError::InvalidDimensions => write!(f, "invalid grid dimensions"),
            MazeError::OutOfBounds(coord) => write!(f, "cell {} is outside the grid", coord),
            MazeError::InvalidEdge(a, b) => {
                write!(f, "cells {} and {} are not adjacent and cannot be connected", a, b)
            }
            MazeError::NoPathFound(start, goal) => {
                write!(f, "no path from {} to {}", start, goal)
            }
        }
    }
}

impl Error for MazeError {}
