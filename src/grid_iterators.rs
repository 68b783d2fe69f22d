use std::fmt;

use crate::cells::GridCoordinate;
use crate::units::{ColumnsCount, RowsCount};

/// Row major iteration over every cell coordinate of a grid.
#[derive(Clone)]
pub struct CellIter {
    current_cell_number: usize,
    cells_count: usize,
    row_length: usize,
}

impl CellIter {
    pub(crate) fn new(rows: RowsCount, columns: ColumnsCount) -> CellIter {
        CellIter {
            current_cell_number: 0,
            cells_count: rows.0 * columns.0,
            row_length: columns.0,
        }
    }
}

impl fmt::Debug for CellIter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f,
               "CellIter :: current_cell_number: {:?}, cells_count: {:?}",
               self.current_cell_number,
               self.cells_count)
    }
}

impl ExactSizeIterator for CellIter {} // default impl using size_hint()
impl Iterator for CellIter {
    type Item = GridCoordinate;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_cell_number < self.cells_count {
            let row = self.current_cell_number / self.row_length;
            let col = self.current_cell_number % self.row_length;
            self.current_cell_number += 1;
            Some(GridCoordinate::new(row as u32, col as u32))
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.cells_count - self.current_cell_number;
        (remaining, Some(remaining))
    }
}

/// Iteration over a grid one row at a time, top row first.
#[derive(Debug, Clone)]
pub struct RowIter {
    current_row: usize,
    rows: usize,
    row_length: usize,
}

impl RowIter {
    pub(crate) fn new(rows: RowsCount, columns: ColumnsCount) -> RowIter {
        RowIter {
            current_row: 0,
            rows: rows.0,
            row_length: columns.0,
        }
    }
}

impl ExactSizeIterator for RowIter {}
impl Iterator for RowIter {
    type Item = Vec<GridCoordinate>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_row < self.rows {
            let row = self.current_row as u32;
            let coords = (0..self.row_length)
                .map(|col| GridCoordinate::new(row, col as u32))
                .collect();
            self.current_row += 1;
            Some(coords)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.rows - self.current_row;
        (remaining, Some(remaining))
    }
}
