use fnv::FnvHashSet;
use std::fmt;

use crate::cells::{CellTag, CompassPrimary, GridCoordinate};
use crate::grid::Grid;
use crate::passages::Passages;
use crate::pathing::{Distances, Path};

/// Fills in the 3 character wide body of each cell when a maze is drawn as text.
pub trait GridDisplay {
    fn render_cell_body(&self, coord: GridCoordinate) -> String;
}

const EMPTY_BODY: &str = "   ";

impl GridDisplay for Distances {
    fn render_cell_body(&self, coord: GridCoordinate) -> String {
        match self.distance_from_start_to(coord) {
            // centre align, padding 3, lowercase hexadecimal
            Some(d) => format!("{:^3x}", d),
            None => String::from(EMPTY_BODY),
        }
    }
}

#[derive(Debug)]
pub struct PathDisplay {
    on_path_coordinates: FnvHashSet<GridCoordinate>,
}

impl PathDisplay {
    pub fn new(path: &Path) -> Self {
        PathDisplay { on_path_coordinates: path.iter().cloned().collect() }
    }
}

impl GridDisplay for PathDisplay {
    fn render_cell_body(&self, coord: GridCoordinate) -> String {
        if self.on_path_coordinates.contains(&coord) {
            String::from(" . ")
        } else {
            String::from(EMPTY_BODY)
        }
    }
}

#[derive(Debug)]
pub struct StartEndPointsDisplay {
    start: GridCoordinate,
    end: GridCoordinate,
}

impl StartEndPointsDisplay {
    pub fn new(start: GridCoordinate, end: GridCoordinate) -> StartEndPointsDisplay {
        StartEndPointsDisplay { start, end }
    }
}

impl GridDisplay for StartEndPointsDisplay {
    fn render_cell_body(&self, coord: GridCoordinate) -> String {
        if coord == self.start {
            String::from(" S ")
        } else if coord == self.end {
            String::from(" E ")
        } else {
            String::from(EMPTY_BODY)
        }
    }
}

/// Shows what generation and solving did to each cell, with the start and goal on top when
/// they are known.
///
/// `+` carving trail, `~` explored by a search, `.` on the found path.
#[derive(Debug)]
pub struct TagDisplay<'a> {
    grid: &'a Grid,
    points: Option<StartEndPointsDisplay>,
}

impl<'a> TagDisplay<'a> {
    pub fn new(grid: &'a Grid) -> TagDisplay<'a> {
        TagDisplay { grid, points: None }
    }

    pub fn with_points(mut self, start: GridCoordinate, goal: GridCoordinate) -> TagDisplay<'a> {
        self.points = Some(StartEndPointsDisplay::new(start, goal));
        self
    }
}

impl<'a> GridDisplay for TagDisplay<'a> {
    fn render_cell_body(&self, coord: GridCoordinate) -> String {
        if let Some(ref points) = self.points {
            let point = points.render_cell_body(coord);
            if point != EMPTY_BODY {
                return point;
            }
        }
        let tag = self.grid.node(coord).map(|node| node.tag()).unwrap_or_default();
        let body = match tag {
            CellTag::Unvisited | CellTag::Backtracked => EMPTY_BODY,
            CellTag::Carving => " + ",
            CellTag::Explored => " ~ ",
            CellTag::OnPath => " . ",
        };
        String::from(body)
    }
}

/// A maze drawn with box drawing characters, open passages left as gaps in the walls.
pub struct TextMaze<'a> {
    grid: &'a Grid,
    passages: &'a Passages,
    body: Option<&'a dyn GridDisplay>,
}

impl<'a> TextMaze<'a> {
    pub fn new(grid: &'a Grid, passages: &'a Passages) -> TextMaze<'a> {
        TextMaze {
            grid,
            passages,
            body: None,
        }
    }

    pub fn with_body(mut self, body: &'a dyn GridDisplay) -> TextMaze<'a> {
        self.body = Some(body);
        self
    }

    fn is_open(&self, coord: GridCoordinate, dir: CompassPrimary) -> bool {
        self.passages.is_open(coord, dir).unwrap_or(false)
    }

    /// Is the `dir` side of the cell one `step` away from `coord` open?
    fn is_open_beyond(&self,
                      coord: GridCoordinate,
                      step: CompassPrimary,
                      dir: CompassPrimary)
                      -> bool {
        self.grid
            .neighbour_at_direction(coord, step)
            .map_or(false, |neighbour| self.is_open(neighbour, dir))
    }

    fn cell_body(&self, coord: GridCoordinate) -> String {
        match self.body {
            Some(displayer) => displayer.render_cell_body(coord),
            None => String::from(EMPTY_BODY),
        }
    }
}

const WALL_L: &str = "╴";
const WALL_R: &str = "╶";
const WALL_U: &str = "╵";
const WALL_D: &str = "╷";
const WALL_LR_3: &str = "───";
const WALL_LR: &str = "─";
const WALL_UD: &str = "│";
const WALL_LD: &str = "┐";
const WALL_RU: &str = "└";
const WALL_LU: &str = "┘";
const WALL_RD: &str = "┌";
const WALL_LRU: &str = "┴";
const WALL_LRD: &str = "┬";
const WALL_LRUD: &str = "┼";
const WALL_RUD: &str = "├";
const WALL_LUD: &str = "┤";

/// The glyph joining whichever of the four wall segments meet at a corner.
fn corner_glyph(left: bool, right: bool, up: bool, down: bool) -> &'static str {
    match (left, right, up, down) {
        (true, true, true, true) => WALL_LRUD,
        (true, true, true, false) => WALL_LRU,
        (true, true, false, true) => WALL_LRD,
        (true, false, true, true) => WALL_LUD,
        (false, true, true, true) => WALL_RUD,
        (true, true, false, false) => WALL_LR,
        (false, false, true, true) => WALL_UD,
        (false, true, true, false) => WALL_RU,
        (true, false, false, true) => WALL_LD,
        (true, false, true, false) => WALL_LU,
        (false, true, false, true) => WALL_RD,
        (true, false, false, false) => WALL_L,
        (false, true, false, false) => WALL_R,
        (false, false, true, false) => WALL_U,
        (false, false, false, true) => WALL_D,
        (false, false, false, false) => " ",
    }
}

impl<'a> fmt::Display for TextMaze<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let last_column = self.grid.columns().0 - 1;
        let last_row = self.grid.rows().0 - 1;

        // The north boundary. Every row after this draws only its own middle and south side,
        // the cell above providing the north wall.
        let mut output = String::from(WALL_RD);
        for col in 0..=last_column {
            let coord = GridCoordinate::new(0, col as u32);
            output.push_str(WALL_LR_3);
            output.push_str(if self.is_open(coord, CompassPrimary::East) {
                WALL_LR
            } else if col == last_column {
                WALL_LD
            } else {
                WALL_LRD
            });
        }
        output.push('\n');

        for (row_index, row) in self.grid.iter_row().enumerate() {
            let is_last_row = row_index == last_row;
            let mut middle = String::from(WALL_UD);
            let mut bottom = String::new();

            for (col_index, coord) in row.into_iter().enumerate() {
                let is_last_column = col_index == last_column;
                let east_open = self.is_open(coord, CompassPrimary::East);
                let south_open = self.is_open(coord, CompassPrimary::South);

                middle.push_str(&self.cell_body(coord));
                middle.push_str(if east_open { " " } else { WALL_UD });

                if col_index == 0 {
                    bottom.push_str(if is_last_row {
                        WALL_RU
                    } else if south_open {
                        WALL_UD
                    } else {
                        WALL_RUD
                    });
                }
                bottom.push_str(if south_open { "   " } else { WALL_LR_3 });

                let corner = match (is_last_row, is_last_column) {
                    (true, true) => WALL_LU,
                    (true, false) => if east_open { WALL_LR } else { WALL_LRU },
                    (false, true) => if south_open { WALL_UD } else { WALL_LUD },
                    (false, false) => {
                        corner_glyph(!south_open,
                                     !self.is_open_beyond(coord,
                                                          CompassPrimary::East,
                                                          CompassPrimary::South),
                                     !east_open,
                                     !self.is_open_beyond(coord,
                                                          CompassPrimary::South,
                                                          CompassPrimary::East))
                    }
                };
                bottom.push_str(corner);
            }

            output.push_str(&middle);
            output.push('\n');
            output.push_str(&bottom);
            output.push('\n');
        }

        write!(f, "{}", output)
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::maze::Maze;
    use crate::units::{ColumnsCount, RowsCount};

    fn gc(row: u32, col: u32) -> GridCoordinate {
        GridCoordinate::new(row, col)
    }

    fn maze(rows: usize, columns: usize) -> Maze {
        Maze::new(RowsCount(rows), ColumnsCount(columns)).unwrap()
    }

    #[test]
    fn single_cell() {
        let m = maze(1, 1);
        assert_eq!(TextMaze::new(m.grid(), m.passages()).to_string(),
                   "┌───┐\n│   │\n└───┘\n");
    }

    #[test]
    fn walls_and_passages() {
        let mut m = maze(1, 2);
        assert_eq!(TextMaze::new(m.grid(), m.passages()).to_string(),
                   "┌───┬───┐\n│   │   │\n└───┴───┘\n");
        m.connect(gc(0, 0), gc(0, 1)).unwrap();
        assert_eq!(TextMaze::new(m.grid(), m.passages()).to_string(),
                   "┌───────┐\n│       │\n└───────┘\n");
    }

    #[test]
    fn closed_grid_corners() {
        let m = maze(2, 2);
        let expected = ["┌───┬───┐", "│   │   │", "├───┼───┤", "│   │   │", "└───┴───┘", ""];
        assert_eq!(TextMaze::new(m.grid(), m.passages()).to_string(),
                   expected.join("\n"));
    }

    #[test]
    fn open_interior_corner() {
        let mut m = maze(2, 2);
        m.connect(gc(0, 0), gc(0, 1)).unwrap();
        m.connect(gc(0, 0), gc(1, 0)).unwrap();
        m.connect(gc(0, 1), gc(1, 1)).unwrap();
        m.connect(gc(1, 0), gc(1, 1)).unwrap();
        let expected = ["┌───────┐", "│       │", "│       │", "│       │", "└───────┘", ""];
        assert_eq!(TextMaze::new(m.grid(), m.passages()).to_string(),
                   expected.join("\n"));
    }

    #[test]
    fn cell_bodies() {
        let mut m = maze(1, 3);
        m.connect(gc(0, 0), gc(0, 1)).unwrap();
        m.connect(gc(0, 1), gc(0, 2)).unwrap();

        let points = StartEndPointsDisplay::new(gc(0, 0), gc(0, 2));
        let text = TextMaze::new(m.grid(), m.passages()).with_body(&points).to_string();
        assert_eq!(text.lines().nth(1), Some("│ S       E │"));

        let distances = m.distances(gc(0, 0)).unwrap();
        let text = TextMaze::new(m.grid(), m.passages()).with_body(&distances).to_string();
        assert_eq!(text.lines().nth(1), Some("│ 0   1   2 │"));

        let path = m.shortest_path(gc(0, 1), gc(0, 2)).unwrap();
        let on_path = PathDisplay::new(&path);
        let text = TextMaze::new(m.grid(), m.passages()).with_body(&on_path).to_string();
        assert_eq!(text.lines().nth(1), Some("│     .   . │"));
    }

    #[test]
    fn distances_are_hexadecimal() {
        let mut m = maze(1, 12);
        for col in 0..11 {
            m.connect(gc(0, col), gc(0, col + 1)).unwrap();
        }
        let distances = m.distances(gc(0, 0)).unwrap();
        assert_eq!(distances.render_cell_body(gc(0, 10)), " a ");
        assert_eq!(distances.render_cell_body(gc(0, 11)), " b ");

        let unreachable = maze(1, 2);
        let distances = unreachable.distances(gc(0, 0)).unwrap();
        assert_eq!(distances.render_cell_body(gc(0, 1)), "   ");
    }

    #[test]
    fn tags_after_a_solve() {
        let mut m = maze(1, 3);
        m.connect(gc(0, 0), gc(0, 1)).unwrap();
        m.connect(gc(0, 1), gc(0, 2)).unwrap();
        let _ = m.solve(gc(0, 1), gc(0, 2)).unwrap();

        let tags = TagDisplay::new(m.grid()).with_points(gc(0, 1), gc(0, 2));
        assert_eq!(tags.render_cell_body(gc(0, 0)), "   ");
        assert_eq!(tags.render_cell_body(gc(0, 1)), " S ");
        assert_eq!(tags.render_cell_body(gc(0, 2)), " E ");

        let tags = TagDisplay::new(m.grid());
        assert_eq!(tags.render_cell_body(gc(0, 1)), " . ");
        assert_eq!(tags.render_cell_body(gc(0, 2)), " . ");
    }

    #[test]
    fn tags_while_carving() {
        let mut m = maze(2, 2);
        {
            let mut carver = m.carver(Some(6)).unwrap();
            let _ = carver.step().unwrap();
            let started = carver.current().unwrap();
            let tags = TagDisplay::new(carver.grid());
            assert_eq!(tags.render_cell_body(started), " + ");
        }
        m.generate(Some(6)).unwrap();
        let tags = TagDisplay::new(m.grid());
        let bodies = m.grid().iter().filter(|c| tags.render_cell_body(*c) == " + ").count();
        assert!(bodies >= 1);
    }
}
