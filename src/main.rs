use docopt::Docopt;
use error_chain::bail;
use itertools::Itertools;
use log::info;
use perfect_mazes::{
    cells::GridCoordinate,
    grid_displays::{GridDisplay, PathDisplay, StartEndPointsDisplay, TagDisplay, TextMaze},
    maze::Maze,
    pathing::SolveOutcome,
    units::{ColumnsCount, RowsCount},
};
use rand::SeedableRng;
use rand_xorshift::XorShiftRng;
use serde_derive::Deserialize;
use std::{
    io,
    io::prelude::*,
    fs::File,
};

const USAGE: &str = "Perfect mazes

Usage:
    maze_driver -h | --help
    maze_driver [--rows=<r>] [--cols=<c>] [--seed=<s>] [--random-points] [--start-row=<sr> --start-col=<sc>] [--goal-row=<gr> --goal-col=<gc>] [--show-path | --show-distances] [--animate] [--text-out=<path>] [--save-edges=<path>]

Options:
    -h --help              Show this screen.
    --rows=<r>             Number of rows in the maze [default: 24].
    --cols=<c>             Number of columns in the maze [default: 24].
                           Rows times columns may be at most 4194304, e.g. 2048 by 2048.
    --seed=<s>             Seed for the maze generator. A random seed is chosen and logged if not given.
    --random-points        Choose the start and goal cells at random. They are always different cells.
    --start-row=<sr>       Row of the start cell, the top row is 0. The top left cell if not given.
    --start-col=<sc>       Column of the start cell, the left column is 0.
    --goal-row=<gr>        Row of the goal cell. The bottom right cell if not given.
    --goal-col=<gc>        Column of the goal cell.
    --show-path            Show the shortest path from the start to the goal.
    --show-distances       Show the distance from the start to every other cell, in hexadecimal.
    --animate              Print the maze after every generation step, and every solve step with --show-path.
    --text-out=<path>      Output file path for the textual rendering of the maze, standard output if not given.
    --save-edges=<path>    Serialize the maze to a text file: each line is a pair of numbers. Line 1: n(#vertices) m(#edges). Line 2+ edge between vertices. Uses 1-based vertex indices.
";

#[derive(Debug, Deserialize)]
struct MazeArgs {
    flag_rows: usize,
    flag_cols: usize,
    flag_seed: Option<u64>,
    flag_random_points: bool,
    flag_start_row: Option<u32>,
    flag_start_col: Option<u32>,
    flag_goal_row: Option<u32>,
    flag_goal_col: Option<u32>,
    flag_show_path: bool,
    flag_show_distances: bool,
    flag_animate: bool,
    flag_text_out: String,
    flag_save_edges: String,
}

mod errors {
    use error_chain::*;
    error_chain! {

        foreign_links {
            DocOptFailure(::docopt::Error);
            Io(::std::io::Error);
            Maze(::perfect_mazes::errors::MazeError);
        }
    }
}
use crate::errors::*;

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args: MazeArgs = Docopt::new(USAGE).and_then(|d| d.deserialize())?;

    let mut maze = Maze::new(RowsCount(args.flag_rows), ColumnsCount(args.flag_cols))
        .chain_err(|| format!("Cannot make a {} by {} maze", args.flag_rows, args.flag_cols))?;

    let summary = if args.flag_animate {
        maze.generate_with(args.flag_seed, |step, grid, passages| {
            let tags = TagDisplay::new(grid);
            println!("{:?}\n{}", step, TextMaze::new(grid, passages).with_body(&tags));
        })?
    } else {
        maze.generate(args.flag_seed)?
    };
    let seed = summary.seed.unwrap_or_default();
    info!("maze seed {}, {} generation steps", seed, summary.steps);

    choose_points(&mut maze, &args, seed)?;

    if !args.flag_save_edges.is_empty() {
        save_maze_graph(&maze, &args.flag_save_edges)?;
    }

    let text = render_text(&mut maze, &args)?;
    if args.flag_text_out.is_empty() {
        println!("{}", text);
    } else {
        write_text_to_file(&text, &args.flag_text_out)
            .chain_err(|| format!("Failed to write maze to text file {}", args.flag_text_out))?;
    }

    Ok(())
}

/// Start and goal from the arguments, falling back to the maze's own corners.
/// Random points are derived from the maze seed so a seeded run is repeatable.
fn choose_points(maze: &mut Maze, maze_args: &MazeArgs, seed: u64) -> Result<()> {
    if maze_args.flag_random_points {
        let mut rng = XorShiftRng::seed_from_u64(seed.wrapping_add(1));
        maze.pick_random_points(&mut rng);
        return Ok(());
    }

    let start = match (maze_args.flag_start_row, maze_args.flag_start_col) {
        (Some(row), Some(col)) => GridCoordinate::new(row, col),
        _ => maze.start(),
    };
    let goal = match (maze_args.flag_goal_row, maze_args.flag_goal_col) {
        (Some(row), Some(col)) => GridCoordinate::new(row, col),
        _ => maze.goal(),
    };
    maze.set_points(start, goal)
        .chain_err(|| format!("Invalid start {} or goal {}", start, goal))?;
    Ok(())
}

/// Draw the maze with the cell bodies the arguments ask for:
/// - the start and goal markers by default
/// - distances from the start to every cell
/// - the shortest path from the start to the goal
fn render_text(maze: &mut Maze, maze_args: &MazeArgs) -> Result<String> {
    let (start, goal) = (maze.start(), maze.goal());

    let body: Box<dyn GridDisplay> = if maze_args.flag_show_distances {
        Box::new(maze.distances(start)?)
    } else if maze_args.flag_show_path {
        let outcome = if maze_args.flag_animate {
            let passages = maze.passages().clone();
            let mut solver = maze.solver(start, goal)?;
            let outcome = solver.run(|step, grid| {
                let tags = TagDisplay::new(grid).with_points(start, goal);
                println!("{:?}\n{}", step, TextMaze::new(grid, &passages).with_body(&tags));
            });
            outcome
        } else {
            maze.solve(start, goal)?
        };
        match outcome {
            SolveOutcome::Found(path) => {
                info!("shortest path from {} to {} is {} steps", start, goal, path.edge_count());
                Box::new(PathDisplay::new(&path))
            }
            SolveOutcome::Exhausted => {
                bail!("No path from {} to {}, the maze is not perfect", start, goal)
            }
        }
    } else {
        Box::new(StartEndPointsDisplay::new(start, goal))
    };

    Ok(TextMaze::new(maze.grid(), maze.passages()).with_body(&*body).to_string())
}

fn write_text_to_file(data: &str, file_name: &str) -> io::Result<()> {
    let mut f = File::create(file_name)?;
    f.write_all(data.as_bytes())?;
    Ok(())
}

fn save_maze_graph(maze: &Maze, file_path: &str) -> Result<()> {
    let grid = maze.grid();
    let passages = maze.passages();

    let header = format!("{} {}", grid.size(), passages.links_count().0);
    let edges = passages.iter_links()
        .filter_map(|(src, dst)| {
            match (grid.coordinate_to_index(src), grid.coordinate_to_index(dst)) {
                (Some(a), Some(b)) => Some(format!("{} {}", a + 1, b + 1)),
                _ => None,
            }
        });
    let mut graph_data = std::iter::once(header).chain(edges).join("\n");
    graph_data.push('\n');

    write_text_to_file(&graph_data, file_path)
        .chain_err(|| format!("Failed to write maze graph to text file {}", file_path))?;

    Ok(())
}
