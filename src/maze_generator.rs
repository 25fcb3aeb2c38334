//! Maze generation
//!
//! Perfect mazes are carved with a randomized depth-first traversal, the
//! "recursive backtracker". The traversal keeps its own stack of frames,
//! so the visiting order is the recursive one while the call stack stays
//! flat even for very large grids.

use std::fmt;
use std::ops::{Index, IndexMut};

use itertools::Itertools;
use log::debug;
use petgraph::graph::{NodeIndex, UnGraph};
use rand::Rng;

use crate::error::{check_count, MazeError, Result};

/// Location of a cell in the maze grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Neighbouring cell in `direction`, if it lies inside a `rows` x `cols` grid
    pub fn neighbor(self, direction: Direction, rows: usize, cols: usize) -> Option<Cell> {
        let (row, col) = match direction {
            Direction::Up => (self.row.checked_sub(1)?, self.col),
            Direction::Right => (self.row, self.col + 1),
            Direction::Down => (self.row + 1, self.col),
            Direction::Left => (self.row, self.col.checked_sub(1)?),
        };
        (row < rows && col < cols).then_some(Cell { row, col })
    }
}

/// Step from a cell to one of its four neighbours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// Candidate moves in their unshuffled order
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];
}

/// Dense row-major 2D array
///
/// Indexing outside the grid is a logic error and panics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid<T> {
    rows: usize,
    cols: usize,
    cells: Vec<T>,
}

impl<T: Clone> Grid<T> {
    pub fn new(rows: usize, cols: usize, fill: T) -> Self {
        Self {
            rows,
            cols,
            cells: vec![fill; rows * cols],
        }
    }
}

impl<T> Grid<T> {
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        (row < self.rows && col < self.cols).then(|| &self.cells[row * self.cols + col])
    }

    /// All entries with their `(row, col)` position, row by row
    pub fn iter(&self) -> impl Iterator<Item = ((usize, usize), &T)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, value)| ((i / self.cols, i % self.cols), value))
    }

    fn offset(&self, row: usize, col: usize) -> usize {
        assert!(
            row < self.rows && col < self.cols,
            "grid access out of bounds: ({row}, {col}) in a {}x{} grid",
            self.rows,
            self.cols
        );
        row * self.cols + col
    }
}

impl<T> Index<(usize, usize)> for Grid<T> {
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &T {
        &self.cells[self.offset(row, col)]
    }
}

impl<T> IndexMut<(usize, usize)> for Grid<T> {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        let offset = self.offset(row, col);
        &mut self.cells[offset]
    }
}

impl<T> Index<Cell> for Grid<T> {
    type Output = T;

    fn index(&self, cell: Cell) -> &T {
        &self[(cell.row, cell.col)]
    }
}

impl<T> IndexMut<Cell> for Grid<T> {
    fn index_mut(&mut self, cell: Cell) -> &mut T {
        &mut self[(cell.row, cell.col)]
    }
}

/// Source of uniformly distributed indices
///
/// Generation draws all of its randomness from here, so a scripted source
/// reproduces a maze exactly. Every [rand::Rng] is a source.
pub trait RandomSource {
    /// Uniform integer in `0..n`, `n >= 1`
    fn next_index(&mut self, n: usize) -> usize;
}

impl<R: Rng> RandomSource for R {
    fn next_index(&mut self, n: usize) -> usize {
        self.gen_range(0..n)
    }
}

/// Fisher-Yates shuffle driven by `random`
///
/// Walks from the last index down to 1, swapping each slot with a uniformly
/// chosen slot at or before it.
pub fn shuffle<T, R: RandomSource + ?Sized>(items: &mut [T], random: &mut R) {
    for i in (1..items.len()).rev() {
        let j = random.next_index(i + 1);
        items.swap(i, j);
    }
}

/// A carved perfect maze
///
/// `verticals[(row, col)]` is the passage between `(row, col)` and
/// `(row, col + 1)`; `horizontals[(row, col)]` is the passage between
/// `(row, col)` and `(row + 1, col)`. `true` means open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Maze {
    start: Cell,
    visited: Grid<bool>,
    verticals: Grid<bool>,
    horizontals: Grid<bool>,
}

impl Maze {
    fn closed(rows: usize, cols: usize, start: Cell) -> Self {
        Self {
            start,
            visited: Grid::new(rows, cols, false),
            verticals: Grid::new(rows, cols - 1, false),
            horizontals: Grid::new(rows - 1, cols, false),
        }
    }

    pub fn rows(&self) -> usize {
        self.visited.rows()
    }

    pub fn cols(&self) -> usize {
        self.visited.cols()
    }

    /// Cell where carving started
    pub fn start(&self) -> Cell {
        self.start
    }

    pub fn visited(&self) -> &Grid<bool> {
        &self.visited
    }

    pub fn verticals(&self) -> &Grid<bool> {
        &self.verticals
    }

    pub fn horizontals(&self) -> &Grid<bool> {
        &self.horizontals
    }

    /// Whether there is a passage from `cell` towards `direction`
    ///
    /// Moves off the grid are never open.
    pub fn is_open(&self, cell: Cell, direction: Direction) -> bool {
        self.passage(cell, direction).copied().unwrap_or(false)
    }

    /// Passage entry between `cell` and its neighbour, `None` off the grid
    fn passage(&self, cell: Cell, direction: Direction) -> Option<&bool> {
        match direction {
            Direction::Right => self.verticals.get(cell.row, cell.col),
            Direction::Left => self.verticals.get(cell.row, cell.col.checked_sub(1)?),
            Direction::Down => self.horizontals.get(cell.row, cell.col),
            Direction::Up => self.horizontals.get(cell.row.checked_sub(1)?, cell.col),
        }
    }

    /// Number of open passages
    pub fn passage_count(&self) -> usize {
        self.verticals
            .iter()
            .chain(self.horizontals.iter())
            .filter(|(_, open)| **open)
            .count()
    }

    /// Open passages as an undirected graph
    ///
    /// Node `row * cols + col` carries cell `(row, col)`; every open passage
    /// is one edge.
    pub fn passage_graph(&self) -> UnGraph<Cell, ()> {
        let cols = self.cols();
        let mut graph = UnGraph::with_capacity(self.rows() * cols, self.passage_count());
        for ((row, col), _) in self.visited.iter() {
            graph.add_node(Cell::new(row, col));
        }
        let node = |row: usize, col: usize| NodeIndex::new(row * cols + col);
        for ((row, col), _) in self.verticals.iter().filter(|(_, open)| **open) {
            graph.add_edge(node(row, col), node(row, col + 1), ());
        }
        for ((row, col), _) in self.horizontals.iter().filter(|(_, open)| **open) {
            graph.add_edge(node(row, col), node(row + 1, col), ());
        }
        graph
    }

    fn open(&mut self, cell: Cell, direction: Direction) {
        match direction {
            Direction::Right => self.verticals[cell] = true,
            Direction::Left => self.verticals[(cell.row, cell.col - 1)] = true,
            Direction::Down => self.horizontals[cell] = true,
            Direction::Up => self.horizontals[(cell.row - 1, cell.col)] = true,
        }
    }

    /// Mark `cell` visited and lay out its moves in random order
    ///
    /// Returns `None` if the cell had already been visited.
    fn enter<R: RandomSource + ?Sized>(&mut self, cell: Cell, random: &mut R) -> Option<Frame> {
        if self.visited[cell] {
            return None;
        }
        self.visited[cell] = true;
        let mut moves = Direction::ALL;
        shuffle(&mut moves, random);
        Some(Frame {
            cell,
            moves,
            next: 0,
        })
    }
}

/// Text drawing of the maze, `+--+` corners and `|` walls
impl fmt::Display for Maze {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (rows, cols) = (self.rows(), self.cols());
        let mut lines = vec![format!("+{}", "--+".repeat(cols))];
        for row in 0..rows {
            let cells = (0..cols)
                .map(|col| {
                    if self.is_open(Cell::new(row, col), Direction::Right) {
                        "   "
                    } else {
                        "  |"
                    }
                })
                .join("");
            lines.push(format!("|{cells}"));
            let floor = (0..cols)
                .map(|col| {
                    if self.is_open(Cell::new(row, col), Direction::Down) {
                        "  +"
                    } else {
                        "--+"
                    }
                })
                .join("");
            lines.push(format!("+{floor}"));
        }
        write!(f, "{}", lines.iter().join("\n"))
    }
}

/// Pending work at one cell of the traversal
struct Frame {
    cell: Cell,
    moves: [Direction; 4],
    next: usize,
}

impl Frame {
    fn advance(&mut self) -> Option<Direction> {
        let direction = self.moves.get(self.next).copied();
        self.next += 1;
        direction
    }
}

/// Recursive backtracker over a fixed-size grid
#[derive(Debug, Clone, Copy)]
pub struct MazeGenerator {
    rows: usize,
    cols: usize,
}

impl MazeGenerator {
    /// Generator for a `rows` x `cols` grid
    ///
    /// Returns error, if either dimension is zero or the cell count does
    /// not fit in `usize`.
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        let rows = check_count("rows", rows)?;
        let cols = check_count("cols", cols)?;
        if rows.checked_mul(cols).is_none() {
            return Err(MazeError::InvalidDimension {
                name: "rows * cols",
                value: format!("{rows} * {cols}"),
            });
        }
        Ok(Self { rows, cols })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Carve a maze from a uniformly chosen start cell
    ///
    /// The start row is drawn before the start column.
    pub fn generate<R: RandomSource + ?Sized>(&self, random: &mut R) -> Maze {
        let start = Cell::new(random.next_index(self.rows), random.next_index(self.cols));
        self.carve(start, random)
    }

    /// Carve a maze from a given start cell
    pub fn generate_from<R: RandomSource + ?Sized>(
        &self,
        start: Cell,
        random: &mut R,
    ) -> Result<Maze> {
        if start.row >= self.rows || start.col >= self.cols {
            return Err(MazeError::StartOutOfBounds {
                row: start.row,
                col: start.col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(self.carve(start, random))
    }

    /// Depth-first carving
    ///
    /// From the cell on top of the stack, take its next move. Moves off the
    /// grid or into visited cells are skipped; otherwise the wall in between
    /// is removed and the neighbour becomes the new top. A cell is popped
    /// once all four of its moves are spent.
    fn carve<R: RandomSource + ?Sized>(&self, start: Cell, random: &mut R) -> Maze {
        let mut maze = Maze::closed(self.rows, self.cols, start);
        let mut stack: Vec<Frame> = Vec::new();
        stack.extend(maze.enter(start, random));

        while let Some(frame) = stack.last_mut() {
            let Some(direction) = frame.advance() else {
                stack.pop();
                continue;
            };
            let cell = frame.cell;
            let Some(next) = cell.neighbor(direction, self.rows, self.cols) else {
                continue;
            };
            if maze.visited[next] {
                continue;
            }
            maze.open(cell, direction);
            stack.extend(maze.enter(next, random));
        }

        debug!(
            "Carved {}x{} maze from {:?} with {} passages",
            self.rows,
            self.cols,
            start,
            maze.passage_count()
        );
        maze
    }
}

/// Generate a `rows` x `cols` perfect maze
///
/// Shorthand for [MazeGenerator::new] followed by [MazeGenerator::generate].
pub fn generate<R: RandomSource + ?Sized>(
    rows: usize,
    cols: usize,
    random: &mut R,
) -> Result<Maze> {
    Ok(MazeGenerator::new(rows, cols)?.generate(random))
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, VecDeque};

    use petgraph::algo::{connected_components, is_cyclic_undirected};
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    /// Source that always draws the first index
    struct Zeros;

    impl RandomSource for Zeros {
        fn next_index(&mut self, _n: usize) -> usize {
            0
        }
    }

    /// Count cells reachable from (0, 0) through open passages
    fn flood_fill(maze: &Maze) -> usize {
        let mut seen = Grid::new(maze.rows(), maze.cols(), false);
        let mut queue = VecDeque::from([Cell::new(0, 0)]);
        seen[Cell::new(0, 0)] = true;
        let mut count = 0;
        while let Some(cell) = queue.pop_front() {
            count += 1;
            for direction in Direction::ALL {
                if !maze.is_open(cell, direction) {
                    continue;
                }
                let next = cell.neighbor(direction, maze.rows(), maze.cols()).unwrap();
                if !seen[next] {
                    seen[next] = true;
                    queue.push_back(next);
                }
            }
        }
        count
    }

    #[test]
    fn zero_source_carves_a_single_path() {
        let maze = generate(2, 2, &mut Zeros).unwrap();

        assert_eq!(maze.start(), Cell::new(0, 0));
        assert!(maze.verticals()[(0, 0)]);
        assert!(maze.horizontals()[(0, 1)]);
        assert!(maze.verticals()[(1, 0)]);
        assert!(!maze.horizontals()[(0, 0)]);
        assert_eq!(maze.passage_count(), 3);
        assert_eq!(
            maze.to_string(),
            "
+--+--+
|     |
+--+  +
|     |
+--+--+"
                .trim()
        );
    }

    #[test]
    fn zero_source_shuffle_order() {
        let mut moves = Direction::ALL;
        shuffle(&mut moves, &mut Zeros);
        assert_eq!(
            moves,
            [
                Direction::Right,
                Direction::Down,
                Direction::Left,
                Direction::Up
            ]
        );
    }

    #[test]
    fn every_size_is_a_spanning_tree() {
        let mut random = StdRng::seed_from_u64(13);
        for rows in 1..=8 {
            for cols in 1..=8 {
                let maze = generate(rows, cols, &mut random).unwrap();
                let cells = rows * cols;

                assert!(maze.visited().iter().all(|(_, visited)| *visited));
                assert_eq!(maze.passage_count(), cells - 1, "{rows}x{cols}");
                assert_eq!(flood_fill(&maze), cells, "{rows}x{cols}");

                let graph = maze.passage_graph();
                assert_eq!(graph.node_count(), cells);
                assert_eq!(connected_components(&graph), 1);
                assert!(!is_cyclic_undirected(&graph));
            }
        }
    }

    #[test]
    fn same_seed_same_maze() {
        let first = generate(12, 17, &mut StdRng::seed_from_u64(42)).unwrap();
        let second = generate(12, 17, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn single_cell_has_no_passages() {
        let maze = generate(1, 1, &mut StdRng::seed_from_u64(0)).unwrap();
        assert_eq!(maze.start(), Cell::new(0, 0));
        assert_eq!(maze.passage_count(), 0);
        assert_eq!(maze.verticals().iter().count(), 0);
        assert_eq!(maze.horizontals().iter().count(), 0);
        assert_eq!(maze.to_string(), "+--+\n|  |\n+--+");
    }

    #[test]
    fn single_row_is_a_corridor() {
        let maze = generate(1, 9, &mut StdRng::seed_from_u64(3)).unwrap();
        assert!(maze.verticals().iter().all(|(_, open)| *open));
        assert_eq!(maze.passage_count(), 8);

        let maze = generate(6, 1, &mut StdRng::seed_from_u64(3)).unwrap();
        assert!(maze.horizontals().iter().all(|(_, open)| *open));
    }

    #[test]
    fn large_grid_does_not_overflow_the_stack() {
        let maze = generate(300, 300, &mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(maze.passage_count(), 300 * 300 - 1);
    }

    #[test]
    fn injected_start_cell() {
        let generator = MazeGenerator::new(4, 5).unwrap();
        let maze = generator
            .generate_from(Cell::new(3, 4), &mut StdRng::seed_from_u64(8))
            .unwrap();
        assert_eq!(maze.start(), Cell::new(3, 4));
        assert_eq!(maze.passage_count(), 19);

        let err = generator
            .generate_from(Cell::new(4, 0), &mut Zeros)
            .unwrap_err();
        assert!(matches!(err, MazeError::StartOutOfBounds { row: 4, .. }));
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        assert!(matches!(
            MazeGenerator::new(0, 3),
            Err(MazeError::InvalidDimension { name: "rows", .. })
        ));
        assert!(matches!(
            generate(3, 0, &mut Zeros),
            Err(MazeError::InvalidDimension { name: "cols", .. })
        ));
    }

    #[test]
    fn overflowing_cell_count_is_rejected() {
        let err = MazeGenerator::new(usize::MAX / 2, 3).unwrap_err();
        assert!(matches!(
            err,
            MazeError::InvalidDimension {
                name: "rows * cols",
                ..
            }
        ));
        assert!(err.to_string().contains("rows * cols"));
        assert!(generate(usize::MAX, usize::MAX, &mut Zeros).is_err());
        assert!(MazeGenerator::new(usize::MAX, 1).is_ok());
    }

    #[test]
    fn grid_get_stays_inside() {
        let mut grid = Grid::new(2, 3, 0u8);
        grid[(1, 2)] = 7;
        assert_eq!(grid.get(1, 2), Some(&7));
        assert_eq!(grid.get(0, 0), Some(&0));
        assert_eq!(grid.get(2, 0), None);
        assert_eq!(grid.get(0, 3), None);
    }

    #[test]
    fn cells_outside_the_grid_have_no_passages() {
        let maze = generate(3, 3, &mut StdRng::seed_from_u64(5)).unwrap();
        for direction in Direction::ALL {
            assert!(!maze.is_open(Cell::new(3, 1), direction));
            assert!(!maze.is_open(Cell::new(1, 3), direction));
            assert!(!maze.is_open(Cell::new(7, 7), direction));
        }
    }

    #[test]
    fn moves_off_the_grid_are_closed() {
        let maze = generate(3, 3, &mut StdRng::seed_from_u64(5)).unwrap();
        assert!(!maze.is_open(Cell::new(0, 0), Direction::Up));
        assert!(!maze.is_open(Cell::new(0, 0), Direction::Left));
        assert!(!maze.is_open(Cell::new(2, 2), Direction::Down));
        assert!(!maze.is_open(Cell::new(2, 2), Direction::Right));
    }

    #[test]
    fn passages_are_symmetric() {
        let maze = generate(5, 7, &mut StdRng::seed_from_u64(21)).unwrap();
        for ((row, col), _) in maze.visited().iter() {
            let cell = Cell::new(row, col);
            for direction in Direction::ALL {
                if let Some(next) = cell.neighbor(direction, maze.rows(), maze.cols()) {
                    let back = match direction {
                        Direction::Up => Direction::Down,
                        Direction::Right => Direction::Left,
                        Direction::Down => Direction::Up,
                        Direction::Left => Direction::Right,
                    };
                    assert_eq!(maze.is_open(cell, direction), maze.is_open(next, back));
                }
            }
        }
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn grid_access_outside_bounds_panics() {
        let grid = Grid::new(2, 2, false);
        let _ = grid[(2, 0)];
    }

    #[test]
    fn shuffle_orders_are_uniform() {
        const TRIALS: usize = 24_000;
        let mut random = StdRng::seed_from_u64(7);
        let mut counts: HashMap<[Direction; 4], usize> = HashMap::new();
        for _ in 0..TRIALS {
            let mut moves = Direction::ALL;
            shuffle(&mut moves, &mut random);
            *counts.entry(moves).or_default() += 1;
        }
        assert_eq!(counts.len(), 24);

        let expected = (TRIALS / 24) as f64;
        let chi_square: f64 = counts
            .values()
            .map(|&observed| (observed as f64 - expected).powi(2) / expected)
            .sum();
        // 23 degrees of freedom, p = 0.0001 is about 52.6
        assert!(chi_square < 60.0, "chi-square {chi_square}");
    }
}
