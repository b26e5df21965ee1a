use crate::game::MoveDelta;
use crate::level::{Level, LevelError};
use std::fmt;

pub const EMPTY_CHAR: char = ' ';
pub const WALL_CHAR: char = '#';
pub const GOAL_CHAR: char = '.';
pub const BOX_CHAR: char = '$';
pub const BOX_GOAL_CHAR: char = '*';
pub const WORKER_CHAR: char = '@';
pub const WORKER_GOAL_CHAR: char = '+';

/// The state of a single board cell.
///
/// Goal-decorated states are values of their own so every transition is a
/// swap between two named states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Empty,
    Wall,
    Goal,
    Box,
    BoxOnGoal,
    Worker,
    WorkerOnGoal,
}

impl Cell {
    /// Parse a cell from its level-text symbol.
    ///
    /// Characters:
    /// - ` ` = Empty floor
    /// - `#` = Wall
    /// - `.` = Goal
    /// - `$` = Box
    /// - `*` = Box on goal
    /// - `@` = Worker
    /// - `+` = Worker on goal
    pub fn from_char(ch: char) -> Option<Cell> {
        match ch {
            EMPTY_CHAR => Some(Cell::Empty),
            WALL_CHAR => Some(Cell::Wall),
            GOAL_CHAR => Some(Cell::Goal),
            BOX_CHAR => Some(Cell::Box),
            BOX_GOAL_CHAR => Some(Cell::BoxOnGoal),
            WORKER_CHAR => Some(Cell::Worker),
            WORKER_GOAL_CHAR => Some(Cell::WorkerOnGoal),
            _ => None,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Cell::Empty => EMPTY_CHAR,
            Cell::Wall => WALL_CHAR,
            Cell::Goal => GOAL_CHAR,
            Cell::Box => BOX_CHAR,
            Cell::BoxOnGoal => BOX_GOAL_CHAR,
            Cell::Worker => WORKER_CHAR,
            Cell::WorkerOnGoal => WORKER_GOAL_CHAR,
        }
    }

    /// The goal-decorated counterpart of a plain cell. Anything that is not a
    /// box or the worker becomes a bare goal.
    pub fn with_goal(self) -> Cell {
        match self {
            Cell::Box | Cell::BoxOnGoal => Cell::BoxOnGoal,
            Cell::Worker | Cell::WorkerOnGoal => Cell::WorkerOnGoal,
            _ => Cell::Goal,
        }
    }

    /// The plain counterpart of a goal-decorated cell.
    pub fn without_goal(self) -> Cell {
        match self {
            Cell::BoxOnGoal => Cell::Box,
            Cell::WorkerOnGoal => Cell::Worker,
            Cell::Goal => Cell::Empty,
            other => other,
        }
    }

    pub fn is_goal(self) -> bool {
        matches!(self, Cell::Goal | Cell::BoxOnGoal | Cell::WorkerOnGoal)
    }

    pub fn is_box(self) -> bool {
        matches!(self, Cell::Box | Cell::BoxOnGoal)
    }

    pub fn is_worker(self) -> bool {
        matches!(self, Cell::Worker | Cell::WorkerOnGoal)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// A (row, column) board coordinate. Rows grow downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub const fn new(row: i32, col: i32) -> Self {
        Position { row, col }
    }

    pub fn offset(self, delta: MoveDelta) -> Position {
        Position {
            row: self.row + delta.rows,
            col: self.col + delta.cols,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// The mutable grid of a single play session. Rows may differ in length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: Vec<Vec<Cell>>,
}

impl Board {
    pub fn new(cells: Vec<Vec<Cell>>) -> Self {
        Board { cells }
    }

    /// Build a fresh board for `level` by re-applying its goals to a copy of
    /// the grid. Returns the board and the worker's starting position.
    pub fn setup(level: &Level) -> Result<(Board, Position), LevelError> {
        let mut board = Board::new(level.grid().to_vec());
        for &goal in level.goals() {
            if let Some(cell) = board.cell_mut(goal) {
                *cell = cell.with_goal();
            }
        }
        let worker = board.find_worker().ok_or(LevelError::WorkerCount(0))?;
        Ok((board, worker))
    }

    fn index(&self, pos: Position) -> Option<(usize, usize)> {
        let row = usize::try_from(pos.row).ok()?;
        let col = usize::try_from(pos.col).ok()?;
        if col < self.cells.get(row)?.len() {
            Some((row, col))
        } else {
            None
        }
    }

    fn cell_mut(&mut self, pos: Position) -> Option<&mut Cell> {
        let (row, col) = self.index(pos)?;
        Some(&mut self.cells[row][col])
    }

    /// Returns the cell at `pos`, or `None` if `pos` is outside its row.
    pub fn get(&self, pos: Position) -> Option<Cell> {
        self.index(pos).map(|(row, col)| self.cells[row][col])
    }

    /// Set the cell at `pos` to `matched` if it currently equals `before`,
    /// otherwise to `otherwise`. Out-of-bounds positions are ignored.
    pub fn toggle(&mut self, pos: Position, before: Cell, matched: Cell, otherwise: Cell) {
        if let Some(cell) = self.cell_mut(pos) {
            *cell = if *cell == before { matched } else { otherwise };
        }
    }

    /// Iterate over every cell together with its position, row by row.
    pub fn cells(&self) -> impl Iterator<Item = (Position, Cell)> + '_ {
        self.cells.iter().enumerate().flat_map(|(row, line)| {
            line.iter()
                .enumerate()
                .map(move |(col, &cell)| (Position::new(row as i32, col as i32), cell))
        })
    }

    pub fn count(&self, pred: impl Fn(Cell) -> bool) -> usize {
        self.cells().filter(|&(_, cell)| pred(cell)).count()
    }

    pub fn find_worker(&self) -> Option<Position> {
        self.cells()
            .find(|&(_, cell)| cell.is_worker())
            .map(|(pos, _)| pos)
    }

    /// Check if every goal is covered by a box (win condition).
    pub fn is_complete(&self) -> bool {
        !self
            .cells()
            .any(|(_, cell)| cell == Cell::Goal || cell == Cell::WorkerOnGoal)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.cells {
            let text: String = line.iter().map(|cell| cell.to_char()).collect();
            writeln!(f, "{}", text)?;
        }
        Ok(())
    }
}
