use crate::board::{Cell, Position};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// Reasons a level definition is rejected before play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LevelError {
    #[error("level {0} must be 0 or greater")]
    NegativeIndex(isize),
    #[error("level has no grid")]
    MissingGrid,
    #[error("goal list has an odd number of coordinates ({0})")]
    OddGoalList(usize),
    #[error("level has {0} workers, expected exactly one")]
    WorkerCount(usize),
    #[error("level does not contain any boxes")]
    NoBoxes,
    #[error("level does not have the same number of boxes ({boxes}) as goals ({goals})")]
    GoalMismatch { boxes: usize, goals: usize },
    #[error("goal at {0} is out of bounds or on a wall")]
    BadGoal(Position),
    #[error("level has a duplicate goal at {0}")]
    DuplicateGoal(Position),
}

impl LevelError {
    /// Legacy numeric diagnostic code, `0` down to `-7` in check order.
    pub fn code(&self) -> i32 {
        match self {
            LevelError::NegativeIndex(_) => 0,
            LevelError::MissingGrid => -1,
            LevelError::OddGoalList(_) => -2,
            LevelError::WorkerCount(_) => -3,
            LevelError::NoBoxes => -4,
            LevelError::GoalMismatch { .. } => -5,
            LevelError::BadGoal(_) => -6,
            LevelError::DuplicateGoal(_) => -7,
        }
    }
}

/// An immutable puzzle definition.
///
/// The grid holds plain cells only; goal status lives in `goals` and is
/// re-applied when a board is set up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level {
    grid: Vec<Vec<Cell>>,
    goals: Vec<Position>,
}

impl Level {
    pub fn new(grid: Vec<Vec<Cell>>, goals: Vec<Position>) -> Self {
        Level { grid, goals }
    }

    /// Build a level from goals flattened as `[row0, col0, row1, col1, ...]`.
    pub fn from_flat_goals(grid: Vec<Vec<Cell>>, flat: &[i32]) -> Result<Self, LevelError> {
        if flat.len() % 2 == 1 {
            return Err(LevelError::OddGoalList(flat.len()));
        }
        let goals = flat
            .chunks_exact(2)
            .map(|pair| Position::new(pair[0], pair[1]))
            .collect();
        Ok(Level { grid, goals })
    }

    pub fn grid(&self) -> &[Vec<Cell>] {
        &self.grid
    }

    pub fn goals(&self) -> &[Position] {
        &self.goals
    }

    pub fn height(&self) -> usize {
        self.grid.len()
    }

    pub fn width(&self) -> usize {
        self.grid.iter().map(Vec::len).max().unwrap_or(0)
    }

    fn cell_at(&self, pos: Position) -> Option<Cell> {
        let row = self.grid.get(usize::try_from(pos.row).ok()?)?;
        row.get(usize::try_from(pos.col).ok()?).copied()
    }

    fn count(&self, pred: impl Fn(Cell) -> bool) -> usize {
        self.grid
            .iter()
            .flatten()
            .filter(|&&cell| pred(cell))
            .count()
    }

    /// Run the structural checks, stopping at the first failure.
    pub fn validate(&self) -> Result<(), LevelError> {
        if self.grid.is_empty() {
            return Err(LevelError::MissingGrid);
        }

        let workers = self.count(Cell::is_worker);
        if workers != 1 {
            return Err(LevelError::WorkerCount(workers));
        }

        let boxes = self.count(Cell::is_box);
        if boxes == 0 {
            return Err(LevelError::NoBoxes);
        }
        if boxes != self.goals.len() {
            return Err(LevelError::GoalMismatch {
                boxes,
                goals: self.goals.len(),
            });
        }

        for &goal in &self.goals {
            match self.cell_at(goal) {
                None | Some(Cell::Wall) => return Err(LevelError::BadGoal(goal)),
                Some(_) => {}
            }
        }

        let mut seen = HashSet::with_capacity(self.goals.len());
        for &goal in &self.goals {
            if !seen.insert(goal) {
                return Err(LevelError::DuplicateGoal(goal));
            }
        }

        Ok(())
    }

    /// Encode the level in level-set text, with goals folded back into the
    /// cells they decorate. Reloading the text gives back this level as long
    /// as every row contains a wall.
    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rows = self.grid.clone();
        for goal in &self.goals {
            let (Ok(row), Ok(col)) = (usize::try_from(goal.row), usize::try_from(goal.col)) else {
                continue;
            };
            if let Some(cell) = rows.get_mut(row).and_then(|line| line.get_mut(col)) {
                *cell = cell.with_goal();
            }
        }
        for line in rows {
            let text: String = line.into_iter().map(Cell::to_char).collect();
            writeln!(f, "{}", text)?;
        }
        Ok(())
    }
}
