use crate::board::{Cell, Position, WALL_CHAR};
use crate::level::{Level, LevelError};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Error type for level-set loading.
#[derive(Debug, Error)]
pub enum LoadError {
    /// IO error when reading from file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// A block line contains a symbol that is not a cell
    #[error("unknown cell {symbol:?} at line {line}, column {column}")]
    UnknownCell {
        line: usize,
        column: usize,
        symbol: char,
    },
}

/// An ordered table of levels, as loaded from a level-set file or taken from
/// the built-in defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelSet {
    levels: Vec<Level>,
}

impl LevelSet {
    /// The stock levels shipped with the game.
    pub fn builtin() -> Self {
        let open_room = Level::new(
            grid(&["     ", "     ", "   $ ", "     ", "    @"]),
            vec![Position::new(2, 2)],
        );

        // Goals are kept in the flattened row/column encoding.
        let maze = Level::from_flat_goals(
            grid(&[
                "   #   ",
                "   #$  ",
                " ###  $",
                " #  $ $ ",
                "## # ## #   #####",
                "   # ## #####    ",
                " $  $            ",
                "#### ### #@##    ",
                "   #     ########",
            ]),
            &[5, 15, 6, 15, 7, 15, 5, 16, 6, 16, 7, 16],
        );

        let mut levels = vec![open_room];
        levels.extend(maze);
        LevelSet { levels }
    }

    /// Parse a level set from text.
    ///
    /// A line belongs to a level iff it contains a wall (`#`). Any other
    /// line, blank or not, ends the current level and is otherwise ignored.
    /// Goal-bearing cells (`.`, `*`, `+`) are recorded as goals and stored as
    /// their plain counterparts.
    pub fn from_text(contents: &str) -> Result<Self, LoadError> {
        let mut levels = Vec::new();
        let mut block: Vec<(usize, &str)> = Vec::new();

        for (index, line) in contents.lines().enumerate() {
            if line.contains(WALL_CHAR) {
                block.push((index + 1, line));
                continue;
            }
            if !block.is_empty() {
                levels.push(parse_block(&block)?);
                block.clear();
            }
        }

        // Don't forget the last level if the text doesn't end with a separator
        if !block.is_empty() {
            levels.push(parse_block(&block)?);
        }

        debug!(levels = levels.len(), "parsed level set");
        Ok(LevelSet { levels })
    }

    /// Parse a level set from a text file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let contents = fs::read_to_string(path)?;
        Self::from_text(&contents)
    }

    /// Replace this table with the levels in `path`. On error the table is
    /// left as it was.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<(), LoadError> {
        let loaded = Self::from_file(path)?;
        self.levels = loaded.levels;
        Ok(())
    }

    /// Select level `index` and check it is playable.
    pub fn validate(&self, index: isize) -> Result<&Level, LevelError> {
        if index < 0 {
            return Err(LevelError::NegativeIndex(index));
        }
        let level = self
            .levels
            .get(index as usize)
            .ok_or(LevelError::MissingGrid)?;
        level.validate()?;
        Ok(level)
    }

    /// Get the nth level (0-indexed).
    pub fn get(&self, index: usize) -> Option<&Level> {
        self.levels.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Level> {
        self.levels.iter()
    }

    /// Get the number of levels.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

impl Default for LevelSet {
    fn default() -> Self {
        Self::builtin()
    }
}

fn grid(rows: &[&str]) -> Vec<Vec<Cell>> {
    rows.iter()
        .map(|row| row.chars().filter_map(Cell::from_char).collect())
        .collect()
}

fn parse_block(lines: &[(usize, &str)]) -> Result<Level, LoadError> {
    let mut cells = Vec::with_capacity(lines.len());
    let mut goals = Vec::new();

    for (row, &(line_no, line)) in lines.iter().enumerate() {
        let mut cells_row = Vec::with_capacity(line.len());
        for (col, symbol) in line.chars().enumerate() {
            let cell = Cell::from_char(symbol).ok_or(LoadError::UnknownCell {
                line: line_no,
                column: col + 1,
                symbol,
            })?;
            if cell.is_goal() {
                goals.push(Position::new(row as i32, col as i32));
            }
            cells_row.push(cell.without_goal());
        }
        cells.push(cells_row);
    }

    Ok(Level::new(cells, goals))
}
