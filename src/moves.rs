use crate::game::MoveDelta;
use std::fmt;

pub const UP_CHAR: char = '8';
pub const DOWN_CHAR: char = '2';
pub const LEFT_CHAR: char = '4';
pub const RIGHT_CHAR: char = '6';

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn from_char(ch: char) -> Option<Direction> {
        match ch {
            UP_CHAR => Some(Direction::Up),
            DOWN_CHAR => Some(Direction::Down),
            LEFT_CHAR => Some(Direction::Left),
            RIGHT_CHAR => Some(Direction::Right),
            _ => None,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Direction::Up => UP_CHAR,
            Direction::Down => DOWN_CHAR,
            Direction::Left => LEFT_CHAR,
            Direction::Right => RIGHT_CHAR,
        }
    }

    /// Unit step for this direction; rows grow downward.
    pub fn delta(self) -> MoveDelta {
        match self {
            Direction::Up => MoveDelta::new(-1, 0),
            Direction::Down => MoveDelta::new(1, 0),
            Direction::Left => MoveDelta::new(0, -1),
            Direction::Right => MoveDelta::new(0, 1),
        }
    }
}

/// A recorded move: a direction and how many times to repeat it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveToken {
    pub direction: Direction,
    pub count: u32,
}

impl MoveToken {
    pub fn new(direction: Direction, count: u32) -> Self {
        MoveToken { direction, count }
    }

    /// Parse a token such as `8`, `65` or `4 12`.
    ///
    /// The first character is the direction. Whatever follows is read as a
    /// decimal repeat count, defaulting to 1 when it is missing or not a
    /// number. A signed count such as `8-3` is not a number and also gives
    /// 1, so a move never reverses its direction. Returns `None` for an
    /// unknown direction.
    pub fn parse(token: &str) -> Option<MoveToken> {
        let token = token.trim();
        let mut chars = token.chars();
        let direction = Direction::from_char(chars.next()?)?;
        let count = chars
            .as_str()
            .split_whitespace()
            .next()
            .and_then(|word| word.parse::<u32>().ok())
            .unwrap_or(1);
        Some(MoveToken::new(direction, count))
    }

    pub fn delta(&self) -> MoveDelta {
        let unit = self.direction.delta();
        let count = i32::try_from(self.count).unwrap_or(i32::MAX);
        MoveDelta::new(unit.rows * count, unit.cols * count)
    }
}

impl fmt::Display for MoveToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.count == 1 {
            write!(f, "{}", self.direction.to_char())
        } else {
            write!(f, "{}{}", self.direction.to_char(), self.count)
        }
    }
}

/// Decode a move token into a delta. Unrecognized tokens decode to zero.
pub fn decode(token: &str) -> MoveDelta {
    MoveToken::parse(token)
        .map(|token| token.delta())
        .unwrap_or(MoveDelta::ZERO)
}

/// Split a move-history file into its tokens, one per non-blank line.
pub fn parse_history(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToString::to_string)
        .collect()
}

pub fn format_history(tokens: &[String]) -> String {
    let mut out = String::new();
    for token in tokens {
        out.push_str(token);
        out.push('\n');
    }
    out
}
