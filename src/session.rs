use crate::board::{Board, Position};
use crate::game::{self, PartialMove, Progress};
use crate::level::{Level, LevelError};
use crate::moves;
use tracing::{debug, warn};

/// Outcome of replaying a move history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Replay {
    pub applied: usize,
    pub rejected: usize,
    pub ignored: usize,
}

/// One playthrough of a level.
#[derive(Debug, Clone)]
pub struct Session {
    board: Board,
    worker: Position,
    move_count: u32,
    push_count: u32,
    history: Vec<String>,
}

impl Session {
    /// Validate `level` and set up a fresh board for it.
    pub fn new(level: &Level) -> Result<Self, LevelError> {
        level.validate()?;
        let (board, worker) = Board::setup(level)?;
        Ok(Session {
            board,
            worker,
            move_count: 0,
            push_count: 0,
            history: Vec::new(),
        })
    }

    /// Apply one move token.
    ///
    /// Unrecognized and zero-length tokens do nothing and are not recorded.
    /// Otherwise every unit step actually taken is counted, even when the
    /// move stops early, and the token is recorded if the worker moved.
    pub fn apply(&mut self, token: &str) -> Result<Progress, PartialMove> {
        let delta = moves::decode(token);
        if delta.is_zero() {
            debug!(token, "ignoring no-op move");
            return Ok(Progress::default());
        }

        let result = game::resolve_multi_step(&mut self.board, &mut self.worker, delta);
        let progress = match &result {
            Ok(progress) => *progress,
            Err(partial) => {
                debug!(token, steps = partial.progress.steps, reason = %partial.reason, "move stopped");
                partial.progress
            }
        };

        self.move_count += progress.steps;
        self.push_count += progress.pushes;
        if progress.steps > 0 {
            self.history.push(token.trim().to_string());
        }
        result
    }

    /// Apply every token of a move-history text in order. Rejected moves do
    /// not stop the replay; a completed level does.
    pub fn replay(&mut self, contents: &str) -> Replay {
        let mut replay = Replay::default();
        for token in moves::parse_history(contents) {
            if self.is_complete() {
                break;
            }
            if moves::decode(&token).is_zero() {
                replay.ignored += 1;
                continue;
            }
            match self.apply(&token) {
                Ok(_) => replay.applied += 1,
                Err(partial) => {
                    warn!(
                        token = %token,
                        blocked = partial.reason.is_blocked(),
                        error = %partial,
                        "replayed move rejected"
                    );
                    replay.rejected += 1;
                }
            }
        }
        replay
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn worker(&self) -> Position {
        self.worker
    }

    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    pub fn push_count(&self) -> u32 {
        self.push_count
    }

    /// Tokens that moved the worker, in the order they were applied.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn is_complete(&self) -> bool {
        self.board.is_complete()
    }
}
