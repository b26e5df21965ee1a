use crate::board::{Board, Cell, Position};
use std::fmt;
use std::ops::Neg;
use thiserror::Error;

const WORKER_KINDS: [Cell; 2] = [Cell::Worker, Cell::WorkerOnGoal];
const BOX_KINDS: [Cell; 2] = [Cell::Box, Cell::BoxOnGoal];

/// A step vector in (rows, cols). A well-formed request moves along exactly
/// one axis; the magnitude is the number of repeated unit steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct MoveDelta {
    pub rows: i32,
    pub cols: i32,
}

impl MoveDelta {
    pub const ZERO: MoveDelta = MoveDelta { rows: 0, cols: 0 };

    pub const fn new(rows: i32, cols: i32) -> Self {
        MoveDelta { rows, cols }
    }

    pub fn is_zero(&self) -> bool {
        self.rows == 0 && self.cols == 0
    }

    /// True for exactly one cell of travel along one axis.
    pub fn is_unit(&self) -> bool {
        matches!((self.rows, self.cols), (0, 1 | -1) | (1 | -1, 0))
    }

    /// Number of unit cells travelled.
    pub fn magnitude(&self) -> u32 {
        self.rows.unsigned_abs().saturating_add(self.cols.unsigned_abs())
    }
}

impl Neg for MoveDelta {
    type Output = MoveDelta;

    fn neg(self) -> MoveDelta {
        MoveDelta {
            rows: self.rows.wrapping_neg(),
            cols: self.cols.wrapping_neg(),
        }
    }
}

impl fmt::Display for MoveDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.rows, self.cols)
    }
}

/// Why a single step was refused. A refused step never mutates the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveRejected {
    #[error("mover position is outside the board")]
    OutOfBounds,
    #[error("mover position does not hold the expected piece")]
    WrongMoverKind,
    #[error("move must be one cell along exactly one axis")]
    MalformedDelta,
    #[error("destination is a wall or outside the board")]
    Blocked,
    #[error("destination holds a box")]
    BoxInTheWay,
    #[error("blocked by a box that cannot be pushed")]
    BlockedByImmovableBox,
}

impl MoveRejected {
    /// A blocked worker made a legal request that the board refused, as
    /// opposed to an invalid request.
    pub fn is_blocked(&self) -> bool {
        matches!(self, MoveRejected::BlockedByImmovableBox)
    }
}

/// What a successful worker step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Walked,
    Pushed,
}

/// Unit steps taken by a multi-step move, and how many of them pushed a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    pub steps: u32,
    pub pushes: u32,
}

impl Progress {
    pub const fn new(steps: u32, pushes: u32) -> Self {
        Progress { steps, pushes }
    }
}

/// A multi-step move that stopped early. Steps before `reason` stand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("stopped after {} step(s): {}", .progress.steps, .reason)]
pub struct PartialMove {
    pub progress: Progress,
    pub reason: MoveRejected,
}

/// Check whether the piece at `pos` may move by `delta`.
///
/// `required` lists the kinds the caller expects at `pos`. On success the
/// destination is returned. A box at the destination is reported as
/// `BoxInTheWay` so a worker can try to push it.
pub fn can_occupy(
    board: &Board,
    pos: Position,
    delta: MoveDelta,
    required: &[Cell],
) -> Result<Position, MoveRejected> {
    let current = board.get(pos).ok_or(MoveRejected::OutOfBounds)?;
    if !required.contains(&current) {
        return Err(MoveRejected::WrongMoverKind);
    }
    if !delta.is_unit() {
        return Err(MoveRejected::MalformedDelta);
    }

    let dest = pos.offset(delta);
    match board.get(dest) {
        None | Some(Cell::Wall) => Err(MoveRejected::Blocked),
        Some(cell) if cell.is_box() => Err(MoveRejected::BoxInTheWay),
        Some(_) => Ok(dest),
    }
}

/// Push the box at `pos` one cell by `delta`. Box-to-box pushes are refused.
pub fn push_box(board: &mut Board, pos: Position, delta: MoveDelta) -> Result<Position, MoveRejected> {
    let dest = can_occupy(board, pos, delta, &BOX_KINDS)?;
    board.toggle(dest, Cell::Goal, Cell::BoxOnGoal, Cell::Box);
    board.toggle(pos, Cell::BoxOnGoal, Cell::Goal, Cell::Empty);
    Ok(dest)
}

/// Move the worker one cell by `delta`, pushing a box if one is in the way.
/// `worker` is updated in place on success.
pub fn step_worker(
    board: &mut Board,
    worker: &mut Position,
    delta: MoveDelta,
) -> Result<Step, MoveRejected> {
    let (dest, step) = match can_occupy(board, *worker, delta, &WORKER_KINDS) {
        Ok(dest) => (dest, Step::Walked),
        Err(MoveRejected::BoxInTheWay) => {
            let dest = worker.offset(delta);
            push_box(board, dest, delta).map_err(|_| MoveRejected::BlockedByImmovableBox)?;
            (dest, Step::Pushed)
        }
        Err(err) => return Err(err),
    };

    board.toggle(dest, Cell::Goal, Cell::WorkerOnGoal, Cell::Worker);
    board.toggle(*worker, Cell::WorkerOnGoal, Cell::Goal, Cell::Empty);
    *worker = dest;
    Ok(step)
}

/// Resolve a possibly repeated move as a sequence of unit steps along its
/// axis, stopping at the first step that fails.
///
/// A zero delta is a no-op.
pub fn resolve_multi_step(
    board: &mut Board,
    worker: &mut Position,
    delta: MoveDelta,
) -> Result<Progress, PartialMove> {
    let mut progress = Progress::new(0, 0);
    if delta.is_zero() {
        return Ok(progress);
    }
    if delta.rows != 0 && delta.cols != 0 {
        return Err(PartialMove {
            progress,
            reason: MoveRejected::MalformedDelta,
        });
    }

    let unit = MoveDelta::new(delta.rows.signum(), delta.cols.signum());
    for _ in 0..delta.magnitude() {
        match step_worker(board, worker, unit) {
            Ok(Step::Walked) => {}
            Ok(Step::Pushed) => progress.pushes += 1,
            Err(reason) => return Err(PartialMove { progress, reason }),
        }
        progress.steps += 1;
    }
    Ok(progress)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    const UP: MoveDelta = MoveDelta::new(-1, 0);
    const DOWN: MoveDelta = MoveDelta::new(1, 0);
    const LEFT: MoveDelta = MoveDelta::new(0, -1);
    const RIGHT: MoveDelta = MoveDelta::new(0, 1);

    fn board_from(text: &str) -> (Board, Position) {
        let board = Board::new(
            text.lines()
                .map(|line| line.chars().map(|ch| Cell::from_char(ch).unwrap()).collect())
                .collect(),
        );
        let worker = board.find_worker().unwrap();
        (board, worker)
    }

    #[test]
    fn test_can_occupy() {
        let (board, worker) = board_from("#####\n#@$ #\n# # #\n#####");

        assert_eq!(
            can_occupy(&board, worker, DOWN, &WORKER_KINDS),
            Ok(Position::new(2, 1))
        );
        assert_eq!(
            can_occupy(&board, worker, RIGHT, &WORKER_KINDS),
            Err(MoveRejected::BoxInTheWay)
        );
        assert_eq!(
            can_occupy(&board, worker, LEFT, &WORKER_KINDS),
            Err(MoveRejected::Blocked)
        );
        assert_eq!(
            can_occupy(&board, Position::new(9, 9), DOWN, &WORKER_KINDS),
            Err(MoveRejected::OutOfBounds)
        );
        assert_eq!(
            can_occupy(&board, worker, DOWN, &BOX_KINDS),
            Err(MoveRejected::WrongMoverKind)
        );
        assert_eq!(
            can_occupy(&board, worker, MoveDelta::new(1, 1), &WORKER_KINDS),
            Err(MoveRejected::MalformedDelta)
        );
        assert_eq!(
            can_occupy(&board, worker, MoveDelta::ZERO, &WORKER_KINDS),
            Err(MoveRejected::MalformedDelta)
        );
        assert_eq!(
            can_occupy(&board, worker, MoveDelta::new(2, 0), &WORKER_KINDS),
            Err(MoveRejected::MalformedDelta)
        );
    }

    #[test]
    fn test_can_occupy_huge_delta() {
        let (board, worker) = board_from("#####\n#@  #\n#####");
        for delta in [
            MoveDelta::new(i32::MAX, 1),
            MoveDelta::new(1, i32::MAX),
            MoveDelta::new(i32::MIN, 0),
            MoveDelta::new(0, i32::MIN),
            MoveDelta::new(i32::MIN, i32::MIN),
        ] {
            assert_eq!(
                can_occupy(&board, worker, delta, &WORKER_KINDS),
                Err(MoveRejected::MalformedDelta),
                "{}",
                delta
            );
        }
        assert!(MoveDelta::new(0, -1).is_unit());
        assert!(!MoveDelta::new(-1, 1).is_unit());
    }

    #[test]
    fn test_can_occupy_off_ragged_row() {
        // The worker's row is longer than the row below it.
        let (board, worker) = board_from(" ### \n @  \n #");
        assert_eq!(
            can_occupy(&board, Position::new(1, 3), DOWN, &[Cell::Empty]),
            Err(MoveRejected::Blocked)
        );
        assert_eq!(
            can_occupy(&board, worker, UP, &WORKER_KINDS),
            Err(MoveRejected::Blocked)
        );
        assert_eq!(
            can_occupy(&board, Position::new(1, 3), RIGHT, &[Cell::Empty]),
            Err(MoveRejected::Blocked)
        );
    }

    #[test]
    fn test_step_walks() {
        let (mut board, mut worker) = board_from("#####\n#@ .#\n#####");
        assert_eq!(step_worker(&mut board, &mut worker, RIGHT), Ok(Step::Walked));
        assert_eq!(worker, Position::new(1, 2));
        assert_eq!(board.to_string(), "#####\n# @.#\n#####\n");

        assert_eq!(step_worker(&mut board, &mut worker, RIGHT), Ok(Step::Walked));
        assert_eq!(board.to_string(), "#####\n#  +#\n#####\n");

        assert_eq!(step_worker(&mut board, &mut worker, LEFT), Ok(Step::Walked));
        assert_eq!(board.to_string(), "#####\n# @.#\n#####\n");
    }

    #[test]
    fn test_step_into_wall() {
        let (mut board, mut worker) = board_from("####\n#@ #\n####");
        let before = board.clone();
        assert_eq!(
            step_worker(&mut board, &mut worker, UP),
            Err(MoveRejected::Blocked)
        );
        assert_eq!(board, before);
        assert_eq!(worker, Position::new(1, 1));
    }

    #[test]
    fn test_step_off_board() {
        let (mut board, mut worker) = board_from(" @ ");
        let before = board.clone();
        assert_eq!(
            step_worker(&mut board, &mut worker, UP),
            Err(MoveRejected::Blocked)
        );
        assert_eq!(board, before);
    }

    #[test]
    fn test_step_wrong_position() {
        let (mut board, _) = board_from("#@ #");
        let mut worker = Position::new(0, 2);
        assert_eq!(
            step_worker(&mut board, &mut worker, LEFT),
            Err(MoveRejected::WrongMoverKind)
        );
        assert_eq!(worker, Position::new(0, 2));
    }

    #[test]
    fn test_push_floor_to_goal() {
        let (mut board, mut worker) = board_from("#####\n#@$.#\n#####");
        assert!(!board.is_complete());
        assert_eq!(step_worker(&mut board, &mut worker, RIGHT), Ok(Step::Pushed));
        assert_eq!(worker, Position::new(1, 2));
        assert_eq!(board.to_string(), "#####\n# @*#\n#####\n");
        assert!(board.is_complete());
    }

    #[test]
    fn test_push_goal_to_floor() {
        let (mut board, mut worker) = board_from("######\n#@*  #\n######");
        assert_eq!(step_worker(&mut board, &mut worker, RIGHT), Ok(Step::Pushed));
        assert_eq!(board.to_string(), "######\n# +$ #\n######\n");
        assert!(!board.is_complete());
    }

    #[test]
    fn test_push_goal_to_goal() {
        let (mut board, mut worker) = board_from("######\n#@*.$#\n######");
        assert_eq!(step_worker(&mut board, &mut worker, RIGHT), Ok(Step::Pushed));
        assert_eq!(board.to_string(), "######\n# +*$#\n######\n");
    }

    #[test]
    fn test_push_all_directions() {
        let tests = vec![
            (RIGHT, "#####\n#@$ #\n#####", "#####\n# @$#\n#####\n"),
            (DOWN, "###\n#@#\n#$#\n# #\n###", "###\n# #\n#@#\n#$#\n###\n"),
            (LEFT, "#####\n# $@#\n#####", "#####\n#$@ #\n#####\n"),
            (UP, "###\n# #\n#$#\n#@#\n###", "###\n#$#\n#@#\n# #\n###\n"),
        ];

        for (delta, input, expected) in tests {
            let (mut board, mut worker) = board_from(input);
            assert_eq!(
                step_worker(&mut board, &mut worker, delta),
                Ok(Step::Pushed),
                "Failed for {}",
                delta
            );
            assert_eq!(board.to_string(), expected, "Failed for {}", delta);
        }
    }

    #[test]
    fn test_push_blocked_leaves_board_unchanged() {
        let cases = [
            // Into a wall.
            "#####\n#@$##\n#####",
            // Into another box.
            "######\n#@$$ #\n######",
            // Into a box on a goal.
            "######\n#@$* #\n######",
            // Off the edge of the board.
            "#@$",
        ];

        for input in cases {
            let (mut board, mut worker) = board_from(input);
            let before = board.clone();
            let start = worker;
            let result = step_worker(&mut board, &mut worker, RIGHT);
            assert_eq!(result, Err(MoveRejected::BlockedByImmovableBox), "{}", input);
            assert!(result.unwrap_err().is_blocked());
            assert_eq!(board, before, "{}", input);
            assert_eq!(worker, start, "{}", input);
        }
    }

    #[test]
    fn test_push_box_directly() {
        let (mut board, _) = board_from("######\n#@$$ #\n######");
        let before = board.clone();
        assert_eq!(
            push_box(&mut board, Position::new(1, 2), RIGHT),
            Err(MoveRejected::BoxInTheWay)
        );
        assert_eq!(board, before);
        assert_eq!(
            push_box(&mut board, Position::new(1, 1), RIGHT),
            Err(MoveRejected::WrongMoverKind)
        );
        assert_eq!(
            push_box(&mut board, Position::new(1, 3), RIGHT),
            Ok(Position::new(1, 4))
        );
        assert_eq!(board.to_string(), "######\n#@$ $#\n######\n");
    }

    #[test]
    fn test_step_then_inverse_restores_board() {
        let (mut board, mut worker) = board_from("#####\n#+  #\n#. *#\n#####");
        let start = board.clone();
        for delta in [RIGHT, DOWN] {
            assert_eq!(step_worker(&mut board, &mut worker, delta), Ok(Step::Walked));
            assert_eq!(
                step_worker(&mut board, &mut worker, -delta),
                Ok(Step::Walked)
            );
            assert_eq!(board, start);
            assert_eq!(worker, Position::new(1, 1));
        }
    }

    #[test]
    fn test_multi_step_open_corridor() {
        let (mut board, mut worker) = board_from("########\n#@     #\n########");
        assert_eq!(
            resolve_multi_step(&mut board, &mut worker, MoveDelta::new(0, 5)),
            Ok(Progress::new(5, 0))
        );
        assert_eq!(worker, Position::new(1, 6));
        assert_eq!(
            resolve_multi_step(&mut board, &mut worker, MoveDelta::new(0, -3)),
            Ok(Progress::new(3, 0))
        );
        assert_eq!(worker, Position::new(1, 3));
    }

    #[test]
    fn test_multi_step_blocked_part_way() {
        // Box reaches the wall after two pushes; the third step is blocked.
        let (mut board, mut worker) = board_from("#######\n#@ $  #\n#######");
        let result = resolve_multi_step(&mut board, &mut worker, MoveDelta::new(0, 5));
        assert_eq!(
            result,
            Err(PartialMove {
                progress: Progress::new(3, 2),
                reason: MoveRejected::BlockedByImmovableBox,
            })
        );
        assert_eq!(worker, Position::new(1, 4));
        assert_eq!(board.to_string(), "#######\n#   @$#\n#######\n");
    }

    #[test]
    fn test_multi_step_stops_at_wall() {
        let (mut board, mut worker) = board_from("#####\n#@  #\n#####");
        let result = resolve_multi_step(&mut board, &mut worker, MoveDelta::new(0, 4));
        assert_eq!(
            result,
            Err(PartialMove {
                progress: Progress::new(2, 0),
                reason: MoveRejected::Blocked,
            })
        );
        assert_eq!(worker, Position::new(1, 3));
    }

    #[test]
    fn test_multi_step_zero_and_diagonal() {
        let (mut board, mut worker) = board_from("####\n#@ #\n#  #\n####");
        let before = board.clone();
        assert_eq!(
            resolve_multi_step(&mut board, &mut worker, MoveDelta::ZERO),
            Ok(Progress::default())
        );
        assert_eq!(
            resolve_multi_step(&mut board, &mut worker, MoveDelta::new(1, 1)),
            Err(PartialMove {
                progress: Progress::default(),
                reason: MoveRejected::MalformedDelta,
            })
        );
        assert_eq!(board, before);
    }

    #[test]
    fn test_open_room_left_moves_miss_box() {
        let (mut board, mut worker) = board_from("     \n     \n   $ \n     \n    @");
        assert_eq!(worker, Position::new(4, 4));
        for _ in 0..4 {
            assert_eq!(
                resolve_multi_step(&mut board, &mut worker, LEFT),
                Ok(Progress::new(1, 0))
            );
        }
        assert_eq!(worker, Position::new(4, 0));
        assert_eq!(board.get(Position::new(2, 3)), Some(Cell::Box));
        assert_eq!(board.to_string(), "     \n     \n   $ \n     \n@    \n");
    }

    #[test]
    fn test_random_walk_conserves_pieces() {
        let mut rng = ChaCha8Rng::seed_from_u64(0x5eed_cafe);
        let directions = [UP, DOWN, LEFT, RIGHT];
        let (mut board, mut worker) =
            board_from("########\n#  .   #\n# $$ . #\n#  @ $ #\n# ..   #\n########");

        let boxes = board.count(Cell::is_box);
        let goals = board.count(Cell::is_goal);
        for _ in 0..2000 {
            let delta = directions[rng.gen_range(0..directions.len())];
            let before = board.clone();
            let start = worker;
            match step_worker(&mut board, &mut worker, delta) {
                Ok(_) => assert_eq!(worker, start.offset(delta)),
                Err(_) => {
                    assert_eq!(board, before);
                    assert_eq!(worker, start);
                }
            }
            assert_eq!(board.count(Cell::is_worker), 1);
            assert_eq!(board.find_worker(), Some(worker));
            assert_eq!(board.count(Cell::is_box), boxes);
            assert_eq!(board.count(Cell::is_goal), goals);
        }
    }

    #[test]
    fn test_random_walk_inverse_steps() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let directions = [UP, DOWN, LEFT, RIGHT];
        let (mut board, mut worker) = board_from("#######\n#. .  #\n# @ * #\n#  .  #\n#######");

        for _ in 0..500 {
            let delta = directions[rng.gen_range(0..directions.len())];
            let before = board.clone();
            let start = worker;
            if let Ok(Step::Walked) = step_worker(&mut board, &mut worker, delta) {
                assert_eq!(
                    step_worker(&mut board, &mut worker, -delta),
                    Ok(Step::Walked)
                );
                assert_eq!(board, before);
                assert_eq!(worker, start);
                // Leave the worker on the new cell for the next round.
                step_worker(&mut board, &mut worker, delta).unwrap();
            }
        }
    }
}
