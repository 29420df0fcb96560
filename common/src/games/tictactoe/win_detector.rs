use super::board::Board;
use super::types::{GameStatus, Mark, Position};

pub(crate) const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// Checks only the lines passing through `pos`, so the cost grows with
/// `win_length` rather than with the board area.
pub fn check_win_at(board: &Board, win_length: usize, pos: Position) -> Option<Mark> {
    let size = board.size();
    if pos.row >= size || pos.col >= size {
        return None;
    }
    let mark = board.get(pos.row, pos.col);
    if mark == Mark::Empty {
        return None;
    }

    for (dr, dc) in DIRECTIONS {
        let count = 1
            + count_direction(board, pos, dr, dc, mark, win_length)
            + count_direction(board, pos, -dr, -dc, mark, win_length);
        if count >= win_length {
            return Some(mark);
        }
    }

    None
}

fn count_direction(
    board: &Board,
    pos: Position,
    dr: isize,
    dc: isize,
    mark: Mark,
    win_length: usize,
) -> usize {
    let size = board.size() as isize;
    let mut count = 0;
    for i in 1..win_length as isize {
        let r = pos.row as isize + dr * i;
        let c = pos.col as isize + dc * i;
        if r < 0 || c < 0 || r >= size || c >= size {
            break;
        }
        if board.get(r as usize, c as usize) != mark {
            break;
        }
        count += 1;
    }
    count
}

/// Terminal status after the move at `last_move`.
pub fn evaluate(board: &Board, win_length: usize, last_move: Position) -> GameStatus {
    if let Some(winner) = check_win_at(board, win_length, last_move) {
        return GameStatus::Won(winner);
    }
    if board.is_full() {
        GameStatus::Draw
    } else {
        GameStatus::InProgress
    }
}

/// Whole-board scan for boards that were not built move by move.
pub fn check_win(board: &Board, win_length: usize) -> Option<Mark> {
    let size = board.size();
    for row in 0..size {
        for col in 0..size {
            let mark = board.get(row, col);
            if mark == Mark::Empty {
                continue;
            }
            for (dr, dc) in DIRECTIONS {
                if line_from(board, row, col, dr, dc, mark, win_length) {
                    return Some(mark);
                }
            }
        }
    }
    None
}

pub fn evaluate_board(board: &Board, win_length: usize) -> GameStatus {
    match check_win(board, win_length) {
        Some(winner) => GameStatus::Won(winner),
        None if board.is_full() => GameStatus::Draw,
        None => GameStatus::InProgress,
    }
}

fn line_from(
    board: &Board,
    row: usize,
    col: usize,
    dr: isize,
    dc: isize,
    mark: Mark,
    win_length: usize,
) -> bool {
    let size = board.size() as isize;
    let last = win_length as isize - 1;
    let end_r = row as isize + dr * last;
    let end_c = col as isize + dc * last;
    if end_r < 0 || end_c < 0 || end_r >= size || end_c >= size {
        return false;
    }
    (0..win_length as isize).all(|i| {
        board.get((row as isize + dr * i) as usize, (col as isize + dc * i) as usize) == mark
    })
}
