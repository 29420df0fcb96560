use std::cmp::Reverse;
use std::time::{Duration, Instant};

use crate::games::SessionRng;
use super::board::Board;
use super::error::EngineError;
use super::types::{Difficulty, Mark, Position, round_seconds};
use super::win_detector::{DIRECTIONS, check_win, check_win_at};

pub const WIN_SCORE: i32 = 100_000;
const INFINITY: i32 = i32::MAX / 2;

const MEDIUM_RANDOM_MOVE_CHANCE: f64 = 0.3;
const MEDIUM_LOOKAHEAD: usize = 2;
const EASY_TAKE_WIN_CHANCE: f64 = 0.75;

/// Boards with at most this many empty cells are searched to the end.
const EXHAUSTIVE_EMPTY_CELLS: usize = 9;

pub struct BotInput {
    pub board: Board,
    pub win_length: usize,
    pub bot_mark: Mark,
}

impl BotInput {
    pub fn new(board: Board, win_length: usize, bot_mark: Mark) -> Self {
        Self {
            board,
            win_length,
            bot_mark,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BotDecision {
    pub position: Position,
    pub elapsed: Duration,
}

impl BotDecision {
    /// Think-time in seconds, rounded to milliseconds for display.
    pub fn seconds(&self) -> f64 {
        round_seconds(self.elapsed.as_secs_f64())
    }
}

pub trait MoveStrategy: Send + Sync {
    fn difficulty(&self) -> Difficulty;

    fn select_move(&self, input: &BotInput, rng: &mut SessionRng) -> Result<Position, EngineError>;
}

pub struct EasyBot;
pub struct MediumBot;
pub struct HardBot;

pub fn strategy_for(difficulty: Difficulty) -> &'static dyn MoveStrategy {
    match difficulty {
        Difficulty::Easy => &EasyBot,
        Difficulty::Medium => &MediumBot,
        Difficulty::Hard => &HardBot,
    }
}

/// Picks the bot's move for `difficulty` and measures how long the choice took.
pub fn calculate_move(
    difficulty: Difficulty,
    input: &BotInput,
    rng: &mut SessionRng,
) -> Result<BotDecision, EngineError> {
    let started = Instant::now();
    let position = strategy_for(difficulty).select_move(input, rng)?;
    Ok(BotDecision {
        position,
        elapsed: started.elapsed(),
    })
}

impl MoveStrategy for EasyBot {
    fn difficulty(&self) -> Difficulty {
        Difficulty::Easy
    }

    fn select_move(&self, input: &BotInput, rng: &mut SessionRng) -> Result<Position, EngineError> {
        let moves = playable_moves(input)?;
        let mut board = input.board.clone();

        if let Some(pos) = find_winning_move(&mut board, input.bot_mark, input.win_length, &moves)
            && rng.chance(EASY_TAKE_WIN_CHANCE)
        {
            return Ok(pos);
        }

        rng.choose(&moves).copied().ok_or(EngineError::NoLegalMoves)
    }
}

impl MoveStrategy for MediumBot {
    fn difficulty(&self) -> Difficulty {
        Difficulty::Medium
    }

    fn select_move(&self, input: &BotInput, rng: &mut SessionRng) -> Result<Position, EngineError> {
        let moves = playable_moves(input)?;
        let opponent = opponent_of(input.bot_mark)?;
        let mut board = input.board.clone();

        if let Some(pos) = find_winning_move(&mut board, input.bot_mark, input.win_length, &moves) {
            return Ok(pos);
        }
        if let Some(pos) = find_winning_move(&mut board, opponent, input.win_length, &moves) {
            return Ok(pos);
        }
        if rng.chance(MEDIUM_RANDOM_MOVE_CHANCE) {
            return rng.choose(&moves).copied().ok_or(EngineError::NoLegalMoves);
        }

        let size = input.board.size();
        let mut search = Search::new(input, MEDIUM_LOOKAHEAD)?;
        moves
            .iter()
            .map(|&pos| (search.score_root_move(pos, -INFINITY, INFINITY), pos))
            .max_by_key(|&(score, pos)| (score, Reverse(preference_rank(pos, size)), Reverse(pos)))
            .map(|(_, pos)| pos)
            .ok_or(EngineError::NoLegalMoves)
    }
}

impl MoveStrategy for HardBot {
    fn difficulty(&self) -> Difficulty {
        Difficulty::Hard
    }

    fn select_move(
        &self,
        input: &BotInput,
        _rng: &mut SessionRng,
    ) -> Result<Position, EngineError> {
        let moves = playable_moves(input)?;
        let depth_limit = calculate_depth_limit(input.board.size(), moves.len());
        let exhaustive = depth_limit > moves.len();

        if !exhaustive {
            let opponent = opponent_of(input.bot_mark)?;
            let mut board = input.board.clone();
            let win_length = input.win_length;
            if let Some(pos) = find_winning_move(&mut board, input.bot_mark, win_length, &moves) {
                return Ok(pos);
            }
            if let Some(pos) = find_winning_move(&mut board, opponent, win_length, &moves) {
                return Ok(pos);
            }
        }

        let mut search = Search::new(input, depth_limit)?;
        let mut alpha = -INFINITY;
        let mut best: Option<(i32, Position)> = None;

        // Reading order with a strict comparison keeps the lowest position among equal scores.
        for pos in moves {
            let score = search.score_root_move(pos, alpha, INFINITY);
            if best.is_none_or(|(best_score, _)| score > best_score) {
                best = Some((score, pos));
            }
            alpha = alpha.max(score);
        }

        best.map(|(_, pos)| pos).ok_or(EngineError::NoLegalMoves)
    }
}

fn playable_moves(input: &BotInput) -> Result<Vec<Position>, EngineError> {
    if input.bot_mark == Mark::Empty {
        return Err(EngineError::InvalidState("Bot has no mark".to_string()));
    }
    if check_win(&input.board, input.win_length).is_some() {
        return Err(EngineError::NoLegalMoves);
    }
    let moves = input.board.legal_moves();
    if moves.is_empty() {
        return Err(EngineError::NoLegalMoves);
    }
    Ok(moves)
}

fn opponent_of(mark: Mark) -> Result<Mark, EngineError> {
    mark.opponent()
        .ok_or_else(|| EngineError::InvalidState("Bot has no mark".to_string()))
}

fn find_winning_move(
    board: &mut Board,
    mark: Mark,
    win_length: usize,
    moves: &[Position],
) -> Option<Position> {
    for &pos in moves {
        board.set(pos, mark);
        let winner = check_win_at(board, win_length, pos);
        board.clear(pos);

        if winner == Some(mark) {
            return Some(pos);
        }
    }
    None
}

/// Plies to search. 3x3 boards and nearly full larger boards are searched to the end.
fn calculate_depth_limit(size: usize, moves_count: usize) -> usize {
    if size <= 3 || moves_count <= EXHAUSTIVE_EMPTY_CELLS {
        return moves_count + 1;
    }
    match moves_count {
        10..=12 => 6,
        13..=16 => 5,
        17..=20 => 4,
        _ => 3,
    }
}

/// 0 for the central cell(s), 1 for corners, 2 for everything else.
fn preference_rank(pos: Position, size: usize) -> u8 {
    let last = size.saturating_sub(1);
    let (mid_lo, mid_hi) = (last / 2, size / 2);
    let central = |v: usize| v == mid_lo || v == mid_hi;
    let edge = |v: usize| v == 0 || v == last;

    if central(pos.row) && central(pos.col) {
        0
    } else if edge(pos.row) && edge(pos.col) {
        1
    } else {
        2
    }
}

struct Search {
    board: Board,
    win_length: usize,
    bot_mark: Mark,
    opponent: Mark,
    max_depth: usize,
    empty: usize,
    base_score: i32,
}

impl Search {
    fn new(input: &BotInput, max_depth: usize) -> Result<Self, EngineError> {
        let opponent = opponent_of(input.bot_mark)?;
        Ok(Self {
            board: input.board.clone(),
            win_length: input.win_length,
            bot_mark: input.bot_mark,
            opponent,
            max_depth,
            empty: input.board.empty_count(),
            base_score: evaluate_position(&input.board, input.bot_mark, input.win_length),
        })
    }

    fn score_root_move(&mut self, pos: Position, alpha: i32, beta: i32) -> i32 {
        let delta =
            eval_delta_before_move(&self.board, self.bot_mark, self.win_length, pos, self.bot_mark);
        self.play(pos, self.bot_mark);
        let score = self.minimax(1, false, alpha, beta, pos, self.base_score + delta);
        self.undo(pos);
        score
    }

    fn play(&mut self, pos: Position, mark: Mark) {
        self.board.set(pos, mark);
        self.empty -= 1;
    }

    fn undo(&mut self, pos: Position) {
        self.board.clear(pos);
        self.empty += 1;
    }

    /// Legal moves with their heuristic delta, most promising for `mover` first.
    fn ordered_moves(&self, mover: Mark) -> Vec<(Position, i32)> {
        let mut moves: Vec<(Position, i32)> = self
            .board
            .legal_moves()
            .into_iter()
            .map(|pos| {
                let delta =
                    eval_delta_before_move(&self.board, self.bot_mark, self.win_length, pos, mover);
                (pos, delta)
            })
            .collect();
        if mover == self.bot_mark {
            moves.sort_by_key(|&(_, delta)| Reverse(delta));
        } else {
            moves.sort_by_key(|&(_, delta)| delta);
        }
        moves
    }

    fn minimax(
        &mut self,
        depth: usize,
        is_maximizing: bool,
        mut alpha: i32,
        mut beta: i32,
        last: Position,
        current_score: i32,
    ) -> i32 {
        if let Some(winner) = check_win_at(&self.board, self.win_length, last) {
            return if winner == self.bot_mark {
                WIN_SCORE - depth as i32
            } else {
                -WIN_SCORE + depth as i32
            };
        }

        if self.empty == 0 {
            return 0;
        }

        if depth >= self.max_depth {
            return current_score;
        }

        if is_maximizing {
            let mut max_eval = -INFINITY;
            for (pos, delta) in self.ordered_moves(self.bot_mark) {
                self.play(pos, self.bot_mark);
                let eval = self.minimax(depth + 1, false, alpha, beta, pos, current_score + delta);
                self.undo(pos);

                max_eval = max_eval.max(eval);
                alpha = alpha.max(eval);
                if beta <= alpha {
                    break;
                }
            }
            max_eval
        } else {
            let mut min_eval = INFINITY;
            for (pos, delta) in self.ordered_moves(self.opponent) {
                self.play(pos, self.opponent);
                let eval = self.minimax(depth + 1, true, alpha, beta, pos, current_score + delta);
                self.undo(pos);

                min_eval = min_eval.min(eval);
                beta = beta.min(eval);
                if beta <= alpha {
                    break;
                }
            }
            min_eval
        }
    }
}

fn line_score(bot_count: i32, opp_count: i32) -> i32 {
    if opp_count == 0 {
        bot_count * bot_count
    } else if bot_count == 0 {
        -(opp_count * opp_count)
    } else {
        0
    }
}

/// Change in `evaluate_position` caused by `move_mark` taking the empty cell `pos`.
/// Only the windows containing `pos` change, so the score is kept incrementally.
fn eval_delta_before_move(
    board: &Board,
    bot_mark: Mark,
    win_length: usize,
    pos: Position,
    move_mark: Mark,
) -> i32 {
    let size = board.size() as isize;
    let span = win_length as isize;
    let mut delta = 0i32;

    for (dr, dc) in DIRECTIONS {
        for offset in 0..span {
            let start_r = pos.row as isize - dr * offset;
            let start_c = pos.col as isize - dc * offset;
            let end_r = start_r + dr * (span - 1);
            let end_c = start_c + dc * (span - 1);

            if [start_r, start_c, end_r, end_c].iter().any(|&v| v < 0 || v >= size) {
                continue;
            }

            let mut bot_count = 0;
            let mut opp_count = 0;
            for i in 0..span {
                match board.get((start_r + dr * i) as usize, (start_c + dc * i) as usize) {
                    Mark::Empty => {}
                    m if m == bot_mark => bot_count += 1,
                    _ => opp_count += 1,
                }
            }

            let old_score = line_score(bot_count, opp_count);
            let new_score = if move_mark == bot_mark {
                line_score(bot_count + 1, opp_count)
            } else {
                line_score(bot_count, opp_count + 1)
            };
            delta += new_score - old_score;
        }
    }

    delta
}

/// Sum of squared counts over every open window of `win_length` cells, positive for the bot.
fn evaluate_position(board: &Board, bot_mark: Mark, win_length: usize) -> i32 {
    let size = board.size() as isize;
    let span = win_length as isize;
    let mut score = 0;

    for row in 0..size {
        for col in 0..size {
            for (dr, dc) in DIRECTIONS {
                let end_r = row + dr * (span - 1);
                let end_c = col + dc * (span - 1);
                if end_r < 0 || end_c < 0 || end_r >= size || end_c >= size {
                    continue;
                }

                let mut bot_count = 0;
                let mut opp_count = 0;
                for i in 0..span {
                    match board.get((row + dr * i) as usize, (col + dc * i) as usize) {
                        Mark::Empty => {}
                        m if m == bot_mark => bot_count += 1,
                        _ => opp_count += 1,
                    }
                }
                score += line_score(bot_count, opp_count);
            }
        }
    }

    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::tictactoe::win_detector::evaluate;
    use crate::games::tictactoe::types::GameStatus;

    fn board_from(rows: &[&str]) -> Board {
        let rows: Vec<Vec<Mark>> = rows
            .iter()
            .map(|row| {
                row.chars()
                    .map(|c| match c {
                        'X' => Mark::X,
                        'O' => Mark::O,
                        _ => Mark::Empty,
                    })
                    .collect()
            })
            .collect();
        Board::from_rows(&rows).unwrap()
    }

    fn input(board: Board) -> BotInput {
        let win_length = board.size();
        BotInput::new(board, win_length, Mark::O)
    }

    fn select(difficulty: Difficulty, board: Board, seed: u64) -> Position {
        let mut rng = SessionRng::new(seed);
        calculate_move(difficulty, &input(board), &mut rng).unwrap().position
    }

    /// Plays one game of `difficulty` (O) against a uniformly random X and returns the result.
    fn play_against_random(
        difficulty: Difficulty,
        bot_starts: bool,
        rng: &mut SessionRng,
    ) -> GameStatus {
        let mut board = Board::new(3);
        let mut to_move = if bot_starts { Mark::O } else { Mark::X };
        loop {
            let pos = if to_move == Mark::O {
                calculate_move(difficulty, &BotInput::new(board.clone(), 3, Mark::O), rng)
                    .unwrap()
                    .position
            } else {
                *rng.choose(&board.legal_moves()).unwrap()
            };
            board.place(pos, to_move).unwrap();
            let status = evaluate(&board, 3, pos);
            if status.is_terminal() {
                return status;
            }
            to_move = to_move.opponent().unwrap();
        }
    }

    fn win_rate(difficulty: Difficulty, games: usize, seed: u64) -> f64 {
        let mut rng = SessionRng::new(seed);
        let wins = (0..games)
            .map(|game| play_against_random(difficulty, game % 2 == 1, &mut rng))
            .filter(|&status| status == GameStatus::Won(Mark::O))
            .count();
        wins as f64 / games as f64
    }

    /// Plays one 3x3 game between two tiers and returns the result.
    fn play_match(
        x: Difficulty,
        o: Difficulty,
        x_starts: bool,
        rng: &mut SessionRng,
    ) -> GameStatus {
        let mut board = Board::new(3);
        let mut to_move = if x_starts { Mark::X } else { Mark::O };
        loop {
            let difficulty = if to_move == Mark::X { x } else { o };
            let input = BotInput::new(board.clone(), 3, to_move);
            let pos = calculate_move(difficulty, &input, rng).unwrap().position;
            board.place(pos, to_move).unwrap();
            let status = evaluate(&board, 3, pos);
            if status.is_terminal() {
                return status;
            }
            to_move = to_move.opponent().unwrap();
        }
    }

    /// Every X line of play against the hard bot; returns true if X can ever win.
    fn x_can_win(board: &mut Board) -> bool {
        for pos in board.legal_moves() {
            board.place(pos, Mark::X).unwrap();
            let outcome = match evaluate(board, 3, pos) {
                GameStatus::Won(_) => true,
                GameStatus::Draw => false,
                GameStatus::InProgress => {
                    let reply = select(Difficulty::Hard, board.clone(), 0);
                    board.place(reply, Mark::O).unwrap();
                    let result = match evaluate(board, 3, reply) {
                        GameStatus::InProgress => x_can_win(board),
                        _ => false,
                    };
                    board.clear(reply);
                    result
                }
            };
            board.clear(pos);
            if outcome {
                return true;
            }
        }
        false
    }

    #[test]
    fn test_hard_opens_with_lowest_position_on_empty_board() {
        assert_eq!(select(Difficulty::Hard, Board::new(3), 1), Position::new(0, 0));
    }

    #[test]
    fn test_hard_takes_immediate_win() {
        let board = board_from(&["OO.", "XX.", "X.."]);

        assert_eq!(select(Difficulty::Hard, board, 1), Position::new(0, 2));
    }

    #[test]
    fn test_hard_blocks_immediate_loss() {
        let board = board_from(&["XX.", "...", "O.."]);

        assert_eq!(select(Difficulty::Hard, board, 1), Position::new(0, 2));
    }

    #[test]
    fn test_hard_never_loses_as_second_player() {
        let mut board = Board::new(3);

        assert!(!x_can_win(&mut board));
    }

    #[test]
    fn test_hard_is_deterministic() {
        let board = board_from(&["X..", ".O.", "..X"]);

        let first = select(Difficulty::Hard, board.clone(), 1);
        let second = select(Difficulty::Hard, board, 999);

        assert_eq!(first, second);
    }

    #[test]
    fn test_hard_blocks_on_larger_boards() {
        let board = board_from(&["XXX.", "O...", ".O..", "...."]);

        assert_eq!(select(Difficulty::Hard, board, 1), Position::new(0, 3));
    }

    #[test]
    fn test_hard_finds_move_on_empty_five_by_five() {
        let board = Board::new(5);

        let mut rng = SessionRng::new(1);
        let decision = calculate_move(Difficulty::Hard, &input(board.clone()), &mut rng).unwrap();

        assert!(board.is_empty_cell(decision.position));
        assert!(decision.seconds() >= 0.0);
    }

    #[test]
    fn test_medium_blocks_and_wins() {
        let threat = board_from(&["X..", ".X.", "O.."]);
        let chance = board_from(&["OO.", "XX.", "X.."]);

        for seed in 0..20 {
            assert_eq!(select(Difficulty::Medium, threat.clone(), seed), Position::new(2, 2));
            assert_eq!(select(Difficulty::Medium, chance.clone(), seed), Position::new(0, 2));
        }
    }

    #[test]
    fn test_medium_prefers_center_when_searching() {
        let picks: Vec<Position> = (0..30)
            .map(|seed| select(Difficulty::Medium, Board::new(3), seed))
            .collect();

        assert!(picks.contains(&Position::new(1, 1)));
    }

    #[test]
    fn test_easy_only_plays_legal_moves() {
        let board = board_from(&["XO.", "OX.", "..."]);
        let legal = board.legal_moves();

        for seed in 0..50 {
            let pos = select(Difficulty::Easy, board.clone(), seed);
            assert!(legal.contains(&pos));
        }
    }

    #[test]
    fn test_easy_usually_takes_available_win() {
        let board = board_from(&["OO.", "XX.", "X.."]);

        let wins = (0..100)
            .filter(|&seed| select(Difficulty::Easy, board.clone(), seed) == Position::new(0, 2))
            .count();

        assert!(wins > 50);
    }

    #[test]
    fn test_full_board_has_no_legal_moves() {
        let board = board_from(&["XOX", "XOO", "OXX"]);

        for difficulty in Difficulty::ALL {
            let result = calculate_move(difficulty, &input(board.clone()), &mut SessionRng::new(1));
            assert_eq!(result, Err(EngineError::NoLegalMoves));
        }
    }

    #[test]
    fn test_terminal_board_is_rejected() {
        let board = board_from(&["XXX", "OO.", "..."]);

        for difficulty in Difficulty::ALL {
            let result = calculate_move(difficulty, &input(board.clone()), &mut SessionRng::new(1));
            assert_eq!(result, Err(EngineError::NoLegalMoves));
        }
    }

    #[test]
    fn test_strategies_report_their_tier() {
        for difficulty in Difficulty::ALL {
            assert_eq!(strategy_for(difficulty).difficulty(), difficulty);
        }
    }

    #[test]
    fn test_difficulty_ordering_against_random_play() {
        let hard = win_rate(Difficulty::Hard, 200, 11);
        let medium = win_rate(Difficulty::Medium, 200, 11);
        let easy = win_rate(Difficulty::Easy, 200, 11);

        assert!(hard > 0.5, "hard win rate {}", hard);
        assert!(hard >= medium, "hard {} < medium {}", hard, medium);
        assert!(medium >= easy, "medium {} < easy {}", medium, easy);
    }

    #[test]
    fn test_medium_loses_to_hard_sometimes() {
        let mut rng = SessionRng::new(3);
        let results: Vec<GameStatus> = (0..200)
            .map(|game| play_match(Difficulty::Hard, Difficulty::Medium, game % 2 == 0, &mut rng))
            .collect();

        let medium_losses = results.iter().filter(|&&s| s == GameStatus::Won(Mark::X)).count();
        assert!(medium_losses > 0);
        assert!(!results.contains(&GameStatus::Won(Mark::O)));
    }

    #[test]
    fn test_incremental_delta_matches_full_evaluation() {
        let mut board = board_from(&["X...", ".O..", "..X.", "...."]);
        let before = evaluate_position(&board, Mark::O, 4);
        let pos = Position::new(3, 3);

        let delta = eval_delta_before_move(&board, Mark::O, 4, pos, Mark::X);
        board.place(pos, Mark::X).unwrap();

        assert_eq!(before + delta, evaluate_position(&board, Mark::O, 4));
    }

    #[test]
    fn test_depth_limit_is_exhaustive_for_small_boards() {
        assert_eq!(calculate_depth_limit(3, 9), 10);
        assert_eq!(calculate_depth_limit(4, 8), 9);
        assert_eq!(calculate_depth_limit(4, 16), 5);
        assert_eq!(calculate_depth_limit(5, 25), 3);
    }

    #[test]
    fn test_preference_rank() {
        assert_eq!(preference_rank(Position::new(1, 1), 3), 0);
        assert_eq!(preference_rank(Position::new(2, 0), 3), 1);
        assert_eq!(preference_rank(Position::new(0, 1), 3), 2);
        assert_eq!(preference_rank(Position::new(2, 1), 4), 0);
    }
}
