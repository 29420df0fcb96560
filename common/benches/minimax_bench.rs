use criterion::{criterion_group, criterion_main, Criterion, SamplingMode};
use std::hint::black_box;
use std::time::Duration;
use tictactoe_common::games::SessionRng;
use tictactoe_common::games::tictactoe::{
    calculate_move, Board, BotInput, Difficulty, Mark, Position,
};

fn single_move(difficulty: Difficulty, board: &Board) {
    let input = BotInput::new(board.clone(), board.size(), Mark::O);
    let mut session_rng = SessionRng::new(7);
    let _ = black_box(calculate_move(difficulty, &input, &mut session_rng));
}

fn bench_full_game(size: usize) {
    let mut board = Board::new(size);
    let mut current_mark = Mark::X;
    let mut session_rng = SessionRng::new(7);

    while !board.is_full() {
        let input = BotInput::new(board.clone(), size, current_mark);
        let Ok(decision) = calculate_move(Difficulty::Hard, &input, &mut session_rng) else {
            break;
        };
        if board.place(decision.position, current_mark).is_err() {
            break;
        }
        let Some(next) = current_mark.opponent() else {
            break;
        };
        current_mark = next;
    }
}

fn mid_game_board(size: usize) -> Board {
    let mut board = Board::new(size);
    let moves = [
        (1, 1, Mark::X), (0, 0, Mark::O), (2, 1, Mark::X), (0, 1, Mark::O),
        (1, 2, Mark::X), (3, 3, Mark::O),
    ];
    for (row, col, mark) in moves {
        let _ = board.place(Position::new(row, col), mark);
    }
    board
}

fn minimax_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("minimax");

    group
        .sampling_mode(SamplingMode::Flat)
        .sample_size(10)
        .measurement_time(Duration::from_secs(30));

    for size in [3, 4, 5] {
        let empty = Board::new(size);
        group.bench_function(format!("hard_single_move_empty_{}x{}", size, size), |b| {
            b.iter(|| single_move(Difficulty::Hard, &empty))
        });
    }

    let mid_game = mid_game_board(4);
    group.bench_function("hard_single_move_mid_game_4x4", |b| {
        b.iter(|| single_move(Difficulty::Hard, &mid_game))
    });

    group.bench_function("medium_single_move_empty_5x5", |b| {
        let empty = Board::new(5);
        b.iter(|| single_move(Difficulty::Medium, &empty))
    });

    group.bench_function("hard_full_game_3x3", |b| b.iter(|| bench_full_game(3)));

    group.finish();
}

criterion_group!(benches, minimax_bench);
criterion_main!(benches);
