mod board;
mod bot_controller;
mod error;
mod session;
mod settings;
mod stats;
mod types;
mod win_detector;

pub use board::Board;
pub use bot_controller::{
    BotDecision, BotInput, EasyBot, HardBot, MediumBot, MoveStrategy, WIN_SCORE, calculate_move,
    strategy_for,
};
pub use error::EngineError;
pub use session::GameSession;
pub use settings::{DEFAULT_BOARD_SIZE, GameSettings, MAX_BOARD_SIZE, MIN_BOARD_SIZE};
pub use stats::{GameResult, SharedStats, StatsAggregate, StatsSnapshot};
pub use types::{
    AiMove, Difficulty, GamePhase, GameStatus, Mark, MoveOutcome, MoveRecord, Position,
    StartingPlayer, round_seconds,
};
pub use win_detector::{check_win, check_win_at, evaluate, evaluate_board};
