use crate::games::SessionRng;
use super::board::Board;
use super::bot_controller::{BotDecision, BotInput, calculate_move};
use super::error::EngineError;
use super::settings::{GameSettings, MAX_BOARD_SIZE, MIN_BOARD_SIZE};
use super::stats::{GameResult, SharedStats};
use super::types::{
    AiMove, GamePhase, GameStatus, Mark, MoveOutcome, MoveRecord, Position, StartingPlayer,
};
use super::win_detector::evaluate;

/// One match between the human (X) and the bot (O).
#[derive(Debug, Clone)]
pub struct GameSession {
    board: Board,
    settings: GameSettings,
    current_mark: Mark,
    phase: GamePhase,
    move_log: Vec<MoveRecord>,
    rng: SessionRng,
}

impl GameSession {
    /// Creates a fresh match. When the bot opens, its first move is part of the result.
    pub fn start(
        settings: GameSettings,
        rng: SessionRng,
        stats: &SharedStats,
    ) -> Result<(Self, Option<AiMove>), EngineError> {
        settings.validate(MIN_BOARD_SIZE, MAX_BOARD_SIZE)?;

        let mut session = Self {
            board: Board::new(settings.size),
            settings,
            current_mark: settings.starting_player.mark(),
            phase: GamePhase::InProgress,
            move_log: Vec::new(),
            rng,
        };
        let initial_ai_move = session.open_if_bot_starts(stats)?;
        Ok((session, initial_ai_move))
    }

    /// Empties the board but keeps size, difficulty and starting player. Stats are untouched.
    pub fn restart(&mut self, stats: &SharedStats) -> Result<Option<AiMove>, EngineError> {
        self.board = Board::new(self.settings.size);
        self.current_mark = self.settings.starting_player.mark();
        self.phase = GamePhase::InProgress;
        self.move_log.clear();
        self.open_if_bot_starts(stats)
    }

    /// Applies the human move and, if the game goes on, the bot's reply.
    /// A rejected move leaves the session exactly as it was.
    pub fn apply_move(
        &mut self,
        pos: Position,
        stats: &SharedStats,
    ) -> Result<MoveOutcome, EngineError> {
        if self.phase.is_terminal() {
            return Err(EngineError::InvalidState("Game is already over".to_string()));
        }
        if self.current_mark != Mark::HUMAN {
            return Err(EngineError::InvalidState("Not your turn".to_string()));
        }

        self.board.place(pos, Mark::HUMAN)?;

        let status = evaluate(&self.board, self.settings.win_length(), pos);
        if status.is_terminal() {
            self.record_move(Mark::HUMAN, pos, None);
            self.finish(status, stats);
            return Ok(MoveOutcome { status, ai_move: None });
        }

        let reply = self
            .choose_bot_move()
            .and_then(|decision| self.place_bot_move(decision));
        let ai_move = match reply {
            Ok(ai_move) => ai_move,
            Err(e) => {
                self.board.clear(pos);
                return Err(e);
            }
        };
        self.record_move(Mark::HUMAN, pos, None);
        self.record_bot_move(ai_move, stats);

        let status = evaluate(&self.board, self.settings.win_length(), ai_move.position);
        if status.is_terminal() {
            self.finish(status, stats);
        } else {
            self.current_mark = Mark::HUMAN;
        }

        Ok(MoveOutcome {
            status,
            ai_move: Some(ai_move),
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn current_mark(&self) -> Mark {
        self.current_mark
    }

    pub fn move_log(&self) -> &[MoveRecord] {
        &self.move_log
    }

    fn open_if_bot_starts(&mut self, stats: &SharedStats) -> Result<Option<AiMove>, EngineError> {
        if self.settings.starting_player != StartingPlayer::Ai {
            return Ok(None);
        }
        let decision = self.choose_bot_move()?;
        let ai_move = self.place_bot_move(decision)?;
        self.record_bot_move(ai_move, stats);
        self.current_mark = Mark::HUMAN;
        Ok(Some(ai_move))
    }

    fn choose_bot_move(&mut self) -> Result<BotDecision, EngineError> {
        let input = BotInput::new(self.board.clone(), self.settings.win_length(), Mark::AI);
        calculate_move(self.settings.difficulty, &input, &mut self.rng)
    }

    /// Puts the bot's mark on the board. On error the board is left as it was.
    fn place_bot_move(&mut self, decision: BotDecision) -> Result<AiMove, EngineError> {
        self.board.place(decision.position, Mark::AI).map_err(|e| {
            EngineError::InvariantViolation(format!("Bot chose an illegal move: {}", e))
        })?;

        if let Err(e) = self.board.check_balance(self.settings.starting_player.mark()) {
            self.board.clear(decision.position);
            return Err(e);
        }

        Ok(AiMove {
            position: decision.position,
            seconds: decision.seconds(),
        })
    }

    fn record_bot_move(&mut self, ai_move: AiMove, stats: &SharedStats) {
        stats.record_ai_latency(ai_move.seconds);
        self.record_move(Mark::AI, ai_move.position, Some(ai_move.seconds));
    }

    fn record_move(&mut self, mark: Mark, position: Position, elapsed: Option<f64>) {
        self.move_log.push(MoveRecord {
            mark,
            position,
            elapsed,
        });
    }

    fn finish(&mut self, status: GameStatus, stats: &SharedStats) {
        self.phase = GamePhase::from(status);
        stats.record_outcome(GameResult::from_winner(self.phase.winner()));
    }
}
