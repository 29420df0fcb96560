use serde::{Deserialize, Serialize};

use super::error::EngineError;
use super::types::{Difficulty, StartingPlayer};

pub const DEFAULT_BOARD_SIZE: usize = 3;
pub const MIN_BOARD_SIZE: usize = 3;
pub const MAX_BOARD_SIZE: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSettings {
    pub size: usize,
    pub difficulty: Difficulty,
    pub starting_player: StartingPlayer,
    /// Marks in a row needed to win. `None` means a full row, column or diagonal.
    pub win_length: Option<usize>,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            size: DEFAULT_BOARD_SIZE,
            difficulty: Difficulty::default(),
            starting_player: StartingPlayer::default(),
            win_length: None,
        }
    }
}

impl GameSettings {
    pub fn new(size: usize, difficulty: Difficulty, starting_player: StartingPlayer) -> Self {
        Self {
            size,
            difficulty,
            starting_player,
            win_length: None,
        }
    }

    pub fn with_win_length(mut self, win_length: usize) -> Self {
        self.win_length = Some(win_length);
        self
    }

    pub fn win_length(&self) -> usize {
        self.win_length.unwrap_or(self.size)
    }

    pub fn validate(&self, min_size: usize, max_size: usize) -> Result<(), EngineError> {
        if self.size < min_size || self.size > max_size {
            return Err(EngineError::InvalidSettings(format!(
                "Board size must be between {} and {}, got {}",
                min_size, max_size, self.size
            )));
        }
        let win_length = self.win_length();
        if win_length < 3 {
            return Err(EngineError::InvalidSettings("Win length must be at least 3".to_string()));
        }
        if win_length > self.size {
            return Err(EngineError::InvalidSettings(format!(
                "Win length ({}) cannot exceed board size ({})",
                win_length, self.size
            )));
        }
        Ok(())
    }
}
