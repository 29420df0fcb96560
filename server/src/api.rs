use serde::{Deserialize, Serialize};
use tictactoe_common::games::tictactoe::{
    AiMove, Board, DEFAULT_BOARD_SIZE, Difficulty, GameSettings, GameStatus, Mark, MoveOutcome,
    Position, StartingPlayer, StatsSnapshot,
};

fn default_size() -> usize {
    DEFAULT_BOARD_SIZE
}

#[derive(Debug, Clone, Deserialize)]
pub struct StartRequest {
    #[serde(default = "default_size")]
    pub size: usize,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub start_player: StartingPlayer,
    #[serde(default)]
    pub win_length: Option<usize>,
}

impl Default for StartRequest {
    fn default() -> Self {
        Self {
            size: DEFAULT_BOARD_SIZE,
            difficulty: Difficulty::default(),
            start_player: StartingPlayer::default(),
            win_length: None,
        }
    }
}

impl StartRequest {
    pub fn settings(&self) -> GameSettings {
        GameSettings {
            size: self.size,
            difficulty: self.difficulty,
            starting_player: self.start_player,
            win_length: self.win_length,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MoveRequest {
    pub row: usize,
    pub col: usize,
}

impl MoveRequest {
    pub fn position(&self) -> Position {
        Position::new(self.row, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatsResponse {
    #[serde(rename = "X")]
    pub human_wins: u32,
    #[serde(rename = "O")]
    pub ai_wins: u32,
    #[serde(rename = "Draw")]
    pub draws: u32,
    #[serde(rename = "Games")]
    pub games: u32,
    #[serde(rename = "Avg AI Time")]
    pub average_ai_time: f64,
}

impl From<StatsSnapshot> for StatsResponse {
    fn from(snapshot: StatsSnapshot) -> Self {
        Self {
            human_wins: snapshot.human_wins,
            ai_wins: snapshot.ai_wins,
            draws: snapshot.draws,
            games: snapshot.games,
            average_ai_time: snapshot.average_ai_time,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StartResponse {
    pub board: Vec<Vec<Mark>>,
    pub initial_ai_move: Option<Position>,
    pub ai_time: Option<f64>,
    pub stats: StatsResponse,
}

impl StartResponse {
    pub fn new(board: &Board, opening: Option<AiMove>, stats: StatsSnapshot) -> Self {
        Self {
            board: board.rows(),
            initial_ai_move: opening.map(|m| m.position),
            ai_time: opening.map(|m| m.seconds),
            stats: stats.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RestartResponse {
    pub status: &'static str,
    pub board: Vec<Vec<Mark>>,
    pub initial_ai_move: Option<Position>,
    pub ai_time: Option<f64>,
}

impl RestartResponse {
    pub fn new(board: &Board, opening: Option<AiMove>) -> Self {
        Self {
            status: "restarted",
            board: board.rows(),
            initial_ai_move: opening.map(|m| m.position),
            ai_time: opening.map(|m| m.seconds),
        }
    }
}

/// Body of every `/move` reply, tagged by `status`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MoveResponse {
    Invalid {
        message: String,
    },
    InProgress {
        ai_move: Position,
        ai_time: f64,
    },
    Win {
        winner: Mark,
        ai_move: Option<Position>,
        ai_time: Option<f64>,
    },
    Draw {
        ai_move: Option<Position>,
        ai_time: Option<f64>,
    },
}

impl MoveResponse {
    pub fn invalid(message: impl Into<String>) -> Self {
        MoveResponse::Invalid {
            message: message.into(),
        }
    }

    pub fn from_outcome(outcome: MoveOutcome) -> Option<Self> {
        let ai_move = outcome.ai_move.map(|m| m.position);
        let ai_time = outcome.ai_move.map(|m| m.seconds);
        match outcome.status {
            GameStatus::Won(winner) => Some(MoveResponse::Win {
                winner,
                ai_move,
                ai_time,
            }),
            GameStatus::Draw => Some(MoveResponse::Draw { ai_move, ai_time }),
            // A game still in progress always carries the reply.
            GameStatus::InProgress => Some(MoveResponse::InProgress {
                ai_move: ai_move?,
                ai_time: ai_time?,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_start_request_defaults() {
        let request: StartRequest = serde_json::from_value(json!({})).unwrap();

        assert_eq!(request.size, 3);
        assert_eq!(request.difficulty, Difficulty::Medium);
        assert_eq!(request.start_player, StartingPlayer::Human);
        assert_eq!(request.settings().win_length(), 3);
    }

    #[test]
    fn test_start_request_accepts_mark_aliases() {
        let body = json!({"size": 4, "difficulty": "hard", "start_player": "O"});
        let request: StartRequest = serde_json::from_value(body).unwrap();

        assert_eq!(request.size, 4);
        assert_eq!(request.difficulty, Difficulty::Hard);
        assert_eq!(request.start_player, StartingPlayer::Ai);
    }

    #[test]
    fn test_stats_keys() {
        let stats = StatsResponse {
            human_wins: 1,
            ai_wins: 2,
            draws: 3,
            games: 6,
            average_ai_time: 0.25,
        };

        assert_eq!(
            serde_json::to_value(stats).unwrap(),
            json!({"X": 1, "O": 2, "Draw": 3, "Games": 6, "Avg AI Time": 0.25})
        );
    }

    #[test]
    fn test_move_response_shapes() {
        let in_progress = MoveResponse::InProgress {
            ai_move: Position::new(1, 2),
            ai_time: 0.004,
        };
        let win = MoveResponse::Win {
            winner: Mark::X,
            ai_move: None,
            ai_time: None,
        };

        assert_eq!(
            serde_json::to_value(in_progress).unwrap(),
            json!({"status": "in_progress", "ai_move": [1, 2], "ai_time": 0.004})
        );
        assert_eq!(
            serde_json::to_value(win).unwrap(),
            json!({"status": "win", "winner": "X", "ai_move": null, "ai_time": null})
        );
        assert_eq!(
            serde_json::to_value(MoveResponse::invalid("Cell occupied")).unwrap(),
            json!({"status": "invalid", "message": "Cell occupied"})
        );
    }

    #[test]
    fn test_start_response_board_uses_empty_strings() {
        let response = StartResponse::new(&Board::new(3), None, StatsSnapshot::default());
        let value = serde_json::to_value(response).unwrap();

        assert_eq!(value["board"][0], json!(["", "", ""]));
        assert_eq!(value["initial_ai_move"], json!(null));
        assert_eq!(value["stats"]["Games"], json!(0));
    }
}
