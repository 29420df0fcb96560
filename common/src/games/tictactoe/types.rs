use serde::{Deserialize, Serialize, Serializer};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mark {
    Empty,
    X,
    O,
}

impl Mark {
    pub const HUMAN: Mark = Mark::X;
    pub const AI: Mark = Mark::O;

    pub fn opponent(&self) -> Option<Mark> {
        match self {
            Mark::X => Some(Mark::O),
            Mark::O => Some(Mark::X),
            Mark::Empty => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mark::Empty => "",
            Mark::X => "X",
            Mark::O => "O",
        }
    }
}

impl std::fmt::Display for Mark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mark::Empty => write!(f, "."),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

// Cells travel as "", "X" and "O" so the browser client can render them directly.
impl Serialize for Mark {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A cell coordinate, 0-indexed. Ordering is reading order: row first, then column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    pub fn to_index(&self, size: usize) -> usize {
        self.row * size + self.col
    }

    pub fn from_index(index: usize, size: usize) -> Self {
        Self {
            row: index / size,
            col: index % size,
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl Serialize for Position {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [self.row, self.col].serialize(serializer)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartingPlayer {
    #[default]
    #[serde(alias = "X")]
    Human,
    #[serde(alias = "O")]
    Ai,
}

impl StartingPlayer {
    pub fn mark(&self) -> Mark {
        match self {
            StartingPlayer::Human => Mark::HUMAN,
            StartingPlayer::Ai => Mark::AI,
        }
    }
}

/// Result of evaluating a board after a move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    InProgress,
    Won(Mark),
    Draw,
}

impl GameStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GamePhase {
    InProgress,
    Won(Mark),
    Drawn,
}

impl GamePhase {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GamePhase::InProgress)
    }

    pub fn winner(&self) -> Option<Mark> {
        match self {
            GamePhase::Won(mark) => Some(*mark),
            _ => None,
        }
    }
}

impl From<GameStatus> for GamePhase {
    fn from(status: GameStatus) -> Self {
        match status {
            GameStatus::InProgress => GamePhase::InProgress,
            GameStatus::Won(mark) => GamePhase::Won(mark),
            GameStatus::Draw => GamePhase::Drawn,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MoveRecord {
    pub mark: Mark,
    pub position: Position,
    /// Think-time in seconds, present for AI moves only.
    pub elapsed: Option<f64>,
}

/// The AI's reply inside a move or start response.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AiMove {
    pub position: Position,
    pub seconds: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MoveOutcome {
    pub status: GameStatus,
    pub ai_move: Option<AiMove>,
}

pub fn round_seconds(seconds: f64) -> f64 {
    (seconds * 1000.0).round() / 1000.0
}
