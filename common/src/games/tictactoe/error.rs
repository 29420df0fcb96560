#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    OutOfRange { row: usize, col: usize, size: usize },
    CellOccupied { row: usize, col: usize },
    InvalidState(String),
    NoLegalMoves,
    NoActiveSession,
    InvalidSettings(String),
    InvariantViolation(String),
}

impl EngineError {
    /// Defects in the engine itself rather than bad input from the caller.
    pub fn is_internal(&self) -> bool {
        matches!(self, EngineError::NoLegalMoves | EngineError::InvariantViolation(_))
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::OutOfRange { row, col, size } => {
                write!(f, "Position ({}, {}) is outside the {}x{} board", row, col, size, size)
            }
            EngineError::CellOccupied { row, col } => {
                write!(f, "Cell ({}, {}) is already marked", row, col)
            }
            EngineError::InvalidState(reason) => write!(f, "Invalid state: {}", reason),
            EngineError::NoLegalMoves => write!(f, "No legal moves left on the board"),
            EngineError::NoActiveSession => write!(f, "No game in session"),
            EngineError::InvalidSettings(reason) => write!(f, "Invalid settings: {}", reason),
            EngineError::InvariantViolation(reason) => {
                write!(f, "Board invariant violated: {}", reason)
            }
        }
    }
}

impl std::error::Error for EngineError {}
