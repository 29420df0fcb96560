use super::error::EngineError;
use super::types::{Mark, Position};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: Vec<Mark>,
    size: usize,
}

impl Board {
    pub fn new(size: usize) -> Self {
        Self {
            cells: vec![Mark::Empty; size * size],
            size,
        }
    }

    /// Builds a board from rows of marks. Rows must form a square.
    pub fn from_rows(rows: &[Vec<Mark>]) -> Result<Self, EngineError> {
        let size = rows.len();
        if rows.iter().any(|row| row.len() != size) {
            return Err(EngineError::InvalidSettings("Board rows must form a square".to_string()));
        }
        Ok(Self {
            cells: rows.iter().flatten().copied().collect(),
            size,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn cells(&self) -> &[Mark] {
        &self.cells
    }

    pub fn rows(&self) -> Vec<Vec<Mark>> {
        self.cells.chunks(self.size.max(1)).map(|row| row.to_vec()).collect()
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.row < self.size && pos.col < self.size
    }

    pub fn cell_at(&self, pos: Position) -> Result<Mark, EngineError> {
        if !self.contains(pos) {
            return Err(self.out_of_range(pos));
        }
        Ok(self.cells[pos.to_index(self.size)])
    }

    pub fn place(&mut self, pos: Position, mark: Mark) -> Result<(), EngineError> {
        if !self.contains(pos) {
            return Err(self.out_of_range(pos));
        }
        let index = pos.to_index(self.size);
        if self.cells[index] != Mark::Empty {
            return Err(EngineError::CellOccupied {
                row: pos.row,
                col: pos.col,
            });
        }
        self.cells[index] = mark;
        Ok(())
    }

    /// Unchecked access for the search, which only probes positions it took from `legal_moves`.
    pub(crate) fn get(&self, row: usize, col: usize) -> Mark {
        self.cells[row * self.size + col]
    }

    pub(crate) fn set(&mut self, pos: Position, mark: Mark) {
        let index = pos.to_index(self.size);
        self.cells[index] = mark;
    }

    pub(crate) fn clear(&mut self, pos: Position) {
        self.set(pos, Mark::Empty);
    }

    pub fn is_empty_cell(&self, pos: Position) -> bool {
        self.contains(pos) && self.cells[pos.to_index(self.size)] == Mark::Empty
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|&cell| cell != Mark::Empty)
    }

    pub fn legal_moves(&self) -> Vec<Position> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| **cell == Mark::Empty)
            .map(|(index, _)| Position::from_index(index, self.size))
            .collect()
    }

    pub fn empty_count(&self) -> usize {
        self.count(Mark::Empty)
    }

    pub fn count(&self, mark: Mark) -> usize {
        self.cells.iter().filter(|&&cell| cell == mark).count()
    }

    /// Checks the move-count balance given which mark opened the game.
    pub fn check_balance(&self, first: Mark) -> Result<(), EngineError> {
        let Some(second) = first.opponent() else {
            return Err(EngineError::InvariantViolation("Empty cannot move first".to_string()));
        };
        let first_count = self.count(first);
        let second_count = self.count(second);
        if first_count == second_count || first_count == second_count + 1 {
            Ok(())
        } else {
            Err(EngineError::InvariantViolation(format!(
                "{} has {} marks but {} has {}",
                first, first_count, second, second_count
            )))
        }
    }

    fn out_of_range(&self, pos: Position) -> EngineError {
        EngineError::OutOfRange {
            row: pos.row,
            col: pos.col,
            size: self.size,
        }
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.cells.chunks(self.size.max(1)) {
            for cell in row {
                write!(f, "{}", cell)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
