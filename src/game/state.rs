use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::action::Direction;
use crate::error::{Error, Result};

/// A position on the game grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Move position one cell in a direction
    ///
    /// Returns `None` when the move would leave the non-negative quadrant.
    /// The upper bound is the grid's business.
    pub fn moved_in_direction(&self, direction: Direction) -> Option<Self> {
        let (dr, dc) = direction.delta();
        Some(Self {
            row: self.row.checked_add_signed(dr)?,
            col: self.col.checked_add_signed(dc)?,
        })
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Kind of a single grid cell
///
/// The obstacle variants only differ in how they are drawn; all of them
/// block the taxi.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    Empty,
    ObstacleTop,
    ObstacleBottom,
    ObstacleLeft,
    ObstacleRight,
    ObstacleHorizontal,
    ObstacleVertical,
}

impl CellKind {
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '.' => Some(CellKind::Empty),
            'T' => Some(CellKind::ObstacleTop),
            'B' => Some(CellKind::ObstacleBottom),
            'L' => Some(CellKind::ObstacleLeft),
            'R' => Some(CellKind::ObstacleRight),
            'H' => Some(CellKind::ObstacleHorizontal),
            'V' => Some(CellKind::ObstacleVertical),
            _ => None,
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            CellKind::Empty => '.',
            CellKind::ObstacleTop => 'T',
            CellKind::ObstacleBottom => 'B',
            CellKind::ObstacleLeft => 'L',
            CellKind::ObstacleRight => 'R',
            CellKind::ObstacleHorizontal => 'H',
            CellKind::ObstacleVertical => 'V',
        }
    }

    pub fn is_obstacle(&self) -> bool {
        !matches!(self, CellKind::Empty)
    }
}

/// Static map of the game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<CellKind>,
}

impl Grid {
    /// Parse a map from rows of cell symbols
    pub fn from_rows<S: AsRef<str>>(layout: &[S]) -> Result<Self> {
        let rows = layout.len();
        if rows == 0 {
            return Err(Error::InvalidGrid {
                message: "layout has no rows".to_string(),
            });
        }

        let cols = layout[0].as_ref().chars().count();
        if cols == 0 {
            return Err(Error::InvalidGrid {
                message: "layout has no columns".to_string(),
            });
        }

        let mut cells = Vec::with_capacity(rows * cols);
        for (row, line) in layout.iter().enumerate() {
            let line = line.as_ref();
            let width = line.chars().count();
            if width != cols {
                return Err(Error::InvalidGrid {
                    message: format!("row {} has {} cells, expected {}", row, width, cols),
                });
            }
            for (col, symbol) in line.chars().enumerate() {
                let kind = CellKind::from_symbol(symbol)
                    .ok_or(Error::UnknownCellSymbol { symbol, row, col })?;
                cells.push(kind);
            }
        }

        Ok(Self { rows, cols, cells })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Check if a position is within the grid bounds
    pub fn is_in_bounds(&self, pos: Position) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    /// Kind of the cell at `pos`, or `None` when off-grid
    pub fn cell(&self, pos: Position) -> Option<CellKind> {
        if self.is_in_bounds(pos) {
            Some(self.cells[pos.row * self.cols + pos.col])
        } else {
            None
        }
    }

    /// True if the taxi may stand on `pos`
    pub fn is_passable(&self, pos: Position) -> bool {
        matches!(self.cell(pos), Some(CellKind::Empty))
    }

    /// Cell one step away from `pos`, if the taxi could drive there
    pub fn neighbor(&self, pos: Position, direction: Direction) -> Option<Position> {
        pos.moved_in_direction(direction)
            .filter(|target| self.is_passable(*target))
    }

    /// All passable cells connected to `start`, in breadth-first order
    pub fn reachable_from(&self, start: Position) -> Vec<Position> {
        if !self.is_passable(start) {
            return Vec::new();
        }

        let mut seen = vec![false; self.rows * self.cols];
        let mut order = Vec::new();
        let mut queue = VecDeque::from([start]);
        seen[start.row * self.cols + start.col] = true;

        while let Some(pos) = queue.pop_front() {
            order.push(pos);
            for direction in [
                Direction::Up,
                Direction::Down,
                Direction::Left,
                Direction::Right,
            ] {
                if let Some(next) = self.neighbor(pos, direction) {
                    let idx = next.row * self.cols + next.col;
                    if !seen[idx] {
                        seen[idx] = true;
                        queue.push_back(next);
                    }
                }
            }
        }

        order
    }

    /// Iterate over every cell with its position, row-major
    pub fn cells(&self) -> impl Iterator<Item = (Position, CellKind)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, kind)| (Position::new(i / self.cols, i % self.cols), *kind))
    }
}

/// Where the passenger currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassengerLocation {
    /// Waiting on a cell
    Waiting(Position),
    /// Riding in the taxi
    InTaxi,
}

/// Complete mutable state of one game
///
/// `passenger` keeps the last cell the passenger stood on while they ride
/// in the taxi; only a dropoff moves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvironmentState {
    pub taxi: Position,
    pub passenger: Position,
    pub dropoff: Position,
    pub carrying: bool,
    pub pickup_intent: bool,
    pub dropoff_intent: bool,
}

impl EnvironmentState {
    /// Create a fresh game state with an empty taxi and no pending intents
    pub fn new(taxi: Position, passenger: Position, dropoff: Position) -> Self {
        Self {
            taxi,
            passenger,
            dropoff,
            carrying: false,
            pickup_intent: false,
            dropoff_intent: false,
        }
    }

    /// Starting point for a simulated episode
    ///
    /// Copies taxi, passenger, dropoff and the carrying flag. Intents are
    /// never inherited from the live game.
    pub fn episode_snapshot(&self) -> Self {
        Self {
            pickup_intent: false,
            dropoff_intent: false,
            ..*self
        }
    }

    pub fn passenger_location(&self) -> PassengerLocation {
        if self.carrying {
            PassengerLocation::InTaxi
        } else {
            PassengerLocation::Waiting(self.passenger)
        }
    }

    pub fn clear_intents(&mut self) {
        self.pickup_intent = false;
        self.dropoff_intent = false;
    }
}
