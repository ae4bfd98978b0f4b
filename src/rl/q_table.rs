//! Value table indexed by taxi position
//!
//! The table only looks at where the taxi is. Whether the passenger is
//! aboard and which depots are active are not part of the key, so values
//! learned for one depot pair leak into the next game after a reset.

use crate::game::{Action, Position, NUM_ACTIONS};

/// Q-values laid out row-major as `rows x cols x NUM_ACTIONS`
#[derive(Debug, Clone, PartialEq)]
pub struct QTable {
    rows: usize,
    cols: usize,
    values: Vec<[f64; NUM_ACTIONS]>,
}

impl QTable {
    /// Create a zero-initialized table
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            values: vec![[0.0; NUM_ACTIONS]; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    fn index(&self, pos: Position) -> usize {
        assert!(
            pos.row < self.rows && pos.col < self.cols,
            "position {} outside {}x{} table",
            pos,
            self.rows,
            self.cols
        );
        pos.row * self.cols + pos.col
    }

    /// All action-values at a position, in action ordinal order
    pub fn values(&self, pos: Position) -> &[f64; NUM_ACTIONS] {
        &self.values[self.index(pos)]
    }

    /// Get Q-value for a position-action pair
    pub fn get(&self, pos: Position, action: Action) -> f64 {
        self.values(pos)[action.index()]
    }

    /// Set Q-value for a position-action pair
    pub fn set(&mut self, pos: Position, action: Action, value: f64) {
        let idx = self.index(pos);
        self.values[idx][action.index()] = value;
    }

    /// Maximum Q-value over `actions` at a position
    pub fn max_value(&self, pos: Position, actions: &[Action]) -> f64 {
        let row = self.values(pos);
        actions
            .iter()
            .map(|action| row[action.index()])
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Greedy action over `actions`, ties going to the lowest ordinal
    ///
    /// `actions` must be listed in ordinal order.
    pub fn greedy_action(&self, pos: Position, actions: &[Action]) -> Action {
        let row = self.values(pos);
        let mut best = actions[0];
        for &action in &actions[1..] {
            if row[action.index()] > row[best.index()] {
                best = action;
            }
        }
        best
    }

    /// Largest absolute difference between two tables of equal shape
    pub fn max_abs_diff(&self, other: &QTable) -> f64 {
        self.values
            .iter()
            .zip(other.values.iter())
            .flat_map(|(a, b)| a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()))
            .fold(0.0, f64::max)
    }

    /// Number of entries that have moved away from zero
    pub fn visited_entries(&self) -> usize {
        self.values
            .iter()
            .flat_map(|row| row.iter())
            .filter(|v| **v != 0.0)
            .count()
    }
}
