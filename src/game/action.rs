use serde::{Deserialize, Serialize};

/// Direction the taxi can drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Returns the (row, col) delta for moving in this direction
    pub fn delta(&self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }
}

/// Number of actions in the full action space
pub const NUM_ACTIONS: usize = 6;

/// Action the taxi can take
///
/// The declaration order is the ordinal order used to index the value table
/// and to break ties during greedy selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Pickup,
    Dropoff,
}

impl Action {
    /// All actions in ordinal order
    pub const ALL: [Action; NUM_ACTIONS] = [
        Action::MoveUp,
        Action::MoveDown,
        Action::MoveLeft,
        Action::MoveRight,
        Action::Pickup,
        Action::Dropoff,
    ];

    /// Movement actions only, in ordinal order
    pub const MOVES: [Action; 4] = [
        Action::MoveUp,
        Action::MoveDown,
        Action::MoveLeft,
        Action::MoveRight,
    ];

    /// Ordinal of this action (0..5)
    pub fn index(&self) -> usize {
        match self {
            Action::MoveUp => 0,
            Action::MoveDown => 1,
            Action::MoveLeft => 2,
            Action::MoveRight => 3,
            Action::Pickup => 4,
            Action::Dropoff => 5,
        }
    }

    /// Convert an ordinal back into an action
    pub fn from_index(idx: usize) -> Option<Action> {
        Action::ALL.get(idx).copied()
    }

    /// Direction of travel for movement actions
    pub fn direction(&self) -> Option<Direction> {
        match self {
            Action::MoveUp => Some(Direction::Up),
            Action::MoveDown => Some(Direction::Down),
            Action::MoveLeft => Some(Direction::Left),
            Action::MoveRight => Some(Direction::Right),
            Action::Pickup | Action::Dropoff => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::MoveUp => "Up",
            Action::MoveDown => "Down",
            Action::MoveLeft => "Left",
            Action::MoveRight => "Right",
            Action::Pickup => "Pickup",
            Action::Dropoff => "Dropoff",
        }
    }
}

impl From<Direction> for Action {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Up => Action::MoveUp,
            Direction::Down => Action::MoveDown,
            Direction::Left => Action::MoveLeft,
            Direction::Right => Action::MoveRight,
        }
    }
}
