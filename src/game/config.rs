use serde::{Deserialize, Serialize};

use super::{
    engine::GridEnvironment,
    reward::RewardModel,
    state::{Grid, Position},
};
use crate::error::{Error, Result};

/// The 7x10 city map the game ships with
pub const CLASSIC_LAYOUT: [&str; 7] = [
    ".LHHHHHHR.",
    "T..T.....T",
    "V..B.....V",
    "V........V",
    "V.T....T.V",
    "B.B....B.B",
    ".LHHHHHHR.",
];

/// Depots A, B, C and D of the classic map
pub const CLASSIC_DEPOTS: [Position; 4] = [
    Position { row: 1, col: 1 },
    Position { row: 1, col: 8 },
    Position { row: 5, col: 1 },
    Position { row: 5, col: 8 },
];

/// Where the taxi starts each new game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxiSpawn {
    /// Always at `taxi_start`
    Fixed,
    /// Any cell from which the depots can be reached
    Random,
    /// `taxi_start` for the first game, then wherever the last game ended
    Stay,
}

impl TaxiSpawn {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaxiSpawn::Fixed => "fixed",
            TaxiSpawn::Random => "random",
            TaxiSpawn::Stay => "stay",
        }
    }
}

/// Configuration for the game
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Map rows, one symbol per cell
    pub layout: Vec<String>,
    /// Cells eligible to host the passenger or the dropoff
    pub depots: Vec<Position>,
    /// Taxi position for the first game
    pub taxi_start: Position,
    /// How the taxi is placed when a new game starts
    pub taxi_spawn: TaxiSpawn,
    /// Reward rules and, through them, the action space
    pub rewards: RewardModel,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            layout: CLASSIC_LAYOUT.iter().map(|row| row.to_string()).collect(),
            depots: CLASSIC_DEPOTS.to_vec(),
            taxi_start: Position::new(3, 4),
            taxi_spawn: TaxiSpawn::Stay,
            rewards: RewardModel::default(),
        }
    }
}

impl GameConfig {
    /// Open map of the given size with depots in the four corners
    pub fn open(rows: usize, cols: usize) -> Self {
        let last_row = rows.saturating_sub(1);
        let last_col = cols.saturating_sub(1);
        Self {
            layout: (0..rows).map(|_| ".".repeat(cols)).collect(),
            depots: vec![
                Position::new(0, 0),
                Position::new(0, last_col),
                Position::new(last_row, 0),
                Position::new(last_row, last_col),
            ],
            taxi_start: Position::new(rows / 2, cols / 2),
            taxi_spawn: TaxiSpawn::Fixed,
            rewards: RewardModel::default(),
        }
    }

    /// Parse the layout into a grid
    pub fn build_grid(&self) -> Result<Grid> {
        Grid::from_rows(&self.layout)
    }

    /// Build the environment, rejecting anything that cannot be played
    pub fn build_environment(&self) -> Result<GridEnvironment> {
        let env = GridEnvironment::new(self.build_grid()?, self.depots.clone(), self.rewards)?;

        let start = self.taxi_start;
        if !env.grid().is_passable(start) {
            return Err(Error::InvalidPosition {
                row: start.row,
                col: start.col,
                reason: "not a drivable taxi start",
            });
        }
        if !env.spawn_cells().contains(&start) {
            return Err(Error::InvalidPosition {
                row: start.row,
                col: start.col,
                reason: "a taxi start cut off from the depots",
            });
        }

        Ok(env)
    }

    /// Validate the configuration without keeping the environment
    pub fn validate(&self) -> Result<()> {
        self.build_environment().map(|_| ())
    }
}
