//! Core game logic for the taxi grid
//!
//! This module contains the map, the transition rules and the reward rules,
//! without any I/O or rendering dependencies. The same environment drives
//! both the live game and the agent's simulated episodes.

pub mod action;
pub mod config;
pub mod engine;
pub mod reward;
pub mod state;

// Re-export commonly used types
pub use action::{Action, Direction, NUM_ACTIONS};
pub use config::{GameConfig, TaxiSpawn};
pub use engine::{GridEnvironment, StepInfo, StepResult};
pub use reward::{ArrivalRewards, IntentRewards, Outcome, RewardModel};
pub use state::{CellKind, EnvironmentState, Grid, PassengerLocation, Position};
