//! Reinforcement learning for the taxi game
//!
//! Provides:
//! - Position-indexed Q-table
//! - Q-learning agent with ε-greedy training sweeps
//! - Hyperparameter configuration
//! - Per-tick driver that retrains and then plays one live step

pub mod agent;
pub mod config;
pub mod driver;
pub mod q_table;

pub use agent::{EpisodeSummary, QLearningAgent, SweepSummary};
pub use config::{AgentConfig, SweepConfig};
pub use driver::{EpisodeDriver, TickReport};
pub use q_table::QTable;
