//! Taxi RL - A grid taxi game learned by tabular Q-learning
//!
//! This library provides:
//! - Core game logic: map, transitions and reward models (game module)
//! - Q-learning agent and the per-tick driver (rl module)
//! - TUI rendering and keyboard input (render, input modules)
//! - Execution modes: watch, human and headless training (modes module)

pub mod config;
pub mod error;
pub mod game;
pub mod input;
pub mod logging;
pub mod metrics;
pub mod modes;
pub mod render;
pub mod rl;

pub use config::TaxiConfig;
pub use error::{Error, Result};
