//! Reward rules
//!
//! Two reward models ship with the game and are kept apart on purpose:
//!
//! - [`RewardModel::Intent`]: the six-action game. The taxi has to ask for a
//!   pickup or a dropoff explicitly, and misuse of either is punished.
//! - [`RewardModel::Arrival`]: the four-action game. Pickup and delivery
//!   happen as soon as the taxi rolls onto the right cell.

use serde::{Deserialize, Serialize};

use super::action::Action;
use super::state::EnvironmentState;

/// What a single transition amounted to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Passenger delivered at the dropoff depot
    Delivered,
    /// Passenger boarded the taxi
    PickedUp,
    /// Passenger put down somewhere other than the dropoff depot
    WrongDropoff,
    /// Pickup or dropoff requested where it makes no sense
    InvalidIntent,
    /// Plain move, blocked move, or anything else
    Moved,
}

/// Reward table for the six-action game
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntentRewards {
    pub delivered: f64,
    pub picked_up: f64,
    pub wrong_dropoff: f64,
    pub invalid_intent: f64,
    pub step: f64,
}

impl Default for IntentRewards {
    fn default() -> Self {
        Self {
            delivered: 20.0,
            picked_up: 2.0,
            wrong_dropoff: -10.0,
            invalid_intent: -10.0,
            step: -1.0,
        }
    }
}

/// Reward table for the four-action game
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArrivalRewards {
    pub delivered: f64,
    pub picked_up: f64,
    pub step: f64,
}

impl Default for ArrivalRewards {
    fn default() -> Self {
        Self {
            delivered: 100.0,
            picked_up: 10.0,
            step: -1.0,
        }
    }
}

/// Maps a post-move state to a reward and settles passenger/intent bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RewardModel {
    Intent(IntentRewards),
    Arrival(ArrivalRewards),
}

impl Default for RewardModel {
    fn default() -> Self {
        RewardModel::Intent(IntentRewards::default())
    }
}

impl RewardModel {
    pub fn intent() -> Self {
        RewardModel::Intent(IntentRewards::default())
    }

    pub fn arrival() -> Self {
        RewardModel::Arrival(ArrivalRewards::default())
    }

    /// Actions an agent may choose from under this model
    pub fn action_space(&self) -> &'static [Action] {
        match self {
            RewardModel::Intent(_) => &Action::ALL,
            RewardModel::Arrival(_) => &Action::MOVES,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RewardModel::Intent(_) => "intent",
            RewardModel::Arrival(_) => "arrival",
        }
    }

    /// Resolve the transition that just put the taxi at `state.taxi`
    ///
    /// `state` carries the carrying flag and intents as they were before this
    /// call; this is the only place passenger position, carrying flag and
    /// intents change.
    pub fn resolve(&self, state: &mut EnvironmentState) -> (f64, Outcome) {
        match self {
            RewardModel::Intent(rewards) => resolve_intent(rewards, state),
            RewardModel::Arrival(rewards) => resolve_arrival(rewards, state),
        }
    }
}

fn resolve_intent(rewards: &IntentRewards, state: &mut EnvironmentState) -> (f64, Outcome) {
    let at_dropoff = state.taxi == state.dropoff;
    let at_passenger = state.taxi == state.passenger;

    if at_dropoff && state.carrying && state.dropoff_intent {
        state.carrying = false;
        state.dropoff_intent = false;
        return (rewards.delivered, Outcome::Delivered);
    }

    if !state.dropoff_intent && state.pickup_intent && !state.carrying && at_passenger {
        state.carrying = true;
        state.pickup_intent = false;
        return (rewards.picked_up, Outcome::PickedUp);
    }

    if state.dropoff_intent && state.carrying && !at_dropoff {
        state.passenger = state.taxi;
        state.carrying = false;
        state.dropoff_intent = false;
        return (rewards.wrong_dropoff, Outcome::WrongDropoff);
    }

    if (state.dropoff_intent && !state.carrying) || (state.pickup_intent && !at_passenger) {
        state.clear_intents();
        return (rewards.invalid_intent, Outcome::InvalidIntent);
    }

    // Intents only live for one evaluation.
    state.clear_intents();
    (rewards.step, Outcome::Moved)
}

fn resolve_arrival(rewards: &ArrivalRewards, state: &mut EnvironmentState) -> (f64, Outcome) {
    state.clear_intents();

    if state.taxi == state.dropoff && state.carrying {
        state.carrying = false;
        return (rewards.delivered, Outcome::Delivered);
    }

    if state.taxi == state.passenger && !state.carrying {
        state.carrying = true;
        return (rewards.picked_up, Outcome::PickedUp);
    }

    (rewards.step, Outcome::Moved)
}
