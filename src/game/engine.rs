use rand::{seq::SliceRandom, Rng};

use super::{
    action::Action,
    reward::{Outcome, RewardModel},
    state::{EnvironmentState, Grid, Position},
};
use crate::error::{Error, Result};

/// Information about a step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepInfo {
    /// Movement action that hit a wall or the grid edge
    pub blocked: bool,
    /// Which reward case applied
    pub outcome: Outcome,
}

/// Result of a game step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepResult {
    /// Reward for this step
    pub reward: f64,
    /// Whether the passenger was delivered on this step
    pub terminated: bool,
    /// Additional information about the step
    pub info: StepInfo,
}

/// Static map plus the transition and reward rules
///
/// Holds nothing that changes while a game is played, so one environment
/// serves both the live game and every simulated episode.
#[derive(Debug, Clone)]
pub struct GridEnvironment {
    grid: Grid,
    depots: Vec<Position>,
    rewards: RewardModel,
}

impl GridEnvironment {
    /// Create an environment, checking the depot set against the map
    pub fn new(grid: Grid, depots: Vec<Position>, rewards: RewardModel) -> Result<Self> {
        let mut distinct: Vec<Position> = Vec::with_capacity(depots.len());
        for depot in &depots {
            if !grid.is_in_bounds(*depot) {
                return Err(Error::InvalidPosition {
                    row: depot.row,
                    col: depot.col,
                    reason: "a depot outside the grid",
                });
            }
            if !grid.is_passable(*depot) {
                return Err(Error::InvalidPosition {
                    row: depot.row,
                    col: depot.col,
                    reason: "a depot on an obstacle",
                });
            }
            if !distinct.contains(depot) {
                distinct.push(*depot);
            }
        }

        if distinct.len() < 2 {
            return Err(Error::InvalidDepots {
                message: format!(
                    "need at least 2 distinct depots, got {}",
                    distinct.len()
                ),
            });
        }

        let reachable = grid.reachable_from(distinct[0]);
        if let Some(cut_off) = distinct.iter().find(|d| !reachable.contains(d)) {
            return Err(Error::InvalidDepots {
                message: format!(
                    "depot {} cannot be reached from depot {}",
                    cut_off, distinct[0]
                ),
            });
        }

        Ok(Self {
            grid,
            depots: distinct,
            rewards,
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn depots(&self) -> &[Position] {
        &self.depots
    }

    pub fn reward_model(&self) -> &RewardModel {
        &self.rewards
    }

    /// Actions an agent may choose from in this environment
    pub fn action_space(&self) -> &'static [Action] {
        self.rewards.action_space()
    }

    /// Cells a taxi can be placed on so that every depot is within reach
    pub fn spawn_cells(&self) -> Vec<Position> {
        self.grid.reachable_from(self.depots[0])
    }

    /// Pick a random passenger depot and a different dropoff depot
    pub fn random_depot_pair<R: Rng + ?Sized>(&self, rng: &mut R) -> (Position, Position) {
        // `new` guarantees at least two distinct depots
        let passenger = self.depots[rng.gen_range(0..self.depots.len())];
        let others: Vec<Position> = self
            .depots
            .iter()
            .copied()
            .filter(|depot| *depot != passenger)
            .collect();
        let dropoff = others.choose(rng).copied().unwrap_or(passenger);
        (passenger, dropoff)
    }

    /// Start a new game with the taxi at `taxi` and a random depot pair
    pub fn new_game<R: Rng + ?Sized>(&self, taxi: Position, rng: &mut R) -> EnvironmentState {
        let (passenger, dropoff) = self.random_depot_pair(rng);
        EnvironmentState::new(taxi, passenger, dropoff)
    }

    /// True iff this state completes a delivery under the active reward model
    ///
    /// Evaluated on the state right after the taxi moved (or asked for a
    /// dropoff) and before rewards are resolved.
    pub fn is_goal(&self, state: &EnvironmentState) -> bool {
        let delivering = state.taxi == state.dropoff && state.carrying;
        match self.rewards {
            RewardModel::Intent(_) => delivering && state.dropoff_intent,
            RewardModel::Arrival(_) => delivering,
        }
    }

    /// Execute one action against `state`
    ///
    /// Blocked moves leave the taxi where it is and still cost a step.
    /// Pickup and dropoff only raise an intent; the reward model decides
    /// what becomes of it.
    pub fn step(&self, state: &mut EnvironmentState, action: Action) -> StepResult {
        let mut blocked = false;

        match action {
            Action::MoveUp | Action::MoveDown | Action::MoveLeft | Action::MoveRight => {
                let target = action
                    .direction()
                    .and_then(|direction| self.grid.neighbor(state.taxi, direction));
                match target {
                    Some(target) => state.taxi = target,
                    None => blocked = true,
                }
            }
            Action::Pickup => state.pickup_intent = true,
            Action::Dropoff => state.dropoff_intent = true,
        }

        let goal = self.is_goal(state);
        let (reward, outcome) = self.rewards.resolve(state);
        debug_assert_eq!(goal, outcome == Outcome::Delivered);

        StepResult {
            reward,
            terminated: goal,
            info: StepInfo { blocked, outcome },
        }
    }
}
