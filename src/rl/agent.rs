//! Tabular Q-learning agent
//!
//! The agent owns the value table and is the only thing that writes to it.
//! It learns by replaying short simulated episodes that start from a copy of
//! the live game, so every training sweep plans from where the taxi actually
//! is right now.

use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::trace;

use super::config::{AgentConfig, SweepConfig};
use super::q_table::QTable;
use crate::error::Result;
use crate::game::{Action, EnvironmentState, GridEnvironment, Position};

/// Totals for one simulated episode
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeSummary {
    pub reward: f64,
    pub steps: usize,
    pub delivered: bool,
}

/// Totals for one training sweep
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SweepSummary {
    pub episodes: usize,
    pub steps: usize,
    pub total_reward: f64,
    pub deliveries: usize,
}

impl SweepSummary {
    fn record(&mut self, episode: &EpisodeSummary) {
        self.episodes += 1;
        self.steps += episode.steps;
        self.total_reward += episode.reward;
        if episode.delivered {
            self.deliveries += 1;
        }
    }

    /// Mean reward per episode
    pub fn mean_reward(&self) -> f64 {
        if self.episodes == 0 {
            0.0
        } else {
            self.total_reward / self.episodes as f64
        }
    }

    /// Mean transitions per episode
    pub fn mean_length(&self) -> f64 {
        if self.episodes == 0 {
            0.0
        } else {
            self.steps as f64 / self.episodes as f64
        }
    }

    /// Fraction of episodes that ended in a delivery
    pub fn delivery_rate(&self) -> f64 {
        if self.episodes == 0 {
            0.0
        } else {
            self.deliveries as f64 / self.episodes as f64
        }
    }
}

/// Q-learning agent (off-policy TD control)
#[derive(Debug, Clone)]
pub struct QLearningAgent {
    q_table: QTable,
    config: AgentConfig,
    actions: &'static [Action],
    rng: StdRng,
    rng_seed: Option<u64>,
}

impl QLearningAgent {
    /// Create an agent sized for `env`
    ///
    /// The table covers every cell of the map, and the action space comes
    /// from the environment's reward model.
    pub fn new(config: AgentConfig, env: &GridEnvironment) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            q_table: QTable::new(env.grid().rows(), env.grid().cols()),
            config,
            actions: env.action_space(),
            rng: StdRng::from_entropy(),
            rng_seed: None,
        })
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self.rng_seed = Some(seed);
        self
    }

    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn actions(&self) -> &'static [Action] {
        self.actions
    }

    pub fn seed(&self) -> Option<u64> {
        self.rng_seed
    }

    /// ε-greedy action selection
    ///
    /// With probability `epsilon` a uniformly random action from the action
    /// space, otherwise the greedy one.
    pub fn select_action(&mut self, pos: Position, epsilon: f64) -> Action {
        if epsilon > 0.0 && self.rng.gen_bool(epsilon.min(1.0)) {
            self.actions[self.rng.gen_range(0..self.actions.len())]
        } else {
            self.greedy_action(pos)
        }
    }

    /// Highest-valued action at `pos`, ties going to the lowest ordinal
    pub fn greedy_action(&self, pos: Position) -> Action {
        self.q_table.greedy_action(pos, self.actions)
    }

    /// Q-learning update
    ///
    /// Q(s,a) ← Q(s,a) + α[r + γ max_a' Q(s',a') - Q(s,a)]
    ///
    /// Returns the temporal-difference error before the update.
    pub fn update(&mut self, pos: Position, action: Action, reward: f64, next: Position) -> f64 {
        let current_q = self.q_table.get(pos, action);
        let max_next_q = self.q_table.max_value(next, self.actions);
        let td_target = reward + self.config.discount_factor * max_next_q;
        let td_error = td_target - current_q;
        let new_q = current_q + self.config.learning_rate * td_error;
        self.q_table.set(pos, action, new_q);
        td_error
    }

    /// Run one simulated episode from a snapshot of `live`
    ///
    /// The live state is never touched. Stops after `max_steps` transitions
    /// or as soon as the passenger is delivered.
    pub fn run_episode(
        &mut self,
        env: &GridEnvironment,
        live: &EnvironmentState,
        epsilon: f64,
        max_steps: usize,
    ) -> EpisodeSummary {
        let mut state = live.episode_snapshot();
        let mut summary = EpisodeSummary {
            reward: 0.0,
            steps: 0,
            delivered: false,
        };

        for _ in 0..max_steps {
            let pos = state.taxi;
            let action = self.select_action(pos, epsilon);
            let result = env.step(&mut state, action);
            self.update(pos, action, result.reward, state.taxi);

            summary.reward += result.reward;
            summary.steps += 1;

            if result.terminated {
                summary.delivered = true;
                break;
            }
        }

        summary
    }

    /// Run a full training sweep against the shared table
    ///
    /// Episode `i` explores with `sweep.epsilon_at(i)`.
    pub fn train(
        &mut self,
        env: &GridEnvironment,
        live: &EnvironmentState,
        sweep: &SweepConfig,
    ) -> SweepSummary {
        let mut totals = SweepSummary::default();

        for episode in 0..sweep.num_episodes {
            let epsilon = sweep.epsilon_at(episode);
            let summary = self.run_episode(env, live, epsilon, sweep.max_steps);
            totals.record(&summary);
        }

        trace!(
            episodes = totals.episodes,
            steps = totals.steps,
            deliveries = totals.deliveries,
            mean_reward = totals.mean_reward(),
            "training sweep finished"
        );

        totals
    }

    /// Run a sweep with the configured schedule
    pub fn train_default(
        &mut self,
        env: &GridEnvironment,
        live: &EnvironmentState,
    ) -> SweepSummary {
        let sweep = self.config.sweep;
        self.train(env, live, &sweep)
    }
}
