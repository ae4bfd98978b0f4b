//! Q-learning hyperparameter configuration

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Shape of one training sweep
///
/// A sweep is run once per live tick, so `num_episodes * max_steps` is the
/// upper bound on the work done between two frames.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Number of simulated episodes per sweep
    ///
    /// Default: 300
    pub num_episodes: usize,

    /// Maximum transitions per episode
    ///
    /// Default: 140
    pub max_steps: usize,

    /// Exploration rate for the first episode of a sweep
    ///
    /// Default: 0.05
    pub epsilon_initial: f64,

    /// Floor for the exploration rate
    ///
    /// Epsilon decays linearly from `epsilon_initial` towards this value
    /// over the sweep.
    ///
    /// Default: 0.01
    pub epsilon_final: f64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            num_episodes: 300,
            max_steps: 140,
            epsilon_initial: 0.05,
            epsilon_final: 0.01,
        }
    }
}

impl SweepConfig {
    /// Sweep that never explores
    pub fn greedy(num_episodes: usize, max_steps: usize) -> Self {
        Self {
            num_episodes,
            max_steps,
            epsilon_initial: 0.0,
            epsilon_final: 0.0,
        }
    }

    /// Exploration rate for episode `episode` (0-based) of the sweep
    ///
    /// ```rust
    /// use taxi_rl::rl::SweepConfig;
    ///
    /// let sweep = SweepConfig::default();
    /// assert_eq!(sweep.epsilon_at(0), 0.05);
    /// ```
    pub fn epsilon_at(&self, episode: usize) -> f64 {
        let progress = episode as f64 / self.num_episodes as f64;
        let decayed =
            self.epsilon_initial - progress * (self.epsilon_initial - self.epsilon_final);
        decayed.max(self.epsilon_final)
    }

    /// Hard upper bound on transitions simulated by one sweep
    pub fn step_budget(&self) -> usize {
        self.num_episodes.saturating_mul(self.max_steps)
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_episodes == 0 {
            return Err(Error::InvalidHyperparameter {
                name: "num_episodes",
                expected: "at least 1",
                value: 0.0,
            });
        }

        if self.max_steps == 0 {
            return Err(Error::InvalidHyperparameter {
                name: "max_steps",
                expected: "at least 1",
                value: 0.0,
            });
        }

        for (name, value) in [
            ("epsilon_initial", self.epsilon_initial),
            ("epsilon_final", self.epsilon_final),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidHyperparameter {
                    name,
                    expected: "in [0, 1]",
                    value,
                });
            }
        }

        Ok(())
    }
}

/// Configuration for the Q-learning agent
///
/// # Example
///
/// ```rust
/// use taxi_rl::rl::AgentConfig;
///
/// let config = AgentConfig {
///     learning_rate: 0.5,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Step size of the Bellman update (alpha)
    ///
    /// Default: 0.3
    pub learning_rate: f64,

    /// Discount factor for future rewards (gamma)
    ///
    /// Default: 0.99
    pub discount_factor: f64,

    /// Training sweep run before every live step
    pub sweep: SweepConfig,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.3,
            discount_factor: 0.99,
            sweep: SweepConfig::default(),
        }
    }
}

impl AgentConfig {
    /// Validate configuration parameters
    ///
    /// Alpha and gamma must lie in (0, 1]; the sweep must do some work and
    /// keep both epsilons in [0, 1].
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("learning_rate", self.learning_rate),
            ("discount_factor", self.discount_factor),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(Error::InvalidHyperparameter {
                    name,
                    expected: "in (0, 1]",
                    value,
                });
            }
        }

        self.sweep.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AgentConfig::default();
        assert_eq!(config.learning_rate, 0.3);
        assert_eq!(config.discount_factor, 0.99);
        assert_eq!(config.sweep.num_episodes, 300);
        assert_eq!(config.sweep.max_steps, 140);
        assert_eq!(config.sweep.epsilon_initial, 0.05);
        assert_eq!(config.sweep.epsilon_final, 0.01);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_learning_rate_out_of_range() {
        let mut config = AgentConfig::default();
        config.learning_rate = 0.0;
        assert!(config.validate().is_err());

        config.learning_rate = 1.5;
        assert!(config.validate().is_err());

        config.learning_rate = f64::NAN;
        assert!(config.validate().is_err());

        config.learning_rate = 1.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_discount_out_of_range() {
        let mut config = AgentConfig::default();
        config.discount_factor = -0.1;
        assert!(config.validate().is_err());

        config.discount_factor = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_empty_sweep() {
        let mut config = AgentConfig::default();
        config.sweep.num_episodes = 0;
        assert!(config.validate().is_err());

        config.sweep.num_episodes = 10;
        config.sweep.max_steps = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_epsilon_range() {
        let mut config = AgentConfig::default();
        config.sweep.epsilon_initial = 1.2;
        assert!(config.validate().is_err());

        config.sweep.epsilon_initial = 0.5;
        config.sweep.epsilon_final = -0.01;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_linear_epsilon_decay() {
        let sweep = SweepConfig {
            num_episodes: 100,
            max_steps: 10,
            epsilon_initial: 0.5,
            epsilon_final: 0.1,
        };
        assert!((sweep.epsilon_at(0) - 0.5).abs() < 1e-12);
        assert!((sweep.epsilon_at(50) - 0.3).abs() < 1e-12);
        assert!((sweep.epsilon_at(99) - 0.104).abs() < 1e-12);
        // Never drops below the floor
        assert!((sweep.epsilon_at(500) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_greedy_sweep() {
        let sweep = SweepConfig::greedy(20, 30);
        assert_eq!(sweep.epsilon_at(0), 0.0);
        assert_eq!(sweep.epsilon_at(19), 0.0);
        assert_eq!(sweep.step_budget(), 600);
    }
}
