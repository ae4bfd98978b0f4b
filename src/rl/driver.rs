//! Per-tick orchestration of training and live play
//!
//! Every tick the driver retrains the agent from the live position with a
//! full sweep and then lets it take exactly one greedy step in the live game.
//! There is no separate "train, then execute" phase: the plan is rebuilt
//! from scratch around wherever the taxi currently stands.

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use tracing::{debug, info};

use super::agent::{QLearningAgent, SweepSummary};
use crate::config::TaxiConfig;
use crate::error::{Error, Result};
use crate::game::{
    Action, EnvironmentState, GameConfig, GridEnvironment, Position, StepResult, TaxiSpawn,
};

/// Everything the presentation layer needs after one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    /// Action applied to the live game
    pub action: Action,
    /// Reward and outcome of that action
    pub step: StepResult,
    /// Training done before the action was chosen, if any
    pub sweep: Option<SweepSummary>,
    /// Live state after the action
    pub state: EnvironmentState,
    /// Successful deliveries so far
    pub score: u32,
    /// Sum of every live reward so far
    pub total_reward: f64,
    /// True when this tick finished a game; the next tick starts a new one
    pub game_over: bool,
}

/// Owns the environment, the agent and the live game
pub struct EpisodeDriver {
    env: GridEnvironment,
    agent: QLearningAgent,
    game: GameConfig,
    state: EnvironmentState,
    rng: StdRng,
    score: u32,
    total_reward: f64,
    last_reward: f64,
    reset_pending: bool,
    ticks: u64,
    game_ticks: u64,
    games_started: u64,
}

impl EpisodeDriver {
    /// Build a driver from a validated configuration
    ///
    /// Fails if the map, the depots, the taxi start or the hyperparameters
    /// are unusable.
    pub fn new(config: &TaxiConfig) -> Result<Self> {
        let env = config.game.build_environment()?;
        let mut agent = QLearningAgent::new(config.agent, &env)?;

        let mut rng = match config.seed {
            Some(seed) => {
                agent = agent.with_seed(seed);
                StdRng::seed_from_u64(seed.wrapping_add(1))
            }
            None => StdRng::from_entropy(),
        };

        let start = match config.game.taxi_spawn {
            TaxiSpawn::Random => random_spawn(&env, &mut rng, config.game.taxi_start),
            TaxiSpawn::Fixed | TaxiSpawn::Stay => config.game.taxi_start,
        };
        let state = env.new_game(start, &mut rng);

        info!(
            taxi = %state.taxi,
            passenger = %state.passenger,
            dropoff = %state.dropoff,
            "new game"
        );

        Ok(Self {
            env,
            agent,
            game: config.game.clone(),
            state,
            rng,
            score: 0,
            total_reward: 0.0,
            last_reward: 0.0,
            reset_pending: false,
            ticks: 0,
            game_ticks: 0,
            games_started: 1,
        })
    }

    pub fn environment(&self) -> &GridEnvironment {
        &self.env
    }

    pub fn agent(&self) -> &QLearningAgent {
        &self.agent
    }

    /// Live game state
    pub fn state(&self) -> &EnvironmentState {
        &self.state
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn total_reward(&self) -> f64 {
        self.total_reward
    }

    /// Reward of the most recent live action
    pub fn last_reward(&self) -> f64 {
        self.last_reward
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Ticks spent in the current game
    pub fn game_ticks(&self) -> u64 {
        self.game_ticks
    }

    pub fn games_started(&self) -> u64 {
        self.games_started
    }

    pub fn reset_pending(&self) -> bool {
        self.reset_pending
    }

    /// Ask for a fresh game on the next tick
    pub fn request_reset(&mut self) {
        self.reset_pending = true;
    }

    /// Replace the live game with explicit positions
    ///
    /// `passenger` and `dropoff` must be two different depots and `taxi` a
    /// cell from which they can be reached. The value table is kept.
    pub fn start_game(
        &mut self,
        taxi: Position,
        passenger: Position,
        dropoff: Position,
    ) -> Result<()> {
        let depots = self.env.depots();
        for pos in [passenger, dropoff] {
            if !depots.contains(&pos) {
                return Err(Error::InvalidPosition {
                    row: pos.row,
                    col: pos.col,
                    reason: "not a depot",
                });
            }
        }
        if passenger == dropoff {
            return Err(Error::InvalidDepots {
                message: format!("passenger and dropoff share depot {}", passenger),
            });
        }
        if !self.env.spawn_cells().contains(&taxi) {
            return Err(Error::InvalidPosition {
                row: taxi.row,
                col: taxi.col,
                reason: "not a reachable taxi cell",
            });
        }

        self.state = EnvironmentState::new(taxi, passenger, dropoff);
        self.begin_game();
        Ok(())
    }

    /// One interactive tick of the learning game
    ///
    /// Starts a new game if one is due, runs a full training sweep from the
    /// live state, then applies the greedy action to the live game.
    pub fn tick(&mut self) -> TickReport {
        self.apply_pending_reset();

        let sweep = self.agent.train_default(&self.env, &self.state);
        let action = self.agent.greedy_action(self.state.taxi);

        self.apply(action, Some(sweep))
    }

    /// Apply a user-chosen action to the live game without any training
    pub fn manual_step(&mut self, action: Action) -> TickReport {
        self.apply_pending_reset();
        self.apply(action, None)
    }

    fn apply(&mut self, action: Action, sweep: Option<SweepSummary>) -> TickReport {
        let step = self.env.step(&mut self.state, action);

        self.ticks += 1;
        self.game_ticks += 1;
        self.last_reward = step.reward;
        self.total_reward += step.reward;

        debug!(
            tick = self.ticks,
            action = action.as_str(),
            reward = step.reward,
            outcome = ?step.info.outcome,
            taxi = %self.state.taxi,
            "live step"
        );

        if step.terminated {
            self.score += 1;
            self.reset_pending = true;
            info!(
                score = self.score,
                game_ticks = self.game_ticks,
                "passenger delivered"
            );
        }

        TickReport {
            action,
            step,
            sweep,
            state: self.state,
            score: self.score,
            total_reward: self.total_reward,
            game_over: step.terminated,
        }
    }

    fn apply_pending_reset(&mut self) {
        if !self.reset_pending {
            return;
        }

        let taxi = match self.game.taxi_spawn {
            TaxiSpawn::Fixed => self.game.taxi_start,
            TaxiSpawn::Random => random_spawn(&self.env, &mut self.rng, self.game.taxi_start),
            TaxiSpawn::Stay => self.state.taxi,
        };
        self.state = self.env.new_game(taxi, &mut self.rng);
        self.begin_game();
    }

    fn begin_game(&mut self) {
        self.reset_pending = false;
        self.game_ticks = 0;
        self.games_started += 1;
        info!(
            taxi = %self.state.taxi,
            passenger = %self.state.passenger,
            dropoff = %self.state.dropoff,
            "new game"
        );
    }
}

fn random_spawn(env: &GridEnvironment, rng: &mut StdRng, fallback: Position) -> Position {
    env.spawn_cells().choose(rng).copied().unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Outcome;
    use crate::rl::{AgentConfig, SweepConfig};

    fn seeded(seed: u64) -> TaxiConfig {
        TaxiConfig {
            seed: Some(seed),
            ..TaxiConfig::default()
        }
    }

    fn light(seed: u64) -> TaxiConfig {
        TaxiConfig {
            agent: AgentConfig {
                sweep: SweepConfig {
                    num_episodes: 20,
                    max_steps: 30,
                    ..SweepConfig::default()
                },
                ..AgentConfig::default()
            },
            ..seeded(seed)
        }
    }

    #[test]
    fn test_driver_initialization() {
        let driver = EpisodeDriver::new(&seeded(1)).unwrap();
        let state = driver.state();

        assert_eq!(state.taxi, Position::new(3, 4));
        assert_ne!(state.passenger, state.dropoff);
        assert!(driver.environment().depots().contains(&state.passenger));
        assert!(driver.environment().depots().contains(&state.dropoff));
        assert!(!state.carrying);
        assert_eq!(driver.score(), 0);
        assert_eq!(driver.games_started(), 1);
    }

    #[test]
    fn test_invalid_config_refuses_to_start() {
        let mut config = seeded(1);
        config.agent.learning_rate = 0.0;
        assert!(EpisodeDriver::new(&config).is_err());

        let mut config = seeded(1);
        config.game.depots = vec![Position::new(1, 1)];
        assert!(EpisodeDriver::new(&config).is_err());
    }

    #[test]
    fn test_tick_trains_then_steps() {
        let mut driver = EpisodeDriver::new(&light(5)).unwrap();

        let report = driver.tick();

        let sweep = report.sweep.unwrap();
        assert_eq!(sweep.episodes, 20);
        assert!(sweep.steps <= 20 * 30);
        assert_eq!(driver.ticks(), 1);
        assert_eq!(report.state, *driver.state());
        assert_eq!(report.total_reward, report.step.reward);
        assert_eq!(driver.last_reward(), report.step.reward);
    }

    #[test]
    fn test_tick_takes_greedy_action() {
        let mut driver = EpisodeDriver::new(&light(9)).unwrap();
        for _ in 0..5 {
            // The greedy choice is computed after training, so replay the
            // selection from a clone of the agent to compare.
            let mut shadow = driver.agent.clone();
            let live = driver.state;
            shadow.train_default(&driver.env, &live);
            let expected = shadow.greedy_action(live.taxi);

            let report = driver.tick();
            if report.game_over {
                break;
            }
            assert_eq!(report.action, expected);
        }
    }

    #[test]
    fn test_manual_step_skips_training() {
        let mut driver = EpisodeDriver::new(&seeded(2)).unwrap();

        let report = driver.manual_step(Action::MoveUp);

        assert!(report.sweep.is_none());
        assert_eq!(driver.state().taxi, Position::new(2, 4));
        assert_eq!(report.step.reward, -1.0);
        assert_eq!(driver.agent().q_table().visited_entries(), 0);
    }

    #[test]
    fn test_start_game_validation() {
        let mut driver = EpisodeDriver::new(&seeded(3)).unwrap();
        let a = Position::new(1, 1);
        let d = Position::new(5, 8);

        assert!(driver.start_game(Position::new(3, 4), a, a).is_err());
        assert!(driver
            .start_game(Position::new(3, 4), Position::new(3, 3), d)
            .is_err());
        assert!(driver.start_game(Position::new(2, 3), a, d).is_err());
        assert!(driver.start_game(Position::new(3, 4), a, d).is_ok());
        assert_eq!(driver.state().passenger, a);
        assert_eq!(driver.state().dropoff, d);
    }

    #[test]
    fn test_delivery_scores_and_schedules_reset() {
        let mut driver = EpisodeDriver::new(&seeded(4)).unwrap();
        driver
            .start_game(Position::new(1, 1), Position::new(1, 1), Position::new(1, 8))
            .unwrap();

        let pickup = driver.manual_step(Action::Pickup);
        assert_eq!(pickup.step.info.outcome, Outcome::PickedUp);

        for _ in 0..7 {
            driver.manual_step(Action::MoveRight);
        }
        assert_eq!(driver.state().taxi, Position::new(1, 2));
        // (1, 3) is a median; go around it
        for action in [
            Action::MoveDown,
            Action::MoveDown,
            Action::MoveRight,
            Action::MoveRight,
            Action::MoveUp,
            Action::MoveUp,
        ] {
            driver.manual_step(action);
        }
        assert_eq!(driver.state().taxi, Position::new(1, 4));
        for _ in 0..4 {
            driver.manual_step(Action::MoveRight);
        }
        assert_eq!(driver.state().taxi, Position::new(1, 8));

        let report = driver.manual_step(Action::Dropoff);

        assert!(report.game_over);
        assert_eq!(report.step.reward, 20.0);
        assert_eq!(report.score, 1);
        assert!(driver.reset_pending());

        let games_before = driver.games_started();
        driver.manual_step(Action::MoveDown);
        assert!(!driver.reset_pending());
        assert_eq!(driver.games_started(), games_before + 1);
        assert!(!driver.state().carrying);
        assert_eq!(driver.score(), 1);
    }

    #[test]
    fn test_stay_spawn_keeps_taxi_after_reset() {
        let mut driver = EpisodeDriver::new(&seeded(6)).unwrap();
        driver.manual_step(Action::MoveRight);
        let taxi = driver.state().taxi;

        driver.request_reset();
        driver.manual_step(Action::Pickup);

        assert_eq!(driver.state().taxi, taxi);
        assert_eq!(driver.game_ticks(), 1);
    }

    #[test]
    fn test_fixed_spawn_returns_to_start() {
        let mut config = seeded(7);
        config.game.taxi_spawn = TaxiSpawn::Fixed;
        let mut driver = EpisodeDriver::new(&config).unwrap();
        driver.manual_step(Action::MoveRight);
        driver.manual_step(Action::MoveRight);

        driver.request_reset();
        driver.manual_step(Action::Pickup);

        assert_eq!(driver.state().taxi, Position::new(3, 4));
    }

    #[test]
    fn test_random_spawn_lands_on_reachable_cells() {
        let mut config = seeded(8);
        config.game.taxi_spawn = TaxiSpawn::Random;
        let mut driver = EpisodeDriver::new(&config).unwrap();
        let reachable = driver.environment().spawn_cells();

        for _ in 0..30 {
            assert!(reachable.contains(&driver.state().taxi));
            driver.request_reset();
            driver.manual_step(Action::Pickup);
        }
    }

    #[test]
    fn test_reset_keeps_value_table() {
        let mut driver = EpisodeDriver::new(&light(10)).unwrap();
        for _ in 0..3 {
            driver.tick();
        }
        let learned = driver.agent().q_table().clone();
        assert!(learned.visited_entries() > 0);

        driver.request_reset();
        driver.manual_step(Action::Pickup);

        let after = driver.agent().q_table();
        assert_eq!(after.max_abs_diff(&learned), 0.0);
    }

    #[test]
    fn test_seeded_drivers_agree() {
        let mut a = EpisodeDriver::new(&light(11)).unwrap();
        let mut b = EpisodeDriver::new(&light(11)).unwrap();
        for _ in 0..5 {
            assert_eq!(a.tick(), b.tick());
        }
    }
}
