//! Headless training mode
//!
//! Plays live games back to back with the learning driver and prints how
//! many ticks each delivery took. The value table carries over from game to
//! game, so this is also the quickest way to watch the cost of a depot reset.
//!
//! # Example
//!
//! ```rust,no_run
//! use taxi_rl::modes::{TrainConfig, TrainMode};
//!
//! let config = TrainConfig::new(20);
//! let mut train_mode = TrainMode::new(config)?;
//! train_mode.run()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{Context, Result};
use tracing::warn;

use crate::config::TaxiConfig;
use crate::metrics::TrainingStats;
use crate::rl::EpisodeDriver;

/// Configuration for training mode
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// Number of live games to play
    pub num_games: usize,

    /// Give up on a game after this many live ticks
    pub max_ticks_per_game: u64,

    /// Print progress every N games
    pub log_frequency: usize,

    /// Game, agent and seed
    pub taxi: TaxiConfig,
}

impl TrainConfig {
    /// Create a new training configuration with defaults
    ///
    /// ```rust
    /// use taxi_rl::modes::TrainConfig;
    ///
    /// let config = TrainConfig::new(50);
    /// assert_eq!(config.max_ticks_per_game, 500);
    /// ```
    pub fn new(num_games: usize) -> Self {
        Self {
            num_games,
            max_ticks_per_game: 500,
            log_frequency: 5,
            taxi: TaxiConfig::default(),
        }
    }
}

/// How one live game ended
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameOutcome {
    pub ticks: u64,
    pub reward: f64,
    pub delivered: bool,
}

/// Headless training mode
pub struct TrainMode {
    driver: EpisodeDriver,
    stats: TrainingStats,
    config: TrainConfig,
    abandoned_games: usize,
}

impl TrainMode {
    pub fn new(config: TrainConfig) -> Result<Self> {
        let driver =
            EpisodeDriver::new(&config.taxi).context("Failed to initialize the driver")?;

        // 100-game rolling window
        let stats = TrainingStats::new(100);

        Ok(Self {
            driver,
            stats,
            config,
            abandoned_games: 0,
        })
    }

    /// Play every configured game, printing progress along the way
    pub fn run(&mut self) -> Result<()> {
        self.print_header();

        for game in 0..self.config.num_games {
            let outcome = self.run_game();

            if !outcome.delivered {
                self.abandoned_games += 1;
            }

            if (game + 1) % self.config.log_frequency == 0 {
                self.print_progress(game + 1);
            }
        }

        println!("\nTraining complete!");
        println!("Deliveries: {}", self.driver.score());
        println!("Abandoned games: {}", self.abandoned_games);
        println!("\nFinal Statistics:");
        println!("{}", self.stats.format_summary());

        Ok(())
    }

    /// Run ticks until the current game is delivered or hits the tick cap
    fn run_game(&mut self) -> GameOutcome {
        let reward_before = self.driver.total_reward();
        let mut ticks = 0;

        loop {
            let report = self.driver.tick();
            ticks += 1;

            if let Some(sweep) = &report.sweep {
                self.stats.record_sweep(sweep);
            }

            if report.game_over {
                let reward = report.total_reward - reward_before;
                self.stats.record_game(ticks, reward);
                return GameOutcome {
                    ticks,
                    reward,
                    delivered: true,
                };
            }

            if ticks >= self.config.max_ticks_per_game {
                warn!(
                    ticks,
                    taxi = %report.state.taxi,
                    "game hit the tick cap, starting a new one"
                );
                self.driver.request_reset();
                return GameOutcome {
                    ticks,
                    reward: self.driver.total_reward() - reward_before,
                    delivered: false,
                };
            }
        }
    }

    pub fn stats(&self) -> &TrainingStats {
        &self.stats
    }

    pub fn driver(&self) -> &EpisodeDriver {
        &self.driver
    }

    fn print_header(&self) {
        let agent = &self.config.taxi.agent;
        let game = &self.config.taxi.game;
        let grid = self.driver.environment().grid();

        println!("{}", "=".repeat(70));
        println!("Q-Learning Training - Taxi RL");
        println!("{}", "=".repeat(70));
        println!("Games: {}", self.config.num_games);
        println!("Tick cap per game: {}", self.config.max_ticks_per_game);
        println!(
            "Game Config: {}x{} grid, {} depots",
            grid.rows(),
            grid.cols(),
            self.driver.environment().depots().len()
        );
        println!("  Rewards: {}", game.rewards.name());
        println!("  Taxi spawn: {}", game.taxi_spawn.as_str());
        println!("Agent Config:");
        println!("  Learning rate: {}", agent.learning_rate);
        println!("  Gamma: {}", agent.discount_factor);
        println!("  Episodes per tick: {}", agent.sweep.num_episodes);
        println!("  Max steps per episode: {}", agent.sweep.max_steps);
        println!(
            "  Epsilon: {} -> {}",
            agent.sweep.epsilon_initial, agent.sweep.epsilon_final
        );
        match self.config.taxi.seed {
            Some(seed) => println!("Seed: {}", seed),
            None => println!("Seed: random"),
        }
        println!("Logging: Every {} games", self.config.log_frequency);
        println!("{}", "=".repeat(70));
        println!();
    }

    fn print_progress(&self, game: usize) {
        println!(
            "[Game {}/{}] {}",
            game,
            self.config.num_games,
            self.stats.format_summary()
        );
    }
}
