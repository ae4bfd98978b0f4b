use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use taxi_rl::TaxiConfig;
use taxi_rl::game::{RewardModel, TaxiSpawn};
use taxi_rl::logging::{self, LogTarget};
use taxi_rl::modes::{HumanMode, TrainConfig, TrainMode, VisualizeMode};

#[derive(Parser)]
#[command(name = "taxi_rl")]
#[command(version, about = "Grid taxi game learned live by tabular Q-learning")]
struct Cli {
    /// Game mode
    #[arg(long, default_value = "watch")]
    mode: Mode,

    /// JSON configuration file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for every random choice
    #[arg(long)]
    seed: Option<u64>,

    /// Simulated episodes per tick
    #[arg(long)]
    episodes: Option<usize>,

    /// Maximum transitions per simulated episode
    #[arg(long)]
    max_steps: Option<usize>,

    /// Learning rate (alpha)
    #[arg(long)]
    alpha: Option<f64>,

    /// Discount factor (gamma)
    #[arg(long)]
    gamma: Option<f64>,

    /// Exploration rate for the first episode of each sweep
    #[arg(long)]
    epsilon_initial: Option<f64>,

    /// Exploration floor
    #[arg(long)]
    epsilon_final: Option<f64>,

    /// Reward rules
    #[arg(long)]
    rewards: Option<Rewards>,

    /// Where the taxi starts each new game
    #[arg(long)]
    taxi_spawn: Option<Spawn>,

    /// Games to play in train mode
    #[arg(long, default_value = "20")]
    games: usize,

    /// Give up on a game after this many ticks (train mode)
    #[arg(long, default_value = "500")]
    max_ticks: u64,

    /// Write logs here (the only way to get logs in watch/human mode)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    /// Watch the agent learn and drive
    Watch,
    /// Drive the taxi with the keyboard
    Human,
    /// Headless training with progress output
    Train,
}

#[derive(Clone, Copy, ValueEnum)]
enum Rewards {
    /// Six actions: pickup and dropoff must be chosen
    Intent,
    /// Four actions: pickup and dropoff happen on arrival
    Arrival,
}

#[derive(Clone, Copy, ValueEnum)]
enum Spawn {
    Fixed,
    Random,
    Stay,
}

impl Cli {
    /// Defaults, then the config file, then individual flags
    fn taxi_config(&self) -> Result<TaxiConfig> {
        let mut config = match &self.config {
            Some(path) => TaxiConfig::load(path)
                .with_context(|| format!("Failed to load config from {:?}", path))?,
            None => TaxiConfig::default(),
        };

        let sweep = &mut config.agent.sweep;
        if let Some(episodes) = self.episodes {
            sweep.num_episodes = episodes;
        }
        if let Some(max_steps) = self.max_steps {
            sweep.max_steps = max_steps;
        }
        if let Some(epsilon) = self.epsilon_initial {
            sweep.epsilon_initial = epsilon;
        }
        if let Some(epsilon) = self.epsilon_final {
            sweep.epsilon_final = epsilon;
        }
        if let Some(alpha) = self.alpha {
            config.agent.learning_rate = alpha;
        }
        if let Some(gamma) = self.gamma {
            config.agent.discount_factor = gamma;
        }
        if let Some(rewards) = self.rewards {
            config.game.rewards = match rewards {
                Rewards::Intent => RewardModel::intent(),
                Rewards::Arrival => RewardModel::arrival(),
            };
        }
        if let Some(spawn) = self.taxi_spawn {
            config.game.taxi_spawn = match spawn {
                Spawn::Fixed => TaxiSpawn::Fixed,
                Spawn::Random => TaxiSpawn::Random,
                Spawn::Stay => TaxiSpawn::Stay,
            };
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let uses_terminal_ui = !matches!(cli.mode, Mode::Train);
    let target = LogTarget::for_mode(uses_terminal_ui, cli.log_file.as_deref());
    logging::init(&target).context("Failed to set up logging")?;

    let config = cli.taxi_config()?;

    // Dispatch to appropriate mode
    match cli.mode {
        Mode::Watch => {
            let mut visualize_mode = VisualizeMode::new(&config)?;
            visualize_mode.run().await?;
        }
        Mode::Human => {
            let mut human_mode = HumanMode::new(&config)?;
            human_mode.run().await?;
        }
        Mode::Train => {
            let train_config = TrainConfig {
                num_games: cli.games,
                max_ticks_per_game: cli.max_ticks,
                taxi: config,
                ..TrainConfig::new(cli.games)
            };
            let mut train_mode = TrainMode::new(train_config)?;
            train_mode.run()?;
        }
    }

    Ok(())
}
