//! Training statistics tracking for the Q-learning driver
//!
//! Keeps rolling windows over training sweeps and over live games. Sweep
//! figures show how the simulated episodes are going; game figures show what
//! that buys in the live game, including the slow first game after a reset
//! to new depots.

use std::collections::VecDeque;

use crate::rl::SweepSummary;

/// Training statistics tracker with rolling averages
///
/// # Example
///
/// ```rust
/// use taxi_rl::metrics::TrainingStats;
/// use taxi_rl::rl::SweepSummary;
///
/// let mut stats = TrainingStats::new(100);
///
/// stats.record_sweep(&SweepSummary {
///     episodes: 300,
///     steps: 9000,
///     total_reward: -1500.0,
///     deliveries: 240,
/// });
/// stats.record_game(31, 12.0);
///
/// println!("{}", stats.format_summary());
/// ```
#[derive(Debug, Clone)]
pub struct TrainingStats {
    /// Mean simulated episode reward per sweep (rolling window)
    sweep_rewards: VecDeque<f64>,

    /// Fraction of simulated episodes that delivered, per sweep (rolling window)
    sweep_delivery_rates: VecDeque<f64>,

    /// Mean simulated episode length per sweep (rolling window)
    sweep_lengths: VecDeque<f64>,

    /// Live ticks needed per completed game (rolling window)
    game_ticks: VecDeque<u64>,

    /// Live reward collected per completed game (rolling window)
    game_rewards: VecDeque<f64>,

    total_sweeps: usize,
    total_episodes: usize,
    total_episode_steps: usize,
    total_games: usize,

    /// Window size for rolling averages
    window_size: usize,
}

impl TrainingStats {
    /// Create a new training statistics tracker
    ///
    /// `window_size` is the number of recent values kept for rolling
    /// averages.
    pub fn new(window_size: usize) -> Self {
        Self {
            sweep_rewards: VecDeque::with_capacity(window_size),
            sweep_delivery_rates: VecDeque::with_capacity(window_size),
            sweep_lengths: VecDeque::with_capacity(window_size),
            game_ticks: VecDeque::with_capacity(window_size),
            game_rewards: VecDeque::with_capacity(window_size),
            total_sweeps: 0,
            total_episodes: 0,
            total_episode_steps: 0,
            total_games: 0,
            window_size,
        }
    }

    /// Record the outcome of one training sweep
    pub fn record_sweep(&mut self, sweep: &SweepSummary) {
        Self::push_deque(&mut self.sweep_rewards, sweep.mean_reward(), self.window_size);
        Self::push_deque(
            &mut self.sweep_delivery_rates,
            sweep.delivery_rate(),
            self.window_size,
        );
        Self::push_deque(&mut self.sweep_lengths, sweep.mean_length(), self.window_size);
        self.total_sweeps += 1;
        self.total_episodes += sweep.episodes;
        self.total_episode_steps += sweep.steps;
    }

    /// Record a completed live game
    ///
    /// # Example
    ///
    /// ```rust
    /// use taxi_rl::metrics::TrainingStats;
    ///
    /// let mut stats = TrainingStats::new(10);
    /// stats.record_game(20, 5.0);
    /// stats.record_game(40, -15.0);
    ///
    /// assert_eq!(stats.total_games(), 2);
    /// assert_eq!(stats.mean_game_ticks(), 30.0);
    /// ```
    pub fn record_game(&mut self, ticks: u64, reward: f64) {
        Self::push_deque(&mut self.game_ticks, ticks, self.window_size);
        Self::push_deque(&mut self.game_rewards, reward, self.window_size);
        self.total_games += 1;
    }

    /// Mean simulated episode reward over the window
    pub fn mean_episode_reward(&self) -> f64 {
        Self::mean(&self.sweep_rewards)
    }

    /// Episode delivery rate over the window
    pub fn mean_delivery_rate(&self) -> f64 {
        Self::mean(&self.sweep_delivery_rates)
    }

    /// Mean simulated episode length over the window
    pub fn mean_episode_length(&self) -> f64 {
        Self::mean(&self.sweep_lengths)
    }

    /// Mean live ticks per game over the window
    pub fn mean_game_ticks(&self) -> f64 {
        if self.game_ticks.is_empty() {
            0.0
        } else {
            self.game_ticks.iter().sum::<u64>() as f64 / self.game_ticks.len() as f64
        }
    }

    pub fn mean_game_reward(&self) -> f64 {
        Self::mean(&self.game_rewards)
    }

    /// Ticks taken by the most recently completed game
    pub fn last_game_ticks(&self) -> Option<u64> {
        self.game_ticks.back().copied()
    }

    pub fn total_sweeps(&self) -> usize {
        self.total_sweeps
    }

    /// Simulated episodes across all sweeps
    pub fn total_episodes(&self) -> usize {
        self.total_episodes
    }

    /// Simulated transitions across all sweeps
    pub fn total_episode_steps(&self) -> usize {
        self.total_episode_steps
    }

    pub fn total_games(&self) -> usize {
        self.total_games
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Format a summary of the current statistics
    ///
    /// ```text
    /// Games: 3 | Ticks/Game: 24.3 | Game Reward: 7.00 | Sweeps: 73 | Ep Reward: -18.42 | Delivered: 87.0% | Ep Len: 29.6
    /// ```
    pub fn format_summary(&self) -> String {
        format!(
            "Games: {} | Ticks/Game: {:.1} | Game Reward: {:.2} | Sweeps: {} | Ep Reward: {:.2} | Delivered: {:.1}% | Ep Len: {:.1}",
            self.total_games,
            self.mean_game_ticks(),
            self.mean_game_reward(),
            self.total_sweeps,
            self.mean_episode_reward(),
            self.mean_delivery_rate() * 100.0,
            self.mean_episode_length(),
        )
    }

    fn mean(deque: &VecDeque<f64>) -> f64 {
        if deque.is_empty() {
            0.0
        } else {
            deque.iter().sum::<f64>() / deque.len() as f64
        }
    }

    /// Push to a deque, evicting the oldest value once the window is full
    fn push_deque<T>(deque: &mut VecDeque<T>, value: T, window_size: usize) {
        if deque.len() >= window_size {
            deque.pop_front();
        }
        deque.push_back(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sweep(total_reward: f64, steps: usize, deliveries: usize) -> SweepSummary {
        SweepSummary {
            episodes: 10,
            steps,
            total_reward,
            deliveries,
        }
    }

    #[test]
    fn test_new() {
        let stats = TrainingStats::new(100);
        assert_eq!(stats.window_size(), 100);
        assert_eq!(stats.total_sweeps(), 0);
        assert_eq!(stats.total_games(), 0);
        assert_eq!(stats.last_game_ticks(), None);
    }

    #[test]
    fn test_record_sweep() {
        let mut stats = TrainingStats::new(100);
        stats.record_sweep(&sweep(-50.0, 200, 4));

        assert_eq!(stats.total_sweeps(), 1);
        assert_eq!(stats.total_episodes(), 10);
        assert_eq!(stats.total_episode_steps(), 200);
        assert!((stats.mean_episode_reward() + 5.0).abs() < 1e-9);
        assert!((stats.mean_delivery_rate() - 0.4).abs() < 1e-9);
        assert!((stats.mean_episode_length() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_record_game() {
        let mut stats = TrainingStats::new(100);
        stats.record_game(25, 10.0);

        assert_eq!(stats.total_games(), 1);
        assert_eq!(stats.last_game_ticks(), Some(25));
        assert!((stats.mean_game_reward() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_rolling_average() {
        let mut stats = TrainingStats::new(3);

        stats.record_sweep(&sweep(10.0, 100, 1));
        stats.record_sweep(&sweep(20.0, 100, 1));
        stats.record_sweep(&sweep(30.0, 100, 1));

        assert!((stats.mean_episode_reward() - 2.0).abs() < 1e-9);

        // A 4th sweep evicts the first
        stats.record_sweep(&sweep(40.0, 100, 1));

        assert_eq!(stats.total_sweeps(), 4);
        assert!((stats.mean_episode_reward() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_game_window_tracks_reset_cost() {
        let mut stats = TrainingStats::new(2);

        stats.record_game(20, 0.0);
        stats.record_game(60, 0.0);
        assert_eq!(stats.mean_game_ticks(), 40.0);

        stats.record_game(30, 0.0);
        assert_eq!(stats.mean_game_ticks(), 45.0);
        assert_eq!(stats.last_game_ticks(), Some(30));
        assert_eq!(stats.total_games(), 3);
    }

    #[test]
    fn test_format_summary() {
        let mut stats = TrainingStats::new(100);
        stats.record_sweep(&sweep(-155.0, 300, 9));
        stats.record_game(31, 12.0);

        let summary = stats.format_summary();
        assert!(summary.contains("Games: 1"));
        assert!(summary.contains("Ticks/Game: 31.0"));
        assert!(summary.contains("Game Reward: 12.00"));
        assert!(summary.contains("Sweeps: 1"));
        assert!(summary.contains("Ep Reward: -15.50"));
        assert!(summary.contains("Delivered: 90.0%"));
        assert!(summary.contains("Ep Len: 30.0"));
    }

    #[test]
    fn test_empty_stats() {
        let stats = TrainingStats::new(100);

        assert_eq!(stats.mean_episode_reward(), 0.0);
        assert_eq!(stats.mean_delivery_rate(), 0.0);
        assert_eq!(stats.mean_episode_length(), 0.0);
        assert_eq!(stats.mean_game_ticks(), 0.0);
        assert_eq!(stats.mean_game_reward(), 0.0);
    }
}
