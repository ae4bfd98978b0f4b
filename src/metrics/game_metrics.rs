use std::time::{Duration, Instant};

/// Per-game counters shown in the TUI header
pub struct GameMetrics {
    pub start_time: Instant,
    pub elapsed_time: Duration,
    pub game_ticks: u64,
    pub games_completed: u32,
    pub fastest_game: Option<u64>,
}

impl GameMetrics {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            elapsed_time: Duration::ZERO,
            game_ticks: 0,
            games_completed: 0,
            fastest_game: None,
        }
    }

    pub fn update(&mut self) {
        self.elapsed_time = self.start_time.elapsed();
    }

    pub fn on_tick(&mut self) {
        self.game_ticks += 1;
    }

    pub fn on_game_start(&mut self) {
        self.start_time = Instant::now();
        self.elapsed_time = Duration::ZERO;
        self.game_ticks = 0;
    }

    /// Record a delivery; `ticks` is how long the game took
    pub fn on_delivery(&mut self, ticks: u64) {
        self.games_completed += 1;
        if self.fastest_game.map_or(true, |best| ticks < best) {
            self.fastest_game = Some(ticks);
        }
    }

    pub fn format_time(&self) -> String {
        let total_secs = self.elapsed_time.as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;
        format!("{:02}:{:02}", minutes, seconds)
    }

    pub fn format_fastest(&self) -> String {
        match self.fastest_game {
            Some(ticks) => ticks.to_string(),
            None => "-".to_string(),
        }
    }
}

impl Default for GameMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_formatting() {
        let mut metrics = GameMetrics::new();
        metrics.elapsed_time = Duration::from_secs(125);
        assert_eq!(metrics.format_time(), "02:05");

        metrics.elapsed_time = Duration::from_secs(0);
        assert_eq!(metrics.format_time(), "00:00");

        metrics.elapsed_time = Duration::from_secs(3661);
        assert_eq!(metrics.format_time(), "61:01");
    }

    #[test]
    fn test_fastest_game_tracking() {
        let mut metrics = GameMetrics::new();
        assert_eq!(metrics.format_fastest(), "-");

        metrics.on_delivery(30);
        assert_eq!(metrics.fastest_game, Some(30));
        assert_eq!(metrics.games_completed, 1);

        metrics.on_delivery(45);
        assert_eq!(metrics.fastest_game, Some(30)); // Should not get slower
        assert_eq!(metrics.games_completed, 2);

        metrics.on_delivery(12);
        assert_eq!(metrics.fastest_game, Some(12));
        assert_eq!(metrics.format_fastest(), "12");
    }

    #[test]
    fn test_game_start_resets_counters() {
        let mut metrics = GameMetrics::new();
        std::thread::sleep(Duration::from_millis(50));
        metrics.update();
        metrics.on_tick();
        metrics.on_tick();

        assert!(metrics.elapsed_time.as_millis() >= 50);
        assert_eq!(metrics.game_ticks, 2);

        metrics.on_game_start();
        metrics.update();
        assert!(metrics.elapsed_time.as_millis() < 50);
        assert_eq!(metrics.game_ticks, 0);
    }
}
