//! Watch mode: the learning taxi, live
//!
//! Every game tick runs a full training sweep from the live position and then
//! plays the single greedy action that comes out of it. The value table is
//! kept across games, so the first few moves after a new depot pair is drawn
//! often look lost before the sweeps pull the policy around.
//!
//! # Controls
//!
//! - Space: Pause/unpause
//! - R: New game
//! - 1-4: Speed control (1=slow, 2=normal, 3=fast, 4=very fast)
//! - Q/Esc: Quit
//!
//! # Example
//!
//! ```rust,no_run
//! use taxi_rl::modes::VisualizeMode;
//! use taxi_rl::TaxiConfig;
//!
//! # async fn watch() -> anyhow::Result<()> {
//! let mut visualize_mode = VisualizeMode::new(&TaxiConfig::default())?;
//! visualize_mode.run().await?;
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    io::{stderr, Stderr},
    time::Duration,
};
use tokio::time::{interval, Interval};

use crate::config::TaxiConfig;
use crate::game::Action;
use crate::input::{InputHandler, KeyAction, SpeedSetting};
use crate::metrics::{GameMetrics, TrainingStats};
use crate::render::{ControlsHint, HudStatus, Renderer};
use crate::rl::EpisodeDriver;

/// Visualization speed settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualizationSpeed {
    /// Slow: 2 Hz (500ms per step)
    Slow,
    /// Normal: 8 Hz (125ms per step) - same as human mode
    Normal,
    /// Fast: 20 Hz (50ms per step)
    Fast,
    /// Very Fast: as fast as the sweeps allow, capped at 60 Hz
    VeryFast,
}

impl VisualizationSpeed {
    /// Get the tick interval for this speed
    fn tick_interval(&self) -> Duration {
        match self {
            Self::Slow => Duration::from_millis(500),
            Self::Normal => Duration::from_millis(125),
            Self::Fast => Duration::from_millis(50),
            Self::VeryFast => Duration::from_millis(16),
        }
    }

    /// Get a string representation of the speed
    fn as_str(&self) -> &'static str {
        match self {
            Self::Slow => "Slow",
            Self::Normal => "Normal",
            Self::Fast => "Fast",
            Self::VeryFast => "Very Fast",
        }
    }
}

impl From<SpeedSetting> for VisualizationSpeed {
    fn from(setting: SpeedSetting) -> Self {
        match setting {
            SpeedSetting::Slow => Self::Slow,
            SpeedSetting::Normal => Self::Normal,
            SpeedSetting::Fast => Self::Fast,
            SpeedSetting::VeryFast => Self::VeryFast,
        }
    }
}

/// Watch the agent learn and drive
pub struct VisualizeMode {
    /// Learning driver that owns the game and the agent
    driver: EpisodeDriver,

    /// Renderer for TUI display
    renderer: Renderer,

    input_handler: InputHandler,

    /// Per-game counters for the header
    metrics: GameMetrics,

    /// Rolling sweep and game statistics
    stats: TrainingStats,

    /// Whether to quit the visualization
    should_quit: bool,

    /// Whether playback is paused
    paused: bool,

    /// Current playback speed
    speed: VisualizationSpeed,

    last_action: Option<Action>,

    /// Running reward total when the current game began
    game_start_reward: f64,
}

impl VisualizeMode {
    /// Create a new watch mode
    ///
    /// Fails if the configuration cannot produce a playable game.
    pub fn new(config: &TaxiConfig) -> Result<Self> {
        let driver = EpisodeDriver::new(config).context("Failed to start the learning game")?;

        Ok(Self {
            driver,
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            metrics: GameMetrics::new(),
            stats: TrainingStats::new(50),
            should_quit: false,
            paused: false,
            speed: VisualizationSpeed::Normal,
            last_action: None,
            game_start_reward: 0.0,
        })
    }

    /// Run the visualization loop
    ///
    /// Sets up the terminal, runs the main visualization loop, and cleans up
    /// on exit.
    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        // Run visualization loop
        let result = self.run_visualization_loop(&mut terminal).await;

        // Cleanup terminal
        self.cleanup_terminal(&mut terminal)?;

        result
    }

    /// Main visualization loop
    async fn run_visualization_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();

        // Game ticks based on speed
        let mut tick_timer = interval(self.speed.tick_interval());

        // Render at 30 FPS
        let render_interval = Duration::from_millis(33);
        let mut render_timer = interval(render_interval);

        loop {
            tokio::select! {
                // Handle keyboard input
                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        self.handle_event(event, &mut tick_timer);
                    }
                }

                // Train, then take one live step
                _ = tick_timer.tick() => {
                    if !self.paused {
                        self.step_agent();
                    }
                }

                // Render frame
                _ = render_timer.tick() => {
                    self.metrics.update();
                    let hud = self.hud();
                    terminal.draw(|frame| {
                        self.renderer.render(
                            frame,
                            self.driver.environment().grid(),
                            self.driver.state(),
                            &self.metrics,
                            &hud,
                        );
                    }).context("Failed to draw frame")?;
                }

                // Ctrl+C
                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// One driver tick plus the bookkeeping around it
    fn step_agent(&mut self) {
        if self.driver.reset_pending() {
            self.game_start_reward = self.driver.total_reward();
            self.metrics.on_game_start();
        }

        let report = self.driver.tick();
        self.metrics.on_tick();
        self.last_action = Some(report.action);

        if let Some(sweep) = &report.sweep {
            self.stats.record_sweep(sweep);
        }

        if report.game_over {
            let ticks = self.driver.game_ticks();
            self.metrics.on_delivery(ticks);
            self.stats
                .record_game(ticks, report.total_reward - self.game_start_reward);
        }
    }

    /// Handle keyboard events
    fn handle_event(&mut self, event: Event, tick_timer: &mut Interval) {
        if let Event::Key(key) = event {
            // Only process key press events
            if key.kind != KeyEventKind::Press {
                return;
            }

            match self.input_handler.handle_key_event(key) {
                KeyAction::Quit => {
                    self.should_quit = true;
                }
                KeyAction::TogglePause => {
                    self.paused = !self.paused;
                }
                KeyAction::Restart => {
                    self.driver.request_reset();
                    self.metrics.on_game_start();
                }
                KeyAction::Speed(setting) => {
                    self.change_speed(setting.into(), tick_timer);
                }
                // The agent drives; movement keys are ignored
                KeyAction::GameAction(_) | KeyAction::None => {}
            }
        }
    }

    /// Change the visualization speed
    fn change_speed(&mut self, new_speed: VisualizationSpeed, tick_timer: &mut Interval) {
        self.speed = new_speed;
        *tick_timer = interval(self.speed.tick_interval());
    }

    fn hud(&self) -> HudStatus {
        HudStatus {
            mode: "Watch",
            score: self.driver.score(),
            last_reward: self.driver.last_reward(),
            total_reward: self.driver.total_reward(),
            last_action: self.last_action,
            paused: self.paused,
            speed: Some(self.speed.as_str()),
            controls: ControlsHint::Watch,
            summary: Some(self.stats.format_summary()),
        }
    }

    /// Cleanup terminal state
    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}
