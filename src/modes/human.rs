use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{Stderr, stderr};
use std::time::Duration;
use tokio::time::interval;

use crate::config::TaxiConfig;
use crate::game::Action;
use crate::input::{InputHandler, KeyAction};
use crate::metrics::GameMetrics;
use crate::render::{ControlsHint, HudStatus, Renderer};
use crate::rl::EpisodeDriver;

/// Drive the taxi by hand; no learning happens in this mode
pub struct HumanMode {
    driver: EpisodeDriver,
    metrics: GameMetrics,
    renderer: Renderer,
    input_handler: InputHandler,
    should_quit: bool,
    pending_action: Option<Action>,
    last_action: Option<Action>,
}

impl HumanMode {
    pub fn new(config: &TaxiConfig) -> Result<Self> {
        let driver = EpisodeDriver::new(config).context("Failed to start the game")?;

        Ok(Self {
            driver,
            metrics: GameMetrics::new(),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            should_quit: false,
            pending_action: None,
            last_action: None,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        // Run game loop with cleanup
        let result = self.run_game_loop(&mut terminal).await;

        // Cleanup terminal
        self.cleanup_terminal(&mut terminal)?;

        result
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();

        // Game ticks at 8 Hz (125ms per tick)
        let tick_interval = Duration::from_millis(125);
        let mut tick_timer = interval(tick_interval);

        // Render at 30 FPS (33ms per frame)
        let render_interval = Duration::from_millis(33);
        let mut render_timer = interval(render_interval);

        loop {
            tokio::select! {
                // Handle terminal events
                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        self.handle_event(event);
                    }
                }

                // Apply at most one queued key per tick
                _ = tick_timer.tick() => {
                    self.update_game();
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

                // Handle Ctrl+C
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

    fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            // Only process key press events, not release
            if key.kind != KeyEventKind::Press {
                return;
            }

            match self.input_handler.handle_key_event(key) {
                KeyAction::GameAction(action) => {
                    self.pending_action = Some(action);
                }
                KeyAction::Restart => {
                    self.reset_game();
                }
                KeyAction::Quit => {
                    self.should_quit = true;
                }
                KeyAction::TogglePause | KeyAction::Speed(_) | KeyAction::None => {}
            }
        }
    }

    fn update_game(&mut self) {
        let Some(action) = self.pending_action.take() else {
            return;
        };

        let new_game = self.driver.reset_pending();
        let report = self.driver.manual_step(action);
        if new_game {
            self.metrics.on_game_start();
        }
        self.metrics.on_tick();
        self.last_action = Some(action);

        if report.game_over {
            self.metrics.on_delivery(self.driver.game_ticks());
        }
    }

    fn reset_game(&mut self) {
        self.driver.request_reset();
        self.pending_action = None;
        self.last_action = None;
        self.metrics.on_game_start();
    }

    fn hud(&self) -> HudStatus {
        HudStatus {
            mode: "Human",
            score: self.driver.score(),
            last_reward: self.driver.last_reward(),
            total_reward: self.driver.total_reward(),
            last_action: self.last_action,
            paused: false,
            speed: None,
            controls: ControlsHint::Human,
            summary: None,
        }
    }

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
