use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::game::{Action, CellKind, EnvironmentState, Grid, Position};
use crate::metrics::GameMetrics;

/// Which key help to show in the footer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlsHint {
    Watch,
    Human,
}

/// Mode-specific values for the header and footer
#[derive(Debug, Clone)]
pub struct HudStatus {
    pub mode: &'static str,
    pub score: u32,
    pub last_reward: f64,
    pub total_reward: f64,
    pub last_action: Option<Action>,
    pub paused: bool,
    pub speed: Option<&'static str>,
    pub controls: ControlsHint,
    /// Extra status line, e.g. rolling training statistics
    pub summary: Option<String>,
}

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(
        &self,
        frame: &mut Frame,
        grid: &Grid,
        state: &EnvironmentState,
        metrics: &GameMetrics,
        hud: &HudStatus,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4), // Header
                Constraint::Min(0),    // Game area
                Constraint::Length(3), // Footer
            ])
            .split(frame.area());

        let stats = self.render_stats(chunks[0], state, metrics, hud);
        frame.render_widget(stats, chunks[0]);

        // Center the game grid horizontally
        let game_area = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(10),
                Constraint::Percentage(80),
                Constraint::Percentage(10),
            ])
            .split(chunks[1])[1];

        let board = self.render_grid(game_area, grid, state, hud);
        frame.render_widget(board, game_area);

        let controls = self.render_controls(chunks[2], hud.controls);
        frame.render_widget(controls, chunks[2]);
    }

    fn render_grid(
        &self,
        _area: Rect,
        grid: &Grid,
        state: &EnvironmentState,
        hud: &HudStatus,
    ) -> Paragraph<'_> {
        let mut lines = Vec::new();

        for row in 0..grid.rows() {
            let spans: Vec<Span> = (0..grid.cols())
                .map(|col| cell_span(grid, state, Position::new(row, col)))
                .collect();
            lines.push(Line::from(spans));
        }

        let title = if hud.paused {
            " Taxi (paused) ".to_string()
        } else {
            format!(" Taxi - {} ", hud.mode)
        };

        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .border_style(Style::default().fg(Color::White))
                    .title(title),
            )
            .alignment(Alignment::Center)
    }

    fn render_stats(
        &self,
        _area: Rect,
        state: &EnvironmentState,
        metrics: &GameMetrics,
        hud: &HudStatus,
    ) -> Paragraph<'_> {
        let label = Style::default().fg(Color::Yellow);
        let value = Style::default().fg(Color::White);

        let mut first = vec![
            Span::styled("Score: ", label),
            Span::styled(
                hud.score.to_string(),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("    "),
            Span::styled("Reward: ", label),
            Span::styled(format!("{:+}", hud.last_reward), reward_style(hud.last_reward)),
            Span::raw("    "),
            Span::styled("Total: ", label),
            Span::styled(format!("{:.0}", hud.total_reward), value),
            Span::raw("    "),
            Span::styled("Time: ", label),
            Span::styled(metrics.format_time(), value),
        ];
        if let Some(speed) = hud.speed {
            first.push(Span::raw("    "));
            first.push(Span::styled("Speed: ", label));
            first.push(Span::styled(speed, value));
        }

        let passenger = if state.carrying {
            "in taxi".to_string()
        } else {
            state.passenger.to_string()
        };
        let action = hud.last_action.map_or("-", |a| a.as_str());

        let second = vec![
            Span::styled("Ticks: ", label),
            Span::styled(metrics.game_ticks.to_string(), value),
            Span::raw("    "),
            Span::styled("Best: ", label),
            Span::styled(metrics.format_fastest(), value),
            Span::raw("    "),
            Span::styled("Action: ", label),
            Span::styled(action, value),
            Span::raw("    "),
            Span::styled("Passenger: ", label),
            Span::styled(passenger, Style::default().fg(Color::Cyan)),
            Span::raw("    "),
            Span::styled("Dropoff: ", label),
            Span::styled(state.dropoff.to_string(), Style::default().fg(Color::Magenta)),
        ];

        let mut lines = vec![Line::from(first), Line::from(second)];
        if let Some(summary) = &hud.summary {
            lines.push(Line::from(Span::styled(
                summary.clone(),
                Style::default().fg(Color::DarkGray),
            )));
        }

        Paragraph::new(lines).alignment(Alignment::Center)
    }

    fn render_controls(&self, _area: Rect, hint: ControlsHint) -> Paragraph<'_> {
        let keys = Style::default().fg(Color::Cyan);
        let quit = Style::default().fg(Color::Red);

        let text = match hint {
            ControlsHint::Watch => vec![Line::from(vec![
                Span::styled("Space", keys),
                Span::raw(" pause | "),
                Span::styled("1-4", keys),
                Span::raw(" speed | "),
                Span::styled("R", keys),
                Span::raw(" new game | "),
                Span::styled("Q", quit),
                Span::raw(" to quit"),
            ])],
            ControlsHint::Human => vec![Line::from(vec![
                Span::styled("↑↓←→", keys),
                Span::raw(" or "),
                Span::styled("WASD", keys),
                Span::raw(" to move | "),
                Span::styled("P", keys),
                Span::raw(" pickup | "),
                Span::styled("O", keys),
                Span::raw(" dropoff | "),
                Span::styled("R", keys),
                Span::raw(" new game | "),
                Span::styled("Q", quit),
                Span::raw(" to quit"),
            ])],
        };

        Paragraph::new(text).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Two-column glyph for one board cell; the taxi is drawn above everything
fn cell_span(grid: &Grid, state: &EnvironmentState, pos: Position) -> Span<'static> {
    if pos == state.taxi {
        let color = if state.carrying {
            Color::Green
        } else {
            Color::Yellow
        };
        return Span::styled(
            "■ ",
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        );
    }

    if !state.carrying && pos == state.passenger {
        return Span::styled(
            "P ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        );
    }

    if pos == state.dropoff {
        return Span::styled(
            "D ",
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        );
    }

    let wall = Style::default().fg(Color::Gray);
    match grid.cell(pos) {
        Some(CellKind::Empty) | None => {
            Span::styled(". ", Style::default().fg(Color::DarkGray))
        }
        Some(CellKind::ObstacleTop) => Span::styled("┳━", wall),
        Some(CellKind::ObstacleBottom) => Span::styled("┻━", wall),
        Some(CellKind::ObstacleLeft) => Span::styled("┏━", wall),
        Some(CellKind::ObstacleRight) => Span::styled("━┓", wall),
        Some(CellKind::ObstacleHorizontal) => Span::styled("━━", wall),
        Some(CellKind::ObstacleVertical) => Span::styled("┃ ", wall),
    }
}

fn reward_style(reward: f64) -> Style {
    let color = if reward > 0.0 {
        Color::Green
    } else if reward <= -10.0 {
        Color::Red
    } else {
        Color::White
    };
    Style::default().fg(color)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameConfig;

    fn classic() -> (Grid, EnvironmentState) {
        let grid = GameConfig::default().build_grid().unwrap();
        let state =
            EnvironmentState::new(Position::new(3, 4), Position::new(1, 1), Position::new(5, 8));
        (grid, state)
    }

    #[test]
    fn test_cell_glyphs() {
        let (grid, state) = classic();

        assert_eq!(cell_span(&grid, &state, Position::new(3, 4)).content, "■ ");
        assert_eq!(cell_span(&grid, &state, Position::new(1, 1)).content, "P ");
        assert_eq!(cell_span(&grid, &state, Position::new(5, 8)).content, "D ");
        assert_eq!(cell_span(&grid, &state, Position::new(3, 5)).content, ". ");
        assert_eq!(cell_span(&grid, &state, Position::new(0, 3)).content, "━━");
        assert_eq!(cell_span(&grid, &state, Position::new(2, 0)).content, "┃ ");
    }

    #[test]
    fn test_carried_passenger_not_drawn() {
        let (grid, mut state) = classic();
        state.carrying = true;
        state.taxi = Position::new(2, 2);

        assert_eq!(cell_span(&grid, &state, Position::new(1, 1)).content, ". ");
        assert_eq!(
            cell_span(&grid, &state, Position::new(2, 2)).style.fg,
            Some(Color::Green)
        );
    }

    #[test]
    fn test_reward_colors() {
        assert_eq!(reward_style(20.0).fg, Some(Color::Green));
        assert_eq!(reward_style(-1.0).fg, Some(Color::White));
        assert_eq!(reward_style(-10.0).fg, Some(Color::Red));
    }
}
