use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::game::Action;

/// Playback speeds selectable with the number keys in watch mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedSetting {
    Slow,
    Normal,
    Fast,
    VeryFast,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    GameAction(Action),
    Restart,
    TogglePause,
    Speed(SpeedSetting),
    Quit,
    None,
}

pub struct InputHandler;

impl InputHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle_key_event(&self, key: KeyEvent) -> KeyAction {
        // Handle Ctrl+C
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return KeyAction::Quit;
        }

        match key.code {
            // Movement - Arrow keys
            KeyCode::Up => KeyAction::GameAction(Action::MoveUp),
            KeyCode::Down => KeyAction::GameAction(Action::MoveDown),
            KeyCode::Left => KeyAction::GameAction(Action::MoveLeft),
            KeyCode::Right => KeyAction::GameAction(Action::MoveRight),

            // Movement - WASD
            KeyCode::Char('w') | KeyCode::Char('W') => KeyAction::GameAction(Action::MoveUp),
            KeyCode::Char('s') | KeyCode::Char('S') => KeyAction::GameAction(Action::MoveDown),
            KeyCode::Char('a') | KeyCode::Char('A') => KeyAction::GameAction(Action::MoveLeft),
            KeyCode::Char('d') | KeyCode::Char('D') => KeyAction::GameAction(Action::MoveRight),

            // Passenger
            KeyCode::Char('p') | KeyCode::Char('P') => KeyAction::GameAction(Action::Pickup),
            KeyCode::Char('o') | KeyCode::Char('O') => KeyAction::GameAction(Action::Dropoff),

            // Playback
            KeyCode::Char(' ') => KeyAction::TogglePause,
            KeyCode::Char('1') => KeyAction::Speed(SpeedSetting::Slow),
            KeyCode::Char('2') => KeyAction::Speed(SpeedSetting::Normal),
            KeyCode::Char('3') => KeyAction::Speed(SpeedSetting::Fast),
            KeyCode::Char('4') => KeyAction::Speed(SpeedSetting::VeryFast),

            // Controls
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => KeyAction::Quit,
            KeyCode::Char('r') | KeyCode::Char('R') => KeyAction::Restart,

            _ => KeyAction::None,
        }
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_arrow_keys() {
        let handler = InputHandler::new();

        assert_eq!(
            handler.handle_key_event(press(KeyCode::Up)),
            KeyAction::GameAction(Action::MoveUp)
        );
        assert_eq!(
            handler.handle_key_event(press(KeyCode::Down)),
            KeyAction::GameAction(Action::MoveDown)
        );
        assert_eq!(
            handler.handle_key_event(press(KeyCode::Left)),
            KeyAction::GameAction(Action::MoveLeft)
        );
        assert_eq!(
            handler.handle_key_event(press(KeyCode::Right)),
            KeyAction::GameAction(Action::MoveRight)
        );
    }

    #[test]
    fn test_wasd_keys() {
        let handler = InputHandler::new();

        assert_eq!(
            handler.handle_key_event(press(KeyCode::Char('w'))),
            KeyAction::GameAction(Action::MoveUp)
        );
        assert_eq!(
            handler.handle_key_event(press(KeyCode::Char('a'))),
            KeyAction::GameAction(Action::MoveLeft)
        );
        assert_eq!(
            handler.handle_key_event(press(KeyCode::Char('s'))),
            KeyAction::GameAction(Action::MoveDown)
        );
        assert_eq!(
            handler.handle_key_event(press(KeyCode::Char('d'))),
            KeyAction::GameAction(Action::MoveRight)
        );
    }

    #[test]
    fn test_wasd_uppercase() {
        let handler = InputHandler::new();

        let w_upper = KeyEvent::new(KeyCode::Char('W'), KeyModifiers::SHIFT);
        assert_eq!(
            handler.handle_key_event(w_upper),
            KeyAction::GameAction(Action::MoveUp)
        );
    }

    #[test]
    fn test_passenger_keys() {
        let handler = InputHandler::new();

        assert_eq!(
            handler.handle_key_event(press(KeyCode::Char('p'))),
            KeyAction::GameAction(Action::Pickup)
        );
        assert_eq!(
            handler.handle_key_event(press(KeyCode::Char('O'))),
            KeyAction::GameAction(Action::Dropoff)
        );
    }

    #[test]
    fn test_playback_keys() {
        let handler = InputHandler::new();

        assert_eq!(
            handler.handle_key_event(press(KeyCode::Char(' '))),
            KeyAction::TogglePause
        );
        assert_eq!(
            handler.handle_key_event(press(KeyCode::Char('1'))),
            KeyAction::Speed(SpeedSetting::Slow)
        );
        assert_eq!(
            handler.handle_key_event(press(KeyCode::Char('4'))),
            KeyAction::Speed(SpeedSetting::VeryFast)
        );
    }

    #[test]
    fn test_quit_keys() {
        let handler = InputHandler::new();

        assert_eq!(handler.handle_key_event(press(KeyCode::Char('q'))), KeyAction::Quit);

        let q_upper = KeyEvent::new(KeyCode::Char('Q'), KeyModifiers::SHIFT);
        assert_eq!(handler.handle_key_event(q_upper), KeyAction::Quit);

        assert_eq!(handler.handle_key_event(press(KeyCode::Esc)), KeyAction::Quit);
    }

    #[test]
    fn test_restart_key() {
        let handler = InputHandler::new();

        assert_eq!(
            handler.handle_key_event(press(KeyCode::Char('r'))),
            KeyAction::Restart
        );

        let r_upper = KeyEvent::new(KeyCode::Char('R'), KeyModifiers::SHIFT);
        assert_eq!(handler.handle_key_event(r_upper), KeyAction::Restart);
    }

    #[test]
    fn test_unknown_key() {
        let handler = InputHandler::new();
        assert_eq!(
            handler.handle_key_event(press(KeyCode::Char('x'))),
            KeyAction::None
        );
    }

    #[test]
    fn test_ctrl_c() {
        let handler = InputHandler::new();

        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(handler.handle_key_event(ctrl_c), KeyAction::Quit);
    }
}
