use super::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum UiAction {
    None,
    Quit,
    Engine(InputEvent),
}

fn arrow(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::Up => Some(Key::ArrowUp),
        KeyCode::Down => Some(Key::ArrowDown),
        KeyCode::Left => Some(Key::ArrowLeft),
        KeyCode::Right => Some(Key::ArrowRight),
        _ => None,
    }
}

pub(super) fn handle_key(key: KeyEvent, state: &mut UiState, now: Instant) -> UiAction {
    if let Some(arrow) = arrow(key.code) {
        if state.no_input {
            return UiAction::None;
        }
        return handle_arrow(arrow, key.kind, state, now);
    }
    if key.kind == KeyEventKind::Release {
        return UiAction::None;
    }

    match key.code {
        KeyCode::Char('q' | 'Q') | KeyCode::Esc => return UiAction::Quit,
        KeyCode::Char('t' | 'T') => {
            state.theme = state.theme.toggled();
            return UiAction::None;
        }
        _ => {}
    }
    if state.no_input {
        return UiAction::None;
    }

    match key.code {
        KeyCode::Char(' ') => {
            state.clear_held();
            UiAction::Engine(InputEvent::DirectiveEnd)
        }
        KeyCode::Char('m' | 'M') => {
            state.clear_held();
            UiAction::Engine(InputEvent::SwitchMode(ControlMode::Manual))
        }
        KeyCode::Char('a' | 'A') => {
            state.clear_held();
            UiAction::Engine(InputEvent::SwitchMode(ControlMode::Autonomous))
        }
        _ => UiAction::None,
    }
}

fn handle_arrow(key: Key, kind: KeyEventKind, state: &mut UiState, now: Instant) -> UiAction {
    match kind {
        KeyEventKind::Press => {
            if state.press(key, now) {
                UiAction::Engine(InputEvent::Key(KeyInput::down(key)))
            } else {
                UiAction::None
            }
        }
        KeyEventKind::Repeat => UiAction::Engine(InputEvent::Key(KeyInput::repeat(key))),
        KeyEventKind::Release => {
            state.release(key);
            UiAction::Engine(InputEvent::Key(KeyInput::up(key)))
        }
    }
}
