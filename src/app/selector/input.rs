use super::action::Action;
use crate::app::config::LauncherConfig;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

pub fn map_key(key: &KeyEvent, config: &LauncherConfig) -> Option<Action> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    if key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
    {
        return match key.code {
            KeyCode::Char('l') => Some(Action::Refresh),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Char(c) if config.accepts(c) => Some(Action::Type(c)),
        KeyCode::Backspace => Some(Action::Backspace),
        KeyCode::Down => Some(Action::SelectNext),
        KeyCode::Up => Some(Action::SelectPrev),
        KeyCode::Home => Some(Action::SelectFirst),
        KeyCode::Enter => Some(Action::Confirm),
        KeyCode::Esc => Some(Action::Cancel),
        _ => None,
    }
}
