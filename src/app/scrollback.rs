use super::surface::TerminalSurface;
use crate::domain::console::KeySource;
use crossterm::event::{KeyCode, KeyEvent};
use std::io;
use std::time::Duration;

#[must_use]
pub fn is_scroll_key(key: &KeyEvent) -> bool {
    matches!(
        key.code,
        KeyCode::Up | KeyCode::Down | KeyCode::PageUp | KeyCode::PageDown
    )
}

fn step(surface: &TerminalSurface, code: KeyCode, row: u16) -> u16 {
    let last = surface.buffer_height().saturating_sub(1);
    let half = (surface.window_height() / 2).max(1);
    match code {
        KeyCode::Up => row.saturating_sub(1),
        KeyCode::Down => (row + 1).min(last),
        KeyCode::PageUp if row > half => row - half,
        KeyCode::PageDown if row < last.saturating_sub(half) => row + half,
        _ => row,
    }
}

/// Moves through the scroll buffer with Up/Down/PageUp/PageDown, starting
/// with `first`. Ends when another key is pressed or after `max_idle_polls`
/// polls of `idle_poll` without a key; the cursor and window are then put
/// back where they were. Returns the key that ended the scrolling, if any.
pub fn scroll_idle(
    surface: &mut TerminalSurface,
    keys: &mut dyn KeySource,
    first: KeyEvent,
    idle_poll: Duration,
    max_idle_polls: u32,
) -> io::Result<Option<KeyEvent>> {
    let home_row = surface.cursor_row();
    let home_top = surface.window_top();
    let mut row = home_row;
    let mut key = first;

    let ended_by = loop {
        if !is_scroll_key(&key) {
            break Some(key);
        }
        row = step(surface, key.code, row);
        surface.move_to(0, row);
        surface.scroll_to_show(row);
        surface.present()?;

        let mut next = None;
        for _ in 0..max_idle_polls {
            if keys.poll(idle_poll)? {
                next = Some(keys.read_key()?);
                break;
            }
        }
        match next {
            Some(k) => key = k,
            None => break None,
        }
    };

    tracing::debug!(?ended_by, "idle scrollback finished");
    surface.move_to(0, home_row);
    surface.set_window_top(home_top);
    surface.present()?;
    Ok(ended_by)
}
