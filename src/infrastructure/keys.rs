use crate::domain::console::KeySource;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::collections::VecDeque;
use std::io;
use std::time::{Duration, Instant};

/// Key presses from the real terminal. Releases, mouse and resize events are
/// skipped.
#[derive(Debug, Default)]
pub struct CrosstermKeys {
    pending: Option<KeyEvent>,
}

impl CrosstermKeys {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn is_press(event: &Event) -> Option<KeyEvent> {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => Some(*key),
        _ => None,
    }
}

impl KeySource for CrosstermKeys {
    fn poll(&mut self, timeout: Duration) -> io::Result<bool> {
        if self.pending.is_some() {
            return Ok(true);
        }
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if !event::poll(remaining)? {
                return Ok(false);
            }
            if let Some(key) = is_press(&event::read()?) {
                self.pending = Some(key);
                return Ok(true);
            }
        }
    }

    fn read_key(&mut self) -> io::Result<KeyEvent> {
        if let Some(key) = self.pending.take() {
            return Ok(key);
        }
        loop {
            if let Some(key) = is_press(&event::read()?) {
                return Ok(key);
            }
        }
    }
}

/// Replays a fixed list of keys. Once empty, `poll` waits out its timeout and
/// reports nothing, and `read_key` fails with `UnexpectedEof`.
#[derive(Debug, Default)]
pub struct ScriptedKeys {
    keys: VecDeque<KeyEvent>,
}

impl ScriptedKeys {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// One key per character; `'\n'` becomes Enter and `'\x1b'` Escape.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let mut keys = Self::new();
        keys.type_text(text);
        keys
    }

    pub fn type_text(&mut self, text: &str) -> &mut Self {
        for c in text.chars() {
            let code = match c {
                '\n' => KeyCode::Enter,
                '\x1b' => KeyCode::Esc,
                '\x08' => KeyCode::Backspace,
                c => KeyCode::Char(c),
            };
            self.press(code);
        }
        self
    }

    pub fn press(&mut self, code: KeyCode) -> &mut Self {
        self.push(KeyEvent::new(code, KeyModifiers::NONE))
    }

    pub fn push(&mut self, key: KeyEvent) -> &mut Self {
        self.keys.push_back(key);
        self
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.keys.len()
    }
}

impl KeySource for ScriptedKeys {
    fn poll(&mut self, timeout: Duration) -> io::Result<bool> {
        if self.keys.is_empty() {
            std::thread::sleep(timeout);
            return Ok(false);
        }
        Ok(true)
    }

    fn read_key(&mut self) -> io::Result<KeyEvent> {
        self.keys
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "key script exhausted"))
    }
}
