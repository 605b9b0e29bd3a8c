use crossterm::event::KeyEvent;
use ratatui::style::Color;
use std::io;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Geometry {
    Cursor,
    WindowTop,
    BufferHeight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{what:?} {requested} outside of 0..={limit}")]
pub struct GeometryRejected {
    pub what: Geometry,
    pub requested: u16,
    pub limit: u16,
}

/// Cursor, window and scroll buffer of a character terminal.
///
/// Row coordinates are buffer rows; the visible window covers
/// `window_top()..window_top() + window_height()`. Setters reject requests
/// outside the current geometry instead of clamping them.
pub trait ConsoleBackend: Send {
    fn cursor(&self) -> (u16, u16);
    fn set_cursor(&mut self, col: u16, row: u16) -> Result<(), GeometryRejected>;

    fn window_top(&self) -> u16;
    fn set_window_top(&mut self, top: u16) -> Result<(), GeometryRejected>;
    fn window_height(&self) -> u16;

    fn buffer_height(&self) -> u16;
    // Shrinking drops rows from the top of the buffer
    fn set_buffer_height(&mut self, rows: u16) -> Result<(), GeometryRejected>;
    fn buffer_width(&self) -> u16;

    fn colors(&self) -> (Color, Color);
    fn set_colors(&mut self, foreground: Color, background: Color);

    /// Writes at the cursor with the current colors, wrapping at the buffer
    /// width and scrolling the buffer when the last row is passed.
    fn write(&mut self, text: &str);

    /// Text of one buffer row with trailing blanks removed.
    fn row_text(&self, row: u16) -> String;

    fn present(&mut self) -> io::Result<()>;
}

#[cfg_attr(test, mockall::automock)]
pub trait KeySource: Send {
    /// Waits up to `timeout` for a key press; `Duration::ZERO` only peeks.
    fn poll(&mut self, timeout: Duration) -> io::Result<bool>;
    fn read_key(&mut self) -> io::Result<KeyEvent>;
}
