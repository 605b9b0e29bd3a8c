use super::log::FaultLog;
use crate::domain::console::{ConsoleBackend, GeometryRejected};
use crate::domain::models::ViewportState;
use crate::error::LauncherError;
use ratatui::style::Style;
use ratatui::text::Span;
use std::io;
use std::ops::{Deref, DerefMut};

/// Viewport and scroll buffer bookkeeping on top of a [`ConsoleBackend`].
pub struct TerminalSurface {
    console: Box<dyn ConsoleBackend>,
    buffer_cap: u16,
    log: FaultLog,
    // Output units since the last page break, read by the pager
    pub(crate) page_ticks: usize,
}

impl TerminalSurface {
    pub fn new(console: Box<dyn ConsoleBackend>, buffer_cap: u16, log: FaultLog) -> Self {
        Self {
            console,
            buffer_cap,
            log,
            page_ticks: 0,
        }
    }

    // --- Geometry ---

    #[must_use]
    pub fn cursor_row(&self) -> u16 {
        self.console.cursor().1
    }

    #[must_use]
    pub fn cursor_col(&self) -> u16 {
        self.console.cursor().0
    }

    #[must_use]
    pub fn window_top(&self) -> u16 {
        self.console.window_top()
    }

    #[must_use]
    pub fn window_height(&self) -> u16 {
        self.console.window_height()
    }

    #[must_use]
    pub fn buffer_height(&self) -> u16 {
        self.console.buffer_height()
    }

    #[must_use]
    pub fn buffer_width(&self) -> u16 {
        self.console.buffer_width()
    }

    #[must_use]
    pub fn console(&self) -> &dyn ConsoleBackend {
        self.console.as_ref()
    }

    // --- Output ---

    pub fn write(&mut self, text: &str) {
        self.console.write(text);
    }

    pub fn write_line(&mut self, text: &str) {
        self.console.write(text);
        self.console.write("\n");
    }

    #[must_use]
    pub fn style(&self) -> Style {
        let (fg, bg) = self.console.colors();
        Style::default().fg(fg).bg(bg)
    }

    pub fn set_style(&mut self, style: Style) {
        let (fg, bg) = self.console.colors();
        self.console
            .set_colors(style.fg.unwrap_or(fg), style.bg.unwrap_or(bg));
    }

    pub fn write_styled(&mut self, text: &str, style: Style) {
        let previous = self.style();
        self.set_style(style);
        self.console.write(text);
        self.set_style(previous);
    }

    pub fn write_span(&mut self, span: &Span<'_>) {
        self.write_styled(&span.content, span.style);
    }

    /// Moves the cursor, clamping to the buffer.
    pub fn move_to(&mut self, col: u16, row: u16) {
        let col = col.min(self.buffer_width().saturating_sub(1));
        let row = row.min(self.buffer_height().saturating_sub(1));
        if let Err(rejected) = self.console.set_cursor(col, row) {
            self.log.report("cursor move abandoned", rejected.into());
        }
    }

    /// Writes `text` right-aligned on `row` and puts the cursor back.
    pub fn write_right_aligned(&mut self, row: u16, text: &str) {
        let (col, cursor_row) = self.console.cursor();
        // Writing into the last column would wrap the cursor onto the next row
        let room = self.buffer_width().saturating_sub(1);
        let text: String = text.chars().take(usize::from(room)).collect();
        let len = u16::try_from(text.chars().count()).unwrap_or(room);
        self.move_to(room - len, row);
        self.console.write(&text);
        self.move_to(col, cursor_row);
    }

    pub fn present(&mut self) -> io::Result<()> {
        self.console.present()
    }

    // --- Viewport ---

    /// Runs a geometry change; if the terminal rejects it, grows the buffer
    /// by one window height and tries once more.
    fn with_growth_retry(
        &mut self,
        what: &str,
        mut change: impl FnMut(&mut dyn ConsoleBackend) -> Result<(), GeometryRejected>,
    ) -> bool {
        let first = match change(self.console.as_mut()) {
            Ok(()) => return true,
            Err(rejected) => rejected,
        };
        tracing::debug!(%first, "{what} rejected, growing buffer");

        let grown = self
            .buffer_height()
            .saturating_add(self.window_height());
        let retried = self
            .console
            .set_buffer_height(grown)
            .and_then(|()| change(self.console.as_mut()));
        match retried {
            Ok(()) => true,
            Err(rejected) => {
                self.log
                    .report(&format!("{what} abandoned"), LauncherError::GeometryRejected(rejected));
                false
            }
        }
    }

    pub fn set_window_top(&mut self, top: u16) -> bool {
        self.with_growth_retry("window move", |console| console.set_window_top(top))
    }

    /// Moves the window as little as possible so that buffer `row` is visible.
    pub fn scroll_to_show(&mut self, row: u16) {
        let height = self.window_height();
        let max_top = self.buffer_height().saturating_sub(height);
        let row = row.min(self.buffer_height().saturating_sub(1));
        let top = self.window_top();

        let new_top = if row < top {
            row
        } else if row >= top.saturating_add(height) {
            row + 1 - height
        } else {
            top
        };
        let new_top = new_top.min(max_top);
        if new_top != top {
            self.set_window_top(new_top);
        }
    }

    /// Keeps the buffer between one window height and the configured cap:
    /// compacts from the top when above the cap, and grows by a window height
    /// when the cursor gets within one window of the end.
    pub fn ensure_capacity(&mut self) {
        let height = self.window_height();
        let rows = self.buffer_height();
        let cap = self.buffer_cap.max(height);

        if rows > cap {
            if let Err(rejected) = self.console.set_buffer_height(cap) {
                self.log.report("buffer compaction abandoned", rejected.into());
            }
            return;
        }

        if self.cursor_row().saturating_add(height) >= rows && rows < cap {
            let target = rows.saturating_add(height).min(cap);
            if let Err(rejected) = self.console.set_buffer_height(target) {
                self.log.report("buffer growth abandoned", rejected.into());
            }
        }
    }

    /// Blanks a window-sized region starting at the cursor row and leaves the
    /// cursor at the start of that region, at the same relative position in
    /// the window as before. `indicator` goes right-aligned on the region's
    /// last row.
    pub fn clear_region(&mut self, style: Style, indicator: Option<&str>) {
        self.ensure_capacity();
        self.set_style(style);

        let height = self.window_height();
        let pos_in_window = self.cursor_row().saturating_sub(self.window_top());
        let row = self.cursor_row();
        self.move_to(0, row);

        let blank = " ".repeat(usize::from(self.buffer_width()) * usize::from(height));
        // Writing may scroll the buffer, so the region is found from where the cursor ends up
        self.console.write(&blank);
        let start = self.cursor_row().saturating_sub(height);
        self.move_to(0, start);

        if let Some(indicator) = indicator {
            self.write_right_aligned(start + height - 1, indicator);
        }

        self.page_ticks = 0;
        self.set_window_top(start.saturating_sub(pos_in_window));
    }

    // --- Saved state ---

    #[must_use]
    pub fn save_state(&self) -> ViewportState {
        let (cursor_col, cursor_row) = self.console.cursor();
        let (foreground, background) = self.console.colors();
        ViewportState {
            cursor_row,
            cursor_col,
            window_top: self.window_top(),
            buffer_height: self.buffer_height(),
            buffer_width: self.buffer_width(),
            foreground,
            background,
        }
    }

    pub fn restore_state(&mut self, state: &ViewportState) {
        self.console.set_colors(state.foreground, state.background);
        self.move_to(state.cursor_col, state.cursor_row);
        let max_top = self.buffer_height().saturating_sub(self.window_height());
        self.set_window_top(state.window_top.min(max_top));
    }

    /// Saves the viewport now and restores it when the session is dropped.
    pub fn session(&mut self) -> RenderSession<'_> {
        let saved = self.save_state();
        RenderSession {
            surface: self,
            saved,
        }
    }
}

pub struct RenderSession<'a> {
    surface: &'a mut TerminalSurface,
    saved: ViewportState,
}

impl RenderSession<'_> {
    #[must_use]
    pub fn saved(&self) -> &ViewportState {
        &self.saved
    }
}

impl Deref for RenderSession<'_> {
    type Target = TerminalSurface;
    fn deref(&self) -> &Self::Target {
        self.surface
    }
}

impl DerefMut for RenderSession<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.surface
    }
}

impl Drop for RenderSession<'_> {
    fn drop(&mut self) {
        self.surface.restore_state(&self.saved);
    }
}
