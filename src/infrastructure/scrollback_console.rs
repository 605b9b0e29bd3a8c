use crate::domain::console::{ConsoleBackend, Geometry, GeometryRejected};
use ratatui::backend::Backend;
use ratatui::buffer::Cell;
use ratatui::layout::Position;
use ratatui::style::Color;
use ratatui::Terminal;
use std::collections::VecDeque;
use std::io;

pub const MAX_BUFFER_ROWS: u16 = i16::MAX as u16;

/// A scroll buffer taller than the screen, shown one window at a time
/// through a ratatui [`Terminal`].
pub struct ScrollbackConsole<B: Backend> {
    terminal: Terminal<B>,
    rows: VecDeque<Vec<Cell>>,
    width: u16,
    window_height: u16,
    window_top: u16,
    cursor_col: u16,
    cursor_row: u16,
    fg: Color,
    bg: Color,
}

impl<B: Backend> ScrollbackConsole<B> {
    pub fn new(terminal: Terminal<B>) -> io::Result<Self> {
        let height = terminal.size()?.height;
        Self::with_buffer_height(terminal, height.saturating_mul(2))
    }

    pub fn with_buffer_height(terminal: Terminal<B>, rows: u16) -> io::Result<Self> {
        let size = terminal.size()?;
        let width = size.width.max(1);
        let window_height = size.height.max(1);
        let rows = rows.clamp(window_height, MAX_BUFFER_ROWS);
        let mut console = Self {
            terminal,
            rows: VecDeque::with_capacity(usize::from(rows)),
            width,
            window_height,
            window_top: 0,
            cursor_col: 0,
            cursor_row: 0,
            fg: Color::Reset,
            bg: Color::Reset,
        };
        for _ in 0..rows {
            let row = console.blank_row();
            console.rows.push_back(row);
        }
        Ok(console)
    }

    #[must_use]
    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }

    #[must_use]
    pub fn cell(&self, col: u16, row: u16) -> Option<&Cell> {
        self.rows.get(usize::from(row))?.get(usize::from(col))
    }

    fn blank_row(&self) -> Vec<Cell> {
        let mut cell = Cell::default();
        cell.set_fg(self.fg).set_bg(self.bg);
        vec![cell; usize::from(self.width)]
    }

    fn rows_len(&self) -> u16 {
        u16::try_from(self.rows.len()).unwrap_or(MAX_BUFFER_ROWS)
    }

    fn newline(&mut self) {
        self.cursor_col = 0;
        if self.cursor_row + 1 < self.rows_len() {
            self.cursor_row += 1;
        } else {
            // Oldest row falls out of the buffer
            self.rows.pop_front();
            let row = self.blank_row();
            self.rows.push_back(row);
        }
    }

    fn put(&mut self, ch: char) {
        let (fg, bg) = (self.fg, self.bg);
        if let Some(cell) = self
            .rows
            .get_mut(usize::from(self.cursor_row))
            .and_then(|row| row.get_mut(usize::from(self.cursor_col)))
        {
            cell.set_char(ch).set_fg(fg).set_bg(bg);
        }
        self.cursor_col += 1;
        if self.cursor_col >= self.width {
            self.newline();
        }
    }
}

impl<B: Backend + Send> ConsoleBackend for ScrollbackConsole<B> {
    fn cursor(&self) -> (u16, u16) {
        (self.cursor_col, self.cursor_row)
    }

    fn set_cursor(&mut self, col: u16, row: u16) -> Result<(), GeometryRejected> {
        if col >= self.width {
            return Err(GeometryRejected {
                what: Geometry::Cursor,
                requested: col,
                limit: self.width - 1,
            });
        }
        if row >= self.rows_len() {
            return Err(GeometryRejected {
                what: Geometry::Cursor,
                requested: row,
                limit: self.rows_len() - 1,
            });
        }
        self.cursor_col = col;
        self.cursor_row = row;
        Ok(())
    }

    fn window_top(&self) -> u16 {
        self.window_top
    }

    fn set_window_top(&mut self, top: u16) -> Result<(), GeometryRejected> {
        let limit = self.rows_len() - self.window_height;
        if top > limit {
            return Err(GeometryRejected {
                what: Geometry::WindowTop,
                requested: top,
                limit,
            });
        }
        self.window_top = top;
        Ok(())
    }

    fn window_height(&self) -> u16 {
        self.window_height
    }

    fn buffer_height(&self) -> u16 {
        self.rows_len()
    }

    fn set_buffer_height(&mut self, rows: u16) -> Result<(), GeometryRejected> {
        if rows < self.window_height || rows > MAX_BUFFER_ROWS {
            return Err(GeometryRejected {
                what: Geometry::BufferHeight,
                requested: rows,
                limit: MAX_BUFFER_ROWS,
            });
        }
        let current = self.rows_len();
        if rows > current {
            for _ in current..rows {
                let row = self.blank_row();
                self.rows.push_back(row);
            }
        } else if rows < current {
            let dropped = current - rows;
            self.rows.drain(..usize::from(dropped));
            self.cursor_row = self.cursor_row.saturating_sub(dropped);
            self.window_top = self
                .window_top
                .saturating_sub(dropped)
                .min(rows - self.window_height);
        }
        Ok(())
    }

    fn buffer_width(&self) -> u16 {
        self.width
    }

    fn colors(&self) -> (Color, Color) {
        (self.fg, self.bg)
    }

    fn set_colors(&mut self, foreground: Color, background: Color) {
        self.fg = foreground;
        self.bg = background;
    }

    fn write(&mut self, text: &str) {
        for ch in text.chars() {
            match ch {
                '\n' => self.newline(),
                '\r' => self.cursor_col = 0,
                '\t' => self.put(' '),
                c if c.is_control() => {}
                c => self.put(c),
            }
        }
    }

    fn row_text(&self, row: u16) -> String {
        self.rows
            .get(usize::from(row))
            .map(|cells| cells.iter().map(Cell::symbol).collect::<String>())
            .unwrap_or_default()
            .trim_end()
            .to_string()
    }

    fn present(&mut self) -> io::Result<()> {
        let rows = &self.rows;
        let top = usize::from(self.window_top);
        let cursor = (self.cursor_row >= self.window_top
            && self.cursor_row < self.window_top + self.window_height)
            .then(|| Position::new(self.cursor_col, self.cursor_row - self.window_top));

        self.terminal.draw(|frame| {
            let area = frame.area();
            let buf = frame.buffer_mut();
            for y in 0..area.height {
                let Some(row) = rows.get(top + usize::from(y)) else {
                    break;
                };
                for (x, cell) in row.iter().take(usize::from(area.width)).enumerate() {
                    buf[(area.x + x as u16, area.y + y)] = cell.clone();
                }
            }
            if let Some(position) = cursor {
                frame.set_cursor_position(position);
            }
        })?;
        Ok(())
    }
}
