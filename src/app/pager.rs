use super::config::LauncherConfig;
use super::log::FaultLog;
use super::screen::ScreenGuard;
use super::scrollback::{is_scroll_key, scroll_idle};
use super::surface::TerminalSurface;
use crate::domain::console::KeySource;
use crate::domain::models::{Flow, PagerSignal};
use crate::error::LauncherError;
use crate::theme::Theme;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::fmt::Display;
use std::io;
use std::ops::ControlFlow;
use std::time::Duration;

// Widest range accepted in a response
const MAX_RANGE_SPAN: u32 = 10_000;

/// Output with page breaks. Holds the screen for as long as it lives; every
/// written line is a tick and output loops stop as soon as a tick breaks:
///
/// ```ignore
/// let mut pager = screen.pager();
/// for line in lines {
///     pager.write_line(line)?;
/// }
/// ```
pub struct Pager<'a> {
    guard: ScreenGuard<'a>,
    config: &'a LauncherConfig,
    theme: &'a Theme,
    log: &'a FaultLog,
}

enum Response {
    Line(String),
    Escaped,
}

impl<'a> Pager<'a> {
    pub(crate) fn new(
        guard: ScreenGuard<'a>,
        config: &'a LauncherConfig,
        theme: &'a Theme,
        log: &'a FaultLog,
    ) -> Self {
        Self {
            guard,
            config,
            theme,
            log,
        }
    }

    pub fn surface(&mut self) -> &mut TerminalSurface {
        &mut self.guard.surface
    }

    pub fn write_line(&mut self, text: &str) -> Flow {
        self.guard.surface.write_line(text);
        self.tick(false)
    }

    /// Counts one unit of output and pauses when a key is waiting, when a
    /// window's worth has gone by, or when `force` is set.
    pub fn tick(&mut self, force: bool) -> Flow {
        let (surface, keys) = self.guard.split();
        surface.page_ticks += 1;
        let page = usize::from(surface.window_height().saturating_sub(2));
        let full = surface.page_ticks > page;

        let pending = match keys.poll(Duration::ZERO) {
            Ok(pending) => pending,
            Err(err) => {
                self.log.log("pager poll failed", Some(&err.into()));
                false
            }
        };

        if force || pending || full {
            self.pause(force)
        } else {
            ControlFlow::Continue(())
        }
    }

    fn pause(&mut self, force: bool) -> Flow {
        let inconclusive = || {
            if force {
                ControlFlow::Break(PagerSignal::default())
            } else {
                ControlFlow::Continue(())
            }
        };

        loop {
            let line = match self.read_response() {
                Ok(Response::Line(line)) => line,
                Ok(Response::Escaped) => {
                    self.next_page(false);
                    return inconclusive();
                }
                Err(err) => {
                    self.log.log("pager input failed", Some(&err.into()));
                    self.next_page(false);
                    return inconclusive();
                }
            };

            self.next_page(!line.is_empty());
            if line.trim().is_empty() {
                return inconclusive();
            }
            match parse_response(&line) {
                Ok(signal) => return ControlFlow::Break(signal),
                Err(fault) => {
                    self.log.report("pager response ignored", fault);
                    if !force {
                        return ControlFlow::Continue(());
                    }
                }
            }
        }
    }

    fn read_response(&mut self) -> io::Result<Response> {
        let config = self.config;
        let idle = config.idle_poll();
        let max_idle = config.max_idle_polls;
        let indicator = config.pager_indicator.as_str();
        let (surface, keys) = self.guard.split();

        let row = surface.cursor_row();
        surface.write_right_aligned(row, indicator);
        surface.scroll_to_show(row);
        surface.present()?;

        let mut line = String::new();
        let mut carried: Option<KeyEvent> = None;
        loop {
            let key = match carried.take() {
                Some(key) => key,
                None => keys.read_key()?,
            };
            if key.kind == KeyEventKind::Release {
                continue;
            }
            match key.code {
                KeyCode::Enter => return Ok(Response::Line(line)),
                KeyCode::Esc => return Ok(Response::Escaped),
                KeyCode::Delete => line.clear(),
                KeyCode::Backspace => {
                    line.pop();
                }
                KeyCode::Char(c)
                    if !key
                        .modifiers
                        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
                {
                    line.push(c);
                }
                _ if is_scroll_key(&key) => {
                    carried = scroll_idle(surface, keys, key, idle, max_idle)?;
                }
                _ => {}
            }
            echo(surface, row, &line, indicator);
            surface.present()?;
        }
    }

    /// Leaves the prompt row and starts a fresh page; a non-empty response
    /// stays on screen.
    fn next_page(&mut self, keep_response: bool) {
        let surface = &mut self.guard.surface;
        if keep_response {
            let col = surface.cursor_col();
            let row = surface.cursor_row();
            let width = usize::from(surface.buffer_width().saturating_sub(1));
            surface.move_to(col, row);
            surface.write(&" ".repeat(width.saturating_sub(usize::from(col))));
            surface.move_to(col, row);
            surface.write("\n");
        }
        let style = surface.style();
        surface.clear_region(style, None);
    }

    /// Prints `items` numbered from 1 and asks for one of them. Returns the
    /// zero-based index, or `None` for an empty or wordy response.
    pub fn choose<T: Display>(&mut self, items: &[T]) -> Option<usize> {
        let mut flow = self.print_numbered(items);
        loop {
            let signal = match flow {
                ControlFlow::Break(signal) => signal,
                ControlFlow::Continue(()) => match self.tick(true) {
                    ControlFlow::Break(signal) => signal,
                    ControlFlow::Continue(()) => return None,
                },
            };
            let choice = *signal.numbers.first()?;
            match usize::try_from(choice) {
                Ok(n) if (1..=items.len()).contains(&n) => return Some(n - 1),
                _ => {}
            }

            let fault = LauncherError::SelectionOutOfRange {
                choice,
                count: items.len(),
            };
            let fault_style = self.theme.fault;
            self.guard
                .surface
                .write_styled(&format!("{fault}\n"), fault_style);
            self.log.report("selection ignored", fault);
            flow = ControlFlow::Continue(());
        }
    }

    fn print_numbered<T: Display>(&mut self, items: &[T]) -> Flow {
        for (i, item) in items.iter().enumerate() {
            self.write_line(&format!("{:>3} {item}", i + 1))?;
        }
        ControlFlow::Continue(())
    }
}

fn echo(surface: &mut TerminalSurface, row: u16, line: &str, indicator: &str) {
    let room = usize::from(surface.buffer_width())
        .saturating_sub(indicator.chars().count() + 2)
        .max(1);
    let skip = line.chars().count().saturating_sub(room);
    let shown: String = line.chars().skip(skip).collect();
    surface.move_to(0, row);
    surface.write(&format!("{shown:<room$}"));
    let col = u16::try_from(shown.chars().count()).unwrap_or(u16::MAX);
    surface.move_to(col, row);
}

fn parse_number(text: &str) -> Option<u32> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Parses a pager response: tokens separated by commas and/or whitespace,
/// each a word, a number, or a range `a-b` expanded in ascending order.
pub fn parse_response(response: &str) -> Result<PagerSignal, LauncherError> {
    let mut signal = PagerSignal::default();
    let tokens = response
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty());

    for token in tokens {
        let unparsable = || LauncherError::UnparsableResponse {
            token: token.to_string(),
        };
        if token.chars().all(char::is_alphabetic) {
            signal.words.push(token.to_string());
        } else if let Some((from, to)) = token.split_once('-') {
            let from = parse_number(from).ok_or_else(unparsable)?;
            let to = parse_number(to).ok_or_else(unparsable)?;
            let (low, high) = (from.min(to), from.max(to));
            if high - low > MAX_RANGE_SPAN {
                return Err(unparsable());
            }
            signal.numbers.extend(low..=high);
        } else {
            signal.numbers.push(parse_number(token).ok_or_else(unparsable)?);
        }
    }
    Ok(signal)
}
