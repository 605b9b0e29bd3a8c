use super::scrollback_console::ScrollbackConsole;
use anyhow::Result;
use crossterm::{
    cursor, execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};

pub type StdoutConsole = ScrollbackConsole<CrosstermBackend<Stdout>>;

/// Puts stdout into raw mode on the alternate screen and wraps it in a
/// scroll buffer. Pair with [`leave`].
pub fn enter() -> Result<StdoutConsole> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    Ok(ScrollbackConsole::new(terminal)?)
}

pub fn leave() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, cursor::Show)?;
    Ok(())
}
