use ratatui::style::Color;
use std::fmt;
use std::ops::ControlFlow;
use std::sync::Arc;

/// Result of one unit of paged output: keep going, or stop and hand a
/// [`PagerSignal`] to whoever is handling the output.
pub type Flow = ControlFlow<PagerSignal>;

pub type ActionResult = anyhow::Result<Flow>;

pub type ActionFn = Arc<dyn Fn() -> ActionResult + Send + Sync>;

#[derive(Clone)]
pub struct Command {
    pub name: String,
    pub action: ActionFn,
    pub rank: u64,
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("rank", &self.rank)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone)]
pub struct MatchResult {
    pub command: Command,
    // Character offsets into `command.name`, strictly increasing
    pub positions: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PagerSignal {
    pub words: Vec<String>,
    pub numbers: Vec<u32>,
}

impl PagerSignal {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty() && self.numbers.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportState {
    pub cursor_row: u16,
    pub cursor_col: u16,
    pub window_top: u16,
    pub buffer_height: u16,
    pub buffer_width: u16,
    pub foreground: Color,
    pub background: Color,
}
