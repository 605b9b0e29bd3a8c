use crate::domain::models::MatchResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Idle,
    Filtering,
    Displaying,
    Executing,
}

#[derive(Debug, Clone, Default)]
pub struct SelectorState {
    pub mode: Mode,
    pub query: String,
    pub matches: Vec<MatchResult>,
    pub selected: usize,
}

impl SelectorState {
    #[must_use]
    pub fn selected_match(&self) -> Option<&MatchResult> {
        self.matches.get(self.selected)
    }

    /// Back to the idle prompt, forgetting the query.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
