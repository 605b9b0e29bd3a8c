#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // --- Query editing ---
    Type(char),
    Backspace,

    // --- Navigation ---
    SelectNext,
    SelectPrev,
    SelectFirst,

    // --- Outcome ---
    Confirm,
    Cancel,

    // Redraw without changing anything
    Refresh,
}
