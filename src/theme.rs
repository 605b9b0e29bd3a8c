use ratatui::style::{Color, Style};

// Only foreground and background are carried to the terminal
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub text: Style,
    pub launcher: Style,
    pub list: Style,
    pub unmatched: Style,
    pub matched: Style,
    pub marker: Style,
    pub no_match: Style,
    pub executed: Style,
    pub fault: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            text: Style::default().fg(Color::Gray).bg(Color::Black),
            launcher: Style::default().fg(Color::White).bg(Color::Green),
            list: Style::default().fg(Color::Gray).bg(Color::Blue),
            unmatched: Style::default().fg(Color::LightBlue),
            matched: Style::default().fg(Color::White),
            marker: Style::default().fg(Color::Red),
            no_match: Style::default().fg(Color::Yellow).bg(Color::Red),
            executed: Style::default().fg(Color::Green),
            fault: Style::default().fg(Color::LightRed),
        }
    }
}
