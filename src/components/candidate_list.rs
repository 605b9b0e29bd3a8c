use crate::app::selector::state::SelectorState;
use crate::app::surface::TerminalSurface;
use crate::domain::console::KeySource;
use crate::domain::models::MatchResult;
use crate::theme::Theme;

use ratatui::text::{Line, Span};
use std::io;
use std::time::Duration;

pub const MARKER: &str = "\u{bb}";

/// First visible candidate: keeps `selected` near the middle of `rows`
/// without scrolling past either end of the list.
#[must_use]
pub fn scroll_offset(selected: usize, count: usize, rows: usize) -> usize {
    selected
        .saturating_sub(rows / 2)
        .min(count.saturating_sub(rows))
}

/// One candidate name, at most `width` characters, with matched characters
/// picked out.
#[must_use]
pub fn candidate_line(result: &MatchResult, theme: &Theme, width: usize) -> Line<'static> {
    let mut spans = Vec::new();
    let mut run = String::new();
    let mut run_matched = false;

    for (i, c) in result.command.name.chars().take(width).enumerate() {
        let matched = result.positions.binary_search(&i).is_ok();
        if matched != run_matched && !run.is_empty() {
            spans.push(styled(std::mem::take(&mut run), run_matched, theme));
        }
        run_matched = matched;
        run.push(c);
    }
    if !run.is_empty() {
        spans.push(styled(run, run_matched, theme));
    }
    Line::from(spans)
}

fn styled(text: String, matched: bool, theme: &Theme) -> Span<'static> {
    let style = if matched { theme.matched } else { theme.unmatched };
    Span::styled(text, style)
}

/// Draws the candidate list from `origin_row` over one window, marking the
/// selected row. Stops drawing rows as soon as another key is waiting.
pub fn render(
    surface: &mut TerminalSurface,
    origin_row: u16,
    state: &SelectorState,
    theme: &Theme,
    keys: &mut dyn KeySource,
) -> io::Result<()> {
    surface.move_to(0, origin_row);
    surface.clear_region(theme.list, None);

    let rows = usize::from(surface.window_height().saturating_sub(1));
    // Column 0 holds the marker and the last column stays free
    let width = usize::from(surface.buffer_width()).saturating_sub(2);
    let skip = scroll_offset(state.selected, state.matches.len(), rows);

    for (i, result) in state.matches.iter().skip(skip).take(rows).enumerate() {
        if keys.poll(Duration::ZERO)? {
            break;
        }
        let row = origin_row.saturating_add(u16::try_from(i).unwrap_or(u16::MAX));
        surface.move_to(1, row);
        for span in &candidate_line(result, theme, width).spans {
            surface.write_span(span);
        }
    }

    if !state.matches.is_empty() {
        let offset = u16::try_from(state.selected - skip).unwrap_or(0);
        let marker_row = origin_row.saturating_add(offset);
        surface.move_to(0, marker_row);
        surface.write_styled(MARKER, theme.marker);
        surface.move_to(0, marker_row);
    }
    surface.present()
}
