use crate::domain::models::{Command, MatchResult};

fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// Greedy, left-to-right subsequence search of `needle` in `haystack`,
/// ignoring case.
///
/// Every needle character takes the first occurrence after the previous
/// match and is never reconsidered, so `"ab"` against `"aab"` always uses the
/// first `'a'`. When a character cannot be found the positions collected so
/// far are returned; callers compare the length with the needle's character
/// count to decide whether the candidate matched.
#[must_use]
pub fn match_positions(haystack: &str, needle: &str) -> Vec<usize> {
    let mut positions = Vec::with_capacity(needle.len());
    let mut hay = haystack.chars().map(fold).enumerate();
    for wanted in needle.chars().map(fold) {
        match hay.find(|&(_, c)| c == wanted) {
            Some((pos, _)) => positions.push(pos),
            None => break,
        }
    }
    positions
}

#[must_use]
pub fn is_match(haystack: &str, needle: &str) -> bool {
    match_positions(haystack, needle).len() == needle.chars().count()
}

/// Keeps the commands whose names contain `query` as a subsequence, in the
/// order of `commands`. An empty query keeps everything.
#[must_use]
pub fn filter(commands: &[Command], query: &str) -> Vec<MatchResult> {
    let wanted = query.chars().count();
    commands
        .iter()
        .filter_map(|command| {
            let positions = match_positions(&command.name, query);
            (positions.len() == wanted).then(|| MatchResult {
                command: command.clone(),
                positions,
            })
        })
        .collect()
}
