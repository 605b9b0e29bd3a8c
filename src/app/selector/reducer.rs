use super::action::Action;
use super::state::{Mode, SelectorState};
use crate::app::registry::Registry;
use crate::domain::matcher::filter;
use crate::domain::models::Command;

#[derive(Debug, Clone)]
pub enum Effect {
    Render,
    // Query that matched nothing; the query itself has been reset
    NoMatch(String),
    Execute(Command),
    Cancel,
}

pub fn update(state: &mut SelectorState, action: Action, registry: &Registry) -> Effect {
    match action {
        // --- Query editing ---
        Action::Type(c) => {
            state.query.push(c);
            refilter(state, registry)
        }
        Action::Backspace => {
            state.query.pop();
            refilter(state, registry)
        }

        // --- Navigation ---
        Action::SelectNext => {
            ensure_matches(state, registry);
            let last = state.matches.len().saturating_sub(1);
            state.selected = (state.selected + 1).min(last);
            Effect::Render
        }
        Action::SelectPrev => {
            ensure_matches(state, registry);
            state.selected = state.selected.saturating_sub(1);
            Effect::Render
        }
        Action::SelectFirst => {
            ensure_matches(state, registry);
            state.selected = 0;
            Effect::Render
        }

        // --- Outcome ---
        Action::Confirm => {
            if state.query.trim().is_empty() {
                state.reset();
                return Effect::Cancel;
            }
            match state.selected_match() {
                Some(selected) => {
                    let command = selected.command.clone();
                    state.mode = Mode::Executing;
                    Effect::Execute(command)
                }
                None => refilter(state, registry),
            }
        }
        Action::Cancel => {
            state.reset();
            Effect::Cancel
        }

        Action::Refresh => Effect::Render,
    }
}

fn ensure_matches(state: &mut SelectorState, registry: &Registry) {
    if state.matches.is_empty() {
        state.matches = filter(&registry.snapshot(), &state.query);
        state.selected = 0;
    }
    state.mode = Mode::Displaying;
}

/// Matches the query against a fresh snapshot, so commands added or removed
/// meanwhile show up.
fn refilter(state: &mut SelectorState, registry: &Registry) -> Effect {
    let commands = registry.snapshot();
    state.matches = filter(&commands, &state.query);
    state.selected = 0;

    if state.matches.is_empty() {
        let query = std::mem::take(&mut state.query);
        state.matches = filter(&commands, "");
        state.mode = Mode::Filtering;
        return Effect::NoMatch(query);
    }
    state.mode = Mode::Displaying;
    Effect::Render
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Registry {
        let registry = Registry::new();
        registry.add("alpha", || {});
        registry.add("beta", || {});
        registry.add("gamma", || {});
        registry
    }

    fn names(state: &SelectorState) -> Vec<&str> {
        state
            .matches
            .iter()
            .map(|m| m.command.name.as_str())
            .collect()
    }

    fn type_query(state: &mut SelectorState, query: &str, registry: &Registry) -> Effect {
        let mut effect = Effect::Render;
        for c in query.chars() {
            effect = update(state, Action::Type(c), registry);
        }
        effect
    }

    #[test]
    fn test_filter_end_to_end() {
        let registry = registry();
        let mut state = SelectorState::default();

        type_query(&mut state, "ga", &registry);

        assert_eq!(names(&state), vec!["gamma"]);
        assert_eq!(state.matches[0].positions, vec![0, 1]);
        assert_eq!(state.mode, Mode::Displaying);
    }

    #[test]
    fn test_selection_clamps_at_both_ends() {
        let registry = registry();
        let mut state = SelectorState::default();
        type_query(&mut state, "a", &registry);
        assert_eq!(state.matches.len(), 3);

        update(&mut state, Action::SelectPrev, &registry);
        assert_eq!(state.selected, 0);

        for _ in 0..5 {
            update(&mut state, Action::SelectNext, &registry);
        }
        assert_eq!(state.selected, 2);

        update(&mut state, Action::SelectFirst, &registry);
        assert_eq!(state.selected, 0);
    }

    #[test]
    fn test_typing_resets_selection() {
        let registry = registry();
        let mut state = SelectorState::default();
        type_query(&mut state, "a", &registry);
        update(&mut state, Action::SelectNext, &registry);
        assert_eq!(state.selected, 1);

        update(&mut state, Action::Type('m'), &registry);
        assert_eq!(state.selected, 0);
        assert_eq!(names(&state), vec!["gamma"]);
    }

    #[test]
    fn test_no_match_resets_query() {
        let registry = registry();
        let mut state = SelectorState::default();
        type_query(&mut state, "ga", &registry);

        match update(&mut state, Action::Type('z'), &registry) {
            Effect::NoMatch(query) => assert_eq!(query, "gaz"),
            other => panic!("Expected Effect::NoMatch, got {other:?}"),
        }
        assert!(state.query.is_empty());
        assert_eq!(state.mode, Mode::Filtering);
        assert_eq!(state.matches.len(), 3);
    }

    #[test]
    fn test_backspace_refilters_from_fresh_snapshot() {
        let registry = registry();
        let mut state = SelectorState::default();
        type_query(&mut state, "ga", &registry);

        registry.add("gala", || {});
        update(&mut state, Action::Backspace, &registry);

        assert_eq!(state.query, "g");
        assert_eq!(names(&state), vec!["gala", "gamma"]);

        update(&mut state, Action::Backspace, &registry);
        update(&mut state, Action::Backspace, &registry);
        assert!(state.query.is_empty());
        assert_eq!(state.matches.len(), 4);
    }

    #[test]
    fn test_confirm_executes_selected() {
        let registry = registry();
        let mut state = SelectorState::default();
        type_query(&mut state, "a", &registry);
        update(&mut state, Action::SelectNext, &registry);
        let expected = state.matches[1].command.name.clone();

        match update(&mut state, Action::Confirm, &registry) {
            Effect::Execute(command) => assert_eq!(command.name, expected),
            other => panic!("Expected Effect::Execute, got {other:?}"),
        }
        assert_eq!(state.mode, Mode::Executing);
    }

    #[test]
    fn test_confirm_blank_query_cancels() {
        let registry = registry();
        let mut state = SelectorState::default();
        type_query(&mut state, "  ", &registry);

        assert!(matches!(
            update(&mut state, Action::Confirm, &registry),
            Effect::Cancel
        ));
        assert_eq!(state.mode, Mode::Idle);
        assert!(state.query.is_empty());
    }

    #[test]
    fn test_cancel_returns_to_idle() {
        let registry = registry();
        let mut state = SelectorState::default();
        type_query(&mut state, "be", &registry);

        assert!(matches!(
            update(&mut state, Action::Cancel, &registry),
            Effect::Cancel
        ));
        assert_eq!(state.mode, Mode::Idle);
        assert!(state.matches.is_empty());
    }

    #[test]
    fn test_navigation_from_idle_lists_everything() {
        let registry = registry();
        let mut state = SelectorState::default();
        update(&mut state, Action::SelectNext, &registry);
        assert_eq!(state.matches.len(), 3);
        assert_eq!(state.selected, 1);
    }
}
