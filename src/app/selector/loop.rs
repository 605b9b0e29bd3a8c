use super::action::Action;
use super::input::map_key;
use super::reducer::{self, Effect};
use super::state::{Mode, SelectorState};
use crate::app::config::LauncherConfig;
use crate::app::discovery::panic_message;
use crate::app::registry::{Priority, Registry};
use crate::app::screen::Screen;
use crate::app::scrollback::{is_scroll_key, scroll_idle};
use crate::app::surface::TerminalSurface;
use crate::components::candidate_list::{self, MARKER};
use crate::domain::console::KeySource;
use crate::domain::models::{Command, Flow};
use crate::error::LauncherError;
use crate::theme::Theme;

use crossterm::event::{KeyEvent, KeyEventKind};
use parking_lot::Mutex;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

// Below the lowest priority a registered command can get
const EXIT_PRIORITY: u64 = 2;

/// Runs the selector on the calling thread until the exit command runs or
/// `running` is cleared. Only terminal I/O failures end it early.
///
/// `running` is set on entry, so clearing it before the call has no effect,
/// and it is cleared again on every return.
pub fn run_loop(
    screen: &Screen,
    registry: &Registry,
    running: &Arc<AtomicBool>,
    current: &Mutex<Option<String>>,
) -> Result<(), LauncherError> {
    let result = select_until_stopped(screen, registry, running, current);
    running.store(false, Ordering::SeqCst);
    match &result {
        Ok(()) => tracing::info!("launcher stopped"),
        Err(err) => tracing::error!(error = %err, "launcher stopped"),
    }
    result
}

fn select_until_stopped(
    screen: &Screen,
    registry: &Registry,
    running: &Arc<AtomicBool>,
    current: &Mutex<Option<String>>,
) -> Result<(), LauncherError> {
    let config = screen.config();
    let flag = Arc::clone(running);
    registry.add_with_priority(
        config.exit_command.clone(),
        Arc::new(move || {
            flag.store(false, Ordering::SeqCst);
            Ok(Flow::Continue(()))
        }),
        Priority::Exact(EXIT_PRIORITY),
    );
    running.store(true, Ordering::SeqCst);
    tracing::info!(commands = registry.len(), "launcher started");

    let mut carried: Option<KeyEvent> = None;
    while running.load(Ordering::SeqCst) {
        if carried.is_none() && !screen.input_pending(config.poll_interval())? {
            continue;
        }

        let mut guard = screen.lock();
        let (surface, keys) = guard.split();
        let key = match carried.take() {
            Some(key) => key,
            // Another thread's pager may have taken the key meanwhile
            None if keys.poll(Duration::ZERO)? => keys.read_key()?,
            None => continue,
        };
        if key.kind == KeyEventKind::Release {
            continue;
        }

        if is_scroll_key(&key) {
            carried = scroll_idle(surface, keys, key, config.idle_poll(), config.max_idle_polls)?;
            continue;
        }

        let Some(action) = map_key(&key, config) else {
            continue;
        };
        let chosen = run_session(surface, keys, action, registry, config, screen.theme())?;
        drop(guard);

        if let Some(command) = chosen {
            execute(screen, registry, &command, current)?;
        }
    }
    Ok(())
}

/// Filters and displays candidates until one is chosen or the query is
/// abandoned. The viewport is back where it was when this returns.
fn run_session(
    surface: &mut TerminalSurface,
    keys: &mut dyn KeySource,
    first: Action,
    registry: &Registry,
    config: &LauncherConfig,
    theme: &Theme,
) -> io::Result<Option<Command>> {
    if surface.cursor_col() > 0 {
        surface.write("\n");
    }
    surface.clear_region(theme.launcher, None);

    let chosen = {
        let mut session = surface.session();
        let origin = session.cursor_row();
        session.set_window_top(origin);

        let mut state = SelectorState {
            mode: Mode::Filtering,
            ..SelectorState::default()
        };
        let mut action = first;
        loop {
            match reducer::update(&mut state, action, registry) {
                Effect::Render => {
                    candidate_list::render(&mut session, origin, &state, theme, keys)?;
                }
                Effect::NoMatch(query) => {
                    let message = LauncherError::NoMatch { query }.to_string();
                    tracing::debug!("{message}");
                    session.move_to(0, origin);
                    session.clear_region(theme.no_match, None);
                    session.write(&message);
                    session.present()?;
                }
                Effect::Execute(command) => break Some(command),
                Effect::Cancel => break None,
            }
            action = next_action(keys, config)?;
        }
    };

    surface.clear_region(theme.text, None);
    surface.present()?;
    Ok(chosen)
}

fn next_action(keys: &mut dyn KeySource, config: &LauncherConfig) -> io::Result<Action> {
    loop {
        if let Some(action) = map_key(&keys.read_key()?, config) {
            return Ok(action);
        }
    }
}

/// Echoes and runs `command` without holding the screen. Failures and panics
/// inside the action are shown and logged, never propagated.
pub(crate) fn execute(
    screen: &Screen,
    registry: &Registry,
    command: &Command,
    current: &Mutex<Option<String>>,
) -> Result<(), LauncherError> {
    let theme = screen.theme();
    let Some(command) = registry.promote(&command.name) else {
        let mut surface = screen.surface();
        surface.write_styled(
            &format!("{MARKER}{} is no longer available\n", command.name),
            theme.fault,
        );
        surface.present()?;
        return Ok(());
    };

    {
        let mut surface = screen.surface();
        surface.write_styled(&format!("{MARKER}{}", command.name), theme.executed);
        surface.write("\n");
        surface.present()?;
    }

    *current.lock() = Some(command.name.clone());
    tracing::info!(command = %command.name, "executing");
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| (command.action)()));
    *current.lock() = None;

    let cause = match outcome {
        Ok(Ok(Flow::Continue(()))) => return Ok(()),
        Ok(Ok(Flow::Break(signal))) => {
            tracing::debug!(?signal, command = %command.name, "pager signal not handled by the command");
            return Ok(());
        }
        Ok(Err(err)) => err,
        Err(payload) => anyhow::anyhow!("panicked: {}", panic_message(payload.as_ref())),
    };

    let fault = anyhow::Error::new(LauncherError::ActionFault {
        name: command.name.clone(),
        source: cause,
    });
    {
        let mut surface = screen.surface();
        if surface.cursor_col() > 0 {
            surface.write("\n");
        }
        surface.write_styled(&format!("{fault:#}\n"), theme.fault);
        surface.present()?;
    }
    screen.log().log("action failed", Some(&fault));
    Ok(())
}

#[cfg(test)]
#[path = "loop_tests.rs"]
mod tests;
