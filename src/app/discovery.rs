use super::log::FaultLog;
use super::registry::{Priority, Registry};
use crate::domain::models::{ActionFn, Flow};
use crate::error::LauncherError;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

#[derive(Debug, Clone, Copy)]
pub struct Registration {
    pub name: &'static str,
    pub action: fn(),
}

/// Called once during discovery to register commands that need the registry
/// itself, e.g. commands that add more commands.
pub type Adder = fn(&Registry) -> anyhow::Result<()>;

/// Registers a stream of commands as one priority group, so they sort
/// alphabetically among themselves and above everything registered earlier.
pub fn register_all<I, S>(registry: &Registry, commands: I) -> usize
where
    I: IntoIterator<Item = (S, ActionFn)>,
    S: Into<String>,
{
    let mut priority = Priority::NewGroup;
    let mut count = 0;
    for (name, action) in commands {
        if registry.add_with_priority(name, action, priority).is_some() {
            priority = Priority::SameGroup;
            count += 1;
        }
    }
    count
}

fn table_entries(table: &[Registration]) -> impl Iterator<Item = (&'static str, ActionFn)> + '_ {
    table.iter().map(|entry| {
        let run = entry.action;
        let action: ActionFn = Arc::new(move || {
            run();
            Ok(Flow::Continue(()))
        });
        (entry.name, action)
    })
}

/// Registers every table, then runs every adder. A failing or panicking adder
/// is reported and skipped.
pub fn discover(
    registry: &Registry,
    tables: &[&[Registration]],
    adders: &[Adder],
    log: &FaultLog,
) -> usize {
    let mut count = 0;
    for table in tables {
        count += register_all(registry, table_entries(table));
    }

    for (i, adder) in adders.iter().enumerate() {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| adder(registry)));
        let err = match outcome {
            Ok(Ok(())) => continue,
            Ok(Err(err)) => err,
            Err(payload) => anyhow::anyhow!("panicked: {}", panic_message(payload.as_ref())),
        };
        log.report(
            "command discovery failed",
            LauncherError::ActionFault {
                name: format!("adder #{i}"),
                source: err,
            },
        );
    }
    tracing::debug!(count, adders = adders.len(), "commands discovered");
    count
}

pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
