use crate::domain::models::{ActionFn, ActionResult, Command, Flow};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

// Registered commands start above this level so the exit command can sit below them
const BASE_PRIORITY: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    /// One above everything registered so far.
    NewGroup,
    /// Same level as the most recent group; ties sort alphabetically.
    SameGroup,
    Exact(u64),
}

struct Entry {
    action: ActionFn,
    priority: u64,
}

struct Inner {
    commands: HashMap<String, Entry>,
    max_priority: u64,
}

impl Inner {
    fn resolve(&mut self, priority: Priority) -> u64 {
        let level = match priority {
            Priority::NewGroup => self.max_priority.saturating_add(1),
            Priority::SameGroup => self.max_priority,
            Priority::Exact(level) => level,
        };
        self.max_priority = self.max_priority.max(level);
        level
    }
}

/// Named commands ordered by priority (highest first), then by name.
///
/// Shared between the launcher and any thread that registers commands; every
/// read and write goes through one lock and rendering works on
/// [`Registry::snapshot`] copies.
pub struct Registry {
    inner: Mutex<Inner>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                commands: HashMap::new(),
                max_priority: BASE_PRIORITY,
            }),
        }
    }

    pub fn add(&self, name: impl Into<String>, action: impl Fn() + Send + Sync + 'static) {
        self.add_action(name, move || {
            action();
            Ok(Flow::Continue(()))
        });
    }

    /// Registers an action that may fail or end with a pager signal.
    pub fn add_action(
        &self,
        name: impl Into<String>,
        action: impl Fn() -> ActionResult + Send + Sync + 'static,
    ) {
        self.add_with_priority(name, Arc::new(action), Priority::NewGroup);
    }

    /// Inserts or replaces `name`. Blank names are ignored and yield `None`,
    /// otherwise the priority the command ended up with.
    pub fn add_with_priority(
        &self,
        name: impl Into<String>,
        action: ActionFn,
        priority: Priority,
    ) -> Option<u64> {
        let name = name.into();
        if name.trim().is_empty() {
            return None;
        }
        let mut inner = self.inner.lock();
        let level = inner.resolve(priority);
        inner.commands.insert(name, Entry { action, priority: level });
        Some(level)
    }

    pub fn remove(&self, name: &str) {
        self.inner.lock().commands.remove(name);
    }

    /// Moves `name` above every other command and returns it with its
    /// current action, or `None` if it was removed in the meantime.
    pub fn promote(&self, name: &str) -> Option<Command> {
        let mut inner = self.inner.lock();
        if !inner.commands.contains_key(name) {
            return None;
        }
        let level = inner.resolve(Priority::NewGroup);
        let entry = inner.commands.get_mut(name)?;
        entry.priority = level;
        Some(Command {
            name: name.to_string(),
            action: Arc::clone(&entry.action),
            rank: level,
        })
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Command> {
        let inner = self.inner.lock();
        inner.commands.get(name).map(|entry| Command {
            name: name.to_string(),
            action: Arc::clone(&entry.action),
            rank: entry.priority,
        })
    }

    #[must_use]
    pub fn snapshot(&self) -> Vec<Command> {
        let mut commands: Vec<Command> = {
            let inner = self.inner.lock();
            inner
                .commands
                .iter()
                .map(|(name, entry)| Command {
                    name: name.clone(),
                    action: Arc::clone(&entry.action),
                    rank: entry.priority,
                })
                .collect()
        };
        commands.sort_by(|a, b| b.rank.cmp(&a.rank).then_with(|| a.name.cmp(&b.name)));
        commands
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.inner.lock().commands.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().commands.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
