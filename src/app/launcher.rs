use super::config::LauncherConfig;
use super::discovery::{self, Adder, Registration};
use super::log::FaultLog;
use super::registry::Registry;
use super::screen::Screen;
use super::selector::r#loop::run_loop;
use crate::domain::console::{ConsoleBackend, KeySource};
use crate::domain::models::ActionResult;
use crate::infrastructure::{keys::CrosstermKeys, terminal};
use crate::theme::Theme;

use anyhow::Result;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub struct LauncherBuilder {
    console: Box<dyn ConsoleBackend>,
    keys: Box<dyn KeySource>,
    registry: Arc<Registry>,
    config: LauncherConfig,
    theme: Theme,
    log: FaultLog,
}

impl LauncherBuilder {
    /// Shares a registry that other parts of the host already fill.
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = registry;
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: LauncherConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    #[must_use]
    pub fn with_fault_log(mut self, log: FaultLog) -> Self {
        self.log = log;
        self
    }

    #[must_use]
    pub fn build(self) -> Launcher {
        let screen = Screen::new(
            self.console,
            self.keys,
            Arc::new(self.config),
            Arc::new(self.theme),
            self.log,
        );
        Launcher {
            registry: self.registry,
            screen,
            running: Arc::new(AtomicBool::new(false)),
            current: Arc::new(Mutex::new(None)),
        }
    }
}

/// Fuzzy command launcher over a scrollable terminal.
///
/// Commands can be added and removed from any thread, also while [`run`]
/// is waiting for keys. Output from other threads goes through
/// [`Launcher::screen`].
///
/// [`run`]: Launcher::run
pub struct Launcher {
    registry: Arc<Registry>,
    screen: Screen,
    running: Arc<AtomicBool>,
    current: Arc<Mutex<Option<String>>>,
}

impl Launcher {
    pub fn builder(console: Box<dyn ConsoleBackend>, keys: Box<dyn KeySource>) -> LauncherBuilder {
        LauncherBuilder {
            console,
            keys,
            registry: Arc::new(Registry::new()),
            config: LauncherConfig::default(),
            theme: Theme::default(),
            log: FaultLog::noop(),
        }
    }

    pub fn new(console: Box<dyn ConsoleBackend>, keys: Box<dyn KeySource>) -> Self {
        Self::builder(console, keys).build()
    }

    /// Switches stdout to raw mode on the alternate screen and reads keys
    /// from the terminal. Call [`terminal::leave`] once [`Launcher::run`]
    /// returns.
    pub fn stdout() -> Result<LauncherBuilder> {
        let console = terminal::enter()?;
        Ok(Self::builder(Box::new(console), Box::new(CrosstermKeys::new())))
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    #[must_use]
    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn add(&self, name: impl Into<String>, action: impl Fn() + Send + Sync + 'static) {
        self.registry.add(name, action);
    }

    pub fn add_action(
        &self,
        name: impl Into<String>,
        action: impl Fn() -> ActionResult + Send + Sync + 'static,
    ) {
        self.registry.add_action(name, action);
    }

    pub fn remove(&self, name: &str) {
        self.registry.remove(name);
    }

    /// Registers static command tables and runs adder callbacks.
    pub fn discover(&self, tables: &[&[Registration]], adders: &[Adder]) -> usize {
        discovery::discover(&self.registry, tables, adders, self.screen.log())
    }

    /// Runs the selector on this thread until the exit command is chosen or
    /// [`Launcher::stop`] is called.
    pub fn run(&self) -> Result<()> {
        run_loop(&self.screen, &self.registry, &self.running, &self.current)?;
        Ok(())
    }

    /// Ends [`Launcher::run`] within one poll interval.
    ///
    /// Only a running launcher can be stopped: `run` starts by marking itself
    /// running, so a `stop` issued before it is not remembered.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Name of the command whose action is running right now.
    #[must_use]
    pub fn current_command(&self) -> Option<String> {
        self.current.lock().clone()
    }
}
