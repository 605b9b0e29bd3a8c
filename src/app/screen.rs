use super::config::LauncherConfig;
use super::log::FaultLog;
use super::pager::Pager;
use super::surface::TerminalSurface;
use crate::domain::console::{ConsoleBackend, KeySource};
use crate::theme::Theme;
use parking_lot::{Mutex, MutexGuard};
use std::io;
use std::sync::Arc;
use std::time::Duration;

/// Shared handle to the terminal. Writers on other threads lock it for the
/// whole of a multi-step render; the selector locks it once input is pending.
#[derive(Clone)]
pub struct Screen {
    surface: Arc<Mutex<TerminalSurface>>,
    keys: Arc<Mutex<Box<dyn KeySource>>>,
    config: Arc<LauncherConfig>,
    theme: Arc<Theme>,
    log: FaultLog,
}

/// Both locks, taken surface first.
pub struct ScreenGuard<'a> {
    pub surface: MutexGuard<'a, TerminalSurface>,
    pub keys: MutexGuard<'a, Box<dyn KeySource>>,
}

impl ScreenGuard<'_> {
    pub fn split(&mut self) -> (&mut TerminalSurface, &mut dyn KeySource) {
        (&mut *self.surface, &mut **self.keys)
    }
}

impl Screen {
    pub fn new(
        console: Box<dyn ConsoleBackend>,
        keys: Box<dyn KeySource>,
        config: Arc<LauncherConfig>,
        theme: Arc<Theme>,
        log: FaultLog,
    ) -> Self {
        let surface = TerminalSurface::new(console, config.buffer_cap, log.clone());
        Self {
            surface: Arc::new(Mutex::new(surface)),
            keys: Arc::new(Mutex::new(keys)),
            config,
            theme,
            log,
        }
    }

    pub fn lock(&self) -> ScreenGuard<'_> {
        let surface = self.surface.lock();
        let keys = self.keys.lock();
        ScreenGuard { surface, keys }
    }

    /// The surface alone, for output that never reads keys.
    pub fn surface(&self) -> MutexGuard<'_, TerminalSurface> {
        self.surface.lock()
    }

    pub fn pager(&self) -> Pager<'_> {
        Pager::new(self.lock(), &self.config, &self.theme, &self.log)
    }

    /// Waits up to `timeout` for a key while holding only the input lock.
    pub fn input_pending(&self, timeout: Duration) -> io::Result<bool> {
        self.keys.lock().poll(timeout)
    }

    #[must_use]
    pub fn config(&self) -> &LauncherConfig {
        &self.config
    }

    #[must_use]
    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    #[must_use]
    pub fn log(&self) -> &FaultLog {
        &self.log
    }
}
