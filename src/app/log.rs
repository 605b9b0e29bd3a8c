use crate::error::LauncherError;
use std::fmt;
use std::sync::Arc;

pub type FaultCallback = dyn Fn(&str, Option<&anyhow::Error>) + Send + Sync;

/// Receives recoverable faults. The launcher never writes log files itself;
/// the host decides where faults go.
#[derive(Clone)]
pub struct FaultLog(Arc<FaultCallback>);

impl FaultLog {
    pub fn new(callback: impl Fn(&str, Option<&anyhow::Error>) + Send + Sync + 'static) -> Self {
        Self(Arc::new(callback))
    }

    #[must_use]
    pub fn noop() -> Self {
        Self::new(|_, _| {})
    }

    pub fn log(&self, message: &str, cause: Option<&anyhow::Error>) {
        match cause {
            Some(err) => tracing::warn!(error = %format!("{err:#}"), "{message}"),
            None => tracing::warn!("{message}"),
        }
        (self.0)(message, cause);
    }

    pub fn report(&self, message: &str, fault: LauncherError) {
        let err = anyhow::Error::new(fault);
        self.log(message, Some(&err));
    }
}

impl Default for FaultLog {
    fn default() -> Self {
        Self::noop()
    }
}

impl fmt::Debug for FaultLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FaultLog")
    }
}
