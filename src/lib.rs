pub mod app;
pub mod components;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod theme;

pub use app::config::LauncherConfig;
pub use app::discovery::{discover, register_all, Adder, Registration};
pub use app::launcher::{Launcher, LauncherBuilder};
pub use app::log::FaultLog;
pub use app::pager::{parse_response, Pager};
pub use app::registry::{Priority, Registry};
pub use app::screen::{Screen, ScreenGuard};
pub use domain::console::{ConsoleBackend, KeySource};
pub use domain::models::{ActionFn, ActionResult, Command, Flow, MatchResult, PagerSignal};
pub use error::LauncherError;
pub use theme::Theme;
