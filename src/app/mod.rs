pub mod config;
pub mod discovery;
pub mod launcher;
pub mod log;
pub mod pager;
pub mod registry;
pub mod screen;
pub mod scrollback;
pub mod selector;
pub mod surface;
