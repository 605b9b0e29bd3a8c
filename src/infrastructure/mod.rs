pub mod keys;
pub mod scrollback_console;
pub mod terminal;
