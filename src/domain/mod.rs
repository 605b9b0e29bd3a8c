pub mod console;
pub mod matcher;
pub mod models;
