pub mod action;
pub mod input;
pub mod r#loop;
pub mod reducer;
pub mod state;
