pub mod actions;
pub mod error;
