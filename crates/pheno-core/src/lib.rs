pub mod actions;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod reducer;
pub mod state;

pub use actions::*;
pub use reducer::*;
pub use state::*;
