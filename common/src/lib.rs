pub mod api;
pub mod config;
pub mod game;
pub mod identifiers;
pub mod logger;
pub mod render;

pub use identifiers::*;
