//! Host-facing commands
//!
//! Modern Rust module organization (Rust 2018+ style):
//! - Each command module is its own file in the commands/ directory
//! - Public exports are defined here for convenience

pub mod validation_commands;

pub use validation_commands::*;
