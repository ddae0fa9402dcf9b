//! spritebake CLI library.
//!
//! Command implementations and log setup for the `spritebake` binary.

pub mod commands;
pub mod logging;
