//! CLI library components for the consultation dataset builder.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod summary;
pub mod types;
