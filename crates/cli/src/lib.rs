//! Library half of the `adscript` binary: configuration loading, tracing
//! setup, subcommands, and terminal rendering. `main.rs` only wires these.

pub mod commands;
pub mod config;
pub mod observability;
pub mod render;
