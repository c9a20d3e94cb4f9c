//! Process-level services: clock, logging, terminal and signal plumbing.

pub mod diagnostics;
pub mod log_dirs;
pub mod signal_handler;
pub mod terminal_modes;
pub mod time_source;
pub mod tracing_setup;
