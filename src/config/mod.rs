//! Configuration management for xyscope.
//!
//! Settings are read from `~/.config/xyscope/xyscope.toml`. Command-line flags
//! override individual values for a single run and are never written back.

pub mod file;

pub use file::{config_path, DisplayConfig, MarkerKind, XyscopeConfig};
