//! Application command handlers for xyscope.
//!
//! # Commands
//! - `play`: Run the X/Y scope on a stereo file (default)
//! - `info`: Print file format and derived playback parameters
//! - `config`: Open the configuration file in the user's editor
//! - `logs`: Display recent log entries

pub mod config;
pub mod info;
pub mod logs;
pub mod play;

pub use config::handle_config;
pub use info::handle_info;
pub use logs::handle_logs;
pub use play::{handle_play, PlayOptions};
