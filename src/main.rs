//! xyscope: terminal X/Y scope for stereo audio.

mod app;
mod commands;
mod config;
mod logging;
mod playback;
mod setup;
mod ui;

fn main() {
    if let Err(e) = app::run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
