//! Print what xyscope would play for a file, without opening the scope.

use crate::config::XyscopeConfig;
use crate::playback::{PlaybackClock, StereoBuffer};
use std::path::PathBuf;

/// Loads `file` and prints its format and the playback parameters derived
/// from the current configuration.
///
/// # Errors
/// - If the configuration cannot be loaded
/// - If the file cannot be loaded or is not stereo
pub fn handle_info(file: PathBuf) -> Result<(), anyhow::Error> {
    let config = XyscopeConfig::load()?;
    let buffer = StereoBuffer::load_wav(&file)?;

    let clock = PlaybackClock::new(buffer.sample_rate(), 0.0);
    let window_size = buffer.window_frames(config.playback.window_ms);

    println!("{}", file.display());
    println!("  Sample rate:  {} Hz", buffer.sample_rate());
    println!("  Channels:     2");
    println!("  Frames:       {}", buffer.len());
    println!("  Duration:     {:.2}s", buffer.duration_secs());
    println!("  Frame time:   {:.6}s", 1.0 / f64::from(buffer.sample_rate()));
    println!(
        "  Window:       {} frames ({}ms, {} decay)",
        window_size, config.playback.window_ms, config.playback.decay
    );
    println!(
        "  Scrub step:   {} frames, {} with Shift",
        clock.scrub_unit(false),
        clock.scrub_unit(true)
    );

    if buffer.is_empty() {
        println!("  Note: file contains no audio frames");
    } else if buffer.len() <= window_size {
        println!("  Note: track is shorter than one window and cannot be played");
    }

    Ok(())
}
