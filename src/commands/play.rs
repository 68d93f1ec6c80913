//! Stereo file playback with the X/Y scope.
//!
//! Loads the file, then runs one loop iteration per display frame: poll input,
//! check for the end of the track, draw the trail at the current index, and
//! advance the clock by the elapsed wall time. Exits on q/Escape, at the end of
//! the track, or when SIGTERM/SIGHUP is received.

use crate::config::XyscopeConfig;
use crate::playback::{
    compute_trail, handle_event, Decay, FrameStatus, PlaybackClock, PlaybackCommand, ScopeTui,
    StereoBuffer,
};
use crate::ui::report_error;
use anyhow::anyhow;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Per-run overrides from the command line.
#[derive(Debug, Clone, Default)]
pub struct PlayOptions {
    pub window_ms: Option<u32>,
    pub decay: Option<Decay>,
    pub gain: Option<f32>,
    pub invert: bool,
    pub paused: bool,
}

impl PlayOptions {
    /// Applies the overrides on top of the loaded configuration.
    ///
    /// # Errors
    /// - If the window length is zero
    /// - If the gain is not a positive number
    pub fn apply(&self, config: &mut XyscopeConfig) -> anyhow::Result<()> {
        if let Some(window_ms) = self.window_ms {
            if window_ms == 0 {
                return Err(anyhow!("--window-ms must be greater than 0"));
            }
            config.playback.window_ms = window_ms;
        }
        if let Some(decay) = self.decay {
            config.playback.decay = decay;
        }
        if let Some(gain) = self.gain {
            if !(gain.is_finite() && gain > 0.0) {
                return Err(anyhow!("--gain must be a positive number"));
            }
            config.display.gain = gain;
        }
        // Flags only ever switch these on; the file decides otherwise
        config.playback.invert_axes |= self.invert;
        config.playback.start_paused |= self.paused;
        Ok(())
    }
}

/// Why the frame loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopExit {
    Quit,
    EndOfTrack,
    Signal,
}

/// Plays `file` in the terminal scope until the user quits or the track ends.
///
/// # Errors
/// - If the configuration cannot be loaded or an override is invalid
/// - If the file cannot be loaded or is not stereo
/// - If the terminal cannot be initialized or drawn to
pub fn handle_play(file: PathBuf, options: PlayOptions) -> Result<(), anyhow::Error> {
    tracing::info!("=== xyscope started: {} ===", file.display());

    let mut config = match XyscopeConfig::load() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("Failed to load configuration: {err}");
            report_error(
                "Configuration Error",
                &format!("{err}\n\nPlease check your ~/.config/xyscope/xyscope.toml file."),
            );
            return Err(anyhow!("Configuration error: {err}"));
        }
    };
    options.apply(&mut config)?;

    let buffer = match StereoBuffer::load_wav(&file) {
        Ok(buffer) => buffer,
        Err(err) => {
            tracing::error!("Failed to load {}: {err}", file.display());
            report_error("Load Error", &err.to_string());
            return Err(err);
        }
    };

    let window_size = buffer.window_frames(config.playback.window_ms);
    if buffer.len() <= window_size {
        return Err(anyhow!(
            "Track is too short: {} frames, the {}ms window needs more than {}",
            buffer.len(),
            config.playback.window_ms,
            window_size
        ));
    }

    tracing::info!(
        "Playback: frame time {:.6}s, window {} frames ({}ms), decay {}, gain {}",
        1.0 / f64::from(buffer.sample_rate()),
        window_size,
        config.playback.window_ms,
        config.playback.decay,
        config.display.gain
    );

    let close_requested = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGTERM, Arc::clone(&close_requested))
        .map_err(|e| anyhow!("Failed to register signal handler: {e}"))?;
    #[cfg(unix)]
    signal_hook::flag::register(signal_hook::consts::SIGHUP, Arc::clone(&close_requested))
        .map_err(|e| anyhow!("Failed to register signal handler: {e}"))?;

    let poll_interval = Duration::from_secs_f64(1.0 / f64::from(config.playback.fps));
    let mut tui = ScopeTui::new(config.display.clone(), poll_interval)
        .map_err(|e| anyhow!("Failed to initialize UI: {e}"))?;

    let started = Instant::now();
    let mut clock = PlaybackClock::new(buffer.sample_rate(), 0.0);
    if config.playback.start_paused {
        clock.toggle_paused();
    }
    if config.playback.invert_axes {
        clock.toggle_axis_inverted();
    }
    tracing::debug!(
        "Clock at {}Hz, paused={}, axis_inverted={}",
        clock.sample_rate(),
        clock.is_paused(),
        clock.axis_inverted()
    );

    let outcome = run_frames(
        &mut tui,
        &mut clock,
        &buffer,
        window_size,
        config.playback.decay,
        &close_requested,
        started,
    );

    tui.cleanup()
        .map_err(|e| anyhow!("Cleanup failed: {e}"))?;

    match outcome {
        Ok(exit) => {
            tracing::info!(
                "=== xyscope exited ({:?}) at frame {}/{} ===",
                exit,
                clock.current_index(),
                buffer.len()
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Playback failed: {}", e);
            Err(e)
        }
    }
}

/// Runs the frame loop until quit, end of track, or a close signal.
fn run_frames(
    tui: &mut ScopeTui,
    clock: &mut PlaybackClock,
    buffer: &StereoBuffer,
    window_size: usize,
    decay: Decay,
    close_requested: &AtomicBool,
    started: Instant,
) -> anyhow::Result<LoopExit> {
    let mut frame_count = 0u64;

    loop {
        if close_requested.load(Ordering::Relaxed) {
            tracing::info!("Received close signal");
            return Ok(LoopExit::Signal);
        }

        // Controls are applied before drawing so each frame sees one index
        match tui.handle_input()? {
            PlaybackCommand::Quit => return Ok(LoopExit::Quit),
            PlaybackCommand::Control(event) => handle_event(event, clock),
            PlaybackCommand::Continue => {}
        }

        if !clock.can_render(window_size, buffer.len()) {
            tracing::info!("End of track");
            return Ok(LoopExit::EndOfTrack);
        }

        let trail = compute_trail(
            buffer.frames(),
            window_size,
            clock.current_index(),
            clock.axis_inverted(),
            decay,
        );
        let status = FrameStatus {
            paused: clock.is_paused(),
            axis_inverted: clock.axis_inverted(),
            frame_index: clock.current_index(),
            total_frames: buffer.len(),
            position_secs: clock.position_secs(),
            duration_secs: buffer.duration_secs(),
            decay,
        };
        tui.render(&trail, &status)
            .map_err(|e| anyhow!("Render failed: {e}"))?;

        let advanced = clock.advance(started.elapsed().as_secs_f64());
        tracing::trace!(
            "Advanced {} frames to {} (tick at {:.4}s)",
            advanced,
            clock.current_index(),
            clock.last_tick_time()
        );

        frame_count += 1;
        if frame_count % 120 == 0 {
            tracing::debug!(
                "Frame {}/{} ({:.1}%)",
                clock.current_index(),
                buffer.len(),
                clock.current_index() as f64 * 100.0 / buffer.len() as f64
            );
        }
    }
}
