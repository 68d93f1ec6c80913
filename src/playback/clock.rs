//! Wall-clock driven playback position.
//!
//! Converts elapsed seconds into a sample index that only moves forward while
//! playing, and exposes scrubbing and pause/axis toggles for the key handler.

/// Slack applied before truncating elapsed time to whole frames, so a clock
/// reading that lands on a frame boundary is not lost to float rounding.
const FRAME_EPSILON: f64 = 1e-6;

/// Mutable playback state plus the sample rate it advances at.
///
/// Elapsed time is measured from an anchor timestamp. The number of frames
/// already credited since that anchor is kept as an integer, which carries
/// the fractional remainder of every tick forward without accumulating
/// float error.
#[derive(Debug, Clone)]
pub struct PlaybackClock {
    sample_rate: u32,
    current_index: usize,
    paused: bool,
    axis_inverted: bool,
    anchor_time: f64,
    frames_since_anchor: u64,
}

impl PlaybackClock {
    /// Creates a clock at index 0, playing, with the default axis mapping.
    ///
    /// `now` is the wall-clock reading (seconds) the first tick is measured from.
    pub fn new(sample_rate: u32, now: f64) -> Self {
        debug_assert!(sample_rate > 0, "sample rate must be positive");
        Self {
            sample_rate,
            current_index: 0,
            paused: false,
            axis_inverted: false,
            anchor_time: now,
            frames_since_anchor: 0,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn axis_inverted(&self) -> bool {
        self.axis_inverted
    }

    /// Timestamp that the next advance measures elapsed time from.
    pub fn last_tick_time(&self) -> f64 {
        self.anchor_time + self.frames_since_anchor as f64 / self.sample_rate as f64
    }

    /// Playback position in seconds.
    pub fn position_secs(&self) -> f64 {
        self.current_index as f64 / self.sample_rate as f64
    }

    /// Advances the index by the whole frames elapsed since the last tick.
    ///
    /// While paused nothing advances, but the reference time is moved to `now`
    /// so resuming does not jump forward by the paused duration.
    ///
    /// Returns the number of frames advanced.
    pub fn advance(&mut self, now: f64) -> usize {
        debug_assert!(
            now >= self.anchor_time,
            "clock went backwards: {now} < {}",
            self.anchor_time
        );

        if self.paused {
            self.rebase(now);
            return 0;
        }

        let elapsed_frames = (now - self.anchor_time) * self.sample_rate as f64;
        let due = (elapsed_frames + FRAME_EPSILON).floor().max(0.0) as u64;
        let count = due.saturating_sub(self.frames_since_anchor);
        self.frames_since_anchor += count;

        let count = usize::try_from(count).unwrap_or(usize::MAX);
        self.current_index = self.current_index.saturating_add(count);
        count
    }

    /// Jumps the index by `delta` frames. Saturates at 0; the upper end is left
    /// to the end-of-track check.
    pub fn scrub(&mut self, delta: i64) {
        let magnitude = usize::try_from(delta.unsigned_abs()).unwrap_or(usize::MAX);
        self.current_index = if delta < 0 {
            self.current_index.saturating_sub(magnitude)
        } else {
            self.current_index.saturating_add(magnitude)
        };
    }

    /// Frames to move for one scrub key press: a second of audio with shift
    /// held, a tenth of a second otherwise.
    pub fn scrub_unit(&self, shift_held: bool) -> i64 {
        let large = i64::from(self.sample_rate);
        if shift_held {
            large
        } else {
            large / 10
        }
    }

    pub fn toggle_paused(&mut self) {
        self.paused = !self.paused;
    }

    pub fn toggle_axis_inverted(&mut self) {
        self.axis_inverted = !self.axis_inverted;
    }

    /// Whether a full window starting at the current index still fits inside
    /// a track of `total_frames` frames.
    pub fn can_render(&self, window_size: usize, total_frames: usize) -> bool {
        self.current_index
            .checked_add(window_size)
            .is_some_and(|end| end < total_frames)
    }

    fn rebase(&mut self, now: f64) {
        self.anchor_time = now;
        self.frames_since_anchor = 0;
    }
}

/// Discrete user controls applied to the playback clock between frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    TogglePause,
    ToggleAxes,
    ScrubBackward { shift_held: bool },
    ScrubForward { shift_held: bool },
}

/// Applies one control event to the clock.
pub fn handle_event(event: ControlEvent, clock: &mut PlaybackClock) {
    match event {
        ControlEvent::TogglePause => {
            clock.toggle_paused();
            tracing::debug!(
                "Playback {} at frame {}",
                if clock.is_paused() { "paused" } else { "resumed" },
                clock.current_index()
            );
        }
        ControlEvent::ToggleAxes => {
            clock.toggle_axis_inverted();
            tracing::debug!("Axis inversion: {}", clock.axis_inverted());
        }
        ControlEvent::ScrubBackward { shift_held } => {
            let unit = clock.scrub_unit(shift_held);
            clock.scrub(-unit);
            tracing::debug!("Scrubbed back {} frames to {}", unit, clock.current_index());
        }
        ControlEvent::ScrubForward { shift_held } => {
            let unit = clock.scrub_unit(shift_held);
            clock.scrub(unit);
            tracing::debug!("Scrubbed forward {} frames to {}", unit, clock.current_index());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clock_starts_at_zero() {
        let clock = PlaybackClock::new(44100, 12.5);
        assert_eq!(clock.current_index(), 0);
        assert!(!clock.is_paused());
        assert!(!clock.axis_inverted());
        assert_eq!(clock.last_tick_time(), 12.5);
    }

    #[test]
    fn test_advance_truncates_to_whole_frames() {
        let mut clock = PlaybackClock::new(10, 0.0);
        assert_eq!(clock.advance(0.25), 2);
        assert_eq!(clock.current_index(), 2);
        // The 0.05s left over is carried into the next tick
        assert_eq!(clock.advance(0.35), 1);
        assert_eq!(clock.current_index(), 3);
    }

    #[test]
    fn test_advance_carries_remainder() {
        let mut clock = PlaybackClock::new(10, 0.0);
        for step in 1..=20 {
            clock.advance(step as f64 * 0.06);
        }
        // 1.2s at 10Hz
        assert_eq!(clock.current_index(), 12);
    }

    #[test]
    fn test_advance_no_drift_over_one_second() {
        let mut clock = PlaybackClock::new(44100, 0.0);
        for k in 1..=44100u32 {
            clock.advance(k as f64 / 44100.0);
        }
        assert_eq!(clock.current_index(), 44100);
    }

    #[test]
    fn test_advance_no_drift_with_accumulated_timestamps() {
        let mut clock = PlaybackClock::new(44100, 0.0);
        let step = 1.0 / 44100.0;
        let mut now = 0.0;
        for _ in 0..44100 {
            now += step;
            clock.advance(now);
        }
        assert_eq!(clock.current_index(), 44100);
    }

    #[test]
    fn test_advance_is_non_decreasing() {
        let mut clock = PlaybackClock::new(48000, 0.0);
        let mut previous = 0;
        let mut now = 0.0;
        for i in 0..500 {
            now += 0.0003 * (i % 7) as f64;
            clock.advance(now);
            assert!(clock.current_index() >= previous);
            previous = clock.current_index();
        }
    }

    #[test]
    fn test_paused_advance_returns_zero() {
        let mut clock = PlaybackClock::new(44100, 0.0);
        clock.advance(0.5);
        let index = clock.current_index();
        clock.toggle_paused();

        assert_eq!(clock.advance(1.0), 0);
        assert_eq!(clock.advance(1000.0), 0);
        assert_eq!(clock.current_index(), index);
        assert_eq!(clock.last_tick_time(), 1000.0);
    }

    #[test]
    fn test_resume_does_not_burst() {
        let mut clock = PlaybackClock::new(100, 0.0);
        clock.toggle_paused();
        clock.advance(5.0);
        clock.toggle_paused();

        assert_eq!(clock.advance(5.1), 10);
        assert_eq!(clock.current_index(), 10);
    }

    #[test]
    fn test_toggle_paused_keeps_tick_time() {
        let mut clock = PlaybackClock::new(100, 2.0);
        clock.toggle_paused();
        assert_eq!(clock.last_tick_time(), 2.0);
        clock.toggle_paused();
        assert_eq!(clock.last_tick_time(), 2.0);
    }

    #[test]
    fn test_scrub_saturates_at_zero() {
        let mut clock = PlaybackClock::new(10, 0.0);
        clock.scrub(5);
        clock.scrub(-100);
        assert_eq!(clock.current_index(), 0);
    }

    #[test]
    fn test_scrub_forward_is_unbounded() {
        let mut clock = PlaybackClock::new(10, 0.0);
        clock.scrub(1_000_000);
        assert_eq!(clock.current_index(), 1_000_000);
        assert!(!clock.can_render(4, 10));
    }

    #[test]
    fn test_scrub_unit() {
        let clock = PlaybackClock::new(48000, 0.0);
        assert_eq!(clock.scrub_unit(true), 48000);
        assert_eq!(clock.scrub_unit(false), 4800);
    }

    #[test]
    fn test_can_render_stops_before_last_window() {
        let mut clock = PlaybackClock::new(10, 0.0);
        clock.scrub(5);
        assert!(clock.can_render(4, 10));
        clock.scrub(1);
        assert!(!clock.can_render(4, 10));
    }

    #[test]
    fn test_handle_event_scrubs_and_toggles() {
        let mut clock = PlaybackClock::new(1000, 0.0);

        handle_event(ControlEvent::ScrubForward { shift_held: true }, &mut clock);
        assert_eq!(clock.current_index(), 1000);
        handle_event(ControlEvent::ScrubBackward { shift_held: false }, &mut clock);
        assert_eq!(clock.current_index(), 900);
        handle_event(ControlEvent::ScrubBackward { shift_held: true }, &mut clock);
        assert_eq!(clock.current_index(), 0);

        handle_event(ControlEvent::TogglePause, &mut clock);
        assert!(clock.is_paused());
        handle_event(ControlEvent::ToggleAxes, &mut clock);
        assert!(clock.axis_inverted());
    }
}
