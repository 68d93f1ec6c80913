//! Stereo playback and X/Y scope rendering.
//!
//! The clock turns wall-clock time into a sample index, the trail module turns
//! a window of samples at that index into faded x/y points, and the UI draws
//! them. The frame loop that ties these together lives in `commands::play`.

pub mod buffer;
pub mod clock;
pub mod trail;
pub mod ui;

pub use buffer::StereoBuffer;
pub use clock::{handle_event, PlaybackClock};
pub use trail::{compute_trail, Decay};
pub use ui::{FrameStatus, PlaybackCommand, ScopeTui};
