//! Decaying X/Y trail for one display frame.

use serde::{Deserialize, Serialize};

use super::buffer::StereoFrame;

/// Opacity curve applied across a window, oldest point first.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Decay {
    /// `w / window_size`
    Linear,
    /// `(w / window_size)^2`: long faint tail, sharp brightening at the head
    #[default]
    Quadratic,
    /// No fading
    Constant,
}

impl Decay {
    /// Opacity for the point at `offset` within a window of `window_size` points.
    pub fn alpha(self, window_size: usize, offset: usize) -> f32 {
        match self {
            Self::Linear => linear(window_size, offset),
            Self::Quadratic => {
                let l = linear(window_size, offset);
                l * l
            }
            Self::Constant => 1.0,
        }
    }
}

impl std::fmt::Display for Decay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Linear => write!(f, "linear"),
            Self::Quadratic => write!(f, "quadratic"),
            Self::Constant => write!(f, "constant"),
        }
    }
}

fn linear(window_size: usize, offset: usize) -> f32 {
    offset as f32 / window_size as f32
}

/// One drawable trail vertex in sample space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailPoint {
    pub x: f32,
    pub y: f32,
    pub alpha: f32,
}

/// Builds the trail for the window `[start_index, start_index + window_size)`.
///
/// Points are ordered oldest to newest so a line strip drawn in order fades
/// in towards the current position. The caller must have checked that the
/// window fits inside `frames`.
pub fn compute_trail(
    frames: &[StereoFrame],
    window_size: usize,
    start_index: usize,
    axis_inverted: bool,
    decay: Decay,
) -> Vec<TrailPoint> {
    compute_trail_with(frames, window_size, start_index, axis_inverted, |ws, w| {
        decay.alpha(ws, w)
    })
}

/// Same as [`compute_trail`] with an arbitrary `(window_size, offset) -> alpha` curve.
pub fn compute_trail_with<F>(
    frames: &[StereoFrame],
    window_size: usize,
    start_index: usize,
    axis_inverted: bool,
    decay: F,
) -> Vec<TrailPoint>
where
    F: Fn(usize, usize) -> f32,
{
    debug_assert!(window_size > 0, "window size must be positive");
    debug_assert!(
        start_index + window_size <= frames.len(),
        "window [{start_index}, {}) exceeds {} frames",
        start_index + window_size,
        frames.len()
    );

    frames[start_index..start_index + window_size]
        .iter()
        .enumerate()
        .map(|(w, frame)| {
            let (x, y) = if axis_inverted {
                (frame.right, frame.left)
            } else {
                (frame.left, frame.right)
            };
            TrailPoint {
                x,
                y,
                alpha: decay(window_size, w),
            }
        })
        .collect()
}
