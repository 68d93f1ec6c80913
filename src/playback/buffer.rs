//! In-memory stereo sample buffer and WAV loading.
//!
//! The whole file is decoded up front into left/right float frames. Files that
//! are not exactly two channels are rejected, since the scope plots one
//! channel against the other.

use anyhow::{anyhow, Result};
use std::path::Path;

/// One sample instant of a stereo signal.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StereoFrame {
    pub left: f32,
    pub right: f32,
}

/// Decoded stereo audio, read-only once loaded.
#[derive(Debug, Clone)]
pub struct StereoBuffer {
    sample_rate: u32,
    frames: Vec<StereoFrame>,
}

impl StereoBuffer {
    /// Builds a buffer from interleaved samples.
    ///
    /// # Errors
    /// - If `channels` is not 2
    /// - If `sample_rate` is zero
    pub fn from_interleaved(sample_rate: u32, channels: u16, samples: &[f32]) -> Result<Self> {
        if channels != 2 {
            return Err(anyhow!(
                "Input audio has {channels} channel(s); X/Y rendering needs exactly two"
            ));
        }
        if sample_rate == 0 {
            return Err(anyhow!("Input audio reports a sample rate of 0 Hz"));
        }

        let chunks = samples.chunks_exact(2);
        if !chunks.remainder().is_empty() {
            tracing::warn!("Dropping trailing partial frame ({} sample)", chunks.remainder().len());
        }
        let frames = chunks
            .map(|pair| StereoFrame {
                left: pair[0],
                right: pair[1],
            })
            .collect();

        Ok(Self {
            sample_rate,
            frames,
        })
    }

    /// Loads a WAV file into memory.
    ///
    /// Integer PCM is scaled into `[-1, 1)` by its bit depth; float PCM is kept as is.
    ///
    /// # Errors
    /// - If the file cannot be opened or is not a valid WAV file
    /// - If the file does not have exactly two channels
    /// - If the sample data is truncated or corrupt
    pub fn load_wav(path: &Path) -> Result<Self> {
        let mut reader = hound::WavReader::open(path)
            .map_err(|e| anyhow!("Failed to open '{}': {e}", path.display()))?;
        let spec = reader.spec();

        tracing::info!(
            "Loaded input file {}: {}Hz, {} channels, {}-bit {:?}",
            path.display(),
            spec.sample_rate,
            spec.channels,
            spec.bits_per_sample,
            spec.sample_format
        );

        if spec.channels != 2 {
            return Err(anyhow!(
                "Input audio has {} channel(s); X/Y rendering needs exactly two",
                spec.channels
            ));
        }

        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<Result<_, _>>()
                .map_err(|e| anyhow!("Failed to load raw audio frames: {e}"))?,
            hound::SampleFormat::Int => {
                let scale = int_scale(spec.bits_per_sample);
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<Result<_, _>>()
                    .map_err(|e| anyhow!("Failed to load raw audio frames: {e}"))?
            }
        };

        let buffer = Self::from_interleaved(spec.sample_rate, spec.channels, &samples)?;
        tracing::info!("{} frames loaded", buffer.len());
        Ok(buffer)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn frames(&self) -> &[StereoFrame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Track length in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.frames.len() as f64 / self.sample_rate as f64
    }

    /// Number of frames covering `window_ms` milliseconds, at least one.
    pub fn window_frames(&self, window_ms: u32) -> usize {
        let frames = u64::from(self.sample_rate) * u64::from(window_ms) / 1000;
        usize::try_from(frames).unwrap_or(usize::MAX).max(1)
    }
}

fn int_scale(bits_per_sample: u16) -> f32 {
    (1u64 << (bits_per_sample.clamp(1, 32) - 1)) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_wav_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("xyscope_{}_{}.wav", name, std::process::id()))
    }

    fn write_wav(path: &Path, spec: hound::WavSpec, samples: &[i16]) {
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for &sample in samples {
            writer.write_sample(sample).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_from_interleaved_splits_channels() {
        let buffer = StereoBuffer::from_interleaved(8000, 2, &[0.1, -0.1, 0.2, -0.2]).unwrap();
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.frames()[1], StereoFrame { left: 0.2, right: -0.2 });
    }

    #[test]
    fn test_from_interleaved_rejects_mono() {
        let err = StereoBuffer::from_interleaved(8000, 1, &[0.0; 4]).unwrap_err();
        assert!(err.to_string().contains("1 channel"));
    }

    #[test]
    fn test_from_interleaved_rejects_zero_rate() {
        assert!(StereoBuffer::from_interleaved(0, 2, &[0.0; 4]).is_err());
    }

    #[test]
    fn test_window_frames() {
        let buffer = StereoBuffer::from_interleaved(44100, 2, &[]).unwrap();
        assert_eq!(buffer.window_frames(50), 2205);
        assert_eq!(buffer.window_frames(0), 1);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_load_wav_int16() {
        let path = temp_wav_path("int16");
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 22050,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        write_wav(&path, spec, &[16384, -16384, 0, i16::MIN]);

        let buffer = StereoBuffer::load_wav(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(buffer.sample_rate(), 22050);
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.frames()[0], StereoFrame { left: 0.5, right: -0.5 });
        assert_eq!(buffer.frames()[1], StereoFrame { left: 0.0, right: -1.0 });
    }

    #[test]
    fn test_load_wav_rejects_mono() {
        let path = temp_wav_path("mono");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        write_wav(&path, spec, &[1, 2, 3, 4]);

        let result = StereoBuffer::load_wav(&path);
        std::fs::remove_file(&path).ok();

        assert!(result.is_err());
    }

    #[test]
    fn test_load_wav_missing_file() {
        let result = StereoBuffer::load_wav(Path::new("/nonexistent/xyscope.wav"));
        assert!(result.is_err());
    }
}
