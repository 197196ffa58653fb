//! WAV-file frame source for offline runs and tests.
//!
//! Serves the same fixed-size frames as the microphone source, so the whole
//! pipeline can be exercised against recorded audio.

use crate::audio::frame::Frame;
use crate::audio::source::FrameSource;
use crate::defaults;
use crate::error::{Result, UttercapError};
use std::io::Read;
use std::path::Path;

/// Frame source reading 16-bit mono PCM from a WAV file.
///
/// The file must already match the pipeline's sample rate; no resampling is
/// performed. When the file runs out mid-frame the remainder is dropped and
/// the next read fails like a disconnected device, so a capture session that
/// never reaches an endpoint surfaces an error instead of hanging.
pub struct WavFrameSource {
    samples: Vec<i16>,
    pos: usize,
    frame_len: usize,
}

impl WavFrameSource {
    /// Open a WAV file and validate its format against the pipeline config.
    ///
    /// # Errors
    /// Returns `UttercapError::AudioFormatMismatch` for non-mono, non-16-bit
    /// or wrong-rate files, `UttercapError::Device` for unreadable files.
    pub fn open(path: &Path, sample_rate: u32, frame_ms: u32) -> Result<Self> {
        let reader = hound::WavReader::open(path).map_err(|e| UttercapError::Device {
            message: format!("Failed to open WAV file {}: {}", path.display(), e),
        })?;
        Self::from_reader(reader, sample_rate, frame_ms)
    }

    /// Build a source from an already-open WAV reader.
    pub fn from_reader<R: Read>(
        reader: hound::WavReader<R>,
        sample_rate: u32,
        frame_ms: u32,
    ) -> Result<Self> {
        let spec = reader.spec();
        if spec.channels != 1
            || spec.bits_per_sample != 16
            || spec.sample_format != hound::SampleFormat::Int
            || spec.sample_rate != sample_rate
        {
            return Err(UttercapError::AudioFormatMismatch {
                expected: format!("{}Hz mono 16-bit PCM", sample_rate),
                actual: format!(
                    "{}Hz {}ch {}-bit {:?}",
                    spec.sample_rate, spec.channels, spec.bits_per_sample, spec.sample_format
                ),
            });
        }

        let samples = reader
            .into_samples::<i16>()
            .collect::<std::result::Result<Vec<i16>, _>>()
            .map_err(|e| UttercapError::Device {
                message: format!("Failed to decode WAV samples: {}", e),
            })?;

        Ok(Self::from_samples(samples, sample_rate, frame_ms))
    }

    /// Build a source directly from raw samples (used in tests).
    pub fn from_samples(samples: Vec<i16>, sample_rate: u32, frame_ms: u32) -> Self {
        Self {
            samples,
            pos: 0,
            frame_len: defaults::frame_len(sample_rate, frame_ms),
        }
    }

    /// Number of whole frames remaining.
    pub fn frames_remaining(&self) -> usize {
        (self.samples.len() - self.pos) / self.frame_len
    }
}

impl FrameSource for WavFrameSource {
    fn start(&mut self) -> Result<()> {
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Frame> {
        let end = self.pos + self.frame_len;
        if end > self.samples.len() {
            return Err(UttercapError::Device {
                message: "end of WAV input".to_string(),
            });
        }
        let frame = Frame::new(self.samples[self.pos..end].to_vec());
        self.pos = end;
        Ok(frame)
    }

    fn stop(&mut self) -> Result<()> {
        Ok(())
    }
}
