//! Segment finalization.
//!
//! Turns a finished utterance into transcription-ready audio: samples are
//! normalized to [-1.0, 1.0], utterances below the minimum duration are
//! dropped, and accepted audio gets a fixed tail of silence so the decoder
//! does not clip the last word.

use crate::audio::frame::Frame;
use crate::defaults;
use crate::endpoint::Utterance;

/// Finalized, transcription-ready audio.
#[derive(Debug, Clone)]
pub struct Segment {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl Segment {
    /// Normalized float samples, padding included.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds, padding included.
    pub fn duration_secs(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

/// Configuration for segment finalization.
#[derive(Debug, Clone, Copy)]
pub struct FinalizerConfig {
    /// Utterances shorter than this (pre-padding) are discarded.
    pub min_utterance_secs: f32,
    /// Trailing silence appended to accepted segments.
    pub pad_secs: f32,
    pub sample_rate: u32,
}

impl Default for FinalizerConfig {
    fn default() -> Self {
        Self {
            min_utterance_secs: defaults::MIN_UTTERANCE_SECS,
            pad_secs: defaults::PAD_SECS,
            sample_rate: defaults::SAMPLE_RATE,
        }
    }
}

/// Converts utterances into segments, applying the duration filter and pad.
#[derive(Debug, Clone, Copy)]
pub struct SegmentFinalizer {
    cfg: FinalizerConfig,
}

impl SegmentFinalizer {
    pub fn new(cfg: FinalizerConfig) -> Self {
        Self { cfg }
    }

    /// Finalize an utterance.
    ///
    /// Returns `None` when the utterance is shorter than the configured
    /// minimum — a soft discard, not an error. The duration check uses the
    /// pre-pad length; padding is applied only to accepted audio.
    pub fn finalize(&self, utterance: Utterance) -> Option<Segment> {
        let mut samples: Vec<f32> = utterance
            .into_frames()
            .into_iter()
            .flat_map(Frame::into_samples)
            .map(normalize)
            .collect();

        let duration = samples.len() as f32 / self.cfg.sample_rate as f32;
        if duration < self.cfg.min_utterance_secs {
            return None;
        }

        let pad = (self.cfg.pad_secs * self.cfg.sample_rate as f32) as usize;
        samples.extend(std::iter::repeat(0.0).take(pad));

        Some(Segment {
            samples,
            sample_rate: self.cfg.sample_rate,
        })
    }
}

/// Map an i16 PCM sample to [-1.0, 1.0].
fn normalize(sample: i16) -> f32 {
    sample as f32 / 32768.0
}
