//! Per-frame voice activity classification.
//!
//! Wraps the WebRTC VAD behind a trait so the capture loop can be driven by
//! a scripted classifier in tests.

use crate::error::{Result, UttercapError};
use std::collections::VecDeque;
use webrtc_vad::{SampleRate, Vad, VadMode};

/// Trait for binary speech/non-speech classification of one frame.
///
/// Implementations are stateless from the pipeline's perspective: any
/// internal adaptation belongs to the wrapped engine.
pub trait SpeechClassifier {
    /// Classify one frame's classification view.
    ///
    /// # Errors
    /// A frame of the wrong length for the configured rate and duration is a
    /// contract violation (`UttercapError::ClassifierContract`) and fails
    /// fast; it is not recoverable at runtime.
    fn is_speech(&mut self, view: &[i16]) -> Result<bool>;
}

/// Frame durations the WebRTC VAD accepts, in milliseconds.
const SUPPORTED_FRAME_MS: &[u32] = &[10, 20, 30];

/// WebRTC voice activity classifier at a fixed aggressiveness level.
pub struct WebRtcClassifier {
    vad: Vad,
    frame_len: usize,
}

impl WebRtcClassifier {
    /// Create a classifier for the given rate, frame duration and mode.
    ///
    /// # Arguments
    /// * `sample_rate` - Must be 8000, 16000, 32000 or 48000 Hz.
    /// * `frame_ms` - Must be 10, 20 or 30 ms.
    /// * `mode` - Aggressiveness 0 (most permissive) to 3 (most restrictive).
    ///
    /// # Errors
    /// Any unsupported parameter is a `ClassifierContract` error.
    pub fn new(sample_rate: u32, frame_ms: u32, mode: u8) -> Result<Self> {
        if !SUPPORTED_FRAME_MS.contains(&frame_ms) {
            return Err(UttercapError::ClassifierContract {
                message: format!("frame duration must be 10, 20 or 30 ms, got {}", frame_ms),
            });
        }

        let rate = match sample_rate {
            8000 => SampleRate::Rate8kHz,
            16000 => SampleRate::Rate16kHz,
            32000 => SampleRate::Rate32kHz,
            48000 => SampleRate::Rate48kHz,
            other => {
                return Err(UttercapError::ClassifierContract {
                    message: format!(
                        "sample rate must be 8000, 16000, 32000 or 48000 Hz, got {}",
                        other
                    ),
                });
            }
        };

        let vad_mode = match mode {
            0 => VadMode::Quality,
            1 => VadMode::LowBitrate,
            2 => VadMode::Aggressive,
            3 => VadMode::VeryAggressive,
            other => {
                return Err(UttercapError::ClassifierContract {
                    message: format!("aggressiveness must be 0-3, got {}", other),
                });
            }
        };

        Ok(Self {
            vad: Vad::new_with_rate_and_mode(rate, vad_mode),
            frame_len: crate::defaults::frame_len(sample_rate, frame_ms),
        })
    }

    /// The frame length, in samples, this classifier expects.
    pub fn frame_len(&self) -> usize {
        self.frame_len
    }
}

impl SpeechClassifier for WebRtcClassifier {
    fn is_speech(&mut self, view: &[i16]) -> Result<bool> {
        if view.len() != self.frame_len {
            return Err(UttercapError::ClassifierContract {
                message: format!(
                    "expected {} samples per frame, got {}",
                    self.frame_len,
                    view.len()
                ),
            });
        }

        self.vad
            .is_voice_segment(view)
            .map_err(|_| UttercapError::ClassifierContract {
                message: "classifier rejected frame".to_string(),
            })
    }
}

/// Scripted classifier for testing.
///
/// Returns a fixed sequence of verdicts, then silence once the script is
/// exhausted. Can be configured to fail, for error-propagation tests.
#[derive(Debug, Clone, Default)]
pub struct ScriptedClassifier {
    verdicts: VecDeque<bool>,
    should_fail: bool,
}

impl ScriptedClassifier {
    /// Create a classifier that returns the given verdicts in order.
    pub fn new(verdicts: impl IntoIterator<Item = bool>) -> Self {
        Self {
            verdicts: verdicts.into_iter().collect(),
            should_fail: false,
        }
    }

    /// Configure the classifier to fail on every call.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl SpeechClassifier for ScriptedClassifier {
    fn is_speech(&mut self, _view: &[i16]) -> Result<bool> {
        if self.should_fail {
            return Err(UttercapError::ClassifierContract {
                message: "scripted classifier failure".to_string(),
            });
        }
        Ok(self.verdicts.pop_front().unwrap_or(false))
    }
}
