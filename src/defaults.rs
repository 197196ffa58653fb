//! Default configuration constants for uttercap.
//!
//! This module provides shared constants used across different configuration types
//! to ensure consistency and eliminate duplication.

/// Default audio sample rate in Hz.
///
/// 16kHz is the standard for speech recognition and one of the four rates
/// the frame classifier accepts (8, 16, 32, 48 kHz).
pub const SAMPLE_RATE: u32 = 16000;

/// Default frame duration in milliseconds.
///
/// The classifier only accepts 10, 20 or 30 ms frames; 30 ms (480 samples at
/// 16kHz) gives the most context per decision.
pub const FRAME_MS: u32 = 30;

/// Default classifier aggressiveness (0 = most permissive, 3 = most restrictive).
pub const VAD_MODE: u8 = 2;

/// Default noise-gate amplitude threshold in i16 units.
///
/// Samples whose mean-subtracted magnitude falls below this are zeroed in the
/// classification view. Only classification sees the gated copy; the raw
/// frame is what gets transcribed.
pub const NOISE_GATE: i16 = 100;

/// Default minimum duration of sustained speech before an utterance is
/// confirmed, in milliseconds.
///
/// 250ms of voiced frames filters out coughs and keyboard clicks without
/// clipping the start of real speech.
pub const MIN_VOICED_MS: u32 = 250;

/// Default silence duration in milliseconds before an utterance is considered ended.
///
/// 1500ms (1.5 seconds) allows for natural pauses in speech without prematurely
/// ending the utterance.
pub const SILENCE_MS: u32 = 1500;

/// Default minimum accepted utterance duration in seconds.
///
/// Finalized utterances shorter than this are discarded without transcription.
pub const MIN_UTTERANCE_SECS: f32 = 0.7;

/// Default trailing silence padding in seconds.
///
/// Appended to every accepted segment so the decoder does not truncate the
/// final word.
pub const PAD_SECS: f32 = 0.2;

/// Default Whisper model file path.
pub const DEFAULT_MODEL_PATH: &str = "models/ggml-small.bin";

/// Default language code for transcription.
///
/// A fixed language keeps decoding deterministic across utterances.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Number of samples in one frame at the given rate and duration.
pub const fn frame_len(sample_rate: u32, frame_ms: u32) -> usize {
    (sample_rate * frame_ms / 1000) as usize
}
