//! Speech-to-text transcription.

pub mod transcriber;
pub mod whisper;

pub use transcriber::{MockTranscriber, Transcriber};
pub use whisper::{WhisperConfig, WhisperTranscriber};
