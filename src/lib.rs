//! uttercap - streaming utterance capture and transcription
//!
//! Pulls fixed-size frames from an audio source, classifies each frame as
//! speech or silence, segments the stream into utterances with hysteresis on
//! both edges, and hands finalized segments to a speech-to-text backend.

// Enforce error handling discipline
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod defaults;
pub mod endpoint;
pub mod error;
pub mod segment;
pub mod session;
pub mod stt;
pub mod vad;

// Composition root - needs the real devices
#[cfg(all(feature = "cli", feature = "cpal-audio"))]
pub mod app;

// Core traits (source → classify → endpoint → transcribe)
pub use audio::source::FrameSource;
pub use stt::transcriber::Transcriber;
pub use vad::classifier::SpeechClassifier;

// Pipeline
pub use endpoint::{EndpointConfig, Endpointer, Utterance, Verdict};
pub use segment::{Segment, SegmentFinalizer};
pub use session::{CaptureSession, SessionConfig, StopHandle};

// Error handling
pub use error::{Result, UttercapError};

// Config
pub use config::Config;
