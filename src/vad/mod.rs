//! Voice activity detection: preprocessing and per-frame classification.

pub mod classifier;
pub mod preprocess;

pub use classifier::{ScriptedClassifier, SpeechClassifier, WebRtcClassifier};
pub use preprocess::classification_view;
