//! Application composition root.
//!
//! Wires the real devices into a capture session: CPAL microphone input,
//! the WebRTC classifier, and the Whisper transcriber. Only built when both
//! the `cli` and `cpal-audio` features are enabled.

use crate::audio::capture::CpalFrameSource;
use crate::config::Config;
use crate::error::Result;
use crate::session::{CaptureSession, StopHandle};
use crate::stt::transcriber::Transcriber;
use crate::stt::whisper::WhisperTranscriber;
use crate::vad::classifier::WebRtcClassifier;
use std::sync::OnceLock;

static STOP: OnceLock<StopHandle> = OnceLock::new();

extern "C" fn handle_sigint(_: libc::c_int) {
    // Only an atomic store; safe in signal context.
    if let Some(handle) = STOP.get() {
        handle.stop();
    }
}

/// Route SIGINT to the given stop handle.
///
/// Installed once per process; later calls keep the first handle.
fn install_sigint_handler(handle: StopHandle) {
    if STOP.set(handle).is_ok() {
        unsafe {
            libc::signal(libc::SIGINT, handle_sigint as libc::sighandler_t);
        }
    }
}

/// Run the capture loop against the real microphone.
///
/// Captures utterances and prints each transcription to stdout until
/// interrupted, or after the first transcription when `once` is set.
pub fn run_capture(config: &Config, once: bool) -> Result<()> {
    config.validate()?;

    let transcriber = WhisperTranscriber::new(config.whisper())?;
    eprintln!("Loaded model: {}", transcriber.model_name());

    let classifier = WebRtcClassifier::new(
        config.audio.sample_rate,
        config.audio.frame_ms,
        config.audio.vad_mode,
    )?;

    let source = CpalFrameSource::new(
        config.audio.device.as_deref(),
        config.audio.sample_rate,
        config.audio.frame_ms,
    )?;

    let mut session = CaptureSession::new(config.session(), source, classifier, transcriber);
    let stop = session.stop_handle();
    install_sigint_handler(stop.clone());

    eprintln!("Listening... (Ctrl+C to stop)");

    loop {
        match session.capture_utterance()? {
            Some(text) => {
                println!("{}", text);
                if once {
                    break;
                }
            }
            None => {
                if stop.is_stopped() {
                    break;
                }
                // Empty transcription: keep listening.
            }
        }
    }

    Ok(())
}
