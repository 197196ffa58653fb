//! Capture session: the pipeline that turns raw frames into text.
//!
//! A session wires a frame source, a speech classifier, an endpointer, a
//! segment finalizer, and a transcriber together and drives them in a
//! blocking loop. All cross-stage state lives in this object; two sessions
//! never share endpointing state or buffered audio.

use crate::audio::source::FrameSource;
use crate::defaults;
use crate::endpoint::{EndpointConfig, Endpointer, Verdict};
use crate::error::Result;
use crate::segment::{FinalizerConfig, SegmentFinalizer};
use crate::stt::transcriber::Transcriber;
use crate::vad::classifier::SpeechClassifier;
use crate::vad::preprocess::classification_view;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Pipeline-wide tuning knobs.
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    pub sample_rate: u32,
    pub frame_ms: u32,
    /// Amplitude floor for the classification view (raw audio is untouched).
    pub noise_gate: i16,
    pub min_voiced_ms: u32,
    pub silence_ms: u32,
    pub min_utterance_secs: f32,
    pub pad_secs: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sample_rate: defaults::SAMPLE_RATE,
            frame_ms: defaults::FRAME_MS,
            noise_gate: defaults::NOISE_GATE,
            min_voiced_ms: defaults::MIN_VOICED_MS,
            silence_ms: defaults::SILENCE_MS,
            min_utterance_secs: defaults::MIN_UTTERANCE_SECS,
            pad_secs: defaults::PAD_SECS,
        }
    }
}

impl SessionConfig {
    /// Endpointing thresholds in frames.
    pub fn endpoint_config(&self) -> EndpointConfig {
        EndpointConfig::from_durations(self.min_voiced_ms, self.silence_ms, self.frame_ms)
    }

    /// Finalization thresholds.
    pub fn finalizer_config(&self) -> FinalizerConfig {
        FinalizerConfig {
            min_utterance_secs: self.min_utterance_secs,
            pad_secs: self.pad_secs,
            sample_rate: self.sample_rate,
        }
    }

    /// Samples per frame.
    pub fn frame_len(&self) -> usize {
        defaults::frame_len(self.sample_rate, self.frame_ms)
    }
}

/// Cloneable handle that requests a session to stop.
///
/// The flag is sticky: once raised it stays raised, and a session observing
/// it returns `Ok(None)` at the next frame boundary. Safe to use from a
/// signal handler or another thread.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    flag: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the session to stop.
    pub fn stop(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether a stop has been requested.
    pub fn is_stopped(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// A capture session over a source, a classifier, and a transcriber.
pub struct CaptureSession<S: FrameSource, C: SpeechClassifier, T: Transcriber> {
    config: SessionConfig,
    source: S,
    classifier: C,
    transcriber: T,
    endpointer: Endpointer,
    finalizer: SegmentFinalizer,
    stop: StopHandle,
}

impl<S: FrameSource, C: SpeechClassifier, T: Transcriber> CaptureSession<S, C, T> {
    pub fn new(config: SessionConfig, source: S, classifier: C, transcriber: T) -> Self {
        let endpointer = Endpointer::new(config.endpoint_config());
        let finalizer = SegmentFinalizer::new(config.finalizer_config());
        Self {
            config,
            source,
            classifier,
            transcriber,
            endpointer,
            finalizer,
            stop: StopHandle::new(),
        }
    }

    /// Handle for stopping this session from another thread.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Capture one utterance and transcribe it.
    ///
    /// Blocks until an utterance is accepted and transcribed, an error
    /// occurs, or a stop is requested. Utterances that fail the minimum
    /// duration filter are discarded and capture resumes within the same
    /// call. Returns `Ok(None)` on a stop request or when the transcription
    /// comes back empty.
    ///
    /// The source is started on entry and stopped on every exit path. A
    /// pipeline error takes precedence over an error from stopping the
    /// source.
    pub fn capture_utterance(&mut self) -> Result<Option<String>> {
        self.endpointer.reset();
        self.source.start()?;
        let outcome = self.run_loop();
        let stop_result = self.source.stop();
        match outcome {
            Ok(text) => stop_result.map(|_| text),
            Err(e) => Err(e),
        }
    }

    fn run_loop(&mut self) -> Result<Option<String>> {
        loop {
            if self.stop.is_stopped() {
                return Ok(None);
            }

            let frame = self.source.next_frame()?;
            let view = classification_view(frame.samples(), self.config.noise_gate);
            let is_speech = self.classifier.is_speech(&view)?;

            // Raw frames flow into the buffer; the gated view is used only
            // for classification.
            if let Verdict::Endpoint(utterance) = self.endpointer.push(frame, is_speech) {
                match self.finalizer.finalize(utterance) {
                    Some(segment) => {
                        let text = self.transcriber.transcribe(&segment)?;
                        let text = text.trim();
                        if text.is_empty() {
                            return Ok(None);
                        }
                        return Ok(Some(text.to_string()));
                    }
                    // Too short: soft discard, keep listening.
                    None => continue,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::frame::Frame;
    use crate::audio::source::MockFrameSource;
    use crate::error::UttercapError;
    use crate::stt::transcriber::MockTranscriber;
    use crate::vad::classifier::ScriptedClassifier;

    const FRAME_LEN: usize = 480;

    fn speech_frames(n: usize) -> Vec<Frame> {
        (0..n).map(|_| Frame::new(vec![3000i16; FRAME_LEN])).collect()
    }

    fn silence_frames(n: usize) -> Vec<Frame> {
        (0..n).map(|_| Frame::new(vec![0i16; FRAME_LEN])).collect()
    }

    /// leading silence, then speech, then trailing silence
    fn scripted_input(lead: usize, speech: usize, tail: usize) -> (MockFrameSource, ScriptedClassifier) {
        let mut frames = silence_frames(lead);
        frames.extend(speech_frames(speech));
        frames.extend(silence_frames(tail));

        let mut verdicts = vec![false; lead];
        verdicts.extend(std::iter::repeat(true).take(speech));
        verdicts.extend(std::iter::repeat(false).take(tail));

        (
            MockFrameSource::new(frames),
            ScriptedClassifier::new(verdicts),
        )
    }

    #[test]
    fn test_end_to_end_capture_and_transcription() {
        let (source, classifier) = scripted_input(5, 10, 54);
        let transcriber = MockTranscriber::new("test").with_response("hello");
        let received = transcriber.received();

        let mut session =
            CaptureSession::new(SessionConfig::default(), source, classifier, transcriber);
        let result = session.capture_utterance().unwrap();

        assert_eq!(result, Some("hello".to_string()));

        // 10 speech + 50 trailing silence frames, plus the 200ms pad
        let received = received.lock().unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].len(), 60 * FRAME_LEN + 3200);
    }

    #[test]
    fn test_source_error_propagates() {
        let source = MockFrameSource::new(speech_frames(3));
        let classifier = ScriptedClassifier::new(vec![true; 100]);
        let transcriber = MockTranscriber::new("test");

        let mut session =
            CaptureSession::new(SessionConfig::default(), source, classifier, transcriber);
        match session.capture_utterance() {
            Err(UttercapError::Device { .. }) => {}
            other => panic!("Expected Device error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_classifier_error_propagates() {
        let source = MockFrameSource::new(speech_frames(10));
        let classifier = ScriptedClassifier::new(vec![]).with_failure();
        let transcriber = MockTranscriber::new("test");

        let mut session =
            CaptureSession::new(SessionConfig::default(), source, classifier, transcriber);
        match session.capture_utterance() {
            Err(UttercapError::ClassifierContract { .. }) => {}
            other => panic!("Expected ClassifierContract error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_empty_transcription_yields_none() {
        let (source, classifier) = scripted_input(0, 10, 50);
        let transcriber = MockTranscriber::new("test").with_response("   ");

        let mut session =
            CaptureSession::new(SessionConfig::default(), source, classifier, transcriber);
        assert_eq!(session.capture_utterance().unwrap(), None);
    }

    #[test]
    fn test_short_utterance_discarded_and_capture_resumes() {
        // First burst: 8 speech + 50 silence = 58 frames (1.74s) finalizes,
        // but a 2.0s minimum discards it. Second burst is long enough.
        let mut frames = speech_frames(8);
        frames.extend(silence_frames(50));
        frames.extend(speech_frames(30));
        frames.extend(silence_frames(50));

        let mut verdicts = vec![true; 8];
        verdicts.extend(std::iter::repeat(false).take(50));
        verdicts.extend(std::iter::repeat(true).take(30));
        verdicts.extend(std::iter::repeat(false).take(50));

        let config = SessionConfig {
            min_utterance_secs: 2.0,
            ..SessionConfig::default()
        };
        let transcriber = MockTranscriber::new("test").with_response("second");
        let received = transcriber.received();

        let mut session = CaptureSession::new(
            config,
            MockFrameSource::new(frames),
            ScriptedClassifier::new(verdicts),
            transcriber,
        );

        let result = session.capture_utterance().unwrap();
        assert_eq!(result, Some("second".to_string()));
        // Only the second utterance reached the transcriber.
        assert_eq!(received.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_transcription_error_propagates() {
        let (source, classifier) = scripted_input(0, 10, 50);
        let transcriber = MockTranscriber::new("test").with_failure();

        let mut session =
            CaptureSession::new(SessionConfig::default(), source, classifier, transcriber);
        match session.capture_utterance() {
            Err(UttercapError::Transcription { .. }) => {}
            other => panic!("Expected Transcription error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_stop_handle_interrupts_capture() {
        let source = MockFrameSource::endless_silence(FRAME_LEN);
        let classifier = ScriptedClassifier::default();
        let transcriber = MockTranscriber::new("test");

        let mut session =
            CaptureSession::new(SessionConfig::default(), source, classifier, transcriber);
        let handle = session.stop_handle();

        let stopper = std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(20));
            handle.stop();
        });

        let result = session.capture_utterance().unwrap();
        assert_eq!(result, None);
        stopper.join().unwrap();
    }

    #[test]
    fn test_stop_flag_is_sticky() {
        let (source, classifier) = scripted_input(0, 10, 50);
        let transcriber = MockTranscriber::new("test");

        let mut session =
            CaptureSession::new(SessionConfig::default(), source, classifier, transcriber);
        session.stop_handle().stop();

        // Already stopped: no frames should be consumed.
        assert_eq!(session.capture_utterance().unwrap(), None);
        assert_eq!(session.capture_utterance().unwrap(), None);
    }

    #[test]
    fn test_session_config_derived_thresholds() {
        let config = SessionConfig::default();
        let ep = config.endpoint_config();
        assert_eq!(ep.min_voiced_frames, 8);
        assert_eq!(ep.required_silence_frames, 50);
        assert_eq!(config.frame_len(), 480);

        let fin = config.finalizer_config();
        assert!((fin.min_utterance_secs - 0.7).abs() < 1e-6);
        assert!((fin.pad_secs - 0.2).abs() < 1e-6);
    }
}
