use crate::error::{Result, UttercapError};
use crate::segment::Segment;
use std::sync::{Arc, Mutex};

/// Trait for speech-to-text transcription of a finalized segment.
///
/// This trait allows swapping implementations (real Whisper vs mock). Each
/// call is independent: implementations must not condition on previous
/// segments, so decoding stays deterministic across utterances.
pub trait Transcriber {
    /// Transcribe a segment to text.
    ///
    /// # Returns
    /// The transcribed text, possibly empty when the segment holds no
    /// recognizable speech. Empty text is not an error.
    fn transcribe(&self, segment: &Segment) -> Result<String>;

    /// Get the name of the loaded model
    fn model_name(&self) -> &str;

    /// Check if the transcriber is ready
    fn is_ready(&self) -> bool;
}

/// Implement Transcriber for Arc<T> to allow sharing across sessions.
impl<T: Transcriber> Transcriber for Arc<T> {
    fn transcribe(&self, segment: &Segment) -> Result<String> {
        (**self).transcribe(segment)
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }

    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }
}

/// Mock transcriber for testing.
///
/// Records the samples of every segment it receives, so tests can assert on
/// what actually reached the transcription boundary.
#[derive(Debug, Clone)]
pub struct MockTranscriber {
    model_name: String,
    response: String,
    should_fail: bool,
    received: Arc<Mutex<Vec<Vec<f32>>>>,
}

impl MockTranscriber {
    /// Create a new mock transcriber with default settings
    pub fn new(model_name: &str) -> Self {
        Self {
            model_name: model_name.to_string(),
            response: "mock transcription".to_string(),
            should_fail: false,
            received: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Configure the mock to return a specific response
    pub fn with_response(mut self, response: &str) -> Self {
        self.response = response.to_string();
        self
    }

    /// Configure the mock to fail on transcribe
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Handle to the segments received so far (one sample vector per call).
    pub fn received(&self) -> Arc<Mutex<Vec<Vec<f32>>>> {
        Arc::clone(&self.received)
    }
}

impl Transcriber for MockTranscriber {
    fn transcribe(&self, segment: &Segment) -> Result<String> {
        if self.should_fail {
            return Err(UttercapError::Transcription {
                message: "mock transcription failure".to_string(),
            });
        }
        if let Ok(mut received) = self.received.lock() {
            received.push(segment.samples().to_vec());
        }
        Ok(self.response.clone())
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn is_ready(&self) -> bool {
        !self.should_fail
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::{Endpointer, EndpointConfig, Verdict};
    use crate::segment::{FinalizerConfig, SegmentFinalizer};
    use crate::audio::frame::Frame;

    fn segment() -> Segment {
        let cfg = EndpointConfig {
            min_voiced_frames: 1,
            required_silence_frames: 1,
        };
        let mut endpointer = Endpointer::new(cfg);
        for _ in 0..40 {
            endpointer.push(Frame::new(vec![3000i16; 480]), true);
        }
        let utterance = match endpointer.push(Frame::new(vec![0i16; 480]), false) {
            Verdict::Endpoint(u) => u,
            _ => unreachable!(),
        };
        SegmentFinalizer::new(FinalizerConfig::default())
            .finalize(utterance)
            .expect("segment discarded")
    }

    #[test]
    fn test_mock_transcriber_returns_response() {
        let transcriber = MockTranscriber::new("test-model").with_response("Hello, this is a test");
        let result = transcriber.transcribe(&segment());
        assert_eq!(result.unwrap(), "Hello, this is a test");
    }

    #[test]
    fn test_mock_transcriber_returns_error_when_configured() {
        let transcriber = MockTranscriber::new("test-model").with_failure();
        match transcriber.transcribe(&segment()) {
            Err(UttercapError::Transcription { message }) => {
                assert_eq!(message, "mock transcription failure");
            }
            _ => panic!("Expected Transcription error"),
        }
    }

    #[test]
    fn test_mock_transcriber_records_received_segments() {
        let transcriber = MockTranscriber::new("test-model");
        let seg = segment();
        transcriber.transcribe(&seg).unwrap();

        let received = transcriber.received();
        let received = received.lock().unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].len(), seg.len());
    }

    #[test]
    fn test_mock_transcriber_is_ready() {
        assert!(MockTranscriber::new("m").is_ready());
        assert!(!MockTranscriber::new("m").with_failure().is_ready());
    }

    #[test]
    fn test_transcriber_trait_is_object_safe() {
        let transcriber: Box<dyn Transcriber> =
            Box::new(MockTranscriber::new("test-model").with_response("boxed test"));

        assert_eq!(transcriber.model_name(), "test-model");
        assert_eq!(transcriber.transcribe(&segment()).unwrap(), "boxed test");
    }

    #[test]
    fn test_arc_transcriber_shares_state() {
        let transcriber = Arc::new(MockTranscriber::new("shared"));
        let received = transcriber.received();

        transcriber.transcribe(&segment()).unwrap();
        Arc::clone(&transcriber).transcribe(&segment()).unwrap();

        assert_eq!(received.lock().unwrap().len(), 2);
    }
}
