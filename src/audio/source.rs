use crate::audio::frame::Frame;
use crate::error::{Result, UttercapError};
use std::collections::VecDeque;
use std::thread;
use std::time::Duration;

/// Trait for frame-oriented audio sources.
///
/// This trait allows swapping implementations (real audio device, WAV file,
/// or mock). `next_frame` is the sole blocking operation in the capture
/// pipeline: it suspends until exactly one frame's worth of samples is
/// available.
pub trait FrameSource {
    /// Acquire the device and start capturing.
    ///
    /// # Returns
    /// Ok(()) if the source started successfully, or an error
    fn start(&mut self) -> Result<()>;

    /// Block until one full frame is available and return it.
    ///
    /// # Errors
    /// Device unavailability or I/O failure is fatal and propagates
    /// immediately; retrying is the caller's decision.
    fn next_frame(&mut self) -> Result<Frame>;

    /// Stop capturing and release the device.
    ///
    /// # Returns
    /// Ok(()) if the source stopped successfully, or an error
    fn stop(&mut self) -> Result<()>;
}

/// Mock frame source for testing.
///
/// Serves a scripted sequence of frames, then fails with a device error as
/// if the input had disconnected. Optionally serves endless silence instead,
/// for cancellation tests.
#[derive(Debug, Clone)]
pub struct MockFrameSource {
    is_started: bool,
    frames: VecDeque<Frame>,
    endless_silence: Option<usize>,
    should_fail_start: bool,
    should_fail_stop: bool,
    error_message: String,
}

impl MockFrameSource {
    /// Create a mock source that serves the given frames in order.
    pub fn new(frames: Vec<Frame>) -> Self {
        Self {
            is_started: false,
            frames: frames.into(),
            endless_silence: None,
            should_fail_start: false,
            should_fail_stop: false,
            error_message: "mock frame source exhausted".to_string(),
        }
    }

    /// Create a mock source that serves silent frames of the given length forever.
    pub fn endless_silence(frame_len: usize) -> Self {
        let mut source = Self::new(Vec::new());
        source.endless_silence = Some(frame_len);
        source
    }

    /// Configure the mock to fail on start.
    pub fn with_start_failure(mut self) -> Self {
        self.should_fail_start = true;
        self
    }

    /// Configure the mock to fail on stop.
    pub fn with_stop_failure(mut self) -> Self {
        self.should_fail_stop = true;
        self
    }

    /// Configure the error message used for injected failures.
    pub fn with_error_message(mut self, message: &str) -> Self {
        self.error_message = message.to_string();
        self
    }

    /// Check if the source is started.
    pub fn is_started(&self) -> bool {
        self.is_started
    }
}

impl FrameSource for MockFrameSource {
    fn start(&mut self) -> Result<()> {
        if self.should_fail_start {
            Err(UttercapError::Device {
                message: self.error_message.clone(),
            })
        } else {
            self.is_started = true;
            Ok(())
        }
    }

    fn next_frame(&mut self) -> Result<Frame> {
        if let Some(frame) = self.frames.pop_front() {
            return Ok(frame);
        }
        if let Some(frame_len) = self.endless_silence {
            // Pace the endless stream so cancellation tests don't spin hot.
            thread::sleep(Duration::from_millis(1));
            return Ok(Frame::new(vec![0i16; frame_len]));
        }
        Err(UttercapError::Device {
            message: self.error_message.clone(),
        })
    }

    fn stop(&mut self) -> Result<()> {
        if self.should_fail_stop {
            Err(UttercapError::Device {
                message: self.error_message.clone(),
            })
        } else {
            self.is_started = false;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames_of(values: &[i16], len: usize) -> Vec<Frame> {
        values.iter().map(|&v| Frame::new(vec![v; len])).collect()
    }

    #[test]
    fn test_mock_serves_scripted_frames_in_order() {
        let mut source = MockFrameSource::new(frames_of(&[1, 2, 3], 4));

        assert_eq!(source.next_frame().unwrap().samples(), &[1, 1, 1, 1]);
        assert_eq!(source.next_frame().unwrap().samples(), &[2, 2, 2, 2]);
        assert_eq!(source.next_frame().unwrap().samples(), &[3, 3, 3, 3]);
    }

    #[test]
    fn test_mock_fails_when_exhausted() {
        let mut source = MockFrameSource::new(frames_of(&[1], 4));

        assert!(source.next_frame().is_ok());
        match source.next_frame() {
            Err(UttercapError::Device { message }) => {
                assert_eq!(message, "mock frame source exhausted");
            }
            other => panic!("Expected Device error, got {:?}", other.map(|f| f.len())),
        }
    }

    #[test]
    fn test_mock_endless_silence_never_exhausts() {
        let mut source = MockFrameSource::endless_silence(480);
        for _ in 0..5 {
            let frame = source.next_frame().unwrap();
            assert_eq!(frame.len(), 480);
            assert!(frame.samples().iter().all(|&s| s == 0));
        }
    }

    #[test]
    fn test_mock_start_stop_state() {
        let mut source = MockFrameSource::new(Vec::new());
        assert!(!source.is_started());

        source.start().unwrap();
        assert!(source.is_started());

        source.stop().unwrap();
        assert!(!source.is_started());
    }

    #[test]
    fn test_mock_start_failure() {
        let mut source = MockFrameSource::new(Vec::new())
            .with_start_failure()
            .with_error_message("device unplugged");

        match source.start() {
            Err(UttercapError::Device { message }) => {
                assert_eq!(message, "device unplugged");
            }
            _ => panic!("Expected Device error"),
        }
        assert!(!source.is_started());
    }

    #[test]
    fn test_mock_stop_failure() {
        let mut source = MockFrameSource::new(Vec::new()).with_stop_failure();
        source.start().unwrap();
        assert!(source.stop().is_err());
    }

    #[test]
    fn test_frame_source_trait_is_object_safe() {
        let mut source: Box<dyn FrameSource> =
            Box::new(MockFrameSource::new(frames_of(&[7], 2)));

        source.start().unwrap();
        assert_eq!(source.next_frame().unwrap().samples(), &[7, 7]);
        source.stop().unwrap();
    }
}
