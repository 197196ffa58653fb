//! The fixed-size audio frame, the unit of classification and buffering.

/// A fixed-duration slice of raw 16-bit PCM samples.
///
/// Frames are immutable once captured: the samples stored here are exactly
/// what the device produced and exactly what will be transcribed. The
/// cleaned copy used for classification is derived separately and never
/// written back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    samples: Vec<i16>,
}

impl Frame {
    /// Creates a frame from raw samples.
    pub fn new(samples: Vec<i16>) -> Self {
        Self { samples }
    }

    /// The raw samples of this frame.
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Number of samples in this frame.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true if the frame holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Returns the duration of this frame in milliseconds.
    pub fn duration_ms(&self, sample_rate: u32) -> u32 {
        (self.samples.len() as u32 * 1000) / sample_rate
    }

    /// Consumes the frame, yielding its samples.
    pub fn into_samples(self) -> Vec<i16> {
        self.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_duration() {
        let frame = Frame::new(vec![0i16; 480]);
        assert_eq!(frame.duration_ms(16000), 30);

        let frame = Frame::new(vec![0i16; 16000]);
        assert_eq!(frame.duration_ms(16000), 1000);
    }

    #[test]
    fn test_frame_accessors() {
        let frame = Frame::new(vec![1i16, 2, 3]);
        assert_eq!(frame.len(), 3);
        assert!(!frame.is_empty());
        assert_eq!(frame.samples(), &[1, 2, 3]);
        assert_eq!(frame.into_samples(), vec![1, 2, 3]);
    }
}
