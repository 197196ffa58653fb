//! Classification preprocessing.
//!
//! Derives a cleaned copy of a frame for the classifier: DC offset removed
//! and low-level noise gated to zero. The raw frame is untouched — cleaning
//! improves classification accuracy, not audio quality, and the raw samples
//! are what eventually get transcribed.

/// Build the classification view of a frame.
///
/// Widens to f32, subtracts the frame's own mean, zeroes samples whose
/// centered magnitude is below `noise_gate`, then re-quantizes to i16.
/// Pure function; the input slice is never modified.
pub fn classification_view(samples: &[i16], noise_gate: i16) -> Vec<i16> {
    if samples.is_empty() {
        return Vec::new();
    }

    let mean = samples.iter().map(|&s| s as f32).sum::<f32>() / samples.len() as f32;
    let gate = noise_gate as f32;

    samples
        .iter()
        .map(|&s| {
            let centered = s as f32 - mean;
            if centered.abs() < gate {
                0
            } else {
                centered.clamp(i16::MIN as f32, i16::MAX as f32) as i16
            }
        })
        .collect()
}
