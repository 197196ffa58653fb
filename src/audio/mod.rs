//! Audio capture: frame types and frame sources.

#[cfg(feature = "cpal-audio")]
pub mod capture;
pub mod frame;
pub mod source;
pub mod wav;

pub use frame::Frame;
pub use source::{FrameSource, MockFrameSource};
