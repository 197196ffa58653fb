//! Real audio capture using CPAL (Cross-Platform Audio Library).

use crate::audio::frame::Frame;
use crate::audio::source::FrameSource;
use crate::defaults;
use crate::error::{Result, UttercapError};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Run a closure with stderr temporarily redirected to /dev/null.
///
/// This suppresses noisy ALSA/JACK/PipeWire messages that CPAL triggers
/// when probing audio backends. The messages are harmless but confusing to users.
///
/// # Safety
/// Uses `libc::dup`/`libc::dup2` to save and restore file descriptor 2 (stderr).
/// Safe as long as no other thread is concurrently manipulating fd 2.
fn with_suppressed_stderr<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    unsafe {
        let saved_fd = libc::dup(2);
        let devnull = libc::open(c"/dev/null".as_ptr(), libc::O_WRONLY);
        if saved_fd >= 0 && devnull >= 0 {
            libc::dup2(devnull, 2);
            libc::close(devnull);
        }

        let result = f();

        if saved_fd >= 0 {
            libc::dup2(saved_fd, 2);
            libc::close(saved_fd);
        }

        result
    }
}

/// Preferred device names for GNOME/PipeWire environments.
const PREFERRED_DEVICES: &[&str] = &["pipewire", "pulse", "PulseAudio"];

/// Device name patterns to filter out (not useful for voice input).
const FILTERED_PATTERNS: &[&str] = &[
    "surround",
    "front:",
    "rear:",
    "center:",
    "side:",
    "Digital Output",
    "HDMI",
    "S/PDIF",
];

fn should_filter_device(name: &str) -> bool {
    let lower = name.to_lowercase();
    FILTERED_PATTERNS
        .iter()
        .any(|pattern| lower.contains(&pattern.to_lowercase()))
}

fn is_preferred_device(name: &str) -> bool {
    let lower = name.to_lowercase();
    PREFERRED_DEVICES
        .iter()
        .any(|pref| lower.contains(&pref.to_lowercase()))
}

/// List all available audio input devices with filtering and recommendations.
///
/// # Returns
/// A vector of device names, with preferred devices marked with "\[recommended\]".
/// Filters out obviously unusable devices (surround channels, HDMI, etc.).
///
/// # Errors
/// Returns `UttercapError::Device` if device enumeration fails.
pub fn list_devices() -> Result<Vec<String>> {
    let (host, devices) = with_suppressed_stderr(|| {
        let host = cpal::default_host();
        let devices = host.input_devices();
        (host, devices)
    });
    let _ = host; // keep host alive while iterating devices
    let devices = devices.map_err(|e| UttercapError::Device {
        message: format!("Failed to enumerate input devices: {}", e),
    })?;

    let mut device_names = Vec::new();
    for device in devices {
        if let Ok(name) = device.name() {
            if should_filter_device(&name) {
                continue;
            }

            if is_preferred_device(&name) {
                device_names.push(format!("{} [recommended]", name));
            } else {
                device_names.push(name);
            }
        }
    }

    Ok(device_names)
}

/// Get the best default input device, preferring PipeWire/PulseAudio.
///
/// This ensures we respect the desktop's audio device selection.
///
/// # Errors
/// Returns `UttercapError::AudioDeviceNotFound` if no input device is available.
fn get_best_default_device() -> Result<cpal::Device> {
    with_suppressed_stderr(|| {
        let host = cpal::default_host();

        if let Ok(devices) = host.input_devices() {
            for device in devices {
                if let Ok(name) = device.name() {
                    if is_preferred_device(&name) {
                        return Ok(device);
                    }
                }
            }
        }

        host.default_input_device()
            .ok_or_else(|| UttercapError::AudioDeviceNotFound {
                device: "default".to_string(),
            })
    })
}

/// Wrapper for cpal::Stream to make it Send.
///
/// SAFETY: the stream is only touched while the owning `CpalFrameSource` is
/// borrowed mutably, so access is exclusive.
struct SendableStream(cpal::Stream);

unsafe impl Send for SendableStream {}

/// Microphone frame source backed by CPAL.
///
/// Captures 16-bit PCM mono at the configured rate. The stream callback
/// appends samples to a shared buffer; `next_frame` blocks until one full
/// frame has accumulated and pops exactly that many samples, so frames are
/// contiguous and non-overlapping.
pub struct CpalFrameSource {
    device: cpal::Device,
    stream: Option<SendableStream>,
    buffer: Arc<Mutex<Vec<i16>>>,
    stream_error: Arc<Mutex<Option<String>>>,
    sample_rate: u32,
    frame_len: usize,
}

impl CpalFrameSource {
    /// Create a new CPAL frame source.
    ///
    /// # Arguments
    /// * `device_name` - Optional device name. If None, uses the default input device.
    /// * `sample_rate` - Capture rate in Hz.
    /// * `frame_ms` - Frame duration in milliseconds.
    ///
    /// # Errors
    /// Returns `UttercapError::AudioDeviceNotFound` if the named device does
    /// not exist, or `UttercapError::Device` if enumeration fails.
    pub fn new(device_name: Option<&str>, sample_rate: u32, frame_ms: u32) -> Result<Self> {
        let device = with_suppressed_stderr(|| {
            let host = cpal::default_host();

            if let Some(name) = device_name {
                let devices = host.input_devices().map_err(|e| UttercapError::Device {
                    message: format!("Failed to enumerate devices: {}", e),
                })?;

                for dev in devices {
                    if let Ok(dev_name) = dev.name() {
                        if dev_name == name {
                            return Ok(dev);
                        }
                    }
                }

                Err(UttercapError::AudioDeviceNotFound {
                    device: name.to_string(),
                })
            } else {
                get_best_default_device()
            }
        })?;

        Ok(Self {
            device,
            stream: None,
            buffer: Arc::new(Mutex::new(Vec::new())),
            stream_error: Arc::new(Mutex::new(None)),
            sample_rate,
            frame_len: defaults::frame_len(sample_rate, frame_ms),
        })
    }

    /// Build the input stream at the requested rate, mono.
    ///
    /// Tries i16 first (zero-copy), then f32 for devices that only expose
    /// float formats. PipeWire/PulseAudio convert transparently to the
    /// requested config.
    fn build_stream(&self) -> Result<cpal::Stream> {
        let config = cpal::StreamConfig {
            channels: 1,
            sample_rate: cpal::SampleRate(self.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let error_slot = Arc::clone(&self.stream_error);
        let err_callback = move |err: cpal::StreamError| {
            if let Ok(mut slot) = error_slot.lock() {
                slot.get_or_insert_with(|| err.to_string());
            }
        };

        let buffer = Arc::clone(&self.buffer);
        if let Ok(stream) = self.device.build_input_stream(
            &config,
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                if let Ok(mut buf) = buffer.lock() {
                    buf.extend_from_slice(data);
                }
            },
            err_callback.clone(),
            None,
        ) {
            return Ok(stream);
        }

        let buffer = Arc::clone(&self.buffer);
        self.device
            .build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if let Ok(mut buf) = buffer.lock() {
                        buf.extend(
                            data.iter()
                                .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16),
                        );
                    }
                },
                err_callback,
                None,
            )
            .map_err(|e| UttercapError::Device {
                message: format!(
                    "Failed to build {}Hz mono input stream: {}",
                    self.sample_rate, e
                ),
            })
    }

    /// Returns any error reported by the stream callback since start.
    fn take_stream_error(&self) -> Option<String> {
        self.stream_error.lock().ok().and_then(|mut slot| slot.take())
    }
}

impl FrameSource for CpalFrameSource {
    fn start(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Ok(()); // Already started
        }

        if let Ok(mut buf) = self.buffer.lock() {
            buf.clear();
        }
        if let Ok(mut slot) = self.stream_error.lock() {
            *slot = None;
        }

        let stream = self.build_stream()?;
        stream.play().map_err(|e| UttercapError::Device {
            message: format!("Failed to start audio stream: {}", e),
        })?;

        self.stream = Some(SendableStream(stream));
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Frame> {
        if self.stream.is_none() {
            return Err(UttercapError::Device {
                message: "next_frame called before start".to_string(),
            });
        }

        loop {
            if let Some(message) = self.take_stream_error() {
                return Err(UttercapError::Device { message });
            }

            {
                let mut buffer = self.buffer.lock().map_err(|e| UttercapError::Device {
                    message: format!("Failed to lock audio buffer: {}", e),
                })?;
                if buffer.len() >= self.frame_len {
                    let samples: Vec<i16> = buffer.drain(..self.frame_len).collect();
                    return Ok(Frame::new(samples));
                }
            }

            thread::sleep(Duration::from_millis(5));
        }
    }

    fn stop(&mut self) -> Result<()> {
        if let Some(stream) = self.stream.take() {
            stream.0.pause().map_err(|e| UttercapError::Device {
                message: format!("Failed to stop audio stream: {}", e),
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_filter_device() {
        assert!(should_filter_device("surround51"));
        assert!(should_filter_device("front:CARD=PCH"));
        assert!(should_filter_device("HDMI Output"));
        assert!(should_filter_device("Digital Output S/PDIF"));
        assert!(!should_filter_device("pipewire"));
        assert!(!should_filter_device("Built-in Audio"));
    }

    #[test]
    fn test_is_preferred_device() {
        assert!(is_preferred_device("pipewire"));
        assert!(is_preferred_device("PipeWire"));
        assert!(is_preferred_device("PulseAudio"));
        assert!(!is_preferred_device("hw:0,0"));
        assert!(!is_preferred_device("default"));
    }

    #[test]
    fn test_create_with_invalid_device_name() {
        let source = CpalFrameSource::new(Some("NonExistentDevice12345"), 16000, 30);
        match source {
            Err(UttercapError::AudioDeviceNotFound { device }) => {
                assert_eq!(device, "NonExistentDevice12345");
            }
            Err(UttercapError::Device { .. }) => {
                // Acceptable on hosts with no audio subsystem at all
            }
            _ => panic!("Expected AudioDeviceNotFound or Device error"),
        }
    }

    #[test]
    #[ignore] // Requires audio hardware
    fn test_list_devices_returns_at_least_one_device() {
        let devices = list_devices().expect("Failed to list devices");
        assert!(!devices.is_empty(), "Expected at least one audio device");
    }

    #[test]
    #[ignore] // Requires audio hardware
    fn test_capture_produces_fixed_size_frames() {
        let mut source =
            CpalFrameSource::new(None, 16000, 30).expect("Failed to create frame source");
        source.start().expect("Failed to start");

        for _ in 0..3 {
            let frame = source.next_frame().expect("Failed to read frame");
            assert_eq!(frame.len(), 480);
        }

        source.stop().expect("Failed to stop");
    }

    #[test]
    #[ignore] // Requires audio hardware
    fn test_start_stop_multiple_times() {
        let mut source =
            CpalFrameSource::new(None, 16000, 30).expect("Failed to create frame source");

        for _ in 0..3 {
            assert!(source.start().is_ok());
            assert!(source.stop().is_ok());
        }
    }
}
