use crate::defaults;
use crate::error::{Result, UttercapError};
use crate::session::SessionConfig;
use crate::stt::whisper::WhisperConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub audio: AudioConfig,
    pub endpointing: EndpointingConfig,
    pub stt: SttConfig,
}

/// Audio capture and classification configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub device: Option<String>,
    pub sample_rate: u32,
    pub frame_ms: u32,
    pub noise_gate: i16,
    /// Classifier aggressiveness, 0 (permissive) to 3 (restrictive).
    pub vad_mode: u8,
}

/// Utterance endpointing configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EndpointingConfig {
    pub min_voiced_ms: u32,
    pub silence_ms: u32,
    pub min_utterance_secs: f32,
    pub pad_secs: f32,
}

/// Speech-to-text configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SttConfig {
    pub model_path: PathBuf,
    pub language: String,
    pub threads: Option<usize>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: None,
            sample_rate: defaults::SAMPLE_RATE,
            frame_ms: defaults::FRAME_MS,
            noise_gate: defaults::NOISE_GATE,
            vad_mode: defaults::VAD_MODE,
        }
    }
}

impl Default for EndpointingConfig {
    fn default() -> Self {
        Self {
            min_voiced_ms: defaults::MIN_VOICED_MS,
            silence_ms: defaults::SILENCE_MS,
            min_utterance_secs: defaults::MIN_UTTERANCE_SECS,
            pad_secs: defaults::PAD_SECS,
        }
    }
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(defaults::DEFAULT_MODEL_PATH),
            language: defaults::DEFAULT_LANGUAGE.to_string(),
            threads: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Missing fields will use default values. The loaded configuration is
    /// validated before being returned.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                UttercapError::ConfigFileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                UttercapError::Io(e)
            }
        })?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file, or defaults if the file doesn't exist
    ///
    /// Only a missing file falls back to defaults. Invalid TOML and
    /// validation failures are still errors.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(UttercapError::ConfigFileNotFound { .. }) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    /// Check every field against the ranges the pipeline accepts.
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.audio.sample_rate, 8000 | 16000 | 32000 | 48000) {
            return Err(UttercapError::ConfigInvalidValue {
                key: "audio.sample_rate".to_string(),
                message: format!(
                    "must be 8000, 16000, 32000 or 48000, got {}",
                    self.audio.sample_rate
                ),
            });
        }
        if !matches!(self.audio.frame_ms, 10 | 20 | 30) {
            return Err(UttercapError::ConfigInvalidValue {
                key: "audio.frame_ms".to_string(),
                message: format!("must be 10, 20 or 30, got {}", self.audio.frame_ms),
            });
        }
        if self.audio.vad_mode > 3 {
            return Err(UttercapError::ConfigInvalidValue {
                key: "audio.vad_mode".to_string(),
                message: format!("must be 0-3, got {}", self.audio.vad_mode),
            });
        }
        if self.audio.noise_gate < 0 {
            return Err(UttercapError::ConfigInvalidValue {
                key: "audio.noise_gate".to_string(),
                message: format!("must be non-negative, got {}", self.audio.noise_gate),
            });
        }
        if self.endpointing.min_voiced_ms == 0 {
            return Err(UttercapError::ConfigInvalidValue {
                key: "endpointing.min_voiced_ms".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.endpointing.silence_ms == 0 {
            return Err(UttercapError::ConfigInvalidValue {
                key: "endpointing.silence_ms".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if !self.endpointing.min_utterance_secs.is_finite()
            || self.endpointing.min_utterance_secs < 0.0
        {
            return Err(UttercapError::ConfigInvalidValue {
                key: "endpointing.min_utterance_secs".to_string(),
                message: format!(
                    "must be non-negative, got {}",
                    self.endpointing.min_utterance_secs
                ),
            });
        }
        if !self.endpointing.pad_secs.is_finite() || self.endpointing.pad_secs < 0.0 {
            return Err(UttercapError::ConfigInvalidValue {
                key: "endpointing.pad_secs".to_string(),
                message: format!("must be non-negative, got {}", self.endpointing.pad_secs),
            });
        }
        if self.stt.language.is_empty() {
            return Err(UttercapError::ConfigInvalidValue {
                key: "stt.language".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - UTTERCAP_MODEL → stt.model_path
    /// - UTTERCAP_LANGUAGE → stt.language
    /// - UTTERCAP_AUDIO_DEVICE → audio.device
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(model) = std::env::var("UTTERCAP_MODEL") {
            if !model.is_empty() {
                self.stt.model_path = PathBuf::from(model);
            }
        }

        if let Ok(language) = std::env::var("UTTERCAP_LANGUAGE") {
            if !language.is_empty() {
                self.stt.language = language;
            }
        }

        if let Ok(device) = std::env::var("UTTERCAP_AUDIO_DEVICE") {
            if !device.is_empty() {
                self.audio.device = Some(device);
            }
        }

        self
    }

    /// The session-level view of this configuration.
    pub fn session(&self) -> SessionConfig {
        SessionConfig {
            sample_rate: self.audio.sample_rate,
            frame_ms: self.audio.frame_ms,
            noise_gate: self.audio.noise_gate,
            min_voiced_ms: self.endpointing.min_voiced_ms,
            silence_ms: self.endpointing.silence_ms,
            min_utterance_secs: self.endpointing.min_utterance_secs,
            pad_secs: self.endpointing.pad_secs,
        }
    }

    /// The transcriber-level view of this configuration.
    pub fn whisper(&self) -> WhisperConfig {
        WhisperConfig {
            model_path: self.stt.model_path.clone(),
            language: self.stt.language.clone(),
            threads: self.stt.threads,
        }
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/uttercap/config.toml on Linux. `None` when no
    /// config directory can be determined for this user.
    #[cfg(feature = "cli")]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("uttercap").join("config.toml"))
    }
}
