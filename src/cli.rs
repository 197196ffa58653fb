//! Command-line interface for uttercap
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Hands-free utterance capture and transcription
#[derive(Parser, Debug)]
#[command(
    name = "uttercap",
    version,
    about = "Capture utterances from the microphone and transcribe them"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Audio input device (e.g., pipewire, hw:0)
    #[arg(long, value_name = "DEVICE")]
    pub device: Option<String>,

    /// Path to the Whisper model file
    #[arg(long, value_name = "PATH")]
    pub model: Option<PathBuf>,

    /// Language code for transcription (e.g., en, de, es)
    #[arg(long, value_name = "LANG")]
    pub language: Option<String>,

    /// Classifier aggressiveness, 0 (permissive) to 3 (restrictive)
    #[arg(long, value_name = "MODE")]
    pub aggressiveness: Option<u8>,

    /// Exit after the first transcription (default: keep listening)
    #[arg(long)]
    pub once: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List available audio input devices
    Devices,

    /// View configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration inspection actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Print the default configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_default_command() {
        let cli = Cli::try_parse_from(["uttercap"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
        assert!(cli.device.is_none());
        assert!(cli.model.is_none());
        assert!(cli.language.is_none());
        assert!(cli.aggressiveness.is_none());
        assert!(!cli.once);
    }

    #[test]
    fn test_parse_with_options() {
        let cli = Cli::try_parse_from([
            "uttercap",
            "--device",
            "pipewire",
            "--model",
            "models/ggml-base.bin",
            "--language",
            "de",
            "--aggressiveness",
            "3",
            "--once",
        ])
        .unwrap();

        assert_eq!(cli.device.as_deref(), Some("pipewire"));
        assert_eq!(cli.model, Some(PathBuf::from("models/ggml-base.bin")));
        assert_eq!(cli.language.as_deref(), Some("de"));
        assert_eq!(cli.aggressiveness, Some(3));
        assert!(cli.once);
    }

    #[test]
    fn test_parse_devices() {
        let cli = Cli::try_parse_from(["uttercap", "devices"]).unwrap();
        match cli.command {
            Some(Commands::Devices) => {}
            _ => panic!("Expected Devices command"),
        }
    }

    #[test]
    fn test_parse_global_config() {
        let cli = Cli::try_parse_from(["uttercap", "--config", "/path/to/config.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/path/to/config.toml")));
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_global_options_after_command() {
        let cli =
            Cli::try_parse_from(["uttercap", "devices", "--config", "/tmp/config.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/config.toml")));
    }

    #[test]
    fn test_parse_config_show() {
        let cli = Cli::try_parse_from(["uttercap", "config", "show"]).unwrap();
        match cli.command {
            Some(Commands::Config { action }) => match action {
                ConfigAction::Show => {}
                _ => panic!("Expected Show action"),
            },
            _ => panic!("Expected Config command"),
        }
    }

    #[test]
    fn test_parse_config_path() {
        let cli = Cli::try_parse_from(["uttercap", "config", "path"]).unwrap();
        match cli.command {
            Some(Commands::Config { action }) => match action {
                ConfigAction::Path => {}
                _ => panic!("Expected Path action"),
            },
            _ => panic!("Expected Config command"),
        }
    }

    #[test]
    fn test_config_requires_subcommand() {
        let result = Cli::try_parse_from(["uttercap", "config"]);
        let err = result.unwrap_err();
        assert_eq!(
            err.kind(),
            clap::error::ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
        );
    }

    #[test]
    fn test_invalid_command_returns_error() {
        let result = Cli::try_parse_from(["uttercap", "invalid"]);
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidSubcommand);
    }

    #[test]
    fn test_version_flag() {
        let result = Cli::try_parse_from(["uttercap", "--version"]);
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }
}
