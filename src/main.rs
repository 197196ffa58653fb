use anyhow::Result;
use clap::Parser;
use uttercap::cli::{Cli, Commands, ConfigAction};
use uttercap::config::Config;

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => {
            let config = load_config(&cli)?;
            uttercap::app::run_capture(&config, cli.once)?;
        }
        Some(Commands::Devices) => {
            list_audio_devices()?;
        }
        Some(Commands::Config { action }) => match action {
            ConfigAction::Show => {
                let config = load_config(&cli)?;
                print!("{}", toml::to_string_pretty(&config)?);
            }
            ConfigAction::Path => match Config::default_path() {
                Some(path) => println!("{}", path.display()),
                None => anyhow::bail!("could not determine config directory"),
            },
        },
    }

    Ok(())
}

/// Load configuration and apply CLI overrides on top.
///
/// Priority order:
/// 1. Command-line flags
/// 2. Environment variables (UTTERCAP_*)
/// 3. Config file (--config, or ~/.config/uttercap/config.toml)
/// 4. Built-in defaults
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = if let Some(path) = cli.config.as_deref() {
        Config::load(path)?
    } else {
        match Config::default_path() {
            Some(path) => Config::load_or_default(&path)?,
            None => Config::default(),
        }
    }
    .with_env_overrides();

    if let Some(device) = &cli.device {
        config.audio.device = Some(device.clone());
    }
    if let Some(model) = &cli.model {
        config.stt.model_path = model.clone();
    }
    if let Some(language) = &cli.language {
        config.stt.language = language.clone();
    }
    if let Some(mode) = cli.aggressiveness {
        config.audio.vad_mode = mode;
    }

    config.validate()?;
    Ok(config)
}

/// List available audio input devices.
fn list_audio_devices() -> Result<()> {
    let devices = uttercap::audio::capture::list_devices()?;

    if devices.is_empty() {
        anyhow::bail!("no audio input devices found");
    }

    println!("Available audio input devices:");
    for (idx, device) in devices.iter().enumerate() {
        println!("  [{}] {}", idx, device);
    }

    Ok(())
}
