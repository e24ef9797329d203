use anyhow::{bail, Context, Result};

use flashdeck_lib::storage::{AutoPlaySpeed, Preferences};

use crate::app::App;
use crate::OutputFormat;

fn print_preferences(prefs: &Preferences, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(prefs)?);
        }
        OutputFormat::Plain => {
            println!("speed       {}", prefs.auto_play_speed.as_str());
            println!("voice       {}", prefs.tts_voice_index);
            println!("sound       {}", on_off(prefs.sound_enabled));
            println!("animations  {}", on_off(prefs.animations_enabled));
        }
    }
    Ok(())
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}

fn parse_switch(value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        _ => bail!("Expected on/off, got '{}'", value),
    }
}

pub fn run_show(app: &App, format: &OutputFormat) -> Result<()> {
    let prefs = app.state.preferences.get_all_preferences();
    print_preferences(&prefs, format)
}

pub fn run_set(app: &App, field: &str, value: &str, format: &OutputFormat) -> Result<()> {
    let service = &app.state.preferences;

    let result = match field.to_lowercase().as_str() {
        "speed" => {
            let speed: AutoPlaySpeed = value.parse().map_err(anyhow::Error::msg)?;
            service.set_auto_play_speed(speed)
        }
        "voice" => {
            let index: u32 = value
                .parse()
                .with_context(|| format!("Voice index must be a non-negative number, got '{}'", value))?;
            service.set_tts_voice_index(index)
        }
        "sound" => service.set_sound_enabled(parse_switch(value)?),
        "animations" => service.set_animations_enabled(parse_switch(value)?),
        other => bail!(
            "Unknown preference '{}'. Available: speed, voice, sound, animations",
            other
        ),
    };

    let prefs = result.context("Failed to save preferences")?;
    print_preferences(&prefs, format)
}

pub fn run_reset(app: &App, format: &OutputFormat) -> Result<()> {
    let prefs = app
        .state
        .preferences
        .reset_preferences()
        .context("Failed to reset preferences")?;
    print_preferences(&prefs, format)
}
