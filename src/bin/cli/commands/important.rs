use anyhow::{Context, Result};

use crate::app::App;
use crate::OutputFormat;

pub fn run_toggle(app: &App, id: &str, format: &OutputFormat) -> Result<()> {
    let sentence = app.find_sentence(id)?;
    let important = app
        .state
        .data
        .toggle_important(&sentence.id)
        .context("Failed to save important sentences")?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "id": sentence.id,
                "important": important,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            let verb = if important { "Marked" } else { "Unmarked" };
            println!("{} {}: {}", verb, sentence.id, sentence.english);
        }
    }

    Ok(())
}

pub fn run_list(app: &App, format: &OutputFormat) -> Result<()> {
    let sentences = app.state.data.get_important_sentences();

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&sentences)?);
        }
        OutputFormat::Plain => {
            if sentences.is_empty() {
                println!("No important sentences.");
                return Ok(());
            }

            for sentence in &sentences {
                println!("[{}] {} {}", sentence.grade, sentence.id, sentence.english);
            }

            println!("\n{} important sentences", sentences.len());
        }
    }

    Ok(())
}

pub fn run_clear(app: &App, format: &OutputFormat) -> Result<()> {
    let removed = app
        .state
        .data
        .clear_important()
        .context("Failed to clear important sentences")?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::json!({ "removed": removed }));
        }
        OutputFormat::Plain => {
            println!("Cleared {} important sentences", removed);
        }
    }

    Ok(())
}
