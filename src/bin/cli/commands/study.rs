use anyhow::{bail, Context, Result};

use crate::app::App;
use crate::OutputFormat;

pub fn run(app: &App, grade_name: &str, id: &str, format: &OutputFormat) -> Result<()> {
    let grade = app.parse_grade(grade_name)?;
    let sentence = app.find_sentence(id)?;
    if sentence.grade != grade {
        bail!("Sentence '{}' belongs to {}, not {}", sentence.id, sentence.grade, grade);
    }

    let snapshot = app
        .state
        .progress
        .save_progress(grade.as_str(), &sentence.id)
        .context("Failed to save progress")?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        OutputFormat::Plain => {
            println!("Studied {}: {}", sentence.id, sentence.english);
            println!(
                "{}: {}/{} ({}%)",
                grade, snapshot.studied_count, snapshot.total_count, snapshot.completion_rate
            );
            println!(
                "Streak: {} day(s), longest {}",
                snapshot.current_streak, snapshot.longest_streak
            );
        }
    }

    Ok(())
}
