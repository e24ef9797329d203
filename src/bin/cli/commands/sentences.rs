use anyhow::Result;

use crate::app::App;
use crate::OutputFormat;

pub fn run(app: &App, grade_name: &str, format: &OutputFormat) -> Result<()> {
    let grade = app.parse_grade(grade_name)?;
    let sentences = app.state.data.get_sentences_by_grade(grade);

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&sentences)?);
        }
        OutputFormat::Plain => {
            if sentences.is_empty() {
                println!("No sentences for {}.", grade);
                return Ok(());
            }

            let id_width = sentences.iter().map(|s| s.id.len()).max().unwrap_or(2).max(2);

            for sentence in &sentences {
                let marker = if sentence.is_important { "*" } else { " " };
                println!("{} {:<width$} {}", marker, sentence.id, sentence.english, width = id_width);
                println!("  {:<width$} {}", "", sentence.korean, width = id_width);
            }

            println!("\n{} sentences in {}", sentences.len(), grade);
        }
    }

    Ok(())
}
