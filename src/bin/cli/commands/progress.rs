use anyhow::{Context, Result};

use flashdeck_lib::sentences::Grade;

use crate::app::App;
use crate::OutputFormat;

pub fn run(app: &App, grade_name: Option<&str>, format: &OutputFormat) -> Result<()> {
    let grades = match grade_name {
        Some(name) => vec![app.parse_grade(name)?],
        None => Grade::ALL.to_vec(),
    };

    let snapshots: Vec<_> = grades
        .iter()
        .map(|grade| (*grade, app.state.progress.get_progress(grade.as_str())))
        .collect();
    let streak = app.state.progress.get_streak();

    match format {
        OutputFormat::Json => {
            let mut by_grade = serde_json::Map::new();
            for (grade, snapshot) in &snapshots {
                by_grade.insert(grade.as_str().to_string(), serde_json::to_value(snapshot)?);
            }
            let output = serde_json::json!({
                "progress": by_grade,
                "streak": streak,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("{:<8} {:>7} {:>5}", "Grade", "Studied", "Done");
            println!("{} {} {}", "\u{2500}".repeat(8), "\u{2500}".repeat(7), "\u{2500}".repeat(5));

            for (grade, snapshot) in &snapshots {
                println!(
                    "{:<8} {:>3}/{:<3} {:>4}%",
                    grade.as_str(),
                    snapshot.studied_count,
                    snapshot.total_count,
                    snapshot.completion_rate
                );
            }

            let last = streak
                .last_study_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "never".to_string());
            println!(
                "\nStreak: {} day(s), longest {}, last studied {}",
                streak.current_streak, streak.longest_streak, last
            );
        }
    }

    Ok(())
}

pub fn run_reset(app: &App, grade_name: Option<&str>, format: &OutputFormat) -> Result<()> {
    let Some(name) = grade_name else {
        anyhow::bail!("--reset needs a grade");
    };
    let grade = app.parse_grade(name)?;

    app.state
        .progress
        .reset_progress(grade.as_str())
        .context("Failed to reset progress")?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::json!({ "reset": grade.as_str() }));
        }
        OutputFormat::Plain => {
            println!("Reset progress for {}", grade);
        }
    }

    Ok(())
}
