use anyhow::Result;

use crate::app::App;
use crate::OutputFormat;

pub fn run(app: &App, format: &OutputFormat) -> Result<()> {
    let stats = app.state.data.get_statistics();

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        OutputFormat::Plain => {
            println!("{:<8} {:>5} {:>9}", "Grade", "Total", "Important");
            println!("{} {} {}", "\u{2500}".repeat(8), "\u{2500}".repeat(5), "\u{2500}".repeat(9));

            for (grade, counts) in &stats.by_grade {
                println!("{:<8} {:>5} {:>9}", grade.as_str(), counts.total, counts.important);
            }

            println!(
                "\n{} sentences, {} important",
                stats.total_sentences, stats.total_important
            );
        }
    }

    Ok(())
}
