mod app;
mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "flashdeck-cli", about = "Flashdeck sentence study CLI", version)]
struct Cli {
    /// Config file (default: $FLASHDECK_CONFIG or the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// List sentences for a grade
    Sentences {
        /// Grade name (middle1..middle3, high1..high3)
        #[arg(long)]
        grade: String,
    },

    /// Mark sentences as important
    #[command(subcommand)]
    Important(ImportantCommand),

    /// Record that a sentence was studied
    Study {
        /// Grade the sentence belongs to
        grade: String,
        /// Sentence id
        id: String,
    },

    /// Show completion and streak
    Progress {
        /// Limit to one grade
        grade: Option<String>,
        /// Clear the grade's progress instead of showing it
        #[arg(long, requires = "grade")]
        reset: bool,
    },

    /// Show or change preferences
    #[command(subcommand)]
    Prefs(PrefsCommand),

    /// Catalog and important-sentence counts
    Stats,

    /// Export all data as JSON
    Export {
        /// Destination file (default: timestamped file in the backup dir)
        file: Option<PathBuf>,
    },

    /// Replace all data with an export file
    Import {
        /// Export file to read
        file: PathBuf,
    },

    /// List export files in the backup dir
    Backups,

    /// Show bytes and items held in storage
    StorageInfo,

    /// Offline cache tools
    #[command(subcommand)]
    Cache(CacheCommand),
}

#[derive(Subcommand)]
enum ImportantCommand {
    /// Toggle a sentence's important flag
    Toggle {
        /// Sentence id
        id: String,
    },

    /// List important sentences
    List,

    /// Unmark every sentence
    Clear,
}

#[derive(Subcommand)]
enum PrefsCommand {
    /// Show current preferences
    Show,

    /// Set one preference
    Set {
        /// One of: speed, voice, sound, animations
        field: String,
        /// New value
        value: String,
    },

    /// Restore default preferences
    Reset,
}

#[derive(Subcommand)]
enum CacheCommand {
    /// Install and activate a worker against the configured origin
    Check,

    /// Resolve how a request would be served
    Classify {
        /// Request URL or path
        url: String,
        /// HTTP method
        #[arg(long, default_value = "GET")]
        method: String,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let app = app::App::new(cli.config.as_deref())?;

    match cli.command {
        Command::Sentences { grade } => {
            commands::sentences::run(&app, &grade, &cli.format)?;
        }
        Command::Important(subcmd) => match subcmd {
            ImportantCommand::Toggle { id } => {
                commands::important::run_toggle(&app, &id, &cli.format)?;
            }
            ImportantCommand::List => {
                commands::important::run_list(&app, &cli.format)?;
            }
            ImportantCommand::Clear => {
                commands::important::run_clear(&app, &cli.format)?;
            }
        },
        Command::Study { grade, id } => {
            commands::study::run(&app, &grade, &id, &cli.format)?;
        }
        Command::Progress { grade, reset } => {
            if reset {
                commands::progress::run_reset(&app, grade.as_deref(), &cli.format)?;
            } else {
                commands::progress::run(&app, grade.as_deref(), &cli.format)?;
            }
        }
        Command::Prefs(subcmd) => match subcmd {
            PrefsCommand::Show => commands::prefs::run_show(&app, &cli.format)?,
            PrefsCommand::Set { field, value } => {
                commands::prefs::run_set(&app, &field, &value, &cli.format)?;
            }
            PrefsCommand::Reset => commands::prefs::run_reset(&app, &cli.format)?,
        },
        Command::Stats => {
            commands::stats::run(&app, &cli.format)?;
        }
        Command::Export { file } => {
            commands::backup::run_export(&app, file.as_deref(), &cli.format)?;
        }
        Command::Import { file } => {
            commands::backup::run_import(&app, &file, &cli.format)?;
        }
        Command::Backups => {
            commands::backup::run_list(&app, &cli.format)?;
        }
        Command::StorageInfo => {
            commands::storage_info::run(&app, &cli.format)?;
        }
        Command::Cache(subcmd) => match subcmd {
            CacheCommand::Check => commands::cache::run_check(&app, &cli.format)?,
            CacheCommand::Classify { url, method } => {
                commands::cache::run_classify(&url, &method, &cli.format)?;
            }
        },
    }

    Ok(())
}
