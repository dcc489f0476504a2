//! quizmark CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "quizmark", version, about = "Quiz submission grader")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade a single submission
    Grade {
        /// Path to the test JSON
        #[arg(long)]
        test: PathBuf,

        /// Path to the submission JSON
        #[arg(long)]
        submission: PathBuf,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,

        /// Show the per-question breakdown in text output
        #[arg(long)]
        details: bool,

        /// Write the submission back with its mark and timestamp
        #[arg(long)]
        write_mark: Option<PathBuf>,
    },

    /// Grade a directory of submissions
    Batch {
        /// Path to the test JSON
        #[arg(long)]
        test: PathBuf,

        /// Directory of submission JSON files
        #[arg(long)]
        submissions: PathBuf,

        /// Max concurrent submissions (default from config)
        #[arg(long)]
        parallelism: Option<usize>,

        /// Output directory (default from config)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: json, html, markdown, all (comma-separated)
        #[arg(long)]
        format: Option<String>,

        /// Keep only totals in the saved report
        #[arg(long)]
        summary_only: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate test files and, optionally, submissions against them
    Validate {
        /// Path to a test file or directory
        #[arg(long)]
        test: PathBuf,

        /// Directory of submissions to check against the tests
        #[arg(long)]
        submissions: Option<PathBuf>,
    },

    /// Compare two grading reports
    Compare {
        /// Baseline report JSON
        #[arg(long)]
        baseline: PathBuf,

        /// Current report JSON
        #[arg(long)]
        current: PathBuf,

        /// Exit code 1 if any mark changed
        #[arg(long)]
        fail_on_change: bool,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Create starter config, example test and sample submission
    Init,
}

#[tokio::main]
async fn main() {
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    let filter = match "quizmark=info".parse::<tracing_subscriber::filter::Directive>() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Grade {
            test,
            submission,
            format,
            details,
            write_mark,
        } => commands::grade::execute(test, submission, format, details, write_mark),
        Commands::Batch {
            test,
            submissions,
            parallelism,
            output,
            format,
            summary_only,
            config,
        } => {
            commands::batch::execute(
                test,
                submissions,
                parallelism,
                output,
                format,
                summary_only,
                config,
            )
            .await
        }
        Commands::Validate { test, submissions } => commands::validate::execute(test, submissions),
        Commands::Compare {
            baseline,
            current,
            fail_on_change,
            format,
        } => commands::compare::execute(baseline, current, fail_on_change, format),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
