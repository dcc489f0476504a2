//! The `quizmark batch` command.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;

use quizmark_core::batch::{BatchConfig, BatchGrader, ProgressReporter};
use quizmark_core::loader;
use quizmark_core::report::{GradedSubmission, GradingReport};
use quizmark_report::html::write_html_report;
use quizmark_report::markdown::write_markdown_report;

use crate::config::load_config_from;

/// Console progress reporter.
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_submission_start(&self, _source: &str) {}

    fn on_submission_graded(&self, graded: &GradedSubmission) {
        eprintln!(
            "  Graded: {} {}/{}",
            graded.source, graded.card.total_score, graded.card.max_score
        );
    }

    fn on_submission_error(&self, source: &str, error: &str) {
        eprintln!("  ERROR: {source}: {error}");
    }

    fn on_batch_complete(&self, total: usize, graded: usize, failed: usize, elapsed: Duration) {
        eprintln!(
            "\nComplete: {graded}/{total} graded, {failed} failed ({:.1}s)",
            elapsed.as_secs_f64()
        );
    }
}

pub async fn execute(
    test_path: PathBuf,
    submissions_dir: PathBuf,
    parallelism: Option<usize>,
    output: Option<PathBuf>,
    format: Option<String>,
    summary_only: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let parallelism = parallelism.unwrap_or(config.parallelism);
    anyhow::ensure!(parallelism >= 1, "parallelism must be at least 1");
    let output = output.unwrap_or(config.output_dir);

    let formats: Vec<String> = match format.as_deref() {
        Some("all") => vec!["json".into(), "html".into(), "markdown".into()],
        Some(f) => f.split(',').map(|s| s.trim().to_string()).collect(),
        None => config.formats,
    };

    let test = loader::load_test(&test_path)?;
    for w in loader::validate_test(&test) {
        tracing::warn!("test {}: {}", test.id, w.message);
    }

    eprintln!(
        "quizmark v{}: grading {} against test '{}' ({} questions)",
        env!("CARGO_PKG_VERSION"),
        submissions_dir.display(),
        test.id,
        test.questions.len()
    );
    eprintln!();

    let grader = BatchGrader::new(BatchConfig {
        parallelism,
        include_details: config.include_details && !summary_only,
    });
    let report = grader
        .run_directory(&test, &submissions_dir, &ConsoleReporter)
        .await?;

    print_summary(&report);

    // Save outputs
    std::fs::create_dir_all(&output)?;
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");

    for fmt in &formats {
        match fmt.as_str() {
            "json" => {
                let path = output.join(format!("report-{timestamp}.json"));
                report.save_json(&path)?;
                eprintln!("Results saved to: {}", path.display());
            }
            "html" => {
                let path = output.join(format!("report-{timestamp}.html"));
                write_html_report(&report, &path)?;
                eprintln!("HTML report: {}", path.display());
            }
            "markdown" | "md" => {
                let path = output.join(format!("report-{timestamp}.md"));
                write_markdown_report(&report, &path)?;
                eprintln!("Markdown report: {}", path.display());
            }
            _ => {
                eprintln!("Unknown format: {fmt}");
            }
        }
    }

    Ok(())
}

fn print_summary(report: &GradingReport) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["Submission", "Variant", "Score", "Percent"]);

    for graded in &report.cards {
        let card = &graded.card;
        table.add_row(vec![
            Cell::new(&graded.source),
            Cell::new(card.variant.map(|v| v.to_string()).unwrap_or_else(|| "-".into())),
            Cell::new(format!("{} / {}", card.total_score, card.max_score)),
            Cell::new(format!("{:.1}%", card.percentage() * 100.0)),
        ]);
    }

    let stats = &report.aggregate;
    eprintln!("\n{table}");
    eprintln!(
        "Mean {:.2} | Median {:.1} | Min {} | Max {} | Full marks {}/{}",
        stats.mean_score,
        stats.median_score,
        stats.min_score,
        stats.max_score,
        stats.full_marks,
        stats.submissions
    );
}
