//! The `quizmark compare` command.

use std::path::PathBuf;

use anyhow::Result;

use quizmark_core::report::{GradingReport, MarkChange};

pub fn execute(
    baseline_path: PathBuf,
    current_path: PathBuf,
    fail_on_change: bool,
    format: String,
) -> Result<()> {
    let baseline = GradingReport::load_json(&baseline_path)?;
    let current = GradingReport::load_json(&current_path)?;

    let report = current.compare(&baseline);

    match format.as_str() {
        "markdown" | "md" => {
            println!("{}", report.to_markdown());
        }
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            // text format
            println!(
                "Comparison: {} lowered, {} raised, {} unchanged",
                report.lowered.len(),
                report.raised.len(),
                report.unchanged
            );
            print_changes("Lowered", &report.lowered);
            print_changes("Raised", &report.raised);

            if !report.new_submissions.is_empty() {
                println!("\n{} new submission(s)", report.new_submissions.len());
            }
            if !report.removed_submissions.is_empty() {
                println!("{} removed submission(s)", report.removed_submissions.len());
            }
        }
    }

    if fail_on_change && report.has_changes() {
        std::process::exit(1);
    }

    Ok(())
}

fn print_changes(title: &str, changes: &[MarkChange]) {
    if changes.is_empty() {
        return;
    }
    println!("\n{title}:");
    for c in changes {
        println!(
            "  {} {} -> {} ({:+})",
            c.source, c.baseline, c.current, c.delta
        );
    }
}
