//! Markdown summary of a grading report, for pasting into issues and chats.

use anyhow::{Context, Result};
use std::path::Path;

use quizmark_core::report::GradingReport;

/// Render a grading report as markdown.
pub fn generate_markdown(report: &GradingReport) -> String {
    let stats = &report.aggregate;
    let mut md = String::new();

    md.push_str(&format!("# quizmark report: {}\n\n", report.test.id));
    md.push_str(&format!(
        "{} questions, max score {}, graded {}\n\n",
        report.test.question_count,
        report.test.max_score,
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    md.push_str("## Summary\n\n");
    md.push_str("| Graded | Failed | Mean | Median | Min | Max | Mean % | Full marks |\n");
    md.push_str("|--------|--------|------|--------|-----|-----|--------|------------|\n");
    md.push_str(&format!(
        "| {} | {} | {:.2} | {:.1} | {} | {} | {:.1}% | {} |\n\n",
        stats.submissions,
        report.failures.len(),
        stats.mean_score,
        stats.median_score,
        stats.min_score,
        stats.max_score,
        stats.mean_percentage * 100.0,
        stats.full_marks
    ));

    if !stats.per_question.is_empty() {
        md.push_str("## Questions\n\n");
        md.push_str("| Question | Type | Points | Award rate | Full | Zero |\n");
        md.push_str("|----------|------|--------|------------|------|------|\n");
        for q in &stats.per_question {
            md.push_str(&format!(
                "| {} | {} | {} | {:.1}% | {} | {} |\n",
                q.question_id,
                q.kind,
                q.max_points,
                q.award_rate * 100.0,
                q.full_credit,
                q.zero_credit
            ));
        }
        md.push('\n');
    }

    md.push_str("## Submissions\n\n");
    md.push_str("| Submission | Score | Percent |\n");
    md.push_str("|------------|-------|---------|\n");
    for graded in &report.cards {
        md.push_str(&format!(
            "| {} | {} / {} | {:.1}% |\n",
            graded.source,
            graded.card.total_score,
            graded.card.max_score,
            graded.card.percentage() * 100.0
        ));
    }

    if !report.failures.is_empty() {
        md.push_str("\n## Failures\n\n");
        for failure in &report.failures {
            md.push_str(&format!("- `{}`: {}\n", failure.source, failure.error));
        }
    }

    md
}

/// Write a markdown report to a file.
pub fn write_markdown_report(report: &GradingReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, generate_markdown(report))
        .with_context(|| format!("failed to write markdown report to {}", path.display()))?;
    Ok(())
}
