//! The `quizmark grade` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use quizmark_core::grading::{score, ScoreCard};
use quizmark_core::loader::{load_submission, load_test};

pub fn execute(
    test_path: PathBuf,
    submission_path: PathBuf,
    format: String,
    details: bool,
    write_mark: Option<PathBuf>,
) -> Result<()> {
    let test = load_test(&test_path)?;
    let submission = load_submission(&submission_path)?;

    let card = score(&test, &submission);

    match format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&card)?);
        }
        "markdown" | "md" => {
            println!("{}", card.to_markdown());
        }
        _ => print_text(&card, details),
    }

    if let Some(path) = write_mark {
        let marked = submission.with_mark(&card, chrono::Utc::now());
        let json = serde_json::to_string_pretty(&marked)?;
        std::fs::write(&path, json)
            .with_context(|| format!("failed to write marked submission: {}", path.display()))?;
        eprintln!("Marked submission saved to: {}", path.display());
    }

    Ok(())
}

fn print_text(card: &ScoreCard, details: bool) {
    let variant = card
        .variant
        .map(|v| format!(" (variant {v})"))
        .unwrap_or_default();
    println!("Test: {}{variant}", card.test_id);
    println!(
        "Score: {} / {} ({:.1}%)",
        card.total_score,
        card.max_score,
        card.percentage() * 100.0
    );

    if details {
        let mut table = Table::new();
        table.set_header(vec!["Question", "Type", "Points", "Max", "Note"]);
        for q in &card.questions {
            table.add_row(vec![
                Cell::new(&q.question_id),
                Cell::new(&q.kind),
                Cell::new(format!("{} ({:.2})", q.rounded_points, q.points_awarded)),
                Cell::new(q.max_points),
                Cell::new(q.issue.as_ref().map(ToString::to_string).unwrap_or_default()),
            ]);
        }
        println!("\n{table}");
    }

    if !card.unmatched_answers.is_empty() {
        let ids: Vec<String> = card
            .unmatched_answers
            .iter()
            .map(ToString::to_string)
            .collect();
        println!("Ignored answers for unknown questions: {}", ids.join(", "));
    }
}
