//! The `quizmark validate` command.

use std::path::PathBuf;

use anyhow::Result;

use quizmark_core::loader::{self, ValidationWarning};
use quizmark_core::model::{RecordId, Test};

pub fn execute(test_path: PathBuf, submissions_dir: Option<PathBuf>) -> Result<()> {
    let tests = if test_path.is_dir() {
        loader::load_test_directory(&test_path)?
    } else {
        vec![loader::load_test(&test_path)?]
    };

    let mut total_warnings = 0;

    for test in &tests {
        println!(
            "Test: {} ({} questions, max score {})",
            test.id,
            test.questions.len(),
            test.max_score()
        );
        let warnings = loader::validate_test(test);
        print_warnings(&warnings);
        total_warnings += warnings.len();
    }

    if let Some(dir) = submissions_dir {
        for (path, submission) in loader::load_submission_directory(&dir)? {
            let Some(test) = find_test(&tests, &submission.test_id) else {
                println!(
                    "Submission: {} WARNING: no test with id '{}'",
                    path.display(),
                    submission.test_id
                );
                total_warnings += 1;
                continue;
            };

            let warnings = loader::validate_submission(test, &submission);
            if !warnings.is_empty() {
                println!("Submission: {}", path.display());
                print_warnings(&warnings);
                total_warnings += warnings.len();
            }
        }
    }

    if total_warnings == 0 {
        println!("All files valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}

/// The test a submission names. With a single test loaded, that test is
/// used even when the ids differ, so the mismatch is reported as a warning.
fn find_test<'a>(tests: &'a [Test], id: &RecordId) -> Option<&'a Test> {
    tests
        .iter()
        .find(|t| &t.id == id)
        .or_else(|| match tests {
            [only] => Some(only),
            _ => None,
        })
}

fn print_warnings(warnings: &[ValidationWarning]) {
    for w in warnings {
        let prefix = w
            .question_id
            .as_ref()
            .map(|id| format!("  [{id}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }
}
