//! The `quizmark init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    write_if_missing(Path::new("quizmark.toml"), SAMPLE_CONFIG)?;

    std::fs::create_dir_all("tests")?;
    write_if_missing(Path::new("tests/example.json"), EXAMPLE_TEST)?;

    std::fs::create_dir_all("submissions/example")?;
    write_if_missing(
        Path::new("submissions/example/student-1.json"),
        EXAMPLE_SUBMISSION,
    )?;

    println!("\nNext steps:");
    println!("  1. Edit tests/example.json with your questions and answer keys");
    println!("  2. Run: quizmark validate --test tests/example.json --submissions submissions/example");
    println!("  3. Run: quizmark batch --test tests/example.json --submissions submissions/example");

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizmark configuration

# Submissions graded concurrently by `quizmark batch`
parallelism = 4

# Where batch reports are written
output_dir = "./quizmark-results"

# Keep the per-question breakdown in saved reports
include_details = true

# Report formats: json, html, markdown
formats = ["json", "html"]
"#;

const EXAMPLE_TEST: &str = r#"{
  "id": "example",
  "title": "Example test",
  "questions": [
    { "id": 1, "type": "number", "points": 10, "answer": 42 },
    { "id": 2, "type": "text", "points": 5, "answer": "Paris" },
    {
      "id": 3,
      "type": "list-num",
      "points": 10,
      "answer": { "massiv": [1, 2, 3], "consistencyImportant": false }
    },
    {
      "id": 4,
      "type": "variants",
      "points": 5,
      "answersByVariant": {
        "1": { "correct": [1, 0, 1, 0] },
        "2": { "correct": [0, 1, 0, 0] }
      }
    },
    { "id": 5, "type": "edges", "points": 6, "answer": { "edges": [[1, 2], [2, 3]] } }
  ]
}
"#;

const EXAMPLE_SUBMISSION: &str = r#"{
  "id-test": "example",
  "variant": 1,
  "answers": [
    { "question-id": 1, "answer": 42 },
    { "question-id": 2, "answer": " paris " },
    { "question-id": 3, "answer": [3, 1] },
    { "question-id": 4, "answer": { "correct": [1, 0, 1, 0] } },
    { "question-id": 5, "answer": [[2, 1], [3, 2]] }
  ]
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use quizmark_core::grading::score;
    use quizmark_core::loader::{load_submission_str, load_test_str, validate_test};

    #[test]
    fn starter_files_grade_cleanly() {
        let test = load_test_str(EXAMPLE_TEST, Path::new("example.json")).unwrap();
        assert!(validate_test(&test).is_empty());

        let submission =
            load_submission_str(EXAMPLE_SUBMISSION, Path::new("student-1.json")).unwrap();
        let card = score(&test, &submission);
        // 10 + 5 + round(20/3) + 5 + 6
        assert_eq!(card.total_score, 33);
        assert_eq!(card.max_score, 36);
    }

    #[test]
    fn sample_config_parses() {
        let config: crate::config::QuizmarkConfig = toml::from_str(SAMPLE_CONFIG).unwrap();
        assert_eq!(config.formats, vec!["json", "html"]);
    }
}
