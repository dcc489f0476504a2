//! JSON test and submission loader.
//!
//! Loads test definitions and submissions from files and directories, and
//! validates them.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::model::{AnswerKeys, RecordId, Submission, Test};

/// Parse a single JSON file into a `Test`.
pub fn load_test(path: &Path) -> Result<Test> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read test file: {}", path.display()))?;

    load_test_str(&content, path)
}

/// Parse a JSON string into a `Test` (useful for testing).
pub fn load_test_str(content: &str, source_path: &Path) -> Result<Test> {
    serde_json::from_str(content)
        .with_context(|| format!("failed to parse test: {}", source_path.display()))
}

/// Recursively load all `.json` test files from a directory.
pub fn load_test_directory(dir: &Path) -> Result<Vec<Test>> {
    let mut tests = Vec::new();
    for path in collect_json_files(dir)? {
        match load_test(&path) {
            Ok(test) => tests.push(test),
            Err(e) => {
                tracing::warn!("skipping {}: {:#}", path.display(), e);
            }
        }
    }
    Ok(tests)
}

/// Parse a single JSON file into a `Submission`.
pub fn load_submission(path: &Path) -> Result<Submission> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read submission file: {}", path.display()))?;

    load_submission_str(&content, path)
}

/// Parse a JSON string into a `Submission`.
pub fn load_submission_str(content: &str, source_path: &Path) -> Result<Submission> {
    serde_json::from_str(content)
        .with_context(|| format!("failed to parse submission: {}", source_path.display()))
}

/// Recursively load all `.json` submissions from a directory, paired with
/// their paths. Files that fail to load are skipped with a warning.
pub fn load_submission_directory(dir: &Path) -> Result<Vec<(PathBuf, Submission)>> {
    let mut submissions = Vec::new();
    for path in collect_json_files(dir)? {
        match load_submission(&path) {
            Ok(submission) => submissions.push((path, submission)),
            Err(e) => {
                tracing::warn!("skipping {}: {:#}", path.display(), e);
            }
        }
    }
    Ok(submissions)
}

/// All `.json` files under `dir`, recursively, in sorted order.
pub fn collect_json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let path = entry?.path();
        if path.is_dir() {
            files.extend(collect_json_files(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// A warning from test or submission validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<RecordId>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn question(id: &RecordId, message: impl Into<String>) -> Self {
        Self {
            question_id: Some(id.clone()),
            message: message.into(),
        }
    }

    fn general(message: impl Into<String>) -> Self {
        Self {
            question_id: None,
            message: message.into(),
        }
    }
}

/// Validate a test definition for common authoring issues.
pub fn validate_test(test: &Test) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if test.questions.is_empty() {
        warnings.push(ValidationWarning::general("test has no questions"));
    }

    // Only the first of several questions sharing an id can receive answers
    let mut seen_ids = HashSet::new();
    for q in &test.questions {
        if !seen_ids.insert(&q.id) {
            warnings.push(ValidationWarning::question(
                &q.id,
                format!("duplicate question ID: {}", q.id),
            ));
        }
    }

    for q in &test.questions {
        if q.points == 0.0 {
            warnings.push(ValidationWarning::question(&q.id, "question is worth 0 points"));
        }
        if !q.kind.is_known() {
            warnings.push(ValidationWarning::question(
                &q.id,
                format!("unknown question type '{}' will always score 0", q.kind),
            ));
        }
    }

    // Every per-variant question should cover every variant the test uses
    let variants = test.variants();
    for q in &test.questions {
        if let AnswerKeys::PerVariant(keys) = &q.keys {
            let missing: Vec<String> = variants
                .iter()
                .filter(|v| !keys.contains_key(*v))
                .map(ToString::to_string)
                .collect();
            if !missing.is_empty() {
                warnings.push(ValidationWarning::question(
                    &q.id,
                    format!("no answer key for variant(s) {}", missing.join(", ")),
                ));
            }
        }
    }

    for q in &test.questions {
        let empty = match &q.keys {
            AnswerKeys::Single(key) => key.is_empty_collection(),
            AnswerKeys::PerVariant(keys) => keys.values().any(|k| k.is_empty_collection()),
            AnswerKeys::Opaque { .. } => false,
        };
        if empty {
            warnings.push(ValidationWarning::question(
                &q.id,
                "answer key is empty; only an empty answer earns credit",
            ));
        }
    }

    warnings
}

/// Validate a submission against the test it will be graded with.
pub fn validate_submission(test: &Test, submission: &Submission) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if submission.test_id != test.id {
        warnings.push(ValidationWarning::general(format!(
            "submission is for test '{}', not '{}'",
            submission.test_id, test.id
        )));
    }

    let mut seen_ids = HashSet::new();
    for item in &submission.answers {
        if test.question(&item.question_id).is_none() {
            warnings.push(ValidationWarning::question(
                &item.question_id,
                "answer for a question the test does not have",
            ));
        } else if !seen_ids.insert(&item.question_id) {
            warnings.push(ValidationWarning::question(
                &item.question_id,
                "duplicate answer; only the first is graded",
            ));
        }
    }

    if test.uses_variants() {
        match submission.variant {
            None => warnings.push(ValidationWarning::general(
                "test is keyed per variant but the submission has no variant",
            )),
            Some(v) if !test.variants().contains(&v) => {
                warnings.push(ValidationWarning::general(format!(
                    "test has no answer keys for variant {v}"
                )))
            }
            Some(_) => {}
        }
    }

    warnings
}
