//! Grading outcome and model error types.
//!
//! A [`GradeIssue`] never escapes the engine as an error. Each one is recorded
//! against the question it affected, and that question scores zero, so one
//! malformed answer cannot abort grading of the rest of a submission.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a question scored zero without its answer being compared.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum GradeIssue {
    /// The submission has no answer item for the question.
    #[error("no answer submitted")]
    MissingAnswer,

    /// The question is keyed per variant and there is no key for the
    /// submission's variant (or the submission names no variant).
    #[error("no answer key for variant {}", display_variant(.variant))]
    MissingVariantKey { variant: Option<u32> },

    /// The student's answer does not have the shape the question kind needs.
    #[error("answer is not {expected}")]
    ShapeMismatch { expected: String },

    /// The question's type tag is not one this build can grade.
    #[error("unknown question type: {tag}")]
    UnknownQuestionType { tag: String },
}

impl GradeIssue {
    pub(crate) fn shape(expected: &str) -> Self {
        GradeIssue::ShapeMismatch {
            expected: expected.to_string(),
        }
    }

    /// Stable snake_case label, used as a key in aggregate statistics.
    pub fn label(&self) -> &'static str {
        match self {
            GradeIssue::MissingAnswer => "missing_answer",
            GradeIssue::MissingVariantKey { .. } => "missing_variant_key",
            GradeIssue::ShapeMismatch { .. } => "shape_mismatch",
            GradeIssue::UnknownQuestionType { .. } => "unknown_question_type",
        }
    }
}

fn display_variant(variant: &Option<u32>) -> String {
    match variant {
        Some(v) => v.to_string(),
        None => "<none>".to_string(),
    }
}

/// Errors raised while building a test definition from its JSON form.
///
/// These are reported when a test is loaded, never while grading.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A canonical answer does not match the shape its question kind needs.
    #[error("question {question}: invalid {kind} answer key: {reason}")]
    InvalidAnswerKey {
        question: String,
        kind: String,
        reason: String,
    },

    /// A known question kind has neither `answer` nor `answersByVariant`.
    #[error("question {0}: no answer key")]
    MissingAnswerKey(String),

    /// `points` is negative, not a finite number, or above `MAX_POINTS`.
    #[error("question {question}: points must be a non-negative number of at most 1000000, got {points}")]
    InvalidPoints { question: String, points: f64 },

    /// An `answersByVariant` key is not a variant number.
    #[error("question {question}: invalid variant key '{key}'")]
    InvalidVariant { question: String, key: String },

    /// An identifier is neither a string nor a number.
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_variant_key_message() {
        let with = GradeIssue::MissingVariantKey { variant: Some(3) };
        assert_eq!(with.to_string(), "no answer key for variant 3");
        let without = GradeIssue::MissingVariantKey { variant: None };
        assert_eq!(without.to_string(), "no answer key for variant <none>");
    }

    #[test]
    fn issue_serializes_with_tag() {
        let issue = GradeIssue::shape("a list of numbers");
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["issue"], "shape_mismatch");
        assert_eq!(json["expected"], "a list of numbers");
        let back: GradeIssue = serde_json::from_value(json).unwrap();
        assert_eq!(back, issue);
        assert_eq!(back.label(), "shape_mismatch");
    }
}
