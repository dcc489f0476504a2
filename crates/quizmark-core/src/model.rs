//! Core data model types for quizmark.
//!
//! Tests and submissions are JSON documents written by whatever stores them.
//! Fields this crate does not interpret are preserved in `extra` so that a
//! document can be read, updated and written back without losing content.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::answer::AnswerKey;
use crate::error::{GradeIssue, ModelError};
use crate::grading::ScoreCard;

/// Largest point value a single question may carry.
pub const MAX_POINTS: f64 = 1_000_000.0;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Identifier of a test or question. Documents write ids as numbers or
/// strings; both normalise to the same text, so `1` and `"1"` are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "String")]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<Value> for RecordId {
    type Error = ModelError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(s) => Ok(RecordId::new(s)),
            Value::Number(n) => Ok(RecordId(n.to_string())),
            other => Err(ModelError::InvalidId(other.to_string())),
        }
    }
}

impl From<RecordId> for String {
    fn from(id: RecordId) -> Self {
        id.0
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId::new(s)
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        RecordId::new(s)
    }
}

macro_rules! record_id_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for RecordId {
                fn from(n: $t) -> Self {
                    RecordId(n.to_string())
                }
            }
        )*
    };
}

record_id_from_int!(i32, i64, u32, u64);

// ---------------------------------------------------------------------------
// Question kinds
// ---------------------------------------------------------------------------

/// The answer shape a question expects, from its `type` tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum QuestionKind {
    /// Free text, compared case-insensitively after trimming.
    Text,
    /// A single number.
    Number,
    /// A list of numbers, ordered or unordered.
    NumberList,
    /// A 2-D array of numbers.
    Matrix,
    /// A vector of 0/1 flags over the offered options.
    MultiSelect,
    /// A list of ordered pairs.
    Pairs,
    /// A list of undirected graph edges.
    Edges,
    /// A tag this build does not know; such questions always score zero.
    Unknown(String),
}

impl QuestionKind {
    pub fn is_known(&self) -> bool {
        !matches!(self, QuestionKind::Unknown(_))
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionKind::Text => write!(f, "text"),
            QuestionKind::Number => write!(f, "number"),
            QuestionKind::NumberList => write!(f, "list-num"),
            QuestionKind::Matrix => write!(f, "matrix"),
            QuestionKind::MultiSelect => write!(f, "variants"),
            QuestionKind::Pairs => write!(f, "pairs"),
            QuestionKind::Edges => write!(f, "edges"),
            QuestionKind::Unknown(tag) => write!(f, "{tag}"),
        }
    }
}

impl FromStr for QuestionKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "text" | "string" => QuestionKind::Text,
            "number" | "num" | "numeric" => QuestionKind::Number,
            "list-num" | "list" => QuestionKind::NumberList,
            "matrix" => QuestionKind::Matrix,
            "variants" | "multi-select" | "checkbox" => QuestionKind::MultiSelect,
            "pairs" | "pair-list" => QuestionKind::Pairs,
            "edges" | "edge-list" | "graph" => QuestionKind::Edges,
            _ => QuestionKind::Unknown(s.to_string()),
        })
    }
}

impl From<String> for QuestionKind {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(kind) => kind,
            Err(never) => match never {},
        }
    }
}

impl From<QuestionKind> for String {
    fn from(kind: QuestionKind) -> Self {
        kind.to_string()
    }
}

// ---------------------------------------------------------------------------
// Questions
// ---------------------------------------------------------------------------

/// Where a question's canonical answer comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerKeys {
    /// One key for every student.
    Single(AnswerKey),
    /// One key per variant number.
    PerVariant(BTreeMap<u32, AnswerKey>),
    /// Kept verbatim for kinds this build cannot grade.
    Opaque {
        answer: Option<Value>,
        answers_by_variant: BTreeMap<String, Value>,
    },
}

/// A single question of a test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawQuestion", into = "RawQuestion")]
pub struct Question {
    pub id: RecordId,
    pub kind: QuestionKind,
    /// Maximum score for this question, between 0 and [`MAX_POINTS`].
    pub points: f64,
    pub keys: AnswerKeys,
    /// Prompt text, options and anything else the grader does not read.
    pub extra: Map<String, Value>,
}

impl Question {
    /// A question with a single answer key.
    pub fn new(id: impl Into<RecordId>, points: f64, key: AnswerKey) -> Self {
        Self {
            id: id.into(),
            kind: key.kind(),
            points,
            keys: AnswerKeys::Single(key),
            extra: Map::new(),
        }
    }

    /// A question keyed per variant. All keys must be of the same kind.
    pub fn per_variant(
        id: impl Into<RecordId>,
        points: f64,
        kind: QuestionKind,
        keys: BTreeMap<u32, AnswerKey>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            points,
            keys: AnswerKeys::PerVariant(keys),
            extra: Map::new(),
        }
    }

    /// Select the canonical answer that applies to a submission's variant.
    ///
    /// A single key applies to every variant. A per-variant question with no
    /// key for `variant` (or no variant at all) yields `MissingVariantKey`.
    pub fn answer_key(&self, variant: Option<u32>) -> Result<&AnswerKey, GradeIssue> {
        match &self.keys {
            AnswerKeys::Single(key) => Ok(key),
            AnswerKeys::PerVariant(keys) => variant
                .and_then(|v| keys.get(&v))
                .ok_or(GradeIssue::MissingVariantKey { variant }),
            AnswerKeys::Opaque { .. } => Err(GradeIssue::UnknownQuestionType {
                tag: self.kind.to_string(),
            }),
        }
    }

    pub fn uses_variants(&self) -> bool {
        matches!(self.keys, AnswerKeys::PerVariant(_))
    }
}

/// The document form of a question.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuestion {
    id: RecordId,
    #[serde(rename = "type")]
    kind: QuestionKind,
    points: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    answer: Option<Value>,
    /// String keys: JSON object keys are strings, and `flatten` below
    /// prevents serde from coercing them to integers for us.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    answers_by_variant: BTreeMap<String, Value>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl TryFrom<RawQuestion> for Question {
    type Error = ModelError;

    fn try_from(raw: RawQuestion) -> Result<Self, Self::Error> {
        let question = raw.id.to_string();

        if !raw.points.is_finite() || raw.points < 0.0 || raw.points > MAX_POINTS {
            return Err(ModelError::InvalidPoints {
                question,
                points: raw.points,
            });
        }

        if !raw.kind.is_known() {
            return Ok(Question {
                id: raw.id,
                kind: raw.kind,
                points: raw.points,
                keys: AnswerKeys::Opaque {
                    answer: raw.answer,
                    answers_by_variant: raw.answers_by_variant,
                },
                extra: raw.extra,
            });
        }

        let parse = |value: &Value| {
            AnswerKey::parse(&raw.kind, value).map_err(|reason| ModelError::InvalidAnswerKey {
                question: question.clone(),
                kind: raw.kind.to_string(),
                reason,
            })
        };

        let keys = if !raw.answers_by_variant.is_empty() {
            if raw.answer.is_some() {
                tracing::warn!(
                    "question {question}: both `answer` and `answersByVariant` given, \
                     grading by variant"
                );
            }
            let mut keys = BTreeMap::new();
            for (variant, value) in &raw.answers_by_variant {
                let number =
                    variant
                        .trim()
                        .parse::<u32>()
                        .map_err(|_| ModelError::InvalidVariant {
                            question: question.clone(),
                            key: variant.clone(),
                        })?;
                keys.insert(number, parse(value)?);
            }
            AnswerKeys::PerVariant(keys)
        } else if let Some(value) = &raw.answer {
            AnswerKeys::Single(parse(value)?)
        } else {
            return Err(ModelError::MissingAnswerKey(question));
        };

        Ok(Question {
            id: raw.id,
            kind: raw.kind,
            points: raw.points,
            keys,
            extra: raw.extra,
        })
    }
}

impl From<Question> for RawQuestion {
    fn from(q: Question) -> Self {
        let (answer, answers_by_variant) = match q.keys {
            AnswerKeys::Single(key) => (Some(key.to_json()), BTreeMap::new()),
            AnswerKeys::PerVariant(keys) => (
                None,
                keys.into_iter()
                    .map(|(v, key)| (v.to_string(), key.to_json()))
                    .collect(),
            ),
            AnswerKeys::Opaque {
                answer,
                answers_by_variant,
            } => (answer, answers_by_variant),
        };
        RawQuestion {
            id: q.id,
            kind: q.kind,
            points: q.points,
            answer,
            answers_by_variant,
            extra: q.extra,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

/// A test definition: an ordered list of questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Test {
    pub id: RecordId,
    #[serde(default)]
    pub questions: Vec<Question>,
    /// Number of submissions recorded against this test.
    #[serde(default)]
    pub progress: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Test {
    pub fn new(id: impl Into<RecordId>, questions: Vec<Question>) -> Self {
        Self {
            id: id.into(),
            questions,
            progress: 0,
            last_updated: None,
            extra: Map::new(),
        }
    }

    /// First question with the given id.
    pub fn question(&self, id: &RecordId) -> Option<&Question> {
        self.questions.iter().find(|q| &q.id == id)
    }

    /// Highest total a submission can score: the sum of each question's
    /// points rounded the same way awarded points are.
    pub fn max_score(&self) -> u32 {
        self.questions
            .iter()
            .map(|q| crate::grading::round_points(q.points))
            .fold(0u32, u32::saturating_add)
    }

    pub fn uses_variants(&self) -> bool {
        self.questions.iter().any(Question::uses_variants)
    }

    /// Every variant number that appears in any per-variant key.
    pub fn variants(&self) -> BTreeSet<u32> {
        self.questions
            .iter()
            .filter_map(|q| match &q.keys {
                AnswerKeys::PerVariant(keys) => Some(keys.keys().copied()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    /// Count one more submission and stamp the update time.
    pub fn record_submission(&mut self, at: DateTime<Utc>) {
        self.progress += 1;
        self.last_updated = Some(at);
    }
}

// ---------------------------------------------------------------------------
// Submissions
// ---------------------------------------------------------------------------

/// One student answer. The value stays raw JSON until it is graded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerItem {
    #[serde(rename = "question-id", alias = "questionId", alias = "question_id")]
    pub question_id: RecordId,
    #[serde(default)]
    pub answer: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AnswerItem {
    pub fn new(question_id: impl Into<RecordId>, answer: Value) -> Self {
        Self {
            question_id: question_id.into(),
            answer,
            extra: Map::new(),
        }
    }
}

/// A student's submission against a test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    #[serde(rename = "id-test", alias = "testId", alias = "test_id")]
    pub test_id: RecordId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<u32>,
    #[serde(default)]
    pub answers: Vec<AnswerItem>,
    /// Total score, set after grading.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mark: Option<u32>,
    /// When the mark was recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Submission {
    pub fn new(test_id: impl Into<RecordId>, answers: Vec<AnswerItem>) -> Self {
        Self {
            test_id: test_id.into(),
            variant: None,
            answers,
            mark: None,
            timestamp: None,
            extra: Map::new(),
        }
    }

    pub fn with_variant(mut self, variant: u32) -> Self {
        self.variant = Some(variant);
        self
    }

    /// First answer item for the question. Later duplicates are ignored.
    pub fn answer_for(&self, question_id: &RecordId) -> Option<&AnswerItem> {
        self.answers.iter().find(|a| &a.question_id == question_id)
    }

    /// Record the graded total on the submission.
    pub fn with_mark(mut self, card: &ScoreCard, at: DateTime<Utc>) -> Self {
        self.mark = Some(card.total_score);
        self.timestamp = Some(at);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_display_and_parse() {
        assert_eq!(QuestionKind::NumberList.to_string(), "list-num");
        assert_eq!(QuestionKind::MultiSelect.to_string(), "variants");
        assert_eq!("list-num".parse::<QuestionKind>().unwrap(), QuestionKind::NumberList);
        assert_eq!("Graph".parse::<QuestionKind>().unwrap(), QuestionKind::Edges);
        assert_eq!("num".parse::<QuestionKind>().unwrap(), QuestionKind::Number);
        assert_eq!(
            "essay".parse::<QuestionKind>().unwrap(),
            QuestionKind::Unknown("essay".into())
        );
    }

    #[test]
    fn ids_normalise_numbers_and_strings() {
        let a: RecordId = serde_json::from_value(json!(1)).unwrap();
        let b: RecordId = serde_json::from_value(json!(" 1 ")).unwrap();
        assert_eq!(a, b);
        assert!(serde_json::from_value::<RecordId>(json!([1])).is_err());
    }

    #[test]
    fn question_parses_single_key() {
        let q: Question = serde_json::from_value(json!({
            "id": 1,
            "type": "number",
            "points": 10,
            "answer": 42,
            "text": "What is six times seven?"
        }))
        .unwrap();
        assert_eq!(q.kind, QuestionKind::Number);
        assert_eq!(q.keys, AnswerKeys::Single(AnswerKey::Number(42.0)));
        assert_eq!(q.extra["text"], "What is six times seven?");
    }

    #[test]
    fn question_parses_per_variant_keys() {
        let q: Question = serde_json::from_value(json!({
            "id": "q2",
            "type": "text",
            "points": 5,
            "answersByVariant": { "1": "paris", "2": "rome" }
        }))
        .unwrap();
        assert!(q.uses_variants());
        assert_eq!(q.answer_key(Some(2)).unwrap(), &AnswerKey::Text("rome".into()));
        assert_eq!(
            q.answer_key(Some(3)).unwrap_err(),
            GradeIssue::MissingVariantKey { variant: Some(3) }
        );
        assert_eq!(
            q.answer_key(None).unwrap_err(),
            GradeIssue::MissingVariantKey { variant: None }
        );
    }

    #[test]
    fn question_rejects_bad_variant_key() {
        let err = serde_json::from_value::<Question>(json!({
            "id": 1, "type": "text", "points": 1,
            "answersByVariant": { "first": "x" }
        }))
        .unwrap_err();
        assert!(err.to_string().contains("invalid variant key"), "{err}");
    }

    #[test]
    fn question_rejects_negative_points() {
        let err = serde_json::from_value::<Question>(json!({
            "id": 1, "type": "number", "points": -1, "answer": 3
        }))
        .unwrap_err();
        assert!(err.to_string().contains("non-negative"), "{err}");
    }

    #[test]
    fn question_rejects_points_above_limit() {
        let err = serde_json::from_value::<Question>(json!({
            "id": 1, "type": "number", "points": 3.0e9, "answer": 3
        }))
        .unwrap_err();
        assert!(err.to_string().contains("at most 1000000"), "{err}");

        let q: Question = serde_json::from_value(json!({
            "id": 1, "type": "number", "points": MAX_POINTS, "answer": 3
        }))
        .unwrap();
        assert_eq!(q.points, MAX_POINTS);
    }

    #[test]
    fn question_rejects_malformed_key() {
        let err = serde_json::from_value::<Question>(json!({
            "id": 7, "type": "list-num", "points": 3, "answer": { "massiv": "1,2,3" }
        }))
        .unwrap_err();
        assert!(err.to_string().contains("question 7"), "{err}");
    }

    #[test]
    fn question_without_key_is_rejected() {
        let err = serde_json::from_value::<Question>(json!({
            "id": 1, "type": "text", "points": 1
        }))
        .unwrap_err();
        assert!(err.to_string().contains("no answer key"), "{err}");
    }

    #[test]
    fn unknown_kind_loads_and_round_trips() {
        let doc = json!({
            "id": 9, "type": "essay", "points": 20, "answer": { "rubric": "..." }
        });
        let q: Question = serde_json::from_value(doc.clone()).unwrap();
        assert_eq!(q.kind, QuestionKind::Unknown("essay".into()));
        assert_eq!(
            q.answer_key(None).unwrap_err(),
            GradeIssue::UnknownQuestionType { tag: "essay".into() }
        );
        let back = serde_json::to_value(&q).unwrap();
        assert_eq!(back["answer"], doc["answer"]);
        assert_eq!(back["type"], "essay");
    }

    #[test]
    fn submission_reads_kebab_case_fields() {
        let s: Submission = serde_json::from_value(json!({
            "id-test": 3,
            "variant": 2,
            "answers": [
                { "question-id": 1, "answer": 42 },
                { "questionId": "1", "answer": 41 }
            ],
            "student": "Ivanov"
        }))
        .unwrap();
        assert_eq!(s.test_id, RecordId::from(3));
        assert_eq!(s.variant, Some(2));
        assert_eq!(s.answer_for(&RecordId::from(1)).unwrap().answer, json!(42));
        assert_eq!(s.extra["student"], "Ivanov");
    }

    #[test]
    fn test_bookkeeping() {
        let mut test = Test::new("t", vec![Question::new(1, 2.5, AnswerKey::Number(1.0))]);
        let at = Utc::now();
        test.record_submission(at);
        test.record_submission(at);
        assert_eq!(test.progress, 2);
        assert_eq!(test.last_updated, Some(at));
        assert_eq!(test.max_score(), 3);
        assert!(!test.uses_variants());
    }

    #[test]
    fn test_document_round_trip_keeps_extra_fields() {
        let doc = json!({
            "id": "t1",
            "title": "Week 3",
            "progress": 4,
            "lastUpdated": "2025-01-01T00:00:00Z",
            "questions": [
                { "id": 1, "type": "edges", "points": 4, "answer": { "edges": [[1, 2]] } }
            ]
        });
        let test: Test = serde_json::from_value(doc).unwrap();
        assert_eq!(test.progress, 4);
        assert!(test.last_updated.is_some());
        let back = serde_json::to_value(&test).unwrap();
        assert_eq!(back["title"], "Week 3");
        assert_eq!(back["questions"][0]["answer"]["edges"], json!([[1, 2]]));
    }
}
