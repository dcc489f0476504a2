//! The grading engine.
//!
//! [`score`] is a pure function of a test and a submission. It never fails:
//! every problem with an individual answer is recorded as a [`GradeIssue`] on
//! that question's line and scores zero, and grading moves on to the next
//! question.
//!
//! Each question's awarded points are rounded before they are summed into the
//! total. Summing first and rounding once would give different totals when
//! several questions earn fractional partial credit.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::answer::{
    coerce_flags, coerce_matrix, coerce_number, coerce_number_list, coerce_pairs, coerce_text,
    keyed, AnswerKey, AtomPair,
};
use crate::error::GradeIssue;
use crate::model::{Question, QuestionKind, RecordId, Submission, Test};

/// The graded result of one submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreCard {
    pub test_id: RecordId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<u32>,
    /// Sum of every question's rounded points.
    pub total_score: u32,
    /// Highest total the test allows.
    pub max_score: u32,
    /// One line per test question, in test order. Empty when the card was
    /// reduced with [`ScoreCard::summary_only`].
    #[serde(default)]
    pub questions: Vec<QuestionScore>,
    /// Answer items naming a question the test does not have.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unmatched_answers: Vec<RecordId>,
}

/// The graded result of one question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionScore {
    pub question_id: RecordId,
    pub kind: QuestionKind,
    /// Unrounded credit, within `0..=max_points`.
    pub points_awarded: f64,
    /// `points_awarded` rounded to the nearest integer.
    pub rounded_points: u32,
    pub max_points: f64,
    /// Set when the answer was not compared at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue: Option<GradeIssue>,
    /// The canonical answer that applied, in document form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<Value>,
    /// The student's answer as submitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted: Option<Value>,
}

impl QuestionScore {
    pub fn is_full_credit(&self) -> bool {
        self.max_points > 0.0 && self.points_awarded >= self.max_points
    }
}

impl ScoreCard {
    /// Total as a fraction of the maximum, in `0.0..=1.0`.
    pub fn percentage(&self) -> f64 {
        if self.max_score == 0 {
            0.0
        } else {
            self.total_score as f64 / self.max_score as f64
        }
    }

    /// Drop the per-question lines, keeping only the totals.
    pub fn summary_only(mut self) -> Self {
        self.questions.clear();
        self
    }

    /// Render the card as a markdown table for audit display.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**Score:** {} / {} ({:.1}%)\n\n",
            self.total_score,
            self.max_score,
            self.percentage() * 100.0
        ));

        if !self.questions.is_empty() {
            md.push_str("| Question | Type | Points | Max | Note |\n");
            md.push_str("|----------|------|--------|-----|------|\n");
            for q in &self.questions {
                md.push_str(&format!(
                    "| {} | {} | {} ({:.2}) | {} | {} |\n",
                    q.question_id,
                    q.kind,
                    q.rounded_points,
                    q.points_awarded,
                    q.max_points,
                    q.issue.as_ref().map(ToString::to_string).unwrap_or_default()
                ));
            }
        }

        if !self.unmatched_answers.is_empty() {
            let ids: Vec<String> = self
                .unmatched_answers
                .iter()
                .map(ToString::to_string)
                .collect();
            md.push_str(&format!(
                "\nAnswers for unknown questions: {}\n",
                ids.join(", ")
            ));
        }

        md
    }
}

/// Round awarded points to the nearest integer, halves away from zero.
pub fn round_points(points: f64) -> u32 {
    if points.is_finite() && points > 0.0 {
        points.round() as u32
    } else {
        0
    }
}

/// Grade a submission against a test.
pub fn score(test: &Test, submission: &Submission) -> ScoreCard {
    if submission.test_id != test.id {
        tracing::warn!(
            "grading submission for test '{}' against test '{}'",
            submission.test_id,
            test.id
        );
    }

    let questions: Vec<QuestionScore> = test
        .questions
        .iter()
        .map(|question| score_question(question, submission))
        .collect();

    let unmatched_answers = submission
        .answers
        .iter()
        .filter(|item| test.question(&item.question_id).is_none())
        .map(|item| item.question_id.clone())
        .collect();

    ScoreCard {
        test_id: test.id.clone(),
        variant: submission.variant,
        total_score: questions
            .iter()
            .map(|q| q.rounded_points)
            .fold(0u32, u32::saturating_add),
        max_score: test.max_score(),
        questions,
        unmatched_answers,
    }
}

fn score_question(question: &Question, submission: &Submission) -> QuestionScore {
    let max_points = question.points.max(0.0);
    let item = submission.answer_for(&question.id);
    let key = question.answer_key(submission.variant);

    let outcome = match (&key, item) {
        (Err(issue @ GradeIssue::UnknownQuestionType { .. }), _) => Err(issue.clone()),
        (_, None) => Err(GradeIssue::MissingAnswer),
        (Err(issue), Some(_)) => Err(issue.clone()),
        (Ok(key), Some(item)) => grade_answer(key, &item.answer),
    };

    let (points_awarded, issue) = match outcome {
        Ok(credit) => ((credit * max_points).clamp(0.0, max_points), None),
        Err(issue) => {
            match &issue {
                GradeIssue::UnknownQuestionType { tag } => {
                    tracing::warn!("question {}: unknown question type '{tag}'", question.id)
                }
                other => tracing::debug!("question {}: {other}", question.id),
            }
            (0.0, Some(issue))
        }
    };

    QuestionScore {
        question_id: question.id.clone(),
        kind: question.kind.clone(),
        points_awarded,
        rounded_points: round_points(points_awarded),
        max_points,
        issue,
        expected: key.ok().map(AnswerKey::to_json),
        submitted: item.map(|i| i.answer.clone()),
    }
}

/// Compare a student's answer against a key. Returns the earned fraction of
/// the question's points, in `0.0..=1.0`.
pub fn grade_answer(key: &AnswerKey, submitted: &Value) -> Result<f64, GradeIssue> {
    match key {
        AnswerKey::Text(expected) => grade_text(expected, submitted),
        AnswerKey::Number(expected) => grade_number(*expected, submitted),
        AnswerKey::NumberList { values, ordered } => grade_number_list(values, *ordered, submitted),
        AnswerKey::Matrix(rows) => grade_matrix(rows, submitted),
        AnswerKey::MultiSelect(flags) => grade_multi_select(flags, submitted),
        AnswerKey::Pairs { pairs, ordered } => grade_pairs(pairs, *ordered, submitted),
        AnswerKey::Edges(edges) => grade_edges(edges, submitted),
    }
}

fn all_or_nothing(correct: bool) -> f64 {
    if correct {
        1.0
    } else {
        0.0
    }
}

fn fraction(hits: usize, total: usize) -> f64 {
    hits as f64 / total as f64
}

fn normalize_text(s: &str) -> String {
    s.trim().to_lowercase()
}

fn grade_text(expected: &str, submitted: &Value) -> Result<f64, GradeIssue> {
    let given = coerce_text(submitted).ok_or_else(|| GradeIssue::shape("a string"))?;
    Ok(all_or_nothing(
        normalize_text(expected) == normalize_text(&given),
    ))
}

fn grade_number(expected: f64, submitted: &Value) -> Result<f64, GradeIssue> {
    let given = coerce_number(submitted).ok_or_else(|| GradeIssue::shape("a number"))?;
    Ok(all_or_nothing(given == expected))
}

fn grade_number_list(expected: &[f64], ordered: bool, submitted: &Value) -> Result<f64, GradeIssue> {
    let given = coerce_number_list(keyed(submitted, "massiv"))
        .ok_or_else(|| GradeIssue::shape("a list of numbers"))?;

    if expected.is_empty() {
        return Ok(all_or_nothing(given.is_empty()));
    }

    let hits = if ordered {
        expected
            .iter()
            .zip(&given)
            .filter(|(want, got)| want == got)
            .count()
    } else {
        count_consumed(expected, &given, |want, got| want == got)
    };

    Ok(fraction(hits, expected.len()))
}

fn grade_matrix(expected: &[Vec<f64>], submitted: &Value) -> Result<f64, GradeIssue> {
    let given = coerce_matrix(keyed(submitted, "matrix"))
        .ok_or_else(|| GradeIssue::shape("a matrix of numbers"))?;

    if given.as_slice() == expected {
        return Ok(1.0);
    }

    let cells: usize = expected.iter().map(Vec::len).sum();
    if cells == 0 {
        return Ok(all_or_nothing(given.iter().all(Vec::is_empty)));
    }

    let hits: usize = expected
        .iter()
        .zip(&given)
        .map(|(want_row, got_row)| {
            want_row
                .iter()
                .zip(got_row)
                .filter(|(want, got)| want == got)
                .count()
        })
        .sum();

    Ok(fraction(hits, cells))
}

fn grade_multi_select(expected: &[u8], submitted: &Value) -> Result<f64, GradeIssue> {
    let given = coerce_flags(keyed(submitted, "correct"))
        .ok_or_else(|| GradeIssue::shape("a list of 0/1 flags"))?;
    Ok(all_or_nothing(given == expected))
}

fn same_pair(want: &AtomPair, got: &AtomPair) -> bool {
    want[0].matches(&got[0]) && want[1].matches(&got[1])
}

fn same_edge(want: &AtomPair, got: &AtomPair) -> bool {
    same_pair(want, got) || (want[0].matches(&got[1]) && want[1].matches(&got[0]))
}

fn grade_pairs(expected: &[AtomPair], ordered: bool, submitted: &Value) -> Result<f64, GradeIssue> {
    let given = coerce_pairs(keyed(submitted, "pairs"))
        .ok_or_else(|| GradeIssue::shape("a list of pairs"))?;

    if expected.is_empty() {
        return Ok(all_or_nothing(given.is_empty()));
    }

    let hits = if ordered {
        expected
            .iter()
            .zip(&given)
            .filter(|(want, got)| same_pair(want, got))
            .count()
    } else {
        count_consumed(expected, &given, same_pair)
    };

    Ok(fraction(hits, expected.len()))
}

fn grade_edges(expected: &[AtomPair], submitted: &Value) -> Result<f64, GradeIssue> {
    let given = coerce_pairs(keyed(submitted, "edges"))
        .ok_or_else(|| GradeIssue::shape("a list of edges"))?;

    if expected.is_empty() {
        return Ok(all_or_nothing(given.is_empty()));
    }

    Ok(fraction(
        count_consumed(expected, &given, same_edge),
        expected.len(),
    ))
}

/// Count expected items that find an equal given item, each given item
/// matching at most once. Expected items claim matches in order.
fn count_consumed<T>(expected: &[T], given: &[T], eq: impl Fn(&T, &T) -> bool) -> usize {
    let mut used = vec![false; given.len()];
    let mut hits = 0;
    for want in expected {
        let found = given
            .iter()
            .enumerate()
            .position(|(i, got)| !used[i] && eq(want, got));
        if let Some(i) = found {
            used[i] = true;
            hits += 1;
        }
    }
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answer::Atom;
    use crate::model::{AnswerItem, QuestionKind};
    use serde_json::json;
    use std::collections::BTreeMap;

    fn pair(a: f64, b: f64) -> AtomPair {
        [Atom::Number(a), Atom::Number(b)]
    }

    fn scenario_test() -> Test {
        Test::new(
            "algebra",
            vec![
                Question::new(1, 10.0, AnswerKey::Number(42.0)),
                Question::new(
                    2,
                    10.0,
                    AnswerKey::NumberList {
                        values: vec![1.0, 2.0, 3.0],
                        ordered: false,
                    },
                ),
            ],
        )
    }

    fn submit(answers: Vec<(u32, Value)>) -> Submission {
        Submission::new(
            "algebra",
            answers
                .into_iter()
                .map(|(id, answer)| AnswerItem::new(id, answer))
                .collect(),
        )
    }

    #[test]
    fn full_marks_scenario() {
        let card = score(
            &scenario_test(),
            &submit(vec![(1, json!(42)), (2, json!([3, 1, 2]))]),
        );
        assert_eq!(card.total_score, 20);
        assert_eq!(card.max_score, 20);
        assert!(card.questions.iter().all(|q| q.issue.is_none()));
    }

    #[test]
    fn huge_point_values_saturate_totals() {
        let test = Test::new(
            "algebra",
            vec![
                Question::new(1, 3.0e9, AnswerKey::Number(1.0)),
                Question::new(2, 3.0e9, AnswerKey::Number(2.0)),
            ],
        );
        let card = score(&test, &submit(vec![(1, json!(1)), (2, json!(2))]));
        assert_eq!(card.total_score, u32::MAX);
        assert_eq!(card.max_score, u32::MAX);
    }

    #[test]
    fn partial_credit_scenario_rounds_per_question() {
        let card = score(
            &scenario_test(),
            &submit(vec![(1, json!("42")), (2, json!([1, 2]))]),
        );
        assert_eq!(card.questions[0].rounded_points, 10);
        assert!((card.questions[1].points_awarded - 20.0 / 3.0).abs() < 1e-9);
        assert_eq!(card.questions[1].rounded_points, 7);
        assert_eq!(card.total_score, 17);
    }

    #[test]
    fn rounding_happens_before_summing() {
        // Three questions at 1/3 credit of 2 points each: 0.67 rounds to 1
        // per question, giving 3; summing first would give round(2.0) = 2.
        let key = AnswerKey::NumberList {
            values: vec![1.0, 2.0, 3.0],
            ordered: false,
        };
        let test = Test::new(
            "t",
            (1..=3).map(|i| Question::new(i, 2.0, key.clone())).collect(),
        );
        let card = score(
            &test,
            &Submission::new(
                "t",
                (1..=3u32).map(|i| AnswerItem::new(i, json!([1]))).collect(),
            ),
        );
        assert_eq!(card.total_score, 3);
    }

    #[test]
    fn missing_answer_scores_zero() {
        let card = score(&scenario_test(), &submit(vec![(1, json!(42))]));
        assert_eq!(card.total_score, 10);
        assert_eq!(card.questions[1].issue, Some(GradeIssue::MissingAnswer));
        assert_eq!(card.questions[1].points_awarded, 0.0);
    }

    #[test]
    fn orphan_answers_are_listed_and_ignored() {
        let card = score(
            &scenario_test(),
            &submit(vec![(1, json!(42)), (99, json!(1))]),
        );
        assert_eq!(card.total_score, 10);
        assert_eq!(card.unmatched_answers, vec![RecordId::from(99)]);
    }

    #[test]
    fn duplicate_answers_use_first_match() {
        let card = score(
            &scenario_test(),
            &submit(vec![(1, json!(41)), (1, json!(42))]),
        );
        assert_eq!(card.questions[0].points_awarded, 0.0);
    }

    #[test]
    fn text_is_trimmed_and_case_insensitive() {
        let key = AnswerKey::Text("Paris".into());
        assert_eq!(grade_answer(&key, &json!("  paris ")).unwrap(), 1.0);
        assert_eq!(grade_answer(&key, &json!("Lyon")).unwrap(), 0.0);
        assert_eq!(
            grade_answer(&key, &json!(["paris"])).unwrap_err(),
            GradeIssue::shape("a string")
        );
    }

    #[test]
    fn text_key_accepts_whole_number_written_as_float() {
        let key = AnswerKey::Text("42".into());
        assert_eq!(grade_answer(&key, &json!(42.0)).unwrap(), 1.0);
        assert_eq!(grade_answer(&key, &json!(42)).unwrap(), 1.0);
        assert_eq!(grade_answer(&key, &json!(42.5)).unwrap(), 0.0);
    }

    #[test]
    fn number_compares_after_coercion() {
        let key = AnswerKey::Number(2.5);
        assert_eq!(grade_answer(&key, &json!(2.5)).unwrap(), 1.0);
        assert_eq!(grade_answer(&key, &json!(" 2.5")).unwrap(), 1.0);
        assert_eq!(grade_answer(&key, &json!(2.4)).unwrap(), 0.0);
        assert!(grade_answer(&key, &json!("two")).is_err());
    }

    #[test]
    fn ordered_list_penalises_reversal() {
        let key = AnswerKey::NumberList {
            values: vec![1.0, 2.0, 3.0, 4.0],
            ordered: true,
        };
        let right = grade_answer(&key, &json!([1, 2, 3, 4])).unwrap();
        let reversed = grade_answer(&key, &json!([4, 3, 2, 1])).unwrap();
        assert_eq!(right, 1.0);
        assert!(reversed < right);
        assert_eq!(reversed, 0.0);
    }

    #[test]
    fn ordered_list_compares_up_to_shorter_length() {
        let key = AnswerKey::NumberList {
            values: vec![5.0, 6.0, 7.0],
            ordered: true,
        };
        assert_eq!(grade_answer(&key, &json!([5, 6])).unwrap(), 2.0 / 3.0);
        assert_eq!(grade_answer(&key, &json!([5, 6, 7, 8, 9])).unwrap(), 1.0);
    }

    #[test]
    fn unordered_list_consumes_each_value_once() {
        let key = AnswerKey::NumberList {
            values: vec![2.0, 2.0, 3.0],
            ordered: false,
        };
        assert_eq!(grade_answer(&key, &json!([3, 2, 2])).unwrap(), 1.0);
        assert_eq!(grade_answer(&key, &json!([2, 3])).unwrap(), 2.0 / 3.0);
        assert_eq!(grade_answer(&key, &json!([2, 2, 2, 2])).unwrap(), 2.0 / 3.0);
    }

    #[test]
    fn list_accepts_keyed_student_answer() {
        let key = AnswerKey::NumberList {
            values: vec![1.0],
            ordered: false,
        };
        assert_eq!(grade_answer(&key, &json!({ "massiv": ["1"] })).unwrap(), 1.0);
    }

    #[test]
    fn list_with_non_numeric_element_is_a_shape_mismatch() {
        let key = AnswerKey::NumberList {
            values: vec![1.0, 2.0],
            ordered: false,
        };
        assert!(grade_answer(&key, &json!([1, "two"])).is_err());
        assert!(grade_answer(&key, &json!(12)).is_err());
    }

    #[test]
    fn empty_key_needs_empty_answer() {
        let key = AnswerKey::NumberList {
            values: vec![],
            ordered: true,
        };
        assert_eq!(grade_answer(&key, &json!([])).unwrap(), 1.0);
        assert_eq!(grade_answer(&key, &json!([1])).unwrap(), 0.0);
        assert_eq!(grade_answer(&AnswerKey::Edges(vec![]), &json!([[1, 2]])).unwrap(), 0.0);
    }

    #[test]
    fn matrix_identical_gets_full_credit() {
        let key = AnswerKey::Matrix(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        assert_eq!(grade_answer(&key, &json!([[1, 2], [3, 4]])).unwrap(), 1.0);
    }

    #[test]
    fn matrix_counts_cells_over_overlap() {
        let key = AnswerKey::Matrix(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        // One wrong cell.
        assert_eq!(grade_answer(&key, &json!([[1, 2], [3, 0]])).unwrap(), 0.75);
        // Missing second row: only the first row can match.
        assert_eq!(grade_answer(&key, &json!([[1, 2]])).unwrap(), 0.5);
        // Extra columns are ignored.
        assert_eq!(grade_answer(&key, &json!([[1, 2, 9], [3, 4, 9]])).unwrap(), 1.0);
        assert!(grade_answer(&key, &json!([1, 2, 3, 4])).is_err());
    }

    #[test]
    fn multi_select_needs_exact_vector() {
        let key = AnswerKey::MultiSelect(vec![0, 1, 1, 0]);
        assert_eq!(grade_answer(&key, &json!([0, 1, 1, 0])).unwrap(), 1.0);
        assert_eq!(
            grade_answer(&key, &json!({ "correct": [false, true, true, false] })).unwrap(),
            1.0
        );
        assert_eq!(grade_answer(&key, &json!([0, 1, 0, 0])).unwrap(), 0.0);
        assert_eq!(grade_answer(&key, &json!([0, 1, 1])).unwrap(), 0.0);
    }

    #[test]
    fn unordered_pairs_are_order_sensitive_within_pair() {
        let key = AnswerKey::Pairs {
            pairs: vec![pair(1.0, 2.0), pair(3.0, 4.0)],
            ordered: false,
        };
        assert_eq!(grade_answer(&key, &json!([[3, 4], [1, 2]])).unwrap(), 1.0);
        assert_eq!(grade_answer(&key, &json!([[2, 1], [3, 4]])).unwrap(), 0.5);
        assert_eq!(grade_answer(&key, &json!([[1, 2], [1, 2]])).unwrap(), 0.5);
    }

    #[test]
    fn ordered_pairs_compare_positions() {
        let key = AnswerKey::Pairs {
            pairs: vec![pair(1.0, 2.0), pair(3.0, 4.0)],
            ordered: true,
        };
        assert_eq!(grade_answer(&key, &json!([[1, 2], [3, 4]])).unwrap(), 1.0);
        assert_eq!(grade_answer(&key, &json!([[3, 4], [1, 2]])).unwrap(), 0.0);
    }

    #[test]
    fn pairs_match_labels_and_coerced_numbers() {
        let key = AnswerKey::Pairs {
            pairs: vec![[Atom::Text("A".into()), Atom::Number(1.0)]],
            ordered: false,
        };
        assert_eq!(grade_answer(&key, &json!([["A", "1"]])).unwrap(), 1.0);
        assert_eq!(grade_answer(&key, &json!([["a", 1]])).unwrap(), 0.0);
    }

    #[test]
    fn edges_match_in_either_orientation() {
        let key = AnswerKey::Edges(vec![pair(1.0, 2.0), pair(2.0, 3.0), pair(3.0, 1.0)]);
        assert_eq!(
            grade_answer(&key, &json!([[2, 1], [3, 2], [1, 3]])).unwrap(),
            1.0
        );
        assert_eq!(
            grade_answer(&key, &json!({ "edges": [[3, 2]] })).unwrap(),
            1.0 / 3.0
        );
    }

    #[test]
    fn edges_consume_student_edges_once() {
        let key = AnswerKey::Edges(vec![pair(1.0, 2.0), pair(1.0, 2.0)]);
        assert_eq!(grade_answer(&key, &json!([[2, 1]])).unwrap(), 0.5);
        assert_eq!(grade_answer(&key, &json!([[2, 1], [1, 2]])).unwrap(), 1.0);
    }

    #[test]
    fn shape_mismatch_scores_zero_and_continues() {
        let card = score(
            &scenario_test(),
            &submit(vec![(1, json!({ "value": 42 })), (2, json!([1, 2, 3]))]),
        );
        assert!(matches!(
            card.questions[0].issue,
            Some(GradeIssue::ShapeMismatch { .. })
        ));
        assert_eq!(card.total_score, 10);
    }

    #[test]
    fn per_variant_keys_follow_submission_variant() {
        let mut keys = BTreeMap::new();
        keys.insert(1, AnswerKey::Number(10.0));
        keys.insert(2, AnswerKey::Number(20.0));
        let test = Test::new(
            "v",
            vec![Question::per_variant(1, 5.0, QuestionKind::Number, keys)],
        );

        let first = Submission::new("v", vec![AnswerItem::new(1, json!(10))]).with_variant(1);
        assert_eq!(score(&test, &first).total_score, 5);

        let second = Submission::new("v", vec![AnswerItem::new(1, json!(10))]).with_variant(2);
        assert_eq!(score(&test, &second).total_score, 0);

        let unknown = Submission::new("v", vec![AnswerItem::new(1, json!(10))]).with_variant(3);
        let card = score(&test, &unknown);
        assert_eq!(card.total_score, 0);
        assert_eq!(
            card.questions[0].issue,
            Some(GradeIssue::MissingVariantKey { variant: Some(3) })
        );
        assert!(card.questions[0].expected.is_none());
    }

    #[test]
    fn unknown_kind_scores_zero() {
        let test: Test = serde_json::from_value(json!({
            "id": "t",
            "questions": [
                { "id": 1, "type": "essay", "points": 10, "answer": "anything" },
                { "id": 2, "type": "number", "points": 10, "answer": 3 }
            ]
        }))
        .unwrap();
        let card = score(
            &test,
            &submit(vec![(1, json!("anything")), (2, json!(3))]),
        );
        assert_eq!(card.total_score, 10);
        assert_eq!(
            card.questions[0].issue,
            Some(GradeIssue::UnknownQuestionType { tag: "essay".into() })
        );
    }

    #[test]
    fn awarded_points_stay_within_bounds() {
        let test = scenario_test();
        let answers = [json!(null), json!([]), json!([1, 2, 3, 4, 5]), json!("x"), json!(42)];
        for a in &answers {
            for b in &answers {
                let card = score(&test, &submit(vec![(1, a.clone()), (2, b.clone())]));
                for q in &card.questions {
                    assert!(q.points_awarded >= 0.0 && q.points_awarded <= q.max_points);
                }
                let sum: u32 = card.questions.iter().map(|q| round_points(q.points_awarded)).sum();
                assert_eq!(card.total_score, sum);
            }
        }
    }

    #[test]
    fn card_markdown_lists_questions() {
        let card = score(&scenario_test(), &submit(vec![(1, json!(42))]));
        let md = card.to_markdown();
        assert!(md.contains("**Score:** 10 / 20"));
        assert!(md.contains("no answer submitted"));
        assert!(card.summary_only().questions.is_empty());
    }
}
