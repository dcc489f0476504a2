//! Aggregate statistics over a batch of graded submissions.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::grading::{QuestionScore, ScoreCard};
use crate::model::{QuestionKind, RecordId, Test};

/// Aggregate statistics across all graded submissions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregateStats {
    /// Number of graded submissions.
    pub submissions: usize,
    /// Mean total score.
    pub mean_score: f64,
    /// Median total score.
    pub median_score: f64,
    /// Lowest total score (0 when there are no submissions).
    pub min_score: u32,
    /// Highest total score.
    pub max_score: u32,
    /// Mean of each submission's total as a fraction of the test maximum.
    pub mean_percentage: f64,
    /// Submissions that earned the test maximum.
    pub full_marks: usize,
    /// Per-question statistics, in test order.
    pub per_question: Vec<QuestionStats>,
}

/// Statistics for a single question across all submissions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionStats {
    pub question_id: RecordId,
    pub kind: QuestionKind,
    pub max_points: f64,
    /// Submissions whose card carried a line for this question.
    pub graded: usize,
    /// Mean unrounded points awarded.
    pub mean_awarded: f64,
    /// Mean fraction of the question's points awarded.
    pub award_rate: f64,
    /// Lines that earned the full points.
    pub full_credit: usize,
    /// Lines that earned nothing.
    pub zero_credit: usize,
    /// How often each grading issue occurred, by issue label.
    #[serde(default)]
    pub issues: BTreeMap<String, usize>,
}

/// Median of a list of totals. Averages the middle pair for even counts.
pub fn median(values: &[u32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0
    } else {
        sorted[mid] as f64
    }
}

/// Compute aggregate statistics from graded cards.
///
/// Cards reduced to totals only still count towards the totals, but not
/// towards per-question statistics.
pub fn compute_aggregate_stats<'a>(
    cards: impl IntoIterator<Item = &'a ScoreCard>,
    test: &Test,
) -> AggregateStats {
    let cards: Vec<&ScoreCard> = cards.into_iter().collect();
    if cards.is_empty() {
        return AggregateStats {
            per_question: test
                .questions
                .iter()
                .map(|q| empty_question_stats(q.id.clone(), q.kind.clone(), q.points))
                .collect(),
            ..AggregateStats::default()
        };
    }

    let totals: Vec<u32> = cards.iter().map(|c| c.total_score).collect();
    let n = cards.len() as f64;
    let test_max = test.max_score();

    // Group question lines by id; duplicate question ids share one entry
    let mut lines: HashMap<&RecordId, Vec<&QuestionScore>> = HashMap::new();
    for card in &cards {
        for line in &card.questions {
            lines.entry(&line.question_id).or_default().push(line);
        }
    }

    let mut seen = std::collections::HashSet::new();
    let per_question = test
        .questions
        .iter()
        .filter(|q| seen.insert(&q.id))
        .map(|q| {
            let graded = lines.get(&q.id).map(Vec::as_slice).unwrap_or_default();
            question_stats(q.id.clone(), q.kind.clone(), q.points, graded)
        })
        .collect();

    AggregateStats {
        submissions: cards.len(),
        mean_score: totals.iter().map(|&t| t as f64).sum::<f64>() / n,
        median_score: median(&totals),
        min_score: totals.iter().copied().min().unwrap_or(0),
        max_score: totals.iter().copied().max().unwrap_or(0),
        mean_percentage: cards.iter().map(|c| c.percentage()).sum::<f64>() / n,
        full_marks: totals.iter().filter(|&&t| test_max > 0 && t >= test_max).count(),
        per_question,
    }
}

fn empty_question_stats(question_id: RecordId, kind: QuestionKind, max_points: f64) -> QuestionStats {
    QuestionStats {
        question_id,
        kind,
        max_points,
        graded: 0,
        mean_awarded: 0.0,
        award_rate: 0.0,
        full_credit: 0,
        zero_credit: 0,
        issues: BTreeMap::new(),
    }
}

fn question_stats(
    question_id: RecordId,
    kind: QuestionKind,
    max_points: f64,
    lines: &[&QuestionScore],
) -> QuestionStats {
    let mut stats = empty_question_stats(question_id, kind, max_points);
    if lines.is_empty() {
        return stats;
    }

    let n = lines.len() as f64;
    stats.graded = lines.len();
    stats.mean_awarded = lines.iter().map(|l| l.points_awarded).sum::<f64>() / n;
    stats.award_rate = if max_points > 0.0 {
        stats.mean_awarded / max_points
    } else {
        0.0
    };
    stats.full_credit = lines.iter().filter(|l| l.is_full_credit()).count();
    stats.zero_credit = lines.iter().filter(|l| l.points_awarded <= 0.0).count();
    for issue in lines.iter().filter_map(|l| l.issue.as_ref()) {
        *stats.issues.entry(issue.label().to_string()).or_default() += 1;
    }
    stats
}
