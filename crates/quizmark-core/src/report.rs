//! Grading report types with JSON persistence and regrade comparison.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::grading::ScoreCard;
use crate::model::{RecordId, Test};
use crate::statistics::AggregateStats;

/// A complete batch grading report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradingReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Summary of the graded test.
    pub test: TestSummary,
    /// Graded submissions, sorted by source.
    pub cards: Vec<GradedSubmission>,
    /// Submission files that could not be read or parsed.
    #[serde(default)]
    pub failures: Vec<BatchFailure>,
    /// Aggregate statistics.
    pub aggregate: AggregateStats,
    /// Total wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

/// Summary of a test (without the answer keys).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSummary {
    pub id: RecordId,
    pub question_count: usize,
    pub max_score: u32,
}

impl From<&Test> for TestSummary {
    fn from(test: &Test) -> Self {
        Self {
            id: test.id.clone(),
            question_count: test.questions.len(),
            max_score: test.max_score(),
        }
    }
}

/// One graded submission and where it came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradedSubmission {
    /// File name or other label identifying the submission.
    pub source: String,
    pub card: ScoreCard,
}

/// A submission that never reached grading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchFailure {
    pub source: String,
    pub error: String,
}

impl GradingReport {
    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: GradingReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Card for the given source, if it was graded.
    pub fn card(&self, source: &str) -> Option<&ScoreCard> {
        self.cards
            .iter()
            .find(|g| g.source == source)
            .map(|g| &g.card)
    }

    /// Compare this report against a baseline, matching submissions by source.
    pub fn compare(&self, baseline: &GradingReport) -> RegradeReport {
        let totals = |report: &GradingReport| -> HashMap<String, u32> {
            report
                .cards
                .iter()
                .map(|g| (g.source.clone(), g.card.total_score))
                .collect()
        };

        let baseline_totals = totals(baseline);
        let current_totals = totals(self);

        let mut lowered = Vec::new();
        let mut raised = Vec::new();
        let mut unchanged = 0usize;
        let mut new_submissions = Vec::new();

        for (source, &current) in &current_totals {
            let Some(&before) = baseline_totals.get(source) else {
                new_submissions.push(source.clone());
                continue;
            };
            let change = MarkChange {
                source: source.clone(),
                baseline: before,
                current,
                delta: i64::from(current) - i64::from(before),
            };
            match change.delta {
                d if d < 0 => lowered.push(change),
                d if d > 0 => raised.push(change),
                _ => unchanged += 1,
            }
        }

        let mut removed_submissions: Vec<String> = baseline_totals
            .keys()
            .filter(|k| !current_totals.contains_key(*k))
            .cloned()
            .collect();

        lowered.sort_by(|a, b| a.source.cmp(&b.source));
        raised.sort_by(|a, b| a.source.cmp(&b.source));
        new_submissions.sort();
        removed_submissions.sort();

        if baseline.test.id != self.test.id {
            tracing::warn!(
                "comparing reports for different tests ('{}' vs '{}')",
                baseline.test.id,
                self.test.id
            );
        }

        RegradeReport {
            lowered,
            raised,
            unchanged,
            new_submissions,
            removed_submissions,
        }
    }
}

/// Result of comparing two grading reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegradeReport {
    /// Submissions whose mark went down.
    pub lowered: Vec<MarkChange>,
    /// Submissions whose mark went up.
    pub raised: Vec<MarkChange>,
    /// Submissions with the same mark in both reports.
    pub unchanged: usize,
    /// Sources graded only in the current report.
    pub new_submissions: Vec<String>,
    /// Sources graded only in the baseline.
    pub removed_submissions: Vec<String>,
}

/// A changed mark.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkChange {
    pub source: String,
    pub baseline: u32,
    pub current: u32,
    pub delta: i64,
}

impl RegradeReport {
    /// Format the regrade report as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**Summary:** {} lowered, {} raised, {} unchanged, {} new, {} removed\n\n",
            self.lowered.len(),
            self.raised.len(),
            self.unchanged,
            self.new_submissions.len(),
            self.removed_submissions.len()
        ));

        for (title, changes) in [("Lowered", &self.lowered), ("Raised", &self.raised)] {
            if changes.is_empty() {
                continue;
            }
            md.push_str(&format!("### {title}\n\n"));
            md.push_str("| Submission | Baseline | Current | Delta |\n");
            md.push_str("|------------|----------|---------|-------|\n");
            for c in changes {
                md.push_str(&format!(
                    "| {} | {} | {} | {:+} |\n",
                    c.source, c.baseline, c.current, c.delta
                ));
            }
            md.push('\n');
        }

        if !self.new_submissions.is_empty() {
            md.push_str(&format!("New: {}\n", self.new_submissions.join(", ")));
        }
        if !self.removed_submissions.is_empty() {
            md.push_str(&format!("Removed: {}\n", self.removed_submissions.join(", ")));
        }

        md
    }

    /// Returns true if any mark changed.
    pub fn has_changes(&self) -> bool {
        !self.lowered.is_empty() || !self.raised.is_empty()
    }
}
