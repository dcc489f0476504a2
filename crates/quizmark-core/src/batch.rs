//! Batch grader.
//!
//! Reads and grades many submission files against one test with bounded
//! parallelism. A file that cannot be read or parsed is recorded as a
//! failure and never aborts the batch.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::grading;
use crate::loader::{collect_json_files, load_submission_str};
use crate::model::Test;
use crate::report::{BatchFailure, GradedSubmission, GradingReport, TestSummary};
use crate::statistics::compute_aggregate_stats;

/// Configuration for the batch grader.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Maximum submissions read concurrently.
    pub parallelism: usize,
    /// Keep per-question lines on each card. When false only totals are kept.
    pub include_details: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            parallelism: 4,
            include_details: true,
        }
    }
}

/// Progress reporting trait.
pub trait ProgressReporter: Send + Sync {
    fn on_submission_start(&self, source: &str);
    fn on_submission_graded(&self, graded: &GradedSubmission);
    fn on_submission_error(&self, source: &str, error: &str);
    fn on_batch_complete(&self, total: usize, graded: usize, failed: usize, elapsed: Duration);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_submission_start(&self, _: &str) {}
    fn on_submission_graded(&self, _: &GradedSubmission) {}
    fn on_submission_error(&self, _: &str, _: &str) {}
    fn on_batch_complete(&self, _: usize, _: usize, _: usize, _: Duration) {}
}

/// Grades submission files concurrently.
pub struct BatchGrader {
    config: BatchConfig,
}

impl BatchGrader {
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }

    /// Grade every `.json` file under `dir`, labelling each by its path
    /// relative to `dir`.
    pub async fn run_directory(
        &self,
        test: &Test,
        dir: &Path,
        progress: &dyn ProgressReporter,
    ) -> Result<GradingReport> {
        let sources = collect_json_files(dir)?
            .into_iter()
            .map(|path| {
                let label = path
                    .strip_prefix(dir)
                    .unwrap_or(&path)
                    .display()
                    .to_string();
                (label, path)
            })
            .collect();
        self.grade_sources(test, sources, progress).await
    }

    /// Grade the given submission files, labelling each by its path.
    pub async fn run(
        &self,
        test: &Test,
        paths: &[PathBuf],
        progress: &dyn ProgressReporter,
    ) -> Result<GradingReport> {
        let sources = paths
            .iter()
            .map(|p| (p.display().to_string(), p.clone()))
            .collect();
        self.grade_sources(test, sources, progress).await
    }

    async fn grade_sources(
        &self,
        test: &Test,
        sources: Vec<(String, PathBuf)>,
        progress: &dyn ProgressReporter,
    ) -> Result<GradingReport> {
        let start = Instant::now();
        let report_id = Uuid::new_v4();
        let semaphore = Arc::new(Semaphore::new(self.config.parallelism.max(1)));

        let mut futures = FuturesUnordered::new();

        for (source, path) in sources {
            let semaphore = Arc::clone(&semaphore);
            progress.on_submission_start(&source);

            futures.push(async move {
                let inner = async {
                    let _permit = semaphore
                        .acquire()
                        .await
                        .map_err(|_| anyhow::anyhow!("semaphore closed"))?;

                    let content = tokio::fs::read_to_string(&path)
                        .await
                        .with_context(|| format!("failed to read {}", path.display()))?;
                    let submission = load_submission_str(&content, &path)?;
                    Ok::<_, anyhow::Error>(grading::score(test, &submission))
                };
                (source, inner.await)
            });
        }

        let total = futures.len();
        let mut cards = Vec::new();
        let mut failures = Vec::new();

        while let Some((source, result)) = futures.next().await {
            match result {
                Ok(card) => {
                    let graded = GradedSubmission { source, card };
                    progress.on_submission_graded(&graded);
                    cards.push(graded);
                }
                Err(e) => {
                    tracing::error!("grading failed for {source}: {e:#}");
                    progress.on_submission_error(&source, &format!("{e:#}"));
                    failures.push(BatchFailure {
                        source,
                        error: format!("{e:#}"),
                    });
                }
            }
        }

        let elapsed = start.elapsed();
        progress.on_batch_complete(total, cards.len(), failures.len(), elapsed);

        cards.sort_by(|a, b| a.source.cmp(&b.source));
        failures.sort_by(|a, b| a.source.cmp(&b.source));

        let aggregate = compute_aggregate_stats(cards.iter().map(|g| &g.card), test);

        // Statistics need the per-question lines; strip them only afterwards.
        if !self.config.include_details {
            cards = cards
                .into_iter()
                .map(|graded| GradedSubmission {
                    source: graded.source,
                    card: graded.card.summary_only(),
                })
                .collect();
        }

        Ok(GradingReport {
            id: report_id,
            created_at: chrono::Utc::now(),
            test: TestSummary::from(test),
            cards,
            failures,
            aggregate,
            duration_ms: elapsed.as_millis() as u64,
        })
    }
}
