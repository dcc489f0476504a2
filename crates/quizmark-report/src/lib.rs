//! quizmark-report: Audit renderings of grading reports.
//!
//! Turns a [`quizmark_core::report::GradingReport`] into a self-contained
//! HTML page or a markdown summary.

pub mod html;
pub mod markdown;
