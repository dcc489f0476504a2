//! quizmark-core: Answer keys, grading engine, and grading reports.
//!
//! This crate defines the test and submission data model, the per-kind
//! answer comparators, and the batch grading and reporting built on them.

pub mod answer;
pub mod batch;
pub mod error;
pub mod grading;
pub mod loader;
pub mod model;
pub mod report;
pub mod statistics;
