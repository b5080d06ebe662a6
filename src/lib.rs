// src/lib.rs
// Public library surface for the batch runner and integration tests.

pub mod analyze;
pub mod config;
pub mod dedup;
pub mod error;
pub mod ingest;
pub mod pipeline;
pub mod posting;

// ---- Re-exports for stable public API ----
pub use crate::analyze::{KeywordMatcher, Scorer, ScoringRules, SpamFilter};
pub use crate::config::EngineConfig;
pub use crate::dedup::{DuplicateIndex, NotifyChannel, Similarity};
pub use crate::error::{StoreError, StoreResult};
pub use crate::ingest::{Collector, JsonFileCollector, RawPosting};
pub use crate::pipeline::{BatchReport, CycleReport, Outcome, Pipeline, Rejection};
pub use crate::posting::JobPosting;
