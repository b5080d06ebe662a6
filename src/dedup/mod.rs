// src/dedup/mod.rs
//! Duplicate detection: persistent url index plus fuzzy signature comparison.

pub mod fuzzy;
pub mod index;

pub use crate::dedup::fuzzy::{Similarity, DEFAULT_THRESHOLD};
pub use crate::dedup::index::{Candidate, CandidateKey, DuplicateIndex, NotifyChannel};
