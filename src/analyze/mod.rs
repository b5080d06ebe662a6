// src/analyze/mod.rs
//! Text analysis: keyword matching, spam filter, rule table, scorer, salary extraction.

pub mod antispam;
pub mod keywords;
pub mod rules;
pub mod salary;
pub mod scoring;

// Re-export convenient types.
pub use crate::analyze::antispam::SpamFilter;
pub use crate::analyze::keywords::{CompiledKeyword, KeywordMatcher};
pub use crate::analyze::rules::{BonusRule, CategoryRule, ScoringRules};
pub use crate::analyze::salary::extract_salary;
pub use crate::analyze::scoring::{ScoreBreakdown, Scorer, Verdict, BLOCKED_SCORE, SPAM_SCORE};
