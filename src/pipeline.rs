// src/pipeline.rs
//! Enrichment pipeline: spam → duplicate → score → enrich.
//!
//! Rejections are normal traffic. They are counted and logged at debug,
//! never returned as errors. Only storage failures propagate.

use std::collections::{BTreeMap, HashSet};

use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;

use crate::analyze::scoring::Scorer;
use crate::dedup::fuzzy::fold;
use crate::dedup::{CandidateKey, DuplicateIndex, DEFAULT_THRESHOLD};
use crate::error::StoreResult;
use crate::posting::JobPosting;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rejection {
    Spam,
    Duplicate,
    LowQuality,
}

impl Rejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rejection::Spam => "spam",
            Rejection::Duplicate => "duplicate",
            Rejection::LowQuality => "low_quality",
        }
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub enum Outcome {
    Accepted(JobPosting),
    Rejected(Rejection),
}

impl Outcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Outcome::Accepted(_))
    }
}

/// Result of one batch: accepted postings in input order plus rejection counts.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub accepted: Vec<JobPosting>,
    pub rejected: BTreeMap<Rejection, usize>,
}

impl BatchReport {
    pub fn rejected(&self, reason: Rejection) -> usize {
        self.rejected.get(&reason).copied().unwrap_or(0)
    }

    pub fn total_rejected(&self) -> usize {
        self.rejected.values().sum()
    }
}

#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    pub batch: BatchReport,
    pub inserted: usize,
    pub skipped: usize,
}

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "pipeline_accepted_total",
            "Postings accepted by the enrichment pipeline."
        );
        describe_counter!(
            "pipeline_rejected_total",
            "Postings rejected by the enrichment pipeline, by reason."
        );
        describe_counter!("dedup_inserted_total", "Rows written to the duplicate index.");
        describe_counter!(
            "dedup_skipped_total",
            "Rows skipped because the url was already stored."
        );
    });
}

/// Postings already accepted earlier in the same batch (not yet persisted).
#[derive(Default)]
struct BatchSeen {
    urls: HashSet<String>,
    accepted: Vec<SeenPosting>,
}

/// Folded keys for the pre-filter plus the signature for the comparator.
struct SeenPosting {
    title_key: String,
    company_key: String,
    signature: String,
}

impl SeenPosting {
    fn new(p: &JobPosting) -> Self {
        Self {
            title_key: fold(&p.title),
            company_key: fold(&p.company),
            signature: p.signature(),
        }
    }
}

pub struct Pipeline {
    scorer: Scorer,
    index: DuplicateIndex,
    fuzzy_threshold: u8,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("index", &self.index)
            .field("fuzzy_threshold", &self.fuzzy_threshold)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    pub fn new(scorer: Scorer, index: DuplicateIndex) -> Self {
        ensure_metrics_described();
        Self {
            scorer,
            index,
            fuzzy_threshold: DEFAULT_THRESHOLD,
        }
    }

    /// Threshold above 100 is clamped.
    pub fn with_fuzzy_threshold(mut self, threshold: u8) -> Self {
        self.fuzzy_threshold = threshold.min(100);
        self
    }

    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    pub fn index(&self) -> &DuplicateIndex {
        &self.index
    }

    pub fn into_index(self) -> DuplicateIndex {
        self.index
    }

    /// Runs one posting through the state machine against the stored set only.
    pub fn process(&self, posting: JobPosting) -> StoreResult<Outcome> {
        let outcome = self.classify(posting, &BatchSeen::default())?;
        record(&outcome);
        Ok(outcome)
    }

    /// Processes postings sequentially. A url (or a near-identical signature)
    /// accepted earlier in the same batch counts as a duplicate.
    pub fn process_batch(&self, postings: Vec<JobPosting>) -> StoreResult<BatchReport> {
        let mut seen = BatchSeen::default();
        let mut report = BatchReport::default();

        for posting in postings {
            let outcome = self.classify(posting, &seen)?;
            record(&outcome);
            match outcome {
                Outcome::Accepted(p) => {
                    seen.urls.insert(p.url.clone());
                    seen.accepted.push(SeenPosting::new(&p));
                    report.accepted.push(p);
                }
                Outcome::Rejected(reason) => {
                    *report.rejected.entry(reason).or_insert(0) += 1;
                }
            }
        }

        tracing::info!(
            target: "pipeline",
            accepted = report.accepted.len(),
            spam = report.rejected(Rejection::Spam),
            duplicate = report.rejected(Rejection::Duplicate),
            low_quality = report.rejected(Rejection::LowQuality),
            "batch processed"
        );
        Ok(report)
    }

    /// `process_batch` followed by one transactional insert of the accepted set.
    pub fn run_cycle(&mut self, postings: Vec<JobPosting>) -> StoreResult<CycleReport> {
        let batch = self.process_batch(postings)?;
        let inserted = self.index.insert_batch(&batch.accepted)?;
        let skipped = batch.accepted.len() - inserted;
        tracing::info!(target: "pipeline", inserted, skipped, "cycle persisted");
        Ok(CycleReport {
            batch,
            inserted,
            skipped,
        })
    }

    fn classify(&self, mut posting: JobPosting, seen: &BatchSeen) -> StoreResult<Outcome> {
        // 1) Spam
        if let Some(phrase) = self.scorer.spam_filter().is_spam(&posting.scoring_text()) {
            tracing::debug!(target: "pipeline", url = %posting.url, phrase, "rejected: spam");
            return Ok(Outcome::Rejected(Rejection::Spam));
        }

        // 2) Duplicate: this batch first, then the store (url, then fuzzy)
        if self.is_batch_duplicate(&posting, seen)
            || self.index.is_fuzzy_duplicate(&posting, self.fuzzy_threshold)?
        {
            tracing::debug!(target: "pipeline", url = %posting.url, "rejected: duplicate");
            return Ok(Outcome::Rejected(Rejection::Duplicate));
        }

        // 3) Score
        let breakdown = self.scorer.score(&posting);
        if breakdown.score < 0 {
            tracing::debug!(
                target: "pipeline",
                url = %posting.url,
                score = breakdown.score,
                verdict = ?breakdown.verdict,
                "rejected: low quality"
            );
            return Ok(Outcome::Rejected(Rejection::LowQuality));
        }

        // 4) Enrich
        self.scorer.attach(&mut posting, &breakdown);
        Ok(Outcome::Accepted(posting))
    }

    fn is_batch_duplicate(&self, posting: &JobPosting, seen: &BatchSeen) -> bool {
        if seen.urls.contains(&posting.url) {
            return true;
        }
        // Same narrowing as the store: only postings sharing a leading
        // title/company word reach the comparator, capped like the SQL query.
        let key = CandidateKey::new(&posting.title, &posting.company);
        if key.is_empty() {
            return false;
        }
        let sig = posting.signature();
        let similarity = self.index.similarity();
        seen.accepted
            .iter()
            .filter(|s| key.admits(&s.title_key, &s.company_key))
            .take(self.index.max_candidates())
            .any(|s| similarity.is_duplicate(&sig, &s.signature, self.fuzzy_threshold))
    }
}

fn record(outcome: &Outcome) {
    match outcome {
        Outcome::Accepted(_) => counter!("pipeline_accepted_total").increment(1),
        Outcome::Rejected(reason) => {
            counter!("pipeline_rejected_total", "reason" => reason.as_str()).increment(1)
        }
    }
}
