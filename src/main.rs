//! JobPulse batch runner.
//! Reads raw postings from JSON files, runs one enrichment cycle against the
//! local SQLite index and prints the accepted postings as JSON lines.
//!
//! Usage: `jobpulse <file.json>...`

use anyhow::{bail, Context, Result};
use chrono::Utc;
use std::io::Write;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use jobpulse_engine::ingest::{collect_all, filter_recent, Collector, JsonFileCollector};
use jobpulse_engine::{DuplicateIndex, EngineConfig, Pipeline, Rejection, Scorer, ScoringRules, Similarity};

/// Compact logs by default; `JOBPULSE_LOG_JSON=1` switches to JSON lines.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("jobpulse=info,pipeline=info,ingest=info,warn"));
    let json = std::env::var("JOBPULSE_LOG_JSON")
        .ok()
        .is_some_and(|v| v == "1");

    // Logs go to stderr; stdout carries the accepted postings.
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let files: Vec<String> = std::env::args().skip(1).collect();
    if files.is_empty() {
        bail!("usage: jobpulse <file.json>...");
    }

    let cfg = EngineConfig::from_env();
    tracing::info!(target: "jobpulse", ?cfg, "starting cycle");

    let rules = ScoringRules::load(cfg.rules_path.as_deref()).context("loading scoring rules")?;
    let similarity = cfg.similarity();
    if similarity == Similarity::Exact {
        tracing::warn!(
            target: "jobpulse",
            "fuzzy matching disabled; duplicate detection falls back to exact signatures"
        );
    }
    let index = DuplicateIndex::open(&cfg.db_path, similarity)
        .with_context(|| format!("opening {}", cfg.db_path.display()))?
        .with_candidate_limit(cfg.candidate_limit);
    let mut pipeline =
        Pipeline::new(Scorer::new(rules), index).with_fuzzy_threshold(cfg.fuzzy_threshold);

    let collectors: Vec<Box<dyn Collector>> = files
        .iter()
        .map(|f| Box::new(JsonFileCollector::new(f)) as Box<dyn Collector>)
        .collect();

    let now = Utc::now();
    let (postings, ingest) = collect_all(&collectors, now).await;
    let (postings, stale) = filter_recent(postings, now, cfg.max_age_days);

    let report = pipeline.run_cycle(postings).context("running enrichment cycle")?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for p in &report.batch.accepted {
        let line = serde_json::to_string(p).context("encoding posting")?;
        writeln!(out, "{line}").context("writing stdout")?;
    }

    tracing::info!(
        target: "jobpulse",
        raw = ingest.raw,
        dropped = ingest.dropped,
        collector_errors = ingest.collector_errors,
        stale,
        accepted = report.batch.accepted.len(),
        relevant = report.batch.accepted.iter().filter(|p| p.is_relevant()).count(),
        spam = report.batch.rejected(Rejection::Spam),
        duplicate = report.batch.rejected(Rejection::Duplicate),
        low_quality = report.batch.rejected(Rejection::LowQuality),
        inserted = report.inserted,
        skipped = report.skipped,
        "cycle finished"
    );
    Ok(())
}
