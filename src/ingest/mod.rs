// src/ingest/mod.rs
//! Collector boundary: raw records in, usable `JobPosting`s out.

pub mod file;
pub mod recency;
pub mod types;

use crate::posting::JobPosting;
use chrono::{DateTime, Utc};
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;

pub use crate::ingest::file::JsonFileCollector;
pub use crate::ingest::recency::{age_minutes, filter_recent};
pub use crate::ingest::types::{Collector, RawPosting};

/// Max chars kept per text field.
pub const MAX_FIELD_CHARS: usize = 1500;

/// One-time metrics registration.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "ingest_records_total",
            "Raw records returned by collectors."
        );
        describe_counter!(
            "ingest_dropped_total",
            "Raw records dropped for missing url/title."
        );
        describe_counter!(
            "ingest_collector_errors_total",
            "Collector fetch/parse errors."
        );
    });
}

/// Normalize text: decode entities, strip tags, fold quotes, collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));
    out = re_tags.replace_all(&out, " ").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace (incl. NBSP)
    out = out.split_whitespace().collect::<Vec<_>>().join(" ");

    // 5) Length cap
    if out.chars().count() > MAX_FIELD_CHARS {
        out = out.chars().take(MAX_FIELD_CHARS).collect();
    }

    out
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub raw: usize,
    pub dropped: usize,
    pub collector_errors: usize,
}

/// Run every collector once. A failing collector is logged and counted; it
/// never aborts the others.
pub async fn collect_all(
    collectors: &[Box<dyn Collector>],
    collected_at: DateTime<Utc>,
) -> (Vec<JobPosting>, IngestStats) {
    ensure_metrics_described();

    let mut stats = IngestStats::default();
    let mut out = Vec::new();
    for c in collectors {
        match c.collect().await {
            Ok(raw) => {
                stats.raw += raw.len();
                for r in raw {
                    match r.into_posting(collected_at, c.name()) {
                        Some(p) => out.push(p),
                        None => stats.dropped += 1,
                    }
                }
            }
            Err(e) => {
                tracing::warn!(target: "ingest", error = ?e, collector = c.name(), "collector error");
                stats.collector_errors += 1;
            }
        }
    }

    counter!("ingest_records_total").increment(stats.raw as u64);
    counter!("ingest_dropped_total").increment(stats.dropped as u64);
    counter!("ingest_collector_errors_total").increment(stats.collector_errors as u64);
    tracing::info!(
        target: "ingest",
        kept = out.len(),
        dropped = stats.dropped,
        errors = stats.collector_errors,
        "collection finished"
    );

    (out, stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_text_collapses_ws_and_entities() {
        let s = "  Estágio&nbsp;&nbsp; em <b>TI</b>  ";
        assert_eq!(normalize_text(s), "Estágio em TI");
    }

    #[test]
    fn keeps_trailing_dots() {
        assert_eq!(normalize_text("Suporte T.I."), "Suporte T.I.");
    }

    #[test]
    fn raw_without_url_or_title_is_dropped() {
        let now = Utc::now();
        let no_url = RawPosting {
            title: Some("Dev".into()),
            ..Default::default()
        };
        assert!(no_url.into_posting(now, "x").is_none());

        let blank_title = RawPosting {
            title: Some(" <br> ".into()),
            url: Some("https://x/1".into()),
            ..Default::default()
        };
        assert!(blank_title.into_posting(now, "x").is_none());
    }

    #[test]
    fn raw_conversion_fills_defaults() {
        let now = Utc::now();
        let raw: RawPosting = serde_json::from_str(
            r#"{"titulo": "Estágio &amp; Python", "link": " https://x/2 ", "empresa": null, "data_publicacao": ""}"#,
        )
        .unwrap();
        let p = raw.into_posting(now, "gupy").unwrap();
        assert_eq!(p.title, "Estágio & Python");
        assert_eq!(p.url, "https://x/2");
        assert_eq!(p.company, "");
        assert_eq!(p.source, "gupy");
        assert_eq!(p.published_at, None);
        assert_eq!(p.collected_at, now);
        assert_eq!(p.score(), None);
    }
}
