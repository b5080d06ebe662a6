// src/ingest/types.rs
use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::ingest::normalize_text;
use crate::posting::JobPosting;

/// Best-effort record as produced by a collector. Every field may be missing.
/// Field names of the legacy scrapers (`titulo`, `empresa`, `link`, ...) are
/// accepted as aliases.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct RawPosting {
    #[serde(default, alias = "titulo")]
    pub title: Option<String>,
    #[serde(default, alias = "empresa")]
    pub company: Option<String>,
    #[serde(default, alias = "localizacao")]
    pub location: Option<String>,
    #[serde(default, alias = "link")]
    pub url: Option<String>,
    #[serde(default, alias = "data_publicacao")]
    pub published_at: Option<String>,
    #[serde(default, alias = "plataforma")]
    pub source: Option<String>,
    #[serde(default, alias = "descricao")]
    pub description: Option<String>,
}

impl RawPosting {
    /// Normalizes text fields and builds a `JobPosting`. Records without a
    /// usable `url` or `title` are dropped (`None`).
    pub fn into_posting(self, collected_at: DateTime<Utc>, fallback_source: &str) -> Option<JobPosting> {
        let url = self.url.map(|u| u.trim().to_string()).unwrap_or_default();
        let title = self.title.as_deref().map(normalize_text).unwrap_or_default();
        if url.is_empty() || title.is_empty() {
            return None;
        }

        let clean = |v: Option<String>| v.as_deref().map(normalize_text).unwrap_or_default();
        let non_empty = |v: Option<String>| {
            v.as_deref()
                .map(normalize_text)
                .filter(|s| !s.is_empty())
        };

        let source = match clean(self.source) {
            s if s.is_empty() => fallback_source.to_string(),
            s => s,
        };

        let mut p = JobPosting::new(title, clean(self.company), url)
            .with_location(clean(self.location))
            .with_source(source);
        p.published_at = non_empty(self.published_at);
        p.description = non_empty(self.description);
        p.collected_at = collected_at;
        Some(p)
    }
}

#[async_trait::async_trait]
pub trait Collector: Send + Sync {
    async fn collect(&self) -> Result<Vec<RawPosting>>;
    fn name(&self) -> &str;
}
