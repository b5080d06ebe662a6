// src/ingest/file.rs
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::ingest::types::{Collector, RawPosting};

/// Reads a JSON array of raw postings from disk (the format scrapers dump).
#[derive(Debug, Clone)]
pub struct JsonFileCollector {
    path: PathBuf,
    name: String,
}

impl JsonFileCollector {
    /// The collector is named after the file stem (`gupy.json` -> `gupy`).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());
        Self { path, name }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl Collector for JsonFileCollector {
    async fn collect(&self) -> Result<Vec<RawPosting>> {
        let body = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("reading {}", self.path.display()))?;
        let items: Vec<RawPosting> = serde_json::from_str(&body)
            .with_context(|| format!("parsing {}", self.path.display()))?;
        tracing::debug!(target: "ingest", collector = %self.name, count = items.len(), "file collected");
        Ok(items)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
