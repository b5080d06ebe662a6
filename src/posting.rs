// src/posting.rs
//! The unit of work: one job listing flowing through the engine.

use chrono::{DateTime, Utc};
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::collections::BTreeSet;

pub const TAG_HOT: &str = "HOT";
pub const TAG_CYBER: &str = "CYBER";
pub const TAG_PYTHON: &str = "PYTHON";

/// A job posting. Text fields come from collectors; `score`, `tags` and
/// `salary` are attached by the scorer and cannot be set from outside the crate.
#[derive(Debug, Clone, PartialEq)]
pub struct JobPosting {
    pub title: String,
    pub company: String,
    pub location: String,
    pub url: String,
    pub published_at: Option<String>,
    pub collected_at: DateTime<Utc>,
    pub source: String,
    pub description: Option<String>,
    score: Option<i32>,
    tags: BTreeSet<String>,
    salary: Option<String>,
}

impl JobPosting {
    pub fn new(title: impl Into<String>, company: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            company: company.into(),
            location: String::new(),
            url: url.into(),
            published_at: None,
            collected_at: Utc::now(),
            source: String::new(),
            description: None,
            score: None,
            tags: BTreeSet::new(),
            salary: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_published_at(mut self, published_at: impl Into<String>) -> Self {
        self.published_at = Some(published_at.into());
        self
    }

    pub fn score(&self) -> Option<i32> {
        self.score
    }

    /// Pure function of `score`: only positive scores are relevant.
    pub fn is_relevant(&self) -> bool {
        self.score.is_some_and(|s| s > 0)
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn salary(&self) -> Option<&str> {
        self.salary.as_deref()
    }

    /// Lower-cased `title + " " + company`, the text the scorer works on.
    pub fn scoring_text(&self) -> String {
        format!("{} {}", self.title, self.company).to_lowercase()
    }

    /// `"{title} {company}"`, the text compared by the fuzzy duplicate check.
    pub fn signature(&self) -> String {
        format!("{} {}", self.title, self.company)
    }

    /// Every text field joined, lower-cased. Used for tag detection.
    pub fn full_text(&self) -> String {
        let mut parts: Vec<&str> = vec![
            &self.title,
            &self.company,
            &self.location,
            &self.source,
            &self.url,
        ];
        if let Some(p) = &self.published_at {
            parts.push(p);
        }
        if let Some(d) = &self.description {
            parts.push(d);
        }
        parts.join(" ").to_lowercase()
    }

    pub(crate) fn set_score(&mut self, score: i32) {
        self.score = Some(score);
    }

    pub(crate) fn add_tag(&mut self, tag: &str) {
        self.tags.insert(tag.to_string());
    }

    pub(crate) fn set_salary(&mut self, salary: Option<String>) {
        self.salary = salary;
    }

    /// Rebuild enrichment state from a stored row.
    pub(crate) fn restore_enrichment(
        &mut self,
        score: i32,
        tags: BTreeSet<String>,
        salary: Option<String>,
    ) {
        self.score = Some(score);
        self.tags = tags;
        self.salary = salary;
    }
}

impl Serialize for JobPosting {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("JobPosting", 12)?;
        s.serialize_field("title", &self.title)?;
        s.serialize_field("company", &self.company)?;
        s.serialize_field("location", &self.location)?;
        s.serialize_field("url", &self.url)?;
        s.serialize_field("published_at", &self.published_at)?;
        s.serialize_field("collected_at", &self.collected_at)?;
        s.serialize_field("source", &self.source)?;
        s.serialize_field("description", &self.description)?;
        s.serialize_field("score", &self.score)?;
        s.serialize_field("is_relevant", &self.is_relevant())?;
        s.serialize_field("tags", &self.tags)?;
        s.serialize_field("salary", &self.salary)?;
        s.end()
    }
}
