//! SQLite-backed duplicate index.
//!
//! - `url` carries a UNIQUE constraint; it is the authoritative guard against
//!   storing a posting twice, including across processes. `exists` is only a
//!   shortcut that saves work.
//! - Folded `title_key`/`company_key` columns (lower-case, no accents) carry a
//!   secondary index used by the cheap `LIKE` pre-filter, so the fuzzy
//!   comparator only ever sees a handful of candidates.
//! - Batch inserts run in one transaction; a duplicate url skips that row
//!   only, any other failure rolls back the whole batch.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use metrics::counter;
use rusqlite::{params, params_from_iter, Connection, ErrorCode, OptionalExtension, Row};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::dedup::fuzzy::{fold, significant_words, Similarity, DEFAULT_THRESHOLD};
use crate::error::StoreResult;
use crate::posting::JobPosting;

/// Pre-filter returns at most `limit * CANDIDATE_FANOUT` rows.
pub const CANDIDATE_FANOUT: usize = 5;
pub const DEFAULT_CANDIDATE_LIMIT: usize = 10;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS jobs (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    url           TEXT    NOT NULL UNIQUE,
    title         TEXT    NOT NULL DEFAULT '',
    company       TEXT    NOT NULL DEFAULT '',
    location      TEXT    NOT NULL DEFAULT '',
    source        TEXT    NOT NULL DEFAULT '',
    published_at  TEXT,
    collected_at  TEXT    NOT NULL,
    score         INTEGER NOT NULL DEFAULT 0,
    is_relevant   INTEGER NOT NULL DEFAULT 0,
    tags          TEXT    NOT NULL DEFAULT '[]',
    salary        TEXT,
    title_key     TEXT    NOT NULL DEFAULT '',
    company_key   TEXT    NOT NULL DEFAULT '',
    sent_discord  INTEGER NOT NULL DEFAULT 0,
    sent_telegram INTEGER NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS idx_jobs_title_company ON jobs(title_key, company_key);
CREATE INDEX IF NOT EXISTS idx_jobs_collected_at ON jobs(collected_at);
CREATE INDEX IF NOT EXISTS idx_jobs_sent ON jobs(sent_discord, sent_telegram);
"#;

const INSERT_SQL: &str = r#"
INSERT INTO jobs (
    url, title, company, location, source, published_at, collected_at,
    score, is_relevant, tags, salary, title_key, company_key
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
"#;

const SELECT_COLUMNS: &str = "url, title, company, location, source, published_at, \
     collected_at, score, tags, salary";

/// A stored row returned by the pre-filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub url: String,
    pub title: String,
    pub company: String,
}

impl Candidate {
    pub fn signature(&self) -> String {
        format!("{} {}", self.title, self.company)
    }
}

/// Words the pre-filter looks for: the first two significant title words
/// and the first significant company word, all folded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateKey {
    pub title_words: Vec<String>,
    pub company_word: Option<String>,
}

impl CandidateKey {
    pub fn new(title: &str, company: &str) -> Self {
        Self {
            title_words: significant_words(title).into_iter().take(2).collect(),
            company_word: significant_words(company).into_iter().next(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title_words.is_empty() && self.company_word.is_none()
    }

    /// Same test as the SQL `LIKE` pre-filter, applied to folded keys.
    pub fn admits(&self, title_key: &str, company_key: &str) -> bool {
        self.title_words.iter().any(|w| title_key.contains(w.as_str()))
            || self
                .company_word
                .as_deref()
                .is_some_and(|w| company_key.contains(w))
    }
}

/// Downstream notification channels tracked per posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyChannel {
    Discord,
    Telegram,
}

impl NotifyChannel {
    fn column(self) -> &'static str {
        match self {
            NotifyChannel::Discord => "sent_discord",
            NotifyChannel::Telegram => "sent_telegram",
        }
    }
}

pub struct DuplicateIndex {
    conn: Connection,
    similarity: Similarity,
    candidate_limit: usize,
}

impl std::fmt::Debug for DuplicateIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuplicateIndex")
            .field("similarity", &self.similarity)
            .field("candidate_limit", &self.candidate_limit)
            .finish()
    }
}

impl DuplicateIndex {
    /// Open (or create) the on-disk store, creating parent directories.
    pub fn open(path: &Path, similarity: Similarity) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        tracing::debug!(target: "dedup", path = %path.display(), "opened job store");
        Self::with_connection(conn, similarity)
    }

    pub fn open_in_memory(similarity: Similarity) -> StoreResult<Self> {
        Self::with_connection(Connection::open_in_memory()?, similarity)
    }

    fn with_connection(conn: Connection, similarity: Similarity) -> StoreResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn,
            similarity,
            candidate_limit: DEFAULT_CANDIDATE_LIMIT,
        })
    }

    pub fn with_candidate_limit(mut self, limit: usize) -> Self {
        self.candidate_limit = limit.max(1);
        self
    }

    pub fn similarity(&self) -> Similarity {
        self.similarity
    }

    /// Row cap of the candidate pre-filter (`candidate_limit * 5`).
    pub fn max_candidates(&self) -> usize {
        self.candidate_limit.saturating_mul(CANDIDATE_FANOUT)
    }

    pub fn exists(&self, url: &str) -> StoreResult<bool> {
        let hit = self
            .conn
            .query_row("SELECT 1 FROM jobs WHERE url = ?1 LIMIT 1", [url], |_| Ok(()))
            .optional()?;
        Ok(hit.is_some())
    }

    /// Returns `false` when the url is already stored; the existing row is untouched.
    pub fn insert(&self, posting: &JobPosting) -> StoreResult<bool> {
        insert_row(&self.conn, posting)
    }

    /// Inserts all postings in one transaction, skipping duplicate urls.
    /// Returns the number of rows actually inserted.
    pub fn insert_batch(&mut self, postings: &[JobPosting]) -> StoreResult<usize> {
        let tx = self.conn.transaction()?;
        let mut inserted = 0usize;
        for p in postings {
            if insert_row(&tx, p)? {
                inserted += 1;
            }
        }
        tx.commit()?;

        let skipped = postings.len() - inserted;
        counter!("dedup_inserted_total").increment(inserted as u64);
        counter!("dedup_skipped_total").increment(skipped as u64);
        tracing::debug!(target: "dedup", inserted, skipped, "batch insert committed");
        Ok(inserted)
    }

    /// Cheap, deliberately loose pre-filter: rows whose folded title contains
    /// one of the first two significant title words, or whose folded company
    /// contains the first significant company word. At most `limit * 5` rows.
    pub fn find_candidates(
        &self,
        title: &str,
        company: &str,
        limit: usize,
    ) -> StoreResult<Vec<Candidate>> {
        let key = CandidateKey::new(title, company);
        let mut clauses: Vec<&str> = Vec::new();
        let mut args: Vec<String> = Vec::new();

        for w in &key.title_words {
            clauses.push(r"title_key LIKE ? ESCAPE '\'");
            args.push(like_pattern(w));
        }
        if let Some(w) = &key.company_word {
            clauses.push(r"company_key LIKE ? ESCAPE '\'");
            args.push(like_pattern(w));
        }
        if clauses.is_empty() {
            return Ok(Vec::new());
        }

        let max_rows = limit.max(1).saturating_mul(CANDIDATE_FANOUT);
        let sql = format!(
            "SELECT url, title, company FROM jobs WHERE {} LIMIT {}",
            clauses.join(" OR "),
            max_rows
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(args.iter()), |row| {
            Ok(Candidate {
                url: row.get(0)?,
                title: row.get(1)?,
                company: row.get(2)?,
            })
        })?;
        let out = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(out)
    }

    /// Exact url hit first, then fuzzy comparison against pre-filtered candidates.
    pub fn is_fuzzy_duplicate(&self, posting: &JobPosting, threshold: u8) -> StoreResult<bool> {
        if self.exists(&posting.url)? {
            return Ok(true);
        }

        let candidates =
            self.find_candidates(&posting.title, &posting.company, self.candidate_limit)?;
        let sig = posting.signature();
        for c in &candidates {
            let ratio = self.similarity.similarity(&sig, &c.signature());
            if ratio >= threshold {
                tracing::debug!(
                    target: "dedup",
                    url = %posting.url,
                    existing = %c.url,
                    ratio,
                    "fuzzy duplicate"
                );
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// `is_fuzzy_duplicate` with the default threshold of 90.
    pub fn is_duplicate(&self, posting: &JobPosting) -> StoreResult<bool> {
        self.is_fuzzy_duplicate(posting, DEFAULT_THRESHOLD)
    }

    pub fn get(&self, url: &str) -> StoreResult<Option<JobPosting>> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM jobs WHERE url = ?1");
        let row = self
            .conn
            .query_row(&sql, [url], read_row)
            .optional()?;
        row.map(rehydrate).transpose()
    }

    pub fn count(&self) -> StoreResult<usize> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM jobs", [], |r| r.get(0))?;
        Ok(n.max(0) as usize)
    }

    /// Postings collected in the last `days` days, newest first.
    pub fn recent(&self, days: i64) -> StoreResult<Vec<JobPosting>> {
        // A window reaching past the representable range means "everything".
        let cutoff = ChronoDuration::try_days(days.max(0))
            .and_then(|d| Utc::now().checked_sub_signed(d))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
            .to_rfc3339();
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM jobs WHERE collected_at >= ?1 ORDER BY collected_at DESC"
        );
        self.query_postings(&sql, [cutoff])
    }

    /// Marks a stored posting as sent on `channel`. Returns `false` for unknown urls.
    pub fn mark_notified(&self, url: &str, channel: NotifyChannel) -> StoreResult<bool> {
        let sql = format!("UPDATE jobs SET {} = 1 WHERE url = ?1", channel.column());
        let changed = self.conn.execute(&sql, [url])?;
        Ok(changed > 0)
    }

    pub fn is_notified(&self, url: &str, channel: NotifyChannel) -> StoreResult<bool> {
        let sql = format!("SELECT {} FROM jobs WHERE url = ?1", channel.column());
        let sent: Option<bool> = self
            .conn
            .query_row(&sql, [url], |r| r.get(0))
            .optional()?;
        Ok(sent.unwrap_or(false))
    }

    /// Postings not yet sent to `channel`, best score first, then newest.
    pub fn unnotified(&self, channel: NotifyChannel, limit: usize) -> StoreResult<Vec<JobPosting>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM jobs WHERE {} = 0 \
             ORDER BY score DESC, collected_at DESC LIMIT ?1",
            channel.column()
        );
        self.query_postings(&sql, [limit as i64])
    }

    fn query_postings<P: rusqlite::Params>(&self, sql: &str, p: P) -> StoreResult<Vec<JobPosting>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map(p, read_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(rehydrate).collect()
    }
}

fn insert_row(conn: &Connection, p: &JobPosting) -> StoreResult<bool> {
    let tags = serde_json::to_string(p.tags())?;
    let res = conn.execute(
        INSERT_SQL,
        params![
            p.url,
            p.title,
            p.company,
            p.location,
            p.source,
            p.published_at,
            p.collected_at.to_rfc3339(),
            p.score().unwrap_or(0),
            p.is_relevant(),
            tags,
            p.salary(),
            fold(&p.title),
            fold(&p.company),
        ],
    );
    match res {
        Ok(_) => Ok(true),
        Err(e) if is_unique_violation(&e) => {
            tracing::trace!(target: "dedup", url = %p.url, "duplicate url skipped");
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == ErrorCode::ConstraintViolation
                && err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn like_pattern(word: &str) -> String {
    let mut out = String::with_capacity(word.len() + 2);
    out.push('%');
    for ch in word.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('%');
    out
}

struct StoredRow {
    url: String,
    title: String,
    company: String,
    location: String,
    source: String,
    published_at: Option<String>,
    collected_at: String,
    score: i32,
    tags: String,
    salary: Option<String>,
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<StoredRow> {
    Ok(StoredRow {
        url: row.get(0)?,
        title: row.get(1)?,
        company: row.get(2)?,
        location: row.get(3)?,
        source: row.get(4)?,
        published_at: row.get(5)?,
        collected_at: row.get(6)?,
        score: row.get(7)?,
        tags: row.get(8)?,
        salary: row.get(9)?,
    })
}

fn rehydrate(r: StoredRow) -> StoreResult<JobPosting> {
    let tags: BTreeSet<String> = serde_json::from_str(&r.tags)?;
    let collected_at = DateTime::parse_from_rfc3339(&r.collected_at)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now());

    let mut p = JobPosting::new(r.title, r.company, r.url)
        .with_location(r.location)
        .with_source(r.source);
    p.published_at = r.published_at;
    p.collected_at = collected_at;
    p.restore_enrichment(r.score, tags, r.salary);
    Ok(p)
}
