// src/config.rs
//! Runtime knobs read from the environment (a local `.env` is loaded by the
//! binary). Unparseable values fall back to defaults with a warning.

use std::env;
use std::path::PathBuf;

use crate::analyze::rules::ENV_RULES_PATH;
use crate::dedup::{Similarity, DEFAULT_THRESHOLD};
use crate::dedup::index::DEFAULT_CANDIDATE_LIMIT;

pub const ENV_DB_PATH: &str = "JOBPULSE_DB_PATH";
pub const ENV_FUZZY_THRESHOLD: &str = "JOBPULSE_FUZZY_THRESHOLD";
pub const ENV_CANDIDATE_LIMIT: &str = "JOBPULSE_CANDIDATE_LIMIT";
pub const ENV_FUZZY: &str = "JOBPULSE_FUZZY";
pub const ENV_MAX_AGE_DAYS: &str = "JOBPULSE_MAX_AGE_DAYS";

pub const DEFAULT_DB_PATH: &str = "data/jobs.db";
pub const DEFAULT_MAX_AGE_DAYS: u32 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub db_path: PathBuf,
    pub fuzzy_threshold: u8,
    pub candidate_limit: usize,
    pub fuzzy_enabled: bool,
    pub max_age_days: u32,
    pub rules_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            fuzzy_threshold: DEFAULT_THRESHOLD,
            candidate_limit: DEFAULT_CANDIDATE_LIMIT,
            fuzzy_enabled: true,
            max_age_days: DEFAULT_MAX_AGE_DAYS,
            rules_path: None,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            db_path: env::var(ENV_DB_PATH)
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(d.db_path),
            fuzzy_threshold: parse_u64_clamped(ENV_FUZZY_THRESHOLD, 0, 100)
                .map(|v| v as u8)
                .unwrap_or(d.fuzzy_threshold),
            candidate_limit: parse_u64_clamped(ENV_CANDIDATE_LIMIT, 1, 1000)
                .map(|v| v as usize)
                .unwrap_or(d.candidate_limit),
            fuzzy_enabled: parse_flag(ENV_FUZZY).unwrap_or(d.fuzzy_enabled),
            max_age_days: parse_u64_clamped(ENV_MAX_AGE_DAYS, 1, 3650)
                .map(|v| v as u32)
                .unwrap_or(d.max_age_days),
            rules_path: env::var(ENV_RULES_PATH)
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
        }
    }

    pub fn similarity(&self) -> Similarity {
        Similarity::from_flag(self.fuzzy_enabled)
    }
}

fn parse_u64_clamped(key: &str, min: u64, max: u64) -> Option<u64> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse::<u64>() {
        Ok(v) => Some(v.clamp(min, max)),
        Err(_) => {
            tracing::warn!(target: "config", key, value = %raw, "ignoring unparseable value");
            None
        }
    }
}

fn parse_flag(key: &str) -> Option<bool> {
    let raw = env::var(key).ok()?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => {
            tracing::warn!(target: "config", key, value = %raw, "ignoring unparseable flag");
            None
        }
    }
}
