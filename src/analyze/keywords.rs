// src/analyze/keywords.rs
//! Keyword matching that tells a real token hit from a substring accident
//! ("go" inside "mango").
//!
//! - Short keywords (< 4 chars) and configured dangerous tokens are matched
//!   with `\b...\b` anchors.
//! - `c++`, `c#`, `.net` and `node.js` get hand-built patterns, since `\b`
//!   does not sit where you expect next to `+`, `#` or `.`.
//! - Everything else is plain substring containment.

use regex::Regex;
use std::collections::HashSet;

/// Tokens that collide with unrelated words when matched as substrings.
pub const DEFAULT_DANGEROUS_TOKENS: &[&str] = &[
    "ti", "go", "r", "c", "net", "ia", "bio", "agro", "dev", "mec", "rh", "law", "qa", "ux", "ui",
];

/// A keyword prepared once and reused against many texts.
#[derive(Debug, Clone)]
pub enum CompiledKeyword {
    Never,
    Substring(String),
    Pattern(Regex),
}

impl CompiledKeyword {
    /// `text` must already be lower-cased.
    pub fn is_match(&self, text: &str) -> bool {
        match self {
            CompiledKeyword::Never => false,
            CompiledKeyword::Substring(kw) => text.contains(kw.as_str()),
            CompiledKeyword::Pattern(re) => re.is_match(text),
        }
    }
}

#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    dangerous: HashSet<String>,
}

impl Default for KeywordMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_DANGEROUS_TOKENS.iter().copied())
    }
}

impl KeywordMatcher {
    pub fn new<I, S>(dangerous: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let dangerous = dangerous
            .into_iter()
            .map(|s| s.as_ref().trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        Self { dangerous }
    }

    pub fn is_dangerous(&self, keyword: &str) -> bool {
        self.dangerous.contains(keyword)
    }

    /// One-shot match. Prefer `compile` when the same keyword is tested often.
    pub fn matches(&self, keyword: &str, text: &str) -> bool {
        self.compile(keyword).is_match(text)
    }

    pub fn compile(&self, keyword: &str) -> CompiledKeyword {
        let kw = keyword.trim().to_lowercase();
        if kw.is_empty() {
            return CompiledKeyword::Never;
        }

        if let Some(pattern) = punctuated_pattern(&kw) {
            return compile_pattern(pattern, &kw);
        }

        if kw.chars().count() < 4 || self.is_dangerous(&kw) {
            let pattern = format!(r"\b{}\b", regex::escape(&kw));
            return compile_pattern(&pattern, &kw);
        }

        CompiledKeyword::Substring(kw)
    }
}

fn punctuated_pattern(kw: &str) -> Option<&'static str> {
    match kw {
        "c++" => Some(r"\bc\+\+(?:\W|$)"),
        "c#" => Some(r"\bc#(?:\W|$)"),
        ".net" => Some(r"\.net\b"),
        "node.js" => Some(r"\bnode\.js\b"),
        _ => None,
    }
}

// Escaped input always compiles; keep the substring fallback anyway so a
// bad keyword can never take the scorer down.
fn compile_pattern(pattern: &str, kw: &str) -> CompiledKeyword {
    match Regex::new(pattern) {
        Ok(re) => CompiledKeyword::Pattern(re),
        Err(e) => {
            tracing::warn!(target: "scoring", keyword = kw, error = %e, "keyword pattern rejected");
            CompiledKeyword::Substring(kw.to_string())
        }
    }
}
