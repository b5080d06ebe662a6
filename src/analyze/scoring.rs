// src/analyze/scoring.rs
//! Relevance scorer: spam kill → hard block → soft penalty → weighted
//! categories → bonuses → clamp.
//!
//! Each category awards its points at most once (first matching keyword
//! wins), so stuffing a title with synonyms does not inflate the score.

use crate::analyze::antispam::SpamFilter;
use crate::analyze::keywords::{CompiledKeyword, KeywordMatcher};
use crate::analyze::rules::ScoringRules;
use crate::analyze::salary::extract_salary;
use crate::posting::{JobPosting, TAG_CYBER, TAG_HOT, TAG_PYTHON};

pub const SPAM_SCORE: i32 = -999;
pub const BLOCKED_SCORE: i32 = -1;
pub const MAX_SCORE: i32 = 100;

/// How the score was reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Spam phrase matched; score is `SPAM_SCORE`.
    Spam(String),
    /// Block-list phrase matched; score is `BLOCKED_SCORE`.
    Blocked(String),
    /// No category matched; score is 0.
    Irrelevant,
    Scored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreBreakdown {
    pub score: i32,
    pub topic_hits: usize,
    pub verdict: Verdict,
    /// Names of the categories that awarded points, in table order.
    pub matched_categories: Vec<String>,
}

impl ScoreBreakdown {
    fn rejected(score: i32, verdict: Verdict) -> Self {
        Self {
            score,
            topic_hits: 0,
            verdict,
            matched_categories: Vec::new(),
        }
    }

    pub fn is_rejection(&self) -> bool {
        self.score < 0
    }
}

#[derive(Debug)]
struct CompiledCategory {
    name: String,
    points: i32,
    keywords: Vec<CompiledKeyword>,
}

/// Holds compiled rules; build once and reuse for every posting.
#[derive(Debug)]
pub struct Scorer {
    rules: ScoringRules,
    spam: SpamFilter,
    categories: Vec<CompiledCategory>,
}

impl Default for Scorer {
    fn default() -> Self {
        Self::new(ScoringRules::default())
    }
}

impl Scorer {
    /// Rules built in code get the same phrase cleanup as loaded ones.
    pub fn new(mut rules: ScoringRules) -> Self {
        rules.normalize();
        let matcher = KeywordMatcher::new(&rules.dangerous_tokens);
        let categories = rules
            .categories
            .iter()
            .map(|c| CompiledCategory {
                name: c.name.clone(),
                points: c.points,
                keywords: c.keywords.iter().map(|k| matcher.compile(k)).collect(),
            })
            .collect();
        let spam = SpamFilter::new(&rules.spam);
        Self {
            rules,
            spam,
            categories,
        }
    }

    pub fn rules(&self) -> &ScoringRules {
        &self.rules
    }

    pub fn spam_filter(&self) -> &SpamFilter {
        &self.spam
    }

    pub fn score(&self, posting: &JobPosting) -> ScoreBreakdown {
        self.score_text(&posting.scoring_text())
    }

    /// Scores an already lower-cased `title + " " + company`.
    pub fn score_text(&self, text: &str) -> ScoreBreakdown {
        // 1) Spam kill
        if let Some(phrase) = self.spam.is_spam(text) {
            return ScoreBreakdown::rejected(SPAM_SCORE, Verdict::Spam(phrase.to_string()));
        }

        // 2) Hard block
        if let Some(block) = self
            .rules
            .block
            .iter()
            .find(|b| !b.is_empty() && text.contains(b.as_str()))
        {
            return ScoreBreakdown::rejected(BLOCKED_SCORE, Verdict::Blocked(block.clone()));
        }

        // 3) Soft penalty
        let mut score = 0i32;
        for p in &self.rules.penalty {
            if !p.is_empty() && text.contains(p.as_str()) {
                score = score.saturating_sub(self.rules.penalty_points);
            }
        }

        // 4) Categories, one award each
        let mut topic_hits = 0usize;
        let mut matched_categories = Vec::new();
        for cat in &self.categories {
            if cat.keywords.iter().any(|k| k.is_match(text)) {
                score = score.saturating_add(cat.points);
                topic_hits += 1;
                matched_categories.push(cat.name.clone());
            }
        }

        // 5) Nothing technical or sales-related at all
        if topic_hits == 0 {
            return ScoreBreakdown::rejected(0, Verdict::Irrelevant);
        }

        // 6) Seniority bonuses
        for bonus in [&self.rules.intern_bonus, &self.rules.junior_bonus] {
            if bonus.terms.iter().any(|t| text.contains(t.as_str())) {
                score = score.saturating_add(bonus.points);
            }
        }

        ScoreBreakdown {
            score: score.clamp(0, MAX_SCORE),
            topic_hits,
            verdict: Verdict::Scored,
            matched_categories,
        }
    }

    /// Scores the posting in place and attaches tags and salary.
    pub fn enhance(&self, posting: &mut JobPosting) -> ScoreBreakdown {
        let breakdown = self.score(posting);
        self.attach(posting, &breakdown);
        breakdown
    }

    /// Writes an already computed score onto the posting, then derives tags
    /// and salary from it.
    pub fn attach(&self, posting: &mut JobPosting, breakdown: &ScoreBreakdown) {
        posting.set_score(breakdown.score);

        if breakdown.score >= self.rules.hot_threshold {
            posting.add_tag(TAG_HOT);
        }
        let full = posting.full_text();
        if self
            .rules
            .cyber_terms
            .iter()
            .any(|t| full.contains(t.as_str()))
        {
            posting.add_tag(TAG_CYBER);
        }
        if full.contains("python") {
            posting.add_tag(TAG_PYTHON);
        }

        let salary_text = format!(
            "{} {}",
            posting.description.as_deref().unwrap_or_default(),
            posting.title
        );
        posting.set_salary(extract_salary(&salary_text));

        tracing::trace!(
            target: "scoring",
            url = %posting.url,
            score = breakdown.score,
            topic_hits = breakdown.topic_hits,
            categories = ?breakdown.matched_categories,
            "scored"
        );
    }
}
