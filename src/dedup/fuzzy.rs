//! Fuzzy comparison of short posting signatures (`"{title} {company}"`).
//!
//! Two strategies, picked when the index is built:
//! - `TokenSet`: order-independent word overlap. Texts are folded (lower-case,
//!   accents stripped), split on non-alphanumerics, stopwords dropped. The
//!   sorted intersection and the two sorted remainders are compared pairwise
//!   with an indel ratio (`2 * LCS / (len_a + len_b)`); the best pair wins.
//! - `Exact`: reduced-recall fallback. 100 when the normalized signatures are
//!   identical, otherwise 0.

use std::collections::BTreeSet;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Default duplicate threshold on the 0..=100 scale.
pub const DEFAULT_THRESHOLD: u8 = 90;

/// Connectives that carry no signal in job titles (pt-BR and English).
pub const STOPWORDS: &[&str] = &[
    "a", "o", "as", "os", "e", "de", "da", "do", "das", "dos", "em", "na", "no", "nas", "nos",
    "para", "por", "com", "um", "uma", "the", "of", "in", "and", "for", "at", "to", "an", "on",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Similarity {
    #[default]
    TokenSet,
    Exact,
}

impl Similarity {
    /// `true` selects token-set matching, `false` the exact fallback.
    pub fn from_flag(fuzzy_enabled: bool) -> Self {
        if fuzzy_enabled {
            Similarity::TokenSet
        } else {
            Similarity::Exact
        }
    }

    pub fn similarity(&self, a: &str, b: &str) -> u8 {
        match self {
            Similarity::TokenSet => token_set_ratio(a, b),
            Similarity::Exact => {
                let (na, nb) = (normalize(a), normalize(b));
                if !na.is_empty() && na == nb {
                    100
                } else {
                    0
                }
            }
        }
    }

    pub fn is_duplicate(&self, a: &str, b: &str, threshold: u8) -> bool {
        self.similarity(a, b) >= threshold
    }
}

/// Lower-case and strip diacritics: "Estágio" -> "estagio".
pub fn fold(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// Folded text with whitespace collapsed.
pub fn normalize(text: &str) -> String {
    fold(text).split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(&token)
}

/// Folded alphanumeric words with stopwords removed, in original order.
pub fn significant_words(text: &str) -> Vec<String> {
    fold(text)
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty() && !is_stopword(w))
        .map(str::to_string)
        .collect()
}

fn token_set(text: &str) -> BTreeSet<String> {
    significant_words(text).into_iter().collect()
}

pub fn token_set_ratio(a: &str, b: &str) -> u8 {
    let sa = token_set(a);
    let sb = token_set(b);
    if sa.is_empty() || sb.is_empty() {
        return 0;
    }

    let join = |it: Vec<&String>| it.into_iter().map(String::as_str).collect::<Vec<_>>().join(" ");
    let inter = join(sa.intersection(&sb).collect());
    let only_a = join(sa.difference(&sb).collect());
    let only_b = join(sb.difference(&sa).collect());

    let combine = |rest: &str| -> String {
        match (inter.is_empty(), rest.is_empty()) {
            (true, _) => rest.to_string(),
            (false, true) => inter.clone(),
            (false, false) => format!("{inter} {rest}"),
        }
    };
    let t1 = combine(&only_a);
    let t2 = combine(&only_b);

    let best = [
        indel_ratio(&inter, &t1),
        indel_ratio(&inter, &t2),
        indel_ratio(&t1, &t2),
    ]
    .into_iter()
    .fold(0.0f64, f64::max);

    (best * 100.0).round().clamp(0.0, 100.0) as u8
}

/// `2 * LCS / (len_a + len_b)` over chars. An empty side scores 0 unless both are empty.
fn indel_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    (2 * lcs_len(&a, &b)) as f64 / total as f64
}

fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for ca in a {
        for (j, cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}
