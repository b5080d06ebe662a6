//! Spam/noise filter for scraped postings.
//!
//! Goal: kill records that are not employer job offers before any scoring
//! work happens.
//!
//! - Fixed phrase list: pyramid-scheme bait, candidate self-promotion
//!   ("for hire", "open to work"), course/mentorship upsell.
//! - Case-insensitive substring containment on the whole phrase. These are
//!   multi-word idioms, so substring matching is safe here.
//! - First match wins; matches are not aggregated.

/// Built-in phrase list.
pub const DEFAULT_SPAM_PHRASES: &[&str] = &[
    "renda extra",
    "ganhar dinheiro",
    "seja seu chefe",
    "marketing multinível",
    "sem investimento",
    "fature alto",
    "trabalhe em casa digitando",
    "assistente de envio",
    "ganhe dinheiro assistindo",
    "vagas ilimitadas",
    "curso completo",
    "mentoria paga",
    "taxa de adesão",
    "investimento inicial",
    "compre seu kit",
    "apenas com celular",
    "pix diario",
    "pix diário",
    "ganhos rápidos",
    "dinheiro extra",
    "for hire",
    "[for hire]",
    "seeking job",
    "seeking work",
    "looking for job",
    "looking for work",
    "available for",
    "procurando vaga",
    "busco oportunidade",
    "tenho experiência em",
    "my portfolio",
    "meu portfólio",
    "open to work",
];

#[derive(Debug, Clone)]
pub struct SpamFilter {
    phrases: Vec<String>,
}

impl Default for SpamFilter {
    fn default() -> Self {
        Self::new(DEFAULT_SPAM_PHRASES.iter().copied())
    }
}

impl SpamFilter {
    /// Phrases are lower-cased and trimmed; empty entries are dropped.
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let phrases = phrases
            .into_iter()
            .map(|p| p.as_ref().trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();
        Self { phrases }
    }

    /// Returns the first matching phrase, or `None` when the text looks clean.
    pub fn is_spam(&self, text: &str) -> Option<&str> {
        let lower = text.to_lowercase();
        self.phrases
            .iter()
            .find(|p| lower.contains(p.as_str()))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_candidate_posts_case_insensitively() {
        let f = SpamFilter::default();
        assert_eq!(f.is_spam("[FOR HIRE] Python dev"), Some("for hire"));
        assert_eq!(f.is_spam("Open To Work - estágio TI"), Some("open to work"));
    }

    #[test]
    fn clean_text_passes() {
        let f = SpamFilter::default();
        assert_eq!(f.is_spam("Estágio em Desenvolvimento Python - Acme"), None);
        assert_eq!(f.is_spam(""), None);
    }

    #[test]
    fn first_phrase_in_list_order_wins() {
        let f = SpamFilter::new(["renda extra", "dinheiro extra"]);
        assert_eq!(
            f.is_spam("dinheiro extra e renda extra garantida"),
            Some("renda extra")
        );
    }

    #[test]
    fn blank_phrases_are_ignored() {
        let f = SpamFilter::new(["", "  ", "pix diário"]);
        assert_eq!(f.len(), 1);
        assert_eq!(f.is_spam("anything at all"), None);
    }
}
