// tests/scoring_properties.rs
// Scorer behavior against the built-in rule table.

use jobpulse_engine::analyze::{extract_salary, BLOCKED_SCORE, SPAM_SCORE};
use jobpulse_engine::{JobPosting, KeywordMatcher, Scorer};

fn score(title: &str, company: &str) -> i32 {
    Scorer::default()
        .score(&JobPosting::new(title, company, "https://example.test/job"))
        .score
}

#[test]
fn spam_phrase_beats_any_keyword() {
    assert_eq!(
        score("Estágio Python Segurança - renda extra garantida", "Acme"),
        SPAM_SCORE
    );
}

#[test]
fn block_phrase_beats_dream_job_and_bonus() {
    assert_eq!(score("Estágio Senior Pentest", "Acme"), BLOCKED_SCORE);
}

#[test]
fn each_category_awards_once() {
    assert_eq!(score("python linux docker", ""), 15);
}

#[test]
fn unrelated_posting_scores_zero() {
    let scorer = Scorer::default();
    let mut p = JobPosting::new("Internship in Law", "Legal Firm", "https://example.test/law");
    let b = scorer.enhance(&mut p);
    assert_eq!(b.score, 0);
    assert_eq!(p.score(), Some(0));
    assert!(!p.is_relevant());
}

#[test]
fn scores_stay_within_bounds() {
    let titles = [
        ("Estágio Júnior Python Segurança Pentest SQL Django Developer Vendas", "Acme"),
        ("Desenvolvedor Pleno", "Acme"),
        ("Analista Pleno Python", "Acme"),
        ("Estagiário de Suporte T.I.", "Hospital Central"),
        ("", ""),
    ];
    for (t, c) in titles {
        let s = score(t, c);
        assert!((0..=100).contains(&s), "{t:?} scored {s}");
    }
    assert_eq!(score(titles[0].0, titles[0].1), 100);
}

#[test]
fn pleno_penalty_reduces_but_never_below_zero() {
    assert_eq!(score("Analista Pleno Python", "Acme"), 5);
    assert_eq!(score("Desenvolvedor Pleno", "Acme"), 0);
}

#[test]
fn short_keywords_need_word_boundaries() {
    let m = KeywordMatcher::default();
    assert!(!m.matches("go", "mangoes available"));
    assert!(m.matches("go", "go developer needed"));
    assert!(!m.matches("ti", "estatística"));
    assert!(m.matches("ti", "estágio em ti"));
}

#[test]
fn hot_tag_for_high_scores() {
    let scorer = Scorer::default();
    let mut p = JobPosting::new(
        "Estágio Python Segurança Developer",
        "Acme",
        "https://example.test/hot",
    );
    scorer.enhance(&mut p);
    // 30 + 15 + 10 + 20
    assert_eq!(p.score(), Some(75));
    assert!(!p.has_tag("HOT"));

    let mut q = JobPosting::new(
        "Estágio Python Segurança Developer Django",
        "Acme",
        "https://example.test/hot2",
    );
    scorer.enhance(&mut q);
    assert_eq!(q.score(), Some(85));
    assert!(q.has_tag("HOT"));
    assert!(q.has_tag("PYTHON"));
    assert!(q.has_tag("CYBER"));
}

#[test]
fn salary_extraction() {
    assert_eq!(
        extract_salary("Bolsa: R$ 1.500,00 mensal").as_deref(),
        Some("R$ 1.500,00")
    );
    assert_eq!(extract_salary("R$ 50"), None);

    let scorer = Scorer::default();
    let mut p = JobPosting::new("Estágio em TI", "Acme", "https://example.test/bolsa")
        .with_description("Bolsa auxílio de R$ 1.800,00 + VT");
    scorer.enhance(&mut p);
    assert_eq!(p.salary(), Some("R$ 1.800,00"));
}
