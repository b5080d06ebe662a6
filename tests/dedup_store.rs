// tests/dedup_store.rs
// Duplicate index against in-memory and on-disk SQLite.

use jobpulse_engine::dedup::DEFAULT_THRESHOLD;
use jobpulse_engine::{DuplicateIndex, JobPosting, NotifyChannel, Scorer, Similarity};

fn idx() -> DuplicateIndex {
    DuplicateIndex::open_in_memory(Similarity::TokenSet).unwrap()
}

#[test]
fn same_url_twice_stores_one_row() {
    let mut index = idx();
    let a = JobPosting::new("Estágio em TI", "Acme", "https://x/1");
    let b = JobPosting::new("Completely different title", "Other", "https://x/1");

    let inserted = index.insert_batch(&[a, b]).unwrap();
    assert_eq!(inserted, 1);
    assert_eq!(index.count().unwrap(), 1);

    // First write wins.
    let stored = index.get("https://x/1").unwrap().unwrap();
    assert_eq!(stored.title, "Estágio em TI");

    // Single inserts report the rejection too.
    assert!(!index
        .insert(&JobPosting::new("Again", "Acme", "https://x/1"))
        .unwrap());
}

#[test]
fn cosmetic_title_variant_is_a_fuzzy_duplicate() {
    let index = idx();
    index
        .insert(&JobPosting::new("Estágio em TI", "Acme", "https://x/1"))
        .unwrap();

    let variant = JobPosting::new("Estagiário de TI", "Acme", "https://x/2");
    assert!(index.is_fuzzy_duplicate(&variant, DEFAULT_THRESHOLD).unwrap());
    assert!(index.is_duplicate(&variant).unwrap());

    let other = JobPosting::new("Estágio em Marketing", "Globex", "https://x/3");
    assert!(!index.is_duplicate(&other).unwrap());
}

#[test]
fn exact_fallback_misses_cosmetic_variants() {
    let index = DuplicateIndex::open_in_memory(Similarity::Exact).unwrap();
    index
        .insert(&JobPosting::new("Estágio em TI", "Acme", "https://x/1"))
        .unwrap();

    let variant = JobPosting::new("Estagiário de TI", "Acme", "https://x/2");
    assert!(!index.is_duplicate(&variant).unwrap());

    let same = JobPosting::new("ESTÁGIO EM TI", "acme", "https://x/3");
    assert!(index.is_duplicate(&same).unwrap());
}

#[test]
fn known_url_is_duplicate_without_fuzzy_match() {
    let index = idx();
    index
        .insert(&JobPosting::new("Estágio em TI", "Acme", "https://x/1"))
        .unwrap();
    let renamed = JobPosting::new("Vaga totalmente nova", "Outra", "https://x/1");
    assert!(index.is_fuzzy_duplicate(&renamed, 100).unwrap());
}

#[test]
fn on_disk_index_survives_reopen() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("nested").join("jobs.db");

    {
        let mut index = DuplicateIndex::open(&path, Similarity::TokenSet).unwrap();
        let mut p = JobPosting::new("Estágio de Segurança da Informação", "Acme", "https://x/1")
            .with_source("gupy");
        Scorer::default().enhance(&mut p);
        assert_eq!(index.insert_batch(&[p]).unwrap(), 1);
    }

    let index = DuplicateIndex::open(&path, Similarity::TokenSet).unwrap();
    assert!(index.exists("https://x/1").unwrap());
    let stored = index.get("https://x/1").unwrap().unwrap();
    assert_eq!(stored.score(), Some(50));
    assert!(stored.has_tag("CYBER"));
    assert_eq!(stored.source, "gupy");
    assert_eq!(index.recent(1).unwrap().len(), 1);
}

#[test]
fn notification_bookkeeping() {
    let mut index = idx();
    let scorer = Scorer::default();
    let mut low = JobPosting::new("Desenvolvedor", "Acme", "https://x/low");
    let mut high = JobPosting::new("Estágio Python Segurança", "Acme", "https://x/high");
    scorer.enhance(&mut low);
    scorer.enhance(&mut high);
    index.insert_batch(&[low, high]).unwrap();

    let pending = index.unnotified(NotifyChannel::Discord, 10).unwrap();
    let urls: Vec<_> = pending.iter().map(|p| p.url.as_str()).collect();
    assert_eq!(urls, vec!["https://x/high", "https://x/low"]);

    assert!(index
        .mark_notified("https://x/high", NotifyChannel::Discord)
        .unwrap());
    assert!(index
        .is_notified("https://x/high", NotifyChannel::Discord)
        .unwrap());
    assert!(!index
        .is_notified("https://x/high", NotifyChannel::Telegram)
        .unwrap());
    assert!(!index
        .mark_notified("https://x/unknown", NotifyChannel::Discord)
        .unwrap());

    let pending = index.unnotified(NotifyChannel::Discord, 10).unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].url, "https://x/low");
    assert_eq!(index.unnotified(NotifyChannel::Telegram, 1).unwrap().len(), 1);
}

#[test]
fn second_writer_on_same_file_is_rejected_by_unique_url() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("jobs.db");
    let mut first = DuplicateIndex::open(&path, Similarity::TokenSet).unwrap();
    let mut second = DuplicateIndex::open(&path, Similarity::TokenSet).unwrap();

    let posting = JobPosting::new("Estágio em TI", "Acme", "https://x/race");
    // Both writers pass the cheap check before either inserts.
    assert!(!first.exists(&posting.url).unwrap());
    assert!(!second.exists(&posting.url).unwrap());

    assert_eq!(first.insert_batch(std::slice::from_ref(&posting)).unwrap(), 1);
    assert_eq!(second.insert_batch(std::slice::from_ref(&posting)).unwrap(), 0);
    assert!(!second.insert(&posting).unwrap());

    assert_eq!(first.count().unwrap(), 1);
    assert_eq!(second.count().unwrap(), 1);
}
