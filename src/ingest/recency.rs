// src/ingest/recency.rs
//! Age of a posting from its free-form `published_at` text.
//!
//! Boards report either relative phrases ("há 2 horas", "3 days ago",
//! "ontem") or absolute dates (`2026-10-18`, RFC 3339). Anything else is
//! treated as unknown and never filtered out.

use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::posting::JobPosting;

const MINUTES_PER_HOUR: i64 = 60;
const MINUTES_PER_DAY: i64 = 24 * MINUTES_PER_HOUR;

/// Relative phrases, checked in order. `None` multiplier means a fixed age.
static RELATIVE: Lazy<Vec<(Regex, i64, Option<i64>)>> = Lazy::new(|| {
    let rules: &[(&str, i64, Option<i64>)] = &[
        (r"\b(agora|just now|acabou de)\b", 0, None),
        (r"(\d+)\+?\s*(minutos?|mins?|minutes?)\b", 0, Some(1)),
        (r"(\d+)\+?\s*(horas?|hours?|hrs?)\b", 0, Some(MINUTES_PER_HOUR)),
        (r"(\d+)\+?\s*(dias?|days?)\b", 0, Some(MINUTES_PER_DAY)),
        (r"\b(hoje|today)\b", 12 * MINUTES_PER_HOUR, None),
        (r"\b(ontem|yesterday)\b", MINUTES_PER_DAY, None),
        (r"(\d+)\+?\s*(semanas?|weeks?)\b", 0, Some(7 * MINUTES_PER_DAY)),
        (r"(\d+)\+?\s*(m[eê]s|meses|months?)\b", 0, Some(30 * MINUTES_PER_DAY)),
    ];
    rules
        .iter()
        .map(|(pat, fixed, mult)| {
            (
                Regex::new(&format!("(?i){pat}")).expect("recency regex"),
                *fixed,
                *mult,
            )
        })
        .collect()
});

/// Minutes between publication and `now`, or `None` when the text is not
/// understood. Future dates give a negative age.
pub fn age_minutes(published: &str, now: DateTime<Utc>) -> Option<i64> {
    let text = published.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some((now - ts.with_timezone(&Utc)).num_minutes());
    }
    if let Some(day) = text.get(..10).and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()) {
        let midnight = day.and_hms_opt(0, 0, 0)?.and_utc();
        return Some((now - midnight).num_minutes());
    }

    for (re, fixed, mult) in RELATIVE.iter() {
        let Some(caps) = re.captures(text) else {
            continue;
        };
        return match mult {
            None => Some(*fixed),
            Some(m) => caps
                .get(1)
                .and_then(|n| n.as_str().parse::<i64>().ok())
                .map(|n| n.saturating_mul(*m)),
        };
    }
    None
}

/// Keep postings not older than `max_age_days`. Unknown dates are kept.
/// Returns the survivors and the number dropped.
pub fn filter_recent(
    postings: Vec<JobPosting>,
    now: DateTime<Utc>,
    max_age_days: u32,
) -> (Vec<JobPosting>, usize) {
    let limit = i64::from(max_age_days) * MINUTES_PER_DAY;
    let before = postings.len();
    let kept: Vec<JobPosting> = postings
        .into_iter()
        .filter(|p| {
            let age = p.published_at.as_deref().and_then(|s| age_minutes(s, now));
            match age {
                Some(m) if m > limit => {
                    tracing::debug!(target: "ingest", url = %p.url, age_minutes = m, "stale posting dropped");
                    false
                }
                _ => true,
            }
        })
        .collect();
    let dropped = before - kept.len();
    (kept, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    #[test]
    fn relative_portuguese() {
        assert_eq!(age_minutes("há 2 horas", now()), Some(120));
        assert_eq!(age_minutes("Publicada há 3 dias", now()), Some(3 * 1440));
        assert_eq!(age_minutes("ontem", now()), Some(1440));
        assert_eq!(age_minutes("Hoje", now()), Some(720));
        assert_eq!(age_minutes("há 1 mês", now()), Some(30 * 1440));
        assert_eq!(age_minutes("agora mesmo", now()), Some(0));
    }

    #[test]
    fn relative_english() {
        assert_eq!(age_minutes("5 minutes ago", now()), Some(5));
        assert_eq!(age_minutes("30+ days ago", now()), Some(30 * 1440));
        assert_eq!(age_minutes("2 weeks ago", now()), Some(14 * 1440));
        assert_eq!(age_minutes("today", now()), Some(720));
    }

    #[test]
    fn absolute_dates() {
        assert_eq!(age_minutes("2026-10-19", now()), Some(720));
        assert_eq!(age_minutes("2026-10-18T12:00:00Z", now()), Some(1440));
        assert_eq!(age_minutes("2026-10-18 08:00", now()), Some(1440 + 720));
    }

    #[test]
    fn unknown_text() {
        assert_eq!(age_minutes("", now()), None);
        assert_eq!(age_minutes("recentemente", now()), None);
    }

    #[test]
    fn filter_keeps_unknown_and_fresh() {
        let mk = |url: &str, published: Option<&str>| {
            let mut p = JobPosting::new("Dev", "Acme", url);
            p.published_at = published.map(str::to_string);
            p
        };
        let posts = vec![
            mk("https://x/1", Some("há 2 dias")),
            mk("https://x/2", Some("2026-01-02")),
            mk("https://x/3", None),
            mk("https://x/4", Some("sem data")),
        ];
        let (kept, dropped) = filter_recent(posts, now(), 30);
        assert_eq!(dropped, 1);
        let urls: Vec<_> = kept.iter().map(|p| p.url.as_str()).collect();
        assert_eq!(urls, vec!["https://x/1", "https://x/3", "https://x/4"]);
    }
}
