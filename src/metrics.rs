use serde::Serialize;

use crate::models::EmailRecord;

const OPEN_RATE_WEIGHT: f64 = 0.4;
const CLICK_RATE_WEIGHT: f64 = 0.5;
const UNSUB_RATE_WEIGHT: f64 = 0.1;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct EmailMetrics {
    pub open_rate: f64,
    pub click_rate: f64,
    pub unsub_rate: f64,
    pub effectiveness_score: f64,
}

impl EmailMetrics {
    /// Rates are percentages of the send count. A record that was never
    /// sent gets zero rates across the board rather than NaN.
    pub fn for_record(record: &EmailRecord) -> Self {
        if record.sent <= 0 {
            return Self {
                open_rate: 0.0,
                click_rate: 0.0,
                unsub_rate: 0.0,
                effectiveness_score: 0.0,
            };
        }

        let sent = record.sent as f64;
        let open_rate = record.opened as f64 / sent * 100.0;
        let click_rate = record.clicked as f64 / sent * 100.0;
        let unsub_rate = record.unsubscribed as f64 / sent * 100.0;

        Self {
            open_rate,
            click_rate,
            unsub_rate,
            effectiveness_score: open_rate * OPEN_RATE_WEIGHT
                + click_rate * CLICK_RATE_WEIGHT
                - unsub_rate * UNSUB_RATE_WEIGHT,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoredEmail {
    pub record: EmailRecord,
    pub metrics: EmailMetrics,
}

/// Builds the working set for analysis: records that were never sent are
/// dropped, the rest get metrics attached and are ranked by effectiveness
/// score, best first.
pub fn annotate_and_rank(records: &[EmailRecord]) -> Vec<ScoredEmail> {
    let mut scored: Vec<ScoredEmail> = records
        .iter()
        .filter(|r| r.sent > 0)
        .map(|r| ScoredEmail {
            record: r.clone(),
            metrics: EmailMetrics::for_record(r),
        })
        .collect();

    scored.sort_by(|a, b| {
        b.metrics
            .effectiveness_score
            .total_cmp(&a.metrics.effectiveness_score)
    });

    scored
}

pub fn top_performers(scored: &[ScoredEmail], n: usize) -> &[ScoredEmail] {
    &scored[..n.min(scored.len())]
}

pub fn worst_performers(scored: &[ScoredEmail], n: usize) -> Vec<&ScoredEmail> {
    scored.iter().rev().take(n).collect()
}

/// Mean rates over an already-annotated set. Used for the context summary
/// and the cache entry aggregates.
pub fn average_rates(scored: &[ScoredEmail]) -> (f64, f64, f64) {
    if scored.is_empty() {
        return (0.0, 0.0, 0.0);
    }
    let n = scored.len() as f64;
    let (open, click, unsub) = scored.iter().fold((0.0, 0.0, 0.0), |acc, s| {
        (
            acc.0 + s.metrics.open_rate,
            acc.1 + s.metrics.click_rate,
            acc.2 + s.metrics.unsub_rate,
        )
    });
    (open / n, click / n, unsub / n)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, sent: i64, opened: i64, clicked: i64, unsubscribed: i64) -> EmailRecord {
        EmailRecord {
            id: id.to_string(),
            subject: format!("Subject {}", id),
            plaintext: "plain".to_string(),
            message_body: "<p>body</p>".to_string(),
            sent,
            opened,
            clicked,
            unsubscribed,
        }
    }

    #[test]
    fn zero_sends_yield_zero_rates() {
        let metrics = EmailMetrics::for_record(&record("1", 0, 5, 2, 1));
        assert_eq!(metrics.open_rate, 0.0);
        assert_eq!(metrics.click_rate, 0.0);
        assert_eq!(metrics.unsub_rate, 0.0);
        assert_eq!(metrics.effectiveness_score, 0.0);
    }

    #[test]
    fn effectiveness_score_uses_weighted_rates() {
        // 50% open, 20% click, 10% unsub -> 50*0.4 + 20*0.5 - 10*0.1 = 29
        let metrics = EmailMetrics::for_record(&record("1", 100, 50, 20, 10));
        assert!((metrics.effectiveness_score - 29.0).abs() < 1e-9);
    }

    #[test]
    fn unsent_records_are_excluded_from_ranking() {
        let records = vec![
            record("1", 0, 0, 0, 0),
            record("2", 100, 80, 30, 0),
            record("3", 100, 10, 2, 5),
        ];
        let scored = annotate_and_rank(&records);
        assert_eq!(scored.len(), 2);
        assert_eq!(scored[0].record.id, "2");
        assert_eq!(scored[1].record.id, "3");
    }

    #[test]
    fn ranking_is_deterministic_for_equal_input() {
        let records = vec![
            record("a", 10, 5, 1, 0),
            record("b", 10, 5, 1, 0),
            record("c", 10, 9, 4, 0),
        ];
        let first: Vec<String> = annotate_and_rank(&records)
            .into_iter()
            .map(|s| s.record.id)
            .collect();
        let second: Vec<String> = annotate_and_rank(&records)
            .into_iter()
            .map(|s| s.record.id)
            .collect();
        assert_eq!(first, second);
        assert_eq!(first[0], "c");
    }

    #[test]
    fn average_rates_are_means_over_the_set() {
        let records = vec![record("1", 100, 50, 10, 0), record("2", 100, 30, 20, 10)];
        let scored = annotate_and_rank(&records);
        let (open, click, unsub) = average_rates(&scored);
        assert!((open - 40.0).abs() < 1e-9);
        assert!((click - 15.0).abs() < 1e-9);
        assert!((unsub - 5.0).abs() < 1e-9);
    }
}
