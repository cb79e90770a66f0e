use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::models::EmailRecord;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub data_hash: String,
    pub report: String,
    pub context_summary: String,
    pub generated_at: DateTime<Utc>,
    pub record_count: usize,
    pub avg_open_rate: f64,
    pub avg_click_rate: f64,
    pub avg_unsub_rate: f64,
}

/// Single-slot result cache backed by one JSON file. A stored analysis is
/// reusable only while the fingerprint of the current record set matches
/// the one recorded with it.
#[derive(Debug, Clone)]
pub struct ResultCache {
    path: PathBuf,
}

impl ResultCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Content fingerprint over subject, both body fields and the four
    /// counters of every record, in the order given. Any field change,
    /// addition, removal or reordering produces a different hash.
    pub fn fingerprint(records: &[EmailRecord]) -> String {
        let mut hasher = Sha256::new();
        for record in records {
            hasher.update(record.subject.as_bytes());
            hasher.update([0x1f]);
            hasher.update(record.plaintext.as_bytes());
            hasher.update([0x1f]);
            hasher.update(record.message_body.as_bytes());
            hasher.update([0x1f]);
            hasher.update(record.sent.to_le_bytes());
            hasher.update(record.opened.to_le_bytes());
            hasher.update(record.clicked.to_le_bytes());
            hasher.update(record.unsubscribed.to_le_bytes());
            hasher.update([0x1e]);
        }
        hex::encode(hasher.finalize())
    }

    /// Returns the persisted entry, or None when the file is missing or
    /// unreadable. A corrupt entry is treated as absent, not an error.
    pub async fn load(&self) -> Option<CacheEntry> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No cached analysis at {}", self.path.display());
                return None;
            }
            Err(e) => {
                warn!("Failed to read cached analysis: {}", e);
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Discarding unparseable cache entry: {}", e);
                None
            }
        }
    }

    /// Overwrites the slot with `entry`. A persistence failure only costs
    /// the next run a recomputation, so it is logged and swallowed.
    pub async fn store(&self, entry: &CacheEntry) {
        let json = match serde_json::to_string_pretty(entry) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize cache entry: {}", e);
                return;
            }
        };

        if let Some(parent) = self.path.parent() {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                warn!("Failed to create cache directory: {}", e);
                return;
            }
        }

        match tokio::fs::write(&self.path, json).await {
            Ok(()) => info!("Cached analysis at {}", self.path.display()),
            Err(e) => warn!("Failed to persist analysis cache: {}", e),
        }
    }

    /// Removes the persisted entry. Nothing to remove is a no-op.
    pub async fn invalidate(&self) {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => info!("Cleared analysis cache"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to clear analysis cache: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, subject: &str, sent: i64) -> EmailRecord {
        EmailRecord {
            id: id.to_string(),
            subject: subject.to_string(),
            plaintext: "plain text".to_string(),
            message_body: "<p>html</p>".to_string(),
            sent,
            opened: 40,
            clicked: 12,
            unsubscribed: 1,
        }
    }

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!(
            "email-insight-test-{}-{}.json",
            std::process::id(),
            name
        ))
    }

    fn temp_cache(name: &str) -> ResultCache {
        ResultCache::new(temp_path(name))
    }

    fn entry(hash: &str) -> CacheEntry {
        CacheEntry {
            data_hash: hash.to_string(),
            report: "final report".to_string(),
            context_summary: "summary".to_string(),
            generated_at: Utc::now(),
            record_count: 7,
            avg_open_rate: 41.5,
            avg_click_rate: 9.2,
            avg_unsub_rate: 0.4,
        }
    }

    #[test]
    fn fingerprint_is_deterministic() {
        let records = vec![record("1", "Hello", 100), record("2", "World", 50)];
        assert_eq!(
            ResultCache::fingerprint(&records),
            ResultCache::fingerprint(&records)
        );
    }

    #[test]
    fn fingerprint_tracks_every_field() {
        let base = vec![record("1", "Hello", 100)];
        let original = ResultCache::fingerprint(&base);

        let mut changed = base.clone();
        changed[0].subject = "Hello!".to_string();
        assert_ne!(original, ResultCache::fingerprint(&changed));

        let mut changed = base.clone();
        changed[0].clicked += 1;
        assert_ne!(original, ResultCache::fingerprint(&changed));

        let mut changed = base.clone();
        changed[0].plaintext.push('x');
        assert_ne!(original, ResultCache::fingerprint(&changed));
    }

    #[test]
    fn fingerprint_is_order_sensitive() {
        let forward = vec![record("1", "A", 10), record("2", "B", 20)];
        let reversed = vec![record("2", "B", 20), record("1", "A", 10)];
        assert_ne!(
            ResultCache::fingerprint(&forward),
            ResultCache::fingerprint(&reversed)
        );
    }

    #[tokio::test]
    async fn store_then_load_round_trips() {
        let cache = temp_cache("roundtrip");
        cache.invalidate().await;

        let stored = entry("abc123");
        cache.store(&stored).await;

        let loaded = cache.load().await.expect("entry should load back");
        assert_eq!(loaded.data_hash, "abc123");
        assert_eq!(loaded.report, "final report");
        assert_eq!(loaded.record_count, 7);

        cache.invalidate().await;
    }

    #[tokio::test]
    async fn load_degrades_to_absent_on_garbage() {
        let cache = temp_cache("garbage");
        tokio::fs::write(temp_path("garbage"), "{not valid json")
            .await
            .unwrap();

        assert!(cache.load().await.is_none());
        cache.invalidate().await;
    }

    #[tokio::test]
    async fn invalidate_is_idempotent() {
        let cache = temp_cache("invalidate");
        cache.invalidate().await;
        cache.invalidate().await;
        assert!(cache.load().await.is_none());
    }
}
