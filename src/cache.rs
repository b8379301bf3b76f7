//! Bounded TTL cache for assembled records.
//!
//! One instance per process, shared across handler tasks, so access goes
//! through a mutex. Entries expire after the configured TTL and the oldest
//! insertion is dropped when the map is full. Keys are
//! `date|rounded-lat|rounded-lon` strings built by the assembler.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::models::PanchangRecord;

// ---

struct Entry {
    record: PanchangRecord,
    inserted_at: Instant,
    seq: u64,
}

struct Inner {
    map: HashMap<String, Entry>,
    next_seq: u64,
}

pub struct RecordCache {
    inner: Mutex<Inner>,
    capacity: usize,
    ttl: Duration,
}

impl RecordCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        // ---
        RecordCache {
            inner: Mutex::new(Inner {
                map: HashMap::new(),
                next_seq: 0,
            }),
            capacity: capacity.max(1),
            ttl,
        }
    }

    /// Fetch a live entry, dropping it if the TTL has lapsed.
    pub fn get(&self, key: &str) -> Option<PanchangRecord> {
        // ---
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(entry) = inner.map.get(key) {
            if entry.inserted_at.elapsed() <= self.ttl {
                return Some(entry.record.clone());
            }
            inner.map.remove(key);
        }
        None
    }

    /// Insert, evicting the oldest insertion when at capacity.
    pub fn put(&self, key: &str, record: PanchangRecord) {
        // ---
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());

        if !inner.map.contains_key(key) && inner.map.len() >= self.capacity {
            if let Some(oldest) = inner
                .map
                .iter()
                .min_by_key(|(_, e)| e.seq)
                .map(|(k, _)| k.clone())
            {
                inner.map.remove(&oldest);
            }
        }

        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.map.insert(
            key.to_string(),
            Entry {
                record,
                inserted_at: Instant::now(),
                seq,
            },
        );
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.inner.lock().unwrap().map.len()
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::extract::ExtractedFields;
    use crate::{assemble, fallback, sources};
    use chrono::NaiveDate;

    fn sample_record(date: &str) -> PanchangRecord {
        // ---
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        let location = sources::lookup_city("New Delhi").unwrap();
        let calc = fallback::calculate(date, 330, 1140);
        assemble::merge_record(date, &location, &ExtractedFields::default(), &calc)
    }

    #[test]
    fn get_returns_what_put_stored() {
        // ---
        let cache = RecordCache::new(4, Duration::from_secs(60));
        assert!(cache.get("k").is_none());
        cache.put("k", sample_record("2025-06-22"));
        let hit = cache.get("k").unwrap();
        assert_eq!(hit.date, "2025-06-22");
    }

    #[test]
    fn entries_expire_after_ttl() {
        // ---
        let cache = RecordCache::new(4, Duration::from_millis(5));
        cache.put("k", sample_record("2025-06-22"));
        std::thread::sleep(Duration::from_millis(20));
        assert!(cache.get("k").is_none());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn capacity_evicts_oldest_insertion() {
        // ---
        let cache = RecordCache::new(2, Duration::from_secs(60));
        cache.put("a", sample_record("2025-06-20"));
        cache.put("b", sample_record("2025-06-21"));
        cache.put("c", sample_record("2025-06-22"));
        assert_eq!(cache.len(), 2);
        assert!(cache.get("a").is_none());
        assert!(cache.get("b").is_some());
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn reinserting_existing_key_does_not_evict() {
        // ---
        let cache = RecordCache::new(2, Duration::from_secs(60));
        cache.put("a", sample_record("2025-06-20"));
        cache.put("b", sample_record("2025-06-21"));
        cache.put("a", sample_record("2025-06-22"));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a").unwrap().date, "2025-06-22");
        assert!(cache.get("b").is_some());
    }
}
