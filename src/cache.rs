/// URL → analysis result cache with lazy TTL expiry
use crate::analysis::AnalysisResult;
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_MAX_ENTRIES: usize = 500;

/// A cached result and when it was fetched (epoch milliseconds)
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub result: AnalysisResult,
    pub fetched_at: f64,
}

impl CacheEntry {
    fn age_ms(&self, now: f64) -> f64 {
        now - self.fetched_at
    }
}

/// Results keyed by the exact URL string.
///
/// Expired entries are only removed when looked up or when room is needed
/// for an insert; there is no background sweep.
#[derive(Debug, Clone)]
pub struct ResultCache {
    entries: HashMap<String, CacheEntry>,
    ttl: Duration,
    max_entries: usize,
}

impl ResultCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        ResultCache {
            entries: HashMap::new(),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn is_expired(&self, entry: &CacheEntry, now: f64) -> bool {
        entry.age_ms(now) >= self.ttl.as_millis() as f64
    }

    /// Fresh result for `url`, evicting it if it has reached the TTL
    pub fn lookup(&mut self, url: &str, now: f64) -> Option<AnalysisResult> {
        let expired = self.is_expired(self.entries.get(url)?, now);
        if expired {
            self.entries.remove(url);
            return None;
        }
        self.entries.get(url).map(|entry| entry.result.clone())
    }

    pub fn insert(&mut self, url: String, result: AnalysisResult, now: f64) {
        if !self.entries.contains_key(&url) && self.entries.len() >= self.max_entries {
            self.make_room(now);
        }
        self.entries.insert(
            url,
            CacheEntry {
                result,
                fetched_at: now,
            },
        );
    }

    fn make_room(&mut self, now: f64) {
        let ttl_ms = self.ttl.as_millis() as f64;
        self.entries.retain(|_, entry| entry.age_ms(now) < ttl_ms);

        if self.entries.len() < self.max_entries {
            return;
        }

        let oldest = self
            .entries
            .iter()
            .min_by(|a, b| a.1.fetched_at.total_cmp(&b.1.fetched_at))
            .map(|(url, _)| url.clone());
        if let Some(url) = oldest {
            self.entries.remove(&url);
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_MAX_ENTRIES)
    }
}
