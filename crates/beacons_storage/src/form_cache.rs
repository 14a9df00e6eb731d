#![forbid(unsafe_code)]

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use beacons_kernel_contracts::{ContractViolation, FormRecord, SubmissionId, Validate};
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("form cache unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    ContractViolation(#[from] ContractViolation),
}

/// Keyed store of in-progress submissions.
///
/// `update` replaces the whole record for a key. A missing or expired key reads as the
/// empty record.
#[async_trait]
pub trait FormCache: Send + Sync {
    async fn get(&self, id: &SubmissionId) -> Result<FormRecord, StorageError>;
    async fn update(&self, id: &SubmissionId, record: FormRecord) -> Result<(), StorageError>;
    async fn remove(&self, id: &SubmissionId) -> Result<(), StorageError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormCacheConfig {
    pub ttl: Duration,
    pub max_entries: usize,
}

impl FormCacheConfig {
    pub fn mvp_v1() -> Self {
        Self {
            ttl: Duration::from_secs(3_600),
            max_entries: 10_000,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

impl Validate for FormCacheConfig {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.ttl.is_zero() {
            return Err(ContractViolation::InvalidValue {
                field: "form_cache_config.ttl",
                reason: "must be > 0",
            });
        }
        if self.max_entries == 0 {
            return Err(ContractViolation::InvalidValue {
                field: "form_cache_config.max_entries",
                reason: "must be > 0",
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    record: FormRecord,
    written_at: Instant,
}

#[derive(Debug)]
pub struct InMemoryFormCache {
    config: FormCacheConfig,
    entries: Mutex<BTreeMap<SubmissionId, CacheEntry>>,
}

impl InMemoryFormCache {
    pub fn new(config: FormCacheConfig) -> Result<Self, StorageError> {
        config.validate()?;
        Ok(Self {
            config,
            entries: Mutex::new(BTreeMap::new()),
        })
    }

    pub fn config(&self) -> FormCacheConfig {
        self.config
    }

    /// Live (unexpired) entries.
    pub fn len(&self) -> Result<usize, StorageError> {
        let now = Instant::now();
        let entries = self.lock()?;
        Ok(entries
            .values()
            .filter(|entry| !self.is_expired(entry, now))
            .count())
    }

    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<SubmissionId, CacheEntry>>, StorageError> {
        self.entries
            .lock()
            .map_err(|_| StorageError::Unavailable("form cache lock poisoned".to_string()))
    }

    fn is_expired(&self, entry: &CacheEntry, now: Instant) -> bool {
        now.saturating_duration_since(entry.written_at) >= self.config.ttl
    }
}

#[async_trait]
impl FormCache for InMemoryFormCache {
    async fn get(&self, id: &SubmissionId) -> Result<FormRecord, StorageError> {
        let now = Instant::now();
        let mut entries = self.lock()?;
        match entries.get(id) {
            Some(entry) if !self.is_expired(entry, now) => Ok(entry.record.clone()),
            Some(_) => {
                entries.remove(id);
                Ok(FormRecord::new())
            }
            None => Ok(FormRecord::new()),
        }
    }

    async fn update(&self, id: &SubmissionId, record: FormRecord) -> Result<(), StorageError> {
        let now = Instant::now();
        let mut entries = self.lock()?;
        entries.retain(|_, entry| !self.is_expired(entry, now));
        if !entries.contains_key(id) && entries.len() >= self.config.max_entries {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.written_at)
                .map(|(key, _)| key.clone());
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
            }
        }
        entries.insert(
            id.clone(),
            CacheEntry {
                record,
                written_at: now,
            },
        );
        Ok(())
    }

    async fn remove(&self, id: &SubmissionId) -> Result<(), StorageError> {
        self.lock()?.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> SubmissionId {
        SubmissionId::new(s).unwrap()
    }

    fn cache() -> InMemoryFormCache {
        InMemoryFormCache::new(FormCacheConfig::mvp_v1()).unwrap()
    }

    #[tokio::test]
    async fn at_form_cache_01_missing_key_reads_as_empty_record() {
        let c = cache();
        assert_eq!(c.get(&id("s1")).await.unwrap(), FormRecord::new());
    }

    #[tokio::test]
    async fn at_form_cache_02_update_is_full_overwrite() {
        let c = cache();
        c.update(
            &id("s1"),
            FormRecord::from_pairs([("fullName", "A Person"), ("email", "a@b.com")]),
        )
        .await
        .unwrap();
        c.update(&id("s1"), FormRecord::from_pairs([("fullName", "")]))
            .await
            .unwrap();
        assert_eq!(
            c.get(&id("s1")).await.unwrap(),
            FormRecord::from_pairs([("fullName", "")])
        );
    }

    #[tokio::test]
    async fn at_form_cache_03_remove_missing_key_is_noop() {
        let c = cache();
        c.remove(&id("nobody")).await.unwrap();
        c.update(&id("s1"), FormRecord::from_pairs([("a", "1")]))
            .await
            .unwrap();
        c.remove(&id("s1")).await.unwrap();
        assert!(c.get(&id("s1")).await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn at_form_cache_04_entries_expire_after_ttl() {
        let c = InMemoryFormCache::new(
            FormCacheConfig::mvp_v1().with_ttl(Duration::from_secs(60)),
        )
        .unwrap();
        c.update(&id("s1"), FormRecord::from_pairs([("a", "1")]))
            .await
            .unwrap();
        tokio::time::advance(Duration::from_secs(59)).await;
        assert_eq!(c.get(&id("s1")).await.unwrap().get("a"), Some("1"));
        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(c.get(&id("s1")).await.unwrap().is_empty());
        assert!(c.is_empty().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn at_form_cache_05_full_cache_evicts_oldest_write() {
        let c = InMemoryFormCache::new(FormCacheConfig {
            ttl: Duration::from_secs(3_600),
            max_entries: 2,
        })
        .unwrap();
        c.update(&id("a"), FormRecord::from_pairs([("k", "a")]))
            .await
            .unwrap();
        tokio::time::advance(Duration::from_secs(1)).await;
        c.update(&id("b"), FormRecord::from_pairs([("k", "b")]))
            .await
            .unwrap();
        tokio::time::advance(Duration::from_secs(1)).await;
        c.update(&id("c"), FormRecord::from_pairs([("k", "c")]))
            .await
            .unwrap();
        assert!(c.get(&id("a")).await.unwrap().is_empty());
        assert_eq!(c.get(&id("b")).await.unwrap().get("k"), Some("b"));
        assert_eq!(c.get(&id("c")).await.unwrap().get("k"), Some("c"));
        assert_eq!(c.len().unwrap(), 2);
    }

    #[test]
    fn at_form_cache_06_config_rejects_zero_limits() {
        assert!(FormCacheConfig::mvp_v1().validate().is_ok());
        assert!(matches!(
            InMemoryFormCache::new(FormCacheConfig::mvp_v1().with_ttl(Duration::ZERO)),
            Err(StorageError::ContractViolation(_))
        ));
        let config = FormCacheConfig {
            max_entries: 0,
            ..FormCacheConfig::mvp_v1()
        };
        assert!(config.validate().is_err());
    }
}
