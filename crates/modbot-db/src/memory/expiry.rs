use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

use modbot_core::entities::{ExpiryKey, PendingExpiry};
use modbot_core::traits::{ExpiryRepository, RepoResult};

#[derive(Default)]
pub struct InMemoryExpiryRepository {
    inner: Mutex<HashMap<ExpiryKey, PendingExpiry>>,
}

impl InMemoryExpiryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

#[async_trait]
impl ExpiryRepository for InMemoryExpiryRepository {
    async fn upsert(&self, expiry: &PendingExpiry) -> RepoResult<()> {
        self.inner.lock().insert(expiry.key(), expiry.clone());
        Ok(())
    }

    async fn delete_exact(&self, expiry: &PendingExpiry) -> RepoResult<bool> {
        let mut stored = self.inner.lock();
        if stored.get(&expiry.key()) == Some(expiry) {
            stored.remove(&expiry.key());
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn find_all(&self) -> RepoResult<Vec<PendingExpiry>> {
        let mut all: Vec<_> = self.inner.lock().values().cloned().collect();
        all.sort_by_key(|e| e.fire_at);
        Ok(all)
    }
}
