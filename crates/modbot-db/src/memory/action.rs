use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use modbot_core::entities::{ModerationAction, NewModerationAction};
use modbot_core::traits::{ActionRepository, RepoResult};
use modbot_core::value_objects::Snowflake;

#[derive(Default)]
struct Ledger {
    next_id: i64,
    records: Vec<ModerationAction>,
}

/// Append-only ledger kept in insertion order
#[derive(Default)]
pub struct InMemoryActionRepository {
    inner: Mutex<Ledger>,
}

impl InMemoryActionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored record, oldest first
    pub fn snapshot(&self) -> Vec<ModerationAction> {
        self.inner.lock().records.clone()
    }
}

#[async_trait]
impl ActionRepository for InMemoryActionRepository {
    async fn record(&self, action: &NewModerationAction) -> RepoResult<ModerationAction> {
        let mut ledger = self.inner.lock();
        ledger.next_id += 1;
        let record = ModerationAction {
            id: ledger.next_id,
            community_id: action.community_id,
            subject_id: action.subject_id,
            kind: action.kind,
            reason: action.reason.clone(),
            issuer_id: action.issuer_id,
            created_at: Utc::now(),
        };
        ledger.records.push(record.clone());
        Ok(record)
    }

    async fn find_warnings(
        &self,
        community_id: Snowflake,
        subject_id: Snowflake,
    ) -> RepoResult<Vec<ModerationAction>> {
        let ledger = self.inner.lock();
        Ok(ledger
            .records
            .iter()
            .filter(|r| {
                r.community_id == community_id && r.subject_id == subject_id && r.kind.is_warning()
            })
            .cloned()
            .collect())
    }

    async fn delete_warnings(
        &self,
        community_id: Snowflake,
        subject_id: Snowflake,
    ) -> RepoResult<u64> {
        let mut ledger = self.inner.lock();
        let before = ledger.records.len();
        ledger.records.retain(|r| {
            !(r.community_id == community_id && r.subject_id == subject_id && r.kind.is_warning())
        });
        Ok((before - ledger.records.len()) as u64)
    }

    async fn find_recent(
        &self,
        community_id: Snowflake,
        limit: i64,
    ) -> RepoResult<Vec<ModerationAction>> {
        let limit = usize::try_from(limit).unwrap_or(0);
        let ledger = self.inner.lock();
        Ok(ledger
            .records
            .iter()
            .rev()
            .filter(|r| r.community_id == community_id)
            .take(limit)
            .cloned()
            .collect())
    }
}
