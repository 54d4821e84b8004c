//! Expiry scheduler
//!
//! Owns the timers that reverse timed mutes. At most one timer is armed per
//! (community, subject) pair; arming again replaces the previous timer and
//! an explicit cancel guarantees the reversal never runs.
//!
//! Every armed timer carries a generation number. A firing timer must remove
//! its own entry, matched by generation, before it touches the platform.
//! Whoever removes the entry owns it: a cancel that wins the race aborts
//! the timer, and a timer that wins runs to completion while later cancels
//! find nothing to cancel.
//!
//! Persisted rows are only ever deleted by the expiry they belong to, so a
//! fire or cancel that loses a race with a re-arm never drops the newer row.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use modbot_core::entities::{ExpiryKey, PendingExpiry};
use modbot_core::events::Notification;
use modbot_core::traits::{ExpiryRepository, NotificationSink, PlatformClient};
use modbot_core::value_objects::Snowflake;

/// Audit reason attached to automatic role removal
pub const EXPIRY_REASON: &str = "mute expired";

struct Armed {
    expiry: PendingExpiry,
    generation: u64,
    handle: JoinHandle<()>,
}

struct Inner {
    platform: Arc<dyn PlatformClient>,
    notifier: Arc<dyn NotificationSink>,
    store: Arc<dyn ExpiryRepository>,
    armed: DashMap<ExpiryKey, Armed>,
    generation: AtomicU64,
}

/// Cancellable, replaceable timers for timed mutes
#[derive(Clone)]
pub struct ExpiryScheduler {
    inner: Arc<Inner>,
}

impl ExpiryScheduler {
    pub fn new(
        platform: Arc<dyn PlatformClient>,
        notifier: Arc<dyn NotificationSink>,
        store: Arc<dyn ExpiryRepository>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                platform,
                notifier,
                store,
                armed: DashMap::new(),
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// Arm (or re-arm) the reversal for `expiry`, replacing any earlier one
    #[instrument(skip(self, expiry), fields(community_id = %expiry.community_id, subject_id = %expiry.subject_id))]
    pub async fn arm(&self, expiry: PendingExpiry) {
        if let Err(e) = self.inner.store.upsert(&expiry).await {
            warn!(error = %e, "Failed to persist pending expiry");
        }
        self.schedule(expiry);
    }

    /// Cancel the pending reversal, if any. Returns whether a timer was cancelled.
    #[instrument(skip(self))]
    pub async fn cancel(&self, community_id: Snowflake, subject_id: Snowflake) -> bool {
        let Some(expiry) = self.suspend(community_id, subject_id) else {
            return false;
        };
        self.forget(&expiry).await;
        debug!("Pending expiry cancelled");
        true
    }

    /// Disarm the timer for a pair but keep its persisted row.
    ///
    /// The caller settles the returned expiry with [`resume`](Self::resume)
    /// or [`forget`](Self::forget).
    pub fn suspend(&self, community_id: Snowflake, subject_id: Snowflake) -> Option<PendingExpiry> {
        let key = ExpiryKey {
            community_id,
            subject_id,
        };
        self.inner.armed.remove(&key).map(|(_, armed)| {
            armed.handle.abort();
            armed.expiry
        })
    }

    /// Re-arm a suspended expiry, unless the pair was re-armed meanwhile.
    /// Returns whether the timer is back.
    pub fn resume(&self, expiry: PendingExpiry) -> bool {
        let key = expiry.key();
        let generation = self.next_generation();
        let delay = expiry.remaining(Utc::now());

        match self.inner.armed.entry(key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                let handle = self.spawn_timer(key, generation, delay);
                slot.insert(Armed {
                    expiry,
                    generation,
                    handle,
                });
                debug!(community_id = %key.community_id, subject_id = %key.subject_id, "Pending expiry resumed");
                true
            }
        }
    }

    /// Drop the persisted row of a suspended expiry
    pub async fn forget(&self, expiry: &PendingExpiry) {
        self.inner.forget(expiry).await;
    }

    /// Re-arm every persisted expiry; overdue ones fire immediately
    pub async fn restore(&self) -> usize {
        let stored = match self.inner.store.find_all().await {
            Ok(stored) => stored,
            Err(e) => {
                warn!(error = %e, "Failed to load pending expiries");
                return 0;
            }
        };

        let count = stored.len();
        for expiry in stored {
            self.schedule(expiry);
        }
        info!(count, "Restored pending expiries");
        count
    }

    /// Abort every timer without firing. Persisted rows are left for `restore`.
    pub fn shutdown(&self) {
        self.inner.armed.retain(|_, armed| {
            armed.handle.abort();
            false
        });
    }

    pub fn is_armed(&self, community_id: Snowflake, subject_id: Snowflake) -> bool {
        self.inner.armed.contains_key(&ExpiryKey {
            community_id,
            subject_id,
        })
    }

    /// The currently armed expiry for a pair
    pub fn pending(&self, community_id: Snowflake, subject_id: Snowflake) -> Option<PendingExpiry> {
        self.inner
            .armed
            .get(&ExpiryKey {
                community_id,
                subject_id,
            })
            .map(|armed| armed.expiry.clone())
    }

    pub fn armed_count(&self) -> usize {
        self.inner.armed.len()
    }

    fn schedule(&self, expiry: PendingExpiry) {
        let key = expiry.key();
        let generation = self.next_generation();
        let delay = expiry.remaining(Utc::now());

        // The timer is spawned while the entry is held so it can never look
        // for its slot before the slot exists.
        match self.inner.armed.entry(key) {
            Entry::Occupied(mut slot) => {
                slot.get().handle.abort();
                let handle = self.spawn_timer(key, generation, delay);
                slot.insert(Armed {
                    expiry,
                    generation,
                    handle,
                });
                debug!(community_id = %key.community_id, subject_id = %key.subject_id, "Pending expiry re-armed");
            }
            Entry::Vacant(slot) => {
                let handle = self.spawn_timer(key, generation, delay);
                slot.insert(Armed {
                    expiry,
                    generation,
                    handle,
                });
            }
        }
    }

    fn next_generation(&self) -> u64 {
        self.inner.generation.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn spawn_timer(&self, key: ExpiryKey, generation: u64, delay: Duration) -> JoinHandle<()> {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let Some((_, armed)) = inner
                .armed
                .remove_if(&key, |_, armed| armed.generation == generation)
            else {
                return;
            };
            inner.fire(armed.expiry).await;
        })
    }
}

impl Inner {
    async fn forget(&self, expiry: &PendingExpiry) {
        match self.store.delete_exact(expiry).await {
            Ok(true) => {}
            Ok(false) => debug!(
                community_id = %expiry.community_id,
                subject_id = %expiry.subject_id,
                "Persisted expiry already replaced"
            ),
            Err(e) => warn!(error = %e, "Failed to delete pending expiry"),
        }
    }

    async fn fire(&self, expiry: PendingExpiry) {
        self.forget(&expiry).await;

        let PendingExpiry {
            community_id,
            subject_id,
            role_id,
            ..
        } = expiry;

        match self
            .platform
            .revoke_role(community_id, subject_id, role_id, EXPIRY_REASON)
            .await
        {
            Ok(()) => {
                info!(community_id = %community_id, subject_id = %subject_id, "Mute expired");
                self.notifier
                    .notify(&Notification::success(
                        community_id,
                        "User Unmuted (auto)",
                        format!("**User:** <@{subject_id}>\n**Reason:** {EXPIRY_REASON}"),
                    ))
                    .await;
            }
            Err(e) => {
                // Not retried and not re-armed
                warn!(community_id = %community_id, subject_id = %subject_id, error = %e, "Automatic unmute failed");
                self.notifier
                    .notify(&Notification::danger(
                        community_id,
                        "Automatic Unmute Failed",
                        format!("**User:** <@{subject_id}>\n**Error:** {e}"),
                    ))
                    .await;
            }
        }
    }
}

impl std::fmt::Debug for ExpiryScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpiryScheduler")
            .field("armed", &self.inner.armed.len())
            .finish()
    }
}
