//! Recording fakes
//!
//! `RecordingPlatform` keeps a small model of the platform (roles, member
//! roles, channels) and records every mutation that succeeded. Individual
//! operations can be told to fail. `RecordingSink` captures notifications.
//! `GatedExpiryStore` holds expiry deletes until the test lets them through.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Semaphore;

use modbot_core::{
    ChannelHandle, ChannelSpec, DomainError, EnsuredRole, ExpiryRepository, Notification,
    NotificationSink, OutgoingMessage, PendingExpiry, PermissionOverwrite, PlatformClient,
    PlatformError, PlatformResult, RepoResult, RoleHandle, Snowflake,
};
use modbot_db::InMemoryExpiryRepository;

/// Platform operations that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    GrantRole,
    RevokeRole,
    Kick,
    Ban,
    CreateChannel,
    DeleteChannel,
    SetPermission,
    SetSlowmode,
    SendMessage,
}

/// A mutation the platform carried out
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCall {
    GrantRole {
        community_id: Snowflake,
        user_id: Snowflake,
        role_id: Snowflake,
        reason: String,
    },
    RevokeRole {
        community_id: Snowflake,
        user_id: Snowflake,
        role_id: Snowflake,
        reason: String,
    },
    Kick {
        community_id: Snowflake,
        user_id: Snowflake,
    },
    Ban {
        community_id: Snowflake,
        user_id: Snowflake,
    },
    CreateRole {
        community_id: Snowflake,
        name: String,
    },
    CreateChannel {
        community_id: Snowflake,
        spec: ChannelSpec,
    },
    DeleteChannel {
        channel_id: Snowflake,
    },
    SetPermission {
        channel_id: Snowflake,
        overwrite: PermissionOverwrite,
    },
    SetSlowmode {
        channel_id: Snowflake,
        seconds: u32,
    },
    SendMessage {
        channel_id: Snowflake,
        message: OutgoingMessage,
    },
}

#[derive(Debug)]
struct World {
    next_id: i64,
    roles: HashMap<Snowflake, Vec<RoleHandle>>,
    /// (community, user, role)
    member_roles: HashSet<(Snowflake, Snowflake, Snowflake)>,
    channels: HashMap<Snowflake, Vec<ChannelHandle>>,
    failing: HashSet<Op>,
    stalled: HashSet<Op>,
    calls: Vec<PlatformCall>,
}

#[derive(Debug)]
pub struct RecordingPlatform {
    world: Mutex<World>,
}

impl Default for RecordingPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingPlatform {
    pub fn new() -> Self {
        Self {
            world: Mutex::new(World {
                next_id: 10_000,
                roles: HashMap::new(),
                member_roles: HashSet::new(),
                channels: HashMap::new(),
                failing: HashSet::new(),
                stalled: HashSet::new(),
                calls: Vec::new(),
            }),
        }
    }

    /// Seed an existing text channel
    pub fn add_channel(&self, community_id: Snowflake, channel_id: Snowflake, name: &str) {
        self.world
            .lock()
            .channels
            .entry(community_id)
            .or_default()
            .push(ChannelHandle {
                id: channel_id,
                name: name.to_string(),
            });
    }

    /// Make every later call of `op` fail until `recover`
    pub fn fail(&self, op: Op) {
        self.world.lock().failing.insert(op);
    }

    pub fn recover(&self, op: Op) {
        self.world.lock().failing.remove(&op);
    }

    /// Make every later call of `op` hang forever
    pub fn stall(&self, op: Op) {
        self.world.lock().stalled.insert(op);
    }

    async fn maybe_stall(&self, op: Op) {
        let stalled = self.world.lock().stalled.contains(&op);
        if stalled {
            std::future::pending::<()>().await;
        }
    }

    pub fn calls(&self) -> Vec<PlatformCall> {
        self.world.lock().calls.clone()
    }

    pub fn has_role(&self, community_id: Snowflake, user_id: Snowflake, role_id: Snowflake) -> bool {
        self.world
            .lock()
            .member_roles
            .contains(&(community_id, user_id, role_id))
    }

    pub fn role_named(&self, community_id: Snowflake, name: &str) -> Option<RoleHandle> {
        self.world
            .lock()
            .roles
            .get(&community_id)
            .and_then(|roles| roles.iter().find(|r| r.name == name).cloned())
    }

    pub fn channels(&self, community_id: Snowflake) -> Vec<ChannelHandle> {
        self.world
            .lock()
            .channels
            .get(&community_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Role removals carrying exactly this audit reason
    pub fn revocations_with_reason(&self, reason: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, PlatformCall::RevokeRole { reason: r, .. } if r == reason))
            .count()
    }

    pub fn messages_to(&self, channel_id: Snowflake) -> Vec<OutgoingMessage> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                PlatformCall::SendMessage {
                    channel_id: c,
                    message,
                } if c == channel_id => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn permission_writes(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, PlatformCall::SetPermission { .. }))
            .count()
    }

    fn check(world: &World, op: Op) -> PlatformResult<()> {
        if world.failing.contains(&op) {
            Err(PlatformError::with_status(500, format!("{op:?} failed")))
        } else {
            Ok(())
        }
    }

    fn next_id(world: &mut World) -> Snowflake {
        world.next_id += 1;
        Snowflake::new(world.next_id)
    }
}

#[async_trait]
impl PlatformClient for RecordingPlatform {
    async fn grant_role(
        &self,
        community_id: Snowflake,
        user_id: Snowflake,
        role_id: Snowflake,
        reason: &str,
    ) -> PlatformResult<()> {
        let mut world = self.world.lock();
        Self::check(&world, Op::GrantRole)?;
        world.member_roles.insert((community_id, user_id, role_id));
        world.calls.push(PlatformCall::GrantRole {
            community_id,
            user_id,
            role_id,
            reason: reason.to_string(),
        });
        Ok(())
    }

    async fn revoke_role(
        &self,
        community_id: Snowflake,
        user_id: Snowflake,
        role_id: Snowflake,
        reason: &str,
    ) -> PlatformResult<()> {
        let mut world = self.world.lock();
        Self::check(&world, Op::RevokeRole)?;
        world.member_roles.remove(&(community_id, user_id, role_id));
        world.calls.push(PlatformCall::RevokeRole {
            community_id,
            user_id,
            role_id,
            reason: reason.to_string(),
        });
        Ok(())
    }

    async fn member_has_role(
        &self,
        community_id: Snowflake,
        user_id: Snowflake,
        role_id: Snowflake,
    ) -> PlatformResult<bool> {
        Ok(self.has_role(community_id, user_id, role_id))
    }

    async fn kick_member(
        &self,
        community_id: Snowflake,
        user_id: Snowflake,
        _reason: &str,
    ) -> PlatformResult<()> {
        let mut world = self.world.lock();
        Self::check(&world, Op::Kick)?;
        world.calls.push(PlatformCall::Kick {
            community_id,
            user_id,
        });
        Ok(())
    }

    async fn ban_member(
        &self,
        community_id: Snowflake,
        user_id: Snowflake,
        _reason: &str,
    ) -> PlatformResult<()> {
        let mut world = self.world.lock();
        Self::check(&world, Op::Ban)?;
        world.calls.push(PlatformCall::Ban {
            community_id,
            user_id,
        });
        Ok(())
    }

    async fn find_role(
        &self,
        community_id: Snowflake,
        name: &str,
    ) -> PlatformResult<Option<RoleHandle>> {
        Ok(self.role_named(community_id, name))
    }

    async fn create_role_if_absent(
        &self,
        community_id: Snowflake,
        name: &str,
    ) -> PlatformResult<EnsuredRole> {
        let mut world = self.world.lock();
        if let Some(role) = world
            .roles
            .get(&community_id)
            .and_then(|roles| roles.iter().find(|r| r.name == name))
        {
            return Ok(EnsuredRole {
                role: role.clone(),
                created: false,
            });
        }

        let role = RoleHandle {
            id: Self::next_id(&mut world),
            name: name.to_string(),
        };
        world
            .roles
            .entry(community_id)
            .or_default()
            .push(role.clone());
        world.calls.push(PlatformCall::CreateRole {
            community_id,
            name: name.to_string(),
        });
        Ok(EnsuredRole {
            role,
            created: true,
        })
    }

    async fn list_channels(&self, community_id: Snowflake) -> PlatformResult<Vec<ChannelHandle>> {
        Ok(self.channels(community_id))
    }

    async fn create_channel(
        &self,
        community_id: Snowflake,
        spec: &ChannelSpec,
    ) -> PlatformResult<ChannelHandle> {
        let mut world = self.world.lock();
        Self::check(&world, Op::CreateChannel)?;
        let channel = ChannelHandle {
            id: Self::next_id(&mut world),
            name: spec.name.clone(),
        };
        world
            .channels
            .entry(community_id)
            .or_default()
            .push(channel.clone());
        world.calls.push(PlatformCall::CreateChannel {
            community_id,
            spec: spec.clone(),
        });
        Ok(channel)
    }

    async fn delete_channel(&self, channel_id: Snowflake, _reason: &str) -> PlatformResult<()> {
        let mut world = self.world.lock();
        Self::check(&world, Op::DeleteChannel)?;
        for channels in world.channels.values_mut() {
            channels.retain(|c| c.id != channel_id);
        }
        world.calls.push(PlatformCall::DeleteChannel { channel_id });
        Ok(())
    }

    async fn set_channel_permission(
        &self,
        channel_id: Snowflake,
        overwrite: &PermissionOverwrite,
    ) -> PlatformResult<()> {
        let mut world = self.world.lock();
        Self::check(&world, Op::SetPermission)?;
        world.calls.push(PlatformCall::SetPermission {
            channel_id,
            overwrite: *overwrite,
        });
        Ok(())
    }

    async fn set_slowmode(
        &self,
        channel_id: Snowflake,
        seconds: u32,
        _reason: &str,
    ) -> PlatformResult<()> {
        let mut world = self.world.lock();
        Self::check(&world, Op::SetSlowmode)?;
        world.calls.push(PlatformCall::SetSlowmode {
            channel_id,
            seconds,
        });
        Ok(())
    }

    async fn send_message(
        &self,
        channel_id: Snowflake,
        message: &OutgoingMessage,
    ) -> PlatformResult<Snowflake> {
        self.maybe_stall(Op::SendMessage).await;
        let mut world = self.world.lock();
        Self::check(&world, Op::SendMessage)?;
        let id = Self::next_id(&mut world);
        world.calls.push(PlatformCall::SendMessage {
            channel_id,
            message: message.clone(),
        });
        Ok(id)
    }
}

/// Captures every delivered notification
#[derive(Debug, Default)]
pub struct RecordingSink {
    delivered: Mutex<Vec<Notification>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.delivered.lock().clone()
    }

    pub fn titled(&self, title: &str) -> Vec<Notification> {
        self.delivered
            .lock()
            .iter()
            .filter(|n| n.title == title)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn notify(&self, notification: &Notification) {
        self.delivered.lock().push(notification.clone());
    }
}

/// In-memory expiry store whose deletes wait for `release_delete`
pub struct GatedExpiryStore {
    inner: Arc<InMemoryExpiryRepository>,
    deletes: Semaphore,
    waiting: AtomicUsize,
}

impl GatedExpiryStore {
    pub fn new(inner: Arc<InMemoryExpiryRepository>) -> Self {
        Self {
            inner,
            deletes: Semaphore::new(0),
            waiting: AtomicUsize::new(0),
        }
    }

    /// Let one pending (or future) delete proceed
    pub fn release_delete(&self) {
        self.deletes.add_permits(1);
    }

    /// Deletes currently held at the gate
    pub fn waiting(&self) -> usize {
        self.waiting.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExpiryRepository for GatedExpiryStore {
    async fn upsert(&self, expiry: &PendingExpiry) -> RepoResult<()> {
        self.inner.upsert(expiry).await
    }

    async fn delete_exact(&self, expiry: &PendingExpiry) -> RepoResult<bool> {
        self.waiting.fetch_add(1, Ordering::SeqCst);
        let permit = self
            .deletes
            .acquire()
            .await
            .map_err(|e| DomainError::Persistence(e.to_string()))?;
        permit.forget();
        self.waiting.fetch_sub(1, Ordering::SeqCst);
        self.inner.delete_exact(expiry).await
    }

    async fn find_all(&self) -> RepoResult<Vec<PendingExpiry>> {
        self.inner.find_all().await
    }
}
