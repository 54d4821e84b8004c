//! Moderation service
//!
//! Sanctions and their reversal. Each operation performs its side effects
//! in a fixed order, best effort and without rollback:
//! platform mutation first (a failure aborts before anything is recorded),
//! then the ledger record, then any timer.

use chrono::Utc;
use futures::future::join_all;
use tracing::{info, instrument, warn};

use modbot_core::entities::{ActionKind, NewModerationAction, PendingExpiry};
use modbot_core::events::Notification;
use modbot_core::traits::{OverwriteTarget, PermissionOverwrite, PlatformError, RoleHandle};
use modbot_core::{DomainError, Permissions, Snowflake};

use crate::dto::{
    ChannelLockResponse, ModerationActionResponse, MuteResponse, RoleToggledResponse,
    SlowmodeResponse,
};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::outcome::Outcome;

const UNMUTE_REASON: &str = "unmuted by moderator";
/// Longest delay the platform accepts (six hours)
const MAX_SLOWMODE_SECONDS: u32 = 21_600;

pub struct ModerationService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ModerationService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Record a warning
    #[instrument(skip(self, reason))]
    pub async fn warn(
        &self,
        community_id: Snowflake,
        subject_id: Snowflake,
        reason: Option<String>,
        moderator_id: Snowflake,
    ) -> ServiceResult<Outcome<ModerationActionResponse>> {
        let action = self
            .record(community_id, subject_id, ActionKind::Warn, reason, moderator_id)
            .await?;

        info!(community_id = %community_id, subject_id = %subject_id, "Member warned");

        let body = sanction_body(subject_id, moderator_id, &action.reason);
        Ok(Outcome::notify(
            ModerationActionResponse::from(&action),
            Notification::warning(community_id, "User Warned", body),
        ))
    }

    #[instrument(skip(self, reason))]
    pub async fn kick(
        &self,
        community_id: Snowflake,
        subject_id: Snowflake,
        reason: Option<String>,
        moderator_id: Snowflake,
    ) -> ServiceResult<Outcome<ModerationActionResponse>> {
        let record = NewModerationAction::new(
            community_id,
            subject_id,
            ActionKind::Kick,
            reason,
            moderator_id,
        );
        self.ctx
            .platform()
            .kick_member(community_id, subject_id, &record.reason)
            .await
            .map_err(DomainError::from)?;

        let action = self.ctx.action_repo().record(&record).await?;
        info!(community_id = %community_id, subject_id = %subject_id, "Member kicked");

        let body = sanction_body(subject_id, moderator_id, &action.reason);
        Ok(Outcome::notify(
            ModerationActionResponse::from(&action),
            Notification::danger(community_id, "User Kicked", body),
        ))
    }

    #[instrument(skip(self, reason))]
    pub async fn ban(
        &self,
        community_id: Snowflake,
        subject_id: Snowflake,
        reason: Option<String>,
        moderator_id: Snowflake,
    ) -> ServiceResult<Outcome<ModerationActionResponse>> {
        let record = NewModerationAction::new(
            community_id,
            subject_id,
            ActionKind::Ban,
            reason,
            moderator_id,
        );
        self.ctx
            .platform()
            .ban_member(community_id, subject_id, &record.reason)
            .await
            .map_err(DomainError::from)?;

        let action = self.ctx.action_repo().record(&record).await?;
        info!(community_id = %community_id, subject_id = %subject_id, "Member banned");

        let body = sanction_body(subject_id, moderator_id, &action.reason);
        Ok(Outcome::notify(
            ModerationActionResponse::from(&action),
            Notification::danger(community_id, "User Banned", body),
        ))
    }

    /// Mute a member. `duration_minutes == 0` is indefinite.
    ///
    /// A timed mute arms (or re-arms) the automatic unmute. An indefinite
    /// mute cancels any pending one, since the role state is binary.
    #[instrument(skip(self, reason))]
    pub async fn mute(
        &self,
        community_id: Snowflake,
        subject_id: Snowflake,
        duration_minutes: i64,
        reason: Option<String>,
        moderator_id: Snowflake,
    ) -> ServiceResult<Outcome<MuteResponse>> {
        let minutes = u32::try_from(duration_minutes).map_err(|_| {
            DomainError::InvalidArgument(format!(
                "duration must be a non-negative number of minutes, got {duration_minutes}"
            ))
        })?;

        let role = self.ensure_mute_role(community_id).await?;
        let record = NewModerationAction::new(
            community_id,
            subject_id,
            ActionKind::mute(minutes),
            reason,
            moderator_id,
        );

        self.ctx
            .platform()
            .grant_role(community_id, subject_id, role.id, &record.reason)
            .await
            .map_err(DomainError::from)?;

        // The role is already granted; a ledger failure must not stop the timer
        let recorded = self.ctx.action_repo().record(&record).await;

        let expires_at = if minutes > 0 {
            let expiry =
                PendingExpiry::after_minutes(community_id, subject_id, role.id, minutes, Utc::now());
            let fire_at = expiry.fire_at;
            self.ctx.scheduler().arm(expiry).await;
            Some(fire_at)
        } else {
            self.ctx.scheduler().cancel(community_id, subject_id).await;
            None
        };

        let action = recorded?;
        info!(
            community_id = %community_id,
            subject_id = %subject_id,
            duration_minutes = minutes,
            "Member muted"
        );

        let duration = if minutes > 0 {
            format!("{minutes} min")
        } else {
            "indefinite".to_string()
        };
        let body = format!(
            "{}\n**Duration:** {duration}",
            sanction_body(subject_id, moderator_id, &action.reason)
        );

        Ok(Outcome::notify(
            MuteResponse {
                action: ModerationActionResponse::from(&action),
                role_id: role.id,
                expires_at,
            },
            Notification::warning(community_id, "User Muted", body),
        ))
    }

    /// Lift a mute and drop any pending automatic unmute.
    ///
    /// The pending timer is disarmed for the duration of the call. It is
    /// discarded once the role is gone (or the member turns out not to be
    /// muted) and re-armed if the platform fails, so a failed unmute leaves
    /// the timed mute exactly as it was.
    #[instrument(skip(self))]
    pub async fn unmute(
        &self,
        community_id: Snowflake,
        subject_id: Snowflake,
        moderator_id: Snowflake,
    ) -> ServiceResult<Outcome<ModerationActionResponse>> {
        let scheduler = self.ctx.scheduler();
        let suspended = scheduler.suspend(community_id, subject_id);

        match self.lift_mute(community_id, subject_id).await {
            Ok(()) => {
                if let Some(expiry) = &suspended {
                    scheduler.forget(expiry).await;
                }
            }
            Err(e) => {
                if let Some(expiry) = suspended {
                    if matches!(e, DomainError::NotMuted) {
                        scheduler.forget(&expiry).await;
                    } else if scheduler.resume(expiry) {
                        warn!(community_id = %community_id, subject_id = %subject_id, "Unmute failed; automatic unmute re-armed");
                    }
                }
                return Err(e.into());
            }
        }

        let action = self
            .record(community_id, subject_id, ActionKind::Unmute, None, moderator_id)
            .await?;
        info!(community_id = %community_id, subject_id = %subject_id, "Member unmuted");

        Ok(Outcome::notify(
            ModerationActionResponse::from(&action),
            Notification::success(
                community_id,
                "User Unmuted",
                format!("**User:** <@{subject_id}>\n**Moderator:** <@{moderator_id}>"),
            ),
        ))
    }

    /// Resolve the mute role, confirm the member holds it and remove it
    async fn lift_mute(
        &self,
        community_id: Snowflake,
        subject_id: Snowflake,
    ) -> Result<(), DomainError> {
        let platform = self.ctx.platform();
        let role = platform
            .find_role(community_id, &self.ctx.moderation().mute_role_name)
            .await?
            .ok_or(DomainError::NotMuted)?;

        if !platform.member_has_role(community_id, subject_id, role.id).await? {
            return Err(DomainError::NotMuted);
        }

        platform
            .revoke_role(community_id, subject_id, role.id, UNMUTE_REASON)
            .await?;
        Ok(())
    }

    /// Ledger entry with no platform side effect
    #[instrument(skip(self, reason))]
    pub async fn record_generic(
        &self,
        community_id: Snowflake,
        subject_id: Snowflake,
        kind: ActionKind,
        reason: Option<String>,
        moderator_id: Snowflake,
    ) -> ServiceResult<Outcome<ModerationActionResponse>> {
        let action = self
            .record(community_id, subject_id, kind, reason, moderator_id)
            .await?;

        let body = format!(
            "{}\n**Action:** {}",
            sanction_body(subject_id, moderator_id, &action.reason),
            action.kind
        );
        Ok(Outcome::notify(
            ModerationActionResponse::from(&action),
            Notification::info(community_id, "Action Recorded", body),
        ))
    }

    /// Grant the role if the member lacks it, otherwise revoke it
    #[instrument(skip(self))]
    pub async fn toggle_role(
        &self,
        community_id: Snowflake,
        subject_id: Snowflake,
        role_id: Snowflake,
        moderator_id: Snowflake,
    ) -> ServiceResult<Outcome<RoleToggledResponse>> {
        let has_role = self
            .ctx
            .platform()
            .member_has_role(community_id, subject_id, role_id)
            .await
            .map_err(DomainError::from)?;

        self.set_role(community_id, subject_id, role_id, !has_role, moderator_id)
            .await
    }

    /// Grant (`added`) or revoke a role regardless of what the member holds.
    /// Granting a held role or revoking a missing one is a no-op on the
    /// platform and still reported.
    #[instrument(skip(self))]
    pub async fn set_role(
        &self,
        community_id: Snowflake,
        subject_id: Snowflake,
        role_id: Snowflake,
        added: bool,
        moderator_id: Snowflake,
    ) -> ServiceResult<Outcome<RoleToggledResponse>> {
        let platform = self.ctx.platform();
        let reason = format!("role changed by {moderator_id}");
        let result = if added {
            platform
                .grant_role(community_id, subject_id, role_id, &reason)
                .await
        } else {
            platform
                .revoke_role(community_id, subject_id, role_id, &reason)
                .await
        };
        result.map_err(|e| role_error(e, role_id))?;

        info!(community_id = %community_id, subject_id = %subject_id, role_id = %role_id, added, "Member role changed");

        let title = if added { "Role Added" } else { "Role Removed" };
        Ok(Outcome::notify(
            RoleToggledResponse {
                subject_id,
                role_id,
                added,
            },
            Notification::info(
                community_id,
                title,
                format!(
                    "**User:** <@{subject_id}>\n**Role:** <@&{role_id}>\n**Moderator:** <@{moderator_id}>"
                ),
            ),
        ))
    }

    /// Deny (lock) or clear (unlock) sending for everyone in a channel
    #[instrument(skip(self))]
    pub async fn set_channel_lock(
        &self,
        community_id: Snowflake,
        channel_id: Snowflake,
        locked: bool,
        moderator_id: Snowflake,
    ) -> ServiceResult<Outcome<ChannelLockResponse>> {
        let everyone = OverwriteTarget::everyone(community_id);
        let overwrite = if locked {
            PermissionOverwrite::deny(everyone, Permissions::SEND_MESSAGES)
        } else {
            // Neutral overwrite: fall back to the channel's inherited permissions
            PermissionOverwrite {
                target: everyone,
                allow: Permissions::empty(),
                deny: Permissions::empty(),
            }
        };

        self.ctx
            .platform()
            .set_channel_permission(channel_id, &overwrite)
            .await
            .map_err(|e| channel_error(e, channel_id))?;

        info!(community_id = %community_id, channel_id = %channel_id, locked, "Channel lock changed");

        let body = format!("**Moderator:** <@{moderator_id}>\n**Channel:** <#{channel_id}>");
        let notification = if locked {
            Notification::warning(community_id, "Channel Locked", body)
        } else {
            Notification::success(community_id, "Channel Unlocked", body)
        };
        Ok(Outcome::notify(
            ChannelLockResponse { channel_id, locked },
            notification,
        ))
    }

    /// Set the per-member message delay in a channel; zero turns it off
    #[instrument(skip(self))]
    pub async fn set_slowmode(
        &self,
        community_id: Snowflake,
        channel_id: Snowflake,
        seconds: u32,
        moderator_id: Snowflake,
    ) -> ServiceResult<Outcome<SlowmodeResponse>> {
        if seconds > MAX_SLOWMODE_SECONDS {
            return Err(DomainError::InvalidArgument(format!(
                "slowmode must be at most {MAX_SLOWMODE_SECONDS} seconds, got {seconds}"
            ))
            .into());
        }

        self.ctx
            .platform()
            .set_slowmode(channel_id, seconds, &format!("slowmode set by {moderator_id}"))
            .await
            .map_err(|e| channel_error(e, channel_id))?;

        info!(community_id = %community_id, channel_id = %channel_id, seconds, "Slowmode changed");

        Ok(Outcome::notify(
            SlowmodeResponse {
                channel_id,
                seconds,
            },
            Notification::warning(
                community_id,
                "Slowmode Changed",
                format!(
                    "**Moderator:** <@{moderator_id}>\n**Channel:** <#{channel_id}>\n**Delay:** {seconds} sec"
                ),
            ),
        ))
    }

    async fn record(
        &self,
        community_id: Snowflake,
        subject_id: Snowflake,
        kind: ActionKind,
        reason: Option<String>,
        moderator_id: Snowflake,
    ) -> ServiceResult<modbot_core::ModerationAction> {
        let record = NewModerationAction::new(community_id, subject_id, kind, reason, moderator_id);
        Ok(self.ctx.action_repo().record(&record).await?)
    }

    /// Find or create the mute role. A freshly created role loses send,
    /// speak and react in every channel; an existing role is reused as is.
    async fn ensure_mute_role(&self, community_id: Snowflake) -> ServiceResult<RoleHandle> {
        let platform = self.ctx.platform();
        let ensured = platform
            .create_role_if_absent(community_id, &self.ctx.moderation().mute_role_name)
            .await
            .map_err(DomainError::from)?;

        if !ensured.created {
            return Ok(ensured.role);
        }

        let role = ensured.role;
        info!(community_id = %community_id, role_id = %role.id, "Mute role created");

        let channels = match platform.list_channels(community_id).await {
            Ok(channels) => channels,
            Err(e) => {
                warn!(community_id = %community_id, error = %e, "Could not list channels for mute role setup");
                return Ok(role);
            }
        };

        let overwrite =
            PermissionOverwrite::deny(OverwriteTarget::Role(role.id), Permissions::MUTED_DENY);
        let results = join_all(
            channels
                .iter()
                .map(|channel| platform.set_channel_permission(channel.id, &overwrite)),
        )
        .await;

        for (channel, result) in channels.iter().zip(results) {
            if let Err(e) = result {
                warn!(channel_id = %channel.id, error = %e, "Could not restrict mute role in channel");
            }
        }

        Ok(role)
    }
}

fn sanction_body(subject_id: Snowflake, moderator_id: Snowflake, reason: &str) -> String {
    format!("**User:** <@{subject_id}>\n**Moderator:** <@{moderator_id}>\n**Reason:** {reason}")
}

fn role_error(e: PlatformError, role_id: Snowflake) -> DomainError {
    match e.status {
        Some(404) => DomainError::RoleNotFound(role_id.to_string()),
        _ => e.into(),
    }
}

pub(super) fn channel_error(e: PlatformError, channel_id: Snowflake) -> DomainError {
    match e.status {
        Some(404) => DomainError::ChannelNotFound(channel_id),
        _ => e.into(),
    }
}
