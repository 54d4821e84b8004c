//! HTTP implementation of the platform port

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use modbot_core::traits::{
    ChannelHandle, ChannelSpec, EnsuredRole, OutgoingMessage, PermissionOverwrite, PlatformClient,
    PlatformError, PlatformResult, RoleHandle,
};
use modbot_core::value_objects::{Permissions, Snowflake};

use crate::routes;
use crate::wire::{
    ApiError, ChannelBody, CreateChannel, CreateMessage, CreateRole, EditChannel, MemberBody,
    MessageBody, Overwrite, RoleBody,
};

const AUDIT_LOG_REASON: &str = "X-Audit-Log-Reason";

/// Connection settings for [`HttpPlatformClient`]
#[derive(Clone)]
pub struct HttpPlatformConfig {
    pub api_url: String,
    pub token: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for HttpPlatformConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPlatformConfig")
            .field("api_url", &self.api_url)
            .field("token", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// REST client for the chat platform
pub struct HttpPlatformClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
    /// Serializes find-then-create so two concurrent mutes never create two roles
    role_creation: Mutex<()>,
}

impl HttpPlatformClient {
    pub fn new(config: &HttpPlatformConfig) -> PlatformResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PlatformError::new(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            role_creation: Mutex::new(()),
        })
    }

    fn request(&self, method: Method, path: &str, reason: Option<&str>) -> RequestBuilder {
        let mut request = self
            .http
            .request(method, format!("{}{path}", self.base_url))
            .header(AUTHORIZATION, format!("Bot {}", self.token));

        if let Some(reason) = reason.filter(|r| !r.trim().is_empty()) {
            request = request.header(AUDIT_LOG_REASON, encode_reason(reason));
        }
        request
    }

    async fn send(&self, request: RequestBuilder) -> PlatformResult<Response> {
        let response = request.send().await.map_err(|e| {
            warn!(error = %e, "Platform request failed");
            PlatformError::new(format!("request failed: {e}"))
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), body = %body, "Platform rejected request");
        Err(status_error(status, &body))
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> PlatformResult<T> {
        let response = self.send(request).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| PlatformError::new(format!("invalid response body: {e}")))
    }
}

/// Audit-log reasons travel in a header, so they must be percent-encoded
fn encode_reason(reason: &str) -> String {
    urlencoding::encode(reason).into_owned()
}

fn status_error(status: StatusCode, body: &str) -> PlatformError {
    let message = serde_json::from_str::<ApiError>(body)
        .ok()
        .filter(|e| !e.message.is_empty())
        .map_or_else(
            || {
                status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string()
            },
            |e| match e.code {
                0 => e.message,
                code => format!("{} (code {code})", e.message),
            },
        );
    PlatformError::with_status(status.as_u16(), message)
}

#[async_trait]
impl PlatformClient for HttpPlatformClient {
    #[instrument(skip(self))]
    async fn grant_role(
        &self,
        community_id: Snowflake,
        user_id: Snowflake,
        role_id: Snowflake,
        reason: &str,
    ) -> PlatformResult<()> {
        let path = routes::member_role(community_id, user_id, role_id);
        self.send(self.request(Method::PUT, &path, Some(reason)))
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn revoke_role(
        &self,
        community_id: Snowflake,
        user_id: Snowflake,
        role_id: Snowflake,
        reason: &str,
    ) -> PlatformResult<()> {
        let path = routes::member_role(community_id, user_id, role_id);
        self.send(self.request(Method::DELETE, &path, Some(reason)))
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn member_has_role(
        &self,
        community_id: Snowflake,
        user_id: Snowflake,
        role_id: Snowflake,
    ) -> PlatformResult<bool> {
        let path = routes::member(community_id, user_id);
        match self
            .send_json::<MemberBody>(self.request(Method::GET, &path, None))
            .await
        {
            Ok(member) => Ok(member.roles.contains(&role_id)),
            // Someone who left the community holds no roles
            Err(e) if e.status == Some(StatusCode::NOT_FOUND.as_u16()) => Ok(false),
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self))]
    async fn kick_member(
        &self,
        community_id: Snowflake,
        user_id: Snowflake,
        reason: &str,
    ) -> PlatformResult<()> {
        let path = routes::member(community_id, user_id);
        self.send(self.request(Method::DELETE, &path, Some(reason)))
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn ban_member(
        &self,
        community_id: Snowflake,
        user_id: Snowflake,
        reason: &str,
    ) -> PlatformResult<()> {
        let path = routes::ban(community_id, user_id);
        self.send(
            self.request(Method::PUT, &path, Some(reason))
                .json(&serde_json::json!({})),
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_role(
        &self,
        community_id: Snowflake,
        name: &str,
    ) -> PlatformResult<Option<RoleHandle>> {
        let path = routes::roles(community_id);
        let roles: Vec<RoleBody> = self
            .send_json(self.request(Method::GET, &path, None))
            .await?;
        Ok(roles
            .into_iter()
            .find(|r| r.name == name)
            .map(RoleHandle::from))
    }

    #[instrument(skip(self))]
    async fn create_role_if_absent(
        &self,
        community_id: Snowflake,
        name: &str,
    ) -> PlatformResult<EnsuredRole> {
        let _guard = self.role_creation.lock().await;

        if let Some(role) = self.find_role(community_id, name).await? {
            return Ok(EnsuredRole {
                role,
                created: false,
            });
        }

        let path = routes::roles(community_id);
        let body = CreateRole {
            name,
            permissions: Permissions::empty(),
        };
        let role: RoleBody = self
            .send_json(
                self.request(Method::POST, &path, Some("mute role setup"))
                    .json(&body),
            )
            .await?;

        debug!(role_id = %role.id, "Created role");
        Ok(EnsuredRole {
            role: role.into(),
            created: true,
        })
    }

    #[instrument(skip(self))]
    async fn list_channels(&self, community_id: Snowflake) -> PlatformResult<Vec<ChannelHandle>> {
        let path = routes::guild_channels(community_id);
        let channels: Vec<ChannelBody> = self
            .send_json(self.request(Method::GET, &path, None))
            .await?;
        Ok(channels.into_iter().map(ChannelHandle::from).collect())
    }

    #[instrument(skip(self, spec), fields(name = %spec.name))]
    async fn create_channel(
        &self,
        community_id: Snowflake,
        spec: &ChannelSpec,
    ) -> PlatformResult<ChannelHandle> {
        let path = routes::guild_channels(community_id);
        let channel: ChannelBody = self
            .send_json(
                self.request(Method::POST, &path, None)
                    .json(&CreateChannel::from(spec)),
            )
            .await?;
        Ok(channel.into())
    }

    #[instrument(skip(self))]
    async fn delete_channel(&self, channel_id: Snowflake, reason: &str) -> PlatformResult<()> {
        let path = routes::channel(channel_id);
        self.send(self.request(Method::DELETE, &path, Some(reason)))
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn set_channel_permission(
        &self,
        channel_id: Snowflake,
        overwrite: &PermissionOverwrite,
    ) -> PlatformResult<()> {
        let path = routes::channel_permission(channel_id, overwrite.target.id());
        self.send(
            self.request(Method::PUT, &path, None)
                .json(&Overwrite::from(overwrite)),
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn set_slowmode(
        &self,
        channel_id: Snowflake,
        seconds: u32,
        reason: &str,
    ) -> PlatformResult<()> {
        let path = routes::channel(channel_id);
        self.send(
            self.request(Method::PATCH, &path, Some(reason))
                .json(&EditChannel {
                    rate_limit_per_user: seconds,
                }),
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self, message))]
    async fn send_message(
        &self,
        channel_id: Snowflake,
        message: &OutgoingMessage,
    ) -> PlatformResult<Snowflake> {
        let path = routes::channel_messages(channel_id);
        let sent: MessageBody = self
            .send_json(
                self.request(Method::POST, &path, None)
                    .json(&CreateMessage::from(message)),
            )
            .await?;
        Ok(sent.id)
    }
}
