//! Path parameter extractors

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use modbot_core::Snowflake;
use serde::Deserialize;

use crate::response::ApiError;

#[derive(Debug, Deserialize)]
struct CommunityParams {
    community_id: String,
}

/// The `community_id` path segment, parsed as a Snowflake
#[derive(Debug, Clone, Copy)]
pub struct CommunityPath(pub Snowflake);

#[async_trait]
impl<S> FromRequestParts<S> for CommunityPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(params) = Path::<CommunityParams>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_path(e.to_string()))?;

        let community_id = Snowflake::parse(&params.community_id)
            .map_err(|_| ApiError::invalid_path("Invalid community_id format"))?;
        Ok(CommunityPath(community_id))
    }
}
