//! Dispatcher authentication
//!
//! The command ingress is called by a single trusted dispatcher which
//! presents a shared bearer token.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::response::ApiError;
use crate::state::AppState;

/// Proof that the request carried the configured dispatch token
#[derive(Debug, Clone, Copy)]
pub struct DispatchAuth;

#[async_trait]
impl<S> FromRequestParts<S> for DispatchAuth
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::MissingAuth)?;

        let app_state = AppState::from_ref(state);
        if !constant_time_eq(bearer.token().as_bytes(), app_state.dispatch_token().as_bytes()) {
            tracing::warn!("Rejected command with an invalid dispatch token");
            return Err(ApiError::InvalidToken);
        }

        Ok(DispatchAuth)
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
