//! Command ingress
//!
//! The dispatcher resolves the invoking member and their permissions and
//! forwards one command per request.

use axum::{extract::State, Json};
use modbot_service::dto::{CommandOutcome, DispatchRequest};
use modbot_service::{CommandDispatcher, Invocation};

use crate::extractors::{CommunityPath, DispatchAuth, ValidatedJson};
use crate::response::ApiResult;
use crate::state::AppState;

/// Run a command for a community
///
/// POST /api/v1/communities/:community_id/commands
pub async fn dispatch_command(
    State(state): State<AppState>,
    _auth: DispatchAuth,
    CommunityPath(community_id): CommunityPath,
    ValidatedJson(request): ValidatedJson<DispatchRequest>,
) -> ApiResult<Json<CommandOutcome>> {
    let invocation = Invocation::new(community_id, request.actor);
    let outcome = CommandDispatcher::new(state.service_context())
        .dispatch(invocation, request.command)
        .await?;
    Ok(Json(outcome))
}
