//! ModerationAction entity <-> model mapper

use modbot_core::entities::{ActionKind, ModerationAction, NewModerationAction};
use modbot_core::error::DomainError;
use modbot_core::value_objects::Snowflake;

use crate::models::ModerationActionModel;

/// Rows with an unknown `kind` label are reported rather than skipped
impl TryFrom<ModerationActionModel> for ModerationAction {
    type Error = DomainError;

    fn try_from(model: ModerationActionModel) -> Result<Self, Self::Error> {
        let kind = ActionKind::from_parts(&model.kind, model.duration_minutes).ok_or_else(|| {
            DomainError::Persistence(format!(
                "unknown action kind '{}' in record {}",
                model.kind, model.id
            ))
        })?;

        Ok(ModerationAction {
            id: model.id,
            community_id: Snowflake::new(model.community_id),
            subject_id: Snowflake::new(model.subject_id),
            kind,
            reason: model.reason,
            issuer_id: Snowflake::new(model.issuer_id),
            created_at: model.created_at,
        })
    }
}

/// Values for inserting a ledger record
pub struct ActionInsert<'a> {
    pub community_id: i64,
    pub subject_id: i64,
    pub kind: &'static str,
    pub duration_minutes: Option<i32>,
    pub reason: &'a str,
    pub issuer_id: i64,
}

impl<'a> ActionInsert<'a> {
    pub fn new(action: &'a NewModerationAction) -> Self {
        Self {
            community_id: action.community_id.into_inner(),
            subject_id: action.subject_id.into_inner(),
            kind: action.kind.label(),
            duration_minutes: action
                .kind
                .duration_minutes()
                .and_then(|m| i32::try_from(m).ok()),
            reason: &action.reason,
            issuer_id: action.issuer_id.into_inner(),
        }
    }
}
