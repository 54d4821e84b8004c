//! Entity to DTO mappers
//!
//! Implements `From` conversions from domain entities to response DTOs.

use modbot_core::entities::{ModerationAction, Quote};

use super::responses::{ModerationActionResponse, QuoteResponse};

impl From<&ModerationAction> for ModerationActionResponse {
    fn from(action: &ModerationAction) -> Self {
        Self {
            id: action.id,
            community_id: action.community_id,
            subject_id: action.subject_id,
            kind: action.kind.label(),
            duration_minutes: action.kind.duration_minutes(),
            summary: action.kind.to_string(),
            reason: action.reason.clone(),
            issuer_id: action.issuer_id,
            created_at: action.created_at,
        }
    }
}

impl From<ModerationAction> for ModerationActionResponse {
    fn from(action: ModerationAction) -> Self {
        Self::from(&action)
    }
}

impl QuoteResponse {
    /// Number a subject's quotes from 1 in list order
    pub fn numbered(quotes: Vec<Quote>) -> Vec<Self> {
        quotes
            .into_iter()
            .enumerate()
            .map(|(index, quote)| Self {
                position: index + 1,
                id: quote.id,
                subject_id: quote.subject_id,
                text: quote.text,
                added_by: quote.added_by,
                created_at: quote.created_at,
            })
            .collect()
    }
}
