//! Quote entity <-> model mapper

use modbot_core::entities::{NewQuote, Quote};
use modbot_core::value_objects::Snowflake;

use crate::models::QuoteModel;

impl From<QuoteModel> for Quote {
    fn from(model: QuoteModel) -> Self {
        Quote {
            id: model.id,
            community_id: Snowflake::new(model.community_id),
            subject_id: Snowflake::new(model.subject_id),
            text: model.text,
            added_by: Snowflake::new(model.added_by),
            created_at: model.created_at,
        }
    }
}

pub struct QuoteInsert<'a> {
    pub community_id: i64,
    pub subject_id: i64,
    pub text: &'a str,
    pub added_by: i64,
}

impl<'a> QuoteInsert<'a> {
    pub fn new(quote: &'a NewQuote) -> Self {
        Self {
            community_id: quote.community_id.into_inner(),
            subject_id: quote.subject_id.into_inner(),
            text: &quote.text,
            added_by: quote.added_by.into_inner(),
        }
    }
}
