//! # modbot-service
//!
//! Application layer: the moderation ledger and sanctions, the expiry
//! scheduler, the interactive session engine, quotes, community settings,
//! and the command dispatcher that fronts them all.

pub mod dto;
pub mod services;

pub use dto::{Command, CommandOutcome, CommandPayload};
pub use services::{
    CommandDispatcher, ExpiryScheduler, Invocation, ServiceContext, ServiceContextBuilder,
    ServiceError, ServiceResult, SessionEngine, SweepReport, TicketAccess,
};
