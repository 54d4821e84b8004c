//! Business logic services
//!
//! Each service borrows the shared `ServiceContext` for the duration of a
//! call. The expiry scheduler and the session engine are long-lived and
//! live inside the context itself.

pub mod context;
pub mod dispatcher;
pub mod error;
pub mod ledger;
pub mod moderation;
pub mod notifier;
pub mod outcome;
pub mod quote;
pub mod scheduler;
pub mod session;
pub mod settings;

pub use context::{ServiceContext, ServiceContextBuilder};
pub use dispatcher::{CommandDispatcher, Invocation};
pub use error::{ServiceError, ServiceResult};
pub use ledger::LedgerService;
pub use moderation::ModerationService;
pub use notifier::ModlogNotifier;
pub use outcome::Outcome;
pub use quote::QuoteService;
pub use scheduler::{ExpiryScheduler, EXPIRY_REASON};
pub use session::{SessionEngine, SweepReport, TicketAccess};
pub use settings::SettingsService;
